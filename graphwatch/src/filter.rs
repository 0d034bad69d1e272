//! Path-pattern matching for subscriptions. See §4.E.

use crate::change::Change;
use glob::Pattern as GlobPattern;
use regex::Regex;

/// Either the wildcard, a shell glob, a compiled regular expression, or a
/// bare integer index matcher.
pub enum Filter {
    Wildcard,
    Glob(GlobPattern),
    Regex(Regex),
    /// Matches an `Item`/`Index` key by equality — "the change's key is an
    /// integer and the filter is an integer-valued plain pattern" (§4.E).
    Index(usize),
}

fn escape_path_brackets(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len());
    for c in pattern.chars() {
        match c {
            '[' => out.push_str("[[]"),
            ']' => out.push_str("[]]"),
            _ => out.push(c),
        }
    }
    out
}

impl Filter {
    pub fn wildcard() -> Self {
        Filter::Wildcard
    }

    /// Build a filter from a pattern string. `regex = true` compiles it as a
    /// regular expression (prefix-anchored per §4.E); otherwise it is
    /// matched as a shell glob, unless it parses as a bare integer, in which
    /// case it becomes an `Index` filter.
    pub fn new(pattern: &str, regex: bool) -> Result<Self, crate::error::Error> {
        if pattern == "*" {
            return Ok(Filter::Wildcard);
        }
        if regex {
            let anchored = if pattern.starts_with('^') {
                pattern.to_owned()
            } else {
                format!("^(?:{pattern})")
            };
            let re = Regex::new(&anchored)
                .map_err(|e| crate::error::Error::BadPattern(e.to_string()))?;
            return Ok(Filter::Regex(re));
        }
        if let Ok(i) = pattern.parse::<usize>() {
            return Ok(Filter::Index(i));
        }
        // Composed item-access paths are bracketed ("A[0]", "A[\"k\"]"), but
        // shell-glob syntax treats `[`/`]` as a character class, not a
        // literal. Escape them so a pattern like `names[*]` matches the
        // bracket itself rather than being parsed as a class.
        let escaped = escape_path_brackets(pattern);
        let glob = GlobPattern::new(&escaped)
            .map_err(|e| crate::error::Error::BadPattern(e.to_string()))?;
        Ok(Filter::Glob(glob))
    }

    pub fn matches(&self, change: &Change) -> bool {
        match self {
            Filter::Wildcard => true,
            Filter::Index(i) => change.key.as_index() == Some(*i),
            Filter::Glob(pat) => match change.key.as_str() {
                Some(s) => pat.matches(s),
                None => false,
            },
            Filter::Regex(re) => match change.key.as_str() {
                Some(s) => re.is_match(s),
                None => false,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::NodeId;
    use crate::value::{Key, Source, Value};

    fn change(key: Key) -> Change {
        Change::new(
            NodeId::next(),
            key,
            None,
            Some(Value::Int(1)),
            Source::Attr,
        )
    }

    #[test]
    fn wildcard_matches_everything() {
        let f = Filter::wildcard();
        assert!(f.matches(&change(Key::Name("anything".into()))));
        assert!(f.matches(&change(Key::Index(7))));
    }

    #[test]
    fn glob_matches_names_only() {
        let f = Filter::new("names[*]", false).unwrap();
        assert!(f.matches(&change(Key::Name("names[\"foo\"]".into()))));
        assert!(!f.matches(&change(Key::Name("other".into()))));
        assert!(!f.matches(&change(Key::Index(3))));
    }

    #[test]
    fn literal_pattern_matches_exact_path() {
        let f = Filter::new("foo.bar", false).unwrap();
        assert!(f.matches(&change(Key::Name("foo.bar".into()))));
        assert!(!f.matches(&change(Key::Name("foo.bar.baz".into()))));
    }

    #[test]
    fn regex_is_prefix_anchored() {
        let f = Filter::new("foo.*", true).unwrap();
        assert!(f.matches(&change(Key::Name("foo.bar".into()))));
        assert!(!f.matches(&change(Key::Name("xfoo.bar".into()))));
    }

    #[test]
    fn integer_key_matches_integer_pattern() {
        let f = Filter::new("2", false).unwrap();
        assert!(f.matches(&change(Key::Index(2))));
        assert!(!f.matches(&change(Key::Index(3))));
    }
}
