//! Composes the dotted/bracketed path a bubbled `Change` presents to an
//! ancestor subscriber. See §4.D.

use crate::value::{Key, Source};

/// Given the parent-relative name `parent_name` already accumulated so far,
/// and the child segment (`key`, `source`) the change occurred under,
/// produce the next composed path string.
///
/// ```text
/// attr  -> "{parent_name}.{key}"
/// item  -> "{parent_name}[{repr(key)}]"
/// set   -> "{parent_name}{{}}"
/// ```
pub fn compose(parent_name: &str, key: &Key, source: Source) -> String {
    match source {
        Source::Attr => format!("{parent_name}.{key}"),
        Source::Item => format!("{parent_name}[{}]", key.path_repr()),
        Source::Set => format!("{parent_name}{{}}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attr_composition() {
        assert_eq!(compose("foo", &Key::Name("name".into()), Source::Attr), "foo.name");
    }

    #[test]
    fn item_composition_quotes_strings_bares_indices() {
        assert_eq!(compose("A", &Key::Index(0), Source::Item), "A[0]");
        assert_eq!(
            compose("names", &Key::Name("foo".into()), Source::Item),
            "names[\"foo\"]"
        );
    }

    #[test]
    fn set_composition_drops_key() {
        assert_eq!(compose("tags", &Key::Name("x".into()), Source::Set), "tags{}");
    }

    #[test]
    fn chained_composition_builds_full_path() {
        // root -> A.k -> f : A.k.f
        let step1 = compose("root", &Key::Name("A".into()), Source::Attr);
        let step2 = compose(&step1, &Key::Name("k".into()), Source::Item);
        let step3 = compose(&step2, &Key::Name("f".into()), Source::Attr);
        assert_eq!(step3, "root.A[\"k\"].f");
    }
}
