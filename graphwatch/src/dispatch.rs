//! Fan-out of a `Change` to local callbacks and, recursively, to ancestors
//! with the path rewritten. See §4.G.

use crate::change::Change;
use crate::error::Error;
use crate::path;
use crate::registry;
use crate::value::Key;

/// Bounds reentrant/bubble recursion depth. See §5: "bounding dispatch depth
/// (configurable, default 256)".
#[derive(Debug, Clone, Copy)]
pub struct Config {
    pub max_dispatch_depth: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_dispatch_depth: 256,
        }
    }
}

thread_local! {
    static CONFIG: std::cell::Cell<Config> = std::cell::Cell::new(Config::default());
}

/// Override the dispatch-depth limit for the current thread.
pub fn configure(config: Config) {
    CONFIG.with(|c| c.set(config));
}

/// Entry point: dispatch a freshly-raised `Change` to its target's local
/// callbacks and bubble it to ancestors. Called by every container/record
/// mutation hook.
pub fn invoke(change: Change) {
    invoke_at_depth(change, 0);
}

fn invoke_at_depth(change: Change, depth: usize) {
    let max = CONFIG.with(|c| c.get().max_dispatch_depth);
    if depth > max {
        tracing::error!(
            depth,
            max,
            "{}",
            Error::DispatchDepthExceeded(max)
        );
        return;
    }

    tracing::debug!("{change}");

    // Bubbles are processed before local callbacks, per §4.G's ordering
    // note: ancestors must see a complete composed path even if a local
    // callback goes on to mutate the graph again.
    for br in registry::backrefs_of(change.target) {
        let Some(parent) = br.parent else { continue };
        let composed = path::compose(&br.name.to_string(), &change.key, change.source);
        let bubbled = Change::new(
            parent,
            Key::Name(composed),
            change.old.clone(),
            change.new.clone(),
            br.source,
        );
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            invoke_at_depth(bubbled, depth + 1);
        }));
        if result.is_err() {
            tracing::error!(parent = %parent, "bubble dispatch failed; sibling backrefs still serviced");
        }
    }

    registry::invoke_callbacks(change.target, &change);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::NodeId;
    use crate::node::BackRef;
    use crate::registry;
    use crate::value::{Source, Value};
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn local_callback_receives_direct_change() {
        registry::reset_for_tests();
        let id = NodeId::next();
        registry::add_backref(id, BackRef::new(None, id, Key::Name("root".into()), Source::Attr));

        let seen: Rc<RefCell<Vec<String>>> = Rc::new(RefCell::new(Vec::new()));
        let seen2 = seen.clone();
        registry::subscribe(
            id,
            crate::filter::Filter::wildcard(),
            Box::new(move |c| seen2.borrow_mut().push(c.key.to_string())),
        )
        .unwrap();

        invoke(Change::new(id, "name", None, Some(Value::Str("x".into())), Source::Attr));
        assert_eq!(*seen.borrow(), vec!["name".to_string()]);
    }

    #[test]
    fn bubbles_to_parent_with_composed_path() {
        registry::reset_for_tests();
        let root = NodeId::next();
        let child = NodeId::next();
        registry::add_backref(root, BackRef::new(None, root, Key::Name("Root".into()), Source::Attr));
        registry::add_backref(
            child,
            BackRef::new(Some(root), child, Key::Name("foo".into()), Source::Attr),
        );

        let seen: Rc<RefCell<Vec<String>>> = Rc::new(RefCell::new(Vec::new()));
        let seen2 = seen.clone();
        registry::subscribe(
            root,
            crate::filter::Filter::wildcard(),
            Box::new(move |c| seen2.borrow_mut().push(c.key.to_string())),
        )
        .unwrap();

        invoke(Change::new(child, "name", None, Some(Value::Str("m".into())), Source::Attr));
        assert_eq!(*seen.borrow(), vec!["foo.name".to_string()]);
    }

    #[test]
    fn depth_limit_aborts_chain_without_panicking() {
        registry::reset_for_tests();
        configure(Config { max_dispatch_depth: 2 });
        // Build a chain of 5 nodes, each the parent of the next.
        let ids: Vec<NodeId> = (0..5).map(|_| NodeId::next()).collect();
        for (i, &id) in ids.iter().enumerate() {
            let parent = if i == 0 { None } else { Some(ids[i - 1]) };
            registry::add_backref(id, BackRef::new(parent, id, Key::Name(format!("n{i}")), Source::Attr));
        }
        // Invoking at the deepest node should not panic even though it
        // exceeds the configured depth while bubbling to the root.
        invoke(Change::new(*ids.last().unwrap(), "x", None, Some(Value::Int(1)), Source::Attr));
        configure(Config::default());
    }
}
