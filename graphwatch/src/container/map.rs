//! Mapping container, tracked by key. See §4.A "Mapping", §4.B.

use crate::activate;
use crate::change::Change;
use crate::dispatch;
use crate::identity::NodeId;
use crate::node::{Kind, Node};
use crate::registry;
use crate::value::{Key, Source, Trackable, Value};
use indexmap::IndexMap;
use std::cell::RefCell;
use std::hash::Hash;
use std::rc::Rc;

/// A mapping whose `insert`/`remove` raise `Change` events keyed by a
/// composed `Key::Name`, and re-home child back-references, when tracked.
///
/// Backed by `IndexMap` rather than `HashMap` so iteration (`children()`,
/// for activation) is stable across calls within a process, matching the
/// insertion-order iteration the source's `dict` gives for free.
pub struct TrackedMap<K, V> {
    id: NodeId,
    items: Rc<RefCell<IndexMap<K, V>>>,
}

impl<K, V> Clone for TrackedMap<K, V> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            items: self.items.clone(),
        }
    }
}

impl<K, V> TrackedMap<K, V>
where
    K: Eq + Hash + Clone + ToString,
    V: Trackable,
{
    pub fn new() -> Self {
        Self {
            id: NodeId::next(),
            items: Rc::new(RefCell::new(IndexMap::new())),
        }
    }
}

impl<K, V> Default for TrackedMap<K, V>
where
    K: Eq + Hash + Clone + ToString,
    V: Trackable,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> TrackedMap<K, V>
where
    K: Eq + Hash + Clone + ToString,
    V: Trackable,
{
    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }

    fn tracked(&self) -> bool {
        registry::is_tracked(self.id)
    }

    fn activate_key(&self, key: &K) {
        if let Some(node) = self.items.borrow().get(key).and_then(Trackable::as_node) {
            activate::activate(
                &node,
                Key::Name(key.to_string()),
                Some(self.id),
                Source::Item,
                &mut std::collections::HashSet::new(),
            );
        }
    }

    fn deactivate_value(&self, key: &K, value: &V) {
        if let Some(node) = value.as_node() {
            activate::deactivate(&node, Key::Name(key.to_string()), Some(self.id), Source::Item);
        }
    }

    pub fn get(&self, key: &K) -> Option<V>
    where
        V: Clone,
    {
        self.items.borrow().get(key).cloned()
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.items.borrow().contains_key(key)
    }

    /// Insert `value` at `key`, returning the previous value if any.
    pub fn insert(&self, key: K, value: V) -> Option<V> {
        let old = {
            let mut items = self.items.borrow_mut();
            items.insert(key.clone(), value)
        };
        if self.tracked() {
            if let Some(old) = &old {
                self.deactivate_value(&key, old);
            }
            self.activate_key(&key);
            dispatch::invoke(Change::new(
                self.id,
                key.to_string(),
                old.as_ref().map(Trackable::to_value),
                Some(self.items.borrow()[&key].to_value()),
                Source::Item,
            ));
        }
        old
    }

    /// Remove `key`, returning its value if present.
    pub fn remove(&self, key: &K) -> Option<V> {
        let removed = self.items.borrow_mut().shift_remove(key);
        if let Some(removed) = &removed {
            if self.tracked() {
                self.deactivate_value(key, removed);
                dispatch::invoke(Change::new(
                    self.id,
                    key.to_string(),
                    Some(removed.to_value()),
                    None,
                    Source::Item,
                ));
            }
        }
        removed
    }

    /// Remove every entry, highest-to-lowest insertion position, per §9 Q2.
    pub fn clear(&self) {
        let keys: Vec<K> = self.items.borrow().keys().rev().cloned().collect();
        for key in keys {
            self.remove(&key);
        }
    }

    /// Merge `entries` into this mapping, one `Change` per touched key (§4.B
    /// "update/merge"), by delegating to `insert` for each pair in order.
    pub fn update(&self, entries: impl IntoIterator<Item = (K, V)>) {
        for (key, value) in entries {
            self.insert(key, value);
        }
    }
}

impl<K, V> Node for TrackedMap<K, V>
where
    K: Eq + Hash + Clone + ToString + 'static,
    V: Trackable,
{
    fn id(&self) -> NodeId {
        self.id
    }

    fn kind(&self) -> Kind {
        Kind::Mapping
    }

    fn type_name(&self) -> &'static str {
        "TrackedMap"
    }

    fn children(&self) -> Vec<(Key, Source, Rc<dyn Node>)> {
        self.items
            .borrow()
            .iter()
            .filter_map(|(k, v)| match v.as_node() {
                Some(n) => Some((Key::Name(k.to_string()), Source::Item, n)),
                None => {
                    crate::value::log_unsupported_child::<V>();
                    None
                }
            })
            .collect()
    }
}

impl<K, V> Trackable for TrackedMap<K, V>
where
    K: Eq + Hash + Clone + ToString + 'static,
    V: Trackable,
{
    fn to_value(&self) -> Value {
        Value::Node(self.id, self.type_name())
    }

    fn as_node(&self) -> Option<Rc<dyn Node>> {
        Some(Rc::new(self.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activate::activate_root;

    #[test]
    fn untracked_mutation_raises_no_backrefs() {
        registry::reset_for_tests();
        let m: TrackedMap<String, i32> = TrackedMap::new();
        m.insert("k".into(), 1);
        assert!(!registry::is_tracked(m.id()));
    }

    #[test]
    fn tracked_insert_dispatches_composed_key() {
        registry::reset_for_tests();
        let m: TrackedMap<String, i32> = TrackedMap::new();
        let rc: Rc<dyn Node> = Rc::new(m.clone());
        activate_root(&rc);

        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen2 = seen.clone();
        registry::subscribe(
            m.id(),
            crate::filter::Filter::wildcard(),
            Box::new(move |c| seen2.borrow_mut().push(c.key.to_string())),
        )
        .unwrap();

        m.insert("foo".into(), 1);
        assert_eq!(*seen.borrow(), vec!["foo".to_string()]);
    }

    #[test]
    fn remove_drops_entry_and_emits_change() {
        registry::reset_for_tests();
        let m: TrackedMap<String, i32> = TrackedMap::new();
        m.insert("foo".into(), 1);
        let rc: Rc<dyn Node> = Rc::new(m.clone());
        activate_root(&rc);

        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen2 = seen.clone();
        registry::subscribe(
            m.id(),
            crate::filter::Filter::wildcard(),
            Box::new(move |c| seen2.borrow_mut().push(c.to_string())),
        )
        .unwrap();

        let removed = m.remove(&"foo".to_string());
        assert_eq!(removed, Some(1));
        assert!(!m.contains_key(&"foo".to_string()));
        assert_eq!(seen.borrow().len(), 1);
    }

    #[test]
    fn update_raises_one_event_per_touched_key() {
        registry::reset_for_tests();
        let m: TrackedMap<String, i32> = TrackedMap::new();
        m.insert("a".into(), 1);
        let rc: Rc<dyn Node> = Rc::new(m.clone());
        activate_root(&rc);

        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen2 = seen.clone();
        registry::subscribe(
            m.id(),
            crate::filter::Filter::wildcard(),
            Box::new(move |c| seen2.borrow_mut().push(c.key.to_string())),
        )
        .unwrap();

        m.update(vec![("a".to_string(), 2), ("b".to_string(), 3)]);

        assert_eq!(*seen.borrow(), vec!["a".to_string(), "b".to_string()]);
        assert_eq!(m.get(&"a".to_string()), Some(2));
        assert_eq!(m.get(&"b".to_string()), Some(3));
    }
}
