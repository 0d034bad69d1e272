//! Unordered set container. See §4.A "Set", §4.B.
//!
//! Set membership has no positional or named key, so the composed path a
//! subscriber sees drops the element entirely (§4.D `set -> "{parent}{}"`).
//! The `Change` raised locally still needs *some* key to report, so it uses
//! the element's own rendered value — the closest Rust analogue of the
//! source's `repr(item)` used for the same purpose.

use crate::activate;
use crate::change::Change;
use crate::dispatch;
use crate::identity::NodeId;
use crate::node::{Kind, Node};
use crate::registry;
use crate::value::{Key, Source, Trackable, Value};
use indexmap::IndexSet;
use std::cell::RefCell;
use std::hash::Hash;
use std::rc::Rc;

pub struct TrackedSet<T> {
    id: NodeId,
    items: Rc<RefCell<IndexSet<T>>>,
}

impl<T> Clone for TrackedSet<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            items: self.items.clone(),
        }
    }
}

impl<T> Default for TrackedSet<T>
where
    T: Eq + Hash + Clone + ToString + Trackable,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> TrackedSet<T>
where
    T: Eq + Hash + Clone + ToString + Trackable,
{
    pub fn new() -> Self {
        Self {
            id: NodeId::next(),
            items: Rc::new(RefCell::new(IndexSet::new())),
        }
    }

    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }

    pub fn contains(&self, value: &T) -> bool {
        self.items.borrow().contains(value)
    }

    fn tracked(&self) -> bool {
        registry::is_tracked(self.id)
    }

    fn activate_member(&self, value: &T) {
        if let Some(node) = value.as_node() {
            activate::activate(
                &node,
                Key::Name(value.to_string()),
                Some(self.id),
                Source::Set,
                &mut std::collections::HashSet::new(),
            );
        }
    }

    fn deactivate_member(&self, value: &T) {
        if let Some(node) = value.as_node() {
            activate::deactivate(&node, Key::Name(value.to_string()), Some(self.id), Source::Set);
        }
    }

    /// Add `value`. Returns `true` if it was not already present.
    pub fn add(&self, value: T) -> bool {
        let inserted = self.items.borrow_mut().insert(value.clone());
        if inserted && self.tracked() {
            self.activate_member(&value);
            dispatch::invoke(Change::new(
                self.id,
                value.to_string(),
                None,
                Some(value.to_value()),
                Source::Set,
            ));
        }
        inserted
    }

    /// Remove `value` if present. Returns `true` if it was removed.
    pub fn discard(&self, value: &T) -> bool {
        let removed = self.items.borrow_mut().shift_remove(value);
        if removed && self.tracked() {
            self.deactivate_member(value);
            dispatch::invoke(Change::new(
                self.id,
                value.to_string(),
                Some(value.to_value()),
                None,
                Source::Set,
            ));
        }
        removed
    }

    pub fn clear(&self) {
        let members: Vec<T> = self.items.borrow().iter().cloned().collect();
        for value in members {
            self.discard(&value);
        }
    }

    /// Merge `other` in, decomposed into `add`/`discard` events over the
    /// symmetric difference (§4.B "update operations"): a value already
    /// present is discarded, a value not yet present is added — each
    /// raising its own event, same as calling `add`/`discard` by hand.
    pub fn update(&self, other: impl IntoIterator<Item = T>) {
        for value in other {
            if self.contains(&value) {
                self.discard(&value);
            } else {
                self.add(value);
            }
        }
    }
}

impl<T> Node for TrackedSet<T>
where
    T: Eq + Hash + Clone + ToString + Trackable,
{
    fn id(&self) -> NodeId {
        self.id
    }

    fn kind(&self) -> Kind {
        Kind::Set
    }

    fn type_name(&self) -> &'static str {
        "TrackedSet"
    }

    fn children(&self) -> Vec<(Key, Source, Rc<dyn Node>)> {
        self.items
            .borrow()
            .iter()
            .filter_map(|v| match v.as_node() {
                Some(n) => Some((Key::Name(v.to_string()), Source::Set, n)),
                None => {
                    crate::value::log_unsupported_child::<T>();
                    None
                }
            })
            .collect()
    }
}

impl<T> Trackable for TrackedSet<T>
where
    T: Eq + Hash + Clone + ToString + Trackable,
{
    fn to_value(&self) -> Value {
        Value::Node(self.id, self.type_name())
    }

    fn as_node(&self) -> Option<Rc<dyn Node>> {
        Some(Rc::new(self.clone()))
    }
}
