//! Sequence container, tracked by index. See §4.A "Sequence", §4.B.

use crate::activate;
use crate::change::Change;
use crate::dispatch;
use crate::identity::NodeId;
use crate::node::{Kind, Node};
use crate::registry;
use crate::value::{Key, Source, Trackable, Value};
use std::cell::RefCell;
use std::rc::Rc;

/// A `Vec<T>` whose structural mutations (`push`, `insert`, `remove`, ...)
/// raise `Change` events and re-home child back-references when this
/// sequence is itself tracked.
pub struct TrackedVec<T> {
    id: NodeId,
    items: Rc<RefCell<Vec<T>>>,
}

impl<T> Clone for TrackedVec<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            items: self.items.clone(),
        }
    }
}

impl<T: Trackable> Default for TrackedVec<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Trackable> TrackedVec<T> {
    pub fn new() -> Self {
        Self {
            id: NodeId::next(),
            items: Rc::new(RefCell::new(Vec::new())),
        }
    }

    pub fn from_vec(items: Vec<T>) -> Self {
        Self {
            id: NodeId::next(),
            items: Rc::new(RefCell::new(items)),
        }
    }

    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }

    fn tracked(&self) -> bool {
        registry::is_tracked(self.id)
    }

    fn activate_at(&self, index: usize) {
        if let Some(node) = self.items.borrow()[index].as_node() {
            activate::activate(
                &node,
                Key::Index(index),
                Some(self.id),
                Source::Item,
                &mut std::collections::HashSet::new(),
            );
        }
    }

    fn deactivate_at(&self, index: usize, value: &T) {
        if let Some(node) = value.as_node() {
            activate::deactivate(&node, Key::Index(index), Some(self.id), Source::Item);
        }
    }

    /// Deactivate every element from `from` onward at its *current* index.
    /// Must be called before a structural shift (insert/remove), while each
    /// element's index still matches the `BackRef` installed for it —
    /// calling this after the shift would deactivate at the *new* index,
    /// which matches no installed `BackRef` and leaves the stale one behind.
    fn deactivate_range_from(&self, from: usize) {
        if !self.tracked() {
            return;
        }
        let len = self.items.borrow().len();
        for i in from..len {
            let item = self.items.borrow();
            self.deactivate_at(i, &item[i]);
        }
    }

    /// Reactivate every element from `from` onward at its *current* (i.e.
    /// post-shift) index. Must be called after a structural shift, pairing
    /// with `deactivate_range_from` called before it.
    fn activate_range_from(&self, from: usize) {
        if !self.tracked() {
            return;
        }
        let len = self.items.borrow().len();
        for i in from..len {
            self.activate_at(i);
        }
    }

    pub fn get(&self, index: usize) -> Option<T>
    where
        T: Clone,
    {
        self.items.borrow().get(index).cloned()
    }

    /// Append to the end. Does not shift any existing index.
    pub fn push(&self, value: T) {
        let index = self.items.borrow().len();
        self.items.borrow_mut().push(value);
        if self.tracked() {
            self.activate_at(index);
            dispatch::invoke(Change::new(
                self.id,
                index,
                None,
                Some(self.items.borrow()[index].to_value()),
                Source::Item,
            ));
        }
    }

    /// Remove and return the last element, if any.
    pub fn pop(&self) -> Option<T> {
        let removed = self.items.borrow_mut().pop()?;
        if self.tracked() {
            let index = self.items.borrow().len();
            self.deactivate_at(index, &removed);
            dispatch::invoke(Change::new(
                self.id,
                index,
                Some(removed.to_value()),
                None,
                Source::Item,
            ));
        }
        Some(removed)
    }

    /// Replace the element at `index` in place. Panics if out of bounds, to
    /// match `Vec`'s own indexing behavior.
    pub fn set(&self, index: usize, value: T) {
        let old = {
            let mut items = self.items.borrow_mut();
            std::mem::replace(&mut items[index], value)
        };
        if self.tracked() {
            self.deactivate_at(index, &old);
            self.activate_at(index);
            dispatch::invoke(Change::new(
                self.id,
                index,
                Some(old.to_value()),
                Some(self.items.borrow()[index].to_value()),
                Source::Item,
            ));
        }
    }

    /// Insert at `index`, shifting everything at or after it up by one.
    pub fn insert(&self, index: usize, value: T) {
        // Every element from `index` onward is about to move up by one, so
        // its current BackRef (keyed by its pre-shift index) must come down
        // before the shift, and go back up keyed by its post-shift index
        // afterward — including the newly inserted element itself.
        self.deactivate_range_from(index);
        self.items.borrow_mut().insert(index, value);
        if self.tracked() {
            dispatch::invoke(Change::new(
                self.id,
                index,
                None,
                Some(self.items.borrow()[index].to_value()),
                Source::Item,
            ));
        }
        self.activate_range_from(index);
    }

    /// Remove the element at `index`, shifting everything after it down by
    /// one.
    pub fn remove(&self, index: usize) -> T {
        // Deactivate the removed element and everything that will shift
        // down, all at their pre-shift indices, before mutating.
        self.deactivate_range_from(index);
        let removed = self.items.borrow_mut().remove(index);
        if self.tracked() {
            dispatch::invoke(Change::new(
                self.id,
                index,
                Some(removed.to_value()),
                None,
                Source::Item,
            ));
        }
        self.activate_range_from(index);
        removed
    }

    /// Replace the elements in `range` with `replacement` — "slice
    /// assignment" (§4.B), normalized as a deletion burst over the range
    /// (highest index first) followed by an insertion burst at `range.start`
    /// (§9 Q2's bulk-operation ordering), each element raising its own event
    /// via the existing `remove`/`insert`.
    pub fn splice(&self, range: std::ops::Range<usize>, replacement: impl IntoIterator<Item = T>) {
        for i in range.clone().rev() {
            self.remove(i);
        }
        for (index, value) in (range.start..).zip(replacement) {
            self.insert(index, value);
        }
    }

    /// Remove every element. Per §4.D/Q2, a bulk clear removes from the
    /// highest index down so no reindexing race is observable mid-operation.
    pub fn clear(&self) {
        let len = self.items.borrow().len();
        for i in (0..len).rev() {
            self.remove(i);
        }
    }

    /// Append every item of `iter`, in order (§9 Q2: low-to-high insert
    /// order for bulk operations).
    pub fn extend(&self, iter: impl IntoIterator<Item = T>) {
        for value in iter {
            self.push(value);
        }
    }
}

impl<T: Trackable> Node for TrackedVec<T> {
    fn id(&self) -> NodeId {
        self.id
    }

    fn kind(&self) -> Kind {
        Kind::Sequence
    }

    fn type_name(&self) -> &'static str {
        "TrackedVec"
    }

    fn children(&self) -> Vec<(Key, Source, Rc<dyn Node>)> {
        self.items
            .borrow()
            .iter()
            .enumerate()
            .filter_map(|(i, v)| match v.as_node() {
                Some(n) => Some((Key::Index(i), Source::Item, n)),
                None => {
                    crate::value::log_unsupported_child::<T>();
                    None
                }
            })
            .collect()
    }
}

impl<T: Trackable> Trackable for TrackedVec<T> {
    fn to_value(&self) -> Value {
        Value::Node(self.id, self.type_name())
    }

    fn as_node(&self) -> Option<Rc<dyn Node>> {
        Some(Rc::new(self.clone()))
    }
}
