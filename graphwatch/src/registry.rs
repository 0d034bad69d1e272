//! The process-wide (here: thread-local) back-reference and callback table
//! keyed by node identity. See §4.C.
//!
//! A `thread_local!` rather than a global `static Mutex` realizes §5's
//! "MUST NOT be accessed from multiple concurrent execution contexts without
//! external synchronization": callbacks are `FnMut` and not `Send`, so a
//! cross-thread registry would need unsafe or a lock either way. Scoping it
//! per-thread makes the single-threaded assumption a compile-time fact.

use crate::change::Change;
use crate::error::Error;
use crate::filter::Filter;
use crate::identity::NodeId;
use crate::node::BackRef;
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

type Callback = Box<dyn FnMut(&Change)>;

#[derive(Default)]
struct Entry {
    backrefs: HashSet<BackRef>,
    callbacks: Vec<(Filter, Callback)>,
}

impl Entry {
    fn is_empty(&self) -> bool {
        self.backrefs.is_empty() && self.callbacks.is_empty()
    }
}

thread_local! {
    static REGISTRY: RefCell<HashMap<NodeId, Entry>> = RefCell::new(HashMap::new());
}

/// Register a back-reference on `child`'s entry, creating the entry if it
/// does not already exist. Idempotent: re-adding an equal `BackRef` does not
/// duplicate it (§3 I2, "Activation is idempotent").
pub(crate) fn add_backref(child: NodeId, backref: BackRef) {
    REGISTRY.with(|r| {
        r.borrow_mut().entry(child).or_default().backrefs.insert(backref);
    });
}

/// Remove a back-reference from `child`'s entry. If the entry becomes empty
/// (no backrefs, no callbacks) it is purged, per I3.
pub(crate) fn del_backref(child: NodeId, backref: &BackRef) {
    REGISTRY.with(|r| {
        let mut reg = r.borrow_mut();
        if let Some(entry) = reg.get_mut(&child) {
            entry.backrefs.remove(backref);
            if entry.is_empty() {
                reg.remove(&child);
            }
        }
    });
}

/// Remove every back-reference whose `parent` is `id` — used by `detach` to
/// sever everything a subtree referenced, regardless of which child holds it.
pub(crate) fn remove_backrefs_from_parent(parent: NodeId) {
    REGISTRY.with(|r| {
        let mut reg = r.borrow_mut();
        let mut empty = Vec::new();
        for (&child, entry) in reg.iter_mut() {
            entry.backrefs.retain(|br| br.parent != Some(parent));
            if entry.is_empty() {
                empty.push(child);
            }
        }
        for id in empty {
            reg.remove(&id);
        }
    });
}

/// Remove `id`'s entire entry (backrefs and callbacks) outright.
pub(crate) fn purge(id: NodeId) {
    REGISTRY.with(|r| {
        r.borrow_mut().remove(&id);
    });
}

pub fn is_tracked(id: NodeId) -> bool {
    REGISTRY.with(|r| r.borrow().contains_key(&id))
}

pub(crate) fn backrefs_of(id: NodeId) -> Vec<BackRef> {
    REGISTRY.with(|r| {
        r.borrow()
            .get(&id)
            .map(|e| e.backrefs.iter().cloned().collect())
            .unwrap_or_default()
    })
}

/// Append a callback to `obj`'s entry. Fails with `NotTracked` if `obj` has
/// no entry yet (§4.C `subscribe`).
pub(crate) fn subscribe(
    id: NodeId,
    filter: Filter,
    callback: Callback,
) -> Result<(), Error> {
    REGISTRY.with(|r| {
        let mut reg = r.borrow_mut();
        let entry = reg.get_mut(&id).ok_or(Error::NotTracked)?;
        entry.callbacks.push((filter, callback));
        Ok(())
    })
}

/// Invoke every callback on `id`'s entry whose filter matches `change`, in
/// registration order. Panics from a callback are caught and logged, never
/// propagated — subsequent callbacks still run (§4.G, §7 `CallbackError`).
pub(crate) fn invoke_callbacks(id: NodeId, change: &Change) {
    // Callbacks are temporarily removed from the table while running so a
    // callback that mutates the graph (and re-enters dispatch) cannot
    // observe or re-borrow its own still-running entry.
    let mut callbacks = REGISTRY.with(|r| {
        r.borrow_mut()
            .get_mut(&id)
            .map(|e| std::mem::take(&mut e.callbacks))
            .unwrap_or_default()
    });

    for (index, (filter, cb)) in callbacks.iter_mut().enumerate() {
        if !filter.matches(change) {
            continue;
        }
        tracing::debug!(target = %id, callback = index, "invoking callback");
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| cb(change)));
        if result.is_err() {
            tracing::error!(target = %id, callback = index, "callback panicked; swallowed");
        }
    }

    REGISTRY.with(|r| {
        if let Some(entry) = r.borrow_mut().get_mut(&id) {
            entry.callbacks.append(&mut callbacks);
        }
    });
}

#[cfg(test)]
pub(crate) fn reset_for_tests() {
    REGISTRY.with(|r| r.borrow_mut().clear());
}
