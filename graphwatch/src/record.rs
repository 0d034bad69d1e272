//! The generic tracked wrapper for `#[derive(Record)]` types. See §4.A
//! "Record", §4.B.
//!
//! `Tracked<R>` is defined once, here, and never per type: `Node`/`Trackable`
//! for it are blanket impls over any `R: Record`. `graphwatch-derive` only
//! implements [`Record`] for the annotated struct and a small per-struct
//! field-accessor trait it also generates, which sidesteps the orphan rule
//! (a foreign trait cannot be implemented for `Tracked<LocalType>` from a
//! downstream crate, but a macro-generated *local* trait can).

use crate::identity::NodeId;
use crate::node::{Kind, Node};
use crate::value::{Key, Source, Trackable, Value};
use std::cell::{Ref, RefCell, RefMut};
use std::rc::Rc;

/// Implemented by `#[derive(Record)]` types. `record_children` enumerates
/// this record's trackable fields, keyed by field name, for the activation
/// engine — see §4.F.
pub trait Record: 'static {
    fn record_type_name() -> &'static str;
    fn record_children(&self) -> Vec<(Key, Source, Rc<dyn Node>)>;
}

/// A record type wrapped for tracking: identity plus shared, interior-mutable
/// storage. Field access goes through the getters/setters the derive macro
/// generates on `Tracked<R>`, never through `inner` directly.
pub struct Tracked<R> {
    id: NodeId,
    inner: Rc<RefCell<R>>,
}

impl<R> Clone for Tracked<R> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            inner: self.inner.clone(),
        }
    }
}

impl<R: Record> Tracked<R> {
    pub fn new(value: R) -> Self {
        Self {
            id: NodeId::next(),
            inner: Rc::new(RefCell::new(value)),
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    #[doc(hidden)]
    pub fn borrow(&self) -> Ref<'_, R> {
        self.inner.borrow()
    }

    #[doc(hidden)]
    pub fn borrow_mut(&self) -> RefMut<'_, R> {
        self.inner.borrow_mut()
    }
}

/// A snapshot of a tracked record's current field values, detached from
/// tracking: mutating the clone raises no `Change` and is invisible to the
/// original's subscribers. Used to realize `deepcopy`/snapshot semantics
/// (§9 "Supplemented features").
impl<R: Record + Clone> Tracked<R> {
    pub fn snapshot(&self) -> R {
        self.inner.borrow().clone()
    }
}

impl<R: Record> Node for Tracked<R> {
    fn id(&self) -> NodeId {
        Tracked::id(self)
    }

    fn kind(&self) -> Kind {
        Kind::Record
    }

    fn type_name(&self) -> &'static str {
        R::record_type_name()
    }

    fn children(&self) -> Vec<(Key, Source, Rc<dyn Node>)> {
        self.inner.borrow().record_children()
    }
}

impl<R: Record> Trackable for Tracked<R> {
    fn to_value(&self) -> Value {
        Value::Node(Tracked::id(self), R::record_type_name())
    }

    fn as_node(&self) -> Option<Rc<dyn Node>> {
        Some(Rc::new(self.clone()))
    }
}
