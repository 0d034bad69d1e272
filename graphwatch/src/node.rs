//! The object-safe seam the activation engine recurses through. Every
//! tracked container wrapper and every `#[derive(Record)]` type implements
//! [`Node`] so `activate`/`deactivate` can walk a heterogeneous graph without
//! knowing concrete element types.

use crate::identity::NodeId;
use crate::value::{Key, Source};
use std::rc::Rc;

/// What kind of container a node is, in the priority order §4.A classifies
/// by: sequence before set before mapping before record before leaf (leaves
/// never implement `Node` at all, so there is no `Kind::Leaf`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Sequence,
    Set,
    Mapping,
    Record,
}

/// A directed link child → parent: `parent` references this node under
/// `name`, via `source`. Equality and hashing are by identity (`NodeId`),
/// never by the names/values the nodes carry — see §3 "Equality and hashing
/// of a BackRef use identity, not value equality."
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BackRef {
    pub parent: Option<NodeId>,
    pub child: NodeId,
    pub name: Key,
    pub source: Source,
}

impl BackRef {
    pub fn new(parent: Option<NodeId>, child: NodeId, name: Key, source: Source) -> Self {
        Self {
            parent,
            child,
            name,
            source,
        }
    }
}

/// Implemented by every tracked wrapper (`TrackedVec`, `TrackedMap`,
/// `TrackedSet`, `Tracked<R>`). Gives the activation engine identity,
/// classification, and a way to enumerate trackable children without
/// generics leaking into `activate`/`deactivate`.
pub trait Node: 'static {
    fn id(&self) -> NodeId;
    fn kind(&self) -> Kind;
    fn type_name(&self) -> &'static str;

    /// Children that are themselves tracked nodes, with the key/source under
    /// which this node references them. Leaf elements are omitted: they
    /// still raise `Change` events on write, they just never recurse.
    fn children(&self) -> Vec<(Key, Source, Rc<dyn Node>)>;
}
