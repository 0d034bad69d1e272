//! Deep reactive observation over in-memory object graphs.
//!
//! Wrap a value's mutable containers in [`TrackedVec`], [`TrackedMap`], or
//! [`TrackedSet`], derive [`Record`] on its structs, and call
//! [`Reactive::reactive`] on the root. From then on, every write anywhere in
//! the graph raises a [`Change`] that bubbles to every ancestor with a
//! path composed per the object's shape, and [`on`]/[`receiver`] subscribe
//! to it with a glob, regex, or index filter.
//!
//! ```
//! use graphwatch::{Reactive, container::TrackedVec};
//! use std::rc::Rc;
//!
//! let numbers: Rc<TrackedVec<i32>> = Rc::new(TrackedVec::new()).reactive();
//! graphwatch::receiver(numbers.as_ref(), "*", false, |change| {
//!     println!("{change}");
//! })
//! .unwrap();
//! numbers.push(7);
//! ```

pub mod activate;
pub mod change;
pub mod container;
pub mod dispatch;
pub mod error;
mod facade;
pub mod filter;
pub mod identity;
pub mod node;
pub mod path;
pub mod record;
pub mod registry;
pub mod value;

pub use change::Change;
pub use container::{TrackedMap, TrackedSet, TrackedVec};
pub use dispatch::{configure, Config};
pub use error::{Error, Result};
pub use facade::{detach, on, receiver, Reactive};
pub use graphwatch_derive::Record;
pub use identity::NodeId;
pub use node::{BackRef, Kind, Node};
pub use record::Tracked;
pub use value::{Key, Source, Trackable, Value};

// `Record` names both the trait (type namespace) and the derive macro
// (macro namespace); they don't collide, so both are re-exported as `Record`.
pub use record::Record;
