//! The public entry points: making a value reactive, subscribing, detaching,
//! and the `receiver` decorator-equivalent. See §6.

use crate::activate;
use crate::error::Error;
use crate::filter::Filter;
use crate::node::Node;
use crate::registry;
use std::rc::Rc;

/// Marks a tracked wrapper (`TrackedVec`, `TrackedMap`, `TrackedSet`, or a
/// `#[derive(Record)]` type behind `Tracked<T>`) as something `reactive()`
/// can activate. Implemented for every `Rc<dyn Node>`-convertible wrapper
/// via a blanket impl, so callers never implement it by hand.
pub trait Reactive: Node {
    /// Activate this value and, recursively, every trackable value it
    /// reaches, as a root (no parent). Idempotent: re-activating an already
    /// active value adds no duplicate back-references (§3 I2).
    fn reactive(self: Rc<Self>) -> Rc<Self>
    where
        Self: Sized,
    {
        let node: Rc<dyn Node> = self.clone();
        activate::activate_root(&node);
        self
    }
}

impl<T: Node + ?Sized> Reactive for T {}

/// Subscribe `callback` to changes on `target` matching `pattern`. Fails
/// with [`Error::NotTracked`] if `target` has never been activated.
///
/// `regex = true` compiles `pattern` as a prefix-anchored regular
/// expression; otherwise it is a shell glob, unless it is a bare integer, in
/// which case it matches only that `Item`/`Index` key (§4.E).
pub fn on(
    target: &dyn Node,
    pattern: &str,
    regex: bool,
    callback: impl FnMut(&crate::change::Change) + 'static,
) -> Result<(), Error> {
    let filter = Filter::new(pattern, regex)?;
    registry::subscribe(target.id(), filter, Box::new(callback))
}

/// The decorator-named spelling of `on` (§4.H/§6: "`receiver(obj, pattern,
/// regex)` — decorator form of `on`"). The Python source returns an adapter
/// you apply to a handler function so it can double as a `@receiver(...)`
/// decorator; Rust has no decorator syntax and every caller here already
/// passes the callback directly, so `receiver` takes the identical
/// `(pattern, regex, callback)` arguments as `on` and performs the same
/// subscription — the two names exist for parity with the source's two
/// call sites, not for two different behaviors.
pub fn receiver(
    target: &dyn Node,
    pattern: &str,
    regex: bool,
    callback: impl FnMut(&crate::change::Change) + 'static,
) -> Result<(), Error> {
    on(target, pattern, regex, callback)
}

/// Remove every back-reference `target` holds or is held by, recursively.
/// After `detach`, `target` (and anything only reachable through it) raises
/// no further `Change` events and may be dropped. See §4.F, §5.
pub fn detach(target: &Rc<dyn Node>) {
    activate::detach(target);
}
