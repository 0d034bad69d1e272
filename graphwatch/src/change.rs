use crate::identity::NodeId;
use crate::value::{Key, Source, Value};
use std::fmt;

/// A single mutation, as delivered to subscribers. See §3 "Change."
#[derive(Debug, Clone)]
pub struct Change {
    /// Identity of the object directly mutated (before any bubbling).
    pub target: NodeId,
    pub key: Key,
    pub old: Option<Value>,
    pub new: Option<Value>,
    pub source: Source,
}

impl Change {
    pub fn new(
        target: NodeId,
        key: impl Into<Key>,
        old: Option<Value>,
        new: Option<Value>,
        source: Source,
    ) -> Self {
        Self {
            target,
            key: key.into(),
            old,
            new,
            source,
        }
    }
}

/// Preserved bit-for-bit from the source's `__repr__`, per §6's explicit
/// compatibility requirement.
impl fmt::Display for Change {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let old = self.old.as_ref().map(Value::to_string).unwrap_or_else(|| "None".into());
        let new = self.new.as_ref().map(Value::to_string).unwrap_or_else(|| "None".into());
        write!(f, "\u{26a1} {}: {} \u{2192} {}", self.key, old, new)
    }
}
