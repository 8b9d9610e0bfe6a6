//! Event registry for a single parse session
//!
//! The `events:` header declares which measurement each column of a cost
//! line holds (e.g. `Time Memory`, or `Ir Dr Dw` for cachegrind). Every
//! cost vector in the dump is indexed by this order.
//!
//! A registry belongs to exactly one parse session, so two dumps with
//! different event orderings can be parsed side by side.

use crate::error::{GraphError, Result};
use serde::{Deserialize, Serialize};

/// Ordered list of event names declared by a profile
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRegistry {
    names: Vec<String>,
}

impl EventRegistry {
    /// Create an empty registry (no `events:` line seen yet)
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the event order with the whitespace-separated names in `payload`
    pub fn declare(&mut self, payload: &str) {
        self.names = payload.split_whitespace().map(str::to_string).collect();
    }

    /// Position of `name` in the declared order
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    /// Like [`index_of`](Self::index_of), but reports a missing event as an error
    pub fn require(&self, name: &str) -> Result<usize> {
        self.index_of(name).ok_or_else(|| GraphError::UnknownEvent {
            name: name.to_string(),
        })
    }

    /// Declared event names in column order
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declare_and_lookup() {
        let mut events = EventRegistry::new();
        events.declare("Time Memory");

        assert_eq!(events.len(), 2);
        assert_eq!(events.index_of("Time"), Some(0));
        assert_eq!(events.index_of("Memory"), Some(1));
        assert_eq!(events.index_of("Ir"), None);
    }

    #[test]
    fn test_declare_tolerates_extra_whitespace() {
        let mut events = EventRegistry::new();
        events.declare("  Ir   Dr\tDw ");
        assert_eq!(events.names(), &["Ir", "Dr", "Dw"]);
    }

    #[test]
    fn test_redeclare_replaces_order() {
        let mut events = EventRegistry::new();
        events.declare("Time Memory");
        events.declare("Memory Time");
        assert_eq!(events.index_of("Time"), Some(1));
    }

    #[test]
    fn test_require_unknown_event() {
        let events = EventRegistry::new();
        let err = events.require("Time").unwrap_err();
        assert!(matches!(err, GraphError::UnknownEvent { ref name } if name == "Time"));
    }

    #[test]
    fn test_sessions_are_independent() {
        let mut a = EventRegistry::new();
        let mut b = EventRegistry::new();
        a.declare("Time Memory");
        b.declare("Ir");

        assert_eq!(a.index_of("Ir"), None);
        assert_eq!(b.index_of("Ir"), Some(0));
        assert!(!a.is_empty());
    }
}
