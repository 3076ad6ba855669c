//! Type-safe identifier for interactions.
//!
//! Interaction ids must be collision-free across replicas because they are
//! the deduplication key for log ingestion. UUID v7 (time-ordered) keeps
//! them unique without coordination.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Globally unique identifier for an [`Interaction`].
///
/// [`Interaction`]: crate::interaction::Interaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct InteractionId(pub Uuid);

impl InteractionId {
    /// Create a new identifier using UUID v7 (time-ordered).
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Return the inner [`Uuid`] value.
    pub const fn into_inner(self) -> Uuid {
        self.0
    }
}

impl Default for InteractionId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for InteractionId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for InteractionId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl From<InteractionId> for Uuid {
    fn from(id: InteractionId) -> Self {
        id.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique() {
        let a = InteractionId::new();
        let b = InteractionId::new();
        assert_ne!(a, b);
        assert_ne!(a.into_inner(), Uuid::nil());
    }

    #[test]
    fn serde_round_trip() {
        let id = InteractionId::new();
        let json = serde_json::to_string(&id).unwrap();
        let back: InteractionId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, back);
    }
}
