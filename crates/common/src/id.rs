//! ID generation utilities.

use std::sync::{Mutex, PoisonError};

use once_cell::sync::Lazy;
use ulid::{Generator, Ulid};
use uuid::Uuid;

/// Process-wide monotonic ULID source.
static GENERATOR: Lazy<Mutex<Generator>> = Lazy::new(|| Mutex::new(Generator::new()));

/// ID generator for entities.
#[derive(Debug, Clone, Default)]
pub struct IdGenerator {
    _private: (),
}

impl IdGenerator {
    /// Create a new ID generator.
    #[must_use]
    pub const fn new() -> Self {
        Self { _private: () }
    }

    /// Generate a new ULID-based ID.
    ///
    /// IDs are lowercase ULIDs drawn from a shared monotonic generator, so
    /// sorting by ID matches creation order within this process, even for IDs
    /// minted in the same millisecond.
    #[must_use]
    pub fn generate(&self) -> String {
        let next = GENERATOR
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .generate()
            // Random component overflowed within one millisecond.
            .unwrap_or_else(|_| Ulid::new());
        next.to_string().to_lowercase()
    }

    /// Generate an opaque access token.
    #[must_use]
    pub fn generate_token(&self) -> String {
        // Use UUID v4 for tokens (no time component for security)
        Uuid::new_v4().simple().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_ulid() {
        let id_gen = IdGenerator::new();
        let id1 = id_gen.generate();
        let id2 = id_gen.generate();

        assert_eq!(id1.len(), 26);
        assert_eq!(id2.len(), 26);
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_ids_sort_in_creation_order() {
        let id_gen = IdGenerator::new();
        let ids: Vec<String> = (0..500).map(|_| id_gen.generate()).collect();

        let mut sorted = ids.clone();
        sorted.sort();
        assert_eq!(ids, sorted);
    }

    #[test]
    fn test_generate_token() {
        let id_gen = IdGenerator::new();
        let token = id_gen.generate_token();

        assert_eq!(token.len(), 32); // Simple UUID without hyphens
    }
}
