//! Keyed accumulator for entities spread over several catalog rows.

use std::collections::HashMap;

use crate::error::Result;

/// Maps a catalog key (index or constraint name) to the name of the entity
/// registered for it during the current phase.
///
/// The first row for a key creates the entity; later rows only append to it.
/// One accumulator lives for one table's phase and is then dropped.
#[derive(Debug, Default)]
pub struct KeyedAccumulator {
    entries: HashMap<String, String>,
}

impl KeyedAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the entity registered for `key`, calling `create` to register
    /// it on first sight.
    pub fn resolve<F>(&mut self, key: &str, create: F) -> Result<String>
    where
        F: FnOnce() -> Result<String>,
    {
        if let Some(existing) = self.entries.get(key) {
            return Ok(existing.clone());
        }
        let created = create()?;
        self.entries.insert(key.to_string(), created.clone());
        Ok(created)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ReverseError;

    #[test]
    fn test_creates_once_per_key() {
        let mut acc = KeyedAccumulator::new();
        let mut created = 0;
        for key in ["ix_a", "ix_a", "ix_b", "ix_a"] {
            acc.resolve(key, || {
                created += 1;
                Ok(format!("{}!", key))
            })
            .unwrap();
        }
        assert_eq!(created, 2);
        assert_eq!(acc.len(), 2);
        assert_eq!(acc.resolve("ix_a", || Ok("other".into())).unwrap(), "ix_a!");
    }

    #[test]
    fn test_failed_create_is_not_remembered() {
        let mut acc = KeyedAccumulator::new();
        assert!(acc
            .resolve("fk", || Err(ReverseError::integrity("boom")))
            .is_err());
        assert!(acc.is_empty());
    }
}
