//! The process-wide mapping from a concrete collection type to its persister
//! signature.

use crate::error::{Error, Result};
use crate::persistence::header::normalize_signature;
use crate::record::Record;
use log::debug;
use once_cell::sync::Lazy;
use std::any::TypeId;
use std::collections::HashMap;
use std::sync::RwLock;

struct RegisteredPersister {
    signature: String,
    type_name: &'static str,
}

/// Maps each registered collection's concrete record type to the signature its
/// persister is identified by on the wire.
///
/// Registration is expected at process start; after that, lookups are read-only
/// and safe for concurrent access. For test isolation, build a private instance
/// with [`PersisterRegistry::new`] instead of using [`PersisterRegistry::global`].
pub struct PersisterRegistry {
    entries: HashMap<TypeId, RegisteredPersister>,
}

impl PersisterRegistry {
    /// Creates an empty registry, independent of the process-wide singleton.
    pub fn new() -> Self {
        PersisterRegistry { entries: HashMap::new() }
    }

    /// The process-wide singleton registry.
    pub fn global() -> &'static RwLock<PersisterRegistry> {
        static GLOBAL: Lazy<RwLock<PersisterRegistry>> = Lazy::new(|| RwLock::new(PersisterRegistry::new()));
        &GLOBAL
    }

    /// Registers `R`'s persister signature, derived from [`Record::TYPE_NAME`].
    ///
    /// Re-registering the same type replaces its prior entry. Registering a
    /// different type whose signature is case-insensitively equal to an
    /// already-registered signature fails.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConflictingPersister`] on a signature collision with a
    /// different type, or [`Error::InvalidSignature`] if the derived signature
    /// somehow exceeds 20 bytes (not possible for `TYPE_NAME`s under 20 ASCII
    /// characters, which is true of every variant this crate ships).
    pub fn register<R: Record + 'static>(&mut self) -> Result<()> {
        let signature = persister_signature::<R>()?;
        let type_id = TypeId::of::<R>();
        if let Some((conflicting_type, _)) =
            self.entries.iter().find(|(id, entry)| **id != type_id && entry.signature.eq_ignore_ascii_case(&signature))
        {
            let _ = conflicting_type;
            return Err(Error::ConflictingPersister { signature });
        }
        if self.entries.contains_key(&type_id) {
            debug!("replacing persister registration for {}", std::any::type_name::<R>());
        } else {
            debug!("registering persister for {} as {signature:?}", std::any::type_name::<R>());
        }
        self.entries.insert(type_id, RegisteredPersister { signature, type_name: std::any::type_name::<R>() });
        Ok(())
    }

    /// Whether `R` currently has a registered persister.
    pub fn is_registered<R: Record + 'static>(&self) -> bool {
        self.entries.contains_key(&TypeId::of::<R>())
    }

    /// The signature registered for `R`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoPersister`] if `R` has no registered persister.
    pub fn signature_for<R: Record + 'static>(&self) -> Result<String> {
        self.entries
            .get(&TypeId::of::<R>())
            .map(|entry| entry.signature.clone())
            .ok_or(Error::NoPersister { type_name: std::any::type_name::<R>() })
    }
}

impl Default for PersisterRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Derives the 20-byte-padded persister signature for `R` from its `TYPE_NAME`.
pub(crate) fn persister_signature<R: Record>() -> Result<String> {
    let padded = normalize_signature(R::TYPE_NAME)?;
    Ok(String::from_utf8_lossy(&padded).trim_end().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{Measurement, Point, Stay};

    #[test]
    fn register_and_lookup() {
        let mut registry = PersisterRegistry::new();
        assert!(!registry.is_registered::<Point>());
        registry.register::<Point>().unwrap();
        assert!(registry.is_registered::<Point>());
        assert_eq!("Point", registry.signature_for::<Point>().unwrap());
    }

    #[test]
    fn unregistered_type_reports_no_persister() {
        let registry = PersisterRegistry::new();
        assert!(matches!(registry.signature_for::<Point>(), Err(Error::NoPersister { .. })));
    }

    #[test]
    fn reregistering_same_type_replaces_entry() {
        let mut registry = PersisterRegistry::new();
        registry.register::<Point>().unwrap();
        registry.register::<Point>().unwrap();
        assert_eq!("Point", registry.signature_for::<Point>().unwrap());
    }

    #[test]
    fn distinct_types_register_independently() {
        let mut registry = PersisterRegistry::new();
        registry.register::<Point>().unwrap();
        registry.register::<Measurement>().unwrap();
        registry.register::<Stay>().unwrap();
        assert_eq!("Measurement", registry.signature_for::<Measurement>().unwrap());
        assert_eq!("Stay", registry.signature_for::<Stay>().unwrap());
    }

    #[test]
    fn global_registry_is_reachable_and_lockable() {
        let registry = PersisterRegistry::global();
        let mut guard = registry.write().unwrap();
        guard.register::<Point>().unwrap();
        assert!(guard.is_registered::<Point>());
    }
}
