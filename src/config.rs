//! Builder-style configuration for collections and persisted containers.

use crate::collection::Enforcement;
use crate::error::{Error, Result};
use crate::persistence::header::DEFAULT_CONTAINER_SIGNATURE;

/// Configures a [`crate::collection::Collection`] before first use: its initial
/// capacity reservation and its sorting enforcement policy.
#[derive(Clone, Copy, Debug)]
pub struct CollectionSettings {
    initial_capacity: usize,
    enforcement: Enforcement,
}

impl CollectionSettings {
    /// Starts from the defaults: no reserved capacity, [`Enforcement::ThrowIfWrong`].
    pub fn new() -> Self {
        CollectionSettings { initial_capacity: 0, enforcement: Enforcement::default() }
    }

    /// Sets the number of records to reserve capacity for up front.
    pub fn initial_capacity(mut self, records: usize) -> Self {
        self.initial_capacity = records;
        self
    }

    /// Sets the sorting enforcement policy the built collection will start with.
    pub fn enforcement(mut self, enforcement: Enforcement) -> Self {
        self.enforcement = enforcement;
        self
    }

    /// The configured initial capacity.
    pub fn configured_initial_capacity(&self) -> usize {
        self.initial_capacity
    }

    /// The configured enforcement policy.
    pub fn configured_enforcement(&self) -> Enforcement {
        self.enforcement
    }
}

impl Default for CollectionSettings {
    fn default() -> Self {
        Self::new()
    }
}

/// Configures the container signature used when writing a persisted container.
#[derive(Clone, Debug)]
pub struct ContainerSettings {
    signature: String,
}

impl ContainerSettings {
    /// Starts from the default signature, [`DEFAULT_CONTAINER_SIGNATURE`].
    pub fn new() -> Self {
        ContainerSettings { signature: DEFAULT_CONTAINER_SIGNATURE.to_string() }
    }

    /// Overrides the container signature.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSignature`] if `signature` is not exactly 20 bytes.
    pub fn signature(mut self, signature: &str) -> Result<Self> {
        if signature.len() != 20 {
            return Err(Error::InvalidSignature {
                reason: format!("container signature must be exactly 20 bytes, got {}", signature.len()),
            });
        }
        self.signature = signature.to_string();
        Ok(self)
    }

    /// The configured signature.
    pub fn configured_signature(&self) -> &str {
        &self.signature
    }
}

impl Default for ContainerSettings {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collection_settings_defaults() {
        let settings = CollectionSettings::new();
        assert_eq!(0, settings.configured_initial_capacity());
        assert_eq!(Enforcement::ThrowIfWrong, settings.configured_enforcement());
    }

    #[test]
    fn collection_settings_builder() {
        let settings = CollectionSettings::new().initial_capacity(100).enforcement(Enforcement::NotRequired);
        assert_eq!(100, settings.configured_initial_capacity());
        assert_eq!(Enforcement::NotRequired, settings.configured_enforcement());
    }

    #[test]
    fn container_settings_default_signature() {
        let settings = ContainerSettings::new();
        assert_eq!(DEFAULT_CONTAINER_SIGNATURE, settings.configured_signature());
    }

    #[test]
    fn container_settings_rejects_wrong_length_signature() {
        assert!(ContainerSettings::new().signature("too-short").is_err());
    }

    #[test]
    fn container_settings_accepts_twenty_byte_signature() {
        let settings = ContainerSettings::new().signature("MyCustomSignature20").unwrap();
        assert_eq!("MyCustomSignature20", settings.configured_signature());
    }
}
