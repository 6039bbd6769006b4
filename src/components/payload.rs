//! Data carried between the orchestrator, the runtime and components.

use std::collections::BTreeMap;

/// Cross-component payload (a pending result or signal).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payload {
    /// Logical name of the payload (result code, signal action...).
    pub name: String,
    /// Opaque body.
    pub data: Vec<u8>,
}

impl Payload {
    /// Creates a payload.
    pub fn new(name: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            data: data.into(),
        }
    }
}

/// Saved instance state or persistent state blob (in-memory only).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SavedState {
    /// Opaque body.
    pub data: Vec<u8>,
}

impl SavedState {
    /// Creates a saved-state blob.
    pub fn new(data: impl Into<Vec<u8>>) -> Self {
        Self { data: data.into() }
    }
}

/// Configuration snapshot.
///
/// `seq` orders snapshots: a configuration is newer than another when its
/// `seq` is greater. Values are opaque key/value pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Configuration {
    /// Monotonic configuration sequence assigned by the orchestrator.
    pub seq: u64,
    /// Configuration entries.
    pub values: BTreeMap<String, String>,
}

impl Configuration {
    /// Creates an empty configuration with the given sequence.
    pub fn new(seq: u64) -> Self {
        Self {
            seq,
            values: BTreeMap::new(),
        }
    }

    /// Adds an entry.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    /// True if `self` should replace `current`.
    #[inline]
    pub fn is_newer_than(&self, current: Option<&Configuration>) -> bool {
        current.is_none_or(|c| self.seq > c.seq)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newer_configuration_wins_only_with_greater_seq() {
        let current = Configuration::new(4).with("locale", "en");
        assert!(Configuration::new(5).is_newer_than(Some(&current)));
        assert!(!Configuration::new(4).is_newer_than(Some(&current)));
        assert!(!Configuration::new(3).is_newer_than(Some(&current)));
        assert!(Configuration::new(0).is_newer_than(None));
    }
}
