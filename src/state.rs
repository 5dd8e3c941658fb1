use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use declarative::{Address, matches_target};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

// ============================================================================
// State Structures
// ============================================================================

/// Records the provider manages, keyed by address
///
/// Stored as JSON since tracked records carry explicit nulls for unset
/// optional attributes.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TrackedState {
    /// Last time the state was written
    pub last_updated: DateTime<Utc>,

    /// Last known record of every managed entity
    #[serde(default)]
    pub records: BTreeMap<Address, Value>,
}

impl Default for TrackedState {
    fn default() -> Self {
        Self {
            last_updated: Utc::now(),
            records: BTreeMap::new(),
        }
    }
}

impl TrackedState {
    /// Load state from disk, or return default if file doesn't exist
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("State file {} does not exist, starting empty", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read state file: {}", path.display()))?;

        let state: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse state file: {}", path.display()))?;

        log::debug!("Loaded {} records from {}", state.records.len(), path.display());
        Ok(state)
    }

    /// Save state to disk
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create state directory: {}", dir.display()))?;
        }

        let content =
            serde_json::to_string_pretty(self).context("Failed to serialize state to JSON")?;

        fs::write(path, content + "\n")
            .with_context(|| format!("Failed to write state file: {}", path.display()))?;

        log::debug!("Saved {} records to {}", self.records.len(), path.display());
        Ok(())
    }

    /// Update the last_updated timestamp and save
    pub fn touch(&mut self, path: &Path) -> Result<()> {
        self.last_updated = Utc::now();
        self.save(path)
    }

    /// Addresses matching an optional `type` or `type.name` target
    pub fn addresses<'a>(&'a self, target: Option<&'a str>) -> impl Iterator<Item = &'a Address> {
        self.records
            .keys()
            .filter(move |address| matches_target(address, target))
    }

    /// Stop tracking an address without touching the remote object
    pub fn forget(&mut self, address: &Address) -> Option<Value> {
        self.records.remove(address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn sample() -> TrackedState {
        let mut state = TrackedState::default();
        state.records.insert(
            Address::new("unleash_environment", "staging"),
            json!({"name": "staging", "type": "test"}),
        );
        state.records.insert(
            Address::new("unleash_user", "ada"),
            json!({"id": "7", "email": "ada@example.com", "password": null}),
        );
        state
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let state = TrackedState::load(&dir.path().join("none.json")).unwrap();
        assert!(state.records.is_empty());
    }

    #[test]
    fn test_save_and_load_keeps_nulls() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("unleash.state.json");

        sample().save(&path).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("\"unleash_user.ada\""));

        let loaded = TrackedState::load(&path).unwrap();
        assert_eq!(loaded.records.len(), 2);
        assert_eq!(
            loaded.records[&Address::new("unleash_user", "ada")]["password"],
            Value::Null
        );
    }

    #[test]
    fn test_corrupt_file_reports_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.json");
        fs::write(&path, "{ not json").unwrap();

        let err = TrackedState::load(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse state file"));
    }

    #[test]
    fn test_addresses_by_target() {
        let state = sample();
        assert_eq!(state.addresses(None).count(), 2);
        assert_eq!(state.addresses(Some("unleash_user")).count(), 1);
        assert_eq!(state.addresses(Some("unleash_user.grace")).count(), 0);
    }

    #[test]
    fn test_forget() {
        let mut state = sample();
        let address = Address::new("unleash_environment", "staging");
        assert!(state.forget(&address).is_some());
        assert!(state.forget(&address).is_none());
        assert_eq!(state.records.len(), 1);
    }
}
