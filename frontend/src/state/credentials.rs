use serde::{Deserialize, Serialize};

use crate::api::UserProfile;
use crate::utils::storage as storage_utils;

/// Durable per-origin key holding the persisted credential snapshot. Other
/// tabs read this back when adopting a broadcasted login, so the key name is
/// part of the cross-tab contract.
pub const CREDENTIALS_KEY: &str = "taskdeck.credentials";

/// User and token travel together; a snapshot is replaced or removed as a
/// whole, never patched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialSnapshot {
    pub user: UserProfile,
    pub access_token: String,
}

pub trait CredentialStore {
    /// A missing or malformed snapshot reads as `None`; "not authenticated"
    /// is the recovery path for corrupt persisted state.
    fn load(&self) -> Option<CredentialSnapshot>;
    fn save(&self, snapshot: &CredentialSnapshot);
    fn clear(&self);
}

#[derive(Clone, Default)]
pub struct BrowserCredentialStore;

impl CredentialStore for BrowserCredentialStore {
    fn load(&self) -> Option<CredentialSnapshot> {
        let storage = storage_utils::local_storage().ok()?;
        let raw = storage.get_item(CREDENTIALS_KEY).ok()??;
        match serde_json::from_str(&raw) {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                log::warn!("discarding malformed credential snapshot: {}", e);
                let _ = storage.remove_item(CREDENTIALS_KEY);
                None
            }
        }
    }

    fn save(&self, snapshot: &CredentialSnapshot) {
        let Ok(storage) = storage_utils::local_storage() else {
            return;
        };
        match serde_json::to_string(snapshot) {
            Ok(raw) => {
                if storage.set_item(CREDENTIALS_KEY, &raw).is_err() {
                    log::warn!("failed to persist credential snapshot");
                }
            }
            Err(e) => log::warn!("failed to serialize credential snapshot: {}", e),
        }
    }

    fn clear(&self) {
        if let Ok(storage) = storage_utils::local_storage() {
            let _ = storage.remove_item(CREDENTIALS_KEY);
        }
    }
}

/// Token for the Authorization header when the in-memory cell is empty
/// (fresh page load before the auth store has run).
pub fn read_persisted_token() -> Option<String> {
    BrowserCredentialStore.load().map(|s| s.access_token)
}


#[cfg(test)]
mod tests {
    use super::memory::MemoryCredentialStore;
    use super::*;

    fn sample_snapshot() -> CredentialSnapshot {
        CredentialSnapshot {
            user: UserProfile {
                id: "u1".into(),
                name: "Alice".into(),
                email: "alice@example.com".into(),
            },
            access_token: "tok-1".into(),
        }
    }

    #[test]
    fn snapshot_round_trips_through_store() {
        let store = MemoryCredentialStore::new();
        store.save(&sample_snapshot());
        assert_eq!(store.load(), Some(sample_snapshot()));
        store.clear();
        assert_eq!(store.load(), None);
    }

    #[test]
    fn malformed_snapshot_reads_as_anonymous() {
        let store = MemoryCredentialStore::with_raw("{not json");
        assert_eq!(store.load(), None);
    }

    #[test]
    fn snapshot_wire_format_is_camel_case() {
        let raw = serde_json::to_value(sample_snapshot()).unwrap();
        assert!(raw.get("accessToken").is_some());
    }
}
