use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Error;

/// Deployment intent of a Safe whose address is known but not yet on chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UndeployedSafe {
    pub owners: Vec<Address>,
    pub threshold: u32,
    pub salt_nonce: String,
    pub safe_version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_handler: Option<Address>,
}

/// Registry of undeployed Safes keyed by `(chain_id, address)`
pub trait UndeployedSafeRegistry: Send + Sync {
    fn add(&self, chain_id: u64, address: Address, safe: UndeployedSafe) -> Result<(), Error>;

    fn get(&self, chain_id: u64, address: Address) -> Result<Option<UndeployedSafe>, Error>;

    /// Returns whether a record existed
    fn remove(&self, chain_id: u64, address: Address) -> Result<bool, Error>;

    fn list(&self, chain_id: Option<u64>) -> Result<Vec<(u64, Address, UndeployedSafe)>, Error>;
}

type Records = BTreeMap<u64, BTreeMap<Address, UndeployedSafe>>;

fn lock_poisoned() -> Error {
    Error::Other("Undeployed Safe registry lock poisoned".to_string())
}

fn flatten(records: &Records, chain_id: Option<u64>) -> Vec<(u64, Address, UndeployedSafe)> {
    records
        .iter()
        .filter(|(id, _)| chain_id.map_or(true, |wanted| wanted == **id))
        .flat_map(|(id, safes)| {
            safes
                .iter()
                .map(move |(address, safe)| (*id, *address, safe.clone()))
        })
        .collect()
}

fn remove_record(records: &mut Records, chain_id: u64, address: Address) -> bool {
    let Some(safes) = records.get_mut(&chain_id) else {
        return false;
    };
    let removed = safes.remove(&address).is_some();
    if safes.is_empty() {
        records.remove(&chain_id);
    }
    removed
}

/// In-memory registry
#[derive(Debug, Default)]
pub struct MemoryRegistry {
    records: Mutex<Records>,
}

impl MemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }
}

impl UndeployedSafeRegistry for MemoryRegistry {
    fn add(&self, chain_id: u64, address: Address, safe: UndeployedSafe) -> Result<(), Error> {
        let mut records = self.records.lock().map_err(|_| lock_poisoned())?;
        records.entry(chain_id).or_default().insert(address, safe);
        Ok(())
    }

    fn get(&self, chain_id: u64, address: Address) -> Result<Option<UndeployedSafe>, Error> {
        let records = self.records.lock().map_err(|_| lock_poisoned())?;
        Ok(records.get(&chain_id).and_then(|s| s.get(&address)).cloned())
    }

    fn remove(&self, chain_id: u64, address: Address) -> Result<bool, Error> {
        let mut records = self.records.lock().map_err(|_| lock_poisoned())?;
        Ok(remove_record(&mut records, chain_id, address))
    }

    fn list(&self, chain_id: Option<u64>) -> Result<Vec<(u64, Address, UndeployedSafe)>, Error> {
        let records = self.records.lock().map_err(|_| lock_poisoned())?;
        Ok(flatten(&records, chain_id))
    }
}

/// One entry of the registry file
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredEntry {
    chain_id: u64,
    address: Address,
    safe: UndeployedSafe,
}

/// Registry persisted as a JSON file, rewritten on every mutation
pub struct FileRegistry {
    path: PathBuf,
    records: Mutex<Records>,
}

impl FileRegistry {
    /// Open the registry file, starting empty when it does not exist yet
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, Error> {
        let path = path.into();
        let records = if path.exists() {
            Self::read_file(&path)?
        } else {
            Records::new()
        };

        Ok(Self {
            path,
            records: Mutex::new(records),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_file(path: &Path) -> Result<Records, Error> {
        let content = fs::read_to_string(path)
            .map_err(|e| Error::Other(format!("Failed to read registry file: {}", e)))?;
        let entries: Vec<StoredEntry> = serde_json::from_str(&content)?;

        let mut records = Records::new();
        for entry in entries {
            records
                .entry(entry.chain_id)
                .or_default()
                .insert(entry.address, entry.safe);
        }
        Ok(records)
    }

    fn write_file(&self, records: &Records) -> Result<(), Error> {
        let entries: Vec<StoredEntry> = flatten(records, None)
            .into_iter()
            .map(|(chain_id, address, safe)| StoredEntry {
                chain_id,
                address,
                safe,
            })
            .collect();
        let json = serde_json::to_string_pretty(&entries)?;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, json)
            .map_err(|e| Error::Other(format!("Failed to write registry file: {}", e)))?;

        debug!(path = %self.path.display(), entries = entries.len(), "Saved undeployed Safes");
        Ok(())
    }
}

impl UndeployedSafeRegistry for FileRegistry {
    // Mutations are staged on a copy and only kept once the file is written
    fn add(&self, chain_id: u64, address: Address, safe: UndeployedSafe) -> Result<(), Error> {
        let mut records = self.records.lock().map_err(|_| lock_poisoned())?;
        let mut staged = records.clone();
        staged.entry(chain_id).or_default().insert(address, safe);
        self.write_file(&staged)?;
        *records = staged;
        Ok(())
    }

    fn get(&self, chain_id: u64, address: Address) -> Result<Option<UndeployedSafe>, Error> {
        let records = self.records.lock().map_err(|_| lock_poisoned())?;
        Ok(records.get(&chain_id).and_then(|s| s.get(&address)).cloned())
    }

    fn remove(&self, chain_id: u64, address: Address) -> Result<bool, Error> {
        let mut records = self.records.lock().map_err(|_| lock_poisoned())?;
        let mut staged = records.clone();
        if !remove_record(&mut staged, chain_id, address) {
            return Ok(false);
        }
        self.write_file(&staged)?;
        *records = staged;
        Ok(true)
    }

    fn list(&self, chain_id: Option<u64>) -> Result<Vec<(u64, Address, UndeployedSafe)>, Error> {
        let records = self.records.lock().map_err(|_| lock_poisoned())?;
        Ok(flatten(&records, chain_id))
    }
}
