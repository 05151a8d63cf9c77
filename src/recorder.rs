//! Transaction status stores.
//!
//! A store keeps only the latest settled outcome per purchase kind. Writes
//! to the same store are serialized by a lock; the last write wins.

use crate::classifier::AuthStatus;
use crate::error::StoreError;
use crate::money::Money;
use crate::submission::PurchaseKind;
use chrono::{DateTime, Utc};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tempfile::NamedTempFile;

/// Latest settled outcome of one purchase kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub kind: PurchaseKind,
    pub status: AuthStatus,
    pub amount: Money,
    pub timestamp: DateTime<Utc>,
}

/// Durable holder of the last transaction outcome per purchase kind.
pub trait StatusStore: Send + Sync {
    /// Stores `record`, replacing any previous record of the same kind.
    fn record(&self, record: TransactionRecord) -> Result<(), StoreError>;

    /// Returns the current record for `kind`, if any.
    fn read(&self, kind: PurchaseKind) -> Result<Option<TransactionRecord>, StoreError>;

    /// Removes the records of every kind.
    fn reset(&self) -> Result<(), StoreError>;
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, StoreError> {
    mutex.lock().map_err(|_| StoreError::Poisoned)
}

/// In-process store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<BTreeMap<PurchaseKind, TransactionRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StatusStore for MemoryStore {
    fn record(&self, record: TransactionRecord) -> Result<(), StoreError> {
        lock(&self.records)?.insert(record.kind, record);
        Ok(())
    }

    fn read(&self, kind: PurchaseKind) -> Result<Option<TransactionRecord>, StoreError> {
        Ok(lock(&self.records)?.get(&kind).cloned())
    }

    fn reset(&self) -> Result<(), StoreError> {
        lock(&self.records)?.clear();
        Ok(())
    }
}

/// Store backed by a CSV file with one row per purchase kind.
///
/// Every write fills a temp file in the store's directory and renames it
/// over the store, so readers never observe a half-written file. A missing
/// file reads as an empty store.
#[derive(Debug)]
pub struct CsvFileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl CsvFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        CsvFileStore {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<PurchaseKind, TransactionRecord>, StoreError> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(e.into()),
        };

        let mut records = BTreeMap::new();
        let mut reader = csv::Reader::from_reader(file);
        for result in reader.deserialize::<TransactionRecord>() {
            let record = result?;
            if records.insert(record.kind, record.clone()).is_some() {
                return Err(StoreError::Corrupt {
                    kind: record.kind,
                    message: "duplicate row".to_string(),
                });
            }
        }
        Ok(records)
    }

    fn save(&self, records: &BTreeMap<PurchaseKind, TransactionRecord>) -> Result<(), StoreError> {
        let dir = self
            .path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        // Dropping the temp file on any early return deletes it.
        let mut tmp = NamedTempFile::new_in(dir)?;
        {
            let mut writer = csv::Writer::from_writer(BufWriter::new(tmp.as_file_mut()));
            // Header is written explicitly so an empty store is still a valid file.
            writer.write_record(["kind", "status", "amount", "timestamp"])?;
            for record in records.values() {
                writer.write_record([
                    record.kind.to_string(),
                    record.status.to_string(),
                    record.amount.to_string(),
                    record.timestamp.to_rfc3339(),
                ])?;
            }
            writer
                .into_inner()
                .map_err(|e| StoreError::Io(e.into_error()))?
                .flush()?;
        }
        tmp.persist(&self.path).map_err(|e| StoreError::Io(e.error))?;
        Ok(())
    }
}

impl StatusStore for CsvFileStore {
    fn record(&self, record: TransactionRecord) -> Result<(), StoreError> {
        let _guard = lock(&self.write_lock)?;
        let mut records = self.load()?;
        debug!("Writing {} record to {}", record.kind, self.path.display());
        records.insert(record.kind, record);
        self.save(&records)
    }

    fn read(&self, kind: PurchaseKind) -> Result<Option<TransactionRecord>, StoreError> {
        let _guard = lock(&self.write_lock)?;
        Ok(self.load()?.remove(&kind))
    }

    fn reset(&self) -> Result<(), StoreError> {
        let _guard = lock(&self.write_lock)?;
        self.save(&BTreeMap::new())
    }
}
