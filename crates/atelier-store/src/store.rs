//! Object store: snapshots, transform updates, change notification

use crate::record::{Record, TransformPatch};
use atelier_core::{AtelierError, RecordId, Result};
use crossbeam::channel::{self, Receiver, Sender};
use std::collections::HashSet;
use std::sync::Arc;

/// The narrow contract the editing core consumes.
///
/// Everything else (record creation, deletion, import) belongs to external
/// workflows that own the concrete store.
pub trait RecordStore {
    /// Ordered, immutable snapshot of every top-level record
    fn read_all(&self) -> Snapshot;

    /// Merge the given transform fields into the record with `id`
    fn update(&mut self, id: &str, patch: &TransformPatch) -> Result<()>;
}

/// An immutable view of the store at one revision.
///
/// Snapshots taken at the same revision share their allocation, so
/// [`Snapshot::same_as`] is a cheap identity check.
#[derive(Debug, Clone)]
pub struct Snapshot {
    revision: u64,
    records: Arc<Vec<Record>>,
}

impl Snapshot {
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn iter(&self) -> impl Iterator<Item = &Record> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Find a top-level or nested record by id
    pub fn get(&self, id: &str) -> Option<&Record> {
        self.records.iter().find_map(|r| r.find(id))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn same_as(&self, other: &Snapshot) -> bool {
        Arc::ptr_eq(&self.records, &other.records)
    }
}

/// What happened to the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeKind {
    Added(RecordId),
    Removed(RecordId),
    Updated(RecordId),
}

/// Notification sent to subscribers after every effective mutation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreChange {
    pub revision: u64,
    pub kind: ChangeKind,
}

/// Receiving half of a store subscription
pub struct StoreSubscription {
    receiver: Receiver<StoreChange>,
}

impl StoreSubscription {
    /// Drain all pending notifications without blocking
    pub fn drain(&self) -> Vec<StoreChange> {
        self.receiver.try_iter().collect()
    }

    /// Whether any change arrived since the last drain; consumes the pending changes
    pub fn has_changes(&self) -> bool {
        !self.drain().is_empty()
    }
}

/// In-memory record store
pub struct MemoryStore {
    records: Arc<Vec<Record>>,
    revision: u64,
    subscribers: Vec<Sender<StoreChange>>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self {
            records: Arc::new(Vec::new()),
            revision: 0,
            subscribers: Vec::new(),
        }
    }

    /// Create a store from an ordered list of records, validating id uniqueness
    pub fn from_records(records: Vec<Record>) -> Result<Self> {
        let mut store = Self::new();
        for record in records {
            store.add(record)?;
        }
        Ok(store)
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Find a top-level or nested record by id
    pub fn get(&self, id: &str) -> Option<&Record> {
        self.records.iter().find_map(|r| r.find(id))
    }

    /// Number of top-level records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Add a top-level record. Used by external creation flows.
    pub fn add(&mut self, record: Record) -> Result<()> {
        let mut existing = HashSet::new();
        for r in self.records.iter() {
            r.walk(&mut |r| {
                existing.insert(r.id.clone());
            });
        }

        let mut incoming = Vec::new();
        record.walk(&mut |r| incoming.push(r.id.clone()));
        for id in incoming {
            if !existing.insert(id.clone()) {
                return Err(AtelierError::DuplicateRecordId(id.to_string()));
            }
        }

        let id = record.id.clone();
        Arc::make_mut(&mut self.records).push(record);
        self.publish(ChangeKind::Added(id));
        Ok(())
    }

    /// Remove a top-level record and its children. Used by external deletion flows.
    pub fn remove(&mut self, id: &str) -> Result<Record> {
        let index = self
            .records
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| AtelierError::RecordNotFound(id.to_string()))?;

        let removed = Arc::make_mut(&mut self.records).remove(index);
        self.publish(ChangeKind::Removed(removed.id.clone()));
        Ok(removed)
    }

    /// Subscribe to change notifications
    pub fn subscribe(&mut self) -> StoreSubscription {
        let (sender, receiver) = channel::unbounded();
        self.subscribers.push(sender);
        StoreSubscription { receiver }
    }

    fn publish(&mut self, kind: ChangeKind) {
        self.revision += 1;
        let change = StoreChange {
            revision: self.revision,
            kind,
        };
        log::trace!("store revision {} ({:?})", change.revision, change.kind);
        // Dropped subscriptions are pruned on the next publish
        self.subscribers
            .retain(|sender| sender.send(change.clone()).is_ok());
    }
}

impl RecordStore for MemoryStore {
    fn read_all(&self) -> Snapshot {
        Snapshot {
            revision: self.revision,
            records: Arc::clone(&self.records),
        }
    }

    fn update(&mut self, id: &str, patch: &TransformPatch) -> Result<()> {
        // Check before make_mut so a no-op never detaches outstanding snapshots
        let current = self
            .get(id)
            .ok_or_else(|| AtelierError::RecordNotFound(id.to_string()))?;
        let mut candidate = current.clone();
        if !candidate.apply_patch(patch) {
            return Ok(());
        }

        let records = Arc::make_mut(&mut self.records);
        if let Some(record) = records.iter_mut().find_map(|r| r.find_mut(id)) {
            record.apply_patch(patch);
        }
        self.publish(ChangeKind::Updated(RecordId::from(id)));
        Ok(())
    }
}
