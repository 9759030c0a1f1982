//! Atelier Store - the persisted source of truth for scene records
//!
//! Records are the serializable description of every scene entity. The
//! render tree is derived from them; edits flow back in through the narrow
//! transform-update operation on [`RecordStore`].

mod loader;
mod record;
mod store;

pub use loader::{load_records, load_records_string, RecordsFile};
pub use record::{GeometryDesc, MaterialDesc, Record, RecordBody, RecordKind, TransformPatch};
pub use store::{ChangeKind, MemoryStore, RecordStore, Snapshot, StoreChange, StoreSubscription};
