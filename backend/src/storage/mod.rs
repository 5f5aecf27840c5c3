//! Persistence seams for the importer.
//!
//! The import executor only sees [`RecordRepository`]; mapping templates are
//! read through [`TemplateStore`]. `sqlite` is what the service runs on,
//! `memory` backs the unit tests.

use crate::error::StorageError;
use common::model::record::{RecordKind, TargetRecord};
use common::model::template::MappingTemplate;

pub mod memory;
pub mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Collections of target records, one per record kind.
pub trait RecordRepository: Send + Sync {
    fn get(&self, kind: RecordKind, id: &str) -> Result<Option<TargetRecord>, StorageError>;

    /// Replaces the whole collection of `kind`.
    fn put(&self, kind: RecordKind, records: &[TargetRecord]) -> Result<(), StorageError>;

    fn list(&self, kind: RecordKind) -> Result<Vec<TargetRecord>, StorageError>;
}

pub trait TemplateStore: Send + Sync {
    fn get_template(
        &self,
        kind: RecordKind,
        name: &str,
    ) -> Result<Option<MappingTemplate>, StorageError>;

    fn list_templates(&self, kind: RecordKind) -> Result<Vec<MappingTemplate>, StorageError>;

    /// Inserts or replaces the template with the same kind and name.
    fn save_template(&self, template: &MappingTemplate) -> Result<(), StorageError>;

    /// Returns whether a template was removed.
    fn delete_template(&self, kind: RecordKind, name: &str) -> Result<bool, StorageError>;
}
