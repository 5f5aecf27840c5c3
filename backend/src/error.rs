//! Error types for the importer.
//!
//! Structural problems (`ImportError`) stop a session and are shown to the
//! operator as-is. Row problems (`RowBuildFailure`) never stop an import; they
//! end up in the report's skip list.

use common::model::record::{RecordKind, TargetField};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Stored data is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Storage lock poisoned")]
    Poisoned,
}

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("The file is empty")]
    EmptyFile,

    #[error("The first row has no column names")]
    NoValidHeaders,

    #[error("The file has a header row but no data rows")]
    HeaderOnlyFile,

    #[error("Every column is ignored; map at least one field")]
    NoFieldsMapped,

    #[error("The file is not valid UTF-8 text")]
    InvalidEncoding,

    #[error("Invalid upload: {0}")]
    Upload(String),

    #[error("Mapping has {got} targets but the file has {expected} columns")]
    MappingShapeMismatch { expected: usize, got: usize },

    #[error("Field '{field}' does not exist on {kind} records")]
    FieldNotInSchema { field: TargetField, kind: RecordKind },

    #[error("Required template field '{0}' is not mapped to any column")]
    RequiredFieldUnmapped(String),

    #[error("Field '{field}' is mapped from more than one column: {}", headers.join(", "))]
    DuplicateTarget {
        field: TargetField,
        headers: Vec<String>,
    },

    #[error("Cannot {action} while the session is {state}")]
    InvalidTransition {
        action: &'static str,
        state: &'static str,
    },

    #[error("Template '{name}' not found for {kind} records")]
    TemplateNotFound { kind: RecordKind, name: String },

    #[error("Import session '{0}' not found")]
    SessionNotFound(String),

    #[error("Import session '{0}' is being committed; try again when the merge job ends")]
    SessionBusy(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl ImportError {
    /// Structural errors are the operator's to fix; the rest are ours.
    pub fn is_structural(&self) -> bool {
        !matches!(self, ImportError::Storage(_))
    }
}

/// Why a single data row did not become a record.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RowBuildFailure {
    #[error("no identifying field (name, contact or code) has a value")]
    MissingIdentifier,

    #[error("value '{value}' is not valid for {field}: {reason}")]
    Coercion {
        field: TargetField,
        value: String,
        reason: String,
    },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration error: {0}")]
    Figment(#[from] Box<figment::Error>),

    #[error("Configuration error: {0}")]
    Invalid(String),
}
