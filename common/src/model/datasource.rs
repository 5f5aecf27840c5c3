use serde::{Deserialize, Serialize};

use crate::model::csv::{Delimiter, Header};
use crate::model::mapping::{ColumnMapping, FieldConflict};
use crate::model::merge::ImportReport;
use crate::model::record::RecordKind;

/// Lifecycle of an import session.
///
/// `Idle → FileLoaded → Parsed → MappingProposed → MappingConfirmed → Committed`,
/// with `Failed` as the terminal state for structural problems found while parsing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "reason", rename_all = "snake_case")]
pub enum SessionState {
    Idle,
    FileLoaded,
    Parsed,
    MappingProposed,
    MappingConfirmed,
    Committed,
    Failed(String),
}

impl SessionState {
    pub fn name(&self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::FileLoaded => "file_loaded",
            SessionState::Parsed => "parsed",
            SessionState::MappingProposed => "mapping_proposed",
            SessionState::MappingConfirmed => "mapping_confirmed",
            SessionState::Committed => "committed",
            SessionState::Failed(_) => "failed",
        }
    }
}

/// Returned after upload: the detected structure and the proposed mapping
/// the operator reviews before confirming.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MappingProposal {
    pub session_id: String,
    pub kind: RecordKind,
    pub delimiter: Delimiter,
    pub headers: Vec<Header>,
    pub mapping: ColumnMapping,
    pub conflicts: Vec<FieldConflict>,
    pub rows_read: usize,
    /// First data rows, one value per header.
    pub preview: Vec<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSummary {
    pub session_id: String,
    pub kind: RecordKind,
    pub owner: String,
    pub state: SessionState,
    pub file_name: Option<String>,
    pub mapping: Option<ColumnMapping>,
    pub report: Option<ImportReport>,
}
