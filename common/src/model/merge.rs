use serde::{Deserialize, Serialize};

use crate::model::mapping::MappingSource;
use crate::model::record::RecordKind;

/// A data row that did not become a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedRow {
    /// 0-based index among the data rows (header excluded).
    pub row_index: usize,
    /// 1-based line in the source file.
    pub line: usize,
    pub reason: String,
}

/// Outcome of committing an import session into its destination collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportReport {
    pub session_id: String,
    pub kind: RecordKind,
    pub rows_read: usize,
    pub imported: usize,
    pub skipped: usize,
    pub skipped_rows: Vec<SkippedRow>,
    pub mapping_source: MappingSource,
    pub imported_ids: Vec<String>,
}

impl ImportReport {
    /// One-line summary suitable for showing to the operator.
    pub fn summary(&self) -> String {
        format!(
            "{} of {} rows imported as {} records, {} skipped (mapping: {})",
            self.imported, self.rows_read, self.kind, self.skipped, self.mapping_source
        )
    }
}
