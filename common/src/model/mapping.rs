use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::model::record::{RecordKind, TargetField};

/// What a single source column is assigned to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum ColumnTarget {
    /// A canonical field of the record kind.
    Field(TargetField),
    /// A field declared by a mapping template, resolved when records are built.
    Template(String),
    /// Kept in the record's auxiliary map under the original header.
    Auxiliary,
    /// Dropped.
    Ignore,
}

/// How an assignment was decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentOrigin {
    Template,
    Heuristic,
    /// No rule matched; the column falls back to auxiliary.
    Fallback,
    Operator,
}

/// The mapping source reported back to the operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MappingSource {
    Template { name: String },
    Heuristic,
}

impl fmt::Display for MappingSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MappingSource::Template { name } => write!(f, "template '{}'", name),
            MappingSource::Heuristic => f.write_str("heuristic"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnAssignment {
    pub header: String,
    /// 0-based position of the header in the source file.
    pub column: usize,
    pub target: ColumnTarget,
    pub origin: AssignmentOrigin,
}

/// Two or more headers claiming the same canonical field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldConflict {
    pub field: TargetField,
    pub headers: Vec<String>,
}

/// One assignment per header, in header order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMapping {
    pub kind: RecordKind,
    pub source: MappingSource,
    pub columns: Vec<ColumnAssignment>,
}

impl ColumnMapping {
    /// Target of the first header named `header`.
    pub fn target_of(&self, header: &str) -> Option<&ColumnTarget> {
        self.columns
            .iter()
            .find(|c| c.header == header)
            .map(|c| &c.target)
    }

    pub fn is_all_ignored(&self) -> bool {
        self.columns
            .iter()
            .all(|c| matches!(c.target, ColumnTarget::Ignore))
    }

    /// Canonical fields claimed directly by more than one header.
    ///
    /// Template targets are not resolved here; callers that know the
    /// resolution rules pass the resolved view to [`conflicts_in`].
    pub fn conflicts(&self) -> Vec<FieldConflict> {
        conflicts_in(self.columns.iter().filter_map(|c| match &c.target {
            ColumnTarget::Field(f) => Some((*f, c.header.as_str())),
            _ => None,
        }))
    }
}

/// Groups `(field, header)` pairs and keeps the fields seen more than once.
pub fn conflicts_in<'a>(pairs: impl Iterator<Item = (TargetField, &'a str)>) -> Vec<FieldConflict> {
    let mut by_field: BTreeMap<TargetField, Vec<String>> = BTreeMap::new();
    for (field, header) in pairs {
        by_field.entry(field).or_default().push(header.to_string());
    }
    by_field
        .into_iter()
        .filter(|(_, headers)| headers.len() > 1)
        .map(|(field, headers)| FieldConflict { field, headers })
        .collect()
}
