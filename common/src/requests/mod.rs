use serde::{Deserialize, Serialize};

use crate::model::mapping::ColumnTarget;
use crate::model::record::RecordKind;

/// Metadata sent as the `json` part of an upload, ahead of the `file` part.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadRequest {
    pub kind: RecordKind,
    pub owner: String,
    #[serde(default)]
    pub template_name: Option<String>,
}

/// Operator-reviewed mapping: one target per header, in header order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfirmMappingRequest {
    pub session_id: String,
    pub targets: Vec<ColumnTarget>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartMergeRequest {
    pub session_id: String,
    /// Group or category applied to every record of the session.
    #[serde(default)]
    pub group: Option<String>,
}
