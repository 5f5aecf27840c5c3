use serde::{Deserialize, Serialize};

use crate::model::merge::ImportReport;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum JobStatus {
    Pending,
    InProgress(u32),
    Completed(ImportReport),
    Failed(String),
}
