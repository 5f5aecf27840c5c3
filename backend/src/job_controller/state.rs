//! Tracks background merge jobs.
//!
//! Committing an import session runs outside the request/response cycle (see
//! `services::merge::start`). The request handler registers a job, answers
//! with its id, and the worker reports progress through the channel held by
//! [`JobsState`]. `start_job_updater` is the only writer of the status map
//! besides registration; `GET /api/merge/status/{job_id}` reads it.

use common::jobs::JobStatus;
use std::{collections::HashMap, sync::Arc};
use tokio::sync::{mpsc, RwLock};

/// Shared job bookkeeping, injected into actix as `web::Data`.
#[derive(Clone)]
pub struct JobsState {
    /// Current status per job id.
    pub jobs: Arc<RwLock<HashMap<String, JobStatus>>>,

    /// Where workers send their `JobUpdate`s.
    pub tx: mpsc::Sender<JobUpdate>,
}

impl JobsState {
    /// Creates the state together with the receiver the updater task consumes.
    pub fn new(buffer: usize) -> (Self, mpsc::Receiver<JobUpdate>) {
        let (tx, rx) = mpsc::channel(buffer);
        let state = Self {
            jobs: Arc::new(RwLock::new(HashMap::new())),
            tx,
        };
        (state, rx)
    }

    /// Registers a new job as `Pending` and returns its id.
    pub async fn register(&self) -> String {
        let job_id = uuid::Uuid::new_v4().to_string();
        self.jobs
            .write()
            .await
            .insert(job_id.clone(), JobStatus::Pending);
        job_id
    }
}

#[derive(Debug)]
pub struct JobUpdate {
    pub(crate) job_id: String,
    pub(crate) status: JobStatus,
}

/// Applies every update received on `rx` until all senders are gone.
pub async fn start_job_updater(state: JobsState, mut rx: mpsc::Receiver<JobUpdate>) {
    while let Some(update) = rx.recv().await {
        let mut jobs = state.jobs.write().await;
        jobs.insert(update.job_id.clone(), update.status);
    }
}
