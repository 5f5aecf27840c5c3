//! # Merge Job Start Service
//!
//! `POST /api/merge/start` commits a confirmed import session in the background.
//!
//! ## Workflow:
//!
//! 1.  **HTTP Request**: `process` receives a `StartMergeRequest` naming the session
//!     and, optionally, the group stamped onto every record.
//!
//! 2.  **Precondition**: the session must exist and hold a confirmed mapping. Anything
//!     else is answered right away (404 or 409) and no job is created.
//!
//! 3.  **Job Scheduling**: a job is registered as `Pending`, its id is returned, and a
//!     Tokio task takes over.
//!
//! 4.  **Background Processing**: the task marks the job `InProgress(0)` and runs
//!     `merge_blocking` through `spawn_blocking`. Building rows and rewriting the
//!     destination collection are CPU and disk work that must not stall the runtime.
//!     Merge jobs are serialized on the process-wide commit lock.
//!
//! 5.  **Completion**: the `ImportReport` becomes `Completed(report)` and the session
//!     leaves the import state, since the job status now carries everything it held.
//!     A structural or storage error becomes `Failed(reason)`.

use crate::error::{ImportError, StorageError};
use crate::import::CommitOptions;
use crate::job_controller::state::{JobUpdate, JobsState};
use crate::services::error_response;
use crate::sessions::{lock, try_lock, ImportState, SharedSession};
use crate::storage::RecordRepository;
use actix_web::{web, HttpResponse, Responder};
use common::jobs::JobStatus;
use common::model::datasource::SessionState;
use common::model::merge::ImportReport;
use common::requests::StartMergeRequest;
use log::{error, info};
use std::sync::Mutex;

pub(crate) async fn process(
    jobs: web::Data<JobsState>,
    state: web::Data<ImportState>,
    payload: web::Json<StartMergeRequest>,
) -> impl Responder {
    match schedule_merge_job(&jobs, &state, payload.into_inner()).await {
        Ok(job_id) => HttpResponse::Ok().json(serde_json::json!({ "job_id": job_id })),
        Err(e) => error_response(&e),
    }
}

async fn schedule_merge_job(
    jobs: &JobsState,
    state: &ImportState,
    req: StartMergeRequest,
) -> Result<String, ImportError> {
    let session = state.session(&req.session_id).await?;
    let kind = {
        let current = try_lock(&req.session_id, &session)?;
        if current.state() != &SessionState::MappingConfirmed {
            return Err(ImportError::InvalidTransition {
                action: "commit",
                state: current.state().name(),
            });
        }
        current.kind()
    };

    let job_id = jobs.register().await;
    info!(
        "Session {}: merge job {} scheduled into {}",
        req.session_id,
        job_id,
        kind.store_key()
    );

    let tx = jobs.tx.clone();
    let job_id_clone = job_id.clone();
    let session_id = req.session_id.clone();
    let import_state = state.clone();
    let records = state.records.clone();
    let commit_lock = state.commit_lock.clone();
    let options = CommitOptions {
        group: req.group,
        parallel_threshold: state.config.parallel_build_threshold,
    };

    tokio::spawn(async move {
        let _ = tx
            .send(JobUpdate {
                job_id: job_id_clone.clone(),
                status: JobStatus::InProgress(0),
            })
            .await;

        let handle = tokio::task::spawn_blocking(move || {
            merge_blocking(&session, records.as_ref(), &commit_lock, &options)
        });

        let status = match handle.await {
            Ok(Ok(report)) => {
                import_state.remove(&session_id).await;
                info!("Session {}: committed and released", session_id);
                JobStatus::Completed(report)
            }
            Ok(Err(e)) => {
                error!("Merge job {} failed: {}", job_id_clone, e);
                JobStatus::Failed(e.to_string())
            }
            Err(e) => {
                error!("Merge job {} did not finish: {}", job_id_clone, e);
                JobStatus::Failed(format!("Task join error: {}", e))
            }
        };
        let _ = tx
            .send(JobUpdate {
                job_id: job_id_clone,
                status,
            })
            .await;
    });

    Ok(job_id)
}

/// Commits the session while holding the commit lock.
fn merge_blocking(
    session: &SharedSession,
    records: &dyn RecordRepository,
    commit_lock: &Mutex<()>,
    options: &CommitOptions,
) -> Result<ImportReport, ImportError> {
    let _serialized = commit_lock
        .lock()
        .map_err(|_| ImportError::Storage(StorageError::Poisoned))?;
    let mut session = lock(session)?;
    let report = session.commit(records, options)?.clone();
    Ok(report)
}
