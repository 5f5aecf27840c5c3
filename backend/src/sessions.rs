//! Import sessions shared between requests.
//!
//! A session is created by the upload handler, edited by the mapping handler
//! and consumed by a merge job on the blocking pool, so each one sits behind
//! its own mutex inside the shared map. `commit_lock` serializes merge jobs:
//! committing is a read-modify-write of a whole collection.
//!
//! Sessions only live in memory between upload and commit. A committed
//! session leaves the map as soon as its report is handed to the job status;
//! uncommitted ones are dropped after `session_ttl_secs` without a request,
//! or earliest-touched first once `max_sessions` is reached.

use crate::config::Config;
use crate::error::{ImportError, StorageError};
use crate::import::ImportSession;
use crate::storage::{RecordRepository, TemplateStore};
use log::info;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, TryLockError};
use std::time::Instant;
use tokio::sync::RwLock;

pub type SharedSession = Arc<Mutex<ImportSession>>;

struct SessionSlot {
    session: SharedSession,
    touched: Instant,
}

#[derive(Clone)]
pub struct ImportState {
    sessions: Arc<RwLock<HashMap<String, SessionSlot>>>,
    pub records: Arc<dyn RecordRepository>,
    pub templates: Arc<dyn TemplateStore>,
    pub commit_lock: Arc<Mutex<()>>,
    pub config: Arc<Config>,
}

impl ImportState {
    pub fn new(
        config: Config,
        records: Arc<dyn RecordRepository>,
        templates: Arc<dyn TemplateStore>,
    ) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            records,
            templates,
            commit_lock: Arc::new(Mutex::new(())),
            config: Arc::new(config),
        }
    }

    /// Stores a session, making room first by dropping idle ones and, at
    /// capacity, the least recently touched.
    pub async fn insert(&self, session: ImportSession) -> String {
        let id = session.id().to_string();
        let ttl = self.config.session_ttl();
        let mut sessions = self.sessions.write().await;

        sessions.retain(|_, slot| slot.touched.elapsed() < ttl);
        while sessions.len() >= self.config.max_sessions {
            let oldest = sessions
                .iter()
                .min_by_key(|(_, slot)| slot.touched)
                .map(|(id, _)| id.clone());
            match oldest {
                Some(oldest) => {
                    info!("Session {}: dropped, session limit reached", oldest);
                    sessions.remove(&oldest);
                }
                None => break,
            }
        }

        sessions.insert(
            id.clone(),
            SessionSlot {
                session: Arc::new(Mutex::new(session)),
                touched: Instant::now(),
            },
        );
        id
    }

    /// Looks a session up and marks it as recently used.
    pub async fn session(&self, id: &str) -> Result<SharedSession, ImportError> {
        let mut sessions = self.sessions.write().await;
        let slot = sessions
            .get_mut(id)
            .ok_or_else(|| ImportError::SessionNotFound(id.to_string()))?;
        slot.touched = Instant::now();
        Ok(slot.session.clone())
    }

    pub async fn remove(&self, id: &str) -> bool {
        self.sessions.write().await.remove(id).is_some()
    }

    /// Drops sessions untouched for longer than the configured TTL; returns how many.
    pub async fn evict_idle(&self) -> usize {
        let ttl = self.config.session_ttl();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, slot| slot.touched.elapsed() < ttl);
        before - sessions.len()
    }

    pub async fn count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

/// Locks a session, waiting for it. Only for the blocking pool.
pub fn lock(session: &SharedSession) -> Result<MutexGuard<'_, ImportSession>, ImportError> {
    session
        .lock()
        .map_err(|_| ImportError::Storage(StorageError::Poisoned))
}

/// Locks a session without waiting; a session held by a running merge job is busy.
pub fn try_lock<'a>(
    id: &str,
    session: &'a SharedSession,
) -> Result<MutexGuard<'a, ImportSession>, ImportError> {
    match session.try_lock() {
        Ok(guard) => Ok(guard),
        Err(TryLockError::WouldBlock) => Err(ImportError::SessionBusy(id.to_string())),
        Err(TryLockError::Poisoned(_)) => Err(ImportError::Storage(StorageError::Poisoned)),
    }
}
