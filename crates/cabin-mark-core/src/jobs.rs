//! Cancellation tokens and the export job slot.
//!
//! Exports are long-running and must be cancellable from another task
//! (a host button, Ctrl-C). Only one export runs per process; a second
//! request while one is active is rejected rather than queued.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// Identifier of one export run.
pub type JobId = u64;

/// Shared cancellation flag of one run.
///
/// Clones observe the same flag. Cancelling is idempotent and never
/// blocks.
#[derive(Debug, Clone)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
    job_id: JobId,
}

impl CancelToken {
    pub fn new(job_id: JobId) -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
            job_id,
        }
    }

    /// A token that nobody else holds. Useful for one-off runs and tests.
    pub fn detached() -> Self {
        Self::new(0)
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn job_id(&self) -> JobId {
        self.job_id
    }
}

/// Tracks the single active export.
#[derive(Debug)]
pub struct JobManager {
    next_id: AtomicU64,
    active: Mutex<Option<CancelToken>>,
}

impl Default for JobManager {
    fn default() -> Self {
        Self::new()
    }
}

impl JobManager {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            active: Mutex::new(None),
        }
    }

    /// Claim the export slot.
    ///
    /// Returns `None` when another export is still running. The slot is
    /// released when the returned guard drops.
    pub fn try_start(self: &Arc<Self>) -> Option<JobGuard> {
        let mut active = self.active.lock().ok()?;
        if active.is_some() {
            return None;
        }

        let job_id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let token = CancelToken::new(job_id);
        *active = Some(token.clone());
        tracing::debug!(job_id, "Export job started");

        Some(JobGuard {
            manager: Arc::clone(self),
            token,
        })
    }

    /// Cancel the running export, if any. Returns whether one was running.
    pub fn cancel_active(&self) -> bool {
        match self.active.lock() {
            Ok(active) => match active.as_ref() {
                Some(token) => {
                    tracing::info!(job_id = token.job_id(), "Export cancellation requested");
                    token.cancel();
                    true
                }
                None => false,
            },
            Err(_) => false,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.active.lock().map(|a| a.is_some()).unwrap_or(false)
    }

    pub fn active_job_id(&self) -> Option<JobId> {
        self.active
            .lock()
            .ok()
            .and_then(|a| a.as_ref().map(CancelToken::job_id))
    }

    fn release(&self, job_id: JobId) {
        if let Ok(mut active) = self.active.lock() {
            if active.as_ref().map(CancelToken::job_id) == Some(job_id) {
                *active = None;
                tracing::debug!(job_id, "Export job finished");
            }
        }
    }
}

/// Holds the export slot for the duration of one run.
#[derive(Debug)]
pub struct JobGuard {
    manager: Arc<JobManager>,
    token: CancelToken,
}

impl JobGuard {
    pub fn token(&self) -> &CancelToken {
        &self.token
    }
}

impl Drop for JobGuard {
    fn drop(&mut self) {
        self.manager.release(self.token.job_id());
    }
}
