//! # Dispatch Trigger
//!
//! Hands each new user message to the [`Orchestrator`] on its own tokio
//! task. The caller returns as soon as the task is spawned.
//!
//! - A message id is scheduled at most once while its run is queued or
//!   running; repeats are rejected.
//! - Runs of one session execute one after another in scheduling order.
//!   The order is fixed inside [`Dispatcher::schedule`]: each run waits on
//!   the completion signal of the run scheduled before it in its session.
//!   Runs of different sessions never wait on each other.
//! - Failures are logged and dropped. No retry.
//!
//! Bookkeeping only covers queued and running work. A session's entry is
//! removed when its last run finishes.

use crate::orchestrator::Orchestrator;
use lib_core::model::SessionMode;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// One orchestration run to perform.
#[derive(Debug, Clone)]
pub struct DispatchJob {
    pub session_id: i64,
    pub message_id: i64,
    pub model_id: String,
    pub mode: SessionMode,
}

#[derive(Default)]
struct SessionQueue {
    /// Completion signal of the most recently scheduled run
    tail: Option<oneshot::Receiver<()>>,
    /// Runs queued or running
    pending: usize,
}

#[derive(Default)]
struct DispatchState {
    in_flight: HashSet<i64>,
    sessions: HashMap<i64, SessionQueue>,
}

pub struct Dispatcher {
    orchestrator: Arc<Orchestrator>,
    state: Arc<Mutex<DispatchState>>,
}

impl Dispatcher {
    pub fn new(orchestrator: Arc<Orchestrator>) -> Self {
        Self {
            orchestrator,
            state: Arc::new(Mutex::new(DispatchState::default())),
        }
    }

    /// Schedule the run for `job`.
    ///
    /// Returns `None` if this message id is already queued or running.
    pub fn schedule(&self, job: DispatchJob) -> Option<JoinHandle<()>> {
        let (done_tx, done_rx) = oneshot::channel::<()>();

        let previous = {
            let mut guard = lock_state(&self.state);
            let state = &mut *guard;

            if state.in_flight.contains(&job.message_id) {
                warn!("[DISPATCH] Message {} already scheduled, ignoring", job.message_id);
                return None;
            }

            state.in_flight.insert(job.message_id);
            let queue = state.sessions.entry(job.session_id).or_default();
            queue.pending += 1;
            queue.tail.replace(done_rx)
        };

        let run_guard = RunGuard {
            state: Arc::clone(&self.state),
            session_id: job.session_id,
            message_id: job.message_id,
        };
        let orchestrator = Arc::clone(&self.orchestrator);

        info!(
            session_id = job.session_id,
            message_id = job.message_id,
            model = %job.model_id,
            "[DISPATCH] Scheduling orchestration run"
        );

        Some(tokio::spawn(async move {
            let _run_guard = run_guard;
            // Sender dropped (finished or panicked) also means the turn is ours
            if let Some(previous) = previous {
                let _ = previous.await;
            }

            match orchestrator
                .orchestrate(job.session_id, job.message_id, &job.model_id, job.mode)
                .await
            {
                Ok(reply_id) => info!(
                    session_id = job.session_id,
                    message_id = job.message_id,
                    "[DISPATCH] Run finished, reply {}",
                    reply_id
                ),
                Err(e) if e.is_provider_error() => error!(
                    session_id = job.session_id,
                    message_id = job.message_id,
                    model = %job.model_id,
                    "[DISPATCH] Provider failed, no reply stored: {}",
                    e
                ),
                Err(e) => error!(
                    session_id = job.session_id,
                    message_id = job.message_id,
                    "[DISPATCH] Run failed: {}",
                    e
                ),
            }

            drop(done_tx);
        }))
    }

    /// Queued or running message ids and live session queues.
    #[cfg(test)]
    fn tracked(&self) -> (usize, usize) {
        let state = lock_state(&self.state);
        (state.in_flight.len(), state.sessions.len())
    }
}

fn lock_state(state: &Mutex<DispatchState>) -> MutexGuard<'_, DispatchState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Releases a run's bookkeeping when its task ends, panics included.
struct RunGuard {
    state: Arc<Mutex<DispatchState>>,
    session_id: i64,
    message_id: i64,
}

impl Drop for RunGuard {
    fn drop(&mut self) {
        let mut state = lock_state(&self.state);
        state.in_flight.remove(&self.message_id);

        let drained = match state.sessions.get_mut(&self.session_id) {
            Some(queue) => {
                queue.pending = queue.pending.saturating_sub(1);
                queue.pending == 0
            }
            None => false,
        };
        if drained {
            state.sessions.remove(&self.session_id);
        }
    }
}
