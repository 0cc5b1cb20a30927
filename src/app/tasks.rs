use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::events::UserEvent;
use super::proxy::EventProxy;
use super::state::AppState;

use crate::core::{run_copy, CopyJob, CoreError};

/// Spawns a copy run on a blocking worker and forwards its events to `proxy`.
///
/// Job-level failures (missing or invalid folders, a panicked worker) are
/// reported once as [`UserEvent::ShowError`].
pub fn start_copy<P: EventProxy>(
    job: CopyJob,
    proxy: P,
    cancel_flag: Arc<AtomicBool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let worker_proxy = proxy.clone();
        let result = tokio::task::spawn_blocking(move || {
            run_copy(&job, &cancel_flag, |event| {
                worker_proxy.send_event(event.into())
            })
        })
        .await
        .map_err(CoreError::from)
        .and_then(|result| result);

        if let Err(e) = result {
            tracing::error!("Copy task ended with error: {}", e);
            proxy.send_event(UserEvent::ShowError(e.to_string()));
        }
    })
}

/// Builds a job from the session's options and starts it.
///
/// When a folder is missing the error is reported once and nothing starts.
pub fn start_copy_from_state<P: EventProxy>(proxy: P, state: Arc<Mutex<AppState>>) -> bool {
    let Ok(mut state_guard) = state.lock() else {
        tracing::error!("AppState mutex poisoned; refusing to start copy");
        return false;
    };

    if state_guard.is_copying {
        proxy.send_event(UserEvent::ShowError(
            "A copy is already running.".to_string(),
        ));
        return false;
    }

    let job = match state_guard.config.to_job() {
        Ok(job) => job,
        Err(e) => {
            tracing::warn!("Not starting copy: {}", e);
            proxy.send_event(UserEvent::ShowError(
                "Both source and destination folders must be selected.".to_string(),
            ));
            return false;
        }
    };

    let cancel_flag = state_guard.begin_copy();
    state_guard.copy_task = Some(start_copy(job, proxy, cancel_flag));
    true
}

/// A running copy with its ordered event stream.
pub struct CopyHandle {
    pub events: mpsc::UnboundedReceiver<UserEvent>,
    cancel_flag: Arc<AtomicBool>,
    task: JoinHandle<()>,
}

impl CopyHandle {
    /// Asks the worker to stop; the stream still ends with a `Finished` event.
    pub fn cancel(&self) {
        self.cancel_flag.store(true, Ordering::SeqCst);
    }

    /// Waits for the worker task itself to end.
    pub async fn join(self) -> Result<(), CoreError> {
        Ok(self.task.await?)
    }
}

/// Starts `job` and returns its event stream.
pub fn spawn_copy(job: CopyJob) -> CopyHandle {
    let (sender, events) = mpsc::unbounded_channel();
    let cancel_flag = Arc::new(AtomicBool::new(false));
    let task = start_copy(job, sender, cancel_flag.clone());
    CopyHandle {
        events,
        cancel_flag,
        task,
    }
}
