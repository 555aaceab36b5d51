//! Copy session state machine.
//!
//! A session moves `Idle -> Running -> Finished | Errored` and never goes
//! back. Progress handlers and the engine call settle independently, in any
//! order; whichever terminal transition happens first wins and later progress
//! events are dropped.

use std::{
    sync::{Arc, Mutex, MutexGuard},
    time::Duration,
};

use futures::future::join_all;
use shared::{
    domain::{FolderPath, FolderRole, ProgressCounters},
    protocol::ProgressChannel,
};
use storage::KeyValueStore;
use tokio::{sync::Mutex as AsyncMutex, time::timeout};
use tracing::{debug, info, warn};

use crate::{
    config::Settings,
    error::SessionError,
    selection::FolderSelection,
    subscriber::{ProgressSubscriber, Subscription},
    view::SessionView,
    CopyEngine, EventSource, FolderPicker,
};

/// Longest `start` waits for the progress listeners before invoking the
/// engine. Registrations that are still pending afterwards keep running and
/// pick up events once they land.
pub const LISTENER_ARM_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Idle {
        source: Option<FolderPath>,
        destination: Option<FolderPath>,
    },
    Running {
        counters: ProgressCounters,
    },
    Finished {
        counters: ProgressCounters,
    },
    Errored {
        message: String,
    },
}

impl SessionState {
    pub fn is_idle(&self) -> bool {
        matches!(self, SessionState::Idle { .. })
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SessionState::Finished { .. } | SessionState::Errored { .. }
        )
    }

    pub fn counters(&self) -> Option<ProgressCounters> {
        match self {
            SessionState::Running { counters } | SessionState::Finished { counters } => {
                Some(*counters)
            }
            SessionState::Idle { .. } | SessionState::Errored { .. } => None,
        }
    }
}

#[derive(Default)]
struct Subscriptions {
    active: Vec<Subscription>,
    closed: bool,
}

pub struct CopySessionController {
    engine: Arc<dyn CopyEngine>,
    subscriber: ProgressSubscriber,
    selection: AsyncMutex<FolderSelection>,
    state: Arc<Mutex<SessionState>>,
    subscriptions: AsyncMutex<Subscriptions>,
}

impl CopySessionController {
    /// Loads the saved folders and returns an idle session.
    pub async fn initialize(
        store: Arc<dyn KeyValueStore>,
        engine: Arc<dyn CopyEngine>,
        events: Arc<dyn EventSource>,
    ) -> Result<Self, SessionError> {
        let selection = FolderSelection::load(store)
            .await
            .map_err(|source| SessionError::Load { source })?;
        let state = SessionState::Idle {
            source: selection.source().cloned(),
            destination: selection.destination().cloned(),
        };
        info!(ready = selection.is_ready(), "copy session initialized");

        Ok(Self {
            engine,
            subscriber: ProgressSubscriber::new(events),
            selection: AsyncMutex::new(selection),
            state: Arc::new(Mutex::new(state)),
            subscriptions: AsyncMutex::new(Subscriptions::default()),
        })
    }

    pub fn state(&self) -> SessionState {
        lock_state(&self.state).clone()
    }

    pub fn view(&self, settings: &Settings) -> SessionView {
        SessionView::from_state(&self.state(), settings)
    }

    /// Whether `start` would be accepted right now.
    pub fn can_start(&self) -> bool {
        matches!(
            &*lock_state(&self.state),
            SessionState::Idle {
                source: Some(_),
                destination: Some(_),
            }
        )
    }

    pub async fn select_source(&self, path: impl Into<FolderPath>) -> Result<(), SessionError> {
        self.select(FolderRole::Source, path.into()).await
    }

    pub async fn select_destination(
        &self,
        path: impl Into<FolderPath>,
    ) -> Result<(), SessionError> {
        self.select(FolderRole::Destination, path.into()).await
    }

    /// Persists `path` for `role` and mirrors it into the idle state.
    pub async fn select(&self, role: FolderRole, path: FolderPath) -> Result<(), SessionError> {
        // `start` takes the selection lock for its check-and-set, so holding
        // it here keeps the session idle until the write lands.
        let mut selection = self.selection.lock().await;
        if !lock_state(&self.state).is_idle() {
            return Err(SessionError::NotIdle);
        }

        selection
            .select(role, path)
            .await
            .map_err(|source| SessionError::Persist { role, source })?;

        let mut state = lock_state(&self.state);
        if let SessionState::Idle {
            source,
            destination,
        } = &mut *state
        {
            *source = selection.source().cloned();
            *destination = selection.destination().cloned();
        } else {
            debug!(%role, "session left idle while saving; selection kept for next session");
        }
        Ok(())
    }

    /// Asks `picker` for a folder and selects it. Returns `false` when the
    /// user cancelled, which leaves everything unchanged.
    pub async fn choose_folder(
        &self,
        role: FolderRole,
        picker: &dyn FolderPicker,
    ) -> Result<bool, SessionError> {
        let picked = picker
            .pick_folder()
            .await
            .map_err(|source| SessionError::Picker { source })?;
        match picked {
            Some(path) => {
                self.select(role, FolderPath::from(path)).await?;
                Ok(true)
            }
            None => {
                debug!(%role, "folder selection cancelled");
                Ok(false)
            }
        }
    }

    /// Runs the copy: enters `Running`, arms both progress channels, then
    /// waits for the engine. Returns the terminal state.
    ///
    /// Rejected without side effects unless the session is idle with both
    /// folders selected.
    pub async fn start(&self) -> Result<SessionState, SessionError> {
        let (source, destination) = {
            let _selection = self.selection.lock().await;
            let mut state = lock_state(&self.state);
            let SessionState::Idle {
                source,
                destination,
            } = &*state
            else {
                return Err(SessionError::AlreadyStarted);
            };
            let (source, destination) = match (source, destination) {
                (Some(source), Some(destination)) => (source.clone(), destination.clone()),
                (None, _) => {
                    return Err(SessionError::NotReady {
                        missing: FolderRole::Source,
                    })
                }
                (Some(_), None) => {
                    return Err(SessionError::NotReady {
                        missing: FolderRole::Destination,
                    })
                }
            };
            *state = SessionState::Running {
                counters: ProgressCounters::default(),
            };
            (source, destination)
        };
        info!(%source, %destination, "copy started");

        self.arm_progress().await;

        let outcome = self
            .engine
            .start_copy(source.as_str(), destination.as_str())
            .await;

        let mut state = lock_state(&self.state);
        if let SessionState::Running { counters } = *state {
            *state = match outcome {
                Ok(()) => {
                    info!(
                        copied = counters.copied,
                        skipped = counters.skipped,
                        "copy finished"
                    );
                    SessionState::Finished { counters }
                }
                Err(err) => {
                    warn!(error = %err, "copy failed");
                    SessionState::Errored {
                        message: err.message,
                    }
                }
            };
        }
        Ok(state.clone())
    }

    /// Releases both progress subscriptions, waiting for registrations that
    /// are still pending. Safe to call more than once and concurrently with
    /// `start`; listeners armed after teardown are released by `start` itself.
    pub async fn teardown(&self) {
        let released = {
            let mut subscriptions = self.subscriptions.lock().await;
            subscriptions.closed = true;
            std::mem::take(&mut subscriptions.active)
        };
        if released.is_empty() {
            return;
        }

        let results = join_all(released.into_iter().map(Subscription::release)).await;
        let clean = results.iter().filter(|ok| **ok).count();
        info!(
            released = results.len(),
            clean, "copy session torn down"
        );
    }

    /// Registers both progress listeners and waits at most
    /// [`LISTENER_ARM_TIMEOUT`] for them before the copy is allowed to begin.
    async fn arm_progress(&self) {
        if self.subscriptions.lock().await.closed {
            warn!("session torn down before progress listeners were armed");
            return;
        }

        let mut armed: Vec<Subscription> = ProgressChannel::ALL
            .into_iter()
            .map(|channel| {
                let state = Arc::clone(&self.state);
                self.subscriber
                    .subscribe(channel, move |count| apply_count(&state, channel, count))
            })
            .collect();

        let ready = timeout(
            LISTENER_ARM_TIMEOUT,
            join_all(armed.iter_mut().map(Subscription::ready)),
        )
        .await;
        match ready {
            Ok(results) => {
                for err in results.into_iter().filter_map(Result::err) {
                    warn!(error = %err, "progress listener unavailable; counts will not update");
                }
            }
            Err(_) => {
                let pending: Vec<ProgressChannel> = armed
                    .iter()
                    .filter(|subscription| !subscription.is_active())
                    .map(Subscription::channel)
                    .collect();
                warn!(
                    ?pending,
                    timeout_ms = LISTENER_ARM_TIMEOUT.as_millis() as u64,
                    "progress listeners still registering; starting copy anyway"
                );
            }
        }

        let mut subscriptions = self.subscriptions.lock().await;
        if !subscriptions.closed {
            subscriptions.active.extend(armed);
            return;
        }
        drop(subscriptions);

        debug!("session torn down while arming; releasing listeners");
        for subscription in armed {
            if subscription.is_active() {
                subscription.release().await;
            }
            // Pending registrations unlisten from `Drop` once they resolve.
        }
    }
}

/// Replaces the channel's counter with the engine's absolute count while the
/// session is running. Anything else is ignored.
fn apply_count(state: &Mutex<SessionState>, channel: ProgressChannel, count: u64) {
    let mut state = lock_state(state);
    match &mut *state {
        SessionState::Running { counters } => {
            match channel {
                ProgressChannel::Copy => counters.copied = count,
                ProgressChannel::Skip => counters.skipped = count,
            }
            debug!(%channel, count, "progress updated");
        }
        other => {
            debug!(%channel, count, state = ?other, "progress event ignored");
        }
    }
}

fn lock_state(state: &Mutex<SessionState>) -> MutexGuard<'_, SessionState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
