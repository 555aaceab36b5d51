//! Scoped listener registrations for the engine's progress channels.
//!
//! Registration runs on the runtime in the background, so a [`Subscription`]
//! exists before its listener is live. Releasing it waits for the registration
//! to settle first, which keeps teardown leak-free even when it races with
//! arming.

use std::{mem, sync::Arc};

use shared::{
    error::ProtocolError,
    protocol::{CountPayload, ProgressChannel},
};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::{error::SubscribeError, EventHandler, EventSource, Unlisten};

pub struct ProgressSubscriber {
    source: Arc<dyn EventSource>,
}

impl ProgressSubscriber {
    pub fn new(source: Arc<dyn EventSource>) -> Self {
        Self { source }
    }

    /// Starts listening on `channel`, calling `on_value` with each validated
    /// count. Must be called from within a tokio runtime.
    ///
    /// Subscribing twice to the same channel without releasing the first
    /// subscription registers two listeners.
    pub fn subscribe<F>(&self, channel: ProgressChannel, on_value: F) -> Subscription
    where
        F: Fn(u64) + Send + Sync + 'static,
    {
        let handler: EventHandler = Arc::new(
            move |payload: &serde_json::Value| -> Result<(), ProtocolError> {
                let CountPayload { count } = CountPayload::parse(channel, payload)?;
                on_value(count);
                Ok(())
            },
        );
        let source = Arc::clone(&self.source);
        let registration =
            tokio::spawn(async move { source.listen(channel.event_name(), handler).await });
        debug!(%channel, "listener registration started");

        Subscription {
            channel,
            state: Registration::Pending(registration),
        }
    }
}

enum Registration {
    Pending(JoinHandle<anyhow::Result<Unlisten>>),
    Active(Unlisten),
    Failed,
    Released,
}

/// Handle to one listener registration. Released exactly once, either by
/// [`Subscription::release`] or, as a fallback, on drop.
pub struct Subscription {
    channel: ProgressChannel,
    state: Registration,
}

impl Subscription {
    pub fn channel(&self) -> ProgressChannel {
        self.channel
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, Registration::Active(_))
    }

    /// Waits until the listener is registered.
    pub async fn ready(&mut self) -> Result<(), SubscribeError> {
        let channel = self.channel;
        let outcome = match &mut self.state {
            Registration::Pending(task) => task.await,
            Registration::Active(_) => return Ok(()),
            Registration::Failed => {
                return Err(SubscribeError::Aborted {
                    channel,
                    reason: "registration failed earlier".to_string(),
                })
            }
            Registration::Released => {
                return Err(SubscribeError::Aborted {
                    channel,
                    reason: "subscription already released".to_string(),
                })
            }
        };

        match outcome {
            Ok(Ok(unlisten)) => {
                self.state = Registration::Active(unlisten);
                debug!(%channel, "listener active");
                Ok(())
            }
            Ok(Err(source)) => {
                self.state = Registration::Failed;
                Err(SubscribeError::Register { channel, source })
            }
            Err(join_err) => {
                self.state = Registration::Failed;
                Err(SubscribeError::Aborted {
                    channel,
                    reason: join_err.to_string(),
                })
            }
        }
    }

    /// Waits for a pending registration, then unlistens. Failures are logged
    /// and never returned; the result tells whether the listener was removed
    /// cleanly.
    pub async fn release(mut self) -> bool {
        let channel = self.channel;
        if let Err(err) = self.ready().await {
            warn!(%channel, error = %err, "listener never became active; nothing to release");
            return false;
        }
        match mem::replace(&mut self.state, Registration::Released) {
            Registration::Active(unlisten) => invoke_unlisten(channel, unlisten),
            _ => false,
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        let channel = self.channel;
        match mem::replace(&mut self.state, Registration::Released) {
            Registration::Active(unlisten) => {
                warn!(%channel, "subscription dropped without release");
                invoke_unlisten(channel, unlisten);
            }
            Registration::Pending(task) => match tokio::runtime::Handle::try_current() {
                Ok(runtime) => {
                    runtime.spawn(async move {
                        if let Ok(Ok(unlisten)) = task.await {
                            invoke_unlisten(channel, unlisten);
                        }
                    });
                }
                Err(_) => {
                    warn!(%channel, "pending registration dropped outside a runtime; listener may leak");
                }
            },
            Registration::Failed | Registration::Released => {}
        }
    }
}

fn invoke_unlisten(channel: ProgressChannel, unlisten: Unlisten) -> bool {
    match unlisten() {
        Ok(()) => {
            debug!(%channel, "listener released");
            true
        }
        Err(err) => {
            warn!(%channel, error = %err, "failed to release listener");
            false
        }
    }
}

#[cfg(test)]
#[path = "tests/subscriber_tests.rs"]
mod tests;
