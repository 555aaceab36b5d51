use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use shared::error::{EngineError, ProtocolError};

pub mod bus;
pub mod config;
pub mod controller;
pub mod error;
pub mod format;
pub mod selection;
pub mod subscriber;
pub mod telemetry;
pub mod view;

pub use bus::{Delivery, EventBus};
pub use config::{load_settings, Settings};
pub use controller::{CopySessionController, SessionState};
pub use error::{SessionError, SubscribeError};
pub use format::truncate_folder_path;
pub use selection::FolderSelection;
pub use subscriber::{ProgressSubscriber, Subscription};
pub use view::{Screen, SessionView};

/// Callback invoked by an [`EventSource`] for every payload on a channel.
///
/// An `Err` is a protocol violation; the event source reports it at its own
/// top-level boundary.
pub type EventHandler = Arc<dyn Fn(&serde_json::Value) -> Result<(), ProtocolError> + Send + Sync>;

/// Releases a listener registration. Consumed on use.
pub type Unlisten = Box<dyn FnOnce() -> Result<()> + Send>;

/// Host side of the copy engine: runs one copy and settles when it is done.
#[async_trait]
pub trait CopyEngine: Send + Sync {
    async fn start_copy(&self, source: &str, destination: &str) -> Result<(), EngineError>;
}

/// Host event registration (the `copy` / `skip` push channels).
#[async_trait]
pub trait EventSource: Send + Sync {
    async fn listen(&self, event: &str, handler: EventHandler) -> Result<Unlisten>;
}

/// Directory-only, single-selection chooser. `Ok(None)` means the user
/// cancelled.
#[async_trait]
pub trait FolderPicker: Send + Sync {
    async fn pick_folder(&self) -> Result<Option<String>>;
}

#[cfg(test)]
#[path = "tests/support.rs"]
mod test_support;
