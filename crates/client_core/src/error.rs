use shared::{domain::FolderRole, protocol::ProgressChannel};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("cannot start copy: no {missing} folder selected")]
    NotReady { missing: FolderRole },
    #[error("copy session already started")]
    AlreadyStarted,
    #[error("folders can only be changed before the copy starts")]
    NotIdle,
    #[error("failed to load saved folder selection: {source}")]
    Load { source: anyhow::Error },
    #[error("failed to save {role} folder: {source}")]
    Persist {
        role: FolderRole,
        source: anyhow::Error,
    },
    #[error("folder picker failed: {source}")]
    Picker { source: anyhow::Error },
}

#[derive(Debug, Error)]
pub enum SubscribeError {
    #[error("failed to register {channel} listener: {source}")]
    Register {
        channel: ProgressChannel,
        source: anyhow::Error,
    },
    #[error("{channel} listener registration did not complete: {reason}")]
    Aborted {
        channel: ProgressChannel,
        reason: String,
    },
}
