use std::time::Duration;

use paneline_common::{PanelineError, PlatformError, SessionId};

use crate::bus::Role;

#[derive(Debug, thiserror::Error)]
pub enum BusError {
    #[error("cannot publish to the {target} from the {role} side")]
    WrongDirection { role: Role, target: Role },

    #[error("no child window is attached")]
    NoChildWindow,

    #[error(transparent)]
    Platform(#[from] PlatformError),
}

#[derive(Debug, thiserror::Error)]
pub enum DialogError {
    #[error("a dialog is already open")]
    AlreadyOpen,

    #[error(transparent)]
    Platform(#[from] PlatformError),
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("no staged payload for session {0}")]
    SessionNotFound(SessionId),

    #[error("invalid launch payload: {0}")]
    InvalidPayload(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Dialog(#[from] DialogError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Bus(#[from] BusError),

    #[error("no dialog session is open")]
    NotOpen,

    #[error("no payload arrived within {0:?}")]
    ReadyTimeout(Duration),

    #[error("launch failed: {0}")]
    LaunchFailed(String),
}

impl From<SessionError> for PanelineError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::Dialog(DialogError::Platform(e)) => PanelineError::Platform(e),
            other => PanelineError::Dialog(other.to_string()),
        }
    }
}
