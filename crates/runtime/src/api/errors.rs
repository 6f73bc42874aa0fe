//! Unified error types surfaced by the runtime API.
//!
//! Wraps failures from worker coordination, world setup, and rejected
//! commands so clients can bubble them up with consistent context.
use thiserror::Error;
use tokio::sync::oneshot;

use game_core::{EntityId, ErrorSeverity, GameError};

use crate::oracle::MapError;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("simulation worker command channel closed")]
    CommandChannelClosed,

    #[error("simulation worker reply channel closed")]
    ReplyChannelClosed(#[source] oneshot::error::RecvError),

    #[error("simulation worker join failed")]
    WorkerJoin(#[source] tokio::task::JoinError),

    #[error("invalid runtime configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Map(#[from] MapError),

    #[error("world has no player")]
    NoPlayer,

    #[error("entity {entity} cannot accept actions")]
    ActionRejected { entity: EntityId },

    #[error("the game is over")]
    GameOver,
}

impl GameError for RuntimeError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::CommandChannelClosed | Self::ReplyChannelClosed(_) | Self::WorkerJoin(_) => {
                ErrorSeverity::Fatal
            }
            Self::InvalidConfig(_) | Self::Map(_) | Self::NoPlayer => ErrorSeverity::Internal,
            Self::ActionRejected { .. } => ErrorSeverity::Validation,
            Self::GameOver => ErrorSeverity::Recoverable,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::CommandChannelClosed => "RUNTIME_COMMAND_CHANNEL_CLOSED",
            Self::ReplyChannelClosed(_) => "RUNTIME_REPLY_CHANNEL_CLOSED",
            Self::WorkerJoin(_) => "RUNTIME_WORKER_JOIN",
            Self::InvalidConfig(_) => "RUNTIME_INVALID_CONFIG",
            Self::Map(_) => "RUNTIME_MAP",
            Self::NoPlayer => "RUNTIME_NO_PLAYER",
            Self::ActionRejected { .. } => "RUNTIME_ACTION_REJECTED",
            Self::GameOver => "RUNTIME_GAME_OVER",
        }
    }
}
