//! Action execution errors.
//!
//! None of these abort the simulation. The turn loop logs them with their
//! severity and reschedules the actor.

use crate::error::{ErrorSeverity, GameError};
use crate::state::{EntityId, Position};

/// Why a move could not be resolved. A failed move costs nothing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MoveError {
    #[error("actor {0} has no position")]
    ActorNotFound(EntityId),

    #[error("destination {destination} is out of bounds")]
    OutOfBounds { destination: Position },

    #[error("destination {destination} is not walkable")]
    Blocked { destination: Position },

    #[error("destination {destination} is occupied by {occupant}")]
    Occupied {
        destination: Position,
        occupant: EntityId,
    },
}

impl GameError for MoveError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::ActorNotFound(_) => ErrorSeverity::Internal,
            Self::OutOfBounds { .. } => ErrorSeverity::Validation,
            Self::Blocked { .. } | Self::Occupied { .. } => ErrorSeverity::Recoverable,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::ActorNotFound(_) => "MOVE_ACTOR_NOT_FOUND",
            Self::OutOfBounds { .. } => "MOVE_OUT_OF_BOUNDS",
            Self::Blocked { .. } => "MOVE_BLOCKED",
            Self::Occupied { .. } => "MOVE_OCCUPIED",
        }
    }
}

/// Why an attack could not be resolved.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AttackError {
    /// The target died, became a corpse, or was destroyed after the attack was queued.
    #[error("target {0} has no health")]
    TargetHasNoHealth(EntityId),
}

impl GameError for AttackError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::TargetHasNoHealth(_) => ErrorSeverity::Recoverable,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::TargetHasNoHealth(_) => "ATTACK_TARGET_HAS_NO_HEALTH",
        }
    }
}

/// Failure of any [`crate::Action`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ActionError {
    #[error(transparent)]
    Move(#[from] MoveError),

    #[error(transparent)]
    Attack(#[from] AttackError),
}

impl GameError for ActionError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Move(error) => error.severity(),
            Self::Attack(error) => error.severity(),
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Move(error) => error.error_code(),
            Self::Attack(error) => error.error_code(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    impl ErrorSeverity {
        fn is_recoverable(self) -> bool {
            matches!(self, Self::Recoverable)
        }
    }

    #[test]
    fn wrapped_errors_keep_their_classification() {
        let error = ActionError::from(MoveError::OutOfBounds {
            destination: Position::new(-1, 0),
        });
        assert_eq!(error.severity(), ErrorSeverity::Validation);
        assert_eq!(error.error_code(), "MOVE_OUT_OF_BOUNDS");
        assert_eq!(error.to_string(), "destination (-1, 0) is out of bounds");

        let error = ActionError::from(AttackError::TargetHasNoHealth(EntityId(7)));
        assert!(error.severity().is_recoverable());
        assert_eq!(error.to_string(), "target #7 has no health");
    }
}
