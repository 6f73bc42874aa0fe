//! Error classification shared by the core and its hosts.
//!
//! Each action keeps its own error enum next to the action (`MoveError` in
//! `action::movement`, and so on). What they have in common lives here: how
//! bad a failure is and a stable code for logs and game events.
//!
//! None of these stop the turn loop. A failed action costs the actor a retry,
//! a vanished entity is skipped, and the player dying shows up as
//! [`crate::GameStatus::Lost`], not as an error value.

/// How the turn loop and hosts should treat a failure.
///
/// The turn loop logs `Internal` and `Fatal` failures at warn level and the
/// rest at debug, since blocked moves and stale attacks happen every turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::IntoStaticStr, strum::Display)]
#[strum(serialize_all = "lowercase")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// The world got in the way: a wall, another body, a target that already
    /// fell. The actor simply tries again later.
    Recoverable,
    /// The request itself was wrong, such as stepping off the map or naming
    /// an entity that was never spawned.
    Validation,
    /// The store disagrees with itself, e.g. an actor lost its position in
    /// the middle of its own turn.
    Internal,
    /// The session cannot go on.
    Fatal,
}

impl ErrorSeverity {
    pub fn as_str(self) -> &'static str {
        self.into()
    }

    /// Whether this points at a bug rather than ordinary play.
    pub const fn is_internal(self) -> bool {
        matches!(self, Self::Internal | Self::Fatal)
    }
}

/// Implemented by every error the core or runtime hands back.
pub trait GameError: core::fmt::Display + core::fmt::Debug {
    fn severity(&self) -> ErrorSeverity;

    /// Upper-case code carried in [`crate::GameEvent::ActionFailed`] and logs,
    /// e.g. `MOVE_BLOCKED`.
    fn error_code(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_internal_and_fatal_count_as_bugs() {
        assert!(!ErrorSeverity::Recoverable.is_internal());
        assert!(!ErrorSeverity::Validation.is_internal());
        assert!(ErrorSeverity::Internal.is_internal());
        assert!(ErrorSeverity::Fatal.is_internal());
        assert_eq!(ErrorSeverity::Validation.as_str(), "validation");
        assert_eq!(ErrorSeverity::Recoverable.to_string(), "recoverable");
    }
}
