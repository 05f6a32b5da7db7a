//=========================================================================
// Error Types
//=========================================================================
//
// Three tiers of failure:
// - `ControllerError`: precondition violations returned to the caller
// - `LoadError`: begin/end load protocol misuse, logged and ignored
// - `PlaybackError`: animation failures delivered through a completion
//
//=========================================================================

//=== External Dependencies ===============================================

use thiserror::Error;

//=== Internal Dependencies ===============================================

use crate::core::display::Cue;
use crate::core::state::StateId;

//=== ControllerError =====================================================

/// Precondition violations on the controller's public API.
///
/// A call that returns one of these leaves the controller untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ControllerError {
    /// No state was registered under this id.
    #[error("no state registered with id '{0}'")]
    UnknownState(StateId),

    /// A state is already registered under this id.
    #[error("state id '{0}' is already registered")]
    DuplicateState(StateId),

    /// `refresh()` was called before any state became current.
    #[error("no current state to refresh")]
    NoCurrentState,

    /// The controller was destroyed and can no longer be used.
    #[error("state controller has been destroyed")]
    Destroyed,
}

//=== LoadError ===========================================================

/// Misuse of the `begin_load` / `end_load` pairing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LoadError {
    #[error("begin_load() was called while the state is already loading")]
    AlreadyLoading,

    #[error("end_load() was called without a load started, call begin_load() first")]
    NotLoading,

    #[error("load handle belongs to an earlier entry of the state")]
    Stale,
}

//=== PlaybackError =======================================================

/// Reasons an animation cue did not play to completion.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlaybackError {
    /// The target has no animation for the cue.
    #[error("no animation for cue '{}'", .0.label())]
    Missing(Cue),

    /// Playback was stopped before reaching its end.
    #[error("playback interrupted")]
    Interrupted,

    /// The completion token was dropped without being resolved.
    #[error("completion dropped without being resolved")]
    Abandoned,

    /// Backend-specific failure.
    #[error("animation backend error: {0}")]
    Backend(String),
}

//=========================================================================
// Unit Tests
//=========================================================================
