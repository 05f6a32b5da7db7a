//=========================================================================
// Prelude
//=========================================================================
//
// Convenience module that re-exports commonly used types and traits.
//
// Usage:
//   use panel_states::prelude::*;
//
//=========================================================================

//=== Public API ==========================================================

// Controller
pub use crate::controller::{StateController, StateControllerBuilder, StateView};

// State contract
pub use crate::core::state::{LoadHandle, StateContext, StateId, StateLifecycle};

// Notifications
pub use crate::core::event::{
    ControllerSignal, EventChannel, Notification, TransitionEvent, TransitionEventKind,
};

// Collaborators
pub use crate::core::display::{
    Animator, AudioCue, AudioPlayer, Completion, Cue, InteractionBlocker, NullBlocker,
    TransitionSounds, Visual,
};

// Errors
pub use crate::error::{ControllerError, LoadError, PlaybackError};

// Host
pub use crate::platform::{InteractionGate, Platform, PlatformError, UserInput};
