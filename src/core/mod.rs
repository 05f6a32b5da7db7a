//=========================================================================
// Core
//
// Building blocks the controller is assembled from.
//
// Responsibilities:
// - `state`: the lifecycle contract states implement and the per-state
//   bookkeeping the controller keeps
// - `event`: lifecycle notifications and their fan-out channel
// - `display`: collaborator contracts (visuals, animator, audio, blocker)
//   and the completion token handed to animators
// - `command`: the deferred-input queue the controller pumps
//
// Notes:
// Nothing in here sequences transitions; that lives in `controller`.
// Everything asynchronous reaches the controller as a `Command`, which
// keeps callbacks from re-entering it mid-step.
//
//=========================================================================

pub(crate) mod command;
pub mod display;
pub mod event;
pub mod state;
