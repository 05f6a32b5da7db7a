//=========================================================================
// Panel States — Library Root
//
// Coordinates a set of named panel states for games and sites built on a
// scene-graph display library. Exactly one state is current at a time;
// switching states runs an ordered, single-flight sequence of exit,
// transition-out, load, transition-in and enter-done steps.
//
// Responsibilities:
// - Expose the `StateController` and the `StateLifecycle` contract
// - Define the collaborator contracts (visuals, animator, audio, blocker)
// - Provide an optional winit host that drives the controller each frame
//
// Typical usage:
// ```ignore
// use panel_states::prelude::*;
//
// let mut controller = StateControllerBuilder::new(animator, curtain)
//     .with_blocker(gate.clone())
//     .build();
//
// controller.register_state("title", TitleState::default(), title_panel)?;
// controller.register_state("game", GameState::default(), game_panel)?;
// controller.set_state("title")?;
// ```
//
//=========================================================================

//--- Public Modules ------------------------------------------------------
//
// `core` holds the state contract, notifications and collaborator traits.
// `controller` holds the transition sequencer and its builder.
// `platform` hosts a controller inside a winit window.
//
pub mod controller;
pub mod core;
pub mod error;
pub mod platform;
pub mod prelude;

//--- Test Support --------------------------------------------------------

#[cfg(test)]
pub(crate) mod test_support;

//--- Public Exports ------------------------------------------------------

pub use controller::{StateController, StateControllerBuilder, StateView};
pub use error::{ControllerError, LoadError, PlaybackError};
