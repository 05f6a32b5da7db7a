//=========================================================================
// State Controller Builder
//=========================================================================
//
// Fluent configuration of a `StateController` before first use.
//
// ```text
//     StateControllerBuilder ──build()──> StateController
//         │
//         ├─ with_sounds()
//         ├─ with_audio()
//         ├─ with_blocker()
//         └─ with_pump_limit()
// ```
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::HashMap;

use log::info;

//=== Internal Dependencies ===============================================

use super::StateController;
use crate::core::command::CommandQueue;
use crate::core::display::{
    Animator, AudioPlayer, InteractionBlocker, NullBlocker, TransitionSounds, Visual,
};
use crate::core::event::EventChannel;

//=== Defaults ============================================================

/// Commands handled per pump unless configured otherwise.
const DEFAULT_PUMP_LIMIT: usize = 100;

//=== StateControllerBuilder ==============================================

/// Builder for configuring and constructing a [`StateController`].
///
/// The animator and the transition visual are required; everything else
/// is optional.
///
/// # Default Values
///
/// - **Sounds**: none
/// - **Audio player**: none (sounds are skipped)
/// - **Blocker**: [`NullBlocker`]
/// - **Pump limit**: 100 commands
///
/// # Examples
///
/// ```no_run
/// # use panel_states::prelude::*;
/// # fn demo(animator: impl Animator, curtain: impl Visual + 'static, gate: InteractionGate) {
/// let sounds = TransitionSounds {
///     transition_in: Some("curtain_open".into()),
///     transition_out: Some("curtain_close".into()),
///     looped: None,
/// };
///
/// let controller = StateControllerBuilder::new(animator, curtain)
///     .with_sounds(sounds)
///     .with_blocker(gate)
///     .build();
/// # }
/// ```
pub struct StateControllerBuilder<A: Animator> {
    animator: A,
    transition: Box<dyn Visual>,
    sounds: Option<TransitionSounds>,
    audio: Option<Box<dyn AudioPlayer>>,
    blocker: Option<Box<dyn InteractionBlocker>>,
    pump_limit: usize,
}

impl<A: Animator> StateControllerBuilder<A> {
    /// Creates a builder around the animator and the shared transition
    /// visual.
    pub fn new<V>(animator: A, transition: V) -> Self
    where
        V: Visual + 'static,
    {
        Self {
            animator,
            transition: Box::new(transition),
            sounds: None,
            audio: None,
            blocker: None,
            pump_limit: DEFAULT_PUMP_LIMIT,
        }
    }

    /// Sounds played alongside the transition visual's cues.
    pub fn with_sounds(mut self, sounds: TransitionSounds) -> Self {
        self.sounds = Some(sounds);
        self
    }

    /// Player for the configured sounds.
    pub fn with_audio<P>(mut self, audio: P) -> Self
    where
        P: AudioPlayer + 'static,
    {
        self.audio = Some(Box::new(audio));
        self
    }

    /// Receives interaction blocking while transitions play.
    pub fn with_blocker<B>(mut self, blocker: B) -> Self
    where
        B: InteractionBlocker + 'static,
    {
        self.blocker = Some(Box::new(blocker));
        self
    }

    /// Maximum number of commands handled per [`pump`](StateController::pump).
    ///
    /// Default: 100
    ///
    /// # Panics
    ///
    /// Panics if `limit == 0`.
    pub fn with_pump_limit(mut self, limit: usize) -> Self {
        assert!(limit > 0, "Pump limit must be positive");
        self.pump_limit = limit;
        self
    }

    /// Builds the controller.
    ///
    /// Any animation on the transition visual is stopped and interaction is
    /// enabled. No state is current until the first
    /// [`set_state`](StateController::set_state).
    pub fn build(self) -> StateController<A> {
        info!(
            target: "states",
            "Building state controller (transition: '{}', pump limit: {})",
            self.transition.name(),
            self.pump_limit
        );

        let mut controller = StateController {
            animator: self.animator,
            transition: self.transition,
            sounds: self.sounds,
            audio: self.audio,
            blocker: self.blocker.unwrap_or_else(|| Box::new(NullBlocker)),
            events: EventChannel::new(),
            commands: CommandQueue::new(),
            pump_limit: self.pump_limit,
            states: HashMap::new(),
            current_id: None,
            previous_id: None,
            queued_id: None,
            is_loading: false,
            is_transitioning: false,
            destroyed: false,
            pending: None,
            loop_ticket: None,
            manual: HashMap::new(),
            next_ticket: 0,
        };

        controller.animator.stop(controller.transition.name());
        controller.unblock_interaction();
        controller
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
