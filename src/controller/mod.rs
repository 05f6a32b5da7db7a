//=========================================================================
// State Controller
//=========================================================================
//
// Owns the registry of panel states and sequences every switch between
// them.
//
// Architecture:
//   StateController<A: Animator>
//     ├─ states: HashMap<StateId, StateSlot>
//     ├─ current_id / previous_id / queued_id
//     ├─ is_loading / is_transitioning      (busy ≡ either)
//     ├─ pending: Option<PendingStep>       (single in-flight async step)
//     ├─ commands: CommandQueue             (completions, loads, requests)
//     └─ events: EventChannel               (notifications out)
//
// Flow:
//   set_state() → exit-start old → old out anim → curtain out → hide old
//              → enter new (maybe load) → curtain in → new in anim
//              → unblock → enter-done (or resume the queued request)
//
// The controller is single-threaded. Every asynchronous step resolves
// through the command queue and is consumed by `pump()`, which `update()`
// calls at the start of each tick.
//
//=========================================================================

//=== Module Declarations =================================================

mod builder;
mod sequence;

//=== Public API ==========================================================

pub use builder::StateControllerBuilder;

//=== External Dependencies ===============================================

use std::collections::HashMap;
use std::time::Duration;

use crossbeam_channel::Receiver;
use log::{debug, info, warn};

//=== Internal Dependencies ===============================================

use crate::core::command::CommandQueue;
use crate::core::display::{
    Animator, AudioPlayer, Completion, InteractionBlocker, Ticket, TransitionSounds, Visual,
};
use crate::core::event::{EventChannel, Notification};
use crate::core::state::{StateId, StateLifecycle, StateSlot};
use crate::error::ControllerError;
use sequence::{ManualTransition, PendingStep, Step};

//=== StateController =====================================================

/// Sequences transitions between registered panel states.
///
/// Build one with [`StateControllerBuilder`]. Register states, then call
/// [`set_state`](Self::set_state). Feed [`update`](Self::update) from the
/// host's frame loop so completions and load results get processed.
///
/// While a switch is animating, further [`set_state`](Self::set_state)
/// calls are deferred: only the most recent one is kept and it runs once
/// the current sequence reaches a safe point.
pub struct StateController<A: Animator> {
    animator: A,
    transition: Box<dyn Visual>,
    sounds: Option<TransitionSounds>,
    audio: Option<Box<dyn AudioPlayer>>,
    blocker: Box<dyn InteractionBlocker>,

    events: EventChannel,
    commands: CommandQueue,
    pump_limit: usize,

    states: HashMap<StateId, StateSlot>,
    current_id: Option<StateId>,
    previous_id: Option<StateId>,
    queued_id: Option<StateId>,

    is_loading: bool,
    is_transitioning: bool,
    destroyed: bool,

    pending: Option<PendingStep>,
    loop_ticket: Option<Ticket>,
    manual: HashMap<Ticket, ManualTransition<A>>,
    next_ticket: u64,
}

impl<A: Animator> StateController<A> {
    //--- Registration -----------------------------------------------------

    /// Registers `state` under `id`, controlling `panel`.
    ///
    /// The state is forced into the exited sub-state: its panel is hidden
    /// and its `on_exit` hook runs. Registration never activates a state.
    ///
    /// # Errors
    ///
    /// [`ControllerError::DuplicateState`] if `id` is taken,
    /// [`ControllerError::Destroyed`] after [`destroy`](Self::destroy).
    pub fn register_state<S, P>(
        &mut self,
        id: impl Into<StateId>,
        state: S,
        panel: P,
    ) -> Result<(), ControllerError>
    where
        S: StateLifecycle + 'static,
        P: Visual + 'static,
    {
        let id = id.into();

        if self.destroyed {
            warn!(target: "states", "Ignoring registration of '{}' on destroyed controller", id);
            return Err(ControllerError::Destroyed);
        }
        if self.states.contains_key(&id) {
            return Err(ControllerError::DuplicateState(id));
        }

        let mut slot = StateSlot::new(id.clone(), Box::new(state), Box::new(panel));
        slot.internal_exit(&mut self.animator, self.commands.sender());

        info!(target: "states", "Registered state '{}'", id);
        self.states.insert(id, slot);
        Ok(())
    }

    //--- Queries ----------------------------------------------------------

    /// Id of the current state, if any state was ever activated.
    pub fn current_id(&self) -> Option<&str> {
        self.current_id.as_deref()
    }

    /// The current state.
    pub fn current_state(&self) -> Option<StateView<'_>> {
        self.current_id
            .as_deref()
            .and_then(|id| self.states.get(id))
            .map(StateView::new)
    }

    /// Id of the state being transitioned out, only set mid-transition.
    pub fn previous_id(&self) -> Option<&str> {
        self.previous_id.as_deref()
    }

    /// The request deferred while a transition was playing.
    pub fn queued_id(&self) -> Option<&str> {
        self.queued_id.as_deref()
    }

    /// Looks a registered state up by id.
    ///
    /// # Errors
    ///
    /// [`ControllerError::UnknownState`] if nothing is registered as `id`.
    pub fn state_by_id(&self, id: &str) -> Result<StateView<'_>, ControllerError> {
        self.states
            .get(id)
            .map(StateView::new)
            .ok_or_else(|| ControllerError::UnknownState(id.to_owned()))
    }

    /// Ids of all registered states, in no particular order.
    pub fn state_ids(&self) -> impl Iterator<Item = &str> {
        self.states.keys().map(String::as_str)
    }

    /// Number of registered states.
    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    /// True while a state is loading or a transition is playing.
    pub fn is_busy(&self) -> bool {
        self.is_loading || self.is_transitioning
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn is_transitioning(&self) -> bool {
        self.is_transitioning
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// The shared visual played between states.
    pub fn transition_visual(&self) -> &dyn Visual {
        self.transition.as_ref()
    }

    /// The injected animator.
    pub fn animator(&self) -> &A {
        &self.animator
    }

    //--- Notifications ----------------------------------------------------

    /// Subscribes to every notification published from now on.
    pub fn subscribe(&mut self) -> Receiver<Notification> {
        self.events.subscribe()
    }

    //--- Configuration ----------------------------------------------------

    /// Swaps the shared transition visual, returning the old one.
    pub fn change_transition_visual<V>(&mut self, clip: V) -> Box<dyn Visual>
    where
        V: Visual + 'static,
    {
        let old = std::mem::replace(&mut self.transition, Box::new(clip));
        debug!(
            target: "states",
            "Transition visual '{}' replaced by '{}'",
            old.name(),
            self.transition.name()
        );
        old
    }

    //--- Frame Update -----------------------------------------------------

    /// Processes pending commands, then ticks the current state.
    pub fn update(&mut self, elapsed: Duration) {
        self.pump();

        if self.destroyed {
            return;
        }

        let Some(id) = self.current_id.clone() else {
            return;
        };

        if let Some(slot) = self.states.get_mut(&id) {
            slot.update(self.commands.sender(), elapsed);
        }
        self.after_hook(&id);
    }

    //--- Teardown ---------------------------------------------------------

    /// Stops all playback and destroys every registered state.
    ///
    /// Each state's `on_exit` and `on_destroy` hooks run exactly once and
    /// the registry ends up empty. The controller rejects or ignores every
    /// call afterwards.
    pub fn destroy(&mut self) {
        if self.destroyed {
            warn!(target: "states", "destroy() called on an already destroyed controller");
            return;
        }

        info!(target: "states", "Destroying state controller ({} states)", self.states.len());
        self.destroyed = true;

        self.animator.stop(self.transition.name());
        if let (Some(audio), Some(sounds)) = (self.audio.as_mut(), self.sounds.as_ref()) {
            for cue in sounds.iter() {
                audio.stop(&cue.alias);
            }
        }

        self.pending = None;
        self.loop_ticket = None;
        self.manual.clear();
        self.queued_id = None;
        self.current_id = None;
        self.previous_id = None;
        self.is_loading = false;
        self.is_transitioning = false;

        for (_, mut slot) in self.states.drain() {
            slot.destroy(&mut self.animator, self.commands.sender());
        }

        self.commands.discard();
        self.events.clear();
    }

    //--- Internal Helpers -------------------------------------------------

    fn next_ticket(&mut self) -> Ticket {
        self.next_ticket += 1;
        Ticket(self.next_ticket)
    }

    /// Records `step` as the single in-flight step and returns its token.
    fn issue(&mut self, step: Step) -> Completion {
        let ticket = self.next_ticket();
        self.pending = Some(PendingStep { ticket, step });
        Completion::new(ticket, self.commands.sender().clone())
    }

    fn block_interaction(&mut self) {
        self.blocker.set_interactive(false);
    }

    fn unblock_interaction(&mut self) {
        self.blocker.set_interactive(true);
    }

    /// Forwards a `begin_load` made inside the last hook of `id`.
    fn after_hook(&mut self, id: &str) {
        let started = self
            .states
            .get_mut(id)
            .is_some_and(|slot| slot.take_load_started());

        if started {
            self.loading_start();
        }
    }
}

//=== StateView ===========================================================

/// Read-only view of a registered state and its lifecycle flags.
#[derive(Clone, Copy)]
pub struct StateView<'a> {
    slot: &'a StateSlot,
}

impl<'a> StateView<'a> {
    fn new(slot: &'a StateSlot) -> Self {
        Self { slot }
    }

    pub fn id(&self) -> &'a str {
        self.slot.id()
    }

    pub fn is_active(&self) -> bool {
        self.slot.flags().active
    }

    pub fn is_enabled(&self) -> bool {
        self.slot.flags().enabled
    }

    pub fn is_loading(&self) -> bool {
        self.slot.flags().loading
    }

    pub fn is_canceled(&self) -> bool {
        self.slot.flags().canceled
    }

    pub fn is_transitioning(&self) -> bool {
        self.slot.flags().transitioning
    }

    pub fn is_destroyed(&self) -> bool {
        self.slot.flags().destroyed
    }

    pub fn is_panel_visible(&self) -> bool {
        self.slot.panel().is_visible()
    }

    pub fn panel(&self) -> &'a dyn Visual {
        self.slot.panel()
    }

    pub fn state(&self) -> &'a dyn StateLifecycle {
        self.slot.state()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
