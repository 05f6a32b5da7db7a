//=========================================================================
// State Slot
//=========================================================================
//
// Controller-side bookkeeping wrapped around one registered state.
//
// The `internal_*` methods are the only way the controller drives a
// state. Each updates the flags first, then calls the matching hook with
// a fresh `StateContext`.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::time::Duration;

use crossbeam_channel::Sender;
use log::warn;

//=== Internal Dependencies ===============================================

use super::{StateContext, StateId, StateLifecycle};
use crate::core::command::Command;
use crate::core::display::{Animator, Completion, Cue, Visual};
use crate::error::LoadError;

//=== Continuation ========================================================

/// Step the controller resumes once a state finishes entering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Continuation {
    /// Continue with the transition in of the entered state.
    StateLoaded,
}

//=== StateFlags ==========================================================

/// Per-state lifecycle flags.
#[derive(Debug, Default)]
pub(crate) struct StateFlags {
    pub(crate) active: bool,
    pub(crate) enabled: bool,
    pub(crate) loading: bool,
    pub(crate) canceled: bool,
    pub(crate) transitioning: bool,
    pub(crate) destroyed: bool,

    /// Bumped on every entry; identifies which entry a load belongs to.
    pub(crate) generation: u64,

    /// Continuation held while `on_enter` runs.
    pub(crate) pending_proceed: Option<Continuation>,

    /// Continuation parked by `begin_load` until the load finishes.
    pub(crate) pending_load_complete: Option<Continuation>,

    /// Set by `begin_load`; the controller consumes it after each hook.
    pub(crate) load_started: bool,
}

//=== StateSlot ===========================================================

pub(crate) struct StateSlot {
    id: StateId,
    state: Box<dyn StateLifecycle>,
    panel: Box<dyn Visual>,
    flags: StateFlags,
}

impl StateSlot {
    //--- Construction -----------------------------------------------------

    pub(crate) fn new(id: StateId, state: Box<dyn StateLifecycle>, panel: Box<dyn Visual>) -> Self {
        Self {
            id,
            state,
            panel,
            flags: StateFlags::default(),
        }
    }

    //--- Queries ----------------------------------------------------------

    pub(crate) fn id(&self) -> &str {
        &self.id
    }

    pub(crate) fn state(&self) -> &dyn StateLifecycle {
        self.state.as_ref()
    }

    pub(crate) fn panel(&self) -> &dyn Visual {
        self.panel.as_ref()
    }

    pub(crate) fn flags(&self) -> &StateFlags {
        &self.flags
    }

    pub(crate) fn generation(&self) -> u64 {
        self.flags.generation
    }

    /// Returns and clears the "load started" marker left by `begin_load`.
    pub(crate) fn take_load_started(&mut self) -> bool {
        std::mem::take(&mut self.flags.load_started)
    }

    pub(crate) fn set_panel_visible(&mut self, visible: bool) {
        self.panel.set_visible(visible);
    }

    //--- Exit -------------------------------------------------------------

    /// Exits the state: stops its animation, disables it, hides the panel.
    pub(crate) fn internal_exit(&mut self, animator: &mut dyn Animator, commands: &Sender<Command>) {
        self.stop_transition(animator);
        self.flags.enabled = false;
        self.panel.set_visible(false);
        self.flags.active = false;

        self.with_context(commands, |state, ctx| state.on_exit(ctx));
    }

    /// Tells the state it is about to be replaced.
    pub(crate) fn internal_exit_start(&mut self, commands: &Sender<Command>) {
        self.with_context(commands, |state, ctx| state.on_exit_start(ctx));
    }

    //--- Enter ------------------------------------------------------------

    /// Enters the state.
    ///
    /// Returns `proceed` back if the state entered synchronously. Returns
    /// `None` if the state declared a load; the continuation then comes
    /// back out of [`end_load`](Self::end_load).
    pub(crate) fn internal_enter(
        &mut self,
        animator: &mut dyn Animator,
        commands: &Sender<Command>,
        proceed: Continuation,
    ) -> Option<Continuation> {
        self.stop_transition(animator);
        self.flags.enabled = false;
        self.flags.active = true;
        self.flags.canceled = false;
        self.flags.generation = self.flags.generation.wrapping_add(1);
        self.flags.pending_proceed = Some(proceed);

        self.with_context(commands, |state, ctx| state.on_enter(ctx));

        self.flags.pending_proceed.take()
    }

    /// Finishes a declared load.
    ///
    /// `generation` is checked when the request came through a
    /// [`LoadHandle`](super::LoadHandle).
    pub(crate) fn end_load(&mut self, generation: Option<u64>) -> Result<Option<Continuation>, LoadError> {
        if generation.is_some_and(|g| g != self.flags.generation) {
            return Err(LoadError::Stale);
        }
        if !self.flags.loading {
            return Err(LoadError::NotLoading);
        }

        self.flags.loading = false;
        Ok(self.flags.pending_load_complete.take())
    }

    /// Abandons an entry that is still loading.
    pub(crate) fn internal_cancel(&mut self, animator: &mut dyn Animator, commands: &Sender<Command>) {
        self.flags.active = false;
        self.flags.canceled = true;
        self.flags.loading = false;
        self.flags.pending_proceed = None;
        self.flags.pending_load_complete = None;

        self.internal_exit(animator, commands);
        self.with_context(commands, |state, ctx| state.on_cancel(ctx));
    }

    /// Enables the state once its transition in has fully played.
    pub(crate) fn internal_enter_done(&mut self, commands: &Sender<Command>) {
        if self.flags.canceled {
            return;
        }

        self.flags.enabled = true;
        self.with_context(commands, |state, ctx| state.on_enter_done(ctx));
    }

    //--- Panel Animation --------------------------------------------------

    pub(crate) fn transition_in(&mut self, animator: &mut dyn Animator, done: Completion) {
        self.flags.transitioning = true;
        animator.play(self.panel.name(), Cue::TransitionIn, done);
    }

    pub(crate) fn transition_out(&mut self, animator: &mut dyn Animator, done: Completion) {
        self.flags.enabled = false;
        self.flags.transitioning = true;
        animator.play(self.panel.name(), Cue::TransitionOut, done);
    }

    /// Marks the panel animation started by `transition_in/out` as ended.
    pub(crate) fn finish_transition(&mut self) {
        self.flags.transitioning = false;
    }

    //--- Frame Update -----------------------------------------------------

    pub(crate) fn update(&mut self, commands: &Sender<Command>, elapsed: Duration) {
        self.with_context(commands, |state, ctx| state.update(ctx, elapsed));
    }

    //--- Teardown ---------------------------------------------------------

    /// Runs the exit hook and the destroy hook. The slot is dead afterwards.
    pub(crate) fn destroy(&mut self, animator: &mut dyn Animator, commands: &Sender<Command>) {
        if self.flags.destroyed {
            warn!(target: "states", "State '{}' destroyed twice", self.id);
            return;
        }

        self.stop_transition(animator);
        self.with_context(commands, |state, ctx| state.on_exit(ctx));
        self.state.on_destroy();

        self.flags.destroyed = true;
        self.flags.active = false;
        self.flags.enabled = false;
        self.flags.loading = false;
        self.flags.pending_proceed = None;
        self.flags.pending_load_complete = None;
    }

    //--- Internal Helpers -------------------------------------------------

    fn stop_transition(&mut self, animator: &mut dyn Animator) {
        if self.flags.transitioning {
            self.flags.transitioning = false;
            animator.stop(self.panel.name());
        }
    }

    fn with_context<R>(
        &mut self,
        commands: &Sender<Command>,
        hook: impl FnOnce(&mut dyn StateLifecycle, &mut StateContext<'_>) -> R,
    ) -> R {
        let mut ctx = StateContext::new(&self.id, &mut self.flags, self.panel.as_mut(), commands);
        hook(self.state.as_mut(), &mut ctx)
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
