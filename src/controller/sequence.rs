//=========================================================================
// Transition Sequence
//=========================================================================
//
// The state-switch protocol, expressed as explicit steps.
//
// Only one asynchronous step is in flight at a time. It is identified by
// the ticket of the playback it waits on; a completion carrying any other
// ticket is either the loop cue, a manual blocker effect, or stale.
//
// Sequence for set_state(next) with a fully entered `prev`:
//
//   exit_start(prev) → prev out anim ──StateOut──→ curtain out
//     ──CurtainOut──→ hide + exit(prev) → [queued? restart] → enter(next)
//     → (load?) → Visible → curtain in ──CurtainIn──→ next in anim
//     ──StateIn──→ unblock → [queued? restart] → enter_done(next)
//
// First activation skips straight to enter(next). A request made while
// `prev` is still loading cancels it and enters `next` directly.
//
//=========================================================================

//=== External Dependencies ===============================================

use log::{debug, trace, warn};

//=== Internal Dependencies ===============================================

use super::StateController;
use crate::core::command::Command;
use crate::core::display::{Animator, Completion, Cue, PlaybackResult, Ticket};
use crate::core::event::{ControllerSignal, TransitionEvent, TransitionEventKind};
use crate::core::state::Continuation;
use crate::error::ControllerError;

//=== Pending Step ========================================================

/// Asynchronous step the sequence is waiting on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Step {
    /// Outgoing panel's transition-out animation.
    StateOut,

    /// Transition visual covering the screen.
    CurtainOut,

    /// Transition visual uncovering the screen.
    CurtainIn,

    /// Incoming panel's transition-in animation.
    StateIn,
}

#[derive(Debug, Clone, Copy)]
pub(super) struct PendingStep {
    pub(super) ticket: Ticket,
    pub(super) step: Step,
}

//=== Manual Transitions ==================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum ManualKind {
    /// `show_transition_out`: cover the screen and block.
    Show,

    /// `show_transition_in`: uncover the screen and unblock.
    Hide,
}

/// A blocker effect started outside the state-switch sequence.
pub(super) struct ManualTransition<A: Animator> {
    kind: ManualKind,
    callback: Box<dyn FnOnce(&mut StateController<A>)>,
}

//=== Public Operations ===================================================

impl<A: Animator> StateController<A> {
    //--- Navigation -------------------------------------------------------

    /// Switches to the state registered as `id`.
    ///
    /// If a transition or load is in progress the request is queued and
    /// replaces any earlier queued request. Switching to the current state
    /// re-runs its full exit/enter cycle.
    ///
    /// # Errors
    ///
    /// [`ControllerError::UnknownState`] if `id` is not registered,
    /// [`ControllerError::Destroyed`] after [`destroy`](Self::destroy).
    /// Either way the controller is left untouched.
    pub fn set_state(&mut self, id: &str) -> Result<(), ControllerError> {
        if self.destroyed {
            warn!(target: "states", "set_state('{}') on destroyed controller", id);
            return Err(ControllerError::Destroyed);
        }
        if !self.states.contains_key(id) {
            return Err(ControllerError::UnknownState(id.to_owned()));
        }

        if self.is_transitioning {
            match self.queued_id.replace(id.to_owned()) {
                Some(replaced) => {
                    debug!(target: "states", "Queued state '{}' replaced by '{}'", replaced, id)
                }
                None => debug!(target: "states", "Transition in progress, queued '{}'", id),
            }
            return Ok(());
        }

        self.block_interaction();
        self.previous_id = self.current_id.replace(id.to_owned());

        match self.previous_id.clone() {
            None => self.begin_first_activation(id),
            Some(previous) if self.is_loading => self.redirect_from_loading(&previous),
            Some(previous) => self.begin_transition_out(&previous),
        }
        Ok(())
    }

    /// Re-runs the full exit/enter cycle of the current state.
    ///
    /// # Errors
    ///
    /// [`ControllerError::NoCurrentState`] before any state was activated.
    pub fn refresh(&mut self) -> Result<(), ControllerError> {
        if self.destroyed {
            return Err(ControllerError::Destroyed);
        }

        let current = self
            .current_id
            .clone()
            .ok_or(ControllerError::NoCurrentState)?;
        debug!(target: "states", "Refreshing state '{}'", current);
        self.set_state(&current)
    }

    //--- Loading ----------------------------------------------------------

    /// Ends the load the state `id` declared, bypassing its [`LoadHandle`].
    ///
    /// Calling this without an outstanding load logs a warning and does
    /// nothing.
    ///
    /// [`LoadHandle`]: crate::core::state::LoadHandle
    ///
    /// # Errors
    ///
    /// [`ControllerError::UnknownState`] if `id` is not registered.
    pub fn end_load(&mut self, id: &str) -> Result<(), ControllerError> {
        if self.destroyed {
            return Err(ControllerError::Destroyed);
        }
        if !self.states.contains_key(id) {
            return Err(ControllerError::UnknownState(id.to_owned()));
        }

        self.finish_load(id, None);
        Ok(())
    }

    /// Announces that the active state started loading.
    ///
    /// Runs automatically after a hook calls `begin_load`. Publishes
    /// `onLoadingStart` and keeps the transition visual looping.
    pub fn loading_start(&mut self) {
        if self.destroyed {
            return;
        }

        self.events.publish(ControllerSignal::LoadingStart);
        self.loop_transition();
    }

    /// Announces that the active state finished loading.
    pub fn loading_done(&mut self) {
        if self.destroyed {
            return;
        }

        self.events.publish(ControllerSignal::LoadingDone);
    }

    //--- Manual Blocker Effects -------------------------------------------

    /// Covers the screen with the transition visual and blocks input.
    ///
    /// `callback` runs once the out cue completes. The loop cue then keeps
    /// playing until [`show_transition_in`](Self::show_transition_in).
    pub fn show_transition_out<F>(&mut self, callback: F)
    where
        F: FnOnce(&mut Self) + 'static,
    {
        if self.destroyed {
            warn!(target: "states", "show_transition_out() on destroyed controller");
            return;
        }

        self.block_interaction();
        self.events.publish(ControllerSignal::BlockerShow);
        self.play_manual(ManualKind::Show, Cue::TransitionOut, Box::new(callback));
    }

    /// Uncovers the screen and restores input once the in cue completes.
    pub fn show_transition_in<F>(&mut self, callback: F)
    where
        F: FnOnce(&mut Self) + 'static,
    {
        if self.destroyed {
            warn!(target: "states", "show_transition_in() on destroyed controller");
            return;
        }

        self.events.publish(ControllerSignal::BlockerHide);
        self.play_manual(ManualKind::Hide, Cue::TransitionIn, Box::new(callback));
    }

    //--- Command Processing -----------------------------------------------

    /// Processes queued completions, load results and state requests.
    ///
    /// Handles at most the configured pump limit per call; the rest waits
    /// for the next pump. Returns how many commands were handled.
    pub fn pump(&mut self) -> usize {
        if self.destroyed {
            let dropped = self.commands.discard();
            if dropped > 0 {
                trace!(target: "states", "Discarded {} commands after destroy", dropped);
            }
            return 0;
        }

        let mut processed = 0;
        while processed < self.pump_limit {
            let Some(command) = self.commands.next() else {
                break;
            };
            processed += 1;
            self.dispatch(command);

            if self.destroyed {
                self.commands.discard();
                break;
            }
        }

        if processed >= self.pump_limit {
            self.commands.report_backlog(processed);
        }
        processed
    }
}

//=== Sequence Steps ======================================================

impl<A: Animator> StateController<A> {
    //--- Dispatch ---------------------------------------------------------

    fn dispatch(&mut self, command: Command) {
        trace!(target: "states", "Dispatching {:?}", command);

        match command {
            Command::Playback { ticket, result } => self.on_playback(ticket, result),
            Command::EndLoad { id, generation } => self.finish_load(&id, Some(generation)),
            Command::SetState(id) => {
                if let Err(e) = self.set_state(&id) {
                    warn!(target: "states", "Requested state '{}' rejected: {}", id, e);
                }
            }
        }
    }

    fn on_playback(&mut self, ticket: Ticket, result: PlaybackResult) {
        if let Some(pending) = self.pending.filter(|p| p.ticket == ticket) {
            self.pending = None;
            if let Err(e) = &result {
                warn!(target: "states", "{:?} playback failed ({}), continuing", pending.step, e);
            }
            self.advance(pending.step);
        } else if self.loop_ticket == Some(ticket) {
            self.loop_ticket = None;
            match result {
                Ok(()) => self.loop_transition(),
                Err(e) => debug!(target: "states", "Transition loop ended: {}", e),
            }
        } else if let Some(manual) = self.manual.remove(&ticket) {
            if let Err(e) = &result {
                warn!(target: "states", "{:?} blocker effect failed ({}), continuing", manual.kind, e);
            }
            self.finish_manual(manual);
        } else {
            trace!(target: "states", "Ignoring stale completion {:?}", ticket);
        }
    }

    fn advance(&mut self, step: Step) {
        match step {
            Step::StateOut => self.on_state_out_done(),
            Step::CurtainOut => self.on_curtain_out_done(),
            Step::CurtainIn => self.on_curtain_in_done(),
            Step::StateIn => self.on_state_in_done(),
        }
    }

    //--- Entry Points -----------------------------------------------------

    fn begin_first_activation(&mut self, id: &str) {
        debug!(target: "states", "First activation: '{}'", id);

        self.is_transitioning = true;
        self.transition.set_visible(true);
        self.loop_transition();
        self.events.publish(ControllerSignal::InitDone);

        self.is_loading = true;
        self.enter_current();
    }

    fn redirect_from_loading(&mut self, previous: &str) {
        debug!(
            target: "states",
            "Canceling '{}' while loading, entering '{}'",
            previous,
            self.current_id.as_deref().unwrap_or_default()
        );

        if let Some(slot) = self.states.get_mut(previous) {
            slot.internal_cancel(&mut self.animator, self.commands.sender());
        }
        self.after_hook(previous);

        self.previous_id = None;
        self.is_loading = true;
        self.enter_current();
    }

    fn begin_transition_out(&mut self, previous: &str) {
        debug!(
            target: "states",
            "Transitioning '{}' → '{}'",
            previous,
            self.current_id.as_deref().unwrap_or_default()
        );

        self.is_transitioning = true;
        if let Some(slot) = self.states.get_mut(previous) {
            slot.internal_exit_start(self.commands.sender());
        }
        self.after_hook(previous);

        self.events.publish(TransitionEvent::with_visible(
            TransitionEventKind::TransitionOut,
            self.current_id.clone(),
            Some(previous.to_owned()),
        ));

        let done = self.issue(Step::StateOut);
        if let Some(slot) = self.states.get_mut(previous) {
            slot.transition_out(&mut self.animator, done);
        }
    }

    //--- Outgoing Half ----------------------------------------------------

    fn on_state_out_done(&mut self) {
        let previous = self.previous_id.clone();
        if let Some(slot) = previous.as_deref().and_then(|id| self.states.get_mut(id)) {
            slot.finish_transition();
        }

        self.events.publish(TransitionEvent::with_visible(
            TransitionEventKind::TransitionOutDone,
            self.current_id.clone(),
            previous,
        ));
        self.events.publish(ControllerSignal::TransitionOut);

        let done = self.issue(Step::CurtainOut);
        self.play_transition(Cue::TransitionOut, done);
    }

    fn on_curtain_out_done(&mut self) {
        self.events.publish(ControllerSignal::TransitionOutDone);
        self.is_transitioning = false;

        let previous = self.previous_id.take();
        self.events.publish(TransitionEvent::with_visible(
            TransitionEventKind::Hidden,
            self.current_id.clone(),
            previous.clone(),
        ));

        if let Some(id) = previous.as_deref() {
            if let Some(slot) = self.states.get_mut(id) {
                slot.set_panel_visible(false);
                slot.internal_exit(&mut self.animator, self.commands.sender());
            }
            self.after_hook(id);
        }

        if !self.process_queue() {
            self.is_loading = true;
            self.enter_current();
        }
    }

    //--- Incoming Half ----------------------------------------------------

    fn enter_current(&mut self) {
        let Some(id) = self.current_id.clone() else {
            return;
        };
        let Some(slot) = self.states.get_mut(&id) else {
            return;
        };

        let proceed = slot.internal_enter(
            &mut self.animator,
            self.commands.sender(),
            Continuation::StateLoaded,
        );
        self.after_hook(&id);

        if proceed.is_some() {
            self.on_state_loaded();
        }
    }

    fn on_state_loaded(&mut self) {
        self.is_loading = false;
        self.is_transitioning = true;

        let current = self.current_id.clone();
        self.events.publish(TransitionEvent::new(
            TransitionEventKind::Visible,
            current.clone(),
        ));
        if let Some(slot) = current.as_deref().and_then(|id| self.states.get_mut(id)) {
            slot.set_panel_visible(true);
        }

        self.events.publish(ControllerSignal::TransitionIn);

        let done = self.issue(Step::CurtainIn);
        self.play_transition(Cue::TransitionIn, done);
    }

    fn on_curtain_in_done(&mut self) {
        self.transition.set_visible(false);
        self.events.publish(ControllerSignal::TransitionInDone);

        let current = self.current_id.clone();
        self.events.publish(TransitionEvent::new(
            TransitionEventKind::TransitionIn,
            current.clone(),
        ));

        let done = self.issue(Step::StateIn);
        if let Some(slot) = current.as_deref().and_then(|id| self.states.get_mut(id)) {
            slot.transition_in(&mut self.animator, done);
        }
    }

    fn on_state_in_done(&mut self) {
        let current = self.current_id.clone();
        if let Some(slot) = current.as_deref().and_then(|id| self.states.get_mut(id)) {
            slot.finish_transition();
        }

        self.events.publish(TransitionEvent::new(
            TransitionEventKind::TransitionInDone,
            current.clone(),
        ));
        self.is_transitioning = false;
        self.unblock_interaction();

        if self.process_queue() {
            return;
        }

        if let Some(id) = current.as_deref() {
            if let Some(slot) = self.states.get_mut(id) {
                slot.internal_enter_done(self.commands.sender());
            }
            self.after_hook(id);
        }
    }

    //--- Queue ------------------------------------------------------------

    /// Starts the queued request, if any. Returns true if one was started.
    fn process_queue(&mut self) -> bool {
        let Some(id) = self.queued_id.take() else {
            return false;
        };

        debug!(target: "states", "Resuming queued state '{}'", id);
        match self.set_state(&id) {
            Ok(()) => true,
            Err(e) => {
                warn!(target: "states", "Queued state '{}' dropped: {}", id, e);
                false
            }
        }
    }

    //--- Loading ----------------------------------------------------------

    fn finish_load(&mut self, id: &str, generation: Option<u64>) {
        let Some(slot) = self.states.get_mut(id) else {
            warn!(target: "states::load", "Load finished for unknown state '{}'", id);
            return;
        };

        match slot.end_load(generation) {
            Err(e) => warn!(target: "states::load", "State '{}': {}", id, e),
            Ok(continuation) => {
                debug!(target: "states::load", "State '{}' finished loading", id);
                self.loading_done();

                let is_current = self.current_id.as_deref() == Some(id);
                if continuation == Some(Continuation::StateLoaded) && is_current {
                    self.on_state_loaded();
                }
            }
        }
    }

    //--- Transition Visual ------------------------------------------------

    /// Plays `cue` on the transition visual with its configured sound.
    fn play_transition(&mut self, cue: Cue, done: Completion) {
        if cue != Cue::Loop {
            self.loop_ticket = None;
            self.transition.set_visible(true);
        }

        self.play_sound(cue);
        self.animator.play(self.transition.name(), cue, done);
    }

    /// Replays the loop cue for as long as nothing else takes the visual.
    fn loop_transition(&mut self) {
        if !self.animator.has_animation(self.transition.name(), Cue::Loop) {
            self.loop_ticket = None;
            return;
        }

        let ticket = self.next_ticket();
        self.loop_ticket = Some(ticket);
        let done = Completion::new(ticket, self.commands.sender().clone());
        self.play_transition(Cue::Loop, done);
    }

    fn play_sound(&mut self, cue: Cue) {
        let (Some(sounds), Some(audio)) = (self.sounds.as_ref(), self.audio.as_mut()) else {
            return;
        };
        let Some(sound) = sounds.for_cue(cue) else {
            return;
        };

        if audio.is_ready() {
            audio.play(sound);
        } else {
            trace!(target: "states", "Audio not ready, skipping '{}'", sound.alias);
        }
    }

    //--- Manual Blocker Effects -------------------------------------------

    fn play_manual(
        &mut self,
        kind: ManualKind,
        cue: Cue,
        callback: Box<dyn FnOnce(&mut StateController<A>)>,
    ) {
        let ticket = self.next_ticket();
        self.manual.insert(ticket, ManualTransition { kind, callback });

        let done = Completion::new(ticket, self.commands.sender().clone());
        self.play_transition(cue, done);
    }

    fn finish_manual(&mut self, manual: ManualTransition<A>) {
        match manual.kind {
            ManualKind::Show => {
                self.loop_transition();
                self.events.publish(ControllerSignal::BlockerShowDone);
            }
            ManualKind::Hide => {
                self.unblock_interaction();
                self.events.publish(ControllerSignal::BlockerHideDone);
            }
        }

        (manual.callback)(self);
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
