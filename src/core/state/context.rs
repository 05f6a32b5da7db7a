//=========================================================================
// State Context
//=========================================================================
//
// What a state may touch from inside its hooks: its own id and panel,
// its flags (read-only), the load declaration and navigation requests.
//
// Requests that affect the controller are queued as commands and take
// effect on the controller's next pump, never inside the hook itself.
//
//=========================================================================

//=== External Dependencies ===============================================

use crossbeam_channel::Sender;
use log::{debug, warn};

//=== Internal Dependencies ===============================================

use super::slot::StateFlags;
use super::StateId;
use crate::core::command::Command;
use crate::core::display::Visual;
use crate::error::LoadError;

//=== StateContext ========================================================

/// Access handed to every [`StateLifecycle`](super::StateLifecycle) hook.
pub struct StateContext<'a> {
    id: &'a str,
    flags: &'a mut StateFlags,
    panel: &'a mut dyn Visual,
    commands: &'a Sender<Command>,
}

impl<'a> StateContext<'a> {
    pub(crate) fn new(
        id: &'a str,
        flags: &'a mut StateFlags,
        panel: &'a mut dyn Visual,
        commands: &'a Sender<Command>,
    ) -> Self {
        Self {
            id,
            flags,
            panel,
            commands,
        }
    }

    //--- Queries ----------------------------------------------------------

    /// Id this state was registered under.
    pub fn id(&self) -> &str {
        self.id
    }

    /// The panel this state controls.
    pub fn panel(&mut self) -> &mut dyn Visual {
        &mut *self.panel
    }

    /// True once the state is fully entered and accepting interaction.
    pub fn is_enabled(&self) -> bool {
        self.flags.enabled
    }

    /// True if the controller considers this the active state.
    pub fn is_active(&self) -> bool {
        self.flags.active
    }

    /// True while a declared load is outstanding.
    pub fn is_loading(&self) -> bool {
        self.flags.loading
    }

    /// True if the last entry was canceled before it completed.
    pub fn is_canceled(&self) -> bool {
        self.flags.canceled
    }

    //--- Loading ----------------------------------------------------------

    /// Declares asynchronous work that must finish before entry proceeds.
    ///
    /// Call from `on_enter`. The controller holds the transition (looping
    /// the transition visual) until the returned handle is finished.
    /// Returns `None`, with a warning, if a load is already outstanding.
    pub fn begin_load(&mut self) -> Option<LoadHandle> {
        if self.flags.loading {
            warn!(target: "states::load", "State '{}': {}", self.id, LoadError::AlreadyLoading);
            return None;
        }

        debug!(target: "states::load", "State '{}' began loading", self.id);

        self.flags.loading = true;
        self.flags.load_started = true;
        self.flags.pending_load_complete = self.flags.pending_proceed.take();

        Some(LoadHandle {
            id: self.id.to_owned(),
            generation: self.flags.generation,
            sender: self.commands.clone(),
        })
    }

    //--- Navigation -------------------------------------------------------

    /// Asks the controller to switch to `id` on its next pump.
    pub fn request_state(&self, id: impl Into<StateId>) {
        let id = id.into();
        debug!(target: "states", "State '{}' requested state '{}'", self.id, id);

        if self.commands.send(Command::SetState(id)).is_err() {
            warn!(target: "states", "State '{}': controller gone, request dropped", self.id);
        }
    }
}

//=== LoadHandle ==========================================================

/// Completes a load declared with [`StateContext::begin_load`].
///
/// `Send`, so it can travel to a loader thread. Finishing a handle from
/// an earlier entry of the state (after it was canceled and re-entered)
/// is ignored with a warning.
#[derive(Debug)]
pub struct LoadHandle {
    id: StateId,
    generation: u64,
    sender: Sender<Command>,
}

impl LoadHandle {
    /// Id of the state that declared the load.
    pub fn state_id(&self) -> &str {
        &self.id
    }

    /// Signals that the load finished; entry resumes on the next pump.
    pub fn finish(self) {
        let command = Command::EndLoad {
            id: self.id,
            generation: self.generation,
        };
        if self.sender.send(command).is_err() {
            warn!(target: "states::load", "Controller gone, load completion dropped");
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
