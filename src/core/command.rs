//=========================================================================
// Command Queue
//=========================================================================
//
// Deferred inputs to the controller, consumed at pump boundaries.
//
// Architecture:
//   Completion::finish() ─┐
//   LoadHandle::finish() ─┼─→ Sender<Command> ─→ CommandQueue::next()
//   request_state()      ─┘                        ↓
//                                          StateController::pump()
//
// Producers never touch the controller directly, so a completion fired
// from inside `Animator::play` cannot re-enter the sequence. Collection
// is bounded per pump to keep one frame from starving the host.
//
//=========================================================================

//=== External Dependencies ===============================================

use crossbeam_channel::{unbounded, Receiver, Sender, TryRecvError};
use log::warn;

//=== Internal Dependencies ===============================================

use crate::core::display::{PlaybackResult, Ticket};
use crate::core::state::StateId;

//=== Command =============================================================

/// Deferred request addressed to the controller.
#[derive(Debug)]
pub(crate) enum Command {
    /// A playback request finished (or failed).
    Playback { ticket: Ticket, result: PlaybackResult },

    /// A state finished the load it declared with `begin_load`.
    EndLoad { id: StateId, generation: u64 },

    /// A state asked the controller to switch states.
    SetState(StateId),
}

//=== CommandQueue ========================================================

/// Channel-backed queue of [`Command`]s.
pub(crate) struct CommandQueue {
    sender: Sender<Command>,
    receiver: Receiver<Command>,
}

impl CommandQueue {
    pub(crate) fn new() -> Self {
        let (sender, receiver) = unbounded();
        Self { sender, receiver }
    }

    /// Sender handed to completions, load handles and state contexts.
    pub(crate) fn sender(&self) -> &Sender<Command> {
        &self.sender
    }

    /// Takes the next pending command, if any.
    ///
    /// The queue holds its own sender, so it never reports disconnection.
    pub(crate) fn next(&self) -> Option<Command> {
        match self.receiver.try_recv() {
            Ok(command) => Some(command),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }

    /// Number of commands waiting.
    pub(crate) fn len(&self) -> usize {
        self.receiver.len()
    }

    /// Discards every pending command, returning how many were dropped.
    pub(crate) fn discard(&self) -> usize {
        let mut dropped = 0;
        while self.next().is_some() {
            dropped += 1;
        }
        dropped
    }

    /// Logs a backlog once a pump hit its limit with work remaining.
    pub(crate) fn report_backlog(&self, processed: usize) {
        let remaining = self.len();
        if remaining > 0 {
            warn!(
                target: "states",
                "Command backlog: processed {} commands this pump, {} still queued",
                processed,
                remaining
            );
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
