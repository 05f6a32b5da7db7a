//=========================================================================
// Interaction Gate
//=========================================================================
//
// Shared open/closed flag between the controller and the window host.
//
// The controller closes the gate while transitions play (through the
// `InteractionBlocker` contract); the host reads it before forwarding
// user input. Both sides hold a clone of the same gate.
//
//=========================================================================

use std::cell::Cell;
use std::rc::Rc;

use crate::core::display::InteractionBlocker;

//=== InteractionGate =====================================================

/// Cloneable interaction flag; every clone observes the same state.
#[derive(Debug, Clone)]
pub struct InteractionGate {
    open: Rc<Cell<bool>>,
}

impl InteractionGate {
    /// Creates an open gate.
    pub fn new() -> Self {
        Self {
            open: Rc::new(Cell::new(true)),
        }
    }

    /// True while user input should reach the application.
    pub fn is_open(&self) -> bool {
        self.open.get()
    }
}

impl Default for InteractionGate {
    fn default() -> Self {
        Self::new()
    }
}

impl InteractionBlocker for InteractionGate {
    fn set_interactive(&mut self, interactive: bool) {
        self.open.set(interactive);
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
