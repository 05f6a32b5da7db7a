//=========================================================================
// User Input
//
// Converts Winit window events into the small set of pointer and key
// events the host forwards to the application while interaction is open.
//
// Notes:
// - `KeyboardInput` becomes `KeyDown`/`KeyUp`; auto-repeat is dropped.
// - `MouseInput` becomes `PointerDown`/`PointerUp`.
// - `CursorMoved` becomes `PointerMoved`.
// - Everything else is not user input and maps to `None`.
//
//=========================================================================

use winit::event::{ElementState, MouseButton, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

//=== UserInput ===========================================================

/// Pointer or keyboard input, in window coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UserInput {
    PointerMoved { x: f32, y: f32 },
    PointerDown(MouseButton),
    PointerUp(MouseButton),
    KeyDown(KeyCode),
    KeyUp(KeyCode),
}

impl UserInput {
    /// Extracts user input from a window event, if it carries any.
    pub fn from_window_event(event: &WindowEvent) -> Option<Self> {
        match event {
            //--- Keyboard Input ------------------------------------------
            WindowEvent::KeyboardInput { event, .. } => {
                Self::from_key(event.physical_key, event.state, event.repeat)
            }

            //--- Mouse Button Input --------------------------------------
            WindowEvent::MouseInput { state, button, .. } => {
                Some(Self::from_mouse(*button, *state))
            }

            //--- Pointer Movement ----------------------------------------
            WindowEvent::CursorMoved { position, .. } => Some(Self::PointerMoved {
                x: position.x as f32,
                y: position.y as f32,
            }),

            _ => None,
        }
    }

    fn from_key(key: PhysicalKey, state: ElementState, repeat: bool) -> Option<Self> {
        if repeat {
            return None;
        }

        let PhysicalKey::Code(code) = key else {
            return None;
        };

        Some(match state {
            ElementState::Pressed => Self::KeyDown(code),
            ElementState::Released => Self::KeyUp(code),
        })
    }

    fn from_mouse(button: MouseButton, state: ElementState) -> Self {
        match state {
            ElementState::Pressed => Self::PointerDown(button),
            ElementState::Released => Self::PointerUp(button),
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
