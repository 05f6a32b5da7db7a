//=========================================================================
// Platform Subsystem
//
// Hosts a `StateController` inside a Winit window.
//
// Architecture:
// ```text
//  Main Thread:
//  ┌───────────────────────────────────────────┐
//  │  Winit Event Loop                         │
//  │   ├─ CloseRequested → controller.destroy()│
//  │   ├─ Cursor/Mouse/Keyboard                │
//  │   │    ↓ UserInput                        │
//  │   │  InteractionGate open? ──no──→ drop   │
//  │   │    ↓ yes                              │
//  │   │  input handler(&mut controller, ..)   │
//  │   └─ RedrawRequested                      │
//  │        ↓                                  │
//  │      controller.update(elapsed)           │
//  │        ↓                                  │
//  │      request next frame                   │
//  └───────────────────────────────────────────┘
// ```
//
// The controller is single-threaded, so the host keeps it on the main
// thread. Animation players and loaders may still resolve completions
// from other threads; those land in the controller's command queue and
// are picked up on the next redraw.
//
//=========================================================================

//=== Submodules ==========================================================

mod gate;
mod input;

//=== Public API ==========================================================

pub use gate::InteractionGate;
pub use input::UserInput;

//=== External Crates =====================================================

use std::time::{Duration, Instant};

use log::*;
use thiserror::Error;
use winit::{
    application::ApplicationHandler,
    dpi::LogicalSize,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, EventLoop},
    window::{Window, WindowAttributes, WindowId},
};

//=== Internal Imports ====================================================

use crate::controller::StateController;
use crate::core::display::Animator;

//=== PlatformError =======================================================

/// Platform initialization and runtime errors.
///
/// These are fatal: without an event loop the host cannot run.
#[derive(Debug, Error)]
pub enum PlatformError {
    /// Failed to create event loop (rare, indicates OS-level issue).
    #[error("Event loop creation failed: {0}")]
    EventLoopCreation(#[source] winit::error::EventLoopError),

    /// Event loop execution error.
    #[error("Event loop error: {0}")]
    EventLoopExecution(#[source] winit::error::EventLoopError),
}

//=== Platform ============================================================

type InputHandler<A> = Box<dyn FnMut(&mut StateController<A>, &UserInput)>;

/// Window host that drives a [`StateController`] every frame.
///
/// # Lifecycle
///
/// 1. **Construction**: `Platform::new(controller, gate)`
/// 2. **Execution**: `platform.run()` starts the event loop
/// 3. **Frames**: each redraw ticks the controller
/// 4. **Shutdown**: closing the window destroys the controller and exits
///
/// The `gate` must be the same [`InteractionGate`] given to the
/// controller's builder as its blocker, so that input is held back while
/// transitions play.
///
/// # Examples
///
/// ```no_run
/// # use panel_states::prelude::*;
/// # fn demo(animator: impl Animator, curtain: impl Visual + 'static) -> Result<(), Box<dyn std::error::Error>> {
/// let gate = InteractionGate::new();
/// let controller = StateControllerBuilder::new(animator, curtain)
///     .with_blocker(gate.clone())
///     .build();
///
/// Platform::new(controller, gate)
///     .with_title("Panel States")
///     .on_input(|controller, input| {
///         if let UserInput::KeyDown(_) = input {
///             let _ = controller.refresh();
///         }
///     })
///     .run()?;
/// # Ok(())
/// # }
/// ```
pub struct Platform<A: Animator> {
    /// OS window handle (None until `resumed()` called).
    window: Option<Window>,

    controller: StateController<A>,
    gate: InteractionGate,
    input_handler: Option<InputHandler<A>>,

    title: String,
    inner_size: LogicalSize<u32>,

    /// Time of the previous tick; elapsed time is measured from it.
    last_tick: Option<Instant>,
}

impl<A: Animator> Platform<A> {
    //--- Construction -----------------------------------------------------

    /// Wraps `controller`. Does not create the window yet.
    pub fn new(controller: StateController<A>, gate: InteractionGate) -> Self {
        info!(target: "platform", "Platform subsystem initialized");
        Self {
            window: None,
            controller,
            gate,
            input_handler: None,
            title: String::from("Panel States"),
            inner_size: LogicalSize::new(800, 600),
            last_tick: None,
        }
    }

    /// Window title. Default: "Panel States".
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Initial window size in logical pixels. Default: 800x600.
    ///
    /// # Panics
    ///
    /// Panics if either dimension is zero.
    pub fn with_inner_size(mut self, width: u32, height: u32) -> Self {
        assert!(width > 0 && height > 0, "Window size must be positive");
        self.inner_size = LogicalSize::new(width, height);
        self
    }

    /// Receives user input while the interaction gate is open.
    pub fn on_input<F>(mut self, handler: F) -> Self
    where
        F: FnMut(&mut StateController<A>, &UserInput) + 'static,
    {
        self.input_handler = Some(Box::new(handler));
        self
    }

    //--- Accessors --------------------------------------------------------

    pub fn controller(&self) -> &StateController<A> {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut StateController<A> {
        &mut self.controller
    }

    //--- Execution --------------------------------------------------------

    /// Runs the event loop until the window closes.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError`] if the event loop cannot be created or
    /// exits with an error.
    ///
    /// # Panics
    ///
    /// Panics if called off the main thread (macOS/iOS Winit requirement).
    pub fn run(mut self) -> Result<(), PlatformError> {
        debug!(target: "platform", "Starting Winit event loop");

        let event_loop = EventLoop::new().map_err(PlatformError::EventLoopCreation)?;

        event_loop
            .run_app(&mut self)
            .map_err(PlatformError::EventLoopExecution)
    }

    //--- Frame Handling ---------------------------------------------------

    /// Advances the controller by the time since the previous tick.
    ///
    /// The first tick reports zero elapsed time.
    pub fn tick(&mut self, now: Instant) {
        let elapsed = self
            .last_tick
            .map(|last| now.saturating_duration_since(last))
            .unwrap_or(Duration::ZERO);
        self.last_tick = Some(now);

        self.controller.update(elapsed);
    }

    /// Forwards `input` to the handler if the gate is open.
    ///
    /// Returns true if the input was delivered.
    pub fn dispatch_input(&mut self, input: UserInput) -> bool {
        if !self.gate.is_open() {
            trace!(target: "platform", "Interaction blocked, dropping {:?}", input);
            return false;
        }

        match self.input_handler.as_mut() {
            Some(handler) => {
                handler(&mut self.controller, &input);
                true
            }
            None => false,
        }
    }

    //--- Test Accessors ---------------------------------------------------

    #[cfg(test)]
    pub(crate) fn window(&self) -> Option<&Window> {
        self.window.as_ref()
    }
}

//=== Winit Integration ===================================================

impl<A: Animator> ApplicationHandler for Platform<A> {
    /// Creates the window on first resume.
    ///
    /// On mobile, this may be called multiple times (suspend/resume cycle).
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            debug!(target: "platform", "Window already exists (mobile resume?)");
            return;
        }

        let attrs = WindowAttributes::default()
            .with_title(self.title.clone())
            .with_inner_size(self.inner_size);

        match event_loop.create_window(attrs) {
            Ok(window) => {
                info!(
                    target: "platform",
                    "Window created: {}x{} @ {}x DPI",
                    window.inner_size().width,
                    window.inner_size().height,
                    window.scale_factor()
                );
                window.request_redraw();
                self.window = Some(window);
            }
            Err(e) => {
                error!(target: "platform", "Window creation failed: {}", e);
                self.controller.destroy();
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        match &event {
            WindowEvent::CloseRequested => {
                info!(target: "platform", "Window close requested");
                self.controller.destroy();
                event_loop.exit();
            }

            WindowEvent::RedrawRequested => {
                self.tick(Instant::now());

                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }

            _ => {
                if let Some(input) = UserInput::from_window_event(&event) {
                    self.dispatch_input(input);
                }
            }
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
