//=========================================================================
// State System
//=========================================================================
//
// The lifecycle contract every panel state implements, plus the
// bookkeeping the controller keeps per registered state.
//
// Architecture:
//   StateController
//     └─ states: HashMap<StateId, StateSlot>
//          ├─ state: Box<dyn StateLifecycle>   (hooks, user code)
//          ├─ panel: Box<dyn Visual>
//          └─ flags: active/enabled/loading/canceled/transitioning
//
// Per-state machine:
//   Exited → Entering (maybe Loading) → Enabled → ExitStarting → Exiting → Exited
//   Entering/Loading ──cancel──→ Exited (on_cancel raised)
//
//=========================================================================

//=== Module Declarations =================================================

mod context;
mod slot;

//=== Public API ==========================================================

pub use context::{LoadHandle, StateContext};
pub(crate) use slot::{Continuation, StateSlot};

//=== External Dependencies ===============================================

use std::time::Duration;

//=== StateId =============================================================

/// Identifier a state is registered under.
pub type StateId = String;

//=== StateLifecycle Trait ================================================

/// Hooks a concrete panel state implements.
///
/// The controller drives these; states never call them on each other.
/// Every hook has an empty default, so a state overrides only what it
/// needs.
///
/// # Asynchronous entry
///
/// Entering is synchronous unless the state calls
/// [`StateContext::begin_load`] from [`on_enter`](Self::on_enter). The
/// controller then waits, with the panel hidden and the state disabled,
/// until the returned [`LoadHandle`] is finished.
///
/// ```rust
/// # use panel_states::prelude::*;
/// #[derive(Default)]
/// struct LevelState {
///     load: Option<LoadHandle>,
/// }
///
/// impl StateLifecycle for LevelState {
///     fn on_enter(&mut self, ctx: &mut StateContext<'_>) {
///         // Hand this to the asset loader; it calls finish() when done.
///         self.load = ctx.begin_load();
///     }
///
///     fn on_cancel(&mut self, _ctx: &mut StateContext<'_>) {
///         self.load = None;
///     }
/// }
/// ```
pub trait StateLifecycle {
    /// The state became current. Build the panel contents here.
    fn on_enter(&mut self, _ctx: &mut StateContext<'_>) {}

    /// The transition in finished and the state is enabled.
    fn on_enter_done(&mut self, _ctx: &mut StateContext<'_>) {}

    /// The state is about to be replaced; its out animation plays next.
    fn on_exit_start(&mut self, _ctx: &mut StateContext<'_>) {}

    /// The state was exited and its panel hidden. Release panel contents.
    fn on_exit(&mut self, _ctx: &mut StateContext<'_>) {}

    /// Entry was abandoned while loading. Drop any in-flight async work.
    fn on_cancel(&mut self, _ctx: &mut StateContext<'_>) {}

    /// Per-frame tick while this is the current state.
    fn update(&mut self, _ctx: &mut StateContext<'_>, _elapsed: Duration) {}

    /// Final teardown, after `on_exit`. The state is never used again.
    fn on_destroy(&mut self) {}
}
