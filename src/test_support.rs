//=========================================================================
// Test Support
//=========================================================================
//
// In-memory collaborators for unit tests: a visual with an observable
// visibility flag, an animator whose cues are resolved by hand, recording
// audio and blocker, and a lifecycle that logs its hooks.
//
// `Harness` wires them into a controller with one state per id. Every
// state logs into the same `HookLog` as "<id>:<hook>".
//
//=========================================================================

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;
use std::time::Duration;

use crossbeam_channel::Receiver;

use crate::controller::{StateController, StateControllerBuilder};
use crate::core::display::{
    Animator, AudioCue, AudioPlayer, Completion, Cue, InteractionBlocker, TransitionSounds, Visual,
};
use crate::core::event::Notification;
use crate::core::state::{LoadHandle, StateContext, StateLifecycle};
use crate::error::PlaybackError;

/// Upper bound on settle iterations before a test is declared hung.
const SETTLE_LIMIT: usize = 1_000;

//=== FakeVisual ==========================================================

pub(crate) struct FakeVisual {
    name: String,
    visible: Rc<Cell<bool>>,
}

impl FakeVisual {
    /// Hidden visual plus a handle to observe its visibility.
    pub(crate) fn new(name: &str) -> (Self, Rc<Cell<bool>>) {
        let visible = Rc::new(Cell::new(false));
        let visual = Self {
            name: name.to_owned(),
            visible: visible.clone(),
        };
        (visual, visible)
    }

    /// Like [`FakeVisual::new`] but initially visible.
    pub(crate) fn shown(name: &str) -> (Self, Rc<Cell<bool>>) {
        let (visual, visible) = Self::new(name);
        visible.set(true);
        (visual, visible)
    }
}

impl Visual for FakeVisual {
    fn name(&self) -> &str {
        &self.name
    }

    fn set_visible(&mut self, visible: bool) {
        self.visible.set(visible);
    }

    fn is_visible(&self) -> bool {
        self.visible.get()
    }
}

//=== HookLog =============================================================

#[derive(Clone, Default)]
pub(crate) struct HookLog {
    entries: Rc<RefCell<Vec<String>>>,
}

impl HookLog {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&self, entry: String) {
        self.entries.borrow_mut().push(entry);
    }

    /// Entries in order, skipping per-frame `update` noise.
    pub(crate) fn entries(&self) -> Vec<String> {
        self.entries
            .borrow()
            .iter()
            .filter(|e| !e.ends_with(":update"))
            .cloned()
            .collect()
    }

    pub(crate) fn count(&self, entry: &str) -> usize {
        self.entries.borrow().iter().filter(|e| *e == entry).count()
    }

    pub(crate) fn clear(&self) {
        self.entries.borrow_mut().clear();
    }
}

//=== RecordingState ======================================================

/// Lifecycle that logs every hook and optionally loads or navigates.
pub(crate) struct RecordingState {
    name: String,
    log: HookLog,
    load_on_enter: bool,
    request_on_enter_done: Option<String>,
    load: Rc<RefCell<Option<LoadHandle>>>,
}

impl RecordingState {
    pub(crate) fn new(name: &str, log: &HookLog) -> Self {
        Self {
            name: name.to_owned(),
            log: log.clone(),
            load_on_enter: false,
            request_on_enter_done: None,
            load: Rc::new(RefCell::new(None)),
        }
    }

    /// State with its own log; `Harness` replaces it with the shared one.
    pub(crate) fn named(name: &str) -> Self {
        Self::new(name, &HookLog::new())
    }

    /// Declares a load from `on_enter`.
    pub(crate) fn loading(mut self) -> Self {
        self.load_on_enter = true;
        self
    }

    /// Requests `target` from `on_enter_done`, once.
    pub(crate) fn requesting(mut self, target: &str) -> Self {
        self.request_on_enter_done = Some(target.to_owned());
        self
    }

    fn record(&self, hook: &str) {
        self.log.push(format!("{}:{}", self.name, hook));
    }
}

impl StateLifecycle for RecordingState {
    fn on_enter(&mut self, ctx: &mut StateContext<'_>) {
        self.record("enter");
        if self.load_on_enter {
            *self.load.borrow_mut() = ctx.begin_load();
        }
    }

    fn on_enter_done(&mut self, ctx: &mut StateContext<'_>) {
        self.record("enter_done");
        if let Some(target) = self.request_on_enter_done.take() {
            ctx.request_state(target);
        }
    }

    fn on_exit_start(&mut self, _ctx: &mut StateContext<'_>) {
        self.record("exit_start");
    }

    fn on_exit(&mut self, _ctx: &mut StateContext<'_>) {
        self.record("exit");
    }

    fn on_cancel(&mut self, _ctx: &mut StateContext<'_>) {
        self.record("cancel");
    }

    fn update(&mut self, _ctx: &mut StateContext<'_>, _elapsed: Duration) {
        self.record("update");
    }

    fn on_destroy(&mut self) {
        self.record("destroy");
    }
}

//=== ScriptedAnimator ====================================================

#[derive(Default)]
struct AnimatorState {
    pending: VecDeque<(String, Cue, Completion)>,
    stopped: Vec<String>,
    loops: bool,
}

/// Animator whose cues stay pending until a test resolves them.
///
/// Playing on a target that already has a pending cue supersedes it; the
/// superseded completion is dropped and reports `Abandoned`.
#[derive(Clone, Default)]
pub(crate) struct ScriptedAnimator {
    inner: Rc<RefCell<AnimatorState>>,
}

impl ScriptedAnimator {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Animator that reports a loop animation on every target.
    pub(crate) fn with_loop() -> Self {
        let animator = Self::new();
        animator.inner.borrow_mut().loops = true;
        animator
    }

    /// Targets passed to `stop`, in order.
    pub(crate) fn stopped(&self) -> Vec<String> {
        self.inner.borrow().stopped.clone()
    }

    /// Cues still waiting to be resolved, oldest first.
    pub(crate) fn pending_cues(&self) -> Vec<(String, Cue)> {
        self.inner
            .borrow()
            .pending
            .iter()
            .map(|(target, cue, _)| (target.clone(), *cue))
            .collect()
    }

    fn take_next(&self) -> Option<Completion> {
        self.inner
            .borrow_mut()
            .pending
            .pop_front()
            .map(|(_, _, done)| done)
    }

    /// Resolves the oldest pending cue successfully.
    pub(crate) fn complete_next(&self) -> bool {
        match self.take_next() {
            Some(done) => {
                done.finish();
                true
            }
            None => false,
        }
    }

    /// Fails the oldest pending cue.
    pub(crate) fn fail_next(&self, error: PlaybackError) -> bool {
        match self.take_next() {
            Some(done) => {
                done.fail(error);
                true
            }
            None => false,
        }
    }

    /// Drops the oldest pending cue without resolving it.
    pub(crate) fn drop_next(&self) -> bool {
        self.take_next().is_some()
    }

    /// Resolves every pending cue successfully.
    pub(crate) fn complete_all(&self) {
        while self.complete_next() {}
    }
}

impl Animator for ScriptedAnimator {
    fn has_animation(&self, _target: &str, cue: Cue) -> bool {
        cue != Cue::Loop || self.inner.borrow().loops
    }

    fn play(&mut self, target: &str, cue: Cue, done: Completion) {
        let mut inner = self.inner.borrow_mut();
        inner.pending.retain(|(pending, _, _)| pending != target);
        inner.pending.push_back((target.to_owned(), cue, done));
    }

    fn stop(&mut self, target: &str) {
        let mut inner = self.inner.borrow_mut();
        inner.stopped.push(target.to_owned());
        inner.pending.retain(|(pending, _, _)| pending != target);
    }
}

//=== RecordingBlocker ====================================================

#[derive(Clone)]
pub(crate) struct RecordingBlocker {
    interactive: Rc<Cell<bool>>,
}

impl RecordingBlocker {
    pub(crate) fn new(interactive: bool) -> Self {
        Self {
            interactive: Rc::new(Cell::new(interactive)),
        }
    }

    pub(crate) fn is_interactive(&self) -> bool {
        self.interactive.get()
    }
}

impl InteractionBlocker for RecordingBlocker {
    fn set_interactive(&mut self, interactive: bool) {
        self.interactive.set(interactive);
    }
}

//=== RecordingAudio ======================================================

#[derive(Clone)]
pub(crate) struct RecordingAudio {
    ready: Rc<Cell<bool>>,
    log: HookLog,
}

impl RecordingAudio {
    pub(crate) fn new() -> Self {
        Self {
            ready: Rc::new(Cell::new(true)),
            log: HookLog::new(),
        }
    }

    pub(crate) fn set_ready(&self, ready: bool) {
        self.ready.set(ready);
    }

    /// "play:<alias>" and "stop:<alias>" entries, in order.
    pub(crate) fn entries(&self) -> Vec<String> {
        self.log.entries()
    }
}

impl AudioPlayer for RecordingAudio {
    fn is_ready(&self) -> bool {
        self.ready.get()
    }

    fn play(&mut self, cue: &AudioCue) {
        self.log.push(format!("play:{}", cue.alias));
    }

    fn stop(&mut self, alias: &str) {
        self.log.push(format!("stop:{}", alias));
    }
}

//=== Notification Helpers ================================================

/// Drains `events`, returning the notification names in order.
pub(crate) fn names(events: &Receiver<Notification>) -> Vec<&'static str> {
    events.try_iter().map(|n| n.name()).collect()
}

//=== Harness =============================================================

type Configure =
    fn(StateControllerBuilder<ScriptedAnimator>) -> StateControllerBuilder<ScriptedAnimator>;

/// A controller over recording states, with every collaborator observable.
pub(crate) struct Harness {
    pub(crate) controller: StateController<ScriptedAnimator>,
    pub(crate) animator: ScriptedAnimator,
    pub(crate) blocker: RecordingBlocker,
    pub(crate) audio: RecordingAudio,
    pub(crate) log: HookLog,
    pub(crate) events: Receiver<Notification>,
    pub(crate) curtain: Rc<Cell<bool>>,
    panels: HashMap<String, Rc<Cell<bool>>>,
    loads: HashMap<String, Rc<RefCell<Option<LoadHandle>>>>,
}

impl Harness {
    pub(crate) fn new(states: Vec<RecordingState>) -> Self {
        Self::assemble(ScriptedAnimator::new(), states, |b| b)
    }

    /// Plain recording states, one per id.
    pub(crate) fn with_ids(ids: &[&str]) -> Self {
        Self::new(ids.iter().map(|id| RecordingState::named(id)).collect())
    }

    /// Animator reports a loop cue on the transition visual.
    pub(crate) fn looping(states: Vec<RecordingState>) -> Self {
        Self::assemble(ScriptedAnimator::with_loop(), states, |b| b)
    }

    /// Looping animator plus sounds for every transition cue.
    pub(crate) fn with_sounds(ids: &[&str]) -> Self {
        let states = ids.iter().map(|id| RecordingState::named(id)).collect();
        Self::assemble(ScriptedAnimator::with_loop(), states, |b| {
            b.with_sounds(TransitionSounds {
                transition_in: Some("curtain_in".into()),
                transition_out: Some("curtain_out".into()),
                looped: Some("curtain_loop".into()),
            })
        })
    }

    /// Applies extra builder configuration.
    pub(crate) fn build(states: Vec<RecordingState>, configure: Configure) -> Self {
        Self::assemble(ScriptedAnimator::new(), states, configure)
    }

    fn assemble(
        animator: ScriptedAnimator,
        states: Vec<RecordingState>,
        configure: Configure,
    ) -> Self {
        let blocker = RecordingBlocker::new(true);
        let audio = RecordingAudio::new();
        let (curtain_visual, curtain) = FakeVisual::new("curtain");

        let builder = StateControllerBuilder::new(animator.clone(), curtain_visual)
            .with_blocker(blocker.clone())
            .with_audio(audio.clone());
        let mut controller = configure(builder).build();
        let events = controller.subscribe();

        let log = HookLog::new();
        let mut panels = HashMap::new();
        let mut loads = HashMap::new();

        for mut state in states {
            state.log = log.clone();
            let id = state.name.clone();
            let (panel, visible) = FakeVisual::new(&format!("{}_panel", id));

            panels.insert(id.clone(), visible);
            loads.insert(id.clone(), state.load.clone());
            controller
                .register_state(id, state, panel)
                .expect("harness ids must be unique");
        }
        log.clear();

        Self {
            controller,
            animator,
            blocker,
            audio,
            log,
            events,
            curtain,
            panels,
            loads,
        }
    }

    /// Visibility of the panel registered for `id`.
    pub(crate) fn panel(&self, id: &str) -> Rc<Cell<bool>> {
        self.panels[id].clone()
    }

    /// Takes the load handle `id` declared in its last `on_enter`.
    pub(crate) fn take_load(&self, id: &str) -> LoadHandle {
        self.loads[id]
            .borrow_mut()
            .take()
            .unwrap_or_else(|| panic!("state '{}' has no outstanding load", id))
    }

    /// Finishes the outstanding load of `id` and pumps it through.
    pub(crate) fn finish_load(&mut self, id: &str) {
        self.take_load(id).finish();
        self.controller.pump();
    }

    /// Resolves one pending cue and pumps. False if nothing was pending.
    pub(crate) fn step(&mut self) -> bool {
        let completed = self.animator.complete_next();
        self.controller.pump();
        completed
    }

    /// Resolves cues and pumps until nothing is left to do.
    pub(crate) fn settle(&mut self) {
        for _ in 0..SETTLE_LIMIT {
            let processed = self.controller.pump();
            let completed = self.animator.complete_next();
            if processed == 0 && !completed {
                return;
            }
        }
        panic!("controller did not settle within {} iterations", SETTLE_LIMIT);
    }
}
