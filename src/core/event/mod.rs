//=========================================================================
// Lifecycle Notifications
//=========================================================================
//
// Everything the controller broadcasts while sequencing transitions.
//
// Two families share one channel:
//   Notification::Controller(ControllerSignal)  → curtain/loading progress
//   Notification::State(TransitionEvent)        → per-state visibility
//
//=========================================================================

//=== Module Declarations =================================================

mod channel;

//=== Public API ==========================================================

pub use channel::EventChannel;

//=== Internal Dependencies ===============================================

use crate::core::state::StateId;

//=== ControllerSignal ====================================================

/// Controller-level progress signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControllerSignal {
    TransitionIn,
    TransitionInDone,
    TransitionOut,
    TransitionOutDone,
    BlockerShow,
    BlockerShowDone,
    BlockerHide,
    BlockerHideDone,
    Init,
    InitDone,
    LoadingStart,
    LoadingDone,
}

impl ControllerSignal {
    /// Event name as listeners know it.
    pub fn name(self) -> &'static str {
        match self {
            Self::TransitionIn => "onTransitionIn",
            Self::TransitionInDone => "onTransitionInDone",
            Self::TransitionOut => "onTransitionOut",
            Self::TransitionOutDone => "onTransitionOutDone",
            Self::BlockerShow => "onBlockerShow",
            Self::BlockerShowDone => "onBlockerShowDone",
            Self::BlockerHide => "onBlockerHide",
            Self::BlockerHideDone => "onBlockerHideDone",
            Self::Init => "onInit",
            Self::InitDone => "onInitDone",
            Self::LoadingStart => "onLoadingStart",
            Self::LoadingDone => "onLoadingDone",
        }
    }
}

//=== TransitionEvent =====================================================

/// Kind of a [`TransitionEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransitionEventKind {
    TransitionIn,
    TransitionInDone,
    TransitionOut,
    TransitionOutDone,
    Visible,
    Hidden,
}

impl TransitionEventKind {
    pub fn name(self) -> &'static str {
        match self {
            Self::TransitionIn => "onTransitionStateIn",
            Self::TransitionInDone => "onTransitionStateInDone",
            Self::TransitionOut => "onTransitionStateOut",
            Self::TransitionOutDone => "onTransitionStateOutDone",
            Self::Visible => "onVisible",
            Self::Hidden => "onHidden",
        }
    }
}

/// Immutable notification about a state changing visibility.
///
/// `current_state` is the controller's current state when the event was
/// raised; `visible_state` is the state whose visibility is changing and
/// defaults to `current_state`. During a transition out they differ: the
/// current state is already the target while the outgoing one animates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionEvent {
    kind: TransitionEventKind,
    current_state: Option<StateId>,
    visible_state: Option<StateId>,
}

impl TransitionEvent {
    /// Event whose visible state is the current state.
    pub fn new(kind: TransitionEventKind, current_state: Option<StateId>) -> Self {
        Self {
            kind,
            visible_state: current_state.clone(),
            current_state,
        }
    }

    /// Event about a state other than the current one.
    pub fn with_visible(
        kind: TransitionEventKind,
        current_state: Option<StateId>,
        visible_state: Option<StateId>,
    ) -> Self {
        Self {
            kind,
            current_state,
            visible_state,
        }
    }

    pub fn kind(&self) -> TransitionEventKind {
        self.kind
    }

    pub fn current_state(&self) -> Option<&str> {
        self.current_state.as_deref()
    }

    pub fn visible_state(&self) -> Option<&str> {
        self.visible_state.as_deref()
    }
}

//=== Notification ========================================================

/// Anything published on the controller's [`EventChannel`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    Controller(ControllerSignal),
    State(TransitionEvent),
}

impl Notification {
    /// Event name as listeners know it.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Controller(signal) => signal.name(),
            Self::State(event) => event.kind().name(),
        }
    }
}

impl From<ControllerSignal> for Notification {
    fn from(signal: ControllerSignal) -> Self {
        Self::Controller(signal)
    }
}

impl From<TransitionEvent> for Notification {
    fn from(event: TransitionEvent) -> Self {
        Self::State(event)
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
