//=========================================================================
// Display Collaborators
//=========================================================================
//
// Narrow contracts the controller consumes from the host application.
//
// Architecture:
//   StateController<A: Animator>
//     ├─ transition: Box<dyn Visual>      (shared curtain/spinner)
//     ├─ panels:     Box<dyn Visual>      (one per registered state)
//     ├─ audio:      Option<Box<dyn AudioPlayer>>
//     └─ blocker:    Box<dyn InteractionBlocker>
//
// Playback is asynchronous: `Animator::play` receives a `Completion` that
// the animator resolves whenever the cue ends. Resolving only enqueues a
// command; the controller reacts to it on its next pump.
//
//=========================================================================

//=== External Dependencies ===============================================

use crossbeam_channel::Sender;
use log::{trace, warn};

//=== Internal Dependencies ===============================================

use crate::core::command::Command;
use crate::error::PlaybackError;

//=== Cue =================================================================

/// Named animation cue played on a visual.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cue {
    /// Entrance animation (curtain opening, panel sliding in).
    TransitionIn,

    /// Exit animation (curtain closing, panel sliding out).
    TransitionOut,

    /// Idle animation looped on the transition visual while loading.
    Loop,
}

impl Cue {
    /// Animation label used by display libraries for this cue.
    pub fn label(self) -> &'static str {
        match self {
            Cue::TransitionIn => "onTransitionIn",
            Cue::TransitionOut => "onTransitionOut",
            Cue::Loop => "transitionLoop",
        }
    }
}

//=== Ticket ==============================================================

/// Identifies one playback request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Ticket(pub(crate) u64);

/// Outcome delivered by a [`Completion`].
pub type PlaybackResult = Result<(), PlaybackError>;

//=== Completion ==========================================================

/// One-shot token resolved when a cue stops playing.
///
/// Resolve it with [`Completion::finish`] or [`Completion::fail`]. A token
/// dropped without being resolved reports [`PlaybackError::Abandoned`], so
/// the controller always hears back exactly once per request.
///
/// Tokens are `Send`: players running on another thread may resolve them.
#[derive(Debug)]
pub struct Completion {
    ticket: Ticket,
    sender: Sender<Command>,
    resolved: bool,
}

impl Completion {
    pub(crate) fn new(ticket: Ticket, sender: Sender<Command>) -> Self {
        Self {
            ticket,
            sender,
            resolved: false,
        }
    }

    /// Ticket of the playback request this token answers.
    pub fn ticket(&self) -> Ticket {
        self.ticket
    }

    /// Reports that the cue played to its end.
    pub fn finish(self) {
        self.resolve(Ok(()));
    }

    /// Reports that the cue could not be played to its end.
    pub fn fail(self, error: PlaybackError) {
        self.resolve(Err(error));
    }

    fn resolve(mut self, result: PlaybackResult) {
        self.send(result);
    }

    fn send(&mut self, result: PlaybackResult) {
        self.resolved = true;
        let command = Command::Playback {
            ticket: self.ticket,
            result,
        };
        if self.sender.send(command).is_err() {
            trace!(target: "states", "Controller gone, dropping completion {:?}", self.ticket);
        }
    }
}

impl Drop for Completion {
    fn drop(&mut self) {
        if !self.resolved {
            warn!(target: "states", "Completion {:?} dropped unresolved", self.ticket);
            self.send(Err(PlaybackError::Abandoned));
        }
    }
}

//=== Visual ==============================================================

/// A display object whose visibility the controller toggles.
///
/// Panels and the transition visual are opaque to the controller beyond
/// their name (handed to the [`Animator`]) and visibility.
pub trait Visual {
    /// Identity used to address this visual in the animator.
    fn name(&self) -> &str;

    fn set_visible(&mut self, visible: bool);

    fn is_visible(&self) -> bool;
}

//=== Animator ============================================================

/// Plays named cues on visuals.
///
/// This is the display-library seam: one implementation per scene-graph
/// flavour, injected into the controller at construction.
pub trait Animator: 'static {
    /// Whether `target` has an animation for `cue`.
    ///
    /// Only consulted for [`Cue::Loop`], which is optional.
    fn has_animation(&self, _target: &str, _cue: Cue) -> bool {
        true
    }

    /// Starts `cue` on `target` and resolves `done` once it ends.
    fn play(&mut self, target: &str, cue: Cue, done: Completion);

    /// Stops whatever is playing on `target` immediately.
    fn stop(&mut self, target: &str);
}

//=== Audio ===============================================================

/// A sound started together with a transition cue.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioCue {
    /// Sound alias in the host's audio sprite.
    pub alias: String,

    /// Offset into the transition, in seconds, at which the sound starts.
    pub start: f32,
}

impl AudioCue {
    pub fn new(alias: impl Into<String>, start: f32) -> Self {
        Self {
            alias: alias.into(),
            start,
        }
    }
}

impl From<&str> for AudioCue {
    fn from(alias: &str) -> Self {
        Self::new(alias, 0.0)
    }
}

/// Sounds accompanying the transition visual's cues.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransitionSounds {
    pub transition_in: Option<AudioCue>,
    pub transition_out: Option<AudioCue>,
    pub looped: Option<AudioCue>,
}

impl TransitionSounds {
    /// Sound configured for `cue`, if any.
    pub fn for_cue(&self, cue: Cue) -> Option<&AudioCue> {
        match cue {
            Cue::TransitionIn => self.transition_in.as_ref(),
            Cue::TransitionOut => self.transition_out.as_ref(),
            Cue::Loop => self.looped.as_ref(),
        }
    }

    /// All configured sounds.
    pub fn iter(&self) -> impl Iterator<Item = &AudioCue> {
        [&self.transition_in, &self.transition_out, &self.looped]
            .into_iter()
            .flatten()
    }
}

/// Plays transition sounds.
pub trait AudioPlayer {
    /// False while the audio sprite is still loading; cues are skipped then.
    fn is_ready(&self) -> bool {
        true
    }

    fn play(&mut self, cue: &AudioCue);

    fn stop(&mut self, alias: &str);
}

//=== Interaction Blocker =================================================

/// Globally enables or disables pointer interaction on the root surface.
pub trait InteractionBlocker {
    fn set_interactive(&mut self, interactive: bool);
}

/// Blocker used when the host does not supply one.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullBlocker;

impl InteractionBlocker for NullBlocker {
    fn set_interactive(&mut self, _interactive: bool) {}
}

//=========================================================================
// Unit Tests
//=========================================================================
