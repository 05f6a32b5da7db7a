//=========================================================================
// Event Channel
//=========================================================================
//
// Publish/subscribe fan-out for lifecycle notifications.
//
// Architecture:
//   Controller → publish(n) → [Sender<Notification>; N]
//                                  ↓
//   Subscribers ← Receiver::try_iter() (drained at their own pace)
//
// Each subscriber owns an unbounded receiver. Dropping the receiver
// unsubscribes; the channel prunes dead senders on the next publish.
//
//=========================================================================

//=== External Dependencies ===============================================

use crossbeam_channel::{unbounded, Receiver, Sender};
use log::trace;

//=== Internal Dependencies ===============================================

use super::Notification;

//=== EventChannel ========================================================

/// Broadcasts [`Notification`]s to every live subscriber.
#[derive(Default)]
pub struct EventChannel {
    subscribers: Vec<Sender<Notification>>,
}

impl EventChannel {
    pub fn new() -> Self {
        Self {
            subscribers: Vec::new(),
        }
    }

    /// Registers a new subscriber.
    ///
    /// Notifications published from now on are delivered in publish order.
    pub fn subscribe(&mut self) -> Receiver<Notification> {
        let (sender, receiver) = unbounded();
        self.subscribers.push(sender);
        receiver
    }

    /// Delivers `notification` to all subscribers.
    pub fn publish(&mut self, notification: impl Into<Notification>) {
        let notification = notification.into();
        trace!(target: "states::events", "Publishing {}", notification.name());

        self.subscribers
            .retain(|subscriber| subscriber.send(notification.clone()).is_ok());
    }

    /// Number of subscribers alive at the last publish.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Returns true if at least one subscriber is registered.
    pub fn has_subscribers(&self) -> bool {
        !self.subscribers.is_empty()
    }

    /// Drops every subscriber; their receivers see a disconnect.
    pub fn clear(&mut self) {
        self.subscribers.clear();
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
