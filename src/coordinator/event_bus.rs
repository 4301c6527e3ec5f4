// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Event bus for broadcasting coordinator events.

use tokio::sync::broadcast;

use super::CoordinatorEvent;

/// Default channel capacity for the event bus.
const DEFAULT_CHANNEL_CAPACITY: usize = 256;

/// Broadcast channel for [`CoordinatorEvent`]s.
///
/// Every subscriber gets its own copy of each event published after it
/// subscribed. A subscriber that falls more than `capacity` events behind
/// receives `RecvError::Lagged` and loses the oldest events.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<CoordinatorEvent>,
}

impl EventBus {
    /// Creates a new event bus with default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Creates a new event bus with the specified capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Subscribes to coordinator events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<CoordinatorEvent> {
        self.sender.subscribe()
    }

    /// Returns the number of active subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Publishes an event; discarded silently without subscribers.
    pub fn publish(&self, event: CoordinatorEvent) {
        let _ = self.sender.send(event);
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subscriber_count_tracks_receivers() {
        let bus = EventBus::new();
        assert_eq!(bus.subscriber_count(), 0);

        let rx = bus.subscribe();
        let _rx2 = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 2);

        drop(rx);
        assert_eq!(bus.subscriber_count(), 1);
    }

    #[tokio::test]
    async fn publish_delivers_to_all_subscribers() {
        let bus = EventBus::new();
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        bus.publish(CoordinatorEvent::update_failed("boom"));

        assert_eq!(
            rx1.recv().await.unwrap(),
            CoordinatorEvent::update_failed("boom")
        );
        assert_eq!(
            rx2.recv().await.unwrap(),
            CoordinatorEvent::update_failed("boom")
        );
    }

    #[test]
    fn publish_without_subscribers_is_silent() {
        let bus = EventBus::with_capacity(0);
        bus.publish(CoordinatorEvent::update_failed("nobody listens"));
    }

    #[test]
    fn clone_shares_channel() {
        let bus = EventBus::new();
        let other = bus.clone();
        let _rx = bus.subscribe();
        assert_eq!(other.subscriber_count(), 1);
    }
}
