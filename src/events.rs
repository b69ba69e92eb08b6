//! Event stream for monitor observers.
//!
//! Each subscriber gets its own bounded `mpsc` receiver; subscribers whose
//! receiver has been dropped are pruned on the next publish.

use crate::constants::EVENT_QUEUE_CAPACITY;
use crate::models::{AppIdentifier, Timestamp};
use log::warn;
use serde::Serialize;
use std::sync::mpsc::{self, Receiver, SyncSender, TrySendError};
use std::sync::Mutex;

/// Payload of the notification emitted once per blocked session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockTriggered {
    /// Foreground app that was blocked.
    #[serde(rename = "blockedApp")]
    pub app_id: AppIdentifier,
    /// Blocklist keyword it matched.
    pub keyword: AppIdentifier,
    /// Tick time the block fired.
    pub at: Timestamp,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MonitorEvent {
    BlockTriggered(BlockTriggered),
    /// Usage authorization was lost while running; ticks are skipped.
    AuthorizationRevoked,
    /// Usage authorization came back; ticks resume.
    AuthorizationRestored,
}

#[derive(Debug, Default)]
pub struct EventBus {
    subscribers: Mutex<Vec<SyncSender<MonitorEvent>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to events published from now on.
    ///
    /// At most [`EVENT_QUEUE_CAPACITY`] unread events are buffered; while the
    /// queue is full, newer events are dropped for this subscriber.
    pub fn subscribe(&self) -> Receiver<MonitorEvent> {
        let (sender, receiver) = mpsc::sync_channel(EVENT_QUEUE_CAPACITY);
        self.lock_subscribers().push(sender);
        receiver
    }

    /// Deliver to every subscriber without blocking the publisher.
    pub fn publish(&self, event: &MonitorEvent) {
        self.lock_subscribers()
            .retain(|subscriber| match subscriber.try_send(event.clone()) {
                Ok(()) => true,
                Err(TrySendError::Full(_)) => {
                    warn!("Event subscriber is not draining its queue; dropping event");
                    true
                }
                Err(TrySendError::Disconnected(_)) => false,
            });
    }

    pub fn subscriber_count(&self) -> usize {
        self.lock_subscribers().len()
    }

    fn lock_subscribers(&self) -> std::sync::MutexGuard<'_, Vec<SyncSender<MonitorEvent>>> {
        match self.subscribers.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                warn!("EventBus: subscriber mutex was poisoned, recovering");
                poisoned.into_inner()
            }
        }
    }
}
