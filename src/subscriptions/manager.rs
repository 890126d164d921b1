//! Subscription manager for broadcasting context events.

use crossbeam_channel::{bounded, Sender};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use super::types::{ContextEvent, DropReason, SubscriptionConfig, SubscriptionHandle, SubscriptionId};

/// Internal subscription state.
struct Subscription {
    sender: Sender<ContextEvent>,
}

impl Subscription {
    /// Try to send an event. Returns false if the buffer is full or the
    /// receiver is gone (subscriber will be dropped).
    fn try_send(&self, event: ContextEvent) -> bool {
        self.sender.try_send(event).is_ok()
    }
}

/// Manages subscriptions and broadcasts events for one node.
pub struct SubscriptionManager {
    /// Active subscriptions by ID.
    subscriptions: RwLock<HashMap<SubscriptionId, Subscription>>,
    /// Counter for generating subscription IDs.
    next_id: AtomicU64,
}

impl SubscriptionManager {
    /// Create a new subscription manager.
    pub fn new() -> Self {
        Self {
            subscriptions: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Create a new subscription and return the receiving handle.
    pub fn subscribe(&self, config: SubscriptionConfig) -> SubscriptionHandle {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::SeqCst));
        let (sender, receiver) = bounded(config.buffer_size);

        self.subscriptions.write().insert(id, Subscription { sender });

        SubscriptionHandle { id, receiver }
    }

    /// Unsubscribe and clean up.
    pub fn unsubscribe(&self, id: SubscriptionId) {
        let mut subs = self.subscriptions.write();
        if let Some(sub) = subs.remove(&id) {
            // Send dropped event (best effort)
            let _ = sub.sender.try_send(ContextEvent::Dropped {
                reason: DropReason::Unsubscribed,
            });
        }
    }

    /// Broadcast an event to every subscriber. Drops subscribers that fail
    /// to receive.
    pub fn broadcast(&self, event: ContextEvent) {
        let mut to_remove = Vec::new();

        {
            let subs = self.subscriptions.read();
            for (id, sub) in subs.iter() {
                if !sub.try_send(event.clone()) {
                    to_remove.push(*id);
                }
            }
        }

        if !to_remove.is_empty() {
            let mut subs = self.subscriptions.write();
            for id in to_remove {
                if let Some(sub) = subs.remove(&id) {
                    // Try to notify about the drop (might fail, that's ok)
                    let _ = sub.sender.try_send(ContextEvent::Dropped {
                        reason: DropReason::BufferOverflow,
                    });
                }
            }
        }
    }

    /// Get the subscription count.
    pub fn subscription_count(&self) -> usize {
        self.subscriptions.read().len()
    }
}

impl Default for SubscriptionManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn decorated(name: &str) -> ContextEvent {
        ContextEvent::Decorated {
            name: name.to_string(),
        }
    }

    #[test]
    fn test_subscribe_unsubscribe() {
        let manager = SubscriptionManager::new();

        let handle = manager.subscribe(SubscriptionConfig::default());
        assert_eq!(manager.subscription_count(), 1);

        manager.unsubscribe(handle.id);
        assert_eq!(manager.subscription_count(), 0);

        let event = handle.recv_timeout(Duration::from_millis(100)).unwrap();
        assert!(matches!(
            event,
            ContextEvent::Dropped {
                reason: DropReason::Unsubscribed
            }
        ));
    }

    #[test]
    fn test_broadcast_reaches_all_subscribers() {
        let manager = SubscriptionManager::new();

        let first = manager.subscribe(SubscriptionConfig::default());
        let second = manager.subscribe(SubscriptionConfig::default());

        manager.broadcast(decorated("greet"));

        for handle in [first, second] {
            let event = handle.recv_timeout(Duration::from_millis(100)).unwrap();
            match event {
                ContextEvent::Decorated { name } => assert_eq!(name, "greet"),
                other => panic!("expected Decorated event, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_drop_slow_subscriber() {
        // Small buffer
        let manager = SubscriptionManager::new();
        let handle = manager.subscribe(SubscriptionConfig { buffer_size: 2 });

        // Flood with events
        for i in 0..10 {
            manager.broadcast(decorated(&format!("d{}", i)));
        }

        // Subscriber should be dropped
        assert_eq!(manager.subscription_count(), 0);
    }
}
