//! Change notification for the entity store.
//!
//! Every successful write publishes a [`StoreEvent`] naming the collection.
//! Subscribers do not get incremental updates: on any event they reload what
//! they display.

use tokio::sync::broadcast::{self, error::RecvError, error::TryRecvError};
use tracing::{debug, trace, warn};

use crate::model::Collection;

/// A collection was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreEvent {
    /// The collection that changed.
    pub collection: Collection,
}

/// What a subscriber should reload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
    /// One collection changed.
    Collection(Collection),
    /// Events were missed; assume everything changed.
    Everything,
}

impl Change {
    /// Whether a view showing `collection` has to reload.
    #[must_use]
    pub fn affects(self, collection: Collection) -> bool {
        match self {
            Self::Collection(changed) => changed == collection,
            Self::Everything => true,
        }
    }
}

/// Publishing side of the change notifications.
#[derive(Debug, Clone)]
pub struct ChangeFeed {
    sender: broadcast::Sender<StoreEvent>,
}

impl ChangeFeed {
    /// Create a feed buffering up to `capacity` events per subscriber.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Announce that `collection` was written.
    pub fn publish(&self, collection: Collection) {
        match self.sender.send(StoreEvent { collection }) {
            Ok(receivers) => debug!(%collection, receivers, "Published change"),
            Err(_) => trace!(%collection, "No subscribers for change"),
        }
    }

    /// Start receiving events published from now on.
    #[must_use]
    pub fn subscribe(&self) -> Subscription {
        Subscription {
            receiver: self.sender.subscribe(),
        }
    }

    /// Number of live subscriptions.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

/// Receiving side of the change notifications.
#[derive(Debug)]
pub struct Subscription {
    receiver: broadcast::Receiver<StoreEvent>,
}

impl Subscription {
    /// Next pending change, without waiting.
    pub fn try_next(&mut self) -> Option<Change> {
        match self.receiver.try_recv() {
            Ok(event) => Some(Change::Collection(event.collection)),
            Err(TryRecvError::Lagged(missed)) => {
                warn!(missed, "Subscriber lagged behind store changes");
                Some(Change::Everything)
            }
            Err(TryRecvError::Empty | TryRecvError::Closed) => None,
        }
    }

    /// Wait for the next change. Returns `None` once the store is gone.
    pub async fn next(&mut self) -> Option<Change> {
        match self.receiver.recv().await {
            Ok(event) => Some(Change::Collection(event.collection)),
            Err(RecvError::Lagged(missed)) => {
                warn!(missed, "Subscriber lagged behind store changes");
                Some(Change::Everything)
            }
            Err(RecvError::Closed) => None,
        }
    }

    /// Drain all pending changes. Returns `true` if any affects `collections`.
    pub fn changed_any(&mut self, collections: &[Collection]) -> bool {
        let mut changed = false;
        while let Some(change) = self.try_next() {
            changed |= collections.iter().any(|c| change.affects(*c));
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publish_reaches_subscriber() {
        let feed = ChangeFeed::new(8);
        let mut sub = feed.subscribe();

        feed.publish(Collection::Vehicles);

        assert_eq!(sub.try_next(), Some(Change::Collection(Collection::Vehicles)));
        assert_eq!(sub.try_next(), None);
    }

    #[test]
    fn test_publish_without_subscribers() {
        let feed = ChangeFeed::new(8);
        assert_eq!(feed.subscriber_count(), 0);
        feed.publish(Collection::PublicReports);
    }

    #[test]
    fn test_subscriber_sees_only_later_events() {
        let feed = ChangeFeed::new(8);
        feed.publish(Collection::Vehicles);

        let mut sub = feed.subscribe();
        assert_eq!(sub.try_next(), None);
        assert_eq!(feed.subscriber_count(), 1);
    }

    #[test]
    fn test_lagged_subscriber_gets_everything() {
        let feed = ChangeFeed::new(2);
        let mut sub = feed.subscribe();

        for _ in 0..5 {
            feed.publish(Collection::Vehicles);
        }

        assert_eq!(sub.try_next(), Some(Change::Everything));
    }

    #[test]
    fn test_zero_capacity_is_clamped() {
        let feed = ChangeFeed::new(0);
        let mut sub = feed.subscribe();
        feed.publish(Collection::Vehicles);
        assert!(sub.try_next().is_some());
    }

    #[test]
    fn test_change_affects() {
        let change = Change::Collection(Collection::Vehicles);
        assert!(change.affects(Collection::Vehicles));
        assert!(!change.affects(Collection::PublicReports));
        assert!(Change::Everything.affects(Collection::PublicReports));
    }

    #[test]
    fn test_changed_any_drains() {
        let feed = ChangeFeed::new(8);
        let mut sub = feed.subscribe();

        feed.publish(Collection::PublicReports);
        feed.publish(Collection::PublicReports);
        assert!(!sub.changed_any(&[Collection::Vehicles]));
        assert_eq!(sub.try_next(), None);

        feed.publish(Collection::Vehicles);
        assert!(sub.changed_any(&[Collection::Vehicles, Collection::MaintenanceRecords]));
    }

    #[tokio::test]
    async fn test_next_waits_for_event() {
        let feed = ChangeFeed::new(8);
        let mut sub = feed.subscribe();

        let publisher = feed.clone();
        tokio::spawn(async move {
            publisher.publish(Collection::MaintenanceRecords);
        });

        assert_eq!(
            sub.next().await,
            Some(Change::Collection(Collection::MaintenanceRecords))
        );
    }

    #[tokio::test]
    async fn test_next_returns_none_when_feed_dropped() {
        let feed = ChangeFeed::new(8);
        let mut sub = feed.subscribe();
        drop(feed);
        assert_eq!(sub.next().await, None);
    }
}
