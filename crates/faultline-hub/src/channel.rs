//! Broadcast channels for event fan-out
//!
//! Each event kind gets its own [`Broadcaster`]. Subscribers never affect
//! each other or the handler chain; a slow subscriber lags and skips ahead.

use parking_lot::RwLock;
use std::sync::Arc;
use tokio::sync::broadcast;

/// Default channel capacity
pub const DEFAULT_CHANNEL_CAPACITY: usize = 256;

/// Closable broadcast sender
pub struct Broadcaster<T> {
    tx: RwLock<Option<broadcast::Sender<Arc<T>>>>,
}

impl<T> Broadcaster<T> {
    /// Create an open channel with `capacity` buffered events per subscriber
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self {
            tx: RwLock::new(Some(tx)),
        }
    }

    /// Publish to current subscribers; returns how many received it
    pub fn publish(&self, event: Arc<T>) -> usize {
        self.tx
            .read()
            .as_ref()
            .and_then(|tx| tx.send(event).ok())
            .unwrap_or(0)
    }

    /// Subscribe to future events
    ///
    /// On a closed broadcaster the subscription is already closed.
    #[must_use]
    pub fn subscribe(&self) -> EventSubscription<T> {
        match self.tx.read().as_ref() {
            Some(tx) => EventSubscription::new(tx.subscribe()),
            None => EventSubscription::closed(),
        }
    }

    /// Number of live subscribers
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.tx
            .read()
            .as_ref()
            .map_or(0, broadcast::Sender::receiver_count)
    }

    /// Drop the sender; subscribers drain buffered events then see `None`
    pub fn close(&self) {
        self.tx.write().take();
    }

    /// Whether [`close`](Self::close) has been called
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.tx.read().is_none()
    }
}

impl<T> std::fmt::Debug for Broadcaster<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Broadcaster")
            .field("closed", &self.is_closed())
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

/// Receiving side of a [`Broadcaster`]
#[derive(Debug)]
pub struct EventSubscription<T> {
    rx: broadcast::Receiver<Arc<T>>,
    lagged: u64,
}

impl<T> EventSubscription<T> {
    fn new(rx: broadcast::Receiver<Arc<T>>) -> Self {
        Self { rx, lagged: 0 }
    }

    fn closed() -> Self {
        let (tx, rx) = broadcast::channel(1);
        drop(tx);
        Self::new(rx)
    }

    /// Wait for the next event; `None` once the channel is closed
    ///
    /// Events missed through lag are counted in [`lagged`](Self::lagged).
    pub async fn recv(&mut self) -> Option<Arc<T>> {
        loop {
            match self.rx.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    self.lagged += n;
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Next buffered event without waiting
    pub fn try_recv(&mut self) -> Option<Arc<T>> {
        loop {
            match self.rx.try_recv() {
                Ok(event) => return Some(event),
                Err(broadcast::error::TryRecvError::Lagged(n)) => {
                    self.lagged += n;
                }
                Err(_) => return None,
            }
        }
    }

    /// Events skipped because this subscriber fell behind
    #[inline]
    #[must_use]
    pub fn lagged(&self) -> u64 {
        self.lagged
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscribers_receive_in_publish_order() {
        let channel = Broadcaster::new(8);
        let mut a = channel.subscribe();
        let mut b = channel.subscribe();

        for i in 0..3 {
            channel.publish(Arc::new(i));
        }

        for i in 0..3 {
            assert_eq!(*a.recv().await.unwrap(), i);
        }
        for i in 0..3 {
            assert_eq!(*b.recv().await.unwrap(), i);
        }
    }

    #[tokio::test]
    async fn close_ends_subscriptions() {
        let channel = Broadcaster::new(8);
        let mut sub = channel.subscribe();
        channel.publish(Arc::new("last"));
        channel.close();

        assert_eq!(*sub.recv().await.unwrap(), "last");
        assert!(sub.recv().await.is_none());
        assert!(channel.subscribe().recv().await.is_none());
        assert_eq!(channel.publish(Arc::new("late")), 0);
    }

    #[test]
    fn lagging_subscriber_skips_ahead() {
        let channel = Broadcaster::new(2);
        let mut sub = channel.subscribe();
        for i in 0..5 {
            channel.publish(Arc::new(i));
        }
        assert_eq!(*sub.try_recv().unwrap(), 3);
        assert_eq!(sub.lagged(), 3);
    }
}
