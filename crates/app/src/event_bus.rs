//! Fan-out of characteristic changes to in-process listeners.
//!
//! The registry publishes into a bounded broadcast channel. Each listener
//! (the switch logger, every open event stream) holds an
//! [`EventSubscription`] that only sees changes made after it subscribed.
//! A listener that falls more than the channel capacity behind loses the
//! oldest changes; the loss is logged under the listener's name and the
//! subscription carries on with the newest ones.

use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::{Stream, StreamExt};

use hapdemo_domain::event::CharacteristicEvent;

use crate::ports::EventPublisher;

/// Bounded broadcast channel of [`CharacteristicEvent`]s.
pub struct InProcessEventBus {
    sender: broadcast::Sender<CharacteristicEvent>,
}

impl InProcessEventBus {
    /// Create a bus keeping at most `capacity` changes per lagging listener.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Start listening. `listener` names the subscriber in log lines.
    #[must_use]
    pub fn subscribe(&self, listener: &'static str) -> EventSubscription {
        EventSubscription {
            receiver: self.sender.subscribe(),
            listener,
        }
    }

    /// Number of live subscriptions.
    #[must_use]
    pub fn listeners(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl EventPublisher for InProcessEventBus {
    fn publish(&self, event: CharacteristicEvent) -> usize {
        // sending only fails when nobody listens
        self.sender.send(event).unwrap_or(0)
    }
}

/// One listener's view of the bus.
#[derive(Debug)]
pub struct EventSubscription {
    receiver: broadcast::Receiver<CharacteristicEvent>,
    listener: &'static str,
}

impl EventSubscription {
    /// Wait for the next change, or `None` once the bus is dropped.
    pub async fn next(&mut self) -> Option<CharacteristicEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => return Some(event),
                Err(RecvError::Lagged(skipped)) => lagged(self.listener, skipped),
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// The remaining changes as a stream, ending when the bus is dropped.
    pub fn into_stream(self) -> impl Stream<Item = CharacteristicEvent> + Send + 'static {
        let listener = self.listener;
        BroadcastStream::new(self.receiver).filter_map(move |received| match received {
            Ok(event) => Some(event),
            Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                lagged(listener, skipped);
                None
            }
        })
    }
}

fn lagged(listener: &'static str, skipped: u64) {
    tracing::warn!(listener, skipped, "listener lagged, characteristic changes were dropped");
}
