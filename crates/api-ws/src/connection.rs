//! Hub subscriber backed by a WebSocket connection's outbox

use smartq_core::port::{ConnectionId, DeliveryError, Subscriber};
use std::sync::Arc;
use tokio::sync::mpsc::{self, error::TrySendError};

/// Bounded outbox in front of a connection's writer task
///
/// The hub enqueues with `try_send`, so a slow client only ever loses its
/// own frames.
pub struct WsSubscriber {
    id: ConnectionId,
    outbox: mpsc::Sender<Arc<str>>,
}

impl WsSubscriber {
    /// Subscriber plus the receiving end drained by the writer task
    pub fn channel(id: ConnectionId, capacity: usize) -> (Arc<Self>, mpsc::Receiver<Arc<str>>) {
        let (outbox, rx) = mpsc::channel(capacity.max(1));
        (Arc::new(Self { id, outbox }), rx)
    }

    /// Queue a frame that must not be dropped (subscription acks).
    /// Waits for outbox space instead of failing.
    pub async fn send_reliable(&self, frame: Arc<str>) -> Result<(), DeliveryError> {
        self.outbox
            .send(frame)
            .await
            .map_err(|_| DeliveryError::Closed)
    }
}

impl Subscriber for WsSubscriber {
    fn connection_id(&self) -> ConnectionId {
        self.id
    }

    fn send(&self, frame: Arc<str>) -> Result<(), DeliveryError> {
        self.outbox.try_send(frame).map_err(|e| match e {
            TrySendError::Full(_) => DeliveryError::Backpressure,
            TrySendError::Closed(_) => DeliveryError::Closed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_full_outbox_reports_backpressure() {
        let (subscriber, mut rx) = WsSubscriber::channel(7, 1);
        assert_eq!(subscriber.connection_id(), 7);

        tokio_test::assert_ok!(subscriber.send(Arc::from("one")));
        assert_eq!(subscriber.send(Arc::from("two")), Err(DeliveryError::Backpressure));

        assert_eq!(rx.recv().await.as_deref(), Some("one"));
        tokio_test::assert_ok!(subscriber.send(Arc::from("three")));
    }

    #[tokio::test]
    async fn test_dropped_writer_reports_closed() {
        let (subscriber, rx) = WsSubscriber::channel(1, 4);
        drop(rx);

        assert_eq!(subscriber.send(Arc::from("late")), Err(DeliveryError::Closed));
        assert_eq!(
            subscriber.send_reliable(Arc::from("ack")).await,
            Err(DeliveryError::Closed)
        );
    }
}
