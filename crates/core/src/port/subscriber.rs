// Subscriber Port - capability handed to the broadcast hub by a transport

use std::sync::Arc;
use thiserror::Error;

/// Identity of a live connection (unique per process lifetime)
pub type ConnectionId = u64;

/// Why a frame did not reach a subscriber
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeliveryError {
    /// Connection is gone; the hub forgets it
    #[error("connection closed")]
    Closed,

    /// Outbox full; this frame is dropped (at-most-once)
    #[error("outbox full")]
    Backpressure,
}

/// A live connection that can receive serialized hub events
///
/// `send` must never block: it either enqueues the frame or fails.
pub trait Subscriber: Send + Sync {
    fn connection_id(&self) -> ConnectionId;

    fn send(&self, frame: Arc<str>) -> Result<(), DeliveryError>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    /// Records every frame it is sent
    pub struct RecordingSubscriber {
        id: ConnectionId,
        frames: Mutex<Vec<String>>,
        closed: AtomicBool,
        capacity: Option<usize>,
    }

    impl RecordingSubscriber {
        pub fn new(id: ConnectionId) -> Arc<Self> {
            Arc::new(Self {
                id,
                frames: Mutex::new(Vec::new()),
                closed: AtomicBool::new(false),
                capacity: None,
            })
        }

        /// Subscriber whose outbox fills up after `capacity` frames
        pub fn with_capacity(id: ConnectionId, capacity: usize) -> Arc<Self> {
            Arc::new(Self {
                id,
                frames: Mutex::new(Vec::new()),
                closed: AtomicBool::new(false),
                capacity: Some(capacity),
            })
        }

        pub fn close(&self) {
            self.closed.store(true, Ordering::SeqCst);
        }

        pub fn frames(&self) -> Vec<String> {
            self.frames.lock().unwrap_or_else(|e| e.into_inner()).clone()
        }

        /// Frames parsed back into JSON
        pub fn events(&self) -> Vec<serde_json::Value> {
            self.frames()
                .iter()
                .filter_map(|f| serde_json::from_str(f).ok())
                .collect()
        }

        /// Event type tags in arrival order
        pub fn event_types(&self) -> Vec<String> {
            self.events()
                .iter()
                .filter_map(|e| e["type"].as_str().map(str::to_string))
                .collect()
        }
    }

    impl Subscriber for RecordingSubscriber {
        fn connection_id(&self) -> ConnectionId {
            self.id
        }

        fn send(&self, frame: Arc<str>) -> Result<(), DeliveryError> {
            if self.closed.load(Ordering::SeqCst) {
                return Err(DeliveryError::Closed);
            }
            let mut frames = self.frames.lock().unwrap_or_else(|e| e.into_inner());
            if self.capacity.is_some_and(|cap| frames.len() >= cap) {
                return Err(DeliveryError::Backpressure);
            }
            frames.push(frame.to_string());
            Ok(())
        }
    }
}
