//! Outbound message channel for one connected player.
//!
//! Messages are queued on a bounded channel that a per-connection writer
//! task drains to the socket. Enqueueing never waits: a full queue means
//! the peer is not keeping up, so the connection is closed instead.

use super::lock;
use crate::protocol::ServerMessage;
use std::sync::Mutex;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::sync::Notify;

/// Default outbound queue depth per player.
pub const DEFAULT_OUTBOUND_CAPACITY: usize = 16;

/// Why a message was not queued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryError {
    /// Queue was full; the connection has been closed.
    Full,
    /// Connection was already closed.
    Closed,
}

impl std::fmt::Display for DeliveryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Full => write!(f, "outbound queue full"),
            Self::Closed => write!(f, "connection closed"),
        }
    }
}

impl std::error::Error for DeliveryError {}

/// Sending half of a player's outbound queue.
#[derive(Debug)]
pub struct Connection {
    /// `None` once closed. Dropping the sender ends the writer task.
    sender: Mutex<Option<mpsc::Sender<ServerMessage>>>,

    /// Wakes whoever is waiting in [`Connection::closed`].
    closed: Notify,

    /// When the connection was accepted
    pub connected_at: chrono::DateTime<chrono::Utc>,
}

impl Connection {
    /// Create a connection and the receiver its writer task drains.
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<ServerMessage>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let conn = Self {
            sender: Mutex::new(Some(tx)),
            closed: Notify::new(),
            connected_at: chrono::Utc::now(),
        };
        (conn, rx)
    }

    /// Queue a message without waiting.
    ///
    /// If the queue is full the message is dropped and the connection is
    /// closed.
    pub fn send(&self, message: ServerMessage) -> Result<(), DeliveryError> {
        let result = match lock(&self.sender).as_ref() {
            Some(tx) => tx.try_send(message),
            None => return Err(DeliveryError::Closed),
        };

        match result {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => {
                self.close();
                Err(DeliveryError::Full)
            }
            Err(TrySendError::Closed(_)) => {
                self.close();
                Err(DeliveryError::Closed)
            }
        }
    }

    /// Close the queue. Returns `true` only for the call that closed it.
    pub fn close(&self) -> bool {
        let was_open = lock(&self.sender).take().is_some();
        if was_open {
            self.closed.notify_one();
        }
        was_open
    }

    pub fn is_closed(&self) -> bool {
        lock(&self.sender).is_none()
    }

    /// Resolves once the connection has been closed.
    pub async fn closed(&self) {
        if self.is_closed() {
            return;
        }
        self.closed.notified().await;
    }
}
