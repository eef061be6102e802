//! Connected players.
//!
//! A `Player` lives as long as its connection. The room a player sits in
//! owns the seat; the player only keeps a weak back-reference to find it.

use super::connection::{Connection, DeliveryError};
use super::lock;
use super::room::{Room, Seat};
use crate::protocol::ServerMessage;
use log::warn;
use std::sync::{Arc, Mutex, Weak};
use tokio::sync::mpsc;

/// Where a player currently sits.
#[derive(Debug, Default)]
struct Membership {
    room: Weak<Room>,
    seat: Option<Seat>,
}

/// One connected participant.
#[derive(Debug)]
pub struct Player {
    id: String,
    name: Mutex<String>,
    membership: Mutex<Membership>,
    connection: Connection,
}

impl Player {
    /// Create a player with a fresh id. The receiver feeds the
    /// connection's writer task.
    pub fn new(capacity: usize) -> (Arc<Self>, mpsc::Receiver<ServerMessage>) {
        Self::with_id(uuid::Uuid::new_v4().to_string(), capacity)
    }

    pub fn with_id(
        id: impl Into<String>,
        capacity: usize,
    ) -> (Arc<Self>, mpsc::Receiver<ServerMessage>) {
        let (connection, rx) = Connection::new(capacity);
        let player = Self {
            id: id.into(),
            name: Mutex::new(String::new()),
            membership: Mutex::new(Membership::default()),
            connection,
        };
        (Arc::new(player), rx)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> String {
        lock(&self.name).clone()
    }

    pub fn set_name(&self, name: impl Into<String>) {
        *lock(&self.name) = name.into();
    }

    /// Seat held in the current room, if any.
    pub fn seat(&self) -> Option<Seat> {
        lock(&self.membership).seat
    }

    /// The room this player sits in, if it is still alive.
    pub fn room(&self) -> Option<Arc<Room>> {
        lock(&self.membership).room.upgrade()
    }

    pub fn connection(&self) -> &Connection {
        &self.connection
    }

    pub(crate) fn enter_room(&self, room: &Arc<Room>, seat: Seat) {
        let mut membership = lock(&self.membership);
        membership.room = Arc::downgrade(room);
        membership.seat = Some(seat);
    }

    pub(crate) fn set_seat(&self, seat: Seat) {
        lock(&self.membership).seat = Some(seat);
    }

    pub(crate) fn exit_room(&self) {
        *lock(&self.membership) = Membership::default();
    }

    /// Queue a message for this player. A player whose queue is full is
    /// disconnected; the connection task then tears down their session.
    pub fn send(&self, message: ServerMessage) -> bool {
        match self.connection.send(message) {
            Ok(()) => true,
            Err(DeliveryError::Full) => {
                warn!("Player {} is not keeping up, disconnecting", self.id);
                false
            }
            Err(DeliveryError::Closed) => false,
        }
    }

    /// Close the outbound queue. Safe to call more than once.
    pub fn disconnect(&self) {
        self.connection.close();
    }

    pub fn is_connected(&self) -> bool {
        !self.connection.is_closed()
    }

    /// Resolves once the player has been disconnected.
    pub async fn disconnected(&self) {
        self.connection.closed().await
    }
}
