//! Session directory - every live player, room and join code.
//!
//! One lock guards all three registries so a room is never reachable by id
//! but not by code, or the other way round.

use super::game::{GameError, GameSettings};
use super::lock;
use super::player::Player;
use super::room::{generate_join_code, Room, RoomError};
use super::words::WordSource;
use crate::protocol::ServerMessage;
use log::{debug, info};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

#[derive(Debug, Default)]
struct Registries {
    /// Players by id
    players: HashMap<String, Arc<Player>>,

    /// Rooms by id
    rooms: HashMap<String, Arc<Room>>,

    /// Rooms by join code
    codes: HashMap<String, Arc<Room>>,
}

impl Registries {
    /// Take `player` out of their room and drop the room once empty.
    fn vacate(&mut self, player: &Player) -> Option<(Arc<Player>, ServerMessage)> {
        let room = player.room()?;
        let notice = room.remove_player(player);

        if room.is_empty() {
            self.rooms.remove(room.id());
            self.codes.remove(room.join_code());
            let lifetime = chrono::Utc::now() - room.created_at;
            info!(
                "Room {} ({}) closed after {}s",
                room.join_code(),
                room.id(),
                lifetime.num_seconds()
            );
        }

        notice.map(|(remaining, left)| (remaining, ServerMessage::PlayerLeft(left)))
    }
}

/// Process-wide session state.
#[derive(Debug)]
pub struct SessionDirectory {
    registries: Mutex<Registries>,
    words: WordSource,
    default_settings: GameSettings,
}

impl SessionDirectory {
    pub fn new(words: WordSource) -> Self {
        Self {
            registries: Mutex::new(Registries::default()),
            words,
            default_settings: GameSettings::default(),
        }
    }

    /// Directory whose new rooms start with `default_settings`. The
    /// settings get the same range checks as a seat 1 change.
    pub fn with_settings(
        words: WordSource,
        default_settings: GameSettings,
    ) -> Result<Self, GameError> {
        default_settings.validate()?;
        Ok(Self {
            default_settings,
            ..Self::new(words)
        })
    }

    pub fn words(&self) -> &WordSource {
        &self.words
    }

    /// Register a newly connected player.
    pub fn add_player(&self, player: Arc<Player>) {
        debug!("Player {} connected", player.id());
        lock(&self.registries)
            .players
            .insert(player.id().to_string(), player);
    }

    pub fn player(&self, player_id: &str) -> Option<Arc<Player>> {
        lock(&self.registries).players.get(player_id).cloned()
    }

    pub fn room(&self, room_id: &str) -> Option<Arc<Room>> {
        lock(&self.registries).rooms.get(room_id).cloned()
    }

    /// Look up a live room by join code, ignoring case.
    pub fn room_by_code(&self, code: &str) -> Option<Arc<Room>> {
        lock(&self.registries)
            .codes
            .get(&code.trim().to_uppercase())
            .cloned()
    }

    pub fn player_count(&self) -> usize {
        lock(&self.registries).players.len()
    }

    pub fn room_count(&self) -> usize {
        lock(&self.registries).rooms.len()
    }

    /// Open a room with `owner` in seat 1.
    pub fn create_room(&self, owner: &Arc<Player>) -> Result<Arc<Room>, RoomError> {
        let mut registries = lock(&self.registries);

        if owner.room().is_some() {
            return Err(RoomError::AlreadyInRoom);
        }

        let mut rng = rand::thread_rng();
        let code = loop {
            let code = generate_join_code(&mut rng);
            if !registries.codes.contains_key(&code) {
                break code;
            }
        };

        let room = Arc::new(Room::new(
            uuid::Uuid::new_v4().to_string(),
            code,
            self.default_settings,
        ));
        room.seat_player(owner)?;

        registries
            .rooms
            .insert(room.id().to_string(), Arc::clone(&room));
        registries
            .codes
            .insert(room.join_code().to_string(), Arc::clone(&room));

        info!(
            "Room {} ({}) created by {}",
            room.join_code(),
            room.id(),
            owner.id()
        );
        Ok(room)
    }

    /// Seat `player` in the room with `code` as seat 2.
    pub fn join_room_by_code(
        &self,
        player: &Arc<Player>,
        code: &str,
    ) -> Result<Arc<Room>, RoomError> {
        let registries = lock(&self.registries);

        if player.room().is_some() {
            return Err(RoomError::AlreadyInRoom);
        }

        let room = registries
            .codes
            .get(&code.trim().to_uppercase())
            .cloned()
            .ok_or(RoomError::InvalidCode)?;

        if room.is_full() {
            return Err(RoomError::RoomFull);
        }
        room.seat_player(player)?;

        info!("Player {} joined room {}", player.id(), room.join_code());
        Ok(room)
    }

    /// Leave the current room but stay connected.
    pub fn leave_room(&self, player: &Player) {
        let notice = lock(&self.registries).vacate(player);
        deliver(notice);
    }

    /// Forget a disconnected player, leaving their room first.
    pub fn remove_player(&self, player: &Player) {
        let notice = {
            let mut registries = lock(&self.registries);
            registries.players.remove(player.id());
            registries.vacate(player)
        };
        debug!("Player {} removed", player.id());
        deliver(notice);
    }
}

fn deliver(notice: Option<(Arc<Player>, ServerMessage)>) {
    if let Some((remaining, message)) = notice {
        remaining.send(message);
    }
}
