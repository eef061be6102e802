//! Request handling.
//!
//! Each inbound frame is decoded into a [`ClientMessage`] and routed to one
//! handler. Handlers deliver their own results; anything that fails comes
//! back to the sender alone as an `error` message.

use crate::protocol::{
    ClientMessage, CreateRoom, JoinRoom, NameChange, ProtocolError, SelectWord, ServerMessage,
    SetReady,
};
use crate::state::{
    GameError, Player, Room, RoomError, SessionDirectory, SettingsChange, SettingsUpdate,
};
use log::debug;
use std::sync::Arc;

/// Anything that can go wrong with a single request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestError {
    Protocol(ProtocolError),
    Room(RoomError),
    Game(GameError),
}

impl std::fmt::Display for RequestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Protocol(e) => write!(f, "{}", e),
            Self::Room(e) => write!(f, "{}", e),
            Self::Game(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for RequestError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Protocol(e) => Some(e),
            Self::Room(e) => Some(e),
            Self::Game(e) => Some(e),
        }
    }
}

impl From<ProtocolError> for RequestError {
    fn from(e: ProtocolError) -> Self {
        Self::Protocol(e)
    }
}

impl From<RoomError> for RequestError {
    fn from(e: RoomError) -> Self {
        Self::Room(e)
    }
}

impl From<GameError> for RequestError {
    fn from(e: GameError) -> Self {
        Self::Game(e)
    }
}

/// Decode and handle one inbound frame from `player`.
pub fn dispatch(directory: &SessionDirectory, player: &Arc<Player>, text: &str) {
    let result = ClientMessage::decode(text)
        .map_err(RequestError::from)
        .and_then(|message| handle(directory, player, message));

    if let Err(e) = result {
        debug!("Request from {} failed: {}", player.id(), e);
        player.send(ServerMessage::error(e));
    }
}

/// Handle one decoded request.
pub fn handle(
    directory: &SessionDirectory,
    player: &Arc<Player>,
    message: ClientMessage,
) -> Result<(), RequestError> {
    match message {
        ClientMessage::CreateRoom(req) => create_room(directory, player, req),
        ClientMessage::JoinRoom(req) => join_room(directory, player, req),
        ClientMessage::NameChange(req) => name_change(player, req),
        ClientMessage::SetReady(req) => set_ready(directory, player, req),
        ClientMessage::SelectWord(req) => select_word(player, req),
        ClientMessage::SetWordCount(req) => {
            change_settings(player, SettingsChange::WordCount(req.word_count))
        }
        ClientMessage::SetGridSize(req) => {
            change_settings(player, SettingsChange::GridSize(req.grid_size))
        }
        ClientMessage::LeaveRoom => {
            directory.leave_room(player);
            Ok(())
        }
        ClientMessage::Ping => {
            player.send(ServerMessage::Pong);
            Ok(())
        }
    }
}

fn current_room(player: &Player) -> Result<Arc<Room>, RoomError> {
    player.room().ok_or(RoomError::NotInRoom)
}

fn create_room(
    directory: &SessionDirectory,
    player: &Arc<Player>,
    req: CreateRoom,
) -> Result<(), RequestError> {
    let room = directory.create_room(player)?;
    player.set_name(req.name);

    room.send_to(player, ServerMessage::RoomCreated(room.created_snapshot()));
    Ok(())
}

fn join_room(
    directory: &SessionDirectory,
    player: &Arc<Player>,
    req: JoinRoom,
) -> Result<(), RequestError> {
    let room = directory.join_room_by_code(player, &req.join_code)?;
    player.set_name(req.name);

    room.broadcast(ServerMessage::PlayerJoined(room.joined_snapshot()));
    Ok(())
}

fn name_change(player: &Player, req: NameChange) -> Result<(), RequestError> {
    player.set_name(req.name);
    player.send(ServerMessage::NameChangeAccepted {
        name: player.name(),
    });
    Ok(())
}

fn set_ready(
    directory: &SessionDirectory,
    player: &Player,
    req: SetReady,
) -> Result<(), RequestError> {
    let room = current_room(player)?;
    let update = room.set_ready(player, req.ready)?;
    room.broadcast(ServerMessage::ReadyUpdate(update));

    let mut rng = rand::thread_rng();
    if let Some(start) = room.try_start_round(directory.words(), &mut rng) {
        room.broadcast(ServerMessage::GameStart(start));
    }
    Ok(())
}

fn select_word(player: &Player, req: SelectWord) -> Result<(), RequestError> {
    let room = current_room(player)?;
    let outcome = room.claim_word(player, req.start, req.end)?;

    room.broadcast(ServerMessage::WordClaimed(outcome.claimed));
    if let Some(game_over) = outcome.game_over {
        room.broadcast(ServerMessage::GameOver(game_over));
    }
    Ok(())
}

fn change_settings(player: &Player, change: SettingsChange) -> Result<(), RequestError> {
    change.validate()?;
    let room = current_room(player)?;
    let options = room.update_settings(player, change)?;

    room.broadcast(ServerMessage::GameSettings(SettingsUpdate { options }));
    Ok(())
}
