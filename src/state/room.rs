//! Room state management.
//!
//! A room pairs up to two players with one game. Seat 1 is always filled
//! before seat 2; when seat 1 leaves, seat 2 moves up.

use super::board::Position;
use super::game::{
    GameError, GameOver, GameSettings, GameStart, GameState, SettingsChange, WordClaimed,
};
use super::lock;
use super::player::Player;
use super::words::WordSource;
use crate::protocol::ServerMessage;
use log::info;
use rand::Rng;
use serde::Serialize;
use std::sync::{Arc, Mutex};

/// Join code length.
pub const JOIN_CODE_LENGTH: usize = 6;

/// Join code characters. `I`, `O`, `0` and `1` are left out.
const JOIN_CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// Random join code. Uniqueness is the directory's job.
pub fn generate_join_code<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..JOIN_CODE_LENGTH)
        .map(|_| JOIN_CODE_ALPHABET[rng.gen_range(0..JOIN_CODE_ALPHABET.len())] as char)
        .collect()
}

/// A player slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Seat {
    One,
    Two,
}

impl Seat {
    pub const ALL: [Seat; 2] = [Seat::One, Seat::Two];

    /// Index into per-seat arrays.
    pub fn index(&self) -> usize {
        match self {
            Self::One => 0,
            Self::Two => 1,
        }
    }

    /// Seat number shown to clients.
    pub fn number(&self) -> u8 {
        match self {
            Self::One => 1,
            Self::Two => 2,
        }
    }
}

/// Sent to the creator of a room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoomCreated {
    pub code: String,
    pub player1_name: String,
    pub options: GameSettings,
}

/// Broadcast when a second player sits down.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayerJoined {
    pub player1_name: String,
    pub player2_name: String,
    pub player1_ready: bool,
    pub player2_ready: bool,
    pub code: String,
    pub options: GameSettings,
}

/// Broadcast whenever a readiness flag changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReadyUpdate {
    pub player1_ready: bool,
    pub player2_ready: bool,
}

/// Sent to the player left behind when the other one goes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayerLeft {
    pub player1_name: String,
    pub player1_ready: bool,
    pub player2_ready: bool,
}

/// Broadcast after seat 1 changes the options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SettingsUpdate {
    pub options: GameSettings,
}

/// Result of a successful claim. `game_over` is set when the claim won the
/// round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimOutcome {
    pub claimed: WordClaimed,
    pub game_over: Option<GameOver>,
}

#[derive(Debug, Default)]
struct Seats {
    players: [Option<Arc<Player>>; 2],
    ready: [bool; 2],
}

impl Seats {
    fn seat_of(&self, player_id: &str) -> Option<Seat> {
        Seat::ALL.into_iter().find(|seat| {
            self.players[seat.index()]
                .as_ref()
                .is_some_and(|p| p.id() == player_id)
        })
    }

    fn ready_update(&self) -> ReadyUpdate {
        ReadyUpdate {
            player1_ready: self.ready[0],
            player2_ready: self.ready[1],
        }
    }

    fn name(&self, seat: Seat) -> String {
        self.players[seat.index()]
            .as_ref()
            .map(|p| p.name())
            .unwrap_or_default()
    }

    fn occupants(&self) -> Vec<Arc<Player>> {
        self.players.iter().flatten().cloned().collect()
    }
}

/// Room state.
#[derive(Debug)]
pub struct Room {
    id: String,
    join_code: String,

    /// Seat occupants and readiness
    seats: Mutex<Seats>,

    game: Mutex<GameState>,

    /// When the room was created
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl Room {
    pub fn new(
        id: impl Into<String>,
        join_code: impl Into<String>,
        settings: GameSettings,
    ) -> Self {
        Self {
            id: id.into(),
            join_code: join_code.into(),
            seats: Mutex::new(Seats::default()),
            game: Mutex::new(GameState::new(settings)),
            created_at: chrono::Utc::now(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn join_code(&self) -> &str {
        &self.join_code
    }

    /// Seat held by `player_id`, if any.
    pub fn seat_of(&self, player_id: &str) -> Option<Seat> {
        lock(&self.seats).seat_of(player_id)
    }

    /// Occupant of `seat`.
    pub fn player(&self, seat: Seat) -> Option<Arc<Player>> {
        lock(&self.seats).players[seat.index()].clone()
    }

    pub fn player_count(&self) -> usize {
        lock(&self.seats).players.iter().flatten().count()
    }

    pub fn is_empty(&self) -> bool {
        lock(&self.seats).players.iter().all(Option::is_none)
    }

    pub fn is_full(&self) -> bool {
        lock(&self.seats).players.iter().all(Option::is_some)
    }

    pub fn settings(&self) -> GameSettings {
        lock(&self.game).settings()
    }

    pub fn is_game_started(&self) -> bool {
        lock(&self.game).is_started()
    }

    pub fn ready_flags(&self) -> ReadyUpdate {
        lock(&self.seats).ready_update()
    }

    /// Seat `player` in the first free seat and point it back at this room.
    pub(crate) fn seat_player(self: &Arc<Self>, player: &Arc<Player>) -> Result<Seat, RoomError> {
        let mut seats = lock(&self.seats);
        let seat = Seat::ALL
            .into_iter()
            .find(|seat| seats.players[seat.index()].is_none())
            .ok_or(RoomError::RoomFull)?;

        seats.players[seat.index()] = Some(Arc::clone(player));
        player.enter_room(self, seat);
        Ok(seat)
    }

    /// Record readiness for the seat `player` holds. Players without a
    /// seat are ignored. Refused while a round is running.
    pub fn set_ready(&self, player: &Player, ready: bool) -> Result<ReadyUpdate, GameError> {
        let mut seats = lock(&self.seats);
        if lock(&self.game).is_started() {
            return Err(GameError::GameInProgress);
        }

        if let Some(seat) = seats.seat_of(player.id()) {
            seats.ready[seat.index()] = ready;
        }
        Ok(seats.ready_update())
    }

    /// Both seats ready.
    pub fn check_start_condition(&self) -> bool {
        let seats = lock(&self.seats);
        seats.ready[0] && seats.ready[1]
    }

    /// Start a round if both seats are ready, clearing the flags.
    pub fn try_start_round<R: Rng + ?Sized>(
        &self,
        source: &WordSource,
        rng: &mut R,
    ) -> Option<GameStart> {
        let mut seats = lock(&self.seats);
        if !(seats.ready[0] && seats.ready[1]) {
            return None;
        }
        seats.ready = [false, false];

        let start = lock(&self.game).start_round(source, rng);
        info!("Room {} started a round", self.join_code);
        Some(start)
    }

    /// Claim the word under a selection and check for a winner in the same
    /// critical section.
    pub fn claim_word(
        &self,
        player: &Player,
        start: Position,
        end: Position,
    ) -> Result<ClaimOutcome, GameError> {
        let mut seats = lock(&self.seats);
        let ids = [
            seats.players[0].as_ref().map(|p| p.id().to_string()),
            seats.players[1].as_ref().map(|p| p.id().to_string()),
        ];

        let mut game = lock(&self.game);
        let claimed = game.claim(
            player.id(),
            [ids[0].as_deref(), ids[1].as_deref()],
            start,
            end,
        )?;

        let game_over = game.check_winner();
        if game_over.is_some() {
            seats.ready = [false, false];
        }

        Ok(ClaimOutcome { claimed, game_over })
    }

    /// Change an option. Only seat 1 may, and only between rounds.
    pub fn update_settings(
        &self,
        player: &Player,
        change: SettingsChange,
    ) -> Result<GameSettings, GameError> {
        change.validate()?;

        let seats = lock(&self.seats);
        if seats.seat_of(player.id()) != Some(Seat::One) {
            return Err(GameError::Unauthorized);
        }

        lock(&self.game).apply_settings(change)
    }

    /// Take `player` out of their seat.
    ///
    /// Seat 2 moves up when seat 1 leaves. Readiness is cleared and any
    /// running round is stopped. Returns the remaining player and the
    /// notice to send them; the caller delivers it once its own locks are
    /// released.
    pub fn remove_player(&self, player: &Player) -> Option<(Arc<Player>, PlayerLeft)> {
        let mut seats = lock(&self.seats);

        match seats.seat_of(player.id()) {
            Some(Seat::One) => {
                seats.players[0] = seats.players[1].take();
                if let Some(promoted) = &seats.players[0] {
                    promoted.set_seat(Seat::One);
                }
            }
            Some(Seat::Two) => seats.players[1] = None,
            None => {}
        }
        player.exit_room();

        seats.ready = [false, false];
        lock(&self.game).stop();

        let remaining = seats.players[0].clone()?;
        let notice = PlayerLeft {
            player1_name: remaining.name(),
            player1_ready: seats.ready[0],
            player2_ready: seats.ready[1],
        };
        Some((remaining, notice))
    }

    /// Greeting for the room creator.
    pub fn created_snapshot(&self) -> RoomCreated {
        let seats = lock(&self.seats);
        RoomCreated {
            code: self.join_code.clone(),
            player1_name: seats.name(Seat::One),
            options: self.settings(),
        }
    }

    /// Both seats' names and readiness, for a join announcement.
    pub fn joined_snapshot(&self) -> PlayerJoined {
        let seats = lock(&self.seats);
        PlayerJoined {
            player1_name: seats.name(Seat::One),
            player2_name: seats.name(Seat::Two),
            player1_ready: seats.ready[0],
            player2_ready: seats.ready[1],
            code: self.join_code.clone(),
            options: self.settings(),
        }
    }

    /// Deliver to every occupied seat.
    pub fn broadcast(&self, message: ServerMessage) {
        let occupants = lock(&self.seats).occupants();
        for player in occupants {
            player.send(message.clone());
        }
    }

    /// Deliver to one seated player. Returns `false` if `player` holds no
    /// seat here or the message could not be queued.
    pub fn send_to(&self, player: &Player, message: ServerMessage) -> bool {
        let recipient = {
            let seats = lock(&self.seats);
            seats
                .seat_of(player.id())
                .and_then(|seat| seats.players[seat.index()].clone())
        };
        recipient.is_some_and(|p| p.send(message))
    }
}

/// Room errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoomError {
    AlreadyInRoom,
    InvalidCode,
    RoomFull,
    NotInRoom,
}

impl std::fmt::Display for RoomError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AlreadyInRoom => write!(f, "player already in room"),
            Self::InvalidCode => write!(f, "invalid room code"),
            Self::RoomFull => write!(f, "room is full"),
            Self::NotInRoom => write!(f, "not in a game"),
        }
    }
}

impl std::error::Error for RoomError {}
