//! State management for the word-search server.
//!
//! - `words` - candidate word list
//! - `board` - board generation and grid geometry
//! - `game` - per-room round state: selections, claims, scoring
//! - `connection` - non-blocking outbound queue per player
//! - `player` - connected participants
//! - `room` - two seats, readiness, delivery
//! - `directory` - registries of players, rooms and join codes
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                      SessionDirectory                        │
//! │                                                              │
//! │   player_id → Player     room_id → Room     code → Room      │
//! │                                                              │
//! │   ┌──────────────────────────────────────────────────────┐   │
//! │   │ Room                                                 │   │
//! │   │   seats: [Arc<Player>; 2] + ready flags  (one lock)  │   │
//! │   │   game:  GameState                       (one lock)  │   │
//! │   └──────────────────────────────────────────────────────┘   │
//! │                                                              │
//! │   Player ──weak──▶ Room        Player ──mpsc──▶ writer task  │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Locking
//!
//! Locks are always taken in the order directory, room seats, room game,
//! player. Nothing is sent to a player while any of these is held.

pub mod board;
pub mod connection;
pub mod directory;
pub mod game;
pub mod player;
pub mod room;
pub mod words;

pub use board::{Board, CoordinateIndex, Position, WordSpan, MAX_PLACEMENT_ATTEMPTS};
pub use connection::{Connection, DeliveryError, DEFAULT_OUTBOUND_CAPACITY};
pub use directory::SessionDirectory;
pub use game::{
    GameError, GameOver, GameSettings, GameStart, GameState, SettingsChange, UnclaimedWord,
    WordClaimed, DEFAULT_GRID_SIZE, DEFAULT_WORD_COUNT, MAX_GRID_SIZE, MIN_GRID_SIZE,
};
pub use player::Player;
pub use room::{
    ClaimOutcome, PlayerJoined, PlayerLeft, ReadyUpdate, Room, RoomCreated, RoomError, Seat,
    SettingsUpdate, JOIN_CODE_LENGTH,
};
pub use words::{WordSource, WordSourceError};

use std::sync::{Mutex, MutexGuard, PoisonError};

/// Lock a mutex, recovering the data if a previous holder panicked.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
