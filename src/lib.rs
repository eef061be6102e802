//! Word-Search Session Library
//!
//! Room and game state for a two-player, real-time word-search game.
//!
//! # Overview
//!
//! - **Words & Boards** - A word list is sampled each round and hidden in a
//!   square letter grid along any of the eight straight-line directions.
//!
//! - **Games** - Each room runs one game at a time: players select a
//!   straight line of cells, the first to select a listed word claims it,
//!   and whoever claims a strict majority wins the round.
//!
//! - **Rooms** - Two seats, readiness flags, and per-room options that only
//!   seat 1 may change. Seat 2 moves up when seat 1 leaves.
//!
//! - **Session Directory** - Every connected player and live room, with
//!   rooms reachable by id or by a short join code.
//!
//! - **Protocol & Dispatch** - JSON `{type, payload}` messages in both
//!   directions, routed to one handler per request type.
//!
//! # Design Principles
//!
//! 1. **Errors are per request** - A failed request produces an `error`
//!    message to its sender only. Nothing a client sends can end a room.
//!
//! 2. **Never wait on a client** - Outbound messages go through a bounded
//!    queue; a player who stops reading is disconnected.
//!
//! 3. **Locks are short and ordered** - Messages are built under a lock and
//!    delivered after it is released.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use wordsearch_state::dispatch::dispatch;
//! use wordsearch_state::protocol::ServerMessage;
//! use wordsearch_state::{Player, SessionDirectory, WordSource};
//!
//! let directory = SessionDirectory::new(WordSource::from_words(["cat", "dog", "owl"]));
//!
//! let (alice, mut inbox) = Player::new(16);
//! directory.add_player(Arc::clone(&alice));
//!
//! dispatch(&directory, &alice, r#"{"type":"create_room","payload":{"name":"Alice"}}"#);
//!
//! match inbox.try_recv().unwrap() {
//!     ServerMessage::RoomCreated(created) => assert_eq!(created.player1_name, "Alice"),
//!     other => panic!("unexpected {:?}", other),
//! }
//! assert_eq!(directory.room_count(), 1);
//! ```

pub mod config;
pub mod dispatch;
pub mod protocol;
pub mod state;
pub mod transport;

// Re-export everything from state module at crate root
pub use state::*;
