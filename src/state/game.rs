//! Game state management.
//!
//! One `GameState` per room: settings, the active round's words and board,
//! who claimed what, and the score. Callers serialize access through the
//! room's game lock.

use super::board::{self, Board, CoordinateIndex, Position, WordSpan};
use super::room::Seat;
use super::words::WordSource;
use log::info;
use rand::Rng;
use serde::Serialize;
use std::collections::HashMap;

/// Grid size for new rooms.
pub const DEFAULT_GRID_SIZE: usize = 12;

/// Words per round for new rooms.
pub const DEFAULT_WORD_COUNT: usize = 7;

/// Smallest grid a room may be configured with.
pub const MIN_GRID_SIZE: usize = 11;

/// Largest grid a room may be configured with.
pub const MAX_GRID_SIZE: usize = 64;

/// Per-room options, changeable by seat 1 between rounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GameSettings {
    pub grid_size: usize,
    pub word_count: usize,
}

impl GameSettings {
    /// Range-check both options.
    pub fn validate(&self) -> Result<(), GameError> {
        SettingsChange::GridSize(self.grid_size as i64).validate()?;
        SettingsChange::WordCount(self.word_count as i64).validate()
    }
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            grid_size: DEFAULT_GRID_SIZE,
            word_count: DEFAULT_WORD_COUNT,
        }
    }
}

/// A requested settings change, as received from a client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsChange {
    GridSize(i64),
    WordCount(i64),
}

impl SettingsChange {
    /// Range-check the requested value.
    pub fn validate(&self) -> Result<(), GameError> {
        match *self {
            Self::GridSize(n) if n < MIN_GRID_SIZE as i64 => Err(GameError::InvalidGridSize),
            Self::GridSize(n) if n > MAX_GRID_SIZE as i64 => Err(GameError::GridSizeTooLarge),
            Self::WordCount(n) if n < 1 => Err(GameError::InvalidWordCount),
            _ => Ok(()),
        }
    }
}

/// Payload broadcast when a round begins.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameStart {
    pub board: Board,
    pub words: Vec<String>,
}

/// Payload broadcast after a successful claim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WordClaimed {
    pub word: String,
    pub player_number: u8,
    pub start: [i32; 2],
    pub end: [i32; 2],
    pub score: [u32; 2],
}

/// A word nobody found, revealed when the round ends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnclaimedWord {
    pub word: String,
    #[serde(flatten)]
    pub span: Option<WordSpan>,
}

/// Payload broadcast when a seat reaches a majority.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameOver {
    pub winner: u8,
    pub unclaimed_words: Vec<UnclaimedWord>,
}

/// State of one room's game.
#[derive(Debug, Clone, Default)]
pub struct GameState {
    settings: GameSettings,

    /// Active round's words, upper-case
    words: Vec<String>,

    board: Board,

    /// Word to claiming player id
    claims: HashMap<String, String>,

    /// Where each placed word sits, for the end-of-round reveal
    word_coordinates: CoordinateIndex,

    score: [u32; 2],

    game_started: bool,
}

impl GameState {
    pub fn new(settings: GameSettings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    pub fn settings(&self) -> GameSettings {
        self.settings
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn score(&self) -> [u32; 2] {
        self.score
    }

    pub fn is_started(&self) -> bool {
        self.game_started
    }

    /// Player id that claimed `word`, if any.
    pub fn claimant(&self, word: &str) -> Option<&str> {
        self.claims.get(&word.to_uppercase()).map(String::as_str)
    }

    pub fn claim_count(&self) -> usize {
        self.claims.len()
    }

    /// Score a seat needs to win: a strict majority of the round's words.
    pub fn winning_score(&self) -> u32 {
        (self.words.len() / 2 + 1) as u32
    }

    /// Stop the round without a winner (a player left).
    pub fn stop(&mut self) {
        self.game_started = false;
    }

    /// Apply a settings change. Rejected while a round is running.
    pub fn apply_settings(&mut self, change: SettingsChange) -> Result<GameSettings, GameError> {
        change.validate()?;
        if self.game_started {
            return Err(GameError::GameInProgress);
        }

        // Values were range-checked above.
        match change {
            SettingsChange::GridSize(n) => self.settings.grid_size = n as usize,
            SettingsChange::WordCount(n) => self.settings.word_count = n as usize,
        }
        Ok(self.settings)
    }

    /// Begin a new round: fresh words, fresh board, empty claims and score.
    pub fn start_round<R: Rng + ?Sized>(&mut self, source: &WordSource, rng: &mut R) -> GameStart {
        self.claims.clear();
        self.game_started = true;
        self.score = [0, 0];
        self.words = source
            .sample(self.settings.word_count, rng)
            .into_iter()
            .map(|w| w.to_uppercase())
            .collect();

        let (board, coordinates) = board::generate(self.settings.grid_size, &self.words, rng);
        self.board = board;
        self.word_coordinates = coordinates;

        info!(
            "Round started on {}x{} board with {} words",
            self.settings.grid_size,
            self.settings.grid_size,
            self.words.len()
        );

        GameStart {
            board: self.board.clone(),
            words: self.words.clone(),
        }
    }

    /// Read the letters from `start` to `end` inclusive, in that direction.
    ///
    /// Only rows, columns and 45-degree diagonals are legal selections.
    pub fn resolve_selection(&self, start: Position, end: Position) -> Result<String, GameError> {
        let d_row = i64::from(end.row) - i64::from(start.row);
        let d_col = i64::from(end.col) - i64::from(start.col);
        let (len_row, len_col) = (d_row.abs(), d_col.abs());

        if len_row == 0 && len_col == 0 {
            return Err(GameError::InvalidSelection("single cell"));
        }
        if len_row != 0 && len_col != 0 && len_row != len_col {
            return Err(GameError::InvalidSelection("crooked diagonal"));
        }

        // Both ends on the board keeps every cell between them on it too.
        if self.board.get(start).is_none() || self.board.get(end).is_none() {
            return Err(GameError::OutOfBounds);
        }

        let steps = len_row.max(len_col) as i32;
        let (step_row, step_col) = (d_row.signum() as i32, d_col.signum() as i32);

        let mut letters = String::new();
        for i in 0..=steps {
            let pos = Position::new(start.row + step_row * i, start.col + step_col * i);
            let letter = self.board.get(pos).ok_or(GameError::OutOfBounds)?;
            letters.push(letter);
        }

        Ok(letters.to_uppercase())
    }

    /// Claim the word under a selection for `player_id`.
    ///
    /// `seats` holds the player ids sitting in seat 1 and seat 2; the score
    /// goes to whichever matches. The selection may read the word in either
    /// direction. The returned payload echoes the cells as submitted.
    pub fn claim(
        &mut self,
        player_id: &str,
        seats: [Option<&str>; 2],
        start: Position,
        end: Position,
    ) -> Result<WordClaimed, GameError> {
        let forward = self.resolve_selection(start, end)?;

        if !self.game_started {
            return Err(GameError::GameNotStarted);
        }

        let reversed: String = forward.chars().rev().collect();
        let word = [forward, reversed]
            .into_iter()
            .find(|candidate| self.words.iter().any(|w| w.to_uppercase() == *candidate))
            .ok_or(GameError::InvalidWord)?;

        if self.claims.contains_key(&word) {
            return Err(GameError::AlreadyClaimed);
        }

        let seat = Seat::ALL
            .into_iter()
            .find(|seat| seats[seat.index()] == Some(player_id))
            .ok_or(GameError::InvalidPlayer)?;

        self.claims.insert(word.clone(), player_id.to_string());
        self.score[seat.index()] += 1;

        info!(
            "Seat {} claimed {} (score {}-{})",
            seat.number(),
            word,
            self.score[0],
            self.score[1]
        );

        Ok(WordClaimed {
            word,
            player_number: seat.number(),
            start: start.pair(),
            end: end.pair(),
            score: self.score,
        })
    }

    /// End the round if a seat holds a majority of the words.
    pub fn check_winner(&mut self) -> Option<GameOver> {
        let target = self.winning_score();
        let winner = Seat::ALL
            .into_iter()
            .find(|seat| self.score[seat.index()] >= target)?;

        self.game_started = false;
        info!("Seat {} won the round", winner.number());

        Some(GameOver {
            winner: winner.number(),
            unclaimed_words: self.unclaimed_words(),
        })
    }

    fn unclaimed_words(&self) -> Vec<UnclaimedWord> {
        self.words
            .iter()
            .map(|w| w.to_uppercase())
            .filter(|w| !self.claims.contains_key(w))
            .map(|w| UnclaimedWord {
                span: self.word_coordinates.get(&w).copied(),
                word: w,
            })
            .collect()
    }

    /// Install a known round, bypassing random generation.
    #[cfg(test)]
    pub(crate) fn with_round(
        settings: GameSettings,
        board: Board,
        words: &[&str],
        word_coordinates: CoordinateIndex,
    ) -> Self {
        Self {
            settings,
            words: words.iter().map(|w| w.to_uppercase()).collect(),
            board,
            claims: HashMap::new(),
            word_coordinates,
            score: [0, 0],
            game_started: true,
        }
    }
}

/// Game errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    InvalidSelection(&'static str),
    OutOfBounds,
    InvalidWord,
    AlreadyClaimed,
    GameNotStarted,
    GameInProgress,
    InvalidPlayer,
    Unauthorized,
    InvalidGridSize,
    GridSizeTooLarge,
    InvalidWordCount,
}

impl std::fmt::Display for GameError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidSelection(reason) => write!(f, "invalid selection: {}", reason),
            Self::OutOfBounds => write!(f, "selection out of bounds"),
            Self::InvalidWord => write!(f, "invalid word"),
            Self::AlreadyClaimed => write!(f, "word already claimed"),
            Self::GameNotStarted => write!(f, "game not started"),
            Self::GameInProgress => write!(f, "game already started"),
            Self::InvalidPlayer => write!(f, "invalid player ID on word claim"),
            Self::Unauthorized => write!(f, "only Player 1 can modify game settings"),
            Self::InvalidGridSize => write!(f, "insufficient grid size. must be greater than 10."),
            Self::GridSizeTooLarge => {
                write!(f, "grid size too large. must be at most {}.", MAX_GRID_SIZE)
            }
            Self::InvalidWordCount => write!(f, "word count must be at least 1"),
        }
    }
}

impl std::error::Error for GameError {}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const P1: &str = "player-one";
    const P2: &str = "player-two";
    const SEATS: [Option<&str>; 2] = [Some(P1), Some(P2)];

    /// 12x12 board with CAT across row 0, DOG down column 11 and OWL on the
    /// main diagonal from (2,2).
    fn scenario_game() -> GameState {
        let mut rows = vec![
            "CATXXXXXXXXD".to_string(),
            "XXXXXXXXXXXO".to_string(),
            "XXOXXXXXXXXG".to_string(),
            "XXXWXXXXXXXX".to_string(),
            "XXXXLXXXXXXX".to_string(),
        ];
        rows.extend((5..12).map(|_| "XXXXXXXXXXXX".to_string()));

        let mut coords = CoordinateIndex::new();
        coords.insert(
            "CAT".into(),
            WordSpan::new(Position::new(0, 0), Position::new(0, 2)),
        );
        coords.insert(
            "DOG".into(),
            WordSpan::new(Position::new(0, 11), Position::new(2, 11)),
        );
        coords.insert(
            "OWL".into(),
            WordSpan::new(Position::new(2, 2), Position::new(4, 4)),
        );

        GameState::with_round(
            GameSettings::default(),
            Board::from_rows(&rows),
            &["cat", "dog", "owl", "emu", "yak", "elk", "gnu"],
            coords,
        )
    }

    #[test]
    fn test_resolve_row_column_diagonal() {
        let game = scenario_game();

        assert_eq!(
            game.resolve_selection(Position::new(0, 0), Position::new(0, 2)),
            Ok("CAT".to_string())
        );
        assert_eq!(
            game.resolve_selection(Position::new(0, 11), Position::new(2, 11)),
            Ok("DOG".to_string())
        );
        assert_eq!(
            game.resolve_selection(Position::new(2, 2), Position::new(4, 4)),
            Ok("OWL".to_string())
        );
    }

    #[test]
    fn test_resolve_keeps_walk_direction() {
        let game = scenario_game();
        assert_eq!(
            game.resolve_selection(Position::new(0, 2), Position::new(0, 0)),
            Ok("TAC".to_string())
        );
        assert_eq!(
            game.resolve_selection(Position::new(4, 4), Position::new(2, 2)),
            Ok("LWO".to_string())
        );
    }

    #[test]
    fn test_resolve_rejects_bad_geometry() {
        let game = scenario_game();

        assert_eq!(
            game.resolve_selection(Position::new(3, 3), Position::new(3, 3)),
            Err(GameError::InvalidSelection("single cell"))
        );
        assert_eq!(
            game.resolve_selection(Position::new(0, 0), Position::new(1, 3)),
            Err(GameError::InvalidSelection("crooked diagonal"))
        );
    }

    #[test]
    fn test_resolve_out_of_bounds() {
        let game = scenario_game();

        assert_eq!(
            game.resolve_selection(Position::new(0, 10), Position::new(0, 12)),
            Err(GameError::OutOfBounds)
        );
        assert_eq!(
            game.resolve_selection(Position::new(-1, 0), Position::new(1, 0)),
            Err(GameError::OutOfBounds)
        );
    }

    #[test]
    fn test_resolve_extreme_coordinates() {
        let game = scenario_game();

        assert_eq!(
            game.resolve_selection(Position::new(-2, 0), Position::new(i32::MAX, 0)),
            Err(GameError::OutOfBounds)
        );
        assert_eq!(
            game.resolve_selection(Position::new(0, 0), Position::new(0, i32::MAX)),
            Err(GameError::OutOfBounds)
        );
        assert_eq!(
            game.resolve_selection(
                Position::new(i32::MIN, i32::MIN),
                Position::new(i32::MAX, i32::MAX)
            ),
            Err(GameError::OutOfBounds)
        );
        assert_eq!(
            game.resolve_selection(Position::new(i32::MIN, 0), Position::new(i32::MAX, 5)),
            Err(GameError::InvalidSelection("crooked diagonal"))
        );
    }

    #[test]
    fn test_resolve_matches_visited_letters() {
        let mut rng = StdRng::seed_from_u64(11);
        let source = WordSource::from_words(["alpha", "bravo", "charlie", "delta"]);
        let mut game = GameState::new(GameSettings::default());
        game.start_round(&source, &mut rng);

        let rows = game.board().rows().to_vec();
        for len in 1..5i32 {
            let across: String = rows[5][3..=(3 + len as usize)].iter().collect();
            assert_eq!(
                game.resolve_selection(Position::new(5, 3), Position::new(5, 3 + len)),
                Ok(across)
            );

            let diagonal: String = (0..=len).map(|i| rows[(1 + i) as usize][(8 - i) as usize]).collect();
            assert_eq!(
                game.resolve_selection(Position::new(1, 8), Position::new(1 + len, 8 - len)),
                Ok(diagonal)
            );
        }
    }

    #[test]
    fn test_claim_scenario() {
        let mut game = scenario_game();

        let claimed = game
            .claim(P1, SEATS, Position::new(0, 0), Position::new(0, 2))
            .unwrap();
        assert_eq!(
            claimed,
            WordClaimed {
                word: "CAT".into(),
                player_number: 1,
                start: [0, 0],
                end: [0, 2],
                score: [1, 0],
            }
        );

        let again = game.claim(P2, SEATS, Position::new(0, 0), Position::new(0, 2));
        assert_eq!(again, Err(GameError::AlreadyClaimed));
        assert_eq!(game.score(), [1, 0]);
    }

    #[test]
    fn test_claim_reversed_selection() {
        let mut game = scenario_game();

        let claimed = game
            .claim(P2, SEATS, Position::new(2, 11), Position::new(0, 11))
            .unwrap();
        assert_eq!(claimed.word, "DOG");
        assert_eq!(claimed.player_number, 2);
        assert_eq!(claimed.start, [2, 11]);
        assert_eq!(claimed.end, [0, 11]);
        assert_eq!(claimed.score, [0, 1]);

        // Forward direction is the same word.
        let again = game.claim(P1, SEATS, Position::new(0, 11), Position::new(2, 11));
        assert_eq!(again, Err(GameError::AlreadyClaimed));
        assert_eq!(game.score(), [0, 1]);
        assert_eq!(game.claimant("dog"), Some(P2));
    }

    #[test]
    fn test_claim_invalid_word() {
        let mut game = scenario_game();
        let result = game.claim(P1, SEATS, Position::new(0, 3), Position::new(0, 6));
        assert_eq!(result, Err(GameError::InvalidWord));
        assert_eq!(game.claim_count(), 0);
    }

    #[test]
    fn test_claim_requires_started_game() {
        let mut game = scenario_game();
        game.stop();

        let result = game.claim(P1, SEATS, Position::new(0, 0), Position::new(0, 2));
        assert_eq!(result, Err(GameError::GameNotStarted));
    }

    #[test]
    fn test_claim_geometry_checked_before_started() {
        let mut game = scenario_game();
        game.stop();

        let result = game.claim(P1, SEATS, Position::new(0, 0), Position::new(0, 0));
        assert_eq!(result, Err(GameError::InvalidSelection("single cell")));
    }

    #[test]
    fn test_claim_by_stranger() {
        let mut game = scenario_game();

        let result = game.claim("stranger", SEATS, Position::new(0, 0), Position::new(0, 2));
        assert_eq!(result, Err(GameError::InvalidPlayer));
        assert_eq!(game.claimant("CAT"), None);
        assert_eq!(game.score(), [0, 0]);
    }

    #[test]
    fn test_winner_needs_majority() {
        let mut game = scenario_game();
        assert_eq!(game.winning_score(), 4);

        game.claim(P1, SEATS, Position::new(0, 0), Position::new(0, 2))
            .unwrap();
        game.claim(P1, SEATS, Position::new(0, 11), Position::new(2, 11))
            .unwrap();
        game.claim(P1, SEATS, Position::new(2, 2), Position::new(4, 4))
            .unwrap();
        assert_eq!(game.check_winner(), None);
        assert!(game.is_started());

        game.score[0] += 1;
        game.claims.insert("EMU".into(), P1.into());

        let over = game.check_winner().unwrap();
        assert_eq!(over.winner, 1);
        assert!(!game.is_started());
        assert_eq!(over.unclaimed_words.len(), 7 - game.claim_count());
    }

    #[test]
    fn test_winner_reveals_unclaimed() {
        let mut game = scenario_game();
        game.claim(P2, SEATS, Position::new(0, 0), Position::new(0, 2))
            .unwrap();
        game.score[1] = 4;

        let over = game.check_winner().unwrap();
        assert_eq!(over.winner, 2);

        let revealed: Vec<&str> = over.unclaimed_words.iter().map(|u| u.word.as_str()).collect();
        assert_eq!(revealed, vec!["DOG", "OWL", "EMU", "YAK", "ELK", "GNU"]);
        assert_eq!(
            over.unclaimed_words[0].span,
            Some(WordSpan::new(Position::new(0, 11), Position::new(2, 11)))
        );
        assert_eq!(over.unclaimed_words[2].span, None);
    }

    #[test]
    fn test_unclaimed_word_json() {
        let placed = UnclaimedWord {
            word: "OWL".into(),
            span: Some(WordSpan::new(Position::new(2, 2), Position::new(4, 4))),
        };
        assert_eq!(
            serde_json::to_value(&placed).unwrap(),
            serde_json::json!({"word": "OWL", "start": [2, 2], "end": [4, 4]})
        );

        let missing = UnclaimedWord {
            word: "EMU".into(),
            span: None,
        };
        assert_eq!(
            serde_json::to_value(&missing).unwrap(),
            serde_json::json!({"word": "EMU"})
        );
    }

    #[test]
    fn test_start_round_resets() {
        let mut game = scenario_game();
        game.claim(P1, SEATS, Position::new(0, 0), Position::new(0, 2))
            .unwrap();

        let source = WordSource::from_words(["apple", "pear", "plum", "fig", "lime", "kiwi", "date", "yuzu"]);
        let mut rng = StdRng::seed_from_u64(99);
        let start = game.start_round(&source, &mut rng);

        assert!(game.is_started());
        assert_eq!(game.score(), [0, 0]);
        assert_eq!(game.claim_count(), 0);
        assert_eq!(start.words.len(), DEFAULT_WORD_COUNT);
        assert!(start.words.iter().all(|w| *w == w.to_uppercase()));
        assert_eq!(start.board.size(), DEFAULT_GRID_SIZE);
        assert_eq!(start.words, game.words());
    }

    #[test]
    fn test_settings_validation() {
        let mut game = GameState::new(GameSettings::default());
        game.stop();

        assert_eq!(
            game.apply_settings(SettingsChange::GridSize(10)),
            Err(GameError::InvalidGridSize)
        );
        assert_eq!(
            game.apply_settings(SettingsChange::GridSize(11)).unwrap().grid_size,
            11
        );
        assert_eq!(
            game.apply_settings(SettingsChange::GridSize(1000)),
            Err(GameError::GridSizeTooLarge)
        );
        assert_eq!(
            game.apply_settings(SettingsChange::WordCount(0)),
            Err(GameError::InvalidWordCount)
        );
        assert_eq!(
            game.apply_settings(SettingsChange::WordCount(9)).unwrap(),
            GameSettings {
                grid_size: 11,
                word_count: 9
            }
        );
    }

    #[test]
    fn test_settings_bounds() {
        assert_eq!(GameSettings::default().validate(), Ok(()));
        assert_eq!(
            GameSettings {
                grid_size: 5,
                word_count: 7
            }
            .validate(),
            Err(GameError::InvalidGridSize)
        );
        assert_eq!(
            GameSettings {
                grid_size: 12,
                word_count: 0
            }
            .validate(),
            Err(GameError::InvalidWordCount)
        );
    }

    #[test]
    fn test_settings_locked_during_round() {
        let mut game = scenario_game();
        assert_eq!(
            game.apply_settings(SettingsChange::WordCount(3)),
            Err(GameError::GameInProgress)
        );
        assert_eq!(game.settings(), GameSettings::default());
    }
}
