//! Board generation.
//!
//! Words are dropped onto an empty square grid along one of the eight
//! compass directions, then the remaining cells are filled with random
//! letters. Two words may share a cell only when they agree on its letter.

use log::{debug, warn};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::ops::RangeInclusive;

/// Placement attempts per word before it is left off the board.
pub const MAX_PLACEMENT_ATTEMPTS: u32 = 100;

const ALPHABET: &[u8; 26] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Row/column steps for the eight legal directions.
const DIRECTIONS: [(i32, i32); 8] = [
    (0, 1),
    (0, -1),
    (1, 0),
    (-1, 0),
    (1, 1),
    (1, -1),
    (-1, 1),
    (-1, -1),
];

/// Grid position. Signed so that selections reaching off the board can be
/// represented and rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub row: i32,
    pub col: i32,
}

impl Position {
    pub fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    /// `[row, col]` form used in outbound messages.
    pub fn pair(&self) -> [i32; 2] {
        [self.row, self.col]
    }
}

/// Inclusive start and end cells of a placed word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WordSpan {
    pub start: [i32; 2],
    pub end: [i32; 2],
}

impl WordSpan {
    pub fn new(start: Position, end: Position) -> Self {
        Self {
            start: start.pair(),
            end: end.pair(),
        }
    }

    pub fn start(&self) -> Position {
        Position::new(self.start[0], self.start[1])
    }

    pub fn end(&self) -> Position {
        Position::new(self.end[0], self.end[1])
    }
}

/// Square grid of upper-case letters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Board {
    cells: Vec<Vec<char>>,
}

impl Board {
    /// Build a board from literal rows. Letters are upper-cased.
    pub fn from_rows<S: AsRef<str>>(rows: &[S]) -> Self {
        let cells = rows
            .iter()
            .map(|r| r.as_ref().chars().map(|c| c.to_ascii_uppercase()).collect())
            .collect();
        Self { cells }
    }

    pub fn size(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Letter at `pos`, or `None` when it lies outside the grid.
    pub fn get(&self, pos: Position) -> Option<char> {
        let row = usize::try_from(pos.row).ok()?;
        let col = usize::try_from(pos.col).ok()?;
        self.cells.get(row)?.get(col).copied()
    }

    pub fn rows(&self) -> &[Vec<char>] {
        &self.cells
    }
}

/// Word to placed location.
pub type CoordinateIndex = HashMap<String, WordSpan>;

/// Lay out `words` on a `grid_size` square grid.
///
/// Words are upper-cased and placed in order. A word that cannot be placed
/// within [`MAX_PLACEMENT_ATTEMPTS`] tries is skipped and gets no entry in
/// the returned index.
pub fn generate<R: Rng + ?Sized>(
    grid_size: usize,
    words: &[String],
    rng: &mut R,
) -> (Board, CoordinateIndex) {
    let mut grid: Vec<Vec<Option<char>>> = vec![vec![None; grid_size]; grid_size];
    let mut index = CoordinateIndex::with_capacity(words.len());

    for word in words {
        let word = word.to_uppercase();
        let letters: Vec<char> = word.chars().collect();
        if letters.is_empty() {
            continue;
        }

        match place_word(&mut grid, &letters, rng) {
            Some(span) => {
                debug!("Placed {} from {:?} to {:?}", word, span.start, span.end);
                index.insert(word, span);
            }
            None => warn!(
                "Could not place {} on a {}x{} board after {} attempts",
                word, grid_size, grid_size, MAX_PLACEMENT_ATTEMPTS
            ),
        }
    }

    let mut cells = Vec::with_capacity(grid_size);
    for row in grid {
        let mut filled = Vec::with_capacity(grid_size);
        for cell in row {
            filled.push(match cell {
                Some(c) => c,
                None => random_letter(rng),
            });
        }
        cells.push(filled);
    }

    (Board { cells }, index)
}

fn place_word<R: Rng + ?Sized>(
    grid: &mut [Vec<Option<char>>],
    letters: &[char],
    rng: &mut R,
) -> Option<WordSpan> {
    let size = grid.len() as i32;
    let len = letters.len() as i32;

    for _ in 0..MAX_PLACEMENT_ATTEMPTS {
        let (d_row, d_col) = DIRECTIONS[rng.gen_range(0..DIRECTIONS.len())];

        let (Some(rows), Some(cols)) = (
            start_range(d_row, len, size),
            start_range(d_col, len, size),
        ) else {
            continue;
        };
        let start = Position::new(rng.gen_range(rows), rng.gen_range(cols));

        if !fits(grid, letters, start, d_row, d_col) {
            continue;
        }

        let mut pos = start;
        for &c in letters {
            grid[pos.row as usize][pos.col as usize] = Some(c);
            pos = Position::new(pos.row + d_row, pos.col + d_col);
        }
        let end = Position::new(start.row + d_row * (len - 1), start.col + d_col * (len - 1));

        return Some(WordSpan::new(start, end));
    }

    None
}

/// Starting coordinates along one axis that keep a word of `len` letters
/// on a grid of `size` cells.
fn start_range(step: i32, len: i32, size: i32) -> Option<RangeInclusive<i32>> {
    if len > size {
        return if step == 0 && size > 0 {
            Some(0..=size - 1)
        } else {
            None
        };
    }
    match step {
        1 => Some(0..=size - len),
        -1 => Some(len - 1..=size - 1),
        _ if size > 0 => Some(0..=size - 1),
        _ => None,
    }
}

fn fits(
    grid: &[Vec<Option<char>>],
    letters: &[char],
    start: Position,
    d_row: i32,
    d_col: i32,
) -> bool {
    let size = grid.len() as i32;
    let mut pos = start;

    for &c in letters {
        if pos.row < 0 || pos.row >= size || pos.col < 0 || pos.col >= size {
            return false;
        }
        match grid[pos.row as usize][pos.col as usize] {
            Some(existing) if existing != c => return false,
            _ => {}
        }
        pos = Position::new(pos.row + d_row, pos.col + d_col);
    }

    true
}

fn random_letter<R: Rng + ?Sized>(rng: &mut R) -> char {
    ALPHABET[rng.gen_range(0..ALPHABET.len())] as char
}
