//! Candidate word list.
//!
//! Loaded once at startup and shared read-only by every room.

use rand::Rng;
use std::collections::HashSet;
use std::path::Path;

/// Immutable, ordered list of candidate words.
#[derive(Debug, Clone, Default)]
pub struct WordSource {
    words: Vec<String>,
}

impl WordSource {
    /// Build a source from in-memory words. Blank entries are skipped and
    /// surrounding whitespace is trimmed.
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let words = words
            .into_iter()
            .map(|w| w.as_ref().trim().to_string())
            .filter(|w| !w.is_empty())
            .collect();
        Self { words }
    }

    /// Read one word per line from `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, WordSourceError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| WordSourceError::Io {
            path: path.display().to_string(),
            source,
        })?;

        let source = Self::from_words(contents.lines());
        if source.is_empty() {
            return Err(WordSourceError::Empty(path.display().to_string()));
        }
        Ok(source)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    /// Draw `count` distinct words uniformly without replacement.
    ///
    /// Indices are drawn independently and duplicates are rejected and
    /// redrawn. The count is capped at the size of the source.
    pub fn sample<R: Rng + ?Sized>(&self, count: usize, rng: &mut R) -> Vec<String> {
        let count = count.min(self.words.len());
        let mut seen = HashSet::with_capacity(count);
        let mut picked = Vec::with_capacity(count);

        while picked.len() < count {
            let index = rng.gen_range(0..self.words.len());
            if seen.insert(index) {
                picked.push(self.words[index].clone());
            }
        }

        picked
    }
}

/// Failure to load the word list.
#[derive(Debug)]
pub enum WordSourceError {
    Io {
        path: String,
        source: std::io::Error,
    },
    Empty(String),
}

impl std::fmt::Display for WordSourceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "Failed to read word list {}: {}", path, source),
            Self::Empty(path) => write!(f, "Word list {} contains no words", path),
        }
    }
}

impl std::error::Error for WordSourceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Empty(_) => None,
        }
    }
}
