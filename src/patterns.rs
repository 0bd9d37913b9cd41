//! 3x3 pattern codes and the pattern weight table.
//!
//! ## Pattern code
//! The eight neighbors of a point are read in a fixed order and each one becomes
//! a base-4 digit, relative to the side to move:
//!
//! ```text
//! 0 1 2      digit 4^i for neighbor i
//! 3 . 4      own = 1, opponent = 2,
//! 5 6 7      empty = 0, border = 3
//! ```
//!
//! Row `0 1 2` is the row above the point (one row stride higher in the array),
//! row `5 6 7` the row below.
//!
//! ## Weight table
//! Weights are learned offline and loaded from a text file with one
//! `<code> <weight>` pair per line. Codes that do not appear have weight zero.

use std::fs;
use std::io;
use std::path::Path;

use log::{info, warn};
use thiserror::Error;

use crate::board::{Board, Cell, Point};
use crate::constants::{
    PATTERN_BORDER, PATTERN_COUNT, PATTERN_EMPTY, PATTERN_OPPONENT, PATTERN_OWN,
};

/// Error loading a pattern weight table.
#[derive(Debug, Error)]
pub enum PatternError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },
    #[error("line {line}: pattern code {code} out of range")]
    CodeOutOfRange { line: usize, code: usize },
    #[error("line {line}: negative weight {weight}")]
    NegativeWeight { line: usize, weight: f64 },
}

/// The 8 neighbors of `point` in pattern digit order.
#[inline]
fn pattern_neighbors(board: &Board, point: Point) -> [Point; 8] {
    let up = board.size() + 1;
    [
        point + up - 1,
        point + up,
        point + up + 1,
        point - 1,
        point + 1,
        point - up - 1,
        point - up,
        point - up + 1,
    ]
}

/// Compute the pattern code of `point` for the side to move.
pub fn pattern_code(board: &Board, point: Point) -> usize {
    let own = Cell::from(board.current_player());
    let mut code = 0u32;
    for (i, n) in pattern_neighbors(board, point).into_iter().enumerate() {
        let digit = match board.get_color(n) {
            Cell::Empty => PATTERN_EMPTY,
            Cell::Border => PATTERN_BORDER,
            c if c == own => PATTERN_OWN,
            _ => PATTERN_OPPONENT,
        };
        code += digit << (2 * i);
    }
    code as usize
}

/// Weight for every pattern code.
#[derive(Debug, Clone)]
pub struct PatternWeights {
    weights: Vec<f64>,
    defined: usize,
}

impl Default for PatternWeights {
    fn default() -> Self {
        Self::empty()
    }
}

impl PatternWeights {
    /// A table with no weights. The pattern policy falls back to random moves.
    pub fn empty() -> Self {
        Self {
            weights: vec![0.0; PATTERN_COUNT],
            defined: 0,
        }
    }

    /// Every pattern code has the same weight.
    pub fn uniform(weight: f64) -> Self {
        Self {
            weights: vec![weight; PATTERN_COUNT],
            defined: PATTERN_COUNT,
        }
    }

    /// Set the weight of one pattern code.
    ///
    /// # Panics
    /// If `code >= PATTERN_COUNT`.
    pub fn set(&mut self, code: usize, weight: f64) {
        if self.weights[code] == 0.0 && weight != 0.0 {
            self.defined += 1;
        } else if self.weights[code] != 0.0 && weight == 0.0 {
            self.defined -= 1;
        }
        self.weights[code] = weight;
    }

    #[inline]
    pub fn weight(&self, code: usize) -> f64 {
        self.weights.get(code).copied().unwrap_or(0.0)
    }

    /// Weight of playing at `point` for the side to move.
    #[inline]
    pub fn weight_at(&self, board: &Board, point: Point) -> f64 {
        self.weight(pattern_code(board, point))
    }

    /// Number of codes with a non-zero weight.
    pub fn len(&self) -> usize {
        self.defined
    }

    pub fn is_empty(&self) -> bool {
        self.defined == 0
    }

    /// Parse `<code> <weight>` lines. Blank lines and `#` comments are skipped.
    pub fn parse(text: &str) -> Result<Self, PatternError> {
        let mut table = Self::empty();
        for (idx, raw) in text.lines().enumerate() {
            let line = idx + 1;
            let content = raw.split('#').next().unwrap_or("").trim();
            if content.is_empty() {
                continue;
            }
            let mut fields = content.split_whitespace();
            let (Some(code), Some(weight), None) = (fields.next(), fields.next(), fields.next())
            else {
                return Err(PatternError::Parse {
                    line,
                    message: format!("expected '<code> <weight>', got '{content}'"),
                });
            };
            let code: usize = code.parse().map_err(|_| PatternError::Parse {
                line,
                message: format!("invalid pattern code '{code}'"),
            })?;
            let weight: f64 = weight.parse().map_err(|_| PatternError::Parse {
                line,
                message: format!("invalid weight '{weight}'"),
            })?;
            if code >= PATTERN_COUNT {
                return Err(PatternError::CodeOutOfRange { line, code });
            }
            if weight < 0.0 {
                return Err(PatternError::NegativeWeight { line, weight });
            }
            table.set(code, weight);
        }
        Ok(table)
    }

    /// Load a weight file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, PatternError> {
        let text = fs::read_to_string(path)?;
        Self::parse(&text)
    }

    /// Load a weight file, falling back to an empty table (random policy) if the
    /// file is missing or malformed.
    pub fn load_or_empty(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(table) => {
                info!("loaded {} pattern weights from {}", table.len(), path.display());
                table
            }
            Err(e) => {
                warn!(
                    "could not load pattern weights from {}: {e}; using random policy",
                    path.display()
                );
                Self::empty()
            }
        }
    }
}
