//! Constants for board geometry, search budgets, and engine defaults.
//!
//! The board uses a 1D array representation with a one-cell border ring, so the
//! geometry is computed at runtime from the board size rather than fixed here.
//! Everything in this module is a default that the command line or the GTP
//! adapter can override.

use std::time::Duration;

// =============================================================================
// Board Geometry
// =============================================================================

/// Smallest supported board (NxN).
pub const MIN_BOARD_SIZE: usize = 2;

/// Largest supported board. Limited by the 25 column letters (A-Z without I).
pub const MAX_BOARD_SIZE: usize = 25;

/// Board size used when nothing else is requested.
pub const DEFAULT_BOARD_SIZE: usize = 7;

/// Largest board whose position key is exact.
///
/// Keys are base-3 numbers with one digit per interior point, so they fit in a
/// `u128` only while `3^(N*N) < 2^128`, i.e. up to 8x8.
pub const MAX_EXACT_KEY_SIZE: usize = 8;

/// Column letters used for coordinates. 'I' is skipped by convention.
pub const COLUMN_LETTERS: &[u8; 25] = b"ABCDEFGHJKLMNOPQRSTUVWXYZ";

// =============================================================================
// Monte Carlo Parameters
// =============================================================================

/// Default number of simulations per candidate move.
pub const DEFAULT_SIMULATIONS: usize = 10;

/// Default UCB1 exploration constant. `sqrt(2)` is the textbook value; a smaller
/// constant trusts the observed win rates sooner.
pub const DEFAULT_EXPLORATION: f64 = 0.4;

// =============================================================================
// Patterns
// =============================================================================

/// Number of distinct 3x3 pattern codes: one base-4 digit per neighbor, 8 neighbors.
pub const PATTERN_COUNT: usize = 1 << 16;

/// Pattern digit for an empty neighbor.
pub const PATTERN_EMPTY: u32 = 0;

/// Pattern digit for a stone of the side to move.
pub const PATTERN_OWN: u32 = 1;

/// Pattern digit for a stone of the opponent.
pub const PATTERN_OPPONENT: u32 = 2;

/// Pattern digit for an off-board neighbor.
pub const PATTERN_BORDER: u32 = 3;

/// Pattern weight file looked up at startup when no path is given.
pub const DEFAULT_WEIGHTS_FILE: &str = "weights.txt";

// =============================================================================
// Solver
// =============================================================================

/// Default wall-clock budget for one `solve` call.
pub const DEFAULT_TIME_LIMIT: Duration = Duration::from_secs(30);

// =============================================================================
// Engine Identity
// =============================================================================

/// Name reported over GTP.
pub const ENGINE_NAME: &str = "NoGo";

/// Game id reported to GoGui.
pub const GAME_ID: &str = "NoGo";
