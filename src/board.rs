//! NoGo board representation and move legality.
//!
//! This module provides the rules engine that every search component builds on:
//! - Board state as a 1D array with a one-cell border ring
//! - Legality checks for the NoGo rules (no captures, no suicide)
//! - Block (connected component) and liberty computation
//! - Make/unmake with an undo record for in-place search
//!
//! Row `r` and column `c` (both 1-based) live at index `r * (N + 1) + c`. The
//! border column is shared between the right edge of one row and the left edge
//! of the next, so every interior point has four orthogonal neighbors in the
//! array without any bounds checks.
//!
//! Stones are never removed. A move that would take the last liberty of an
//! opponent block is illegal, so the number of stones only ever grows and a game
//! lasts at most N*N plies.

use std::fmt;

use thiserror::Error;

use crate::constants::COLUMN_LETTERS;

/// A point on the board, represented as an index into the 1D board array.
pub type Point = usize;

/// A player.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Color {
    Black,
    White,
}

impl Color {
    /// The other player.
    #[inline]
    pub fn opponent(self) -> Color {
        match self {
            Color::Black => Color::White,
            Color::White => Color::Black,
        }
    }

    /// Parse a GTP color argument (`b`, `w`, `black`, `white`, any case).
    pub fn from_gtp(s: &str) -> Option<Color> {
        match s.to_ascii_lowercase().as_str() {
            "b" | "black" => Some(Color::Black),
            "w" | "white" => Some(Color::White),
            _ => None,
        }
    }

    /// Single-letter GTP form.
    pub fn letter(self) -> char {
        match self {
            Color::Black => 'b',
            Color::White => 'w',
        }
    }

    /// Long GTP form.
    pub fn name(self) -> &'static str {
        match self {
            Color::Black => "black",
            Color::White => "white",
        }
    }
}

/// Content of one cell of the board array.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Cell {
    Empty,
    Black,
    White,
    /// Off-board padding. Never changes after the board is created.
    Border,
}

impl Cell {
    /// Digit used by the position encoder (`Empty = 0`, `Black = 1`, `White = 2`).
    #[inline]
    pub fn key_digit(self) -> u8 {
        match self {
            Cell::Empty => 0,
            Cell::Black => 1,
            Cell::White => 2,
            Cell::Border => 3,
        }
    }

    /// The stone color in this cell, if any.
    #[inline]
    pub fn stone(self) -> Option<Color> {
        match self {
            Cell::Black => Some(Color::Black),
            Cell::White => Some(Color::White),
            Cell::Empty | Cell::Border => None,
        }
    }
}

impl From<Color> for Cell {
    #[inline]
    fn from(color: Color) -> Self {
        match color {
            Color::Black => Cell::Black,
            Color::White => Cell::White,
        }
    }
}

/// Reason a move was rejected.
///
/// The board is left untouched whenever one of these is returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MoveError {
    /// Point is not empty (or not on the board)
    #[error("occupied")]
    Occupied,
    /// Move would remove the last liberty of an opponent block
    #[error("capture")]
    Capture,
    /// Move would leave the placed stone's block without liberties
    #[error("suicide")]
    Suicide,
}

/// Error produced when parsing a coordinate such as `C4`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoordError {
    #[error("invalid point: '{0}'")]
    Invalid(String),
    #[error("point off board: '{0}'")]
    OffBoard(String),
}

/// Everything needed to take back one move played with [`Board::make_move`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Undo {
    pub point: Point,
    pub previous: Cell,
    pub player: Color,
    pub last_move: Option<Point>,
    pub last2_move: Option<Point>,
}

/// Length of the padded board array for an NxN board.
#[inline]
pub fn board_array_size(size: usize) -> usize {
    (size + 1) * (size + 2) + 1
}

/// A NoGo board.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Board {
    size: usize,
    /// Row stride (N + 1)
    ns: usize,
    cells: Vec<Cell>,
    current_player: Color,
    last_move: Option<Point>,
    last2_move: Option<Point>,
    /// Cell order used by the position encoder, fixed when the board is reset
    enumeration: Vec<Point>,
}

impl Board {
    /// Create an empty board of the given size with Black to move.
    ///
    /// Sizes outside `MIN_BOARD_SIZE..=MAX_BOARD_SIZE` are the caller's
    /// responsibility; the GTP adapter rejects them before getting here.
    pub fn new(size: usize) -> Self {
        let mut board = Board {
            size: 0,
            ns: 0,
            cells: Vec::new(),
            current_player: Color::Black,
            last_move: None,
            last2_move: None,
            enumeration: Vec::new(),
        };
        board.reset(size);
        board
    }

    /// Reset to an empty board of the given size.
    pub fn reset(&mut self, size: usize) {
        self.size = size;
        self.ns = size + 1;
        self.cells = vec![Cell::Border; board_array_size(size)];
        for row in 1..=size {
            let start = self.row_start(row);
            self.cells[start..start + size].fill(Cell::Empty);
        }
        self.current_player = Color::Black;
        self.last_move = None;
        self.last2_move = None;
        self.enumeration = self.enumeration_order();
    }

    /// Black stones, then white stones, then empty points, each ascending.
    /// On a freshly reset board this is just every interior point in order.
    fn enumeration_order(&self) -> Vec<Point> {
        [Cell::Black, Cell::White, Cell::Empty]
            .into_iter()
            .flat_map(|cell| self.points_where(cell))
            .collect()
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn current_player(&self) -> Color {
        self.current_player
    }

    pub fn set_current_player(&mut self, color: Color) {
        self.current_player = color;
    }

    #[inline]
    pub fn last_move(&self) -> Option<Point> {
        self.last_move
    }

    #[inline]
    pub fn last2_move(&self) -> Option<Point> {
        self.last2_move
    }

    /// The fixed cell order the position encoder folds over.
    #[inline]
    pub fn enumeration(&self) -> &[Point] {
        &self.enumeration
    }

    /// Index of the first point of a 1-based row.
    #[inline]
    pub fn row_start(&self, row: usize) -> Point {
        row * self.ns + 1
    }

    /// Point for 1-based (row, col). Row 1 is the bottom row.
    #[inline]
    pub fn pt(&self, row: usize, col: usize) -> Point {
        row * self.ns + col
    }

    /// 1-based (row, col) of a point.
    #[inline]
    pub fn point_to_coord(&self, point: Point) -> (usize, usize) {
        (point / self.ns, point % self.ns)
    }

    /// Whether `point` is an interior (playable) point.
    #[inline]
    pub fn is_on_board(&self, point: Point) -> bool {
        matches!(self.cells.get(point), Some(c) if *c != Cell::Border)
    }

    /// All interior points in ascending index order.
    pub fn points(&self) -> impl Iterator<Item = Point> + '_ {
        (1..=self.size).flat_map(move |row| {
            let start = self.row_start(row);
            start..start + self.size
        })
    }

    fn points_where(&self, cell: Cell) -> Vec<Point> {
        self.points().filter(|&p| self.cells[p] == cell).collect()
    }

    #[inline]
    pub fn get_color(&self, point: Point) -> Cell {
        self.cells[point]
    }

    /// The 4 orthogonal neighbors (W, E, S, N) of an interior point.
    /// Some of them may be border cells.
    #[inline]
    pub fn neighbors(&self, point: Point) -> [Point; 4] {
        [point - 1, point + 1, point - self.ns, point + self.ns]
    }

    /// The 4 diagonal neighbors of an interior point.
    #[inline]
    pub fn diagonal_neighbors(&self, point: Point) -> [Point; 4] {
        [
            point - self.ns - 1,
            point - self.ns + 1,
            point + self.ns - 1,
            point + self.ns + 1,
        ]
    }

    /// Orthogonal neighbors holding `cell`.
    pub fn neighbors_of_color(&self, point: Point, cell: Cell) -> impl Iterator<Item = Point> + '_ {
        self.neighbors(point)
            .into_iter()
            .filter(move |&n| self.cells[n] == cell)
    }

    /// All empty points in ascending index order.
    pub fn get_empty_points(&self) -> Vec<Point> {
        self.points_where(Cell::Empty)
    }

    /// Number of stones on the board.
    pub fn stone_count(&self) -> usize {
        self.points().filter(|&p| self.cells[p].stone().is_some()).count()
    }

    /// Points holding a stone of either color, ascending.
    pub fn stones(&self) -> Vec<Point> {
        self.points().filter(|&p| self.cells[p].stone().is_some()).collect()
    }

    /// Check if every orthogonal neighbor is `color` or off the board.
    fn is_surrounded(&self, point: Point, color: Color) -> bool {
        let own = Cell::from(color);
        self.neighbors(point)
            .iter()
            .all(|&n| matches!(self.cells[n], c if c == own || c == Cell::Border))
    }

    /// Check if a point is a simple eye for `color`.
    ///
    /// The point must be surrounded by `color` (or the edge). A diagonal is
    /// "bad" if it holds an opponent stone: one is tolerated in the center,
    /// none at the edge.
    pub fn is_eye(&self, point: Point, color: Color) -> bool {
        if !self.is_surrounded(point, color) {
            return false;
        }
        let opp = Cell::from(color.opponent());
        let mut at_edge = false;
        let mut false_count = 0;
        for d in self.diagonal_neighbors(point) {
            match self.cells[d] {
                Cell::Border => at_edge = true,
                c if c == opp => false_count += 1,
                _ => {}
            }
        }
        let tolerance = if at_edge { 0 } else { 1 };
        false_count <= tolerance
    }

    /// Flood fill from `point` over cells with the same content.
    ///
    /// Returns a marker array indexed by point. Works for stones (a block) and
    /// for empty points (an empty region).
    pub fn connected_component(&self, point: Point) -> Vec<bool> {
        self.flood_fill(point, |p| self.cells[p])
    }

    /// Flood fill over the board as seen through `at`.
    fn flood_fill(&self, start: Point, at: impl Fn(Point) -> Cell) -> Vec<bool> {
        let cell = at(start);
        let mut marker = vec![false; self.cells.len()];
        let mut stack = vec![start];
        marker[start] = true;

        while let Some(p) = stack.pop() {
            for n in self.neighbors(p) {
                if !marker[n] && at(n) == cell {
                    marker[n] = true;
                    stack.push(n);
                }
            }
        }
        marker
    }

    /// Whether the block containing `start` has a liberty, as if `placed`
    /// already held `stone`.
    fn block_has_liberty(&self, start: Point, placed: Point, stone: Cell) -> bool {
        let at = |p: Point| if p == placed { stone } else { self.cells[p] };
        let block = self.flood_fill(start, at);
        self.points()
            .filter(|&p| block[p])
            .any(|p| self.neighbors(p).into_iter().any(|n| at(n) == Cell::Empty))
    }

    /// Decide whether `color` may play at `point` without touching the board.
    ///
    /// Opponent blocks are checked first, so a move that both captures and
    /// has no liberties reports [`MoveError::Capture`].
    pub fn check_move(&self, point: Point, color: Color) -> Result<(), MoveError> {
        if self.cells.get(point) != Some(&Cell::Empty) {
            return Err(MoveError::Occupied);
        }
        let stone = Cell::from(color);
        let opp = Cell::from(color.opponent());
        if self
            .neighbors_of_color(point, opp)
            .any(|n| !self.block_has_liberty(n, point, stone))
        {
            return Err(MoveError::Capture);
        }
        if !self.block_has_liberty(point, point, stone) {
            return Err(MoveError::Suicide);
        }
        Ok(())
    }

    /// Check whether it is legal for `color` to play on `point`.
    #[inline]
    pub fn is_legal(&self, point: Point, color: Color) -> bool {
        self.check_move(point, color).is_ok()
    }

    /// Legal moves for `color` in ascending index order.
    pub fn legal_moves(&self, color: Color) -> Vec<Point> {
        self.points()
            .filter(|&p| self.cells[p] == Cell::Empty && self.is_legal(p, color))
            .collect()
    }

    /// Whether `color` has at least one legal move.
    pub fn has_legal_move(&self, color: Color) -> bool {
        self.points()
            .any(|p| self.cells[p] == Cell::Empty && self.is_legal(p, color))
    }

    /// Play `color` at `point`, returning the record needed to take it back.
    ///
    /// On success the side to move becomes the opponent of `color`.
    pub fn make_move(&mut self, point: Point, color: Color) -> Result<Undo, MoveError> {
        self.check_move(point, color)?;
        let undo = Undo {
            point,
            previous: self.cells[point],
            player: self.current_player,
            last_move: self.last_move,
            last2_move: self.last2_move,
        };
        self.cells[point] = Cell::from(color);
        self.current_player = color.opponent();
        self.last2_move = self.last_move;
        self.last_move = Some(point);
        Ok(undo)
    }

    /// Take back a move played with [`Board::make_move`].
    pub fn unmake(&mut self, undo: Undo) {
        self.cells[undo.point] = undo.previous;
        self.current_player = undo.player;
        self.last_move = undo.last_move;
        self.last2_move = undo.last2_move;
    }

    /// Play `color` at `point`.
    ///
    /// # Errors
    /// - [`MoveError::Occupied`] - the point is not empty
    /// - [`MoveError::Capture`] - an opponent block would lose its last liberty
    /// - [`MoveError::Suicide`] - the new stone's block would have no liberties
    pub fn play_move(&mut self, point: Point, color: Color) -> Result<(), MoveError> {
        self.make_move(point, color).map(|_| ())
    }

    /// The winner if the game is over: the side to move loses when it has no
    /// legal move.
    pub fn winner(&self) -> Option<Color> {
        if self.has_legal_move(self.current_player) {
            None
        } else {
            Some(self.current_player.opponent())
        }
    }

    /// Convert a point to a coordinate string (e.g., "C4").
    pub fn format_point(&self, point: Point) -> String {
        let (row, col) = self.point_to_coord(point);
        format!("{}{row}", COLUMN_LETTERS[col - 1] as char)
    }

    /// Parse a coordinate string (e.g., "c4") into a point.
    ///
    /// Columns use letters A-Z skipping I, rows count from 1 at the bottom.
    pub fn parse_point(&self, s: &str) -> Result<Point, CoordError> {
        let lower = s.to_ascii_lowercase();
        let bytes = lower.as_bytes();
        let invalid = || CoordError::Invalid(lower.clone());

        let (&col_char, digits) = bytes.split_first().ok_or_else(invalid)?;
        if !col_char.is_ascii_lowercase() || col_char == b'i' {
            return Err(invalid());
        }
        let mut col = (col_char - b'a') as usize;
        if col_char < b'i' {
            col += 1;
        }
        let row: usize = std::str::from_utf8(digits)
            .ok()
            .filter(|d| !d.is_empty() && d.bytes().all(|b| b.is_ascii_digit()))
            .and_then(|d| d.parse().ok())
            .filter(|&r| r >= 1)
            .ok_or_else(invalid)?;

        if col > self.size || row > self.size {
            return Err(CoordError::OffBoard(lower));
        }
        Ok(self.pt(row, col))
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in (1..=self.size).rev() {
            let start = self.row_start(row);
            for p in start..start + self.size {
                let ch = match self.cells[p] {
                    Cell::Black => 'X',
                    Cell::White => 'O',
                    _ => '.',
                };
                write!(f, "{ch}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
