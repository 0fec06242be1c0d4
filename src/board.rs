//! Board representation and coordinate math on the torus.
//!
//! Every axis wraps: stepping past the last column lands on the first one,
//! and stepping left of column 0 lands on the last. All adjacency goes
//! through [`canonicalize`], so positions never need bounds checks.
//!
//! The board is a flat sequence of fields indexed by `y + x * size.y`.
//! It is backed by a persistent vector, so cloning a board (and therefore
//! a whole game state) is cheap and shares structure with the original.

use std::fmt;
use std::ops::{Index, IndexMut};

use im::Vector;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{DEFAULT_SIZE, FIELD_BLACK, FIELD_EMPTY, FIELD_WHITE, MAX_DIMENSION};


#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Color {
    Black,
    White,
}

impl Color {
    /// Returns the opposite color.
    pub fn opposite(self) -> Self {
        match self {
            Color::Black => Color::White,
            Color::White => Color::Black,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::Black => write!(f, "Black"),
            Color::White => write!(f, "White"),
        }
    }
}

/// One value per color, e.g. capture counts or player slots.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorMap<T> {
    #[serde(rename = "Black")]
    pub black: T,
    #[serde(rename = "White")]
    pub white: T,
}

impl<T> Index<Color> for ColorMap<T> {
    type Output = T;

    fn index(&self, color: Color) -> &T {
        match color {
            Color::Black => &self.black,
            Color::White => &self.white,
        }
    }
}

impl<T> IndexMut<Color> for ColorMap<T> {
    fn index_mut(&mut self, color: Color) -> &mut T {
        match color {
            Color::Black => &mut self.black,
            Color::White => &mut self.white,
        }
    }
}

/// Content of a single intersection.
///
/// On the wire a field is the integer `0` (empty), `1` (Black) or `2` (White).
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Field {
    #[default]
    Empty,
    Stone(Color),
}

impl Field {
    pub fn is_empty(self) -> bool {
        self == Field::Empty
    }

    /// Color of the stone on this field, if any.
    pub fn color(self) -> Option<Color> {
        match self {
            Field::Empty => None,
            Field::Stone(c) => Some(c),
        }
    }
}

impl From<Color> for Field {
    fn from(color: Color) -> Self {
        Field::Stone(color)
    }
}

impl From<Field> for u8 {
    fn from(field: Field) -> Self {
        match field {
            Field::Empty => FIELD_EMPTY,
            Field::Stone(Color::Black) => FIELD_BLACK,
            Field::Stone(Color::White) => FIELD_WHITE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid field value {0}, expected 0, 1 or 2")]
pub struct InvalidField(pub u8);

impl TryFrom<u8> for Field {
    type Error = InvalidField;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            FIELD_EMPTY => Ok(Field::Empty),
            FIELD_BLACK => Ok(Field::Stone(Color::Black)),
            FIELD_WHITE => Ok(Field::Stone(Color::White)),
            other => Err(InvalidField(other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("board dimensions must be between 1 and {MAX_DIMENSION}, got {x}x{y}")]
pub struct SizeError {
    pub x: usize,
    pub y: usize,
}

/// Number of intersections along each toroidal axis.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawSize")]
pub struct Size {
    x: usize,
    y: usize,
}

#[derive(Deserialize)]
struct RawSize {
    x: usize,
    y: usize,
}

impl TryFrom<RawSize> for Size {
    type Error = SizeError;

    fn try_from(raw: RawSize) -> Result<Self, Self::Error> {
        Size::new(raw.x, raw.y)
    }
}

impl Size {
    pub fn new(x: usize, y: usize) -> Result<Self, SizeError> {
        let valid = 1..=MAX_DIMENSION;
        if !valid.contains(&x) || !valid.contains(&y) {
            return Err(SizeError { x, y });
        }
        Ok(Size { x, y })
    }

    pub fn square(n: usize) -> Result<Self, SizeError> {
        Size::new(n, n)
    }

    pub fn x(self) -> usize {
        self.x
    }

    pub fn y(self) -> usize {
        self.y
    }

    /// Total number of intersections.
    pub fn area(self) -> usize {
        self.x * self.y
    }

    /// All canonical positions, in board index order.
    pub fn positions(self) -> impl Iterator<Item = Pos> {
        (0..self.area()).map(move |i| index_position(self, i))
    }
}

impl Default for Size {
    fn default() -> Self {
        Size {
            x: DEFAULT_SIZE,
            y: DEFAULT_SIZE,
        }
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.x, self.y)
    }
}

/// A position on the board, possibly outside `[0, size)` on either axis.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Pos {
    pub x: i32,
    pub y: i32,
}

impl Pos {
    pub const fn new(x: i32, y: i32) -> Self {
        Pos { x, y }
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}

/// Wrap a position onto the torus: `0 <= x < size.x`, `0 <= y < size.y`.
///
/// Uses euclidean remainder, so negative coordinates wrap from the far edge.
#[inline]
pub fn canonicalize(size: Size, pos: Pos) -> Pos {
    // Size::new caps both dimensions at MAX_DIMENSION, so the results fit.
    Pos {
        x: i64::from(pos.x).rem_euclid(size.x as i64) as i32,
        y: i64::from(pos.y).rem_euclid(size.y as i64) as i32,
    }
}

/// Board index of a position (canonicalized first).
#[inline]
pub fn position_index(size: Size, pos: Pos) -> usize {
    let c = canonicalize(size, pos);
    c.y as usize + c.x as usize * size.y
}

/// Canonical position of a board index.
#[inline]
pub fn index_position(size: Size, index: usize) -> Pos {
    Pos {
        x: (index / size.y) as i32,
        y: (index % size.y) as i32,
    }
}

/// The 4 canonical neighbors of a position: left, right, up, down.
///
/// On boards with an axis of length 1 or 2, entries may repeat, and with
/// length 1 a position is its own neighbor along that axis.
#[inline]
pub fn neighbors(size: Size, pos: Pos) -> [Pos; 4] {
    let c = canonicalize(size, pos);
    [
        canonicalize(size, Pos::new(c.x - 1, c.y)),
        canonicalize(size, Pos::new(c.x + 1, c.y)),
        canonicalize(size, Pos::new(c.x, c.y - 1)),
        canonicalize(size, Pos::new(c.x, c.y + 1)),
    ]
}

/// Neighbors of `pos` accepted by `filter`, in [`neighbors`] order.
///
/// Repeated entries are kept, so callers can tell how many of the four
/// directions matched.
pub fn neighbors_where(size: Size, pos: Pos, filter: impl Fn(Pos) -> bool) -> Vec<Pos> {
    neighbors(size, pos).into_iter().filter(|&n| filter(n)).collect()
}

/// Distinct grid neighbors of `pos`, excluding `pos` itself.
pub fn distinct_neighbors(size: Size, pos: Pos) -> Vec<Pos> {
    let c = canonicalize(size, pos);
    let mut out: Vec<Pos> = Vec::with_capacity(4);
    for n in neighbors(size, c) {
        if n != c && !out.contains(&n) {
            out.push(n);
        }
    }
    out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("board has {actual} fields, expected {expected}")]
pub struct BoardLengthError {
    pub expected: usize,
    pub actual: usize,
}

/// Fields of a torus board. The board does not store its own size;
/// callers pass the [`Size`] of the rule set it belongs to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Board {
    fields: Vector<Field>,
}

impl Board {
    pub fn empty(size: Size) -> Self {
        Board {
            fields: Vector::from(vec![Field::Empty; size.area()]),
        }
    }

    /// Build a board from fields in index order, checking the length.
    pub fn from_fields(
        size: Size,
        fields: impl IntoIterator<Item = Field>,
    ) -> Result<Self, BoardLengthError> {
        let fields: Vector<Field> = fields.into_iter().collect();
        if fields.len() != size.area() {
            return Err(BoardLengthError {
                expected: size.area(),
                actual: fields.len(),
            });
        }
        Ok(Board { fields })
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    #[inline]
    pub fn get(&self, size: Size, pos: Pos) -> Field {
        self.fields[position_index(size, pos)]
    }

    /// A copy of this board with one field replaced. `self` is untouched.
    pub fn with_field(&self, size: Size, pos: Pos, field: Field) -> Board {
        Board {
            fields: self.fields.update(position_index(size, pos), field),
        }
    }

    /// A copy of this board with every listed position set to `field`.
    pub fn with_fields(&self, size: Size, positions: &[Pos], field: Field) -> Board {
        let mut fields = self.fields.clone();
        for &p in positions {
            fields.set(position_index(size, p), field);
        }
        Board { fields }
    }

    /// Fields in index order.
    pub fn fields(&self) -> impl Iterator<Item = Field> + '_ {
        self.fields.iter().copied()
    }

    /// Number of fields holding `field`.
    pub fn count(&self, field: Field) -> usize {
        self.fields.iter().filter(|&&f| f == field).count()
    }

    /// Text rendering: one line per row `y`, columns `x` left to right.
    /// `X` is Black, `O` is White, `.` is empty.
    pub fn render(&self, size: Size) -> String {
        let mut out = String::with_capacity(size.area() * 2 + size.y());
        for y in 0..size.y() {
            for x in 0..size.x() {
                let ch = match self.get(size, Pos::new(x as i32, y as i32)) {
                    Field::Stone(Color::Black) => 'X',
                    Field::Stone(Color::White) => 'O',
                    Field::Empty => '.',
                };
                out.push(ch);
                if x + 1 < size.x() {
                    out.push(' ');
                }
            }
            out.push('\n');
        }
        out
    }
}
