//! Grid shapes and the per-run grid point derived from a shape and a board size.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroU32;

const fn nz(v: u32) -> NonZeroU32 {
    match NonZeroU32::new(v) {
        Some(n) => n,
        None => panic!("shape component must be non-zero"),
    }
}

/// Process/thread layout `(px, py)`. Written as `[px, py]` in YAML.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "(NonZeroU32, NonZeroU32)", into = "(NonZeroU32, NonZeroU32)")]
pub struct Shape {
    px: NonZeroU32,
    py: NonZeroU32,
}

impl Shape {
    pub const fn new(px: NonZeroU32, py: NonZeroU32) -> Self {
        Self { px, py }
    }

    /// Returns `None` if either component is zero.
    pub fn try_new(px: u32, py: u32) -> Option<Self> {
        Some(Self::new(NonZeroU32::new(px)?, NonZeroU32::new(py)?))
    }

    pub const fn px(&self) -> u32 {
        self.px.get()
    }

    pub const fn py(&self) -> u32 {
        self.py.get()
    }
}

impl From<(NonZeroU32, NonZeroU32)> for Shape {
    fn from((px, py): (NonZeroU32, NonZeroU32)) -> Self {
        Self::new(px, py)
    }
}

impl From<Shape> for (NonZeroU32, NonZeroU32) {
    fn from(s: Shape) -> Self {
        (s.px, s.py)
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.px, self.py)
    }
}

/// Shapes swept by both harnesses.
pub const DEFAULT_SHAPES: [Shape; 6] = [
    Shape::new(nz(1), nz(1)),
    Shape::new(nz(1), nz(2)),
    Shape::new(nz(2), nz(1)),
    Shape::new(nz(2), nz(2)),
    Shape::new(nz(4), nz(1)),
    Shape::new(nz(1), nz(4)),
];

/// Board side lengths swept by both harnesses.
pub const DEFAULT_BOARD_SIZES: [u32; 3] = [1024, 2048, 4096];

/// One point of the sweep: the layout plus the per-worker board dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct GridPoint {
    pub px: u32,
    pub py: u32,
    pub nx: u32,
    pub ny: u32,
    #[serde(skip)]
    pub board_size: u32,
}

impl GridPoint {
    /// Floor-divides the board by the shape. Non-divisible boards are truncated, not rejected.
    pub fn new(shape: Shape, board_size: u32) -> Self {
        let nx = board_size / shape.px;
        let ny = board_size / shape.py;
        if board_size % shape.px != 0 || board_size % shape.py != 0 {
            tracing::debug!(
                board_size,
                px = shape.px(),
                py = shape.py(),
                nx,
                ny,
                "board size not divisible by shape, dimensions truncated"
            );
        }
        Self {
            px: shape.px(),
            py: shape.py(),
            nx,
            ny,
            board_size,
        }
    }

    /// Number of workers the launcher is asked for.
    pub fn workers(&self) -> u32 {
        self.px * self.py
    }
}

impl fmt::Display for GridPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "px={} py={} nx={} ny={}",
            self.px, self.py, self.nx, self.ny
        )
    }
}
