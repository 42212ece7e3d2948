//! Board Geometry
//!
//! Positions, footprints and rotations on the board grid. A connection point
//! is stored as a fraction of its component's footprint; its world position is
//! derived from the component position and rotation every time it is needed.

use serde::{Deserialize, Serialize};

/// Distance (in grid units) within which a drawn wire endpoint snaps onto a
/// terminal or an existing wire node.
pub const SNAP_TOLERANCE: f64 = 0.5;

/// A point on the board, in grid units
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point
    pub fn distance_to(&self, other: &Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn offset(&self, dx: f64, dy: f64) -> Point {
        Point::new(self.x + dx, self.y + dy)
    }
}

/// Width and height of a component footprint
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Which rotations a component accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RotationMode {
    Fixed,
    Quarter,
    Free,
}

impl RotationMode {
    pub fn allows(&self, rotation: &Rotation) -> bool {
        match (self, rotation) {
            (_, Rotation::Quarter(0)) => true,
            (RotationMode::Fixed, _) => false,
            (RotationMode::Quarter, Rotation::Quarter(_)) => true,
            (RotationMode::Quarter, Rotation::Free(_)) => false,
            (RotationMode::Free, _) => true,
        }
    }
}

/// Component rotation: whole quarter turns, or an arbitrary angle in degrees
/// for components whose capability allows it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rotation {
    Quarter(u8),
    Free(f64),
}

impl Default for Rotation {
    fn default() -> Self {
        Rotation::Quarter(0)
    }
}

impl Rotation {
    /// Normalize quarter turns into 0..=3
    pub fn normalized(self) -> Rotation {
        match self {
            Rotation::Quarter(q) => Rotation::Quarter(q % 4),
            Rotation::Free(deg) => Rotation::Free(deg.rem_euclid(360.0)),
        }
    }

    /// Rotate a vector (relative to the component center) clockwise in
    /// screen coordinates. Quarter turns are exact.
    fn apply(&self, dx: f64, dy: f64) -> (f64, f64) {
        match *self {
            Rotation::Quarter(q) => match q % 4 {
                0 => (dx, dy),
                1 => (-dy, dx),
                2 => (-dx, -dy),
                _ => (dy, -dx),
            },
            Rotation::Free(deg) => {
                let (sin_r, cos_r) = deg.to_radians().sin_cos();
                (dx * cos_r - dy * sin_r, dx * sin_r + dy * cos_r)
            }
        }
    }
}

/// World position of a terminal given as a footprint fraction.
///
/// `position` is the top-left corner of the unrotated footprint; rotation
/// happens about the footprint center.
pub fn terminal_position(position: Point, size: Size, rotation: Rotation, offset: Point) -> Point {
    let cx = size.width / 2.0;
    let cy = size.height / 2.0;
    let (dx, dy) = rotation.apply(offset.x * size.width - cx, offset.y * size.height - cy);
    Point::new(position.x + cx + dx, position.y + cy + dy)
}
