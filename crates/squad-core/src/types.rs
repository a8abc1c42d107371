//! Fundamental tile-space and simulation types.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Integer tile coordinate. x = east, y = south (world z).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TilePos {
    pub x: i32,
    pub y: i32,
}

impl TilePos {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// World-space centre of the tile on the ground plane.
    pub fn center(&self) -> Vec3 {
        Vec3::new(self.x as f32 + 0.5, 0.0, self.y as f32 + 0.5)
    }

    /// Tile containing a world-space point.
    pub fn from_world(p: Vec3) -> Self {
        Self::new(p.x.floor() as i32, p.z.floor() as i32)
    }

    /// Squared euclidean distance in tiles.
    pub fn distance_sq(&self, other: TilePos) -> i32 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        dx * dx + dy * dy
    }

    /// Chebyshev (king-move) distance in tiles.
    pub fn chebyshev(&self, other: TilePos) -> i32 {
        (other.x - self.x).abs().max((other.y - self.y).abs())
    }

    pub fn offset(&self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// Rotate around the origin by a multiple of 90 degrees (x/z plane).
    pub fn rotate_quarter(&self, degrees: i32) -> Self {
        match degrees.rem_euclid(360) {
            90 => Self::new(self.y, -self.x),
            180 => Self::new(-self.x, -self.y),
            270 => Self::new(-self.y, self.x),
            _ => *self,
        }
    }
}

/// Inclusive integer rectangle in tile space. `min > max` marks it invalid (empty).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    pub min: TilePos,
    pub max: TilePos,
}

impl Default for Rect {
    fn default() -> Self {
        Self::invalid()
    }
}

impl Rect {
    pub const fn new(x0: i32, y0: i32, x1: i32, y1: i32) -> Self {
        Self {
            min: TilePos::new(x0, y0),
            max: TilePos::new(x1, y1),
        }
    }

    /// A one-tile rectangle.
    pub const fn point(p: TilePos) -> Self {
        Self { min: p, max: p }
    }

    /// The empty rectangle. Union with anything yields the other operand.
    pub const fn invalid() -> Self {
        Self::new(0, 0, -1, -1)
    }

    pub fn is_valid(&self) -> bool {
        self.min.x <= self.max.x && self.min.y <= self.max.y
    }

    pub fn outset(&self, n: i32) -> Self {
        if !self.is_valid() {
            return *self;
        }
        Self::new(self.min.x - n, self.min.y - n, self.max.x + n, self.max.y + n)
    }

    pub fn union(&self, other: &Rect) -> Self {
        if !self.is_valid() {
            return *other;
        }
        if !other.is_valid() {
            return *self;
        }
        Self::new(
            self.min.x.min(other.min.x),
            self.min.y.min(other.min.y),
            self.max.x.max(other.max.x),
            self.max.y.max(other.max.y),
        )
    }

    pub fn contains(&self, p: TilePos) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        self.is_valid()
            && other.is_valid()
            && self.min.x <= other.max.x
            && other.min.x <= self.max.x
            && self.min.y <= other.max.y
            && other.min.y <= self.max.y
    }

    pub fn width(&self) -> i32 {
        (self.max.x - self.min.x + 1).max(0)
    }

    pub fn height(&self) -> i32 {
        (self.max.y - self.min.y + 1).max(0)
    }

    /// Iterate every tile of the rectangle in row-major order.
    pub fn tiles(&self) -> impl Iterator<Item = TilePos> + '_ {
        let (x0, x1) = (self.min.x, self.max.x);
        (self.min.y..=self.max.y).flat_map(move |y| (x0..=x1).map(move |x| TilePos::new(x, y)))
    }
}

/// Simulation time tracking.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimTime {
    /// Ticks processed since the battle started.
    pub tick: u64,
    /// Elapsed simulation time in milliseconds.
    pub elapsed_ms: u64,
}

impl SimTime {
    /// Advance by one tick of `delta_ms`.
    pub fn advance(&mut self, delta_ms: u32) {
        self.tick += 1;
        self.elapsed_ms += delta_ms as u64;
    }
}

/// Distance covered in `delta_ms` at `speed` units per second.
pub fn travel(delta_ms: u32, speed: f32) -> f32 {
    speed * delta_ms as f32 / 1000.0
}

/// Shortest angular distance from `from` to `to` in degrees, with the direction (+1 or -1).
pub fn min_delta_degrees(from: f32, to: f32) -> (f32, f32) {
    let diff = (to - from).rem_euclid(360.0);
    if diff <= 180.0 {
        (diff, 1.0)
    } else {
        (360.0 - diff, -1.0)
    }
}

/// Normalize an angle into `[0, 360)`.
pub fn normalize_degrees(deg: f32) -> f32 {
    let d = deg.rem_euclid(360.0);
    if d >= 360.0 {
        0.0
    } else {
        d
    }
}
