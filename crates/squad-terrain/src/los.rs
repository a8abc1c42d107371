//! Tile line walking and line-of-sight over the tile map.
//!
//! Sight travels tile to tile along a rasterized line. Each step must be able to
//! pass from its tile into the next (no walls, no squeezing between two solid
//! corners), and no tile strictly between the endpoints may be opaque. The
//! target tile itself may be a wall: you can see the wall you are looking at.

use squad_core::types::TilePos;

use crate::grid::TileMap;

/// Walks the tiles of a line from `start` to `end`, one step at a time.
///
/// Every step moves to a king-adjacent tile, so `p()` and `q()` are always neighbors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineWalk {
    start: TilePos,
    end: TilePos,
    num_steps: i32,
    current_step: i32,
}

impl LineWalk {
    pub fn new(start: TilePos, end: TilePos) -> Self {
        Self {
            start,
            end,
            num_steps: start.chebyshev(end),
            current_step: 0,
        }
    }

    pub fn num_steps(&self) -> i32 {
        self.num_steps
    }

    pub fn current_step(&self) -> i32 {
        self.current_step
    }

    pub fn done(&self) -> bool {
        self.current_step >= self.num_steps
    }

    fn at(&self, step: i32) -> TilePos {
        if self.num_steps == 0 {
            return self.start;
        }
        let t = step as f32 / self.num_steps as f32;
        let dx = (self.end.x - self.start.x) as f32;
        let dy = (self.end.y - self.start.y) as f32;
        self.start
            .offset((dx * t).round() as i32, (dy * t).round() as i32)
    }

    /// Tile the walk is on.
    pub fn p(&self) -> TilePos {
        self.at(self.current_step)
    }

    /// Tile the next step lands on.
    pub fn q(&self) -> TilePos {
        self.at((self.current_step + 1).min(self.num_steps))
    }

    pub fn step(&mut self) {
        if !self.done() {
            self.current_step += 1;
        }
    }
}

/// Whether a viewer on `from` can see the tile `to` within `range` tiles.
pub fn has_line_of_sight(map: &TileMap, from: TilePos, to: TilePos, range: i32) -> bool {
    if from.distance_sq(to) > range * range {
        return false;
    }
    if !map.in_bounds(from) || !map.in_bounds(to) {
        return false;
    }

    let mut walk = LineWalk::new(from, to);
    while !walk.done() {
        let (p, q) = (walk.p(), walk.q());
        if map.corner_blocked(p, q) {
            return false;
        }
        if q != to && map.blocks_sight(q) {
            return false;
        }
        walk.step();
    }
    true
}

/// Whether blast from `center` reaches `target`. Only the steps before the last
/// have to pass, so a wall standing on `target` still takes the blast.
pub fn blast_reaches(map: &TileMap, center: TilePos, target: TilePos) -> bool {
    let mut walk = LineWalk::new(center, target);
    while walk.current_step() < walk.num_steps() - 1 {
        if !map.can_see(walk.p(), walk.q()) {
            return false;
        }
        walk.step();
    }
    true
}
