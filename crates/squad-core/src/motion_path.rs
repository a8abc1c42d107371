//! Compact walked-tile sequence with interpolation along it.
//!
//! A `MotionPath` is immutable once built. Progress along it lives in a separate
//! [`PathCursor`] owned by the move action, so the same path can be replayed or
//! inspected without disturbing an in-flight move.

use serde::{Deserialize, Serialize};

use crate::constants::{DIAGONAL_COST, MAX_TU, ORTHOGONAL_COST};
use crate::error::CoreError;
use crate::types::TilePos;

/// Slack when deciding a segment has been fully consumed.
const SEGMENT_EPSILON: f32 = 1e-4;

/// Position along a path: segment index plus lerp fraction within the segment.
///
/// The fraction is a lerp value between two tiles, not a distance, so diagonal and
/// orthogonal segments advance it at different rates for the same travel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PathCursor {
    pub step: usize,
    pub fraction: f32,
}

/// Interpolated pose on a path.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PathPose {
    pub x: f32,
    pub z: f32,
    /// Facing in degrees, one of the 8 compass directions.
    pub rotation: f32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MotionPath {
    /// Tiles packed as byte pairs.
    tiles: Vec<[u8; 2]>,
}

impl MotionPath {
    /// Build a path from a solved tile sequence.
    pub fn new(tiles: &[TilePos]) -> Result<Self, CoreError> {
        if tiles.len() < 2 {
            return Err(CoreError::PathTooShort { len: tiles.len() });
        }
        if tiles.len() > MAX_TU {
            return Err(CoreError::PathTooLong {
                len: tiles.len(),
                max: MAX_TU,
            });
        }
        let mut packed = Vec::with_capacity(tiles.len());
        for (i, t) in tiles.iter().enumerate() {
            let (Ok(x), Ok(y)) = (u8::try_from(t.x), u8::try_from(t.y)) else {
                return Err(CoreError::PathTileOutOfRange { x: t.x, y: t.y });
            };
            if let Some(next) = tiles.get(i + 1) {
                if t.chebyshev(*next) != 1 {
                    return Err(CoreError::PathNotContiguous {
                        index: i,
                        next: i + 1,
                    });
                }
            }
            packed.push([x, y]);
        }
        Ok(Self { tiles: packed })
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    /// Always false for a constructed path; present for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn tile(&self, index: usize) -> TilePos {
        let [x, y] = self.tiles[index];
        TilePos::new(x as i32, y as i32)
    }

    pub fn first(&self) -> TilePos {
        self.tile(0)
    }

    pub fn last(&self) -> TilePos {
        self.tile(self.len() - 1)
    }

    pub fn tiles(&self) -> impl Iterator<Item = TilePos> + '_ {
        (0..self.len()).map(|i| self.tile(i))
    }

    /// Whether the cursor sits on the final tile.
    pub fn at_end(&self, cursor: &PathCursor) -> bool {
        cursor.step >= self.len() - 1
    }

    /// Distance (and TU) cost of the segment starting at `step`.
    pub fn segment_cost(&self, step: usize) -> f32 {
        let (dx, dy) = self.delta(step, step + 1);
        if dx != 0 && dy != 0 {
            DIAGONAL_COST
        } else {
            ORTHOGONAL_COST
        }
    }

    /// Sum of all segment costs.
    pub fn total_cost(&self) -> f32 {
        (0..self.len() - 1).map(|i| self.segment_cost(i)).sum()
    }

    /// Consume `budget` along the current segment.
    ///
    /// Advances at most to the next tile boundary. When the boundary is reached the
    /// step increments and the fraction resets to 0. Returns the unused budget.
    pub fn travel(&self, budget: f32, cursor: &mut PathCursor) -> f32 {
        if self.at_end(cursor) || budget <= 0.0 {
            return budget.max(0.0);
        }
        let dist_between = self.segment_cost(cursor.step);
        let dist_remain = (1.0 - cursor.fraction) * dist_between;

        if budget + SEGMENT_EPSILON >= dist_remain {
            cursor.step += 1;
            cursor.fraction = 0.0;
            (budget - dist_remain).max(0.0)
        } else {
            cursor.fraction += budget / dist_between;
            0.0
        }
    }

    /// Interpolated tile-space position and facing at a cursor.
    ///
    /// At the last tile the pose clamps to the final segment with fraction 1.
    pub fn get_pos(&self, cursor: &PathCursor) -> PathPose {
        debug_assert!(cursor.step < self.len());
        debug_assert!((0.0..1.0).contains(&cursor.fraction));

        let (step, fraction) = if cursor.step >= self.len() - 1 {
            (self.len() - 2, 1.0)
        } else {
            (cursor.step, cursor.fraction)
        };
        let p0 = self.tile(step);
        let (dx, dy) = self.delta(step, step + 1);
        PathPose {
            x: p0.x as f32 + fraction * dx as f32,
            z: p0.y as f32 + fraction * dy as f32,
            rotation: delta_to_rotation(dx, dy),
        }
    }

    fn delta(&self, i0: usize, i1: usize) -> (i32, i32) {
        let a = self.tile(i0);
        let b = self.tile(i1);
        (b.x - a.x, b.y - a.y)
    }
}

/// Facing in degrees for a unit step. 0 faces +y, 90 faces +x.
///
/// `(0, 0)` has no direction; it is a caller bug and maps to 0 in release builds.
pub fn delta_to_rotation(dx: i32, dy: i32) -> f32 {
    debug_assert!(dx != 0 || dy != 0);
    debug_assert!((-1..=1).contains(&dx) && (-1..=1).contains(&dy));

    match (dx.signum(), dy.signum()) {
        (1, 1) => 45.0,
        (1, 0) => 90.0,
        (1, -1) => 135.0,
        (0, -1) => 180.0,
        (-1, -1) => 225.0,
        (-1, 0) => 270.0,
        (-1, 1) => 315.0,
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(points: &[(i32, i32)]) -> MotionPath {
        let tiles: Vec<TilePos> = points.iter().map(|&(x, y)| TilePos::new(x, y)).collect();
        MotionPath::new(&tiles).unwrap()
    }

    #[test]
    fn test_rejects_short_and_long_paths() {
        assert_eq!(
            MotionPath::new(&[TilePos::new(1, 1)]),
            Err(CoreError::PathTooShort { len: 1 })
        );
        let long: Vec<TilePos> = (0..MAX_TU as i32 + 1).map(|x| TilePos::new(x, 0)).collect();
        assert!(matches!(
            MotionPath::new(&long),
            Err(CoreError::PathTooLong { .. })
        ));
        assert!(matches!(
            MotionPath::new(&[TilePos::new(0, 0), TilePos::new(2, 0)]),
            Err(CoreError::PathNotContiguous { .. })
        ));
        assert!(matches!(
            MotionPath::new(&[TilePos::new(-1, 0), TilePos::new(0, 0)]),
            Err(CoreError::PathTileOutOfRange { .. })
        ));
    }

    #[test]
    fn test_segment_costs() {
        let p = path(&[(0, 0), (1, 0), (2, 1), (2, 2)]);
        assert_eq!(p.segment_cost(0), ORTHOGONAL_COST);
        assert_eq!(p.segment_cost(1), DIAGONAL_COST);
        assert_eq!(p.segment_cost(2), ORTHOGONAL_COST);
        assert!((p.total_cost() - 3.41).abs() < 1e-5);
    }

    #[test]
    fn test_travel_full_length_reaches_end() {
        let p = path(&[(3, 3), (4, 4), (5, 4), (6, 5), (6, 6)]);
        let mut cursor = PathCursor::default();
        let mut budget = p.total_cost();
        while !p.at_end(&cursor) {
            budget = p.travel(budget, &mut cursor);
        }
        assert_eq!(cursor.step, p.len() - 1);
        assert_eq!(cursor.fraction, 0.0);
        assert!(budget.abs() < 1e-4);
    }

    #[test]
    fn test_travel_in_small_increments_reaches_end() {
        let p = path(&[(0, 0), (1, 1), (2, 2), (3, 2)]);
        let mut cursor = PathCursor::default();
        let total = p.total_cost();
        let slice = total / 37.0;
        for _ in 0..37 {
            let mut budget = slice;
            while budget > 0.0 && !p.at_end(&cursor) {
                budget = p.travel(budget, &mut cursor);
            }
        }
        assert_eq!(cursor.step, p.len() - 1, "cumulative travel should finish the path");
        assert_eq!(cursor.fraction, 0.0);
    }

    #[test]
    fn test_partial_travel_updates_fraction() {
        let p = path(&[(0, 0), (1, 1)]);
        let mut cursor = PathCursor::default();
        let left = p.travel(0.705, &mut cursor);
        assert_eq!(left, 0.0);
        assert_eq!(cursor.step, 0);
        assert!((cursor.fraction - 0.5).abs() < 1e-4);
    }

    #[test]
    fn test_get_pos_interpolates_and_faces() {
        let p = path(&[(2, 2), (3, 2), (3, 3)]);
        let pose = p.get_pos(&PathCursor { step: 0, fraction: 0.5 });
        assert!((pose.x - 2.5).abs() < 1e-6);
        assert!((pose.z - 2.0).abs() < 1e-6);
        assert_eq!(pose.rotation, 90.0);

        let end = p.get_pos(&PathCursor { step: 2, fraction: 0.0 });
        assert_eq!((end.x, end.z), (3.0, 3.0), "end of path clamps to last segment");
        assert_eq!(end.rotation, 0.0);
    }

    #[test]
    fn test_delta_to_rotation_compass() {
        let expected = [
            ((0, 1), 0.0),
            ((1, 1), 45.0),
            ((1, 0), 90.0),
            ((1, -1), 135.0),
            ((0, -1), 180.0),
            ((-1, -1), 225.0),
            ((-1, 0), 270.0),
            ((-1, 1), 315.0),
        ];
        for ((dx, dy), rot) in expected {
            assert_eq!(delta_to_rotation(dx, dy), rot, "delta ({dx}, {dy})");
        }
    }
}
