//! A* pathfinding over the tile map.
//!
//! Eight-way movement. Diagonal steps cost more and may not cut the corner of a
//! wall. Occupied tiles are passed in by the caller as blockers.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};

use squad_core::constants::{DIAGONAL_COST, ORTHOGONAL_COST};
use squad_core::types::TilePos;

use crate::grid::TileMap;

#[derive(Debug, Clone, PartialEq)]
pub enum PathResult {
    /// Tiles from start to end inclusive, and their walking cost.
    Solved { cost: f32, tiles: Vec<TilePos> },
    NoSolution,
    StartEndSame,
}

impl PathResult {
    pub fn tiles(&self) -> Option<&[TilePos]> {
        match self {
            PathResult::Solved { tiles, .. } => Some(tiles),
            _ => None,
        }
    }
}

/// Node in the A* open set
#[derive(Debug, Clone)]
struct PathNode {
    pos: TilePos,
    f_cost: f32,
}

impl PartialEq for PathNode {
    fn eq(&self, other: &Self) -> bool {
        self.pos == other.pos
    }
}

impl Eq for PathNode {}

impl Ord for PathNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse order for min-heap; position breaks ties so results are reproducible.
        other
            .f_cost
            .partial_cmp(&self.f_cost)
            .unwrap_or(Ordering::Equal)
            .then_with(|| other.pos.cmp(&self.pos))
    }
}

impl PartialOrd for PathNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

const NEIGHBORS: [(i32, i32); 8] = [
    (0, -1),
    (1, 0),
    (0, 1),
    (-1, 0),
    (1, -1),
    (1, 1),
    (-1, 1),
    (-1, -1),
];

/// Octile distance, admissible for the step costs used here.
fn heuristic(a: TilePos, b: TilePos) -> f32 {
    let dx = (a.x - b.x).abs();
    let dy = (a.y - b.y).abs();
    let diag = dx.min(dy) as f32;
    let straight = (dx.max(dy) - dx.min(dy)) as f32;
    diag * DIAGONAL_COST + straight * ORTHOGONAL_COST
}

/// Whether a unit may step from `from` to the adjacent `to`.
pub fn can_step(map: &TileMap, from: TilePos, to: TilePos, blocked: &HashSet<TilePos>) -> bool {
    if !map.is_passable(to) || blocked.contains(&to) {
        return false;
    }
    let dx = to.x - from.x;
    let dy = to.y - from.y;
    if dx != 0 && dy != 0 {
        return map.is_passable(from.offset(dx, 0)) && map.is_passable(from.offset(0, dy));
    }
    true
}

/// Find the cheapest walk from `start` to `end` avoiding `blocked` tiles.
pub fn solve_path(
    map: &TileMap,
    start: TilePos,
    end: TilePos,
    blocked: &HashSet<TilePos>,
) -> PathResult {
    if start == end {
        return PathResult::StartEndSame;
    }
    if !map.in_bounds(start) || !map.is_passable(end) || blocked.contains(&end) {
        return PathResult::NoSolution;
    }

    let mut open_set = BinaryHeap::new();
    let mut came_from: HashMap<TilePos, TilePos> = HashMap::new();
    let mut g_scores: HashMap<TilePos, f32> = HashMap::new();
    let mut closed: HashSet<TilePos> = HashSet::new();

    g_scores.insert(start, 0.0);
    open_set.push(PathNode {
        pos: start,
        f_cost: heuristic(start, end),
    });

    while let Some(current) = open_set.pop() {
        if current.pos == end {
            let cost = g_scores.get(&end).copied().unwrap_or(0.0);
            return PathResult::Solved {
                cost,
                tiles: reconstruct_path(&came_from, end),
            };
        }
        if !closed.insert(current.pos) {
            continue;
        }

        let current_g = *g_scores.get(&current.pos).unwrap_or(&f32::INFINITY);

        for (dx, dy) in NEIGHBORS {
            let neighbor = current.pos.offset(dx, dy);
            if closed.contains(&neighbor) || !can_step(map, current.pos, neighbor, blocked) {
                continue;
            }
            let step = if dx != 0 && dy != 0 {
                DIAGONAL_COST
            } else {
                ORTHOGONAL_COST
            };
            let tentative_g = current_g + step;
            let neighbor_g = *g_scores.get(&neighbor).unwrap_or(&f32::INFINITY);

            if tentative_g < neighbor_g {
                came_from.insert(neighbor, current.pos);
                g_scores.insert(neighbor, tentative_g);
                open_set.push(PathNode {
                    pos: neighbor,
                    f_cost: tentative_g + heuristic(neighbor, end),
                });
            }
        }
    }

    PathResult::NoSolution
}

fn reconstruct_path(came_from: &HashMap<TilePos, TilePos>, mut current: TilePos) -> Vec<TilePos> {
    let mut path = vec![current];
    while let Some(&prev) = came_from.get(&current) {
        path.push(prev);
        current = prev;
    }
    path.reverse();
    path
}

/// Walking cost of a tile sequence.
pub fn path_cost(tiles: &[TilePos]) -> f32 {
    tiles
        .windows(2)
        .map(|w| {
            if w[0].x != w[1].x && w[0].y != w[1].y {
                DIAGONAL_COST
            } else {
                ORTHOGONAL_COST
            }
        })
        .sum()
}

/// Longest prefix of `tiles` whose walking cost fits in `budget`.
pub fn trim_to_cost(tiles: &[TilePos], budget: f32) -> &[TilePos] {
    let mut cost = 0.0;
    let mut end = tiles.len().min(1);
    for (i, w) in tiles.windows(2).enumerate() {
        cost += path_cost(w);
        if cost > budget + 1e-4 {
            break;
        }
        end = i + 2;
    }
    &tiles[..end]
}
