//! The "who sees whom" relation over unit slots.

use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::constants::MAX_UNITS;
use crate::enums::Team;

/// Boolean matrix of (viewer, target) sightings, one bit row per viewer slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisMatrix {
    rows: Vec<u64>,
}

impl Default for VisMatrix {
    fn default() -> Self {
        Self::new()
    }
}

impl VisMatrix {
    pub fn new() -> Self {
        Self {
            rows: vec![0; MAX_UNITS],
        }
    }

    pub fn get(&self, viewer: usize, target: usize) -> bool {
        debug_assert!(viewer < MAX_UNITS && target < MAX_UNITS);
        self.rows
            .get(viewer)
            .is_some_and(|row| row & (1u64 << target) != 0)
    }

    pub fn set(&mut self, viewer: usize, target: usize, value: bool) {
        debug_assert!(viewer < MAX_UNITS && target < MAX_UNITS);
        if let Some(row) = self.rows.get_mut(viewer) {
            if value {
                *row |= 1u64 << target;
            } else {
                *row &= !(1u64 << target);
            }
        }
    }

    /// Whether any viewer slot in `viewers` sees `target`.
    pub fn any_viewer_in(&self, viewers: Range<usize>, target: usize) -> bool {
        viewers.into_iter().any(|v| self.get(v, target))
    }

    /// Whether any member of `team` sees `target`.
    pub fn team_sees(&self, team: Team, target: usize) -> bool {
        self.any_viewer_in(team.unit_range(), target)
    }

    /// Raw bit row of `viewer`: bit `t` set when `viewer` sees `t`.
    pub fn row(&self, viewer: usize) -> u64 {
        self.rows.get(viewer).copied().unwrap_or(0)
    }

    /// Target slots seen by `viewer`.
    pub fn seen_by(&self, viewer: usize) -> impl Iterator<Item = usize> + '_ {
        let row = self.row(viewer);
        (0..MAX_UNITS).filter(move |&t| row & (1u64 << t) != 0)
    }

    pub fn count(&self) -> u32 {
        self.rows.iter().map(|r| r.count_ones()).sum()
    }
}
