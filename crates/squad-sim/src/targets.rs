//! Target event log: sightings produced by diffing the visibility matrix at each
//! decision point.

use std::collections::HashSet;

use squad_core::enums::Team;
use squad_core::events::TargetEvent;
use squad_core::targets::VisMatrix;
use squad_core::unit::Unit;

/// Events of the current decision point plus the matrix they were diffed against.
#[derive(Debug, Clone, Default)]
pub struct TargetLog {
    seen: VisMatrix,
    events: Vec<TargetEvent>,
}

impl TargetLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[TargetEvent] {
        &self.events
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Drop every event matching `pred`, returning how many were removed.
    pub fn remove_where(&mut self, mut pred: impl FnMut(&TargetEvent) -> bool) -> usize {
        let before = self.events.len();
        self.events.retain(|e| !pred(e));
        before - self.events.len()
    }

    pub fn remove_at(&mut self, index: usize) -> Option<TargetEvent> {
        (index < self.events.len()).then(|| self.events.remove(index))
    }

    /// Events never carry over to the next decision point.
    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// Forget prior sightings, so the next diff reports everything as new.
    pub fn reset_seen(&mut self) {
        self.seen = VisMatrix::new();
    }

    /// Adopt `current` as the baseline without producing events.
    pub fn sync(&mut self, current: &VisMatrix) {
        self.seen = current.clone();
    }
}

/// Diff `current` against the last baseline and append sighting events.
///
/// Each newly true (viewer, target) pair on different teams yields a unit event.
/// When no member of the viewer's team could see the target before, a team event
/// follows, once per team and target.
pub fn calc_team_targets(log: &mut TargetLog, current: &VisMatrix, units: &[Unit]) {
    let mut team_seen: HashSet<(Team, usize)> = HashSet::new();

    for viewer in units.iter().filter(|u| u.in_use) {
        for target in current.seen_by(viewer.id) {
            let Some(target_unit) = units.get(target) else {
                continue;
            };
            if target_unit.team == viewer.team || log.seen.get(viewer.id, target) {
                continue;
            }
            log.events.push(TargetEvent::Unit {
                viewer: viewer.id,
                target,
            });
            if !log.seen.team_sees(viewer.team, target) && team_seen.insert((viewer.team, target)) {
                log.events.push(TargetEvent::Team {
                    team: viewer.team,
                    target,
                });
            }
        }
    }
    log.seen = current.clone();
}
