//! The action stack: what is happening right now.
//!
//! Actions are steppable. Only the top of the stack advances each tick; an action
//! pushed on top of another suspends it until the new one pops.

use glam::Vec3;

use squad_core::enums::{ActionKind, WeaponMode};
use squad_core::motion_path::{MotionPath, PathCursor};
use squad_core::types::TilePos;
use squad_core::weapon::DamageDesc;

/// What a shot struck.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Struck {
    Unit(usize),
    /// The weapon carried by this unit.
    Weapon(usize),
    Wall(TilePos),
    /// Open ground or the edge of the world.
    Ground,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Move {
        unit: usize,
        path: MotionPath,
        cursor: PathCursor,
    },
    Rotate {
        unit: usize,
        /// Target facing in degrees.
        rotation: f32,
    },
    Shoot {
        unit: usize,
        target: Vec3,
        mode: WeaponMode,
        /// Predicted chance to hit, for the accuracy ledger.
        chance: f32,
    },
    Hit {
        shooter: usize,
        struck: Struck,
        point: Vec3,
        normal: Vec3,
        damage: DamageDesc,
        explosive: bool,
    },
    Delay {
        remaining_ms: u32,
    },
    Camera {
        from: Vec3,
        to: Vec3,
        duration_ms: u32,
        elapsed_ms: u32,
    },
    CameraBounds {
        target: Vec3,
        /// Scroll until the target is centred, not merely on screen.
        center: bool,
    },
}

impl Action {
    pub fn kind(&self) -> ActionKind {
        match self {
            Action::Move { .. } => ActionKind::Move,
            Action::Rotate { .. } => ActionKind::Rotate,
            Action::Shoot { .. } => ActionKind::Shoot,
            Action::Hit { .. } => ActionKind::Hit,
            Action::Delay { .. } => ActionKind::Delay,
            Action::Camera { .. } => ActionKind::Camera,
            Action::CameraBounds { .. } => ActionKind::CameraBounds,
        }
    }

    /// The unit performing the action, for unit-owned actions.
    pub fn unit(&self) -> Option<usize> {
        match *self {
            Action::Move { unit, .. } | Action::Rotate { unit, .. } | Action::Shoot { unit, .. } => Some(unit),
            Action::Hit { .. } | Action::Delay { .. } | Action::Camera { .. } | Action::CameraBounds { .. } => None,
        }
    }

    pub fn new_move(unit: usize, path: MotionPath) -> Self {
        Action::Move {
            unit,
            path,
            cursor: PathCursor::default(),
        }
    }
}

/// LIFO of pending actions. The top is the only one that advances.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActionStack {
    actions: Vec<Action>,
}

impl ActionStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, action: Action) {
        self.actions.push(action);
    }

    pub fn pop(&mut self) -> Option<Action> {
        self.actions.pop()
    }

    pub fn top(&self) -> Option<&Action> {
        self.actions.last()
    }

    pub fn top_mut(&mut self) -> Option<&mut Action> {
        self.actions.last_mut()
    }

    /// Discard everything in one step.
    pub fn clear(&mut self) {
        self.actions.clear();
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Kinds from bottom to top.
    pub fn kinds(&self) -> Vec<ActionKind> {
        self.actions.iter().map(Action::kind).collect()
    }

    /// The top action if it is a Move, with its unit and cursor.
    pub fn top_move(&self) -> Option<(usize, &PathCursor)> {
        match self.top() {
            Some(Action::Move { unit, cursor, .. }) => Some((*unit, cursor)),
            _ => None,
        }
    }
}
