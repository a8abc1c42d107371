//! Bit flag sets shared between the engine and the AI.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Standing orders that shape what an AI unit does once it has nothing to shoot.
    ///
    /// The empty set is "normal": hunt the last known enemy position.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct AiFlags: u8 {
        const WANDER = 1 << 0;
        const GUARD  = 1 << 1;
        const TRAVEL = 1 << 2;
    }
}

bitflags! {
    /// What one tick of action processing accomplished.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct ActionResult: u8 {
        /// A unit crossed a tile or world geometry changed: run a decision point.
        const STEP_COMPLETE         = 1 << 0;
        /// A unit-owned action finished.
        const UNIT_ACTION_COMPLETE  = 1 << 1;
        /// A camera or delay action finished.
        const OTHER_ACTION_COMPLETE = 1 << 2;
    }
}
