//! Battle constants and tuning parameters.

/// Default simulation tick length in milliseconds (~30 Hz).
pub const DEFAULT_TICK_MS: u32 = 33;

// --- Map ---

/// Maximum map edge length in tiles.
pub const MAP_SIZE: i32 = 64;

/// Height of the world bounds box used for missed shots.
pub const WORLD_HEIGHT: f32 = 8.0;

/// Height of a wall or closed door hitbox.
pub const WALL_HEIGHT: f32 = 2.5;

/// Starting hit points of a stone wall.
pub const STONE_WALL_HP: i32 = 60;

/// Starting hit points of a wooden wall.
pub const WOOD_WALL_HP: i32 = 20;

/// Starting hit points of a fuel tank.
pub const FUEL_TANK_HP: i32 = 10;

/// Damage a burning tile deals to a wooden wall each sub-turn.
pub const FIRE_DAMAGE_PER_SUBTURN: i32 = 8;

/// Turns a freshly started fire burns.
pub const FIRE_TURNS: u8 = 4;

// --- Units ---

/// Total unit slots in a battle.
pub const MAX_UNITS: usize = 40;

pub const TERRAN_UNITS_START: usize = 0;
pub const TERRAN_UNITS_END: usize = 8;
pub const CIV_UNITS_START: usize = 8;
pub const CIV_UNITS_END: usize = 24;
pub const ALIEN_UNITS_START: usize = 24;
pub const ALIEN_UNITS_END: usize = 40;

/// Upper bound on time units; also the longest walkable path.
pub const MAX_TU: usize = 40;

/// Model height of a standing unit.
pub const UNIT_HEIGHT: f32 = 1.8;

/// Model width (and depth) of a unit hitbox.
pub const UNIT_WIDTH: f32 = 0.6;

/// Height of the aim point on a target unit.
pub const UNIT_TARGET_HEIGHT: f32 = 1.1;

/// Height of the weapon muzzle above the unit's tile.
pub const TRIGGER_HEIGHT: f32 = 1.3;

/// Forward offset of the muzzle from the unit centre.
pub const TRIGGER_FORWARD: f32 = 0.35;

/// Half extent of a carried weapon's hitbox.
pub const WEAPON_HALF_SIZE: f32 = 0.12;

/// Inventory slots (weapon plus clips).
pub const INVENTORY_SLOTS: usize = 6;

// --- Movement ---

/// Tiles per second a walking unit covers.
pub const MOVE_SPEED: f32 = 4.5;

/// Speed multiplier when neither tile of a step is visible to the player.
pub const UNSEEN_MOVE_MULTIPLIER: f32 = 10.0;

/// Degrees per second a rotating unit turns.
pub const ROTATION_SPEED: f32 = 400.0;

/// Cost of an axis-aligned step (distance and TU).
pub const ORTHOGONAL_COST: f32 = 1.0;

/// Cost of a diagonal step (distance and TU).
pub const DIAGONAL_COST: f32 = 1.41;

// --- Combat ---

/// Radius in tiles of an explosion.
pub const EXPLOSION_RADIUS: i32 = 2;

/// Maximum blast centres resolved by one explosive hit, chained blasts included.
pub const MAX_EXPLOSIONS: usize = 8;

/// Explosion centre is pulled back this far along the shot so wall hits land on the near tile.
pub const EXPLOSION_BACKOFF: f32 = 0.2;

/// Reaction fire with an explosive weapon is skipped inside this many tiles.
pub const EXPLOSIVE_RANGE: i32 = 3;

/// Minimum turns of smoke left by a blast.
pub const SMOKE_MIN_TURNS: u8 = 4;

/// Random extra turns of blast smoke (exclusive upper bound).
pub const SMOKE_RANDOM_TURNS: u8 = 4;

/// Negative hit points down to which a unit is only incapacitated.
pub const INCAPACITATED_MARGIN: i32 = 10;

// --- Visibility ---

/// Sight radius in tiles during the day.
pub const SIGHT_RANGE_DAY: i32 = 14;

/// Sight radius in tiles at night.
pub const SIGHT_RANGE_NIGHT: i32 = 8;

// --- AI ---

/// Turns an unseen enemy's last known position is remembered.
pub const MAX_TURNS_LKP: u32 = 100;

/// Think invocations allowed per unit per phase before its turn is forced over.
pub const MAX_THINK_STEPS: u32 = 12;

/// Radius in tiles of a wander move.
pub const WANDER_RADIUS: i32 = 6;

/// Distance at which a travelling unit considers its destination reached.
pub const TRAVEL_ARRIVE_RADIUS: i32 = 2;

// --- Turn order ---

/// Initial outset of a sub-turn clump around its first unit.
pub const CLUMP_FIRST_OUTSET: i32 = 2;

/// Outset added around each unit absorbed into a clump.
pub const CLUMP_ADD_OUTSET: i32 = 2;

// --- Camera ---

/// Camera scroll speed in world units per second.
pub const CAMERA_SPEED: f32 = 18.0;

/// Half extent of the on-screen view inset, in tiles.
pub const CAMERA_VIEW_HALF: f32 = 8.0;

/// Half extent of the inset used when a scroll asks to centre its target.
pub const CAMERA_CENTER_HALF: f32 = 1.0;
