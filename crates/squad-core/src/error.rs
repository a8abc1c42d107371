//! Errors raised while building core battle records.

use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Error)]
pub enum CoreError {
    #[error("motion path needs at least 2 tiles, got {len}")]
    PathTooShort { len: usize },

    #[error("motion path of {len} tiles exceeds the {max} tile limit")]
    PathTooLong { len: usize, max: usize },

    #[error("path tile ({x}, {y}) is outside the encodable range")]
    PathTileOutOfRange { x: i32, y: i32 },

    #[error("path tiles {index} and {next} are not adjacent")]
    PathNotContiguous { index: usize, next: usize },

    #[error("unknown weapon '{0}'")]
    UnknownWeapon(String),

    #[error("item catalog is malformed: {0}")]
    Catalog(String),
}
