//! ledgewise: tile-grid platformer movement (contact queries, swept axis
//! resolution, forgiving player motion)

pub mod types;
pub mod api;
pub mod error;
pub mod world;
pub mod narrowphase;
pub mod sweep;
pub mod player;
pub mod levels;

pub use crate::types::*;
pub use crate::api::*;
pub use crate::error::{ConfigError, GridError};
pub use crate::world::{FlatFloor, TileGrid};
pub use crate::narrowphase::Narrowphase;
pub use crate::sweep::SweptResolver;
pub use crate::player::Player;
