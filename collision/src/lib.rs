pub mod bitmask_flags;
pub mod cell;
pub mod collision;
pub mod constants;
pub mod error;
pub mod fixpoint;
pub mod level;
pub mod movement;
pub mod pid;
pub mod trig;

pub use bitmask_flags::{DecorationFlag, FaceFlag};
pub use cell::{GridCell, cell_min_corner, cells_in_rect, grid_cell_for};
pub use collision::{
    Body, Collision, CollisionSettings, CollisionState, Hit, PartyBody, Sphere, SpriteObject,
    Vec3,
};
pub use constants::{ANGLE_UNITS_PER_TURN, CELL_SIZE, GRID_SIDE, WORLD_OFFSET};
pub use error::{LevelError, SettingsError};
pub use fixpoint::Fixpoint;
pub use level::{
    BspModel, Decoration, Face, IndoorLevel, MAX_MODEL_FACES, OutdoorLevel, Sector,
};
pub use movement::{
    IndoorScene, MoveOutcome, Mover, OutdoorScene, Scene, resolve_indoor_movement,
    resolve_outdoor_movement,
};
pub use pid::{ActorId, DecorationId, FaceId, HitTarget, ModelId, SectorId, SpriteObjectId};
