/*!
Collision root module.

This module re-exports the submodules that decide how far a two-sphere actor can move
within a tick. Geometry tests are thin and stateless; everything about one movement
resolution lives in the [`CollisionState`] handed to each collider. The code is split for
clarity:

- types:        shared data types (Body, Sphere, Plane, Hit, Collision, etc.)
- settings:     tolerances and driver tunables
- state:        the per-resolution collision context
- broad:        broad-phase helpers (swept bounds, cylinder and face bounds)
- narrow_phase: sphere/ray vs polygon, cylinder and sphere sweeps
- indoor:       sector faces, sector decorations, portal traversal
- outdoor:      grid-culled models and decorations
- entities:     other actors, sprite objects, the party
*/

pub mod broad;
pub mod entities;
pub mod indoor;
pub mod narrow_phase;
pub mod outdoor;
pub mod settings;
pub mod state;
pub mod types;

#[cfg(test)]
pub(crate) mod test_util;

// Re-export commonly used types and functions.
pub use entities::{
    PartyBody, SpriteObject, collide_with_actor, collide_with_party, collide_with_sprite_objects,
};
pub use indoor::{
    collide_indoor_with_decorations, collide_indoor_with_geometry, collide_indoor_with_portals,
};
pub use outdoor::{collide_outdoor_with_decorations, collide_outdoor_with_models};
pub use settings::CollisionSettings;
pub use state::CollisionState;
pub use types::{
    Aabb, Body, Collision, Cylinder, Hit, PORTAL_SENTINEL_DISTANCE, Plane, Point3, Sphere, Vec2,
    Vec3,
};
