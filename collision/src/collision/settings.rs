/*!
Collision settings and tolerances.

These constants centralize the parameters used by the colliders and the movement driver.
The tunable ones are also grouped in [`CollisionSettings`], which can be loaded from TOML;
the constants are its defaults.

Notes
- Distances are in world units, time in fixpoint seconds.
- Favor practical world-space tolerances over machine epsilon for robust behavior.
*/

use serde::Deserialize;

use crate::error::SettingsError;

/// Maximum number of collide-and-slide iterations per movement resolution.
pub const DEFAULT_MAX_ITERATIONS: u32 = 100;

/// Maximum number of portal transitions followed within one iteration.
pub const DEFAULT_MAX_SECTOR_TRANSITIONS: u32 = 10;

/// Velocity multiplier applied after each slide response.
pub const DEFAULT_SLIDE_DAMPING: f32 = 0.89;

/// Minimum push away from a hit face, as a fraction of the mover's speed.
/// Keeps the actor from grinding along a wall at a grazing angle.
pub const DEFAULT_SLIDE_MIN_PUSH: f32 = 1.0 / 8.0;

/// Extra distance beyond `move_distance` at which a portal counts as touched, pulling the
/// neighbor sector's faces into the indoor geometry test.
pub const PORTAL_TOUCH_MARGIN: f32 = 16.0;

/// Practical small value for dot-product guards (parallel movement, zero normals).
pub const COLLISION_EPS: f32 = 1.0e-6;

/// Hits closer together than this count as simultaneous and go through the tie-break.
pub const TIE_TOLERANCE: f32 = 1.0e-3;

/// Remaining distances at or below this are treated as exhausted.
pub const MIN_MOVE_DISTANCE: f32 = 1.0e-3;

/// Tunables of the movement driver.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CollisionSettings {
    pub max_iterations: u32,
    pub max_sector_transitions: u32,
    pub slide_damping: f32,
    pub slide_min_push: f32,
}

impl Default for CollisionSettings {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            max_sector_transitions: DEFAULT_MAX_SECTOR_TRANSITIONS,
            slide_damping: DEFAULT_SLIDE_DAMPING,
            slide_min_push: DEFAULT_SLIDE_MIN_PUSH,
        }
    }
}

impl CollisionSettings {
    /// Parse settings from TOML. Missing keys keep their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, SettingsError> {
        let settings: Self = toml::from_str(text)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.max_iterations == 0 {
            return Err(SettingsError::Invalid {
                field: "max_iterations",
                reason: "must be at least 1",
            });
        }
        if !(0.0..=1.0).contains(&self.slide_damping) {
            return Err(SettingsError::Invalid {
                field: "slide_damping",
                reason: "must be within [0, 1]",
            });
        }
        if !(self.slide_min_push >= 0.0) {
            return Err(SettingsError::Invalid {
                field: "slide_min_push",
                reason: "must be non-negative",
            });
        }
        Ok(())
    }
}
