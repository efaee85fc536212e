/*!
Core collision types and math aliases shared by the collision submodules.

This module contains no algorithms. It defines the data exchanged between:
- the collision context (`state`)
- broad phase (swept bounds, candidate culling)
- narrow phase (sphere/point/cylinder sweeps)
- the colliders (`indoor`, `outdoor`, `entities`)
- the movement driver

World units follow the level data; z is up.
*/

use nalgebra as na;
use rapier3d::parry::bounding_volume;

use crate::pid::{FaceId, HitTarget, SectorId};

/// Common math aliases for clarity and consistency.
pub type Vec3 = na::Vector3<f32>;
pub type Vec2 = na::Vector2<f32>;
pub type Point3 = na::Point3<f32>;
pub type Aabb = bounding_volume::Aabb;

/// Distance reported by the legacy numeric portal convention.
///
/// The tagged [`Collision::SectorChanged`] replaces it; see [`Collision::legacy_distance`].
pub const PORTAL_SENTINEL_DISTANCE: f32 = 16_777_215.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sphere {
    pub center: Vec3,
    pub radius: f32,
}

impl Sphere {
    #[inline]
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius }
    }
}

/// Collision shape of a moving actor: a "feet" sphere and an optional "head" sphere stacked
/// above it.
///
/// When `head` is `None` only the feet sphere participates (crouching, low-clearance checks).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Body {
    pub feet: Sphere,
    pub head: Option<Sphere>,
}

impl Body {
    pub fn new(feet: Sphere, head: Option<Sphere>) -> Self {
        Self { feet, head }
    }

    /// Body for an upright actor standing at `position` (bottom center) with the given
    /// collision `radius` and `height`.
    ///
    /// Both spheres use `radius`; the feet sphere sits one unit above the ground, the head
    /// sphere one unit below the top, never lower than the feet.
    pub fn upright(position: Vec3, radius: f32, height: f32) -> Self {
        let feet = position + Vec3::new(0.0, 0.0, radius + 1.0);
        let mut head = position + Vec3::new(0.0, 0.0, height - radius - 1.0);
        head.z = head.z.max(feet.z);
        Self {
            feet: Sphere::new(feet, radius),
            head: Some(Sphere::new(head, radius)),
        }
    }

    /// Body with only the feet sphere.
    pub fn feet_only(feet: Sphere) -> Self {
        Self { feet, head: None }
    }

    #[inline]
    pub fn check_hi(&self) -> bool {
        self.head.is_some()
    }

    /// Lowest point of the body.
    #[inline]
    pub fn bottom(&self) -> f32 {
        self.feet.center.z - self.feet.radius
    }

    /// Highest point of the body.
    #[inline]
    pub fn top(&self) -> f32 {
        match self.head {
            Some(head) => head.center.z + head.radius,
            None => self.feet.center.z + self.feet.radius,
        }
    }

    /// Largest sphere radius of the body.
    #[inline]
    pub fn radius(&self) -> f32 {
        self.head
            .map_or(self.feet.radius, |head| head.radius.max(self.feet.radius))
    }

    /// Move both spheres by `delta`.
    #[inline]
    pub fn translate(&mut self, delta: Vec3) {
        self.feet.center += delta;
        if let Some(head) = self.head.as_mut() {
            head.center += delta;
        }
    }

    /// Panics if the body violates its shape invariants.
    pub fn assert_valid(&self) {
        assert!(
            self.feet.radius >= 0.0,
            "feet radius must be non-negative, got {}",
            self.feet.radius
        );
        if let Some(head) = self.head {
            assert!(
                head.radius >= 0.0,
                "head radius must be non-negative, got {}",
                head.radius
            );
            assert!(
                head.center.z >= self.feet.center.z,
                "head sphere ({}) must not be below the feet sphere ({})",
                head.center.z,
                self.feet.center.z
            );
        }
    }
}

/// Upright cylinder obstacle: decorations, actors and the party.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Cylinder {
    /// Bottom center.
    pub base: Vec3,
    pub radius: f32,
    pub height: f32,
}

impl Cylinder {
    #[inline]
    pub fn new(base: Vec3, radius: f32, height: f32) -> Self {
        Self {
            base,
            radius,
            height,
        }
    }
}

/// Infinite plane `normal ⋅ x = dist`, with a unit `normal`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Plane {
    pub normal: Vec3,
    pub dist: f32,
}

impl Plane {
    /// Plane through `point` with the given unit `normal`.
    #[inline]
    pub fn from_point_normal(point: Vec3, normal: Vec3) -> Self {
        Self {
            normal,
            dist: normal.dot(&point),
        }
    }

    /// Signed distance of `point` to the plane; positive on the side the normal points to.
    #[inline]
    pub fn signed_distance(&self, point: &Vec3) -> f32 {
        self.normal.dot(point) - self.dist
    }
}

/// A blocking contact found by a collider.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hit {
    /// Distance along the movement direction that can be travelled before contact.
    pub distance: f32,
    pub target: HitTarget,
}

/// Result of a collider call.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Collision {
    /// Nothing within reach this iteration.
    Clear,
    /// Blocked after travelling `hit.distance`.
    Blocked(Hit),
    /// The sweep passes through `portal` into `sector`; the actor is now attributed to it and
    /// the new sector's geometry must be tested before any distance is consumed.
    SectorChanged { portal: FaceId, sector: SectorId },
}

impl Collision {
    #[inline]
    pub fn is_clear(&self) -> bool {
        matches!(self, Collision::Clear)
    }

    pub fn hit(&self) -> Option<Hit> {
        match *self {
            Collision::Blocked(hit) => Some(hit),
            _ => None,
        }
    }

    /// Numeric distance in the legacy convention, where a portal crossing is reported as
    /// [`PORTAL_SENTINEL_DISTANCE`] and a clear path as `move_distance`.
    pub fn legacy_distance(&self, move_distance: f32) -> f32 {
        match *self {
            Collision::Clear => move_distance,
            Collision::Blocked(hit) => hit.distance,
            Collision::SectorChanged { .. } => PORTAL_SENTINEL_DISTANCE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn upright_body_stacks_spheres() {
        let body = Body::upright(Vec3::new(10.0, 20.0, 0.0), 30.0, 150.0);
        assert_relative_eq!(body.feet.center, Vec3::new(10.0, 20.0, 31.0));
        let head = body.head.unwrap();
        assert_relative_eq!(head.center, Vec3::new(10.0, 20.0, 119.0));
        assert_relative_eq!(body.bottom(), 1.0);
        assert_relative_eq!(body.top(), 149.0);
        body.assert_valid();
    }

    #[test]
    fn short_body_keeps_head_above_feet() {
        let body = Body::upright(Vec3::zeros(), 40.0, 50.0);
        assert_relative_eq!(body.head.unwrap().center.z, body.feet.center.z);
        body.assert_valid();
    }

    #[test]
    #[should_panic(expected = "must not be below")]
    fn head_below_feet_fails_loudly() {
        Body::new(
            Sphere::new(Vec3::new(0.0, 0.0, 50.0), 10.0),
            Some(Sphere::new(Vec3::new(0.0, 0.0, 10.0), 10.0)),
        )
        .assert_valid();
    }

    #[test]
    #[should_panic(expected = "non-negative")]
    fn negative_radius_fails_loudly() {
        Body::feet_only(Sphere::new(Vec3::zeros(), -1.0)).assert_valid();
    }

    #[test]
    fn plane_signed_distance() {
        let plane = Plane::from_point_normal(Vec3::new(100.0, 0.0, 0.0), Vec3::new(-1.0, 0.0, 0.0));
        assert_relative_eq!(plane.signed_distance(&Vec3::zeros()), 100.0);
        assert_relative_eq!(plane.signed_distance(&Vec3::new(150.0, 5.0, 5.0)), -50.0);
    }

    #[test]
    fn legacy_distance_uses_sentinel_for_portals() {
        let portal = Collision::SectorChanged {
            portal: FaceId(1),
            sector: SectorId(2),
        };
        assert_eq!(portal.legacy_distance(10.0), PORTAL_SENTINEL_DISTANCE);
        assert_eq!(Collision::Clear.legacy_distance(10.0), 10.0);
    }
}
