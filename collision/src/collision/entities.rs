/*!
Colliders for dynamic entities: other actors, sprite objects and the party.

Actors and the party are collided with as upright cylinders, the way decorations are. Sprite
objects are small spheres, so both spheres of the moving body are swept against them.
*/

use crate::pid::{ActorId, HitTarget, SpriteObjectId};

use super::{
    broad::{aabb_intersects, sphere_aabb},
    narrow_phase::{sweep_feet_cylinder, sweep_sphere_sphere},
    state::CollisionState,
    types::{Body, Collision, Cylinder, Sphere, Vec3},
};

/// A transient world object (projectile, dropped item, ...).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpriteObject {
    pub center: Vec3,
    pub radius: f32,
    /// Non-blocking objects are passed through.
    pub blocking: bool,
}

/// The party's collision volume.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PartyBody {
    /// Bottom center.
    pub position: Vec3,
    pub radius: f32,
    pub height: f32,
}

impl PartyBody {
    #[inline]
    pub fn cylinder(&self) -> Cylinder {
        Cylinder::new(self.position, self.radius, self.height)
    }
}

/// Cylinder enclosing an actor's body. A positive `override_radius` replaces the body's own
/// radius.
pub fn actor_cylinder(body: &Body, override_radius: f32) -> Cylinder {
    let radius = if override_radius > 0.0 {
        override_radius
    } else {
        body.radius()
    };
    let bottom = body.bottom();
    let base = Vec3::new(body.feet.center.x, body.feet.center.y, bottom);
    Cylinder::new(base, radius, body.top() - bottom)
}

/// Sweep the feet against another actor.
///
/// `override_radius` of zero uses the target's own radius; a positive value stands in for it,
/// e.g. to ask whether the mover would fit past a wider actor.
pub fn collide_with_actor(
    state: &mut CollisionState,
    actors: &[Body],
    actor: ActorId,
    override_radius: f32,
) -> Collision {
    let cylinder = actor_cylinder(&actors[actor.index()], override_radius);
    match sweep_feet_cylinder(&state.body.feet, state.direction, &state.bbox, &cylinder, false) {
        Some(distance) => {
            let mut nearest = None;
            state.consider(&mut nearest, distance, HitTarget::Actor(actor), None);
            nearest.map_or(Collision::Clear, Collision::Blocked)
        }
        None => Collision::Clear,
    }
}

/// Sweep both spheres of the body against every blocking sprite object except `exclude`.
pub fn collide_with_sprite_objects(
    state: &mut CollisionState,
    objects: &[SpriteObject],
    exclude: Option<SpriteObjectId>,
) -> Collision {
    let mut nearest = None;

    for (i, object) in objects.iter().enumerate() {
        let id = SpriteObjectId::from(i);
        if !object.blocking || exclude == Some(id) {
            continue;
        }
        if !aabb_intersects(&state.bbox, &sphere_aabb(object.center, object.radius)) {
            continue;
        }

        let target = Sphere::new(object.center, object.radius);
        let feet = sweep_sphere_sphere(&state.body.feet, state.direction, state.move_distance, &target);
        let head = state.body.head.and_then(|head| {
            sweep_sphere_sphere(&head, state.direction, state.move_distance, &target)
        });
        let distance = match (feet, head) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };
        if let Some(distance) = distance {
            state.consider(&mut nearest, distance, HitTarget::SpriteObject(id), None);
        }
    }

    nearest.map_or(Collision::Clear, Collision::Blocked)
}

/// Sweep the feet against the party.
///
/// With `jagged_top` unset, a mover passing entirely above the party (beyond one feet radius
/// over its top) misses it. With `jagged_top` set only the bounds and the horizontal sweep
/// matter.
pub fn collide_with_party(
    state: &mut CollisionState,
    party: &PartyBody,
    jagged_top: bool,
) -> Collision {
    let cylinder = party.cylinder();
    match sweep_feet_cylinder(&state.body.feet, state.direction, &state.bbox, &cylinder, jagged_top) {
        Some(distance) => {
            let mut nearest = None;
            state.consider(&mut nearest, distance, HitTarget::Party, None);
            nearest.map_or(Collision::Clear, Collision::Blocked)
        }
        None => Collision::Clear,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{fixpoint::Fixpoint, pid::SectorId};
    use approx::assert_relative_eq;

    fn moving(body: Body, velocity: Vec3) -> CollisionState {
        let mut state = CollisionState::new(body, SectorId(0));
        state.set_velocity(velocity);
        assert!(!state.prepare_and_check_if_stationary(Fixpoint::ONE));
        state
    }

    #[test]
    fn actor_cylinder_spans_the_body() {
        let body = Body::upright(Vec3::new(5.0, 6.0, 10.0), 25.0, 120.0);
        let c = actor_cylinder(&body, 0.0);
        assert_relative_eq!(c.base, Vec3::new(5.0, 6.0, 11.0));
        assert_relative_eq!(c.radius, 25.0);
        assert_relative_eq!(c.height, 118.0);
        assert_relative_eq!(actor_cylinder(&body, 60.0).radius, 60.0);
    }

    #[test]
    fn override_radius_widens_the_target() {
        // Lateral offset 25: more than the stored radius sum (20), less than the overridden (40).
        let actors = [Body::upright(Vec3::new(100.0, 25.0, 0.0), 10.0, 100.0)];
        let mover = Body::upright(Vec3::zeros(), 10.0, 100.0);

        let mut state = moving(mover, Vec3::new(200.0, 0.0, 0.0));
        assert_eq!(collide_with_actor(&mut state, &actors, ActorId(0), 0.0), Collision::Clear);

        let mut state = moving(mover, Vec3::new(200.0, 0.0, 0.0));
        let hit = collide_with_actor(&mut state, &actors, ActorId(0), 30.0)
            .hit()
            .unwrap();
        assert_eq!(hit.target, HitTarget::Actor(ActorId(0)));
        assert_relative_eq!(hit.distance, 100.0 - (1600.0f32 - 625.0).sqrt(), epsilon = 1.0e-3);
        assert_eq!(state.hit, Some(HitTarget::Actor(ActorId(0))));
    }

    #[test]
    fn jagged_top_decides_hits_over_the_party() {
        let party = PartyBody {
            position: Vec3::zeros(),
            radius: 20.0,
            height: 100.0,
        };
        // A flyer diving toward the party, still well above its head at closest approach.
        let flyer = Body::feet_only(Sphere::new(Vec3::new(-100.0, 0.0, 300.0), 10.0));
        let dive = Vec3::new(200.0, 0.0, -200.0);

        let mut state = moving(flyer, dive);
        assert_eq!(collide_with_party(&mut state, &party, false), Collision::Clear);

        let mut state = moving(flyer, dive);
        let hit = collide_with_party(&mut state, &party, true).hit().unwrap();
        assert_eq!(hit.target, HitTarget::Party);
        assert_relative_eq!(hit.distance, 70.0 * 2.0f32.sqrt(), epsilon = 1.0e-3);
    }

    #[test]
    fn party_at_the_same_height_blocks_either_way() {
        let party = PartyBody {
            position: Vec3::new(150.0, 0.0, 0.0),
            radius: 20.0,
            height: 100.0,
        };
        let walker = Body::upright(Vec3::zeros(), 15.0, 90.0);
        for jagged_top in [false, true] {
            let mut state = moving(walker, Vec3::new(300.0, 0.0, 0.0));
            let hit = collide_with_party(&mut state, &party, jagged_top).hit().unwrap();
            assert_relative_eq!(hit.distance, 115.0, epsilon = 1.0e-3);
        }
    }

    #[test]
    fn sprite_objects_respect_blocking_and_exclusion() {
        let objects = [
            SpriteObject {
                center: Vec3::new(100.0, 0.0, 80.0),
                radius: 10.0,
                blocking: true,
            },
            SpriteObject {
                center: Vec3::new(50.0, 0.0, 20.0),
                radius: 10.0,
                blocking: false,
            },
        ];
        let body = Body::upright(Vec3::zeros(), 20.0, 100.0);

        let mut state = moving(body, Vec3::new(200.0, 0.0, 0.0));
        let hit = collide_with_sprite_objects(&mut state, &objects, None)
            .hit()
            .unwrap();
        assert_eq!(hit.target, HitTarget::SpriteObject(SpriteObjectId(0)));
        // The head sphere (center z = 79) meets the object first.
        let expected = 100.0 - (900.0f32 - 1.0).sqrt();
        assert_relative_eq!(hit.distance, expected, epsilon = 1.0e-2);

        let mut state = moving(body, Vec3::new(200.0, 0.0, 0.0));
        assert_eq!(
            collide_with_sprite_objects(&mut state, &objects, Some(SpriteObjectId(0))),
            Collision::Clear
        );
    }

    #[test]
    fn overlapping_sprite_object_lets_the_body_walk_away() {
        let objects = [SpriteObject {
            center: Vec3::new(495.0, 0.0, 21.0),
            radius: 10.0,
            blocking: true,
        }];
        let body = Body::upright(Vec3::new(500.0, 0.0, 0.0), 20.0, 100.0);

        let mut state = moving(body, Vec3::new(200.0, 0.0, 0.0));
        assert_eq!(collide_with_sprite_objects(&mut state, &objects, None), Collision::Clear);
        assert_eq!(state.hit, None);

        // Walking further into it is still blocked at once.
        let mut state = moving(body, Vec3::new(-200.0, 0.0, 0.0));
        let hit = collide_with_sprite_objects(&mut state, &objects, None).hit().unwrap();
        assert_eq!(hit.target, HitTarget::SpriteObject(SpriteObjectId(0)));
        assert_relative_eq!(hit.distance, 0.0);
    }
}
