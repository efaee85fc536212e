/*!
The collision context of one movement resolution.

A [`CollisionState`] is owned by whoever resolves an actor's movement and handed to every
collider by `&mut`. Colliders only ever shrink `adjusted_move_distance` (or switch the
sector on a portal crossing); the driver consumes distance through [`CollisionState::advance`].

Lifecycle
- `set_velocity` / `set_velocity_polar` give the desired velocity in units per second.
- `prepare_and_check_if_stationary` scales it by the tick and seeds all derived fields.
- Each refinement iteration starts with `begin_iteration`, runs the colliders, reads
  `outcome`, then `advance`s and possibly `redirect`s.
*/

use crate::{
    fixpoint::Fixpoint,
    pid::{FaceId, HitTarget, SectorId},
    trig::vec_from_polar,
};

use super::{
    broad::swept_body_aabb,
    settings::{COLLISION_EPS, MIN_MOVE_DISTANCE, TIE_TOLERANCE},
    types::{Aabb, Body, Collision, Hit, Vec3},
};

/// Speeds below this round to zero and make the actor stationary for the tick.
pub const STATIONARY_SPEED: f32 = 0.5;

#[derive(Clone, Debug)]
pub struct CollisionState {
    pub body: Body,
    pub new_position_lo: Vec3,
    pub new_position_hi: Option<Vec3>,
    /// Full displacement for this tick.
    pub velocity: Vec3,
    /// Unit `velocity`.
    pub direction: Vec3,
    /// Distance budget of the tick.
    pub speed: f32,
    pub total_move_distance: f32,
    pub move_distance: f32,
    pub adjusted_move_distance: f32,
    pub sector: SectorId,
    /// Last thing collided with during the current iteration.
    pub hit: Option<HitTarget>,
    /// Normal of the face in `hit`, when it is a face.
    pub hit_normal: Option<Vec3>,
    /// Face skipped by the face colliders, usually the one just slid off.
    pub ignored_face: Option<HitTarget>,
    pub bbox: Aabb,
    desired_velocity: Vec3,
}

impl CollisionState {
    pub fn new(body: Body, sector: SectorId) -> Self {
        body.assert_valid();
        let feet = body.feet.center;
        Self {
            bbox: swept_body_aabb(&body, Vec3::zeros()),
            new_position_lo: feet,
            new_position_hi: body.head.map(|head| head.center),
            body,
            velocity: Vec3::zeros(),
            direction: Vec3::zeros(),
            speed: 0.0,
            total_move_distance: 0.0,
            move_distance: 0.0,
            adjusted_move_distance: 0.0,
            sector,
            hit: None,
            hit_normal: None,
            ignored_face: None,
            desired_velocity: Vec3::zeros(),
        }
    }

    /// Desired velocity in world units per second.
    pub fn set_velocity(&mut self, units_per_second: Vec3) {
        self.desired_velocity = units_per_second;
    }

    /// Desired velocity from a speed (units per second) and a heading in angle units.
    pub fn set_velocity_polar(&mut self, speed: f32, yaw: i32, pitch: i32) {
        self.desired_velocity = vec_from_polar(speed, yaw, pitch);
    }

    #[inline]
    pub fn desired_velocity(&self) -> Vec3 {
        self.desired_velocity
    }

    /// Scale the desired velocity by `dt` and seed the query.
    ///
    /// Returns `true` when the resulting speed rounds to zero. The state is then left untouched
    /// and no collider may be called, since the direction is undefined.
    pub fn prepare_and_check_if_stationary(&mut self, dt: Fixpoint) -> bool {
        let velocity = self.desired_velocity * dt.to_f32();
        let speed = velocity.norm();
        if !(speed >= STATIONARY_SPEED) {
            return true;
        }

        self.body.assert_valid();
        self.velocity = velocity;
        self.direction = velocity / speed;
        self.speed = speed;
        self.total_move_distance = 0.0;
        self.move_distance = speed;
        self.ignored_face = None;
        self.refresh();
        false
    }

    /// Start a refinement iteration on whatever distance is left.
    ///
    /// Returns `true` when the budget is exhausted and there is nothing left to resolve.
    pub fn begin_iteration(&mut self) -> bool {
        self.move_distance = self.speed - self.total_move_distance;
        if self.move_distance <= MIN_MOVE_DISTANCE {
            self.move_distance = 0.0;
            return true;
        }
        self.refresh();
        false
    }

    fn refresh(&mut self) {
        assert!(
            (self.direction.norm() - 1.0).abs() < 1.0e-3,
            "collision direction must be unit length, got {:?}",
            self.direction
        );
        let delta = self.direction * self.move_distance;
        self.new_position_lo = self.body.feet.center + delta;
        self.new_position_hi = self.body.head.map(|head| head.center + delta);
        self.bbox = swept_body_aabb(&self.body, delta);
        self.adjusted_move_distance = self.move_distance;
        self.hit = None;
        self.hit_normal = None;
    }

    /// Move the body `distance` along `direction`, consuming that much of the budget.
    pub fn advance(&mut self, distance: f32) {
        let distance = distance.clamp(0.0, self.move_distance);
        self.body.translate(self.direction * distance);
        self.total_move_distance = (self.total_move_distance + distance).min(self.speed);
    }

    /// Replace the remaining displacement of the tick.
    ///
    /// The budget can only shrink: `speed` becomes the distance travelled so far plus
    /// `|remaining|`, capped at the previous budget.
    pub fn redirect(&mut self, remaining: Vec3) {
        let len = remaining.norm();
        let left = self.speed - self.total_move_distance;
        if len <= COLLISION_EPS || left <= 0.0 {
            self.speed = self.total_move_distance;
            return;
        }
        let len = len.min(left);
        self.direction = remaining / remaining.norm();
        self.speed = self.total_move_distance + len;
        self.velocity = self.direction * self.speed;
    }

    /// Depenetrate along `normal` without consuming movement budget.
    pub fn push_out(&mut self, normal: Vec3, amount: f32) {
        if amount > 0.0 {
            self.body.translate(normal * amount);
        }
    }

    /// Nearest blocking hit found by the colliders run so far this iteration.
    ///
    /// Portal crossings are reported by the portal collider itself and reset this to `Clear`.
    pub fn outcome(&self) -> Collision {
        match self.hit {
            Some(target) => Collision::Blocked(Hit {
                distance: self.adjusted_move_distance,
                target,
            }),
            None => Collision::Clear,
        }
    }

    #[inline]
    pub fn is_exhausted(&self) -> bool {
        self.speed - self.total_move_distance <= MIN_MOVE_DISTANCE
    }

    /// Offer a hit to the state.
    ///
    /// The hit is kept when it is nearer than the current best. Face hits at the same distance
    /// go to the face whose normal opposes `direction` most, then to the lower face id.
    pub(crate) fn record_hit(
        &mut self,
        distance: f32,
        target: HitTarget,
        normal: Option<Vec3>,
    ) -> bool {
        let distance = distance.max(0.0);
        let better = if distance < self.adjusted_move_distance - TIE_TOLERANCE {
            true
        } else if distance <= self.adjusted_move_distance + TIE_TOLERANCE {
            match (self.hit, self.hit_normal, normal) {
                (None, _, _) => distance < self.adjusted_move_distance,
                (Some(current), Some(current_n), Some(n)) => {
                    self.wins_tie(target, n, current, current_n)
                }
                _ => distance < self.adjusted_move_distance,
            }
        } else {
            false
        };

        if better {
            self.adjusted_move_distance = self.adjusted_move_distance.min(distance);
            self.hit = Some(target);
            self.hit_normal = normal;
            log::trace!("hit {target:?} at {distance:.3}");
        }
        better
    }

    fn wins_tie(&self, target: HitTarget, n: Vec3, current: HitTarget, current_n: Vec3) -> bool {
        let facing = -n.dot(&self.direction);
        let current_facing = -current_n.dot(&self.direction);
        if facing > current_facing + COLLISION_EPS {
            return true;
        }
        if facing < current_facing - COLLISION_EPS {
            return false;
        }
        face_key(target) < face_key(current)
    }

    /// Offer a collider's hit, keeping the collider's own nearest one in `nearest`.
    ///
    /// Hits beyond `move_distance` are out of reach this iteration and ignored entirely. A hit the
    /// state keeps is also the collider's nearest, so both agree on tie-breaks.
    pub(crate) fn consider(
        &mut self,
        nearest: &mut Option<Hit>,
        distance: f32,
        target: HitTarget,
        normal: Option<Vec3>,
    ) {
        let distance = distance.max(0.0);
        if distance > self.move_distance {
            return;
        }
        let kept = self.record_hit(distance, target, normal);
        if kept || nearest.is_none_or(|hit| distance < hit.distance) {
            *nearest = Some(Hit { distance, target });
        }
    }

    /// Switch to `sector` through `portal`. The new sector has not been tested yet, so the
    /// iteration's result is reset.
    pub(crate) fn enter_sector(&mut self, portal: FaceId, sector: SectorId) {
        log::trace!("crossing {portal} from {} into {sector}", self.sector);
        self.sector = sector;
        self.adjusted_move_distance = self.move_distance;
        self.hit = None;
        self.hit_normal = None;
    }
}

fn face_key(target: HitTarget) -> (u32, u32) {
    match target {
        HitTarget::Face(face) => (0, face.0),
        HitTarget::ModelFace { model, face } => (model.0, face.0),
        _ => (u32::MAX, u32::MAX),
    }
}
