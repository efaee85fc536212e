use crate::{
    cell::cells_in_rect,
    collision::{
        Body, Collision, CollisionSettings, CollisionState, PartyBody, SpriteObject, Vec3,
        broad::aabb_inflate,
        collide_indoor_with_decorations, collide_indoor_with_geometry,
        collide_indoor_with_portals, collide_outdoor_with_decorations,
        collide_outdoor_with_models, collide_with_actor, collide_with_party,
        collide_with_sprite_objects,
    },
    constants::CELL_SIZE,
    fixpoint::Fixpoint,
    level::{Face, IndoorLevel, OutdoorLevel},
    pid::{ActorId, HitTarget, ObjectKind, Pid, SectorId, SpriteObjectId, pack_pid},
    trig::{trig_lut, yaw_from_xy},
};

/// Everything a movement resolution can run into.
#[derive(Clone, Copy, Debug)]
pub struct Scene<'a, L> {
    pub level: &'a L,
    pub actors: &'a [Body],
    pub sprite_objects: &'a [SpriteObject],
    pub party: Option<PartyBody>,
}

pub type IndoorScene<'a> = Scene<'a, IndoorLevel>;
pub type OutdoorScene<'a> = Scene<'a, OutdoorLevel>;

impl<'a, L> Scene<'a, L> {
    /// Scene with only level geometry.
    pub fn level_only(level: &'a L) -> Self {
        Self {
            level,
            actors: &[],
            sprite_objects: &[],
            party: None,
        }
    }
}

/// Who is moving, and how it treats the scene.
#[derive(Clone, Copy, Debug, Default)]
pub struct Mover {
    /// Registry slot of the mover, never collided with itself.
    pub actor: Option<ActorId>,
    /// Sprite object moving (a projectile), likewise skipped.
    pub sprite_object: Option<SpriteObjectId>,
    /// Pass through ethereal faces.
    pub ignore_ethereal: bool,
    /// Hit the party regardless of height mismatch.
    pub jagged_top: bool,
}

/// Output of one movement resolution.
#[derive(Clone, Debug)]
pub struct MoveOutcome {
    /// Body at the resolved position.
    pub body: Body,
    pub sector: SectorId,
    /// Velocity after slide responses, in units per second.
    pub velocity: Vec3,
    /// Everything hit, in order.
    pub hits: Vec<HitTarget>,
    pub iterations: u32,
    /// Nothing was resolved because the tick's movement rounds to zero.
    pub stationary: bool,
}

impl MoveOutcome {
    /// Packed pid of the last thing hit, or an `ObjectKind::None` pid when nothing was.
    pub fn last_pid(&self) -> Pid {
        self.hits
            .last()
            .map_or_else(|| pack_pid(ObjectKind::None, 0), |target| target.pid())
    }
}

/// Level-specific half of a resolution.
trait LevelColliders {
    /// Run the static-geometry colliders.
    fn collide_static(&self, state: &mut CollisionState, mover: &Mover);

    /// Follow portals out of the current sector. Levels without portals never cross.
    fn collide_portals(&self, _state: &mut CollisionState) -> Collision {
        Collision::Clear
    }

    /// Bottom center of a decoration hit.
    fn decoration_axis(&self, target: HitTarget) -> Option<Vec3>;

    /// The face behind a face hit.
    fn hit_face(&self, target: HitTarget) -> Option<&Face>;
}

impl LevelColliders for IndoorLevel {
    fn collide_static(&self, state: &mut CollisionState, mover: &Mover) {
        collide_indoor_with_geometry(state, self, mover.ignore_ethereal);
        collide_indoor_with_decorations(state, self);
    }

    fn collide_portals(&self, state: &mut CollisionState) -> Collision {
        collide_indoor_with_portals(state, self)
    }

    fn decoration_axis(&self, target: HitTarget) -> Option<Vec3> {
        match target {
            HitTarget::Decoration(id) => Some(self.decoration(id).position),
            _ => None,
        }
    }

    fn hit_face(&self, target: HitTarget) -> Option<&Face> {
        match target {
            HitTarget::Face(id) => Some(self.face(id)),
            _ => None,
        }
    }
}

impl LevelColliders for OutdoorLevel {
    fn collide_static(&self, state: &mut CollisionState, mover: &Mover) {
        collide_outdoor_with_models(state, self, mover.ignore_ethereal);
        // Decorations are bucketed by their base, so reach one cell past the swept bounds.
        let reach = aabb_inflate(&state.bbox, CELL_SIZE);
        for cell in cells_in_rect((reach.mins.x, reach.mins.y), (reach.maxs.x, reach.maxs.y)) {
            collide_outdoor_with_decorations(state, self, cell.x as i32, cell.y as i32);
        }
    }

    fn decoration_axis(&self, target: HitTarget) -> Option<Vec3> {
        match target {
            HitTarget::Decoration(id) => Some(self.decoration(id).position),
            _ => None,
        }
    }

    fn hit_face(&self, target: HitTarget) -> Option<&Face> {
        match target {
            HitTarget::ModelFace { model, face } => self.model(model).faces.get(face.index()),
            _ => None,
        }
    }
}

/// Resolve one tick of movement through an indoor level.
///
/// `units_per_second` is the mover's desired velocity and `dt` the tick length. The state
/// carries the body and sector in and out; the returned [`MoveOutcome`] summarizes the result.
pub fn resolve_indoor_movement(
    scene: &IndoorScene<'_>,
    state: &mut CollisionState,
    units_per_second: Vec3,
    dt: Fixpoint,
    mover: Mover,
    settings: &CollisionSettings,
) -> MoveOutcome {
    resolve_movement(scene, state, units_per_second, dt, mover, settings)
}

/// Resolve one tick of movement outdoors. Decorations are checked in every grid cell the
/// swept bounds touch, plus one cell around them.
pub fn resolve_outdoor_movement(
    scene: &OutdoorScene<'_>,
    state: &mut CollisionState,
    units_per_second: Vec3,
    dt: Fixpoint,
    mover: Mover,
    settings: &CollisionSettings,
) -> MoveOutcome {
    resolve_movement(scene, state, units_per_second, dt, mover, settings)
}

/// Collide-and-slide loop.
///
/// Each iteration runs every collider against the remaining distance, moves up to the nearest
/// hit, and redirects the rest of the movement along the obstacle. Portal crossings re-run the
/// colliders in the new sector before any distance is consumed.
fn resolve_movement<L: LevelColliders>(
    scene: &Scene<'_, L>,
    state: &mut CollisionState,
    units_per_second: Vec3,
    dt: Fixpoint,
    mover: Mover,
    settings: &CollisionSettings,
) -> MoveOutcome {
    let mut velocity = units_per_second;
    let mut hits = Vec::new();
    let mut iterations = 0;

    state.set_velocity(units_per_second);
    if state.prepare_and_check_if_stationary(dt) {
        return MoveOutcome {
            body: state.body,
            sector: state.sector,
            velocity,
            hits,
            iterations,
            stationary: true,
        };
    }

    let dt_seconds = dt.to_f32();
    let mut finished = false;
    for attempt in 0..settings.max_iterations {
        if attempt > 0 && state.begin_iteration() {
            finished = true;
            break;
        }
        iterations += 1;

        match collide_all(scene, state, &mover, settings) {
            Collision::Blocked(hit) => {
                state.advance(hit.distance);
                hits.push(hit.target);
                velocity = slide_response(scene, state, hit.target, velocity, settings);
                state.redirect(velocity * dt_seconds);
            }
            _ => {
                state.advance(state.move_distance);
                finished = true;
                break;
            }
        }
    }

    if !finished && !state.is_exhausted() {
        log::warn!(
            "movement not resolved after {} iterations, {:.3} units left",
            settings.max_iterations,
            state.speed - state.total_move_distance
        );
    }

    log::debug!(
        "resolved movement: {:.3}/{:.3} units in {} iterations, {} hits, sector {}",
        state.total_move_distance,
        state.speed,
        iterations,
        hits.len(),
        state.sector
    );

    MoveOutcome {
        body: state.body,
        sector: state.sector,
        velocity,
        hits,
        iterations,
        stationary: false,
    }
}

/// Run all colliders for the current iteration, re-running them after each portal crossing.
fn collide_all<L: LevelColliders>(
    scene: &Scene<'_, L>,
    state: &mut CollisionState,
    mover: &Mover,
    settings: &CollisionSettings,
) -> Collision {
    for transition in 0..=settings.max_sector_transitions {
        scene.level.collide_static(state, mover);
        collide_entities(scene, state, mover);

        if let Collision::SectorChanged { .. } = scene.level.collide_portals(state) {
            if transition == settings.max_sector_transitions {
                log::warn!(
                    "gave up after {} sector transitions in one iteration",
                    settings.max_sector_transitions
                );
                break;
            }
            continue;
        }
        break;
    }
    state.outcome()
}

fn collide_entities<L>(scene: &Scene<'_, L>, state: &mut CollisionState, mover: &Mover) {
    if let Some(party) = scene.party.as_ref() {
        collide_with_party(state, party, mover.jagged_top);
    }
    collide_with_sprite_objects(state, scene.sprite_objects, mover.sprite_object);
    for i in 0..scene.actors.len() {
        let id = ActorId::from(i);
        if mover.actor != Some(id) {
            collide_with_actor(state, scene.actors, id, 0.0);
        }
    }
}

/// New velocity after hitting `target`.
///
/// Walls and ceilings push the velocity out along their normal, by at least a fraction of the
/// mover's speed, and depenetrate the feet. Floors only cancel the motion into them.
/// Cylinder-like obstacles keep the horizontal speed but turn it away from the obstacle's
/// axis. Either way the result is damped.
fn slide_response<L: LevelColliders>(
    scene: &Scene<'_, L>,
    state: &mut CollisionState,
    target: HitTarget,
    velocity: Vec3,
    settings: &CollisionSettings,
) -> Vec3 {
    let mut velocity = velocity;

    if let Some(face) = scene.level.hit_face(target) {
        let n = face.plane.normal;
        if face.is_floor() {
            let into = velocity.dot(&n);
            if into < 0.0 {
                velocity -= n * into;
            }
        } else {
            let push = velocity
                .dot(&n)
                .abs()
                .max(velocity.norm() * settings.slide_min_push);
            velocity += n * push;

            let overshoot =
                state.body.feet.radius - face.plane.signed_distance(&state.body.feet.center);
            state.push_out(n, overshoot);
        }
        state.ignored_face = Some(target);
    } else if let Some(axis) = obstacle_axis(scene, target) {
        let away = state.body.feet.center - axis;
        if let Some(yaw) = yaw_from_xy(away) {
            let lut = trig_lut();
            let horizontal = (velocity.x * velocity.x + velocity.y * velocity.y).sqrt();
            velocity.x = lut.cos(yaw) * horizontal;
            velocity.y = lut.sin(yaw) * horizontal;
        }
        state.ignored_face = None;
    }

    log::trace!("slide off {target:?}: velocity {velocity:?}");
    velocity * settings.slide_damping
}

fn obstacle_axis<L: LevelColliders>(scene: &Scene<'_, L>, target: HitTarget) -> Option<Vec3> {
    match target {
        HitTarget::Decoration(_) => scene.level.decoration_axis(target),
        HitTarget::Actor(id) => scene.actors.get(id.index()).map(|body| body.feet.center),
        HitTarget::SpriteObject(id) => scene.sprite_objects.get(id.index()).map(|o| o.center),
        HitTarget::Party => scene.party.map(|party| party.position),
        HitTarget::Face(_) | HitTarget::ModelFace { .. } => None,
    }
}
