/*!
Indoor colliders: sector faces, sector decorations, and portal traversal.

The geometry collider looks at the faces of the current sector, plus the faces of every
neighbor whose portal the sweep is about to touch, so walls just past a doorway are seen
before the portal collider moves the actor into that sector.
*/

use crate::{
    level::IndoorLevel,
    pid::{FaceId, HitTarget, SectorId},
};

use super::{
    broad::{aabb_inflate, aabb_intersects},
    narrow_phase::{body_hits_face, point_in_face, sweep_feet_cylinder},
    settings::{COLLISION_EPS, PORTAL_TOUCH_MARGIN},
    state::CollisionState,
    types::{Collision, Cylinder},
};

/// Sectors whose faces the current sweep can reach: the current one first, then neighbors
/// behind touched portals.
fn candidate_sectors(state: &CollisionState, level: &IndoorLevel) -> Vec<SectorId> {
    let mut sectors = vec![state.sector];
    let reach = state.move_distance + PORTAL_TOUCH_MARGIN;
    let bounds = aabb_inflate(&state.bbox, PORTAL_TOUCH_MARGIN);
    for &portal_id in &level.sector(state.sector).portals {
        let portal = level.face(portal_id);
        if !aabb_intersects(&bounds, &portal.bounding) {
            continue;
        }
        if portal.plane.signed_distance(&state.body.feet.center).abs() > reach {
            continue;
        }
        if let Some(next) = portal.other_side(state.sector) {
            if !sectors.contains(&next) {
                sectors.push(next);
            }
        }
    }
    sectors
}

/// Sweep the body against the faces around the current sector.
///
/// Portal and untouchable faces never collide; ethereal faces are skipped when
/// `ignore_ethereal` is set, and `state.ignored_face` always is.
pub fn collide_indoor_with_geometry(
    state: &mut CollisionState,
    level: &IndoorLevel,
    ignore_ethereal: bool,
) -> Collision {
    let mut nearest = None;

    for sector in candidate_sectors(state, level) {
        for &face_id in &level.sector(sector).faces {
            let face = level.face(face_id);
            let target = HitTarget::Face(face_id);
            if face.is_portal() || face.is_untouchable() {
                continue;
            }
            if ignore_ethereal && face.is_ethereal() {
                continue;
            }
            if state.ignored_face == Some(target) {
                continue;
            }
            if !aabb_intersects(&state.bbox, &face.bounding) {
                continue;
            }

            if let Some(distance) =
                body_hits_face(face, &state.body, state.direction, state.move_distance)
            {
                state.consider(&mut nearest, distance, target, Some(face.plane.normal));
            }
        }
    }

    nearest.map_or(Collision::Clear, Collision::Blocked)
}

/// Sweep the feet against the blocking decorations of the current sector.
pub fn collide_indoor_with_decorations(
    state: &mut CollisionState,
    level: &IndoorLevel,
) -> Collision {
    let mut nearest = None;

    for &id in &level.sector(state.sector).decorations {
        let decoration = level.decoration(id);
        if !decoration.blocks_movement() {
            continue;
        }
        let cylinder = Cylinder::new(decoration.position, decoration.radius, decoration.height);
        if let Some(distance) =
            sweep_feet_cylinder(&state.body.feet, state.direction, &state.bbox, &cylinder, false)
        {
            state.consider(&mut nearest, distance, HitTarget::Decoration(id), None);
        }
    }

    nearest.map_or(Collision::Clear, Collision::Blocked)
}

/// Check whether the feet leave the current sector through one of its portals.
///
/// A crossing counts when the feet sphere straddles or touches the portal plane during the
/// sweep, moves out of the current sector, and the path of its center passes through the
/// polygon no farther than both `move_distance` and the nearest blocking hit. On a crossing
/// the state is moved to the neighbor sector and must be re-tested there before any distance
/// is consumed.
pub fn collide_indoor_with_portals(state: &mut CollisionState, level: &IndoorLevel) -> Collision {
    let feet = state.body.feet;
    let dir = state.direction;
    let limit = state.move_distance.min(state.adjusted_move_distance);
    let mut crossing: Option<(f32, FaceId, SectorId)> = None;

    for &portal_id in &level.sector(state.sector).portals {
        let portal = level.face(portal_id);
        if !aabb_intersects(&state.bbox, &portal.bounding) {
            continue;
        }
        let Some(next) = portal.other_side(state.sector) else {
            continue;
        };

        let n = portal.plane.normal;
        let approach = dir.dot(&n);
        let leaving = if portal.sector == state.sector {
            approach < -COLLISION_EPS
        } else {
            approach > COLLISION_EPS
        };
        if !leaving {
            continue;
        }

        let d_old = portal.plane.signed_distance(&feet.center);
        let d_new = portal.plane.signed_distance(&state.new_position_lo);
        let straddles = (d_old > 0.0) != (d_new > 0.0);
        if !straddles && d_old.abs() > feet.radius && d_new.abs() > feet.radius {
            continue;
        }

        let t = (-d_old / approach).max(0.0);
        if t > limit {
            continue;
        }
        let on_plane = feet.center + dir * t;
        let on_plane = on_plane - n * portal.plane.signed_distance(&on_plane);
        if !point_in_face(portal, on_plane) {
            continue;
        }

        if crossing.is_none_or(|(best, _, _)| t < best) {
            crossing = Some((t, portal_id, next));
        }
    }

    match crossing {
        Some((_, portal, sector)) => {
            state.enter_sector(portal, sector);
            Collision::SectorChanged { portal, sector }
        }
        None => Collision::Clear,
    }
}
