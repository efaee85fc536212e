/*!
Outdoor colliders: BSP models and decorations, culled through the outdoor grid.
*/

use crate::{
    cell::{GridCell, cells_in_rect},
    level::OutdoorLevel,
    pid::{FaceId, HitTarget, ModelId},
};

use super::{
    broad::aabb_intersects,
    narrow_phase::{body_hits_face, sweep_feet_cylinder},
    state::CollisionState,
    types::{Collision, Cylinder},
};

/// Models registered in any grid cell the swept bounds overlap, without duplicates.
fn candidate_models(state: &CollisionState, level: &OutdoorLevel) -> Vec<ModelId> {
    let b = &state.bbox;
    let mut models: Vec<ModelId> = cells_in_rect((b.mins.x, b.mins.y), (b.maxs.x, b.maxs.y))
        .filter_map(|cell| level.grid().cell(cell))
        .flat_map(|contents| contents.models.iter().copied())
        .collect();
    models.sort_unstable();
    models.dedup();
    models
}

/// Sweep the body against the faces of nearby outdoor models.
///
/// Same face rules as indoors: untouchable faces never collide, ethereal ones are skipped
/// when `ignore_ethereal` is set, and `state.ignored_face` always is.
pub fn collide_outdoor_with_models(
    state: &mut CollisionState,
    level: &OutdoorLevel,
    ignore_ethereal: bool,
) -> Collision {
    let mut nearest = None;

    for model_id in candidate_models(state, level) {
        let model = level.model(model_id);
        if !aabb_intersects(&state.bbox, &model.bounding) {
            continue;
        }

        for (i, face) in model.faces.iter().enumerate() {
            let target = HitTarget::ModelFace {
                model: model_id,
                face: FaceId::from(i),
            };
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

/// Sweep the feet against the decorations standing in grid cell `(grid_x, grid_y)`.
///
/// Cells outside the grid hold nothing. Movement that can cross a cell boundary needs the
/// caller to check the neighboring cells as well.
pub fn collide_outdoor_with_decorations(
    state: &mut CollisionState,
    level: &OutdoorLevel,
    grid_x: i32,
    grid_y: i32,
) -> Collision {
    let Some(contents) = GridCell::new(grid_x, grid_y).and_then(|cell| level.grid().cell(cell))
    else {
        return Collision::Clear;
    };

    let mut nearest = None;
    for &id in &contents.decorations {
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        bitmask_flags::{DecorationFlag, FaceFlag},
        cell::grid_cell_for,
        collision::{
            test_util::wall,
            types::{Body, Vec3},
        },
        fixpoint::Fixpoint,
        level::{BspModel, Decoration},
        pid::{DecorationId, SectorId},
    };
    use approx::assert_relative_eq;

    fn moving(position: Vec3, velocity: Vec3) -> CollisionState {
        let mut state = CollisionState::new(Body::upright(position, 20.0, 100.0), SectorId(0));
        state.set_velocity(velocity);
        assert!(!state.prepare_and_check_if_stationary(Fixpoint::ONE));
        state
    }

    /// A hut at x in [1000, 1200] with its west wall facing -x, and a tree outside it.
    fn village() -> OutdoorLevel {
        let west = wall(Vec3::new(1000.0, 0.0, 100.0), -Vec3::x(), 100.0);
        let mut ghost = wall(Vec3::new(800.0, 0.0, 100.0), -Vec3::x(), 100.0);
        ghost.flags.add(FaceFlag::Ethereal);
        let east = wall(Vec3::new(1200.0, 0.0, 100.0), Vec3::x(), 100.0);

        let mut stump = Decoration::new(Vec3::new(300.0, 200.0, 0.0), 40.0, 20.0);
        stump.flags.add(DecorationFlag::Invisible);
        OutdoorLevel::new(
            vec![BspModel::new(vec![east, west]), BspModel::new(vec![ghost])],
            vec![
                Decoration::new(Vec3::new(300.0, 0.0, 0.0), 40.0, 300.0),
                stump,
            ],
        )
        .unwrap()
    }

    #[test]
    fn model_wall_blocks_and_reports_model_face() {
        let level = village();
        let mut state = moving(Vec3::new(900.0, 0.0, 0.0), Vec3::new(500.0, 0.0, 0.0));
        let hit = collide_outdoor_with_models(&mut state, &level, true).hit().unwrap();
        assert_eq!(
            hit.target,
            HitTarget::ModelFace {
                model: ModelId(0),
                face: FaceId(1)
            }
        );
        assert_relative_eq!(hit.distance, 80.0, epsilon = 1.0e-3);
    }

    #[test]
    fn ethereal_model_faces_follow_the_flag() {
        let level = village();
        let mut state = moving(Vec3::new(700.0, 0.0, 0.0), Vec3::new(500.0, 0.0, 0.0));
        let hit = collide_outdoor_with_models(&mut state, &level, false).hit().unwrap();
        assert_eq!(hit.target.face(), Some(FaceId(0)));
        assert_relative_eq!(hit.distance, 80.0, epsilon = 1.0e-3);

        assert!(!state.begin_iteration());
        let hit = collide_outdoor_with_models(&mut state, &level, true).hit().unwrap();
        assert_relative_eq!(hit.distance, 280.0, epsilon = 1.0e-3);
    }

    #[test]
    fn far_away_sweep_sees_no_models() {
        let level = village();
        let mut state = moving(Vec3::new(-5000.0, 0.0, 0.0), Vec3::new(500.0, 0.0, 0.0));
        assert_eq!(collide_outdoor_with_models(&mut state, &level, false), Collision::Clear);
        assert_relative_eq!(state.adjusted_move_distance, state.move_distance);
    }

    #[test]
    fn decorations_are_looked_up_by_cell() {
        let level = village();
        let mut state = moving(Vec3::zeros(), Vec3::new(400.0, 0.0, 0.0));
        let home = grid_cell_for(300.0, 0.0);

        let hit = collide_outdoor_with_decorations(&mut state, &level, home.x as i32, home.y as i32)
            .hit()
            .unwrap();
        assert_eq!(hit.target, HitTarget::Decoration(DecorationId(0)));
        assert_relative_eq!(hit.distance, 240.0, epsilon = 1.0e-3);

        let other = collide_outdoor_with_decorations(&mut state, &level, home.x as i32 + 3, 0);
        assert_eq!(other, Collision::Clear);
        assert_eq!(collide_outdoor_with_decorations(&mut state, &level, -1, 500), Collision::Clear);
    }

    #[test]
    fn invisible_decorations_do_not_block() {
        let level = village();
        let mut state = moving(Vec3::new(0.0, 200.0, 0.0), Vec3::new(400.0, 0.0, 0.0));
        let home = grid_cell_for(300.0, 200.0);
        assert_eq!(
            collide_outdoor_with_decorations(&mut state, &level, home.x as i32, home.y as i32),
            Collision::Clear
        );
    }
}
