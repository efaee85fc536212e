use nalgebra as na;
use rapier3d::parry::{
    query::{self, ShapeCastOptions},
    shape as pshape,
};

use crate::level::Face;

use super::{
    broad::{aabb_intersects, cylinder_aabb},
    settings::COLLISION_EPS,
    types::{Aabb, Body, Cylinder, Sphere, Vec2, Vec3},
};

/// Whether `point` (assumed on or near the face plane) lies inside the face polygon.
///
/// The polygon is projected onto the coordinate plane most aligned with its normal and tested
/// with an even-odd crossing count.
pub fn point_in_face(face: &Face, point: Vec3) -> bool {
    let n = face.plane.normal.abs();
    let project: fn(&Vec3) -> Vec2 = if n.z >= n.x && n.z >= n.y {
        |v| Vec2::new(v.x, v.y)
    } else if n.x >= n.y {
        |v| Vec2::new(v.y, v.z)
    } else {
        |v| Vec2::new(v.x, v.z)
    };

    let p = project(&point);
    let mut inside = false;
    let mut prev = project(&face.vertices[face.vertices.len() - 1]);
    for vertex in &face.vertices {
        let cur = project(vertex);
        if (cur.y > p.y) != (prev.y > p.y) {
            let x_cross = cur.x + (prev.x - cur.x) * (p.y - cur.y) / (prev.y - cur.y);
            if p.x < x_cross {
                inside = !inside;
            }
        }
        prev = cur;
    }
    inside
}

/// Sweep a sphere along unit `dir` against the face and return the distance to first contact.
///
/// A sphere already within its radius of the plane reports 0, provided its center projects
/// inside the polygon. Contacts farther than `max_distance` are misses.
pub fn sweep_sphere_face(face: &Face, sphere: &Sphere, dir: Vec3, max_distance: f32) -> Option<f32> {
    let n = face.plane.normal;
    let d = face.plane.signed_distance(&sphere.center);

    if d.abs() < sphere.radius {
        let contact = sphere.center - n * d;
        return point_in_face(face, contact).then_some(0.0);
    }

    let approach = dir.dot(&n);
    if d < 0.0 || approach > -COLLISION_EPS {
        return None;
    }

    let t = (d - sphere.radius) / -approach;
    if t > max_distance {
        return None;
    }
    let contact = sphere.center + dir * t - n * sphere.radius;
    point_in_face(face, contact).then_some(t)
}

/// Cast a ray from `origin` along unit `dir` at the front of the face; `None` beyond `range`.
pub fn ray_face(face: &Face, origin: Vec3, dir: Vec3, range: f32) -> Option<f32> {
    let approach = dir.dot(&face.plane.normal);
    if approach > -COLLISION_EPS {
        return None;
    }
    let d = face.plane.signed_distance(&origin);
    if d < 0.0 {
        return None;
    }
    let t = d / -approach;
    if t > range {
        return None;
    }
    point_in_face(face, origin + dir * t).then_some(t)
}

/// Full face test for one sphere of the body moving `move_distance` along `dir`.
///
/// The sphere must start in front of the face, reach or touch the plane, and not move away from
/// it. The swept-sphere test runs first; when its contact point misses the polygon (typically
/// near an edge), a ray from the center with range `move_distance + radius` takes over.
pub fn sphere_hits_face(
    face: &Face,
    sphere: &Sphere,
    dir: Vec3,
    move_distance: f32,
) -> Option<f32> {
    let r = sphere.radius;
    let d_old = face.plane.signed_distance(&sphere.center);
    let d_new = face.plane.signed_distance(&(sphere.center + dir * move_distance));
    if !(d_old > 0.0 && (d_old <= r || d_new <= r) && d_new <= d_old) {
        return None;
    }

    if let Some(t) = sweep_sphere_face(face, sphere, dir, move_distance) {
        return Some(t);
    }
    ray_face(face, sphere.center, dir, move_distance + r).map(|t| (t - r).max(0.0))
}

/// Nearest face hit of either sphere of `body`; the head only takes part when present.
pub fn body_hits_face(face: &Face, body: &Body, dir: Vec3, move_distance: f32) -> Option<f32> {
    let feet = sphere_hits_face(face, &body.feet, dir, move_distance);
    let head = body
        .head
        .and_then(|head| sphere_hits_face(face, &head, dir, move_distance));
    match (feet, head) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    }
}

/// Sweep the feet sphere horizontally against an upright cylinder.
///
/// Returns the distance along `dir` at which the sphere touches the cylinder's side. The
/// height of the path at closest approach must lie within the cylinder's vertical extent,
/// padded by the sphere radius; `jagged_top` drops the upper bound.
pub fn sweep_feet_cylinder(
    feet: &Sphere,
    dir: Vec3,
    bbox: &Aabb,
    cylinder: &Cylinder,
    jagged_top: bool,
) -> Option<f32> {
    if !aabb_intersects(bbox, &cylinder_aabb(cylinder.base, cylinder.radius, cylinder.height)) {
        return None;
    }

    let horizontal = Vec2::new(dir.x, dir.y);
    let h_len = horizontal.norm();
    if h_len <= COLLISION_EPS {
        return None;
    }
    let h_dir = horizontal / h_len;

    let to_axis = Vec2::new(
        cylinder.base.x - feet.center.x,
        cylinder.base.y - feet.center.y,
    );
    let sum_radius = feet.radius + cylinder.radius;
    let perp = to_axis.x * h_dir.y - to_axis.y * h_dir.x;
    if perp.abs() > sum_radius {
        return None;
    }

    let proj = to_axis.dot(&h_dir);
    if proj <= 0.0 {
        return None;
    }

    let closest_z = feet.center.z + dir.z * (proj / h_len);
    if closest_z < cylinder.base.z - feet.radius {
        return None;
    }
    if !jagged_top && closest_z > cylinder.base.z + cylinder.height + feet.radius {
        return None;
    }

    let horizontal_hit = proj - (sum_radius * sum_radius - perp * perp).sqrt();
    Some((horizontal_hit / h_len).max(0.0))
}

/// Sweep a sphere along unit `dir` against a static sphere.
///
/// Overlapping spheres report 0 while the movement closes in on the target's center, and
/// miss once it separates them.
pub fn sweep_sphere_sphere(
    moving: &Sphere,
    dir: Vec3,
    max_distance: f32,
    target: &Sphere,
) -> Option<f32> {
    let to_target = target.center - moving.center;
    let sum_radius = moving.radius + target.radius;
    if to_target.norm_squared() < sum_radius * sum_radius {
        return (dir.dot(&to_target) > 0.0).then_some(0.0);
    }

    let ball = pshape::Ball::new(moving.radius);
    let target_ball = pshape::Ball::new(target.radius);
    let iso = na::Isometry3::translation(moving.center.x, moving.center.y, moving.center.z);
    let target_iso = na::Isometry3::translation(target.center.x, target.center.y, target.center.z);

    let mut opts = ShapeCastOptions::with_max_time_of_impact(max_distance);
    opts.stop_at_penetration = true;
    match query::cast_shapes(
        &iso,
        &dir,
        &ball as &dyn pshape::Shape,
        &target_iso,
        &na::Vector3::zeros(),
        &target_ball as &dyn pshape::Shape,
        opts,
    ) {
        Ok(Some(hit)) => Some(hit.time_of_impact),
        _ => None,
    }
}
