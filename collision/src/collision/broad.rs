use nalgebra as na;
use rapier3d::parry::shape as pshape;

use super::types::{Aabb, Body, Point3, Vec3};

/// Tight bounds of a point set. An empty set yields a degenerate box at the origin.
pub fn points_aabb(points: &[Vec3]) -> Aabb {
    let Some(first) = points.first() else {
        return Aabb {
            mins: Point3::origin(),
            maxs: Point3::origin(),
        };
    };
    let mut mins = *first;
    let mut maxs = *first;
    for p in &points[1..] {
        mins = mins.inf(p);
        maxs = maxs.sup(p);
    }
    Aabb {
        mins: mins.into(),
        maxs: maxs.into(),
    }
}

/// World-space bounds of a sphere.
pub fn sphere_aabb(center: Vec3, radius: f32) -> Aabb {
    let ball = pshape::Ball::new(radius);
    let iso = na::Isometry3::from_parts(
        na::Translation3::new(center.x, center.y, center.z),
        na::UnitQuaternion::identity(),
    );
    ball.aabb(&iso)
}

/// Bounds of a vertical cylinder standing on `base` (bottom center).
pub fn cylinder_aabb(base: Vec3, radius: f32, height: f32) -> Aabb {
    Aabb {
        mins: Point3::new(base.x - radius, base.y - radius, base.z),
        maxs: Point3::new(base.x + radius, base.y + radius, base.z + height),
    }
}

/// Bounds of the volume swept by `body` when it moves by `delta`.
///
/// Horizontally the box covers the feet sphere at both ends of the sweep. Vertically it runs from
/// the bottom of the lower feet sphere to the top of the higher head sphere (feet when there is
/// no head).
pub fn swept_body_aabb(body: &Body, delta: Vec3) -> Aabb {
    let lo = body.feet.center;
    let lo_end = lo + delta;
    let r_lo = body.feet.radius;

    let (hi, r_hi) = body
        .head
        .map_or((lo, r_lo), |head| (head.center, head.radius));
    let hi_end = hi + delta;

    Aabb {
        mins: Point3::new(
            lo.x.min(lo_end.x) - r_lo,
            lo.y.min(lo_end.y) - r_lo,
            lo.z.min(lo_end.z) - r_lo,
        ),
        maxs: Point3::new(
            lo.x.max(lo_end.x) + r_lo,
            lo.y.max(lo_end.y) + r_lo,
            hi.z.max(hi_end.z) + r_hi,
        ),
    }
}

/// Compute the union of two AABBs.
pub fn aabb_union(a: &Aabb, b: &Aabb) -> Aabb {
    Aabb {
        mins: a.mins.inf(&b.mins),
        maxs: a.maxs.sup(&b.maxs),
    }
}

/// Inflate an AABB by `margin` on all sides.
pub fn aabb_inflate(a: &Aabb, margin: f32) -> Aabb {
    if margin <= 0.0 {
        return *a;
    }
    let delta = Vec3::new(margin, margin, margin);
    Aabb {
        mins: a.mins - delta,
        maxs: a.maxs + delta,
    }
}

/// Test two AABBs for intersection. Touching boxes intersect.
#[inline]
pub fn aabb_intersects(a: &Aabb, b: &Aabb) -> bool {
    !(a.maxs.x < b.mins.x
        || a.mins.x > b.maxs.x
        || a.maxs.y < b.mins.y
        || a.mins.y > b.maxs.y
        || a.maxs.z < b.mins.z
        || a.mins.z > b.maxs.z)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::types::Sphere;
    use approx::assert_relative_eq;

    #[test]
    fn swept_bounds_cover_both_ends() {
        let body = Body::upright(Vec3::zeros(), 10.0, 100.0);
        let b = swept_body_aabb(&body, Vec3::new(50.0, -20.0, 0.0));
        assert_relative_eq!(b.mins, Point3::new(-10.0, -30.0, 1.0));
        assert_relative_eq!(b.maxs, Point3::new(60.0, 10.0, 99.0));
    }

    #[test]
    fn swept_bounds_without_head_use_feet() {
        let body = Body::feet_only(Sphere::new(Vec3::new(0.0, 0.0, 20.0), 5.0));
        let b = swept_body_aabb(&body, Vec3::new(0.0, 0.0, -10.0));
        assert_relative_eq!(b.mins.z, 5.0);
        assert_relative_eq!(b.maxs.z, 25.0);
    }

    #[test]
    fn sphere_bounds_match_radius() {
        let b = sphere_aabb(Vec3::new(1.0, 2.0, 3.0), 2.0);
        assert_relative_eq!(b.mins, Point3::new(-1.0, 0.0, 1.0));
        assert_relative_eq!(b.maxs, Point3::new(3.0, 4.0, 5.0));
    }

    #[test]
    fn intersection_counts_touching_boxes() {
        let a = cylinder_aabb(Vec3::zeros(), 10.0, 10.0);
        let b = cylinder_aabb(Vec3::new(20.0, 0.0, 0.0), 10.0, 10.0);
        let c = cylinder_aabb(Vec3::new(0.0, 0.0, 10.5), 10.0, 10.0);
        assert!(aabb_intersects(&a, &b));
        assert!(!aabb_intersects(&a, &c));
        assert!(aabb_intersects(&aabb_inflate(&a, 1.0), &c));
        let u = aabb_union(&a, &c);
        assert_relative_eq!(u.maxs.z, 20.5);
    }

    #[test]
    fn point_bounds() {
        let b = points_aabb(&[Vec3::new(1.0, 5.0, -2.0), Vec3::new(-3.0, 2.0, 4.0)]);
        assert_relative_eq!(b.mins, Point3::new(-3.0, 2.0, -2.0));
        assert_relative_eq!(b.maxs, Point3::new(1.0, 5.0, 4.0));
    }
}
