//! Geometry builders shared by the collider tests.

use crate::{
    bitmask_flags::FaceFlags,
    level::Face,
    pid::SectorId,
};

use super::types::Vec3;

/// Square face of half-size `half` centered at `center`, facing `normal`.
pub fn wall(center: Vec3, normal: Vec3, half: f32) -> Face {
    rect(center, normal, half, half)
}

/// Rectangle centered at `center` facing `normal`. `half_u` runs horizontally (along x for
/// floors and ceilings), `half_v` along the remaining axis.
pub fn rect(center: Vec3, normal: Vec3, half_u: f32, half_v: f32) -> Face {
    let u = if normal.z.abs() > 0.9 {
        Vec3::x()
    } else {
        Vec3::z().cross(&normal).normalize()
    };
    let v = normal.cross(&u);
    let vertices = vec![
        center - u * half_u - v * half_v,
        center + u * half_u - v * half_v,
        center + u * half_u + v * half_v,
        center - u * half_u + v * half_v,
    ];
    Face::new(vertices, FaceFlags::empty()).unwrap()
}

/// Same as [`wall`], attributed to `sector`.
pub fn wall_in(sector: u32, center: Vec3, normal: Vec3, half: f32) -> Face {
    wall(center, normal, half).in_sector(SectorId(sector))
}

/// Inward-facing floor, ceiling and four walls of the box `[min, max]`, attributed to `sector`.
///
/// Walls listed in `open` (`'x'` for the low-x wall, `'X'` for the high-x wall, likewise `y`
/// and `Y`) are left out so a portal can take their place.
pub fn box_room(sector: u32, min: Vec3, max: Vec3, open: &str) -> Vec<Face> {
    let c = (min + max) * 0.5;
    let h = (max - min) * 0.5;
    let mut faces = vec![
        rect(Vec3::new(c.x, c.y, min.z), Vec3::z(), h.x, h.y),
        rect(Vec3::new(c.x, c.y, max.z), -Vec3::z(), h.x, h.y),
    ];
    let walls = [
        ('x', Vec3::new(min.x, c.y, c.z), Vec3::x(), h.y),
        ('X', Vec3::new(max.x, c.y, c.z), -Vec3::x(), h.y),
        ('y', Vec3::new(c.x, min.y, c.z), Vec3::y(), h.x),
        ('Y', Vec3::new(c.x, max.y, c.z), -Vec3::y(), h.x),
    ];
    for (tag, center, normal, half_u) in walls {
        if !open.contains(tag) {
            faces.push(rect(center, normal, half_u, h.z));
        }
    }
    faces
        .into_iter()
        .map(|face| face.in_sector(SectorId(sector)))
        .collect()
}
