//! Trigonometric lookup table over integer angles.
//!
//! Headings are stored as integer angles with `ANGLE_UNITS_PER_TURN` units per full turn.
//! The table is built once and cached with `OnceLock`; it is never mutated afterwards, so it
//! can be read from any thread.

use std::{f32::consts::TAU, sync::OnceLock};

use crate::{collision::Vec3, constants::ANGLE_UNITS_PER_TURN};

const ANGLE_MASK: i32 = ANGLE_UNITS_PER_TURN - 1;

static TRIG_LUT: OnceLock<TrigLut> = OnceLock::new();

/// Sine/cosine table with one entry per angle unit.
pub struct TrigLut {
    sin: Vec<f32>,
}

impl TrigLut {
    fn build() -> Self {
        let sin = (0..ANGLE_UNITS_PER_TURN)
            .map(|i| (i as f32 * TAU / ANGLE_UNITS_PER_TURN as f32).sin())
            .collect();
        Self { sin }
    }

    /// Sine of an integer angle. Any angle is accepted; it is wrapped into one turn.
    #[inline]
    pub fn sin(&self, angle: i32) -> f32 {
        self.sin[(angle & ANGLE_MASK) as usize]
    }

    #[inline]
    pub fn cos(&self, angle: i32) -> f32 {
        self.sin(angle + ANGLE_UNITS_PER_TURN / 4)
    }

    /// Integer angle of the vector `(x, y)`, in `[0, ANGLE_UNITS_PER_TURN)`.
    pub fn atan2(&self, x: f32, y: f32) -> i32 {
        let radians = y.atan2(x);
        let units = (radians / TAU * ANGLE_UNITS_PER_TURN as f32).round() as i32;
        units & ANGLE_MASK
    }
}

/// Return the process-wide lookup table.
pub fn trig_lut() -> &'static TrigLut {
    TRIG_LUT.get_or_init(TrigLut::build)
}

/// Build a vector of the given `length` from an integer yaw (around +Z, 0 = +X) and
/// pitch (0 = horizontal, positive = up).
pub fn vec_from_polar(length: f32, yaw: i32, pitch: i32) -> Vec3 {
    let lut = trig_lut();
    let cos_pitch = lut.cos(pitch);
    Vec3::new(
        lut.cos(yaw) * cos_pitch * length,
        lut.sin(yaw) * cos_pitch * length,
        lut.sin(pitch) * length,
    )
}

/// Integer yaw of the horizontal part of `v`, or `None` if `v` has no horizontal extent.
pub fn yaw_from_xy(v: Vec3) -> Option<i32> {
    if v.x * v.x + v.y * v.y > 1.0e-12 {
        return Some(trig_lut().atan2(v.x, v.y));
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const QUARTER: i32 = ANGLE_UNITS_PER_TURN / 4;

    #[test]
    fn cardinal_angles() {
        let lut = trig_lut();
        assert_relative_eq!(lut.sin(0), 0.0);
        assert_relative_eq!(lut.cos(0), 1.0);
        assert_relative_eq!(lut.sin(QUARTER), 1.0);
        assert_relative_eq!(lut.cos(QUARTER * 2), -1.0, epsilon = 1.0e-6);
    }

    #[test]
    fn angles_wrap() {
        let lut = trig_lut();
        assert_relative_eq!(lut.sin(QUARTER + ANGLE_UNITS_PER_TURN), lut.sin(QUARTER));
        assert_relative_eq!(lut.sin(-QUARTER), -1.0, epsilon = 1.0e-6);
    }

    #[test]
    fn atan2_inverts_polar() {
        for yaw in [0, 100, QUARTER, 1000, 1500, 2047] {
            let v = vec_from_polar(10.0, yaw, 0);
            assert_eq!(yaw_from_xy(v), Some(yaw));
        }
    }

    #[test]
    fn polar_length_and_pitch() {
        let v = vec_from_polar(5.0, 300, 200);
        assert_relative_eq!(v.norm(), 5.0, epsilon = 1.0e-4);

        let straight_up = vec_from_polar(2.0, 0, QUARTER);
        assert_relative_eq!(straight_up, Vec3::new(0.0, 0.0, 2.0), epsilon = 1.0e-6);
        assert_eq!(yaw_from_xy(straight_up), None);
    }
}
