//! 16.16 fixpoint helpers.
//!
//! Time deltas handed to the collision core are fixpoint seconds, and some level data is
//! still authored in fixpoint. Everything inside the colliders runs on `f32`, so these
//! conversions sit at the boundary.

use crate::constants::FIXPOINT_SHIFT;

const ONE_F32: f32 = (1u32 << FIXPOINT_SHIFT) as f32;

/// A 16.16 fixpoint number.
#[derive(Default, Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Fixpoint(i32);

impl Fixpoint {
    pub const ZERO: Fixpoint = Fixpoint(0);
    pub const ONE: Fixpoint = Fixpoint(1 << FIXPOINT_SHIFT);

    #[inline]
    pub const fn from_raw(raw: i32) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn raw(self) -> i32 {
        self.0
    }

    /// Rounds `value` to the nearest representable fixpoint number, saturating at the
    /// `i32` range.
    #[inline]
    pub fn from_f32(value: f32) -> Self {
        let q = (value * ONE_F32).round();
        Self(q.clamp(i32::MIN as f32, i32::MAX as f32) as i32)
    }

    #[inline]
    pub fn to_f32(self) -> f32 {
        self.0 as f32 / ONE_F32
    }

    #[inline]
    pub fn is_zero(self) -> bool {
        self.0 == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn one_is_65536() {
        assert_eq!(Fixpoint::ONE.raw(), 65536);
        assert_relative_eq!(Fixpoint::ONE.to_f32(), 1.0);
    }

    #[test]
    fn from_f32_rounds_to_nearest() {
        assert_eq!(Fixpoint::from_f32(0.5).raw(), 32768);
        assert_eq!(Fixpoint::from_f32(-0.25).raw(), -16384);
        // Half a raw step rounds away from zero.
        assert_eq!(Fixpoint::from_f32(1.5 / 65536.0).raw(), 2);
    }

    #[test]
    fn from_f32_saturates() {
        assert_eq!(Fixpoint::from_f32(1.0e12).raw(), i32::MAX);
        assert_eq!(Fixpoint::from_f32(-1.0e12).raw(), i32::MIN);
    }
}
