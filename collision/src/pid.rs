//! Object identifiers used by the collision core.
//!
//! Every kind of collidable thing gets its own id newtype, so a face id can never be handed
//! to a function expecting a decoration id. [`HitTarget`] is the tagged "what did we run
//! into" value recorded on the collision state.
//!
//! # Packed pid
//! Gameplay code that stores a single integer per object reference can use [`Pid`], which
//! packs an [`ObjectKind`] tag and an id into a `u32`:
//!
//! - bits 0..=2  : `ObjectKind` tag
//! - bits 3..=31 : object id
//!
//! Outdoor model faces additionally pack `face | model << 6` into the id part.
//!
//! # Compatibility
//! Treat the bit layout as a storage format. The tag values must not be reordered.

use std::fmt;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(pub u32);

        impl $name {
            #[inline]
            pub const fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl From<usize> for $name {
            #[inline]
            fn from(index: usize) -> Self {
                Self(index as u32)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }
    };
}

define_id!(
    /// Index of a face, either in an indoor level or inside one outdoor model.
    FaceId
);
define_id!(
    /// Index of an indoor sector.
    SectorId
);
define_id!(
    /// Index of an outdoor BSP model.
    ModelId
);
define_id!(
    /// Index of a level decoration.
    DecorationId
);
define_id!(
    /// Index into the actor registry.
    ActorId
);
define_id!(
    /// Index into the sprite-object registry.
    SpriteObjectId
);

/// What a collider ran into.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum HitTarget {
    /// An indoor face.
    Face(FaceId),
    /// A face of an outdoor model.
    ModelFace { model: ModelId, face: FaceId },
    Decoration(DecorationId),
    Actor(ActorId),
    SpriteObject(SpriteObjectId),
    Party,
}

impl HitTarget {
    /// Converts this target to its packed [`Pid`].
    pub fn pid(self) -> Pid {
        match self {
            HitTarget::Face(face) => pack_pid(ObjectKind::Face, face.0),
            HitTarget::ModelFace { model, face } => {
                pack_pid(ObjectKind::Face, face.0 | (model.0 << MODEL_FACE_BITS))
            }
            HitTarget::Decoration(id) => pack_pid(ObjectKind::Decoration, id.0),
            HitTarget::Actor(id) => pack_pid(ObjectKind::Actor, id.0),
            HitTarget::SpriteObject(id) => pack_pid(ObjectKind::SpriteObject, id.0),
            HitTarget::Party => pack_pid(ObjectKind::Party, 0),
        }
    }

    /// Target referenced by a packed [`Pid`].
    ///
    /// Indoor and outdoor faces share a tag, so `outdoor` says how to read a face id.
    /// `ObjectKind::None` and unknown tags give `None`.
    pub fn from_pid(pid: Pid, outdoor: bool) -> Option<HitTarget> {
        let id = unpack_pid_id(pid);
        let target = match try_unpack_pid_kind(pid)? {
            ObjectKind::None => return None,
            ObjectKind::SpriteObject => HitTarget::SpriteObject(SpriteObjectId(id)),
            ObjectKind::Actor => HitTarget::Actor(ActorId(id)),
            ObjectKind::Party => HitTarget::Party,
            ObjectKind::Decoration => HitTarget::Decoration(DecorationId(id)),
            ObjectKind::Face if outdoor => {
                let (model, face) = split_model_face(id);
                HitTarget::ModelFace { model, face }
            }
            ObjectKind::Face => HitTarget::Face(FaceId(id)),
        };
        Some(target)
    }

    /// The face id of a face hit, indoor or outdoor.
    pub fn face(self) -> Option<FaceId> {
        match self {
            HitTarget::Face(face) | HitTarget::ModelFace { face, .. } => Some(face),
            _ => None,
        }
    }
}

/// Packed object reference: `id << 3 | kind`.
pub type Pid = u32;

const KIND_BITS: u32 = 3;
const KIND_MASK: u32 = (1 << KIND_BITS) - 1;
const MODEL_FACE_BITS: u32 = 6;

/// Largest id that fits in a [`Pid`].
pub const MAX_PID_ID: u32 = u32::MAX >> KIND_BITS;

/// Discriminator for the kind of object referenced by a [`Pid`].
///
/// The numeric values are part of the packed format. Do not reorder or reuse values.
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ObjectKind {
    None = 0,
    SpriteObject = 2,
    Actor = 3,
    Party = 4,
    Decoration = 5,
    Face = 6,
}

/// Packs an [`ObjectKind`] and an id into a [`Pid`].
///
/// # Panics
/// Panics if `id` does not fit in the 29 id bits.
pub fn pack_pid(kind: ObjectKind, id: u32) -> Pid {
    assert!(id <= MAX_PID_ID, "pid id {id} does not fit in {} bits", 32 - KIND_BITS);
    (id << KIND_BITS) | kind as u32
}

/// Safely extracts the [`ObjectKind`] from a [`Pid`].
///
/// Returns `None` if the tag is unknown.
pub fn try_unpack_pid_kind(pid: Pid) -> Option<ObjectKind> {
    match pid & KIND_MASK {
        0 => Some(ObjectKind::None),
        2 => Some(ObjectKind::SpriteObject),
        3 => Some(ObjectKind::Actor),
        4 => Some(ObjectKind::Party),
        5 => Some(ObjectKind::Decoration),
        6 => Some(ObjectKind::Face),
        _ => None,
    }
}

/// Extracts the id part of a [`Pid`].
///
/// Note: this does not validate the kind tag.
pub fn unpack_pid_id(pid: Pid) -> u32 {
    pid >> KIND_BITS
}

/// Splits the id part of an outdoor face pid into `(model, face)`.
pub fn split_model_face(id: u32) -> (ModelId, FaceId) {
    (
        ModelId(id >> MODEL_FACE_BITS),
        FaceId(id & ((1 << MODEL_FACE_BITS) - 1)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pack_unpacks_id_and_kind() {
        let ids: [u32; 5] = [0, 1, 42, 1337, MAX_PID_ID];
        let kinds = [
            ObjectKind::SpriteObject,
            ObjectKind::Actor,
            ObjectKind::Decoration,
            ObjectKind::Face,
        ];

        for &id in &ids {
            for &kind in &kinds {
                let pid = pack_pid(kind, id);
                assert_eq!(unpack_pid_id(pid), id);
                assert_eq!(try_unpack_pid_kind(pid), Some(kind));
            }
        }
    }

    #[test]
    fn pack_places_kind_in_low_three_bits() {
        assert_eq!(pack_pid(ObjectKind::Face, 5), (5 << 3) | 6);
        assert_eq!(HitTarget::Party.pid(), 4);
    }

    #[test]
    fn unknown_kind_tags_are_rejected() {
        assert_eq!(try_unpack_pid_kind((9 << 3) | 1), None);
        assert_eq!(try_unpack_pid_kind((9 << 3) | 7), None);
    }

    #[test]
    #[should_panic(expected = "does not fit")]
    fn pack_panics_on_oversized_id() {
        let _ = pack_pid(ObjectKind::Actor, MAX_PID_ID + 1);
    }

    #[test]
    fn model_faces_pack_model_above_face() {
        let target = HitTarget::ModelFace {
            model: ModelId(3),
            face: FaceId(17),
        };
        let pid = target.pid();
        assert_eq!(try_unpack_pid_kind(pid), Some(ObjectKind::Face));
        assert_eq!(split_model_face(unpack_pid_id(pid)), (ModelId(3), FaceId(17)));
        assert_eq!(target.face(), Some(FaceId(17)));
        assert_eq!(HitTarget::from_pid(pid, true), Some(target));
        assert_eq!(
            HitTarget::from_pid(pid, false),
            Some(HitTarget::Face(FaceId(17 | 3 << 6)))
        );
    }

    #[test]
    fn empty_pid_is_no_target() {
        assert_eq!(HitTarget::from_pid(pack_pid(ObjectKind::None, 0), false), None);
        assert_eq!(HitTarget::from_pid((9 << 3) | 7, false), None);
        let actor = HitTarget::Actor(ActorId(12));
        assert_eq!(HitTarget::from_pid(actor.pid(), false), Some(actor));
    }
}
