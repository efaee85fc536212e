use thiserror::Error;

use crate::pid::{DecorationId, FaceId, ModelId, SectorId};

/// Problems found while assembling level geometry.
///
/// The colliders assume well-formed data, so everything that can be checked up front is
/// checked when a level is built.
#[derive(Debug, Error, PartialEq)]
pub enum LevelError {
    #[error("face has {0} vertices, at least 3 are required")]
    TooFewVertices(usize),

    #[error("face normal is degenerate (zero-area polygon)")]
    DegenerateFace,

    #[error("{sector} references unknown {face}")]
    UnknownFace { sector: SectorId, face: FaceId },

    #[error("{sector} references unknown {decoration}")]
    UnknownDecoration {
        sector: SectorId,
        decoration: DecorationId,
    },

    #[error("{face} references unknown {sector}")]
    UnknownSector { face: FaceId, sector: SectorId },

    #[error("{face} is listed as a portal of {sector} but is not flagged as a portal")]
    NotAPortal { sector: SectorId, face: FaceId },

    #[error("portal {face} does not border {sector}")]
    PortalNotAdjacent { sector: SectorId, face: FaceId },

    #[error("{model} has {faces} faces, at most {max} are addressable")]
    TooManyModelFaces {
        model: ModelId,
        faces: usize,
        max: usize,
    },
}

/// Problems loading [`CollisionSettings`](crate::collision::settings::CollisionSettings).
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to parse collision settings: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid collision setting `{field}`: {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}
