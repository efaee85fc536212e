//! Level geometry consumed by the colliders.
//!
//! These are canonical, loader-agnostic definitions: whatever reads the level files maps its
//! rows to [`Face`], [`Sector`], [`Decoration`] and [`BspModel`], then builds an
//! [`IndoorLevel`] or [`OutdoorLevel`]. Both builders validate cross references once, so the
//! colliders can index freely afterwards.
//!
//! Conventions
//! - z is up.
//! - Face vertices are wound counter-clockwise when seen from the front; the plane normal
//!   points to the front.
//! - Walls, floors and ceilings face into the sector that owns them.
//! - A portal face's normal points into its front `sector`; `back_sector` is the other side.
//! - Level data is immutable once built.

use std::collections::HashMap;

use nalgebra as na;

use crate::{
    bitmask_flags::{DecorationFlag, DecorationFlags, FaceFlag, FaceFlags},
    cell::{GridCell, cells_in_rect, grid_cell_for},
    collision::{
        broad::{aabb_union, points_aabb},
        types::{Aabb, Plane, Vec3},
    },
    error::LevelError,
    pid::{DecorationId, FaceId, ModelId, SectorId},
};

/// Most faces a single outdoor model may have; face ids share a packed pid with the model id.
pub const MAX_MODEL_FACES: usize = 64;

/// A planar polygon of level geometry.
#[derive(Clone, Debug)]
pub struct Face {
    pub vertices: Vec<Vec3>,
    pub plane: Plane,
    pub bounding: Aabb,
    pub flags: FaceFlags,
    /// Sector this face belongs to (front side for portals).
    pub sector: SectorId,
    /// Sector on the back side of a portal.
    pub back_sector: Option<SectorId>,
}

impl Face {
    /// Build a face from its polygon. The plane is derived with Newell's method, so slightly
    /// non-planar polygons still get a sensible normal.
    pub fn new(vertices: Vec<Vec3>, flags: FaceFlags) -> Result<Self, LevelError> {
        if vertices.len() < 3 {
            return Err(LevelError::TooFewVertices(vertices.len()));
        }

        let mut normal = Vec3::zeros();
        let mut centroid = Vec3::zeros();
        for (i, a) in vertices.iter().enumerate() {
            let b = &vertices[(i + 1) % vertices.len()];
            normal.x += (a.y - b.y) * (a.z + b.z);
            normal.y += (a.z - b.z) * (a.x + b.x);
            normal.z += (a.x - b.x) * (a.y + b.y);
            centroid += a;
        }
        centroid /= vertices.len() as f32;

        let len = normal.norm();
        if !(len > 1.0e-6) {
            return Err(LevelError::DegenerateFace);
        }
        let normal = normal / len;

        Ok(Self {
            bounding: points_aabb(&vertices),
            plane: Plane::from_point_normal(centroid, normal),
            vertices,
            flags,
            sector: SectorId(0),
            back_sector: None,
        })
    }

    /// Attribute this face to `sector`.
    pub fn in_sector(mut self, sector: SectorId) -> Self {
        self.sector = sector;
        self
    }

    /// Turn this face into a portal from its front `sector` to `back`.
    pub fn portal_to(mut self, back: SectorId) -> Self {
        self.flags.add(FaceFlag::Portal);
        self.back_sector = Some(back);
        self
    }

    #[inline]
    pub fn is_portal(&self) -> bool {
        self.flags.has(FaceFlag::Portal)
    }

    #[inline]
    pub fn is_ethereal(&self) -> bool {
        self.flags.has(FaceFlag::Ethereal)
    }

    #[inline]
    pub fn is_floor(&self) -> bool {
        self.flags.has(FaceFlag::Floor)
    }

    /// Faces that never take part in collision, whatever the ethereal policy.
    #[inline]
    pub fn is_untouchable(&self) -> bool {
        self.flags.has(FaceFlag::Untouchable)
    }

    /// The sector on the other side of this portal, seen from `from`.
    pub fn other_side(&self, from: SectorId) -> Option<SectorId> {
        let back = self.back_sector?;
        if self.sector == from {
            Some(back)
        } else if back == from {
            Some(self.sector)
        } else {
            None
        }
    }
}

/// An indoor room: the faces bounding it, its portals, and the decorations inside it.
#[derive(Clone, Debug, Default)]
pub struct Sector {
    /// Floors, walls and ceilings.
    pub faces: Vec<FaceId>,
    pub portals: Vec<FaceId>,
    pub decorations: Vec<DecorationId>,
}

/// A static prop collided with as a vertical cylinder.
#[derive(Clone, Debug)]
pub struct Decoration {
    /// Bottom center.
    pub position: Vec3,
    pub radius: f32,
    pub height: f32,
    pub flags: DecorationFlags,
}

impl Decoration {
    pub fn new(position: Vec3, radius: f32, height: f32) -> Self {
        Self {
            position,
            radius,
            height,
            flags: DecorationFlags::empty(),
        }
    }

    #[inline]
    pub fn blocks_movement(&self) -> bool {
        !self
            .flags
            .has_any(&[DecorationFlag::NoBlockMovement, DecorationFlag::Invisible])
    }
}

/// Indoor level: faces, sectors and decorations, cross-checked on construction.
#[derive(Clone, Debug)]
pub struct IndoorLevel {
    faces: Vec<Face>,
    sectors: Vec<Sector>,
    decorations: Vec<Decoration>,
}

impl IndoorLevel {
    pub fn new(
        faces: Vec<Face>,
        sectors: Vec<Sector>,
        decorations: Vec<Decoration>,
    ) -> Result<Self, LevelError> {
        for (i, face) in faces.iter().enumerate() {
            let face_id = FaceId::from(i);
            for sector in std::iter::once(face.sector).chain(face.back_sector) {
                if sector.index() >= sectors.len() {
                    return Err(LevelError::UnknownSector {
                        face: face_id,
                        sector,
                    });
                }
            }
        }

        for (i, sector) in sectors.iter().enumerate() {
            let sector_id = SectorId::from(i);
            for &face in sector.faces.iter().chain(&sector.portals) {
                if face.index() >= faces.len() {
                    return Err(LevelError::UnknownFace {
                        sector: sector_id,
                        face,
                    });
                }
            }
            for &face in &sector.portals {
                let portal = &faces[face.index()];
                if !portal.is_portal() {
                    return Err(LevelError::NotAPortal {
                        sector: sector_id,
                        face,
                    });
                }
                if portal.other_side(sector_id).is_none() {
                    return Err(LevelError::PortalNotAdjacent {
                        sector: sector_id,
                        face,
                    });
                }
            }
            for &decoration in &sector.decorations {
                if decoration.index() >= decorations.len() {
                    return Err(LevelError::UnknownDecoration {
                        sector: sector_id,
                        decoration,
                    });
                }
            }
        }

        log::debug!(
            "built indoor level: {} faces, {} sectors, {} decorations",
            faces.len(),
            sectors.len(),
            decorations.len()
        );

        Ok(Self {
            faces,
            sectors,
            decorations,
        })
    }

    #[inline]
    pub fn face(&self, id: FaceId) -> &Face {
        &self.faces[id.index()]
    }

    #[inline]
    pub fn sector(&self, id: SectorId) -> &Sector {
        &self.sectors[id.index()]
    }

    #[inline]
    pub fn decoration(&self, id: DecorationId) -> &Decoration {
        &self.decorations[id.index()]
    }

    pub fn sector_count(&self) -> usize {
        self.sectors.len()
    }
}

/// A static outdoor model (building, bridge, ...), a bag of faces with a common bound.
#[derive(Clone, Debug)]
pub struct BspModel {
    pub faces: Vec<Face>,
    pub bounding: Aabb,
}

impl BspModel {
    pub fn new(faces: Vec<Face>) -> Self {
        let bounding = faces
            .iter()
            .map(|face| face.bounding)
            .reduce(|a, b| aabb_union(&a, &b))
            .unwrap_or(Aabb {
                mins: na::Point3::origin(),
                maxs: na::Point3::origin(),
            });
        Self { faces, bounding }
    }
}

/// Models and decorations bucketed per grid cell.
#[derive(Clone, Debug, Default)]
pub struct CellContents {
    pub models: Vec<ModelId>,
    pub decorations: Vec<DecorationId>,
}

/// Broad-phase index of the outdoor level.
#[derive(Clone, Debug, Default)]
pub struct OutdoorGrid {
    cells: HashMap<GridCell, CellContents>,
}

impl OutdoorGrid {
    /// Contents of one cell; cells with nothing in them (or off the grid) are `None`.
    #[inline]
    pub fn cell(&self, cell: GridCell) -> Option<&CellContents> {
        self.cells.get(&cell)
    }

    fn entry(&mut self, cell: GridCell) -> &mut CellContents {
        self.cells.entry(cell).or_default()
    }
}

/// Outdoor level: models and decorations with their grid index.
#[derive(Clone, Debug)]
pub struct OutdoorLevel {
    models: Vec<BspModel>,
    decorations: Vec<Decoration>,
    grid: OutdoorGrid,
}

impl OutdoorLevel {
    pub fn new(models: Vec<BspModel>, decorations: Vec<Decoration>) -> Result<Self, LevelError> {
        let mut grid = OutdoorGrid::default();

        for (i, model) in models.iter().enumerate() {
            let model_id = ModelId::from(i);
            if model.faces.len() > MAX_MODEL_FACES {
                return Err(LevelError::TooManyModelFaces {
                    model: model_id,
                    faces: model.faces.len(),
                    max: MAX_MODEL_FACES,
                });
            }
            let b = &model.bounding;
            for cell in cells_in_rect((b.mins.x, b.mins.y), (b.maxs.x, b.maxs.y)) {
                grid.entry(cell).models.push(model_id);
            }
        }

        for (i, decoration) in decorations.iter().enumerate() {
            let cell = grid_cell_for(decoration.position.x, decoration.position.y);
            grid.entry(cell).decorations.push(DecorationId::from(i));
        }

        log::debug!(
            "built outdoor level: {} models, {} decorations, {} occupied cells",
            models.len(),
            decorations.len(),
            grid.cells.len()
        );

        Ok(Self {
            models,
            decorations,
            grid,
        })
    }

    #[inline]
    pub fn model(&self, id: ModelId) -> &BspModel {
        &self.models[id.index()]
    }

    #[inline]
    pub fn decoration(&self, id: DecorationId) -> &Decoration {
        &self.decorations[id.index()]
    }

    #[inline]
    pub fn grid(&self) -> &OutdoorGrid {
        &self.grid
    }
}
