//! Rebuilds brushes from their bounding planes into explicit convex
//! polytopes: per-face vertices in winding order plus a texture projection
//! basis.

mod brush;
mod face;
mod plane;

pub use brush::{MapBrush, MIN_BRUSH_FACES};
pub use face::{select_tex_coord_sys, BrushFace, TexCoordSystem, BASE_AXES};
pub use plane::{intersect_planes, Plane};

use thiserror::Error;

/// Tolerance for half-space containment, vertex merging and winding side
/// tests.
pub const EPSILON: f64 = 1e-3;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeometryError {
    #[error("Brush has {faces} faces, at least 4 are needed")]
    TooFewFaces { faces: usize },
    #[error("Face {face} has no plane")]
    DegeneratePlane { face: usize },
    #[error("Face {face} has {vertices} vertices, at least 3 are needed")]
    TooFewVertices { face: usize, vertices: usize },
    #[error("Face {face} vertices do not wind into a polygon")]
    DegeneratePolygon { face: usize },
}

impl GeometryError {
    /// Same error, attributed to face `face` of its brush.
    pub(crate) fn at_face(self, face: usize) -> Self {
        match self {
            GeometryError::TooFewFaces { .. } => self,
            GeometryError::DegeneratePlane { .. } => {
                GeometryError::DegeneratePlane { face }
            }
            GeometryError::TooFewVertices { vertices, .. } => {
                GeometryError::TooFewVertices { face, vertices }
            }
            GeometryError::DegeneratePolygon { .. } => {
                GeometryError::DegeneratePolygon { face }
            }
        }
    }
}
