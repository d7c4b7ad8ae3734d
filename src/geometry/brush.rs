use log::trace;

use crate::common::{self, Point};
use crate::geometry::{intersect_planes, BrushFace, GeometryError, EPSILON};
use crate::qmap::Brush;

/// Fewest faces that can bound a solid.
pub const MIN_BRUSH_FACES: usize = 4;

/// Convex solid with explicit, wound face polygons.
#[derive(Debug, Clone, PartialEq)]
pub struct MapBrush {
    pub faces: Vec<BrushFace>,
    /// Factor between map units and the coordinates of `faces`. Tolerances
    /// are in map units.
    pub scale: f64,
}

impl Default for MapBrush {
    fn default() -> Self {
        Self {
            faces: Vec::new(),
            scale: 1.0,
        }
    }
}

impl MapBrush {
    /// Builds the polytope bounded by the brush's surfaces.
    pub fn build(brush: &Brush) -> Result<MapBrush, GeometryError> {
        Self::build_scaled(brush, 1.0)
    }

    /// Builds a brush whose points were read with `point_scale`. The solid
    /// is built in map units and scaled afterwards, so thin brushes survive
    /// small scales. A scale that is not a positive finite number counts
    /// as 1.
    pub fn build_scaled(
        brush: &Brush,
        point_scale: f64,
    ) -> Result<MapBrush, GeometryError> {
        if brush.faces.len() < MIN_BRUSH_FACES {
            return Err(GeometryError::TooFewFaces {
                faces: brush.faces.len(),
            });
        }

        let scale = if point_scale.is_finite() && point_scale > 0.0 {
            point_scale
        } else {
            1.0
        };

        let faces = brush
            .faces
            .iter()
            .enumerate()
            .map(|(face, surface)| -> Result<_, GeometryError> {
                let mut brush_face = BrushFace::from_surface(surface)
                    .ok_or(GeometryError::DegeneratePlane { face })?;
                brush_face.plane.dist /= scale;
                Ok(brush_face)
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut built = Self::from_faces(faces)?;
        built.rescale(scale);
        Ok(built)
    }

    /// Builds the polytope bounded by unbounded faces. Any vertices the
    /// faces already carry are kept and merged with the computed ones.
    pub fn from_faces(
        faces: Vec<BrushFace>,
    ) -> Result<MapBrush, GeometryError> {
        if faces.len() < MIN_BRUSH_FACES {
            return Err(GeometryError::TooFewFaces { faces: faces.len() });
        }

        let mut brush = MapBrush { faces, scale: 1.0 };
        brush.build_vertices()?;

        trace!(
            "Built brush with {} faces and {} vertices",
            brush.faces.len(),
            brush.vertices().len(),
        );

        Ok(brush)
    }

    fn build_vertices(&mut self) -> Result<(), GeometryError> {
        let count = self.faces.len();

        for i in 0..count {
            for j in (i + 1)..count {
                for k in (j + 1)..count {
                    let Some(vertex) = intersect_planes(
                        &self.faces[i].plane,
                        &self.faces[j].plane,
                        &self.faces[k].plane,
                    ) else {
                        continue;
                    };

                    if !self.contains(vertex) {
                        continue;
                    }

                    for index in [i, j, k] {
                        self.faces[index].add_vertex(vertex);
                    }
                }
            }
        }

        for (face, brush_face) in self.faces.iter().enumerate() {
            let vertices = brush_face.vertices.len();

            if vertices < 3 {
                return Err(GeometryError::TooFewVertices { face, vertices });
            }
        }

        for (face, brush_face) in self.faces.iter_mut().enumerate() {
            brush_face.sort_vertices().map_err(|e| e.at_face(face))?;
            brush_face.init_tex_coord_sys();
        }

        Ok(())
    }

    fn rescale(&mut self, factor: f64) {
        if factor == 1.0 {
            return;
        }

        for face in &mut self.faces {
            face.plane.dist *= factor;

            for vertex in &mut face.vertices {
                *vertex = common::scale(*vertex, factor);
            }
        }

        self.scale *= factor;
    }

    /// Whether the point is inside or on every face plane.
    pub fn contains(&self, point: Point) -> bool {
        let tolerance = EPSILON * self.scale;

        self.faces
            .iter()
            .all(|face| face.plane.distance_to(point) <= tolerance)
    }

    /// Distinct vertices over all faces, in first-seen order.
    pub fn vertices(&self) -> Vec<Point> {
        let tolerance = EPSILON * self.scale * self.scale;
        let mut merged: Vec<Point> = Vec::new();

        for &vertex in self.faces.iter().flat_map(|f| &f.vertices) {
            if !merged
                .iter()
                .any(|&v| common::distance_squared(v, vertex) < tolerance)
            {
                merged.push(vertex);
            }
        }

        merged
    }
}
