use crate::common::{self, Point, Vec2, Vec3};
use crate::geometry::{GeometryError, Plane, EPSILON};
use crate::qmap::Surface;

/// Canonical projections as (reference normal, x axis, y axis), one per
/// principal direction. Opposite directions share their tangent pair.
pub const BASE_AXES: [[Vec3; 3]; 6] = [
    [[0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.0, -1.0, 0.0]],
    [[0.0, 0.0, -1.0], [1.0, 0.0, 0.0], [0.0, -1.0, 0.0]],
    [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, -1.0]],
    [[-1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, -1.0]],
    [[0.0, 1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, -1.0]],
    [[0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, -1.0]],
];

/// Texture projection basis chosen from [`BASE_AXES`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TexCoordSystem {
    pub index: usize,
    pub x_axis: Vec3,
    pub y_axis: Vec3,
}

impl Default for TexCoordSystem {
    fn default() -> Self {
        Self::from_index(0)
    }
}

impl TexCoordSystem {
    fn from_index(index: usize) -> Self {
        Self {
            index,
            x_axis: BASE_AXES[index][1],
            y_axis: BASE_AXES[index][2],
        }
    }
}

/// Basis whose reference normal lines up best with `normal`. On exact ties
/// the earliest entry of [`BASE_AXES`] wins.
pub fn select_tex_coord_sys(normal: Vec3) -> TexCoordSystem {
    let mut best_index = 0;
    let mut best_dot = 0.0;

    for (index, axes) in BASE_AXES.iter().enumerate() {
        let dot = common::dot(normal, axes[0]);

        if dot > best_dot {
            best_dot = dot;
            best_index = index;
        }
    }

    TexCoordSystem::from_index(best_index)
}

/// One bounded side of a built brush.
#[derive(Debug, Clone, PartialEq)]
pub struct BrushFace {
    pub plane: Plane,
    /// Empty when the face has no texture.
    pub texture: String,
    /// Clockwise as seen from outside the brush once built.
    pub vertices: Vec<Point>,
    pub tc_sys: TexCoordSystem,
    pub offset: Vec2,
    pub rotation: f64,
    pub scale: Vec2,
}

impl BrushFace {
    /// Unbounded face carrying the surface's plane and texture parameters.
    /// `None` if the surface points don't span a plane.
    pub fn from_surface(surface: &Surface) -> Option<BrushFace> {
        let [p1, p2, p3] = surface.half_space;
        let plane = Plane::from_points(p1, p2, p3)?;
        let base = surface.alignment.base();

        Some(BrushFace {
            plane,
            texture: surface.texture.clone(),
            vertices: Vec::new(),
            tc_sys: TexCoordSystem::default(),
            offset: base.offset,
            rotation: base.rotation,
            scale: base.scale,
        })
    }

    /// Records a vertex unless one already sits at (nearly) the same spot.
    /// Returns whether the vertex was added.
    pub fn add_vertex(&mut self, vertex: Point) -> bool {
        let known = self
            .vertices
            .iter()
            .any(|&v| common::distance_squared(v, vertex) < EPSILON);

        if !known {
            self.vertices.push(vertex);
        }

        !known
    }

    /// Orders the vertices counterclockwise around the plane normal by
    /// repeatedly picking the angularly closest vertex ahead of the current
    /// one. Errors name face 0; the owning brush renumbers them.
    pub fn sort_vertices(&mut self) -> Result<(), GeometryError> {
        let count = self.vertices.len();
        let center = common::centroid(&self.vertices);

        for i in 0..count.saturating_sub(2) {
            let current = self.vertices[i];
            let side_normal = common::normalized(common::cross(
                common::sub(center, current),
                self.plane.normal,
            ));
            let side = Plane {
                normal: side_normal,
                dist: common::dot(side_normal, current),
            };
            let from_center =
                common::normalized(common::sub(current, center));

            let mut best: Option<(usize, f64)> = None;

            for j in (i + 1)..count {
                let candidate = self.vertices[j];

                if side.distance_to(candidate) < -EPSILON {
                    continue;
                }

                let dot = common::dot(
                    from_center,
                    common::normalized(common::sub(candidate, center)),
                );

                if best.map_or(true, |(_, best_dot)| dot > best_dot) {
                    best = Some((j, dot));
                }
            }

            let (next, _) =
                best.ok_or(GeometryError::DegeneratePolygon { face: 0 })?;
            self.vertices.swap(i + 1, next);
        }

        Ok(())
    }

    /// Picks the projection basis from the normal of the first three sorted
    /// vertices, then flips the winding to clockwise seen from outside.
    pub fn init_tex_coord_sys(&mut self) {
        if self.vertices.len() < 3 {
            return;
        }

        let normal = common::normalized(common::cross(
            common::sub(self.vertices[1], self.vertices[0]),
            common::sub(self.vertices[2], self.vertices[0]),
        ));

        self.tc_sys = select_tex_coord_sys(normal);

        if common::dot(normal, normal) > EPSILON {
            self.vertices.reverse();
        }
    }

    /// Texture coordinates of a world position on a texture of the given
    /// size. A (near) zero scale component counts as 1.
    pub fn tex_coords(&self, pos: Point, width: f64, height: f64) -> Vec2 {
        let sx = guard_scale(self.scale[0]);
        let sy = guard_scale(self.scale[1]);

        [
            (common::dot(pos, common::scale(self.tc_sys.x_axis, 1.0 / sx))
                + self.offset[0])
                / width,
            (common::dot(pos, common::scale(self.tc_sys.y_axis, 1.0 / sy))
                + self.offset[1])
                / height,
        ]
    }

    /// Geometric normal from the current winding, or zero when there are
    /// fewer than 3 vertices.
    pub fn winding_normal(&self) -> Vec3 {
        match self.vertices.as_slice() {
            [a, b, c, ..] => common::normalized(common::cross(
                common::sub(*c, *a),
                common::sub(*b, *a),
            )),
            _ => [0.0; 3],
        }
    }
}

fn guard_scale(scale: f64) -> f64 {
    if scale.abs() < f64::from(f32::EPSILON) {
        1.0
    } else {
        scale
    }
}
