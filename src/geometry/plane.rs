use crate::common::{self, Point, Vec3};

const PARALLEL_EPSILON: f64 = 1e-6;

/// Points `p` with `normal · p == dist`. The normal faces out of the solid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    pub normal: Vec3,
    pub dist: f64,
}

impl Plane {
    /// Plane through three points given clockwise as seen from the side the
    /// normal points to. `None` when the points are collinear.
    pub fn from_points(p1: Point, p2: Point, p3: Point) -> Option<Plane> {
        let normal = common::normalized(common::cross(
            common::sub(p3, p1),
            common::sub(p2, p1),
        ));

        if normal == [0.0; 3] {
            None
        } else {
            Some(Plane {
                normal,
                dist: common::dot(normal, p1),
            })
        }
    }

    /// Signed distance, positive in front of (outside) the plane.
    pub fn distance_to(&self, point: Point) -> f64 {
        common::dot(self.normal, point) - self.dist
    }
}

/// The single point shared by three planes, or `None` when two of them are
/// parallel.
pub fn intersect_planes(a: &Plane, b: &Plane, c: &Plane) -> Option<Point> {
    let bc = common::cross(b.normal, c.normal);
    let denom = common::dot(a.normal, bc);

    if denom.abs() < PARALLEL_EPSILON {
        return None;
    }

    let ca = common::cross(c.normal, a.normal);
    let ab = common::cross(a.normal, b.normal);

    let sum = common::add(
        common::scale(bc, a.dist),
        common::add(common::scale(ca, b.dist), common::scale(ab, c.dist)),
    );

    Some(common::scale(sum, 1.0 / denom))
}
