pub type Point = [f64; 3];
pub type Vec3 = [f64; 3];
pub type Vec2 = [f64; 2];

pub fn add(a: Vec3, b: Vec3) -> Vec3 {
    [a[0] + b[0], a[1] + b[1], a[2] + b[2]]
}

pub fn sub(a: Vec3, b: Vec3) -> Vec3 {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

pub fn scale(v: Vec3, factor: f64) -> Vec3 {
    [v[0] * factor, v[1] * factor, v[2] * factor]
}

pub fn dot(a: Vec3, b: Vec3) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

pub fn cross(a: Vec3, b: Vec3) -> Vec3 {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

pub fn length(v: Vec3) -> f64 {
    dot(v, v).sqrt()
}

/// Unit vector in the direction of `v`, or the zero vector when `v` has no
/// length.
pub fn normalized(v: Vec3) -> Vec3 {
    let len = length(v);

    if len > 0.0 {
        scale(v, 1.0 / len)
    } else {
        [0.0; 3]
    }
}

pub fn distance_squared(a: Point, b: Point) -> f64 {
    let d = sub(a, b);
    dot(d, d)
}

pub fn centroid(points: &[Point]) -> Point {
    let sum = points.iter().fold([0.0; 3], |acc, &p| add(acc, p));

    if points.is_empty() {
        sum
    } else {
        scale(sum, 1.0 / points.len() as f64)
    }
}
