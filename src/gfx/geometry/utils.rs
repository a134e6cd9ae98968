//! Pure vector, plane and line helpers.
//!
//! Everything here works on `cgmath` value types and keeps no state.

use std::f32::consts::PI;

use cgmath::{InnerSpace, Quaternion, Vector2, Vector3, Zero};

/// Tolerance used by the predicates in this module.
pub const EPSILON: f32 = 1e-6;

/// Whether `a` and `b` are perpendicular up to numerical precision.
pub fn are_perpendicular(a: Vector3<f32>, b: Vector3<f32>) -> bool {
    a.dot(b).abs() < EPSILON * a.magnitude2().min(b.magnitude2())
}

/// Whether all points lie in a common plane.
pub fn are_planar(verts: &[Vector3<f32>]) -> bool {
    if verts.len() <= 3 {
        return true;
    }
    let v0 = verts[1] - verts[0];
    let v1 = verts[2] - verts[0];
    let mut n = v0.cross(v1);
    for p in &verts[3..] {
        let v = *p - verts[0];
        if n.magnitude2() == 0.0 {
            // The first three points were collinear
            n = v0.cross(v);
            continue;
        }
        if v.magnitude2() == 0.0 {
            continue;
        }
        if v.normalize().dot(n.normalize()).abs() > 1e-4 {
            return false;
        }
    }
    true
}

/// Whether the points, in order, form a convex planar polygon.
pub fn are_2d_convex(verts: &[Vector3<f32>]) -> bool {
    if verts.len() <= 3 {
        return true;
    }
    if !are_planar(verts) {
        return false;
    }
    let n = verts.len();
    let mut last: Option<Vector3<f32>> = None;
    for i in 0..n {
        let a = verts[i];
        let b = verts[(i + 1) % n];
        let c = verts[(i + 2) % n];
        let cross = (b - a).cross(c - b);
        if let Some(prev) = last {
            if cross.dot(prev) < 0.0 {
                return false;
            }
        }
        if cross.magnitude2() > 0.0 {
            last = Some(cross);
        }
    }
    true
}

/// Unit normal of a planar polygon, skipping leading collinear triples.
/// `None` if every triple is collinear.
pub fn face_normal(verts: &[Vector3<f32>]) -> Option<Vector3<f32>> {
    for i in 2..verts.len() {
        let v1 = verts[i - 1] - verts[0];
        let v2 = verts[i] - verts[0];
        let n = v1.cross(v2);
        if n.magnitude2() > 0.0 {
            return Some(n.normalize());
        }
    }
    None
}

/// Area-weighted (unnormalized) normal of a polygon: the sum of the fan
/// cross products from the first vertex. Zero for degenerate polygons.
pub fn area_normal(verts: &[Vector3<f32>]) -> Vector3<f32> {
    let mut sum = Vector3::zero();
    for i in 2..verts.len() {
        sum += (verts[i - 1] - verts[0]).cross(verts[i] - verts[0]);
    }
    sum
}

/// Area of a planar polygon.
pub fn polygon_area(verts: &[Vector3<f32>]) -> f32 {
    if verts.len() < 3 {
        return 0.0;
    }
    (2..verts.len())
        .map(|i| 0.5 * (verts[i - 1] - verts[0]).cross(verts[i] - verts[0]).magnitude())
        .sum()
}

pub fn triangle_area(a: Vector3<f32>, b: Vector3<f32>, c: Vector3<f32>) -> f32 {
    0.5 * (b - a).cross(c - a).magnitude()
}

/// Angle between `ab` and `ac` in degrees, or `None` if either has zero length.
pub fn angle_between(a: Vector3<f32>, b: Vector3<f32>, c: Vector3<f32>) -> Option<f32> {
    let ab = b - a;
    let ac = c - a;
    let denom = ab.magnitude() * ac.magnitude();
    if denom == 0.0 {
        return None;
    }
    Some((ab.dot(ac) / denom).clamp(-1.0, 1.0).acos().to_degrees())
}

/// Projection of `u` onto `v`; zero when `v` is zero.
pub fn project_vector(u: Vector3<f32>, v: Vector3<f32>) -> Vector3<f32> {
    let vv = v.magnitude2();
    if vv == 0.0 {
        return Vector3::zero();
    }
    v * (u.dot(v) / vv)
}

/// Component of `u` perpendicular to `v`; zero when `v` is zero.
pub fn project_perp_vector(u: Vector3<f32>, v: Vector3<f32>) -> Vector3<f32> {
    if v.magnitude2() == 0.0 {
        return Vector3::zero();
    }
    u - project_vector(u, v)
}

/// Side of the plane through `a`, `b`, `c` (CCW normal) that `d` is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaneSide {
    Above,
    Below,
    On,
    /// `a`, `b`, `c` do not span a plane
    Degenerate,
}

pub fn above_or_below(
    a: Vector3<f32>,
    b: Vector3<f32>,
    c: Vector3<f32>,
    d: Vector3<f32>,
) -> PlaneSide {
    let n = (b - a).cross(c - a);
    if n.magnitude2() == 0.0 {
        return PlaneSide::Degenerate;
    }
    let side = n.dot(d - a);
    if side > 0.0 {
        PlaneSide::Above
    } else if side < 0.0 {
        PlaneSide::Below
    } else {
        PlaneSide::On
    }
}

/// Barycentric coordinates of `p` with respect to triangle `abc`.
///
/// Returns zero if `p` is outside the triangle. For a zero-area triangle the
/// result is `(1, 0, 0)` when `p` coincides with `a` and zero otherwise.
pub fn barycentric_coords(
    a: Vector3<f32>,
    b: Vector3<f32>,
    c: Vector3<f32>,
    p: Vector3<f32>,
) -> Vector3<f32> {
    let area = triangle_area(a, b, c);
    if area == 0.0 {
        let d = p - a;
        if d.x.abs() < EPSILON && d.y.abs() < EPSILON && d.z.abs() < EPSILON {
            return Vector3::new(1.0, 0.0, 0.0);
        }
        return Vector3::zero();
    }
    let alpha = triangle_area(b, c, p) / area;
    let beta = triangle_area(a, c, p) / area;
    let gamma = triangle_area(a, b, p) / area;
    let sum = alpha + beta + gamma;
    if (sum - 1.0).abs() <= 5e-4 {
        Vector3::new(alpha, beta, gamma)
    } else {
        Vector3::zero()
    }
}

/// Parameter `t` at which the ray `p0 + t v` hits triangle `abc`, if it does
/// so in front of `p0`.
pub fn ray_intersect_triangle(
    p0: Vector3<f32>,
    v: Vector3<f32>,
    a: Vector3<f32>,
    b: Vector3<f32>,
    c: Vector3<f32>,
) -> Option<f32> {
    let e1 = b - a;
    let e2 = c - a;
    let h = v.cross(e2);
    let det = e1.dot(h);
    if det.abs() < EPSILON {
        return None;
    }
    let inv = 1.0 / det;
    let s = p0 - a;
    let u = inv * s.dot(h);
    if !(0.0..=1.0).contains(&u) {
        return None;
    }
    let q = s.cross(e1);
    let w = inv * v.dot(q);
    if w < 0.0 || u + w > 1.0 {
        return None;
    }
    let t = inv * e2.dot(q);
    (t >= 0.0).then_some(t)
}

/// Smallest non-negative `t` at which the ray `p0 + t v` hits the sphere.
pub fn ray_intersect_sphere(
    p0: Vector3<f32>,
    v: Vector3<f32>,
    center: Vector3<f32>,
    radius: f32,
) -> Option<f32> {
    let a = v.magnitude2();
    if a == 0.0 {
        return None;
    }
    let d = p0 - center;
    let b = 2.0 * v.dot(d);
    let c = d.magnitude2() - radius * radius;
    let disc = b * b - 4.0 * a * c;
    if disc < 0.0 {
        return None;
    }
    let root = disc.sqrt();
    let t0 = (-b - root) / (2.0 * a);
    let t1 = (-b + root) / (2.0 * a);
    if t0 >= 0.0 {
        Some(t0)
    } else if t1 >= 0.0 {
        Some(t1)
    } else {
        None
    }
}

/// An infinite plane through `p0` with unit normal `n`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane3D {
    pub p0: Vector3<f32>,
    pub n: Vector3<f32>,
    /// Offset in the implicit equation `n . x + d = 0`
    pub d: f32,
}

impl Plane3D {
    pub fn new(p0: Vector3<f32>, n: Vector3<f32>) -> Self {
        let n = n.normalize();
        Self {
            p0,
            n,
            d: -p0.dot(n),
        }
    }

    /// Plane satisfying `Ax + By + Cz + D = 0`.
    pub fn from_equation(a: f32, b: f32, c: f32, d: f32) -> Self {
        let n = Vector3::new(a, b, c);
        let p0 = n * (-d / n.magnitude2());
        Self::new(p0, n)
    }

    /// Signed distance from `p` to the plane.
    pub fn dist_from_plane(&self, p: Vector3<f32>) -> f32 {
        self.n.dot(p) + self.d
    }
}

/// Intersection of two lines `P0 + t V0 = P1 + s V1`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineIntersection {
    pub t: f32,
    pub s: f32,
    pub p: Vector3<f32>,
}

/// A line through `p0` with direction `v`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Line3D {
    pub p0: Vector3<f32>,
    pub v: Vector3<f32>,
}

impl Line3D {
    pub fn new(p0: Vector3<f32>, v: Vector3<f32>) -> Self {
        Self { p0, v }
    }

    /// Parameter and point where the line crosses `plane`, or `None` when
    /// the line is parallel to it.
    pub fn intersect_plane(&self, plane: &Plane3D) -> Option<(f32, Vector3<f32>)> {
        if are_perpendicular(plane.n, self.v) {
            return None;
        }
        let t = (plane.p0.dot(plane.n) - plane.n.dot(self.p0)) / plane.n.dot(self.v);
        Some((t, self.p0 + self.v * t))
    }

    /// Solves `P0 + t V0 = P1 + s V1` with Cramer's rule on the x+z and y+z
    /// combinations of the component equations. `None` only when that 2x2
    /// system is singular. Skew lines are not detected: the result then
    /// satisfies the combined equations but `p` need not lie on `other`.
    pub fn intersect_other_line(&self, other: &Line3D) -> Option<LineIntersection> {
        let (p0, v0, p1, v1) = (self.p0, self.v, other.p0, other.v);
        let a = v0.x + v0.z;
        let b = -(v1.x + v1.z);
        let c = v0.y + v0.z;
        let d = -(v1.y + v1.z);
        let e = p1.x + p1.z - (p0.x + p0.z);
        let f = p1.y + p1.z - (p0.y + p0.z);
        let det = a * d - c * b;
        if det.abs() < EPSILON {
            return None;
        }
        let t = (e * d - b * f) / det;
        let s = (a * f - c * e) / det;
        Some(LineIntersection {
            t,
            s,
            p: p0 + v0 * t,
        })
    }
}

/// Even-odd ray casting test of a 2D point against a polygon.
pub fn point_inside_polygon_2d(p: Vector2<f32>, poly: &[Vector2<f32>]) -> bool {
    if poly.len() < 3 {
        return false;
    }
    let mut inside = false;
    let n = poly.len();
    let mut j = n - 1;
    for i in 0..n {
        let (a, b) = (poly[i], poly[j]);
        if (a.y > p.y) != (b.y > p.y) {
            let x = a.x + (p.y - a.y) * (b.x - a.x) / (b.y - a.y);
            if p.x < x {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// Quaternion for the rotation `M = R(y) R(z) R(x)` given angles `(ry, rz, rx)`.
pub fn quat_from_euler_yzx(r: Vector3<f32>) -> Quaternion<f32> {
    let (ry, rz, rx) = (r.x, r.y, r.z);
    let (c1, s1) = ((ry / 2.0).cos(), (ry / 2.0).sin());
    let (c2, s2) = ((rz / 2.0).cos(), (rz / 2.0).sin());
    let (c3, s3) = ((rx / 2.0).cos(), (rx / 2.0).sin());
    let c1c2 = c1 * c2;
    let s1s2 = s1 * s2;
    let w = c1c2 * c3 - s1s2 * s3;
    let x = c1c2 * s3 + s1s2 * c3;
    let y = s1 * c2 * c3 + c1 * s2 * s3;
    let z = c1 * s2 * c3 - s1 * c2 * s3;
    Quaternion::new(w, x, y, z)
}

/// Inverse of [`quat_from_euler_yzx`], handling the pole singularities.
pub fn euler_yzx_from_quat(q: Quaternion<f32>) -> Vector3<f32> {
    let (w, x, y, z) = (q.s, q.v.x, q.v.y, q.v.z);
    let (sqw, sqx, sqy, sqz) = (w * w, x * x, y * y, z * z);
    let unit = sqx + sqy + sqz + sqw;
    let test = x * y + z * w;
    if test > 0.499 * unit {
        return Vector3::new(2.0 * x.atan2(w), PI / 2.0, 0.0);
    }
    if test < -0.499 * unit {
        return Vector3::new(-2.0 * x.atan2(w), -PI / 2.0, 0.0);
    }
    let ry = (2.0 * y * w - 2.0 * x * z).atan2(sqx - sqy - sqz + sqw);
    let rz = (2.0 * test / unit).asin();
    let rx = (2.0 * x * w - 2.0 * y * z).atan2(-sqx + sqy - sqz + sqw);
    Vector3::new(ry, rz, rx)
}

fn wrap_angle(x: f32) -> f32 {
    x.rem_euclid(2.0 * PI)
}

/// Interpolates between two angles along the shorter arc. Result in `[0, 2π)`.
pub fn angle_lerp(a: f32, b: f32, t: f32) -> f32 {
    let (a, b) = (wrap_angle(a), wrap_angle(b));
    let mut diff = b - a;
    if diff > PI {
        diff -= 2.0 * PI;
    } else if diff < -PI {
        diff += 2.0 * PI;
    }
    wrap_angle(a + t * diff)
}

/// Component-wise [`angle_lerp`].
pub fn angle3_lerp(a: Vector3<f32>, b: Vector3<f32>, t: f32) -> Vector3<f32> {
    Vector3::new(
        angle_lerp(a.x, b.x, t),
        angle_lerp(a.y, b.y, t),
        angle_lerp(a.z, b.z, t),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(x: f32, y: f32, z: f32) -> Vector3<f32> {
        Vector3::new(x, y, z)
    }

    #[test]
    fn test_perpendicular() {
        assert!(are_perpendicular(v(1.0, 0.0, 0.0), v(0.0, 3.0, 0.0)));
        assert!(!are_perpendicular(v(1.0, 1.0, 0.0), v(0.0, 3.0, 0.0)));
    }

    #[test]
    fn test_planarity_and_convexity() {
        let square = [
            v(0.0, 0.0, 0.0),
            v(1.0, 0.0, 0.0),
            v(1.0, 1.0, 0.0),
            v(0.0, 1.0, 0.0),
        ];
        assert!(are_planar(&square));
        assert!(are_2d_convex(&square));

        let bent = [
            v(0.0, 0.0, 0.0),
            v(1.0, 0.0, 0.0),
            v(1.0, 1.0, 1.0),
            v(0.0, 1.0, 0.0),
        ];
        assert!(!are_planar(&bent));

        let dart = [
            v(0.0, 0.0, 0.0),
            v(2.0, 0.0, 0.0),
            v(1.0, 0.5, 0.0),
            v(1.0, 2.0, 0.0),
        ];
        assert!(!are_2d_convex(&dart));
    }

    #[test]
    fn test_face_normal_skips_collinear_prefix() {
        let verts = [
            v(0.0, 0.0, 0.0),
            v(1.0, 0.0, 0.0),
            v(2.0, 0.0, 0.0),
            v(2.0, 1.0, 0.0),
        ];
        assert_eq!(face_normal(&verts), Some(v(0.0, 0.0, 1.0)));
        assert_eq!(face_normal(&verts[..3]), None);
    }

    #[test]
    fn test_areas() {
        let square = [
            v(0.0, 0.0, 0.0),
            v(2.0, 0.0, 0.0),
            v(2.0, 2.0, 0.0),
            v(0.0, 2.0, 0.0),
        ];
        assert!((polygon_area(&square) - 4.0).abs() < 1e-6);
        assert_eq!(area_normal(&square), v(0.0, 0.0, 8.0));
        assert!((triangle_area(square[0], square[1], square[2]) - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_angle_and_projection() {
        let angle = angle_between(v(0.0, 0.0, 0.0), v(1.0, 0.0, 0.0), v(0.0, 1.0, 0.0)).unwrap();
        assert!((angle - 90.0).abs() < 1e-4);
        assert_eq!(angle_between(v(0.0, 0.0, 0.0), v(0.0, 0.0, 0.0), v(1.0, 0.0, 0.0)), None);

        let u = v(2.0, 3.0, 0.0);
        let axis = v(1.0, 0.0, 0.0);
        assert_eq!(project_vector(u, axis), v(2.0, 0.0, 0.0));
        assert_eq!(project_perp_vector(u, axis), v(0.0, 3.0, 0.0));
        assert_eq!(project_vector(u, Vector3::zero()), Vector3::zero());
    }

    #[test]
    fn test_above_or_below() {
        let (a, b, c) = (v(0.0, 0.0, 0.0), v(1.0, 0.0, 0.0), v(0.0, 1.0, 0.0));
        assert_eq!(above_or_below(a, b, c, v(0.0, 0.0, 1.0)), PlaneSide::Above);
        assert_eq!(above_or_below(a, b, c, v(0.0, 0.0, -1.0)), PlaneSide::Below);
        assert_eq!(above_or_below(a, b, c, v(0.3, 0.3, 0.0)), PlaneSide::On);
        assert_eq!(above_or_below(a, b, b, c), PlaneSide::Degenerate);
    }

    #[test]
    fn test_barycentric() {
        let (a, b, c) = (v(0.0, 0.0, 0.0), v(1.0, 0.0, 0.0), v(0.0, 1.0, 0.0));
        let coords = barycentric_coords(a, b, c, v(0.25, 0.25, 0.0));
        assert!((coords.x - 0.5).abs() < 1e-5);
        assert!((coords.y - 0.25).abs() < 1e-5);
        assert!((coords.z - 0.25).abs() < 1e-5);

        assert_eq!(barycentric_coords(a, b, c, v(2.0, 2.0, 0.0)), Vector3::zero());
        assert_eq!(barycentric_coords(a, a, a, a), v(1.0, 0.0, 0.0));
        assert_eq!(barycentric_coords(a, a, a, b), Vector3::zero());
    }

    #[test]
    fn test_ray_intersections() {
        let t = ray_intersect_triangle(
            v(0.2, 0.2, 5.0),
            v(0.0, 0.0, -1.0),
            v(0.0, 0.0, 0.0),
            v(1.0, 0.0, 0.0),
            v(0.0, 1.0, 0.0),
        );
        assert!((t.unwrap() - 5.0).abs() < 1e-5);

        let t = ray_intersect_sphere(v(0.0, 0.0, -5.0), v(0.0, 0.0, 1.0), Vector3::zero(), 1.0);
        assert!((t.unwrap() - 4.0).abs() < 1e-5);
        assert!(ray_intersect_sphere(v(3.0, 0.0, -5.0), v(0.0, 0.0, 1.0), Vector3::zero(), 1.0)
            .is_none());
    }

    #[test]
    fn test_plane_and_lines() {
        let plane = Plane3D::from_equation(0.0, 0.0, 2.0, -4.0);
        assert!((plane.dist_from_plane(v(0.0, 0.0, 5.0)) - 3.0).abs() < 1e-5);

        let line = Line3D::new(v(0.0, 0.0, 0.0), v(0.0, 0.0, 1.0));
        let (t, p) = line.intersect_plane(&plane).unwrap();
        assert!((t - 2.0).abs() < 1e-5);
        assert!((p.z - 2.0).abs() < 1e-5);

        let parallel = Line3D::new(v(0.0, 0.0, 0.0), v(1.0, 0.0, 0.0));
        assert!(parallel.intersect_plane(&plane).is_none());

        let l1 = Line3D::new(v(0.0, 0.0, 0.0), v(1.0, 0.0, 0.0));
        let l2 = Line3D::new(v(2.0, -1.0, 0.0), v(0.0, 1.0, 0.0));
        let hit = l1.intersect_other_line(&l2).unwrap();
        assert!((hit.t - 2.0).abs() < 1e-5);
        assert!((hit.s - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_skew_lines_still_solve() {
        let l1 = Line3D::new(v(0.0, 0.0, 0.0), v(1.0, 0.0, 0.0));
        let l2 = Line3D::new(v(0.0, 0.0, 1.0), v(0.0, 1.0, 0.0));
        let hit = l1.intersect_other_line(&l2).unwrap();
        assert!((hit.t - 1.0).abs() < 1e-5);
        assert!((hit.s + 1.0).abs() < 1e-5);
        let on_other = l2.p0 + l2.v * hit.s;
        assert!((hit.p - on_other).magnitude() > 1.0);
    }

    #[test]
    fn test_point_in_polygon() {
        let square = [
            Vector2::new(0.0, 0.0),
            Vector2::new(1.0, 0.0),
            Vector2::new(1.0, 1.0),
            Vector2::new(0.0, 1.0),
        ];
        assert!(point_inside_polygon_2d(Vector2::new(0.5, 0.5), &square));
        assert!(!point_inside_polygon_2d(Vector2::new(1.5, 0.5), &square));
    }

    #[test]
    fn test_euler_round_trip() {
        let angles = v(0.3, -0.4, 1.1);
        let back = euler_yzx_from_quat(quat_from_euler_yzx(angles));
        assert!((back - angles).magnitude() < 1e-4);
    }

    #[test]
    fn test_angle_lerp_takes_short_way() {
        let mid = angle_lerp(0.1, 2.0 * PI - 0.1, 0.5);
        assert!(mid < 1e-4 || (2.0 * PI - mid) < 1e-4);
        assert!((angle_lerp(0.0, 1.0, 0.25) - 0.25).abs() < 1e-6);
    }
}
