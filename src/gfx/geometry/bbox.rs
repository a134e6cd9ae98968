//! Axis-aligned bounding boxes.

use cgmath::{InnerSpace, Matrix4, Transform, Vector3, Zero};

/// An axis-aligned 3D box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AABox3D {
    /// Minimum corner of the box
    pub min: Vector3<f32>,
    /// Maximum corner of the box
    pub max: Vector3<f32>,
}

impl AABox3D {
    pub fn new(min: Vector3<f32>, max: Vector3<f32>) -> Self {
        Self { min, max }
    }

    /// The degenerate box at the origin, used for meshes with no vertices.
    pub fn zero() -> Self {
        Self::new(Vector3::zero(), Vector3::zero())
    }

    /// A zero-volume box containing exactly `p`.
    pub fn from_point(p: Vector3<f32>) -> Self {
        Self::new(p, p)
    }

    /// Tight box around a set of points, or [`AABox3D::zero`] if there are none.
    pub fn from_points<I>(points: I) -> Self
    where
        I: IntoIterator<Item = Vector3<f32>>,
    {
        let mut points = points.into_iter();
        let Some(first) = points.next() else {
            return Self::zero();
        };
        let mut bbox = Self::from_point(first);
        for p in points {
            bbox.add_point(p);
        }
        bbox
    }

    /// Expand the box so it contains `p`.
    pub fn add_point(&mut self, p: Vector3<f32>) {
        self.min.x = self.min.x.min(p.x);
        self.min.y = self.min.y.min(p.y);
        self.min.z = self.min.z.min(p.z);
        self.max.x = self.max.x.max(p.x);
        self.max.y = self.max.y.max(p.y);
        self.max.z = self.max.z.max(p.z);
    }

    /// Expand the box so it contains `other`.
    pub fn union(&mut self, other: &AABox3D) {
        self.add_point(other.min);
        self.add_point(other.max);
    }

    pub fn x_len(&self) -> f32 {
        self.max.x - self.min.x
    }

    pub fn y_len(&self) -> f32 {
        self.max.y - self.min.y
    }

    pub fn z_len(&self) -> f32 {
        self.max.z - self.min.z
    }

    /// Half the length of the box diagonal.
    pub fn diag_length(&self) -> f32 {
        ((self.max - self.min) * 0.5).magnitude()
    }

    pub fn center(&self) -> Vector3<f32> {
        (self.min + self.max) * 0.5
    }

    pub fn contains_point(&self, p: Vector3<f32>) -> bool {
        p.x >= self.min.x
            && p.x <= self.max.x
            && p.y >= self.min.y
            && p.y <= self.max.y
            && p.z >= self.min.z
            && p.z <= self.max.z
    }

    /// The eight corners, min corner first and max corner last.
    pub fn corners(&self) -> [Vector3<f32>; 8] {
        let (a, b) = (self.min, self.max);
        [
            Vector3::new(a.x, a.y, a.z),
            Vector3::new(b.x, a.y, a.z),
            Vector3::new(a.x, b.y, a.z),
            Vector3::new(a.x, a.y, b.z),
            Vector3::new(b.x, b.y, a.z),
            Vector3::new(b.x, a.y, b.z),
            Vector3::new(a.x, b.y, b.z),
            Vector3::new(b.x, b.y, b.z),
        ]
    }

    /// Box around the eight corners after an affine transformation.
    pub fn transformed(&self, matrix: &Matrix4<f32>) -> Self {
        Self::from_points(
            self.corners()
                .into_iter()
                .map(|c| matrix.transform_point(cgmath::Point3::new(c.x, c.y, c.z)))
                .map(|p| Vector3::new(p.x, p.y, p.z)),
        )
    }
}

impl Default for AABox3D {
    fn default() -> Self {
        Self::zero()
    }
}

impl std::fmt::Display for AABox3D {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}, {}] x [{}, {}] x [{}, {}]",
            self.min.x, self.max.x, self.min.y, self.max.y, self.min.z, self.max.z
        )
    }
}
