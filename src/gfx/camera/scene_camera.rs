//! Scene cameras: a position, an orientation and a perspective frustum.

use cgmath::{perspective, InnerSpace, Matrix3, Matrix4, Quaternion, Rad, Vector3, Zero};

use crate::gfx::geometry::utils::{angle3_lerp, euler_yzx_from_quat, quat_from_euler_yzx};

pub const DEFAULT_FOVX: f32 = 1.4;
pub const DEFAULT_FOVY: f32 = 1.4;
pub const DEFAULT_NEAR: f32 = 0.01;
pub const DEFAULT_FAR: f32 = 1000.0;

/// How [`Camera::interpolate`] blends orientations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RotationInterpolation {
    /// Spherical linear interpolation of the quaternions
    #[default]
    Slerp,
    /// Shortest-path interpolation of YZX Euler angles
    Euler,
}

/// A perspective camera.
///
/// The camera looks down its local -Z with +Y up; `rot` rotates local axes
/// into world space. Fields of view are full angles in radians.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub pos: Vector3<f32>,
    pub rot: Quaternion<f32>,
    pub fovx: f32,
    pub fovy: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            pos: Vector3::zero(),
            rot: Quaternion::new(1.0, 0.0, 0.0, 0.0),
            fovx: DEFAULT_FOVX,
            fovy: DEFAULT_FOVY,
            near: DEFAULT_NEAR,
            far: DEFAULT_FAR,
        }
    }
}

impl Camera {
    fn axes(&self) -> Matrix3<f32> {
        Matrix3::from(self.rot.normalize())
    }

    pub fn right(&self) -> Vector3<f32> {
        self.axes().x
    }

    pub fn up(&self) -> Vector3<f32> {
        self.axes().y
    }

    pub fn towards(&self) -> Vector3<f32> {
        -self.axes().z
    }

    /// World to camera.
    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::from(self.rot.normalize().conjugate()) * Matrix4::from_translation(-self.pos)
    }

    /// Width over height, from the two fields of view.
    pub fn aspect(&self) -> f32 {
        (self.fovx / 2.0).tan() / (self.fovy / 2.0).tan()
    }

    pub fn projection_matrix(&self) -> Matrix4<f32> {
        perspective(Rad(self.fovy), self.aspect(), self.near, self.far)
    }

    pub fn view_projection_matrix(&self) -> Matrix4<f32> {
        self.projection_matrix() * self.view_matrix()
    }

    /// Camera part way from `self` to `other`.
    ///
    /// Position and frustum parameters are interpolated linearly.
    pub fn interpolate(&self, other: &Camera, t: f32, mode: RotationInterpolation) -> Camera {
        let lerp = |a: f32, b: f32| a + (b - a) * t;
        let rot = match mode {
            RotationInterpolation::Slerp => self.rot.normalize().slerp(other.rot.normalize(), t),
            RotationInterpolation::Euler => {
                let a = euler_yzx_from_quat(self.rot.normalize());
                let b = euler_yzx_from_quat(other.rot.normalize());
                quat_from_euler_yzx(angle3_lerp(a, b, t))
            }
        };
        Camera {
            pos: self.pos + (other.pos - self.pos) * t,
            rot,
            fovx: lerp(self.fovx, other.fovx),
            fovy: lerp(self.fovy, other.fovy),
            near: lerp(self.near, other.near),
            far: lerp(self.far, other.far),
        }
    }
}
