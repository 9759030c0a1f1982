//! Perspective camera used for viewport picking

use atelier_core::Vec3;

/// A perspective camera looking from `position` toward `target`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    /// Vertical field of view in degrees
    pub fov: f32,
    /// Aspect ratio (width / height)
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::new(10.0, 10.0, 10.0),
            target: Vec3::ZERO,
            up: Vec3::UP,
            fov: 45.0,
            aspect: 16.0 / 9.0,
            near: 0.1,
            far: 1000.0,
        }
    }
}

impl Camera {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn looking_at(position: Vec3, target: Vec3) -> Self {
        Self {
            position,
            target,
            ..Self::default()
        }
    }

    pub fn with_aspect(mut self, aspect: f32) -> Self {
        self.aspect = aspect;
        self
    }

    pub fn view_matrix(&self) -> glam::Mat4 {
        glam::Mat4::look_at_rh(
            to_glam_vec3(self.position),
            to_glam_vec3(self.target),
            to_glam_vec3(self.up),
        )
    }

    /// OpenGL-style projection, clip depth in [-1, 1]
    pub fn projection_matrix(&self) -> glam::Mat4 {
        glam::Mat4::perspective_rh_gl(self.fov.to_radians(), self.aspect, self.near, self.far)
    }

    pub fn view_projection_matrix(&self) -> glam::Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Inverse of the view-projection matrix, for unprojecting screen points
    pub fn inverse_view_projection_matrix(&self) -> glam::Mat4 {
        self.view_projection_matrix().inverse()
    }

    /// Project a world point to pixel coordinates. None when behind the camera.
    pub fn world_to_screen(
        &self,
        point: Vec3,
        viewport_width: f32,
        viewport_height: f32,
    ) -> Option<(f32, f32)> {
        let clip = self.view_projection_matrix() * to_glam_vec3(point).extend(1.0);
        if clip.w <= 1e-6 {
            return None;
        }
        let ndc = clip.truncate() / clip.w;
        Some((
            (ndc.x + 1.0) * 0.5 * viewport_width,
            (1.0 - ndc.y) * 0.5 * viewport_height,
        ))
    }
}

pub(crate) fn to_glam_vec3(v: Vec3) -> glam::Vec3 {
    glam::Vec3::new(v.x, v.y, v.z)
}

pub(crate) fn from_glam_vec3(v: glam::Vec3) -> Vec3 {
    Vec3::new(v.x, v.y, v.z)
}
