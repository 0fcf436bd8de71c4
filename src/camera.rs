/// Perspective camera parked on the +Z axis, looking down -Z at the field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerspectiveCamera {
    /// Vertical field of view, in degrees.
    pub fov: f32,
    pub near: f32,
    pub far: f32,
    pub aspect: f32,
    pub position: glam::Vec3,
}

impl PerspectiveCamera {
    pub const FOV: f32 = 15.0;

    pub fn new(distance: f32) -> Self {
        Self {
            fov: Self::FOV,
            near: 0.1,
            far: 100.0,
            aspect: 1.0,
            position: glam::Vec3::new(0.0, 0.0, distance),
        }
    }

    /// Matches the aspect ratio to a surface size. A zero height leaves the
    /// current aspect alone.
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        if height == 0 {
            return;
        }
        self.aspect = width as f32 / height as f32;
    }

    #[inline]
    pub fn get_view_matrix(&self) -> glam::Mat4 {
        glam::Mat4::from_translation(self.position).inverse()
    }

    #[inline]
    pub fn get_projection_matrix(&self) -> glam::Mat4 {
        glam::Mat4::perspective_rh(self.fov.to_radians(), self.aspect, self.near, self.far)
    }

    #[inline]
    pub fn get_view_projection_matrix(&self) -> glam::Mat4 {
        self.get_projection_matrix() * self.get_view_matrix()
    }
}

impl Default for PerspectiveCamera {
    fn default() -> Self {
        Self::new(20.0)
    }
}
