//! Camera for 3D rendering

use crate::core::types::{Mat4, Quat, Vec2, Vec3};

/// Perspective camera with position, rotation and clip planes
#[derive(Clone, Debug)]
pub struct Camera {
    /// World position
    pub position: Vec3,
    /// Rotation as quaternion
    pub rotation: Quat,
    /// Vertical field of view in radians
    pub fov_y: f32,
    /// Aspect ratio (width / height)
    pub aspect: f32,
    /// Near clip plane
    pub near: f32,
    /// Far clip plane
    pub far: f32,
}

impl Camera {
    pub fn new(position: Vec3, fov_y_degrees: f32, aspect: f32) -> Self {
        Self {
            position,
            rotation: Quat::IDENTITY,
            fov_y: fov_y_degrees.to_radians(),
            aspect,
            near: 0.1,
            far: 2000.0,
        }
    }

    /// Create camera at `position` looking at `target`
    pub fn look_at(position: Vec3, target: Vec3) -> Self {
        let mut camera = Self::new(position, 60.0, 16.0 / 9.0);
        camera.face(target);
        camera
    }

    /// Rotate in place so the camera faces `target`.
    ///
    /// A target at the camera position leaves the rotation unchanged.
    pub fn face(&mut self, target: Vec3) {
        let Some(forward) = (target - self.position).try_normalize() else {
            return;
        };
        // looking straight up or down: take +Z as the reference up instead
        let right = forward
            .cross(Vec3::Y)
            .try_normalize()
            .unwrap_or_else(|| forward.cross(Vec3::Z).normalize());
        let up = right.cross(forward);
        self.rotation = Quat::from_mat3(&glam::Mat3::from_cols(right, up, -forward));
    }

    /// Get view matrix (world to camera space)
    pub fn view_matrix(&self) -> Mat4 {
        let rotation_matrix = Mat4::from_quat(self.rotation.conjugate());
        let translation_matrix = Mat4::from_translation(-self.position);
        rotation_matrix * translation_matrix
    }

    /// Get projection matrix (camera to clip space)
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect, self.near, self.far)
    }

    /// Get combined view-projection matrix
    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Near and far clip distances packed as (near, far)
    pub fn near_far(&self) -> Vec2 {
        Vec2::new(self.near, self.far)
    }

    /// Get forward direction (negative Z in camera space)
    pub fn forward(&self) -> Vec3 {
        self.rotation * -Vec3::Z
    }

    /// Update aspect ratio (call on window resize)
    pub fn set_aspect(&mut self, width: f32, height: f32) {
        self.aspect = width / height.max(1.0);
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::look_at(Vec3::new(0.0, 20.0, -60.0), Vec3::new(0.0, 0.0, 60.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_look_at_forward() {
        let camera = Camera::look_at(Vec3::ZERO, Vec3::new(0.0, 0.0, -10.0));
        let forward = camera.forward();
        assert!((forward.z - (-1.0)).abs() < 0.001);
    }

    #[test]
    fn test_view_matrix_translation() {
        let mut camera = Camera::new(Vec3::new(10.0, 0.0, 0.0), 60.0, 1.0);
        camera.rotation = Quat::IDENTITY;

        let origin_in_camera = camera.view_matrix().transform_point3(Vec3::ZERO);
        assert!((origin_in_camera.x - (-10.0)).abs() < 0.001);
    }

    #[test]
    fn test_face_straight_down_stays_finite() {
        let mut camera = Camera::look_at(Vec3::new(0.0, 50.0, 0.0), Vec3::new(0.0, 0.0, 10.0));
        camera.face(Vec3::ZERO);

        assert!(camera.rotation.is_finite());
        assert!((camera.forward() - Vec3::NEG_Y).length() < 0.001);
        assert!(camera.view_matrix().is_finite());
    }

    #[test]
    fn test_face_own_position_keeps_rotation() {
        let mut camera = Camera::look_at(Vec3::new(1.0, 2.0, 3.0), Vec3::ZERO);
        let before = camera.rotation;
        camera.face(Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(camera.rotation, before);
    }

    #[test]
    fn test_near_far() {
        let camera = Camera::default();
        assert_eq!(camera.near_far(), Vec2::new(0.1, 2000.0));
    }
}
