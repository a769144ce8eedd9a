//! Orbit camera and projection.
//!
//! Left-handed look-at view with Z up, composed with a perspective FOV
//! projection. World points project through the combined transform with a
//! homogeneous divide, giving normalized screen coordinates the client
//! maps onto its canvas.

use nalgebra::{Matrix4, Vector3, Vector4};
use std::f64::consts::PI;

/// Orbit camera: spherical offset {distance, theta, phi} around a target.
#[derive(Debug, Clone, Copy)]
pub struct Camera {
    distance: f64,
    theta: f64,
    phi: f64,

    fov: f64,
    z_near: f64,
    z_far: f64,

    target: Vector3<f64>,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}

impl Camera {
    pub fn new() -> Self {
        Self {
            distance: 10.0,
            theta: 0.0,
            phi: PI / 4.0,
            fov: 0.78,
            z_near: 0.01,
            z_far: 1.0,
            target: Vector3::zeros(),
        }
    }

    pub fn move_to(&mut self, distance: f64, theta: f64, phi: f64) {
        self.distance = distance;
        self.theta = theta;
        self.phi = phi;
    }

    pub fn point_at(&mut self, target: Vector3<f64>) {
        self.target = target;
    }

    /// Combined projection × view transform for the given aspect ratio.
    pub fn view_transform(&self, aspect_ratio: f64) -> Matrix4<f64> {
        self.perspective_fov(aspect_ratio) * self.look_at()
    }

    /// Project a world point through `transform` to normalized screen
    /// coordinates. Returns `None` for points on or behind the near plane.
    pub fn project(
        &self,
        transform: &Matrix4<f64>,
        point: Vector3<f64>,
    ) -> Option<(f64, f64)> {
        let clip = transform * Vector4::new(point.x, point.y, point.z, 1.0);

        if clip.w <= self.z_near {
            return None;
        }

        Some((clip.x / clip.w, clip.y / clip.w))
    }

    fn look_at(&self) -> Matrix4<f64> {
        let rho = self.distance * self.phi.cos();
        let relative_position = Vector3::new(
            rho * self.theta.cos(),
            rho * self.theta.sin(),
            self.distance * self.phi.sin(),
        );
        let absolute_position = self.target + relative_position;

        // The vertical up vector degenerates when looking straight down;
        // swap to the tangent direction at the poles.
        let mut up = Vector3::new(0.0, 0.0, 1.0);
        if self.phi.cos() < 1e-5 {
            up = Vector3::new(-self.theta.cos(), -self.theta.sin(), 0.0);
            if self.phi < 0.0 {
                up = -up;
            }
        }

        // forward
        let z_axis = (-relative_position).normalize();
        // right
        let x_axis = up.cross(&z_axis).normalize();
        // up
        let y_axis = z_axis.cross(&x_axis);

        // camera position expressed in the new basis
        let translation = Vector3::new(
            x_axis.dot(&absolute_position),
            y_axis.dot(&absolute_position),
            z_axis.dot(&absolute_position),
        );

        Matrix4::new(
            x_axis.x, x_axis.y, x_axis.z, -translation.x,
            y_axis.x, y_axis.y, y_axis.z, -translation.y,
            z_axis.x, z_axis.y, z_axis.z, -translation.z,
            0.0, 0.0, 0.0, 1.0,
        )
    }

    fn perspective_fov(&self, aspect_ratio: f64) -> Matrix4<f64> {
        let y_scale = 1.0 / (self.fov * 0.5).tan();
        let x_scale = y_scale / aspect_ratio;
        let q = self.z_far / (self.z_far - self.z_near);

        Matrix4::new(
            x_scale, 0.0, 0.0, 0.0,
            0.0, y_scale, 0.0, 0.0,
            0.0, 0.0, q, -2.0 * q * self.z_near,
            0.0, 0.0, 1.0, 0.0,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn target_projects_to_screen_center() {
        let mut camera = Camera::new();
        camera.point_at(Vector3::zeros());

        let transform = camera.view_transform(1.0);
        let (x, y) = camera.project(&transform, Vector3::zeros()).unwrap();

        assert_relative_eq!(x, 0.0, epsilon = 1e-9);
        assert_relative_eq!(y, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn points_behind_the_camera_are_culled() {
        let mut camera = Camera::new();
        camera.move_to(10.0, 0.0, 0.0);
        camera.point_at(Vector3::zeros());

        // The camera sits on the +X axis looking toward the origin, so a
        // point far beyond it along +X is behind the view plane.
        let transform = camera.view_transform(1.0);
        assert!(camera
            .project(&transform, Vector3::new(100.0, 0.0, 0.0))
            .is_none());
        assert!(camera.project(&transform, Vector3::zeros()).is_some());
    }

    #[test]
    fn pole_view_keeps_a_valid_basis() {
        let mut camera = Camera::new();
        camera.move_to(10.0, 0.3, PI / 2.0);
        camera.point_at(Vector3::zeros());

        let transform = camera.view_transform(1.0);
        let projected = camera.project(&transform, Vector3::new(0.5, 0.5, 0.0));

        let (x, y) = projected.unwrap();
        assert!(x.is_finite() && y.is_finite());
    }

    #[test]
    fn nearer_points_spread_wider() {
        let mut camera = Camera::new();
        camera.move_to(10.0, 0.0, 0.0);
        camera.point_at(Vector3::zeros());
        let transform = camera.view_transform(1.0);

        // Same lateral offset, different depths along the view axis.
        let (_, near_y) = camera
            .project(&transform, Vector3::new(5.0, 0.0, 1.0))
            .unwrap();
        let (_, far_y) = camera
            .project(&transform, Vector3::new(-5.0, 0.0, 1.0))
            .unwrap();

        assert!(near_y.abs() > far_y.abs());
    }
}
