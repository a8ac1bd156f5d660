//! Orbit-style scene camera with eased motion, and screen-to-world ray casting.

use glam::{Mat4, Vec2, Vec3};
use physics::Ray;

/// Where the camera is and what it looks at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPose {
    pub position: Vec3,
    pub target: Vec3,
}

impl CameraPose {
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, Vec3::Y)
    }
}

/// Turns a pointer position into a world-space ray. Supplied by whatever
/// owns the viewport.
pub trait RayProjector {
    fn screen_point_to_world_ray(&self, point: Vec2, camera: &CameraPose) -> Ray;
}

/// Perspective projection over a pixel viewport.
#[derive(Debug, Clone)]
pub struct PerspectiveProjector {
    /// Field of view in degrees.
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    /// Viewport size in pixels.
    pub viewport: Vec2,
}

impl Default for PerspectiveProjector {
    fn default() -> Self {
        Self {
            fov_degrees: 45.0,
            near: 0.1,
            far: 1000.0,
            viewport: Vec2::new(1280.0, 720.0),
        }
    }
}

impl PerspectiveProjector {
    /// Update viewport (call on window resize).
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.viewport = Vec2::new(width.max(1) as f32, height.max(1) as f32);
    }

    pub fn aspect(&self) -> f32 {
        self.viewport.x / self.viewport.y.max(1.0)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_degrees.to_radians(), self.aspect(), self.near, self.far)
    }

    pub fn view_projection_matrix(&self, camera: &CameraPose) -> Mat4 {
        self.projection_matrix() * camera.view_matrix()
    }
}

impl RayProjector for PerspectiveProjector {
    fn screen_point_to_world_ray(&self, point: Vec2, camera: &CameraPose) -> Ray {
        let ndc = Vec2::new(
            2.0 * point.x / self.viewport.x - 1.0,
            1.0 - 2.0 * point.y / self.viewport.y,
        );
        let inverse = self.view_projection_matrix(camera).inverse();
        // Depth runs 0..1 for perspective_rh.
        let near = inverse.project_point3(ndc.extend(0.0));
        let far = inverse.project_point3(ndc.extend(1.0));
        Ray::new(near, (far - near).normalize_or_zero())
    }
}

/// Camera that eases toward a desired pose instead of snapping.
#[derive(Debug, Clone)]
pub struct SmoothedCamera {
    current: CameraPose,
    desired: CameraPose,
    /// Position relative to the look-at target.
    offset: Vec3,
    rate: f32,
}

impl SmoothedCamera {
    pub fn new(look_at: Vec3, offset: Vec3, rate: f32) -> Self {
        let pose = CameraPose {
            position: look_at + offset,
            target: look_at,
        };
        Self {
            current: pose,
            desired: pose,
            offset,
            rate,
        }
    }

    pub fn pose(&self) -> &CameraPose {
        &self.current
    }

    pub fn desired(&self) -> &CameraPose {
        &self.desired
    }

    /// Aim at a new point, keeping the configured offset.
    pub fn look_at(&mut self, point: Vec3) {
        self.desired = CameraPose {
            position: point + self.offset,
            target: point,
        };
    }

    pub fn update(&mut self, dt: f32) {
        let k = self.rate * dt;
        self.current.position += (self.desired.position - self.current.position) * k;
        self.current.target += (self.desired.target - self.current.target) * k;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn center_pixel_looks_at_target() {
        let mut projector = PerspectiveProjector::default();
        projector.set_viewport(800, 600);
        let pose = CameraPose {
            position: Vec3::new(0.0, 10.0, 10.0),
            target: Vec3::ZERO,
        };
        let ray = projector.screen_point_to_world_ray(Vec2::new(400.0, 300.0), &pose);
        let expected = (pose.target - pose.position).normalize();
        assert!((ray.direction - expected).length() < 1e-3);
        assert!((ray.origin - pose.position).length() < 0.2);
    }

    #[test]
    fn left_pixel_ray_points_left() {
        let projector = PerspectiveProjector::default();
        let pose = CameraPose {
            position: Vec3::new(0.0, 0.0, 10.0),
            target: Vec3::ZERO,
        };
        let ray = projector.screen_point_to_world_ray(Vec2::new(0.0, 360.0), &pose);
        assert!(ray.direction.x < 0.0);
        assert!(ray.direction.y.abs() < 1e-3);
    }

    #[test]
    fn camera_eases_toward_target() {
        let mut cam = SmoothedCamera::new(Vec3::ZERO, Vec3::new(0.0, 10.0, 10.0), 1.0);
        cam.look_at(Vec3::new(4.0, 0.0, 0.0));
        cam.update(0.25);
        assert!((cam.pose().target - Vec3::new(1.0, 0.0, 0.0)).length() < 1e-6);
        assert!((cam.pose().position - Vec3::new(1.0, 10.0, 10.0)).length() < 1e-6);
        for _ in 0..200 {
            cam.update(0.1);
        }
        assert!((cam.pose().target - cam.desired().target).length() < 1e-3);
    }
}
