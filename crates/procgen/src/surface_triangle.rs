//! Free-floating terrain fragments for the reset animation.

use engine_core::RandomSource;
use glam::{Quat, Vec3};

/// Radians per second each fragment spins about its axis.
pub const TRIANGLE_ROTATION_RATE: f32 = 0.4;
/// World units per second each fragment drifts.
pub const TRIANGLE_MOVE_RATE: f32 = 1.0;

/// One terrain triangle detached from the grid, spinning about its centroid
/// and drifting in a fixed random direction.
#[derive(Debug, Clone)]
pub struct SurfaceTriangle {
    /// Vertices relative to `origin`.
    local: [Vec3; 3],
    origin: Vec3,
    axis: Vec3,
    heading: Vec3,
    angle: f32,
    travelled: f32,
}

fn random_unit(rng: &mut impl RandomSource, fallback: Vec3) -> Vec3 {
    let v = Vec3::new(
        rng.random_range(-1.0, 1.0),
        rng.random_range(-1.0, 1.0),
        rng.random_range(-1.0, 1.0),
    );
    v.try_normalize().unwrap_or(fallback)
}

impl SurfaceTriangle {
    /// Build from world-space vertices. The fragment starts exactly where the
    /// terrain triangle was.
    pub fn from_world(vertices: [Vec3; 3], rng: &mut impl RandomSource) -> Self {
        let origin = (vertices[0] + vertices[1] + vertices[2]) / 3.0;
        Self {
            local: vertices.map(|v| v - origin),
            origin,
            axis: random_unit(rng, Vec3::Y),
            heading: random_unit(rng, Vec3::X),
            angle: 0.0,
            travelled: 0.0,
        }
    }

    pub fn update(&mut self, dt: f32) {
        self.angle += TRIANGLE_ROTATION_RATE * dt;
        self.travelled += TRIANGLE_MOVE_RATE * dt;
    }

    pub fn centroid(&self) -> Vec3 {
        self.origin + self.heading * self.travelled
    }

    /// Current world-space vertices.
    pub fn world_vertices(&self) -> [Vec3; 3] {
        let rotation = Quat::from_axis_angle(self.axis, self.angle);
        let centroid = self.centroid();
        self.local.map(|v| centroid + rotation * v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine_core::SequenceRandom;

    fn triangle() -> [Vec3; 3] {
        [
            Vec3::new(0.5, 0.2, -0.5),
            Vec3::new(-0.5, 0.0, -0.5),
            Vec3::new(-0.5, -0.1, 0.5),
        ]
    }

    #[test]
    fn starts_in_place() {
        let mut rng = SequenceRandom::new(vec![0.1, 0.7, 0.4, 0.9, 0.2, 0.6]);
        let tri = SurfaceTriangle::from_world(triangle(), &mut rng);
        for (a, b) in tri.world_vertices().iter().zip(triangle().iter()) {
            assert!((*a - *b).length() < 1e-5);
        }
        assert_eq!(rng.drawn(), 6);
    }

    #[test]
    fn drifts_and_keeps_shape() {
        let mut rng = SequenceRandom::new(vec![0.1, 0.7, 0.4, 0.9, 0.2, 0.6]);
        let mut tri = SurfaceTriangle::from_world(triangle(), &mut rng);
        let start = tri.centroid();
        tri.update(2.0);
        assert!(((tri.centroid() - start).length() - 2.0 * TRIANGLE_MOVE_RATE).abs() < 1e-4);

        let [a, b, c] = tri.world_vertices();
        let [a0, b0, c0] = triangle();
        assert!(((a - b).length() - (a0 - b0).length()).abs() < 1e-4);
        assert!(((b - c).length() - (b0 - c0).length()).abs() < 1e-4);
    }
}
