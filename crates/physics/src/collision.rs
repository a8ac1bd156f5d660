//! Axis-aligned bounding boxes used as the terrain and walker hit volumes.

use glam::Vec3;

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Default for Aabb {
    fn default() -> Self {
        Self {
            min: Vec3::ZERO,
            max: Vec3::ZERO,
        }
    }
}

impl Aabb {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Vertical midpoint; used as the cheap ground height of a terrain cell.
    pub fn mid_y(&self) -> f32 {
        (self.min.y + self.max.y) / 2.0
    }

    /// Inclusive containment on the horizontal plane only.
    pub fn contains_xz(&self, x: f32, z: f32) -> bool {
        x >= self.min.x && x <= self.max.x && z >= self.min.z && z <= self.max.z
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contains_xz_is_inclusive_and_ignores_height() {
        let bb = Aabb::new(Vec3::ZERO, Vec3::ONE);
        assert!(bb.contains_xz(1.0, 1.0));
        assert!(bb.contains_xz(0.5, 0.0));
        assert!(!bb.contains_xz(1.01, 0.5));
        assert!(!bb.contains_xz(0.5, -0.01));
    }

    #[test]
    fn mid_y_is_vertical_center() {
        let bb = Aabb::new(Vec3::new(0.0, -1.0, 0.0), Vec3::new(1.0, 3.0, 1.0));
        assert_eq!(bb.mid_y(), 1.0);
    }
}
