//! Raycasting for pointer picking and leg grounding queries.

use crate::Aabb;
use glam::Vec3;

/// Tolerance for "this float is zero" in the plane tests.
const PARALLEL_EPSILON: f32 = 1e-6;

/// Accepted band for the area-ratio barycentric sum of a triangle hit.
/// Points outside the triangle sum to more than one; the band absorbs
/// rounding when a ray walks along a shared edge.
pub const BARYCENTRIC_SUM_MIN: f32 = 0.999;
pub const BARYCENTRIC_SUM_MAX: f32 = 1.001;

/// A half-line with origin and direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self { origin, direction }
    }

    /// Ray pointing straight down from `origin`.
    pub fn downward(origin: Vec3) -> Self {
        Self {
            origin,
            direction: Vec3::NEG_Y,
        }
    }

    pub fn point_at(&self, distance: f32) -> Vec3 {
        self.origin + self.direction * distance
    }
}

/// Result of a raycast query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RaycastHit {
    /// Distance along the ray (in units of the ray direction length).
    pub distance: f32,
    /// World position of the hit.
    pub point: Vec3,
}

/// Ray against box (slab test). An origin inside the box counts as a hit,
/// reported at the exit point.
pub fn ray_aabb(ray: &Ray, bb: &Aabb) -> Option<RaycastHit> {
    let mut t_min = f32::NEG_INFINITY;
    let mut t_max = f32::INFINITY;

    for axis in 0..3 {
        let o = ray.origin[axis];
        let d = ray.direction[axis];
        let lo = bb.min[axis];
        let hi = bb.max[axis];

        if d.abs() < PARALLEL_EPSILON {
            // Parallel to this slab: must already lie within it.
            if o < lo || o > hi {
                return None;
            }
            continue;
        }

        let inv = 1.0 / d;
        let (t0, t1) = {
            let a = (lo - o) * inv;
            let b = (hi - o) * inv;
            if a <= b {
                (a, b)
            } else {
                (b, a)
            }
        };
        t_min = t_min.max(t0);
        t_max = t_max.min(t1);
        if t_min > t_max {
            return None;
        }
    }

    if t_max < 0.0 {
        return None;
    }
    let distance = if t_min >= 0.0 { t_min } else { t_max };
    Some(RaycastHit {
        distance,
        point: ray.point_at(distance),
    })
}

/// Intersection with the plane through `plane_point` with normal `plane_normal`.
/// Hits behind the origin are rejected.
pub fn ray_plane(ray: &Ray, plane_point: Vec3, plane_normal: Vec3) -> Option<RaycastHit> {
    let rd_pn = ray.direction.dot(plane_normal);
    if rd_pn.abs() < PARALLEL_EPSILON {
        return None;
    }

    let amount = (plane_point.dot(plane_normal) - ray.origin.dot(plane_normal)) / rd_pn;
    if amount < 0.0 {
        return None;
    }

    Some(RaycastHit {
        distance: amount,
        point: ray.point_at(amount),
    })
}

fn triangle_area(a: Vec3, b: Vec3, c: Vec3) -> f32 {
    (b - a).cross(c - a).length() * 0.5
}

/// Ray against triangle `(a, b, c)`: plane hit followed by an area-ratio
/// containment test.
pub fn ray_triangle(ray: &Ray, a: Vec3, b: Vec3, c: Vec3) -> Option<RaycastHit> {
    let normal = (b - a).cross(c - a);
    let area = normal.length() * 0.5;
    if area < PARALLEL_EPSILON {
        return None;
    }

    let hit = ray_plane(ray, a, normal)?;
    let p = hit.point;
    let sum = (triangle_area(p, b, c) + triangle_area(a, p, c) + triangle_area(a, b, p)) / area;
    if (BARYCENTRIC_SUM_MIN..=BARYCENTRIC_SUM_MAX).contains(&sum) {
        Some(hit)
    } else {
        None
    }
}

/// First box in slice order hit by the ray, with its index.
pub fn first_hit<'a>(ray: &Ray, boxes: impl IntoIterator<Item = &'a Aabb>) -> Option<(usize, &'a Aabb)> {
    boxes
        .into_iter()
        .enumerate()
        .find(|(_, bb)| ray_aabb(ray, bb).is_some())
}
