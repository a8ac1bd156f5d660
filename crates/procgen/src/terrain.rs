//! Height-field terrain built by breadth-first constraint propagation.
//!
//! Generation starts at the center cell and walks outwards. Each cell copies
//! the corner heights it shares with already-resolved neighbors and jitters
//! the rest around their average, so adjacent cells always agree on their
//! common edge and the field has no seams.
//!
//! Ground queries deliberately use the vertical midpoint of a cell's bounding
//! box rather than interpolating its corners; walker footing is tuned to it.

use std::collections::VecDeque;

use bytemuck::{Pod, Zeroable};
use engine_core::{Color, RandomSource};
use glam::Vec3;
use physics::{first_hit, ray_aabb, ray_triangle, Aabb, Ray, RaycastHit};
use thiserror::Error;

use crate::surface_triangle::SurfaceTriangle;

/// Height added above the tallest cell when probing the ground from the sky.
const SKY_PROBE_MARGIN: f32 = 1.0;

/// Errors raised while building a height field.
#[derive(Debug, Error, PartialEq)]
pub enum TerrainError {
    #[error("height field needs at least one cell, got {width}x{height}")]
    EmptyGrid { width: usize, height: usize },
    #[error("height interval must be finite and non-negative, got {0}")]
    InvalidInterval(f32),
}

/// Configuration for height-field generation.
#[derive(Debug, Clone, PartialEq)]
pub struct TerrainConfig {
    /// Cells along X.
    pub width: usize,
    /// Cells along Z.
    pub height: usize,
    /// Spread of the random offset applied to synthesized corners.
    pub height_interval: f32,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            width: 51,
            height: 51,
            height_interval: 0.7,
        }
    }
}

impl TerrainConfig {
    fn validate(&self) -> Result<(), TerrainError> {
        if self.width == 0 || self.height == 0 {
            return Err(TerrainError::EmptyGrid {
                width: self.width,
                height: self.height,
            });
        }
        if !self.height_interval.is_finite() || self.height_interval < 0.0 {
            return Err(TerrainError::InvalidInterval(self.height_interval));
        }
        Ok(())
    }

    /// World X of the center of cell column 0 is `-x_offset()`.
    pub fn x_offset(&self) -> f32 {
        self.width as f32 / 2.0 - 0.5
    }

    /// World Z of the center of cell row 0 is `-y_offset()`.
    pub fn y_offset(&self) -> f32 {
        self.height as f32 / 2.0 - 0.5
    }
}

/// Corner heights of one grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SurfaceUnit {
    pub nw: f32,
    pub ne: f32,
    pub sw: f32,
    pub se: f32,
}

impl SurfaceUnit {
    pub fn min_height(&self) -> f32 {
        self.nw.min(self.ne).min(self.sw).min(self.se)
    }

    pub fn max_height(&self) -> f32 {
        self.nw.max(self.ne).max(self.sw).max(self.se)
    }
}

/// Vertex for the terrain mesh (position + per-cell color).
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct SurfaceVertex {
    pub position: [f32; 3],
    pub color: [f32; 4],
}

/// A fully generated grid of surface units and their bounding boxes.
#[derive(Debug, Clone)]
pub struct HeightField {
    config: TerrainConfig,
    cells: Vec<SurfaceUnit>,
    bounding_boxes: Vec<Aabb>,
    top: f32,
}

impl HeightField {
    /// Generate a new field. Random draws are consumed in breadth-first
    /// order from the center, corners in the order nw, ne, sw, se.
    pub fn generate(config: TerrainConfig, rng: &mut impl RandomSource) -> Result<Self, TerrainError> {
        config.validate()?;

        let width = config.width;
        let height = config.height;
        let count = width * height;
        let interval = config.height_interval;
        let x_offset = config.x_offset();
        let y_offset = config.y_offset();

        let mut resolved: Vec<Option<SurfaceUnit>> = vec![None; count];
        let mut bounding_boxes = vec![Aabb::default(); count];

        let mut worklist = VecDeque::with_capacity(count);
        worklist.push_back(width / 2 + (height / 2) * width);

        while let Some(idx) = worklist.pop_front() {
            if resolved[idx].is_some() {
                continue;
            }
            let x = idx % width;
            let y = idx / width;

            let mut nw = None;
            let mut ne = None;
            let mut sw = None;
            let mut se = None;

            // Copy every shared edge first; synthesize afterwards.
            if x > 0 {
                match resolved[idx - 1] {
                    Some(west) => {
                        nw = Some(west.ne);
                        sw = Some(west.se);
                    }
                    None => worklist.push_back(idx - 1),
                }
            }
            if x + 1 < width {
                match resolved[idx + 1] {
                    Some(east) => {
                        ne = Some(east.nw);
                        se = Some(east.sw);
                    }
                    None => worklist.push_back(idx + 1),
                }
            }
            if y > 0 {
                match resolved[idx - width] {
                    Some(north) => {
                        nw = Some(north.sw);
                        ne = Some(north.se);
                    }
                    None => worklist.push_back(idx - width),
                }
            }
            if y + 1 < height {
                match resolved[idx + width] {
                    Some(south) => {
                        sw = Some(south.nw);
                        se = Some(south.ne);
                    }
                    None => worklist.push_back(idx + width),
                }
            }

            let (sum, supplied) = [nw, ne, sw, se]
                .iter()
                .flatten()
                .fold((0.0f32, 0usize), |(sum, n), h| (sum + h, n + 1));
            let average = if supplied == 0 { 0.0 } else { sum / supplied as f32 };
            let mut synthesize = |corner: Option<f32>| {
                corner.unwrap_or_else(|| average + rng.random() * interval - interval / 2.0)
            };

            let unit = SurfaceUnit {
                nw: synthesize(nw),
                ne: synthesize(ne),
                sw: synthesize(sw),
                se: synthesize(se),
            };

            let posx = x as f32 - x_offset;
            let posz = y as f32 - y_offset;
            bounding_boxes[idx] = Aabb::new(
                Vec3::new(posx - 0.5, unit.min_height(), posz - 0.5),
                Vec3::new(posx + 0.5, unit.max_height(), posz + 0.5),
            );
            resolved[idx] = Some(unit);
        }

        let cells: Vec<SurfaceUnit> = resolved
            .into_iter()
            .map(|cell| cell.unwrap_or_default())
            .collect();
        let top = bounding_boxes
            .iter()
            .map(|bb| bb.max.y)
            .fold(f32::NEG_INFINITY, f32::max);

        log::debug!(
            "Generated {}x{} height field, heights up to {:.2}",
            width,
            height,
            top
        );

        Ok(Self {
            config,
            cells,
            bounding_boxes,
            top,
        })
    }

    pub fn config(&self) -> &TerrainConfig {
        &self.config
    }

    pub fn width(&self) -> usize {
        self.config.width
    }

    pub fn height(&self) -> usize {
        self.config.height
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Row-major index of grid cell `(x, y)`.
    pub fn cell_index(&self, x: usize, y: usize) -> Option<usize> {
        (x < self.config.width && y < self.config.height).then(|| x + y * self.config.width)
    }

    /// Grid coordinates of a cell index.
    pub fn cell_coords(&self, index: usize) -> Option<(usize, usize)> {
        (index < self.cells.len()).then(|| (index % self.config.width, index / self.config.width))
    }

    pub fn cells(&self) -> &[SurfaceUnit] {
        &self.cells
    }

    pub fn bounding_box(&self, index: usize) -> Option<Aabb> {
        self.bounding_boxes.get(index).copied()
    }

    pub fn bounding_boxes(&self) -> &[Aabb] {
        &self.bounding_boxes
    }

    /// World-space center of a cell on the horizontal plane (y = 0).
    pub fn cell_center(&self, index: usize) -> Option<Vec3> {
        let (x, y) = self.cell_coords(index)?;
        Some(Vec3::new(
            x as f32 - self.config.x_offset(),
            0.0,
            y as f32 - self.config.y_offset(),
        ))
    }

    /// Horizontal extent check against the whole grid footprint.
    pub fn contains_xz(&self, x: f32, z: f32) -> bool {
        let half_w = self.config.width as f32 / 2.0;
        let half_h = self.config.height as f32 / 2.0;
        x >= -half_w && x <= half_w && z >= -half_h && z <= half_h
    }

    /// Cast a ray down from `origin`; the first box hit in grid order gives
    /// the cell and its midpoint height.
    pub fn ground_probe(&self, origin: Vec3) -> Option<(usize, f32)> {
        first_hit(&Ray::downward(origin), &self.bounding_boxes).map(|(idx, bb)| (idx, bb.mid_y()))
    }

    /// Ground height below a world XZ position, probing from above the field.
    pub fn ground_height_at(&self, x: f32, z: f32) -> Option<(usize, f32)> {
        self.ground_probe(Vec3::new(x, self.top + SKY_PROBE_MARGIN, z))
    }

    /// Uniformly random cell index.
    pub fn random_cell(&self, rng: &mut impl RandomSource) -> usize {
        let count = self.cells.len();
        let idx = (rng.random() * count as f32) as usize;
        debug_assert!(idx < count, "random cell {} out of range {}", idx, count);
        idx.min(count - 1)
    }

    /// World positions of a cell's corners as `[nw, ne, sw, se]`.
    pub fn corner_points(&self, index: usize) -> Option<[Vec3; 4]> {
        let unit = self.cells.get(index)?;
        let center = self.cell_center(index)?;
        Some([
            Vec3::new(center.x - 0.5, unit.nw, center.z - 0.5),
            Vec3::new(center.x + 0.5, unit.ne, center.z - 0.5),
            Vec3::new(center.x - 0.5, unit.sw, center.z + 0.5),
            Vec3::new(center.x + 0.5, unit.se, center.z + 0.5),
        ])
    }

    /// Ray against one cell: bounding box rejection, then its two triangles
    /// `(nw, sw, ne)` and `(se, ne, sw)`. Returns the nearer hit.
    pub fn cell_triangle_intersection(&self, ray: &Ray, index: usize) -> Option<(Vec3, usize)> {
        self.cell_hit(ray, index).map(|hit| (hit.point, index))
    }

    fn cell_hit(&self, ray: &Ray, index: usize) -> Option<RaycastHit> {
        let bb = self.bounding_boxes.get(index)?;
        ray_aabb(ray, bb)?;
        let [nw, ne, sw, se] = self.corner_points(index)?;

        let first = ray_triangle(ray, nw, sw, ne);
        let second = ray_triangle(ray, se, ne, sw);
        match (first, second) {
            (Some(a), Some(b)) => Some(if a.distance <= b.distance { a } else { b }),
            (a, b) => a.or(b),
        }
    }

    /// Nearest cell hit by an arbitrary ray, as `(cell, point)`.
    pub fn raycast(&self, ray: &Ray) -> Option<(usize, Vec3)> {
        (0..self.cells.len())
            .filter_map(|idx| self.cell_hit(ray, idx).map(|hit| (idx, hit)))
            .min_by(|(_, a), (_, b)| {
                a.distance
                    .partial_cmp(&b.distance)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .map(|(idx, hit)| (idx, hit.point))
    }

    /// Deterministic base color of a cell from its grid coordinates.
    pub fn cell_color(&self, index: usize) -> Color {
        let Some((x, y)) = self.cell_coords(index) else {
            return Color::BLACK;
        };
        let gx = x as i32 - (self.config.width / 2) as i32;
        let gz = y as i32 - (self.config.height / 2) as i32;
        Color::rgb(
            (200 + gx * 2).clamp(0, 255) as u8,
            (150 + gz * 2).clamp(0, 255) as u8,
            20,
        )
    }

    /// Triangle list for the terrain mesh, two triangles per cell in the same
    /// winding the picking test uses. `highlight` overrides one cell's color.
    pub fn surface_vertices(&self, highlight: Option<usize>) -> Vec<SurfaceVertex> {
        let mut vertices = Vec::with_capacity(self.cells.len() * 6);
        for idx in 0..self.cells.len() {
            let Some([nw, ne, sw, se]) = self.corner_points(idx) else {
                continue;
            };
            let color = if highlight == Some(idx) {
                Color::RAY_WHITE
            } else {
                self.cell_color(idx)
            }
            .to_f32_array();

            for p in [nw, sw, ne, se, ne, sw] {
                vertices.push(SurfaceVertex {
                    position: p.into(),
                    color,
                });
            }
        }
        vertices
    }

    /// Snapshot every cell as two free-floating triangles for the reset
    /// animation.
    pub fn to_triangles(&self, rng: &mut impl RandomSource) -> Vec<SurfaceTriangle> {
        let mut triangles = Vec::with_capacity(self.cells.len() * 2);
        for idx in 0..self.cells.len() {
            let Some([nw, ne, sw, se]) = self.corner_points(idx) else {
                continue;
            };
            triangles.push(SurfaceTriangle::from_world([ne, nw, sw], rng));
            triangles.push(SurfaceTriangle::from_world([ne, sw, se], rng));
        }
        triangles
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine_core::SequenceRandom;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn small_config() -> TerrainConfig {
        TerrainConfig {
            width: 9,
            height: 7,
            height_interval: 0.7,
        }
    }

    fn seeded_field(seed: u64) -> HeightField {
        let mut rng = StdRng::seed_from_u64(seed);
        HeightField::generate(TerrainConfig::default(), &mut rng).unwrap()
    }

    /// Adjacent cells must agree bit-for-bit on their shared edge.
    #[test]
    fn shared_edges_are_continuous() {
        for seed in [1_u64, 42, 9001] {
            let field = seeded_field(seed);
            for y in 0..field.height() {
                for x in 0..field.width() {
                    let here = field.cells()[field.cell_index(x, y).unwrap()];
                    if let Some(east_idx) = field.cell_index(x + 1, y) {
                        let east = field.cells()[east_idx];
                        assert_eq!(here.ne, east.nw, "({x},{y}) ne vs east nw");
                        assert_eq!(here.se, east.sw, "({x},{y}) se vs east sw");
                    }
                    if let Some(south_idx) = field.cell_index(x, y + 1) {
                        let south = field.cells()[south_idx];
                        assert_eq!(here.sw, south.nw, "({x},{y}) sw vs south nw");
                        assert_eq!(here.se, south.ne, "({x},{y}) se vs south ne");
                    }
                }
            }
        }
    }

    /// Same draw stream, same field.
    #[test]
    fn same_stream_same_field() {
        let values: Vec<f32> = (0..97).map(|i| (i as f32 * 0.137).fract()).collect();
        let a = HeightField::generate(small_config(), &mut SequenceRandom::new(values.clone())).unwrap();
        let b = HeightField::generate(small_config(), &mut SequenceRandom::new(values)).unwrap();
        assert_eq!(a.cells(), b.cells());
        assert_eq!(a.bounding_boxes(), b.bounding_boxes());
    }

    #[test]
    fn different_seed_different_field() {
        assert_ne!(seeded_field(11111).cells(), seeded_field(22222).cells());
    }

    /// Every grid vertex is synthesized exactly once; all other corners are copies.
    #[test]
    fn one_draw_per_grid_vertex() {
        let config = small_config();
        let mut rng = SequenceRandom::new(vec![0.3, 0.9, 0.1]);
        HeightField::generate(config.clone(), &mut rng).unwrap();
        assert_eq!(rng.drawn(), (config.width + 1) * (config.height + 1));
    }

    #[test]
    fn center_cell_consumes_first_draws() {
        let config = TerrainConfig {
            width: 3,
            height: 3,
            height_interval: 1.0,
        };
        let mut rng = SequenceRandom::new(vec![0.0, 0.25, 0.75, 1.0, 0.5]);
        let field = HeightField::generate(config, &mut rng).unwrap();
        let center = field.cells()[4];
        assert_eq!(center.nw, -0.5);
        assert_eq!(center.ne, -0.25);
        assert_eq!(center.sw, 0.25);
        // 1.0 is clamped just below one by the scripted stream.
        assert!((center.se - 0.5).abs() < 1e-5);
    }

    #[test]
    fn synthesized_corners_average_the_copied_ones() {
        let config = TerrainConfig {
            width: 2,
            height: 1,
            height_interval: 1.0,
        };
        // Cell 1 is the start; cell 0 copies its west edge and synthesizes
        // the other two corners from the average of the copied pair.
        let mut rng = SequenceRandom::new(vec![0.9, 0.1, 0.3, 0.7, 0.5, 0.8]);
        let field = HeightField::generate(config, &mut rng).unwrap();
        let [west, start] = [field.cells()[0], field.cells()[1]];
        assert_eq!(west.ne, start.nw);
        assert_eq!(west.se, start.sw);

        let average = (start.nw + start.sw) / 2.0;
        assert!((west.nw - average).abs() < 1e-5);
        assert!((west.sw - (average + 0.3)).abs() < 1e-5);
        assert_eq!(rng.drawn(), 6);
    }

    #[test]
    fn neutral_draws_give_flat_field() {
        let field = HeightField::generate(TerrainConfig::default(), &mut SequenceRandom::constant(0.5)).unwrap();
        assert!(field.cells().iter().all(|c| c.min_height() == 0.0 && c.max_height() == 0.0));
    }

    #[test]
    fn bounding_boxes_match_corners_and_footprint() {
        let field = seeded_field(5);
        let x_off = field.config().x_offset();
        let y_off = field.config().y_offset();
        for (idx, (cell, bb)) in field.cells().iter().zip(field.bounding_boxes()).enumerate() {
            let (x, y) = field.cell_coords(idx).unwrap();
            assert_eq!(bb.min.y, cell.min_height());
            assert_eq!(bb.max.y, cell.max_height());
            assert_eq!(bb.min.x, x as f32 - x_off - 0.5);
            assert_eq!(bb.max.x, x as f32 - x_off + 0.5);
            assert_eq!(bb.min.z, y as f32 - y_off - 0.5);
            assert_eq!(bb.max.z, y as f32 - y_off + 0.5);
        }
    }

    #[test]
    fn center_cell_sits_on_origin() {
        let field = seeded_field(3);
        let center = field.cell_index(25, 25).unwrap();
        assert_eq!(field.cell_center(center), Some(Vec3::ZERO));
    }

    #[test]
    fn rejects_empty_grid_and_bad_interval() {
        let mut rng = StdRng::seed_from_u64(0);
        let empty = TerrainConfig {
            width: 0,
            ..Default::default()
        };
        assert_eq!(
            HeightField::generate(empty, &mut rng).unwrap_err(),
            TerrainError::EmptyGrid { width: 0, height: 51 }
        );
        let bad = TerrainConfig {
            height_interval: f32::NAN,
            ..Default::default()
        };
        assert!(matches!(
            HeightField::generate(bad, &mut rng),
            Err(TerrainError::InvalidInterval(_))
        ));
    }

    #[test]
    fn ground_height_is_box_midpoint() {
        let field = seeded_field(8);
        let (idx, h) = field.ground_height_at(0.1, -0.2).unwrap();
        assert_eq!(idx, field.cell_index(25, 25).unwrap());
        assert_eq!(h, field.bounding_boxes()[idx].mid_y());
    }

    #[test]
    fn ground_outside_grid_is_none() {
        let field = seeded_field(8);
        assert!(field.ground_height_at(100.0, 0.0).is_none());
    }

    #[test]
    fn triangle_pick_on_flat_cell() {
        let field = HeightField::generate(TerrainConfig::default(), &mut SequenceRandom::constant(0.5)).unwrap();
        let center = field.cell_index(25, 25).unwrap();
        let ray = Ray::downward(Vec3::new(0.2, 10.0, 0.3));
        let (point, idx) = field.cell_triangle_intersection(&ray, center).unwrap();
        assert_eq!(idx, center);
        assert!((point - Vec3::new(0.2, 0.0, 0.3)).length() < 1e-5);

        let neighbor = field.cell_index(26, 25).unwrap();
        assert!(field.cell_triangle_intersection(&ray, neighbor).is_none());
    }

    #[test]
    fn raycast_finds_nearest_cell() {
        let field = seeded_field(21);
        let ray = Ray::new(Vec3::new(-3.0, 20.0, 4.0), Vec3::new(0.1, -1.0, 0.05).normalize());
        let (idx, point) = field.raycast(&ray).unwrap();
        let bb = field.bounding_boxes()[idx];
        assert!(bb.contains_xz(point.x, point.z));
        assert!(point.y >= bb.min.y - 1e-4 && point.y <= bb.max.y + 1e-4);
    }

    #[test]
    fn random_cell_stays_in_range() {
        let field = seeded_field(2);
        let mut top = SequenceRandom::constant(0.999_999);
        assert_eq!(field.random_cell(&mut top), field.cell_count() - 1);
        let mut bottom = SequenceRandom::constant(0.0);
        assert_eq!(field.random_cell(&mut bottom), 0);
    }

    #[test]
    fn extent_and_colors() {
        let field = seeded_field(2);
        assert!(field.contains_xz(25.5, -25.5));
        assert!(!field.contains_xz(25.6, 0.0));

        let center = field.cell_index(25, 25).unwrap();
        assert_eq!(field.cell_color(center), Color::rgb(200, 150, 20));
        assert_eq!(field.cell_color(0), Color::rgb(150, 100, 20));

        let verts = field.surface_vertices(Some(center));
        assert_eq!(verts.len(), field.cell_count() * 6);
        assert_eq!(verts[center * 6].color, Color::RAY_WHITE.to_f32_array());
    }
}
