//! Scene controller: owns the terrain and walkers, resolves pointer input,
//! drives the camera and sequences terrain resets.

use engine_core::{NeonColor, RandomSource};
use glam::{Vec2, Vec3};
use input::{InputState, PlayerCommand};
use physics::{ray_aabb, Ray};
use procgen::{HeightField, SurfaceTriangle, SurfaceVertex, TerrainError};

use crate::camera::{CameraPose, RayProjector, SmoothedCamera};
use crate::config::SimConfig;
use crate::events::SceneEvent;
use crate::hack::{HackOutcome, HackTicket};
use crate::leg::Corner;
use crate::walker::Walker;

/// Spacing between walkers along X at spawn.
const SPAWN_SPACING: f32 = 4.0;
/// Length of the debug segment drawn for a pointer ray that hit nothing.
const DEBUG_RAY_LENGTH: f32 = 100.0;

/// Everything the scene consumes from the outside world in one frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameInput {
    /// Screen position of a fresh pointer press.
    pub pointer_press: Option<Vec2>,
    /// Command for the player-controlled walker, if any.
    pub command: Option<PlayerCommand>,
    pub reset_terrain: bool,
    /// The viewport was resized this frame.
    pub resized: bool,
}

impl FrameInput {
    pub fn from_input(input: &InputState, resized: bool) -> Self {
        Self {
            pointer_press: input.pointer_press(),
            command: Some(input.player_command()),
            reset_terrain: input.is_reset_pressed(),
            resized,
        }
    }
}

#[derive(Debug, Clone)]
struct PendingTakeover {
    walker: usize,
    ticket: HackTicket,
}

/// Read-only view of one walker for drawing.
#[derive(Debug, Clone, PartialEq)]
pub struct WalkerPose {
    /// Body position including the idle bob.
    pub body: Vec3,
    pub rotation: f32,
    /// Foot positions in `Corner::ALL` order.
    pub legs: [Vec3; 4],
    pub player_controlled: bool,
}

/// Per-frame draw data.
#[derive(Debug, Clone)]
pub struct SceneSnapshot {
    pub walkers: Vec<WalkerPose>,
    pub terrain: Vec<SurfaceVertex>,
    /// Fragments of the previous terrain while a reset animates.
    pub fragments: Vec<[Vec3; 3]>,
    pub camera: CameraPose,
    pub highlighted_cell: Option<usize>,
    pub debug_points: Vec<Vec3>,
}

pub struct SceneController<R: RandomSource> {
    config: SimConfig,
    field: HeightField,
    walkers: Vec<Walker>,
    controlled: Option<usize>,
    pending: Option<PendingTakeover>,
    last_hit: Option<(usize, Vec3)>,
    camera: SmoothedCamera,
    fragments: Vec<SurfaceTriangle>,
    reset_timer: f32,
    debug_points: Vec<Vec3>,
    rng: R,
}

impl<R: RandomSource> SceneController<R> {
    /// Generate the terrain and spawn the walkers in a row through the center.
    pub fn new(config: SimConfig, mut rng: R) -> Result<Self, TerrainError> {
        let field = HeightField::generate(config.terrain.to_terrain_config(), &mut rng)?;

        let count = config.scene.walker_count;
        let walkers = (0..count)
            .map(|i| {
                let x = (i as f32 - (count as f32 - 1.0) / 2.0) * SPAWN_SPACING;
                let ground = field.ground_height_at(x, 0.0).map_or(0.0, |(_, h)| h);
                let body = Vec3::new(x, ground + config.walker.body_height, 0.0);
                Walker::new(body, config.walker.clone(), &mut rng)
            })
            .collect();

        let camera = SmoothedCamera::new(
            Vec3::ZERO,
            Vec3::from_array(config.scene.camera_offset),
            config.scene.camera_rate,
        );

        log::info!(
            "Scene ready: {}x{} terrain, {} walkers",
            field.width(),
            field.height(),
            count
        );

        Ok(Self {
            config,
            field,
            walkers,
            controlled: None,
            pending: None,
            last_hit: None,
            camera,
            fragments: Vec::new(),
            reset_timer: 0.0,
            debug_points: Vec::new(),
            rng,
        })
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn field(&self) -> &HeightField {
        &self.field
    }

    pub fn walkers(&self) -> &[Walker] {
        &self.walkers
    }

    pub fn walker_mut(&mut self, index: usize) -> Option<&mut Walker> {
        self.walkers.get_mut(index)
    }

    /// Index of the player-controlled walker.
    pub fn controlled(&self) -> Option<usize> {
        self.controlled
    }

    /// Walker waiting on the hack minigame.
    pub fn pending_takeover(&self) -> Option<usize> {
        self.pending.as_ref().map(|p| p.walker)
    }

    pub fn last_hit(&self) -> Option<(usize, Vec3)> {
        self.last_hit
    }

    pub fn camera(&self) -> &SmoothedCamera {
        &self.camera
    }

    pub fn is_resetting(&self) -> bool {
        self.reset_timer > 0.0
    }

    /// Advance one frame.
    pub fn update(&mut self, dt: f32, input: &FrameInput, projector: &impl RayProjector) -> Vec<SceneEvent> {
        let mut events = Vec::new();

        if input.resized {
            events.push(SceneEvent::ResourcesInvalidated);
        }

        if !self.poll_takeover(&mut events) {
            // The minigame is on top; nothing below it moves.
            return events;
        }

        if let Some(point) = input.pointer_press {
            let ray = projector.screen_point_to_world_ray(point, self.camera.pose());
            self.handle_pointer(&ray, &mut events);
        }

        if let (Some(command), Some(idx)) = (input.command, self.controlled) {
            if let Some(walker) = self.walkers.get_mut(idx) {
                walker.set_player_command(command);
            }
        }

        if input.reset_terrain {
            match self.reset_terrain() {
                Ok(()) => events.push(SceneEvent::TerrainChanged),
                Err(e) => log::error!("Terrain reset failed: {}", e),
            }
        }

        if let Some(walker) = self.controlled.and_then(|i| self.walkers.get(i)) {
            self.camera.look_at(walker.position());
        }
        self.camera.update(dt);

        let walker_dt = if self.reset_timer > 0.0 {
            self.reset_timer -= dt;
            for fragment in &mut self.fragments {
                fragment.update(dt);
            }
            if self.reset_timer <= 0.0 {
                self.reset_timer = 0.0;
                self.fragments.clear();
            }
            0.0
        } else {
            dt
        };

        for walker in &mut self.walkers {
            walker.update(walker_dt, &self.field, &mut self.rng);
        }

        events
    }

    /// Returns false while the scene must stay paused for the minigame.
    fn poll_takeover(&mut self, events: &mut Vec<SceneEvent>) -> bool {
        let Some(pending) = &self.pending else {
            return true;
        };
        let idx = pending.walker;
        match pending.ticket.outcome() {
            HackOutcome::Pending => return false,
            HackOutcome::Succeeded => {
                for (i, walker) in self.walkers.iter_mut().enumerate() {
                    if i != idx && walker.is_player_controlled() {
                        walker.set_player_controlled(false, &mut self.rng);
                    }
                }
                if let Some(walker) = self.walkers.get_mut(idx) {
                    walker.set_player_controlled(true, &mut self.rng);
                    let position = walker.position();
                    let color = NeonColor::random(&mut self.rng).color();
                    events.push(SceneEvent::SpawnElectricArc { position, color });
                    events.push(SceneEvent::SpawnSparks { position, color });
                    self.controlled = Some(idx);
                    log::info!("Took control of walker {}", idx);
                }
            }
            HackOutcome::Failed => log::info!("Hack failed, walker {} stays autonomous", idx),
        }
        self.pending = None;
        true
    }

    fn release_control(&mut self) {
        if let Some(prev) = self.controlled.take() {
            if let Some(walker) = self.walkers.get_mut(prev) {
                walker.set_player_controlled(false, &mut self.rng);
            }
        }
    }

    fn handle_pointer(&mut self, ray: &Ray, events: &mut Vec<SceneEvent>) {
        let walker_hit = self
            .walkers
            .iter()
            .enumerate()
            .filter_map(|(i, w)| ray_aabb(ray, &w.body_bounding_box()).map(|hit| (i, hit)))
            .min_by(|(_, a), (_, b)| a.distance.total_cmp(&b.distance));

        if let Some((idx, hit)) = walker_hit {
            self.debug_points = vec![ray.origin, hit.point];
            self.release_control();
            let ticket = HackTicket::new();
            self.pending = Some(PendingTakeover {
                walker: idx,
                ticket: ticket.clone(),
            });
            events.push(SceneEvent::RequestHack(ticket));
            log::debug!("Walker {} selected, waiting on hack", idx);
            return;
        }

        match self.field.raycast(ray) {
            Some((cell, point)) => {
                self.debug_points = vec![ray.origin, point];
                self.last_hit = Some((cell, point));
                self.camera.look_at(point);
                self.release_control();
                log::debug!("Terrain hit at cell {}", cell);
            }
            None => {
                self.debug_points = vec![ray.origin, ray.point_at(DEBUG_RAY_LENGTH)];
            }
        }
    }

    /// Tear the current terrain into fragments, generate a fresh field and
    /// freeze the walkers while the fragments drift away.
    pub fn reset_terrain(&mut self) -> Result<(), TerrainError> {
        let field = HeightField::generate(self.config.terrain.to_terrain_config(), &mut self.rng)?;
        self.fragments = self.field.to_triangles(&mut self.rng);
        self.field = field;
        self.last_hit = None;
        self.reset_timer = self.config.scene.reset_duration;
        log::info!("Terrain regenerated");
        Ok(())
    }

    pub fn snapshot(&self) -> SceneSnapshot {
        let walkers = self
            .walkers
            .iter()
            .map(|w| WalkerPose {
                body: w.position() + Vec3::Y * w.bob_offset(),
                rotation: w.rotation(),
                legs: Corner::ALL.map(|c| w.leg(c).position()),
                player_controlled: w.is_player_controlled(),
            })
            .collect();
        let highlighted_cell = self.last_hit.map(|(cell, _)| cell);

        SceneSnapshot {
            walkers,
            terrain: self.field.surface_vertices(highlighted_cell),
            fragments: self.fragments.iter().map(|f| f.world_vertices()).collect(),
            camera: *self.camera.pose(),
            highlighted_cell,
            debug_points: self.debug_points.clone(),
        }
    }
}
