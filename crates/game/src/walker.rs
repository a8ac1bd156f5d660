//! Four-legged walker: body motion, autonomous roaming, player control and
//! the per-leg gait driven from it.

use std::f32::consts::{PI, TAU};

use engine_core::RandomSource;
use glam::Vec3;
use input::PlayerCommand;
use physics::Aabb;
use procgen::HeightField;

use crate::config::WalkerConfig;
use crate::leg::{BodyFrame, Corner, Leg, LegState};

/// Autonomous body motion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyState {
    Stopped,
    RotatingToFace,
    Translating,
}

/// Who drives the body. Exactly one of the two at any time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlMode {
    Autonomous,
    Player(PlayerCommand),
}

/// Wrap an angle into `[0, 2π)`.
fn wrap_angle(angle: f32) -> f32 {
    let wrapped = angle.rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs.
    if wrapped >= TAU {
        0.0
    } else {
        wrapped
    }
}

/// Signed shortest turn from `from` to `to`, in `(-π, π]`.
fn shortest_turn(from: f32, to: f32) -> f32 {
    let mut diff = to - from;
    if diff > PI {
        diff -= TAU;
    } else if diff <= -PI {
        diff += TAU;
    }
    diff
}

#[derive(Debug, Clone)]
pub struct Walker {
    config: WalkerConfig,
    position: Vec3,
    target_position: Vec3,
    rotation: f32,
    target_rotation: f32,
    state: BodyState,
    control: ControlMode,
    /// Indexed by `Corner::index`.
    legs: [Leg; 4],
    roam_timer: f32,
    roam_interval: f32,
    bob_phase: f32,
}

impl Walker {
    /// Spawn with the body at `position`. Feet start level with the body,
    /// slightly jittered around their corners, and drop to the ground on the
    /// first update.
    pub fn new(position: Vec3, config: WalkerConfig, rng: &mut impl RandomSource) -> Self {
        let roam_interval = Self::roll_interval(&config, rng);
        let mut jitter = || (rng.random() - 0.5) / config.init_jitter_div;
        let legs = Corner::ALL.map(|corner| {
            let offset = Vec3::new(jitter(), 0.0, jitter());
            Leg::new(corner, position + offset + corner.direction() * config.body_feet_radius)
        });

        Self {
            config,
            position,
            target_position: position,
            rotation: 0.0,
            target_rotation: 0.0,
            state: BodyState::Stopped,
            control: ControlMode::Autonomous,
            legs,
            roam_timer: 0.0,
            roam_interval,
            bob_phase: 0.0,
        }
    }

    fn roll_interval(config: &WalkerConfig, rng: &mut impl RandomSource) -> f32 {
        config.roaming_wait + rng.random() * config.roaming_variance
    }

    pub fn config(&self) -> &WalkerConfig {
        &self.config
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn target_position(&self) -> Vec3 {
        self.target_position
    }

    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    pub fn target_rotation(&self) -> f32 {
        self.target_rotation
    }

    pub fn state(&self) -> BodyState {
        self.state
    }

    pub fn control(&self) -> ControlMode {
        self.control
    }

    pub fn is_player_controlled(&self) -> bool {
        matches!(self.control, ControlMode::Player(_))
    }

    pub fn legs(&self) -> &[Leg; 4] {
        &self.legs
    }

    pub fn leg(&self, corner: Corner) -> &Leg {
        &self.legs[corner.index()]
    }

    pub fn airborne_legs(&self) -> usize {
        self.legs.iter().filter(|l| l.state().is_airborne()).count()
    }

    pub fn bob_phase(&self) -> f32 {
        self.bob_phase
    }

    /// Vertical offset of the idle bob.
    pub fn bob_offset(&self) -> f32 {
        self.config.idle_bob_amount * (self.bob_phase + PI).sin()
    }

    /// Hit volume of the body, following the bob.
    pub fn body_bounding_box(&self) -> Aabb {
        let bob = self.bob_offset();
        Aabb::new(
            self.position - Vec3::new(0.5, -bob, 0.5),
            self.position + Vec3::new(0.5, 1.0 + bob, 0.5),
        )
    }

    /// Unit facing on the horizontal plane.
    pub fn facing(&self) -> Vec3 {
        Vec3::new(self.rotation.cos(), 0.0, -self.rotation.sin())
    }

    /// Head for `target`; the body ends exactly there.
    pub fn set_target_position(&mut self, target: Vec3) {
        if target == self.target_position {
            return;
        }
        self.target_position = target;
        let d = target - self.position;
        self.target_rotation = wrap_angle((-d.z).atan2(d.x));
        self.state = BodyState::RotatingToFace;
    }

    /// Head for a point on the ground; the body rests `body_height` above it.
    pub fn set_ground_target(&mut self, ground: Vec3) {
        self.set_target_position(ground + Vec3::Y * self.config.body_height);
    }

    /// Hand the body to the player, or back to autonomous roaming. Either way
    /// the body stops where it is.
    pub fn set_player_controlled(&mut self, controlled: bool, rng: &mut impl RandomSource) {
        self.control = if controlled {
            ControlMode::Player(PlayerCommand::Idle)
        } else {
            ControlMode::Autonomous
        };
        self.state = BodyState::Stopped;
        self.target_position = self.position;
        self.roam_timer = 0.0;
        self.roam_interval = Self::roll_interval(&self.config, rng);
    }

    /// Ignored unless player controlled.
    pub fn set_player_command(&mut self, command: PlayerCommand) {
        if let ControlMode::Player(current) = &mut self.control {
            *current = command;
        }
    }

    fn is_moving(&self) -> bool {
        match self.control {
            ControlMode::Autonomous => self.state != BodyState::Stopped,
            ControlMode::Player(command) => command != PlayerCommand::Idle,
        }
    }

    /// Advance one frame. A zero `dt` only settles uninitialized legs.
    pub fn update(&mut self, dt: f32, field: &HeightField, rng: &mut impl RandomSource) {
        for leg in &mut self.legs {
            if leg.state() == LegState::Uninitialized {
                leg.settle(field);
            }
        }
        if dt <= 0.0 {
            return;
        }

        match self.control {
            ControlMode::Autonomous => {
                self.update_roaming(dt, field, rng);
                self.update_body(dt);
            }
            ControlMode::Player(command) => self.update_player(dt, command, field),
        }
        self.update_bob(dt);
        self.update_legs(dt, field);
    }

    fn update_roaming(&mut self, dt: f32, field: &HeightField, rng: &mut impl RandomSource) {
        if self.state != BodyState::Stopped {
            return;
        }
        self.roam_timer += dt;
        if self.roam_timer <= self.roam_interval {
            return;
        }
        self.roam_timer = 0.0;
        self.roam_interval = Self::roll_interval(&self.config, rng);

        let cell = field.random_cell(rng);
        let Some(center) = field.cell_center(cell) else {
            return;
        };
        match field.ground_height_at(center.x, center.z) {
            Some((_, ground)) => {
                log::trace!("Roaming to cell {} at ({:.1}, {:.1})", cell, center.x, center.z);
                self.set_ground_target(Vec3::new(center.x, ground, center.z));
            }
            None => log::debug!("No ground under roam target cell {}", cell),
        }
    }

    fn update_body(&mut self, dt: f32) {
        match self.state {
            BodyState::Stopped => {}
            BodyState::RotatingToFace => {
                let diff = shortest_turn(self.rotation, self.target_rotation);
                let step = self.config.rotation_speed * dt;
                if diff.abs() <= step {
                    self.rotation = self.target_rotation;
                    self.state = BodyState::Translating;
                } else {
                    self.rotation = wrap_angle(self.rotation + step * diff.signum());
                }
            }
            BodyState::Translating => {
                let prev = self.position.distance(self.target_position);
                let dir = (self.target_position - self.position).normalize_or_zero();
                self.position += dir * self.config.body_speed * dt;
                if self.position.distance(self.target_position) >= prev {
                    self.position = self.target_position;
                    self.state = BodyState::Stopped;
                }
            }
        }
    }

    fn update_player(&mut self, dt: f32, command: PlayerCommand, field: &HeightField) {
        let turn = self.config.rotation_speed * dt;
        match command {
            PlayerCommand::Idle => {}
            PlayerCommand::TurnLeft => self.rotation = wrap_angle(self.rotation + turn),
            PlayerCommand::TurnRight => self.rotation = wrap_angle(self.rotation - turn),
            PlayerCommand::GoForward => {
                let step = self.facing() * self.config.body_speed * dt;
                let next = self.position + step;
                if field.contains_xz(next.x, next.z) {
                    self.position = next;
                    if let Some((_, ground)) = field.ground_height_at(next.x, next.z) {
                        let rest = ground + self.config.body_height;
                        self.position.y += (rest - self.position.y) * self.config.height_rate * dt;
                    }
                } else {
                    log::trace!("Forward step to ({:.2}, {:.2}) leaves the terrain", next.x, next.z);
                }
            }
        }

        // Feet lead along the facing while walking, and settle under the body otherwise.
        self.target_position = if command == PlayerCommand::GoForward {
            self.position + self.facing()
        } else {
            self.position
        };
        self.target_rotation = self.rotation;
    }

    fn update_bob(&mut self, dt: f32) {
        let advance = self.config.idle_bob_rate * dt;
        if !self.is_moving() {
            self.bob_phase = wrap_angle(self.bob_phase + advance);
        } else if self.bob_phase > 0.0 {
            // Finish the current half-wave so the body lands back on its rest height.
            let prev = self.bob_phase;
            self.bob_phase += advance;
            if (prev < PI && self.bob_phase >= PI) || self.bob_phase >= TAU {
                self.bob_phase = 0.0;
            }
        }
    }

    fn update_legs(&mut self, dt: f32, field: &HeightField) {
        let body = BodyFrame {
            position: self.position,
            target: self.target_position,
            rotation: self.rotation,
        };
        for corner in Corner::UPDATE_ORDER {
            let i = corner.index();
            let others_grounded = self
                .legs
                .iter()
                .enumerate()
                .filter(|(j, leg)| *j != i && leg.is_grounded())
                .count();
            self.legs[i].update(dt, &body, others_grounded, &self.config, field);
        }
    }
}
