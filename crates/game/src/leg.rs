//! One walker leg: its corner identity and the grounded → lifting →
//! translating → lowering step cycle.

use glam::{Quat, Vec3};
use procgen::HeightField;

use crate::config::WalkerConfig;

/// Height above a planned foothold from which its ground probe starts.
const FOOTHOLD_PROBE_HEIGHT: f32 = 5.0;
/// Body motion shorter than this does not steer foot placement.
const INTENT_THRESHOLD: f32 = 0.1;

/// Which corner of the body a leg belongs to. Fixed for the leg's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Corner {
    Nw,
    Ne,
    Sw,
    Se,
}

impl Corner {
    /// Storage order of a walker's legs.
    pub const ALL: [Corner; 4] = [Corner::Nw, Corner::Ne, Corner::Sw, Corner::Se];
    /// Order in which legs are stepped each frame.
    pub const UPDATE_ORDER: [Corner; 4] = [Corner::Nw, Corner::Sw, Corner::Ne, Corner::Se];

    pub fn index(self) -> usize {
        match self {
            Corner::Nw => 0,
            Corner::Ne => 1,
            Corner::Sw => 2,
            Corner::Se => 3,
        }
    }

    /// Unit diagonal in body space (north is -Z, east is +X).
    pub fn direction(self) -> Vec3 {
        let (x, z) = match self {
            Corner::Nw => (-1.0, -1.0),
            Corner::Ne => (1.0, -1.0),
            Corner::Sw => (-1.0, 1.0),
            Corner::Se => (1.0, 1.0),
        };
        Vec3::new(x, 0.0, z).normalize()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegState {
    /// Not yet placed on the ground.
    Uninitialized,
    Grounded,
    Lifting,
    Translating,
    Lowering,
}

impl LegState {
    pub fn is_airborne(self) -> bool {
        matches!(self, LegState::Lifting | LegState::Translating | LegState::Lowering)
    }
}

/// Body pose a leg plans its footholds against.
#[derive(Debug, Clone, Copy)]
pub struct BodyFrame {
    pub position: Vec3,
    pub target: Vec3,
    pub rotation: f32,
}

#[derive(Debug, Clone)]
pub struct Leg {
    corner: Corner,
    position: Vec3,
    target: Vec3,
    lift_start_y: f32,
    state: LegState,
}

fn flatten(v: Vec3) -> Vec3 {
    Vec3::new(v.x, 0.0, v.z)
}

impl Leg {
    pub fn new(corner: Corner, position: Vec3) -> Self {
        Self {
            corner,
            position,
            target: position,
            lift_start_y: position.y,
            state: LegState::Uninitialized,
        }
    }

    pub fn corner(&self) -> Corner {
        self.corner
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn target(&self) -> Vec3 {
        self.target
    }

    pub fn state(&self) -> LegState {
        self.state
    }

    pub fn is_grounded(&self) -> bool {
        self.state == LegState::Grounded
    }

    /// Drop the foot straight down onto the terrain. Leaves the height alone
    /// when nothing is below.
    pub fn settle(&mut self, field: &HeightField) {
        match field.ground_probe(self.position) {
            Some((_, ground)) => {
                self.position.y = ground;
                self.target.y = ground;
            }
            None => log::debug!(
                "{:?} leg at ({:.2}, {:.2}) found no ground",
                self.corner,
                self.position.x,
                self.position.z
            ),
        }
        self.state = LegState::Grounded;
    }

    /// Where this foot would rest under the body right now, at the current
    /// foothold's height.
    pub fn ideal_position(&self, body: &BodyFrame, config: &WalkerConfig) -> Vec3 {
        let anchor = Vec3::new(body.position.x, self.target.y, body.position.z);
        anchor + Quat::from_rotation_y(body.rotation) * self.corner.direction() * config.body_feet_radius
    }

    /// Advance the step cycle. `others_grounded` is the live count of the
    /// walker's other grounded legs; a step only starts when it is at least two.
    /// A non-positive `dt` may plan a step but never moves the foot.
    pub(crate) fn update(
        &mut self,
        dt: f32,
        body: &BodyFrame,
        others_grounded: usize,
        config: &WalkerConfig,
        field: &HeightField,
    ) {
        if self.state == LegState::Uninitialized {
            self.settle(field);
        }

        if self.state == LegState::Grounded && others_grounded >= 2 {
            self.plan_step(body, config, field);
        }

        if dt <= 0.0 {
            return;
        }

        if self.state == LegState::Lifting {
            self.position.y += dt * config.lift_speed;
            let apex = self.lift_start_y + config.lift_height;
            if self.position.y > apex {
                self.position.y = apex;
                self.state = LegState::Translating;
            }
        }

        if self.state == LegState::Translating {
            let flat_target = Vec3::new(self.target.x, self.position.y, self.target.z);
            let prev = self.position.distance(flat_target);
            let dir = (flat_target - self.position).normalize_or_zero();
            self.position += dir * dt * config.horizontal_speed;
            if self.position.distance(flat_target) >= prev {
                self.position.x = self.target.x;
                self.position.z = self.target.z;
                self.state = LegState::Lowering;
            }
        }

        if self.state == LegState::Lowering {
            self.position.y -= dt * config.lift_speed;
            if self.position.y < self.target.y {
                self.position.y = self.target.y;
                self.state = LegState::Grounded;
            }
        }
    }

    fn plan_step(&mut self, body: &BodyFrame, config: &WalkerConfig, field: &HeightField) {
        let ideal = self.ideal_position(body, config);
        if ideal.distance(self.target) <= config.feet_radius * config.placement_check_scale {
            return;
        }

        let motion = flatten(body.target - body.position);
        let dir = if motion.length() > INTENT_THRESHOLD {
            motion.normalize()
        } else {
            flatten(ideal - self.target).normalize_or_zero()
        };

        let mut foothold = ideal + dir * config.feet_radius * config.placement_scale;
        match field.ground_probe(foothold + Vec3::Y * FOOTHOLD_PROBE_HEIGHT) {
            Some((_, ground)) => foothold.y = ground,
            None => log::debug!(
                "{:?} foothold at ({:.2}, {:.2}) is off the terrain",
                self.corner,
                foothold.x,
                foothold.z
            ),
        }

        self.target = foothold;
        self.lift_start_y = self.position.y;
        self.state = LegState::Lifting;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine_core::SequenceRandom;
    use procgen::TerrainConfig;

    fn flat_field() -> HeightField {
        HeightField::generate(TerrainConfig::default(), &mut SequenceRandom::constant(0.5)).unwrap()
    }

    fn still_body(position: Vec3) -> BodyFrame {
        BodyFrame {
            position,
            target: position,
            rotation: 0.0,
        }
    }

    #[test]
    fn corner_directions_are_unit_diagonals() {
        for corner in Corner::ALL {
            let d = corner.direction();
            assert!((d.length() - 1.0).abs() < 1e-6);
            assert_eq!(d.y, 0.0);
            assert_eq!(Corner::ALL[corner.index()], corner);
        }
        assert!(Corner::Ne.direction().x > 0.0 && Corner::Ne.direction().z < 0.0);
    }

    #[test]
    fn settle_grounds_on_box_midpoint() {
        let field = flat_field();
        let mut leg = Leg::new(Corner::Sw, Vec3::new(1.2, 3.0, -0.4));
        leg.settle(&field);
        assert_eq!(leg.state(), LegState::Grounded);
        assert_eq!(leg.position().y, 0.0);
        assert_eq!(leg.target().y, 0.0);
    }

    #[test]
    fn settle_off_terrain_keeps_height() {
        let field = flat_field();
        let mut leg = Leg::new(Corner::Nw, Vec3::new(80.0, 3.0, 0.0));
        leg.settle(&field);
        assert_eq!(leg.state(), LegState::Grounded);
        assert_eq!(leg.position().y, 3.0);
    }

    #[test]
    fn needs_two_other_grounded_legs_to_step() {
        let field = flat_field();
        let config = WalkerConfig::default();
        let mut leg = Leg::new(Corner::Ne, Vec3::new(0.0, 0.0, 0.0));
        leg.settle(&field);

        let body = still_body(Vec3::new(6.0, 2.0, 0.0));
        leg.update(0.01, &body, 1, &config, &field);
        assert_eq!(leg.state(), LegState::Grounded);
        leg.update(0.01, &body, 2, &config, &field);
        assert_eq!(leg.state(), LegState::Lifting);
    }

    /// A displaced leg runs one full cycle and then stays put.
    #[test]
    fn step_cycle_closes() {
        let field = flat_field();
        let config = WalkerConfig::default();
        let body = still_body(Vec3::new(4.0, 2.0, 3.0));
        let mut leg = Leg::new(Corner::Se, Vec3::new(0.0, 0.0, 0.0));
        leg.settle(&field);

        let mut seen = vec![leg.state()];
        let mut steps = 0;
        loop {
            leg.update(1.0 / 60.0, &body, 3, &config, &field);
            if seen.last() != Some(&leg.state()) {
                seen.push(leg.state());
            }
            steps += 1;
            if leg.state() == LegState::Grounded && seen.len() > 1 {
                break;
            }
            assert!(steps < 600, "leg never landed: {:?}", seen);
        }
        assert_eq!(
            seen,
            vec![
                LegState::Grounded,
                LegState::Lifting,
                LegState::Translating,
                LegState::Lowering,
                LegState::Grounded
            ]
        );
        assert_eq!(leg.position(), leg.target());

        let rest = leg.position();
        for _ in 0..600 {
            leg.update(1.0 / 60.0, &body, 3, &config, &field);
        }
        assert_eq!(leg.state(), LegState::Grounded);
        assert_eq!(leg.position(), rest);
    }

    #[test]
    fn foothold_leads_in_direction_of_travel() {
        let field = flat_field();
        let config = WalkerConfig::default();
        let mut leg = Leg::new(Corner::Nw, Vec3::new(-5.0, 0.0, 0.0));
        leg.settle(&field);

        let body = BodyFrame {
            position: Vec3::new(0.0, 2.0, 0.0),
            target: Vec3::new(10.0, 2.0, 0.0),
            rotation: 0.0,
        };
        leg.update(0.0, &body, 3, &config, &field);
        let ideal = leg.ideal_position(&body, &config);
        let expected_x = ideal.x + config.feet_radius * config.placement_scale;
        assert!((leg.target().x - expected_x).abs() < 1e-5);
        assert!((leg.target().z - ideal.z).abs() < 1e-5);
        assert_eq!(leg.target().y, 0.0);
    }

    #[test]
    fn translating_foot_holds_still_without_time() {
        let field = flat_field();
        let config = WalkerConfig::default();
        let body = still_body(Vec3::new(4.0, 2.0, 3.0));
        let mut leg = Leg::new(Corner::Se, Vec3::new(0.0, 0.0, 0.0));
        leg.settle(&field);

        let mut frames = 0;
        while leg.state() != LegState::Translating {
            leg.update(1.0 / 60.0, &body, 3, &config, &field);
            frames += 1;
            assert!(frames < 600, "leg never reached the apex");
        }

        let held = leg.position();
        for _ in 0..10 {
            leg.update(0.0, &body, 3, &config, &field);
        }
        assert_eq!(leg.state(), LegState::Translating);
        assert_eq!(leg.position(), held);
        assert_ne!(leg.position().x, leg.target().x);
    }
}
