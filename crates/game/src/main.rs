//! Walker demo: procedural terrain with four-legged walkers, run headless
//! from a scripted input track.

mod camera;
mod config;
mod events;
mod hack;
mod leg;
mod scene;
mod walker;

use anyhow::Result;
use engine_core::FrameTime;
use glam::Vec2;
use input::{ElementState, InputState, KeyCode, MouseButton};
use rand::rngs::StdRng;
use rand::SeedableRng;

use camera::PerspectiveProjector;
use config::SimConfig;
use events::SceneEvent;
use hack::HackTicket;
use scene::{FrameInput, SceneController};

/// Frames the stand-in minigame takes before it reports success.
const HACK_FRAMES: u32 = 90;

/// One scripted input action.
#[derive(Debug, Clone, Copy)]
enum Cue {
    Key(KeyCode, ElementState),
    Click(Vec2),
}

/// Scripted input track, sorted by frame.
fn demo_script(viewport: Vec2) -> Vec<(u32, Cue)> {
    let center = viewport / 2.0;
    vec![
        (30, Cue::Click(center + Vec2::new(120.0, 80.0))),
        (120, Cue::Click(center)),
        (400, Cue::Key(KeyCode::KeyW, ElementState::Pressed)),
        (700, Cue::Key(KeyCode::KeyW, ElementState::Released)),
        (700, Cue::Key(KeyCode::KeyA, ElementState::Pressed)),
        (760, Cue::Key(KeyCode::KeyA, ElementState::Released)),
        (760, Cue::Key(KeyCode::ArrowUp, ElementState::Pressed)),
        (1000, Cue::Key(KeyCode::ArrowUp, ElementState::Released)),
        (1100, Cue::Key(KeyCode::KeyR, ElementState::Pressed)),
        (1101, Cue::Key(KeyCode::KeyR, ElementState::Released)),
    ]
}

fn apply_cue(input: &mut InputState, cue: Cue) {
    match cue {
        Cue::Key(key, state) => input.process_keyboard(key, state),
        Cue::Click(point) => {
            input.process_cursor_position((point.x as f64, point.y as f64));
            input.process_mouse_button(MouseButton::Left, ElementState::Pressed);
            input.process_mouse_button(MouseButton::Left, ElementState::Released);
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = SimConfig::load();
    let rng = match config.terrain.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    log::info!("Starting walker demo for {} frames", config.scene.demo_frames);

    let mut scene = SceneController::new(config.clone(), rng)?;
    let projector = PerspectiveProjector::default();
    let mut input = InputState::new();
    let mut time = FrameTime::new();
    let script = demo_script(projector.viewport);
    let mut cursor = 0;
    let mut hacks: Vec<(HackTicket, u32)> = Vec::new();
    let mut effects = 0;

    for frame in 0..config.scene.demo_frames {
        input.begin_frame();
        while let Some(&(at, cue)) = script.get(cursor) {
            if at > frame {
                break;
            }
            apply_cue(&mut input, cue);
            cursor += 1;
        }

        // Stand-in for the minigame screen: succeed after a fixed delay.
        hacks.retain_mut(|(ticket, remaining)| {
            *remaining = remaining.saturating_sub(1);
            if *remaining == 0 {
                ticket.resolve(true);
                false
            } else {
                true
            }
        });

        let dt = time.advance(config.scene.fixed_dt);
        let frame_input = FrameInput::from_input(&input, frame == 0);
        for event in scene.update(dt, &frame_input, &projector) {
            match event {
                SceneEvent::ResourcesInvalidated => log::debug!("Frame {}: resources invalidated", frame),
                SceneEvent::TerrainChanged => log::info!("Frame {}: terrain regenerated", frame),
                SceneEvent::RequestHack(ticket) => {
                    log::info!("Frame {}: hack requested", frame);
                    hacks.push((ticket, HACK_FRAMES));
                }
                SceneEvent::SpawnElectricArc { position, color } | SceneEvent::SpawnSparks { position, color } => {
                    effects += 1;
                    log::debug!("Frame {}: effect at {:?} in {:?}", frame, position, color);
                }
            }
        }
    }

    let snapshot = scene.snapshot();
    for (i, pose) in snapshot.walkers.iter().enumerate() {
        log::info!(
            "Walker {}: body ({:.2}, {:.2}, {:.2}) facing {:.2} rad{}",
            i,
            pose.body.x,
            pose.body.y,
            pose.body.z,
            pose.rotation,
            if pose.player_controlled { " [player]" } else { "" }
        );
    }
    log::info!(
        "Simulated {:.1} s over {} frames: {} terrain vertices, {} effects spawned, last hit {:?}",
        time.elapsed_seconds(),
        time.frame_count(),
        snapshot.terrain.len(),
        effects,
        scene.last_hit().map(|(cell, _)| cell)
    );

    Ok(())
}
