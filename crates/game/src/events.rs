//! Requests the scene hands back to its owner each frame.

use engine_core::Color;
use glam::Vec3;

use crate::hack::HackTicket;

/// Fire-and-forget notifications for the render, effect and UI layers.
#[derive(Debug, Clone)]
pub enum SceneEvent {
    /// Viewport changed; size-dependent GPU resources must be rebuilt.
    ResourcesInvalidated,
    /// The height field was regenerated; terrain meshes must be re-uploaded.
    TerrainChanged,
    /// Push the hack minigame. The scene polls the ticket on later frames.
    RequestHack(HackTicket),
    SpawnElectricArc { position: Vec3, color: Color },
    SpawnSparks { position: Vec3, color: Color },
}
