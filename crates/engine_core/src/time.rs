//! Frame timing for the simulation loop.
//!
//! Nothing in the simulation reads a clock; the host measures or fixes the
//! frame delta and pushes it through [`FrameTime::advance`].

/// Largest delta accepted for one frame. Longer stalls (tab switch, debugger)
/// are clamped so walkers do not teleport across the field.
pub const MAX_FRAME_DELTA: f32 = 0.1;

/// Tracks elapsed time and frame count.
#[derive(Debug, Clone)]
pub struct FrameTime {
    /// Total simulated time in seconds.
    elapsed: f64,
    /// Frames advanced since creation.
    frame_count: u64,
    /// Upper bound for a single delta.
    max_delta: f32,
}

impl Default for FrameTime {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameTime {
    pub fn new() -> Self {
        Self {
            elapsed: 0.0,
            frame_count: 0,
            max_delta: MAX_FRAME_DELTA,
        }
    }

    /// Start a new frame with the measured delta. Returns the clamped delta.
    pub fn advance(&mut self, raw_delta: f32) -> f32 {
        let delta = if raw_delta.is_finite() {
            raw_delta.clamp(0.0, self.max_delta)
        } else {
            log::warn!("Non-finite frame delta {}, treating as zero", raw_delta);
            0.0
        };
        self.elapsed += delta as f64;
        self.frame_count += 1;
        delta
    }

    /// Total elapsed time in seconds.
    pub fn elapsed_seconds(&self) -> f64 {
        self.elapsed
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }
}
