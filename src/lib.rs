//! Ring Arena - shrinking-ring arena timing
//!
//! Core modules:
//! - `sim`: Deterministic simulation (ring shrink state machines, arena sequencing)
//! - `ui`: Countdown presentation tiers for an external text display
//! - `settings`: Data-driven match configuration
//! - `error`: Configuration errors

pub mod error;
pub mod settings;
pub mod sim;
pub mod ui;

pub use error::ConfigError;
pub use settings::{ArenaSettings, CloudSettings, RingSettings};

/// Match timing constants
pub mod consts {
    /// Fixed simulation timestep used by the driver (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Shortest frame the driver accepts; smaller steps vanish in the f32 accumulator
    pub const MIN_FRAME_DT: f32 = 1e-4;

    /// Rings with a shrink duration at or below this never shrink
    pub const MIN_SHRINK_DURATION: f32 = 0.1;
    /// Cosmetic settle window after the match ends (seconds)
    pub const END_GRACE_SECONDS: f32 = 3.0;
    /// The default layout is two rings; fewer is a configuration error
    pub const MIN_RINGS: usize = 2;

    /// Default timings (seconds)
    pub const DEFAULT_SAFE_TIME: f32 = 30.0;
    pub const DEFAULT_MATCH_DURATION: f32 = 80.0;
    pub const DEFAULT_SHRINK_DURATION: f32 = 20.0;
    pub const DEFAULT_INTER_RING_DELAY: f32 = 5.0;
    /// Default target extent of a freshly created ring
    pub const DEFAULT_TARGET_EXTENT: f32 = 0.7;
}

/// Clamp to [0, 1]
#[inline]
pub fn clamp01(t: f32) -> f32 {
    t.clamp(0.0, 1.0)
}

/// Linear interpolation with `t` clamped to [0, 1]
#[inline]
pub fn lerp(from: f32, to: f32, t: f32) -> f32 {
    let t = clamp01(t);
    from * (1.0 - t) + to * t
}

/// Cubic ease-in/ease-out interpolation between `from` and `to`
#[inline]
pub fn smoothstep(from: f32, to: f32, t: f32) -> f32 {
    let t = clamp01(t);
    let t = -2.0 * t * t * t + 3.0 * t * t;
    to * t + from * (1.0 - t)
}
