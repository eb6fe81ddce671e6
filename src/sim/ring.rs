//! Ring shrink state machine
//!
//! A ring eases its X/Z extent from the scale captured at activation down to
//! a target scalar over `duration` seconds of simulated time. The extent is
//! re-derived from `progress` every tick, never accumulated, so a ring that is
//! reset and replayed with the same deltas follows the same trajectory.

use std::fmt;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::events::{Observers, RingEvent, SubscriptionId};
use crate::consts::MIN_SHRINK_DURATION;
use crate::settings::RingSettings;
use crate::{clamp01, smoothstep};

/// Lifecycle of a ring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RingState {
    /// Never started, or reset
    #[default]
    Idle,
    Shrinking,
    /// Paused mid-shrink; elapsed time is kept
    Stopped,
    /// Reached the target extent. Only `reset` leaves this state.
    Completed,
}

/// Outcome of a single [`RingShrinker::advance`] call
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RingTick {
    /// Ring was not shrinking; nothing changed
    Inactive,
    /// Ring shrank and is still going
    Progress(f32),
    /// Ring reached its target this tick
    Completed,
}

/// Read-only view of a ring's progress, for followers that mirror it
pub trait RingProgress {
    /// Completion in [0, 1]
    fn progress(&self) -> f32;
    fn is_shrinking(&self) -> bool;
}

/// Extent of a ring at `progress`: X and Z eased toward `target`, Y held
pub fn compute_extent(initial: Vec3, target: f32, progress: f32) -> Vec3 {
    Vec3::new(
        smoothstep(initial.x, target, progress),
        initial.y,
        smoothstep(initial.z, target, progress),
    )
}

/// Human-readable ring status
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RingStatus {
    /// Duration too short to ever shrink
    Fixed,
    Finished { extent: f32 },
    Paused { progress: f32 },
    Shrinking { progress: f32, remaining: f32 },
}

impl fmt::Display for RingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            RingStatus::Fixed => write!(f, "FIXED (does not shrink)"),
            RingStatus::Finished { extent } => write!(f, "FINISHED ({extent:.2})"),
            RingStatus::Paused { progress } => write!(f, "PAUSED at {:.0}%", progress * 100.0),
            RingStatus::Shrinking { progress, remaining } => {
                write!(f, "SHRINKING {:.0}% ({remaining:.1}s left)", progress * 100.0)
            }
        }
    }
}

/// A shrinking play-area boundary
#[derive(Debug)]
pub struct RingShrinker {
    name: String,
    /// World position; only used to bind followers
    position: Vec3,
    initial_extent: Vec3,
    /// Current extent, for the renderer to apply
    extent: Vec3,
    target_extent: f32,
    duration: f32,
    elapsed: f32,
    progress: f32,
    state: RingState,
    observers: Observers<RingEvent>,
}

impl RingShrinker {
    /// Create an idle ring. `initial_extent` is the scale captured at activation.
    pub fn new(name: impl Into<String>, initial_extent: Vec3, target_extent: f32, duration: f32) -> Self {
        let ring = Self {
            name: name.into(),
            position: Vec3::ZERO,
            initial_extent,
            extent: initial_extent,
            target_extent,
            duration,
            elapsed: 0.0,
            progress: 0.0,
            state: RingState::Idle,
            observers: Observers::new(),
        };
        log::debug!(
            "{} initialized. Scale: {}, Target: {}, Duration: {}s",
            ring.name,
            ring.initial_extent,
            ring.target_extent,
            ring.duration
        );
        ring
    }

    pub fn with_position(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    pub fn from_settings(settings: &RingSettings) -> Self {
        Self::new(
            settings.name.clone(),
            settings.initial_extent,
            settings.target_extent,
            settings.shrink_duration,
        )
        .with_position(settings.position)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn state(&self) -> RingState {
        self.state
    }

    pub fn initial_extent(&self) -> Vec3 {
        self.initial_extent
    }

    pub fn extent(&self) -> Vec3 {
        self.extent
    }

    pub fn target_extent(&self) -> f32 {
        self.target_extent
    }

    pub fn duration(&self) -> f32 {
        self.duration
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn progress(&self) -> f32 {
        self.progress
    }

    pub fn is_shrinking(&self) -> bool {
        self.state == RingState::Shrinking
    }

    pub fn is_completed(&self) -> bool {
        self.state == RingState::Completed
    }

    /// Rings with a near-zero duration are fixed and ignore start requests
    pub fn can_shrink(&self) -> bool {
        self.duration > MIN_SHRINK_DURATION
    }

    /// Seconds left while shrinking, otherwise 0
    pub fn time_remaining(&self) -> f32 {
        if self.is_shrinking() {
            self.duration - self.elapsed
        } else {
            0.0
        }
    }

    /// Register a presentation sink for start/progress/complete signals
    pub fn subscribe(&mut self, callback: impl FnMut(&RingEvent) + 'static) -> SubscriptionId {
        self.observers.subscribe(callback)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.observers.unsubscribe(id)
    }

    /// Begin shrinking from Idle
    pub fn start(&mut self) {
        if !self.can_shrink() {
            log::warn!(
                "{} cannot shrink (shrink duration too low: {})",
                self.name,
                self.duration
            );
            return;
        }
        if self.state != RingState::Idle {
            log::debug!("{} start ignored in state {:?}", self.name, self.state);
            return;
        }

        self.state = RingState::Shrinking;
        self.elapsed = 0.0;
        self.progress = 0.0;

        log::info!(
            "{} started shrinking: {} -> {} over {}s",
            self.name,
            self.initial_extent.x,
            self.target_extent,
            self.duration
        );
        self.observers.emit(&RingEvent::ShrinkStarted);
    }

    /// Pause a shrinking ring, keeping its progress
    pub fn stop(&mut self) {
        if self.state == RingState::Shrinking {
            self.state = RingState::Stopped;
            log::info!("{} stopped shrinking at {:.0}%", self.name, self.progress * 100.0);
        }
    }

    /// Continue a stopped ring from where it paused
    pub fn resume(&mut self) {
        if self.state == RingState::Stopped && self.progress < 1.0 && self.can_shrink() {
            self.state = RingState::Shrinking;
            log::info!("{} resumed shrinking", self.name);
        }
    }

    /// Return to Idle at the initial extent, from any state
    pub fn reset(&mut self) {
        self.state = RingState::Idle;
        self.elapsed = 0.0;
        self.progress = 0.0;
        self.extent = self.initial_extent;
        log::info!("{} reset to initial scale {}", self.name, self.initial_extent);
    }

    /// Advance the shrink by `dt` seconds of simulated time
    pub fn advance(&mut self, dt: f32) -> RingTick {
        if self.state != RingState::Shrinking || !self.can_shrink() {
            return RingTick::Inactive;
        }

        self.elapsed += dt.max(0.0);
        self.progress = clamp01(self.elapsed / self.duration);
        self.extent = compute_extent(self.initial_extent, self.target_extent, self.progress);

        self.observers.emit(&RingEvent::ShrinkProgress(self.progress));

        if self.progress >= 1.0 {
            self.complete();
            RingTick::Completed
        } else {
            RingTick::Progress(self.progress)
        }
    }

    fn complete(&mut self) {
        self.state = RingState::Completed;
        self.extent.x = self.target_extent;
        self.extent.z = self.target_extent;
        log::info!("{} finished shrinking. Final scale: {:.2}", self.name, self.extent.x);
        self.observers.emit(&RingEvent::ShrinkCompleted);
    }

    /// Change the duration, keeping current progress. Usable mid-shrink.
    pub fn set_duration(&mut self, duration: f32) {
        if duration.is_nan() || duration <= 0.0 {
            log::debug!("{} rejected duration {}", self.name, duration);
            return;
        }
        self.duration = duration;
        self.elapsed = self.progress * duration;
        log::info!("{} new duration: {}s", self.name, duration);
    }

    /// Change the target; must stay within (0, initial X extent]
    pub fn set_target_extent(&mut self, target: f32) {
        if target.is_nan() || target <= 0.0 || target > self.initial_extent.x {
            log::debug!("{} rejected target extent {}", self.name, target);
            return;
        }
        self.target_extent = target;
        log::info!("{} new target: {}", self.name, target);
    }

    pub fn status(&self) -> RingStatus {
        if !self.can_shrink() {
            RingStatus::Fixed
        } else if !self.is_shrinking() && self.progress >= 1.0 {
            RingStatus::Finished { extent: self.extent.x }
        } else if !self.is_shrinking() {
            RingStatus::Paused { progress: self.progress }
        } else {
            RingStatus::Shrinking {
                progress: self.progress,
                remaining: self.time_remaining(),
            }
        }
    }

    /// Status prefixed with the ring name, for debug overlays and logs
    pub fn status_line(&self) -> String {
        format!("{}: {}", self.name, self.status())
    }
}

impl RingProgress for RingShrinker {
    fn progress(&self) -> f32 {
        self.progress
    }

    fn is_shrinking(&self) -> bool {
        self.is_shrinking()
    }
}
