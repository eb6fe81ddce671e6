//! Arena sequencer
//!
//! Owns the rings of a match and chains them on a single simulated clock:
//! a safe period, ring 1, a delay, ring 2, ... then the final safe zone until
//! the match timer runs out. The delay between rings is a pending-timer value
//! counted down by `advance`, so everything stays deterministic.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::events::{ArenaEvent, Observers, SubscriptionId};
use super::ring::{RingShrinker, RingTick};
use crate::consts::*;
use crate::error::ConfigError;
use crate::settings::ArenaSettings;

/// Coarse stage of a match
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ArenaPhase {
    /// Safe period before the first ring
    Initial,
    /// Ring at this index is shrinking
    Shrinking { ring: usize },
    /// Waiting `delay` seconds before `next_ring` starts
    WaitingDelay { next_ring: usize, delay: f32 },
    /// Every ring is done; fight until the timer expires
    FinalSafeZone,
    GameOver,
}

impl ArenaPhase {
    pub fn is_waiting(&self) -> bool {
        matches!(self, Self::WaitingDelay { .. })
    }

    pub fn is_shrinking(&self) -> bool {
        matches!(self, Self::Shrinking { .. })
    }
}

impl fmt::Display for ArenaPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArenaPhase::Initial => write!(f, "Initial Phase"),
            ArenaPhase::Shrinking { ring } => write!(f, "Ring {} Shrinking", ring + 1),
            ArenaPhase::WaitingDelay { delay, .. } => write!(f, "Waiting for next ring... ({delay}s)"),
            ArenaPhase::FinalSafeZone => write!(f, "Final Safe Zone"),
            ArenaPhase::GameOver => write!(f, "Game Over"),
        }
    }
}

/// Deferred start of the next ring
#[derive(Debug, Clone, Copy, PartialEq)]
struct PendingStart {
    ring: usize,
    remaining: f32,
}

/// Sequences the rings of one match
#[derive(Debug)]
pub struct ArenaSequencer {
    rings: Vec<RingShrinker>,
    /// Delay before each ring after the previous completes (index 0 unused)
    ring_delays: Vec<f32>,
    safe_time: f32,
    match_duration: f32,
    end_grace: f32,
    match_elapsed: f32,
    time_remaining: f32,
    active: bool,
    /// None until the safe period ends; then only grows, up to `rings.len()`
    current_index: Option<usize>,
    phase: ArenaPhase,
    pending: Option<PendingStart>,
    /// Cosmetic window after the match ends
    grace_remaining: Option<f32>,
    settled: bool,
    observers: Observers<ArenaEvent>,
}

impl ArenaSequencer {
    /// Build a sequencer over `rings` in shrink order, using the same delay
    /// between every pair of rings.
    pub fn new(
        rings: Vec<RingShrinker>,
        safe_time: f32,
        match_duration: f32,
        inter_ring_delay: f32,
    ) -> Result<Self, ConfigError> {
        if rings.len() < MIN_RINGS {
            return Err(ConfigError::TooFewRings {
                found: rings.len(),
                required: MIN_RINGS,
            });
        }
        if safe_time.is_nan() || safe_time < 0.0 {
            return Err(ConfigError::invalid("safe_time", safe_time, "a non-negative number of seconds"));
        }
        if match_duration.is_nan() || match_duration <= 0.0 {
            return Err(ConfigError::invalid(
                "match_duration",
                match_duration,
                "a positive number of seconds",
            ));
        }
        if inter_ring_delay.is_nan() || inter_ring_delay < 0.0 {
            return Err(ConfigError::invalid(
                "inter_ring_delay",
                inter_ring_delay,
                "a non-negative number of seconds",
            ));
        }

        let mut ring_delays = vec![inter_ring_delay; rings.len()];
        ring_delays[0] = 0.0;

        log::info!(
            "Arena schedule: {}s safe period, {} rings, {}s between rings, {}s match",
            safe_time,
            rings.len(),
            inter_ring_delay,
            match_duration
        );

        Ok(Self {
            rings,
            ring_delays,
            safe_time,
            match_duration,
            end_grace: END_GRACE_SECONDS,
            match_elapsed: 0.0,
            time_remaining: match_duration,
            active: true,
            current_index: None,
            phase: ArenaPhase::Initial,
            pending: None,
            grace_remaining: None,
            settled: false,
            observers: Observers::new(),
        })
    }

    /// Build a sequencer and its rings from settings
    pub fn from_settings(settings: &ArenaSettings) -> Result<Self, ConfigError> {
        settings.validate()?;
        let rings = settings.rings.iter().map(RingShrinker::from_settings).collect();
        let mut arena = Self::new(
            rings,
            settings.safe_time,
            settings.match_duration,
            settings.inter_ring_delay,
        )?;
        for i in 1..arena.rings.len() {
            arena.ring_delays[i] = settings.delay_before(i);
        }
        arena.end_grace = settings.end_grace;
        Ok(arena)
    }

    /// Override the delay before ring `index`. Ignored for the first ring.
    pub fn with_ring_delay(mut self, index: usize, delay: f32) -> Self {
        if index > 0 && index < self.ring_delays.len() && delay >= 0.0 {
            self.ring_delays[index] = delay;
        }
        self
    }

    pub fn with_end_grace(mut self, seconds: f32) -> Self {
        self.end_grace = seconds.max(0.0);
        self
    }

    pub fn rings(&self) -> &[RingShrinker] {
        &self.rings
    }

    pub fn ring(&self, index: usize) -> Option<&RingShrinker> {
        self.rings.get(index)
    }

    /// Mutable ring access for live re-tuning and subscribing sinks
    pub fn ring_mut(&mut self, index: usize) -> Option<&mut RingShrinker> {
        self.rings.get_mut(index)
    }

    pub fn phase(&self) -> ArenaPhase {
        self.phase
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current_index
    }

    pub fn match_elapsed(&self) -> f32 {
        self.match_elapsed
    }

    pub fn match_duration(&self) -> f32 {
        self.match_duration
    }

    pub fn safe_time(&self) -> f32 {
        self.safe_time
    }

    pub fn time_remaining(&self) -> f32 {
        self.time_remaining
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// True once the post-match grace window has elapsed
    pub fn is_settled(&self) -> bool {
        self.settled
    }

    /// Seconds until the pending ring start, if one is scheduled
    pub fn pending_delay(&self) -> Option<f32> {
        self.pending.map(|p| p.remaining)
    }

    /// Delay configured before ring `index`
    pub fn ring_delay(&self, index: usize) -> Option<f32> {
        self.ring_delays.get(index).copied()
    }

    pub fn subscribe(&mut self, callback: impl FnMut(&ArenaEvent) + 'static) -> SubscriptionId {
        self.observers.subscribe(callback)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.observers.unsubscribe(id)
    }

    /// Advance the match by one tick of `dt` seconds.
    ///
    /// Rings started during a tick first shrink on the following tick, and a
    /// delay scheduled during a tick starts counting on the following tick.
    pub fn advance(&mut self, dt: f32) {
        let dt = dt.max(0.0);

        if !self.active {
            self.advance_grace(dt);
            return;
        }

        self.match_elapsed += dt;
        self.time_remaining = self.match_duration - self.match_elapsed;

        let due = match self.pending.as_mut() {
            Some(pending) => {
                pending.remaining -= dt;
                pending.remaining <= 0.0
            }
            None => false,
        };
        let due = if due { self.pending.take() } else { None };

        let completed: Vec<usize> = self
            .rings
            .iter_mut()
            .enumerate()
            .filter_map(|(i, ring)| (ring.advance(dt) == RingTick::Completed).then_some(i))
            .collect();
        for index in completed {
            self.handle_ring_complete(index);
        }

        if let Some(pending) = due {
            self.start_ring(pending.ring);
        }

        if self.current_index.is_none() && self.match_elapsed >= self.safe_time {
            self.queue_ring(0);
        }

        if self.time_remaining <= 0.0 && self.active {
            self.end_match();
        }
    }

    fn handle_ring_complete(&mut self, index: usize) {
        if !self.active {
            return;
        }

        log::info!(
            "{} completed at {:.1}s",
            self.rings[index].name(),
            self.match_elapsed
        );
        self.observers.emit(&ArenaEvent::RingCompleted(index));

        if self.current_index != Some(index) {
            // Started outside the sequence; does not move it forward
            log::debug!("Ring {} completed out of sequence", index + 1);
            return;
        }
        self.queue_ring(index + 1);
    }

    /// Move the sequence to ring `index`, skipping rings that cannot shrink.
    /// The first ring starts at once; later rings wait for their delay.
    /// Skipping applies to index 0 too: a fixed first ring waits out the delay of the next one.
    fn queue_ring(&mut self, mut index: usize) {
        loop {
            self.current_index = Some(index);
            if index >= self.rings.len() {
                self.set_phase(ArenaPhase::FinalSafeZone);
                log::info!(
                    "Safe zone established! {:.0}s of final battle",
                    self.time_remaining.max(0.0)
                );
                return;
            }
            if self.rings[index].can_shrink() {
                break;
            }
            log::warn!("{} cannot shrink, skipping", self.rings[index].name());
            index += 1;
        }

        let delay = self.ring_delays[index];
        if index == 0 || delay <= 0.0 {
            self.start_ring(index);
            return;
        }

        self.pending = Some(PendingStart {
            ring: index,
            remaining: delay,
        });
        self.set_phase(ArenaPhase::WaitingDelay {
            next_ring: index,
            delay,
        });
        log::info!("Waiting {}s before the next ring", delay);
    }

    fn start_ring(&mut self, index: usize) {
        self.set_phase(ArenaPhase::Shrinking { ring: index });
        self.rings[index].start();
        self.observers.emit(&ArenaEvent::RingStarted(index));
        log::info!(
            "Ring {} started at {:.1}s ({}s shrink)",
            index + 1,
            self.match_elapsed,
            self.rings[index].duration()
        );
    }

    fn end_match(&mut self) {
        self.active = false;
        self.pending = None;
        self.set_phase(ArenaPhase::GameOver);

        for ring in &mut self.rings {
            if ring.is_shrinking() {
                ring.stop();
            }
        }

        log::info!("Match over at {:.1}s", self.match_elapsed);
        self.observers.emit(&ArenaEvent::MatchEnded);

        if self.end_grace > 0.0 {
            self.grace_remaining = Some(self.end_grace);
        } else {
            self.settle();
        }
    }

    fn advance_grace(&mut self, dt: f32) {
        if let Some(remaining) = self.grace_remaining.as_mut() {
            *remaining -= dt;
            if *remaining <= 0.0 {
                self.settle();
            }
        }
    }

    fn settle(&mut self) {
        self.grace_remaining = None;
        self.settled = true;
        self.observers.emit(&ArenaEvent::Settled);
    }

    fn set_phase(&mut self, phase: ArenaPhase) {
        if self.phase != phase {
            self.phase = phase;
            log::info!("Phase: {}", phase);
            self.observers.emit(&ArenaEvent::PhaseChanged(phase));
        }
    }

    /// Restart the match: cancels any pending start and resets every ring
    pub fn reset(&mut self) {
        self.pending = None;
        self.grace_remaining = None;
        self.settled = false;
        self.current_index = None;
        self.match_elapsed = 0.0;
        self.time_remaining = self.match_duration;
        self.active = true;
        self.set_phase(ArenaPhase::Initial);

        for ring in &mut self.rings {
            ring.reset();
        }

        log::info!("Arena reset");
    }

    /// Planned phase boundaries from the configuration alone
    pub fn timeline(&self) -> Timeline {
        let mut entries = vec![TimelineEntry {
            start: 0.0,
            end: self.safe_time,
            segment: TimelineSegment::Initial,
        }];

        let mut t = self.safe_time;
        for (i, ring) in self.rings.iter().enumerate() {
            if !ring.can_shrink() {
                continue;
            }
            let delay = self.ring_delays[i];
            if i > 0 && delay > 0.0 {
                entries.push(TimelineEntry {
                    start: t,
                    end: t + delay,
                    segment: TimelineSegment::Wait { before_ring: i },
                });
                t += delay;
            }
            entries.push(TimelineEntry {
                start: t,
                end: t + ring.duration(),
                segment: TimelineSegment::RingShrink { ring: i },
            });
            t += ring.duration();
        }

        if t < self.match_duration {
            entries.push(TimelineEntry {
                start: t,
                end: self.match_duration,
                segment: TimelineSegment::FinalBattle,
            });
        }

        Timeline {
            entries,
            match_duration: self.match_duration,
        }
    }
}

/// Kind of a planned timeline segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimelineSegment {
    Initial,
    RingShrink { ring: usize },
    Wait { before_ring: usize },
    FinalBattle,
}

/// One planned segment, in match seconds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimelineEntry {
    pub start: f32,
    pub end: f32,
    pub segment: TimelineSegment,
}

/// Planned schedule of a match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Timeline {
    pub entries: Vec<TimelineEntry>,
    pub match_duration: f32,
}

impl Timeline {
    /// Planned start of ring `index`, if it shrinks at all
    pub fn ring_start(&self, index: usize) -> Option<f32> {
        self.entries
            .iter()
            .find(|e| e.segment == TimelineSegment::RingShrink { ring: index })
            .map(|e| e.start)
    }

    /// True when every ring finishes before the match timer runs out
    pub fn fits_match(&self) -> bool {
        self.entries
            .iter()
            .filter(|e| matches!(e.segment, TimelineSegment::RingShrink { .. }))
            .all(|e| e.end <= self.match_duration)
    }
}

impl fmt::Display for Timeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Timeline:")?;
        for entry in &self.entries {
            write!(f, "{}-{}s: ", entry.start, entry.end)?;
            match entry.segment {
                TimelineSegment::Initial => writeln!(f, "Initial phase")?,
                TimelineSegment::RingShrink { ring } => writeln!(f, "Ring {} shrinks", ring + 1)?,
                TimelineSegment::Wait { .. } => writeln!(f, "Wait {}s", entry.end - entry.start)?,
                TimelineSegment::FinalBattle => writeln!(f, "Final battle")?,
            }
        }
        Ok(())
    }
}
