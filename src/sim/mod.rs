//! Deterministic simulation module
//!
//! All timing logic lives here. This module must be pure and deterministic:
//! - Driven only by `advance(dt)` calls, never by wall-clock time
//! - No sleeping or spawned tasks; delays are pending timers
//! - Stable iteration order (rings in shrink order)
//! - No rendering or platform dependencies

pub mod arena;
pub mod cloud;
pub mod events;
pub mod ring;

pub use arena::{ArenaPhase, ArenaSequencer, Timeline, TimelineEntry, TimelineSegment};
pub use cloud::{CloudMirror, CloudUpdate, find_ring_below};
pub use events::{ArenaEvent, Observers, RingEvent, SubscriptionId};
pub use ring::{RingProgress, RingShrinker, RingState, RingStatus, RingTick, compute_extent};
