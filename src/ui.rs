//! Countdown HUD model
//!
//! Decides what the match timer text should say and how loud it should look.
//! Drawing it is left to whatever text renderer the game uses.

use glam::Vec4;

use crate::sim::{ArenaPhase, ArenaSequencer};

/// Seconds at or below which the countdown turns urgent
pub const URGENT_SECONDS: i32 = 10;
/// Seconds at or below which the countdown turns to a warning
pub const WARNING_SECONDS: i32 = 30;

/// Visual tier of the countdown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownStyle {
    Normal,
    /// Waiting between rings
    Waiting,
    /// A ring is shrinking
    Shrinking,
    Warning,
    Urgent,
    GameOver,
}

impl CountdownStyle {
    /// RGBA color
    pub fn color(&self) -> Vec4 {
        match self {
            CountdownStyle::Normal => Vec4::new(1.0, 1.0, 1.0, 1.0),
            CountdownStyle::Waiting => Vec4::new(0.0, 0.0, 1.0, 1.0),
            CountdownStyle::Shrinking => Vec4::new(0.0, 1.0, 1.0, 1.0),
            CountdownStyle::Warning => Vec4::new(1.0, 0.92, 0.016, 1.0),
            CountdownStyle::Urgent => Vec4::new(1.0, 0.0, 0.0, 1.0),
            CountdownStyle::GameOver => Vec4::new(1.0, 0.0, 1.0, 1.0),
        }
    }

    pub fn font_size(&self) -> u32 {
        match self {
            CountdownStyle::Normal => 36,
            CountdownStyle::Waiting | CountdownStyle::Shrinking => 38,
            CountdownStyle::Warning => 42,
            CountdownStyle::Urgent | CountdownStyle::GameOver => 52,
        }
    }

    /// Pick a tier from whole seconds left and the current phase.
    /// Time thresholds win over phase styling.
    pub fn for_countdown(seconds: i32, phase: ArenaPhase) -> Self {
        if phase == ArenaPhase::GameOver {
            CountdownStyle::GameOver
        } else if seconds <= URGENT_SECONDS {
            CountdownStyle::Urgent
        } else if seconds <= WARNING_SECONDS {
            CountdownStyle::Warning
        } else if phase.is_waiting() {
            CountdownStyle::Waiting
        } else if phase.is_shrinking() {
            CountdownStyle::Shrinking
        } else {
            CountdownStyle::Normal
        }
    }
}

/// Text and style for the match timer
#[derive(Debug, Clone, PartialEq)]
pub struct CountdownDisplay {
    pub text: String,
    pub seconds: i32,
    pub style: CountdownStyle,
}

impl CountdownDisplay {
    pub fn new(time_remaining: f32, phase: ArenaPhase) -> Self {
        let seconds = time_remaining.ceil() as i32;
        let style = CountdownStyle::for_countdown(seconds, phase);
        let text = if style == CountdownStyle::GameOver {
            "END!".to_string()
        } else {
            format!("- {seconds}s")
        };
        Self { text, seconds, style }
    }

    pub fn for_arena(arena: &ArenaSequencer) -> Self {
        Self::new(arena.time_remaining(), arena.phase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::RingShrinker;

    #[test]
    fn seconds_round_up() {
        let d = CountdownDisplay::new(41.2, ArenaPhase::Initial);
        assert_eq!(d.seconds, 42);
        assert_eq!(d.text, "- 42s");
        assert_eq!(d.style, CountdownStyle::Normal);
        assert_eq!(d.style.font_size(), 36);
    }

    #[test]
    fn thresholds_override_phase() {
        let shrinking = ArenaPhase::Shrinking { ring: 0 };
        assert_eq!(CountdownStyle::for_countdown(31, shrinking), CountdownStyle::Shrinking);
        assert_eq!(CountdownStyle::for_countdown(30, shrinking), CountdownStyle::Warning);
        assert_eq!(CountdownStyle::for_countdown(11, shrinking), CountdownStyle::Warning);
        assert_eq!(CountdownStyle::for_countdown(10, shrinking), CountdownStyle::Urgent);

        let waiting = ArenaPhase::WaitingDelay { next_ring: 1, delay: 5.0 };
        assert_eq!(CountdownStyle::for_countdown(45, waiting), CountdownStyle::Waiting);
        assert_eq!(CountdownStyle::for_countdown(45, ArenaPhase::FinalSafeZone), CountdownStyle::Normal);
    }

    #[test]
    fn game_over_says_end() {
        let d = CountdownDisplay::new(0.0, ArenaPhase::GameOver);
        assert_eq!(d.text, "END!");
        assert_eq!(d.style.color(), Vec4::new(1.0, 0.0, 1.0, 1.0));
    }

    #[test]
    fn follows_a_running_arena() {
        let rings = vec![
            RingShrinker::new("A", glam::Vec3::ONE, 0.7, 20.0),
            RingShrinker::new("B", glam::Vec3::ONE, 0.7, 20.0),
        ];
        let mut arena = ArenaSequencer::new(rings, 30.0, 80.0, 5.0).unwrap();
        assert_eq!(CountdownDisplay::for_arena(&arena).text, "- 80s");

        for _ in 0..35 {
            arena.advance(1.0);
        }
        let d = CountdownDisplay::for_arena(&arena);
        assert_eq!(d.text, "- 45s");
        assert_eq!(d.style, CountdownStyle::Shrinking);

        for _ in 0..45 {
            arena.advance(1.0);
        }
        assert_eq!(CountdownDisplay::for_arena(&arena).style, CountdownStyle::GameOver);
    }
}
