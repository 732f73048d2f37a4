//! Game clock and time-scale service.
//!
//! The clock is the single source of truth for how fast simulation time
//! runs relative to wall-clock time. It holds a strictly positive
//! `multiplier` (game speed) and an independent `paused` flag. Paused is
//! deliberately not modeled as multiplier zero: paused jobs must resume at
//! their exact remaining duration, not accumulate a zero-rate debt, and a
//! zero multiplier would also break the rescale arithmetic below.
//!
//! # Rate changes
//!
//! Simulation-scaled waits cache their remaining duration pre-scaled into
//! real seconds, so a speed change must rescale every in-flight wait by
//! `old / new` *before* the new multiplier takes effect. The clock makes
//! that ordering explicit with a two-phase protocol:
//! [`begin_rate_change`] validates and returns a [`RateChange`] carrying
//! both values, the scheduler rescales its registry with it, and only then
//! is [`commit_rate_change`] called. Rescaling after the commit would use
//! the new value on both sides and silently corrupt in-flight waits.
//!
//! [`begin_rate_change`]: GameClock::begin_rate_change
//! [`commit_rate_change`]: GameClock::commit_rate_change

/// Errors that can occur during clock operations.
#[derive(Debug, thiserror::Error)]
pub enum ClockError {
    /// The requested time-scale multiplier is not a finite positive number.
    ///
    /// This is a caller bug: tolerating it would corrupt every in-flight
    /// simulation-scaled wait, so it is surfaced immediately instead.
    #[error("time-scale multiplier must be finite and > 0, got {value}")]
    InvalidMultiplier {
        /// The rejected multiplier value.
        value: f64,
    },
}

/// A validated, pending time-scale change.
///
/// Carries both the old and new multiplier so that components caching a
/// pre-scaled remaining duration can rescale it by [`factor`](Self::factor)
/// regardless of whether the clock has already committed the change.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateChange {
    /// The multiplier in effect when the change was requested.
    pub old: f64,
    /// The multiplier that will be in effect after the commit.
    pub new: f64,
}

impl RateChange {
    /// The factor by which a cached real-time remaining duration must be
    /// multiplied to stay correct under the new rate: `old / new`.
    pub fn factor(&self) -> f64 {
        self.old / self.new
    }
}

/// The simulation time-scale service.
///
/// Process-wide, session-lived: created once at startup, mutated by
/// external game-speed and pause controls, never destroyed mid-session.
/// The multiplier is always strictly positive and finite.
#[derive(Debug, Clone, PartialEq)]
pub struct GameClock {
    /// Multiplier applied to real elapsed time for simulation-scaled waits.
    multiplier: f64,
    /// Whether simulation time is frozen. Independent of the multiplier.
    paused: bool,
}

impl GameClock {
    /// Create a clock at normal speed (multiplier 1.0), unpaused.
    pub const fn new() -> Self {
        Self {
            multiplier: 1.0,
            paused: false,
        }
    }

    /// Create a clock with an explicit starting multiplier and pause state.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::InvalidMultiplier`] if `multiplier` is not a
    /// finite positive number.
    pub fn with_scale(multiplier: f64, paused: bool) -> Result<Self, ClockError> {
        validate_multiplier(multiplier)?;
        Ok(Self { multiplier, paused })
    }

    /// Return the current time-scale multiplier.
    pub const fn multiplier(&self) -> f64 {
        self.multiplier
    }

    /// Return whether simulation time is paused.
    pub const fn is_paused(&self) -> bool {
        self.paused
    }

    /// Set the pause flag. Does not alter the multiplier.
    pub const fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    /// Validate a requested multiplier and return the pending change.
    ///
    /// The clock is not modified; callers rescale any cached scaled
    /// durations with the returned [`RateChange`] and then call
    /// [`commit_rate_change`](Self::commit_rate_change).
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::InvalidMultiplier`] if `new` is not a finite
    /// positive number.
    pub fn begin_rate_change(&self, new: f64) -> Result<RateChange, ClockError> {
        validate_multiplier(new)?;
        Ok(RateChange {
            old: self.multiplier,
            new,
        })
    }

    /// Apply a previously validated rate change.
    pub const fn commit_rate_change(&mut self, change: RateChange) {
        self.multiplier = change.new;
    }
}

impl Default for GameClock {
    fn default() -> Self {
        Self::new()
    }
}

/// Reject multipliers that are zero, negative, NaN, or infinite.
fn validate_multiplier(value: f64) -> Result<(), ClockError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ClockError::InvalidMultiplier { value })
    }
}
