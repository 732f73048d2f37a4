//! The suspension protocol: step functions and the waits they yield.
//!
//! A step function is the unit of cooperative work. The scheduler polls it
//! at most once per tick; each poll either yields the next suspension
//! request or declares the sequence finished. There is no coroutine or
//! generator machinery: a step function is a plain `FnMut` closure (or a
//! boxed state machine) that hands back one [`Wait`] at a time.
//!
//! A given step function instance is consumed exactly once. Restarting a
//! sequence means building a fresh instance from the same factory; a
//! finished job is never resumed.

use std::fmt;

use crate::signal::SignalSet;

/// A suspension request: the kind of wait a step function is blocked on.
///
/// Timed variants carry seconds as `f64`; the owning job tracks the
/// remaining duration and the scheduler decrements it per tick according
/// to the variant's pause and scaling rules.
pub enum Wait {
    /// Wall-clock delay in real seconds. Decremented by raw elapsed time
    /// every tick, ignoring the game-speed multiplier and both pause
    /// flags. Used for effects bound to real time (UI flashes, input
    /// debounce).
    Real(f64),

    /// Simulation-time delay in sim seconds. Scaled by the clock
    /// multiplier, rescaled live when the multiplier changes, and frozen
    /// while the job or the clock is paused (unless the job was built
    /// non-pausable).
    Sim(f64),

    /// Suspend for a number of ticks, regardless of pause state or
    /// multiplier.
    Frames(u32),

    /// Suspend until the predicate returns true. Re-evaluated once per
    /// tick, including while paused.
    Until(Box<dyn FnMut() -> bool>),

    /// Suspend until every signal in the set has been raised. The
    /// push-style equivalent of [`Wait::Until`], for completions driven
    /// by external systems.
    Signal(SignalSet),
}

impl Wait {
    /// Convenience constructor for [`Wait::Until`] that boxes the
    /// predicate.
    pub fn until<F>(predicate: F) -> Self
    where
        F: FnMut() -> bool + 'static,
    {
        Self::Until(Box::new(predicate))
    }
}

impl fmt::Debug for Wait {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Real(secs) => f.debug_tuple("Real").field(secs).finish(),
            Self::Sim(secs) => f.debug_tuple("Sim").field(secs).finish(),
            Self::Frames(n) => f.debug_tuple("Frames").field(n).finish(),
            Self::Until(_) => f.write_str("Until(..)"),
            Self::Signal(set) => f.debug_tuple("Signal").field(set).finish(),
        }
    }
}

/// The result of polling a step function once.
#[derive(Debug)]
pub enum Step {
    /// The sequence is suspended on the given request.
    Yield(Wait),
    /// The sequence finished; the owning job transitions to completed.
    Done,
}

/// A resumable cooperative work sequence, polled once per tick while its
/// current wait is satisfied.
pub type StepFn = Box<dyn FnMut() -> Step>;
