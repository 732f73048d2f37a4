//! Push-style completion tokens for bridging external systems.
//!
//! Some waits are not timers: an explosion effect finishes, a fleet order
//! resolves, a sound cue ends. Those systems push completion by raising a
//! [`Signal`]; a job suspended on [`Wait::Signal`] observes it on the next
//! tick. Semantically this is equivalent to a polled predicate, but the
//! completing side owns a handle instead of being polled through a closure.
//!
//! Signals are single-threaded (the whole scheduler is) and latch: once
//! raised they stay raised for the lifetime of the token.
//!
//! [`Wait::Signal`]: crate::step::Wait::Signal

use std::cell::Cell;
use std::rc::Rc;

/// A raisable, cloneable completion token.
///
/// All clones share the same latch; raising any clone raises them all.
#[derive(Debug, Clone, Default)]
pub struct Signal {
    raised: Rc<Cell<bool>>,
}

impl Signal {
    /// Create a new unraised signal.
    pub fn new() -> Self {
        Self::default()
    }

    /// Latch the signal as raised. Idempotent.
    pub fn raise(&self) {
        self.raised.set(true);
    }

    /// Return whether the signal has been raised.
    pub fn is_raised(&self) -> bool {
        self.raised.get()
    }
}

/// A composite completion condition: a primary signal plus the signals of
/// any dependent sub-parts (e.g. a composite effect whose children must all
/// finish before the whole counts as done).
#[derive(Debug, Clone, Default)]
pub struct SignalSet {
    signals: Vec<Signal>,
}

impl SignalSet {
    /// Build a set from a single primary signal.
    pub fn of(primary: Signal) -> Self {
        Self {
            signals: vec![primary],
        }
    }

    /// Build a set from a primary signal and its dependents.
    pub fn with_dependents(primary: Signal, dependents: Vec<Signal>) -> Self {
        let mut signals = Vec::with_capacity(dependents.len().saturating_add(1));
        signals.push(primary);
        signals.extend(dependents);
        Self { signals }
    }

    /// Return whether every signal in the set has been raised.
    ///
    /// An empty set is trivially complete.
    pub fn is_complete(&self) -> bool {
        self.signals.iter().all(Signal::is_raised)
    }

    /// Number of signals (primary plus dependents) in the set.
    pub fn len(&self) -> usize {
        self.signals.len()
    }

    /// Return whether the set contains no signals.
    pub fn is_empty(&self) -> bool {
        self.signals.is_empty()
    }
}
