//! Job handles, the job state machine, and per-tick advancement.
//!
//! A job wraps exactly one step function and drives it one suspension at a
//! time. The scheduler's registry is the sole strong owner of a job;
//! callers keep only the copyable [`JobId`], which can kill or pause the
//! job but never keep it alive.
//!
//! # State machine
//!
//! ```text
//! Created --start()--> Running --(yield Done)--> Completed
//!                      Running <--pause()/resume()--> Paused
//!                      {Created, Running, Paused} --kill()--> Killed
//! ```
//!
//! `Completed` and `Killed` are absorbing: a terminal job is removed from
//! the registry, its step function is released, and every further mutating
//! call on its id is a logged no-op. The completion callback fires exactly
//! once, always from inside a scheduler tick (or `dispose_all`), never
//! synchronously from `kill()` or `start()`.

use std::fmt;

use crate::clock::{GameClock, RateChange};
use crate::scheduler::Scheduler;
use crate::signal::SignalSet;
use crate::step::{Step, StepFn, Wait};

/// Opaque handle for a scheduled job.
///
/// Ids are minted by the scheduler from a monotonic counter, so iteration
/// order of the registry equals registration order and test traces are
/// deterministic. The id is diagnostics-and-control only: it cannot be
/// used to keep a job alive, and a stale id (job already finished) is
/// accepted everywhere as a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct JobId(u64);

impl JobId {
    /// Wrap a raw counter value. Only the scheduler mints ids.
    pub(crate) const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Return the raw counter value.
    pub const fn into_inner(self) -> u64 {
        self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "job#{}", self.0)
    }
}

/// Lifecycle state of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    /// Registered but not yet started; contributes nothing to scheduling.
    Created,
    /// Being advanced once per tick.
    Running,
    /// Registered and advanced each tick, but simulation-scaled waits do
    /// not accumulate. A paused job is still live and can be killed.
    Paused,
    /// The step function yielded `Done`. Terminal.
    Completed,
    /// The job was killed before finishing naturally. Terminal.
    Killed,
}

impl JobState {
    /// Return whether this state is absorbing.
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Killed)
    }
}

/// Completion callback, invoked exactly once with `was_killed` telling
/// whether the job was cancelled (`true`) or reached `Done` naturally
/// (`false`).
///
/// The callback receives the scheduler so it can legitimately spawn
/// follow-up jobs; anything it spawns is deferred to the next tick. It
/// must never assume it runs synchronously with `kill()`: kills are
/// finalized at the next tick boundary.
pub type CompleteFn = Box<dyn FnOnce(&mut Scheduler, bool)>;

/// Construction parameters for a job.
///
/// `name` is used solely for diagnostics, never for identity. Jobs default
/// to auto-starting and pausable; callers override the public fields
/// before handing the spec to [`Scheduler::spawn`].
pub struct JobSpec {
    /// Human-readable diagnostic name.
    pub name: String,
    /// The step function the job will drive.
    pub step: StepFn,
    /// Whether clock pause freezes this job's simulation-scaled waits.
    /// Non-pausable jobs keep accumulating sim time through a clock pause
    /// (job-level pause still freezes them).
    pub pausable: bool,
    /// Whether the job starts in `Running` immediately, or sits in
    /// `Created` until [`Scheduler::start`] is called.
    pub auto_start: bool,
    /// Invoked exactly once when the job finishes or is killed.
    pub on_complete: Option<CompleteFn>,
}

impl JobSpec {
    /// Build a spec with the default flags: pausable, auto-start, no
    /// completion callback.
    pub fn new(name: impl Into<String>, step: StepFn) -> Self {
        Self {
            name: name.into(),
            step,
            pausable: true,
            auto_start: true,
            on_complete: None,
        }
    }
}

impl fmt::Debug for JobSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JobSpec")
            .field("name", &self.name)
            .field("pausable", &self.pausable)
            .field("auto_start", &self.auto_start)
            .field("has_on_complete", &self.on_complete.is_some())
            .finish()
    }
}

/// The wait a job is currently suspended on, with live bookkeeping.
///
/// Simulation-scaled waits are cached pre-scaled into real seconds
/// (`requested / multiplier` at suspension time) and decremented by raw
/// elapsed time, so a rate change must rescale them by `old / new`.
enum PendingWait {
    /// Wall-clock countdown in real seconds.
    Real {
        /// Real seconds left.
        remaining: f64,
    },
    /// Simulation countdown, cached in real seconds at the current rate.
    Sim {
        /// Real seconds left at the multiplier in effect when last scaled.
        remaining: f64,
    },
    /// Tick countdown.
    Frames {
        /// Ticks left.
        remaining: u32,
    },
    /// Polled predicate.
    Until(Box<dyn FnMut() -> bool>),
    /// Pushed external completion.
    Signal(SignalSet),
}

impl PendingWait {
    /// Install a fresh suspension request, scaling sim delays by the
    /// multiplier in effect right now.
    fn install(request: Wait, clock: &GameClock) -> Self {
        match request {
            Wait::Real(secs) => Self::Real { remaining: secs },
            Wait::Sim(secs) => Self::Sim {
                remaining: secs / clock.multiplier(),
            },
            Wait::Frames(n) => Self::Frames { remaining: n },
            Wait::Until(predicate) => Self::Until(predicate),
            Wait::Signal(set) => Self::Signal(set),
        }
    }
}

/// Outcome of one advancement opportunity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Progress {
    /// Still suspended; the job stays registered.
    Suspended,
    /// The step function yielded `Done`; the scheduler finalizes the job.
    Finished,
}

/// A registered job: one step function plus its scheduling state.
///
/// Owned exclusively by the scheduler registry. All field mutation happens
/// inside `Scheduler::tick` or the synchronous flag-setting control calls.
pub(crate) struct Job {
    /// Diagnostic name.
    pub(crate) name: String,
    /// Current lifecycle state.
    pub(crate) state: JobState,
    /// Whether clock pause freezes this job's sim waits.
    pub(crate) pausable: bool,
    /// Set by `kill()`; consumed at the next tick boundary.
    pub(crate) pending_kill: bool,
    /// Taken exactly once at finalization.
    pub(crate) on_complete: Option<CompleteFn>,
    /// The wrapped step function.
    step: StepFn,
    /// Current suspension, if the step function has been polled at all.
    wait: Option<PendingWait>,
}

impl Job {
    /// Build a job from its spec. Auto-start specs begin in `Running`.
    pub(crate) fn new(spec: JobSpec) -> Self {
        let state = if spec.auto_start {
            JobState::Running
        } else {
            JobState::Created
        };
        Self {
            name: spec.name,
            state,
            pausable: spec.pausable,
            pending_kill: false,
            on_complete: spec.on_complete,
            step: spec.step,
            wait: None,
        }
    }

    /// Give the job its one advancement opportunity for this tick.
    ///
    /// `dt` is raw elapsed real seconds. A job with no current wait (first
    /// tick after starting) is polled for its first request and consumes
    /// none of this tick's elapsed time; likewise a wait that expires this
    /// tick hands no leftover time to the next request.
    pub(crate) fn advance(&mut self, dt: f64, clock: &GameClock) -> Progress {
        let sim_frozen =
            self.state == JobState::Paused || (clock.is_paused() && self.pausable);

        let Some(wait) = self.wait.as_mut() else {
            return self.poll_step(clock);
        };

        let satisfied = match wait {
            PendingWait::Real { remaining } => {
                *remaining -= dt;
                *remaining <= 0.0
            }
            PendingWait::Sim { remaining } => {
                if !sim_frozen {
                    *remaining -= dt;
                }
                *remaining <= 0.0
            }
            PendingWait::Frames { remaining } => {
                *remaining = remaining.saturating_sub(1);
                *remaining == 0
            }
            PendingWait::Until(predicate) => predicate(),
            PendingWait::Signal(set) => set.is_complete(),
        };

        if satisfied {
            self.wait = None;
            self.poll_step(clock)
        } else {
            Progress::Suspended
        }
    }

    /// Rescale an in-flight simulation wait for a time-scale change.
    ///
    /// Must run before the clock commits the new multiplier; the change
    /// carries the old and new values so the cached real-time remainder is
    /// scaled by exactly `old / new`.
    pub(crate) fn rescale(&mut self, change: RateChange) {
        if let Some(PendingWait::Sim { remaining }) = self.wait.as_mut() {
            *remaining *= change.factor();
        }
    }

    /// Poll the step function once for its next suspension request.
    fn poll_step(&mut self, clock: &GameClock) -> Progress {
        match (self.step)() {
            Step::Done => Progress::Finished,
            Step::Yield(request) => {
                self.wait = Some(PendingWait::install(request, clock));
                Progress::Suspended
            }
        }
    }
}

impl fmt::Debug for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Job")
            .field("name", &self.name)
            .field("state", &self.state)
            .field("pausable", &self.pausable)
            .field("pending_kill", &self.pending_kill)
            .finish()
    }
}
