//! Cooperative job and timer scheduling core for the Armada game loop.
//!
//! Dozens of independent, long-running, pausable sequences (HUD refresh
//! loops, fleet state waits, explosion-completion waits, periodic recurring
//! callbacks) are driven forward in lock-step by a single per-tick update
//! pulse from the host. Jobs never hold a thread: anything that "waits"
//! stays registered and is re-polled on the next tick.
//!
//! # Modules
//!
//! - [`clock`] -- [`GameClock`] time-scale service: the simulation speed
//!   multiplier, the pause flag, and the two-phase rate-change protocol
//!   that keeps in-flight timers correct when the speed changes.
//! - [`config`] -- Configuration loading from `armada-config.yaml` into
//!   strongly-typed structs.
//! - [`job`] -- [`JobId`] handles, the [`JobState`] machine, and
//!   [`JobSpec`] construction parameters.
//! - [`scheduler`] -- The [`Scheduler`] registry and tick driver, plus the
//!   timed-wait convenience constructors (recurring milestones, external
//!   signal waits).
//! - [`signal`] -- [`Signal`] completion tokens that bridge non-timer
//!   asynchronous completions (an effect finishing) into the scheduler.
//! - [`step`] -- The suspension protocol: [`Step`] functions and the
//!   [`Wait`] request kinds they yield.
//!
//! # Ownership model
//!
//! The scheduler is the only strong owner of a job's continued execution.
//! Callers hold a copyable [`JobId`] that is sufficient to kill, pause, or
//! query the job but can never keep it alive. Dropping every external
//! reference does not stop a job; [`Scheduler::kill`] or
//! [`Scheduler::dispose_all`] does.

pub mod clock;
pub mod config;
pub mod job;
pub mod scheduler;
pub mod signal;
pub mod step;

pub use clock::{ClockError, GameClock, RateChange};
pub use config::{ConfigError, SchedulerConfig};
pub use job::{CompleteFn, JobId, JobSpec, JobState};
pub use scheduler::Scheduler;
pub use signal::{Signal, SignalSet};
pub use step::{Step, StepFn, Wait};
