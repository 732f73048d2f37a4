//! The scheduler registry and tick driver.
//!
//! The scheduler holds every live job and advances each one exactly once
//! per [`tick`](Scheduler::tick). Scheduling is single-threaded and
//! cooperative: nothing blocks, nothing runs in parallel, and every state
//! transition happens either inside `tick` or in the synchronous
//! flag-setting control calls (`kill`, `pause`, `resume`, `start`) that
//! `tick` consults at the next boundary.
//!
//! # Tick protocol
//!
//! A tick is two-phase. Phase one advances every job that was registered
//! when the tick began, in registration order, giving each exactly one
//! advancement opportunity (so a stalled predicate cannot starve its
//! neighbors). Jobs marked for kill are collected without being advanced.
//! Phase two removes the finished jobs and invokes their completion
//! callbacks, in that same order, after all advancement is done. A
//! callback that spawns a new job therefore never sees it advanced in the
//! same tick, and a kill issued between ticks never runs its callback
//! synchronously: a caller who kills a job and immediately reuses the
//! owning variable cannot have the old job's late callback clobber the new
//! one.
//!
//! # Teardown
//!
//! Job disposal is centralized here rather than owner-driven: an external
//! reference going out of scope stops nothing, and
//! [`dispose_all`](Scheduler::dispose_all) is the single sanctioned sweep
//! that guarantees no job outlives its scene or session.

use std::collections::BTreeMap;
use std::time::Duration;

use tracing::{debug, info};

use crate::clock::{ClockError, GameClock};
use crate::config::SchedulerConfig;
use crate::job::{CompleteFn, Job, JobId, JobSpec, JobState, Progress};
use crate::signal::{Signal, SignalSet};
use crate::step::{Step, StepFn, Wait};

/// The central job registry and tick driver.
///
/// Owns the [`GameClock`] and every live job. The registry is keyed by
/// monotonically increasing [`JobId`], so `BTreeMap` iteration order is
/// registration order and traces are deterministic.
#[derive(Debug)]
pub struct Scheduler {
    /// The time-scale service.
    clock: GameClock,
    /// Live jobs in registration order. A job appears at most once; it is
    /// removed exactly when it reaches a terminal state.
    jobs: BTreeMap<JobId, Job>,
    /// Next raw id to mint.
    next_id: u64,
    /// Count of ticks executed so far.
    frame: u64,
}

impl Scheduler {
    /// Create an empty scheduler at normal speed.
    pub fn new() -> Self {
        Self {
            clock: GameClock::new(),
            jobs: BTreeMap::new(),
            next_id: 0,
            frame: 0,
        }
    }

    /// Create a scheduler with the time-scale settings from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::InvalidMultiplier`] if the configured
    /// multiplier is not a finite positive number.
    pub fn with_config(config: &SchedulerConfig) -> Result<Self, ClockError> {
        let clock = GameClock::with_scale(config.time.multiplier, config.time.start_paused)?;
        Ok(Self {
            clock,
            jobs: BTreeMap::new(),
            next_id: 0,
            frame: 0,
        })
    }

    // -----------------------------------------------------------------------
    // Registration and control
    // -----------------------------------------------------------------------

    /// Register a job and return its handle.
    ///
    /// Auto-start jobs begin advancing on the next tick; manual-start jobs
    /// sit in [`JobState::Created`] and contribute nothing until
    /// [`start`](Self::start).
    pub fn spawn(&mut self, spec: JobSpec) -> JobId {
        let id = JobId::from_raw(self.next_id);
        self.next_id = self.next_id.saturating_add(1);
        let job = Job::new(spec);
        debug!(%id, name = %job.name, state = ?job.state, "job registered");
        self.jobs.insert(id, job);
        id
    }

    /// Start a job that was spawned with `auto_start = false`.
    ///
    /// A no-op on a running, paused, or already-finished job: a terminal
    /// job's step function is consumed, so restarting it is never valid
    /// and is reported only as a diagnostic.
    pub fn start(&mut self, id: JobId) {
        match self.jobs.get_mut(&id) {
            Some(job) if job.state == JobState::Created => {
                job.state = JobState::Running;
                debug!(%id, name = %job.name, "job started");
            }
            Some(job) => {
                debug!(%id, state = ?job.state, "start ignored: job not in created state");
            }
            None => debug!(%id, "start ignored: job already finished or unknown"),
        }
    }

    /// Mark a job for removal.
    ///
    /// The job is not advanced again; its callback fires with
    /// `was_killed = true` at the next tick boundary, never synchronously
    /// from this call. Killing an already-killed or finished job is a
    /// logged no-op, so racing owners can all attempt cleanup safely.
    pub fn kill(&mut self, id: JobId) {
        match self.jobs.get_mut(&id) {
            Some(job) if !job.pending_kill => {
                job.pending_kill = true;
                debug!(%id, name = %job.name, "job marked for removal");
            }
            Some(_) => debug!(%id, "kill ignored: removal already pending"),
            None => debug!(%id, "kill ignored: job already finished or unknown"),
        }
    }

    /// Pause a running job.
    ///
    /// Pausing only stops simulation-scaled waits from accumulating; the
    /// job stays registered, still observes predicate and signal waits,
    /// and can still be killed. No-op unless the job is running.
    pub fn pause(&mut self, id: JobId) {
        match self.jobs.get_mut(&id) {
            Some(job) if job.state == JobState::Running => {
                job.state = JobState::Paused;
                debug!(%id, name = %job.name, "job paused");
            }
            Some(job) => debug!(%id, state = ?job.state, "pause ignored"),
            None => debug!(%id, "pause ignored: job already finished or unknown"),
        }
    }

    /// Resume a paused job. No-op unless the job is paused.
    pub fn resume(&mut self, id: JobId) {
        match self.jobs.get_mut(&id) {
            Some(job) if job.state == JobState::Paused => {
                job.state = JobState::Running;
                debug!(%id, name = %job.name, "job resumed");
            }
            Some(job) => debug!(%id, state = ?job.state, "resume ignored"),
            None => debug!(%id, "resume ignored: job already finished or unknown"),
        }
    }

    // -----------------------------------------------------------------------
    // Tick driver
    // -----------------------------------------------------------------------

    /// Advance every registered job once, then finalize the finished ones.
    ///
    /// `elapsed` is the raw real time since the previous tick, supplied by
    /// the hosting loop. Jobs registered while this tick runs (from a
    /// completion callback) are deferred to the next tick.
    pub fn tick(&mut self, elapsed: Duration) {
        self.frame = self.frame.saturating_add(1);
        let dt = elapsed.as_secs_f64();

        // Phase 1: advance. Snapshot the ids so jobs spawned by phase-2
        // callbacks are not advanced this tick.
        let snapshot: Vec<JobId> = self.jobs.keys().copied().collect();
        let mut finished: Vec<(JobId, bool)> = Vec::new();

        for id in snapshot {
            let Some(job) = self.jobs.get_mut(&id) else {
                continue;
            };
            if job.pending_kill {
                finished.push((id, true));
                continue;
            }
            if !matches!(job.state, JobState::Running | JobState::Paused) {
                continue;
            }
            if job.advance(dt, &self.clock) == Progress::Finished {
                finished.push((id, false));
            }
        }

        // Phase 2: notify, in registration order.
        for (id, was_killed) in finished {
            self.finalize(id, was_killed);
        }
    }

    /// Remove a job from the registry and fire its callback exactly once.
    fn finalize(&mut self, id: JobId, was_killed: bool) {
        let Some(mut job) = self.jobs.remove(&id) else {
            return;
        };
        job.state = if was_killed {
            JobState::Killed
        } else {
            JobState::Completed
        };
        debug!(%id, name = %job.name, was_killed, "job finished");
        if let Some(on_complete) = job.on_complete.take() {
            on_complete(self, was_killed);
        }
    }

    /// Force-kill and immediately finalize every registered job.
    ///
    /// The teardown sweep for scene and session boundaries: callbacks fire
    /// with `was_killed = true` right away, in registration order, without
    /// waiting for a tick, regardless of pause state. Jobs spawned by the
    /// teardown callbacks themselves are left registered.
    pub fn dispose_all(&mut self) {
        let swept = std::mem::take(&mut self.jobs);
        info!(count = swept.len(), "disposing all jobs");
        for (id, mut job) in swept {
            job.state = JobState::Killed;
            debug!(%id, name = %job.name, "job disposed");
            if let Some(on_complete) = job.on_complete.take() {
                on_complete(self, true);
            }
        }
    }

    // -----------------------------------------------------------------------
    // Timed-wait primitives
    // -----------------------------------------------------------------------

    /// Spawn a recurring milestone job.
    ///
    /// Waits `initial` (simulation-scaled), fires `on_milestone`, then
    /// loops waiting `period` and firing again indefinitely. A zero
    /// `initial` fires the first milestone on the first tick. Recurring
    /// jobs never reach `Done` naturally; they run until
    /// [`kill`](Self::kill) or [`dispose_all`](Self::dispose_all).
    pub fn recurring<F>(
        &mut self,
        initial: Duration,
        period: Duration,
        name: &str,
        pausable: bool,
        mut on_milestone: F,
    ) -> JobId
    where
        F: FnMut() + 'static,
    {
        let initial_secs = initial.as_secs_f64();
        let period_secs = period.as_secs_f64();
        let mut primed = false;
        let step: StepFn = Box::new(move || {
            if !primed {
                primed = true;
                if initial_secs > 0.0 {
                    return Step::Yield(Wait::Sim(initial_secs));
                }
            }
            on_milestone();
            Step::Yield(Wait::Sim(period_secs))
        });
        let mut spec = JobSpec::new(name, step);
        spec.pausable = pausable;
        self.spawn(spec)
    }

    /// Spawn a job that waits for an external completion signal.
    ///
    /// The job completes once `primary` and every signal in `dependents`
    /// have been raised (a composite effect counts as finished only when
    /// all of its sub-parts have). `on_finished` is the normal completion
    /// callback and also fires with `was_killed = true` if the signal
    /// never arrives and the job is swept at teardown.
    pub fn wait_for_signals<F>(
        &mut self,
        primary: Signal,
        dependents: Vec<Signal>,
        name: &str,
        pausable: bool,
        on_finished: F,
    ) -> JobId
    where
        F: FnOnce(&mut Self, bool) + 'static,
    {
        let set = SignalSet::with_dependents(primary, dependents);
        let mut suspended = false;
        let step: StepFn = Box::new(move || {
            if suspended {
                Step::Done
            } else {
                suspended = true;
                Step::Yield(Wait::Signal(set.clone()))
            }
        });
        let mut spec = JobSpec::new(name, step);
        spec.pausable = pausable;
        spec.on_complete = Some(Box::new(on_finished) as CompleteFn);
        self.spawn(spec)
    }

    // -----------------------------------------------------------------------
    // Time-scale controls
    // -----------------------------------------------------------------------

    /// Change the game-speed multiplier, rescaling in-flight waits.
    ///
    /// Every registered job's simulation-scaled remainder is rescaled by
    /// `old / new` before the clock commits the new value, so a wait with
    /// 10 seconds left at x1.0 has exactly 5 real seconds left after
    /// switching to x2.0.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::InvalidMultiplier`] if `multiplier` is not a
    /// finite positive number; the clock and all jobs are left untouched.
    pub fn set_time_scale(&mut self, multiplier: f64) -> Result<(), ClockError> {
        let change = self.clock.begin_rate_change(multiplier)?;
        for job in self.jobs.values_mut() {
            job.rescale(change);
        }
        self.clock.commit_rate_change(change);
        info!(old = change.old, new = change.new, "time scale changed");
        Ok(())
    }

    /// Pause or unpause simulation time for every pausable job.
    pub fn set_sim_paused(&mut self, paused: bool) {
        self.clock.set_paused(paused);
        info!(paused, "simulation pause flag changed");
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Return the clock.
    pub const fn clock(&self) -> &GameClock {
        &self.clock
    }

    /// Return a job's current state, or `None` once it has finished.
    pub fn state(&self, id: JobId) -> Option<JobState> {
        self.jobs.get(&id).map(|job| job.state)
    }

    /// Return whether the job is live and running.
    pub fn is_running(&self, id: JobId) -> bool {
        self.state(id) == Some(JobState::Running)
    }

    /// Return whether the job is live and paused.
    pub fn is_paused(&self, id: JobId) -> bool {
        self.state(id) == Some(JobState::Paused)
    }

    /// Return whether the job is still registered.
    pub fn contains(&self, id: JobId) -> bool {
        self.jobs.contains_key(&id)
    }

    /// Number of registered jobs (including created and paused ones).
    pub fn job_count(&self) -> usize {
        self.jobs.len()
    }

    /// Count of ticks executed so far.
    pub const fn frame(&self) -> u64 {
        self.frame
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    /// Shared event recorder for asserting callback order and content.
    type Trace = Rc<RefCell<Vec<String>>>;

    fn trace() -> Trace {
        Rc::new(RefCell::new(Vec::new()))
    }

    /// One-shot step function: a single wait, then done.
    fn one_wait(request: Wait) -> StepFn {
        let mut request = Some(request);
        Box::new(move || match request.take() {
            Some(wait) => Step::Yield(wait),
            None => Step::Done,
        })
    }

    /// Spawn a job with a single wait and a callback that records its fate.
    fn spawn_traced(sched: &mut Scheduler, name: &str, request: Wait, events: &Trace) -> JobId {
        let events = Rc::clone(events);
        let label = name.to_owned();
        let mut spec = JobSpec::new(name, one_wait(request));
        spec.on_complete = Some(Box::new(move |_sched, was_killed| {
            let fate = if was_killed { "killed" } else { "done" };
            events.borrow_mut().push(format!("{label}-{fate}"));
        }));
        sched.spawn(spec)
    }

    fn tick_secs(sched: &mut Scheduler, secs: f64) {
        sched.tick(Duration::from_secs_f64(secs));
    }

    #[test]
    fn natural_completion_fires_callback_once() {
        let mut sched = Scheduler::new();
        let events = trace();
        let id = spawn_traced(&mut sched, "a", Wait::Frames(1), &events);

        tick_secs(&mut sched, 1.0); // install
        tick_secs(&mut sched, 1.0); // frame expires, Done
        tick_secs(&mut sched, 1.0); // nothing further

        assert_eq!(*events.borrow(), vec!["a-done".to_owned()]);
        assert!(!sched.contains(id));
        assert_eq!(sched.state(id), None);
    }

    #[test]
    fn kill_defers_callback_to_next_tick() {
        let mut sched = Scheduler::new();
        let events = trace();
        let id = spawn_traced(&mut sched, "a", Wait::Sim(100.0), &events);

        sched.kill(id);
        // Never synchronous with kill().
        assert!(events.borrow().is_empty());
        assert!(sched.contains(id));

        tick_secs(&mut sched, 1.0);
        assert_eq!(*events.borrow(), vec!["a-killed".to_owned()]);
        assert!(!sched.contains(id));
    }

    #[test]
    fn kill_is_idempotent_on_terminal_jobs() {
        let mut sched = Scheduler::new();
        let events = trace();
        let id = spawn_traced(&mut sched, "a", Wait::Sim(100.0), &events);

        sched.kill(id);
        sched.kill(id); // pending already
        tick_secs(&mut sched, 1.0);
        sched.kill(id); // gone entirely
        tick_secs(&mut sched, 1.0);

        assert_eq!(events.borrow().len(), 1);
    }

    #[test]
    fn kill_and_replace_do_not_cross() {
        let mut sched = Scheduler::new();
        let events = trace();

        // Caller kills job A and immediately reuses the variable for B.
        let mut slot = spawn_traced(&mut sched, "a", Wait::Sim(100.0), &events);
        sched.kill(slot);
        slot = spawn_traced(&mut sched, "b", Wait::Frames(1), &events);

        tick_secs(&mut sched, 1.0); // A finalized killed, B installs its wait
        tick_secs(&mut sched, 1.0); // B completes

        assert_eq!(
            *events.borrow(),
            vec!["a-killed".to_owned(), "b-done".to_owned()]
        );
        assert!(!sched.contains(slot));
    }

    #[test]
    fn callbacks_fire_in_registration_order() {
        let mut sched = Scheduler::new();
        let events = trace();
        // All three finish on the same tick.
        spawn_traced(&mut sched, "first", Wait::Frames(1), &events);
        spawn_traced(&mut sched, "second", Wait::Frames(1), &events);
        spawn_traced(&mut sched, "third", Wait::Frames(1), &events);

        tick_secs(&mut sched, 1.0);
        tick_secs(&mut sched, 1.0);

        assert_eq!(
            *events.borrow(),
            vec![
                "first-done".to_owned(),
                "second-done".to_owned(),
                "third-done".to_owned()
            ]
        );
    }

    #[test]
    fn rescale_halves_remaining_real_time() {
        let mut sched = Scheduler::new();
        let events = trace();
        spawn_traced(&mut sched, "a", Wait::Sim(10.0), &events);

        tick_secs(&mut sched, 0.0); // install at x1.0
        sched.set_time_scale(2.0).unwrap();

        // 5 real seconds of ticking at the new rate, not 10.
        for _ in 0..4 {
            tick_secs(&mut sched, 1.0);
            assert!(events.borrow().is_empty());
        }
        tick_secs(&mut sched, 1.0);
        assert_eq!(*events.borrow(), vec!["a-done".to_owned()]);
    }

    #[test]
    fn invalid_time_scale_leaves_everything_untouched() {
        let mut sched = Scheduler::new();
        let events = trace();
        spawn_traced(&mut sched, "a", Wait::Sim(2.0), &events);
        tick_secs(&mut sched, 0.0);

        assert!(sched.set_time_scale(0.0).is_err());
        assert!(sched.set_time_scale(f64::NAN).is_err());

        tick_secs(&mut sched, 1.0);
        tick_secs(&mut sched, 1.0);
        assert_eq!(*events.borrow(), vec!["a-done".to_owned()]);
    }

    #[test]
    fn pause_consumes_zero_simulated_time() {
        let mut sched = Scheduler::new();
        let events = trace();
        let id = spawn_traced(&mut sched, "a", Wait::Sim(4.0), &events);

        tick_secs(&mut sched, 0.0); // install
        tick_secs(&mut sched, 1.0);
        tick_secs(&mut sched, 1.0); // 2 seconds consumed

        sched.pause(id);
        assert!(sched.is_paused(id));
        for _ in 0..17 {
            tick_secs(&mut sched, 1.0);
        }
        assert!(events.borrow().is_empty());

        sched.resume(id);
        assert!(sched.is_running(id));
        tick_secs(&mut sched, 1.0);
        assert!(events.borrow().is_empty());
        tick_secs(&mut sched, 1.0); // exactly 2 more seconds
        assert_eq!(*events.borrow(), vec!["a-done".to_owned()]);
    }

    #[test]
    fn clock_pause_freezes_only_pausable_jobs() {
        let mut sched = Scheduler::new();
        let events = trace();

        let pausable = spawn_traced(&mut sched, "hud", Wait::Sim(2.0), &events);
        let hardened = Rc::clone(&events);
        let mut spec = JobSpec::new("wallclock", one_wait(Wait::Sim(2.0)));
        spec.pausable = false;
        spec.on_complete = Some(Box::new(move |_sched, _was_killed| {
            hardened.borrow_mut().push("wallclock-done".to_owned());
        }));
        sched.spawn(spec);

        tick_secs(&mut sched, 0.0); // install both
        sched.set_sim_paused(true);
        tick_secs(&mut sched, 1.0);
        tick_secs(&mut sched, 1.0);

        // Only the non-pausable job ran out.
        assert_eq!(*events.borrow(), vec!["wallclock-done".to_owned()]);
        assert!(sched.contains(pausable));

        sched.set_sim_paused(false);
        tick_secs(&mut sched, 1.0);
        tick_secs(&mut sched, 1.0);
        assert_eq!(events.borrow().len(), 2);
    }

    #[test]
    fn paused_job_can_still_be_killed() {
        let mut sched = Scheduler::new();
        let events = trace();
        let id = spawn_traced(&mut sched, "a", Wait::Sim(100.0), &events);

        tick_secs(&mut sched, 0.0);
        sched.pause(id);
        sched.kill(id);
        tick_secs(&mut sched, 1.0);

        assert_eq!(*events.borrow(), vec!["a-killed".to_owned()]);
    }

    #[test]
    fn created_job_waits_for_start() {
        let mut sched = Scheduler::new();
        let events = trace();
        let recorder = Rc::clone(&events);
        let mut spec = JobSpec::new("manual", one_wait(Wait::Frames(1)));
        spec.auto_start = false;
        spec.on_complete = Some(Box::new(move |_sched, _was_killed| {
            recorder.borrow_mut().push("manual-done".to_owned());
        }));
        let id = sched.spawn(spec);

        for _ in 0..5 {
            tick_secs(&mut sched, 1.0);
        }
        assert_eq!(sched.state(id), Some(JobState::Created));
        assert!(events.borrow().is_empty());

        sched.start(id);
        assert!(sched.is_running(id));
        tick_secs(&mut sched, 1.0);
        tick_secs(&mut sched, 1.0);
        assert_eq!(*events.borrow(), vec!["manual-done".to_owned()]);

        // Restarting a finished job is a silent no-op.
        sched.start(id);
        assert_eq!(sched.state(id), None);
    }

    #[test]
    fn recurring_cadence_with_zero_initial_delay() {
        let mut sched = Scheduler::new();
        let count = Rc::new(RefCell::new(0_u32));
        let counter = Rc::clone(&count);
        let id = sched.recurring(
            Duration::ZERO,
            Duration::from_secs(1),
            "refresh",
            true,
            move || {
                let mut count = counter.borrow_mut();
                *count = count.saturating_add(1);
            },
        );

        for expected in 1..=6_u32 {
            tick_secs(&mut sched, 1.0);
            assert_eq!(*count.borrow(), expected);
        }

        // Runs forever until killed.
        assert!(sched.is_running(id));
        sched.kill(id);
        tick_secs(&mut sched, 1.0);
        assert!(!sched.contains(id));
        assert_eq!(*count.borrow(), 6);
    }

    #[test]
    fn recurring_honors_initial_delay() {
        let mut sched = Scheduler::new();
        let count = Rc::new(RefCell::new(0_u32));
        let counter = Rc::clone(&count);
        sched.recurring(
            Duration::from_secs(3),
            Duration::from_secs(1),
            "delayed",
            true,
            move || {
                let mut count = counter.borrow_mut();
                *count = count.saturating_add(1);
            },
        );

        tick_secs(&mut sched, 1.0); // install initial wait
        tick_secs(&mut sched, 1.0);
        tick_secs(&mut sched, 1.0);
        assert_eq!(*count.borrow(), 0);
        tick_secs(&mut sched, 1.0); // initial expires, first milestone
        assert_eq!(*count.borrow(), 1);
        tick_secs(&mut sched, 1.0);
        assert_eq!(*count.borrow(), 2);
    }

    #[test]
    fn signal_wait_requires_all_dependents() {
        let mut sched = Scheduler::new();
        let events = trace();
        let recorder = Rc::clone(&events);

        let explosion = Signal::new();
        let debris = Signal::new();
        let flash = Signal::new();
        sched.wait_for_signals(
            explosion.clone(),
            vec![debris.clone(), flash.clone()],
            "explosion-finished",
            true,
            move |_sched: &mut Scheduler, was_killed| {
                let fate = if was_killed { "killed" } else { "done" };
                recorder.borrow_mut().push(format!("explosion-{fate}"));
            },
        );

        tick_secs(&mut sched, 1.0); // install
        explosion.raise();
        debris.raise();
        tick_secs(&mut sched, 1.0);
        assert!(events.borrow().is_empty());

        flash.raise();
        tick_secs(&mut sched, 1.0); // signal observed, poll yields Done
        tick_secs(&mut sched, 1.0);
        assert_eq!(*events.borrow(), vec!["explosion-done".to_owned()]);
    }

    #[test]
    fn dispose_all_sweeps_every_job_immediately() {
        let mut sched = Scheduler::new();
        let events = trace();

        let running = spawn_traced(&mut sched, "running", Wait::Sim(100.0), &events);
        let paused = spawn_traced(&mut sched, "paused", Wait::Sim(100.0), &events);
        let recorder = Rc::clone(&events);
        let mut spec = JobSpec::new("created", one_wait(Wait::Frames(1)));
        spec.auto_start = false;
        spec.on_complete = Some(Box::new(move |_sched, was_killed| {
            assert!(was_killed);
            recorder.borrow_mut().push("created-killed".to_owned());
        }));
        let created = sched.spawn(spec);

        tick_secs(&mut sched, 1.0);
        sched.pause(paused);

        sched.dispose_all();
        assert_eq!(sched.job_count(), 0);
        assert!(!sched.contains(running));
        assert!(!sched.contains(paused));
        assert!(!sched.contains(created));
        assert_eq!(
            *events.borrow(),
            vec![
                "running-killed".to_owned(),
                "paused-killed".to_owned(),
                "created-killed".to_owned()
            ]
        );
    }

    #[test]
    fn callback_spawned_jobs_are_deferred_one_tick() {
        let mut sched = Scheduler::new();
        let events = trace();
        let recorder = Rc::clone(&events);

        let mut spec = JobSpec::new("parent", one_wait(Wait::Frames(1)));
        spec.on_complete = Some(Box::new(move |sched: &mut Scheduler, _was_killed| {
            recorder.borrow_mut().push("parent-done".to_owned());
            let inner = Rc::clone(&recorder);
            let mut child = JobSpec::new(
                "child",
                Box::new(|| Step::Done) as StepFn,
            );
            child.on_complete = Some(Box::new(move |_sched, _was_killed| {
                inner.borrow_mut().push("child-done".to_owned());
            }));
            sched.spawn(child);
        }));
        sched.spawn(spec);

        tick_secs(&mut sched, 1.0); // install parent wait
        tick_secs(&mut sched, 1.0); // parent finishes, child spawned in callback
        assert_eq!(*events.borrow(), vec!["parent-done".to_owned()]);
        assert_eq!(sched.job_count(), 1);

        tick_secs(&mut sched, 1.0); // child's first advancement: immediate Done
        assert_eq!(
            *events.borrow(),
            vec!["parent-done".to_owned(), "child-done".to_owned()]
        );
        assert_eq!(sched.job_count(), 0);
    }

    #[test]
    fn real_wait_runs_through_sim_pause() {
        let mut sched = Scheduler::new();
        let events = trace();
        spawn_traced(&mut sched, "flash", Wait::Real(2.0), &events);

        tick_secs(&mut sched, 0.0); // install
        sched.set_sim_paused(true);
        tick_secs(&mut sched, 1.0);
        tick_secs(&mut sched, 1.0);
        assert_eq!(*events.borrow(), vec!["flash-done".to_owned()]);
    }

    #[test]
    fn until_wait_bridges_polled_flags() {
        let mut sched = Scheduler::new();
        let events = trace();
        let flag = Rc::new(RefCell::new(false));
        let polled = Rc::clone(&flag);
        spawn_traced(
            &mut sched,
            "effect",
            Wait::until(move || *polled.borrow()),
            &events,
        );

        tick_secs(&mut sched, 1.0); // install
        tick_secs(&mut sched, 1.0);
        assert!(events.borrow().is_empty());

        *flag.borrow_mut() = true;
        tick_secs(&mut sched, 1.0);
        assert_eq!(*events.borrow(), vec!["effect-done".to_owned()]);
    }

    #[test]
    fn with_config_applies_time_settings() {
        let mut config = SchedulerConfig::default();
        config.time.multiplier = 2.5;
        config.time.start_paused = true;
        let sched = Scheduler::with_config(&config).unwrap();
        assert!(sched.clock().is_paused());
        assert!((sched.clock().multiplier() - 2.5).abs() < f64::EPSILON);

        config.time.multiplier = -1.0;
        assert!(Scheduler::with_config(&config).is_err());
    }

    #[test]
    fn frame_counter_advances_per_tick() {
        let mut sched = Scheduler::new();
        assert_eq!(sched.frame(), 0);
        tick_secs(&mut sched, 0.5);
        tick_secs(&mut sched, 0.5);
        assert_eq!(sched.frame(), 2);
    }
}
