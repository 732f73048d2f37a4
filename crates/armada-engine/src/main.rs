//! Host loop binary for the Armada cooperative job scheduler.
//!
//! The scheduler core never generates its own ticks; this binary is the
//! hosting loop that does. It loads configuration, initializes logging,
//! wires up a demo set of jobs of every flavor the core supports, and
//! pulses `Scheduler::tick` at the configured interval until the run
//! bounds are hit, then tears everything down with `dispose_all`.
//!
//! # Startup sequence
//!
//! 1. Initialize structured logging (tracing)
//! 2. Load configuration from `armada-config.yaml`
//! 3. Create the scheduler with the configured time scale
//! 4. Spawn the demo jobs (HUD refresh, fleet arrival, explosion wait)
//! 5. Run the tick loop, doubling game speed partway through
//! 6. Sweep all remaining jobs and log the result

use std::path::Path;
use std::time::{Duration, Instant};

use armada_sched::{JobSpec, Scheduler, SchedulerConfig, Signal, Step, StepFn, Wait};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Tick at which the demo doubles the game speed.
const SPEED_UP_FRAME: u64 = 120;

/// Signals held by the demo so external systems (here: other jobs) can
/// push completion into the scheduler.
struct DemoSignals {
    /// Raised when the demo explosion's main effect finishes.
    explosion: Signal,
    /// Raised when the explosion's debris sub-effect finishes.
    debris: Signal,
}

/// Application entry point for the host loop.
///
/// # Errors
///
/// Returns an error if configuration loading or scheduler creation fails.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    info!("armada-engine starting");

    // 2. Load configuration.
    let config = load_config()?;
    info!(
        multiplier = config.time.multiplier,
        start_paused = config.time.start_paused,
        tick_interval_ms = config.host.tick_interval_ms,
        max_ticks = config.host.max_ticks,
        "Configuration loaded"
    );

    // 3. Create the scheduler.
    let mut scheduler = Scheduler::with_config(&config)?;

    // 4. Spawn the demo jobs.
    let signals = spawn_demo_jobs(&mut scheduler);
    info!(jobs = scheduler.job_count(), "Demo jobs registered");

    // 5. Run the tick loop.
    run_loop(&mut scheduler, &config).await?;
    info!(
        explosion_finished = signals.explosion.is_raised(),
        debris_finished = signals.debris.is_raised(),
        "Demo effect state at shutdown"
    );

    // 6. Teardown: no job outlives the session.
    scheduler.dispose_all();
    info!(
        frames = scheduler.frame(),
        remaining = scheduler.job_count(),
        "armada-engine stopped"
    );

    Ok(())
}

/// Load `armada-config.yaml` from the working directory, falling back to
/// defaults when the file is absent.
fn load_config() -> anyhow::Result<SchedulerConfig> {
    let path = Path::new("armada-config.yaml");
    if path.exists() {
        Ok(SchedulerConfig::from_file(path)?)
    } else {
        info!("armada-config.yaml not found, using defaults");
        Ok(SchedulerConfig::default())
    }
}

/// Register one job of every flavor the core supports.
///
/// - A recurring HUD refresh milestone (runs until teardown).
/// - A fleet-arrival wait on simulation time, so it stretches and
///   shrinks with the game speed.
/// - A frame-count fuse that raises the explosion signals.
/// - A signal wait that completes once the explosion and its debris
///   sub-effect have both finished.
fn spawn_demo_jobs(scheduler: &mut Scheduler) -> DemoSignals {
    // HUD refresh: twice per simulated second, forever.
    let mut refreshes: u64 = 0;
    scheduler.recurring(
        Duration::ZERO,
        Duration::from_millis(500),
        "hud-refresh",
        true,
        move || {
            refreshes = refreshes.saturating_add(1);
            if refreshes.is_multiple_of(10) {
                info!(refreshes, "HUD refreshed");
            }
        },
    );

    // Fleet arrival: 8 simulated seconds in warp, then done.
    let mut warped = false;
    let step: StepFn = Box::new(move || {
        if warped {
            Step::Done
        } else {
            warped = true;
            Step::Yield(Wait::Sim(8.0))
        }
    });
    let mut spec = JobSpec::new("fleet-arrival", step);
    spec.on_complete = Some(Box::new(|_scheduler, was_killed| {
        info!(was_killed, "Fleet arrived at waypoint");
    }));
    scheduler.spawn(spec);

    // Explosion fuse: after 90 frames the effect system (played here by
    // the fuse job itself) raises the main signal, 30 frames later the
    // debris sub-effect finishes too.
    let signals = DemoSignals {
        explosion: Signal::new(),
        debris: Signal::new(),
    };
    let main_signal = signals.explosion.clone();
    let debris_signal = signals.debris.clone();
    let mut phase: u8 = 0;
    let fuse: StepFn = Box::new(move || match phase {
        0 => {
            phase = 1;
            Step::Yield(Wait::Frames(90))
        }
        1 => {
            main_signal.raise();
            phase = 2;
            Step::Yield(Wait::Frames(30))
        }
        _ => {
            debris_signal.raise();
            Step::Done
        }
    });
    scheduler.spawn(JobSpec::new("explosion-fuse", fuse));

    scheduler.wait_for_signals(
        signals.explosion.clone(),
        vec![signals.debris.clone()],
        "explosion-finished",
        true,
        |_scheduler: &mut Scheduler, was_killed| {
            info!(was_killed, "Explosion fully dissipated");
        },
    );

    signals
}

/// Pulse the scheduler until the configured tick bound is reached.
///
/// Elapsed real time is measured per iteration rather than assumed from
/// the interval, so a slow frame simply shows up as a larger `elapsed`.
async fn run_loop(scheduler: &mut Scheduler, config: &SchedulerConfig) -> anyhow::Result<()> {
    let interval = Duration::from_millis(config.host.tick_interval_ms);
    let mut last_tick = Instant::now();

    loop {
        if config.host.max_ticks > 0 && scheduler.frame() >= config.host.max_ticks {
            info!(max_ticks = config.host.max_ticks, "Tick limit reached");
            return Ok(());
        }

        if !interval.is_zero() {
            tokio::time::sleep(interval).await;
        }

        let now = Instant::now();
        scheduler.tick(now.duration_since(last_tick));
        last_tick = now;

        if scheduler.frame() == SPEED_UP_FRAME {
            scheduler.set_time_scale(2.0)?;
        }

        // The demo winds down once only the recurring HUD job is left.
        if config.host.max_ticks == 0 && scheduler.job_count() <= 1 {
            info!(frame = scheduler.frame(), "Demo jobs drained");
            return Ok(());
        }
    }
}
