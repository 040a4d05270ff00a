use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tank_traits::Clock;

use crate::config::ScheduleCfg;
use crate::engine::Tank;
use crate::error::Result;
use crate::status::TickReport;

/// How a run is paced and bounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunParams {
    pub schedule: ScheduleCfg,
    /// Stop after this many ticks; `None` runs until shutdown.
    pub max_ticks: Option<u64>,
    /// Sleep on the clock between ticks. Off, ticks run back to back.
    pub paced: bool,
}

impl Default for RunParams {
    fn default() -> Self {
        Self {
            schedule: ScheduleCfg::default(),
            max_ticks: None,
            paced: true,
        }
    }
}

/// Per-tick hooks for the host: move levers before a tick, look at its report after.
pub trait TickObserver {
    /// Called with the 1-based number of the tick about to run.
    fn before_tick(&mut self, _tick: u64) -> Result<()> {
        Ok(())
    }

    fn after_tick(&mut self, _report: &TickReport) -> Result<()> {
        Ok(())
    }
}

impl TickObserver for () {}

/// What a finished run did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunSummary {
    pub ticks: u64,
    /// Rotor writes over the whole run.
    pub writes: u64,
    pub elapsed_ms: u64,
    pub stopped_by_shutdown: bool,
    pub gear_ratio: f32,
}

/// Time left until `deadline`, or zero when it already passed.
#[inline]
fn until(deadline: Duration, now: Duration) -> Duration {
    deadline.saturating_sub(now)
}

/// Drive `tank.tick()` on the schedule until `max_ticks` or `shutdown`.
///
/// Deadlines are absolute (tick `n` is due at `n * period` from the start) so
/// a slow tick does not shift the ones after it. A tick error ends the run.
pub fn run<C: Clock>(
    tank: &mut Tank,
    clock: &C,
    params: RunParams,
    shutdown: &AtomicBool,
    observer: &mut dyn TickObserver,
) -> Result<RunSummary> {
    let period = params.schedule.period();
    let epoch = clock.now();
    let mut ticks = 0u64;
    let mut writes = 0u64;
    let mut stopped_by_shutdown = false;

    tracing::info!(
        period_us = period.as_micros() as u64,
        max_ticks = params.max_ticks,
        paced = params.paced,
        "run start"
    );

    loop {
        if params.max_ticks.is_some_and(|max| ticks >= max) {
            break;
        }
        if shutdown.load(Ordering::Relaxed) {
            stopped_by_shutdown = true;
            tracing::info!(ticks, "shutdown requested");
            break;
        }

        observer.before_tick(tank.ticks() + 1)?;
        let report = match tank.tick() {
            Ok(r) => r,
            Err(e) => {
                tracing::error!(error = %e, tick = tank.ticks() + 1, "tick failed");
                return Err(e);
            }
        };
        ticks += 1;
        writes += report.total_writes() as u64;
        observer.after_tick(&report)?;

        if params.paced {
            let deadline = period.saturating_mul(u32::try_from(ticks).unwrap_or(u32::MAX));
            let now = clock.now().saturating_duration_since(epoch);
            let wait = until(deadline, now);
            if wait.is_zero() {
                tracing::debug!(tick = ticks, "tick overran its period");
            } else {
                clock.sleep(wait);
            }
        }
    }

    let summary = RunSummary {
        ticks,
        writes,
        elapsed_ms: clock.ms_since(epoch),
        stopped_by_shutdown,
        gear_ratio: tank.gear_ratio(),
    };
    tracing::info!(
        ticks = summary.ticks,
        writes = summary.writes,
        elapsed_ms = summary.elapsed_ms,
        "run complete"
    );
    Ok(summary)
}
