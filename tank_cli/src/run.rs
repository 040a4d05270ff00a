//! `tank run`: drive the engine over the simulated construct.

use std::path::Path;
use std::sync::atomic::AtomicBool;

use eyre::WrapErr;
use serde_json::json;
use tank_config::{Config, ScriptRow};
use tank_core::runner::{self, RunParams, RunSummary, TickObserver};
use tank_core::{ScheduleCfg, TankError, TickReport};
use tank_hardware::{SimConstruct, SimHinge};
use tank_traits::{Device, MonotonicClock};

/// Applies scripted lever moves before each tick and prints each report.
pub struct ScriptPlayer {
    moves: Vec<(u64, SimHinge, f32)>,
    next: usize,
    json: bool,
}

impl ScriptPlayer {
    /// Resolve every row's hinge up front so a typo fails before the first tick.
    pub fn new(grid: &SimConstruct, rows: Vec<ScriptRow>, json: bool) -> eyre::Result<Self> {
        let moves = rows
            .into_iter()
            .map(|row| {
                let hinge = grid.hinge(&row.lever).map_err(|_| {
                    eyre::Report::new(TankError::Config(format!(
                        "lever script names unknown hinge '{}'",
                        row.lever
                    )))
                })?;
                Ok((row.tick, hinge, row.angle_deg))
            })
            .collect::<eyre::Result<Vec<_>>>()?;
        Ok(Self {
            moves,
            next: 0,
            json,
        })
    }
}

impl TickObserver for ScriptPlayer {
    fn before_tick(&mut self, tick: u64) -> tank_core::Result<()> {
        // A row with tick T applies once T ticks have completed.
        while let Some((at, hinge, deg)) = self.moves.get(self.next) {
            if *at >= tick {
                break;
            }
            tracing::debug!(tick, hinge = %hinge.label(), deg, "scripted move");
            hinge.set_angle_deg(*deg);
            self.next += 1;
        }
        Ok(())
    }

    fn after_tick(&mut self, report: &TickReport) -> tank_core::Result<()> {
        if self.json {
            println!("{}", report_json(report));
        } else {
            println!("[tick {}]", report.tick);
            print!("{}", report.status.combined());
        }
        Ok(())
    }
}

/// One JSON line per tick.
pub fn report_json(report: &TickReport) -> serde_json::Value {
    let levers: Vec<serde_json::Value> = report
        .levers
        .iter()
        .map(|l| {
            json!({
                "name": l.name,
                "channel": l.channel.as_str(),
                "angle_deg": l.angle_deg,
                "raw_angle_deg": l.raw_angle_deg,
                "output": l.output,
                "unlocked": l.unlocked,
                "writes": l.writes,
            })
        })
        .collect();
    json!({
        "tick": report.tick,
        "gear_ratio": report.gear_ratio,
        "writes": report.total_writes(),
        "levers": levers,
    })
}

pub fn run_cmd(
    cfg: &Config,
    ticks: Option<u64>,
    script: Option<&Path>,
    realtime: bool,
    json: bool,
    shutdown: &AtomicBool,
) -> eyre::Result<RunSummary> {
    let (grid, mut tank) = crate::sim::build_tank(cfg)?;
    let rows = match script {
        Some(path) => tank_config::load_lever_script_csv(path)
            .wrap_err_with(|| format!("load lever script {}", path.display()))?,
        None => Vec::new(),
    };
    let mut player = ScriptPlayer::new(&grid, rows, json)?;

    let schedule: ScheduleCfg = (&cfg.schedule).into();
    let params = RunParams {
        schedule,
        max_ticks: ticks,
        paced: realtime,
    };
    runner::run(&mut tank, &MonotonicClock::new(), params, shutdown, &mut player)
}

pub fn print_summary(summary: &RunSummary, json: bool) {
    if json {
        println!(
            "{}",
            json!({
                "ticks": summary.ticks,
                "writes": summary.writes,
                "duration_ms": summary.elapsed_ms,
                "gear_ratio": summary.gear_ratio,
                "stopped_by_shutdown": summary.stopped_by_shutdown,
            })
        );
    } else {
        println!(
            "Ran {} ticks in {} ms ({} rotor writes, gear x {:.2})",
            summary.ticks, summary.elapsed_ms, summary.writes, summary.gear_ratio
        );
    }
}
