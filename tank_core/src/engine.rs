//! The per-tick mapping from lever angles to rotor commands.

use eyre::WrapErr;
use tank_traits::{Rotor, TextSink};

use crate::config::EngineCfg;
use crate::discovery::DiscoveryReport;
use crate::error::Result;
use crate::hw_error::port_report;
use crate::registry::{Channel, DriveGroup, Lever, Registry};
use crate::status::{self, LeverReport, StatusBuffers, TickReport};
use crate::util::lever_angle_deg;

/// Angles strictly inside `(-deadzone, deadzone)` read as 0.
#[inline]
pub fn apply_deadzone(angle_deg: f32, deadzone_deg: f32) -> f32 {
    if angle_deg > -deadzone_deg && angle_deg < deadzone_deg {
        0.0
    } else {
        angle_deg
    }
}

/// Target rotor speed for a drive lever at `angle_deg` (deadzone already applied).
#[inline]
pub fn drive_speed(angle_deg: f32, cfg: &EngineCfg, gear_ratio: f32, reversed: bool) -> f32 {
    let speed = angle_deg * cfg.rpm_per_degree * gear_ratio;
    if reversed { -speed } else { speed }
}

/// Gear ratio selected by a gear lever at `angle_deg` (deadzone already applied).
#[inline]
pub fn gear_ratio_for(angle_deg: f32, cfg: &EngineCfg, reversed: bool) -> f32 {
    let gear = angle_deg * cfg.gear_ratio_per_degree;
    if reversed { -gear } else { gear }
}

/// State carried from one tick to the next besides the per-lever last speed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineState {
    pub gear_ratio: f32,
}

struct Reading {
    raw_deg: f32,
    angle_deg: f32,
    unlocked: bool,
}

/// Read a lever, release it if it sits at exactly 0°, apply the deadzone.
///
/// Only the registration flagged `releases` touches the lock, so a hinge
/// registered under several roles is released once per tick.
fn read_lever(lever: &mut Lever, cfg: &EngineCfg) -> Result<Reading> {
    let raw_rad = lever
        .hinge
        .angle_rad()
        .map_err(port_report)
        .wrap_err_with(|| format!("read angle of '{}'", lever.name))?;
    let raw_deg = lever_angle_deg(raw_rad);
    let unlocked = lever.releases && raw_deg == 0.0;
    if unlocked {
        let limit = cfg.unlock_limit_deg;
        lever
            .hinge
            .set_enabled(false)
            .and_then(|()| lever.hinge.set_lower_limit_deg(-limit))
            .and_then(|()| lever.hinge.set_upper_limit_deg(limit))
            .map_err(port_report)
            .wrap_err_with(|| format!("unlock '{}'", lever.name))?;
        tracing::trace!(lever = %lever.name, "released at 0°");
    }
    Ok(Reading {
        raw_deg,
        angle_deg: apply_deadzone(raw_deg, cfg.deadzone_deg),
        unlocked,
    })
}

/// Command every rotor of `pool`, logging each one's previous velocity.
fn command_pool(
    pool: &mut [Box<dyn Rotor>],
    speed: f32,
    status: &mut StatusBuffers,
) -> Result<usize> {
    for rotor in pool.iter_mut() {
        let previous = rotor
            .target_velocity_rpm()
            .map_err(port_report)
            .wrap_err_with(|| format!("read velocity of '{}'", rotor.label()))?;
        status.push_write(rotor.label(), previous);
        rotor
            .set_target_velocity_rpm(speed)
            .map_err(port_report)
            .wrap_err_with(|| format!("command '{}'", rotor.label()))?;
    }
    Ok(pool.len())
}

/// The tank controller: registry, carried state and the controller's own outputs.
///
/// Evaluation order inside a tick: every Gear lever first (registry order,
/// the last one sets the ratio), then every Left/Right lever with that ratio.
/// A tick that hits a port error stops there and returns it; levers already
/// processed keep what they wrote, and the next tick starts from fresh reads.
pub struct Tank {
    pub(crate) registry: Registry,
    pub(crate) cfg: EngineCfg,
    pub(crate) state: EngineState,
    pub(crate) surface: Box<dyn TextSink>,
    pub(crate) log: Box<dyn TextSink>,
    pub(crate) discovery: DiscoveryReport,
    pub(crate) ticks: u64,
}

impl core::fmt::Debug for Tank {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tank")
            .field("levers", &self.registry.levers.len())
            .field("displays", &self.registry.displays.len())
            .field("gear_ratio", &self.state.gear_ratio)
            .field("ticks", &self.ticks)
            .finish()
    }
}

impl Tank {
    /// Start building a Tank.
    pub fn builder() -> crate::builder::TankBuilder<crate::builder::Missing> {
        crate::builder::TankBuilder::default()
    }

    pub fn gear_ratio(&self) -> f32 {
        self.state.gear_ratio
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn engine_cfg(&self) -> &EngineCfg {
        &self.cfg
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn discovery(&self) -> &DiscoveryReport {
        &self.discovery
    }

    /// Ticks completed so far.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// One control loop iteration.
    pub fn tick(&mut self) -> Result<TickReport> {
        let tick = self.ticks + 1;
        let cfg = self.cfg;
        let mut status = StatusBuffers::default();
        let mut levers = Vec::with_capacity(self.registry.levers.len());

        let Registry {
            levers: registry_levers,
            left_drives,
            right_drives,
            displays,
        } = &mut self.registry;

        for lever in registry_levers.iter_mut().filter(|l| l.role == Channel::Gear) {
            let r = read_lever(lever, &cfg)?;
            let gear = gear_ratio_for(r.angle_deg, &cfg, lever.reversed);
            self.state.gear_ratio = gear;
            status.push_gear(r.raw_deg, gear);
            levers.push(LeverReport {
                name: lever.name.clone(),
                channel: Channel::Gear,
                raw_angle_deg: r.raw_deg,
                angle_deg: r.angle_deg,
                output: gear,
                unlocked: r.unlocked,
                writes: 0,
            });
        }

        let gear_ratio = self.state.gear_ratio;
        for lever in registry_levers.iter_mut().filter(|l| l.role != Channel::Gear) {
            let r = read_lever(lever, &cfg)?;
            let speed = drive_speed(r.angle_deg, &cfg, gear_ratio, lever.reversed);
            status.push_drive(lever.role, r.angle_deg, speed);

            let mut writes = 0;
            if lever.last_commanded != Some(speed) {
                let pool: &mut [Box<dyn Rotor>] = match lever.group {
                    Some(DriveGroup::Left) => left_drives.as_mut_slice(),
                    Some(DriveGroup::Right) => right_drives.as_mut_slice(),
                    None => &mut [],
                };
                writes = command_pool(pool, speed, &mut status)
                    .wrap_err_with(|| format!("drive lever '{}'", lever.name))?;
                lever.last_commanded = Some(speed);
                tracing::trace!(lever = %lever.name, speed, writes, "pool commanded");
            }
            levers.push(LeverReport {
                name: lever.name.clone(),
                channel: lever.role,
                raw_angle_deg: r.raw_deg,
                angle_deg: r.angle_deg,
                output: speed,
                unlocked: r.unlocked,
                writes,
            });
        }

        status::distribute(&status, displays, &mut *self.surface, &mut *self.log)?;

        self.ticks = tick;
        let report = TickReport {
            tick,
            gear_ratio: self.state.gear_ratio,
            levers,
            status,
        };
        tracing::debug!(
            tick,
            gear_ratio = report.gear_ratio,
            writes = report.total_writes(),
            "tick"
        );
        Ok(report)
    }
}
