//! Assembly of the simulated construct from the `[[devices]]` table.

use eyre::WrapErr;
use tank_config::{Config, DeviceKind};
use tank_core::{EngineCfg, Tank};
use tank_hardware::SimConstruct;
use tank_traits::{ConstructId, PortError, TextSink};

/// Controller log that forwards every status block to `tracing`.
#[derive(Debug, Default)]
pub struct TracingLog {
    pending: String,
}

impl TextSink for TracingLog {
    fn write_text(&mut self, text: &str, append: bool) -> Result<(), PortError> {
        if !append {
            self.pending.clear();
        }
        self.pending.push_str(text);
        Ok(())
    }

    fn write_line(&mut self, line: &str) -> Result<(), PortError> {
        self.pending.push_str(line);
        tracing::debug!(target: "tank::status", status = %self.pending.trim_end(), "controller log");
        self.pending.clear();
        Ok(())
    }
}

pub fn build_construct(cfg: &Config) -> SimConstruct {
    let own = ConstructId(cfg.construct.id);
    let mut grid = SimConstruct::new(own);
    for dev in &cfg.devices {
        let construct = dev.construct.map_or(own, ConstructId);
        match dev.kind {
            DeviceKind::Hinge => {
                grid.add_hinge_in(construct, &dev.name, dev.angle_deg);
            }
            DeviceKind::Rotor => {
                grid.add_rotor_in(construct, &dev.name);
            }
            DeviceKind::Lcd => {
                grid.add_panel_in(construct, &dev.name);
            }
        }
    }
    tracing::debug!(devices = cfg.devices.len(), own = own.0, "simulated construct ready");
    grid
}

/// Build the construct and a `Tank` over it; the construct is returned so
/// the caller keeps handles to move levers.
pub fn build_tank(cfg: &Config) -> eyre::Result<(SimConstruct, Tank)> {
    let grid = build_construct(cfg);
    let engine: EngineCfg = (&cfg.engine).into();
    let tank = Tank::builder()
        .with_directory(grid.clone())
        .with_engine(engine)
        .with_log(TracingLog::default())
        .build()
        .wrap_err("build tank")?;
    Ok((grid, tank))
}
