//! Type-state builder for `Tank` and the generic `build_tank` constructor.
//!
//! `build()` only exists once a directory has been provided.

use tank_traits::{Directory, TextSink};

use crate::config::EngineCfg;
use crate::discovery::discover;
use crate::engine::{EngineState, Tank};
use crate::error::{BuildError, Result};
use crate::mocks::NullSink;

// ── Type-state markers ───────────────────────────────────────────────────────

/// No directory yet.
pub struct Missing;

/// Builder for `Tank`. The engine config is validated on `build()`.
pub struct TankBuilder<D> {
    directory: Option<D>,
    engine: Option<EngineCfg>,
    surface: Option<Box<dyn TextSink>>,
    log: Option<Box<dyn TextSink>>,
}

impl Default for TankBuilder<Missing> {
    fn default() -> Self {
        Self {
            directory: None,
            engine: None,
            surface: None,
            log: None,
        }
    }
}

fn validate(cfg: &EngineCfg) -> Result<()> {
    let invalid = |msg| Err(eyre::Report::new(BuildError::InvalidConfig(msg)));
    if !cfg.rpm_per_degree.is_finite() {
        return invalid("rpm_per_degree must be finite");
    }
    if !cfg.gear_ratio_per_degree.is_finite() {
        return invalid("gear_ratio_per_degree must be finite");
    }
    if !cfg.default_gear_ratio.is_finite() {
        return invalid("default_gear_ratio must be finite");
    }
    if !cfg.peak_speed_rpm().is_finite() {
        return invalid("rotor speed at full lever travel overflows");
    }
    if !(0.0..90.0).contains(&cfg.deadzone_deg) {
        return invalid("deadzone_deg must be in [0, 90)");
    }
    if !(cfg.unlock_limit_deg > 0.0 && cfg.unlock_limit_deg <= 180.0) {
        return invalid("unlock_limit_deg must be in (0, 180]");
    }
    Ok(())
}

/// Validate `cfg`, run discovery over `dir` and assemble a `Tank`.
///
/// Used by `TankBuilder::build()`; hosts that already hold every piece can
/// call it directly.
pub fn build_tank<D: Directory>(
    dir: &D,
    cfg: EngineCfg,
    surface: Box<dyn TextSink>,
    log: Box<dyn TextSink>,
) -> Result<Tank> {
    validate(&cfg)?;
    let (registry, discovery) = discover(dir);
    if registry.is_inert() {
        tracing::warn!("no 'Tank Control' levers found; every tick is a no-op");
    }
    Ok(Tank {
        registry,
        cfg,
        state: EngineState {
            gear_ratio: cfg.default_gear_ratio,
        },
        surface,
        log,
        discovery,
        ticks: 0,
    })
}

/// Chainable setters that do not affect type-state.
impl<D> TankBuilder<D> {
    pub fn with_engine(mut self, engine: EngineCfg) -> Self {
        self.engine = Some(engine);
        self
    }

    /// Text surface of the controller block itself; defaults to a sink that drops everything.
    pub fn with_surface(mut self, surface: impl TextSink + 'static) -> Self {
        self.surface = Some(Box::new(surface));
        self
    }

    /// Diagnostic log sink; one combined status block per tick.
    pub fn with_log(mut self, log: impl TextSink + 'static) -> Self {
        self.log = Some(Box::new(log));
        self
    }
}

impl TankBuilder<Missing> {
    pub fn with_directory<D: Directory>(self, directory: D) -> TankBuilder<D> {
        TankBuilder {
            directory: Some(directory),
            engine: self.engine,
            surface: self.surface,
            log: self.log,
        }
    }
}

impl<D: Directory> TankBuilder<D> {
    /// Validate, discover and build the Tank.
    pub fn build(self) -> Result<Tank> {
        let directory = self
            .directory
            .ok_or_else(|| eyre::Report::new(BuildError::MissingDirectory))?;
        build_tank(
            &directory,
            self.engine.unwrap_or_default(),
            self.surface.unwrap_or_else(|| Box::new(NullSink)),
            self.log.unwrap_or_else(|| Box::new(NullSink)),
        )
    }
}
