//! Configuration types for the lever engine.
//!
//! These are the runtime configuration structs used by `Tank`.
//! They are separate from the TOML-deserialized config in `tank_config`.

/// Mapping constants from lever angle to rotor command.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineCfg {
    /// Rotor rpm per degree of lever travel.
    pub rpm_per_degree: f32,
    /// Gear ratio per degree of gear lever travel. 0.02 makes 90° a x1.8 gear.
    pub gear_ratio_per_degree: f32,
    /// Angles strictly inside (-deadzone, +deadzone) read as 0°.
    pub deadzone_deg: f32,
    /// Travel limits (±) restored on a lever released at exactly 0°.
    pub unlock_limit_deg: f32,
    /// Gear ratio before any gear lever has reported.
    pub default_gear_ratio: f32,
}

impl Default for EngineCfg {
    fn default() -> Self {
        Self {
            rpm_per_degree: 1.0,
            gear_ratio_per_degree: 0.02,
            deadzone_deg: 5.0,
            unlock_limit_deg: 90.0,
            default_gear_ratio: 1.0,
        }
    }
}

impl EngineCfg {
    /// Largest rotor speed any lever position can command: full travel
    /// (180°) at the steepest gear the config can select.
    pub fn peak_speed_rpm(&self) -> f32 {
        let peak_gear = self
            .default_gear_ratio
            .abs()
            .max(180.0 * self.gear_ratio_per_degree.abs());
        180.0 * self.rpm_per_degree.abs() * peak_gear
    }
}

/// Scheduler cadence: one control tick every `update_every` base ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleCfg {
    pub base_tick_hz: u32,
    pub update_every: u32,
}

impl Default for ScheduleCfg {
    fn default() -> Self {
        Self {
            base_tick_hz: 60,
            update_every: 10,
        }
    }
}

impl ScheduleCfg {
    pub fn period(&self) -> std::time::Duration {
        crate::util::tick_period(self.base_tick_hz, self.update_every)
    }
}
