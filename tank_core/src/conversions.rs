//! `From` implementations bridging `tank_config` types to `tank_core` types.

use crate::config::{EngineCfg, ScheduleCfg};

impl From<&tank_config::EngineCfg> for EngineCfg {
    fn from(c: &tank_config::EngineCfg) -> Self {
        Self {
            rpm_per_degree: c.rpm_per_degree,
            gear_ratio_per_degree: c.gear_ratio_per_degree,
            deadzone_deg: c.deadzone_deg,
            unlock_limit_deg: c.unlock_limit_deg,
            default_gear_ratio: c.default_gear_ratio,
        }
    }
}

impl From<&tank_config::ScheduleCfg> for ScheduleCfg {
    fn from(c: &tank_config::ScheduleCfg) -> Self {
        Self {
            base_tick_hz: c.base_tick_hz,
            update_every: c.update_every,
        }
    }
}
