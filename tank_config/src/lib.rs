#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schemas and lever script parsing for the tank controller.
//!
//! - `Config` and sub-structs are deserialized from TOML and validated.
//! - The lever script CSV loader enforces headers and tick ordering.
//!
//! Device roles are never configured here: they come from device names
//! (`Tank Control Left`, `Tank Drive Right`, `Tank LCD Gear`, ...). The
//! `[[devices]]` table only describes what the simulated construct contains.
use serde::Deserialize;

/// Engine constants. Defaults reproduce the stock tank.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct EngineCfg {
    /// Target rotor speed per degree of lever travel.
    pub rpm_per_degree: f32,
    /// Gear ratio per degree of gear lever travel (90° => x1.8).
    pub gear_ratio_per_degree: f32,
    /// Half-width of the band around 0° treated as exactly 0°.
    pub deadzone_deg: f32,
    /// Travel limits restored on a lever released at exactly 0°.
    pub unlock_limit_deg: f32,
    /// Gear ratio in effect until a gear lever reports.
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

#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct ScheduleCfg {
    /// Host simulation rate.
    pub base_tick_hz: u32,
    /// Run the control loop once every this many base ticks.
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

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Deserialize, Default, Clone, Copy)]
#[serde(default)]
pub struct ConstructCfg {
    /// Construct the controller belongs to; devices elsewhere are ignored.
    pub id: u64,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DeviceKind {
    Hinge,
    Rotor,
    Lcd,
}

/// One device of the simulated construct.
#[derive(Debug, Deserialize, Clone)]
pub struct DeviceCfg {
    pub kind: DeviceKind,
    pub name: String,
    /// Initial hinge angle. Ignored for rotors and panels.
    #[serde(default)]
    pub angle_deg: f32,
    /// Owning construct; defaults to `[construct].id`.
    #[serde(default)]
    pub construct: Option<u64>,
}

#[derive(Debug, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub engine: EngineCfg,
    #[serde(default)]
    pub schedule: ScheduleCfg,
    #[serde(default)]
    pub logging: Logging,
    #[serde(default)]
    pub construct: ConstructCfg,
    #[serde(default)]
    pub devices: Vec<DeviceCfg>,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

impl Config {
    pub fn validate(&self) -> eyre::Result<()> {
        // Engine
        let e = &self.engine;
        if !e.rpm_per_degree.is_finite() {
            eyre::bail!("engine.rpm_per_degree must be finite");
        }
        if !e.gear_ratio_per_degree.is_finite() {
            eyre::bail!("engine.gear_ratio_per_degree must be finite");
        }
        if !(e.deadzone_deg >= 0.0 && e.deadzone_deg < 90.0) {
            eyre::bail!("engine.deadzone_deg must be in [0.0, 90.0)");
        }
        if !(e.unlock_limit_deg > 0.0 && e.unlock_limit_deg <= 180.0) {
            eyre::bail!("engine.unlock_limit_deg must be in (0.0, 180.0]");
        }
        if !e.default_gear_ratio.is_finite() {
            eyre::bail!("engine.default_gear_ratio must be finite");
        }
        // Full lever travel (180°) at the steepest reachable gear.
        let peak_gear = e
            .default_gear_ratio
            .abs()
            .max(180.0 * e.gear_ratio_per_degree.abs());
        if !(180.0 * e.rpm_per_degree.abs() * peak_gear).is_finite() {
            eyre::bail!(
                "engine.rpm_per_degree with the configured gear ratios overflows at full lever travel"
            );
        }

        // Schedule
        if self.schedule.base_tick_hz == 0 {
            eyre::bail!("schedule.base_tick_hz must be > 0");
        }
        if self.schedule.update_every == 0 {
            eyre::bail!("schedule.update_every must be >= 1");
        }

        // Logging
        if let Some(rot) = self.logging.rotation.as_deref()
            && !matches!(rot, "never" | "daily" | "hourly")
        {
            eyre::bail!("logging.rotation must be one of never, daily, hourly (got {rot:?})");
        }

        // Devices
        for (idx, d) in self.devices.iter().enumerate() {
            if d.name.trim().is_empty() {
                eyre::bail!("devices[{idx}].name must not be empty");
            }
            if d.kind == DeviceKind::Hinge && !d.angle_deg.is_finite() {
                eyre::bail!("devices[{idx}].angle_deg must be finite");
            }
        }

        Ok(())
    }
}

/// One scripted lever movement: at `tick`, set hinge `lever` to `angle_deg`.
///
/// Expected headers:
/// tick,lever,angle_deg
///
/// Example:
/// tick,lever,angle_deg
/// 0,Tank Control Left,45.0
/// 5,Tank Control Gear,18.0
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ScriptRow {
    pub tick: u64,
    pub lever: String,
    pub angle_deg: f32,
}

/// Parse a lever script from any reader. Rows must be in non-decreasing tick order.
pub fn parse_lever_script<R: std::io::Read>(reader: R) -> eyre::Result<Vec<ScriptRow>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    // Enforce exact headers
    let headers = rdr
        .headers()
        .map_err(|e| eyre::eyre!("read CSV headers: {e}"))?
        .clone();
    let expected = ["tick", "lever", "angle_deg"];
    let actual: Vec<String> = headers.iter().map(|s| s.to_string()).collect();
    if actual != expected {
        eyre::bail!(
            "lever script CSV must have headers 'tick,lever,angle_deg', got: {}",
            actual.join(",")
        );
    }

    let mut rows: Vec<ScriptRow> = Vec::new();
    for (idx, rec) in rdr.deserialize::<ScriptRow>().enumerate() {
        let row = rec.map_err(|e| eyre::eyre!("invalid CSV row {}: {}", idx + 2, e))?;
        if !row.angle_deg.is_finite() {
            eyre::bail!("invalid CSV row {}: angle_deg must be finite", idx + 2);
        }
        if let Some(prev) = rows.last()
            && row.tick < prev.tick
        {
            eyre::bail!(
                "lever script ticks must be non-decreasing (row {} has tick {} after {})",
                idx + 2,
                row.tick,
                prev.tick
            );
        }
        rows.push(row);
    }
    Ok(rows)
}

pub fn load_lever_script_csv(path: &std::path::Path) -> eyre::Result<Vec<ScriptRow>> {
    let file = std::fs::File::open(path)
        .map_err(|e| eyre::eyre!("open lever script CSV {:?}: {}", path, e))?;
    parse_lever_script(file)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_stock_constants() {
        let cfg = load_toml("").expect("parse");
        cfg.validate().expect("valid");
        assert_eq!(cfg.engine.rpm_per_degree, 1.0);
        assert_eq!(cfg.engine.gear_ratio_per_degree, 0.02);
        assert_eq!(cfg.engine.deadzone_deg, 5.0);
        assert_eq!(cfg.schedule.update_every, 10);
        assert!(cfg.devices.is_empty());
    }

    #[test]
    fn unknown_device_kind_is_a_parse_error() {
        let toml = r#"
[[devices]]
kind = "piston"
name = "Tank Piston"
"#;
        assert!(load_toml(toml).is_err());
    }

    #[test]
    fn script_rejects_decreasing_ticks() {
        let csv = "tick,lever,angle_deg\n5,Tank Control Left,10\n3,Tank Control Left,0\n";
        let err = parse_lever_script(csv.as_bytes()).expect_err("must reject");
        assert!(err.to_string().contains("non-decreasing"));
    }
}
