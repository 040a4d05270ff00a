use rstest::rstest;
use tank_config::{DeviceKind, load_toml};

#[rstest]
#[case("[engine]\nrpm_per_degree = nan\n", "rpm_per_degree must be finite")]
#[case("[engine]\nrpm_per_degree = 1e37\n", "overflows at full lever travel")]
#[case("[engine]\ngear_ratio_per_degree = 1e37\n", "overflows at full lever travel")]
#[case(
    "[engine]\nrpm_per_degree = 1e30\ndefault_gear_ratio = 1e10\n",
    "overflows at full lever travel"
)]
#[case("[engine]\ndeadzone_deg = -1.0\n", "deadzone_deg must be in")]
#[case("[engine]\ndeadzone_deg = 90.0\n", "deadzone_deg must be in")]
#[case("[engine]\nunlock_limit_deg = 0.0\n", "unlock_limit_deg must be in")]
#[case("[schedule]\nbase_tick_hz = 0\n", "base_tick_hz must be > 0")]
#[case("[schedule]\nupdate_every = 0\n", "update_every must be >= 1")]
#[case("[logging]\nrotation = \"weekly\"\n", "logging.rotation")]
#[case(
    "[[devices]]\nkind = \"hinge\"\nname = \"  \"\n",
    "devices[0].name must not be empty"
)]
fn rejects_out_of_range_values(#[case] toml: &str, #[case] needle: &str) {
    let cfg = load_toml(toml).expect("parse TOML");
    let err = cfg.validate().expect_err("should reject");
    let msg = format!("{err}");
    assert!(msg.contains(needle), "unexpected error: {msg}");
}

#[test]
fn accepts_full_tank_layout() {
    let toml = r#"
[engine]
rpm_per_degree = 1.5
gear_ratio_per_degree = 0.02
deadzone_deg = 3.0

[schedule]
base_tick_hz = 60
update_every = 10

[construct]
id = 4

[[devices]]
kind = "hinge"
name = "Tank Control Left"
angle_deg = 30.0

[[devices]]
kind = "hinge"
name = "Tank Control Right Reversed"

[[devices]]
kind = "rotor"
name = "Tank Drive Left"

[[devices]]
kind = "rotor"
name = "Tank Drive Left"
construct = 9

[[devices]]
kind = "lcd"
name = "Tank LCD Left Gear"
"#;

    let cfg = load_toml(toml).expect("parse TOML");
    cfg.validate().expect("valid config should pass");
    assert_eq!(cfg.construct.id, 4);
    assert_eq!(cfg.devices.len(), 5);
    assert_eq!(cfg.devices[0].kind, DeviceKind::Hinge);
    assert_eq!(cfg.devices[0].angle_deg, 30.0);
    assert_eq!(cfg.devices[1].angle_deg, 0.0);
    assert_eq!(cfg.devices[3].construct, Some(9));
    assert_eq!(cfg.devices[4].kind, DeviceKind::Lcd);
    // Unset engine fields keep their defaults.
    assert_eq!(cfg.engine.unlock_limit_deg, 90.0);
    assert_eq!(cfg.engine.default_gear_ratio, 1.0);
}
