//! `tank discover` and `tank self-check`.

use serde_json::json;
use tank_config::Config;
use tank_core::{DiscoveryReport, DriveGroup};

pub fn discover_cmd(cfg: &Config, json: bool) -> eyre::Result<()> {
    let (_, tank) = crate::sim::build_tank(cfg)?;
    let report = tank.discovery();
    if json {
        println!("{}", discovery_json(report));
    } else {
        print!("{}", discovery_text(report));
    }
    Ok(())
}

pub fn discovery_text(report: &DiscoveryReport) -> String {
    let mut out = String::new();
    for l in &report.levers {
        out.push_str(&format!(
            "lever    {:<32} {}{}\n",
            l.name,
            l.role,
            if l.reversed { " (reversed)" } else { "" }
        ));
    }
    for (group, names) in [
        (DriveGroup::Left, &report.left_drives),
        (DriveGroup::Right, &report.right_drives),
    ] {
        for n in names {
            out.push_str(&format!("drive    {n:<32} {group:?}\n"));
        }
    }
    for d in &report.displays {
        let f = d.filter;
        let what = if f.is_unfiltered() {
            "all".to_string()
        } else {
            [(f.left, "Left"), (f.right, "Right"), (f.gear, "Gear")]
                .iter()
                .filter(|(on, _)| *on)
                .map(|(_, n)| *n)
                .collect::<Vec<_>>()
                .join("+")
        };
        out.push_str(&format!("display  {:<32} {what}\n", d.name));
    }
    if report.foreign_ignored > 0 {
        out.push_str(&format!(
            "ignored  {} device(s) of other constructs\n",
            report.foreign_ignored
        ));
    }
    for w in &report.warnings {
        out.push_str(&format!("warning: {w}\n"));
    }
    out
}

pub fn discovery_json(report: &DiscoveryReport) -> serde_json::Value {
    let levers: Vec<_> = report
        .levers
        .iter()
        .map(|l| json!({ "name": l.name, "role": l.role.as_str(), "reversed": l.reversed }))
        .collect();
    let displays: Vec<_> = report
        .displays
        .iter()
        .map(|d| {
            json!({
                "name": d.name,
                "left": d.filter.left,
                "right": d.filter.right,
                "gear": d.filter.gear,
            })
        })
        .collect();
    let warnings: Vec<String> = report.warnings.iter().map(|w| w.to_string()).collect();
    json!({
        "levers": levers,
        "left_drives": report.left_drives,
        "right_drives": report.right_drives,
        "displays": displays,
        "foreign_ignored": report.foreign_ignored,
        "warnings": warnings,
    })
}

/// Config is already validated by the caller; this builds and ticks once.
pub fn self_check_cmd(cfg: &Config, json: bool) -> eyre::Result<()> {
    let (_, mut tank) = crate::sim::build_tank(cfg)?;
    let report = tank.tick()?;
    let discovery = tank.discovery();
    if json {
        println!(
            "{}",
            json!({
                "ok": true,
                "levers": discovery.levers.len(),
                "rotors": discovery.left_drives.len() + discovery.right_drives.len(),
                "displays": discovery.displays.len(),
                "warnings": discovery.warnings.len(),
                "writes": report.total_writes(),
            })
        );
    } else {
        println!(
            "OK: {} lever(s), {} rotor(s), {} display(s), {} warning(s)",
            discovery.levers.len(),
            discovery.left_drives.len() + discovery.right_drives.len(),
            discovery.displays.len(),
            discovery.warnings.len()
        );
    }
    Ok(())
}
