//! Classification of the construct's devices by name.
//!
//! Runs once when the `Tank` is built. The result is a `Registry` plus a
//! `DiscoveryReport` describing what was found and which labels were
//! ambiguous. Ambiguity never fails discovery; the levers are still
//! registered and the warnings say how they will be resolved.

use std::collections::HashSet;

use tank_traits::{ConstructId, Device, Directory};

use crate::registry::{Channel, Display, DisplayFilter, DriveGroup, Lever, Registry};
use crate::tags::{self, CONTROL, DRIVE, FAMILY, GEAR, LCD, LEFT, Label, REVERSED, RIGHT};

/// Devices of the controller's own construct whose label carries every tag
/// in `required`, in directory order.
pub fn find_by_tags<T: Device>(
    own: ConstructId,
    candidates: impl IntoIterator<Item = T>,
    required: &[&str],
) -> Vec<T> {
    candidates
        .into_iter()
        .filter(|d| d.construct() == own && tags::matches(d.label(), required))
        .collect()
}

/// Typed classification of one lever registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeverClass {
    pub name: String,
    pub role: Channel,
    pub reversed: bool,
    pub group: Option<DriveGroup>,
}

impl LeverClass {
    pub fn parse(label: &str, role: Channel) -> Self {
        Self {
            name: label.to_string(),
            role,
            reversed: tags::has_token(label, REVERSED),
            group: role.drive_group(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayClass {
    pub name: String,
    pub filter: DisplayFilter,
}

/// Channels a control label asks for, in lever evaluation order.
pub fn lever_roles(label: &str) -> Vec<Channel> {
    let l = Label::parse(label);
    [(GEAR, Channel::Gear), (LEFT, Channel::Left), (RIGHT, Channel::Right)]
        .into_iter()
        .filter(|(tag, _)| l.has(tag))
        .map(|(_, ch)| ch)
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiscoveryWarning {
    /// More than one gear lever; the last one in registry order sets the ratio.
    MultipleGearLevers { names: Vec<String> },
    /// One hinge is registered once per role it names.
    LeverInSeveralRoles { name: String, roles: Vec<Channel> },
    /// A rotor tagged both Left and Right sits in both pools.
    DriveInBothGroups { name: String },
    /// A drive lever whose pool is empty; it only updates the displays.
    LeverWithoutDrives { name: String, channel: Channel },
    /// Rotors that no lever will ever command.
    DrivesWithoutLever { group: DriveGroup, count: usize },
}

impl std::fmt::Display for DiscoveryWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MultipleGearLevers { names } => write!(
                f,
                "{} gear levers ({}); the last one sets the gear ratio",
                names.len(),
                names.join(", ")
            ),
            Self::LeverInSeveralRoles { name, roles } => {
                let roles: Vec<&str> = roles.iter().map(|r| r.as_str()).collect();
                write!(
                    f,
                    "lever '{name}' is tagged {}; it is registered once per role",
                    roles.join(" and ")
                )
            }
            Self::DriveInBothGroups { name } => {
                write!(f, "rotor '{name}' is tagged Left and Right; both sides drive it")
            }
            Self::LeverWithoutDrives { name, channel } => {
                write!(f, "lever '{name}' has no '{FAMILY} {DRIVE} {channel}' rotors")
            }
            Self::DrivesWithoutLever { group, count } => {
                write!(f, "{count} {group:?} drive rotor(s) but no {group:?} lever")
            }
        }
    }
}

/// What discovery found, by name.
#[derive(Debug, Clone, Default)]
pub struct DiscoveryReport {
    pub levers: Vec<LeverClass>,
    pub left_drives: Vec<String>,
    pub right_drives: Vec<String>,
    pub displays: Vec<DisplayClass>,
    /// Tank-tagged devices skipped because they belong to another construct.
    pub foreign_ignored: usize,
    pub warnings: Vec<DiscoveryWarning>,
}

/// Classify every device of the directory and build the registry.
///
/// Order of the passes: displays, the two drive pools, then levers in three
/// passes (Gear, Left, Right). Registry order is the pass order, directory
/// order within a pass.
pub fn discover<D: Directory>(dir: &D) -> (Registry, DiscoveryReport) {
    let own = dir.own_construct();
    let mut report = DiscoveryReport {
        foreign_ignored: count_foreign(dir, own),
        ..DiscoveryReport::default()
    };
    let mut registry = Registry::default();

    for panel in find_by_tags(own, dir.panels(), &[FAMILY, LCD]) {
        let label = Label::parse(panel.label());
        let filter = DisplayFilter {
            left: label.has(LEFT),
            right: label.has(RIGHT),
            gear: label.has(GEAR),
        };
        let name = panel.label().to_string();
        report.displays.push(DisplayClass {
            name: name.clone(),
            filter,
        });
        registry.displays.push(Display {
            name,
            panel: Box::new(panel),
            filter,
        });
    }

    for rotor in find_by_tags(own, dir.rotors(), &[FAMILY, DRIVE, LEFT]) {
        if tags::has_token(rotor.label(), RIGHT) {
            report.warnings.push(DiscoveryWarning::DriveInBothGroups {
                name: rotor.label().to_string(),
            });
        }
        report.left_drives.push(rotor.label().to_string());
        registry.left_drives.push(Box::new(rotor));
    }
    for rotor in find_by_tags(own, dir.rotors(), &[FAMILY, DRIVE, RIGHT]) {
        report.right_drives.push(rotor.label().to_string());
        registry.right_drives.push(Box::new(rotor));
    }

    // Directory positions of hinges already registered under an earlier role.
    let mut registered = HashSet::new();
    for (tag, role) in [
        (GEAR, Channel::Gear),
        (LEFT, Channel::Left),
        (RIGHT, Channel::Right),
    ] {
        let hinges = dir.hinges().into_iter().enumerate().filter(|(_, h)| {
            h.construct() == own && tags::matches(h.label(), &[FAMILY, CONTROL, tag])
        });
        for (position, hinge) in hinges {
            let class = LeverClass::parse(hinge.label(), role);
            registry.levers.push(Lever {
                name: class.name.clone(),
                hinge: Box::new(hinge),
                role: class.role,
                reversed: class.reversed,
                group: class.group,
                releases: registered.insert(position),
                last_commanded: None,
            });
            report.levers.push(class);
        }
    }

    report.warnings.extend(ambiguity_warnings(dir, own, &report));

    tracing::info!(
        levers = report.levers.len(),
        left_drives = report.left_drives.len(),
        right_drives = report.right_drives.len(),
        displays = report.displays.len(),
        foreign_ignored = report.foreign_ignored,
        "discovery complete"
    );
    for w in &report.warnings {
        tracing::warn!(warning = %w, "discovery");
    }

    (registry, report)
}

fn count_foreign<D: Directory>(dir: &D, own: ConstructId) -> usize {
    let foreign = |c: ConstructId, label: &str| c != own && tags::has_token(label, FAMILY);
    dir.hinges()
        .iter()
        .filter(|d| foreign(d.construct(), d.label()))
        .count()
        + dir
            .rotors()
            .iter()
            .filter(|d| foreign(d.construct(), d.label()))
            .count()
        + dir
            .panels()
            .iter()
            .filter(|d| foreign(d.construct(), d.label()))
            .count()
}

fn ambiguity_warnings<D: Directory>(
    dir: &D,
    own: ConstructId,
    report: &DiscoveryReport,
) -> Vec<DiscoveryWarning> {
    let mut out = Vec::new();

    let gear_names: Vec<String> = report
        .levers
        .iter()
        .filter(|l| l.role == Channel::Gear)
        .map(|l| l.name.clone())
        .collect();
    if gear_names.len() > 1 {
        out.push(DiscoveryWarning::MultipleGearLevers { names: gear_names });
    }

    for hinge in find_by_tags(own, dir.hinges(), &[FAMILY, CONTROL]) {
        let roles = lever_roles(hinge.label());
        if roles.len() > 1 {
            out.push(DiscoveryWarning::LeverInSeveralRoles {
                name: hinge.label().to_string(),
                roles,
            });
        }
    }

    for (group, channel, pool) in [
        (DriveGroup::Left, Channel::Left, &report.left_drives),
        (DriveGroup::Right, Channel::Right, &report.right_drives),
    ] {
        let levers: Vec<&LeverClass> = report
            .levers
            .iter()
            .filter(|l| l.group == Some(group))
            .collect();
        if pool.is_empty() {
            out.extend(levers.iter().map(|l| DiscoveryWarning::LeverWithoutDrives {
                name: l.name.clone(),
                channel,
            }));
        } else if levers.is_empty() {
            out.push(DiscoveryWarning::DrivesWithoutLever {
                group,
                count: pool.len(),
            });
        }
    }

    out
}
