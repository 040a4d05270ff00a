//! In-memory model of the tank, built once from the discovery snapshot.

use tank_traits::{Hinge, Panel, Rotor};

/// Logical control path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Left,
    Right,
    Gear,
}

impl Channel {
    pub fn as_str(self) -> &'static str {
        match self {
            Channel::Left => "Left",
            Channel::Right => "Right",
            Channel::Gear => "Gear",
        }
    }

    /// Drive pool a lever of this channel commands, if any.
    pub fn drive_group(self) -> Option<DriveGroup> {
        match self {
            Channel::Left => Some(DriveGroup::Left),
            Channel::Right => Some(DriveGroup::Right),
            Channel::Gear => None,
        }
    }
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifier of a drive pool; every lever of a side shares its side's pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DriveGroup {
    Left,
    Right,
}

/// Which channel blocks a display wants. All false means "everything".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DisplayFilter {
    pub left: bool,
    pub right: bool,
    pub gear: bool,
}

impl DisplayFilter {
    pub fn is_unfiltered(&self) -> bool {
        !(self.left || self.right || self.gear)
    }
}

/// A control lever and the carried state of its channel.
pub struct Lever {
    pub(crate) name: String,
    pub(crate) hinge: Box<dyn Hinge>,
    pub(crate) role: Channel,
    pub(crate) reversed: bool,
    pub(crate) group: Option<DriveGroup>,
    /// First registration of its hinge; the one that releases it at 0°.
    pub(crate) releases: bool,
    /// Speed last written to the pool; `None` until the first write.
    pub(crate) last_commanded: Option<f32>,
}

impl core::fmt::Debug for Lever {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Lever")
            .field("name", &self.name)
            .field("role", &self.role)
            .field("reversed", &self.reversed)
            .field("group", &self.group)
            .field("releases", &self.releases)
            .field("last_commanded", &self.last_commanded)
            .finish()
    }
}

impl Lever {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn role(&self) -> Channel {
        self.role
    }

    pub fn reversed(&self) -> bool {
        self.reversed
    }

    pub fn group(&self) -> Option<DriveGroup> {
        self.group
    }

    /// False for the second and later roles of a multi-role hinge.
    pub fn releases(&self) -> bool {
        self.releases
    }

    pub fn last_commanded(&self) -> Option<f32> {
        self.last_commanded
    }
}

/// A status panel and its channel filter.
pub struct Display {
    pub(crate) name: String,
    pub(crate) panel: Box<dyn Panel>,
    pub(crate) filter: DisplayFilter,
}

impl core::fmt::Debug for Display {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Display")
            .field("name", &self.name)
            .field("filter", &self.filter)
            .finish()
    }
}

impl Display {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn filter(&self) -> DisplayFilter {
        self.filter
    }
}

/// Levers in evaluation order, the two drive pools and the displays.
#[derive(Default)]
pub struct Registry {
    pub(crate) levers: Vec<Lever>,
    pub(crate) left_drives: Vec<Box<dyn Rotor>>,
    pub(crate) right_drives: Vec<Box<dyn Rotor>>,
    pub(crate) displays: Vec<Display>,
}

impl core::fmt::Debug for Registry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Registry")
            .field("levers", &self.levers)
            .field("left_drives", &self.left_drives.len())
            .field("right_drives", &self.right_drives.len())
            .field("displays", &self.displays)
            .finish()
    }
}

impl Registry {
    pub fn levers(&self) -> &[Lever] {
        &self.levers
    }

    pub fn displays(&self) -> &[Display] {
        &self.displays
    }

    pub fn drive_count(&self, group: DriveGroup) -> usize {
        match group {
            DriveGroup::Left => self.left_drives.len(),
            DriveGroup::Right => self.right_drives.len(),
        }
    }

    /// Names of the rotors in a pool, in pool order.
    pub fn drive_names(&self, group: DriveGroup) -> Vec<&str> {
        let pool = match group {
            DriveGroup::Left => &self.left_drives,
            DriveGroup::Right => &self.right_drives,
        };
        pool.iter().map(|r| r.label()).collect()
    }

    /// True when no lever was found; every tick is then a no-op.
    pub fn is_inert(&self) -> bool {
        self.levers.is_empty()
    }
}
