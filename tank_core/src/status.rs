//! Per-tick status text and its distribution to the displays.
//!
//! Line formats (one decimal for angles, two for speeds and ratios):
//!
//! ```text
//! Left @ 45.0°
//! 	Target Speed: 45.00rpm
//! Gear 18.0°
//! 	Gear Ratio: x 0.36
//! Tank Drive Left @ 0.00rpm        (previous velocity of a rotor just commanded)
//! ```

use eyre::WrapErr;
use tank_traits::TextSink;

use crate::error::Result;
use crate::hw_error::port_report;
use crate::registry::{Channel, Display, DisplayFilter, DriveGroup};

/// Fixed-point text with `decimals` places. Ties round away from zero
/// (`12.25` -> `12.3`) and a value that rounds to zero carries no sign.
fn fixed(v: f32, decimals: u8) -> String {
    let scale = 10f64.powi(i32::from(decimals));
    let rounded = (f64::from(v) * scale).round() / scale;
    let rounded = if rounded == 0.0 { 0.0 } else { rounded };
    format!("{rounded:.prec$}", prec = usize::from(decimals))
}

/// Text accumulated during one tick, one buffer per channel plus the
/// actuator-change lines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusBuffers {
    pub writes: String,
    pub left: String,
    pub right: String,
    pub gear: String,
}

impl StatusBuffers {
    pub fn push_drive(&mut self, channel: Channel, angle_deg: f32, speed_rpm: f32) {
        let buf = match channel {
            Channel::Left => &mut self.left,
            Channel::Right => &mut self.right,
            Channel::Gear => &mut self.gear,
        };
        buf.push_str(&format!(
            "{} @ {}°\n\tTarget Speed: {}rpm\n",
            channel.as_str(),
            fixed(angle_deg, 1),
            fixed(speed_rpm, 2)
        ));
    }

    pub fn push_gear(&mut self, angle_deg: f32, ratio: f32) {
        self.gear.push_str(&format!(
            "Gear {}°\n\tGear Ratio: x {}\n",
            fixed(angle_deg, 1),
            fixed(ratio, 2)
        ));
    }

    /// Record that `rotor` is about to be commanded; `previous_rpm` is what it
    /// was running at.
    pub fn push_write(&mut self, rotor: &str, previous_rpm: f32) {
        self.writes
            .push_str(&format!("{rotor} @ {}rpm\n", fixed(previous_rpm, 2)));
    }

    pub fn channel(&self, channel: Channel) -> &str {
        match channel {
            Channel::Left => &self.left,
            Channel::Right => &self.right,
            Channel::Gear => &self.gear,
        }
    }

    /// Everything: actuator changes first, then Left, Right and Gear blocks.
    pub fn combined(&self) -> String {
        let mut s = String::with_capacity(
            self.writes.len() + self.left.len() + self.right.len() + self.gear.len(),
        );
        s.push_str(&self.writes);
        s.push_str(&self.left);
        s.push_str(&self.right);
        s.push_str(&self.gear);
        s
    }

    /// What a display with `filter` shows.
    pub fn filtered(&self, filter: DisplayFilter) -> String {
        if filter.is_unfiltered() {
            return self.combined();
        }
        let mut s = String::new();
        for (on, ch) in [
            (filter.left, Channel::Left),
            (filter.right, Channel::Right),
            (filter.gear, Channel::Gear),
        ] {
            if on {
                s.push_str(self.channel(ch));
            }
        }
        s
    }
}

/// Outcome of one lever in one tick.
#[derive(Debug, Clone, PartialEq)]
pub struct LeverReport {
    pub name: String,
    pub channel: Channel,
    /// Normalized reading before the deadzone.
    pub raw_angle_deg: f32,
    /// Angle the output was computed from.
    pub angle_deg: f32,
    /// Target rpm for drive levers, gear ratio for gear levers.
    pub output: f32,
    /// Lever sat at exactly 0° and was released.
    pub unlocked: bool,
    /// Rotors written this tick (0 when the change gate held).
    pub writes: usize,
}

/// Everything one tick produced.
#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    /// 1-based tick counter.
    pub tick: u64,
    /// Ratio in effect at the end of the tick.
    pub gear_ratio: f32,
    pub levers: Vec<LeverReport>,
    pub status: StatusBuffers,
}

impl TickReport {
    pub fn total_writes(&self) -> usize {
        self.levers.iter().map(|l| l.writes).sum()
    }

    /// Rotor writes per pool this tick.
    pub fn writes_for(&self, group: DriveGroup) -> usize {
        self.levers
            .iter()
            .filter(|l| l.channel.drive_group() == Some(group))
            .map(|l| l.writes)
            .sum()
    }
}

/// Route this tick's text to every display, the controller surface and the log.
///
/// A display is cleared first; unfiltered displays get the combined text,
/// filtered ones get their selected channel blocks in Left, Right, Gear order.
pub fn distribute(
    status: &StatusBuffers,
    displays: &mut [Display],
    surface: &mut dyn TextSink,
    log: &mut dyn TextSink,
) -> Result<()> {
    let combined = status.combined();
    for display in displays.iter_mut() {
        let text = if display.filter.is_unfiltered() {
            combined.clone()
        } else {
            status.filtered(display.filter)
        };
        display
            .panel
            .clear()
            .and_then(|()| display.panel.write_text(&text, true))
            .map_err(port_report)
            .wrap_err_with(|| format!("write display '{}'", display.name))?;
    }
    surface
        .write_text(&combined, false)
        .map_err(port_report)
        .wrap_err("write controller surface")?;
    log.write_line(&combined)
        .map_err(port_report)
        .wrap_err("write controller log")?;
    Ok(())
}
