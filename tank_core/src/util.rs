//! Angle and period helpers.

use std::f32::consts::{PI, TAU};
use std::time::Duration;

/// Number of microseconds in one second.
pub const MICROS_PER_SEC: u64 = 1_000_000;

/// Fold an angle in radians into (-π, π]. Non-finite input is returned as is.
#[inline]
pub fn normalize_angle_rad(a: f32) -> f32 {
    if !a.is_finite() {
        return a;
    }
    let mut r = a % TAU;
    if r > PI {
        r -= TAU;
    } else if r <= -PI {
        r += TAU;
    }
    r
}

/// Lever reading in degrees, in (-180, 180].
#[inline]
pub fn lever_angle_deg(raw_rad: f32) -> f32 {
    normalize_angle_rad(raw_rad).to_degrees()
}

/// Period between two control ticks: `update_every` base ticks at `base_tick_hz`.
#[inline]
pub fn tick_period(base_tick_hz: u32, update_every: u32) -> Duration {
    let us = MICROS_PER_SEC.saturating_mul(u64::from(update_every.max(1)))
        / u64::from(base_tick_hz.max(1));
    Duration::from_micros(us.max(1))
}
