//! Maps `Box<dyn Error>` from port boundaries to typed `TankError`.
//!
//! The traits in `tank_traits` use `Box<dyn Error + Send + Sync>` so any host
//! can plug in; this module converts those to our typed error enum, with an
//! optional feature-gated path for `tank_hardware::HwError` downcasting.

use crate::error::TankError;

/// Map a port error to a typed `TankError`.
///
/// Attempts to downcast known hardware error types first, then falls back
/// to string-based heuristics.
pub fn map_port_error(e: &(dyn std::error::Error + 'static)) -> TankError {
    #[cfg(feature = "hardware-errors")]
    {
        if let Some(hw) = e.downcast_ref::<tank_hardware::error::HwError>() {
            return match hw {
                tank_hardware::error::HwError::Detached(name) => TankError::Detached(name.clone()),
                other => TankError::Device(other.to_string()),
            };
        }
    }

    let s = e.to_string();
    if s.to_lowercase().contains("detached") {
        TankError::Detached(s)
    } else {
        TankError::Device(s)
    }
}

/// Wrap a port error into an `eyre::Report` carrying the typed error.
pub(crate) fn port_report(e: tank_traits::PortError) -> eyre::Report {
    eyre::Report::new(map_port_error(&*e))
}
