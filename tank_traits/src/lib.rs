//! Port traits between the lever engine and the host that owns the devices.
//!
//! Every device is reached through a narrow capability: a hinge is an angle
//! sensor plus a lock, a rotor accepts a velocity command, a panel is a text
//! sink. Errors cross these boundaries as `PortError` and are mapped to typed
//! errors by the core.

pub mod clock;

pub use clock::{Clock, ManualClock, MonotonicClock};

/// Error type crossing every port boundary.
pub type PortError = Box<dyn std::error::Error + Send + Sync>;

/// Identifier of a physical construct (a set of connected devices).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ConstructId(pub u64);

/// Anything the directory can list: a name and the construct it belongs to.
pub trait Device {
    fn label(&self) -> &str;
    fn construct(&self) -> ConstructId;
}

/// Input capability of a hinge.
pub trait AngleSensor {
    /// Current hinge angle in radians, in whatever range the device reports.
    fn angle_rad(&mut self) -> Result<f32, PortError>;
}

/// Hold/travel capability of a hinge.
pub trait HingeLock {
    fn set_enabled(&mut self, enabled: bool) -> Result<(), PortError>;
    fn set_lower_limit_deg(&mut self, deg: f32) -> Result<(), PortError>;
    fn set_upper_limit_deg(&mut self, deg: f32) -> Result<(), PortError>;
}

/// A control lever device.
pub trait Hinge: Device + AngleSensor + HingeLock {}

impl<T: Device + AngleSensor + HingeLock> Hinge for T {}

/// Output capability of a drive rotor.
pub trait VelocityCommand {
    fn target_velocity_rpm(&mut self) -> Result<f32, PortError>;
    fn set_target_velocity_rpm(&mut self, rpm: f32) -> Result<(), PortError>;
}

/// A drive actuator device.
pub trait Rotor: Device + VelocityCommand {}

impl<T: Device + VelocityCommand> Rotor for T {}

/// Opaque text output (display panel, controller surface, diagnostic log).
pub trait TextSink {
    fn write_text(&mut self, text: &str, append: bool) -> Result<(), PortError>;

    fn clear(&mut self) -> Result<(), PortError> {
        self.write_text("", false)
    }

    fn write_line(&mut self, line: &str) -> Result<(), PortError> {
        self.write_text(line, true)?;
        self.write_text("\n", true)
    }
}

/// A display panel found through the directory.
pub trait Panel: Device + TextSink {}

impl<T: Device + TextSink> Panel for T {}

/// Directory service listing every device the controller can see.
///
/// Handles are cheap: asking twice returns two handles to the same device.
pub trait Directory {
    type Hinge: Hinge + 'static;
    type Rotor: Rotor + 'static;
    type Panel: Panel + 'static;

    /// The construct the controller itself belongs to.
    fn own_construct(&self) -> ConstructId;
    fn hinges(&self) -> Vec<Self::Hinge>;
    fn rotors(&self) -> Vec<Self::Rotor>;
    fn panels(&self) -> Vec<Self::Panel>;
}

impl<T: TextSink + ?Sized> TextSink for Box<T> {
    fn write_text(&mut self, text: &str, append: bool) -> Result<(), PortError> {
        (**self).write_text(text, append)
    }

    fn clear(&mut self) -> Result<(), PortError> {
        (**self).clear()
    }

    fn write_line(&mut self, line: &str) -> Result<(), PortError> {
        (**self).write_line(line)
    }
}
