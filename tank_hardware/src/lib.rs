//! Simulated construct: hinges, rotors and text panels behind the port traits.
//!
//! Every device handle is a cheap clone over shared state, so the directory can
//! hand out as many handles as it is asked for while a test or the CLI keeps
//! its own handle to move levers and inspect rotors.
pub mod error;

use std::cell::RefCell;
use std::rc::Rc;

use tank_traits::{
    AngleSensor, ConstructId, Device, Directory, HingeLock, PortError, TextSink, VelocityCommand,
};

use crate::error::HwError;

/// How often each lock setter of a hinge has been called.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LockCalls {
    pub set_enabled: u32,
    pub set_lower_limit: u32,
    pub set_upper_limit: u32,
}

#[derive(Debug)]
struct HingeState {
    angle_rad: f32,
    enabled: bool,
    lower_limit_deg: f32,
    upper_limit_deg: f32,
    calls: LockCalls,
    detached: bool,
}

/// Simulated hinge; the angle is whatever the operator last set.
#[derive(Debug, Clone)]
pub struct SimHinge {
    name: Rc<str>,
    construct: ConstructId,
    state: Rc<RefCell<HingeState>>,
}

impl SimHinge {
    pub fn new(name: &str, construct: ConstructId, angle_deg: f32) -> Self {
        Self {
            name: Rc::from(name),
            construct,
            state: Rc::new(RefCell::new(HingeState {
                angle_rad: angle_deg.to_radians(),
                enabled: true,
                lower_limit_deg: -45.0,
                upper_limit_deg: 45.0,
                calls: LockCalls::default(),
                detached: false,
            })),
        }
    }

    pub fn set_angle_deg(&self, deg: f32) {
        self.state.borrow_mut().angle_rad = deg.to_radians();
    }

    pub fn set_angle_rad(&self, rad: f32) {
        self.state.borrow_mut().angle_rad = rad;
    }

    pub fn is_enabled(&self) -> bool {
        self.state.borrow().enabled
    }

    /// Operator switches the hinge back on (e.g. from a timer block).
    pub fn power_on(&self) {
        self.state.borrow_mut().enabled = true;
    }

    pub fn limits_deg(&self) -> (f32, f32) {
        let s = self.state.borrow();
        (s.lower_limit_deg, s.upper_limit_deg)
    }

    pub fn lock_calls(&self) -> LockCalls {
        self.state.borrow().calls
    }

    /// Make every subsequent port call fail with `HwError::Detached`.
    pub fn detach(&self) {
        self.state.borrow_mut().detached = true;
    }

    fn check_attached(&self) -> Result<(), PortError> {
        if self.state.borrow().detached {
            return Err(Box::new(HwError::Detached(self.name.to_string())));
        }
        Ok(())
    }
}

impl Device for SimHinge {
    fn label(&self) -> &str {
        &self.name
    }

    fn construct(&self) -> ConstructId {
        self.construct
    }
}

impl AngleSensor for SimHinge {
    fn angle_rad(&mut self) -> Result<f32, PortError> {
        self.check_attached()?;
        Ok(self.state.borrow().angle_rad)
    }
}

impl HingeLock for SimHinge {
    fn set_enabled(&mut self, enabled: bool) -> Result<(), PortError> {
        self.check_attached()?;
        tracing::trace!(hinge = %self.name, enabled, "hinge enabled");
        let mut s = self.state.borrow_mut();
        s.calls.set_enabled += 1;
        s.enabled = enabled;
        Ok(())
    }

    fn set_lower_limit_deg(&mut self, deg: f32) -> Result<(), PortError> {
        self.check_attached()?;
        let mut s = self.state.borrow_mut();
        s.calls.set_lower_limit += 1;
        s.lower_limit_deg = deg;
        Ok(())
    }

    fn set_upper_limit_deg(&mut self, deg: f32) -> Result<(), PortError> {
        self.check_attached()?;
        let mut s = self.state.borrow_mut();
        s.calls.set_upper_limit += 1;
        s.upper_limit_deg = deg;
        Ok(())
    }
}

#[derive(Debug, Default)]
struct RotorState {
    rpm: f32,
    writes: u64,
    detached: bool,
}

/// Simulated drive rotor; records its commanded velocity and write count.
#[derive(Debug, Clone)]
pub struct SimRotor {
    name: Rc<str>,
    construct: ConstructId,
    state: Rc<RefCell<RotorState>>,
}

impl SimRotor {
    pub fn new(name: &str, construct: ConstructId) -> Self {
        Self {
            name: Rc::from(name),
            construct,
            state: Rc::new(RefCell::new(RotorState::default())),
        }
    }

    pub fn rpm(&self) -> f32 {
        self.state.borrow().rpm
    }

    /// Number of velocity commands received so far.
    pub fn writes(&self) -> u64 {
        self.state.borrow().writes
    }

    pub fn detach(&self) {
        self.state.borrow_mut().detached = true;
    }
}

impl Device for SimRotor {
    fn label(&self) -> &str {
        &self.name
    }

    fn construct(&self) -> ConstructId {
        self.construct
    }
}

impl VelocityCommand for SimRotor {
    fn target_velocity_rpm(&mut self) -> Result<f32, PortError> {
        let s = self.state.borrow();
        if s.detached {
            return Err(Box::new(HwError::Detached(self.name.to_string())));
        }
        Ok(s.rpm)
    }

    fn set_target_velocity_rpm(&mut self, rpm: f32) -> Result<(), PortError> {
        let mut s = self.state.borrow_mut();
        if s.detached {
            return Err(Box::new(HwError::Detached(self.name.to_string())));
        }
        if !rpm.is_finite() {
            return Err(Box::new(HwError::NonFinite {
                device: self.name.to_string(),
                value: rpm,
            }));
        }
        tracing::trace!(rotor = %self.name, rpm, "rotor velocity");
        s.rpm = rpm;
        s.writes += 1;
        Ok(())
    }
}

/// Simulated text surface. Used for LCD panels and the controller's own screen.
#[derive(Debug, Clone)]
pub struct SimPanel {
    name: Rc<str>,
    construct: ConstructId,
    text: Rc<RefCell<String>>,
}

impl SimPanel {
    pub fn new(name: &str, construct: ConstructId) -> Self {
        Self {
            name: Rc::from(name),
            construct,
            text: Rc::new(RefCell::new(String::new())),
        }
    }

    pub fn text(&self) -> String {
        self.text.borrow().clone()
    }
}

impl Device for SimPanel {
    fn label(&self) -> &str {
        &self.name
    }

    fn construct(&self) -> ConstructId {
        self.construct
    }
}

impl TextSink for SimPanel {
    fn write_text(&mut self, text: &str, append: bool) -> Result<(), PortError> {
        let mut buf = self.text.borrow_mut();
        if !append {
            buf.clear();
        }
        buf.push_str(text);
        Ok(())
    }
}

/// Echo log of the controller: keeps every line written, newest last.
#[derive(Debug, Clone, Default)]
pub struct SimLog {
    lines: Rc<RefCell<Vec<String>>>,
}

impl SimLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.borrow().clone()
    }

    pub fn last(&self) -> Option<String> {
        self.lines.borrow().last().cloned()
    }
}

impl TextSink for SimLog {
    fn write_text(&mut self, text: &str, append: bool) -> Result<(), PortError> {
        let mut lines = self.lines.borrow_mut();
        match lines.last_mut() {
            Some(last) if append => last.push_str(text),
            _ => lines.push(text.to_string()),
        }
        Ok(())
    }

    fn write_line(&mut self, line: &str) -> Result<(), PortError> {
        self.lines.borrow_mut().push(line.to_string());
        Ok(())
    }
}

/// A simulated grid: every device the controller can see, across constructs.
#[derive(Debug, Clone, Default)]
pub struct SimConstruct {
    own: ConstructId,
    hinges: Vec<SimHinge>,
    rotors: Vec<SimRotor>,
    panels: Vec<SimPanel>,
}

impl SimConstruct {
    pub fn new(own: ConstructId) -> Self {
        Self {
            own,
            ..Self::default()
        }
    }

    pub fn add_hinge(&mut self, name: &str, angle_deg: f32) -> SimHinge {
        self.add_hinge_in(self.own, name, angle_deg)
    }

    pub fn add_hinge_in(&mut self, construct: ConstructId, name: &str, angle_deg: f32) -> SimHinge {
        let h = SimHinge::new(name, construct, angle_deg);
        self.hinges.push(h.clone());
        h
    }

    pub fn add_rotor(&mut self, name: &str) -> SimRotor {
        self.add_rotor_in(self.own, name)
    }

    pub fn add_rotor_in(&mut self, construct: ConstructId, name: &str) -> SimRotor {
        let r = SimRotor::new(name, construct);
        self.rotors.push(r.clone());
        r
    }

    pub fn add_panel(&mut self, name: &str) -> SimPanel {
        self.add_panel_in(self.own, name)
    }

    pub fn add_panel_in(&mut self, construct: ConstructId, name: &str) -> SimPanel {
        let p = SimPanel::new(name, construct);
        self.panels.push(p.clone());
        p
    }

    /// First hinge with exactly this name.
    pub fn hinge(&self, name: &str) -> crate::error::Result<SimHinge> {
        self.hinges
            .iter()
            .find(|h| h.label() == name)
            .cloned()
            .ok_or_else(|| HwError::NoSuchDevice(name.to_string()))
    }

    /// First rotor with exactly this name.
    pub fn rotor(&self, name: &str) -> crate::error::Result<SimRotor> {
        self.rotors
            .iter()
            .find(|r| r.label() == name)
            .cloned()
            .ok_or_else(|| HwError::NoSuchDevice(name.to_string()))
    }

    pub fn rotor_handles(&self) -> &[SimRotor] {
        &self.rotors
    }

}

impl Directory for SimConstruct {
    type Hinge = SimHinge;
    type Rotor = SimRotor;
    type Panel = SimPanel;

    fn own_construct(&self) -> ConstructId {
        self.own
    }

    fn hinges(&self) -> Vec<SimHinge> {
        self.hinges.clone()
    }

    fn rotors(&self) -> Vec<SimRotor> {
        self.rotors.clone()
    }

    fn panels(&self) -> Vec<SimPanel> {
        self.panels.clone()
    }
}
