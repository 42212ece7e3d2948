//! Switch-like components
//!
//! The closed/open state of a switch is user input and the state of a relay
//! follows its coil; neither is derived from the nodes the contacts join.
//! While closed, the engine merges the nodes at terminals 0 and 1 when it
//! resolves a pass.

use super::properties::{self, Property, PropertyError, PropertyValue};
use super::{BoundaryPort, Capabilities, Component, Readout, SwitchLike, Terminal, TerminalIo};
use crate::core::SimulationOptions;
use crate::geometry::{RotationMode, Size};

/// Manually operated single-pole switch
#[derive(Debug, Clone)]
pub struct Switch {
    terminals: Vec<Terminal>,
    closed: bool,
    current: f64,
}

impl Switch {
    pub fn new(closed: bool) -> Self {
        Self {
            terminals: vec![Terminal::passive("a", 0.0, 0.5), Terminal::passive("b", 1.0, 0.5)],
            closed,
            current: 0.0,
        }
    }

    pub fn current(&self) -> f64 {
        self.current
    }
}

impl Default for Switch {
    fn default() -> Self {
        Self::new(false)
    }
}

impl SwitchLike for Switch {
    fn is_closed(&self) -> bool {
        self.closed
    }

    fn set_current(&mut self, amps: f64) {
        self.current = amps;
    }
}

impl Component for Switch {
    fn kind(&self) -> &str {
        "switch"
    }

    fn footprint(&self) -> Size {
        Size::new(3.0, 1.0)
    }

    fn terminals(&self) -> &[Terminal] {
        &self.terminals
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            rotation: RotationMode::Quarter,
            logic_only: false,
            shorted: &[],
            resistance: None,
        }
    }

    fn before_simulation(&mut self, _options: &SimulationOptions) {}

    fn update(&mut self, _io: &mut TerminalIo<'_>) {}

    fn after_simulation(&mut self, _readout: &Readout<'_>) {}

    fn properties(&self) -> Vec<Property> {
        vec![
            Property::editable("closed", PropertyValue::Bool(self.closed)),
            Property::computed("current", PropertyValue::Float(self.current)),
        ]
    }

    fn set_property(&mut self, name: &str, raw: &str) -> Result<(), PropertyError> {
        match name {
            "closed" => {
                self.closed = properties::parse_bool(name, raw)?;
                Ok(())
            }
            _ => Err(properties::rejected(name, &["current"])),
        }
    }

    fn switch_like(&mut self) -> Option<&mut dyn SwitchLike> {
        Some(self)
    }

    fn boundary(&mut self) -> Option<&mut dyn BoundaryPort> {
        None
    }
}

/// Normally-open relay: contacts `com` and `no` close while the coil is High
#[derive(Debug, Clone)]
pub struct Relay {
    terminals: Vec<Terminal>,
    closed: bool,
    current: f64,
}

impl Relay {
    pub const COIL: usize = 2;

    pub fn new() -> Self {
        Self {
            terminals: vec![
                Terminal::passive("com", 0.0, 0.25),
                Terminal::passive("no", 1.0, 0.25),
                Terminal::input("coil", 0.5, 1.0),
            ],
            closed: false,
            current: 0.0,
        }
    }
}

impl Default for Relay {
    fn default() -> Self {
        Self::new()
    }
}

impl SwitchLike for Relay {
    fn is_closed(&self) -> bool {
        self.closed
    }

    fn set_current(&mut self, amps: f64) {
        self.current = amps;
    }
}

impl Component for Relay {
    fn kind(&self) -> &str {
        "relay"
    }

    fn footprint(&self) -> Size {
        Size::new(3.0, 2.0)
    }

    fn terminals(&self) -> &[Terminal] {
        &self.terminals
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            rotation: RotationMode::Quarter,
            logic_only: false,
            shorted: &[],
            resistance: None,
        }
    }

    fn before_simulation(&mut self, _options: &SimulationOptions) {
        self.closed = false;
    }

    fn update(&mut self, io: &mut TerminalIo<'_>) {
        // floating coil reads Low: contacts open
        self.closed = io.logic(Self::COIL);
    }

    fn after_simulation(&mut self, _readout: &Readout<'_>) {}

    fn properties(&self) -> Vec<Property> {
        vec![
            Property::computed("closed", PropertyValue::Bool(self.closed)),
            Property::computed("current", PropertyValue::Float(self.current)),
        ]
    }

    fn set_property(&mut self, name: &str, _raw: &str) -> Result<(), PropertyError> {
        Err(properties::rejected(name, &["closed", "current"]))
    }

    fn switch_like(&mut self) -> Option<&mut dyn SwitchLike> {
        Some(self)
    }

    fn boundary(&mut self) -> Option<&mut dyn BoundaryPort> {
        None
    }
}
