//! Boundary components of a custom-component board.
//!
//! A `port_in` named after a definition input receives the value seen at the
//! instance's exposed terminal; a `port_out` named after a definition output
//! is where the instance reads its result back. On a top-level board a
//! `port_in` behaves like a toggle and a `port_out` like a probe.

use super::properties::{self, Property, PropertyError, PropertyValue};
use super::{
    BoundaryPort, Capabilities, Component, PortDirection, Readout, SwitchLike, Terminal,
    TerminalIo,
};
use crate::core::SimulationOptions;
use crate::geometry::{RotationMode, Size};
use crate::signal::Signal;

#[derive(Debug, Clone)]
pub struct PortIn {
    terminals: Vec<Terminal>,
    name: String,
    on: bool,
    bound: Option<Signal>,
}

impl PortIn {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            terminals: vec![Terminal::output("out", 1.0, 0.5)],
            name: name.into(),
            on: false,
            bound: None,
        }
    }

    fn presented(&self) -> Signal {
        self.bound.unwrap_or(Signal::Logic(self.on))
    }
}

impl Default for PortIn {
    fn default() -> Self {
        Self::new("in")
    }
}

impl BoundaryPort for PortIn {
    fn port_name(&self) -> &str {
        &self.name
    }

    fn direction(&self) -> PortDirection {
        PortDirection::Input
    }

    fn bind(&mut self, signal: Signal) {
        self.bound = Some(signal);
    }
}

impl Component for PortIn {
    fn kind(&self) -> &str {
        "port_in"
    }

    fn footprint(&self) -> Size {
        Size::new(2.0, 1.0)
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

    fn update(&mut self, io: &mut TerminalIo<'_>) {
        io.drive(0, self.presented());
    }

    fn after_simulation(&mut self, _readout: &Readout<'_>) {}

    fn properties(&self) -> Vec<Property> {
        vec![
            Property::editable("name", PropertyValue::Text(self.name.clone())),
            Property::editable("on", PropertyValue::Bool(self.on)),
        ]
    }

    fn set_property(&mut self, name: &str, raw: &str) -> Result<(), PropertyError> {
        match name {
            "name" => {
                self.name = raw.to_string();
                Ok(())
            }
            "on" => {
                self.on = properties::parse_bool(name, raw)?;
                Ok(())
            }
            _ => Err(properties::rejected(name, &[])),
        }
    }

    fn switch_like(&mut self) -> Option<&mut dyn SwitchLike> {
        None
    }

    fn boundary(&mut self) -> Option<&mut dyn BoundaryPort> {
        Some(self)
    }
}

#[derive(Debug, Clone)]
pub struct PortOut {
    terminals: Vec<Terminal>,
    name: String,
    seen: Signal,
}

impl PortOut {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            terminals: vec![Terminal::input("in", 0.0, 0.5)],
            name: name.into(),
            seen: Signal::Floating,
        }
    }
}

impl Default for PortOut {
    fn default() -> Self {
        Self::new("out")
    }
}

impl BoundaryPort for PortOut {
    fn port_name(&self) -> &str {
        &self.name
    }

    fn direction(&self) -> PortDirection {
        PortDirection::Output
    }

    fn bind(&mut self, _signal: Signal) {}
}

impl Component for PortOut {
    fn kind(&self) -> &str {
        "port_out"
    }

    fn footprint(&self) -> Size {
        Size::new(2.0, 1.0)
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

    fn after_simulation(&mut self, readout: &Readout<'_>) {
        self.seen = readout.signal(0);
    }

    fn properties(&self) -> Vec<Property> {
        vec![
            Property::editable("name", PropertyValue::Text(self.name.clone())),
            Property::computed("state", PropertyValue::Text(self.seen.label())),
        ]
    }

    fn set_property(&mut self, name: &str, raw: &str) -> Result<(), PropertyError> {
        match name {
            "name" => {
                self.name = raw.to_string();
                Ok(())
            }
            _ => Err(properties::rejected(name, &["state"])),
        }
    }

    fn switch_like(&mut self) -> Option<&mut dyn SwitchLike> {
        None
    }

    fn boundary(&mut self) -> Option<&mut dyn BoundaryPort> {
        Some(self)
    }
}
