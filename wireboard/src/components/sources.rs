//! Sources: user toggles, batteries and ground

use super::properties::{self, Property, PropertyError, PropertyValue};
use super::{BoundaryPort, Capabilities, Component, Readout, SwitchLike, Terminal, TerminalIo};
use crate::core::SimulationOptions;
use crate::geometry::{RotationMode, Size};
use crate::signal::Signal;

/// Logic source controlled by the user
#[derive(Debug, Clone)]
pub struct Toggle {
    terminals: Vec<Terminal>,
    on: bool,
}

impl Toggle {
    pub fn new(on: bool) -> Self {
        Self {
            terminals: vec![Terminal::output("out", 1.0, 0.5)],
            on,
        }
    }

    pub fn is_on(&self) -> bool {
        self.on
    }
}

impl Default for Toggle {
    fn default() -> Self {
        Self::new(false)
    }
}

impl Component for Toggle {
    fn kind(&self) -> &str {
        "toggle"
    }

    fn footprint(&self) -> Size {
        Size::new(2.0, 2.0)
    }

    fn terminals(&self) -> &[Terminal] {
        &self.terminals
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            rotation: RotationMode::Quarter,
            logic_only: true,
            shorted: &[],
            resistance: None,
        }
    }

    fn before_simulation(&mut self, _options: &SimulationOptions) {}

    fn update(&mut self, io: &mut TerminalIo<'_>) {
        io.drive(0, Signal::Logic(self.on));
    }

    fn after_simulation(&mut self, _readout: &Readout<'_>) {}

    fn properties(&self) -> Vec<Property> {
        vec![Property::editable("on", PropertyValue::Bool(self.on))]
    }

    fn set_property(&mut self, name: &str, raw: &str) -> Result<(), PropertyError> {
        match name {
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
        None
    }
}

/// Ideal voltage source; the negative terminal is the 0 V reference
#[derive(Debug, Clone)]
pub struct Battery {
    terminals: Vec<Terminal>,
    voltage: f64,
}

impl Battery {
    pub const DEFAULT_VOLTAGE: f64 = 5.0;

    pub fn new(voltage: f64) -> Self {
        Self {
            terminals: vec![
                Terminal::output("pos", 0.5, 0.0),
                Terminal::output("neg", 0.5, 1.0),
            ],
            voltage,
        }
    }

    pub fn voltage(&self) -> f64 {
        self.voltage
    }
}

impl Default for Battery {
    fn default() -> Self {
        Self::new(Self::DEFAULT_VOLTAGE)
    }
}

impl Component for Battery {
    fn kind(&self) -> &str {
        "battery"
    }

    fn footprint(&self) -> Size {
        Size::new(2.0, 3.0)
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
        io.drive(0, Signal::Voltage(self.voltage));
        io.drive(1, Signal::Voltage(0.0));
    }

    fn after_simulation(&mut self, _readout: &Readout<'_>) {}

    fn properties(&self) -> Vec<Property> {
        vec![Property::editable("voltage", PropertyValue::Float(self.voltage))]
    }

    fn set_property(&mut self, name: &str, raw: &str) -> Result<(), PropertyError> {
        match name {
            "voltage" => {
                self.voltage = properties::parse_float(name, raw)?;
                Ok(())
            }
            _ => Err(properties::rejected(name, &[])),
        }
    }

    fn switch_like(&mut self) -> Option<&mut dyn SwitchLike> {
        None
    }

    fn boundary(&mut self) -> Option<&mut dyn BoundaryPort> {
        None
    }
}

#[derive(Debug, Clone)]
pub struct Ground {
    terminals: Vec<Terminal>,
}

impl Ground {
    pub fn new() -> Self {
        Self {
            terminals: vec![Terminal::output("gnd", 0.5, 0.0)],
        }
    }
}

impl Default for Ground {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for Ground {
    fn kind(&self) -> &str {
        "ground"
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
        io.drive(0, Signal::Voltage(0.0));
    }

    fn after_simulation(&mut self, _readout: &Readout<'_>) {}

    fn properties(&self) -> Vec<Property> {
        Vec::new()
    }

    fn set_property(&mut self, name: &str, _raw: &str) -> Result<(), PropertyError> {
        Err(properties::rejected(name, &[]))
    }

    fn switch_like(&mut self) -> Option<&mut dyn SwitchLike> {
        None
    }

    fn boundary(&mut self) -> Option<&mut dyn BoundaryPort> {
        None
    }
}
