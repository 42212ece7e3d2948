//! Display-only components. They read the published node values after a
//! cycle and never drive the network.

use super::properties::{self, Property, PropertyError, PropertyValue};
use super::{BoundaryPort, Capabilities, Component, Readout, SwitchLike, Terminal, TerminalIo};
use crate::core::SimulationOptions;
use crate::geometry::{RotationMode, Size};
use crate::signal::Signal;

/// Logic probe (LED)
#[derive(Debug, Clone)]
pub struct Probe {
    terminals: Vec<Terminal>,
    seen: Signal,
}

impl Probe {
    pub fn new() -> Self {
        Self {
            terminals: vec![Terminal::input("in", 0.0, 0.5)],
            seen: Signal::Floating,
        }
    }

    pub fn seen(&self) -> Signal {
        self.seen
    }
}

impl Default for Probe {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for Probe {
    fn kind(&self) -> &str {
        "probe"
    }

    fn footprint(&self) -> Size {
        Size::new(1.0, 1.0)
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

    fn update(&mut self, _io: &mut TerminalIo<'_>) {}

    fn after_simulation(&mut self, readout: &Readout<'_>) {
        self.seen = readout.signal(0);
    }

    fn properties(&self) -> Vec<Property> {
        let state = match self.seen.logic() {
            None => "floating",
            Some(true) => "high",
            Some(false) => "low",
        };
        vec![Property::computed("state", PropertyValue::Text(state.to_string()))]
    }

    fn set_property(&mut self, name: &str, _raw: &str) -> Result<(), PropertyError> {
        Err(properties::rejected(name, &["state"]))
    }

    fn switch_like(&mut self) -> Option<&mut dyn SwitchLike> {
        None
    }

    fn boundary(&mut self) -> Option<&mut dyn BoundaryPort> {
        None
    }
}

/// Potential difference between `plus` and `minus`
#[derive(Debug, Clone)]
pub struct Voltmeter {
    terminals: Vec<Terminal>,
    voltage: f64,
    connected: bool,
}

impl Voltmeter {
    pub fn new() -> Self {
        Self {
            terminals: vec![Terminal::input("plus", 0.0, 0.5), Terminal::input("minus", 1.0, 0.5)],
            voltage: 0.0,
            connected: false,
        }
    }

    pub fn voltage(&self) -> f64 {
        self.voltage
    }
}

impl Default for Voltmeter {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for Voltmeter {
    fn kind(&self) -> &str {
        "voltmeter"
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
            logic_only: false,
            shorted: &[],
            resistance: None,
        }
    }

    fn before_simulation(&mut self, _options: &SimulationOptions) {}

    fn update(&mut self, _io: &mut TerminalIo<'_>) {}

    fn after_simulation(&mut self, readout: &Readout<'_>) {
        match (readout.signal(0).voltage(), readout.signal(1).voltage()) {
            (Some(plus), Some(minus)) => {
                self.voltage = plus - minus;
                self.connected = true;
            }
            _ => {
                self.voltage = 0.0;
                self.connected = false;
            }
        }
    }

    fn properties(&self) -> Vec<Property> {
        vec![
            Property::computed("voltage", PropertyValue::Float(self.voltage)),
            Property::computed("connected", PropertyValue::Bool(self.connected)).hidden(),
        ]
    }

    fn set_property(&mut self, name: &str, _raw: &str) -> Result<(), PropertyError> {
        Err(properties::rejected(name, &["voltage", "connected"]))
    }

    fn switch_like(&mut self) -> Option<&mut dyn SwitchLike> {
        None
    }

    fn boundary(&mut self) -> Option<&mut dyn BoundaryPort> {
        None
    }
}

/// Series current meter. Its terminals are shorted, so it sits on a single
/// node and shows that node's current estimate.
#[derive(Debug, Clone)]
pub struct Ammeter {
    terminals: Vec<Terminal>,
    current: f64,
}

impl Ammeter {
    pub fn new() -> Self {
        Self {
            terminals: vec![Terminal::passive("a", 0.0, 0.5), Terminal::passive("b", 1.0, 0.5)],
            current: 0.0,
        }
    }

    pub fn current(&self) -> f64 {
        self.current
    }
}

impl Default for Ammeter {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for Ammeter {
    fn kind(&self) -> &str {
        "ammeter"
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
            logic_only: false,
            shorted: &[&[0, 1]],
            resistance: None,
        }
    }

    fn before_simulation(&mut self, _options: &SimulationOptions) {}

    fn update(&mut self, _io: &mut TerminalIo<'_>) {}

    fn after_simulation(&mut self, readout: &Readout<'_>) {
        self.current = readout.node_current(0);
    }

    fn properties(&self) -> Vec<Property> {
        vec![Property::computed("current", PropertyValue::Float(self.current))]
    }

    fn set_property(&mut self, name: &str, _raw: &str) -> Result<(), PropertyError> {
        Err(properties::rejected(name, &["current"]))
    }

    fn switch_like(&mut self) -> Option<&mut dyn SwitchLike> {
        None
    }

    fn boundary(&mut self) -> Option<&mut dyn BoundaryPort> {
        None
    }
}
