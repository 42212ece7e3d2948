//! Component Update Contract
//!
//! Every element placed on a board implements [`Component`]. The scheduler
//! only talks to components through this trait: it reads their terminal
//! layout and capabilities, hands them the node values seen at their
//! terminals, and collects what they drive back onto the network.
//!
//! Optional behaviors (switch contacts, custom-component boundary ports,
//! resistive branches, internal shorts) are queried explicitly through
//! [`Capabilities`] and the `switch_like` / `boundary` accessors. There are no
//! silent default implementations: every component states what it is.

pub mod custom;
pub mod gates;
pub mod meters;
pub mod passive;
pub mod ports;
pub mod properties;
pub mod registry;
pub mod sources;
pub mod switches;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::SimulationOptions;
use crate::geometry::{Point, RotationMode, Size};
use crate::signal::Signal;

pub use custom::CustomInstance;
pub use gates::{Gate, GateKind};
pub use meters::{Ammeter, Probe, Voltmeter};
pub use passive::{Jumper, Resistor, ResistorKind};
pub use ports::{PortIn, PortOut};
pub use properties::{Property, PropertyError, PropertyValue};
pub use registry::{ComponentRegistry, Constructor};
pub use sources::{Battery, Ground, Toggle};
pub use switches::{Relay, Switch};

/// Role of a connection point, as declared by its component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminalRole {
    Input,
    Output,
    Undifferentiated,
}

/// Direction of a custom-component port
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PortDirection {
    Input,
    Output,
}

impl PortDirection {
    pub fn role(&self) -> TerminalRole {
        match self {
            PortDirection::Input => TerminalRole::Input,
            PortDirection::Output => TerminalRole::Output,
        }
    }
}

/// A connection point declared by a component: where it sits on the
/// footprint (fractions in [0, 1]) and how the component uses it.
#[derive(Debug, Clone, PartialEq)]
pub struct Terminal {
    pub name: String,
    pub offset: Point,
    pub role: TerminalRole,
}

impl Terminal {
    pub fn new(name: impl Into<String>, x: f64, y: f64, role: TerminalRole) -> Self {
        Self {
            name: name.into(),
            offset: Point::new(x, y),
            role,
        }
    }

    pub fn input(name: impl Into<String>, x: f64, y: f64) -> Self {
        Self::new(name, x, y, TerminalRole::Input)
    }

    pub fn output(name: impl Into<String>, x: f64, y: f64) -> Self {
        Self::new(name, x, y, TerminalRole::Output)
    }

    pub fn passive(name: impl Into<String>, x: f64, y: f64) -> Self {
        Self::new(name, x, y, TerminalRole::Undifferentiated)
    }
}

/// Static facts about a component variant
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Capabilities {
    /// Rotations the editor may apply
    pub rotation: RotationMode,
    /// Only reads and drives logic levels
    pub logic_only: bool,
    /// Groups of terminal indices joined inside the component
    pub shorted: &'static [&'static [usize]],
    /// Resistance between terminals 0 and 1, for resistive branches
    pub resistance: Option<f64>,
}

/// Switch-like components: their contacts join terminals 0 and 1 while closed
pub trait SwitchLike {
    fn is_closed(&self) -> bool;

    /// Current through the contacts, computed by the engine for display
    fn set_current(&mut self, amps: f64);
}

/// Boundary component of a custom-component board
pub trait BoundaryPort {
    fn port_name(&self) -> &str;

    fn direction(&self) -> PortDirection;

    /// Value presented from outside the custom component
    fn bind(&mut self, signal: Signal);
}

/// Terminal values seen by a component during one pass, and the drives it
/// places back onto the network.
pub struct TerminalIo<'a> {
    inputs: &'a [Signal],
    drives: &'a mut [Signal],
}

impl<'a> TerminalIo<'a> {
    pub fn new(inputs: &'a [Signal], drives: &'a mut [Signal]) -> Self {
        Self { inputs, drives }
    }

    /// Node value at a terminal as of the start of the pass
    pub fn read(&self, terminal: usize) -> Signal {
        self.inputs.get(terminal).copied().unwrap_or_default()
    }

    /// Logic level at a terminal; floating reads as Low
    pub fn logic(&self, terminal: usize) -> bool {
        self.read(terminal).logic_or_low()
    }

    pub fn inputs(&self) -> &[Signal] {
        self.inputs
    }

    pub fn drive(&mut self, terminal: usize, signal: Signal) {
        if let Some(slot) = self.drives.get_mut(terminal) {
            *slot = signal;
        }
    }
}

/// Final node values and current estimates at a component's terminals
pub struct Readout<'a> {
    signals: &'a [Signal],
    currents: &'a [f64],
}

impl<'a> Readout<'a> {
    pub fn new(signals: &'a [Signal], currents: &'a [f64]) -> Self {
        Self { signals, currents }
    }

    pub fn signal(&self, terminal: usize) -> Signal {
        self.signals.get(terminal).copied().unwrap_or_default()
    }

    /// Estimated current flowing through the node at a terminal
    pub fn node_current(&self, terminal: usize) -> f64 {
        self.currents.get(terminal).copied().unwrap_or(0.0)
    }
}

/// The per-tick update contract shared by every board element
pub trait Component: fmt::Debug {
    /// Registry type id
    fn kind(&self) -> &str;

    fn footprint(&self) -> Size;

    /// Connection points, in index order
    fn terminals(&self) -> &[Terminal];

    fn capabilities(&self) -> Capabilities;

    /// Called once per cycle, after the network is built
    fn before_simulation(&mut self, options: &SimulationOptions);

    /// Compute outputs from the terminal values seen at the start of the pass
    fn update(&mut self, io: &mut TerminalIo<'_>);

    /// Called once per cycle with the published values
    fn after_simulation(&mut self, readout: &Readout<'_>);

    /// Current property set; computed entries reflect live state
    fn properties(&self) -> Vec<Property>;

    fn set_property(&mut self, name: &str, raw: &str) -> Result<(), PropertyError>;

    fn switch_like(&mut self) -> Option<&mut dyn SwitchLike>;

    fn boundary(&mut self) -> Option<&mut dyn BoundaryPort>;
}
