//! Passive elements: resistive branches and the plain wire-through jumper

use super::properties::{self, Property, PropertyError, PropertyValue};
use super::{BoundaryPort, Capabilities, Component, Readout, SwitchLike, Terminal, TerminalIo};
use crate::core::SimulationOptions;
use crate::geometry::{RotationMode, Size};
use crate::signal::branch_current;

/// Current (A) at which a lamp lights
pub const LAMP_LIT_AMPS: f64 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResistorKind {
    Resistor,
    Lamp,
}

/// Two-terminal resistive branch. Drives nothing; its current is computed
/// from the published node values.
#[derive(Debug, Clone)]
pub struct Resistor {
    kind: ResistorKind,
    terminals: Vec<Terminal>,
    resistance: f64,
    current: f64,
}

impl Resistor {
    pub fn new(kind: ResistorKind, resistance: f64) -> Self {
        Self {
            kind,
            terminals: vec![Terminal::passive("a", 0.0, 0.5), Terminal::passive("b", 1.0, 0.5)],
            resistance,
            current: 0.0,
        }
    }

    pub fn resistor() -> Self {
        Self::new(ResistorKind::Resistor, 1_000.0)
    }

    pub fn lamp() -> Self {
        Self::new(ResistorKind::Lamp, 100.0)
    }

    pub fn current(&self) -> f64 {
        self.current
    }

    pub fn is_lit(&self) -> bool {
        self.kind == ResistorKind::Lamp && self.current.abs() >= LAMP_LIT_AMPS
    }
}

impl Component for Resistor {
    fn kind(&self) -> &str {
        match self.kind {
            ResistorKind::Resistor => "resistor",
            ResistorKind::Lamp => "lamp",
        }
    }

    fn footprint(&self) -> Size {
        match self.kind {
            ResistorKind::Resistor => Size::new(3.0, 1.0),
            ResistorKind::Lamp => Size::new(2.0, 2.0),
        }
    }

    fn terminals(&self) -> &[Terminal] {
        &self.terminals
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            rotation: RotationMode::Free,
            logic_only: false,
            shorted: &[],
            resistance: Some(self.resistance),
        }
    }

    fn before_simulation(&mut self, _options: &SimulationOptions) {}

    fn update(&mut self, _io: &mut TerminalIo<'_>) {}

    fn after_simulation(&mut self, readout: &Readout<'_>) {
        self.current = branch_current(readout.signal(0), readout.signal(1), self.resistance);
    }

    fn properties(&self) -> Vec<Property> {
        let mut props = vec![
            Property::editable("resistance", PropertyValue::Float(self.resistance)),
            Property::computed("current", PropertyValue::Float(self.current)),
        ];
        if self.kind == ResistorKind::Lamp {
            props.push(Property::computed("lit", PropertyValue::Bool(self.is_lit())));
        }
        props
    }

    fn set_property(&mut self, name: &str, raw: &str) -> Result<(), PropertyError> {
        match name {
            "resistance" => {
                self.resistance = properties::parse_positive(name, raw)?;
                Ok(())
            }
            _ => Err(properties::rejected(name, &["current", "lit"])),
        }
    }

    fn switch_like(&mut self) -> Option<&mut dyn SwitchLike> {
        None
    }

    fn boundary(&mut self) -> Option<&mut dyn BoundaryPort> {
        None
    }
}

/// Plain wire-through: both terminals are one electrical node
#[derive(Debug, Clone)]
pub struct Jumper {
    terminals: Vec<Terminal>,
}

impl Jumper {
    pub fn new() -> Self {
        Self {
            terminals: vec![Terminal::passive("a", 0.0, 0.5), Terminal::passive("b", 1.0, 0.5)],
        }
    }
}

impl Default for Jumper {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for Jumper {
    fn kind(&self) -> &str {
        "jumper"
    }

    fn footprint(&self) -> Size {
        Size::new(2.0, 1.0)
    }

    fn terminals(&self) -> &[Terminal] {
        &self.terminals
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            rotation: RotationMode::Free,
            logic_only: false,
            shorted: &[&[0, 1]],
            resistance: None,
        }
    }

    fn before_simulation(&mut self, _options: &SimulationOptions) {}

    fn update(&mut self, _io: &mut TerminalIo<'_>) {}

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
