//! Static registration table mapping type ids to constructors.
//!
//! `custom:<definition id>` is not in the table; it is resolved against a
//! [`Library`] of custom definitions at instantiation time.

use super::custom::CustomInstance;
use super::gates::{Gate, GateKind};
use super::meters::{Ammeter, Probe, Voltmeter};
use super::passive::{Jumper, Resistor};
use super::ports::{PortIn, PortOut};
use super::sources::{Battery, Ground, Toggle};
use super::switches::{Relay, Switch};
use super::Component;
use crate::snapshot::{BuildError, Library};

/// Type id prefix of custom-component instances
pub const CUSTOM_PREFIX: &str = "custom:";

pub type Constructor = fn() -> Box<dyn Component>;

macro_rules! constructor {
    ($name:ident, $value:expr) => {
        fn $name() -> Box<dyn Component> {
            Box::new($value)
        }
    };
}

constructor!(and_gate, Gate::new(GateKind::And));
constructor!(or_gate, Gate::new(GateKind::Or));
constructor!(nand_gate, Gate::new(GateKind::Nand));
constructor!(nor_gate, Gate::new(GateKind::Nor));
constructor!(xor_gate, Gate::new(GateKind::Xor));
constructor!(xnor_gate, Gate::new(GateKind::Xnor));
constructor!(not_gate, Gate::new(GateKind::Not));
constructor!(toggle, Toggle::default());
constructor!(battery, Battery::default());
constructor!(ground, Ground::new());
constructor!(switch, Switch::default());
constructor!(relay, Relay::new());
constructor!(resistor, Resistor::resistor());
constructor!(lamp, Resistor::lamp());
constructor!(probe, Probe::new());
constructor!(voltmeter, Voltmeter::new());
constructor!(ammeter, Ammeter::new());
constructor!(jumper, Jumper::new());
constructor!(port_in, PortIn::default());
constructor!(port_out, PortOut::default());

static BUILTIN: &[(&str, Constructor)] = &[
    ("and", and_gate),
    ("or", or_gate),
    ("nand", nand_gate),
    ("nor", nor_gate),
    ("xor", xor_gate),
    ("xnor", xnor_gate),
    ("not", not_gate),
    ("toggle", toggle),
    ("battery", battery),
    ("ground", ground),
    ("switch", switch),
    ("relay", relay),
    ("resistor", resistor),
    ("lamp", lamp),
    ("probe", probe),
    ("voltmeter", voltmeter),
    ("ammeter", ammeter),
    ("jumper", jumper),
    ("port_in", port_in),
    ("port_out", port_out),
];

/// Registry of component constructors, in registration order
#[derive(Debug, Clone)]
pub struct ComponentRegistry {
    constructors: Vec<(&'static str, Constructor)>,
}

impl ComponentRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self {
            constructors: Vec::new(),
        }
    }

    /// Registry holding every built-in component
    pub fn builtin() -> Self {
        Self {
            constructors: BUILTIN.to_vec(),
        }
    }

    /// Register a constructor; a later registration replaces an earlier one
    pub fn register(&mut self, type_id: &'static str, constructor: Constructor) {
        if let Some(entry) = self.constructors.iter_mut().find(|(id, _)| *id == type_id) {
            entry.1 = constructor;
        } else {
            self.constructors.push((type_id, constructor));
        }
    }

    pub fn find(&self, type_id: &str) -> Option<Constructor> {
        self.constructors
            .iter()
            .find(|(id, _)| *id == type_id)
            .map(|(_, constructor)| *constructor)
    }

    pub fn type_ids(&self) -> Vec<&'static str> {
        self.constructors.iter().map(|(id, _)| *id).collect()
    }

    /// Instantiate a built-in or custom component
    pub fn instantiate(
        &self,
        type_id: &str,
        library: &Library,
    ) -> Result<Box<dyn Component>, BuildError> {
        self.instantiate_nested(type_id, library, &mut Vec::new())
    }

    /// `chain` holds the custom definitions currently being materialized
    pub(crate) fn instantiate_nested(
        &self,
        type_id: &str,
        library: &Library,
        chain: &mut Vec<String>,
    ) -> Result<Box<dyn Component>, BuildError> {
        if let Some(definition) = type_id.strip_prefix(CUSTOM_PREFIX) {
            let instance = CustomInstance::materialize(self, library, definition, chain)?;
            return Ok(Box::new(instance));
        }
        self.find(type_id)
            .map(|constructor| constructor())
            .ok_or_else(|| BuildError::UnknownType(type_id.to_string()))
    }
}

impl Default for ComponentRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
