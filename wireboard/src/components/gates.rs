//! Logic gates
//!
//! Each gate folds its inputs one at a time into a running state; a fold can
//! finish early once the output is decided (a Low input on an AND). Inverting
//! gates reuse the fold of their base gate.

use super::properties::{self, Property, PropertyError, PropertyValue};
use super::{BoundaryPort, Capabilities, Component, Readout, SwitchLike, Terminal, TerminalIo};
use crate::core::SimulationOptions;
use crate::geometry::{RotationMode, Size};
use crate::signal::Signal;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GateKind {
    And,
    Or,
    Nand,
    Nor,
    Xor,
    Xnor,
    Not,
}

struct GateOutput {
    out: bool,
    fin: bool,
}

impl GateKind {
    pub const ALL: [GateKind; 7] = [
        GateKind::And,
        GateKind::Or,
        GateKind::Nand,
        GateKind::Nor,
        GateKind::Xor,
        GateKind::Xnor,
        GateKind::Not,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            GateKind::And => "and",
            GateKind::Or => "or",
            GateKind::Nand => "nand",
            GateKind::Nor => "nor",
            GateKind::Xor => "xor",
            GateKind::Xnor => "xnor",
            GateKind::Not => "not",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            GateKind::And => "AND gate",
            GateKind::Or => "OR gate",
            GateKind::Nand => "NAND gate",
            GateKind::Nor => "NOR gate",
            GateKind::Xor => "XOR gate",
            GateKind::Xnor => "XNOR gate",
            GateKind::Not => "NOT gate",
        }
    }

    pub fn input_count(&self) -> usize {
        match self {
            GateKind::Not => 1,
            _ => 2,
        }
    }

    fn inverted(&self) -> bool {
        matches!(
            self,
            GateKind::Nand | GateKind::Nor | GateKind::Xnor | GateKind::Not
        )
    }

    fn init_state(&self) -> bool {
        match self {
            GateKind::And | GateKind::Nand | GateKind::Not => true,
            _ => false,
        }
    }

    fn fold(&self, state: &mut bool, input: bool) -> GateOutput {
        match self {
            GateKind::And | GateKind::Nand | GateKind::Not => {
                if input {
                    GateOutput { out: true, fin: false }
                } else {
                    GateOutput { out: false, fin: true }
                }
            }
            GateKind::Or | GateKind::Nor => {
                if input {
                    GateOutput { out: true, fin: true }
                } else {
                    GateOutput { out: false, fin: false }
                }
            }
            GateKind::Xor | GateKind::Xnor => {
                if input {
                    *state = !*state;
                }
                GateOutput {
                    out: *state,
                    fin: false,
                }
            }
        }
    }

    /// Evaluate the gate over its input levels
    pub fn evaluate<I>(&self, inputs: I) -> bool
    where
        I: IntoIterator<Item = bool>,
    {
        let mut state = self.init_state();
        let mut out = state;
        for input in inputs {
            let step = self.fold(&mut state, input);
            out = step.out;
            if step.fin {
                break;
            }
        }
        out != self.inverted()
    }
}

#[derive(Debug, Clone)]
pub struct Gate {
    kind: GateKind,
    terminals: Vec<Terminal>,
    output: bool,
}

impl Gate {
    pub fn new(kind: GateKind) -> Self {
        let count = kind.input_count();
        let mut terminals: Vec<Terminal> = (0..count)
            .map(|i| {
                let y = (i as f64 + 1.0) / (count as f64 + 1.0);
                Terminal::input(input_name(i), 0.0, y)
            })
            .collect();
        terminals.push(Terminal::output("out", 1.0, 0.5));

        Self {
            kind,
            terminals,
            output: false,
        }
    }

    pub fn gate_kind(&self) -> GateKind {
        self.kind
    }

    pub fn output(&self) -> bool {
        self.output
    }
}

fn input_name(index: usize) -> String {
    match index {
        0 => "a".to_string(),
        1 => "b".to_string(),
        n => format!("in{}", n),
    }
}

impl Component for Gate {
    fn kind(&self) -> &str {
        self.kind.id()
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
            logic_only: true,
            shorted: &[],
            resistance: None,
        }
    }

    fn before_simulation(&mut self, _options: &SimulationOptions) {}

    fn update(&mut self, io: &mut TerminalIo<'_>) {
        let count = self.kind.input_count();
        self.output = self.kind.evaluate((0..count).map(|i| io.logic(i)));
        io.drive(count, Signal::Logic(self.output));
    }

    fn after_simulation(&mut self, _readout: &Readout<'_>) {}

    fn properties(&self) -> Vec<Property> {
        vec![Property::computed(
            "state",
            PropertyValue::Text(Signal::Logic(self.output).label()),
        )]
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
