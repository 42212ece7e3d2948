//! Signal values carried by electrical nodes.
//!
//! A node is either undriven (`Floating`), carries a logic level, or carries
//! an analog voltage. Logic and analog values convert into each other through
//! a fixed threshold so that gates can read battery-driven nodes and meters
//! can read gate outputs.

use serde::{Deserialize, Serialize};

/// Voltage presented by a logic High
pub const LOGIC_HIGH_VOLTS: f64 = 5.0;
/// Voltage at or above which an analog node reads as logic High
pub const LOGIC_THRESHOLD_VOLTS: f64 = 2.5;

/// Value of an electrical node or of a terminal drive
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Signal {
    #[default]
    Floating,
    Logic(bool),
    Voltage(f64),
}

impl Signal {
    pub const HIGH: Signal = Signal::Logic(true);
    pub const LOW: Signal = Signal::Logic(false);

    pub fn is_floating(&self) -> bool {
        matches!(self, Signal::Floating)
    }

    /// Logic reading; `None` when the node is floating
    pub fn logic(&self) -> Option<bool> {
        match *self {
            Signal::Floating => None,
            Signal::Logic(b) => Some(b),
            Signal::Voltage(v) => Some(v >= LOGIC_THRESHOLD_VOLTS),
        }
    }

    /// Logic reading with floating resolved to the default Low level
    pub fn logic_or_low(&self) -> bool {
        self.logic().unwrap_or(false)
    }

    /// Analog reading; `None` when the node is floating
    pub fn voltage(&self) -> Option<f64> {
        match *self {
            Signal::Floating => None,
            Signal::Logic(true) => Some(LOGIC_HIGH_VOLTS),
            Signal::Logic(false) => Some(0.0),
            Signal::Voltage(v) => Some(v),
        }
    }

    /// Short label for property display
    pub fn label(&self) -> String {
        match *self {
            Signal::Floating => "floating".to_string(),
            Signal::Logic(true) => "high".to_string(),
            Signal::Logic(false) => "low".to_string(),
            Signal::Voltage(v) => format!("{:.3} V", v),
        }
    }
}

/// Resolve every drive placed on one electrical node.
///
/// Floating drives are ignored. Among the remaining drives the highest
/// potential wins; on a tie the earliest drive is kept, so callers must pass
/// drives in board insertion order.
pub fn resolve<I>(drives: I) -> Signal
where
    I: IntoIterator<Item = Signal>,
{
    let mut best = Signal::Floating;
    let mut best_volts = f64::NEG_INFINITY;
    for drive in drives {
        if let Some(v) = drive.voltage() {
            if v > best_volts {
                best = drive;
                best_volts = v;
            }
        }
    }
    best
}

/// Current through a resistive branch between two terminals.
///
/// Placeholder model: Ohm's law across the two node potentials; a branch with
/// a floating side carries no current.
pub fn branch_current(a: Signal, b: Signal, resistance: f64) -> f64 {
    match (a.voltage(), b.voltage()) {
        (Some(va), Some(vb)) if resistance > 0.0 => (va - vb) / resistance,
        _ => 0.0,
    }
}
