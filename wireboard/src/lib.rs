//! Wireboard - circuit simulation engine
//!
//! This library builds electrical networks from components and hand-drawn
//! wires and runs a deterministic, convergence-checked propagation over them,
//! mixing logic levels with simple analog quantities. Saved sub-circuits can
//! be reused as custom components and are simulated recursively.
//!
//! # Quick Start
//!
//! ```no_run
//! use wireboard::{SimulationOptions, WireboardCore};
//! use std::path::Path;
//!
//! let core = WireboardCore::new(SimulationOptions::default());
//! let summary = core.simulate_file(Path::new("board.json")).unwrap();
//!
//! println!("{:?} after {} passes", summary.report.status, summary.report.passes);
//! for component in &summary.components {
//!     println!("{} {}", component.id, component.type_id);
//! }
//! ```
//!
//! # Features
//!
//! - **Network builder**: union-find over wire nodes, segments and terminals
//! - **Scheduler**: Jacobi-style passes with a stall bound and cancellation
//! - **Components**: gates, sources, switches, relays, passives and meters
//! - **Custom components**: nested boards with named ports and a cycle guard
//! - **Snapshots**: JSON persistence model with structural validation

pub mod board;
pub mod components;
pub mod core;
pub mod geometry;
pub mod network;
pub mod signal;
pub mod sim;
pub mod snapshot;

// Re-export main types
pub use board::{Board, ComponentId, EditError, Endpoint, WireColor, WireId, WireNodeId};
pub use components::{Component, ComponentRegistry, Property, PropertyError, PropertyValue};
pub use crate::core::{SimulationOptions, SimulationSummary, WireboardCore, WireboardError};
pub use geometry::{Point, Rotation};
pub use network::{Network, NetworkBuilder, NodeId};
pub use signal::Signal;
pub use sim::{
    CancelToken, Cancelled, Edit, Scheduler, Session, SimulationReport, SimulationStatus,
};
pub use snapshot::{BoardSnapshot, BuildError, CustomDefinition, Library};

/// Load a snapshot file and materialize it (convenience wrapper).
pub fn load_board(path: &std::path::Path) -> Result<(Board, Library), WireboardError> {
    let snapshot = BoardSnapshot::load(path)?;
    Ok(snapshot.build(&ComponentRegistry::builtin())?)
}

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{
        Board, BoardSnapshot, BuildError, ComponentRegistry, Edit, Library, NetworkBuilder,
        Point, Scheduler, Session, Signal, SimulationOptions, SimulationReport, SimulationStatus,
        WireColor, WireboardCore, WireboardError,
    };
}
