//! Core simulation API shared by the CLI and embedding applications.
//! No terminal or file-dialog dependencies.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::board::{Board, ComponentId};
use crate::components::{ComponentRegistry, Property};
use crate::network::{NetworkBuilder, NodeId};
use crate::sim::{Scheduler, SimulationReport};
use crate::snapshot::{BoardSnapshot, BuildError, Library};

#[derive(Debug, thiserror::Error)]
pub enum WireboardError {
    #[error("Build error: {0}")]
    Build(#[from] BuildError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{0}")]
    Other(String),
}

/// Options for simulation cycles
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationOptions {
    /// Passes allowed before a cycle is declared stalled
    pub max_passes: usize,
    /// Report input terminals left floating after a cycle
    pub report_floating: bool,
}

impl Default for SimulationOptions {
    fn default() -> Self {
        Self {
            max_passes: 256,
            report_floating: true,
        }
    }
}

impl SimulationOptions {
    /// Load options from a JSON file; missing fields keep their defaults
    pub fn from_file(path: &Path) -> Result<Self, WireboardError> {
        let text = std::fs::read_to_string(path)?;
        let options: SimulationOptions = serde_json::from_str(&text)?;
        if options.max_passes == 0 {
            return Err(WireboardError::Other(
                "max_passes must be at least 1".to_string(),
            ));
        }
        Ok(options)
    }
}

/// Display state of one component after a cycle
#[derive(Debug, Clone, Serialize)]
pub struct ComponentSummary {
    pub id: ComponentId,
    pub type_id: String,
    pub properties: Vec<Property>,
}

/// Result of simulating a snapshot file
#[derive(Debug, Clone, Serialize)]
pub struct SimulationSummary {
    pub name: String,
    pub report: SimulationReport,
    pub components: Vec<ComponentSummary>,
}

impl SimulationSummary {
    pub fn is_stable(&self) -> bool {
        self.report.status.is_stable()
    }
}

/// Electrical node of one connection point
#[derive(Debug, Clone, Serialize)]
pub struct TerminalNode {
    pub component: ComponentId,
    pub type_id: String,
    pub terminal: String,
    pub node: NodeId,
}

/// Core simulation API used by the CLI.
pub struct WireboardCore {
    registry: ComponentRegistry,
    options: SimulationOptions,
}

impl Default for WireboardCore {
    fn default() -> Self {
        Self::new(SimulationOptions::default())
    }
}

impl WireboardCore {
    pub fn new(options: SimulationOptions) -> Self {
        Self {
            registry: ComponentRegistry::builtin(),
            options,
        }
    }

    pub fn registry(&self) -> &ComponentRegistry {
        &self.registry
    }

    pub fn options(&self) -> &SimulationOptions {
        &self.options
    }

    /// Load and materialize a snapshot file
    pub fn load_board(&self, path: &Path) -> Result<(BoardSnapshot, Board, Library), WireboardError> {
        let snapshot = BoardSnapshot::load(path)?;
        let (board, library) = snapshot.build(&self.registry)?;
        Ok((snapshot, board, library))
    }

    /// Run one cycle on a board
    pub fn simulate(&self, board: &mut Board) -> SimulationReport {
        Scheduler::new(self.options.clone()).run(board)
    }

    /// Load a snapshot file, simulate it and collect display values
    pub fn simulate_file(&self, path: &Path) -> Result<SimulationSummary, WireboardError> {
        let (snapshot, mut board, _) = self.load_board(path)?;
        let report = self.simulate(&mut board);
        let components = board
            .components()
            .map(|slot| ComponentSummary {
                id: slot.id(),
                type_id: slot.component().kind().to_string(),
                properties: slot.component().properties(),
            })
            .collect();
        Ok(SimulationSummary {
            name: snapshot.metadata.name,
            report,
            components,
        })
    }

    /// Load a snapshot file and list the node of every connection point
    pub fn node_table(&self, path: &Path) -> Result<Vec<TerminalNode>, WireboardError> {
        let (_, mut board, _) = self.load_board(path)?;
        let network = NetworkBuilder::build(&mut board);
        let mut table = Vec::new();
        for slot in board.components() {
            for (terminal, info) in slot.component().terminals().iter().enumerate() {
                if let Some(node) = network.node_of(slot.id(), terminal) {
                    table.push(TerminalNode {
                        component: slot.id(),
                        type_id: slot.component().kind().to_string(),
                        terminal: info.name.clone(),
                        node,
                    });
                }
            }
        }
        Ok(table)
    }
}
