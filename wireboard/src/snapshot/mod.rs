//! Board snapshots
//!
//! The serde data model exchanged with the persistence layer: ordered
//! component records, wire node records and wire records addressed by dense
//! index, plus the custom-component definitions of the board's library.
//!
//! Materializing a snapshot validates every reference before a single
//! component update can run. Structural problems come back as [`BuildError`].

mod build;
mod library;

pub use library::{CustomDefinition, Library};

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::board::WireColor;
use crate::components::{PropertyError, PropertyValue};
use crate::core::WireboardError;
use crate::geometry::{Point, Rotation};

/// Snapshot format written by this crate
pub const FORMAT_VERSION: &str = "1";

/// Structural errors found while materializing a snapshot
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BuildError {
    #[error("Unknown component type: {0}")]
    UnknownType(String),

    #[error("Unknown custom component definition: {0}")]
    UnknownDefinition(String),

    #[error("Duplicate custom component definition: {0}")]
    DuplicateDefinition(String),

    #[error("Component index {index} out of range ({count} components)")]
    ComponentIndex { index: usize, count: usize },

    #[error("Wire node index {index} out of range ({count} nodes)")]
    NodeIndex { index: usize, count: usize },

    #[error("Component {component} has no terminal {terminal}")]
    TerminalIndex { component: usize, terminal: usize },

    #[error("Component {component}: invalid property {name}: {source}")]
    InvalidProperty {
        component: usize,
        name: String,
        #[source]
        source: PropertyError,
    },

    #[error("Component {component} ({type_id}) does not support its stored rotation")]
    InvalidRotation { component: usize, type_id: String },

    #[error("Custom component {definition} has no boundary component for port {port}")]
    MissingPort { definition: String, port: String },

    #[error("Cyclic custom component nesting: {}", chain.join(" -> "))]
    CyclicDefinition { chain: Vec<String> },

    #[error("Unsupported snapshot format version: {0}")]
    UnsupportedVersion(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotMetadata {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saved_at: Option<DateTime<Utc>>,
    #[serde(default = "default_format_version")]
    pub format_version: String,
}

fn default_format_version() -> String {
    FORMAT_VERSION.to_string()
}

impl Default for SnapshotMetadata {
    fn default() -> Self {
        Self {
            name: String::new(),
            saved_at: None,
            format_version: default_format_version(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentRecord {
    pub type_id: String,
    pub position: Point,
    #[serde(default)]
    pub rotation: Rotation,
    /// Editable properties only
    #[serde(default)]
    pub properties: BTreeMap<String, PropertyValue>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentRecord {
    pub component: usize,
    pub terminal: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub position: Point,
    #[serde(default)]
    pub attachment: Option<AttachmentRecord>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndpointRecord {
    Node(usize),
    Free(Point),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireRecord {
    pub from: EndpointRecord,
    pub to: EndpointRecord,
    #[serde(default)]
    pub color: WireColor,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BoardSnapshot {
    #[serde(default)]
    pub metadata: SnapshotMetadata,
    #[serde(default)]
    pub components: Vec<ComponentRecord>,
    #[serde(default)]
    pub nodes: Vec<NodeRecord>,
    #[serde(default)]
    pub wires: Vec<WireRecord>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub definitions: Vec<CustomDefinition>,
}

impl BoardSnapshot {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Read a snapshot from a JSON file
    pub fn load(path: &Path) -> Result<Self, WireboardError> {
        let text = fs::read_to_string(path)?;
        let snapshot = Self::from_json(&text)?;
        tracing::debug!(
            "Loaded snapshot {:?}: {} components, {} wires, {} definitions",
            path,
            snapshot.components.len(),
            snapshot.wires.len(),
            snapshot.definitions.len()
        );
        Ok(snapshot)
    }

    /// Write the snapshot to a JSON file, stamping the save time
    pub fn save(&mut self, path: &Path) -> Result<(), WireboardError> {
        self.metadata.saved_at = Some(Utc::now());
        fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Same board content, ignoring metadata
    pub fn same_content(&self, other: &BoardSnapshot) -> bool {
        self.components == other.components
            && self.nodes == other.nodes
            && self.wires == other.wires
            && self.definitions.len() == other.definitions.len()
            && self
                .definitions
                .iter()
                .zip(&other.definitions)
                .all(|(a, b)| a.same_content(b))
    }
}
