//! Wire nodes and wire segments

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::ComponentId;
use crate::geometry::Point;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WireNodeId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WireId(pub u64);

impl fmt::Display for WireNodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "J{}", self.0)
    }
}

impl fmt::Display for WireId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "W{}", self.0)
    }
}

/// Back-reference from a wire node to the terminal it is pinned to.
/// Lookup only: the board owns both sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Attachment {
    pub component: ComponentId,
    pub terminal: usize,
}

/// Shared endpoint of one or more wire segments
#[derive(Debug, Clone, PartialEq)]
pub struct WireNode {
    pub position: Point,
    pub segments: BTreeSet<WireId>,
    pub attachment: Option<Attachment>,
}

impl WireNode {
    pub fn new(position: Point) -> Self {
        Self {
            position,
            segments: BTreeSet::new(),
            attachment: None,
        }
    }

    /// No segments and no attachment: nothing refers to this node
    pub fn is_garbage(&self) -> bool {
        self.segments.is_empty() && self.attachment.is_none()
    }
}

/// One end of a wire segment
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Endpoint {
    Free(Point),
    Node(WireNodeId),
}

impl Endpoint {
    pub fn node(&self) -> Option<WireNodeId> {
        match self {
            Endpoint::Node(id) => Some(*id),
            Endpoint::Free(_) => None,
        }
    }
}

/// Display-only wire color
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WireColor(pub String);

impl Default for WireColor {
    fn default() -> Self {
        WireColor("black".to_string())
    }
}

impl From<&str> for WireColor {
    fn from(s: &str) -> Self {
        WireColor(s.to_string())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WireSegment {
    pub from: Endpoint,
    pub to: Endpoint,
    pub color: WireColor,
}

impl WireSegment {
    pub fn endpoints(&self) -> [Endpoint; 2] {
        [self.from, self.to]
    }
}
