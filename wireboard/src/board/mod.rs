//! Board arena
//!
//! The board owns every component, wire node and wire segment, each addressed
//! by a stable integer id that is never reused. Maps are keyed by those ids,
//! and ids are allocated in increasing order, so iteration order is always
//! insertion order.
//!
//! Edits keep two invariants:
//! - a wire node attached to a terminal follows that terminal when the
//!   component moves or rotates;
//! - a wire node with no segments and no attachment is pruned.
//!
//! Edits that change connectivity drop the cached network; the next
//! simulation cycle rebuilds it.

pub mod wire;

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::components::{Component, ComponentRegistry, Property, PropertyError};
use crate::geometry::{terminal_position, Point, Rotation, SNAP_TOLERANCE};
use crate::network::{Network, NodeId};
use crate::signal::Signal;
use crate::sim::SimulationStatus;
use crate::snapshot::{BuildError, Library};

pub use wire::{Attachment, Endpoint, WireColor, WireId, WireNode, WireNodeId, WireSegment};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ComponentId(pub u64);

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "C{}", self.0)
    }
}

/// Errors raised by a board edit
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EditError {
    #[error("Unknown component: {0}")]
    UnknownComponent(ComponentId),

    #[error("Unknown wire: {0}")]
    UnknownWire(WireId),

    #[error("Unknown wire node: {0}")]
    UnknownWireNode(WireNodeId),

    #[error("Component {component} has no terminal {terminal}")]
    UnknownTerminal { component: ComponentId, terminal: usize },

    #[error("{kind} does not support rotation {rotation:?}")]
    RotationNotSupported { kind: String, rotation: Rotation },

    #[error(transparent)]
    Property(#[from] PropertyError),

    #[error(transparent)]
    Build(#[from] BuildError),
}

/// A component placed on the board
#[derive(Debug)]
pub struct ComponentSlot {
    id: ComponentId,
    position: Point,
    rotation: Rotation,
    component: Box<dyn Component>,
    nodes: Vec<Option<NodeId>>,
}

impl ComponentSlot {
    pub fn id(&self) -> ComponentId {
        self.id
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    pub fn component(&self) -> &dyn Component {
        self.component.as_ref()
    }

    pub fn component_mut(&mut self) -> &mut dyn Component {
        self.component.as_mut()
    }

    /// World position of a terminal
    pub fn terminal_position(&self, terminal: usize) -> Option<Point> {
        let offset = self.component.terminals().get(terminal)?.offset;
        Some(terminal_position(
            self.position,
            self.component.footprint(),
            self.rotation,
            offset,
        ))
    }

    pub fn terminal_count(&self) -> usize {
        self.component.terminals().len()
    }

    /// Electrical node assigned by the last network build
    pub fn node(&self, terminal: usize) -> Option<NodeId> {
        self.nodes.get(terminal).copied().flatten()
    }

    pub(crate) fn set_node(&mut self, terminal: usize, node: NodeId) {
        if self.nodes.len() < self.terminal_count() {
            self.nodes.resize(self.terminal_count(), None);
        }
        if let Some(slot) = self.nodes.get_mut(terminal) {
            *slot = Some(node);
        }
    }
}

/// Values published by the last completed simulation cycle
#[derive(Debug, Clone, PartialEq)]
pub struct Published {
    pub status: SimulationStatus,
    pub passes: usize,
    /// Indexed by `NodeId`
    pub values: Vec<Signal>,
}

#[derive(Debug, Default)]
pub struct Board {
    components: BTreeMap<ComponentId, ComponentSlot>,
    nodes: BTreeMap<WireNodeId, WireNode>,
    wires: BTreeMap<WireId, WireSegment>,
    next_component: u64,
    next_node: u64,
    next_wire: u64,
    network: Option<Network>,
    published: Option<Published>,
}

impl Board {
    pub fn new() -> Self {
        Self::default()
    }

    // ---------------------------------------------------------------------
    // Read access
    // ---------------------------------------------------------------------

    /// Components in insertion order
    pub fn components(&self) -> impl Iterator<Item = &ComponentSlot> {
        self.components.values()
    }

    pub(crate) fn components_mut(&mut self) -> impl Iterator<Item = &mut ComponentSlot> {
        self.components.values_mut()
    }

    pub fn component(&self, id: ComponentId) -> Option<&ComponentSlot> {
        self.components.get(&id)
    }

    pub fn component_mut(&mut self, id: ComponentId) -> Option<&mut ComponentSlot> {
        self.components.get_mut(&id)
    }

    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    pub fn wire_nodes(&self) -> impl Iterator<Item = (WireNodeId, &WireNode)> {
        self.nodes.iter().map(|(id, node)| (*id, node))
    }

    pub fn wire_node(&self, id: WireNodeId) -> Option<&WireNode> {
        self.nodes.get(&id)
    }

    pub fn wires(&self) -> impl Iterator<Item = (WireId, &WireSegment)> {
        self.wires.iter().map(|(id, wire)| (*id, wire))
    }

    pub fn wire(&self, id: WireId) -> Option<&WireSegment> {
        self.wires.get(&id)
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty() && self.wires.is_empty() && self.nodes.is_empty()
    }

    /// Network from the last build, if no connectivity edit happened since
    pub fn network(&self) -> Option<&Network> {
        self.network.as_ref()
    }

    pub fn terminal_node(&self, id: ComponentId, terminal: usize) -> Option<NodeId> {
        self.network.as_ref()?;
        self.components.get(&id)?.node(terminal)
    }

    /// Published node value at a terminal
    pub fn terminal_signal(&self, id: ComponentId, terminal: usize) -> Option<Signal> {
        let node = self.terminal_node(id, terminal)?;
        self.published.as_ref()?.values.get(node.0).copied()
    }

    pub fn published(&self) -> Option<&Published> {
        self.published.as_ref()
    }

    pub fn status(&self) -> Option<SimulationStatus> {
        self.published.as_ref().map(|p| p.status)
    }

    pub fn properties(&self, id: ComponentId) -> Option<Vec<Property>> {
        self.components.get(&id).map(|slot| slot.component.properties())
    }

    // ---------------------------------------------------------------------
    // Components
    // ---------------------------------------------------------------------

    /// Place a component; ids are allocated in insertion order
    pub fn insert(&mut self, component: Box<dyn Component>, position: Point) -> ComponentId {
        let id = ComponentId(self.next_component);
        self.next_component += 1;
        let terminals = component.terminals().len();
        self.components.insert(
            id,
            ComponentSlot {
                id,
                position,
                rotation: Rotation::default(),
                component,
                nodes: vec![None; terminals],
            },
        );
        self.invalidate_network();
        id
    }

    /// Instantiate a component by registry type id and place it
    pub fn add_component(
        &mut self,
        registry: &ComponentRegistry,
        library: &Library,
        type_id: &str,
        position: Point,
    ) -> Result<ComponentId, EditError> {
        let component = registry.instantiate(type_id, library)?;
        Ok(self.insert(component, position))
    }

    pub fn move_component(&mut self, id: ComponentId, position: Point) -> Result<(), EditError> {
        let slot = self
            .components
            .get_mut(&id)
            .ok_or(EditError::UnknownComponent(id))?;
        slot.position = position;
        self.sync_attachments(id);
        self.invalidate_network();
        Ok(())
    }

    pub fn rotate_component(&mut self, id: ComponentId, rotation: Rotation) -> Result<(), EditError> {
        let slot = self
            .components
            .get_mut(&id)
            .ok_or(EditError::UnknownComponent(id))?;
        let rotation = rotation.normalized();
        if !slot.component.capabilities().rotation.allows(&rotation) {
            return Err(EditError::RotationNotSupported {
                kind: slot.component.kind().to_string(),
                rotation,
            });
        }
        slot.rotation = rotation;
        self.sync_attachments(id);
        self.invalidate_network();
        Ok(())
    }

    /// Remove a component. Wire nodes pinned to it stay where they are,
    /// detached, and are pruned if nothing else holds them.
    pub fn delete_component(&mut self, id: ComponentId) -> Result<(), EditError> {
        self.components
            .remove(&id)
            .ok_or(EditError::UnknownComponent(id))?;
        for node in self.nodes.values_mut() {
            if node.attachment.map(|a| a.component) == Some(id) {
                node.attachment = None;
            }
        }
        self.prune();
        self.invalidate_network();
        Ok(())
    }

    /// Edit a property from text; a rejected value leaves the old one
    pub fn set_property(&mut self, id: ComponentId, name: &str, raw: &str) -> Result<(), EditError> {
        let slot = self
            .components
            .get_mut(&id)
            .ok_or(EditError::UnknownComponent(id))?;
        slot.component.set_property(name, raw)?;
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Wires
    // ---------------------------------------------------------------------

    /// Create a free-standing wire node
    pub fn add_wire_node(&mut self, position: Point) -> WireNodeId {
        let id = WireNodeId(self.next_node);
        self.next_node += 1;
        self.nodes.insert(id, WireNode::new(position));
        id
    }

    /// Pin a wire node to a component terminal; the node moves onto it
    pub fn attach(
        &mut self,
        node: WireNodeId,
        component: ComponentId,
        terminal: usize,
    ) -> Result<(), EditError> {
        let slot = self
            .components
            .get(&component)
            .ok_or(EditError::UnknownComponent(component))?;
        let position = slot
            .terminal_position(terminal)
            .ok_or(EditError::UnknownTerminal { component, terminal })?;
        let wire_node = self
            .nodes
            .get_mut(&node)
            .ok_or(EditError::UnknownWireNode(node))?;
        wire_node.attachment = Some(Attachment { component, terminal });
        wire_node.position = position;
        self.invalidate_network();
        Ok(())
    }

    /// Add a segment between two explicit endpoints
    pub fn connect(
        &mut self,
        from: Endpoint,
        to: Endpoint,
        color: WireColor,
    ) -> Result<WireId, EditError> {
        for node in [from.node(), to.node()].into_iter().flatten() {
            if !self.nodes.contains_key(&node) {
                return Err(EditError::UnknownWireNode(node));
            }
        }
        Ok(self.push_wire(from, to, color))
    }

    /// Draw a wire between two points the way the editor does: each end
    /// snaps onto a terminal, else onto an existing wire node, else gets a
    /// new wire node.
    pub fn draw_wire(&mut self, from: Point, to: Point, color: WireColor) -> WireId {
        let a = self.snap(from);
        let b = self.snap(to);
        self.push_wire(Endpoint::Node(a), Endpoint::Node(b), color)
    }

    /// Store a segment whose node endpoints are known to exist
    pub(crate) fn push_wire(&mut self, from: Endpoint, to: Endpoint, color: WireColor) -> WireId {
        let id = WireId(self.next_wire);
        self.next_wire += 1;
        for node in [from.node(), to.node()].into_iter().flatten() {
            if let Some(n) = self.nodes.get_mut(&node) {
                n.segments.insert(id);
            }
        }
        self.wires.insert(id, WireSegment { from, to, color });
        self.invalidate_network();
        id
    }

    pub fn delete_wire(&mut self, id: WireId) -> Result<(), EditError> {
        let wire = self.wires.remove(&id).ok_or(EditError::UnknownWire(id))?;
        for node in wire.endpoints().iter().filter_map(Endpoint::node) {
            if let Some(n) = self.nodes.get_mut(&node) {
                n.segments.remove(&id);
            }
        }
        self.prune();
        self.invalidate_network();
        Ok(())
    }

    /// Remove a wire node together with every segment touching it
    pub fn delete_wire_node(&mut self, id: WireNodeId) -> Result<(), EditError> {
        let node = self.nodes.remove(&id).ok_or(EditError::UnknownWireNode(id))?;
        for wire_id in node.segments {
            if let Some(wire) = self.wires.remove(&wire_id) {
                for other in wire.endpoints().iter().filter_map(Endpoint::node) {
                    if let Some(n) = self.nodes.get_mut(&other) {
                        n.segments.remove(&wire_id);
                    }
                }
            }
        }
        self.prune();
        self.invalidate_network();
        Ok(())
    }

    /// Remove everything. Ids keep counting up.
    pub fn clear(&mut self) {
        self.components.clear();
        self.nodes.clear();
        self.wires.clear();
        self.invalidate_network();
    }

    // ---------------------------------------------------------------------
    // Simulation bookkeeping
    // ---------------------------------------------------------------------

    pub(crate) fn install_network(&mut self, network: Network) {
        for (slot, nodes) in self.components.values_mut().zip(network.component_nodes()) {
            for (terminal, node) in nodes.iter().enumerate() {
                slot.set_node(terminal, *node);
            }
        }
        self.network = Some(network);
    }

    pub(crate) fn publish(&mut self, published: Published) {
        self.published = Some(published);
    }

    fn invalidate_network(&mut self) {
        self.network = None;
        self.published = None;
        for slot in self.components.values_mut() {
            slot.nodes.iter_mut().for_each(|n| *n = None);
        }
    }

    fn sync_attachments(&mut self, id: ComponentId) {
        let Some(slot) = self.components.get(&id) else {
            return;
        };
        for node in self.nodes.values_mut() {
            if let Some(att) = node.attachment {
                if att.component == id {
                    if let Some(pos) = slot.terminal_position(att.terminal) {
                        node.position = pos;
                    }
                }
            }
        }
    }

    pub(crate) fn prune(&mut self) {
        let before = self.nodes.len();
        self.nodes.retain(|_, node| !node.is_garbage());
        let pruned = before - self.nodes.len();
        if pruned > 0 {
            tracing::debug!("Pruned {} orphaned wire nodes", pruned);
        }
    }

    /// Resolve a drawn endpoint to a wire node
    fn snap(&mut self, point: Point) -> WireNodeId {
        if let Some((component, terminal, position)) = self.nearest_terminal(point) {
            let existing = self.nodes.iter().find_map(|(id, node)| {
                (node.attachment == Some(Attachment { component, terminal })).then_some(*id)
            });
            if let Some(id) = existing {
                return id;
            }
            let id = self.add_wire_node(position);
            if let Some(node) = self.nodes.get_mut(&id) {
                node.attachment = Some(Attachment { component, terminal });
            }
            return id;
        }

        let mut best: Option<(WireNodeId, f64)> = None;
        for (id, node) in &self.nodes {
            let d = node.position.distance_to(&point);
            if d < SNAP_TOLERANCE && best.map_or(true, |(_, bd)| d < bd) {
                best = Some((*id, d));
            }
        }
        match best {
            Some((id, _)) => id,
            None => self.add_wire_node(point),
        }
    }

    fn nearest_terminal(&self, point: Point) -> Option<(ComponentId, usize, Point)> {
        let mut best: Option<(ComponentId, usize, Point, f64)> = None;
        for slot in self.components.values() {
            for terminal in 0..slot.terminal_count() {
                let Some(pos) = slot.terminal_position(terminal) else {
                    continue;
                };
                let d = pos.distance_to(&point);
                if d < SNAP_TOLERANCE && best.map_or(true, |(_, _, _, bd)| d < bd) {
                    best = Some((slot.id, terminal, pos, d));
                }
            }
        }
        best.map(|(id, terminal, pos, _)| (id, terminal, pos))
    }
}
