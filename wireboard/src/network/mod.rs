//! Network Builder
//!
//! Merges component terminals, wire nodes and wire segments into electrical
//! nodes with a disjoint-set forest.
//!
//! Element layout, in this order:
//! 1. one element per connection point, components in insertion order and
//!    terminals in index order
//! 2. one element per wire node, in id order
//! 3. one synthetic element per free segment endpoint
//!
//! Unions come from segments (endpoint to endpoint), attachments (wire node
//! to terminal) and component-internal shorts. Classes that contain at least
//! one connection point get a dense `NodeId`, numbered by their smallest
//! element index, so an unchanged board always gets the same ids.

use std::collections::HashMap;
use std::fmt;

use petgraph::unionfind::UnionFind;
use serde::{Deserialize, Serialize};

use crate::board::{Board, ComponentId, Endpoint, WireNodeId};

/// Electrical node id, dense from zero
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "N{}", self.0)
    }
}

/// Result of one network build
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Network {
    node_count: usize,
    components: Vec<ComponentId>,
    terminal_nodes: Vec<Vec<NodeId>>,
    wire_nodes: Vec<(WireNodeId, Option<NodeId>)>,
}

impl Network {
    pub fn node_count(&self) -> usize {
        self.node_count
    }

    /// Components in the order they were numbered
    pub fn components(&self) -> &[ComponentId] {
        &self.components
    }

    /// Node of every terminal, per component, parallel to `components()`
    pub fn component_nodes(&self) -> &[Vec<NodeId>] {
        &self.terminal_nodes
    }

    pub fn node_of(&self, component: ComponentId, terminal: usize) -> Option<NodeId> {
        let index = self.components.iter().position(|c| *c == component)?;
        self.terminal_nodes.get(index)?.get(terminal).copied()
    }

    /// Node a wire node belongs to, if any connection point shares it
    pub fn wire_node(&self, id: WireNodeId) -> Option<NodeId> {
        self.wire_nodes
            .iter()
            .find(|(w, _)| *w == id)
            .and_then(|(_, n)| *n)
    }

    pub fn same_node(&self, a: (ComponentId, usize), b: (ComponentId, usize)) -> bool {
        match (self.node_of(a.0, a.1), self.node_of(b.0, b.1)) {
            (Some(x), Some(y)) => x == y,
            _ => false,
        }
    }

    /// Every connection point on a node, in element order
    pub fn members(&self, node: NodeId) -> Vec<(ComponentId, usize)> {
        let mut out = Vec::new();
        for (component, nodes) in self.components.iter().zip(&self.terminal_nodes) {
            for (terminal, n) in nodes.iter().enumerate() {
                if *n == node {
                    out.push((*component, terminal));
                }
            }
        }
        out
    }
}

pub struct NetworkBuilder;

impl NetworkBuilder {
    /// Build the network and record node ids on the board's connection points
    pub fn build(board: &mut Board) -> Network {
        let network = Self::compute(board);
        board.install_network(network.clone());
        network
    }

    /// Build the network without touching the board
    pub fn compute(board: &Board) -> Network {
        // Connection point elements
        let mut components = Vec::new();
        let mut terminal_base = HashMap::new();
        let mut terminal_counts = Vec::new();
        let mut next = 0usize;
        for slot in board.components() {
            components.push(slot.id());
            terminal_base.insert(slot.id(), next);
            terminal_counts.push(slot.terminal_count());
            next += slot.terminal_count();
        }
        let terminal_elements = next;

        // Wire node elements
        let mut node_index = HashMap::new();
        let mut wire_node_ids = Vec::new();
        for (id, _) in board.wire_nodes() {
            node_index.insert(id, next);
            wire_node_ids.push(id);
            next += 1;
        }

        // Synthetic elements for free endpoints
        let free_endpoints = board
            .wires()
            .flat_map(|(_, w)| w.endpoints())
            .filter(|e| matches!(e, Endpoint::Free(_)))
            .count();
        let total = next + free_endpoints;

        let mut sets: UnionFind<usize> = UnionFind::new(total);
        let mut unions = 0usize;

        for (_, wire) in board.wires() {
            let mut ends = [0usize; 2];
            for (slot, endpoint) in ends.iter_mut().zip(wire.endpoints()) {
                *slot = match endpoint {
                    Endpoint::Node(id) => match node_index.get(&id) {
                        Some(i) => *i,
                        None => {
                            tracing::warn!("Wire references missing wire node {}", id);
                            let i = next;
                            next += 1;
                            i
                        }
                    },
                    Endpoint::Free(_) => {
                        let i = next;
                        next += 1;
                        i
                    }
                };
            }
            if ends[0] < total && ends[1] < total && sets.union(ends[0], ends[1]) {
                unions += 1;
            }
        }

        for (id, node) in board.wire_nodes() {
            let Some(attachment) = node.attachment else {
                continue;
            };
            let (Some(base), Some(&wire_element)) =
                (terminal_base.get(&attachment.component), node_index.get(&id))
            else {
                continue;
            };
            let count = board
                .component(attachment.component)
                .map_or(0, |slot| slot.terminal_count());
            if attachment.terminal < count && sets.union(wire_element, base + attachment.terminal) {
                unions += 1;
            }
        }

        // Internal shorts: every terminal of a group joins the group's first
        for slot in board.components() {
            let Some(&base) = terminal_base.get(&slot.id()) else {
                continue;
            };
            for group in slot.component().capabilities().shorted {
                let Some((&first, rest)) = group.split_first() else {
                    continue;
                };
                for &other in rest {
                    if first < slot.terminal_count()
                        && other < slot.terminal_count()
                        && sets.union(base + first, base + other)
                    {
                        unions += 1;
                    }
                }
            }
        }

        // Dense relabeling by smallest member index
        let mut label: HashMap<usize, NodeId> = HashMap::new();
        let mut element_node = Vec::with_capacity(terminal_elements);
        for element in 0..terminal_elements {
            let root = sets.find_mut(element);
            let fresh = NodeId(label.len());
            let node = *label.entry(root).or_insert(fresh);
            element_node.push(node);
        }
        let node_count = label.len();

        let mut terminal_nodes = Vec::with_capacity(components.len());
        let mut cursor = 0;
        for count in terminal_counts {
            terminal_nodes.push(element_node[cursor..cursor + count].to_vec());
            cursor += count;
        }

        let wire_nodes = wire_node_ids
            .into_iter()
            .map(|id| {
                let node = node_index
                    .get(&id)
                    .and_then(|&i| label.get(&sets.find_mut(i)).copied());
                (id, node)
            })
            .collect();

        tracing::debug!(
            "Built network: {} connection points, {} wire nodes, {} unions, {} electrical nodes",
            terminal_elements,
            node_index.len(),
            unions,
            node_count
        );

        Network {
            node_count,
            components,
            terminal_nodes,
            wire_nodes,
        }
    }
}
