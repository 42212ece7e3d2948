//! Snapshot <-> board conversion

use std::collections::HashMap;

use super::{
    AttachmentRecord, BoardSnapshot, BuildError, ComponentRecord, EndpointRecord, Library,
    NodeRecord, WireRecord, FORMAT_VERSION,
};
use crate::board::{Board, ComponentId, Endpoint, WireNodeId};
use crate::components::ComponentRegistry;

impl BoardSnapshot {
    /// Export a board together with the whole library, flattened. Components,
    /// wire nodes and wires keep their insertion order and are renumbered
    /// densely.
    pub fn from_board(board: &Board, library: &Library) -> Self {
        let mut snapshot = Self::export(board);
        snapshot.definitions = library.to_vec();
        snapshot
    }

    /// Like [`from_board`](Self::from_board), but keeps only the definitions
    /// the board instantiates, directly or through other definitions
    pub fn from_board_pruned(board: &Board, library: &Library) -> Self {
        let mut snapshot = Self::export(board);
        snapshot.definitions = library.used_by(board);
        snapshot
    }

    fn export(board: &Board) -> Self {
        let component_index: HashMap<ComponentId, usize> = board
            .components()
            .enumerate()
            .map(|(i, slot)| (slot.id(), i))
            .collect();
        let node_index: HashMap<WireNodeId, usize> = board
            .wire_nodes()
            .enumerate()
            .map(|(i, (id, _))| (id, i))
            .collect();

        let components = board
            .components()
            .map(|slot| ComponentRecord {
                type_id: slot.component().kind().to_string(),
                position: slot.position(),
                rotation: slot.rotation(),
                properties: slot
                    .component()
                    .properties()
                    .into_iter()
                    .filter(|p| p.editable)
                    .map(|p| (p.name.to_string(), p.value))
                    .collect(),
            })
            .collect();

        let nodes = board
            .wire_nodes()
            .map(|(_, node)| NodeRecord {
                position: node.position,
                attachment: node.attachment.and_then(|a| {
                    component_index.get(&a.component).map(|&component| AttachmentRecord {
                        component,
                        terminal: a.terminal,
                    })
                }),
            })
            .collect();

        let endpoint = |e: Endpoint| match e {
            Endpoint::Free(p) => Some(EndpointRecord::Free(p)),
            Endpoint::Node(id) => node_index.get(&id).map(|&i| EndpointRecord::Node(i)),
        };
        let wires = board
            .wires()
            .filter_map(|(_, wire)| {
                Some(WireRecord {
                    from: endpoint(wire.from)?,
                    to: endpoint(wire.to)?,
                    color: wire.color.clone(),
                })
            })
            .collect();

        Self {
            metadata: Default::default(),
            components,
            nodes,
            wires,
            definitions: Vec::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.metadata.name = name.into();
        self
    }

    /// Collect the snapshot's own definitions, then materialize the board
    pub fn build(&self, registry: &ComponentRegistry) -> Result<(Board, Library), BuildError> {
        let library = Library::from_snapshot(self)?;
        let board = self.materialize(registry, &library)?;
        Ok((board, library))
    }

    /// Materialize the board, resolving custom components through `library`
    pub fn materialize(
        &self,
        registry: &ComponentRegistry,
        library: &Library,
    ) -> Result<Board, BuildError> {
        self.materialize_nested(registry, library, &mut Vec::new())
    }

    pub(crate) fn materialize_nested(
        &self,
        registry: &ComponentRegistry,
        library: &Library,
        chain: &mut Vec<String>,
    ) -> Result<Board, BuildError> {
        if self.metadata.format_version != FORMAT_VERSION {
            return Err(BuildError::UnsupportedVersion(
                self.metadata.format_version.clone(),
            ));
        }

        let mut board = Board::new();

        let mut ids = Vec::with_capacity(self.components.len());
        for (index, record) in self.components.iter().enumerate() {
            let mut component = registry.instantiate_nested(&record.type_id, library, chain)?;
            for (name, value) in &record.properties {
                component
                    .set_property(name, &value.to_text())
                    .map_err(|source| BuildError::InvalidProperty {
                        component: index,
                        name: name.clone(),
                        source,
                    })?;
            }
            let id = board.insert(component, record.position);
            board
                .rotate_component(id, record.rotation)
                .map_err(|_| BuildError::InvalidRotation {
                    component: index,
                    type_id: record.type_id.clone(),
                })?;
            ids.push(id);
        }

        let mut node_ids = Vec::with_capacity(self.nodes.len());
        for record in &self.nodes {
            let node = board.add_wire_node(record.position);
            if let Some(attachment) = record.attachment {
                let component = *ids.get(attachment.component).ok_or(BuildError::ComponentIndex {
                    index: attachment.component,
                    count: ids.len(),
                })?;
                board
                    .attach(node, component, attachment.terminal)
                    .map_err(|_| BuildError::TerminalIndex {
                        component: attachment.component,
                        terminal: attachment.terminal,
                    })?;
            }
            node_ids.push(node);
        }

        let resolve = |record: EndpointRecord| match record {
            EndpointRecord::Free(p) => Ok(Endpoint::Free(p)),
            EndpointRecord::Node(index) => node_ids
                .get(index)
                .map(|id| Endpoint::Node(*id))
                .ok_or(BuildError::NodeIndex {
                    index,
                    count: node_ids.len(),
                }),
        };
        let mut segments = Vec::with_capacity(self.wires.len());
        for wire in &self.wires {
            segments.push((resolve(wire.from)?, resolve(wire.to)?, wire.color.clone()));
        }
        for (from, to, color) in segments {
            board.push_wire(from, to, color);
        }
        board.prune();

        tracing::debug!(
            "Materialized board: {} components, {} wire nodes, {} wires (depth {})",
            board.component_count(),
            board.wire_nodes().count(),
            board.wires().count(),
            chain.len()
        );
        Ok(board)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::WireColor;
    use crate::geometry::{Point, Rotation};
    use crate::network::NetworkBuilder;
    use std::collections::BTreeMap;

    fn record(type_id: &str, x: f64, y: f64) -> ComponentRecord {
        ComponentRecord {
            type_id: type_id.to_string(),
            position: Point::new(x, y),
            rotation: Rotation::default(),
            properties: BTreeMap::new(),
        }
    }

    #[test]
    fn test_export_then_materialize_keeps_network() {
        let registry = ComponentRegistry::builtin();
        let library = Library::new();
        let mut board = Board::new();
        let toggle = board
            .add_component(&registry, &library, "toggle", Point::new(0.0, 0.0))
            .unwrap();
        board.set_property(toggle, "on", "true").unwrap();
        board
            .add_component(&registry, &library, "probe", Point::new(10.0, 0.5))
            .unwrap();
        board.draw_wire(Point::new(2.0, 1.0), Point::new(10.0, 1.0), WireColor::from("red"));

        let snapshot = BoardSnapshot::from_board(&board, &library);
        assert_eq!(snapshot.components[0].properties.len(), 1);
        assert_eq!(snapshot.nodes.len(), 2);
        assert_eq!(snapshot.wires[0].from, EndpointRecord::Node(0));

        let mut rebuilt = snapshot.materialize(&registry, &library).unwrap();
        assert_eq!(
            NetworkBuilder::build(&mut board),
            NetworkBuilder::build(&mut rebuilt)
        );
        assert!(BoardSnapshot::from_board(&rebuilt, &library).same_content(&snapshot));
    }

    #[test]
    fn test_dangling_node_index() {
        let mut snapshot = BoardSnapshot::default();
        snapshot.components.push(record("toggle", 0.0, 0.0));
        snapshot.wires.push(WireRecord {
            from: EndpointRecord::Node(3),
            to: EndpointRecord::Free(Point::new(1.0, 1.0)),
            color: WireColor::default(),
        });
        let err = snapshot
            .materialize(&ComponentRegistry::builtin(), &Library::new())
            .unwrap_err();
        assert_eq!(err, BuildError::NodeIndex { index: 3, count: 0 });
    }

    #[test]
    fn test_attachment_out_of_range() {
        let mut snapshot = BoardSnapshot::default();
        snapshot.components.push(record("probe", 0.0, 0.0));
        snapshot.nodes.push(NodeRecord {
            position: Point::new(0.0, 0.5),
            attachment: Some(AttachmentRecord { component: 0, terminal: 4 }),
        });
        let err = snapshot
            .materialize(&ComponentRegistry::builtin(), &Library::new())
            .unwrap_err();
        assert_eq!(err, BuildError::TerminalIndex { component: 0, terminal: 4 });
    }

    #[test]
    fn test_invalid_stored_property() {
        let mut snapshot = BoardSnapshot::default();
        let mut battery = record("battery", 0.0, 0.0);
        battery
            .properties
            .insert("voltage".to_string(), crate::components::PropertyValue::Text("high".to_string()));
        snapshot.components.push(battery);

        let err = snapshot
            .materialize(&ComponentRegistry::builtin(), &Library::new())
            .unwrap_err();
        assert!(matches!(err, BuildError::InvalidProperty { component: 0, .. }));
    }

    #[test]
    fn test_unsupported_rotation() {
        let mut snapshot = BoardSnapshot::default();
        let mut gate = record("and", 0.0, 0.0);
        gate.rotation = Rotation::Free(45.0);
        snapshot.components.push(gate);

        let err = snapshot
            .materialize(&ComponentRegistry::builtin(), &Library::new())
            .unwrap_err();
        assert_eq!(
            err,
            BuildError::InvalidRotation {
                component: 0,
                type_id: "and".to_string()
            }
        );
    }
}
