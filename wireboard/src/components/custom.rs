//! Custom Component Adapter
//!
//! Wraps a materialized copy of a custom definition's board and exposes it
//! as an ordinary component: one terminal per definition port, inputs first,
//! then outputs.
//!
//! Every update binds the values seen at the input terminals onto the
//! matching internal `port_in` components, runs a complete scheduler cycle on
//! the internal board (network build included), and drives the values found
//! at the internal `port_out` components back out.

use super::properties::{self, Property, PropertyError, PropertyValue};
use super::registry::{ComponentRegistry, CUSTOM_PREFIX};
use super::{
    BoundaryPort, Capabilities, Component, PortDirection, Readout, SwitchLike, Terminal,
    TerminalIo,
};
use crate::board::{Board, ComponentId};
use crate::core::SimulationOptions;
use crate::geometry::{RotationMode, Size};
use crate::signal::Signal;
use crate::sim::{Scheduler, SimulationStatus};
use crate::snapshot::{BuildError, CustomDefinition, Library};

#[derive(Debug)]
pub struct CustomInstance {
    type_id: String,
    definition_id: String,
    name: String,
    terminals: Vec<Terminal>,
    board: Board,
    scheduler: Scheduler,
    inputs: Vec<ComponentId>,
    outputs: Vec<ComponentId>,
    status: Option<SimulationStatus>,
    passes: usize,
}

impl CustomInstance {
    /// Materialize an instance of `definition_id`.
    ///
    /// `chain` lists the definitions already being materialized further up
    /// the stack; meeting one of them again is a nesting cycle.
    pub(crate) fn materialize(
        registry: &ComponentRegistry,
        library: &Library,
        definition_id: &str,
        chain: &mut Vec<String>,
    ) -> Result<Self, BuildError> {
        if chain.iter().any(|id| id == definition_id) {
            let mut cycle = chain.clone();
            cycle.push(definition_id.to_string());
            return Err(BuildError::CyclicDefinition { chain: cycle });
        }
        let definition = library
            .get(definition_id)
            .ok_or_else(|| BuildError::UnknownDefinition(definition_id.to_string()))?;

        chain.push(definition_id.to_string());
        let board = definition.board.materialize_nested(registry, library, chain);
        chain.pop();
        let mut board = board?;

        let inputs = definition
            .inputs
            .iter()
            .map(|port| find_port(&mut board, definition, port, PortDirection::Input))
            .collect::<Result<Vec<_>, _>>()?;
        let outputs = definition
            .outputs
            .iter()
            .map(|port| find_port(&mut board, definition, port, PortDirection::Output))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            type_id: format!("{}{}", CUSTOM_PREFIX, definition.id),
            definition_id: definition.id.clone(),
            name: definition.name.clone(),
            terminals: exposed_terminals(definition),
            board,
            scheduler: Scheduler::default(),
            inputs,
            outputs,
            status: None,
            passes: 0,
        })
    }

    pub fn definition_id(&self) -> &str {
        &self.definition_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The internal board, with the values of the last inner cycle
    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn last_status(&self) -> Option<SimulationStatus> {
        self.status
    }
}

fn exposed_terminals(definition: &CustomDefinition) -> Vec<Terminal> {
    let column = |names: &[String], x: f64, direction: PortDirection| -> Vec<Terminal> {
        let n = names.len() as f64;
        names
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let y = (i as f64 + 1.0) / (n + 1.0);
                Terminal::new(name.clone(), x, y, direction.role())
            })
            .collect()
    };
    let mut terminals = column(&definition.inputs, 0.0, PortDirection::Input);
    terminals.extend(column(&definition.outputs, 1.0, PortDirection::Output));
    terminals
}

/// First boundary component of the given direction whose name matches
fn find_port(
    board: &mut Board,
    definition: &CustomDefinition,
    port: &str,
    direction: PortDirection,
) -> Result<ComponentId, BuildError> {
    let ids: Vec<ComponentId> = board.components().map(|slot| slot.id()).collect();
    for id in ids {
        let Some(slot) = board.component_mut(id) else {
            continue;
        };
        if let Some(boundary) = slot.component_mut().boundary() {
            if boundary.direction() == direction && boundary.port_name() == port {
                return Ok(id);
            }
        }
    }
    Err(BuildError::MissingPort {
        definition: definition.id.clone(),
        port: port.to_string(),
    })
}

impl Component for CustomInstance {
    fn kind(&self) -> &str {
        &self.type_id
    }

    fn footprint(&self) -> Size {
        let rows = self.inputs.len().max(self.outputs.len()) + 1;
        Size::new(4.0, rows as f64)
    }

    fn terminals(&self) -> &[Terminal] {
        &self.terminals
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            rotation: RotationMode::Quarter,
            logic_only: false,
            shorted: &[],
            resistance: None,
        }
    }

    fn before_simulation(&mut self, options: &SimulationOptions) {
        self.scheduler.set_options(options.clone());
    }

    fn update(&mut self, io: &mut TerminalIo<'_>) {
        for (index, id) in self.inputs.iter().enumerate() {
            if let Some(port) = self
                .board
                .component_mut(*id)
                .and_then(|slot| slot.component_mut().boundary())
            {
                port.bind(io.read(index));
            }
        }

        let report = self.scheduler.run(&mut self.board);
        self.status = Some(report.status);
        self.passes = report.passes;

        let offset = self.inputs.len();
        for (index, id) in self.outputs.iter().enumerate() {
            let value = self.board.terminal_signal(*id, 0).unwrap_or(Signal::Floating);
            io.drive(offset + index, value);
        }
    }

    fn after_simulation(&mut self, _readout: &Readout<'_>) {}

    fn properties(&self) -> Vec<Property> {
        let status = match self.status {
            None => "idle",
            Some(SimulationStatus::Converged) => "converged",
            Some(SimulationStatus::Stalled) => "stalled",
        };
        vec![
            Property::computed("definition", PropertyValue::Text(self.name.clone())),
            Property::computed("status", PropertyValue::Text(status.to_string())).hidden(),
            Property::computed("passes", PropertyValue::Float(self.passes as f64)).hidden(),
        ]
    }

    fn set_property(&mut self, name: &str, _raw: &str) -> Result<(), PropertyError> {
        Err(properties::rejected(name, &["definition", "status", "passes"]))
    }

    fn switch_like(&mut self) -> Option<&mut dyn SwitchLike> {
        None
    }

    fn boundary(&mut self) -> Option<&mut dyn BoundaryPort> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::WireColor;
    use crate::geometry::Point;
    use crate::snapshot::BoardSnapshot;

    fn inverter() -> CustomDefinition {
        let registry = ComponentRegistry::builtin();
        let library = Library::new();
        let mut board = Board::new();
        let a = board
            .add_component(&registry, &library, "port_in", Point::new(0.0, 0.0))
            .unwrap();
        board.set_property(a, "name", "a").unwrap();
        board
            .add_component(&registry, &library, "not", Point::new(4.0, -0.5))
            .unwrap();
        let y = board
            .add_component(&registry, &library, "port_out", Point::new(10.0, 0.0))
            .unwrap();
        board.set_property(y, "name", "y").unwrap();
        // port_in out (2, 0.5) -> not in (4, 0.5); not out (7, 0.5) -> port_out in (10, 0.5)
        board.draw_wire(Point::new(2.0, 0.5), Point::new(4.0, 0.5), WireColor::default());
        board.draw_wire(Point::new(7.0, 0.5), Point::new(10.0, 0.5), WireColor::default());

        CustomDefinition::with_id(
            "inv",
            "Inverter",
            vec!["a".to_string()],
            vec!["y".to_string()],
            BoardSnapshot::from_board(&board, &library),
        )
    }

    #[test]
    fn test_instance_inverts() {
        let mut library = Library::new();
        library.insert(inverter()).unwrap();
        let registry = ComponentRegistry::builtin();

        let mut instance =
            CustomInstance::materialize(&registry, &library, "inv", &mut Vec::new()).unwrap();
        assert_eq!(instance.kind(), "custom:inv");
        assert_eq!(instance.terminals().len(), 2);

        let mut drives = [Signal::Floating; 2];
        instance.update(&mut TerminalIo::new(&[Signal::HIGH, Signal::Floating], &mut drives));
        assert_eq!(drives[1], Signal::LOW);
        assert_eq!(instance.last_status(), Some(SimulationStatus::Converged));

        instance.update(&mut TerminalIo::new(&[Signal::LOW, Signal::Floating], &mut drives));
        assert_eq!(drives[1], Signal::HIGH);
    }

    #[test]
    fn test_missing_port_is_structural() {
        let mut definition = inverter();
        definition.outputs = vec!["q".to_string()];
        let mut library = Library::new();
        library.insert(definition).unwrap();

        let err = CustomInstance::materialize(
            &ComponentRegistry::builtin(),
            &library,
            "inv",
            &mut Vec::new(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            BuildError::MissingPort {
                definition: "inv".to_string(),
                port: "q".to_string()
            }
        );
    }
}
