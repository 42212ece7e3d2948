//! Integration tests for custom components

use std::path::PathBuf;

use wireboard::prelude::*;
use wireboard::{ComponentId, CustomDefinition};

fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn place(board: &mut Board, library: &Library, type_id: &str, x: f64, y: f64) -> ComponentId {
    board
        .add_component(&ComponentRegistry::builtin(), library, type_id, Point::new(x, y))
        .unwrap()
}

fn named(board: &mut Board, library: &Library, type_id: &str, name: &str, x: f64) -> ComponentId {
    let id = place(board, library, type_id, x, 0.0);
    board.set_property(id, "name", name).unwrap();
    id
}

fn wire(board: &mut Board, from: (f64, f64), to: (f64, f64)) {
    board.draw_wire(Point::new(from.0, from.1), Point::new(to.0, to.1), WireColor::default());
}

fn first_of(board: &Board, type_id: &str) -> ComponentId {
    board
        .components()
        .find(|slot| slot.component().kind() == type_id)
        .map(|slot| slot.id())
        .unwrap()
}

/// port_in "a" -> not -> port_out "y"
fn inverter_definition() -> CustomDefinition {
    let library = Library::new();
    let mut board = Board::new();
    named(&mut board, &library, "port_in", "a", 0.0);
    place(&mut board, &library, "not", 4.0, -0.5);
    named(&mut board, &library, "port_out", "y", 10.0);
    wire(&mut board, (2.0, 0.5), (4.0, 0.5));
    wire(&mut board, (7.0, 0.5), (10.0, 0.5));

    CustomDefinition::new(
        "Inverter",
        vec!["a".to_string()],
        vec!["y".to_string()],
        BoardSnapshot::from_board(&board, &library),
    )
}

/// Two inverters in series, wrapped as one custom component
fn double_inverter(library: &Library, inverter: &CustomDefinition) -> CustomDefinition {
    let mut board = Board::new();
    named(&mut board, library, "port_in", "a", 0.0);
    place(&mut board, library, &inverter.type_id(), 4.0, -0.5);
    place(&mut board, library, &inverter.type_id(), 10.0, -0.5);
    named(&mut board, library, "port_out", "y", 16.0);
    wire(&mut board, (2.0, 0.5), (4.0, 0.5));
    wire(&mut board, (8.0, 0.5), (10.0, 0.5));
    wire(&mut board, (14.0, 0.5), (16.0, 0.5));

    CustomDefinition::with_id(
        "double",
        "Double inverter",
        vec!["a".to_string()],
        vec!["y".to_string()],
        BoardSnapshot::from_board(&board, library),
    )
}

/// port_in "a" -> one instance of `inner` -> port_out "y"
fn wrapper(id: &str, library: &Library, inner: &CustomDefinition) -> CustomDefinition {
    let mut board = Board::new();
    named(&mut board, library, "port_in", "a", 0.0);
    place(&mut board, library, &inner.type_id(), 4.0, -0.5);
    named(&mut board, library, "port_out", "y", 10.0);
    wire(&mut board, (2.0, 0.5), (4.0, 0.5));
    wire(&mut board, (8.0, 0.5), (10.0, 0.5));

    CustomDefinition::with_id(
        id,
        id,
        vec!["a".to_string()],
        vec!["y".to_string()],
        BoardSnapshot::from_board(&board, library),
    )
}

/// toggle -> instance -> probe; the instance has one input and one output
fn around_instance(library: &Library, type_id: &str, on: bool) -> (Board, ComponentId, ComponentId) {
    let mut board = Board::new();
    let toggle = place(&mut board, library, "toggle", 0.0, 0.0);
    board.set_property(toggle, "on", &on.to_string()).unwrap();
    place(&mut board, library, type_id, 4.0, 0.0);
    let probe = place(&mut board, library, "probe", 12.0, 0.5);
    wire(&mut board, (2.0, 1.0), (4.0, 1.0));
    wire(&mut board, (8.0, 1.0), (12.0, 1.0));
    (board, toggle, probe)
}

#[test]
fn test_passthrough_reproduces_logic_input() {
    let (mut board, _) = wireboard::load_board(&fixture_path("custom_buffer.json")).unwrap();
    let toggle = first_of(&board, "toggle");
    let probe = first_of(&board, "probe");

    let report = Scheduler::default().run(&mut board);
    assert_eq!(report.status, SimulationStatus::Converged);
    assert_eq!(board.terminal_signal(probe, 0), Some(Signal::HIGH));

    board.set_property(toggle, "on", "false").unwrap();
    Scheduler::default().run(&mut board);
    assert_eq!(board.terminal_signal(probe, 0), Some(Signal::LOW));
}

#[test]
fn test_passthrough_reproduces_floating_input() {
    let (mut board, _) = wireboard::load_board(&fixture_path("custom_buffer.json")).unwrap();
    let toggle = first_of(&board, "toggle");
    let probe = first_of(&board, "probe");
    board.delete_component(toggle).unwrap();

    let report = Scheduler::default().run(&mut board);
    assert_eq!(report.status, SimulationStatus::Converged);
    assert_eq!(board.terminal_signal(probe, 0), Some(Signal::Floating));
    assert_eq!(report.floating_inputs.len(), 2);
}

#[test]
fn test_instance_terminals_follow_port_order() {
    let inverter = inverter_definition();
    let mut library = Library::new();
    library.insert(inverter.clone()).unwrap();

    let mut board = Board::new();
    let id = place(&mut board, &library, &inverter.type_id(), 0.0, 0.0);
    let slot = board.component(id).unwrap();
    let names: Vec<&str> = slot
        .component()
        .terminals()
        .iter()
        .map(|t| t.name.as_str())
        .collect();
    assert_eq!(names, vec!["a", "y"]);
    assert_eq!(slot.component().kind(), inverter.type_id());
}

#[test]
fn test_nested_instances_simulate_recursively() {
    let inverter = inverter_definition();
    let mut inner = Library::new();
    inner.insert(inverter.clone()).unwrap();
    let double = double_inverter(&inner, &inverter);
    assert_eq!(double.board.definitions.len(), 1);

    // flatten through a snapshot the way a loaded file would be
    let mut wrapper = BoardSnapshot::default();
    wrapper.definitions.push(double);
    let library = Library::from_snapshot(&wrapper).unwrap();
    assert_eq!(library.len(), 2);

    for on in [true, false] {
        let (mut board, _, probe) = around_instance(&library, "custom:double", on);
        let report = Scheduler::default().run(&mut board);
        assert_eq!(report.status, SimulationStatus::Converged);
        assert_eq!(board.terminal_signal(probe, 0), Some(Signal::Logic(on)));
    }
}

#[test]
fn test_shared_inner_definition_survives_save_and_reload() {
    let inverter = inverter_definition();
    let mut inner = Library::new();
    inner.insert(inverter.clone()).unwrap();
    let first = wrapper("first", &inner, &inverter);
    let second = wrapper("second", &inner, &inverter);
    assert_eq!(first.board.definitions.len(), 1);

    let mut library = Library::new();
    library.insert(first).unwrap();
    library.insert(second).unwrap();
    assert_eq!(library.len(), 3);

    // toggle -> first -> second -> probe, two inversions in series
    let mut board = Board::new();
    let toggle = place(&mut board, &library, "toggle", 0.0, 0.0);
    board.set_property(toggle, "on", "true").unwrap();
    place(&mut board, &library, "custom:first", 4.0, 0.0);
    place(&mut board, &library, "custom:second", 10.0, 0.0);
    place(&mut board, &library, "probe", 16.0, 0.5);
    wire(&mut board, (2.0, 1.0), (4.0, 1.0));
    wire(&mut board, (8.0, 1.0), (10.0, 1.0));
    wire(&mut board, (14.0, 1.0), (16.0, 1.0));

    let temp_dir = tempfile::TempDir::new().unwrap();
    let path = temp_dir.path().join("shared.json");
    let mut snapshot = BoardSnapshot::from_board(&board, &library);
    assert!(snapshot.definitions.iter().all(|d| d.board.definitions.is_empty()));
    snapshot.save(&path).unwrap();

    let (mut reloaded, reloaded_library) = wireboard::load_board(&path).unwrap();
    assert_eq!(reloaded_library.len(), 3);
    let report = Scheduler::default().run(&mut reloaded);
    assert_eq!(report.status, SimulationStatus::Converged);
    assert_eq!(
        reloaded.terminal_signal(first_of(&reloaded, "probe"), 0),
        Some(Signal::HIGH)
    );

    // saving the reloaded board again gives the same content
    let again = BoardSnapshot::from_board(&reloaded, &reloaded_library);
    assert!(again.same_content(&snapshot));
}

#[test]
fn test_conflicting_definition_copies_rejected() {
    let inverter = inverter_definition();
    let mut renamed = inverter.clone();
    renamed.name = "Not quite an inverter".to_string();

    let mut library = Library::new();
    library.insert(inverter).unwrap();
    let err = library.insert(renamed.clone()).unwrap_err();
    assert_eq!(err, BuildError::DuplicateDefinition(renamed.id));
}

#[test]
fn test_self_nesting_rejected() {
    let err = wireboard::load_board(&fixture_path("self_nesting.json")).unwrap_err();
    match err {
        WireboardError::Build(BuildError::CyclicDefinition { chain }) => {
            assert_eq!(chain, vec!["loop".to_string(), "loop".to_string()]);
        }
        other => panic!("expected a cyclic definition error, got {other}"),
    }
}

#[test]
fn test_mutual_nesting_rejected() {
    let holding = |id: &str, inner: &str| {
        let mut board = BoardSnapshot::default();
        board.components.push(wireboard::snapshot::ComponentRecord {
            type_id: format!("custom:{inner}"),
            position: Point::new(0.0, 0.0),
            rotation: Default::default(),
            properties: Default::default(),
        });
        CustomDefinition::with_id(id, id, vec![], vec![], board)
    };
    let mut library = Library::new();
    library.insert(holding("a", "b")).unwrap();
    library.insert(holding("b", "a")).unwrap();

    let err = ComponentRegistry::builtin()
        .instantiate("custom:a", &library)
        .unwrap_err();
    assert_eq!(
        err,
        BuildError::CyclicDefinition {
            chain: vec!["a".to_string(), "b".to_string(), "a".to_string()]
        }
    );
}

#[test]
fn test_unknown_definition_rejected() {
    let err = ComponentRegistry::builtin()
        .instantiate("custom:missing", &Library::new())
        .unwrap_err();
    assert_eq!(err, BuildError::UnknownDefinition("missing".to_string()));
}

#[test]
fn test_session_adds_custom_instances() {
    let inverter = inverter_definition();
    let type_id = inverter.type_id();
    let mut library = Library::new();
    library.insert(inverter).unwrap();

    let mut session = Session::new(Board::new(), SimulationOptions::default()).with_library(library);
    for (type_id, x, y) in [("toggle", 0.0, 0.0), (type_id.as_str(), 4.0, 0.0), ("probe", 12.0, 0.5)] {
        session.submit(Edit::AddComponent {
            type_id: type_id.to_string(),
            position: Point::new(x, y),
        });
    }
    for (from, to) in [((2.0, 1.0), (4.0, 1.0)), ((8.0, 1.0), (12.0, 1.0))] {
        session.submit(Edit::DrawWire {
            from: Point::new(from.0, from.1),
            to: Point::new(to.0, to.1),
            color: WireColor::default(),
        });
    }

    let report = session.run().unwrap();
    assert!(report.rejected.is_empty());
    let probe = report.added[2];
    assert_eq!(session.board().terminal_signal(probe, 0), Some(Signal::HIGH));
}
