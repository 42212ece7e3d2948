//! Integration tests for the simulation scheduler

use std::path::PathBuf;

use wireboard::components::properties::find;
use wireboard::prelude::*;
use wireboard::sim::{FloatingInput, SchedulerState};
use wireboard::{ComponentId, PropertyValue};

fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn add(board: &mut Board, registry: &ComponentRegistry, type_id: &str, x: f64, y: f64) -> ComponentId {
    board
        .add_component(registry, &Library::new(), type_id, Point::new(x, y))
        .unwrap()
}

fn wire(board: &mut Board, from: (f64, f64), to: (f64, f64)) {
    board.draw_wire(Point::new(from.0, from.1), Point::new(to.0, to.1), WireColor::default());
}

fn property(board: &Board, id: ComponentId, name: &str) -> PropertyValue {
    let props = board.properties(id).unwrap();
    find(&props, name).unwrap().value.clone()
}

/// Toggle followed by `length` inverters in a row and a probe at the end.
fn inverter_chain(length: usize, on: bool) -> (Board, ComponentId) {
    let (mut board, _) = bare_inverter_chain(length, on);
    let registry = ComponentRegistry::builtin();
    let x = 4.0 + 5.0 * length as f64;
    let probe = add(&mut board, &registry, "probe", x, 0.5);
    wire(&mut board, (x - 2.0, 1.0), (x, 1.0));
    (board, probe)
}

/// Toggle followed by `length` inverters, nothing reading the last output.
/// Returns the last inverter, or the toggle when `length` is zero.
fn bare_inverter_chain(length: usize, on: bool) -> (Board, ComponentId) {
    let registry = ComponentRegistry::builtin();
    let mut board = Board::new();
    let toggle = add(&mut board, &registry, "toggle", 0.0, 0.0);
    board.set_property(toggle, "on", if on { "true" } else { "false" }).unwrap();

    // toggle out at (2, 1); inverter k sits at x = 4 + 5k with in/out at
    // (x, 1) and (x + 3, 1)
    let column = |k: usize| 4.0 + 5.0 * k as f64;
    let mut last = toggle;
    for k in 0..length {
        last = add(&mut board, &registry, "not", column(k), 0.0);
    }

    for k in 0..length {
        let from = if k == 0 { 2.0 } else { column(k - 1) + 3.0 };
        wire(&mut board, (from, 1.0), (column(k), 1.0));
    }
    (board, last)
}

#[test]
fn test_combinational_chain_converges_within_component_count() {
    for length in [1, 4, 9, 16] {
        let (mut board, probe) = inverter_chain(length, true);
        let report = Scheduler::default().run(&mut board);

        assert_eq!(report.status, SimulationStatus::Converged);
        assert!(
            report.passes <= board.component_count(),
            "{} passes for {} components",
            report.passes,
            board.component_count()
        );
        let expected = if length % 2 == 0 { Signal::HIGH } else { Signal::LOW };
        assert_eq!(board.terminal_signal(probe, 0), Some(expected));
    }
}

#[test]
fn test_chain_without_sink_converges_within_component_count() {
    for length in [0, 1, 2, 7] {
        let (mut board, last) = bare_inverter_chain(length, false);
        let report = Scheduler::default().run(&mut board);

        assert_eq!(report.status, SimulationStatus::Converged);
        assert!(
            report.passes <= board.component_count(),
            "{} passes for {} components",
            report.passes,
            board.component_count()
        );
        let terminal = if length == 0 { 0 } else { 1 };
        let expected = if length % 2 == 0 { Signal::LOW } else { Signal::HIGH };
        assert_eq!(board.terminal_signal(last, terminal), Some(expected));
    }
}

#[test]
fn test_repeated_runs_are_identical() {
    let (mut board, _) = inverter_chain(5, false);
    let mut scheduler = Scheduler::default();

    let first = scheduler.run(&mut board);
    let first_values = board.published().unwrap().values.clone();
    let second = scheduler.run(&mut board);

    assert_eq!(first, second);
    assert_eq!(board.published().unwrap().values, first_values);
    assert_eq!(scheduler.state(), SchedulerState::Idle);
}

#[test]
fn test_oscillator_stalls_at_bound() {
    let core = WireboardCore::new(SimulationOptions {
        max_passes: 40,
        ..SimulationOptions::default()
    });
    let summary = core.simulate_file(&fixture_path("oscillator.json")).unwrap();

    assert_eq!(summary.report.status, SimulationStatus::Stalled);
    assert_eq!(summary.report.passes, 40);
    assert!(!summary.is_stable());
}

#[test]
fn test_lamp_lights_through_closed_switch() {
    let (mut board, _) = wireboard::load_board(&fixture_path("lamp_circuit.json")).unwrap();
    let ids: Vec<ComponentId> = board.components().map(|s| s.id()).collect();
    let (switch, lamp) = (ids[1], ids[2]);

    let report = Scheduler::default().run(&mut board);
    assert_eq!(report.status, SimulationStatus::Converged);
    assert_eq!(property(&board, lamp, "lit"), PropertyValue::Bool(true));
    let amps = property(&board, lamp, "current").as_float().unwrap();
    assert!((amps - 0.05).abs() < 1e-12);
    let through_switch = property(&board, switch, "current").as_float().unwrap();
    assert!((through_switch - 0.05).abs() < 1e-12);

    // opening the switch leaves the lamp dark
    board.set_property(switch, "closed", "false").unwrap();
    Scheduler::default().run(&mut board);
    assert_eq!(property(&board, lamp, "lit"), PropertyValue::Bool(false));
    assert_eq!(property(&board, switch, "current"), PropertyValue::Float(0.0));
}

#[test]
fn test_relay_follows_coil() {
    let registry = ComponentRegistry::builtin();
    let mut board = Board::new();
    let coil = add(&mut board, &registry, "toggle", 0.0, 10.0);
    let battery = add(&mut board, &registry, "battery", 0.0, 0.0);
    let relay = add(&mut board, &registry, "relay", 4.0, 0.0);
    let probe = add(&mut board, &registry, "probe", 12.0, 0.0);

    let relay_slot = board.component(relay).unwrap();
    let com = relay_slot.terminal_position(0).unwrap();
    let no = relay_slot.terminal_position(1).unwrap();
    let coil_in = relay_slot.terminal_position(2).unwrap();
    let battery_pos = board.component(battery).unwrap().terminal_position(0).unwrap();
    let probe_in = board.component(probe).unwrap().terminal_position(0).unwrap();
    let toggle_out = board.component(coil).unwrap().terminal_position(0).unwrap();

    board.draw_wire(battery_pos, com, WireColor::default());
    board.draw_wire(no, probe_in, WireColor::default());
    board.draw_wire(toggle_out, coil_in, WireColor::default());

    Scheduler::default().run(&mut board);
    assert_eq!(board.terminal_signal(probe, 0), Some(Signal::Floating));
    assert_eq!(property(&board, relay, "closed"), PropertyValue::Bool(false));

    board.set_property(coil, "on", "true").unwrap();
    let report = Scheduler::default().run(&mut board);
    assert_eq!(report.status, SimulationStatus::Converged);
    assert_eq!(board.terminal_signal(probe, 0), Some(Signal::Voltage(5.0)));
    assert_eq!(property(&board, relay, "closed"), PropertyValue::Bool(true));
}

#[test]
fn test_gate_reads_floating_input_as_low() {
    let registry = ComponentRegistry::builtin();
    let mut board = Board::new();
    let gate = add(&mut board, &registry, "nor", 0.0, 0.0);
    let probe = add(&mut board, &registry, "probe", 6.0, 0.5);
    wire(&mut board, (3.0, 1.0), (6.0, 1.0));

    let report = Scheduler::default().run(&mut board);
    assert_eq!(board.terminal_signal(probe, 0), Some(Signal::HIGH));
    assert_eq!(
        report.floating_inputs,
        vec![
            FloatingInput { component: gate, terminal: 0 },
            FloatingInput { component: gate, terminal: 1 },
        ]
    );
}

#[test]
fn test_voltmeter_reads_battery() {
    let registry = ComponentRegistry::builtin();
    let mut board = Board::new();
    let battery = add(&mut board, &registry, "battery", 0.0, 0.0);
    board.set_property(battery, "voltage", "9").unwrap();
    let meter = add(&mut board, &registry, "voltmeter", 6.0, 0.0);

    let pos = board.component(battery).unwrap().terminal_position(0).unwrap();
    let neg = board.component(battery).unwrap().terminal_position(1).unwrap();
    let plus = board.component(meter).unwrap().terminal_position(0).unwrap();
    let minus = board.component(meter).unwrap().terminal_position(1).unwrap();
    board.draw_wire(pos, plus, WireColor::default());
    board.draw_wire(neg, minus, WireColor::default());

    Scheduler::default().run(&mut board);
    assert_eq!(property(&board, meter, "voltage"), PropertyValue::Float(9.0));
}

#[test]
fn test_property_edit_error_keeps_value() {
    let registry = ComponentRegistry::builtin();
    let mut board = Board::new();
    let battery = add(&mut board, &registry, "battery", 0.0, 0.0);

    let err = board.set_property(battery, "voltage", "nine").unwrap_err();
    assert!(matches!(err, wireboard::EditError::Property(_)));
    assert_eq!(property(&board, battery, "voltage"), PropertyValue::Float(5.0));
}

#[test]
fn test_session_applies_edits_between_cycles() {
    let mut session = Session::new(Board::new(), SimulationOptions::default());
    session.submit(Edit::AddComponent {
        type_id: "toggle".to_string(),
        position: Point::new(0.0, 0.0),
    });
    session.submit(Edit::AddComponent {
        type_id: "probe".to_string(),
        position: Point::new(10.0, 0.5),
    });
    let report = session.run().unwrap();
    let probe = report.added[1];
    assert_eq!(session.board().terminal_signal(probe, 0), Some(Signal::Floating));

    session.submit(Edit::DrawWire {
        from: Point::new(2.0, 1.0),
        to: Point::new(10.0, 1.0),
        color: WireColor::default(),
    });
    session.submit(Edit::SetProperty {
        id: report.added[0],
        name: "on".to_string(),
        value: "yes".to_string(),
    });
    let report = session.run().unwrap();
    assert!(report.rejected.is_empty());
    assert_eq!(session.board().terminal_signal(probe, 0), Some(Signal::HIGH));

    session.submit(Edit::Clear);
    let report = session.run().unwrap();
    assert_eq!(report.simulation.node_count, 0);
    assert!(session.board().is_empty());
}
