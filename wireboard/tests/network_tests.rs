//! Integration tests for the network builder

use petgraph::algo::has_path_connecting;
use petgraph::graph::UnGraph;
use proptest::prelude::*;
use wireboard::components::{Jumper, Probe};
use wireboard::prelude::*;
use wireboard::{ComponentId, Endpoint, NodeId, WireNodeId};

/// Probes spread far apart, each with a wire node pinned to its terminal,
/// followed by `free` unattached wire nodes.
fn board_with_nodes(probes: usize, free: usize) -> (Board, Vec<ComponentId>, Vec<WireNodeId>) {
    let mut board = Board::new();
    let mut ids = Vec::new();
    let mut nodes = Vec::new();
    for i in 0..probes {
        let id = board.insert(Box::new(Probe::new()), Point::new(i as f64 * 10.0, 0.0));
        let node = board.add_wire_node(Point::new(i as f64 * 10.0, 0.5));
        board.attach(node, id, 0).unwrap();
        ids.push(id);
        nodes.push(node);
    }
    for j in 0..free {
        nodes.push(board.add_wire_node(Point::new(j as f64 * 10.0, 50.0)));
    }
    (board, ids, nodes)
}

proptest! {
    #[test]
    fn prop_nodes_match_reachability(
        probes in 2usize..8,
        free in 0usize..6,
        raw_edges in prop::collection::vec((0usize..64, 0usize..64), 0..20),
    ) {
        let (mut board, ids, nodes) = board_with_nodes(probes, free);
        let total = nodes.len();

        let mut reference: UnGraph<(), ()> = UnGraph::new_undirected();
        let vertices: Vec<_> = (0..total).map(|_| reference.add_node(())).collect();
        for (a, b) in raw_edges {
            let (a, b) = (a % total, b % total);
            board
                .connect(Endpoint::Node(nodes[a]), Endpoint::Node(nodes[b]), WireColor::default())
                .unwrap();
            reference.add_edge(vertices[a], vertices[b], ());
        }

        let network = NetworkBuilder::build(&mut board);
        for i in 0..probes {
            for j in 0..probes {
                let connected = has_path_connecting(&reference, vertices[i], vertices[j], None);
                prop_assert_eq!(network.same_node((ids[i], 0), (ids[j], 0)), connected);
            }
        }
    }

    #[test]
    fn prop_rebuild_is_deterministic(
        probes in 1usize..6,
        raw_edges in prop::collection::vec((0usize..32, 0usize..32), 0..12),
    ) {
        let (mut board, _, nodes) = board_with_nodes(probes, 3);
        for (a, b) in raw_edges {
            let (a, b) = (a % nodes.len(), b % nodes.len());
            board
                .connect(Endpoint::Node(nodes[a]), Endpoint::Node(nodes[b]), WireColor::default())
                .unwrap();
        }

        let first = NetworkBuilder::build(&mut board);
        let second = NetworkBuilder::build(&mut board);
        prop_assert_eq!(&first, &second);
        prop_assert!(first.node_count() <= probes);
    }
}

#[test]
fn test_node_ids_are_dense_and_ordered() {
    let (mut board, ids, nodes) = board_with_nodes(3, 0);
    // join the last probe to the first
    board
        .connect(Endpoint::Node(nodes[2]), Endpoint::Node(nodes[0]), WireColor::default())
        .unwrap();

    let network = NetworkBuilder::build(&mut board);
    assert_eq!(network.node_count(), 2);
    assert_eq!(network.node_of(ids[0], 0), Some(NodeId(0)));
    assert_eq!(network.node_of(ids[1], 0), Some(NodeId(1)));
    assert_eq!(network.node_of(ids[2], 0), Some(NodeId(0)));
}

#[test]
fn test_deleting_wire_node_splits_nodes() {
    let (mut board, ids, nodes) = board_with_nodes(2, 1);
    let hub = nodes[2];
    board
        .connect(Endpoint::Node(nodes[0]), Endpoint::Node(hub), WireColor::default())
        .unwrap();
    board
        .connect(Endpoint::Node(hub), Endpoint::Node(nodes[1]), WireColor::default())
        .unwrap();

    let network = NetworkBuilder::build(&mut board);
    assert!(network.same_node((ids[0], 0), (ids[1], 0)));

    board.delete_wire_node(hub).unwrap();
    assert!(board.network().is_none());

    let network = NetworkBuilder::build(&mut board);
    assert!(!network.same_node((ids[0], 0), (ids[1], 0)));
    assert_eq!(network.node_count(), 2);
}

#[test]
fn test_chained_jumpers_merge_through_shorts() {
    let mut board = Board::new();
    let first = board.insert(Box::new(Jumper::new()), Point::new(0.0, 0.0));
    let second = board.insert(Box::new(Jumper::new()), Point::new(4.0, 0.0));
    // first b at (2, 0.5), second a at (4, 0.5)
    board.draw_wire(Point::new(2.0, 0.5), Point::new(4.0, 0.5), WireColor::default());

    let network = NetworkBuilder::build(&mut board);
    assert_eq!(network.node_count(), 1);
    assert!(network.same_node((first, 0), (second, 1)));
}

#[test]
fn test_wire_between_free_points_joins_nothing() {
    let mut board = Board::new();
    let a = board.insert(Box::new(Probe::new()), Point::new(0.0, 0.0));
    let b = board.insert(Box::new(Probe::new()), Point::new(10.0, 0.0));
    board
        .connect(
            Endpoint::Free(Point::new(0.0, 0.5)),
            Endpoint::Free(Point::new(10.0, 0.5)),
            WireColor::default(),
        )
        .unwrap();

    let network = NetworkBuilder::build(&mut board);
    assert!(!network.same_node((a, 0), (b, 0)));
}
