//! End-to-end query scenarios against small hand-built graphs.

use std::sync::Arc;
use std::time::Duration;
use tdroute::config::{Config, DEFAULT_RUSH_WINDOWS};
use tdroute::driver::Driver;
use tdroute::graph::{EdgeData, Graph, Node};
use tdroute::loop_removal::remove_loops;
use tdroute::result::Objective;

fn edge(distance: f64, base_width: f64, rush_width: f64, travel_time: f64) -> EdgeData {
    EdgeData { distance, base_width, rush_width, time_table: Arc::from(vec![(0.0, travel_time)].into_boxed_slice()) }
}

/// A straight 5-node chain, always wide, no turns. Expects the full chain
/// as the path, zero right turns, and a perfect wideness score.
#[test]
fn tiny_line_graph_is_a_perfect_wide_straight_path() {
    let nodes = (0..5).map(|i| Node { lat: i as f64, lon: 0.0 }).collect();
    let edges = (0..4).map(|i| (i, i + 1, edge(5.0, 10.0, 10.0, 5.0))).collect();
    let graph = Graph::new(nodes, edges, DEFAULT_RUSH_WINDOWS);

    let driver = Driver::new(graph, Config::default()).unwrap();
    let result = driver.query(0, 4, 0.0, 60.0, 1000.0, Objective::WidenessOnly).unwrap();

    assert!(result.path_found);
    assert_eq!(result.path_nodes, vec![0, 1, 2, 3, 4]);
    assert_eq!(result.right_turns, 0);
    assert!((result.score - 100.0).abs() < 1e-6);
}

/// A diamond where the upper leg is shorter and turn-free but narrows in
/// rush hour, and the lower leg stays wide through rush hour but takes one
/// right turn. `MinTurnsOnly` should prefer the upper leg, `WidenessOnly`
/// the lower leg, and `WidenessAndTurns` should keep both as non-dominated.
fn diamond_graph() -> Graph {
    let nodes = vec![
        Node { lat: 0.0, lon: 0.0 }, // 0: source
        Node { lat: 0.0, lon: 1.0 }, // 1: upper waypoint
        Node { lat: 1.0, lon: 0.0 }, // 2: lower waypoint
        Node { lat: 1.0, lon: 1.0 }, // 3: destination
    ];
    let edges = vec![
        (0, 1, edge(5.0, 10.0, 4.0, 5.0)),  // upper: narrows in rush hour
        (1, 3, edge(5.0, 10.0, 4.0, 5.0)),  // upper: narrows in rush hour
        (0, 2, edge(7.0, 10.0, 10.0, 7.0)), // lower: stays wide (clearway)
        (2, 3, edge(7.0, 10.0, 10.0, 7.0)), // lower: stays wide (clearway)
    ];
    Graph::new(nodes, edges, DEFAULT_RUSH_WINDOWS)
}

#[test]
fn diamond_min_turns_only_prefers_the_straight_upper_leg() {
    let driver = Driver::new(diamond_graph(), Config::default()).unwrap();
    let result = driver.query(0, 3, 480.0, 481.0, 1000.0, Objective::MinTurnsOnly).unwrap();
    assert!(result.path_found);
    assert_eq!(result.right_turns, 0);
    assert_eq!(result.path_nodes, vec![0, 1, 3]);
}

#[test]
fn diamond_wideness_only_prefers_the_wide_lower_leg_during_rush_hour() {
    let driver = Driver::new(diamond_graph(), Config::default()).unwrap();
    let result = driver.query(0, 3, 480.0, 481.0, 1000.0, Objective::WidenessOnly).unwrap();
    assert!(result.path_found);
    assert_eq!(result.path_nodes, vec![0, 2, 3]);
    assert!((result.score - 100.0).abs() < 1e-6);
}

#[test]
fn diamond_wideness_and_turns_keeps_both_legs_non_dominated() {
    let driver = Driver::new(diamond_graph(), Config::default()).unwrap();
    let result = driver.query(0, 3, 480.0, 481.0, 1000.0, Objective::WidenessAndTurns).unwrap();
    assert!(result.path_found);
    let pareto = result.pareto_paths.expect("pareto list attached under WidenessAndTurns");
    let has_upper = pareto.iter().any(|r| r.path_nodes == vec![0, 1, 3]);
    let has_lower = pareto.iter().any(|r| r.path_nodes == vec![0, 2, 3]);
    assert!(has_upper && has_lower, "expected both legs in the Pareto set, got {pareto:?}");
}

/// Destination is disconnected from source.
#[test]
fn unreachable_destination_reports_no_path() {
    let nodes = vec![Node { lat: 0.0, lon: 0.0 }, Node { lat: 1.0, lon: 0.0 }];
    let graph = Graph::new(nodes, vec![], DEFAULT_RUSH_WINDOWS);
    let driver = Driver::new(graph, Config::default()).unwrap();
    let result = driver.query(0, 1, 0.0, 60.0, 1000.0, Objective::WidenessOnly).unwrap();
    assert!(!result.path_found);
}

/// The source is reachable but the budget is too tight for the feasibility
/// gate, so the query reports no path without ever labeling.
#[test]
fn too_tight_a_budget_fails_the_feasibility_gate() {
    let nodes = vec![Node { lat: 0.0, lon: 0.0 }, Node { lat: 1.0, lon: 0.0 }];
    let graph = Graph::new(nodes, vec![(0, 1, edge(100.0, 10.0, 10.0, 50.0))], DEFAULT_RUSH_WINDOWS);
    let driver = Driver::new(graph, Config::default()).unwrap();
    let result = driver.query(0, 1, 0.0, 60.0, 1.0, Objective::WidenessOnly).unwrap();
    assert!(!result.path_found);
}

/// An artificially tiny labeling timeout forces every query into the
/// fallback fastest-path, which is reachable well within budget.
#[test]
fn a_labeling_timeout_falls_back_to_the_plain_fastest_path() {
    let nodes = (0..3).map(|i| Node { lat: i as f64, lon: 0.0 }).collect();
    let edges = vec![(0, 1, edge(5.0, 10.0, 10.0, 5.0)), (1, 2, edge(5.0, 10.0, 10.0, 5.0))];
    let graph = Graph::new(nodes, edges, DEFAULT_RUSH_WINDOWS);

    let mut config = Config::default();
    config.labeling_timeout = Duration::from_nanos(1);
    let driver = Driver::new(graph, config).unwrap();

    let result = driver.query(0, 2, 0.0, 60.0, 1000.0, Objective::WidenessOnly).unwrap();
    assert!(result.path_found);
    assert!(result.fallback);
    assert_eq!(result.score, 0.0);
    assert!(result.travel_time <= 1000.0);
}

/// A path whose raw forward/backward concatenation revisits a node three
/// times cleans up to a strictly shorter, duplicate-free path.
#[test]
fn loop_in_concatenation_is_removed_and_shortens_the_path() {
    let naive = vec![0, 1, 2, 1, 3, 1, 4];
    let cleaned = remove_loops(&naive);

    assert_eq!(cleaned, vec![0, 1, 4]);
    let mut seen = std::collections::HashSet::new();
    assert!(cleaned.iter().all(|n| seen.insert(*n)), "cleaned path must have no duplicates");
    assert!(cleaned.len() < naive.len());
}
