//! Parses the plain-text graph format: a nodes file (`id lat lon`) and an
//! edges file (`src dst distance base_width rush_width
//! [(dep_key,travel_time)]*`). `#`-prefixed lines are comments; malformed
//! lines are skipped and logged rather than aborting the load.

use super::{EdgeData, Graph, Node, NodeId};
use std::collections::HashMap;
use std::io::BufRead;
use std::sync::Arc;
use tracing::warn;

pub fn load<R1: BufRead, R2: BufRead>(nodes: R1, edges: R2, rush_windows: [(f64, f64); 2]) -> Graph {
    let mut raw_nodes = Vec::new();
    let mut id_of = HashMap::new();

    for (lineno, line) in nodes.lines().enumerate() {
        let Ok(line) = line else { continue };
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let Some((id, lat, lon)) = parse_node_line(&tokens) else {
            warn!(lineno, line, "skipping malformed node line");
            continue;
        };
        id_of.insert(id, raw_nodes.len() as NodeId);
        raw_nodes.push(Node { lat, lon });
    }

    let mut raw_edges = Vec::new();
    for (lineno, line) in edges.lines().enumerate() {
        let Ok(line) = line else { continue };
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let Some((src, dst, distance, base_width, rush_width, time_table)) = parse_edge_line(&tokens) else {
            warn!(lineno, line, "skipping malformed edge line");
            continue;
        };
        let (Some(&from), Some(&to)) = (id_of.get(&src), id_of.get(&dst)) else {
            warn!(lineno, line, "edge references unknown node id, skipping");
            continue;
        };
        raw_edges.push((
            from,
            to,
            EdgeData {
                distance,
                base_width,
                rush_width,
                time_table: Arc::from(time_table.into_boxed_slice()),
            },
        ));
    }

    Graph::new(raw_nodes, raw_edges, rush_windows)
}

fn parse_node_line(tokens: &[&str]) -> Option<(u32, f64, f64)> {
    if tokens.len() != 3 {
        return None;
    }
    let id: u32 = tokens[0].parse().ok()?;
    let lat: f64 = tokens[1].parse().ok()?;
    let lon: f64 = tokens[2].parse().ok()?;
    Some((id, lat, lon))
}

fn parse_edge_line(tokens: &[&str]) -> Option<(u32, u32, f64, f64, f64, Vec<(f64, f64)>)> {
    if tokens.len() < 5 {
        return None;
    }
    let src: u32 = tokens[0].parse().ok()?;
    let dst: u32 = tokens[1].parse().ok()?;
    let distance: f64 = tokens[2].parse().ok()?;
    let base_width: f64 = tokens[3].parse().ok()?;
    let rush_width: f64 = tokens[4].parse().ok()?;

    let mut time_table = Vec::new();
    for token in &tokens[5..] {
        let inner = token.trim_start_matches('(').trim_end_matches(')');
        let mut parts = inner.split(',');
        let key: f64 = parts.next()?.parse().ok()?;
        let tt: f64 = parts.next()?.parse().ok()?;
        time_table.push((key, tt));
    }
    time_table.sort_by(|a, b| a.0.total_cmp(&b.0));
    Some((src, dst, distance, base_width, rush_width, time_table))
}
