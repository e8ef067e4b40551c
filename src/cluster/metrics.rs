//! Community statistics and labels

use crate::graph::CompressedGraph;
use std::collections::BTreeMap;

/// Number of central members reported per community
pub const CENTRAL_NODE_COUNT: usize = 5;

/// Calculate density (actual edges / potential edges) of an undirected member set
pub fn calculate_density(graph: &CompressedGraph, members: &[u32]) -> f32 {
    let n = members.len();
    if n <= 1 {
        return 1.0; // By convention, singleton communities have density 1
    }

    let potential_edges = n * (n - 1) / 2;

    // Members are sorted, so count each edge from its lower endpoint only
    let actual_edges: usize = members.iter()
        .map(|&src| {
            graph.neighbors(src as usize)
                .iter()
                .filter(|&&dst| dst > src && members.binary_search(&dst).is_ok())
                .count()
        })
        .sum();

    actual_edges as f32 / potential_edges as f32
}

/// Degree of each member counted inside the member set
pub fn internal_degrees(graph: &CompressedGraph, members: &[u32]) -> Vec<(u32, usize)> {
    members.iter()
        .map(|&node| {
            let degree = graph.neighbors(node as usize)
                .iter()
                .filter(|&&dst| members.binary_search(&dst).is_ok())
                .count();
            (node, degree)
        })
        .collect()
}

/// Members with the highest internal degree, ties broken by node index
pub fn identify_central_nodes(graph: &CompressedGraph, members: &[u32]) -> Vec<u32> {
    let mut degrees = internal_degrees(graph, members);
    degrees.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

    degrees.into_iter()
        .take(CENTRAL_NODE_COUNT)
        .map(|(node, _)| node)
        .collect()
}

/// Most common faction among members with a known faction.
/// Ties go to the alphabetically first faction.
pub fn majority_faction<'g>(graph: &'g CompressedGraph, members: &[u32]) -> Option<&'g str> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for &node in members {
        if let Some(faction) = graph.faction(node as usize) {
            *counts.entry(faction).or_insert(0) += 1;
        }
    }

    // BTreeMap iterates alphabetically; keep the first of equal counts
    counts.into_iter()
        .fold(None::<(&str, usize)>, |best, (faction, count)| match best {
            Some((_, best_count)) if best_count >= count => best,
            _ => Some((faction, count)),
        })
        .map(|(faction, _)| faction)
}

/// Display label: "<majority faction> (size=N)" or "c<id> (size=N)"
pub fn community_label(graph: &CompressedGraph, id: u32, members: &[u32]) -> String {
    match majority_faction(graph, members) {
        Some(faction) => format!("{} (size={})", faction, members.len()),
        None => format!("c{} (size={})", id, members.len()),
    }
}
