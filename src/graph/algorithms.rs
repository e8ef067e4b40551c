//! Graph algorithms shared by the percolation stages

use crate::config::validate_threshold;
use crate::error::Result;
use crate::graph::compressed::{CompressedGraph, NodeMetadata};
use petgraph::graph::{NodeIndex, UnGraph};

/// Intersection of two ascending slices, ascending
pub fn intersect_sorted(a: &[u32], b: &[u32]) -> Vec<u32> {
    let mut out = Vec::with_capacity(a.len().min(b.len()));
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                out.push(a[i]);
                i += 1;
                j += 1;
            }
        }
    }
    out
}

/// Neighbours of `node` with a higher index
pub fn higher_neighbors(graph: &CompressedGraph, node: usize) -> &[u32] {
    let neighbors = graph.neighbors(node);
    let split = neighbors.partition_point(|&n| (n as usize) <= node);
    &neighbors[split..]
}

/// Drop edges whose combined weight is below `threshold`.
///
/// Node indices and metadata are kept, so results of both graphs can be
/// compared node by node.
///
/// This tests the already combined pair weight. `GraphBuilder` tests each
/// record before combining, so under `DuplicatePolicy::Sum` a pair made of
/// several weak records can survive here yet be absent from a rebuild at the
/// same threshold. Under `DuplicatePolicy::Max` both agree.
pub fn filter_by_threshold(graph: &CompressedGraph, threshold: f64) -> Result<CompressedGraph> {
    validate_threshold(threshold)?;

    let node_count = graph.node_count;
    let mut filtered = CompressedGraph::with_capacity(node_count, graph.edge_count());
    filtered.offsets.push(0);

    let mut degrees = Vec::with_capacity(node_count);
    let mut strengths = Vec::with_capacity(node_count);
    let mut offset = 0u32;

    for node in 0..node_count {
        let mut degree = 0u32;
        let mut strength = 0.0;
        for (&target, &weight) in graph.neighbors(node).iter().zip(graph.neighbor_weights(node)) {
            if weight >= threshold {
                filtered.edges.push(target);
                filtered.weights.push(weight);
                degree += 1;
                strength += weight;
            }
        }
        offset += degree;
        filtered.offsets.push(offset);
        degrees.push(degree);
        strengths.push(strength);
    }

    filtered.node_ids = graph.node_ids.clone();
    filtered.metadata = NodeMetadata {
        factions: graph.metadata.factions.clone(),
        extras: graph.metadata.extras.clone(),
        degrees,
        strengths,
    };

    Ok(filtered)
}

/// Convert to a petgraph graph with node ids as weights
pub fn to_petgraph(graph: &CompressedGraph) -> UnGraph<String, f64> {
    let mut pg = UnGraph::with_capacity(graph.node_count, graph.edge_count());
    let indices: Vec<NodeIndex> = graph.node_ids.iter()
        .map(|id| pg.add_node(id.clone()))
        .collect();

    for (a, b, weight) in graph.edge_list() {
        pg.add_edge(indices[a as usize], indices[b as usize], weight);
    }

    pg
}

/// Number of connected components, isolated nodes counted individually
pub fn connected_component_count(graph: &CompressedGraph) -> usize {
    petgraph::algo::connected_components(&to_petgraph(graph))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DuplicatePolicy;
    use crate::graph::builder::build_graph;
    use crate::graph::EdgeRecord;

    fn sample() -> CompressedGraph {
        build_graph(
            &[
                EdgeRecord::new("A", "B", 5.0),
                EdgeRecord::new("B", "C", 2.0),
                EdgeRecord::new("D", "E", 7.0),
                EdgeRecord::new("F", "G", 0.5),
            ],
            &[],
            1.0,
            DuplicatePolicy::Sum,
        )
        .unwrap()
    }

    #[test]
    fn intersects_sorted_slices() {
        assert_eq!(intersect_sorted(&[1, 3, 5, 7], &[2, 3, 4, 7, 9]), vec![3, 7]);
        assert!(intersect_sorted(&[], &[1, 2]).is_empty());
    }

    #[test]
    fn higher_neighbors_skips_lower_indices() {
        let graph = sample();
        let b = graph.index_of("B").unwrap() as usize;
        let c = graph.index_of("C").unwrap();
        assert_eq!(higher_neighbors(&graph, b), &[c]);
    }

    #[test]
    fn raising_threshold_keeps_node_set() {
        let graph = sample();
        let raised = filter_by_threshold(&graph, 5.0).unwrap();
        assert_eq!(raised.node_count, graph.node_count);
        assert_eq!(raised.node_ids, graph.node_ids);
        assert_eq!(raised.edge_count(), 2);
        let b = raised.index_of("B").unwrap() as usize;
        assert_eq!(raised.degree(b), 1);
        assert_eq!(raised.strength(b), 5.0);
    }

    #[test]
    fn filters_on_combined_weight_unlike_rebuild() {
        let records = [EdgeRecord::new("A", "B", 2.0), EdgeRecord::new("B", "A", 2.0)];
        let summed = build_graph(&records, &[], 0.0, DuplicatePolicy::Sum).unwrap();
        let filtered = filter_by_threshold(&summed, 3.0).unwrap();
        let rebuilt = build_graph(&records, &[], 3.0, DuplicatePolicy::Sum).unwrap();

        // 2 + 2 passes here, while each record alone misses 3
        assert_eq!(filtered.edge_count(), 1);
        assert_eq!(rebuilt.edge_count(), 0);

        let maxed = build_graph(&records, &[], 0.0, DuplicatePolicy::Max).unwrap();
        let filtered = filter_by_threshold(&maxed, 3.0).unwrap();
        let rebuilt = build_graph(&records, &[], 3.0, DuplicatePolicy::Max).unwrap();
        assert_eq!(filtered.edge_count(), rebuilt.edge_count());
    }

    #[test]
    fn counts_components_including_isolated_nodes() {
        // {A,B,C}, {D,E}, {F}, {G}
        assert_eq!(connected_component_count(&sample()), 4);
    }

    #[test]
    fn petgraph_conversion_preserves_edges() {
        let pg = to_petgraph(&sample());
        assert_eq!(pg.node_count(), 7);
        assert_eq!(pg.edge_count(), 3);
    }
}
