//! Memory-efficient undirected graph representation

use std::collections::BTreeMap;
use std::mem;
use serde::{Serialize, Deserialize};

/// Store node metadata separately to improve cache locality during traversal
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NodeMetadata {
    /// Faction label per node
    pub factions: Vec<Option<String>>,

    /// Extra metadata attributes per node
    pub extras: Vec<BTreeMap<String, String>>,

    /// Number of surviving incident edges per node
    pub degrees: Vec<u32>,

    /// Sum of surviving incident edge weights per node
    pub strengths: Vec<f64>,
}

impl NodeMetadata {
    /// Calculate the memory usage of the metadata
    pub fn memory_usage(&self) -> usize {
        let factions: usize = self.factions.iter()
            .map(|f| mem::size_of::<Option<String>>() + f.as_ref().map_or(0, |s| s.capacity()))
            .sum();
        let extras: usize = self.extras.iter()
            .flat_map(|m| m.iter())
            .map(|(k, v)| k.capacity() + v.capacity())
            .sum();
        let degrees = self.degrees.capacity() * mem::size_of::<u32>();
        let strengths = self.strengths.capacity() * mem::size_of::<f64>();

        factions + extras + degrees + strengths
    }
}

/// Compressed sparse representation of an undirected weighted graph.
///
/// Every edge is stored in both endpoint rows. Node indices follow the
/// lexicographic order of node ids, and each row is sorted ascending.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompressedGraph {
    /// Number of nodes in the graph, isolated ones included
    pub node_count: usize,

    /// Offset array: offsets[i] to offsets[i+1] is the neighbour range of node i
    pub offsets: Vec<u32>,

    /// Concatenated sorted neighbour lists
    pub edges: Vec<u32>,

    /// Edge weights, parallel to `edges`
    pub weights: Vec<f64>,

    /// Mapping from internal node indices to original string ids
    pub node_ids: Vec<String>,

    /// Node metadata (stored separately for cache efficiency)
    pub metadata: NodeMetadata,
}

impl CompressedGraph {
    /// Create an empty graph with pre-allocated capacity
    pub fn with_capacity(node_count: usize, edge_count: usize) -> Self {
        Self {
            node_count,
            offsets: Vec::with_capacity(node_count + 1),
            edges: Vec::with_capacity(edge_count * 2),
            weights: Vec::with_capacity(edge_count * 2),
            node_ids: Vec::with_capacity(node_count),
            metadata: NodeMetadata::default(),
        }
    }

    /// Sorted neighbours of a node
    pub fn neighbors(&self, node: usize) -> &[u32] {
        let start = self.offsets[node] as usize;
        let end = self.offsets[node + 1] as usize;
        &self.edges[start..end]
    }

    /// Weights of a node's edges, aligned with `neighbors`
    pub fn neighbor_weights(&self, node: usize) -> &[f64] {
        let start = self.offsets[node] as usize;
        let end = self.offsets[node + 1] as usize;
        &self.weights[start..end]
    }

    /// Check if there's an edge between two nodes
    pub fn has_edge(&self, a: usize, b: u32) -> bool {
        self.neighbors(a).binary_search(&b).is_ok()
    }

    /// Weight of the edge between two nodes, if present
    pub fn edge_weight(&self, a: usize, b: u32) -> Option<f64> {
        self.neighbors(a)
            .binary_search(&b)
            .ok()
            .map(|pos| self.neighbor_weights(a)[pos])
    }

    /// Number of surviving edges incident to a node
    pub fn degree(&self, node: usize) -> usize {
        let start = self.offsets[node] as usize;
        let end = self.offsets[node + 1] as usize;
        end - start
    }

    /// Sum of incident edge weights
    pub fn strength(&self, node: usize) -> f64 {
        self.metadata.strengths[node]
    }

    /// Number of undirected edges
    pub fn edge_count(&self) -> usize {
        self.edges.len() / 2
    }

    /// Nodes without any surviving edge
    pub fn isolated_count(&self) -> usize {
        (0..self.node_count).filter(|&n| self.degree(n) == 0).count()
    }

    /// Original id of a node
    pub fn node_id(&self, node: usize) -> &str {
        &self.node_ids[node]
    }

    /// Look up a node index by id
    pub fn index_of(&self, id: &str) -> Option<u32> {
        self.node_ids
            .binary_search_by(|probe| probe.as_str().cmp(id))
            .ok()
            .map(|idx| idx as u32)
    }

    /// Faction label of a node
    pub fn faction(&self, node: usize) -> Option<&str> {
        self.metadata.factions.get(node).and_then(|f| f.as_deref())
    }

    /// Iterate every undirected edge once as (low, high, weight)
    pub fn edge_list(&self) -> impl Iterator<Item = (u32, u32, f64)> + '_ {
        (0..self.node_count).flat_map(move |node| {
            self.neighbors(node)
                .iter()
                .zip(self.neighbor_weights(node))
                .filter(move |(&other, _)| other as usize > node)
                .map(move |(&other, &weight)| (node as u32, other, weight))
        })
    }

    /// Estimate memory usage in bytes
    pub fn memory_usage(&self) -> usize {
        let base = mem::size_of::<Self>();
        let offsets = self.offsets.capacity() * mem::size_of::<u32>();
        let edges = self.edges.capacity() * mem::size_of::<u32>();
        let weights = self.weights.capacity() * mem::size_of::<f64>();
        let ids: usize = self.node_ids.iter().map(|s| s.capacity()).sum();

        base + offsets + edges + weights + ids + self.metadata.memory_usage()
    }
}
