//! Graph construction module

use crate::config::{validate_threshold, DuplicatePolicy};
use crate::error::{CpmError, Result};
use crate::graph::compressed::{CompressedGraph, NodeMetadata};
use crate::graph::{EdgeRecord, NodeRecord};
use std::collections::{BTreeMap, HashMap};

/// Builder for constructing a thresholded CompressedGraph from interaction records
pub struct GraphBuilder {
    /// Records with a lower weight are not turned into edges
    threshold: f64,

    /// How repeated pairs are combined
    policy: DuplicatePolicy,

    /// Mapping from string IDs to provisional (first-seen) indices
    id_to_index: HashMap<String, u32>,

    /// Node string IDs in first-seen order
    node_ids: Vec<String>,

    /// Faction per provisional index
    factions: Vec<Option<String>>,

    /// Extra attributes per provisional index
    extras: Vec<BTreeMap<String, String>>,

    /// Combined weight per surviving unordered pair (low, high)
    pair_weights: HashMap<(u32, u32), f64>,

    /// Records rejected by the threshold
    dropped_records: usize,

    /// Self-loop records that were skipped
    skipped_loops: usize,
}

impl GraphBuilder {
    /// Create a new graph builder for the given threshold
    pub fn new(threshold: f64, policy: DuplicatePolicy) -> Result<Self> {
        Self::with_capacity(threshold, policy, 0)
    }

    /// Create a new graph builder with the given node capacity
    pub fn with_capacity(threshold: f64, policy: DuplicatePolicy, capacity: usize) -> Result<Self> {
        validate_threshold(threshold)?;
        Ok(Self {
            threshold,
            policy,
            id_to_index: HashMap::with_capacity(capacity),
            node_ids: Vec::with_capacity(capacity),
            factions: Vec::with_capacity(capacity),
            extras: Vec::with_capacity(capacity),
            pair_weights: HashMap::new(),
            dropped_records: 0,
            skipped_loops: 0,
        })
    }

    /// Get or create a node index for the given string ID
    fn get_or_create_node(&mut self, id: &str) -> u32 {
        if let Some(&idx) = self.id_to_index.get(id) {
            return idx;
        }

        let idx = self.node_ids.len() as u32;
        self.id_to_index.insert(id.to_string(), idx);
        self.node_ids.push(id.to_string());
        self.factions.push(None);
        self.extras.push(BTreeMap::new());

        idx
    }

    /// Register node metadata. The first non-empty faction wins.
    pub fn add_node(&mut self, record: &NodeRecord) -> Result<()> {
        let id = record.id.trim();
        if id.is_empty() {
            return Err(CpmError::invalid("node_id", "metadata record has an empty id"));
        }

        let idx = self.get_or_create_node(id) as usize;

        if self.factions[idx].is_none() {
            self.factions[idx] = record
                .faction
                .as_deref()
                .map(str::trim)
                .filter(|f| !f.is_empty())
                .map(str::to_string);
        }
        for (key, value) in &record.extra {
            self.extras[idx].entry(key.clone()).or_insert_with(|| value.clone());
        }

        Ok(())
    }

    /// Add one interaction record. `row` is only used for error reporting.
    ///
    /// Endpoints are registered even when the record falls below the
    /// threshold, so they show up as unassigned nodes later on.
    pub fn add_edge(&mut self, row: usize, record: &EdgeRecord) -> Result<()> {
        let source = record.source.trim();
        let target = record.target.trim();

        if source.is_empty() {
            return Err(CpmError::malformed(row, "empty source"));
        }
        if target.is_empty() {
            return Err(CpmError::malformed(row, "empty target"));
        }
        if !record.weight.is_finite() {
            return Err(CpmError::malformed(
                row,
                format!("weight is not a number: {}", record.weight),
            ));
        }
        if record.weight < 0.0 {
            return Err(CpmError::malformed(
                row,
                format!("negative weight: {}", record.weight),
            ));
        }

        let src_idx = self.get_or_create_node(source);
        let dst_idx = self.get_or_create_node(target);

        if src_idx == dst_idx {
            log::debug!("Skipping self-loop on '{}' at row {}", source, row);
            self.skipped_loops += 1;
            return Ok(());
        }

        if record.weight < self.threshold {
            self.dropped_records += 1;
            return Ok(());
        }

        let key = (src_idx.min(dst_idx), src_idx.max(dst_idx));
        let policy = self.policy;
        self.pair_weights
            .entry(key)
            .and_modify(|w| *w = policy.combine(*w, record.weight))
            .or_insert(record.weight);

        Ok(())
    }

    /// Add a batch of records, numbering rows from 1
    pub fn add_edges(&mut self, records: &[EdgeRecord]) -> Result<()> {
        for (i, record) in records.iter().enumerate() {
            self.add_edge(i + 1, record)?;
        }
        Ok(())
    }

    /// Build the compressed graph
    pub fn build(self) -> CompressedGraph {
        let node_count = self.node_ids.len();

        log::debug!(
            "Building graph: {} nodes, {} surviving pairs, {} records below threshold, {} self-loops skipped",
            node_count,
            self.pair_weights.len(),
            self.dropped_records,
            self.skipped_loops
        );

        // Final indices follow lexicographic id order
        let mut order: Vec<u32> = (0..node_count as u32).collect();
        order.sort_unstable_by(|&a, &b| self.node_ids[a as usize].cmp(&self.node_ids[b as usize]));

        let mut old_to_new = vec![0u32; node_count];
        for (new_idx, &old_idx) in order.iter().enumerate() {
            old_to_new[old_idx as usize] = new_idx as u32;
        }

        // Adjacency lists in final index space
        let mut adjacency: Vec<Vec<(u32, f64)>> = vec![Vec::new(); node_count];
        for (&(a, b), &weight) in &self.pair_weights {
            let na = old_to_new[a as usize];
            let nb = old_to_new[b as usize];
            adjacency[na as usize].push((nb, weight));
            adjacency[nb as usize].push((na, weight));
        }

        let mut graph = CompressedGraph::with_capacity(node_count, self.pair_weights.len());

        // Create offsets array
        graph.offsets.push(0);
        let mut offset = 0u32;
        for list in &mut adjacency {
            // Sort for binary search efficiency
            list.sort_unstable_by_key(|&(n, _)| n);
            offset += list.len() as u32;
            graph.offsets.push(offset);
        }

        let mut degrees = Vec::with_capacity(node_count);
        let mut strengths = Vec::with_capacity(node_count);
        for list in &adjacency {
            degrees.push(list.len() as u32);
            strengths.push(list.iter().map(|&(_, w)| w).sum());
            for &(n, w) in list {
                graph.edges.push(n);
                graph.weights.push(w);
            }
        }

        let mut node_ids = self.node_ids;
        let mut factions = self.factions;
        let mut extras = self.extras;
        graph.node_ids = order.iter().map(|&old| std::mem::take(&mut node_ids[old as usize])).collect();

        graph.metadata = NodeMetadata {
            factions: order.iter().map(|&old| factions[old as usize].take()).collect(),
            extras: order.iter().map(|&old| std::mem::take(&mut extras[old as usize])).collect(),
            degrees,
            strengths,
        };

        graph
    }
}

/// Build a thresholded graph from interaction records and optional metadata
pub fn build_graph(
    edges: &[EdgeRecord],
    nodes: &[NodeRecord],
    threshold: f64,
    policy: DuplicatePolicy,
) -> Result<CompressedGraph> {
    let mut builder = GraphBuilder::with_capacity(threshold, policy, nodes.len())?;
    for node in nodes {
        builder.add_node(node)?;
    }
    builder.add_edges(edges)?;
    Ok(builder.build())
}
