//! End-to-end batch run: records in, communities and node summaries out

use crate::cluster::{detect_communities, CpmResult};
use crate::config::Config;
use crate::error::Result;
use crate::graph::builder::build_graph;
use crate::graph::{CompressedGraph, EdgeRecord, NodeRecord};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-node export row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeSummary {
    pub id: String,
    pub faction: Option<String>,
    /// Surviving incident edges
    pub degree: u32,
    /// Sum of surviving incident edge weights
    pub strength: f64,
    pub communities: Vec<u32>,
    pub primary_community: Option<u32>,
    pub unassigned: bool,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, String>,
}

/// Per-community export row with members resolved to ids
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommunitySummary {
    pub id: u32,
    pub label: String,
    pub size: usize,
    pub clique_count: usize,
    pub density: f32,
    pub members: Vec<String>,
    pub central_nodes: Vec<String>,
}

/// A completed run: the parameters, the thresholded graph and the communities
#[derive(Debug, Clone)]
pub struct Analysis {
    pub config: Config,
    pub graph: CompressedGraph,
    pub result: CpmResult,
}

impl Analysis {
    /// Run percolation on an already built graph
    pub fn from_graph(graph: CompressedGraph, config: Config) -> Result<Self> {
        let result = detect_communities(&graph, &config)?;
        Ok(Self { config, graph, result })
    }

    /// One summary row per node, isolated and unassigned nodes included
    pub fn node_summaries(&self) -> Vec<NodeSummary> {
        (0..self.graph.node_count).map(|node| self.summary_of(node)).collect()
    }

    fn summary_of(&self, node: usize) -> NodeSummary {
        let graph = &self.graph;
        let assignment = &self.result.assignment;

        NodeSummary {
            id: graph.node_id(node).to_string(),
            faction: graph.faction(node).map(str::to_string),
            degree: graph.metadata.degrees[node],
            strength: graph.strength(node),
            communities: assignment.communities_of(node).to_vec(),
            primary_community: assignment.primary_of(node),
            unassigned: assignment.is_unassigned(node),
            extra: graph.metadata.extras[node].clone(),
        }
    }

    /// One summary row per community, in id order
    pub fn community_summaries(&self) -> Vec<CommunitySummary> {
        let resolve = |nodes: &[u32]| -> Vec<String> {
            nodes.iter().map(|&n| self.graph.node_id(n as usize).to_string()).collect()
        };

        self.result
            .communities
            .iter()
            .map(|c| CommunitySummary {
                id: c.id,
                label: c.label.clone(),
                size: c.size,
                clique_count: c.clique_count,
                density: c.density,
                members: resolve(&c.members),
                central_nodes: resolve(&c.central_nodes),
            })
            .collect()
    }

    /// Summary of a single node by id
    pub fn node(&self, id: &str) -> Option<NodeSummary> {
        let idx = self.graph.index_of(id)?;
        Some(self.summary_of(idx as usize))
    }
}

/// Validate parameters, then build the thresholded graph
pub fn prepare_graph(edges: &[EdgeRecord], nodes: &[NodeRecord], config: &Config) -> Result<CompressedGraph> {
    config.validate()?;

    let graph = build_graph(edges, nodes, config.threshold, config.duplicate_policy)?;

    log::info!(
        "Graph after threshold {}: {} nodes, {} edges, {} isolated",
        config.threshold,
        graph.node_count,
        graph.edge_count(),
        graph.isolated_count()
    );

    Ok(graph)
}

/// Full run. Every record is validated before clique enumeration starts.
pub fn analyze(edges: &[EdgeRecord], nodes: &[NodeRecord], config: &Config) -> Result<Analysis> {
    let graph = prepare_graph(edges, nodes, config)?;
    Analysis::from_graph(graph, config.clone())
}
