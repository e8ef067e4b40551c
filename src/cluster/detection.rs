//! Community detection by clique percolation

use crate::cluster::assignment::Assignment;
use crate::cluster::cliques::enumerate_k_cliques;
use crate::cluster::metrics::{calculate_density, community_label, identify_central_nodes};
use crate::cluster::percolation::percolate;
use crate::cluster::Community;
use crate::config::Config;
use crate::error::Result;
use crate::graph::CompressedGraph;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Outcome of one percolation run for a fixed k
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CpmResult {
    /// Clique size used
    pub k: usize,

    /// Number of k-cliques found
    pub clique_count: usize,

    /// Communities in order of formation; `communities[i].id == i`
    pub communities: Vec<Community>,

    /// Node memberships and primary communities
    pub assignment: Assignment,
}

impl CpmResult {
    /// True when no community was found, e.g. because no edge survived the threshold
    pub fn is_empty(&self) -> bool {
        self.communities.is_empty()
    }

    /// Look up a community by id
    pub fn community(&self, id: u32) -> Option<&Community> {
        self.communities.get(id as usize)
    }

    /// Number of distinct nodes covered by some community
    pub fn covered_node_count(&self) -> usize {
        self.assignment.assigned_count()
    }
}

/// Run clique percolation on a built graph
pub fn detect_communities(graph: &CompressedGraph, config: &Config) -> Result<CpmResult> {
    config.validate()?;

    log::info!(
        "Running clique percolation with k={} on {} nodes and {} edges",
        config.k,
        graph.node_count,
        graph.edge_count()
    );

    let cliques = enumerate_k_cliques(graph, config.k)?;
    let components = percolate(&cliques, config.k)?;

    log::info!("Percolated {} cliques into {} components", cliques.len(), components.len());

    let kept: Vec<_> = components
        .into_iter()
        .filter(|c| c.members.len() >= config.min_community_size)
        .collect();

    let communities: Vec<Community> = kept
        .into_par_iter()
        .enumerate()
        .map(|(id, component)| {
            let id = id as u32;
            let density = calculate_density(graph, &component.members);
            let central_nodes = identify_central_nodes(graph, &component.members);
            let label = community_label(graph, id, &component.members);
            Community {
                id,
                size: component.members.len(),
                clique_count: component.cliques.len(),
                members: component.members,
                density,
                central_nodes,
                label,
            }
        })
        .collect();

    if communities.is_empty() {
        log::warn!(
            "No communities found for k={} (threshold {}); every node is unassigned",
            config.k,
            config.threshold
        );
    }

    let assignment = Assignment::resolve(graph.node_count, &communities);

    log::info!(
        "Found {} communities covering {} of {} nodes",
        communities.len(),
        assignment.assigned_count(),
        graph.node_count
    );

    Ok(CpmResult {
        k: config.k,
        clique_count: cliques.len(),
        communities,
        assignment,
    })
}
