//! Clique percolation module

pub mod cliques;
pub mod percolation;
pub mod assignment;
pub mod metrics;
pub mod detection;

pub use assignment::Assignment;
pub use cliques::{enumerate_k_cliques, Clique, KCliques};
pub use detection::{detect_communities, CpmResult};

use serde::{Serialize, Deserialize};

/// An overlapping community: the union of a chain of percolating k-cliques
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Community {
    /// Stable identifier, in order of formation
    pub id: u32,

    /// Members of this community (node indices, ascending)
    pub members: Vec<u32>,

    /// Size of the community
    pub size: usize,

    /// Number of k-cliques percolated into this community
    pub clique_count: usize,

    /// Density: actual edges / potential edges
    pub density: f32,

    /// Members with the highest degree inside the community
    pub central_nodes: Vec<u32>,

    /// Display label (majority faction and size)
    pub label: String,
}
