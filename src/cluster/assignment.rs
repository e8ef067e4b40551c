//! Node to community resolution

use crate::cluster::Community;
use serde::{Deserialize, Serialize};

/// Which communities each node belongs to.
///
/// Indexed by node index. Nodes found in no k-clique have an empty
/// membership list and no primary community.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Assignment {
    /// Community ids per node, in order of formation
    pub memberships: Vec<Vec<u32>>,

    /// Primary community per node
    pub primary: Vec<Option<u32>>,
}

impl Assignment {
    /// Resolve memberships and primary communities for `node_count` nodes.
    ///
    /// The primary community is the largest containing community; ties go
    /// to the lowest id.
    pub fn resolve(node_count: usize, communities: &[Community]) -> Self {
        let mut memberships: Vec<Vec<u32>> = vec![Vec::new(); node_count];

        let mut ordered: Vec<&Community> = communities.iter().collect();
        ordered.sort_by_key(|c| c.id);

        for community in &ordered {
            for &node in &community.members {
                memberships[node as usize].push(community.id);
            }
        }

        let size_of = |id: u32| {
            ordered
                .binary_search_by_key(&id, |c| c.id)
                .map(|pos| ordered[pos].size)
                .unwrap_or(0)
        };

        let primary = memberships
            .iter()
            .map(|ids| {
                // max_by_key keeps the last maximum, so compare on reversed id
                ids.iter()
                    .copied()
                    .max_by_key(|&id| (size_of(id), std::cmp::Reverse(id)))
            })
            .collect();

        Self { memberships, primary }
    }

    /// Community ids of a node
    pub fn communities_of(&self, node: usize) -> &[u32] {
        &self.memberships[node]
    }

    /// Primary community of a node
    pub fn primary_of(&self, node: usize) -> Option<u32> {
        self.primary[node]
    }

    /// Whether the node sits in no community
    pub fn is_unassigned(&self, node: usize) -> bool {
        self.memberships[node].is_empty()
    }

    /// Indices of nodes without any community
    pub fn unassigned_nodes(&self) -> Vec<u32> {
        (0..self.memberships.len())
            .filter(|&n| self.is_unassigned(n))
            .map(|n| n as u32)
            .collect()
    }

    /// Number of nodes with at least one community
    pub fn assigned_count(&self) -> usize {
        self.memberships.iter().filter(|m| !m.is_empty()).count()
    }

    /// Nodes belonging to more than one community
    pub fn overlapping_nodes(&self) -> Vec<u32> {
        (0..self.memberships.len())
            .filter(|&n| self.memberships[n].len() > 1)
            .map(|n| n as u32)
            .collect()
    }
}
