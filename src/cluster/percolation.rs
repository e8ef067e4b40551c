//! Percolation of k-cliques into overlapping communities

use crate::cluster::cliques::Clique;
use crate::config::validate_k;
use crate::error::{CpmError, Result};
use itertools::Itertools;
use std::collections::HashMap;

/// Union-Find data structure for connected component analysis
pub struct DisjointSets {
    /// Parent pointers (parent[i] = parent of element i)
    parent: Vec<u32>,

    /// Size of each set, valid at roots
    size: Vec<u32>,
}

impl DisjointSets {
    /// Create a new DisjointSets data structure
    pub fn new(size: usize) -> Self {
        Self {
            parent: (0..size as u32).collect(),
            size: vec![1; size],
        }
    }

    /// Find the root of the set containing x with path compression
    pub fn find(&mut self, x: u32) -> u32 {
        let mut root = x;
        while self.parent[root as usize] != root {
            root = self.parent[root as usize];
        }

        // Point every visited element straight at the root
        let mut current = x;
        while current != root {
            let next = self.parent[current as usize];
            self.parent[current as usize] = root;
            current = next;
        }

        root
    }

    /// Union the sets containing x and y. Returns false if already joined.
    pub fn union(&mut self, x: u32, y: u32) -> bool {
        let root_x = self.find(x);
        let root_y = self.find(y);

        if root_x == root_y {
            return false;
        }

        // Union by size: attach smaller tree under root of larger tree
        let (big, small) = if self.size[root_x as usize] >= self.size[root_y as usize] {
            (root_x, root_y)
        } else {
            (root_y, root_x)
        };
        self.parent[small as usize] = big;
        self.size[big as usize] += self.size[small as usize];

        true
    }

    /// Get the size of the set containing x
    pub fn size(&mut self, x: u32) -> u32 {
        let root = self.find(x);
        self.size[root as usize]
    }
}

/// A connected component of the clique overlap graph
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PercolatedComponent {
    /// Indices of the member cliques, ascending
    pub cliques: Vec<usize>,

    /// Union of the member cliques' nodes, ascending
    pub members: Vec<u32>,
}

/// Edges of the clique overlap graph: pairs (i, j), i < j, of cliques
/// sharing at least k-1 nodes.
///
/// Two distinct k-cliques share k-1 nodes exactly when they have a common
/// (k-1)-face, so cliques are bucketed by face instead of compared pairwise.
pub fn overlap_edges(cliques: &[Clique], k: usize) -> Result<Vec<(usize, usize)>> {
    validate_k(k)?;
    if let Some((idx, clique)) = cliques.iter().enumerate().find(|(_, c)| c.len() != k) {
        return Err(CpmError::invalid(
            "k",
            format!("clique {} has {} members, expected {}", idx, clique.len(), k),
        ));
    }

    let mut faces: HashMap<Vec<u32>, Vec<usize>> = HashMap::new();
    for (idx, clique) in cliques.iter().enumerate() {
        let members = clique.members();
        for skip in 0..members.len() {
            let face: Vec<u32> = members.iter()
                .enumerate()
                .filter(|&(pos, _)| pos != skip)
                .map(|(_, &node)| node)
                .collect();
            faces.entry(face).or_default().push(idx);
        }
    }

    let mut edges: Vec<(usize, usize)> = faces
        .into_values()
        .filter(|bucket| bucket.len() > 1)
        .flat_map(|bucket| bucket.into_iter().tuple_combinations::<(usize, usize)>())
        .collect();

    edges.sort_unstable();
    edges.dedup();

    Ok(edges)
}

/// Merge k-cliques into components of the overlap graph.
///
/// Components come out ordered by their first (lowest-index) clique, which
/// makes component positions stable for a canonical clique order.
pub fn percolate(cliques: &[Clique], k: usize) -> Result<Vec<PercolatedComponent>> {
    let edges = overlap_edges(cliques, k)?;

    log::debug!(
        "Overlap graph has {} cliques and {} adjacencies",
        cliques.len(),
        edges.len()
    );

    let mut sets = DisjointSets::new(cliques.len());
    for &(a, b) in &edges {
        sets.union(a as u32, b as u32);
    }

    // Group cliques by root, in order of first appearance
    let mut root_to_slot: HashMap<u32, usize> = HashMap::new();
    let mut groups: Vec<Vec<usize>> = Vec::new();
    for idx in 0..cliques.len() {
        let root = sets.find(idx as u32);
        let slot = *root_to_slot.entry(root).or_insert_with(|| {
            groups.push(Vec::new());
            groups.len() - 1
        });
        groups[slot].push(idx);
    }

    let components = groups
        .into_iter()
        .map(|clique_ids| {
            let members: Vec<u32> = clique_ids.iter()
                .flat_map(|&idx| cliques[idx].members().iter().copied())
                .sorted_unstable()
                .dedup()
                .collect();
            PercolatedComponent {
                cliques: clique_ids,
                members,
            }
        })
        .collect();

    Ok(components)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cliques(sets: &[&[u32]]) -> Vec<Clique> {
        sets.iter().map(|s| Clique::new(s.to_vec())).collect()
    }

    #[test]
    fn disjoint_sets_union_by_size() {
        let mut sets = DisjointSets::new(5);
        assert!(sets.union(0, 1));
        assert!(sets.union(2, 1));
        assert!(!sets.union(0, 2));
        assert_eq!(sets.size(2), 3);
        assert_eq!(sets.size(3), 1);
        assert_eq!(sets.find(0), sets.find(2));
        assert_ne!(sets.find(0), sets.find(4));
    }

    #[test]
    fn overlap_requires_k_minus_one_shared() {
        // {0,1,2} and {1,2,3} share two nodes; {2,4,5} shares one with each
        let cs = cliques(&[&[0, 1, 2], &[1, 2, 3], &[2, 4, 5]]);
        assert_eq!(overlap_edges(&cs, 3).unwrap(), vec![(0, 1)]);
    }

    #[test]
    fn overlap_edges_match_pairwise_check() {
        let cs = cliques(&[
            &[0, 1, 2, 3], &[0, 1, 2, 4], &[0, 1, 3, 4], &[1, 2, 3, 4],
            &[5, 6, 7, 8], &[2, 3, 5, 6],
        ]);
        let expected: Vec<(usize, usize)> = (0..cs.len())
            .tuple_combinations()
            .filter(|&(a, b)| cs[a].shares_at_least(&cs[b], 3))
            .collect();
        assert_eq!(overlap_edges(&cs, 4).unwrap(), expected);
    }

    #[test]
    fn lone_clique_forms_its_own_component() {
        let cs = cliques(&[&[0, 1, 2]]);
        let components = percolate(&cs, 3).unwrap();
        assert_eq!(components.len(), 1);
        assert_eq!(components[0].members, vec![0, 1, 2]);
        assert_eq!(components[0].cliques, vec![0]);
    }

    #[test]
    fn chains_percolate_transitively() {
        // 0-1 overlap, 1-2 overlap, 0-2 do not
        let cs = cliques(&[&[0, 1, 2], &[1, 2, 3], &[2, 3, 4], &[7, 8, 9]]);
        assert!(!cs[0].shares_at_least(&cs[2], 2));

        let components = percolate(&cs, 3).unwrap();
        assert_eq!(components.len(), 2);
        assert_eq!(components[0].members, vec![0, 1, 2, 3, 4]);
        assert_eq!(components[0].cliques, vec![0, 1, 2]);
        assert_eq!(components[1].members, vec![7, 8, 9]);
    }

    #[test]
    fn components_ordered_by_first_clique() {
        let cs = cliques(&[&[0, 1, 2], &[5, 6, 7], &[1, 2, 9]]);
        let components = percolate(&cs, 3).unwrap();
        assert_eq!(components[0].cliques, vec![0, 2]);
        assert_eq!(components[1].cliques, vec![1]);
    }

    #[test]
    fn result_is_independent_of_clique_order() {
        let forward = cliques(&[&[0, 1, 2], &[1, 2, 3], &[4, 5, 6], &[3, 4, 5], &[8, 9, 10]]);
        let mut reversed = forward.clone();
        reversed.reverse();

        let mut a: Vec<Vec<u32>> = percolate(&forward, 3).unwrap().into_iter().map(|c| c.members).collect();
        let mut b: Vec<Vec<u32>> = percolate(&reversed, 3).unwrap().into_iter().map(|c| c.members).collect();
        a.sort();
        b.sort();
        assert_eq!(a, b);
    }

    #[test]
    fn rejects_cliques_of_another_size() {
        let cs = cliques(&[&[0, 1, 2], &[1, 2, 3, 4]]);
        let err = percolate(&cs, 3).unwrap_err();
        assert!(matches!(err, CpmError::InvalidParameter { name: "k", .. }));
        assert!(overlap_edges(&cs, 4).is_err());
    }

    #[test]
    fn empty_input_has_no_components() {
        assert!(percolate(&[], 3).unwrap().is_empty());
    }
}
