//! Enumeration of all k-cliques
//!
//! Cliques are produced by backtracking over neighbour intersections. A
//! search rooted at node `v` only extends with nodes above `v`, and every
//! extension only considers candidates after the one just taken, so each
//! clique is found exactly once and in lexicographic order of its sorted
//! members.

use crate::config::validate_k;
use crate::error::Result;
use crate::graph::algorithms::{higher_neighbors, intersect_sorted};
use crate::graph::CompressedGraph;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// A fully connected node set of size k (node indices, ascending)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Clique(Vec<u32>);

impl Clique {
    /// Build a clique from arbitrary member order
    pub fn new(mut members: Vec<u32>) -> Self {
        members.sort_unstable();
        members.dedup();
        Self(members)
    }

    pub fn members(&self) -> &[u32] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of shared members with another clique
    pub fn overlap(&self, other: &Clique) -> usize {
        intersect_sorted(&self.0, &other.0).len()
    }

    /// Whether the two cliques share at least `n` members
    pub fn shares_at_least(&self, other: &Clique, n: usize) -> bool {
        self.overlap(other) >= n
    }

    /// Resolve members to their string ids
    pub fn ids<'g>(&self, graph: &'g CompressedGraph) -> Vec<&'g str> {
        self.0.iter().map(|&n| graph.node_id(n as usize)).collect()
    }
}

/// One level of the search: the candidates still open at this depth
struct Frame {
    candidates: Vec<u32>,
    next: usize,
}

/// Lazy iterator over all k-cliques of a graph.
///
/// The search stack never grows deeper than `k` frames.
pub struct KCliques<'g> {
    graph: &'g CompressedGraph,
    k: usize,
    roots: Range<usize>,
    current: Vec<u32>,
    stack: Vec<Frame>,
}

impl<'g> KCliques<'g> {
    /// Iterate every k-clique of the graph
    pub fn new(graph: &'g CompressedGraph, k: usize) -> Result<Self> {
        Self::over_roots(graph, k, 0..graph.node_count)
    }

    /// Iterate the k-cliques whose smallest member lies in `roots`
    pub fn over_roots(graph: &'g CompressedGraph, k: usize, roots: Range<usize>) -> Result<Self> {
        validate_k(k)?;
        Ok(Self::unchecked(graph, k, roots))
    }

    fn unchecked(graph: &'g CompressedGraph, k: usize, roots: Range<usize>) -> Self {
        let end = roots.end.min(graph.node_count);
        Self {
            graph,
            k,
            roots: roots.start.min(end)..end,
            current: Vec::with_capacity(k),
            stack: Vec::with_capacity(k),
        }
    }

    /// Start the search at the next root that can still hold a k-clique
    fn push_next_root(&mut self) -> bool {
        for root in self.roots.by_ref() {
            let candidates = higher_neighbors(self.graph, root);
            if candidates.len() + 1 >= self.k {
                self.current.push(root as u32);
                self.stack.push(Frame {
                    candidates: candidates.to_vec(),
                    next: 0,
                });
                return true;
            }
        }
        false
    }
}

impl Iterator for KCliques<'_> {
    type Item = Clique;

    fn next(&mut self) -> Option<Clique> {
        loop {
            if self.stack.is_empty() && !self.push_next_root() {
                return None;
            }
            let Some(frame) = self.stack.last_mut() else {
                return None;
            };

            if frame.next >= frame.candidates.len() {
                self.stack.pop();
                self.current.pop();
                continue;
            }

            let node = frame.candidates[frame.next];
            frame.next += 1;

            if self.current.len() + 1 == self.k {
                let mut members = self.current.clone();
                members.push(node);
                return Some(Clique(members));
            }

            let rest = &frame.candidates[frame.next..];
            // Cheap bound before paying for the intersection
            if self.current.len() + 1 + rest.len() < self.k {
                continue;
            }

            let candidates = intersect_sorted(rest, self.graph.neighbors(node as usize));
            if self.current.len() + 1 + candidates.len() >= self.k {
                self.current.push(node);
                self.stack.push(Frame { candidates, next: 0 });
            }
        }
    }
}

/// Collect all k-cliques in canonical order.
///
/// Roots are searched in parallel; each root fills its own list and the
/// lists are concatenated in root order, so the output matches `KCliques`.
pub fn enumerate_k_cliques(graph: &CompressedGraph, k: usize) -> Result<Vec<Clique>> {
    validate_k(k)?;

    log::debug!("Enumerating {}-cliques over {} nodes", k, graph.node_count);

    let per_root: Vec<Vec<Clique>> = (0..graph.node_count)
        .into_par_iter()
        .map(|root| KCliques::unchecked(graph, k, root..root + 1).collect())
        .collect();

    let cliques: Vec<Clique> = per_root.into_iter().flatten().collect();
    log::info!("Found {} cliques of size {}", cliques.len(), k);

    Ok(cliques)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DuplicatePolicy;
    use crate::error::CpmError;
    use crate::graph::builder::build_graph;
    use crate::graph::EdgeRecord;
    use itertools::Itertools;
    use std::collections::HashSet;

    fn graph_from(pairs: &[(&str, &str)]) -> CompressedGraph {
        let edges: Vec<EdgeRecord> = pairs.iter().map(|&(a, b)| EdgeRecord::new(a, b, 1.0)).collect();
        build_graph(&edges, &[], 1.0, DuplicatePolicy::Sum).unwrap()
    }

    fn complete(ids: &[&'static str]) -> Vec<(&'static str, &'static str)> {
        ids.iter().copied().tuple_combinations().collect()
    }

    /// Brute force over all k-subsets
    fn brute_force(graph: &CompressedGraph, k: usize) -> Vec<Clique> {
        (0..graph.node_count as u32)
            .combinations(k)
            .filter(|nodes| {
                nodes.iter().tuple_combinations().all(|(&a, &b)| graph.has_edge(a as usize, b))
            })
            .map(Clique::new)
            .collect()
    }

    #[test]
    fn triangle_has_one_three_clique() {
        let graph = graph_from(&[("A", "B"), ("B", "C"), ("C", "A")]);
        let cliques = enumerate_k_cliques(&graph, 3).unwrap();
        assert_eq!(cliques.len(), 1);
        assert_eq!(cliques[0].ids(&graph), vec!["A", "B", "C"]);
    }

    #[test]
    fn k_two_yields_every_edge() {
        let graph = graph_from(&[("A", "B"), ("B", "C"), ("D", "E")]);
        let cliques = enumerate_k_cliques(&graph, 2).unwrap();
        assert_eq!(cliques.len(), graph.edge_count());
    }

    #[test]
    fn complete_graph_yields_all_subsets() {
        let graph = graph_from(&complete(&["A", "B", "C", "D", "E", "F"]));
        // C(6,3) = 20, C(6,4) = 15, C(6,6) = 1
        assert_eq!(enumerate_k_cliques(&graph, 3).unwrap().len(), 20);
        assert_eq!(enumerate_k_cliques(&graph, 4).unwrap().len(), 15);
        assert_eq!(enumerate_k_cliques(&graph, 6).unwrap().len(), 1);
        assert!(enumerate_k_cliques(&graph, 7).unwrap().is_empty());
    }

    #[test]
    fn output_is_sorted_and_unique() {
        let mut pairs = complete(&["A", "B", "C", "D"]);
        pairs.extend(complete(&["C", "D", "E", "F"]));
        pairs.extend([("F", "G"), ("G", "A"), ("B", "G")]);
        let graph = graph_from(&pairs);

        let cliques = enumerate_k_cliques(&graph, 3).unwrap();
        assert!(cliques.windows(2).all(|w| w[0] < w[1]));
        let unique: HashSet<_> = cliques.iter().collect();
        assert_eq!(unique.len(), cliques.len());
    }

    #[test]
    fn matches_brute_force() {
        let pairs = [
            ("A", "B"), ("A", "C"), ("B", "C"), ("B", "D"), ("C", "D"),
            ("D", "E"), ("E", "F"), ("D", "F"), ("C", "E"), ("A", "F"),
            ("G", "H"), ("H", "I"), ("G", "I"), ("I", "J"),
        ];
        let graph = graph_from(&pairs);
        for k in 2..=5 {
            let found = enumerate_k_cliques(&graph, k).unwrap();
            assert_eq!(found, brute_force(&graph, k), "k = {k}");
            for clique in &found {
                assert_eq!(clique.len(), k);
            }
        }
    }

    #[test]
    fn lazy_iterator_matches_parallel_collection() {
        let mut pairs = complete(&["A", "B", "C", "D", "E"]);
        pairs.extend([("E", "F"), ("F", "G"), ("E", "G")]);
        let graph = graph_from(&pairs);

        let lazy: Vec<Clique> = KCliques::new(&graph, 3).unwrap().collect();
        assert_eq!(lazy, enumerate_k_cliques(&graph, 3).unwrap());

        let first_two: Vec<Clique> = KCliques::new(&graph, 3).unwrap().take(2).collect();
        assert_eq!(first_two, lazy[..2].to_vec());
    }

    #[test]
    fn rejects_k_below_two() {
        let graph = graph_from(&[("A", "B")]);
        let err = enumerate_k_cliques(&graph, 1).unwrap_err();
        assert!(matches!(err, CpmError::InvalidParameter { name: "k", .. }));
        assert!(KCliques::new(&graph, 0).is_err());
    }

    #[test]
    fn empty_graph_has_no_cliques() {
        let graph = build_graph(&[], &[], 1.0, DuplicatePolicy::Sum).unwrap();
        assert!(enumerate_k_cliques(&graph, 3).unwrap().is_empty());
    }

    #[test]
    fn clique_overlap_counts_shared_members() {
        let a = Clique::new(vec![3, 1, 2]);
        let b = Clique::new(vec![2, 3, 4]);
        assert_eq!(a.members(), &[1, 2, 3]);
        assert_eq!(a.overlap(&b), 2);
        assert!(a.shares_at_least(&b, 2));
        assert!(!a.shares_at_least(&b, 3));
    }
}
