//! Feasibility of simultaneous resource demands.
//!
//! Each demand is a set of interchangeable resources. A situation is
//! resolvable when every demand can be served by a *different* resource drawn
//! from its own set (a system of distinct representatives).
//!
//! Two strategies with identical accept/reject results are provided. Small
//! instances use exhaustive backtracking; anything with more than
//! [`BRUTE_FORCE_LIMIT`] demands goes through Hopcroft–Karp maximum matching.

use std::collections::{BTreeSet, HashMap, VecDeque};

use crate::resources::ResourceId;

/// Largest number of simultaneous demands checked by enumeration.
pub const BRUTE_FORCE_LIMIT: usize = 4;

/// Whether one distinct resource can be assigned to every demand.
///
/// No demands is trivially resolvable; any empty demand never is.
pub fn has_resolvable_resource_groups(demands: &[BTreeSet<ResourceId>]) -> bool {
    if demands.len() <= BRUTE_FORCE_LIMIT {
        brute_force(demands)
    } else {
        hopcroft_karp(demands)
    }
}

/// Enumerate assignments demand by demand, backtracking on reuse.
pub fn brute_force(demands: &[BTreeSet<ResourceId>]) -> bool {
    fn assign(demands: &[BTreeSet<ResourceId>], used: &mut Vec<ResourceId>) -> bool {
        let Some((first, rest)) = demands.split_first() else {
            return true;
        };
        for id in first {
            if used.contains(id) {
                continue;
            }
            used.push(*id);
            if assign(rest, used) {
                return true;
            }
            used.pop();
        }
        false
    }

    assign(demands, &mut Vec::with_capacity(demands.len()))
}

/// Maximum bipartite matching between demands and resources; resolvable iff
/// the matching saturates every demand.
pub fn hopcroft_karp(demands: &[BTreeSet<ResourceId>]) -> bool {
    if demands.iter().any(BTreeSet::is_empty) {
        return false;
    }

    let mut index: HashMap<ResourceId, usize> = HashMap::new();
    let adjacency: Vec<Vec<usize>> = demands
        .iter()
        .map(|demand| {
            demand
                .iter()
                .map(|id| {
                    let next = index.len();
                    *index.entry(*id).or_insert(next)
                })
                .collect()
        })
        .collect();

    // Pigeonhole: fewer resources than demands can never work.
    if index.len() < demands.len() {
        return false;
    }

    let mut graph = Matching::new(adjacency, index.len());
    graph.maximum() == demands.len()
}

const UNMATCHED: usize = usize::MAX;

struct Matching {
    adjacency: Vec<Vec<usize>>,
    left_match: Vec<usize>,
    right_match: Vec<usize>,
    layer: Vec<usize>,
}

impl Matching {
    fn new(adjacency: Vec<Vec<usize>>, right_count: usize) -> Self {
        let left_count = adjacency.len();
        Self {
            adjacency,
            left_match: vec![UNMATCHED; left_count],
            right_match: vec![UNMATCHED; right_count],
            layer: vec![UNMATCHED; left_count],
        }
    }

    fn maximum(&mut self) -> usize {
        let mut size = 0;
        while self.build_layers() {
            for left in 0..self.adjacency.len() {
                if self.left_match[left] == UNMATCHED && self.augment(left) {
                    size += 1;
                }
            }
        }
        size
    }

    /// BFS from every free demand; true when some free resource is reachable.
    fn build_layers(&mut self) -> bool {
        let mut queue = VecDeque::new();
        for (left, matched) in self.left_match.iter().enumerate() {
            if *matched == UNMATCHED {
                self.layer[left] = 0;
                queue.push_back(left);
            } else {
                self.layer[left] = UNMATCHED;
            }
        }

        let mut found_free = false;
        while let Some(left) = queue.pop_front() {
            for &right in &self.adjacency[left] {
                match self.right_match[right] {
                    UNMATCHED => found_free = true,
                    next if self.layer[next] == UNMATCHED => {
                        self.layer[next] = self.layer[left] + 1;
                        queue.push_back(next);
                    }
                    _ => {}
                }
            }
        }
        found_free
    }

    /// DFS along the layered graph for an augmenting path.
    fn augment(&mut self, left: usize) -> bool {
        for i in 0..self.adjacency[left].len() {
            let right = self.adjacency[left][i];
            let partner = self.right_match[right];
            let advances = partner == UNMATCHED
                || (self.layer[partner] == self.layer[left] + 1 && self.augment(partner));
            if advances {
                self.left_match[left] = right;
                self.right_match[right] = left;
                return true;
            }
        }
        self.layer[left] = UNMATCHED;
        false
    }
}
