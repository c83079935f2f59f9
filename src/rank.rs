//! Topological ranks: longest-path distance from the source in edges.
//!
//! Ranks drive the processing order of the schedule passes. A node's
//! rank is the maximum rank among its predecessors plus one, which is
//! only well-defined when every predecessor is finalized first, so the
//! computation runs over a topological order (Kahn's algorithm).

use rustc_hash::FxHashMap;
use std::collections::VecDeque;

use crate::graph::NodeId;
use crate::validate::ValidGraph;
use crate::InvariantError;

/// Rank of every node plus the `(rank, id)` processing order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankTable {
    ranks: FxHashMap<NodeId, u32>,
    order: Vec<(u32, NodeId)>,
}

impl RankTable {
    pub fn rank_of(&self, node: NodeId) -> Option<u32> {
        self.ranks.get(&node).copied()
    }

    /// Nodes sorted by `(rank, id)` ascending.
    pub fn order(&self) -> &[(u32, NodeId)] {
        &self.order
    }

    /// Node ids in ascending `(rank, id)` order.
    pub fn ascending(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.order.iter().map(|&(_, node)| node)
    }

    /// Node ids in descending `(rank, id)` order.
    pub fn descending(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.order.iter().rev().map(|&(_, node)| node)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// Compute the rank of every node in a validated graph.
///
/// `rank(0) = 0`; `rank(v) = max over predecessors u of rank(u) + 1`.
/// An incomplete topological order here means validation let a cycle
/// through, which is a core defect.
pub fn compute_ranks(valid: &ValidGraph<'_>) -> Result<RankTable, InvariantError> {
    let graph = valid.graph();
    let total = graph.node_count();

    let mut in_degree: FxHashMap<NodeId, usize> = graph
        .nodes()
        .iter()
        .map(|&node| (node, graph.predecessors_of(node).count()))
        .collect();

    // nodes() is sorted, so the seed order is deterministic.
    let mut queue: VecDeque<NodeId> = graph
        .nodes()
        .iter()
        .copied()
        .filter(|node| in_degree.get(node) == Some(&0))
        .collect();

    let mut ranks: FxHashMap<NodeId, u32> = FxHashMap::default();
    while let Some(node) = queue.pop_front() {
        let rank = graph
            .predecessors_of(node)
            .map(|pred| ranks.get(&pred).copied().unwrap_or(0) + 1)
            .max()
            .unwrap_or(0);
        ranks.insert(node, rank);

        for succ in graph.successors_of(node) {
            if let Some(degree) = in_degree.get_mut(&succ) {
                *degree -= 1;
                if *degree == 0 {
                    queue.push_back(succ);
                }
            }
        }
    }

    if ranks.len() != total {
        return Err(InvariantError::TopologicalOrderIncomplete {
            ordered: ranks.len(),
            total,
        });
    }

    let mut order: Vec<(u32, NodeId)> = ranks.iter().map(|(&node, &rank)| (rank, node)).collect();
    order.sort_unstable();

    Ok(RankTable { ranks, order })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Graph;
    use crate::records::{build_graph, TaskRecord};
    use crate::validate::validate;

    fn make_graph(rows: &[(i64, i64, &[i64])]) -> Graph {
        let records: Vec<TaskRecord> = rows
            .iter()
            .enumerate()
            .map(|(i, &(label, duration, preds))| {
                TaskRecord::new(label, duration, preds.to_vec(), i + 1)
            })
            .collect();
        build_graph(&records).unwrap().graph
    }

    #[test]
    fn test_ranks_of_reference_table() {
        let graph = make_graph(&[(1, 3, &[]), (2, 2, &[1]), (3, 4, &[1]), (4, 1, &[2, 3])]);
        let valid = validate(&graph).unwrap();
        let table = compute_ranks(&valid).unwrap();

        assert_eq!(table.rank_of(0), Some(0));
        assert_eq!(table.rank_of(1), Some(1));
        assert_eq!(table.rank_of(2), Some(2));
        assert_eq!(table.rank_of(3), Some(2));
        assert_eq!(table.rank_of(4), Some(3));
        assert_eq!(table.rank_of(5), Some(4)); // omega

        assert_eq!(
            table.order(),
            &[(0, 0), (1, 1), (2, 2), (2, 3), (3, 4), (4, 5)]
        );
    }

    #[test]
    fn test_rank_takes_longest_path() {
        // 3 is reachable from 1 directly (2 edges from alpha) and through
        // 2 (3 edges); the longer distance must win.
        let graph = make_graph(&[(1, 2, &[]), (2, 2, &[1]), (3, 1, &[1, 2])]);
        let valid = validate(&graph).unwrap();
        let table = compute_ranks(&valid).unwrap();

        assert_eq!(table.rank_of(3), Some(3));
    }

    #[test]
    fn test_descending_reverses_ascending() {
        let graph = make_graph(&[(1, 2, &[]), (2, 2, &[1])]);
        let valid = validate(&graph).unwrap();
        let table = compute_ranks(&valid).unwrap();

        let up: Vec<NodeId> = table.ascending().collect();
        let mut down: Vec<NodeId> = table.descending().collect();
        down.reverse();
        assert_eq!(up, down);
        assert_eq!(up.first(), Some(&0));
        assert_eq!(up.last(), Some(&3)); // omega has the greatest rank
    }
}
