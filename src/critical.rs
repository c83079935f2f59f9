//! Critical path enumeration over zero-slack nodes.

use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::VecDeque;

use crate::graph::{Days, NodeId, ALPHA};
use crate::validate::ValidGraph;

/// The longest critical path and its total duration in days.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LongestPath {
    pub path: Vec<NodeId>,
    pub length: Days,
}

/// Enumerate every source-to-sink path whose nodes all have zero total
/// slack.
///
/// Breadth-first expansion over partial paths: start from `[0]`, extend
/// each path with every successor outside the non-critical set, and emit
/// whenever the terminal node is omega. Multiple critical paths are
/// valid and all are returned.
pub fn find_critical_paths(
    valid: &ValidGraph<'_>,
    total_slack: &FxHashMap<NodeId, Days>,
) -> Vec<Vec<NodeId>> {
    let graph = valid.graph();
    let Some(omega) = graph.omega() else {
        return Vec::new();
    };

    let non_critical: FxHashSet<NodeId> = total_slack
        .iter()
        .filter(|(_, &slack)| slack != 0)
        .map(|(&node, _)| node)
        .collect();

    let mut queue: VecDeque<Vec<NodeId>> = VecDeque::new();
    queue.push_back(vec![ALPHA]);
    let mut paths = Vec::new();

    while let Some(path) = queue.pop_front() {
        let Some(&node) = path.last() else {
            continue;
        };
        if node == omega {
            paths.push(path);
            continue;
        }
        for succ in graph.successors_of(node) {
            if non_critical.contains(&succ) {
                continue;
            }
            let mut extended = path.clone();
            extended.push(succ);
            queue.push_back(extended);
        }
    }

    paths
}

/// Pick the path with the greatest total duration; ties go to the
/// first-found path.
pub fn longest_path(valid: &ValidGraph<'_>, paths: &[Vec<NodeId>]) -> Option<LongestPath> {
    let graph = valid.graph();
    let mut best: Option<LongestPath> = None;

    for path in paths {
        let length: Days = path.iter().map(|&node| graph.duration_of(node)).sum();
        let better = match &best {
            Some(current) => length > current.length,
            None => true,
        };
        if better {
            best = Some(LongestPath {
                path: path.clone(),
                length,
            });
        }
    }

    best
}
