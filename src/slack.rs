//! Total and free slack per task.
//!
//! Total slack (total float) is how long a task can slip without moving
//! project completion; free slack (free float) is how long it can slip
//! without delaying any immediate successor.

use rustc_hash::FxHashMap;

use crate::graph::{Days, NodeId};
use crate::schedule::ScheduleMap;
use crate::validate::ValidGraph;
use crate::InvariantError;

/// Slack values for every node; omega is fixed at 0 in both maps.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Slack {
    pub total: FxHashMap<NodeId, Days>,
    pub free: FxHashMap<NodeId, Days>,
}

/// Compute total and free slack from the two schedules.
///
/// `total(v) = latest(v) - earliest(v)`; a negative value after
/// validation is a core defect and aborts the computation.
/// `free(v) = max(0, min over successors of earliest(s) - (earliest(v) + duration(v)))`;
/// the clamp absorbs ordering artifacts and stays.
pub fn compute_slack(
    valid: &ValidGraph<'_>,
    earliest: &ScheduleMap,
    latest: &ScheduleMap,
) -> Result<Slack, InvariantError> {
    let graph = valid.graph();
    let omega = graph.omega().ok_or(InvariantError::MissingOmega)?;
    let mut slack = Slack::default();

    for &node in graph.nodes() {
        if node == omega {
            slack.total.insert(node, 0);
            slack.free.insert(node, 0);
            continue;
        }

        let early = earliest.get(&node).copied().unwrap_or(0);
        let late = latest.get(&node).copied().unwrap_or(0);
        let total = late - early;
        if total < 0 {
            return Err(InvariantError::NegativeSlack { node, slack: total });
        }
        slack.total.insert(node, total);

        let mut min_successor_start: Option<Days> = None;
        for succ in graph.successors_of(node) {
            let succ_early = earliest.get(&succ).copied().unwrap_or(0);
            min_successor_start =
                Some(min_successor_start.map_or(succ_early, |m: Days| m.min(succ_early)));
        }
        let free = min_successor_start
            .map(|m| (m - (early + graph.duration_of(node))).max(0))
            .unwrap_or(0);
        slack.free.insert(node, free);
    }

    Ok(slack)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Graph;
    use crate::rank::compute_ranks;
    use crate::records::{build_graph, TaskRecord};
    use crate::schedule::{earliest_schedule, latest_schedule};
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

    fn slack_of(graph: &Graph) -> Slack {
        let valid = validate(graph).unwrap();
        let ranks = compute_ranks(&valid).unwrap();
        let earliest = earliest_schedule(&valid, &ranks).unwrap();
        let latest = latest_schedule(&valid, &ranks, &earliest).unwrap();
        compute_slack(&valid, &earliest, &latest).unwrap()
    }

    #[test]
    fn test_reference_table_slack() {
        let graph = make_graph(&[(1, 3, &[]), (2, 2, &[1]), (3, 4, &[1]), (4, 1, &[2, 3])]);
        let slack = slack_of(&graph);

        assert_eq!(slack.total.get(&2), Some(&2));
        assert_eq!(slack.total.get(&3), Some(&0));
        assert_eq!(slack.total.get(&1), Some(&0));
        assert_eq!(slack.total.get(&4), Some(&0));

        // 2 can slip two days without pushing 4 (earliest(4) = 7,
        // earliest(2) + duration(2) = 5).
        assert_eq!(slack.free.get(&2), Some(&2));
        assert_eq!(slack.free.get(&3), Some(&0));
    }

    #[test]
    fn test_slack_is_nonnegative_and_free_bounded_by_total() {
        let graph = make_graph(&[
            (1, 5, &[]),
            (2, 3, &[]),
            (3, 2, &[1, 2]),
            (4, 6, &[2]),
            (5, 1, &[3, 4]),
        ]);
        let slack = slack_of(&graph);

        for (&node, &total) in &slack.total {
            assert!(total >= 0, "total slack of {} is {}", node, total);
            let free = slack.free.get(&node).copied().unwrap_or(0);
            assert!(
                free <= total,
                "free slack {} exceeds total {} on node {}",
                free,
                total,
                node
            );
        }
    }

    #[test]
    fn test_omega_slack_fixed_at_zero() {
        let graph = make_graph(&[(1, 3, &[])]);
        let slack = slack_of(&graph);
        let omega = 2;

        assert_eq!(slack.total.get(&omega), Some(&0));
        assert_eq!(slack.free.get(&omega), Some(&0));
    }
}
