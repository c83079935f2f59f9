//! Earliest and latest schedules over a validated graph.
//!
//! The forward pass walks nodes in ascending rank order and pushes each
//! task as early as its predecessors allow; the backward pass walks in
//! descending rank order and pulls each task as late as its successors
//! tolerate without delaying project completion.

use rustc_hash::FxHashMap;

use crate::graph::{Days, NodeId, ALPHA};
use crate::rank::RankTable;
use crate::validate::ValidGraph;
use crate::InvariantError;

/// Node id to start date, in days from project start.
pub type ScheduleMap = FxHashMap<NodeId, Days>;

/// Forward pass: earliest start date of every node.
///
/// `earliest(0) = 0`; otherwise the maximum over predecessors of their
/// earliest date plus their duration. Every non-source node of a
/// validated graph has at least one predecessor, so a node without any
/// is a core defect, not bad input.
pub fn earliest_schedule(
    valid: &ValidGraph<'_>,
    ranks: &RankTable,
) -> Result<ScheduleMap, InvariantError> {
    let graph = valid.graph();
    let mut earliest = ScheduleMap::default();
    earliest.insert(ALPHA, 0);

    for node in ranks.ascending() {
        if node == ALPHA {
            continue;
        }
        let mut start: Option<Days> = None;
        for pred in graph.predecessors_of(node) {
            let candidate = earliest.get(&pred).copied().unwrap_or(0) + graph.duration_of(pred);
            start = Some(start.map_or(candidate, |s| s.max(candidate)));
        }
        let start = start.ok_or(InvariantError::MissingPredecessors { node })?;
        earliest.insert(node, start);
    }

    Ok(earliest)
}

/// Backward pass: latest start date of every node.
///
/// The project must finish at its earliest completion date, so
/// `latest(omega) = earliest(omega)`; otherwise the minimum over
/// successors of their latest date, minus the node's own duration. The
/// source is forced back to 0 at the end.
pub fn latest_schedule(
    valid: &ValidGraph<'_>,
    ranks: &RankTable,
    earliest: &ScheduleMap,
) -> Result<ScheduleMap, InvariantError> {
    let graph = valid.graph();
    let omega = graph.omega().ok_or(InvariantError::MissingOmega)?;
    let completion = earliest.get(&omega).copied().unwrap_or(0);

    let mut latest = ScheduleMap::default();
    latest.insert(omega, completion);

    for node in ranks.descending() {
        if node == omega {
            continue;
        }
        let mut end: Option<Days> = None;
        for succ in graph.successors_of(node) {
            if let Some(&date) = latest.get(&succ) {
                end = Some(end.map_or(date, |e: Days| e.min(date)));
            }
        }
        let end = end.ok_or(InvariantError::MissingSuccessors { node })?;
        latest.insert(node, end - graph.duration_of(node));
    }

    latest.insert(ALPHA, 0);
    Ok(latest)
}
