//! Critical Path Method scheduling core.
//!
//! Builds a task dependency graph from precedence records, validates it
//! as a scheduling graph (acyclic, unique source and sink, non-negative
//! durations), then derives topological ranks, earliest/latest
//! schedules, total/free slack, and the critical paths. Reading input
//! tables and rendering results are left to the caller; everything here
//! is plain data in, plain data out.

use thiserror::Error;

pub mod critical;
pub mod graph;
pub mod rank;
pub mod records;
pub mod schedule;
pub mod slack;
pub mod trace;
pub mod validate;

pub use critical::{find_critical_paths, longest_path, LongestPath};
pub use graph::{Adjacency, BuildWarning, Days, Graph, GraphBuilder, NodeId, ALPHA, NO_EDGE};
pub use rank::{compute_ranks, RankTable};
pub use records::{build_graph, GraphBuild, RecordError, TaskRecord, MAX_DURATION, MAX_LABEL};
pub use schedule::{earliest_schedule, latest_schedule, ScheduleMap};
pub use slack::{compute_slack, Slack};
pub use trace::{EventLog, NullSink, TraceEvent, TraceSink};
pub use validate::{check, validate, validate_with_trace, ValidGraph, ValidationError};

/// A broken internal invariant: a core defect, not bad input.
///
/// These are never swallowed; each names the invariant so tests can
/// assert which one broke. They are fatal to the current computation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvariantError {
    #[error("graph has no start node entry")]
    MissingSource,
    #[error("graph has no completion node; construction did not finish")]
    MissingOmega,
    #[error("completion node {node} has duration {duration}, expected 0")]
    OmegaDuration { node: NodeId, duration: Days },
    #[error("topological order covered {ordered} of {total} nodes after validation")]
    TopologicalOrderIncomplete { ordered: usize, total: usize },
    #[error("node {node} has no predecessors at forward-pass time")]
    MissingPredecessors { node: NodeId },
    #[error("node {node} has no successors at backward-pass time")]
    MissingSuccessors { node: NodeId },
    #[error("node {node} has negative total slack {slack} after validation")]
    NegativeSlack { node: NodeId, slack: Days },
}

/// Any reason the pipeline stopped for the current graph.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Invariant(#[from] InvariantError),
}

/// Every derived view of one validated graph, ready for rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    pub ranks: RankTable,
    pub earliest: ScheduleMap,
    pub latest: ScheduleMap,
    pub slack: Slack,
    pub critical_paths: Vec<Vec<NodeId>>,
    pub longest: Option<LongestPath>,
}

/// Run the full pipeline on one graph.
///
/// Validation gates everything: when it fails, no schedule, slack or
/// critical-path output exists for this graph, and the caller may move
/// on to the next input table.
pub fn analyze(graph: &Graph) -> Result<Analysis, AnalysisError> {
    analyze_with_trace(graph, &mut NullSink)
}

/// Run the full pipeline, narrating validation to `sink`.
pub fn analyze_with_trace(
    graph: &Graph,
    sink: &mut dyn TraceSink,
) -> Result<Analysis, AnalysisError> {
    let valid = validate_with_trace(graph, sink)?;
    let ranks = compute_ranks(&valid)?;
    let earliest = earliest_schedule(&valid, &ranks)?;
    let latest = latest_schedule(&valid, &ranks, &earliest)?;
    let slack = compute_slack(&valid, &earliest, &latest)?;
    let critical_paths = find_critical_paths(&valid, &slack.total);
    let longest = longest_path(&valid, &critical_paths);

    Ok(Analysis {
        ranks,
        earliest,
        latest,
        slack,
        critical_paths,
        longest,
    })
}
