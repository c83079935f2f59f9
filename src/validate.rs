//! Structural validation of scheduling graphs.
//!
//! A graph is a legal scheduling graph when it is acyclic, carries no
//! negative duration, and has the alpha node as its unique source. Cycle
//! detection uses entry-point elimination: strip the predecessor-free
//! frontier until nothing remains, or fail when a non-empty remainder has
//! no frontier.

use rustc_hash::FxHashSet;
use thiserror::Error;

use crate::graph::{Days, Graph, NodeId, ALPHA};
use crate::trace::{NullSink, TraceEvent, TraceSink};
use crate::{AnalysisError, InvariantError};

/// Structural failures that make a graph unusable for scheduling.
///
/// These reject the current graph only; the caller may move on to the
/// next input table.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("the graph contains at least one cycle; blocked nodes: {remaining:?}")]
    Cycle { remaining: Vec<NodeId> },
    #[error("task {node} has negative duration {duration}")]
    NegativeDuration { node: NodeId, duration: Days },
    #[error("start node has duration {duration}, expected 0")]
    SourceDuration { duration: Days },
    #[error("start node has no successors; the graph has no unique source")]
    SourceIsolated,
}

/// Witness that a graph passed [`validate`].
///
/// Downstream stages take this instead of a raw [`Graph`], so an
/// unvalidated graph can never reach them.
#[derive(Debug, Clone, Copy)]
pub struct ValidGraph<'a> {
    graph: &'a Graph,
}

impl<'a> ValidGraph<'a> {
    pub fn graph(&self) -> &'a Graph {
        self.graph
    }
}

/// Validate a graph, discarding the elimination narrative.
pub fn validate(graph: &Graph) -> Result<ValidGraph<'_>, AnalysisError> {
    validate_with_trace(graph, &mut NullSink)
}

/// Validate a graph, narrating each elimination round to `sink`.
///
/// Checks run in a fixed order (cycle, negative durations, source); the
/// first failure is returned. Use [`check`] to collect every failure.
pub fn validate_with_trace<'a>(
    graph: &'a Graph,
    sink: &mut dyn TraceSink,
) -> Result<ValidGraph<'a>, AnalysisError> {
    ensure_well_formed(graph)?;
    if let Some(failure) = run_checks(graph, sink).into_iter().next() {
        return Err(failure.into());
    }
    Ok(ValidGraph { graph })
}

/// Run every check and return all failures, in check order.
pub fn check(graph: &Graph) -> Vec<ValidationError> {
    run_checks(graph, &mut NullSink)
}

/// Construction-defect guard: a graph reaching validation without its
/// synthetic endpoints is a bug in the builder path, not bad input.
fn ensure_well_formed(graph: &Graph) -> Result<(), InvariantError> {
    if !graph.durations().contains_key(&ALPHA) {
        return Err(InvariantError::MissingSource);
    }
    let omega = graph.omega().ok_or(InvariantError::MissingOmega)?;
    let duration = graph.duration_of(omega);
    if duration != 0 {
        return Err(InvariantError::OmegaDuration {
            node: omega,
            duration,
        });
    }
    Ok(())
}

fn run_checks(graph: &Graph, sink: &mut dyn TraceSink) -> Vec<ValidationError> {
    let mut failures = Vec::new();

    if let Err(cycle) = detect_cycle(graph, sink) {
        failures.push(cycle);
    }
    failures.extend(negative_durations(graph));
    failures.extend(check_source(graph));

    failures
}

/// Entry-point elimination over the predecessor relation.
fn detect_cycle(graph: &Graph, sink: &mut dyn TraceSink) -> Result<(), ValidationError> {
    let mut removed: FxHashSet<NodeId> = FxHashSet::default();
    let mut remaining: FxHashSet<NodeId> = graph.nodes().iter().copied().collect();

    while !remaining.is_empty() {
        let frontier = graph.nodes_with_no_predecessors(&removed);
        if frontier.is_empty() {
            let blocked = sorted(&remaining);
            sink.record(TraceEvent::CycleDetected {
                blocked: blocked.clone(),
            });
            return Err(ValidationError::Cycle { remaining: blocked });
        }

        sink.record(TraceEvent::Frontier {
            nodes: sorted(&frontier),
        });
        for node in &frontier {
            remaining.remove(node);
        }
        removed.extend(frontier);
        sink.record(TraceEvent::Remaining {
            nodes: sorted(&remaining),
        });
    }

    Ok(())
}

fn negative_durations(graph: &Graph) -> Vec<ValidationError> {
    let mut offenders: Vec<(NodeId, Days)> = graph
        .durations()
        .iter()
        .filter(|(_, &duration)| duration < 0)
        .map(|(&node, &duration)| (node, duration))
        .collect();
    offenders.sort_unstable();
    offenders
        .into_iter()
        .map(|(node, duration)| ValidationError::NegativeDuration { node, duration })
        .collect()
}

fn check_source(graph: &Graph) -> Vec<ValidationError> {
    let mut failures = Vec::new();
    let duration = graph.duration_of(ALPHA);
    if duration != 0 {
        failures.push(ValidationError::SourceDuration { duration });
    }
    if graph.successors_of(ALPHA).is_empty() {
        failures.push(ValidationError::SourceIsolated);
    }
    failures
}

fn sorted(set: &FxHashSet<NodeId>) -> Vec<NodeId> {
    let mut nodes: Vec<NodeId> = set.iter().copied().collect();
    nodes.sort_unstable();
    nodes
}
