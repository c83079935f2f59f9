//! Record boundary: turns range-checked task records into a graph.
//!
//! Parsing text into records and rendering results stay outside the
//! crate; this module is where raw integers are checked and become graph
//! nodes. A single bad record rejects the whole table.

use rustc_hash::FxHashSet;
use thiserror::Error;

use crate::graph::{BuildWarning, Days, Graph, GraphBuilder, NodeId};

/// Exclusive upper bound on task durations.
pub const MAX_DURATION: Days = 100;

/// Inclusive upper bound on task labels.
///
/// The adjacency matrix is dense in the label space, so an unbounded
/// label would let one record demand a `label * label` cell allocation.
pub const MAX_LABEL: NodeId = 1_000;

/// One row of a precedence table, as handed over by a reader.
///
/// Fields are raw `i64` so that out-of-range values survive long enough
/// to be reported with their line context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRecord {
    pub label: i64,
    pub duration: i64,
    pub predecessors: Vec<i64>,
    /// 1-based line in the source table, for diagnostics.
    pub line: usize,
}

impl TaskRecord {
    pub fn new(label: i64, duration: i64, predecessors: Vec<i64>, line: usize) -> Self {
        Self {
            label,
            duration,
            predecessors,
            line,
        }
    }
}

/// A malformed record. Any of these rejects the entire table.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    #[error("line {line}: task label {label} is not a positive task number")]
    InvalidLabel { line: usize, label: i64 },
    #[error("line {line}: task label {label} is outside [1, 1000]")]
    LabelOutOfRange { line: usize, label: i64 },
    #[error("line {line}: task {label} has duration {duration}, outside [0, 100)")]
    DurationOutOfRange {
        line: usize,
        label: i64,
        duration: i64,
    },
    #[error("line {line}: task {label} lists non-positive predecessor {predecessor}")]
    InvalidPredecessor {
        line: usize,
        label: i64,
        predecessor: i64,
    },
    #[error("line {line}: task {label} lists unknown predecessor {predecessor}")]
    UnknownPredecessor {
        line: usize,
        label: i64,
        predecessor: i64,
    },
}

/// A finished graph plus the non-fatal warnings gathered on the way.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphBuild {
    pub graph: Graph,
    pub warnings: Vec<BuildWarning>,
}

/// Build a graph from a full table of records.
///
/// Records are processed in ascending label order regardless of input
/// order. Each record is range-checked; the first violation rejects the
/// table and no partial graph is returned. On success the omega node and
/// its edges are appended and the adjacency matrix derived.
pub fn build_graph(records: &[TaskRecord]) -> Result<GraphBuild, RecordError> {
    let mut sorted: Vec<&TaskRecord> = records.iter().collect();
    sorted.sort_by_key(|record| record.label);

    let known_labels: FxHashSet<i64> = records.iter().map(|record| record.label).collect();

    let mut builder = GraphBuilder::new();
    for record in sorted {
        let label = checked_label(record)?;
        let duration = checked_duration(record)?;
        let predecessors = checked_predecessors(record, &known_labels)?;

        if duration == 0 {
            builder.warn(BuildWarning::ZeroDuration { node: label });
        }
        builder.add_node(label, duration);
        builder.add_edges(&predecessors, label);
    }

    builder.add_omega_node();
    builder.add_omega_edges();

    let warnings = builder.warnings().to_vec();
    Ok(GraphBuild {
        graph: builder.finish(),
        warnings,
    })
}

fn checked_label(record: &TaskRecord) -> Result<NodeId, RecordError> {
    let label = NodeId::try_from(record.label)
        .ok()
        .filter(|&label| label > 0)
        .ok_or(RecordError::InvalidLabel {
            line: record.line,
            label: record.label,
        })?;
    if label > MAX_LABEL {
        return Err(RecordError::LabelOutOfRange {
            line: record.line,
            label: record.label,
        });
    }
    Ok(label)
}

fn checked_duration(record: &TaskRecord) -> Result<Days, RecordError> {
    if (0..MAX_DURATION).contains(&record.duration) {
        Ok(record.duration)
    } else {
        Err(RecordError::DurationOutOfRange {
            line: record.line,
            label: record.label,
            duration: record.duration,
        })
    }
}

fn checked_predecessors(
    record: &TaskRecord,
    known_labels: &FxHashSet<i64>,
) -> Result<Vec<NodeId>, RecordError> {
    let mut predecessors = Vec::with_capacity(record.predecessors.len());
    for &pred in &record.predecessors {
        let id = NodeId::try_from(pred).ok().filter(|&p| p > 0).ok_or(
            RecordError::InvalidPredecessor {
                line: record.line,
                label: record.label,
                predecessor: pred,
            },
        )?;
        if !known_labels.contains(&pred) {
            return Err(RecordError::UnknownPredecessor {
                line: record.line,
                label: record.label,
                predecessor: pred,
            });
        }
        predecessors.push(id);
    }
    Ok(predecessors)
}
