//! Task dependency graph for critical path scheduling.
//!
//! A graph is assembled through [`GraphBuilder`] and frozen by
//! [`GraphBuilder::finish`], which derives the dense adjacency matrix.
//! Node `0` (alpha) is the synthetic project start and always present;
//! the omega node is the synthetic project completion, appended after
//! all real tasks.

use rustc_hash::{FxHashMap, FxHashSet};

/// Node identifier (u32 for compact storage and fast hashing).
pub type NodeId = u32;

/// Task duration in whole days.
pub type Days = i64;

/// The synthetic start node, present in every graph.
pub const ALPHA: NodeId = 0;

/// Sentinel for "no edge" in the adjacency matrix.
///
/// Durations are validated non-negative before any consumer reads edge
/// weights, so the sentinel cannot be confused with a real weight
/// downstream of validation.
pub const NO_EDGE: Days = -1;

/// Non-fatal diagnostics recorded while a graph is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildWarning {
    /// A node id was added twice; the later duration wins.
    DuplicateNode {
        node: NodeId,
        previous: Days,
        replacement: Days,
    },
    /// A task was declared with duration zero.
    ZeroDuration { node: NodeId },
}

impl std::fmt::Display for BuildWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BuildWarning::DuplicateNode {
                node,
                previous,
                replacement,
            } => write!(
                f,
                "task {} was already added with duration {}; overwritten with {}",
                node, previous, replacement
            ),
            BuildWarning::ZeroDuration { node } => {
                write!(f, "task {} has duration 0", node)
            }
        }
    }
}

/// Dense adjacency matrix, one row per potential node id.
///
/// Cell `(from, to)` holds `duration(from)` when the edge exists,
/// [`NO_EDGE`] otherwise. The edge weight lives on the tail node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Adjacency {
    dimension: usize,
    cells: Vec<Days>,
}

impl Adjacency {
    fn with_dimension(dimension: usize) -> Self {
        Self {
            dimension,
            cells: vec![NO_EDGE; dimension * dimension],
        }
    }

    fn set(&mut self, from: NodeId, to: NodeId, weight: Days) {
        let (from, to) = (from as usize, to as usize);
        if from < self.dimension && to < self.dimension {
            self.cells[from * self.dimension + to] = weight;
        }
    }

    /// Matrix dimension (`max node id + 1`).
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Raw cell value: the edge weight, or [`NO_EDGE`].
    pub fn get(&self, from: NodeId, to: NodeId) -> Days {
        let (from, to) = (from as usize, to as usize);
        if from < self.dimension && to < self.dimension {
            self.cells[from * self.dimension + to]
        } else {
            NO_EDGE
        }
    }

    /// The edge weight from `from` to `to`, if the edge exists.
    pub fn edge(&self, from: NodeId, to: NodeId) -> Option<Days> {
        match self.get(from, to) {
            NO_EDGE => None,
            weight => Some(weight),
        }
    }

    /// Successors of `from` in ascending id order, by scanning the row.
    pub fn successors_of(&self, from: NodeId) -> Vec<NodeId> {
        let from = from as usize;
        if from >= self.dimension {
            return Vec::new();
        }
        let row = &self.cells[from * self.dimension..(from + 1) * self.dimension];
        row.iter()
            .enumerate()
            .filter(|(_, &cell)| cell != NO_EDGE)
            .map(|(to, _)| to as NodeId)
            .collect()
    }

    /// One row of the matrix, indexed by successor id.
    pub fn row(&self, from: NodeId) -> &[Days] {
        let from = from as usize;
        if from < self.dimension {
            &self.cells[from * self.dimension..(from + 1) * self.dimension]
        } else {
            &[]
        }
    }

    /// Number of edges in the matrix.
    pub fn edge_count(&self) -> usize {
        self.cells.iter().filter(|&&cell| cell != NO_EDGE).count()
    }
}

/// Mutable graph under construction.
///
/// Seeds itself with the alpha node. Call the `add_*` methods in order
/// (all real nodes and edges, then [`add_omega_node`](Self::add_omega_node)
/// and [`add_omega_edges`](Self::add_omega_edges), which derive the sink
/// links from the successor set accumulated so far), then
/// [`finish`](Self::finish).
#[derive(Debug, Clone)]
pub struct GraphBuilder {
    nodes: FxHashSet<NodeId>,
    durations: FxHashMap<NodeId, Days>,
    predecessors: FxHashMap<NodeId, FxHashSet<NodeId>>,
    // Alpha starts here so it is never wired to omega as a sink.
    with_successor: FxHashSet<NodeId>,
    omega: Option<NodeId>,
    warnings: Vec<BuildWarning>,
}

impl GraphBuilder {
    pub fn new() -> Self {
        let mut nodes = FxHashSet::default();
        nodes.insert(ALPHA);
        let mut durations = FxHashMap::default();
        durations.insert(ALPHA, 0);
        let mut with_successor = FxHashSet::default();
        with_successor.insert(ALPHA);
        Self {
            nodes,
            durations,
            predecessors: FxHashMap::default(),
            with_successor,
            omega: None,
            warnings: Vec::new(),
        }
    }

    /// Add a node with its duration.
    ///
    /// Adding an id twice records a [`BuildWarning::DuplicateNode`] and
    /// overwrites the duration.
    pub fn add_node(&mut self, node: NodeId, duration: Days) {
        if !self.nodes.insert(node) {
            let previous = self.durations.get(&node).copied().unwrap_or(0);
            self.warnings.push(BuildWarning::DuplicateNode {
                node,
                previous,
                replacement: duration,
            });
        }
        self.durations.insert(node, duration);
    }

    /// Record that `from` must complete before `to` starts.
    pub fn add_edge(&mut self, from: NodeId, to: NodeId) {
        self.predecessors.entry(to).or_default().insert(from);
        self.with_successor.insert(from);
    }

    /// Wire all of `predecessors` into `to`; a task with no predecessors
    /// is linked from the alpha node instead.
    pub fn add_edges(&mut self, predecessors: &[NodeId], to: NodeId) {
        if predecessors.is_empty() {
            self.add_edge(ALPHA, to);
        } else {
            for &pred in predecessors {
                self.add_edge(pred, to);
            }
        }
    }

    /// Append the omega (completion) node: `max id + 1`, duration 0.
    pub fn add_omega_node(&mut self) -> NodeId {
        let omega = self.nodes.iter().copied().max().unwrap_or(ALPHA) + 1;
        self.add_node(omega, 0);
        self.omega = Some(omega);
        omega
    }

    /// Wire every node without a successor into omega.
    ///
    /// Must run after all real edges exist: the sink set is computed
    /// from the successor relation as recorded so far.
    pub fn add_omega_edges(&mut self) {
        let Some(omega) = self.omega else {
            return;
        };
        let sinks: FxHashSet<NodeId> = self
            .nodes
            .iter()
            .copied()
            .filter(|&node| node != omega && !self.with_successor.contains(&node))
            .collect();
        self.predecessors.insert(omega, sinks);
    }

    /// Warnings accumulated during construction.
    pub fn warnings(&self) -> &[BuildWarning] {
        &self.warnings
    }

    /// Record an extra warning (used by the record boundary).
    pub fn warn(&mut self, warning: BuildWarning) {
        self.warnings.push(warning);
    }

    /// Derive the adjacency matrix and freeze the graph.
    pub fn finish(self) -> Graph {
        let mut nodes: Vec<NodeId> = self.nodes.iter().copied().collect();
        nodes.sort_unstable();
        let dimension = nodes.last().map_or(1, |&max| max as usize + 1);

        let mut adjacency = Adjacency::with_dimension(dimension);
        for (&to, preds) in &self.predecessors {
            for &from in preds {
                // An edge whose tail was never declared carries no weight
                // and stays out of the matrix; validation rejects such
                // graphs before any consumer reads it.
                if let Some(&weight) = self.durations.get(&from) {
                    adjacency.set(from, to, weight);
                }
            }
        }

        Graph {
            nodes,
            durations: self.durations,
            predecessors: self.predecessors,
            omega: self.omega,
            adjacency,
        }
    }
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Immutable task dependency graph.
///
/// Construction goes through [`GraphBuilder`]; nothing mutates the
/// predecessor or duration maps afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Graph {
    nodes: Vec<NodeId>,
    durations: FxHashMap<NodeId, Days>,
    predecessors: FxHashMap<NodeId, FxHashSet<NodeId>>,
    omega: Option<NodeId>,
    adjacency: Adjacency,
}

impl Graph {
    /// All node ids in ascending order.
    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.adjacency.edge_count()
    }

    /// The omega node id, if construction appended one.
    pub fn omega(&self) -> Option<NodeId> {
        self.omega
    }

    /// Duration of a node; unknown nodes report 0.
    pub fn duration_of(&self, node: NodeId) -> Days {
        self.durations.get(&node).copied().unwrap_or(0)
    }

    /// The full duration map, including any negative entries that
    /// validation will reject.
    pub fn durations(&self) -> &FxHashMap<NodeId, Days> {
        &self.durations
    }

    /// Recorded predecessors of a node; empty if none.
    pub fn predecessors_of(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.predecessors.get(&node).into_iter().flatten().copied()
    }

    /// Successors of a node in ascending id order.
    pub fn successors_of(&self, node: NodeId) -> Vec<NodeId> {
        self.adjacency.successors_of(node)
    }

    /// The derived adjacency matrix.
    pub fn adjacency(&self) -> &Adjacency {
        &self.adjacency
    }

    /// Nodes whose recorded predecessors all lie in `excluding`.
    ///
    /// Only nodes with a predecessor entry are scanned; when the scan
    /// comes up empty the alpha node is substituted before the exclusion
    /// set is subtracted. That fallback guarantees the cycle-elimination
    /// loop a starting point and is relied upon by the validator.
    pub fn nodes_with_no_predecessors(&self, excluding: &FxHashSet<NodeId>) -> FxHashSet<NodeId> {
        let mut free: FxHashSet<NodeId> = self
            .predecessors
            .iter()
            .filter(|(_, preds)| preds.is_subset(excluding))
            .map(|(&node, _)| node)
            .collect();
        if free.is_empty() {
            free.insert(ALPHA);
        }
        free.retain(|node| !excluding.contains(node));
        free
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_builder(rows: &[(NodeId, Days, &[NodeId])]) -> GraphBuilder {
        let mut builder = GraphBuilder::new();
        for &(node, duration, preds) in rows {
            builder.add_node(node, duration);
            builder.add_edges(preds, node);
        }
        builder
    }

    #[test]
    fn test_builder_seeds_alpha() {
        let graph = GraphBuilder::new().finish();
        assert_eq!(graph.nodes(), &[ALPHA]);
        assert_eq!(graph.duration_of(ALPHA), 0);
    }

    #[test]
    fn test_no_predecessors_links_to_alpha() {
        let mut builder = make_builder(&[(1, 3, &[])]);
        builder.add_omega_node();
        builder.add_omega_edges();
        let graph = builder.finish();

        let preds: Vec<NodeId> = graph.predecessors_of(1).collect();
        assert_eq!(preds, vec![ALPHA]);
    }

    #[test]
    fn test_omega_collects_sinks() {
        // 1 and 2 feed 3; only 3 has no successor, so omega <- {3}.
        let mut builder = make_builder(&[(1, 3, &[]), (2, 2, &[]), (3, 4, &[1, 2])]);
        let omega = builder.add_omega_node();
        builder.add_omega_edges();
        let graph = builder.finish();

        assert_eq!(omega, 4);
        assert_eq!(graph.omega(), Some(4));
        assert_eq!(graph.duration_of(omega), 0);
        let omega_preds: Vec<NodeId> = graph.predecessors_of(omega).collect();
        assert_eq!(omega_preds, vec![3]);
    }

    #[test]
    fn test_alpha_never_becomes_a_sink() {
        // Alpha has no successors here, but it must not be wired to omega.
        let mut builder = GraphBuilder::new();
        builder.add_node(1, 2);
        builder.add_node(2, 3);
        builder.add_edge(1, 2);
        builder.add_omega_node();
        builder.add_omega_edges();
        let graph = builder.finish();

        let omega_preds: Vec<NodeId> = graph
            .predecessors_of(graph.omega().unwrap())
            .collect();
        assert_eq!(omega_preds, vec![2]);
    }

    #[test]
    fn test_adjacency_weight_is_tail_duration() {
        let mut builder = make_builder(&[(1, 3, &[]), (2, 7, &[1])]);
        builder.add_omega_node();
        builder.add_omega_edges();
        let graph = builder.finish();

        assert_eq!(graph.adjacency().edge(1, 2), Some(3));
        assert_eq!(graph.adjacency().edge(ALPHA, 1), Some(0));
        assert_eq!(graph.adjacency().edge(2, 1), None);
        assert_eq!(graph.adjacency().get(2, 1), NO_EDGE);
    }

    #[test]
    fn test_successors_ascending() {
        let mut builder = make_builder(&[(3, 1, &[]), (1, 2, &[3]), (2, 2, &[3])]);
        builder.add_omega_node();
        builder.add_omega_edges();
        let graph = builder.finish();

        assert_eq!(graph.successors_of(3), vec![1, 2]);
    }

    #[test]
    fn test_duplicate_node_warns_and_overwrites() {
        let mut builder = GraphBuilder::new();
        builder.add_node(1, 3);
        builder.add_node(1, 5);
        assert_eq!(
            builder.warnings(),
            &[BuildWarning::DuplicateNode {
                node: 1,
                previous: 3,
                replacement: 5,
            }]
        );
        let graph = builder.finish();
        assert_eq!(graph.duration_of(1), 5);
    }

    #[test]
    fn test_no_predecessor_fallback_is_alpha() {
        let mut builder = make_builder(&[(1, 3, &[]), (2, 2, &[1])]);
        builder.add_omega_node();
        builder.add_omega_edges();
        let graph = builder.finish();

        // Nothing excluded: every node with a predecessor entry still has
        // one, so the query falls back to alpha.
        let free = graph.nodes_with_no_predecessors(&FxHashSet::default());
        assert_eq!(free, FxHashSet::from_iter([ALPHA]));

        // Excluding alpha frees node 1.
        let excluded = FxHashSet::from_iter([ALPHA]);
        assert_eq!(
            graph.nodes_with_no_predecessors(&excluded),
            FxHashSet::from_iter([1])
        );
    }

    #[test]
    fn test_edge_count_matches_matrix() {
        let mut builder = make_builder(&[(1, 3, &[]), (2, 2, &[1]), (3, 4, &[1])]);
        builder.add_omega_node();
        builder.add_omega_edges();
        let graph = builder.finish();

        // 0->1, 1->2, 1->3, 2->omega, 3->omega
        assert_eq!(graph.edge_count(), 5);
    }
}
