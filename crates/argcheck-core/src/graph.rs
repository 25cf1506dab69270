//! # Argument Graph
//!
//! The deterministic relation graph of one document.
//!
//! All data structures use `BTreeMap` for deterministic ordering.
//! No `HashMap` allowed: cycle and reachability output must not depend on
//! hashing.
//!
//! Node ids are assigned in registration order, so "earliest node" in
//! cycle reports means "registered first", i.e. document order.

use crate::document::Document;
use crate::primitives::{MAX_CYCLE_SEARCH_STEPS, MAX_REPORTED_CYCLES};
use crate::types::{Relation, RelationKind, SourceFormat};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, VecDeque};

// =============================================================================
// NODE IDS & SCOPES
// =============================================================================

/// Opaque node handle. Ordered by registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct NodeId(pub usize);

/// Which edges a traversal follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CycleScope {
    /// Every relation type.
    AllRelations,
    /// Only `entails` edges.
    EntailmentOnly,
}

impl CycleScope {
    /// Default cycle scope of a source format.
    #[must_use]
    pub fn for_format(format: SourceFormat) -> Self {
        match format {
            SourceFormat::PremiseConclusion => CycleScope::AllRelations,
            SourceFormat::StatementExport => CycleScope::EntailmentOnly,
        }
    }

    fn admits(self, kinds: &BTreeSet<RelationKind>) -> bool {
        match self {
            CycleScope::AllRelations => !kinds.is_empty(),
            CycleScope::EntailmentOnly => kinds.contains(&RelationKind::Entails),
        }
    }
}

// =============================================================================
// GRAPH IMPLEMENTATION
// =============================================================================

/// Directed graph over statement, claim, conclusion and argument ids.
///
/// Built once per run and read-only afterwards. An edge may carry several
/// relation kinds when the same pair is related more than once.
#[derive(Debug, Clone, Default)]
pub struct ArgumentGraph {
    /// Node storage: NodeId -> identifier
    nodes: BTreeMap<NodeId, String>,

    /// Adjacency list: from_node -> (to_node -> kinds)
    edges: BTreeMap<NodeId, BTreeMap<NodeId, BTreeSet<RelationKind>>>,

    /// Reverse lookup: identifier -> NodeId
    index: BTreeMap<String, NodeId>,

    /// Relations with at least one endpoint that is not a node, in order.
    dangling: Vec<Relation>,

    /// Next available NodeId
    next_node_id: usize,
}

impl ArgumentGraph {
    /// Create a new empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the graph of a document.
    ///
    /// Nodes are registered in [`Document::graph_node_ids`] order, then one
    /// edge is added per relation whose endpoints both exist.
    #[must_use]
    pub fn build(document: &Document) -> Self {
        let mut graph = Self::new();
        for id in document.graph_node_ids() {
            graph.insert_node(id);
        }
        for relation in document.relations() {
            graph.insert_edge(relation);
        }
        graph
    }

    /// Insert a node for the given identifier. Returns the NodeId.
    /// If the identifier already exists, returns the existing NodeId.
    pub fn insert_node(&mut self, id: &str) -> NodeId {
        if let Some(&node) = self.index.get(id) {
            return node;
        }
        let node = NodeId(self.next_node_id);
        self.next_node_id = self.next_node_id.saturating_add(1);
        self.nodes.insert(node, id.to_string());
        self.index.insert(id.to_string(), node);
        node
    }

    /// Add a relation as an edge.
    ///
    /// Returns `false` and records the relation as dangling when either
    /// endpoint is missing.
    pub fn insert_edge(&mut self, relation: &Relation) -> bool {
        let (Some(from), Some(to)) = (self.node(&relation.from), self.node(&relation.to)) else {
            self.dangling.push(relation.clone());
            return false;
        };
        self.edges
            .entry(from)
            .or_default()
            .entry(to)
            .or_default()
            .insert(relation.kind.clone());
        true
    }

    /// Get the NodeId of an identifier.
    #[must_use]
    pub fn node(&self, id: &str) -> Option<NodeId> {
        self.index.get(id).copied()
    }

    /// Check if the graph contains an identifier.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Identifier of a node.
    #[must_use]
    pub fn label(&self, node: NodeId) -> Option<&str> {
        self.nodes.get(&node).map(String::as_str)
    }

    /// Identifiers of a node path, skipping unknown nodes.
    #[must_use]
    pub fn labels(&self, path: &[NodeId]) -> Vec<&str> {
        path.iter().filter_map(|&n| self.label(n)).collect()
    }

    /// Get the total number of nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Get the total number of distinct `(from, to)` edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.values().map(BTreeMap::len).sum()
    }

    /// Relation kinds on the edge `from -> to`, if any.
    #[must_use]
    pub fn edge_kinds(&self, from: NodeId, to: NodeId) -> Option<&BTreeSet<RelationKind>> {
        self.edges.get(&from)?.get(&to)
    }

    /// Relations that could not become edges, in document order.
    #[must_use]
    pub fn dangling(&self) -> &[Relation] {
        &self.dangling
    }

    /// Outgoing neighbours within a scope, in NodeId order.
    pub fn neighbors(&self, node: NodeId, scope: CycleScope) -> impl Iterator<Item = NodeId> + '_ {
        self.edges
            .get(&node)
            .into_iter()
            .flat_map(move |targets| {
                targets
                    .iter()
                    .filter(move |(_, kinds)| scope.admits(kinds))
                    .map(|(to, _)| *to)
            })
    }

    /// Nodes of the subgraph induced by a scope's edges.
    ///
    /// For `AllRelations` this is every node; for `EntailmentOnly` only
    /// nodes touching an `entails` edge.
    #[must_use]
    pub fn scope_nodes(&self, scope: CycleScope) -> BTreeSet<NodeId> {
        match scope {
            CycleScope::AllRelations => self.nodes.keys().copied().collect(),
            CycleScope::EntailmentOnly => self
                .edges
                .iter()
                .flat_map(|(from, targets)| {
                    targets
                        .iter()
                        .filter(|(_, kinds)| scope.admits(kinds))
                        .flat_map(move |(to, _)| [*from, *to])
                })
                .collect(),
        }
    }

    /// All nodes reachable from `start` within a scope, excluding `start`
    /// itself even when it lies on a cycle.
    #[must_use]
    pub fn descendants(&self, start: NodeId, scope: CycleScope) -> BTreeSet<NodeId> {
        let mut visited = BTreeSet::new();
        let mut queue = VecDeque::new();
        queue.push_back(start);

        while let Some(current) = queue.pop_front() {
            for neighbor in self.neighbors(current, scope) {
                if visited.insert(neighbor) {
                    queue.push_back(neighbor);
                }
            }
        }

        visited.remove(&start);
        visited
    }

    /// Enumerate simple directed cycles within a scope.
    ///
    /// Each cycle is reported once, as the node sequence starting at its
    /// earliest node (the closing edge back to the start is implied).
    /// Cycles are ordered by start node, then by DFS order. Enumeration
    /// stops after [`MAX_REPORTED_CYCLES`] cycles or
    /// [`MAX_CYCLE_SEARCH_STEPS`] edge visits; either cut-off sets
    /// [`CycleSearch::truncated`].
    #[must_use]
    pub fn simple_cycles(&self, scope: CycleScope) -> CycleSearch {
        let adjacency: BTreeMap<NodeId, Vec<NodeId>> = self
            .nodes
            .keys()
            .map(|&n| (n, self.neighbors(n, scope).collect()))
            .collect();

        let mut cycles = Vec::new();
        let mut steps = 0usize;

        for &start in adjacency.keys() {
            // Only nodes registered after `start` may appear on its cycles,
            // so every cycle is found exactly once, from its earliest node.
            let mut path = vec![start];
            let mut cursors = vec![0usize];
            let mut on_path = BTreeSet::from([start]);

            while let Some(&node) = path.last() {
                let depth = path.len() - 1;
                let next = adjacency
                    .get(&node)
                    .and_then(|targets| targets.get(cursors[depth]))
                    .copied();

                let Some(next) = next else {
                    on_path.remove(&node);
                    path.pop();
                    cursors.pop();
                    continue;
                };

                cursors[depth] += 1;
                steps += 1;
                if steps > MAX_CYCLE_SEARCH_STEPS {
                    return CycleSearch::truncated(cycles);
                }

                if next == start {
                    if cycles.len() >= MAX_REPORTED_CYCLES {
                        return CycleSearch::truncated(cycles);
                    }
                    cycles.push(path.clone());
                } else if next > start && on_path.insert(next) {
                    path.push(next);
                    cursors.push(0);
                }
            }
        }

        CycleSearch {
            cycles,
            truncated: false,
        }
    }
}

/// Result of [`ArgumentGraph::simple_cycles`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CycleSearch {
    /// Cycles found, in report order.
    pub cycles: Vec<Vec<NodeId>>,
    /// Enumeration hit a limit; more cycles may exist.
    pub truncated: bool,
}

impl CycleSearch {
    fn truncated(cycles: Vec<Vec<NodeId>>) -> Self {
        Self {
            cycles,
            truncated: true,
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn graph(nodes: &[&str], edges: &[(&str, &str, RelationKind)]) -> ArgumentGraph {
        let mut g = ArgumentGraph::new();
        for n in nodes {
            g.insert_node(n);
        }
        for (from, to, kind) in edges {
            g.insert_edge(&Relation::new(*from, *to, kind.clone()));
        }
        g
    }

    fn cycle_labels(g: &ArgumentGraph, scope: CycleScope) -> Vec<Vec<String>> {
        g.simple_cycles(scope)
            .cycles
            .iter()
            .map(|c| g.labels(c).into_iter().map(str::to_string).collect())
            .collect()
    }

    #[test]
    fn insert_duplicate_returns_same_node() {
        let mut g = ArgumentGraph::new();
        let a = g.insert_node("a");
        let again = g.insert_node("a");
        assert_eq!(a, again);
        assert_eq!(g.node_count(), 1);
        assert_eq!(g.label(a), Some("a"));
    }

    #[test]
    fn insert_edge_records_dangling_relations() {
        let mut g = graph(&["a"], &[]);
        let added = g.insert_edge(&Relation::new("a", "ghost", RelationKind::Supports));
        assert!(!added);
        assert_eq!(g.edge_count(), 0);
        assert_eq!(g.dangling().len(), 1);
        assert_eq!(g.dangling()[0].to, "ghost");
    }

    #[test]
    fn parallel_relations_share_one_edge() {
        let g = graph(
            &["a", "b"],
            &[
                ("a", "b", RelationKind::Entails),
                ("a", "b", RelationKind::Supports),
            ],
        );
        assert_eq!(g.edge_count(), 1);
        let (a, b) = (g.node("a").expect("a"), g.node("b").expect("b"));
        assert_eq!(g.edge_kinds(a, b).map(BTreeSet::len), Some(2));
    }

    #[test]
    fn neighbors_respect_scope_and_order() {
        let g = graph(
            &["a", "b", "c"],
            &[
                ("a", "c", RelationKind::Entails),
                ("a", "b", RelationKind::Attacks),
            ],
        );
        let a = g.node("a").expect("a");
        let all: Vec<_> = g.neighbors(a, CycleScope::AllRelations).collect();
        let entails: Vec<_> = g.neighbors(a, CycleScope::EntailmentOnly).collect();
        assert_eq!(g.labels(&all), vec!["b", "c"]);
        assert_eq!(g.labels(&entails), vec!["c"]);
    }

    #[test]
    fn descendants_follow_transitive_edges() {
        let g = graph(
            &["a", "b", "c", "d"],
            &[
                ("a", "b", RelationKind::Entails),
                ("b", "c", RelationKind::Entails),
                ("c", "d", RelationKind::Contrary),
            ],
        );
        let a = g.node("a").expect("a");
        assert_eq!(g.descendants(a, CycleScope::EntailmentOnly).len(), 2);
        assert_eq!(g.descendants(a, CycleScope::AllRelations).len(), 3);
    }

    #[test]
    fn entailment_scope_nodes_exclude_unrelated() {
        let g = graph(
            &["a", "b", "c"],
            &[("a", "b", RelationKind::Entails), ("b", "c", RelationKind::Attacks)],
        );
        let nodes = g.scope_nodes(CycleScope::EntailmentOnly);
        assert_eq!(g.labels(&nodes.into_iter().collect::<Vec<_>>()), vec!["a", "b"]);
    }

    #[test]
    fn three_cycle_reported_once_from_earliest_node() {
        let g = graph(
            &["a", "b", "c"],
            &[
                ("b", "c", RelationKind::Entails),
                ("c", "a", RelationKind::Entails),
                ("a", "b", RelationKind::Entails),
            ],
        );
        assert_eq!(
            cycle_labels(&g, CycleScope::EntailmentOnly),
            vec![vec!["a", "b", "c"]]
        );
    }

    #[test]
    fn cycles_outside_scope_are_ignored() {
        let g = graph(
            &["a", "b"],
            &[("a", "b", RelationKind::Entails), ("b", "a", RelationKind::Supports)],
        );
        assert!(cycle_labels(&g, CycleScope::EntailmentOnly).is_empty());
        assert_eq!(
            cycle_labels(&g, CycleScope::AllRelations),
            vec![vec!["a", "b"]]
        );
    }

    #[test]
    fn overlapping_cycles_are_all_enumerated() {
        let g = graph(
            &["a", "b", "c"],
            &[
                ("a", "b", RelationKind::Supports),
                ("b", "a", RelationKind::Supports),
                ("b", "c", RelationKind::Supports),
                ("c", "b", RelationKind::Supports),
                ("c", "c", RelationKind::Supports),
            ],
        );
        assert_eq!(
            cycle_labels(&g, CycleScope::AllRelations),
            vec![vec!["a", "b"], vec!["b", "c"], vec!["c"]]
        );
    }

    #[test]
    fn default_scope_follows_format() {
        assert_eq!(
            CycleScope::for_format(SourceFormat::PremiseConclusion),
            CycleScope::AllRelations
        );
        assert_eq!(
            CycleScope::for_format(SourceFormat::StatementExport),
            CycleScope::EntailmentOnly
        );
    }
}
