//! # Structural Analyzer
//!
//! Referential integrity, graph shape and source-tag checks.
//!
//! Every check is independent and always runs. Output order within the
//! graph group is fixed:
//!
//! 1. orphaned conclusions
//! 2. dangling relations
//! 3. cycles (`GRAPH CYCLE` or `ENTAILMENT CYCLE`, per [`CycleScope`]),
//!    then a `GRAPH:` note if the listing was cut off
//! 4. unsupported claims
//! 5. isolated top-level statements
//!
//! and each check walks the document in document order.

use crate::diagnostic::{Category, Diagnostic};
use crate::document::Document;
use crate::graph::{ArgumentGraph, CycleScope};
use crate::primitives::OBSERVATION_TAG;
use crate::types::{RelationKind, StatementRole};

// =============================================================================
// REFERENTIAL INTEGRITY
// =============================================================================

/// Inference `from` ids must name a premise of the same argument.
#[must_use]
pub fn check_references(document: &Document) -> Vec<Diagnostic> {
    let mut out = Vec::new();
    for argument in document.arguments() {
        for inference in &argument.inferences {
            for reference in &inference.from {
                if argument.premises.contains(reference) {
                    continue;
                }
                out.push(Diagnostic::new(
                    Category::Ref,
                    format!(
                        "{}: inference references '{}' but premises are {{{}}}",
                        argument.name,
                        reference,
                        argument.premises.join(", ")
                    ),
                ));
            }
        }
    }
    out
}

// =============================================================================
// GRAPH SHAPE
// =============================================================================

/// Run every graph-shape check against a built graph.
#[must_use]
pub fn check_graph(document: &Document, graph: &ArgumentGraph, scope: CycleScope) -> Vec<Diagnostic> {
    let mut out = orphaned_conclusions(document);
    out.extend(dangling_relations(graph));
    out.extend(cycles(graph, scope));
    out.extend(unsupported_claims(document));
    out.extend(isolated_statements(document));
    out
}

/// Conclusions that are the source of no relation at all.
fn orphaned_conclusions(document: &Document) -> Vec<Diagnostic> {
    document
        .arguments()
        .iter()
        .filter_map(|argument| {
            let conclusion = argument.conclusion.as_deref()?;
            let has_relations = document.relations().iter().any(|r| r.from == conclusion);
            (!has_relations).then(|| {
                Diagnostic::new(
                    Category::Graph,
                    format!(
                        "{}: conclusion '{}' has no relations (supports/attacks nothing)",
                        argument.name, conclusion
                    ),
                )
            })
        })
        .collect()
}

/// Relations whose target (or source) is not a graph node.
fn dangling_relations(graph: &ArgumentGraph) -> Vec<Diagnostic> {
    let mut out = Vec::new();
    for relation in graph.dangling() {
        if !graph.contains(&relation.from) {
            out.push(Diagnostic::new(
                Category::Graph,
                format!(
                    "relation {} originates from '{}' which doesn't exist",
                    relation.kind, relation.from
                ),
            ));
        }
        if !graph.contains(&relation.to) {
            out.push(Diagnostic::new(
                Category::Graph,
                format!(
                    "relation {} targets '{}' which doesn't exist",
                    relation.kind, relation.to
                ),
            ));
        }
    }
    out
}

/// One diagnostic per simple cycle in the scope's subgraph, followed by a
/// `GRAPH:` line when enumeration stopped at a limit.
fn cycles(graph: &ArgumentGraph, scope: CycleScope) -> Vec<Diagnostic> {
    let search = graph.simple_cycles(scope);
    let mut out: Vec<Diagnostic> = search
        .cycles
        .iter()
        .map(|cycle| {
            let path = graph.labels(cycle).join(" -> ");
            match scope {
                CycleScope::AllRelations => Diagnostic::new(Category::GraphCycle, path),
                CycleScope::EntailmentOnly => Diagnostic::new(
                    Category::EntailmentCycle,
                    format!("{path} (circular reasoning)"),
                ),
            }
        })
        .collect();
    if search.truncated {
        out.push(Diagnostic::new(
            Category::Graph,
            format!(
                "cycle listing truncated after {} cycle(s); more cycles may exist",
                search.cycles.len()
            ),
        ));
    }
    out
}

/// Claims with no incoming `supports` relation.
fn unsupported_claims(document: &Document) -> Vec<Diagnostic> {
    document
        .claims()
        .iter()
        .filter(|claim| {
            !document
                .relations()
                .iter()
                .any(|r| &r.to == *claim && r.kind == RelationKind::Supports)
        })
        .map(|claim| {
            Diagnostic::new(
                Category::Graph,
                format!("claim '{claim}' has no supporting arguments"),
            )
        })
        .collect()
}

/// Top-level export statements that no relation touches.
///
/// Degree counts every relation, dangling ones included. Premise-format
/// claims are never flagged here; [`unsupported_claims`] covers them.
fn isolated_statements(document: &Document) -> Vec<Diagnostic> {
    document
        .statements()
        .filter(|s| s.role == StatementRole::Statement && s.top_level)
        .filter(|s| !document.relations().iter().any(|r| r.touches(&s.id)))
        .map(|s| {
            Diagnostic::new(
                Category::Isolated,
                format!("[{}] is a top-level statement with no relations", s.id),
            )
        })
        .collect()
}

// =============================================================================
// SOURCES
// =============================================================================

/// Statements tagged `observation` must cite a source.
#[must_use]
pub fn check_sources(document: &Document) -> Vec<Diagnostic> {
    document
        .statements()
        .filter(|s| s.has_tag(OBSERVATION_TAG) && s.source.is_none())
        .map(|s| {
            Diagnostic::new(
                Category::Source,
                format!("[{}]: observation without source", s.id),
            )
        })
        .collect()
}

// =============================================================================
// TESTS
// =============================================================================
