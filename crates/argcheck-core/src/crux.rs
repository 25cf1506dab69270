//! # Crux Analyzer
//!
//! Finds the statements whose credence most constrains others: a statement
//! with `n` statements downstream of it through entailment is a crux of
//! weight `n`. Advisory only; never affects pass/fail.

use crate::diagnostic::CruxNote;
use crate::document::Document;
use crate::graph::{ArgumentGraph, CycleScope};
use std::collections::BTreeMap;

/// Number of nodes reachable through entailment from every node of the
/// entailment subgraph, keyed by identifier.
#[must_use]
pub fn downstream_counts(graph: &ArgumentGraph) -> BTreeMap<String, usize> {
    graph
        .scope_nodes(CycleScope::EntailmentOnly)
        .into_iter()
        .filter_map(|node| {
            let label = graph.label(node)?;
            let reach = graph.descendants(node, CycleScope::EntailmentOnly).len();
            Some((label.to_string(), reach))
        })
        .collect()
}

/// Crux notes for statements with a credence and at least one downstream
/// statement, in document order.
#[must_use]
pub fn analyze(document: &Document, graph: &ArgumentGraph) -> Vec<CruxNote> {
    let counts = downstream_counts(graph);
    document
        .statements()
        .filter_map(|statement| {
            let credence = statement.credence?;
            let downstream = *counts.get(&statement.id)?;
            (downstream > 0).then(|| CruxNote {
                statement: statement.id.clone(),
                credence,
                downstream,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn export(statements: serde_json::Value) -> Document {
        Document::from_value(&json!({ "statements": statements }))
            .expect("valid shape")
            .document
    }

    #[test]
    fn chain_counts_transitive_downstream() {
        let doc = export(json!({
            "a": {"data": {"credence": 0.8},
                  "relations": [{"from": "a", "to": "b", "relationType": "entails"}]},
            "b": {"data": {"credence": 0.85},
                  "relations": [{"from": "b", "to": "c", "relationType": "entails"}]},
            "c": {"data": {"credence": 0.9}}
        }));
        let graph = ArgumentGraph::build(&doc);

        let counts = downstream_counts(&graph);
        assert_eq!(counts.get("a"), Some(&2));
        assert_eq!(counts.get("b"), Some(&1));
        assert_eq!(counts.get("c"), Some(&0));

        let notes: Vec<_> = analyze(&doc, &graph).iter().map(ToString::to_string).collect();
        assert_eq!(
            notes,
            vec![
                "CRUX: [a] (credence=0.8) has 2 downstream entailment(s). \
                 Changing this credence affects 2 other statement(s).",
                "CRUX: [b] (credence=0.85) has 1 downstream entailment(s). \
                 Changing this credence affects 1 other statement(s).",
            ]
        );
    }

    #[test]
    fn statements_without_credence_or_entailment_are_skipped() {
        let doc = export(json!({
            "a": {"relations": [{"from": "a", "to": "b", "relationType": "entails"}]},
            "b": {"data": {"credence": 0.5},
                  "relations": [{"from": "b", "to": "c", "relationType": "supports"}]},
            "c": {"data": {"credence": 0.5}}
        }));
        let graph = ArgumentGraph::build(&doc);
        assert!(analyze(&doc, &graph).is_empty());
        assert!(!downstream_counts(&graph).contains_key("c"));
    }

    #[test]
    fn cycle_members_do_not_count_themselves() {
        let doc = export(json!({
            "a": {"data": {"credence": 0.5},
                  "relations": [{"from": "a", "to": "b", "relationType": "entails"}]},
            "b": {"data": {"credence": 0.5},
                  "relations": [{"from": "b", "to": "a", "relationType": "entails"}]}
        }));
        let graph = ArgumentGraph::build(&doc);
        assert_eq!(downstream_counts(&graph).get("a"), Some(&1));
    }
}
