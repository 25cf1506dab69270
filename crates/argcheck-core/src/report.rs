//! # Report Aggregator
//!
//! Collects the diagnostics of every stage into one [`Report`] with a fixed
//! section order, independent of the order stages ran in:
//!
//! ```text
//! Schema -> Referential -> Math -> Graph -> Consistency -> Source
//! ```
//!
//! Within a section, diagnostics keep the order they were pushed in.
//! Schema diagnostics are de-duplicated by exact text because the
//! normaliser and the schema pre-check may find the same problem.

use crate::diagnostic::{Category, CruxNote, Diagnostic};
use crate::document::Document;
use crate::types::SourceFormat;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

// =============================================================================
// SECTIONS
// =============================================================================

/// Report section. Variant order is output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    /// Structural and schema violations.
    Schema,
    /// Inference references.
    Referential,
    /// Math expressions.
    Math,
    /// Graph shape, cycles and isolation.
    Graph,
    /// Credence consistency.
    Consistency,
    /// Observation sources and URL probes.
    Source,
}

impl Section {
    /// All sections in output order.
    pub const ALL: [Section; 6] = [
        Section::Schema,
        Section::Referential,
        Section::Math,
        Section::Graph,
        Section::Consistency,
        Section::Source,
    ];

    /// The section a diagnostic category belongs to.
    #[must_use]
    pub fn of(category: Category) -> Self {
        match category {
            Category::Schema => Section::Schema,
            Category::Ref => Section::Referential,
            Category::MathFail | Category::MathEval | Category::MathError => Section::Math,
            Category::Graph
            | Category::GraphCycle
            | Category::EntailmentCycle
            | Category::Isolated => Section::Graph,
            Category::Entailment | Category::Contrary | Category::Contradiction => {
                Section::Consistency
            }
            Category::Source | Category::SourceUrl => Section::Source,
        }
    }
}

// =============================================================================
// SUMMARY
// =============================================================================

/// Document statistics, independent of pass/fail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
    /// Source format of the document.
    pub format: SourceFormat,
    /// Total number of statements.
    pub statements: usize,
    /// Total number of deduplicated relations.
    pub relations: usize,
    /// Number of arguments.
    pub arguments: usize,
    /// Number of claims.
    pub claims: usize,
    /// Statements with a credence.
    pub with_credence: usize,
    /// Statements with a math expression.
    pub with_math: usize,
    /// Statement count per tag, sorted by tag.
    pub tags: BTreeMap<String, usize>,
}

impl Summary {
    /// Compute statistics from a document.
    #[must_use]
    pub fn from_document(document: &Document) -> Self {
        let mut tags: BTreeMap<String, usize> = BTreeMap::new();
        let mut with_credence = 0;
        let mut with_math = 0;
        for statement in document.statements() {
            if statement.credence.is_some() {
                with_credence += 1;
            }
            if statement.math.is_some() {
                with_math += 1;
            }
            if let Some(tag) = &statement.tag {
                *tags.entry(tag.clone()).or_default() += 1;
            }
        }
        Self {
            format: document.format(),
            statements: document.statement_count(),
            relations: document.relations().len(),
            arguments: document.arguments().len(),
            claims: document.claims().len(),
            with_credence,
            with_math,
            tags,
        }
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Summary: {} statements, {} relations, {} with credences",
            self.statements, self.relations, self.with_credence
        )?;
        if self.format == SourceFormat::PremiseConclusion {
            write!(f, ", {} arguments, {} claims", self.arguments, self.claims)?;
        }
        write!(f, ", {} math expressions", self.with_math)
    }
}

// =============================================================================
// REPORT
// =============================================================================

/// Outcome of one validation run.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    sections: BTreeMap<Section, Vec<Diagnostic>>,
    crux: Vec<CruxNote>,
    summary: Summary,
}

impl Report {
    /// Create an empty report for a document summary.
    #[must_use]
    pub fn new(summary: Summary) -> Self {
        Self {
            sections: BTreeMap::new(),
            crux: Vec::new(),
            summary,
        }
    }

    /// Add one diagnostic to its section.
    ///
    /// A schema diagnostic identical to one already present is dropped.
    pub fn push(&mut self, diagnostic: Diagnostic) {
        let section = Section::of(diagnostic.category);
        let list = self.sections.entry(section).or_default();
        if section == Section::Schema && list.contains(&diagnostic) {
            return;
        }
        list.push(diagnostic);
    }

    /// Add diagnostics in order.
    pub fn extend(&mut self, diagnostics: impl IntoIterator<Item = Diagnostic>) {
        for diagnostic in diagnostics {
            self.push(diagnostic);
        }
    }

    /// Replace the crux notes.
    pub fn set_crux(&mut self, notes: Vec<CruxNote>) {
        self.crux = notes;
    }

    /// Diagnostics of one section.
    #[must_use]
    pub fn section(&self, section: Section) -> &[Diagnostic] {
        self.sections.get(&section).map(Vec::as_slice).unwrap_or(&[])
    }

    /// All diagnostics in section order.
    pub fn diagnostics(&self) -> impl Iterator<Item = &Diagnostic> {
        Section::ALL
            .into_iter()
            .flat_map(move |s| self.section(s).iter())
    }

    /// Total number of diagnostics.
    #[must_use]
    pub fn issue_count(&self) -> usize {
        self.sections.values().map(Vec::len).sum()
    }

    /// True iff there are no diagnostics. Crux notes do not count.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.issue_count() == 0
    }

    /// Crux notes in document order.
    #[must_use]
    pub fn crux(&self) -> &[CruxNote] {
        &self.crux
    }

    /// Document statistics.
    #[must_use]
    pub fn summary(&self) -> &Summary {
        &self.summary
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn empty_report() -> Report {
        let doc = Document::from_value(&json!({"arguments": []}))
            .expect("valid shape")
            .document;
        Report::new(Summary::from_document(&doc))
    }

    #[test]
    fn sections_are_ordered_regardless_of_push_order() {
        let mut report = empty_report();
        report.push(Diagnostic::new(Category::Contrary, "c"));
        report.push(Diagnostic::new(Category::Source, "s"));
        report.push(Diagnostic::new(Category::Ref, "r"));
        report.push(Diagnostic::new(Category::Schema, "x"));
        report.push(Diagnostic::new(Category::MathFail, "m"));
        report.push(Diagnostic::new(Category::EntailmentCycle, "g"));

        let categories: Vec<_> = report.diagnostics().map(|d| d.category).collect();
        assert_eq!(
            categories,
            vec![
                Category::Schema,
                Category::Ref,
                Category::MathFail,
                Category::EntailmentCycle,
                Category::Contrary,
                Category::Source,
            ]
        );
        assert_eq!(report.issue_count(), 6);
        assert!(!report.passed());
    }

    #[test]
    fn duplicate_schema_diagnostics_are_dropped() {
        let mut report = empty_report();
        let d = Diagnostic::new(Category::Schema, "$.a: 'b' is a required property");
        report.extend([d.clone(), d]);
        report.extend([
            Diagnostic::new(Category::Graph, "same"),
            Diagnostic::new(Category::Graph, "same"),
        ]);
        assert_eq!(report.section(Section::Schema).len(), 1);
        assert_eq!(report.section(Section::Graph).len(), 2);
    }

    #[test]
    fn crux_notes_never_fail_a_report() {
        let mut report = empty_report();
        report.set_crux(vec![CruxNote {
            statement: "a".into(),
            credence: 0.5,
            downstream: 3,
        }]);
        assert!(report.passed());
        assert_eq!(report.crux().len(), 1);
    }

    #[test]
    fn summary_counts_tags_and_fields() {
        let doc = Document::from_value(&json!({
            "statements": {
                "a": {"data": {"credence": 0.5, "tag": "observation", "math": "1 < 2"}},
                "b": {"data": {"tag": "observation"}},
                "c": {"data": {"tag": "assumption", "credence": 0.0}}
            }
        }))
        .expect("valid shape")
        .document;
        let summary = Summary::from_document(&doc);
        assert_eq!(summary.statements, 3);
        assert_eq!(summary.with_credence, 2);
        assert_eq!(summary.with_math, 1);
        assert_eq!(summary.tags.get("observation"), Some(&2));
        assert_eq!(
            summary.tags.keys().collect::<Vec<_>>(),
            vec!["assumption", "observation"]
        );
        assert_eq!(
            summary.to_string(),
            "Summary: 3 statements, 0 relations, 2 with credences, 1 math expressions"
        );
    }
}
