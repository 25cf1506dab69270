//! # Document Model
//!
//! Normalises a parsed input document into the canonical [`Document`].
//!
//! Two input shapes are accepted, detected once at the boundary as a
//! [`SourceShape`] variant:
//!
//! ```text
//! PremiseConclusion:
//!   { claims: {id: {text}},
//!     arguments: [{name, premises: [{id, tag, math?, source?}],
//!                  inferences: [{from: [id, ...]}],
//!                  conclusion: {id, text}, relations: [{target, type}]}] }
//!
//! StatementExport:
//!   { statements: {title: {data: {credence?, tag?, math?}, members: [{text}],
//!                          relations: [{from, to, relationType}],
//!                          isUsedAsTopLevelStatement?}},
//!     arguments: {title: {relations: [...]}} }
//! ```
//!
//! Normalisation never fails once the shape is known: missing or malformed
//! fields become `SCHEMA:` issues carrying a JSON path, and the affected
//! record is skipped or kept with the field unset.

use crate::diagnostic::{Category, Diagnostic};
use crate::schema::{messages, path_index, path_key};
use crate::types::{
    ArgcheckError, Argument, Citation, Inference, Relation, RelationKind, SourceFormat, Statement,
    StatementRole, premise_statement_id,
};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};

// =============================================================================
// SOURCE SHAPE
// =============================================================================

/// The recognised input shapes, borrowed from the parsed document.
#[derive(Debug, Clone, Copy)]
pub enum SourceShape<'a> {
    /// Top-level `arguments` list, optional `claims` mapping.
    PremiseConclusion {
        /// The `claims` value, if present.
        claims: Option<&'a Value>,
        /// The `arguments` list.
        arguments: &'a [Value],
    },
    /// Top-level `statements` mapping, optional `arguments` mapping.
    StatementExport {
        /// The `statements` mapping.
        statements: &'a Map<String, Value>,
        /// The `arguments` value, if present.
        arguments: Option<&'a Value>,
    },
}

impl<'a> SourceShape<'a> {
    /// Classify a parsed document.
    ///
    /// This is the only place where the two formats are told apart.
    /// A document matching neither shape is fatal.
    pub fn detect(value: &'a Value) -> Result<Self, ArgcheckError> {
        let root = value.as_object().ok_or_else(|| {
            ArgcheckError::InvalidDocument("top level must be a mapping".to_string())
        })?;

        if let Some(statements) = root.get("statements") {
            let statements = statements.as_object().ok_or_else(|| {
                ArgcheckError::InvalidDocument("`statements` must be a mapping".to_string())
            })?;
            return Ok(SourceShape::StatementExport {
                statements,
                arguments: present(root.get("arguments")),
            });
        }

        match root.get("arguments") {
            Some(Value::Array(arguments)) => Ok(SourceShape::PremiseConclusion {
                claims: present(root.get("claims")),
                arguments,
            }),
            Some(_) => Err(ArgcheckError::InvalidDocument(
                "`arguments` must be a list".to_string(),
            )),
            None => Err(ArgcheckError::InvalidDocument(
                "document has neither an `arguments` list nor a `statements` mapping".to_string(),
            )),
        }
    }

    /// The format this shape normalises to.
    #[must_use]
    pub fn format(&self) -> SourceFormat {
        match self {
            SourceShape::PremiseConclusion { .. } => SourceFormat::PremiseConclusion,
            SourceShape::StatementExport { .. } => SourceFormat::StatementExport,
        }
    }
}

/// Treat an explicit `null` like an absent key.
fn present(value: Option<&Value>) -> Option<&Value> {
    value.filter(|v| !v.is_null())
}

// =============================================================================
// CANONICAL DOCUMENT
// =============================================================================

/// The canonical in-memory argument document.
///
/// Statements are stored by id and iterated through the explicit `order`,
/// which records document order.
#[derive(Debug, Clone)]
pub struct Document {
    format: SourceFormat,
    statements: BTreeMap<String, Statement>,
    order: Vec<String>,
    arguments: Vec<Argument>,
    claims: Vec<String>,
    relations: Vec<Relation>,
}

/// A normalised document plus the structural issues found on the way.
#[derive(Debug, Clone)]
pub struct Normalized {
    /// The canonical document.
    pub document: Document,
    /// `SCHEMA:` diagnostics, in document order.
    pub issues: Vec<Diagnostic>,
}

impl Document {
    /// Detect the shape of `value` and normalise it.
    pub fn from_value(value: &Value) -> Result<Normalized, ArgcheckError> {
        let shape = SourceShape::detect(value)?;
        Ok(Self::normalize(shape))
    }

    /// Normalise an already detected shape.
    #[must_use]
    pub fn normalize(shape: SourceShape<'_>) -> Normalized {
        let mut builder = Builder::new(shape.format());
        match shape {
            SourceShape::PremiseConclusion { claims, arguments } => {
                if let Some(claims) = claims {
                    builder.premise_claims(claims);
                }
                for (index, argument) in arguments.iter().enumerate() {
                    builder.premise_argument(index, argument);
                }
            }
            SourceShape::StatementExport {
                statements,
                arguments,
            } => {
                for (title, entry) in statements {
                    builder.export_statement(title, entry);
                }
                if let Some(arguments) = arguments {
                    builder.export_arguments(arguments);
                }
            }
        }
        builder.finish()
    }

    /// The format the document was normalised from.
    #[must_use]
    pub fn format(&self) -> SourceFormat {
        self.format
    }

    /// Look up a statement by id.
    #[must_use]
    pub fn statement(&self, id: &str) -> Option<&Statement> {
        self.statements.get(id)
    }

    /// Credence of a statement, if the statement exists and has one.
    #[must_use]
    pub fn credence(&self, id: &str) -> Option<f64> {
        self.statements.get(id).and_then(|s| s.credence)
    }

    /// Statement ids in document order.
    #[must_use]
    pub fn order(&self) -> &[String] {
        &self.order
    }

    /// Statements in document order.
    pub fn statements(&self) -> impl Iterator<Item = &Statement> {
        self.order.iter().filter_map(|id| self.statements.get(id))
    }

    /// Arguments in document order.
    #[must_use]
    pub fn arguments(&self) -> &[Argument] {
        &self.arguments
    }

    /// Claim ids in document order.
    #[must_use]
    pub fn claims(&self) -> &[String] {
        &self.claims
    }

    /// Deduplicated relations in document order.
    #[must_use]
    pub fn relations(&self) -> &[Relation] {
        &self.relations
    }

    /// Number of statements.
    #[must_use]
    pub fn statement_count(&self) -> usize {
        self.order.len()
    }

    /// Identifiers that become graph nodes, in registration order.
    ///
    /// - premise-conclusion: claims, then argument conclusions
    /// - statement export: statements, then argument titles
    #[must_use]
    pub fn graph_node_ids(&self) -> Vec<&str> {
        match self.format {
            SourceFormat::PremiseConclusion => self
                .statements()
                .filter(|s| matches!(s.role, StatementRole::Claim | StatementRole::Conclusion))
                .map(|s| s.id.as_str())
                .collect(),
            SourceFormat::StatementExport => self
                .order
                .iter()
                .map(String::as_str)
                .chain(self.arguments.iter().map(|a| a.name.as_str()))
                .collect(),
        }
    }

    /// Cited URLs in document order, as `(statement id, url)` pairs.
    #[must_use]
    pub fn citations(&self) -> Vec<(&str, &str)> {
        self.statements()
            .filter_map(|s| {
                let url = s.source.as_ref()?.url.as_deref()?;
                Some((s.id.as_str(), url))
            })
            .collect()
    }
}

// =============================================================================
// NORMALISATION
// =============================================================================

/// Accumulates records and issues while walking the input.
struct Builder {
    format: SourceFormat,
    statements: BTreeMap<String, Statement>,
    order: Vec<String>,
    arguments: Vec<Argument>,
    claims: Vec<String>,
    relations: Vec<Relation>,
    seen_relations: BTreeSet<Relation>,
    issues: Vec<Diagnostic>,
}

impl Builder {
    fn new(format: SourceFormat) -> Self {
        Self {
            format,
            statements: BTreeMap::new(),
            order: Vec::new(),
            arguments: Vec::new(),
            claims: Vec::new(),
            relations: Vec::new(),
            seen_relations: BTreeSet::new(),
            issues: Vec::new(),
        }
    }

    fn finish(self) -> Normalized {
        Normalized {
            document: Document {
                format: self.format,
                statements: self.statements,
                order: self.order,
                arguments: self.arguments,
                claims: self.claims,
                relations: self.relations,
            },
            issues: self.issues,
        }
    }

    fn issue(&mut self, path: &str, message: String) {
        self.issues
            .push(Diagnostic::new(Category::Schema, format!("{path}: {message}")));
    }

    /// Register a statement. The first record for an id wins.
    fn add_statement(&mut self, path: &str, statement: Statement) -> bool {
        if self.statements.contains_key(&statement.id) {
            self.issue(path, messages::duplicate_id(&statement.id));
            return false;
        }
        self.order.push(statement.id.clone());
        self.statements.insert(statement.id.clone(), statement);
        true
    }

    /// Add a relation unless an identical (from, to, type) triple exists.
    fn add_relation(&mut self, relation: Relation) {
        if self.seen_relations.insert(relation.clone()) {
            self.relations.push(relation);
        }
    }

    // -------------------------------------------------------------------------
    // Field readers
    // -------------------------------------------------------------------------

    fn as_mapping<'v>(&mut self, path: &str, value: &'v Value) -> Option<&'v Map<String, Value>> {
        let mapping = value.as_object();
        if mapping.is_none() {
            self.issue(path, messages::type_mismatch(value, "object"));
        }
        mapping
    }

    fn as_list<'v>(&mut self, path: &str, value: &'v Value) -> Option<&'v [Value]> {
        let list = value.as_array().map(Vec::as_slice);
        if list.is_none() {
            self.issue(path, messages::type_mismatch(value, "array"));
        }
        list
    }

    fn required_str(
        &mut self,
        path: &str,
        object: &Map<String, Value>,
        field: &str,
    ) -> Option<String> {
        match present(object.get(field)) {
            None => {
                self.issue(path, messages::required(field));
                None
            }
            Some(value) => self.string_field(&path_key(path, field), value),
        }
    }

    fn optional_str(
        &mut self,
        path: &str,
        object: &Map<String, Value>,
        field: &str,
    ) -> Option<String> {
        present(object.get(field)).and_then(|value| self.string_field(&path_key(path, field), value))
    }

    fn string_field(&mut self, path: &str, value: &Value) -> Option<String> {
        match value {
            Value::String(s) => Some(s.clone()),
            other => {
                self.issue(path, messages::type_mismatch(other, "string"));
                None
            }
        }
    }

    fn optional_list<'v>(
        &mut self,
        path: &str,
        object: &'v Map<String, Value>,
        field: &str,
    ) -> &'v [Value] {
        match present(object.get(field)) {
            None => &[],
            Some(value) => self.as_list(&path_key(path, field), value).unwrap_or(&[]),
        }
    }

    /// Credence: a number in [0, 1]. Anything else leaves it unset.
    fn credence(&mut self, path: &str, object: &Map<String, Value>) -> Option<f64> {
        let value = present(object.get("credence"))?;
        let path = path_key(path, "credence");
        let Some(credence) = value.as_f64() else {
            self.issue(&path, messages::type_mismatch(value, "number"));
            return None;
        };
        if credence < 0.0 {
            self.issue(&path, messages::below_minimum(value, 0.0));
            return None;
        }
        if credence > 1.0 {
            self.issue(&path, messages::above_maximum(value, 1.0));
            return None;
        }
        Some(credence)
    }

    /// Math: an expression string. Numbers and booleans are accepted as
    /// their literal text; blank strings count as absent.
    fn math(&mut self, path: &str, object: &Map<String, Value>) -> Option<String> {
        let expression = match present(object.get("math"))? {
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            Value::Bool(true) => "True".to_string(),
            Value::Bool(false) => "False".to_string(),
            other => {
                self.issue(
                    &path_key(path, "math"),
                    messages::type_mismatch(other, "string"),
                );
                return None;
            }
        };
        if expression.trim().is_empty() {
            None
        } else {
            Some(expression)
        }
    }

    /// Source: a URL string or a mapping with an optional `url`.
    fn citation(&mut self, path: &str, object: &Map<String, Value>) -> Option<Citation> {
        match present(object.get("source"))? {
            Value::String(url) => Some(Citation::from_url(url.clone())),
            Value::Object(fields) => {
                let mut citation = Citation::default();
                for (key, value) in fields {
                    match (key.as_str(), value) {
                        ("url", Value::String(url)) => citation.url = Some(url.clone()),
                        (_, Value::String(text)) => {
                            citation.metadata.insert(key.clone(), text.clone());
                        }
                        (_, Value::Null) => {}
                        (_, other) => {
                            citation.metadata.insert(key.clone(), other.to_string());
                        }
                    }
                }
                Some(citation)
            }
            other => {
                self.issue(
                    &path_key(path, "source"),
                    messages::type_mismatch(other, "object"),
                );
                None
            }
        }
    }

    /// Fill the optional credence, math and source fields.
    fn annotate(&mut self, path: &str, object: &Map<String, Value>, statement: &mut Statement) {
        statement.credence = self.credence(path, object);
        statement.math = self.math(path, object);
        statement.source = self.citation(path, object);
    }

    // -------------------------------------------------------------------------
    // Premise-conclusion format
    // -------------------------------------------------------------------------

    fn premise_claims(&mut self, claims: &Value) {
        let Some(claims) = self.as_mapping("$.claims", claims) else {
            return;
        };
        for (id, claim) in claims {
            let path = path_key("$.claims", id);
            let Some(fields) = self.as_mapping(&path, claim) else {
                continue;
            };
            let text = self.required_str(&path, fields, "text").unwrap_or_default();
            let mut statement = Statement::new(id.clone(), text, StatementRole::Claim);
            statement.tag = self.optional_str(&path, fields, "tag");
            self.annotate(&path, fields, &mut statement);
            if self.add_statement(&path, statement) {
                self.claims.push(id.clone());
            }
        }
    }

    fn premise_argument(&mut self, index: usize, value: &Value) {
        let path = path_index("$.arguments", index);
        let Some(fields) = self.as_mapping(&path, value) else {
            return;
        };

        let name = self
            .required_str(&path, fields, "name")
            .unwrap_or_else(|| format!("arguments[{index}]"));
        let mut argument = Argument::named(name.clone());

        match present(fields.get("premises")) {
            None => self.issue(&path, messages::required("premises")),
            Some(premises) => {
                let premises_path = path_key(&path, "premises");
                if let Some(premises) = self.as_list(&premises_path, premises) {
                    for (j, premise) in premises.iter().enumerate() {
                        let premise_path = path_index(&premises_path, j);
                        if let Some(local_id) = self.premise(&name, &premise_path, premise) {
                            argument.premises.push(local_id);
                        }
                    }
                }
            }
        }

        let inferences_path = path_key(&path, "inferences");
        for (j, inference) in self.optional_list(&path, fields, "inferences").iter().enumerate() {
            if let Some(inference) = self.inference(&path_index(&inferences_path, j), inference) {
                argument.inferences.push(inference);
            }
        }

        argument.conclusion = match present(fields.get("conclusion")) {
            None => {
                self.issue(&path, messages::required("conclusion"));
                None
            }
            Some(conclusion) => self.conclusion(&name, &path_key(&path, "conclusion"), conclusion),
        };

        let relations_path = path_key(&path, "relations");
        for (j, relation) in self.optional_list(&path, fields, "relations").iter().enumerate() {
            let relation_path = path_index(&relations_path, j);
            let Some(relation_fields) = self.as_mapping(&relation_path, relation) else {
                continue;
            };
            let target = self.required_str(&relation_path, relation_fields, "target");
            let kind = self.required_str(&relation_path, relation_fields, "type");
            if let (Some(from), Some(target), Some(kind)) =
                (argument.conclusion.clone(), target, kind)
            {
                self.add_relation(Relation::new(from, target, RelationKind::parse(&kind)));
            }
        }

        self.arguments.push(argument);
    }

    /// Returns the premise's local id when it was registered.
    fn premise(&mut self, argument: &str, path: &str, value: &Value) -> Option<String> {
        let fields = self.as_mapping(path, value)?;
        let local_id = self.required_str(path, fields, "id");
        let tag = self.required_str(path, fields, "tag");
        let local_id = local_id?;
        let text = self.optional_str(path, fields, "text").unwrap_or_default();

        let mut statement = Statement::new(
            premise_statement_id(argument, &local_id),
            text,
            StatementRole::Premise,
        );
        statement.tag = tag;
        statement.argument = Some(argument.to_string());
        self.annotate(path, fields, &mut statement);

        self.add_statement(path, statement).then_some(local_id)
    }

    fn inference(&mut self, path: &str, value: &Value) -> Option<Inference> {
        let fields = self.as_mapping(path, value)?;
        let Some(from) = present(fields.get("from")) else {
            self.issue(path, messages::required("from"));
            return None;
        };
        let from_path = path_key(path, "from");
        let refs = self.as_list(&from_path, from)?;
        if refs.is_empty() {
            self.issue(&from_path, messages::empty_list());
        }
        let mut inference = Inference::default();
        for (k, reference) in refs.iter().enumerate() {
            if let Some(id) = self.string_field(&path_index(&from_path, k), reference) {
                inference.from.push(id);
            }
        }
        Some(inference)
    }

    fn conclusion(&mut self, argument: &str, path: &str, value: &Value) -> Option<String> {
        let fields = self.as_mapping(path, value)?;
        let id = self.required_str(path, fields, "id");
        let text = self.required_str(path, fields, "text").unwrap_or_default();
        let id = id?;

        let mut statement = Statement::new(id.clone(), text, StatementRole::Conclusion);
        statement.tag = self.optional_str(path, fields, "tag");
        statement.argument = Some(argument.to_string());
        self.annotate(path, fields, &mut statement);
        self.add_statement(path, statement);

        // A duplicate id still names the node this argument concludes.
        Some(id)
    }

    // -------------------------------------------------------------------------
    // Statement-export format
    // -------------------------------------------------------------------------

    fn export_statement(&mut self, title: &str, value: &Value) {
        let path = path_key("$.statements", title);
        let Some(fields) = self.as_mapping(&path, value) else {
            return;
        };

        let text = self.member_text(&path, fields);
        let mut statement = Statement::new(title, text, StatementRole::Statement);

        if let Some(data) = present(fields.get("data")) {
            let data_path = path_key(&path, "data");
            if let Some(data) = self.as_mapping(&data_path, data) {
                statement.tag = self.optional_str(&data_path, data, "tag");
                self.annotate(&data_path, data, &mut statement);
            }
        }

        statement.top_level = match present(fields.get("isUsedAsTopLevelStatement")) {
            None => false,
            Some(Value::Bool(flag)) => *flag,
            Some(other) => {
                self.issue(
                    &path_key(&path, "isUsedAsTopLevelStatement"),
                    messages::type_mismatch(other, "boolean"),
                );
                false
            }
        };

        self.add_statement(&path, statement);
        self.export_relations(&path, fields);
    }

    /// Text of the first member, or empty.
    fn member_text(&mut self, path: &str, fields: &Map<String, Value>) -> String {
        let members_path = path_key(path, "members");
        let Some(first) = self.optional_list(path, fields, "members").first() else {
            return String::new();
        };
        let first_path = path_index(&members_path, 0);
        match self.as_mapping(&first_path, first) {
            Some(member) => self
                .optional_str(&first_path, member, "text")
                .unwrap_or_default(),
            None => String::new(),
        }
    }

    fn export_arguments(&mut self, arguments: &Value) {
        let Some(arguments) = self.as_mapping("$.arguments", arguments) else {
            return;
        };
        for (title, argument) in arguments {
            let path = path_key("$.arguments", title);
            let Some(fields) = self.as_mapping(&path, argument) else {
                continue;
            };
            self.arguments.push(Argument::named(title.clone()));
            self.export_relations(&path, fields);
        }
    }

    fn export_relations(&mut self, path: &str, fields: &Map<String, Value>) {
        let relations_path = path_key(path, "relations");
        for (k, relation) in self.optional_list(path, fields, "relations").iter().enumerate() {
            let relation_path = path_index(&relations_path, k);
            let Some(relation_fields) = self.as_mapping(&relation_path, relation) else {
                continue;
            };
            let from = self.required_str(&relation_path, relation_fields, "from");
            let to = self.required_str(&relation_path, relation_fields, "to");
            let kind = self.required_str(&relation_path, relation_fields, "relationType");
            if let (Some(from), Some(to), Some(kind)) = (from, to, kind) {
                self.add_relation(Relation::new(from, to, RelationKind::parse(&kind)));
            }
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn normalize(value: &Value) -> Normalized {
        Document::from_value(value).expect("recognised shape")
    }

    #[test]
    fn detects_premise_conclusion_shape() {
        let value = json!({"arguments": []});
        let shape = SourceShape::detect(&value).expect("shape");
        assert_eq!(shape.format(), SourceFormat::PremiseConclusion);
    }

    #[test]
    fn detects_statement_export_shape() {
        let value = json!({"statements": {}, "arguments": {}});
        let shape = SourceShape::detect(&value).expect("shape");
        assert_eq!(shape.format(), SourceFormat::StatementExport);
    }

    #[test]
    fn rejects_unrecognised_shape() {
        for value in [json!([]), json!({"claims": {}}), json!({"arguments": "x"})] {
            assert!(matches!(
                SourceShape::detect(&value),
                Err(ArgcheckError::InvalidDocument(_))
            ));
        }
    }

    #[test]
    fn premise_ids_are_qualified_by_argument() {
        let value = json!({
            "arguments": [{
                "name": "a1",
                "premises": [{"id": "p1", "tag": "assumption", "math": "2 > 1"}],
                "inferences": [{"from": ["p1"]}],
                "conclusion": {"id": "c1", "text": "C"},
                "relations": [{"target": "claim", "type": "supports"}]
            }]
        });
        let normalized = normalize(&value);
        assert!(normalized.issues.is_empty());

        let doc = normalized.document;
        let premise = doc.statement("a1/p1").expect("premise");
        assert_eq!(premise.role, StatementRole::Premise);
        assert_eq!(premise.math.as_deref(), Some("2 > 1"));
        assert_eq!(doc.arguments()[0].premises, vec!["p1".to_string()]);
        assert_eq!(
            doc.relations(),
            &[Relation::new("c1", "claim", RelationKind::Supports)]
        );
    }

    #[test]
    fn missing_required_fields_become_issues() {
        let value = json!({
            "arguments": [{
                "premises": [{"id": "p1"}],
                "conclusion": {"text": "C"}
            }]
        });
        let normalized = normalize(&value);
        let rendered: Vec<String> = normalized.issues.iter().map(ToString::to_string).collect();
        assert_eq!(
            rendered,
            vec![
                "SCHEMA: $.arguments[0]: 'name' is a required property",
                "SCHEMA: $.arguments[0].premises[0]: 'tag' is a required property",
                "SCHEMA: $.arguments[0].conclusion: 'id' is a required property",
            ]
        );
        assert!(normalized.document.arguments()[0].conclusion.is_none());
    }

    #[test]
    fn absent_credence_is_not_zero() {
        let value = json!({
            "statements": {
                "A": {"data": {"credence": 0.0}},
                "B": {"data": {}}
            }
        });
        let doc = normalize(&value).document;
        assert_eq!(doc.credence("A"), Some(0.0));
        assert_eq!(doc.credence("B"), None);
    }

    #[test]
    fn out_of_range_credence_is_reported_and_unset() {
        let value = json!({"statements": {"A": {"data": {"credence": 1.5}}}});
        let normalized = normalize(&value);
        assert_eq!(normalized.document.credence("A"), None);
        assert_eq!(
            normalized.issues[0].to_string(),
            "SCHEMA: $.statements.A.data.credence: 1.5 is greater than the maximum of 1"
        );
    }

    #[test]
    fn export_relations_are_deduplicated_across_sources() {
        let rel = json!({"from": "A", "to": "B", "relationType": "entails"});
        let value = json!({
            "statements": {
                "A": {"relations": [rel.clone()]},
                "B": {"relations": [rel.clone()]}
            },
            "arguments": {"arg": {"relations": [rel]}}
        });
        let doc = normalize(&value).document;
        assert_eq!(doc.relations().len(), 1);
    }

    #[test]
    fn export_statement_reads_members_and_marker() {
        let value = json!({
            "statements": {
                "A": {
                    "members": [{"text": "first"}, {"text": "second"}],
                    "isUsedAsTopLevelStatement": true,
                    "data": {"tag": "observation", "source": "https://example.org"}
                }
            }
        });
        let doc = normalize(&value).document;
        let a = doc.statement("A").expect("A");
        assert_eq!(a.text, "first");
        assert!(a.top_level);
        assert!(a.has_tag("observation"));
        assert_eq!(doc.citations(), vec![("A", "https://example.org")]);
    }

    #[test]
    fn document_order_follows_source_order() {
        let value = json!({
            "statements": {"zeta": {}, "alpha": {}, "mid": {}}
        });
        let doc = normalize(&value).document;
        assert_eq!(doc.order(), &["zeta", "alpha", "mid"]);
    }

    #[test]
    fn graph_nodes_exclude_premises() {
        let value = json!({
            "claims": {"k": {"text": "K"}},
            "arguments": [{
                "name": "a1",
                "premises": [{"id": "p1", "tag": "assumption"}],
                "conclusion": {"id": "c1", "text": "C"}
            }]
        });
        let doc = normalize(&value).document;
        assert_eq!(doc.graph_node_ids(), vec!["k", "c1"]);
    }

    #[test]
    fn duplicate_statement_ids_keep_first() {
        let value = json!({
            "claims": {"x": {"text": "claim"}},
            "arguments": [{
                "name": "a1",
                "premises": [],
                "conclusion": {"id": "x", "text": "conclusion"}
            }]
        });
        let normalized = normalize(&value);
        assert_eq!(normalized.document.statement("x").map(|s| s.role), Some(StatementRole::Claim));
        assert_eq!(
            normalized.issues[0].to_string(),
            "SCHEMA: $.arguments[0].conclusion: duplicate statement id 'x'"
        );
    }
}
