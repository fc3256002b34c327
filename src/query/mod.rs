//! Query engine and result-tuple unmarshalling.
//!
//! The shell never touches triples directly: every question it asks is a
//! SPARQL SELECT (or ASK/UPDATE) built from a short body, prefixed with the
//! standard header, and evaluated by the ontology store. This module owns
//! the prefixing, the execution, and the rules for turning solution rows
//! back into [`Resource`] values.
//!
//! Unmarshalling rules:
//! - a literal where a resource is expected is an error, never coerced;
//! - blank nodes (anonymous class scaffolding) are skipped, never surfaced;
//! - "exactly one" lookups return `None` on both absence and ambiguity.

pub mod catalog;

use oxigraph::model::Term;
use oxigraph::sparql::QueryResults;
use serde::Serialize;

use crate::error::QueryError;
use crate::ontology::OntologyModel;
use crate::vocab::{self, Prefixes};

/// Result alias for query operations.
pub type QueryResult<T> = std::result::Result<T, QueryError>;

/// A named ontology resource: full IRI plus derived local name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Resource {
    iri: String,
}

impl Resource {
    /// Wrap a full IRI.
    pub fn new(iri: impl Into<String>) -> Self {
        Self { iri: iri.into() }
    }

    /// The full IRI.
    pub fn iri(&self) -> &str {
        &self.iri
    }

    /// The local name (fragment) of the IRI.
    pub fn name(&self) -> &str {
        vocab::local_name(&self.iri)
    }
}

impl std::fmt::Display for Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// One solution row of a SELECT query.
#[derive(Debug, Clone)]
pub struct Row {
    bindings: Vec<(String, Term)>,
}

impl Row {
    /// The term bound to `variable`, if any.
    pub fn term(&self, variable: &str) -> Option<&Term> {
        self.bindings
            .iter()
            .find(|(name, _)| name == variable)
            .map(|(_, term)| term)
    }

    /// The named resource bound to `variable`.
    ///
    /// `Ok(None)` for unbound or blank-node bindings; a literal is an error.
    pub fn named(&self, variable: &str) -> QueryResult<Option<Resource>> {
        match self.term(variable) {
            None | Some(Term::BlankNode(_)) => Ok(None),
            Some(Term::NamedNode(node)) => Ok(Some(Resource::new(node.as_str()))),
            Some(_) => Err(QueryError::UnexpectedLiteral {
                variable: variable.to_string(),
            }),
        }
    }

    /// A stable (within one result set) grouping key for the term bound to
    /// `variable`. Blank node labels are consistent inside a single result
    /// set, so this is safe for grouping but must never be re-queried.
    pub fn group_key(&self, variable: &str) -> Option<String> {
        self.term(variable).map(|t| t.to_string())
    }

    /// All bindings as (variable, serialized term) pairs.
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        self.bindings
            .iter()
            .map(|(name, term)| (name.clone(), term.to_string()))
            .collect()
    }
}

/// Executes prefixed queries against the ontology and unmarshals the tuples
/// that come back.
pub struct QueryEngine {
    model: OntologyModel,
    prefixes: Prefixes,
}

impl QueryEngine {
    /// Create an engine over `model` with `:` bound to `namespace`.
    pub fn new(model: OntologyModel, namespace: impl Into<String>) -> Self {
        Self {
            model,
            prefixes: Prefixes::new(namespace),
        }
    }

    /// The underlying ontology model.
    pub fn model(&self) -> &OntologyModel {
        &self.model
    }

    /// The namespace bound to `:`.
    pub fn namespace(&self) -> &str {
        self.prefixes.base()
    }

    /// Execute a SELECT body (without prefixes) and collect all rows.
    pub fn select(&self, body: &str) -> QueryResult<Vec<Row>> {
        tracing::debug!(query = body, "select");
        let sparql = format!("{}{}", self.prefixes.header(), body);
        match self.model.query(&sparql)? {
            QueryResults::Solutions(solutions) => {
                let mut rows = Vec::new();
                for solution in solutions {
                    let solution = solution.map_err(|e| {
                        QueryError::Ontology(crate::error::OntologyError::Sparql {
                            message: e.to_string(),
                        })
                    })?;
                    let bindings = solution
                        .iter()
                        .map(|(var, term)| (var.as_str().to_string(), term.clone()))
                        .collect();
                    rows.push(Row { bindings });
                }
                Ok(rows)
            }
            _ => Err(QueryError::UnexpectedResultKind {
                expected: "solutions".into(),
            }),
        }
    }

    /// Execute an ASK body (without prefixes).
    pub fn ask(&self, body: &str) -> QueryResult<bool> {
        tracing::debug!(query = body, "ask");
        let sparql = format!("{}{}", self.prefixes.header(), body);
        Ok(self.model.ask(&sparql)?)
    }

    /// Execute an UPDATE body (without prefixes).
    pub fn update(&self, body: &str) -> QueryResult<()> {
        tracing::debug!(update = body, "update");
        let sparql = format!("{}{}", self.prefixes.header(), body);
        Ok(self.model.update(&sparql)?)
    }

    /// Run a SELECT and collect every named resource bound to `variable`.
    ///
    /// An unbound row is an error (the variable must appear in every
    /// solution); a literal is an error; blank nodes are skipped.
    pub fn resources(&self, body: &str, variable: &str) -> QueryResult<Vec<Resource>> {
        let mut out = Vec::new();
        for row in self.select(body)? {
            match row.term(variable) {
                None => {
                    return Err(QueryError::MissingVariable {
                        variable: variable.to_string(),
                    });
                }
                Some(Term::BlankNode(_)) => continue,
                Some(Term::NamedNode(node)) => out.push(Resource::new(node.as_str())),
                Some(_) => {
                    return Err(QueryError::UnexpectedLiteral {
                        variable: variable.to_string(),
                    });
                }
            }
        }
        Ok(out)
    }

    /// Run a SELECT expected to bind `variable` exactly once.
    ///
    /// `None` when there are zero solutions, and also when there are two or
    /// more: an over-determined model is treated as absence. A literal
    /// binding is an error.
    pub fn one_resource(&self, body: &str, variable: &str) -> QueryResult<Option<Resource>> {
        let rows = self.select(body)?;
        if rows.len() != 1 {
            return Ok(None);
        }
        rows[0].named(variable)
    }

    /// Validate a user-supplied local name before splicing it into a query.
    pub fn check_name<'a>(&self, name: &'a str) -> QueryResult<&'a str> {
        if vocab::is_valid_local_name(name) {
            Ok(name)
        } else {
            Err(QueryError::InvalidLocalName {
                name: name.to_string(),
            })
        }
    }
}

impl std::fmt::Debug for QueryEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryEngine")
            .field("namespace", &self.prefixes.base())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vocab::KITCHEN_NS;

    const FIXTURE: &str = r#"
        @prefix : <http://ontobot.dev/ont/kitchen#> .
        @prefix rdfs: <http://www.w3.org/2000/01/rdf-schema#> .
        @prefix xsd: <http://www.w3.org/2001/XMLSchema#> .

        :Bread rdfs:subClassOf :Foodstuff .
        :Foodstuff rdfs:subClassOf :Thing .
        :ryeLoaf a :Bread ;
            :isAtPosition :shelf ;
            :sliceCount "12"^^xsd:integer .
        :espressoCup a :Cup ;
            :isAtPosition :counter .
    "#;

    fn engine() -> QueryEngine {
        let model = OntologyModel::from_turtle(FIXTURE).unwrap();
        QueryEngine::new(model, KITCHEN_NS)
    }

    #[test]
    fn resource_display_uses_local_name() {
        let r = Resource::new("http://ontobot.dev/ont/kitchen#ryeLoaf");
        assert_eq!(r.to_string(), "ryeLoaf");
        assert_eq!(r.name(), "ryeLoaf");
    }

    #[test]
    fn select_with_subclass_closure() {
        let things = engine()
            .resources("SELECT ?x WHERE { ?x a/rdfs:subClassOf* :Thing . }", "x")
            .unwrap();
        assert_eq!(things.len(), 1);
        assert_eq!(things[0].name(), "ryeLoaf");
    }

    #[test]
    fn literal_binding_is_an_error() {
        let result = engine().resources("SELECT ?n WHERE { :ryeLoaf :sliceCount ?n . }", "n");
        assert!(matches!(
            result,
            Err(QueryError::UnexpectedLiteral { .. })
        ));
    }

    #[test]
    fn missing_variable_is_an_error() {
        let result = engine().resources("SELECT ?x WHERE { ?x a :Bread . }", "y");
        assert!(matches!(result, Err(QueryError::MissingVariable { .. })));
    }

    #[test]
    fn one_resource_absent_and_unique() {
        let engine = engine();
        let pos = engine
            .one_resource("SELECT ?p WHERE { :ryeLoaf :isAtPosition ?p . }", "p")
            .unwrap();
        assert_eq!(pos.unwrap().name(), "shelf");

        let none = engine
            .one_resource("SELECT ?p WHERE { :pumpernickel :isAtPosition ?p . }", "p")
            .unwrap();
        assert!(none.is_none());
    }

    #[test]
    fn one_resource_ambiguous_is_none() {
        // Two individuals bind ?p: ambiguity reads as absence.
        let pos = engine()
            .one_resource("SELECT ?p WHERE { ?x :isAtPosition ?p . }", "p")
            .unwrap();
        assert!(pos.is_none());
    }

    #[test]
    fn ask_and_update_round_trip() {
        let engine = engine();
        assert!(!engine.ask("ASK { :ryeLoaf :isAtPosition :counter }").unwrap());
        engine
            .update(
                "DELETE { :ryeLoaf :isAtPosition ?old } \
                 INSERT { :ryeLoaf :isAtPosition :counter } \
                 WHERE { OPTIONAL { :ryeLoaf :isAtPosition ?old } }",
            )
            .unwrap();
        assert!(engine.ask("ASK { :ryeLoaf :isAtPosition :counter }").unwrap());
        assert!(!engine.ask("ASK { :ryeLoaf :isAtPosition :shelf }").unwrap());
    }

    #[test]
    fn check_name_rejects_injection() {
        let engine = engine();
        assert!(engine.check_name("ryeLoaf").is_ok());
        assert!(engine.check_name("x } ?s ?p ?o {").is_err());
    }
}
