//! Ontology model backed by oxigraph.
//!
//! Loads an OWL ontology file into an in-memory SPARQL store at startup and
//! exposes raw query execution. All reasoning the shell relies on (subclass
//! closure, restriction walking, union expansion) happens inside the SPARQL
//! engine via property paths; this module never interprets triples itself.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use oxigraph::io::RdfFormat;
use oxigraph::sparql::QueryResults;
use oxigraph::store::Store;

use crate::error::OntologyError;

/// An OWL ontology held in an in-memory oxigraph store.
pub struct OntologyModel {
    store: Store,
}

/// Result alias for ontology operations.
pub type OntologyResult<T> = std::result::Result<T, OntologyError>;

impl OntologyModel {
    /// Load an ontology from a local file; the serialization is chosen by
    /// file extension.
    pub fn load(path: &Path) -> OntologyResult<Self> {
        let format = format_for(path)?;
        let file = File::open(path).map_err(|source| OntologyError::Io {
            path: path.display().to_string(),
            source,
        })?;

        let model = Self::empty()?;
        model
            .store
            .load_from_reader(format, BufReader::new(file))
            .map_err(|e| OntologyError::Parse {
                message: format!("{}: {e}", path.display()),
            })?;

        tracing::info!(
            path = %path.display(),
            triples = model.triple_count(),
            "ontology loaded"
        );
        Ok(model)
    }

    /// Load an ontology from a Turtle string (tests, embedded fixtures).
    pub fn from_turtle(data: &str) -> OntologyResult<Self> {
        let model = Self::empty()?;
        model
            .store
            .load_from_reader(RdfFormat::Turtle, data.as_bytes())
            .map_err(|e| OntologyError::Parse {
                message: e.to_string(),
            })?;
        Ok(model)
    }

    fn empty() -> OntologyResult<Self> {
        let store = Store::new().map_err(|e| OntologyError::Sparql {
            message: format!("failed to create oxigraph store: {e}"),
        })?;
        Ok(Self { store })
    }

    /// Execute a SPARQL query (any form) against the model.
    pub fn query(&self, sparql: &str) -> OntologyResult<QueryResults> {
        self.store.query(sparql).map_err(|e| OntologyError::Sparql {
            message: e.to_string(),
        })
    }

    /// Execute a SPARQL ASK query.
    pub fn ask(&self, sparql: &str) -> OntologyResult<bool> {
        match self.query(sparql)? {
            QueryResults::Boolean(b) => Ok(b),
            _ => Err(OntologyError::Sparql {
                message: "expected boolean result from ASK query".into(),
            }),
        }
    }

    /// Execute a SPARQL UPDATE against the model.
    pub fn update(&self, sparql: &str) -> OntologyResult<()> {
        self.store.update(sparql).map_err(|e| OntologyError::Sparql {
            message: e.to_string(),
        })
    }

    /// Number of triples in the model.
    pub fn triple_count(&self) -> usize {
        self.store.len().unwrap_or(0)
    }

    /// Get internal store reference (for advanced oxigraph operations).
    pub fn store(&self) -> &Store {
        &self.store
    }
}

impl std::fmt::Debug for OntologyModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OntologyModel")
            .field("triples", &self.triple_count())
            .finish()
    }
}

fn format_for(path: &Path) -> OntologyResult<RdfFormat> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("ttl") => Ok(RdfFormat::Turtle),
        Some("owl") | Some("rdf") | Some("xml") => Ok(RdfFormat::RdfXml),
        Some("nt") => Ok(RdfFormat::NTriples),
        _ => Err(OntologyError::UnsupportedFormat {
            path: path.display().to_string(),
        }),
    }
}
