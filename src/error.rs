//! Rich diagnostic error types for the ontobot shell.
//!
//! Each subsystem defines its own error type with miette `#[diagnostic]`
//! derives, providing error codes, help text, and source chains so users
//! know exactly what went wrong and how to fix it.

use miette::Diagnostic;
use thiserror::Error;

/// Top-level error type for the ontobot shell.
///
/// Each variant wraps a subsystem-specific error, preserving the full
/// diagnostic chain (error codes, help text, sources) through to the user.
#[derive(Debug, Error, Diagnostic)]
pub enum OntobotError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Ontology(#[from] OntologyError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Query(#[from] QueryError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    World(#[from] WorldError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Shell(#[from] ShellError),
}

// ---------------------------------------------------------------------------
// Ontology errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum OntologyError {
    #[error("cannot read ontology file: {path}")]
    #[diagnostic(
        code(ontobot::ontology::io),
        help("Check that the file exists and is readable. Pass a different file with --ontology.")
    )]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("unsupported ontology format: {path}")]
    #[diagnostic(
        code(ontobot::ontology::unsupported_format),
        help(
            "The format is chosen by file extension. Supported: \
             .ttl (Turtle), .owl/.rdf/.xml (RDF/XML), .nt (N-Triples)."
        )
    )]
    UnsupportedFormat { path: String },

    #[error("ontology parse error: {message}")]
    #[diagnostic(
        code(ontobot::ontology::parse),
        help(
            "The ontology file is not valid in its declared syntax. \
             Re-export it from your editor, or check the reported line."
        )
    )]
    Parse { message: String },

    #[error("SPARQL evaluation error: {message}")]
    #[diagnostic(
        code(ontobot::ontology::sparql),
        help("The query could not be evaluated against the model. Check the query syntax.")
    )]
    Sparql { message: String },
}

// ---------------------------------------------------------------------------
// Query errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum QueryError {
    #[error("result for ?{variable} was a literal, expected a resource")]
    #[diagnostic(
        code(ontobot::query::unexpected_literal),
        help(
            "The query bound ?{variable} to a literal value where the shell \
             expected an ontology resource. The ontology likely uses a data \
             property where an object property was expected."
        )
    )]
    UnexpectedLiteral { variable: String },

    #[error("no variable ?{variable} in query solution")]
    #[diagnostic(
        code(ontobot::query::missing_variable),
        help("Every solution row must bind ?{variable}. Check the SELECT clause of the query.")
    )]
    MissingVariable { variable: String },

    #[error("unexpected result kind: expected {expected}")]
    #[diagnostic(
        code(ontobot::query::unexpected_result_kind),
        help("SELECT queries produce solutions, ASK queries produce a boolean. Use the matching helper.")
    )]
    UnexpectedResultKind { expected: String },

    #[error("invalid resource name: \"{name}\"")]
    #[diagnostic(
        code(ontobot::query::invalid_name),
        help(
            "Resources are referenced by local name under the ontology \
             namespace; only letters, digits, '_', '-' and '.' are accepted."
        )
    )]
    InvalidLocalName { name: String },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Ontology(#[from] OntologyError),
}

// ---------------------------------------------------------------------------
// World errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum WorldError {
    #[error("unknown thing: \"{name}\"")]
    #[diagnostic(
        code(ontobot::world::unknown_thing),
        help("No individual with this name is an instance of :Thing. List known things with `things`.")
    )]
    UnknownThing { name: String },

    #[error("unknown position: \"{name}\"")]
    #[diagnostic(
        code(ontobot::world::unknown_position),
        help("No individual with this name is an instance of :Position.")
    )]
    UnknownPosition { name: String },

    #[error("the ontology defines no action for moving things")]
    #[diagnostic(
        code(ontobot::world::no_move_action),
        help(
            "`put` needs an :Action subclass restricted on both :fromPosition \
             and :toPosition (or one characterized by :positionMovement). \
             Add one to the ontology."
        )
    )]
    NoMoveAction,

    #[error(transparent)]
    #[diagnostic(transparent)]
    Query(#[from] QueryError),
}

// ---------------------------------------------------------------------------
// Resolution errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum ResolveError {
    #[error("unknown capability: \"{name}\"")]
    #[diagnostic(
        code(ontobot::resolve::unknown_capability),
        help("No :Capability subclass with this name exists. List capabilities with `caps`.")
    )]
    UnknownCapability { name: String },

    #[error("dependency cycle: {path}")]
    #[diagnostic(
        code(ontobot::resolve::cycle),
        help(
            "A capability or component requires itself through the chain shown. \
             The dependency tree must be acyclic; fix the ontology's \
             :requiresComponent / :requiresCapability restrictions."
        )
    )]
    DependencyCycle { path: String },

    #[error("requirement tree deeper than {max_depth} levels")]
    #[diagnostic(
        code(ontobot::resolve::depth_exceeded),
        help(
            "Expansion stopped at the depth limit. This usually means the \
             ontology encodes an unexpectedly deep (or subtly cyclic) \
             requirement chain."
        )
    )]
    DepthExceeded { max_depth: usize },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Query(#[from] QueryError),
}

// ---------------------------------------------------------------------------
// Shell errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum ShellError {
    #[error("I/O error in shell session")]
    #[diagnostic(
        code(ontobot::shell::io),
        help("Reading from or writing to the terminal failed.")
    )]
    Io {
        #[source]
        source: std::io::Error,
    },
}

impl From<std::io::Error> for OntobotError {
    fn from(source: std::io::Error) -> Self {
        OntobotError::Shell(ShellError::Io { source })
    }
}

/// Convenience alias for functions returning ontobot results.
pub type OntobotResult<T> = std::result::Result<T, OntobotError>;
