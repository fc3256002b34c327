//! # ontobot
//!
//! A command shell over a symbolic world model: a kitchen with things,
//! positions, events, and robot capabilities, stored as an OWL ontology
//! and accessed entirely through SPARQL.
//!
//! ## Architecture
//!
//! - **Ontology** (`ontology`): in-memory oxigraph store, loaded at startup
//! - **Queries** (`query`): prefixed SPARQL bodies + tuple unmarshalling;
//!   all closures (subclass, equivalence, union membership) are property
//!   paths evaluated by the engine
//! - **World** (`world`): the facade the shell talks to
//! - **Resolution** (`resolve`): capability/component requirement trees
//!   with union alternatives and minimal-configuration search
//! - **Shell** (`shell`): command registry + REPL over generic streams
//!
//! ## Library usage
//!
//! ```no_run
//! use std::path::Path;
//! use ontobot::vocab::KITCHEN_NS;
//! use ontobot::world::World;
//!
//! let world = World::open(Path::new("ontology/kitchen.ttl"), KITCHEN_NS).unwrap();
//! for row in world.things().unwrap() {
//!     println!("{}", row.thing);
//! }
//! ```

pub mod error;
pub mod ontology;
pub mod query;
pub mod resolve;
pub mod shell;
pub mod vocab;
pub mod world;
