//! World model facade: the single entry point the shell talks to.
//!
//! Owns the ontology store and query engine and exposes the operations the
//! commands are built from: listing things, reporting a thing's classes and
//! event history, listing capabilities, resolving a capability's
//! requirements, and moving things between positions.

use std::collections::HashSet;
use std::path::Path;

use serde::Serialize;

use crate::error::{OntobotResult, WorldError};
use crate::ontology::OntologyModel;
use crate::query::{QueryEngine, Resource};
use crate::resolve::{self, Resolution};

/// Cap on the `:isPreviousEventOf` walk, so a cyclic event chain in a
/// hand-edited ontology terminates.
const MAX_EVENT_CHAIN: usize = 64;

/// The symbolic world model.
pub struct World {
    queries: QueryEngine,
}

/// One row of the `things` listing.
#[derive(Debug, Clone, Serialize)]
pub struct ThingRow {
    pub thing: Resource,
    pub class: Option<Resource>,
    pub position: Option<Resource>,
}

/// Everything the shell reports about a single thing.
#[derive(Debug, Clone, Serialize)]
pub struct ThingReport {
    pub thing: Resource,
    /// Most specific named class first, then its superclass chain.
    pub classes: Vec<Resource>,
    pub position: Option<Resource>,
    /// The event chain from the initial state, in order.
    pub history: Vec<Resource>,
    /// Events recorded against the thing but not linked into the chain.
    pub detached: Vec<Resource>,
}

impl ThingReport {
    /// The thing's current state: the last event of its chain.
    pub fn current_state(&self) -> Option<&Resource> {
        self.history.last()
    }
}

/// One row of the `caps` listing.
#[derive(Debug, Clone, Serialize)]
pub struct CapabilityRow {
    pub class: Resource,
    pub possessed: bool,
}

/// Result of `require`: the expanded tree plus what the robot lacks.
#[derive(Debug, Clone)]
pub struct CapabilityReport {
    pub resolution: Resolution,
    pub missing: Vec<Resource>,
}

/// Summary information about the world model.
#[derive(Debug, Clone, Serialize)]
pub struct WorldInfo {
    pub namespace: String,
    pub triple_count: usize,
    pub thing_count: usize,
    pub capability_count: usize,
}

impl std::fmt::Display for WorldInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "world model")?;
        writeln!(f, "  namespace:    {}", self.namespace)?;
        writeln!(f, "  triples:      {}", self.triple_count)?;
        writeln!(f, "  things:       {}", self.thing_count)?;
        writeln!(f, "  capabilities: {}", self.capability_count)?;
        Ok(())
    }
}

impl World {
    /// Load the world model from an ontology file.
    pub fn open(path: &Path, namespace: impl Into<String>) -> OntobotResult<Self> {
        let model = OntologyModel::load(path)?;
        Ok(Self {
            queries: QueryEngine::new(model, namespace),
        })
    }

    /// Build a world model from a Turtle string.
    pub fn from_turtle(data: &str, namespace: impl Into<String>) -> OntobotResult<Self> {
        let model = OntologyModel::from_turtle(data)?;
        Ok(Self {
            queries: QueryEngine::new(model, namespace),
        })
    }

    /// The query engine (for raw SELECT access from the CLI).
    pub fn queries(&self) -> &QueryEngine {
        &self.queries
    }

    /// The ontology namespace bound to `:`.
    pub fn namespace(&self) -> &str {
        self.queries.namespace()
    }

    fn resource(&self, name: &str) -> Resource {
        Resource::new(format!("{}{}", self.namespace(), name))
    }

    fn is_instance_of(&self, name: &str, class: &str) -> OntobotResult<bool> {
        let name = self.queries.check_name(name).map_err(WorldError::from)?;
        Ok(self
            .queries
            .ask(&format!("ASK {{ :{name} a/rdfs:subClassOf* :{class} }}"))
            .map_err(WorldError::from)?)
    }

    /// Every `:Thing` instance with its most specific named class and
    /// current position.
    pub fn things(&self) -> OntobotResult<Vec<ThingRow>> {
        let mut rows = Vec::new();
        for thing in self.queries.instances_of("Thing").map_err(WorldError::from)? {
            let class = self
                .queries
                .classes_of(thing.name())
                .map_err(WorldError::from)?
                .into_iter()
                .next();
            let position = self
                .queries
                .position_of(thing.name())
                .map_err(WorldError::from)?;
            rows.push(ThingRow {
                thing,
                class,
                position,
            });
        }
        Ok(rows)
    }

    /// Classes, position, and event history of a thing.
    pub fn thing_report(&self, name: &str) -> OntobotResult<ThingReport> {
        if !self.is_instance_of(name, "Thing")? {
            return Err(WorldError::UnknownThing {
                name: name.to_string(),
            }
            .into());
        }

        let mut classes = self.queries.classes_of(name).map_err(WorldError::from)?;
        if let Some(direct) = classes.first().cloned() {
            let chain = self
                .queries
                .superclass_chain(&direct)
                .map_err(WorldError::from)?;
            classes = std::iter::once(direct).chain(chain).collect();
        }

        let position = self.queries.position_of(name).map_err(WorldError::from)?;

        // Walk the chain from the initial state; a visited set terminates
        // hand-edited cyclic chains.
        let mut history = Vec::new();
        let mut seen: HashSet<Resource> = HashSet::new();
        if let Some(initial) = self.queries.initial_state_of(name).map_err(WorldError::from)? {
            seen.insert(initial.clone());
            history.push(initial);
            while history.len() < MAX_EVENT_CHAIN {
                let last = history.last().expect("history is non-empty");
                match self.queries.next_event(last).map_err(WorldError::from)? {
                    Some(next) if seen.insert(next.clone()) => history.push(next),
                    _ => break,
                }
            }
        }

        let detached = self
            .queries
            .events_acted_on(name)
            .map_err(WorldError::from)?
            .into_iter()
            .filter(|e| !seen.contains(e))
            .collect();

        Ok(ThingReport {
            thing: self.resource(name),
            classes,
            position,
            history,
            detached,
        })
    }

    /// All capability classes, marked with whether the robot has them.
    pub fn capabilities(&self) -> OntobotResult<Vec<CapabilityRow>> {
        let possessed = self
            .queries
            .robot_capability_classes()
            .map_err(WorldError::from)?;
        Ok(self
            .queries
            .capability_classes()
            .map_err(WorldError::from)?
            .into_iter()
            .map(|class| CapabilityRow {
                possessed: possessed.contains(&class),
                class,
            })
            .collect())
    }

    /// Resolve a capability's requirement tree and compare its minimal
    /// configuration against the robot's components.
    pub fn require(&self, name: &str) -> OntobotResult<CapabilityReport> {
        let name = self
            .queries
            .check_name(name)
            .map_err(crate::error::ResolveError::from)?;
        let class = self.resource(name);
        let known = self
            .queries
            .ask(&format!("ASK {{ :{name} rdfs:subClassOf+ :Capability }}"))
            .map_err(crate::error::ResolveError::from)?;
        if !known {
            return Err(crate::error::ResolveError::UnknownCapability {
                name: name.to_string(),
            }
            .into());
        }

        let resolution = resolve::resolve_capability(&self.queries, &class)?;
        let available = self
            .queries
            .robot_component_classes()
            .map_err(crate::error::ResolveError::from)?;
        let missing = resolution.missing(&available);
        Ok(CapabilityReport {
            resolution,
            missing,
        })
    }

    /// Move a thing to a position.
    ///
    /// Validates both names, requires a move action to exist in the
    /// ontology, then rewrites the `:isAtPosition` link in one update.
    /// Returns the action class that licensed the move.
    pub fn put(&self, thing: &str, position: &str) -> OntobotResult<Resource> {
        if !self.is_instance_of(thing, "Thing")? {
            return Err(WorldError::UnknownThing {
                name: thing.to_string(),
            }
            .into());
        }
        if !self.is_instance_of(position, "Position")? {
            return Err(WorldError::UnknownPosition {
                name: position.to_string(),
            }
            .into());
        }

        // The structural query first; the characteristic-based encoding is
        // the fallback when no action carries both position restrictions.
        let action = match self.queries.move_action().map_err(WorldError::from)? {
            Some(action) => action,
            None => {
                let mut movers = self
                    .queries
                    .actions_with_characteristic("positionMovement")
                    .map_err(WorldError::from)?;
                match (movers.len(), movers.pop()) {
                    (1, Some(action)) => action,
                    _ => return Err(WorldError::NoMoveAction.into()),
                }
            }
        };

        self.queries
            .update(&format!(
                "DELETE {{ :{thing} :isAtPosition ?old }} \
                 INSERT {{ :{thing} :isAtPosition :{position} }} \
                 WHERE {{ OPTIONAL {{ :{thing} :isAtPosition ?old }} }}"
            ))
            .map_err(WorldError::from)?;

        tracing::info!(thing, position, action = %action, "thing moved");
        Ok(action)
    }

    /// Summary of the loaded model.
    pub fn info(&self) -> OntobotResult<WorldInfo> {
        Ok(WorldInfo {
            namespace: self.namespace().to_string(),
            triple_count: self.queries.model().triple_count(),
            thing_count: self.queries.instances_of("Thing").map_err(WorldError::from)?.len(),
            capability_count: self
                .queries
                .capability_classes()
                .map_err(WorldError::from)?
                .len(),
        })
    }
}

impl std::fmt::Debug for World {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("World")
            .field("namespace", &self.namespace())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OntobotError;
    use crate::vocab::KITCHEN_NS;

    fn world() -> World {
        World::from_turtle(include_str!("../ontology/kitchen.ttl"), KITCHEN_NS).unwrap()
    }

    #[test]
    fn things_carry_class_and_position() {
        let rows = world().things().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].thing.name(), "espressoCup");
        assert_eq!(rows[0].class.as_ref().unwrap().name(), "Cup");
        assert_eq!(rows[0].position.as_ref().unwrap().name(), "counter");
        assert_eq!(rows[1].thing.name(), "ryeLoaf");
        assert_eq!(rows[1].position.as_ref().unwrap().name(), "shelf");
    }

    #[test]
    fn thing_report_walks_classes_and_events() {
        let report = world().thing_report("ryeLoaf").unwrap();
        let names: Vec<&str> = report.classes.iter().map(Resource::name).collect();
        assert_eq!(names, vec!["Bread", "Foodstuff", "Thing"]);

        let history: Vec<&str> = report.history.iter().map(Resource::name).collect();
        assert_eq!(history, vec!["ryeLoafBought", "ryeLoafSliced", "ryeLoafToasted"]);
        assert_eq!(report.current_state().unwrap().name(), "ryeLoafToasted");

        let detached: Vec<&str> = report.detached.iter().map(Resource::name).collect();
        assert_eq!(detached, vec!["ryeLoafPhotographed"]);
    }

    #[test]
    fn thing_report_without_chain() {
        let report = world().thing_report("espressoCup").unwrap();
        let history: Vec<&str> = report.history.iter().map(Resource::name).collect();
        assert_eq!(history, vec!["espressoCupStored"]);
        assert!(report.detached.is_empty());
    }

    #[test]
    fn unknown_thing_is_an_error() {
        let err = world().thing_report("pumpernickel").unwrap_err();
        assert!(matches!(
            err,
            OntobotError::World(WorldError::UnknownThing { .. })
        ));
    }

    #[test]
    fn capabilities_marked_against_the_robot() {
        let rows = world().capabilities().unwrap();
        let grasp = rows.iter().find(|r| r.class.name() == "GraspCapability").unwrap();
        assert!(grasp.possessed);
        let toast = rows.iter().find(|r| r.class.name() == "ToastCapability").unwrap();
        assert!(!toast.possessed);
    }

    #[test]
    fn require_reports_missing_components() {
        let report = world().require("ToastCapability").unwrap();
        let missing: Vec<&str> = report.missing.iter().map(Resource::name).collect();
        assert_eq!(missing, vec!["HeatingElement"]);
    }

    #[test]
    fn require_unknown_capability() {
        let err = world().require("FlyCapability").unwrap_err();
        assert!(matches!(
            err,
            OntobotError::Resolve(crate::error::ResolveError::UnknownCapability { .. })
        ));
    }

    #[test]
    fn put_moves_a_thing() {
        let world = world();
        let action = world.put("ryeLoaf", "toasterSlot").unwrap();
        assert_eq!(action.name(), "MoveAction");

        let report = world.thing_report("ryeLoaf").unwrap();
        assert_eq!(report.position.unwrap().name(), "toasterSlot");

        // The old link is gone, not duplicated.
        assert!(
            !world
                .queries()
                .ask("ASK { :ryeLoaf :isAtPosition :shelf }")
                .unwrap()
        );
    }

    #[test]
    fn put_validates_both_names() {
        let world = world();
        assert!(matches!(
            world.put("pumpernickel", "counter").unwrap_err(),
            OntobotError::World(WorldError::UnknownThing { .. })
        ));
        assert!(matches!(
            world.put("ryeLoaf", "attic").unwrap_err(),
            OntobotError::World(WorldError::UnknownPosition { .. })
        ));
    }

    #[test]
    fn put_falls_back_to_the_characteristic_encoding() {
        // No from/to restrictions, only the equivalence characteristic.
        let turtle = format!(
            r#"
            @prefix : <{KITCHEN_NS}> .
            @prefix owl: <http://www.w3.org/2002/07/owl#> .
            @prefix rdfs: <http://www.w3.org/2000/01/rdf-schema#> .

            :Thing a owl:Class .
            :Position a owl:Class .
            :Action a owl:Class .
            :spoon a :Thing .
            :drawer a :Position .
            :ShiftAction a owl:Class ;
                rdfs:subClassOf :Action ;
                owl:equivalentClass [ a owl:Class ;
                    owl:intersectionOf ( :Action
                        [ a owl:Restriction ;
                            owl:onProperty :hasCharacteristic ;
                            owl:hasValue :positionMovement ] ) ] .
            "#
        );
        let world = World::from_turtle(&turtle, KITCHEN_NS).unwrap();
        let action = world.put("spoon", "drawer").unwrap();
        assert_eq!(action.name(), "ShiftAction");
    }

    #[test]
    fn put_without_any_move_action() {
        let turtle = format!(
            r#"
            @prefix : <{KITCHEN_NS}> .
            @prefix owl: <http://www.w3.org/2002/07/owl#> .

            :Thing a owl:Class .
            :Position a owl:Class .
            :spoon a :Thing .
            :drawer a :Position .
            "#
        );
        let world = World::from_turtle(&turtle, KITCHEN_NS).unwrap();
        assert!(matches!(
            world.put("spoon", "drawer").unwrap_err(),
            OntobotError::World(WorldError::NoMoveAction)
        ));
    }

    #[test]
    fn info_counts() {
        let info = world().info().unwrap();
        assert_eq!(info.namespace, KITCHEN_NS);
        assert_eq!(info.thing_count, 2);
        assert_eq!(info.capability_count, 4);
        assert!(info.triple_count > 50);
    }
}
