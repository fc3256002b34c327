//! The named queries of the world model.
//!
//! Each operation here is one SPARQL body handed to the engine; every
//! closure the shell needs (subclass transitivity, equivalence expansion,
//! union-of list membership) is expressed as a property path and evaluated
//! by the store, never reimplemented in Rust.

use std::collections::{BTreeSet, HashSet};

use super::{QueryEngine, QueryResult, Resource};

/// One `rdfs:subClassOf` restriction on a requirement property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequirementSpec {
    /// `:requiresComponent` or `:requiresCapability`.
    pub property: Resource,
    /// The restriction's filler.
    pub filler: Filler,
}

/// The filler of a requirement restriction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filler {
    /// A single named class (`owl:someValuesFrom` / `owl:onClass` /
    /// `owl:hasValue`).
    Class(Resource),
    /// The named members of an `owl:unionOf` filler: any one satisfies the
    /// requirement.
    AnyOf(Vec<Resource>),
}

impl QueryEngine {
    /// All individuals of the named class, subclass closure included.
    pub fn instances_of(&self, class_name: &str) -> QueryResult<Vec<Resource>> {
        let class = self.check_name(class_name)?;
        let body = format!(
            "SELECT DISTINCT ?x WHERE {{ ?x a/rdfs:subClassOf* :{class} . FILTER(isIRI(?x)) }}"
        );
        let mut instances = self.resources(&body, "x")?;
        instances.sort();
        Ok(instances)
    }

    /// Direct classes of an individual, filtered to the ontology namespace.
    pub fn classes_of(&self, individual: &str) -> QueryResult<Vec<Resource>> {
        let name = self.check_name(individual)?;
        let body = format!(
            "SELECT ?cls WHERE {{ :{name} a ?cls . \
             FILTER(strstarts(str(?cls), \"{ns}\")) }}",
            ns = self.namespace()
        );
        let mut classes = self.resources(&body, "cls")?;
        classes.sort();
        Ok(classes)
    }

    /// The next named superclass of a class, if any.
    pub fn next_superclass(&self, class: &Resource) -> QueryResult<Option<Resource>> {
        let body = format!(
            "SELECT ?super WHERE {{ <{iri}> rdfs:subClassOf ?super . \
             FILTER(isIRI(?super)) \
             FILTER(strstarts(str(?super), \"{ns}\")) }}",
            iri = class.iri(),
            ns = self.namespace()
        );
        let mut supers = self.resources(&body, "super")?;
        supers.sort();
        Ok(supers.into_iter().next())
    }

    /// Walk `rdfs:subClassOf` upward from `class`, one named parent per
    /// step, until no parent remains. Revisiting a class ends the walk.
    pub fn superclass_chain(&self, class: &Resource) -> QueryResult<Vec<Resource>> {
        let mut chain = Vec::new();
        let mut seen: HashSet<Resource> = HashSet::new();
        seen.insert(class.clone());

        let mut current = class.clone();
        while let Some(parent) = self.next_superclass(&current)? {
            if !seen.insert(parent.clone()) {
                break;
            }
            chain.push(parent.clone());
            current = parent;
        }
        Ok(chain)
    }

    /// The unique `:InitialState` individual acting on the thing, if any.
    pub fn initial_state_of(&self, thing: &str) -> QueryResult<Option<Resource>> {
        let thing = self.check_name(thing)?;
        let body = format!(
            "SELECT ?s WHERE {{ ?s a/rdfs:subClassOf* :InitialState . \
             ?s :actedOnThing :{thing} . }}"
        );
        self.one_resource(&body, "s")
    }

    /// The unique successor of an event along `:isPreviousEventOf`, if any.
    pub fn next_event(&self, event: &Resource) -> QueryResult<Option<Resource>> {
        let body = format!(
            "SELECT ?next WHERE {{ <{iri}> :isPreviousEventOf ?next . }}",
            iri = event.iri()
        );
        self.one_resource(&body, "next")
    }

    /// All `:Event` individuals that acted on the thing.
    pub fn events_acted_on(&self, thing: &str) -> QueryResult<Vec<Resource>> {
        let thing = self.check_name(thing)?;
        let body = format!(
            "SELECT DISTINCT ?e WHERE {{ ?e a/rdfs:subClassOf* :Event . \
             ?e :actedOnThing :{thing} . }}"
        );
        let mut events = self.resources(&body, "e")?;
        events.sort();
        Ok(events)
    }

    /// The thing's current position, if any.
    pub fn position_of(&self, thing: &str) -> QueryResult<Option<Resource>> {
        let thing = self.check_name(thing)?;
        let body = format!("SELECT ?pos WHERE {{ :{thing} :isAtPosition ?pos . }}");
        self.one_resource(&body, "pos")
    }

    /// The unique `:Action` subclass restricted on both `:fromPosition` and
    /// `:toPosition`: the action that moves things between positions.
    pub fn move_action(&self) -> QueryResult<Option<Resource>> {
        let body = "SELECT DISTINCT ?action WHERE { \
             ?action rdfs:subClassOf* :Action . \
             ?action rdfs:subClassOf ?from . ?from owl:onProperty :fromPosition . \
             ?action rdfs:subClassOf ?to . ?to owl:onProperty :toPosition . }";
        self.one_resource(body, "action")
    }

    /// `:Action` subclasses whose equivalence expansion carries a
    /// `:hasCharacteristic` restriction with the given value.
    ///
    /// The symmetric `owl:equivalentClass` closure and the walk through
    /// `owl:intersectionOf` list members both happen inside the engine.
    pub fn actions_with_characteristic(&self, value: &str) -> QueryResult<Vec<Resource>> {
        let value = self.check_name(value)?;
        let body = format!(
            "SELECT DISTINCT ?action WHERE {{ \
             ?action rdfs:subClassOf :Action . \
             ?action (owl:equivalentClass|^owl:equivalentClass)* ?equiv . \
             ?equiv (rdfs:subClassOf|(owl:intersectionOf/rdf:rest*/rdf:first))* ?restr . \
             ?restr owl:onProperty :hasCharacteristic . \
             ?restr owl:hasValue :{value} . }}"
        );
        let mut actions = self.resources(&body, "action")?;
        actions.sort();
        Ok(actions)
    }

    /// All named proper subclasses of `:Capability`.
    pub fn capability_classes(&self) -> QueryResult<Vec<Resource>> {
        let body = "SELECT DISTINCT ?c WHERE { \
             ?c rdfs:subClassOf+ :Capability . FILTER(isIRI(?c)) }";
        let mut classes = self.resources(body, "c")?;
        classes.sort();
        Ok(classes)
    }

    /// The requirement restrictions on a capability or component class.
    ///
    /// Rows are grouped by the restriction term within this single result
    /// set; a restriction with a union filler becomes [`Filler::AnyOf`]
    /// over its named members (sorted by name, since `rdf:rest*` rows carry
    /// no list order), one with a named filler becomes [`Filler::Class`].
    /// Restrictions with neither are skipped.
    pub fn requirement_specs(&self, class: &Resource) -> QueryResult<Vec<RequirementSpec>> {
        let body = format!(
            "SELECT ?p ?r ?direct ?member WHERE {{ \
             <{iri}> rdfs:subClassOf ?r . \
             ?r a owl:Restriction ; owl:onProperty ?p . \
             FILTER(?p IN (:requiresComponent, :requiresCapability)) \
             OPTIONAL {{ ?r owl:someValuesFrom|owl:onClass|owl:hasValue ?direct . \
                         FILTER(isIRI(?direct)) }} \
             OPTIONAL {{ ?r (owl:someValuesFrom|owl:onClass)/owl:unionOf/rdf:rest*/rdf:first ?member . }} \
             }}",
            iri = class.iri()
        );

        // key -> (property, direct filler, union members)
        let mut groups: Vec<(String, Resource, Option<Resource>, BTreeSet<Resource>)> = Vec::new();
        for row in self.select(&body)? {
            let Some(key) = row.group_key("r") else {
                continue;
            };
            let Some(property) = row.named("p")? else {
                continue;
            };
            let direct = row.named("direct")?;
            let member = row.named("member")?;

            let index = match groups.iter().position(|(k, ..)| *k == key) {
                Some(index) => index,
                None => {
                    groups.push((key, property, None, BTreeSet::new()));
                    groups.len() - 1
                }
            };
            let group = &mut groups[index];
            if group.2.is_none() {
                group.2 = direct;
            }
            if let Some(member) = member {
                group.3.insert(member);
            }
        }

        let mut specs = Vec::new();
        for (_, property, direct, members) in groups {
            if !members.is_empty() {
                specs.push(RequirementSpec {
                    property,
                    filler: Filler::AnyOf(members.into_iter().collect()),
                });
            } else if let Some(class) = direct {
                specs.push(RequirementSpec {
                    property,
                    filler: Filler::Class(class),
                });
            } else {
                tracing::debug!(class = %class, "restriction with no named filler skipped");
            }
        }
        specs.sort_by(|a, b| {
            let key = |s: &RequirementSpec| {
                let filler = match &s.filler {
                    Filler::Class(c) => c.name().to_string(),
                    Filler::AnyOf(ms) => ms.first().map(|m| m.name().to_string()).unwrap_or_default(),
                };
                (s.property.name().to_string(), filler)
            };
            key(a).cmp(&key(b))
        });
        Ok(specs)
    }

    /// Classes (with subclass closure) of the components the robot
    /// individual is linked to via `:hasComponent`.
    pub fn robot_component_classes(&self) -> QueryResult<BTreeSet<Resource>> {
        self.robot_linked_classes("hasComponent")
    }

    /// Classes (with subclass closure) of the capabilities the robot
    /// individual is linked to via `:hasCapability`.
    pub fn robot_capability_classes(&self) -> QueryResult<BTreeSet<Resource>> {
        self.robot_linked_classes("hasCapability")
    }

    fn robot_linked_classes(&self, property: &str) -> QueryResult<BTreeSet<Resource>> {
        let body = format!(
            "SELECT DISTINCT ?cls WHERE {{ \
             ?robot a/rdfs:subClassOf* :Robot . \
             ?robot :{property} ?x . \
             ?x a/rdfs:subClassOf* ?cls . \
             FILTER(isIRI(?cls)) \
             FILTER(strstarts(str(?cls), \"{ns}\")) }}",
            ns = self.namespace()
        );
        Ok(self.resources(&body, "cls")?.into_iter().collect())
    }
}
