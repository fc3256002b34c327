//! Capability/component dependency resolution.
//!
//! A capability class carries `rdfs:subClassOf` restrictions on
//! `:requiresComponent` / `:requiresCapability`; each filler is either a
//! named class or an `owl:unionOf` of alternatives. Expansion recurses
//! through those restrictions (read back as tuples by the query catalog)
//! into a requirement tree, then a minimal configuration is chosen: every
//! alternative takes the branch with the smallest transitive component set.
//!
//! The dependency tree must be acyclic. Expansion tracks the current path
//! and reports a cycle the moment a class requires itself through any
//! chain; a depth guard backstops pathological ontologies.

use std::collections::BTreeSet;

use crate::error::ResolveError;
use crate::query::catalog::Filler;
use crate::query::{QueryEngine, Resource};

/// Expansion depth limit.
pub const MAX_DEPTH: usize = 32;

/// Result alias for resolution operations.
pub type ResolveResult<T> = std::result::Result<T, ResolveError>;

/// Whether a requirement names a capability or a component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequirementKind {
    Capability,
    Component,
}

impl RequirementKind {
    fn of_property(property: &Resource) -> Self {
        if property.name() == "requiresCapability" {
            RequirementKind::Capability
        } else {
            RequirementKind::Component
        }
    }
}

impl std::fmt::Display for RequirementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RequirementKind::Capability => f.write_str("capability"),
            RequirementKind::Component => f.write_str("component"),
        }
    }
}

/// One expanded class in the requirement tree.
#[derive(Debug, Clone)]
pub struct RequirementNode {
    pub class: Resource,
    pub kind: RequirementKind,
    pub requirements: Vec<Requirement>,
}

/// A requirement of a node: a single class, or a set of alternatives from
/// an `owl:unionOf` filler.
#[derive(Debug, Clone)]
pub enum Requirement {
    One(RequirementNode),
    AnyOf(Vec<RequirementNode>),
}

/// A fully expanded capability with its minimal configuration.
#[derive(Debug, Clone)]
pub struct Resolution {
    /// The expanded requirement tree.
    pub root: RequirementNode,
    /// Component classes of the minimal configuration.
    pub components: BTreeSet<Resource>,
    /// Capability classes pulled in along the chosen branches (the root
    /// included).
    pub capabilities: BTreeSet<Resource>,
}

impl Resolution {
    /// Components of the minimal configuration not in `available`.
    pub fn missing(&self, available: &BTreeSet<Resource>) -> Vec<Resource> {
        self.components
            .iter()
            .filter(|c| !available.contains(*c))
            .cloned()
            .collect()
    }

    /// Render the requirement tree with indentation; alternatives are
    /// listed under `any of:` with `*` marking the chosen branch.
    pub fn render(&self) -> String {
        let mut out = String::new();
        render_node(&self.root, 0, &mut out);
        out
    }
}

/// Expand the dependency tree of a capability class and choose its minimal
/// configuration.
pub fn resolve_capability(queries: &QueryEngine, class: &Resource) -> ResolveResult<Resolution> {
    let mut path = Vec::new();
    let root = expand(queries, class.clone(), RequirementKind::Capability, &mut path)?;
    let (components, capabilities) = chosen_sets(&root);
    tracing::debug!(
        capability = %class,
        components = components.len(),
        "capability resolved"
    );
    Ok(Resolution {
        root,
        components,
        capabilities,
    })
}

fn expand(
    queries: &QueryEngine,
    class: Resource,
    kind: RequirementKind,
    path: &mut Vec<Resource>,
) -> ResolveResult<RequirementNode> {
    if path.contains(&class) {
        let mut names: Vec<&str> = path.iter().map(Resource::name).collect();
        names.push(class.name());
        return Err(ResolveError::DependencyCycle {
            path: names.join(" -> "),
        });
    }
    if path.len() >= MAX_DEPTH {
        return Err(ResolveError::DepthExceeded {
            max_depth: MAX_DEPTH,
        });
    }

    tracing::debug!(class = %class, depth = path.len(), "expanding requirement");
    path.push(class.clone());

    let mut requirements = Vec::new();
    for spec in queries.requirement_specs(&class)? {
        let child_kind = RequirementKind::of_property(&spec.property);
        match spec.filler {
            Filler::Class(child) => {
                requirements.push(Requirement::One(expand(queries, child, child_kind, path)?));
            }
            Filler::AnyOf(members) => {
                let mut branches = Vec::new();
                for member in members {
                    branches.push(expand(queries, member, child_kind, path)?);
                }
                requirements.push(Requirement::AnyOf(branches));
            }
        }
    }

    path.pop();
    Ok(RequirementNode {
        class,
        kind,
        requirements,
    })
}

/// Index of the branch an alternative settles on: the smallest transitive
/// component set wins, ties go to the first branch (members are sorted by
/// name, so the choice is stable).
pub fn chosen_branch(branches: &[RequirementNode]) -> usize {
    let mut best = 0;
    let mut best_cost = usize::MAX;
    for (i, branch) in branches.iter().enumerate() {
        let (components, _) = chosen_sets(branch);
        if components.len() < best_cost {
            best = i;
            best_cost = components.len();
        }
    }
    best
}

fn chosen_sets(node: &RequirementNode) -> (BTreeSet<Resource>, BTreeSet<Resource>) {
    let mut components = BTreeSet::new();
    let mut capabilities = BTreeSet::new();
    collect_chosen(node, &mut components, &mut capabilities);
    (components, capabilities)
}

fn collect_chosen(
    node: &RequirementNode,
    components: &mut BTreeSet<Resource>,
    capabilities: &mut BTreeSet<Resource>,
) {
    match node.kind {
        RequirementKind::Component => {
            components.insert(node.class.clone());
        }
        RequirementKind::Capability => {
            capabilities.insert(node.class.clone());
        }
    }
    for requirement in &node.requirements {
        match requirement {
            Requirement::One(child) => collect_chosen(child, components, capabilities),
            Requirement::AnyOf(branches) => {
                let chosen = chosen_branch(branches);
                collect_chosen(&branches[chosen], components, capabilities);
            }
        }
    }
}

fn render_node(node: &RequirementNode, indent: usize, out: &mut String) {
    out.push_str(&"  ".repeat(indent));
    out.push_str(&format!("{} [{}]\n", node.class.name(), node.kind));
    for requirement in &node.requirements {
        match requirement {
            Requirement::One(child) => render_node(child, indent + 1, out),
            Requirement::AnyOf(branches) => {
                out.push_str(&"  ".repeat(indent + 1));
                out.push_str("any of:\n");
                let chosen = chosen_branch(branches);
                for (i, branch) in branches.iter().enumerate() {
                    let marker = if i == chosen { "* " } else { "- " };
                    let mut sub = String::new();
                    render_node(branch, 0, &mut sub);
                    for (line_no, line) in sub.lines().enumerate() {
                        out.push_str(&"  ".repeat(indent + 2));
                        out.push_str(if line_no == 0 { marker } else { "  " });
                        out.push_str(line);
                        out.push('\n');
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ontology::OntologyModel;
    use crate::vocab::KITCHEN_NS;

    fn kitchen() -> QueryEngine {
        let model = OntologyModel::from_turtle(include_str!("../ontology/kitchen.ttl")).unwrap();
        QueryEngine::new(model, KITCHEN_NS)
    }

    fn res(name: &str) -> Resource {
        Resource::new(format!("{KITCHEN_NS}{name}"))
    }

    fn component_names(resolution: &Resolution) -> Vec<&str> {
        resolution.components.iter().map(Resource::name).collect()
    }

    #[test]
    fn grasp_prefers_the_smaller_gripper_branch() {
        let engine = kitchen();
        let resolution = resolve_capability(&engine, &res("GraspCapability")).unwrap();

        // VacuumGripper (2 components) beats TwoFingerGripper (3).
        assert_eq!(
            component_names(&resolution),
            vec!["ArmAssembly", "ServoMotor", "VacuumGripper", "VacuumPump"]
        );
        assert!(resolution.capabilities.contains(&res("GraspCapability")));
    }

    #[test]
    fn move_pulls_in_localize_and_breaks_the_tie_by_name() {
        let engine = kitchen();
        let resolution = resolve_capability(&engine, &res("MoveCapability")).unwrap();

        // WheelBase (2) beats TrackDrive (3); Lidar and DepthCamera both
        // cost 1, so the name-sorted first branch wins.
        assert_eq!(
            component_names(&resolution),
            vec!["DepthCamera", "DriveMotor", "WheelBase"]
        );
        assert_eq!(
            resolution
                .capabilities
                .iter()
                .map(Resource::name)
                .collect::<Vec<_>>(),
            vec!["LocalizeCapability", "MoveCapability"]
        );
    }

    #[test]
    fn toast_chains_into_grasp() {
        let engine = kitchen();
        let resolution = resolve_capability(&engine, &res("ToastCapability")).unwrap();

        assert!(resolution.components.contains(&res("HeatingElement")));
        assert!(resolution.components.contains(&res("VacuumGripper")));
        assert!(resolution.capabilities.contains(&res("GraspCapability")));

        let available = engine.robot_component_classes().unwrap();
        let missing = resolution.missing(&available);
        assert_eq!(
            missing.iter().map(Resource::name).collect::<Vec<_>>(),
            vec!["HeatingElement"]
        );
    }

    #[test]
    fn grasp_is_fully_covered_by_the_robot() {
        let engine = kitchen();
        let resolution = resolve_capability(&engine, &res("GraspCapability")).unwrap();
        let available = engine.robot_component_classes().unwrap();
        assert!(resolution.missing(&available).is_empty());
    }

    #[test]
    fn render_marks_the_chosen_branch() {
        let engine = kitchen();
        let resolution = resolve_capability(&engine, &res("GraspCapability")).unwrap();
        let rendered = resolution.render();

        assert!(rendered.contains("GraspCapability [capability]"));
        assert!(rendered.contains("any of:"));
        assert!(rendered.contains("* VacuumGripper [component]"));
        assert!(rendered.contains("- TwoFingerGripper [component]"));
    }

    #[test]
    fn cycle_is_reported_with_its_path() {
        let turtle = format!(
            r#"
            @prefix : <{KITCHEN_NS}> .
            @prefix owl: <http://www.w3.org/2002/07/owl#> .
            @prefix rdfs: <http://www.w3.org/2000/01/rdf-schema#> .

            :Gyre a owl:Class ;
                rdfs:subClassOf :Capability ;
                rdfs:subClassOf [ a owl:Restriction ;
                    owl:onProperty :requiresComponent ;
                    owl:someValuesFrom :Gimbal ] .
            :Gimbal a owl:Class ;
                rdfs:subClassOf :Component ;
                rdfs:subClassOf [ a owl:Restriction ;
                    owl:onProperty :requiresComponent ;
                    owl:someValuesFrom :Gyre ] .
            "#
        );
        let model = OntologyModel::from_turtle(&turtle).unwrap();
        let engine = QueryEngine::new(model, KITCHEN_NS);

        let err = resolve_capability(&engine, &res("Gyre")).unwrap_err();
        match err {
            ResolveError::DependencyCycle { path } => {
                assert_eq!(path, "Gyre -> Gimbal -> Gyre");
            }
            other => panic!("expected cycle, got {other:?}"),
        }
    }

    #[test]
    fn runaway_chain_hits_the_depth_guard() {
        let mut turtle = format!(
            "@prefix : <{KITCHEN_NS}> .\n\
             @prefix owl: <http://www.w3.org/2002/07/owl#> .\n\
             @prefix rdfs: <http://www.w3.org/2000/01/rdf-schema#> .\n"
        );
        for i in 0..=MAX_DEPTH {
            turtle.push_str(&format!(
                ":Stage{i} a owl:Class ; rdfs:subClassOf :Component ; \
                 rdfs:subClassOf [ a owl:Restriction ; \
                 owl:onProperty :requiresComponent ; \
                 owl:someValuesFrom :Stage{next} ] .\n",
                next = i + 1
            ));
        }
        let model = OntologyModel::from_turtle(&turtle).unwrap();
        let engine = QueryEngine::new(model, KITCHEN_NS);

        let err = resolve_capability(&engine, &res("Stage0")).unwrap_err();
        assert!(matches!(err, ResolveError::DepthExceeded { .. }));
    }
}
