//! Well-known RDF namespaces and the query prefix header.
//!
//! Every SPARQL query the shell issues is prefixed with the same header:
//! the four W3C namespaces plus `:` bound to the ontology namespace the
//! world model lives under.

/// RDF syntax namespace.
pub const RDF_NS: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";
/// RDF Schema namespace.
pub const RDFS_NS: &str = "http://www.w3.org/2000/01/rdf-schema#";
/// OWL namespace.
pub const OWL_NS: &str = "http://www.w3.org/2002/07/owl#";
/// XML Schema datatypes namespace.
pub const XSD_NS: &str = "http://www.w3.org/2001/XMLSchema#";

/// Namespace of the bundled kitchen ontology (`ontology/kitchen.ttl`).
pub const KITCHEN_NS: &str = "http://ontobot.dev/ont/kitchen#";

/// The prefix header prepended to every query against the world model.
#[derive(Debug, Clone)]
pub struct Prefixes {
    base: String,
}

impl Prefixes {
    /// Bind `:` to the given ontology namespace.
    pub fn new(base: impl Into<String>) -> Self {
        Self { base: base.into() }
    }

    /// The ontology namespace bound to `:`.
    pub fn base(&self) -> &str {
        &self.base
    }

    /// Render the `PREFIX` block.
    pub fn header(&self) -> String {
        format!(
            "PREFIX rdf: <{RDF_NS}>\n\
             PREFIX rdfs: <{RDFS_NS}>\n\
             PREFIX owl: <{OWL_NS}>\n\
             PREFIX xsd: <{XSD_NS}>\n\
             PREFIX : <{base}>\n",
            base = self.base
        )
    }
}

/// Extract the local name of an IRI: the part after `#`, or after the last
/// `/` when there is no fragment.
pub fn local_name(iri: &str) -> &str {
    if let Some((_, frag)) = iri.rsplit_once('#') {
        return frag;
    }
    match iri.rsplit_once('/') {
        Some((_, last)) => last,
        None => iri,
    }
}

/// Whether `name` is safe to splice into a query as `:name`.
///
/// Resources are always referenced by local name under the `:` prefix, so
/// anything outside PN_LOCAL-ish characters is rejected before it reaches
/// the query string.
pub fn is_valid_local_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_binds_all_prefixes() {
        let prefixes = Prefixes::new(KITCHEN_NS);
        let header = prefixes.header();
        assert!(header.contains(&format!("PREFIX rdf: <{RDF_NS}>")));
        assert!(header.contains(&format!("PREFIX rdfs: <{RDFS_NS}>")));
        assert!(header.contains(&format!("PREFIX owl: <{OWL_NS}>")));
        assert!(header.contains(&format!("PREFIX xsd: <{XSD_NS}>")));
        assert!(header.contains(&format!("PREFIX : <{KITCHEN_NS}>")));
    }

    #[test]
    fn local_name_after_fragment() {
        assert_eq!(local_name("http://ontobot.dev/ont/kitchen#ryeLoaf"), "ryeLoaf");
    }

    #[test]
    fn local_name_after_slash() {
        assert_eq!(local_name("http://example.org/things/cup"), "cup");
    }

    #[test]
    fn local_name_opaque() {
        assert_eq!(local_name("urn-like"), "urn-like");
    }

    #[test]
    fn valid_local_names() {
        assert!(is_valid_local_name("ryeLoaf"));
        assert!(is_valid_local_name("two-finger_gripper.v2"));
        assert!(!is_valid_local_name(""));
        assert!(!is_valid_local_name("a b"));
        assert!(!is_valid_local_name("x} . ?y ?p ?o . {"));
    }
}
