use crate::version::{errata_url, manifest_ref, release_image};
use crate::{GraphError, Result};
use semver::Version;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

pub const CHANNELS_METADATA_KEY: &str = "io.openshift.upgrades.graph.release.channels";
pub const MANIFESTREF_METADATA_KEY: &str = "io.openshift.upgrades.graph.release.manifestref";
pub const URL_METADATA_KEY: &str = "url";
pub const ARCHITECTURE_METADATA_KEY: &str = "release.openshift.io/architecture";

/// Update graph as served by the discovery endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Graph {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    pub conditional_edges: Vec<ConditionalEdge>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub version: Version,
    #[serde(rename = "payload")]
    pub image: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,
}

/// Unconditional update between two node indices, encoded as `[from, to]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge(pub usize, pub usize);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionalEdge {
    pub edges: Vec<ConditionalUpdate>,
    pub risks: Vec<ConditionalUpdateRisk>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionalUpdate {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditionalUpdateRisk {
    pub url: String,
    pub name: String,
    pub message: String,
    pub matching_rules: Vec<MatchingRule>,
}

/// Condition under which a risk applies. Never evaluated here, only echoed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum MatchingRule {
    Always,
    #[serde(rename = "PromQL")]
    PromQl { promql: PromQlQuery },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromQlQuery {
    pub promql: String,
}

impl Node {
    /// Node with the synthetic payload, manifest reference and errata URL for `version`.
    pub fn new(version: Version, channels: impl Into<String>) -> Self {
        let mut metadata = BTreeMap::new();
        metadata.insert(CHANNELS_METADATA_KEY.to_string(), channels.into());
        metadata.insert(MANIFESTREF_METADATA_KEY.to_string(), manifest_ref(&version));
        metadata.insert(URL_METADATA_KEY.to_string(), errata_url(&version));

        Self {
            image: release_image(&version),
            version,
            metadata,
        }
    }

    /// Adds the architecture entry. Empty or absent architectures leave metadata untouched.
    pub fn with_architecture(mut self, arch: Option<&str>) -> Self {
        if let Some(arch) = arch.filter(|a| !a.is_empty()) {
            self.metadata
                .insert(ARCHITECTURE_METADATA_KEY.to_string(), arch.to_string());
        }
        self
    }
}

impl ConditionalEdge {
    pub fn new(
        edges: impl IntoIterator<Item = ConditionalUpdate>,
        risks: impl IntoIterator<Item = ConditionalUpdateRisk>,
    ) -> Self {
        Self {
            edges: edges.into_iter().collect(),
            risks: risks.into_iter().collect(),
        }
    }
}

impl ConditionalUpdate {
    pub fn between(from: &Version, to: &Version) -> Self {
        Self {
            from: from.to_string(),
            to: to.to_string(),
        }
    }
}

impl ConditionalUpdateRisk {
    pub fn new(url: &str, name: &str, message: &str, rule: MatchingRule) -> Self {
        Self {
            url: url.to_string(),
            name: name.to_string(),
            message: message.to_string(),
            matching_rules: vec![rule],
        }
    }
}

impl MatchingRule {
    pub fn promql(query: impl Into<String>) -> Self {
        MatchingRule::PromQl {
            promql: PromQlQuery {
                promql: query.into(),
            },
        }
    }

    /// Wire name of the rule type.
    pub fn rule_type(&self) -> &'static str {
        match self {
            MatchingRule::Always => "Always",
            MatchingRule::PromQl { .. } => "PromQL",
        }
    }
}

impl Graph {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Maps version strings to node indices. The last node wins when versions repeat.
    pub fn version_index(&self) -> HashMap<String, usize> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (node.version.to_string(), i))
            .collect()
    }

    /// Checks that every edge endpoint resolves to a node of this graph.
    pub fn validate(&self) -> Result<()> {
        let len = self.nodes.len();
        for Edge(from, to) in &self.edges {
            for index in [*from, *to] {
                if index >= len {
                    return Err(GraphError::EdgeOutOfRange { index, len });
                }
            }
        }

        let index = self.version_index();
        for update in self.conditional_edges.iter().flat_map(|c| &c.edges) {
            for version in [&update.from, &update.to] {
                if !index.contains_key(version) {
                    return Err(GraphError::UnknownVersion(version.clone()));
                }
            }
        }
        Ok(())
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn v(s: &str) -> Version {
        Version::parse(s).unwrap()
    }

    fn sample_graph() -> Graph {
        Graph {
            nodes: vec![
                Node::new(v("4.19.0"), "candidate-4.19,candidate-4.20"),
                Node::new(v("4.19.1"), "candidate-4.19").with_architecture(Some("amd64")),
                Node::new(v("4.19.2"), "candidate-4.19"),
            ],
            edges: vec![Edge(0, 1)],
            conditional_edges: vec![ConditionalEdge::new(
                [ConditionalUpdate::between(&v("4.19.1"), &v("4.19.2"))],
                [
                    ConditionalUpdateRisk::new(
                        "https://issues.example.com/browse/RISK-1",
                        "MetallbBgpBfdFrrRpm",
                        "BGP peering can fail",
                        MatchingRule::promql("group by (_id) (csv_succeeded{_id=\"\"})"),
                    ),
                    ConditionalUpdateRisk::new(
                        "https://issues.example.com/browse/RISK-2",
                        "Everywhere",
                        "Applies to every cluster",
                        MatchingRule::Always,
                    ),
                ],
            )],
        }
    }

    #[test]
    fn test_empty_graph_wire_format() {
        let value = serde_json::to_value(Graph::empty()).unwrap();
        assert_eq!(
            value,
            json!({"nodes": [], "edges": [], "conditionalEdges": []})
        );
    }

    #[test]
    fn test_node_wire_format() {
        let node = Node::new(v("4.17.5"), "simple");
        let value = serde_json::to_value(&node).unwrap();
        assert_eq!(value["version"], "4.17.5");
        assert_eq!(value["payload"], node.image.as_str());
        assert_eq!(value["metadata"][CHANNELS_METADATA_KEY], "simple");
        assert_eq!(
            value["metadata"][URL_METADATA_KEY],
            "https://access.redhat.com/errata/RHSA-2024:05705"
        );
        assert!(value["metadata"].get(ARCHITECTURE_METADATA_KEY).is_none());
    }

    #[test]
    fn test_empty_metadata_is_omitted() {
        let node = Node {
            version: v("1.0.0"),
            image: "example".to_string(),
            metadata: BTreeMap::new(),
        };
        let value = serde_json::to_value(&node).unwrap();
        assert!(value.get("metadata").is_none());

        let decoded: Node = serde_json::from_str(r#"{"version":"1.0.0","payload":"example"}"#).unwrap();
        assert_eq!(decoded, node);
    }

    #[test]
    fn test_architecture_only_when_requested() {
        let with_arch = Node::new(v("4.17.5"), "simple").with_architecture(Some("arm64"));
        assert_eq!(with_arch.metadata[ARCHITECTURE_METADATA_KEY], "arm64");

        let empty_arch = Node::new(v("4.17.5"), "simple").with_architecture(Some(""));
        assert!(!empty_arch.metadata.contains_key(ARCHITECTURE_METADATA_KEY));
    }

    #[test]
    fn test_edges_and_rules_wire_format() {
        let value = serde_json::to_value(sample_graph()).unwrap();
        assert_eq!(value["edges"], json!([[0, 1]]));

        let risks = &value["conditionalEdges"][0]["risks"];
        assert_eq!(
            risks[0]["matchingRules"][0],
            json!({"type": "PromQL", "promql": {"promql": "group by (_id) (csv_succeeded{_id=\"\"})"}})
        );
        assert_eq!(risks[1]["matchingRules"][0], json!({"type": "Always"}));
        assert_eq!(
            value["conditionalEdges"][0]["edges"][0],
            json!({"from": "4.19.1", "to": "4.19.2"})
        );
    }

    #[test]
    fn test_json_roundtrip_preserves_graph() {
        let graph = sample_graph();
        let encoded = graph.to_json_pretty().unwrap();
        let decoded: Graph = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, graph);
    }

    #[test]
    fn test_rule_type_names() {
        assert_eq!(MatchingRule::Always.rule_type(), "Always");
        assert_eq!(MatchingRule::promql("vector(1)").rule_type(), "PromQL");
    }

    #[test]
    fn test_validate_rejects_dangling_references() {
        let mut graph = sample_graph();
        assert!(graph.validate().is_ok());

        graph.edges.push(Edge(0, 7));
        assert!(matches!(
            graph.validate(),
            Err(GraphError::EdgeOutOfRange { index: 7, len: 3 })
        ));

        let mut graph = sample_graph();
        graph.conditional_edges[0].edges[0].to = "9.9.9".to_string();
        assert!(matches!(graph.validate(), Err(GraphError::UnknownVersion(v)) if v == "9.9.9"));
    }

    #[test]
    fn test_version_index_prefers_last_occurrence() {
        let graph = Graph {
            nodes: vec![
                Node::new(v("1.0.0"), "a"),
                Node::new(v("1.0.1"), "a"),
                Node::new(v("1.0.0"), "a"),
            ],
            ..Graph::default()
        };
        let index = graph.version_index();
        assert_eq!(index["1.0.0"], 2);
        assert_eq!(index["1.0.1"], 1);
    }
}
