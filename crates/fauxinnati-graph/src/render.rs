//! Plain-text rendering of a graph: node list, edge lists and the structural diagram.

use crate::topology::{risk_label, Topology};
use colored::Colorize;
use fauxinnati_core::{Edge, Graph, Result, Version};
use std::fmt::Write as _;

/// How a highlighted version is marked in rendered text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Emphasis {
    #[default]
    None,
    /// `<strong>` tags, for the landing page.
    Html,
    /// ANSI bold, for terminals.
    Bold,
}

/// Version to emphasise wherever it appears in rendered text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Highlight {
    version: Option<String>,
    emphasis: Emphasis,
}

impl Highlight {
    pub fn new(version: Option<&Version>, emphasis: Emphasis) -> Self {
        Self {
            version: version.map(Version::to_string),
            emphasis,
        }
    }

    pub fn none() -> Self {
        Self::default()
    }

    pub fn html(version: &Version) -> Self {
        Self::new(Some(version), Emphasis::Html)
    }

    pub fn bold(version: &Version) -> Self {
        Self::new(Some(version), Emphasis::Bold)
    }

    pub fn matches(&self, version: &str) -> bool {
        self.version.as_deref() == Some(version)
    }

    pub fn apply(&self, version: &str) -> String {
        if !self.matches(version) {
            return version.to_string();
        }
        match self.emphasis {
            Emphasis::None => version.to_string(),
            Emphasis::Html => format!("<strong>{version}</strong>"),
            Emphasis::Bold => version.bold().to_string(),
        }
    }
}

/// Renders `graph` as text. An empty graph renders as `Empty graph`.
///
/// Fails when an edge does not resolve to a node of the graph.
pub fn render_graph(graph: &Graph, highlight: &Highlight) -> Result<String> {
    if graph.is_empty() {
        return Ok("Empty graph".to_string());
    }
    let topology = Topology::build(graph)?;
    let version = |i: usize| highlight.apply(&graph.nodes[i].version.to_string());

    let mut out = String::from("Nodes:\n");
    for i in 0..graph.nodes.len() {
        let _ = writeln!(out, "  [{i}] {}", version(i));
    }

    if !graph.edges.is_empty() {
        out.push_str("\nUnconditional Edges:\n");
        for &Edge(from, to) in &graph.edges {
            let _ = writeln!(out, "  {} → {}", version(from), version(to));
        }
    }

    if !graph.conditional_edges.is_empty() {
        out.push_str("\nConditional Edges:\n");
        for group in &graph.conditional_edges {
            let label = risk_label(&group.risks, ", ");
            for update in &group.edges {
                let _ = write!(
                    out,
                    "  {} ⇢ {}",
                    highlight.apply(&update.from),
                    highlight.apply(&update.to)
                );
                if !label.is_empty() {
                    let _ = write!(out, " [{label}]");
                }
                out.push('\n');
            }
        }
    }

    out.push_str("\nGraph Visualization:\n");
    out.push_str(&topology.diagram(highlight));
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channels::Channel;
    use fauxinnati_core::{ConditionalEdge, ConditionalUpdate, GraphError, Node};

    fn v(s: &str) -> Version {
        Version::parse(s).unwrap()
    }

    #[test]
    fn test_empty_graph() {
        assert_eq!(
            render_graph(&Graph::empty(), &Highlight::none()).unwrap(),
            "Empty graph"
        );
    }

    #[test]
    fn test_highlight_only_matching_version() {
        let highlight = Highlight::html(&v("4.18.42"));
        assert_eq!(highlight.apply("4.18.42"), "<strong>4.18.42</strong>");
        assert_eq!(highlight.apply("4.18.43"), "4.18.43");
        assert_eq!(Highlight::none().apply("4.18.42"), "4.18.42");
        assert_eq!(
            Highlight::new(Some(&v("1.0.0")), Emphasis::None).apply("1.0.0"),
            "1.0.0"
        );
    }

    #[test]
    fn test_simple_channel_rendering() {
        let graph = Channel::Simple.generate(&v("4.17.5"), None).unwrap();
        let text = render_graph(&graph, &Highlight::html(&v("4.17.5"))).unwrap();
        assert_eq!(
            text,
            "Nodes:\n\
             \x20 [0] <strong>4.17.5</strong>\n\
             \x20 [1] 4.17.6\n\
             \x20 [2] 4.18.0\n\
             \n\
             Unconditional Edges:\n\
             \x20 <strong>4.17.5</strong> → 4.17.6\n\
             \x20 <strong>4.17.5</strong> → 4.18.0\n\
             \n\
             Graph Visualization:\n\
             Complete DAG structure (tree-like):\n\
             \n\
             <strong>4.17.5</strong>\n\
             ├── 4.17.6\n\
             └── 4.18.0\n"
        );
    }

    #[test]
    fn test_conditional_section_lists_risks() {
        let graph = Channel::RisksMatching.generate(&v("4.17.5"), None).unwrap();
        let text = render_graph(&graph, &Highlight::none()).unwrap();
        assert!(!text.contains("Unconditional Edges:"));
        assert!(text.contains("\nConditional Edges:\n  4.17.5 ⇢ 4.17.6 [SyntheticRisk:PromQL]\n"));
        assert!(text.contains("├⇢ [SyntheticRisk:PromQL] 4.17.6\n"));
    }

    #[test]
    fn test_smoke_test_combined_label_separators() {
        let graph = Channel::SmokeTest.generate(&v("4.17.5"), None).unwrap();
        let text = render_graph(&graph, &Highlight::none()).unwrap();
        assert!(text.contains(
            "4.17.5 ⇢ 4.17.10 [RiskA:Always, RiskBMatches:PromQL, RiskCNoMatch:PromQL]"
        ));
        assert!(text.contains("[RiskA:Always,RiskBMatches:PromQL,RiskCNoMatch:PromQL] 4.17.10"));
    }

    #[test]
    fn test_group_without_risks_has_no_label() {
        let graph = Graph {
            nodes: vec![Node::new(v("1.0.0"), "t"), Node::new(v("1.0.1"), "t")],
            edges: Vec::new(),
            conditional_edges: vec![ConditionalEdge::new(
                [ConditionalUpdate::between(&v("1.0.0"), &v("1.0.1"))],
                [],
            )],
        };
        let text = render_graph(&graph, &Highlight::none()).unwrap();
        assert!(text.contains("  1.0.0 ⇢ 1.0.1\n"));
        assert!(text.contains("└⇢ [] 1.0.1\n"));
    }

    #[test]
    fn test_dangling_edge_is_an_error() {
        let graph = Graph {
            nodes: vec![Node::new(v("1.0.0"), "t")],
            edges: vec![Edge(0, 1)],
            conditional_edges: Vec::new(),
        };
        assert!(matches!(
            render_graph(&graph, &Highlight::none()),
            Err(GraphError::EdgeOutOfRange { index: 1, len: 1 })
        ));
    }
}
