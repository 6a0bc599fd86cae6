//! Adjacency analysis of a [`Graph`]: in-degrees, tree/DAG classification and
//! the structural diagram used by the text renderer.

use crate::render::Highlight;
use fauxinnati_core::{ConditionalUpdateRisk, Edge, Graph, GraphError, Result};
use std::fmt::Write as _;

/// Leading nodes listed in the summary of a non-tree graph.
const SUMMARY_HEAD_NODES: usize = 3;
/// Trailing nodes listed in the summary of a non-tree graph.
const SUMMARY_TAIL_NODES: usize = 2;

/// `name:ruleType` for every risk that carries a matching rule, joined by `separator`.
///
/// Only the first matching rule of a risk is named.
pub fn risk_label(risks: &[ConditionalUpdateRisk], separator: &str) -> String {
    risks
        .iter()
        .filter_map(|risk| {
            risk.matching_rules
                .first()
                .map(|rule| format!("{}:{}", risk.name, rule.rule_type()))
        })
        .collect::<Vec<_>>()
        .join(separator)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConditionalChild {
    pub index: usize,
    pub risk_label: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shape {
    /// Every node has at most one parent.
    Tree { roots: Vec<usize> },
    /// At least one node is reachable through more than one edge.
    Dag { multi_parent: Vec<usize> },
}

/// Index-based view of a graph with conditional endpoints resolved.
#[derive(Debug)]
pub struct Topology<'g> {
    graph: &'g Graph,
    unconditional: Vec<Vec<usize>>,
    conditional: Vec<Vec<ConditionalChild>>,
    in_degree: Vec<usize>,
}

impl<'g> Topology<'g> {
    /// Builds both adjacency lists and the combined in-degree of every node.
    ///
    /// Fails on an unconditional edge pointing outside the node list or a
    /// conditional update naming a version that is not a node.
    pub fn build(graph: &'g Graph) -> Result<Self> {
        let len = graph.nodes.len();
        let mut unconditional = vec![Vec::new(); len];
        let mut conditional = vec![Vec::new(); len];
        let mut in_degree = vec![0usize; len];

        for &Edge(from, to) in &graph.edges {
            if let Some(&index) = [from, to].iter().find(|&&i| i >= len) {
                return Err(GraphError::EdgeOutOfRange { index, len });
            }
            unconditional[from].push(to);
            in_degree[to] += 1;
        }

        let index = graph.version_index();
        let resolve = |version: &String| {
            index
                .get(version)
                .copied()
                .ok_or_else(|| GraphError::UnknownVersion(version.clone()))
        };
        for group in &graph.conditional_edges {
            let label = risk_label(&group.risks, ",");
            for update in &group.edges {
                let from = resolve(&update.from)?;
                let to = resolve(&update.to)?;
                conditional[from].push(ConditionalChild {
                    index: to,
                    risk_label: label.clone(),
                });
                in_degree[to] += 1;
            }
        }

        Ok(Self {
            graph,
            unconditional,
            conditional,
            in_degree,
        })
    }

    pub fn in_degree(&self, index: usize) -> usize {
        self.in_degree.get(index).copied().unwrap_or(0)
    }

    pub fn unconditional_children(&self, index: usize) -> &[usize] {
        self.unconditional.get(index).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn conditional_children(&self, index: usize) -> &[ConditionalChild] {
        self.conditional.get(index).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn roots(&self) -> Vec<usize> {
        (0..self.in_degree.len())
            .filter(|&i| self.in_degree[i] == 0)
            .collect()
    }

    pub fn multi_parent_nodes(&self) -> Vec<usize> {
        (0..self.in_degree.len())
            .filter(|&i| self.in_degree[i] > 1)
            .collect()
    }

    pub fn shape(&self) -> Shape {
        let multi_parent = self.multi_parent_nodes();
        if multi_parent.is_empty() {
            Shape::Tree {
                roots: self.roots(),
            }
        } else {
            Shape::Dag { multi_parent }
        }
    }

    /// Tree drawing when the graph is tree-like, otherwise a bounded summary.
    pub fn diagram(&self, highlight: &Highlight) -> String {
        match self.shape() {
            Shape::Tree { roots } => self.tree(&roots, highlight),
            Shape::Dag { multi_parent } => self.summary(&multi_parent, highlight),
        }
    }

    fn label(&self, index: usize, highlight: &Highlight) -> String {
        highlight.apply(&self.graph.nodes[index].version.to_string())
    }

    fn tree(&self, roots: &[usize], highlight: &Highlight) -> String {
        let mut walk = TreeWalk {
            topology: self,
            highlight,
            visited: vec![false; self.graph.nodes.len()],
            out: String::from("Complete DAG structure (tree-like):\n\n"),
        };
        for (position, &root) in roots.iter().enumerate() {
            if position > 0 {
                walk.out.push('\n');
            }
            walk.draw(root, "", "");
        }
        walk.out
    }

    fn summary(&self, multi_parent: &[usize], highlight: &Highlight) -> String {
        let parents: Vec<String> = multi_parent
            .iter()
            .map(|&i| self.label(i, highlight))
            .collect();

        let mut out = String::from("Complex DAG with multiple paths to same nodes:\n\n");
        let _ = writeln!(
            out,
            "Cannot visualize as tree - nodes with multiple parents: {}\n",
            parents.join(", ")
        );
        out.push_str("Graph summary:\n");
        let _ = writeln!(
            out,
            "- {} nodes, {} unconditional edges, {} conditional edge groups",
            self.graph.nodes.len(),
            self.graph.edges.len(),
            self.graph.conditional_edges.len()
        );
        let _ = writeln!(out, "- Key nodes: {}", self.key_nodes(highlight).join(", "));
        out
    }

    /// First and last few nodes plus the highlighted one. A single `...`
    /// marks a skipped node right after the leading ones.
    fn key_nodes(&self, highlight: &Highlight) -> Vec<String> {
        let len = self.graph.nodes.len();
        let mut keys = Vec::new();
        for (i, node) in self.graph.nodes.iter().enumerate() {
            let picked = i < SUMMARY_HEAD_NODES
                || i + SUMMARY_TAIL_NODES >= len
                || highlight.matches(&node.version.to_string());
            if picked {
                keys.push(self.label(i, highlight));
            } else if i == SUMMARY_HEAD_NODES && keys.len() == SUMMARY_HEAD_NODES {
                keys.push("...".to_string());
            }
        }
        keys
    }
}

/// State of one tree drawing. Lives for a single [`Topology::diagram`] call.
struct TreeWalk<'t, 'g> {
    topology: &'t Topology<'g>,
    highlight: &'t Highlight,
    visited: Vec<bool>,
    out: String,
}

impl TreeWalk<'_, '_> {
    /// Writes `index` after `line_prefix`, then its children indented by `child_prefix`.
    fn draw(&mut self, index: usize, line_prefix: &str, child_prefix: &str) {
        if std::mem::replace(&mut self.visited[index], true) {
            return;
        }
        let label = self.topology.label(index, self.highlight);
        let _ = writeln!(self.out, "{line_prefix}{label}");

        let children: Vec<(usize, Option<String>)> = self
            .topology
            .unconditional_children(index)
            .iter()
            .map(|&child| (child, None))
            .chain(
                self.topology
                    .conditional_children(index)
                    .iter()
                    .map(|c| (c.index, Some(c.risk_label.clone()))),
            )
            .collect();

        let last = children.len().saturating_sub(1);
        for (position, (child, risk)) in children.into_iter().enumerate() {
            let is_last = position == last;
            let (branch, continuation) = if is_last {
                ('└', "    ")
            } else {
                ('├', "│   ")
            };
            let connector = match risk {
                None => format!("{branch}── "),
                Some(risk) => format!("{branch}⇢ [{risk}] "),
            };
            self.draw(
                child,
                &format!("{child_prefix}{connector}"),
                &format!("{child_prefix}{continuation}"),
            );
        }
    }
}
