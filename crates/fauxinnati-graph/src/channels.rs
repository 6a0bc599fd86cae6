//! Channel registry and the topology generator behind each channel.
//!
//! [`Channel`] is the single table of supported channels: dispatch, landing
//! page descriptions and the channel membership list all read from it.

use crate::risks;
use fauxinnati_core::version::{next_minor, next_patch, prev_minor, release_of, with_patch};
use fauxinnati_core::{
    ConditionalEdge, ConditionalUpdate, ConditionalUpdateRisk, Edge, Graph, GraphError, Node,
    Result, Version,
};
use serde::Serialize;
use std::fmt;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Channel {
    VersionNotFound,
    ChannelHead,
    Simple,
    RisksAlways,
    RisksMatching,
    RisksNonmatching,
    SmokeTest,
}

impl Channel {
    /// Every channel, in the order the landing page presents them.
    pub const ALL: [Channel; 7] = [
        Channel::VersionNotFound,
        Channel::ChannelHead,
        Channel::Simple,
        Channel::RisksAlways,
        Channel::RisksMatching,
        Channel::RisksNonmatching,
        Channel::SmokeTest,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Channel::VersionNotFound => "version-not-found",
            Channel::ChannelHead => "channel-head",
            Channel::Simple => "simple",
            Channel::RisksAlways => "risks-always",
            Channel::RisksMatching => "risks-matching",
            Channel::RisksNonmatching => "risks-nonmatching",
            Channel::SmokeTest => "smoke-test",
        }
    }

    /// Exact, case-sensitive lookup.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|channel| channel.name() == name)
    }

    pub fn description(self) -> &'static str {
        match self {
            Channel::VersionNotFound => {
                "Three-node graph excluding the requested version. Creates a forward progression path."
            }
            Channel::ChannelHead => {
                "Three-node graph where the client's version is the head. Shows upgrade history."
            }
            Channel::Simple => {
                "Three-node linear progression from the client's version. Basic upgrade path."
            }
            Channel::RisksAlways => {
                "Three-node graph with conditional edges that always block updates (Always matching rule)."
            }
            Channel::RisksMatching => {
                "Three-node graph with PromQL conditional edges that match (PromQL: vector(1))."
            }
            Channel::RisksNonmatching => {
                "Three-node graph with PromQL conditional edges that don't match (PromQL: vector(0))."
            }
            Channel::SmokeTest => {
                "Comprehensive 13-node graph with mixed conditional edges for testing all Cincinnati features."
            }
        }
    }

    /// Whether the generated graph contains the queried version as a node.
    pub fn includes_queried_version(self) -> bool {
        !matches!(self, Channel::VersionNotFound)
    }

    pub fn generate(self, version: &Version, arch: Option<&str>) -> Result<Graph> {
        let synth = Synth::new(self, arch);
        let graph = match self {
            Channel::VersionNotFound => synth.version_not_found(version)?,
            Channel::ChannelHead => synth.channel_head(version)?,
            Channel::Simple => synth.simple(version)?,
            Channel::RisksAlways => synth.risks(version, risks::synthetic_always())?,
            Channel::RisksMatching => synth.risks(version, risks::synthetic_promql_matching())?,
            Channel::RisksNonmatching => {
                synth.risks(version, risks::synthetic_promql_nonmatching())?
            }
            Channel::SmokeTest => synth.smoke_test(version)?,
        };
        debug!(
            channel = self.name(),
            %version,
            nodes = graph.nodes.len(),
            edges = graph.edges.len(),
            conditional_edges = graph.conditional_edges.len(),
            "generated graph"
        );
        Ok(graph)
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Graph for `channel`; names outside the registry get the empty graph.
pub fn generate_graph(channel: &str, version: &Version, arch: Option<&str>) -> Result<Graph> {
    match Channel::from_name(channel) {
        Some(channel) => channel.generate(version, arch),
        None => {
            debug!(channel, "unknown channel, serving empty graph");
            Ok(Graph::empty())
        }
    }
}

/// Sorted, comma-joined names of the channels whose graphs contain the queried version.
///
/// The list does not depend on which version was queried.
pub fn channels_containing_queried_version() -> String {
    let mut names: Vec<&str> = Channel::ALL
        .into_iter()
        .filter(|channel| channel.includes_queried_version())
        .map(Channel::name)
        .collect();
    names.sort_unstable();
    names.join(",")
}

fn derive(
    version: &Version,
    derivation: &'static str,
    step: impl FnOnce(&Version) -> Option<Version>,
) -> Result<Version> {
    step(version).ok_or_else(|| GraphError::VersionOutOfRange {
        version: version.to_string(),
        derivation,
    })
}

/// Per-call generation context: which channel is being built and for which architecture.
struct Synth<'a> {
    channel: Channel,
    arch: Option<&'a str>,
}

impl<'a> Synth<'a> {
    fn new(channel: Channel, arch: Option<&'a str>) -> Self {
        Self { channel, arch }
    }

    fn node(&self, version: Version) -> Node {
        Node::new(version, self.channel.name()).with_architecture(self.arch)
    }

    /// Node for the queried version, labelled with every channel that contains it.
    fn queried_node(&self, version: Version) -> Node {
        Node::new(version, channels_containing_queried_version()).with_architecture(self.arch)
    }

    fn version_not_found(&self, queried: &Version) -> Result<Graph> {
        let a = derive(queried, "next minor", next_minor)?;
        let b = with_patch(&a, 1);
        let c = with_patch(&a, 2);

        Ok(Graph {
            nodes: vec![self.node(a), self.node(b), self.node(c)],
            edges: vec![Edge(0, 1), Edge(1, 2)],
            conditional_edges: Vec::new(),
        })
    }

    fn channel_head(&self, queried: &Version) -> Result<Graph> {
        let a = release_of(&derive(queried, "previous minor", prev_minor)?);
        let b = with_patch(&a, 1);

        Ok(Graph {
            nodes: vec![
                self.node(a),
                self.node(b),
                self.queried_node(queried.clone()),
            ],
            edges: vec![Edge(0, 1), Edge(1, 2)],
            conditional_edges: Vec::new(),
        })
    }

    /// Queried version plus its next patch and next minor releases.
    fn fan_out(&self, queried: &Version) -> Result<[Version; 3]> {
        let b = release_of(&derive(queried, "next patch", next_patch)?);
        let c = release_of(&derive(queried, "next minor", next_minor)?);
        Ok([queried.clone(), b, c])
    }

    fn simple(&self, queried: &Version) -> Result<Graph> {
        let [a, b, c] = self.fan_out(queried)?;

        Ok(Graph {
            nodes: vec![self.queried_node(a), self.node(b), self.node(c)],
            edges: vec![Edge(0, 1), Edge(0, 2)],
            conditional_edges: Vec::new(),
        })
    }

    fn risks(&self, queried: &Version, risk: ConditionalUpdateRisk) -> Result<Graph> {
        let [a, b, c] = self.fan_out(queried)?;
        let conditional = ConditionalEdge::new(
            [
                ConditionalUpdate::between(&a, &b),
                ConditionalUpdate::between(&a, &c),
            ],
            [risk],
        );

        Ok(Graph {
            nodes: vec![self.queried_node(a), self.node(b), self.node(c)],
            edges: Vec::new(),
            conditional_edges: vec![conditional],
        })
    }

    /// Thirteen nodes: a small unconditional tree rooted at the previous minor,
    /// and four conditional groups fanning out of the queried version.
    fn smoke_test(&self, queried: &Version) -> Result<Graph> {
        let major = queried.major;
        let minor = queried.minor;
        let previous = derive(queried, "previous minor", prev_minor)?.minor;
        let next = derive(queried, "next minor", next_minor)?.minor;
        let following = derive(queried, "next patch", next_patch)?.patch;

        let d = Version::new(major, previous, 0);
        let e = queried.clone();
        let f = Version::new(major, previous, 1);
        let g = Version::new(major, minor, following);
        let h = Version::new(major, next, 0);
        let i = Version::new(major, minor, 7);
        let j = Version::new(major, next, 1);
        let k = Version::new(major, minor, 8);
        let l = Version::new(major, next, 2);
        let m = Version::new(major, minor, 9);
        let n = Version::new(major, next, 3);
        let o = Version::new(major, minor, 10);
        let p = Version::new(major, next, 4);

        let from_e = |x: &Version, y: &Version| {
            [
                ConditionalUpdate::between(&e, x),
                ConditionalUpdate::between(&e, y),
            ]
        };
        let conditional_edges = vec![
            ConditionalEdge::new(from_e(&i, &j), [risks::smoke_always()]),
            ConditionalEdge::new(from_e(&k, &l), [risks::smoke_matching()]),
            ConditionalEdge::new(from_e(&m, &n), [risks::smoke_nonmatching()]),
            ConditionalEdge::new(from_e(&o, &p), risks::smoke_combined()),
        ];

        let mut nodes = vec![self.node(d), self.queried_node(e.clone())];
        nodes.extend([f, g, h, i, j, k, l, m, n, o, p].map(|v| self.node(v)));

        Ok(Graph {
            nodes,
            edges: vec![Edge(0, 1), Edge(0, 2), Edge(1, 3), Edge(1, 4)],
            conditional_edges,
        })
    }
}
