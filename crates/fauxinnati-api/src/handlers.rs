use crate::{ApiError, ApiResult};
use axum::{
    extract::{rejection::QueryRejection, Query},
    http::header,
    response::{IntoResponse, Response},
};
use fauxinnati_core::{Graph, Version};
use fauxinnati_graph::generate_graph;
use tracing::{debug, warn};

/// Parameters of the graph endpoint. Every field is optional here so missing
/// parameters are reported with our own message.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct GraphQuery {
    pub channel: Option<String>,
    pub version: Option<String>,
    pub arch: Option<String>,
}

impl GraphQuery {
    pub fn new(channel: &str, version: &str) -> Self {
        Self {
            channel: Some(channel.to_string()),
            version: Some(version.to_string()),
            arch: None,
        }
    }

    /// Picks the known parameters out of decoded query pairs. The first
    /// occurrence of a repeated parameter wins; unknown parameters are ignored.
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut query = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_str() {
                "channel" => &mut query.channel,
                "version" => &mut query.version,
                "arch" => &mut query.arch,
                _ => continue,
            };
            slot.get_or_insert(value);
        }
        query
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

/// Validates `query` and generates the requested graph.
pub fn resolve_graph(query: &GraphQuery) -> ApiResult<Graph> {
    let (channel, version) = match (query.channel.as_deref(), query.version.as_deref()) {
        (Some(channel), Some(version)) if !channel.is_empty() && !version.is_empty() => {
            (channel, version)
        }
        _ => {
            return Err(ApiError::BadRequest(
                "Missing required parameters: channel and version".to_string(),
            ))
        }
    };

    let version = Version::parse(version)
        .map_err(|e| ApiError::BadRequest(format!("Invalid version format: {e}")))?;

    debug!(channel, %version, arch = ?query.arch, "generating graph");
    Ok(generate_graph(channel, &version, query.arch.as_deref())?)
}

/// Graph as pretty-printed JSON.
pub fn graph_response(graph: &Graph) -> ApiResult<Response> {
    let body = graph.to_json_pretty()?;
    Ok(([(header::CONTENT_TYPE, "application/json")], body).into_response())
}

pub async fn graph(
    pairs: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> ApiResult<Response> {
    let graph = pairs
        .map_err(ApiError::from)
        .and_then(|Query(pairs)| resolve_graph(&GraphQuery::from_pairs(pairs)))
        .inspect_err(|e| warn!(error = %e, "rejected graph request"))?;
    graph_response(&graph)
}
