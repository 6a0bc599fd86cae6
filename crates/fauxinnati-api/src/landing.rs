//! HTML landing page listing every channel with a rendered example graph.

use crate::{ApiError, ApiResult, AppState};
use askama::Template;
use axum::{
    extract::State,
    http::{header, HeaderMap},
    response::Html,
};
use fauxinnati_core::{LandingConfig, Version};
use fauxinnati_graph::{render_graph, Channel, Highlight};

const GRAPH_PATH: &str = "/api/upgrades_info/graph";
const FALLBACK_BASE_URL: &str = "https://localhost:8080";

/// One channel section of the page.
pub struct ChannelInfo {
    pub name: &'static str,
    pub description: &'static str,
    /// Rendered graph text, or the reason it could not be produced.
    /// Only the rendered text is inserted unescaped.
    pub example: Result<String, String>,
    pub curl_command: String,
}

#[derive(Template)]
#[template(path = "landing.html")]
pub struct LandingPage {
    pub api_url: String,
    pub example_version: String,
    pub channels: Vec<ChannelInfo>,
}

/// Public base URL: configured value, else `https://<host>`, else the local fallback.
pub fn base_url(config: &LandingConfig, host: Option<&str>) -> String {
    if let Some(url) = config.public_base_url.as_deref().filter(|u| !u.is_empty()) {
        return url.trim_end_matches('/').to_string();
    }
    match host.filter(|h| !h.is_empty()) {
        Some(host) => format!("https://{host}"),
        None => FALLBACK_BASE_URL.to_string(),
    }
}

fn channel_example(channel: Channel, version: &Version, arch: &str) -> Result<String, String> {
    channel
        .generate(version, Some(arch))
        .and_then(|graph| render_graph(&graph, &Highlight::html(version)))
        .map_err(|e| format!("Error generating example: {e}"))
}

impl LandingPage {
    pub fn new(config: &LandingConfig, host: Option<&str>) -> Self {
        let api_url = format!("{}{}", base_url(config, host), GRAPH_PATH);
        let example_version = Version::parse(&config.example_version).map_err(|e| {
            format!("Error parsing version {}: {e}", config.example_version)
        });

        let channels = Channel::ALL
            .into_iter()
            .map(|channel| ChannelInfo {
                name: channel.name(),
                description: channel.description(),
                example: example_version
                    .as_ref()
                    .map_err(Clone::clone)
                    .and_then(|version| channel_example(channel, version, &config.example_arch)),
                curl_command: format!(
                    r#"curl "{api_url}?channel={}&version={}&arch={}""#,
                    channel.name(),
                    config.example_version,
                    config.example_arch,
                ),
            })
            .collect();

        Self {
            api_url,
            example_version: config.example_version.clone(),
            channels,
        }
    }
}

pub async fn landing(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<Html<String>> {
    let host = headers.get(header::HOST).and_then(|h| h.to_str().ok());
    let page = LandingPage::new(&state.settings.landing, host)
        .render()
        .map_err(|e| ApiError::Internal(format!("rendering landing page: {e}")))?;
    Ok(Html(page))
}
