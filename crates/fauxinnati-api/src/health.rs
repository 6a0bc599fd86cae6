use crate::{
    handlers::{graph_response, resolve_graph, GraphQuery},
    ApiError, ApiResult, AppState,
};
use axum::extract::State;
use tracing::warn;

/// Replays the configured probe request through the graph pipeline.
fn probe(state: &AppState) -> ApiResult<()> {
    let health = &state.settings.health;
    let query = GraphQuery::new(&health.probe_channel, &health.probe_version);
    resolve_graph(&query)
        .and_then(|graph| graph_response(&graph))
        .map(|_| ())
        .map_err(|e| {
            warn!(error = %e, "health probe failed");
            ApiError::ServiceUnavailable(e.to_string())
        })
}

pub async fn healthz(State(state): State<AppState>) -> ApiResult<&'static str> {
    probe(&state)?;
    Ok("OK")
}

pub async fn readyz(State(state): State<AppState>) -> ApiResult<&'static str> {
    probe(&state)?;
    Ok("OK")
}

#[cfg(test)]
mod tests {
    use super::*;
    use fauxinnati_core::Settings;

    #[test]
    fn test_default_probe_succeeds() {
        assert!(probe(&AppState::default()).is_ok());
    }

    #[test]
    fn test_broken_probe_is_unavailable() {
        let mut settings = Settings::default();
        settings.health.probe_channel = "channel-head".to_string();
        settings.health.probe_version = "4.0.0".to_string();
        let err = probe(&AppState::new(settings)).unwrap_err();
        assert!(matches!(err, ApiError::ServiceUnavailable(_)));
    }
}
