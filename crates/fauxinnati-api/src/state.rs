use fauxinnati_core::Settings;
use std::sync::Arc;

/// Read-only settings snapshot shared by every handler.
#[derive(Clone, Debug)]
pub struct AppState {
    pub settings: Arc<Settings>,
}

impl AppState {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings: Arc::new(settings),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}
