use std::sync::Arc;

use crate::services::studio::Studio;

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub studio: Arc<Studio>,
}

impl AppState {
    pub fn new(studio: Studio) -> Self {
        Self {
            studio: Arc::new(studio),
        }
    }
}
