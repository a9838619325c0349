use std::sync::Arc;

use crate::cloud::CloudStore;
use crate::config::Config;
use crate::layout::WordCloudPacker;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub clouds: Arc<CloudStore>,
    /// Packer with the density-guard tuning every layout pass uses.
    pub packer: WordCloudPacker,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        AppState {
            config,
            clouds: Arc::new(CloudStore::new()),
            packer: WordCloudPacker::default(),
        }
    }
}
