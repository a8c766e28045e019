//! Application state for the web layer.

use std::sync::Arc;

use crate::planner::PlannerConfig;
use crate::provider::StaticNetwork;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// In-memory network records, also the sink for occupancy telemetry
    pub network: Arc<StaticNetwork>,

    /// Journey planner configuration
    pub config: Arc<PlannerConfig>,
}

impl AppState {
    /// Create a new app state.
    pub fn new(network: StaticNetwork, config: PlannerConfig) -> Self {
        Self {
            network: Arc::new(network),
            config: Arc::new(config),
        }
    }
}
