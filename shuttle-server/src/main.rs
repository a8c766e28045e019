use std::net::SocketAddr;
use std::str::FromStr;

use shuttle_server::planner::PlannerConfig;
use shuttle_server::provider::StaticNetwork;
use shuttle_server::web::{AppState, create_router};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const DEFAULT_NETWORK_FILE: &str = "data/campus_network.json";
const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let network_file =
        std::env::var("SHUTTLE_NETWORK_FILE").unwrap_or_else(|_| DEFAULT_NETWORK_FILE.into());
    let network = StaticNetwork::from_json_file(&network_file)?;
    let (stops, routes, shuttles) = network.counts().await;
    info!(stops, routes, shuttles, "Network loaded");

    let mut config = PlannerConfig::default();
    if let Some(headway) = env_number("SHUTTLE_HEADWAY_MINS") {
        config.headway_mins = headway;
    }
    if let Some(tolerance) = env_number("SHUTTLE_CROWD_TOLERANCE_MINS") {
        config.crowd_tolerance_mins = tolerance;
    }

    network
        .set_retention(config.crowd_tolerance().max(StaticNetwork::default_retention()))
        .await;

    let state = AppState::new(network, config);
    let app = create_router(state);

    let addr = SocketAddr::from_str(
        &std::env::var("SHUTTLE_BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.into()),
    )?;
    info!("Shuttle planner listening on http://{addr}");
    info!("  GET  /health            - Health check");
    info!("  GET  /stops             - List stops");
    info!("  GET  /routes/plan       - All itineraries within a transfer bound");
    info!("  GET  /routes/optimize   - K best itineraries per metric");
    info!("  POST /occupancy         - Record shuttle occupancy");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

/// Read a numeric setting, ignoring values that do not parse.
fn env_number(name: &str) -> Option<i64> {
    let raw = std::env::var(name).ok()?;
    match raw.parse() {
        Ok(n) => Some(n),
        Err(_) => {
            warn!(name, value = %raw, "Ignoring non-numeric setting");
            None
        }
    }
}
