//! In-memory network provider backed by a JSON document.
//!
//! Useful for development, tests and small deployments where the campus
//! network fits in a single file. Occupancy readings can be appended at
//! runtime as telemetry arrives.

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;

use chrono::{Duration, NaiveDateTime, Weekday};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::domain::{
    DomainError, OccupancyReading, OperatingWindow, PeakMultiplier, Route, Shuttle, ShuttleId,
    Stop, StopId,
};

use super::{NetworkProvider, ProviderError};

/// The complete set of network records, as stored on disk.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkData {
    pub stops: Vec<Stop>,
    pub routes: Vec<Route>,
    #[serde(default)]
    pub operating_windows: Vec<OperatingWindow>,
    #[serde(default)]
    pub peak_multipliers: Vec<PeakMultiplier>,
    #[serde(default)]
    pub shuttles: Vec<Shuttle>,
    #[serde(default)]
    pub occupancy: Vec<OccupancyReading>,
}

impl NetworkData {
    /// Check referential integrity across all records.
    pub fn validate(&self) -> Result<(), DomainError> {
        let mut stop_ids = HashSet::new();
        for stop in &self.stops {
            if !stop_ids.insert(&stop.id) {
                return Err(DomainError::DuplicateId {
                    kind: "stop",
                    id: stop.id.to_string(),
                });
            }
        }

        let mut route_ids = HashSet::new();
        for route in &self.routes {
            if !route_ids.insert(&route.id) {
                return Err(DomainError::DuplicateId {
                    kind: "route",
                    id: route.id.to_string(),
                });
            }
            route.validate()?;
            for rs in &route.stops {
                if !stop_ids.contains(&rs.stop_id) {
                    return Err(DomainError::UnknownStop {
                        route: route.id.clone(),
                        stop: rs.stop_id.clone(),
                    });
                }
            }
        }

        for w in &self.operating_windows {
            if !route_ids.contains(&w.route_id) {
                return Err(DomainError::UnknownRoute {
                    kind: "operating window",
                    route: w.route_id.clone(),
                });
            }
        }

        for p in &self.peak_multipliers {
            if let Some(route) = &p.route_id
                && !route_ids.contains(route)
            {
                return Err(DomainError::UnknownRoute {
                    kind: "peak multiplier",
                    route: route.clone(),
                });
            }
        }

        let mut shuttle_ids = HashSet::new();
        for shuttle in &self.shuttles {
            if !shuttle_ids.insert(&shuttle.id) {
                return Err(DomainError::DuplicateId {
                    kind: "shuttle",
                    id: shuttle.id.to_string(),
                });
            }
            if shuttle.capacity == 0 {
                return Err(DomainError::ZeroCapacity(shuttle.id.clone()));
            }
            if let Some(route) = &shuttle.route_id
                && !route_ids.contains(route)
            {
                return Err(DomainError::UnknownRoute {
                    kind: "shuttle",
                    route: route.clone(),
                });
            }
        }

        for reading in &self.occupancy {
            if !shuttle_ids.contains(&reading.shuttle_id) {
                return Err(DomainError::UnknownShuttle(reading.shuttle_id.clone()));
            }
        }

        Ok(())
    }
}

/// Occupancy readings kept per shuttle, oldest first.
#[derive(Debug, Default)]
struct OccupancyLog {
    readings: HashMap<ShuttleId, Vec<OccupancyReading>>,
}

impl OccupancyLog {
    /// Insert in `recorded_at` order, then drop readings more than
    /// `retention` older than the shuttle's newest one.
    fn insert(&mut self, reading: OccupancyReading, retention: Duration) {
        let history = self.readings.entry(reading.shuttle_id.clone()).or_default();
        let at = history.partition_point(|r| r.recorded_at <= reading.recorded_at);
        history.insert(at, reading);
        trim(history, retention);
    }

    fn prune(&mut self, retention: Duration) {
        for history in self.readings.values_mut() {
            trim(history, retention);
        }
    }

    /// Most recent reading at or before `at`, if it is no older than `earliest`.
    fn latest(&self, shuttle: &ShuttleId, earliest: NaiveDateTime, at: NaiveDateTime) -> Option<&OccupancyReading> {
        let history = self.readings.get(shuttle)?;
        let end = history.partition_point(|r| r.recorded_at <= at);
        history[..end].last().filter(|r| r.recorded_at >= earliest)
    }

    fn len(&self) -> usize {
        self.readings.values().map(Vec::len).sum()
    }
}

fn trim(history: &mut Vec<OccupancyReading>, retention: Duration) {
    if let Some(newest) = history.last().map(|r| r.recorded_at) {
        let stale = history.partition_point(|r| r.recorded_at < newest - retention);
        history.drain(..stale);
    }
}

#[derive(Debug)]
struct NetworkState {
    /// Static records; `occupancy` is always empty here.
    records: NetworkData,
    occupancy: OccupancyLog,
    retention: Duration,
}

/// Network provider serving validated records from memory.
///
/// Occupancy history is bounded: for each shuttle only readings within
/// the retention period of its newest reading are kept.
#[derive(Debug, Clone)]
pub struct StaticNetwork {
    state: Arc<RwLock<NetworkState>>,
}

impl StaticNetwork {
    /// Default for how much occupancy history is kept per shuttle.
    pub fn default_retention() -> Duration {
        Duration::hours(24)
    }

    /// Create a provider from already-loaded records.
    pub fn from_data(mut data: NetworkData) -> Result<Self, ProviderError> {
        data.validate()?;

        let retention = Self::default_retention();
        let mut occupancy = OccupancyLog::default();
        for reading in std::mem::take(&mut data.occupancy) {
            occupancy.insert(reading, retention);
        }

        Ok(Self {
            state: Arc::new(RwLock::new(NetworkState {
                records: data,
                occupancy,
                retention,
            })),
        })
    }

    /// Parse and validate a JSON network document.
    pub fn from_json_str(json: &str) -> Result<Self, ProviderError> {
        let data: NetworkData = serde_json::from_str(json)?;
        Self::from_data(data)
    }

    /// Load a JSON network document from disk.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ProviderError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let network = Self::from_json_str(&json)?;
        info!(path = %path.display(), "Loaded network file");
        Ok(network)
    }

    /// Set how much occupancy history is kept per shuttle.
    ///
    /// Lookups with a tolerance longer than this may miss readings.
    pub async fn set_retention(&self, retention: Duration) {
        let mut state = self.state.write().await;
        state.retention = retention;
        state.occupancy.prune(retention);
    }

    /// Record an occupancy reading for a known shuttle.
    pub async fn record_occupancy(&self, reading: OccupancyReading) -> Result<(), ProviderError> {
        let mut state = self.state.write().await;
        if !state.records.shuttles.iter().any(|s| s.id == reading.shuttle_id) {
            return Err(DomainError::UnknownShuttle(reading.shuttle_id).into());
        }
        debug!(
            shuttle = %reading.shuttle_id,
            occupied = reading.occupied_seats,
            capacity = reading.capacity,
            "Recorded occupancy"
        );
        let retention = state.retention;
        state.occupancy.insert(reading, retention);
        Ok(())
    }

    /// Returns the number of stops, routes and shuttles loaded.
    pub async fn counts(&self) -> (usize, usize, usize) {
        let state = self.state.read().await;
        let data = &state.records;
        (data.stops.len(), data.routes.len(), data.shuttles.len())
    }

    /// Number of occupancy readings currently held.
    pub async fn occupancy_len(&self) -> usize {
        self.state.read().await.occupancy.len()
    }
}

impl NetworkProvider for StaticNetwork {
    async fn stop(&self, id: &StopId) -> Result<Option<Stop>, ProviderError> {
        let state = self.state.read().await;
        Ok(state.records.stops.iter().find(|s| &s.id == id).cloned())
    }

    async fn stops(&self) -> Result<Vec<Stop>, ProviderError> {
        Ok(self.state.read().await.records.stops.clone())
    }

    async fn routes(&self) -> Result<Vec<Route>, ProviderError> {
        Ok(self.state.read().await.records.routes.clone())
    }

    async fn operating_windows(&self, weekday: Weekday) -> Result<Vec<OperatingWindow>, ProviderError> {
        let state = self.state.read().await;
        Ok(state
            .records
            .operating_windows
            .iter()
            .filter(|w| w.weekday == weekday)
            .cloned()
            .collect())
    }

    async fn peak_multipliers(&self, weekday: Weekday) -> Result<Vec<PeakMultiplier>, ProviderError> {
        let state = self.state.read().await;
        Ok(state
            .records
            .peak_multipliers
            .iter()
            .filter(|p| p.weekday == weekday)
            .cloned()
            .collect())
    }

    async fn shuttles(&self) -> Result<Vec<Shuttle>, ProviderError> {
        Ok(self.state.read().await.records.shuttles.clone())
    }

    async fn latest_occupancy(
        &self,
        at: NaiveDateTime,
        tolerance: Duration,
    ) -> Result<Vec<OccupancyReading>, ProviderError> {
        let state = self.state.read().await;
        let earliest = at - tolerance;

        let mut readings: Vec<OccupancyReading> = state
            .records
            .shuttles
            .iter()
            .filter_map(|shuttle| state.occupancy.latest(&shuttle.id, earliest, at))
            .cloned()
            .collect();
        readings.sort_by(|a, b| a.shuttle_id.cmp(&b.shuttle_id));
        Ok(readings)
    }
}
