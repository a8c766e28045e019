//! Network data providers.
//!
//! The planner reads stops, route topology, schedules and occupancy
//! through the [`NetworkProvider`] trait, so it never depends on a
//! particular store. [`StaticNetwork`] serves the records from memory,
//! loaded from a JSON file.

mod error;
mod static_network;

use std::future::Future;

use chrono::{Duration, NaiveDateTime, Weekday};

use crate::domain::{OccupancyReading, OperatingWindow, PeakMultiplier, Route, Shuttle, Stop, StopId};

pub use error::ProviderError;
pub use static_network::{NetworkData, StaticNetwork};

/// Source of network records for the planner.
///
/// Every method is a bulk read; the planner issues a handful of them per
/// request and may run them concurrently.
pub trait NetworkProvider: Send + Sync {
    /// Look up a single stop.
    fn stop(
        &self,
        id: &StopId,
    ) -> impl Future<Output = Result<Option<Stop>, ProviderError>> + Send;

    /// All stops, in a stable order.
    fn stops(&self) -> impl Future<Output = Result<Vec<Stop>, ProviderError>> + Send;

    /// All routes with their ordered stops.
    fn routes(&self) -> impl Future<Output = Result<Vec<Route>, ProviderError>> + Send;

    /// Operating windows for routes running on `weekday`.
    fn operating_windows(
        &self,
        weekday: Weekday,
    ) -> impl Future<Output = Result<Vec<OperatingWindow>, ProviderError>> + Send;

    /// Peak fare multipliers in effect on `weekday`.
    fn peak_multipliers(
        &self,
        weekday: Weekday,
    ) -> impl Future<Output = Result<Vec<PeakMultiplier>, ProviderError>> + Send;

    /// All shuttles with their route assignment.
    fn shuttles(&self) -> impl Future<Output = Result<Vec<Shuttle>, ProviderError>> + Send;

    /// Most recent reading per shuttle recorded within `[at - tolerance, at]`.
    ///
    /// Shuttles with no reading in the window are omitted.
    fn latest_occupancy(
        &self,
        at: NaiveDateTime,
        tolerance: Duration,
    ) -> impl Future<Output = Result<Vec<OccupancyReading>, ProviderError>> + Send;
}
