//! Domain types for the shuttle journey planner.
//!
//! This module contains the network records the planner consumes.
//! Identifier and time types enforce their invariants at construction
//! time, so code that receives them can trust their validity.

mod error;
mod ids;
mod network;
mod time;

pub use error::DomainError;
pub use ids::{InvalidId, RouteId, ShuttleId, StopId};
pub use network::{
    OccupancyReading, OperatingWindow, PeakMultiplier, Route, RouteStop, Shuttle, Stop,
};
pub use time::{TimeError, TimeWindow, parse_departure_time};
