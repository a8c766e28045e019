//! Journey planner over a time-dependent shuttle schedule.
//!
//! For each request the planner builds a graph of scheduled hops from the
//! network records in effect on that day, then either:
//!
//! - enumerates every simple stop sequence within the transfer bound and
//!   rides each on the earliest connecting trips ([`Planner::plan_itineraries`]), or
//! - runs a best-first K-best search per metric: travel time, fare and
//!   crowding ([`Planner::optimize_itineraries`]).

mod config;
mod enumerate;
mod error;
mod graph;
mod itinerary;
mod plan;
mod request;
mod score;
mod search;

#[cfg(test)]
pub(crate) mod fixtures;

pub use config::{PlannerConfig, TieBreak};
pub use enumerate::enumerate_paths;
pub use error::PlanError;
pub use graph::{ChosenShuttle, NetworkSnapshot, ScheduleGraph, ScheduledSegment};
pub use itinerary::{Itinerary, LegDetail, round2};
pub use plan::{OptimizedItineraries, Planner};
pub use request::{OptimizeRequest, PlanRequest};
pub use score::{schedule_path, schedule_paths};
pub use search::{Metric, RankedPath, SearchParams, k_best_paths};
