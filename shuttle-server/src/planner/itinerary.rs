//! Itinerary assembly.
//!
//! Turns a path of scheduled segments into the user-facing itinerary,
//! resolving route names and shuttle numbers from the graph's tables.

use chrono::NaiveDateTime;

use super::graph::{ScheduleGraph, ScheduledSegment};
use crate::domain::{DomainError, RouteId, ShuttleId, StopId};

/// Round to two decimal places.
pub fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// One ride on one route between two consecutive stops.
#[derive(Debug, Clone, PartialEq)]
pub struct LegDetail {
    pub route_id: RouteId,
    pub route_name: String,
    pub shuttle_id: ShuttleId,
    pub shuttle_no: String,
    pub from_stop: StopId,
    pub from_name: String,
    pub to_stop: StopId,
    pub to_name: String,
    pub departure_time: NaiveDateTime,
    pub arrival_time: NaiveDateTime,

    /// Minutes since the previous leg arrived; zero for the first leg.
    pub wait_minutes: i64,

    pub time_minutes: u32,
    pub distance_km: f64,
    pub cost: f64,
    pub crowd: f64,
}

/// A complete trip from origin to destination.
///
/// # Invariants
///
/// - At least one leg
/// - Consecutive legs connect (`to_stop` of one = `from_stop` of the next)
/// - No leg departs before the previous one arrives
#[derive(Debug, Clone, PartialEq)]
pub struct Itinerary {
    stops: Vec<StopId>,
    legs: Vec<LegDetail>,
    total_distance: f64,
    total_time: u32,
    total_cost: f64,
    max_crowding: f64,
}

impl Itinerary {
    /// Assemble an itinerary from a path of segments.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the path is empty, does not connect, or misses a
    /// connection.
    pub fn assemble(
        graph: &ScheduleGraph,
        segments: &[&ScheduledSegment],
    ) -> Result<Self, DomainError> {
        let Some(first) = segments.first() else {
            return Err(DomainError::EmptyItinerary);
        };

        for pair in segments.windows(2) {
            if pair[0].to_stop != pair[1].from_stop {
                return Err(DomainError::StopsNotConnected(
                    pair[0].to_stop.clone(),
                    pair[1].from_stop.clone(),
                ));
            }
            if pair[1].departure_time < pair[0].arrival_time {
                return Err(DomainError::MissedConnection(pair[1].from_stop.clone()));
            }
        }

        let mut stops = Vec::with_capacity(segments.len() + 1);
        stops.push(first.from_stop.clone());

        let mut legs = Vec::with_capacity(segments.len());
        let mut previous_arrival: Option<NaiveDateTime> = None;

        for segment in segments {
            let shuttle_no = graph
                .shuttle(&segment.route_id)
                .map(|s| s.shuttle_no.clone())
                .unwrap_or_default();

            legs.push(LegDetail {
                route_id: segment.route_id.clone(),
                route_name: graph
                    .route_name(&segment.route_id)
                    .unwrap_or(segment.route_id.as_str())
                    .to_string(),
                shuttle_id: segment.shuttle_id.clone(),
                shuttle_no,
                from_stop: segment.from_stop.clone(),
                from_name: stop_name(graph, &segment.from_stop),
                to_stop: segment.to_stop.clone(),
                to_name: stop_name(graph, &segment.to_stop),
                departure_time: segment.departure_time,
                arrival_time: segment.arrival_time,
                wait_minutes: previous_arrival
                    .map(|arr| (segment.departure_time - arr).num_minutes())
                    .unwrap_or(0),
                time_minutes: segment.avg_travel_minutes,
                distance_km: segment.distance_km,
                cost: segment.cost(),
                crowd: segment.crowd_ratio,
            });

            stops.push(segment.to_stop.clone());
            previous_arrival = Some(segment.arrival_time);
        }

        let total_distance = round2(legs.iter().map(|l| l.distance_km).sum());
        let total_time = legs.iter().map(|l| l.time_minutes).sum();
        let total_cost = round2(legs.iter().map(|l| l.cost).sum());
        let max_crowding = round2(legs.iter().map(|l| l.crowd).fold(0.0, f64::max));

        Ok(Self {
            stops,
            legs,
            total_distance,
            total_time,
            total_cost,
            max_crowding,
        })
    }

    /// Stops visited, origin first.
    pub fn stops(&self) -> &[StopId] {
        &self.stops
    }

    pub fn legs(&self) -> &[LegDetail] {
        &self.legs
    }

    /// Number of changes between routes or trips.
    pub fn transfer_count(&self) -> usize {
        self.legs.len().saturating_sub(1)
    }

    /// Kilometres, rounded to 2 decimals.
    pub fn total_distance(&self) -> f64 {
        self.total_distance
    }

    /// Sum of the legs' average travel minutes.
    pub fn total_time(&self) -> u32 {
        self.total_time
    }

    /// Fare, rounded to 2 decimals.
    pub fn total_cost(&self) -> f64 {
        self.total_cost
    }

    /// Highest crowd ratio on any leg, rounded to 2 decimals.
    pub fn max_crowding(&self) -> f64 {
        self.max_crowding
    }

    pub fn departure_time(&self) -> NaiveDateTime {
        self.legs[0].departure_time
    }

    pub fn arrival_time(&self) -> NaiveDateTime {
        self.legs[self.legs.len() - 1].arrival_time
    }
}

fn stop_name(graph: &ScheduleGraph, stop: &StopId) -> String {
    graph.stop_name(stop).unwrap_or(stop.as_str()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::fixtures::{at, sid, triangle};

    fn path<'g>(graph: &'g ScheduleGraph, hops: &[(&str, &str, NaiveDateTime)]) -> Vec<&'g ScheduledSegment> {
        hops.iter()
            .map(|(from, to, dep)| {
                graph
                    .outgoing(&sid(from))
                    .iter()
                    .find(|s| s.to_stop == sid(to) && s.departure_time == *dep)
                    .unwrap()
            })
            .collect()
    }

    #[test]
    fn round2_rounds_half_away_from_zero() {
        assert_eq!(round2(1.005_000_1), 1.01);
        assert_eq!(round2(0.333_33), 0.33);
        assert_eq!(round2(2.0), 2.0);
    }

    #[test]
    fn assembles_two_leg_trip() {
        let graph = triangle().graph(at(8, 0));
        let segments = path(&graph, &[("A", "B", at(8, 0)), ("B", "C", at(8, 30))]);
        let itinerary = Itinerary::assemble(&graph, &segments).unwrap();

        assert_eq!(itinerary.stops(), &[sid("A"), sid("B"), sid("C")]);
        assert_eq!(itinerary.total_time(), 18);
        assert_eq!(itinerary.total_distance(), 18.0);
        assert_eq!(itinerary.total_cost(), 18.0);
        assert_eq!(itinerary.max_crowding(), 0.2);
        assert_eq!(itinerary.transfer_count(), 1);
        assert_eq!(itinerary.departure_time(), at(8, 0));
        assert_eq!(itinerary.arrival_time(), at(8, 38));

        let legs = itinerary.legs();
        assert_eq!(legs[0].route_name, "Route R2");
        assert_eq!(legs[0].shuttle_no, "R2-01");
        assert_eq!(legs[0].to_name, "Stop B");
        assert_eq!(legs[0].wait_minutes, 0);
        assert_eq!(legs[1].wait_minutes, 20);
        assert_eq!(legs[1].crowd, 0.1);
    }

    #[test]
    fn rejects_empty_path() {
        let graph = triangle().graph(at(8, 0));
        assert_eq!(
            Itinerary::assemble(&graph, &[]),
            Err(DomainError::EmptyItinerary)
        );
    }

    #[test]
    fn rejects_disconnected_legs() {
        let graph = triangle().graph(at(8, 0));
        let segments = path(&graph, &[("A", "B", at(8, 0)), ("A", "C", at(8, 30))]);
        assert!(matches!(
            Itinerary::assemble(&graph, &segments),
            Err(DomainError::StopsNotConnected(_, _))
        ));
    }

    #[test]
    fn rejects_missed_connection() {
        let graph = triangle().graph(at(8, 0));
        let segments = path(&graph, &[("A", "B", at(8, 30)), ("B", "C", at(8, 30))]);
        assert!(matches!(
            Itinerary::assemble(&graph, &segments),
            Err(DomainError::MissedConnection(_))
        ));
    }
}
