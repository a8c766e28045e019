//! Small networks for planner tests.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, Weekday};

use super::config::PlannerConfig;
use super::graph::{NetworkSnapshot, ScheduleGraph};
use crate::domain::{
    OccupancyReading, OperatingWindow, Route, RouteId, RouteStop, Shuttle, ShuttleId, Stop,
    StopId, TimeWindow,
};
use crate::provider::{NetworkData, StaticNetwork};

/// Monday 11 March 2024.
pub fn monday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 11).unwrap()
}

pub fn at(h: u32, m: u32) -> NaiveDateTime {
    monday().and_time(NaiveTime::from_hms_opt(h, m, 0).unwrap())
}

pub fn sid(s: &str) -> StopId {
    StopId::parse(s).unwrap()
}

pub fn sids(list: &[&str]) -> Vec<StopId> {
    list.iter().map(|s| sid(s)).collect()
}

pub fn rid(s: &str) -> RouteId {
    RouteId::parse(s).unwrap()
}

/// Builder for test networks.
///
/// Every route gets one shuttle `S-<route>` with 20 seats and runs on
/// Monday between 08:00 and 09:00 unless told otherwise.
#[derive(Debug, Default)]
pub struct NetworkFixture {
    data: NetworkData,
}

impl NetworkFixture {
    pub fn new() -> Self {
        Self::default()
    }

    fn ensure_stop(&mut self, id: &str) {
        if !self.data.stops.iter().any(|s| s.id.as_str() == id) {
            self.data.stops.push(Stop {
                id: sid(id),
                name: format!("Stop {id}"),
                latitude: 0.0,
                longitude: 0.0,
                is_active: true,
            });
        }
    }

    /// Add a route. Each hop is `(to_stop, minutes, km)` from the previous stop.
    pub fn route(mut self, id: &str, base_fare: f64, first: &str, hops: &[(&str, u32, f64)]) -> Self {
        self.ensure_stop(first);
        let mut stops = vec![RouteStop {
            stop_id: sid(first),
            stop_order: 1,
            travel_minutes: None,
            distance_km: None,
        }];
        for (i, (stop, minutes, km)) in hops.iter().enumerate() {
            self.ensure_stop(stop);
            stops.push(RouteStop {
                stop_id: sid(stop),
                stop_order: i as u32 + 2,
                travel_minutes: Some(*minutes),
                distance_km: Some(*km),
            });
        }

        self.data.routes.push(Route {
            id: rid(id),
            name: format!("Route {id}"),
            base_fare,
            estimated_duration_mins: hops.iter().map(|(_, m, _)| m).sum(),
            is_active: true,
            stops,
        });
        self.data.shuttles.push(Shuttle {
            id: ShuttleId::parse(&format!("S-{id}")).unwrap(),
            shuttle_no: format!("{id}-01"),
            capacity: 20,
            route_id: Some(rid(id)),
        });
        self.data.operating_windows.push(OperatingWindow {
            route_id: rid(id),
            weekday: Weekday::Mon,
            window: TimeWindow::new(
                NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
                NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            )
            .unwrap(),
            is_active: true,
        });
        self
    }

    /// Record `occupied` of 20 seats on the route's shuttle, five minutes before 08:00.
    pub fn crowd(mut self, route: &str, occupied: u32) -> Self {
        self.data.occupancy.push(OccupancyReading {
            shuttle_id: ShuttleId::parse(&format!("S-{route}")).unwrap(),
            occupied_seats: occupied,
            capacity: 20,
            recorded_at: at(8, 0) - Duration::minutes(5),
        });
        self
    }

    pub fn data(&self) -> NetworkData {
        self.data.clone()
    }

    pub fn network(&self) -> StaticNetwork {
        StaticNetwork::from_data(self.data()).unwrap()
    }

    pub fn snapshot(&self) -> NetworkSnapshot {
        self.data().into()
    }

    /// Graph for Monday, bounded below by `departure`.
    pub fn graph(&self, departure: NaiveDateTime) -> ScheduleGraph {
        ScheduleGraph::build(
            &self.snapshot(),
            Some(departure),
            departure.date(),
            &PlannerConfig::default(),
        )
    }
}

/// Stops A, B and C. R1 runs A to C directly (20 min, fare 30, crowd 0.4);
/// R2 runs A to B (10 min, fare 10, crowd 0.2); R3 runs B to C (8 min,
/// fare 8, crowd 0.1).
pub fn triangle() -> NetworkFixture {
    NetworkFixture::new()
        .route("R1", 30.0, "A", &[("C", 20, 15.0)])
        .route("R2", 10.0, "A", &[("B", 10, 10.0)])
        .route("R3", 8.0, "B", &[("C", 8, 8.0)])
        .crowd("R1", 8)
        .crowd("R2", 4)
        .crowd("R3", 2)
}
