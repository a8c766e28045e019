//! Static network records: stops, routes, schedules and vehicles.
//!
//! These are the plain records a [`NetworkProvider`](crate::provider::NetworkProvider)
//! hands to the planner. They carry no query-language or storage concerns.

use chrono::{NaiveDateTime, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

use super::{DomainError, RouteId, ShuttleId, StopId, TimeWindow};

/// A shuttle stop on campus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stop {
    pub id: StopId,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

/// One stop in a route's ordered geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteStop {
    pub stop_id: StopId,

    /// Position in the route; lower orders are visited first.
    pub stop_order: u32,

    /// Average minutes from the previous stop. Absent for the first stop.
    #[serde(default)]
    pub travel_minutes: Option<u32>,

    /// Kilometres from the previous stop. Absent for the first stop.
    #[serde(default)]
    pub distance_km: Option<f64>,
}

/// A shuttle route and its ordered stops.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub id: RouteId,
    pub name: String,

    /// Fare for riding the whole route, spread over its length per km.
    pub base_fare: f64,

    /// Advertised end-to-end duration in minutes.
    #[serde(default)]
    pub estimated_duration_mins: u32,

    #[serde(default = "default_true")]
    pub is_active: bool,

    pub stops: Vec<RouteStop>,
}

impl Route {
    /// Returns the route's stops sorted by stop order.
    pub fn stops_in_order(&self) -> Vec<&RouteStop> {
        let mut stops: Vec<&RouteStop> = self.stops.iter().collect();
        stops.sort_by_key(|s| s.stop_order);
        stops
    }

    /// Sum of all hop distances along the route.
    ///
    /// The first stop's distance is ignored even if present, since there
    /// is no hop leading into it.
    pub fn total_distance_km(&self) -> f64 {
        self.stops_in_order()
            .iter()
            .skip(1)
            .map(|s| s.distance_km.unwrap_or(0.0))
            .sum()
    }

    /// Fare per kilometre: base fare divided by total route distance.
    ///
    /// Returns 0 for routes with no measurable length.
    pub fn per_km_fare(&self) -> f64 {
        let total = self.total_distance_km();
        if total > 0.0 {
            self.base_fare / total
        } else {
            0.0
        }
    }

    /// Check the route's internal consistency.
    pub fn validate(&self) -> Result<(), DomainError> {
        if !self.base_fare.is_finite() || self.base_fare < 0.0 {
            return Err(DomainError::InvalidRoute(
                self.id.clone(),
                "base fare must be a non-negative number",
            ));
        }

        let ordered = self.stops_in_order();
        for pair in ordered.windows(2) {
            if pair[0].stop_order == pair[1].stop_order {
                return Err(DomainError::InvalidRoute(
                    self.id.clone(),
                    "stop orders must be unique",
                ));
            }
        }

        for stop in &ordered {
            if let Some(d) = stop.distance_km
                && (!d.is_finite() || d < 0.0)
            {
                return Err(DomainError::InvalidRoute(
                    self.id.clone(),
                    "distances must be non-negative numbers",
                ));
            }
        }

        Ok(())
    }
}

/// When a route runs on a given weekday.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperatingWindow {
    pub route_id: RouteId,
    pub weekday: Weekday,
    #[serde(flatten)]
    pub window: TimeWindow,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

/// Fare multiplier applied during busy periods.
///
/// Entries without a route apply network-wide; a route-specific entry
/// overrides them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeakMultiplier {
    #[serde(default)]
    pub route_id: Option<RouteId>,
    pub weekday: Weekday,
    #[serde(flatten)]
    pub window: TimeWindow,
    pub multiplier: f64,
}

impl PeakMultiplier {
    /// Returns true if this entry covers `route` at `weekday`/`time`.
    pub fn applies(&self, route: &RouteId, weekday: Weekday, time: NaiveTime) -> bool {
        self.weekday == weekday
            && self.window.contains(time)
            && self.route_id.as_ref().is_none_or(|r| r == route)
    }
}

/// A shuttle vehicle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shuttle {
    pub id: ShuttleId,

    /// Display number painted on the vehicle.
    pub shuttle_no: String,

    pub capacity: u32,

    /// Route the shuttle is currently assigned to, if any.
    #[serde(default)]
    pub route_id: Option<RouteId>,
}

/// A passenger count sampled from a shuttle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OccupancyReading {
    pub shuttle_id: ShuttleId,
    pub occupied_seats: u32,
    pub capacity: u32,
    pub recorded_at: NaiveDateTime,
}

impl OccupancyReading {
    /// The reading's capacity, or `fallback` when the reading reports none.
    pub fn effective_capacity(&self, fallback: u32) -> u32 {
        if self.capacity == 0 { fallback } else { self.capacity }
    }

    /// Occupied seats divided by capacity, or `None` if both capacities are zero.
    pub fn ratio(&self, fallback_capacity: u32) -> Option<f64> {
        let capacity = self.effective_capacity(fallback_capacity);
        if capacity == 0 {
            return None;
        }
        Some(f64::from(self.occupied_seats) / f64::from(capacity))
    }

    /// Returns true if at least one seat is free.
    pub fn has_free_seat(&self, fallback_capacity: u32) -> bool {
        self.occupied_seats < self.effective_capacity(fallback_capacity)
    }
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn route(stops: &[(&str, u32, Option<u32>, Option<f64>)], base_fare: f64) -> Route {
        Route {
            id: RouteId::parse("R1").unwrap(),
            name: "Loop".to_string(),
            base_fare,
            estimated_duration_mins: 0,
            is_active: true,
            stops: stops
                .iter()
                .map(|(id, order, mins, km)| RouteStop {
                    stop_id: StopId::parse(id).unwrap(),
                    stop_order: *order,
                    travel_minutes: *mins,
                    distance_km: *km,
                })
                .collect(),
        }
    }

    #[test]
    fn stops_sorted_by_order() {
        let r = route(
            &[
                ("C", 3, Some(5), Some(1.0)),
                ("A", 1, None, None),
                ("B", 2, Some(4), Some(2.0)),
            ],
            10.0,
        );
        let ids: Vec<&str> = r.stops_in_order().iter().map(|s| s.stop_id.as_str()).collect();
        assert_eq!(ids, vec!["A", "B", "C"]);
    }

    #[test]
    fn per_km_fare_spreads_base_fare() {
        let r = route(
            &[
                ("A", 1, None, Some(9.0)),
                ("B", 2, Some(4), Some(2.0)),
                ("C", 3, Some(5), Some(3.0)),
            ],
            10.0,
        );
        // First stop's distance does not count.
        assert_eq!(r.total_distance_km(), 5.0);
        assert_eq!(r.per_km_fare(), 2.0);
    }

    #[test]
    fn zero_length_route_has_zero_fare_rate() {
        let r = route(&[("A", 1, None, None), ("B", 2, Some(4), None)], 10.0);
        assert_eq!(r.per_km_fare(), 0.0);
    }

    #[test]
    fn validate_rejects_duplicate_orders() {
        let r = route(&[("A", 1, None, None), ("B", 1, Some(4), Some(1.0))], 10.0);
        assert!(matches!(r.validate(), Err(DomainError::InvalidRoute(_, _))));
    }

    #[test]
    fn validate_rejects_negative_values() {
        let r = route(&[("A", 1, None, None), ("B", 2, Some(4), Some(-1.0))], 10.0);
        assert!(r.validate().is_err());

        let r = route(&[("A", 1, None, None), ("B", 2, Some(4), Some(1.0))], -1.0);
        assert!(r.validate().is_err());
    }

    #[test]
    fn peak_multiplier_scope() {
        let r1 = RouteId::parse("R1").unwrap();
        let r2 = RouteId::parse("R2").unwrap();
        let window = TimeWindow::new(
            NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
        )
        .unwrap();
        let nine = NaiveTime::from_hms_opt(9, 0, 0).unwrap();

        let global = PeakMultiplier {
            route_id: None,
            weekday: Weekday::Mon,
            window,
            multiplier: 1.5,
        };
        assert!(global.applies(&r1, Weekday::Mon, nine));
        assert!(global.applies(&r2, Weekday::Mon, nine));
        assert!(!global.applies(&r1, Weekday::Tue, nine));

        let scoped = PeakMultiplier {
            route_id: Some(r1.clone()),
            ..global
        };
        assert!(scoped.applies(&r1, Weekday::Mon, nine));
        assert!(!scoped.applies(&r2, Weekday::Mon, nine));
    }

    #[test]
    fn occupancy_ratio() {
        let reading = OccupancyReading {
            shuttle_id: ShuttleId::parse("S1").unwrap(),
            occupied_seats: 5,
            capacity: 20,
            recorded_at: NaiveDateTime::default(),
        };
        assert_eq!(reading.ratio(40), Some(0.25));
        assert!(reading.has_free_seat(40));

        let full = OccupancyReading {
            occupied_seats: 20,
            ..reading.clone()
        };
        assert!(!full.has_free_seat(40));

        let broken = OccupancyReading {
            capacity: 0,
            ..reading
        };
        assert_eq!(broken.ratio(40), Some(0.125));
        assert!(broken.has_free_seat(40));
        assert_eq!(broken.ratio(0), None);
        assert!(!broken.has_free_seat(0));
    }

    #[test]
    fn deserialize_operating_window() {
        let json = r#"{
            "route_id": "R1",
            "weekday": "Mon",
            "start": "07:00:00",
            "end": "22:00:00"
        }"#;
        let w: OperatingWindow = serde_json::from_str(json).unwrap();
        assert!(w.is_active);
        assert_eq!(w.weekday, Weekday::Mon);
        assert_eq!(w.window.start, NaiveTime::from_hms_opt(7, 0, 0).unwrap());
    }
}
