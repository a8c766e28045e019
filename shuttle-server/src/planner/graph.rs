//! Time-dependent schedule graph.
//!
//! The graph is rebuilt for every planning request from the network
//! records in effect on the request's weekday. Each edge is one scheduled
//! hop of one route between two consecutive stops. Once built the graph
//! is read-only and can be shared between concurrent searches.

use std::collections::{BTreeSet, HashMap};

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use tracing::{debug, warn};

use super::config::PlannerConfig;
use crate::domain::{
    OccupancyReading, OperatingWindow, PeakMultiplier, Route, RouteId, Shuttle, ShuttleId, Stop,
    StopId,
};
use crate::provider::{NetworkData, NetworkProvider, ProviderError};

/// One scheduled hop of a route between two consecutive stops.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledSegment {
    pub route_id: RouteId,

    /// Position of `from_stop` on the route.
    pub stop_order: u32,

    pub from_stop: StopId,
    pub to_stop: StopId,
    pub departure_time: NaiveDateTime,
    pub arrival_time: NaiveDateTime,
    pub distance_km: f64,
    pub avg_travel_minutes: u32,

    /// Base fare spread over the route length.
    pub per_km_fare: f64,

    pub peak_multiplier: f64,

    /// Occupied seats over capacity for the route's chosen shuttle.
    pub crowd_ratio: f64,

    pub shuttle_id: ShuttleId,
}

impl ScheduledSegment {
    /// Fare for riding this hop.
    pub fn cost(&self) -> f64 {
        self.distance_km * self.per_km_fare * self.peak_multiplier
    }
}

/// The shuttle picked to serve a route for this request.
#[derive(Debug, Clone, PartialEq)]
pub struct ChosenShuttle {
    pub id: ShuttleId,
    pub shuttle_no: String,
    pub crowd_ratio: f64,
}

/// Everything the builder reads from a provider for one request.
#[derive(Debug, Clone, Default)]
pub struct NetworkSnapshot {
    pub stops: Vec<Stop>,
    pub routes: Vec<Route>,
    pub operating_windows: Vec<OperatingWindow>,
    pub peak_multipliers: Vec<PeakMultiplier>,
    pub shuttles: Vec<Shuttle>,
    pub occupancy: Vec<OccupancyReading>,
}

impl NetworkSnapshot {
    /// Read the records in effect at `at`, issuing the bulk reads concurrently.
    pub async fn fetch<P: NetworkProvider>(
        provider: &P,
        at: NaiveDateTime,
        crowd_tolerance: Duration,
    ) -> Result<Self, ProviderError> {
        let weekday = at.weekday();
        let (stops, routes, operating_windows, peak_multipliers, shuttles, occupancy) = tokio::try_join!(
            provider.stops(),
            provider.routes(),
            provider.operating_windows(weekday),
            provider.peak_multipliers(weekday),
            provider.shuttles(),
            provider.latest_occupancy(at, crowd_tolerance),
        )?;

        Ok(Self {
            stops,
            routes,
            operating_windows,
            peak_multipliers,
            shuttles,
            occupancy,
        })
    }
}

impl From<NetworkData> for NetworkSnapshot {
    fn from(data: NetworkData) -> Self {
        Self {
            stops: data.stops,
            routes: data.routes,
            operating_windows: data.operating_windows,
            peak_multipliers: data.peak_multipliers,
            shuttles: data.shuttles,
            occupancy: data.occupancy,
        }
    }
}

/// Directed, time-annotated graph of scheduled segments.
#[derive(Debug, Default)]
pub struct ScheduleGraph {
    adjacency: HashMap<StopId, Vec<ScheduledSegment>>,
    route_names: HashMap<RouteId, String>,
    shuttles: HashMap<RouteId, ChosenShuttle>,
    stop_names: HashMap<StopId, String>,
}

impl ScheduleGraph {
    /// Outgoing segments from `stop`, ordered by route, then departure.
    pub fn outgoing(&self, stop: &StopId) -> &[ScheduledSegment] {
        self.adjacency.get(stop).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Distinct stops reachable in one hop from `stop`, in adjacency order.
    pub fn neighbours(&self, stop: &StopId) -> Vec<&StopId> {
        let mut seen: Vec<&StopId> = Vec::new();
        for segment in self.outgoing(stop) {
            if !seen.contains(&&segment.to_stop) {
                seen.push(&segment.to_stop);
            }
        }
        seen
    }

    pub fn route_name(&self, route: &RouteId) -> Option<&str> {
        self.route_names.get(route).map(String::as_str)
    }

    pub fn shuttle(&self, route: &RouteId) -> Option<&ChosenShuttle> {
        self.shuttles.get(route)
    }

    pub fn stop_name(&self, stop: &StopId) -> Option<&str> {
        self.stop_names.get(stop).map(String::as_str)
    }

    /// Total number of segments.
    pub fn segment_count(&self) -> usize {
        self.adjacency.values().map(Vec::len).sum()
    }

    /// Number of stops with at least one outgoing segment.
    pub fn departure_stop_count(&self) -> usize {
        self.adjacency.len()
    }

    /// Build the graph for trips running on `day`.
    ///
    /// Only segments departing at or after `departure` are kept. Without a
    /// departure bound the whole day is used.
    pub fn build(
        snapshot: &NetworkSnapshot,
        departure: Option<NaiveDateTime>,
        day: NaiveDate,
        config: &PlannerConfig,
    ) -> Self {
        let earliest = departure.unwrap_or_else(|| day.and_time(NaiveTime::MIN));
        let weekday = day.weekday();
        let headway = config.headway().max(Duration::minutes(1));

        let active_stops: HashMap<&StopId, &Stop> = snapshot
            .stops
            .iter()
            .filter(|s| s.is_active)
            .map(|s| (&s.id, s))
            .collect();

        let occupancy: HashMap<&ShuttleId, &OccupancyReading> = snapshot
            .occupancy
            .iter()
            .map(|r| (&r.shuttle_id, r))
            .collect();

        let mut routes: Vec<&Route> = snapshot.routes.iter().filter(|r| r.is_active).collect();
        routes.sort_by(|a, b| a.id.cmp(&b.id));

        let mut graph = ScheduleGraph {
            stop_names: active_stops
                .values()
                .map(|s| (s.id.clone(), s.name.clone()))
                .collect(),
            ..Default::default()
        };

        for route in routes {
            let Some(shuttle) = choose_shuttle(&route.id, &snapshot.shuttles, &occupancy) else {
                debug!(route = %route.id, "No available shuttle, skipping route");
                continue;
            };

            let per_km_fare = route.per_km_fare();
            if route.total_distance_km() <= 0.0 {
                warn!(route = %route.id, "Route has no length, per-km fare is zero");
            }

            let trips = trip_starts(&route.id, weekday, &snapshot.operating_windows, headway);
            if trips.is_empty() {
                debug!(route = %route.id, %weekday, "Route does not run");
                continue;
            }

            let stops = route.stops_in_order();
            for unknown in stops
                .iter()
                .filter(|s| !snapshot.stops.iter().any(|known| known.id == s.stop_id))
            {
                warn!(route = %route.id, stop = %unknown.stop_id, "Route references unknown stop, skipping its segments");
            }

            for start in trips {
                let trip_start = day.and_time(start);
                let mut offset = Duration::zero();

                for pair in stops.windows(2) {
                    let (from, to) = (pair[0], pair[1]);
                    let minutes = to.travel_minutes.unwrap_or(0);
                    let departure_time = trip_start + offset;
                    let arrival_time = departure_time + Duration::minutes(i64::from(minutes));
                    offset += Duration::minutes(i64::from(minutes));

                    if departure_time < earliest
                        || !active_stops.contains_key(&from.stop_id)
                        || !active_stops.contains_key(&to.stop_id)
                    {
                        continue;
                    }

                    let peak_multiplier = peak_multiplier(
                        &route.id,
                        weekday,
                        departure_time.time(),
                        &snapshot.peak_multipliers,
                    );

                    graph
                        .adjacency
                        .entry(from.stop_id.clone())
                        .or_default()
                        .push(ScheduledSegment {
                            route_id: route.id.clone(),
                            stop_order: from.stop_order,
                            from_stop: from.stop_id.clone(),
                            to_stop: to.stop_id.clone(),
                            departure_time,
                            arrival_time,
                            distance_km: to.distance_km.unwrap_or(0.0),
                            avg_travel_minutes: minutes,
                            per_km_fare,
                            peak_multiplier,
                            crowd_ratio: shuttle.crowd_ratio,
                            shuttle_id: shuttle.id.clone(),
                        });
                }
            }

            graph.route_names.insert(route.id.clone(), route.name.clone());
            graph.shuttles.insert(route.id.clone(), shuttle);
        }

        for segments in graph.adjacency.values_mut() {
            segments.sort_by(|a, b| {
                a.route_id
                    .cmp(&b.route_id)
                    .then(a.stop_order.cmp(&b.stop_order))
                    .then(a.departure_time.cmp(&b.departure_time))
            });
        }

        debug!(
            %day,
            %earliest,
            stops = graph.departure_stop_count(),
            segments = graph.segment_count(),
            routes = graph.route_names.len(),
            "Built schedule graph"
        );

        graph
    }
}

/// Trip start times for `route` on `weekday`, deduplicated and ascending.
fn trip_starts(
    route: &RouteId,
    weekday: Weekday,
    windows: &[OperatingWindow],
    headway: Duration,
) -> BTreeSet<NaiveTime> {
    let mut starts = BTreeSet::new();

    for w in windows
        .iter()
        .filter(|w| w.is_active && w.weekday == weekday && &w.route_id == route)
    {
        let mut t = w.window.start;
        while w.window.contains(t) {
            starts.insert(t);
            let (next, wrapped) = t.overflowing_add_signed(headway);
            if wrapped != 0 {
                break;
            }
            t = next;
        }
    }

    starts
}

/// The applicable fare multiplier; route-specific entries win over network-wide ones.
fn peak_multiplier(
    route: &RouteId,
    weekday: Weekday,
    time: NaiveTime,
    multipliers: &[PeakMultiplier],
) -> f64 {
    let applicable = || multipliers.iter().filter(|m| m.applies(route, weekday, time));

    applicable()
        .find(|m| m.route_id.is_some())
        .or_else(|| applicable().next())
        .map(|m| m.multiplier)
        .unwrap_or(1.0)
}

/// Pick the least crowded shuttle on `route` that still has a free seat.
///
/// A shuttle with no recent reading counts as empty. Ties go to the
/// smallest shuttle id.
fn choose_shuttle(
    route: &RouteId,
    shuttles: &[Shuttle],
    occupancy: &HashMap<&ShuttleId, &OccupancyReading>,
) -> Option<ChosenShuttle> {
    shuttles
        .iter()
        .filter(|s| s.route_id.as_ref() == Some(route))
        .filter_map(|s| {
            let crowd_ratio = match occupancy.get(&s.id) {
                Some(reading) if reading.has_free_seat(s.capacity) => reading.ratio(s.capacity)?,
                Some(_) => return None,
                None if s.capacity > 0 => 0.0,
                None => return None,
            };
            Some(ChosenShuttle {
                id: s.id.clone(),
                shuttle_no: s.shuttle_no.clone(),
                crowd_ratio,
            })
        })
        .min_by(|a, b| {
            a.crowd_ratio
                .total_cmp(&b.crowd_ratio)
                .then_with(|| a.id.cmp(&b.id))
        })
}
