//! Data transfer objects for web requests and responses.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::Stop;
use crate::planner::{Itinerary, LegDetail, OptimizedItineraries};

/// Query for `GET /routes/plan`.
#[derive(Debug, Deserialize)]
pub struct PlanQuery {
    /// Origin stop id
    pub from: String,

    /// Destination stop id
    pub to: String,

    /// ISO-8601 local date-time (defaults to now)
    pub departure_time: Option<String>,

    /// Maximum number of transfers (defaults to the configured value)
    pub max_transfers: Option<i64>,
}

/// Query for `GET /routes/optimize`.
#[derive(Debug, Deserialize)]
pub struct OptimizeQuery {
    /// Origin stop id
    pub from: String,

    /// Destination stop id
    pub to: String,

    /// ISO-8601 local date-time (defaults to now)
    pub departure_time: Option<String>,

    /// Itineraries per metric
    pub k: Option<i64>,

    /// Maximum number of transfers
    pub max_transfers: Option<i64>,
}

/// Body of `POST /occupancy`.
#[derive(Debug, Deserialize)]
pub struct OccupancyUpdate {
    pub shuttle_id: String,
    pub occupied_seats: u32,
    pub capacity: u32,

    /// When the count was taken (defaults to now)
    pub recorded_at: Option<String>,
}

/// A stop in `GET /stops`.
#[derive(Debug, Serialize)]
pub struct StopResult {
    pub id: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// One leg of an itinerary.
#[derive(Debug, Serialize)]
pub struct LegResult {
    pub route_id: String,
    pub route_name: String,
    pub shuttle_id: String,
    pub shuttle_no: String,

    /// Boarding stop
    pub from: StopRef,

    /// Alighting stop
    pub to: StopRef,

    pub departure_time: String,
    pub arrival_time: String,

    /// Minutes waited at the boarding stop since the previous leg arrived
    pub wait_mins: i64,

    /// Average travel minutes
    pub time: u32,

    /// Kilometres
    pub distance: f64,

    /// Fare for this leg
    pub cost: f64,

    /// Occupied seats over capacity
    pub crowd: f64,
}

/// Stop id and display name.
#[derive(Debug, Serialize)]
pub struct StopRef {
    pub id: String,
    pub name: String,
}

/// A complete itinerary.
#[derive(Debug, Serialize)]
pub struct ItineraryResult {
    /// Stop ids visited, origin first
    pub stops: Vec<String>,

    pub legs: Vec<LegResult>,

    /// Departure from the origin
    pub departure_time: String,

    /// Arrival at the destination
    pub arrival_time: String,

    /// Number of transfers
    pub transfers: usize,

    pub total_distance: f64,
    pub total_time: u32,
    pub total_cost: f64,
    pub max_crowding: f64,
}

/// Response for `GET /routes/plan`.
#[derive(Debug, Serialize)]
pub struct PlanResponse {
    pub itineraries: Vec<ItineraryResult>,
}

/// Response for `GET /routes/optimize`.
#[derive(Debug, Serialize)]
pub struct OptimizeResponse {
    pub fastest: Vec<ItineraryResult>,
    pub cheapest: Vec<ItineraryResult>,
    pub least_crowd: Vec<ItineraryResult>,
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error kind, e.g. `not_found`
    pub error: &'static str,

    /// Human-readable detail
    pub message: String,
}

// Conversion implementations

impl StopResult {
    pub fn from_stop(stop: &Stop) -> Self {
        Self {
            id: stop.id.to_string(),
            name: stop.name.clone(),
            latitude: stop.latitude,
            longitude: stop.longitude,
        }
    }
}

impl LegResult {
    pub fn from_leg(leg: &LegDetail) -> Self {
        Self {
            route_id: leg.route_id.to_string(),
            route_name: leg.route_name.clone(),
            shuttle_id: leg.shuttle_id.to_string(),
            shuttle_no: leg.shuttle_no.clone(),
            from: StopRef {
                id: leg.from_stop.to_string(),
                name: leg.from_name.clone(),
            },
            to: StopRef {
                id: leg.to_stop.to_string(),
                name: leg.to_name.clone(),
            },
            departure_time: format_time(&leg.departure_time),
            arrival_time: format_time(&leg.arrival_time),
            wait_mins: leg.wait_minutes,
            time: leg.time_minutes,
            distance: leg.distance_km,
            cost: leg.cost,
            crowd: leg.crowd,
        }
    }
}

impl ItineraryResult {
    pub fn from_itinerary(itinerary: &Itinerary) -> Self {
        Self {
            stops: itinerary.stops().iter().map(ToString::to_string).collect(),
            legs: itinerary.legs().iter().map(LegResult::from_leg).collect(),
            departure_time: format_time(&itinerary.departure_time()),
            arrival_time: format_time(&itinerary.arrival_time()),
            transfers: itinerary.transfer_count(),
            total_distance: itinerary.total_distance(),
            total_time: itinerary.total_time(),
            total_cost: itinerary.total_cost(),
            max_crowding: itinerary.max_crowding(),
        }
    }
}

impl PlanResponse {
    pub fn from_itineraries(itineraries: &[Itinerary]) -> Self {
        Self {
            itineraries: itineraries.iter().map(ItineraryResult::from_itinerary).collect(),
        }
    }
}

impl OptimizeResponse {
    pub fn from_optimized(result: &OptimizedItineraries) -> Self {
        Self {
            fastest: PlanResponse::from_itineraries(&result.fastest).itineraries,
            cheapest: PlanResponse::from_itineraries(&result.cheapest).itineraries,
            least_crowd: PlanResponse::from_itineraries(&result.least_crowd).itineraries,
        }
    }
}

/// Format a timestamp as ISO-8601 local time to the second.
fn format_time(t: &NaiveDateTime) -> String {
    t.format("%Y-%m-%dT%H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::{PlannerConfig, ScheduleGraph};
    use crate::provider::NetworkData;
    use chrono::NaiveDate;

    const NETWORK: &str = r#"{
        "stops": [
            {"id": "GATE", "name": "Main Gate", "latitude": 12.97, "longitude": 77.59},
            {"id": "LIB", "name": "Library", "latitude": 12.98, "longitude": 77.60}
        ],
        "routes": [{
            "id": "R1", "name": "Campus Loop", "base_fare": 12.5,
            "stops": [
                {"stop_id": "GATE", "stop_order": 1},
                {"stop_id": "LIB", "stop_order": 2, "travel_minutes": 7, "distance_km": 2.5}
            ]
        }],
        "operating_windows": [
            {"route_id": "R1", "weekday": "Mon", "start": "08:00:00", "end": "08:30:00"}
        ],
        "shuttles": [{"id": "S1", "shuttle_no": "KA-01", "capacity": 30, "route_id": "R1"}]
    }"#;

    fn itinerary() -> Itinerary {
        let data: NetworkData = serde_json::from_str(NETWORK).unwrap();
        let snapshot = crate::planner::NetworkSnapshot::from(data);
        let monday = NaiveDate::from_ymd_opt(2024, 3, 11).unwrap();
        let graph = ScheduleGraph::build(&snapshot, None, monday, &PlannerConfig::default());
        let segment = &graph.outgoing(&crate::domain::StopId::parse("GATE").unwrap())[0];
        Itinerary::assemble(&graph, &[segment]).unwrap()
    }

    #[test]
    fn itinerary_result_from_itinerary() {
        let result = ItineraryResult::from_itinerary(&itinerary());

        assert_eq!(result.stops, vec!["GATE", "LIB"]);
        assert_eq!(result.departure_time, "2024-03-11T08:00:00");
        assert_eq!(result.arrival_time, "2024-03-11T08:07:00");
        assert_eq!(result.transfers, 0);
        assert_eq!(result.total_time, 7);
        assert_eq!(result.total_cost, 12.5);

        let leg = &result.legs[0];
        assert_eq!(leg.route_name, "Campus Loop");
        assert_eq!(leg.shuttle_no, "KA-01");
        assert_eq!(leg.from.name, "Main Gate");
        assert_eq!(leg.to.id, "LIB");
    }

    #[test]
    fn itinerary_serializes_flat_fields() {
        let json = serde_json::to_value(ItineraryResult::from_itinerary(&itinerary())).unwrap();

        assert_eq!(json["total_distance"], 2.5);
        assert_eq!(json["max_crowding"], 0.0);
        assert_eq!(json["legs"][0]["from"]["id"], "GATE");
        assert_eq!(json["legs"][0]["wait_mins"], 0);
    }

    #[test]
    fn optimize_response_keeps_metric_names() {
        let result = OptimizedItineraries {
            fastest: vec![itinerary()],
            ..Default::default()
        };
        let json = serde_json::to_value(OptimizeResponse::from_optimized(&result)).unwrap();

        assert_eq!(json["fastest"].as_array().unwrap().len(), 1);
        assert!(json["cheapest"].as_array().unwrap().is_empty());
        assert!(json["least_crowd"].as_array().unwrap().is_empty());
    }

    #[test]
    fn error_response_shape() {
        let json = serde_json::to_value(ErrorResponse {
            error: "not_found",
            message: "stop X not found".into(),
        })
        .unwrap();
        assert_eq!(json, serde_json::json!({"error": "not_found", "message": "stop X not found"}));
    }
}
