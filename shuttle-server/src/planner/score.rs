//! Scoring of enumerated stop sequences against the schedule.

use chrono::NaiveDateTime;
use tracing::trace;

use super::graph::{ScheduleGraph, ScheduledSegment};
use crate::domain::StopId;

/// Ride a stop sequence starting at `departure`, taking the earliest
/// feasible segment for every hop.
///
/// Returns `None` if some hop has no segment departing at or after the
/// time the previous hop arrives. Among equally early segments the first
/// in adjacency order is taken.
pub fn schedule_path<'g>(
    graph: &'g ScheduleGraph,
    stops: &[StopId],
    departure: NaiveDateTime,
) -> Option<Vec<&'g ScheduledSegment>> {
    let mut clock = departure;
    let mut segments = Vec::with_capacity(stops.len().saturating_sub(1));

    for pair in stops.windows(2) {
        let (from, to) = (&pair[0], &pair[1]);
        let Some(segment) = graph
            .outgoing(from)
            .iter()
            .filter(|s| &s.to_stop == to && s.departure_time >= clock)
            .min_by_key(|s| s.departure_time)
        else {
            trace!(%from, %to, %clock, "No feasible segment, dropping sequence");
            return None;
        };

        clock = segment.arrival_time;
        segments.push(segment);
    }

    Some(segments)
}

/// Schedule every sequence, keeping the feasible ones in input order.
pub fn schedule_paths<'g>(
    graph: &'g ScheduleGraph,
    sequences: &[Vec<StopId>],
    departure: NaiveDateTime,
) -> Vec<Vec<&'g ScheduledSegment>> {
    sequences
        .iter()
        .filter_map(|stops| schedule_path(graph, stops, departure))
        .collect()
}
