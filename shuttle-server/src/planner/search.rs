//! Schedule-respecting K-best search.
//!
//! A best-first search over the time-dependent graph, one run per
//! metric. States are `(stop, clock)` pairs carrying the path that
//! reached them; an edge may only be taken if it departs at or after the
//! clock. The accumulated metric never decreases along a path, so the
//! first K states popped at the destination are the K best.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use chrono::NaiveDateTime;
use tracing::{debug, trace};

use super::config::TieBreak;
use super::graph::{ScheduleGraph, ScheduledSegment};
use crate::domain::StopId;

/// What a search minimises.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    /// Sum of average travel minutes.
    Time,
    /// Sum of leg fares.
    Cost,
    /// Highest crowd ratio on any leg.
    Crowd,
}

impl Metric {
    pub const ALL: [Metric; 3] = [Metric::Time, Metric::Cost, Metric::Crowd];

    /// Per-edge weight.
    pub fn weight(self, segment: &ScheduledSegment) -> f64 {
        match self {
            Metric::Time => f64::from(segment.avg_travel_minutes),
            Metric::Cost => segment.cost(),
            Metric::Crowd => segment.crowd_ratio,
        }
    }

    /// Extend an accumulated value by one edge.
    pub fn accumulate(self, acc: f64, segment: &ScheduledSegment) -> f64 {
        match self {
            Metric::Crowd => acc.max(self.weight(segment)),
            Metric::Time | Metric::Cost => acc + self.weight(segment),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Metric::Time => "time",
            Metric::Cost => "cost",
            Metric::Crowd => "crowd",
        }
    }
}

/// A path found by the search and its accumulated metric value.
#[derive(Debug, Clone)]
pub struct RankedPath<'g> {
    pub segments: Vec<&'g ScheduledSegment>,
    pub score: f64,
}

/// Search bounds and tie-break policy.
#[derive(Debug, Clone, Copy)]
pub struct SearchParams {
    pub departure: NaiveDateTime,
    pub k: usize,
    pub max_hops: usize,
    pub tie_break: TieBreak,
}

/// Search node.
struct PathState<'g> {
    stop: &'g StopId,
    clock: NaiveDateTime,
    score: f64,
    segments: Vec<&'g ScheduledSegment>,
    tie_break: TieBreak,
}

impl<'g> PathState<'g> {
    fn visits(&self, stop: &StopId) -> bool {
        self.segments.iter().any(|s| &s.from_stop == stop || &s.to_stop == stop)
    }

    /// Stops on the path, sorted.
    fn visited(&self) -> Vec<&'g StopId> {
        let mut stops: Vec<&'g StopId> = self.segments.iter().map(|s| &s.to_stop).collect();
        stops.push(self.origin());
        stops.sort();
        stops
    }

    fn origin(&self) -> &'g StopId {
        self.segments.first().map_or(self.stop, |s| &s.from_stop)
    }

    /// Best-first order: lower score, then the configured tie-break, then
    /// the stop sequence. `Ordering::Less` means `self` should be popped first.
    fn preference(&self, other: &Self) -> Ordering {
        let by_arrival = || self.clock.cmp(&other.clock);
        let by_legs = || self.segments.len().cmp(&other.segments.len());

        let ties = match self.tie_break {
            TieBreak::EarliestArrival => by_arrival().then_with(by_legs),
            TieBreak::FewestLegs => by_legs().then_with(by_arrival),
        };

        self.score
            .total_cmp(&other.score)
            .then(ties)
            .then_with(|| {
                self.segments
                    .iter()
                    .map(|s| (&s.to_stop, &s.route_id, s.departure_time))
                    .cmp(
                        other
                            .segments
                            .iter()
                            .map(|s| (&s.to_stop, &s.route_id, s.departure_time)),
                    )
            })
    }
}

impl PartialEq for PathState<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.preference(other) == Ordering::Equal
    }
}

impl Eq for PathState<'_> {}

impl Ord for PathState<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap; reverse so the preferred state pops first.
        other.preference(self)
    }
}

impl PartialOrd for PathState<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A settled way of reaching a `(stop, arrival)` key.
struct Label<'g> {
    score: f64,
    hops: usize,
    visited: Vec<&'g StopId>,
}

impl Label<'_> {
    /// True if every continuation open to `other` is also open to `self`
    /// at no worse a score.
    fn dominates(&self, other: &Self) -> bool {
        self.score <= other.score
            && self.hops <= other.hops
            && self.visited.iter().all(|s| other.visited.binary_search(s).is_ok())
    }
}

/// Up to `params.k` paths from `start` to `end`, best first under `metric`.
///
/// Paths never revisit a stop and use at most `params.max_hops` segments.
/// Returns an empty list when the destination is unreachable.
pub fn k_best_paths<'g>(
    graph: &'g ScheduleGraph,
    start: &'g StopId,
    end: &StopId,
    metric: Metric,
    params: SearchParams,
) -> Vec<RankedPath<'g>> {
    let mut results = Vec::new();
    if params.k == 0 {
        return results;
    }

    let mut settled: HashMap<(&StopId, NaiveDateTime), Vec<Label<'g>>> = HashMap::new();
    let mut heap = BinaryHeap::new();

    heap.push(PathState {
        stop: start,
        clock: params.departure,
        score: 0.0,
        segments: Vec::new(),
        tie_break: params.tie_break,
    });

    let mut expanded = 0usize;

    while let Some(state) = heap.pop() {
        if state.stop == end {
            trace!(
                metric = metric.name(),
                score = state.score,
                legs = state.segments.len(),
                "Accepted path"
            );
            results.push(RankedPath {
                segments: state.segments,
                score: state.score,
            });
            if results.len() == params.k {
                break;
            }
            continue;
        }

        if state.segments.len() >= params.max_hops {
            continue;
        }
        expanded += 1;

        for segment in graph.outgoing(state.stop) {
            if segment.departure_time < state.clock
                || &segment.to_stop == start
                || state.visits(&segment.to_stop)
            {
                continue;
            }

            let score = metric.accumulate(state.score, segment);
            let mut segments = Vec::with_capacity(state.segments.len() + 1);
            segments.extend_from_slice(&state.segments);
            segments.push(segment);

            // A key may hold several labels: a cheaper path can use more
            // hops or visit stops a dearer one still needs.
            let next = PathState {
                stop: &segment.to_stop,
                clock: segment.arrival_time,
                score,
                segments,
                tie_break: params.tie_break,
            };
            let label = Label {
                score,
                hops: next.segments.len(),
                visited: next.visited(),
            };
            let labels = settled
                .entry((&segment.to_stop, segment.arrival_time))
                .or_default();
            if labels.iter().any(|known| known.dominates(&label)) {
                continue;
            }
            labels.retain(|known| !label.dominates(known));
            labels.push(label);

            heap.push(next);
        }
    }

    debug!(
        metric = metric.name(),
        found = results.len(),
        expanded,
        "K-best search finished"
    );

    results
}
