//! Bounded simple-path enumeration.
//!
//! Depth-first over stops, ignoring times. Each branch holds its own
//! immutable stop sequence on an explicit stack, so deep networks cannot
//! exhaust the call stack.

use tracing::trace;

use super::graph::ScheduleGraph;
use crate::domain::StopId;

/// Every simple stop sequence from `start` to `end` with at most `max_hops` hops.
///
/// Neighbours are explored in adjacency order, so the output order is
/// deterministic for a given graph. A sequence is complete as soon as it
/// reaches `end`; it is never extended past the destination.
pub fn enumerate_paths(
    graph: &ScheduleGraph,
    start: &StopId,
    end: &StopId,
    max_hops: usize,
) -> Vec<Vec<StopId>> {
    let mut paths = Vec::new();
    let mut stack: Vec<Vec<StopId>> = vec![vec![start.clone()]];

    while let Some(path) = stack.pop() {
        let Some(current) = path.last() else {
            continue;
        };

        if current == end {
            trace!(hops = path.len() - 1, "Found stop sequence");
            paths.push(path);
            continue;
        }

        if path.len() > max_hops {
            continue;
        }

        // Reverse so the first neighbour is popped first.
        for next in graph.neighbours(current).into_iter().rev() {
            if path.contains(next) {
                continue;
            }
            let mut branch = path.clone();
            branch.push(next.clone());
            stack.push(branch);
        }
    }

    paths
}
