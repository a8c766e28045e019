//! Planner entry points.
//!
//! Both entry points check the endpoints exist, read a network snapshot
//! through the provider, build the schedule graph and then search it on
//! blocking worker threads.

use std::sync::Arc;

use chrono::{Local, NaiveDateTime};
use futures::future::try_join3;
use tokio::task::{JoinError, spawn_blocking};
use tracing::{debug, info, warn};

use super::config::PlannerConfig;
use super::enumerate::enumerate_paths;
use super::error::PlanError;
use super::graph::{NetworkSnapshot, ScheduleGraph, ScheduledSegment};
use super::itinerary::Itinerary;
use super::request::{OptimizeRequest, PlanRequest};
use super::score::schedule_paths;
use super::search::{Metric, SearchParams, k_best_paths};
use crate::domain::StopId;
use crate::provider::NetworkProvider;

/// Independent top-K rankings, one per metric.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OptimizedItineraries {
    pub fastest: Vec<Itinerary>,
    pub cheapest: Vec<Itinerary>,
    pub least_crowd: Vec<Itinerary>,
}

/// Journey planner over a network provider.
pub struct Planner<'a, P> {
    provider: &'a P,
    config: &'a PlannerConfig,
}

impl<'a, P: NetworkProvider> Planner<'a, P> {
    pub fn new(provider: &'a P, config: &'a PlannerConfig) -> Self {
        Self { provider, config }
    }

    /// Every feasible itinerary within the transfer bound, in discovery order.
    ///
    /// Stop sequences are enumerated once and each is ridden on the
    /// earliest connecting trips. Sequences the schedule cannot serve are
    /// dropped.
    pub async fn plan_itineraries(
        &self,
        request: &PlanRequest,
    ) -> Result<Vec<Itinerary>, PlanError> {
        request.validate()?;
        self.check_stops(&request.origin, &request.destination).await?;

        let departure = resolve_departure(request.departure);
        let graph = self.build_graph(departure).await?;

        let origin = request.origin.clone();
        let destination = request.destination.clone();
        let max_hops = request.max_hops();

        let itineraries = spawn_blocking(move || {
            let sequences = enumerate_paths(&graph, &origin, &destination, max_hops);
            let scheduled = schedule_paths(&graph, &sequences, departure);
            debug!(
                sequences = sequences.len(),
                feasible = scheduled.len(),
                "Scored stop sequences"
            );
            assemble_all(&graph, scheduled.iter().map(Vec::as_slice))
        })
        .await
        .map_err(search_failed)?;

        info!(
            origin = %request.origin,
            destination = %request.destination,
            %departure,
            max_hops,
            found = itineraries.len(),
            "Planned itineraries"
        );

        Ok(itineraries)
    }

    /// The K best itineraries for each of time, cost and crowding.
    ///
    /// The three searches run concurrently over a shared graph.
    pub async fn optimize_itineraries(
        &self,
        request: &OptimizeRequest,
    ) -> Result<OptimizedItineraries, PlanError> {
        request.validate(self.config)?;
        self.check_stops(&request.origin, &request.destination).await?;

        if request.k == 0 {
            return Ok(OptimizedItineraries::default());
        }

        let departure = resolve_departure(request.departure);
        let graph = Arc::new(self.build_graph(departure).await?);

        let params = SearchParams {
            departure,
            k: request.k,
            max_hops: request.max_hops(self.config),
            tie_break: self.config.tie_break,
        };

        let [time, cost, crowd] = Metric::ALL.map(|metric| {
            let graph = Arc::clone(&graph);
            let origin = request.origin.clone();
            let destination = request.destination.clone();

            spawn_blocking(move || {
                let ranked = k_best_paths(&graph, &origin, &destination, metric, params);
                assemble_all(&graph, ranked.iter().map(|p| p.segments.as_slice()))
            })
        });

        let (fastest, cheapest, least_crowd) = try_join3(time, cost, crowd)
            .await
            .map_err(search_failed)?;

        info!(
            origin = %request.origin,
            destination = %request.destination,
            %departure,
            k = request.k,
            max_hops = params.max_hops,
            fastest = fastest.len(),
            cheapest = cheapest.len(),
            least_crowd = least_crowd.len(),
            "Optimized itineraries"
        );

        Ok(OptimizedItineraries {
            fastest,
            cheapest,
            least_crowd,
        })
    }

    /// Fail with `NotFound` unless both stops exist.
    async fn check_stops(&self, origin: &StopId, destination: &StopId) -> Result<(), PlanError> {
        let (from, to) = tokio::try_join!(
            self.provider.stop(origin),
            self.provider.stop(destination)
        )?;

        if from.is_none() {
            return Err(PlanError::NotFound(origin.clone()));
        }
        if to.is_none() {
            return Err(PlanError::NotFound(destination.clone()));
        }
        Ok(())
    }

    async fn build_graph(&self, departure: NaiveDateTime) -> Result<ScheduleGraph, PlanError> {
        let snapshot =
            NetworkSnapshot::fetch(self.provider, departure, self.config.crowd_tolerance()).await?;
        Ok(ScheduleGraph::build(
            &snapshot,
            Some(departure),
            departure.date(),
            self.config,
        ))
    }
}

fn resolve_departure(departure: Option<NaiveDateTime>) -> NaiveDateTime {
    departure.unwrap_or_else(|| Local::now().naive_local())
}

fn search_failed(err: JoinError) -> PlanError {
    PlanError::Internal(format!("search task failed: {err}"))
}

fn assemble_all<'s>(
    graph: &ScheduleGraph,
    paths: impl Iterator<Item = &'s [&'s ScheduledSegment]>,
) -> Vec<Itinerary> {
    paths
        .filter_map(|segments| match Itinerary::assemble(graph, segments) {
            Ok(itinerary) => Some(itinerary),
            Err(e) => {
                warn!(error = %e, "Discarding malformed path");
                None
            }
        })
        .collect()
}
