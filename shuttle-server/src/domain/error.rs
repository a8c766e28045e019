//! Domain error types.
//!
//! These errors represent validation failures and data inconsistencies
//! in network records. They are distinct from provider IO errors.

use super::{RouteId, ShuttleId, StopId};

/// Domain-level errors for validation and data consistency.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    /// Two records of the same kind share an identifier
    #[error("duplicate {kind} id: {id}")]
    DuplicateId { kind: &'static str, id: String },

    /// A route references a stop that does not exist
    #[error("route {route} references unknown stop {stop}")]
    UnknownStop { route: RouteId, stop: StopId },

    /// A record references a route that does not exist
    #[error("{kind} references unknown route {route}")]
    UnknownRoute { kind: &'static str, route: RouteId },

    /// Route geometry or fare is inconsistent
    #[error("invalid route {0}: {1}")]
    InvalidRoute(RouteId, &'static str),

    /// A record references a shuttle that does not exist
    #[error("unknown shuttle {0}")]
    UnknownShuttle(ShuttleId),

    /// Shuttle has no seats
    #[error("shuttle {0} has zero capacity")]
    ZeroCapacity(ShuttleId),

    /// Itinerary has no legs
    #[error("itinerary must have at least one leg")]
    EmptyItinerary,

    /// Consecutive legs don't share a stop
    #[error("stops {0} and {1} are not connected")]
    StopsNotConnected(StopId, StopId),

    /// A leg departs before the previous leg arrives
    #[error("connection at {0} departs before arrival")]
    MissedConnection(StopId),
}
