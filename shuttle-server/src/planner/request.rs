//! Planning requests and their validation.
//!
//! Callers hand over raw strings and signed integers; the `parse`
//! constructors turn them into typed requests or an
//! [`PlanError::InvalidArgument`].

use chrono::NaiveDateTime;

use super::config::PlannerConfig;
use super::error::PlanError;
use crate::domain::{StopId, parse_departure_time};

/// Request for every feasible itinerary within a transfer bound.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanRequest {
    pub origin: StopId,
    pub destination: StopId,

    /// Earliest departure; `None` means now.
    pub departure: Option<NaiveDateTime>,

    pub max_transfers: usize,
}

impl PlanRequest {
    pub fn new(
        origin: StopId,
        destination: StopId,
        departure: Option<NaiveDateTime>,
        max_transfers: usize,
    ) -> Self {
        Self {
            origin,
            destination,
            departure,
            max_transfers,
        }
    }

    /// Build a request from raw caller input.
    ///
    /// A missing transfer bound falls back to the configured default.
    pub fn parse(
        origin: &str,
        destination: &str,
        departure: Option<&str>,
        max_transfers: Option<i64>,
        config: &PlannerConfig,
    ) -> Result<Self, PlanError> {
        let request = Self::new(
            parse_stop("origin", origin)?,
            parse_stop("destination", destination)?,
            parse_departure(departure)?,
            parse_transfers(max_transfers, config)?,
        );
        request.validate()?;
        Ok(request)
    }

    pub fn validate(&self) -> Result<(), PlanError> {
        distinct_endpoints(&self.origin, &self.destination)
    }

    /// Edge budget for a path.
    pub fn max_hops(&self) -> usize {
        self.max_transfers.saturating_add(1)
    }
}

/// Request for the K best itineraries under each metric.
#[derive(Debug, Clone, PartialEq)]
pub struct OptimizeRequest {
    pub origin: StopId,
    pub destination: StopId,

    /// Earliest departure; `None` means now.
    pub departure: Option<NaiveDateTime>,

    /// Itineraries per metric.
    pub k: usize,

    /// Transfer bound; `None` uses the configured default.
    pub max_transfers: Option<usize>,
}

impl OptimizeRequest {
    pub fn new(
        origin: StopId,
        destination: StopId,
        departure: Option<NaiveDateTime>,
        k: usize,
        max_transfers: Option<usize>,
    ) -> Self {
        Self {
            origin,
            destination,
            departure,
            k,
            max_transfers,
        }
    }

    /// Build a request from raw caller input.
    ///
    /// K must be positive here even though the planner itself accepts
    /// zero and returns empty lists for it.
    pub fn parse(
        origin: &str,
        destination: &str,
        departure: Option<&str>,
        k: Option<i64>,
        max_transfers: Option<i64>,
        config: &PlannerConfig,
    ) -> Result<Self, PlanError> {
        let k = match k {
            None => config.default_k,
            Some(k) if k <= 0 => return Err(PlanError::invalid(format!("k must be positive, got {k}"))),
            Some(k) => usize::try_from(k).map_err(|_| PlanError::invalid("k is too large"))?,
        };

        let max_transfers = match max_transfers {
            None => None,
            some => Some(parse_transfers(some, config)?),
        };

        let request = Self::new(
            parse_stop("origin", origin)?,
            parse_stop("destination", destination)?,
            parse_departure(departure)?,
            k,
            max_transfers,
        );
        request.validate(config)?;
        Ok(request)
    }

    pub fn validate(&self, config: &PlannerConfig) -> Result<(), PlanError> {
        distinct_endpoints(&self.origin, &self.destination)?;
        if self.k > config.max_k {
            return Err(PlanError::invalid(format!(
                "k must be at most {}, got {}",
                config.max_k, self.k
            )));
        }
        Ok(())
    }

    /// Edge budget for a path.
    pub fn max_hops(&self, config: &PlannerConfig) -> usize {
        self.max_transfers
            .unwrap_or(config.default_max_transfers)
            .saturating_add(1)
    }
}

fn parse_stop(field: &str, raw: &str) -> Result<StopId, PlanError> {
    StopId::parse(raw.trim()).map_err(|e| PlanError::invalid(format!("{field}: {e}")))
}

fn parse_departure(raw: Option<&str>) -> Result<Option<NaiveDateTime>, PlanError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => parse_departure_time(s)
            .map(Some)
            .map_err(|e| PlanError::invalid(format!("departure_time: {e}"))),
    }
}

fn parse_transfers(raw: Option<i64>, config: &PlannerConfig) -> Result<usize, PlanError> {
    match raw {
        None => Ok(config.default_max_transfers),
        Some(n) => usize::try_from(n).map_err(|_| {
            PlanError::invalid(format!("max_transfers must not be negative, got {n}"))
        }),
    }
}

fn distinct_endpoints(origin: &StopId, destination: &StopId) -> Result<(), PlanError> {
    if origin == destination {
        return Err(PlanError::invalid(format!(
            "origin and destination are both {origin}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> PlannerConfig {
        PlannerConfig::default()
    }

    #[test]
    fn plan_defaults() {
        let req = PlanRequest::parse("A", "C", None, None, &config()).unwrap();
        assert_eq!(req.origin.as_str(), "A");
        assert_eq!(req.departure, None);
        assert_eq!(req.max_transfers, 2);
        assert_eq!(req.max_hops(), 3);
    }

    #[test]
    fn plan_parses_departure() {
        let req = PlanRequest::parse("A", "C", Some("2024-03-11T08:00"), Some(0), &config()).unwrap();
        assert_eq!(req.departure.unwrap().to_string(), "2024-03-11 08:00:00");
        assert_eq!(req.max_hops(), 1);

        let req = PlanRequest::parse("A", "C", Some("  "), None, &config()).unwrap();
        assert_eq!(req.departure, None);
    }

    #[test]
    fn plan_rejects_bad_input() {
        let cfg = config();
        let invalid = |r: Result<PlanRequest, PlanError>| matches!(r, Err(PlanError::InvalidArgument(_)));

        assert!(invalid(PlanRequest::parse("A", "C", Some("08:00"), None, &cfg)));
        assert!(invalid(PlanRequest::parse("A", "C", None, Some(-1), &cfg)));
        assert!(invalid(PlanRequest::parse("A", "A", None, None, &cfg)));
        assert!(invalid(PlanRequest::parse("", "C", None, None, &cfg)));
        assert!(invalid(PlanRequest::parse("A", "C D", None, None, &cfg)));
    }

    #[test]
    fn optimize_defaults() {
        let req = OptimizeRequest::parse("A", "C", None, None, None, &config()).unwrap();
        assert_eq!(req.k, 3);
        assert_eq!(req.max_transfers, None);
        assert_eq!(req.max_hops(&config()), 3);
    }

    #[test]
    fn optimize_validates_k() {
        let cfg = config();
        assert!(OptimizeRequest::parse("A", "C", None, Some(0), None, &cfg).is_err());
        assert!(OptimizeRequest::parse("A", "C", None, Some(-3), None, &cfg).is_err());
        assert!(OptimizeRequest::parse("A", "C", None, Some(21), None, &cfg).is_err());
        assert_eq!(
            OptimizeRequest::parse("A", "C", None, Some(20), None, &cfg)
                .unwrap()
                .k,
            20
        );
    }

    #[test]
    fn optimize_validates_transfers() {
        let cfg = config();
        assert!(OptimizeRequest::parse("A", "C", None, None, Some(-1), &cfg).is_err());

        let req = OptimizeRequest::parse("A", "C", None, None, Some(0), &cfg).unwrap();
        assert_eq!(req.max_transfers, Some(0));
        assert_eq!(req.max_hops(&cfg), 1);
    }

    #[test]
    fn error_names_the_field() {
        let err = PlanRequest::parse("A", "C", Some("soon"), None, &config()).unwrap_err();
        assert!(err.to_string().contains("departure_time"));

        let err = PlanRequest::parse("A!", "C", None, None, &config()).unwrap_err();
        assert!(err.to_string().contains("origin"));
    }
}
