//! Planner configuration.

use chrono::Duration;

/// Order among search results with equal metric values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TieBreak {
    /// Earlier arrival, then fewer legs, then stop sequence.
    #[default]
    EarliestArrival,
    /// Fewer legs, then earlier arrival, then stop sequence.
    FewestLegs,
}

/// Configuration parameters for journey planning.
#[derive(Debug, Clone)]
pub struct PlannerConfig {
    /// Transfers allowed when the caller does not specify a bound.
    pub default_max_transfers: usize,

    /// Itineraries per metric when the caller does not specify K.
    pub default_k: usize,

    /// Upper bound accepted for K.
    pub max_k: usize,

    /// Minutes between consecutive trips leaving a route's first stop.
    pub headway_mins: i64,

    /// How old an occupancy reading may be and still count (minutes).
    /// Older readings are ignored and the shuttle is treated as empty.
    pub crowd_tolerance_mins: i64,

    /// How equally scored search results are ordered.
    pub tie_break: TieBreak,
}

impl PlannerConfig {
    /// Create a new configuration with the given parameters.
    pub fn new(
        default_max_transfers: usize,
        default_k: usize,
        max_k: usize,
        headway_mins: i64,
        crowd_tolerance_mins: i64,
        tie_break: TieBreak,
    ) -> Self {
        Self {
            default_max_transfers,
            default_k,
            max_k,
            headway_mins,
            crowd_tolerance_mins,
            tie_break,
        }
    }

    /// Returns the headway as a Duration.
    pub fn headway(&self) -> Duration {
        Duration::minutes(self.headway_mins)
    }

    /// Returns the occupancy tolerance as a Duration.
    pub fn crowd_tolerance(&self) -> Duration {
        Duration::minutes(self.crowd_tolerance_mins)
    }
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            default_max_transfers: 2,
            default_k: 3,
            max_k: 20,
            headway_mins: 30,
            crowd_tolerance_mins: 30,
            tie_break: TieBreak::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = PlannerConfig::default();

        assert_eq!(config.default_max_transfers, 2);
        assert_eq!(config.default_k, 3);
        assert_eq!(config.max_k, 20);
        assert_eq!(config.headway_mins, 30);
        assert_eq!(config.crowd_tolerance_mins, 30);
        assert_eq!(config.tie_break, TieBreak::EarliestArrival);
    }

    #[test]
    fn duration_methods() {
        let config = PlannerConfig::default();

        assert_eq!(config.headway(), Duration::minutes(30));
        assert_eq!(config.crowd_tolerance(), Duration::minutes(30));
    }

    #[test]
    fn custom_config() {
        let config = PlannerConfig::new(1, 5, 10, 15, 45, TieBreak::FewestLegs);

        assert_eq!(config.default_max_transfers, 1);
        assert_eq!(config.default_k, 5);
        assert_eq!(config.max_k, 10);
        assert_eq!(config.headway_mins, 15);
        assert_eq!(config.crowd_tolerance_mins, 45);
        assert_eq!(config.tie_break, TieBreak::FewestLegs);
    }
}
