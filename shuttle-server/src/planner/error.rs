//! Planner errors.

use crate::domain::StopId;
use crate::provider::ProviderError;

/// Error from a planning request.
///
/// An unreachable destination is not an error; it yields empty results.
#[derive(Debug, thiserror::Error)]
pub enum PlanError {
    /// Origin or destination stop does not exist
    #[error("stop {0} not found")]
    NotFound(StopId),

    /// Malformed or out-of-range request parameter
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Network data could not be read
    #[error("network data unavailable: {0}")]
    UpstreamData(#[from] ProviderError),

    /// A search task failed
    #[error("internal error: {0}")]
    Internal(String),
}

impl PlanError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = PlanError::NotFound(StopId::parse("LIB").unwrap());
        assert_eq!(err.to_string(), "stop LIB not found");

        let err = PlanError::invalid("k must be positive");
        assert_eq!(err.to_string(), "invalid argument: k must be positive");

        let err = PlanError::from(ProviderError::Unavailable("database down".into()));
        assert!(err.to_string().starts_with("network data unavailable: "));
    }
}
