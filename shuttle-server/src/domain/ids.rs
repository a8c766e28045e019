//! Identifier types for network entities.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Error returned when parsing an invalid identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {kind} id: {reason}")]
pub struct InvalidId {
    kind: &'static str,
    reason: &'static str,
}

/// Longest identifier we accept. UUIDs in canonical form are 36 bytes.
const MAX_ID_LEN: usize = 64;

fn validate(kind: &'static str, s: &str) -> Result<(), InvalidId> {
    if s.is_empty() {
        return Err(InvalidId {
            kind,
            reason: "must not be empty",
        });
    }
    if s.len() > MAX_ID_LEN {
        return Err(InvalidId {
            kind,
            reason: "must be at most 64 bytes",
        });
    }
    if !s
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
    {
        return Err(InvalidId {
            kind,
            reason: "must contain only ASCII letters, digits, '-' or '_'",
        });
    }
    Ok(())
}

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Parse an identifier, rejecting empty or non-token input.
            pub fn parse(s: &str) -> Result<Self, InvalidId> {
                validate($kind, s)?;
                Ok(Self(s.to_string()))
            }

            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = InvalidId;

            fn try_from(s: String) -> Result<Self, Self::Error> {
                validate($kind, &s)?;
                Ok(Self(s))
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

entity_id!(
    /// Identifier of a shuttle stop.
    ///
    /// # Examples
    ///
    /// ```
    /// use shuttle_server::domain::StopId;
    ///
    /// let library = StopId::parse("library").unwrap();
    /// assert_eq!(library.as_str(), "library");
    ///
    /// assert!(StopId::parse("").is_err());
    /// assert!(StopId::parse("main gate").is_err());
    /// ```
    StopId,
    "stop"
);

entity_id!(
    /// Identifier of a shuttle route.
    RouteId,
    "route"
);

entity_id!(
    /// Identifier of a physical shuttle vehicle.
    ShuttleId,
    "shuttle"
);
