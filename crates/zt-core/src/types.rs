//! Core type definitions with validation.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Validation errors for core types.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    /// The provided value was empty.
    #[error("{field} cannot be empty")]
    Empty { field: &'static str },

    /// The hourly rate was zero, negative, or not finite.
    #[error("hourly rate must be a positive number, got {value}")]
    NonPositiveRate { value: f64 },

    /// The hourly rate was above the accepted maximum.
    #[error("hourly rate must be at most {max}, got {value}")]
    RateTooHigh { value: f64, max: f64 },

    /// The hourly rate text was not a number.
    #[error("hourly rate is not a number: {value:?}")]
    InvalidRate { value: String },

    /// The activity name is not part of the catalogue.
    #[error("unknown activity: {value}")]
    UnknownActivity { value: String },
}

/// Generates a validated string ID newtype with common trait implementations.
macro_rules! define_string_id {
    (
        $(#[$meta:meta])*
        $name:ident, $field_name:literal
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Creates a new ID after validation.
            pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
                let id = id.into();
                if id.trim().is_empty() {
                    return Err(ValidationError::Empty { field: $field_name });
                }
                Ok(Self(id))
            }

            /// Returns the ID as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = ValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_string_id!(
    /// A validated session identifier.
    ///
    /// Fresh identifiers come from [`SessionId::generate`]; stored ones are
    /// accepted as-is as long as they are non-empty.
    SessionId, "session ID"
);

define_string_id!(
    /// A validated user identifier, as handed out by the auth provider.
    UserId, "user ID"
);

impl SessionId {
    /// Generates a new random (v4 UUID) session identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}
