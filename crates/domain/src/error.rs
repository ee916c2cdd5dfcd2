//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into [`HubError`]
//! via `#[from]` (or an explicit `into_domain`) when crossing a port boundary.

/// Top-level error returned by every port and platform operation.
#[derive(Debug, thiserror::Error)]
pub enum HubError {
    #[error("validation error")]
    Validation(#[from] ValidationError),

    #[error("not found")]
    NotFound(#[from] NotFoundError),

    /// The requested capability is not configured on this entity.
    ///
    /// Permanent: retrying will never succeed.
    #[error("unsupported operation")]
    Unsupported(#[from] UnsupportedError),

    /// The underlying switch or script call failed.
    ///
    /// Transient: surfaced to the caller without local retry.
    #[error("underlying device unreachable")]
    Unreachable(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Construction-time configuration problem, fatal to one entity only.
    #[error("invalid configuration")]
    InvalidConfiguration(#[from] ConfigurationError),
}

impl HubError {
    /// Whether the error is [`HubError::Unsupported`].
    #[must_use]
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::Unsupported(_))
    }
}

/// Malformed input (identifiers, names, service payloads).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("name must not be empty")]
    EmptyName,

    #[error("entity id must not be empty")]
    EmptyEntityId,

    #[error("invalid identifier {value:?}: {reason}")]
    InvalidId { value: String, reason: &'static str },

    #[error("missing field {0:?} in service data")]
    MissingField(&'static str),

    #[error("invalid value for field {field:?}: {value}")]
    InvalidField { field: &'static str, value: String },
}

/// A referenced entity does not exist.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{entity} {id} not found")]
pub struct NotFoundError {
    pub entity: &'static str,
    pub id: String,
}

/// An operation was requested that the entity is not configured for.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{entity_id} does not support {operation}")]
pub struct UnsupportedError {
    pub entity_id: String,
    pub operation: String,
}

impl UnsupportedError {
    #[must_use]
    pub fn new(entity_id: impl std::fmt::Display, operation: impl Into<String>) -> Self {
        Self {
            entity_id: entity_id.to_string(),
            operation: operation.into(),
        }
    }
}

/// Problems detected while building an entity from its configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigurationError {
    #[error("name {0:?} does not produce a usable entity id")]
    UnusableName(String),

    #[error("{entity_id} is wired as both power and oscillation switch")]
    SharedSwitch { entity_id: String },

    #[error("repeat count must be at least 1")]
    ZeroCount,

    #[error("no {platform} entities configured")]
    NoEntities { platform: &'static str },

    #[error("invalid identifier")]
    Id(#[from] ValidationError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_convert_validation_error_into_hub_error() {
        let err: HubError = ValidationError::EmptyName.into();
        assert!(matches!(err, HubError::Validation(ValidationError::EmptyName)));
    }

    #[test]
    fn should_display_not_found_error() {
        let err = NotFoundError {
            entity: "Switch",
            id: "switch.fan1".to_string(),
        };
        assert_eq!(err.to_string(), "Switch switch.fan1 not found");
    }

    #[test]
    fn should_display_unsupported_error() {
        let err = UnsupportedError {
            entity_id: "fan.bedroom".to_string(),
            operation: "oscillate".to_string(),
        };
        assert_eq!(err.to_string(), "fan.bedroom does not support oscillate");
    }

    #[test]
    fn should_flag_unsupported_errors() {
        let err: HubError = UnsupportedError {
            entity_id: "fan.bedroom".to_string(),
            operation: "set_speed".to_string(),
        }
        .into();
        assert!(err.is_unsupported());

        let err: HubError = ValidationError::EmptyName.into();
        assert!(!err.is_unsupported());
    }

    #[test]
    fn should_expose_source_of_unreachable_error() {
        let io = std::io::Error::new(std::io::ErrorKind::TimedOut, "bus timeout");
        let err = HubError::Unreachable(Box::new(io));
        let source = std::error::Error::source(&err).unwrap();
        assert_eq!(source.to_string(), "bus timeout");
    }
}
