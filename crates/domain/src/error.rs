//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into
//! [`SceneGuardError`] at port boundaries via `#[from]` or an explicit
//! `From` impl. No `String` catch-all variants.

/// Error type shared by every port trait.
#[derive(Debug, thiserror::Error)]
pub enum SceneGuardError {
    /// A value violated a domain invariant.
    #[error("validation error")]
    Validation(#[from] ValidationError),

    /// A referenced item does not exist.
    #[error("not found")]
    NotFound(#[from] NotFoundError),

    /// The scene inventory could not be loaded.
    #[error("inventory error")]
    Inventory(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// An external collaborator (state reader, action invoker, notifier) failed.
    #[error("collaborator error")]
    Collaborator(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Domain invariant violations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("identifier must not be empty")]
    EmptyId,

    #[error("name must not be empty")]
    EmptyName,

    #[error("scene has no target actions")]
    NoActions,

    #[error("brightness {0} is outside 0..=100")]
    BrightnessOutOfRange(f64),

    #[error("xy color ({x}, {y}) is outside 0..=1")]
    ColorOutOfRange { x: f64, y: f64 },

    #[error("color temperature {0} mirek must be positive")]
    InvalidMirek(f64),

    #[error("invalid pattern {pattern:?}: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("{field} must be {expected}")]
    OutOfBounds {
        field: &'static str,
        expected: &'static str,
    },
}

/// A lookup by identifier found nothing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{entity} {id} not found")]
pub struct NotFoundError {
    pub entity: &'static str,
    pub id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_convert_validation_error_into_scene_guard_error() {
        let err: SceneGuardError = ValidationError::EmptyName.into();
        assert!(matches!(
            err,
            SceneGuardError::Validation(ValidationError::EmptyName)
        ));
    }

    #[test]
    fn should_display_not_found_with_kind_and_id() {
        let err = NotFoundError {
            entity: "Scene",
            id: "abc".to_string(),
        };
        assert_eq!(err.to_string(), "Scene abc not found");
    }

    #[test]
    fn should_display_out_of_bounds_field() {
        let err = ValidationError::OutOfBounds {
            field: "rate_limit.per_scene",
            expected: "at least 1",
        };
        assert_eq!(err.to_string(), "rate_limit.per_scene must be at least 1");
    }
}
