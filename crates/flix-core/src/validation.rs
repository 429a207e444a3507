//! Validation utilities.

use crate::FlixError;
use validator::{Validate, ValidationErrors};

/// Extension trait running `validator` rules and mapping failures to [`FlixError`].
pub trait ValidateExt: Validate {
    /// Validates the entity and returns a `FlixError::Validation` on failure.
    fn validate_entity(&self) -> Result<(), FlixError> {
        self.validate().map_err(validation_errors_to_flix_error)
    }
}

impl<T: Validate> ValidateExt for T {}

/// Converts `validator::ValidationErrors` to `FlixError`.
#[must_use]
pub fn validation_errors_to_flix_error(errors: ValidationErrors) -> FlixError {
    let mut messages: Vec<String> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| {
                let message = error
                    .message
                    .as_ref()
                    .map_or_else(|| error.code.to_string(), ToString::to_string);
                format!("{}: {}", field, message)
            })
        })
        .collect();
    messages.sort();

    FlixError::Validation(messages.join("; "))
}
