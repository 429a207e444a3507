//! JSON extractor that validates the request body.
//!
//! Bodies that fail to parse are rejected with 400 `INVALID_JSON`; bodies that
//! parse but break a `validator` rule are rejected with 422 and field errors.

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use crate::responses::ApiResponse;
use flix_core::{ErrorResponse, FieldError};
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors, ValidationErrorsKind};

/// JSON body that has passed its `Validate` rules.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

impl<T> std::ops::Deref for ValidatedJson<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Rejection type for validated JSON extraction.
#[derive(Debug)]
pub enum ValidatedJsonRejection {
    /// The body is not valid JSON for the target type.
    JsonError(JsonRejection),
    /// The body parsed but failed validation.
    ValidationError(ValidationErrors),
}

impl IntoResponse for ValidatedJsonRejection {
    fn into_response(self) -> Response {
        match self {
            Self::JsonError(rejection) => {
                let error_response = ErrorResponse {
                    code: "INVALID_JSON".to_string(),
                    message: format!("Invalid JSON: {}", rejection),
                    details: None,
                    request_id: None,
                };
                (
                    StatusCode::BAD_REQUEST,
                    Json(ApiResponse::<()>::error(error_response)),
                )
                    .into_response()
            }
            Self::ValidationError(errors) => {
                let error_response = ErrorResponse {
                    code: "VALIDATION_ERROR".to_string(),
                    message: "Request validation failed".to_string(),
                    details: Some(convert_validation_errors(&errors)),
                    request_id: None,
                };
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    Json(ApiResponse::<()>::error(error_response)),
                )
                    .into_response()
            }
        }
    }
}

/// Flattens validator errors into field errors, prefixing nested fields.
fn convert_validation_errors(errors: &ValidationErrors) -> Vec<FieldError> {
    let mut field_errors = Vec::new();

    for (field, kind) in errors.errors() {
        match kind {
            ValidationErrorsKind::Field(errs) => {
                field_errors.extend(errs.iter().map(|err| FieldError {
                    field: field.to_string(),
                    message: err.message.as_ref().map_or_else(
                        || format!("Validation failed for field '{}'", field),
                        ToString::to_string,
                    ),
                    code: err.code.to_string(),
                }));
            }
            ValidationErrorsKind::Struct(nested) => {
                for nested_err in convert_validation_errors(nested) {
                    field_errors.push(FieldError {
                        field: format!("{}.{}", field, nested_err.field),
                        ..nested_err
                    });
                }
            }
            ValidationErrorsKind::List(items) => {
                for (index, item_errors) in items {
                    for nested_err in convert_validation_errors(item_errors) {
                        field_errors.push(FieldError {
                            field: format!("{}[{}].{}", field, index, nested_err.field),
                            ..nested_err
                        });
                    }
                }
            }
        }
    }

    field_errors.sort_by(|a, b| a.field.cmp(&b.field));
    field_errors
}

#[async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ValidatedJsonRejection;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(ValidatedJsonRejection::JsonError)?;

        value
            .validate()
            .map_err(ValidatedJsonRejection::ValidationError)?;

        Ok(ValidatedJson(value))
    }
}
