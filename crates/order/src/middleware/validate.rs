use axum::{
    extract::{FromRequest, Request},
    http::StatusCode,
};
use serde::de::DeserializeOwned;
use shared::errors::ErrorResponse;
use validator::{Validate, ValidationErrors, ValidationErrorsKind};

pub struct SimpleValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for SimpleValidatedJson<T>
where
    T: DeserializeOwned + Validate + Send,
    S: Send + Sync,
{
    type Rejection = (StatusCode, axum::Json<ErrorResponse>);

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let axum::Json(json_value) = axum::Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| {
                (
                    rejection.status(),
                    axum::Json(ErrorResponse::new("InvalidJson", rejection.body_text())),
                )
            })?;

        json_value.validate().map_err(|validation_errors| {
            (
                StatusCode::BAD_REQUEST,
                axum::Json(ErrorResponse::new(
                    "ValidationError",
                    format_validation_errors(&validation_errors),
                )),
            )
        })?;

        Ok(Self(json_value))
    }
}

pub fn format_validation_errors(errors: &ValidationErrors) -> String {
    let mut error_messages = Vec::new();
    collect_messages("", errors, &mut error_messages);

    if error_messages.is_empty() {
        "Validation failed".to_string()
    } else {
        error_messages.join("; ")
    }
}

fn collect_messages(prefix: &str, errors: &ValidationErrors, out: &mut Vec<String>) {
    for (field, kind) in errors.errors() {
        let path = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{prefix}.{field}")
        };

        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                for error in field_errors {
                    let message = error
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| match error.code.as_ref() {
                            "length" => "Invalid length".to_string(),
                            "range" => "Value out of range".to_string(),
                            "custom" => "Custom validation failed".to_string(),
                            _ => format!("Invalid {field}"),
                        });
                    out.push(format!("{path}: {message}"));
                }
            }
            ValidationErrorsKind::Struct(inner) => collect_messages(&path, inner, out),
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    collect_messages(&format!("{path}[{index}]"), inner, out);
                }
            }
        }
    }
}
