use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Body returned for every failed request.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub success: bool,
    pub status: String,
    pub kind: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            status: "error".into(),
            kind: kind.into(),
            message: message.into(),
        }
    }
}
