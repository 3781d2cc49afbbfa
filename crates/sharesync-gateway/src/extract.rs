//! JSON body extraction that answers with the API error envelope.

use axum::extract::{FromRequest, Request};
use axum::http::StatusCode;
use axum::Json;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ApiError;

pub const INVALID_BODY: &str = "Invalid request body";

/// A JSON request body, kept untyped until the required fields are checked.
///
/// Missing content type, unparseable JSON and type mismatches all become a
/// 400 `{error, details}` response instead of axum's plain-text rejection.
#[derive(Debug)]
pub struct JsonBody(pub Value);

impl<S: Send + Sync> FromRequest<S> for JsonBody {
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<Value>::from_request(req, state)
            .await
            .map_err(|rejection| invalid_body(rejection.body_text()))?;
        Ok(Self(value))
    }
}

impl JsonBody {
    /// A top-level string field, if present.
    pub fn str_field(&self, name: &str) -> Option<&str> {
        self.0.get(name).and_then(Value::as_str)
    }

    pub fn decode<T: DeserializeOwned>(self) -> Result<T, ApiError> {
        serde_json::from_value(self.0).map_err(|e| invalid_body(e.to_string()))
    }
}

fn invalid_body(details: String) -> ApiError {
    ApiError::new(StatusCode::BAD_REQUEST, INVALID_BODY, Some(details))
}
