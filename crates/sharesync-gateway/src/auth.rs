//! Identity-provider authorization routes.

use axum::extract::{Query, State};
use axum::response::Redirect;
use axum::Json;
use sharesync_core::{AuthState, CallbackParams};
use tracing::{info, warn};

use crate::error::ApiError;
use crate::server::AppState;
use crate::types::{AppTokenResponse, AuthQuery, AuthUrlResponse, DisconnectResponse};

const AUTH_FAILED: &str = "Authentication failed";

/// Response of `GET /api/auth/sharepoint`, depending on the requested flow.
#[derive(Debug, serde::Serialize)]
#[serde(untagged)]
pub enum AuthorizationResponse {
    Delegated(AuthUrlResponse),
    App(AppTokenResponse),
}

pub async fn begin_authorization(
    State(state): State<AppState>,
    Query(query): Query<AuthQuery>,
) -> Result<Json<AuthorizationResponse>, ApiError> {
    match query.auth_type.as_deref().unwrap_or("delegated") {
        "delegated" => {
            let url = state
                .auth
                .begin_delegated()
                .await
                .map_err(|e| ApiError::from_sync(AUTH_FAILED, e))?;
            Ok(Json(AuthorizationResponse::Delegated(AuthUrlResponse {
                auth_url: url.to_string(),
            })))
        }
        "app" => {
            let token = state
                .auth
                .authorize_app()
                .await
                .map_err(|e| ApiError::from_sync(AUTH_FAILED, e))?;
            Ok(Json(AuthorizationResponse::App(AppTokenResponse {
                success: true,
                message: "App-level authentication successful".to_string(),
                token: token.access_token.expose().to_string(),
                expires_in: token.expires_in,
            })))
        }
        other => Err(ApiError::bad_request(format!(
            "Unsupported authType: {other}"
        ))),
    }
}

/// The provider redirects the user agent here; we answer with another redirect.
pub async fn handle_callback(
    State(state): State<AppState>,
    Query(params): Query<CallbackParams>,
) -> Redirect {
    match state.auth.complete_callback(params).await {
        Ok(_) => {
            info!("Authorization callback accepted");
            Redirect::to(&state.redirects.success)
        }
        Err(e) => {
            warn!(error = %e, "Authorization callback rejected");
            Redirect::to(&state.redirects.error)
        }
    }
}

pub async fn authorization_status(State(state): State<AppState>) -> Json<AuthState> {
    Json(state.auth.state().await)
}

pub async fn disconnect(State(state): State<AppState>) -> Json<DisconnectResponse> {
    let message = if state.auth.disconnect().await {
        "Disconnected"
    } else {
        "No active authorization"
    };
    Json(DisconnectResponse {
        success: true,
        message: message.to_string(),
    })
}
