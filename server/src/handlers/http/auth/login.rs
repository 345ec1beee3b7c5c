use anyhow::Result;
use bytes::Bytes;
use hyper::Request;
use tracing::{info, warn};

use shared::types::{AuthError, LoginData};

use super::session::{reject, simulate_latency, start_session};
use crate::AppState;
use crate::handlers::http::utils::{HttpResponse, parse_json};

/// Any non-empty username and password logs in.
pub async fn handle_login(req: Request<Bytes>, state: AppState) -> Result<HttpResponse> {
    info!("Processing login request");

    let data: LoginData = match parse_json(&req) {
        Ok(data) => data,
        Err(e) => {
            warn!("Login body rejected: {}", e);
            return reject(AuthError::InvalidBody);
        }
    };

    if let Err(e) = data.validate() {
        warn!("Login validation failed: {}", e.to_code());
        return reject(e);
    }

    simulate_latency(&state).await;

    start_session(&req, &state, data.username.trim(), "Login successful").await
}
