use anyhow::Result;
use bytes::Bytes;
use hyper::Request;
use tracing::{info, warn};

use shared::types::{AuthError, SignupData};

use super::session::{reject, simulate_latency, start_session};
use crate::AppState;
use crate::handlers::http::utils::{HttpResponse, parse_json};

pub async fn handle_signup(req: Request<Bytes>, state: AppState) -> Result<HttpResponse> {
    info!("Processing signup request");

    let data: SignupData = match parse_json(&req) {
        Ok(data) => data,
        Err(e) => {
            warn!("Signup body rejected: {}", e);
            return reject(AuthError::InvalidBody);
        }
    };

    if let Err(e) = data.validate() {
        warn!("Signup validation failed: {}", e.to_code());
        return reject(e);
    }

    simulate_latency(&state).await;

    start_session(&req, &state, data.username.trim(), "Account created").await
}
