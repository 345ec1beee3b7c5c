use anyhow::Result;
use bytes::Bytes;
use hyper::{Request, StatusCode};
use tracing::{info, warn};

use shared::types::{LaunchData, LaunchResponse};

use super::auth::session::simulate_latency;
use crate::AppState;
use crate::handlers::http::session::Member;
use crate::handlers::http::utils::{self, HttpResponse};
use crate::state::unix_now;

/// GET /api/launches
pub async fn handle_list_launches(
    _req: Request<Bytes>,
    state: AppState,
    member: Member,
) -> Result<HttpResponse> {
    let launches = state
        .portfolios
        .with(member.owner(), unix_now(), |p| p.launches.clone())
        .await;
    utils::deliver_success_json(Some(launches))
}

/// POST /api/launches
pub async fn handle_launch_token(
    req: Request<Bytes>,
    state: AppState,
    member: Member,
) -> Result<HttpResponse> {
    let data: LaunchData = match utils::parse_json(&req) {
        Ok(data) => data,
        Err(e) => {
            warn!("Launch body rejected: {}", e);
            return utils::deliver_error_json(
                "INVALID_BODY",
                &format!("Invalid launch form: {}", e),
                StatusCode::BAD_REQUEST,
            );
        }
    };

    if let Err(e) = data.validate() {
        warn!("Launch validation failed: {}", e.to_code());
        return utils::deliver_serialized_json(&e.to_response(), StatusCode::BAD_REQUEST);
    }

    simulate_latency(&state).await;

    let now = unix_now();
    let token = state
        .portfolios
        .with(member.owner(), now, |p| p.record_launch(data, now))
        .await;

    info!("{} launched {} ({})", member.owner(), token.symbol, token.id);

    utils::deliver_serialized_json(
        &LaunchResponse::Success {
            message: format!("{} has been submitted for launch", token.symbol),
            token,
        },
        StatusCode::OK,
    )
}
