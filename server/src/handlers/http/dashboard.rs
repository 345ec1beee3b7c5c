use anyhow::Result;
use bytes::Bytes;
use hyper::{Request, StatusCode};

use shared::types::ProfitRange;

use crate::AppState;
use crate::handlers::http::session::Member;
use crate::handlers::http::utils::{self, HttpResponse};
use crate::portfolio::profit_series;
use crate::state::unix_now;

/// GET /api/dashboard
pub async fn handle_dashboard_stats(
    _req: Request<Bytes>,
    state: AppState,
    member: Member,
) -> Result<HttpResponse> {
    let stats = state
        .portfolios
        .with(member.owner(), unix_now(), |p| p.stats())
        .await;
    utils::deliver_success_json(Some(stats))
}

/// GET /api/profit?range=daily|weekly|monthly
pub async fn handle_profit_series(
    req: Request<Bytes>,
    _state: AppState,
    _member: Member,
) -> Result<HttpResponse> {
    let range = match utils::query_param(&req, "range") {
        None => ProfitRange::default(),
        Some(raw) => match raw.parse::<ProfitRange>() {
            Ok(range) => range,
            Err(msg) => {
                return utils::deliver_error_json("INVALID_RANGE", &msg, StatusCode::BAD_REQUEST);
            }
        },
    };

    utils::deliver_success_json(Some(serde_json::json!({
        "range": range,
        "points": profit_series(range, unix_now()),
    })))
}
