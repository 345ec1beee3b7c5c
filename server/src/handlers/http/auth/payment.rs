use anyhow::{Context, Result};
use bytes::Bytes;
use hyper::{Request, StatusCode};
use tracing::{info, warn};

use shared::types::{LIFETIME_PRICE_SOL, PaymentData, PaymentError, PaymentResponse};

use super::session::{AFTER_LOGIN, simulate_latency};
use crate::AppState;
use crate::handlers::http::session::Member;
use crate::handlers::http::utils::{self, HttpResponse};
use crate::state::unix_now;
use crate::store::{load_record, save_record};

/// Mock checkout: attach an active subscription to the caller's record.
pub async fn handle_payment(
    req: Request<Bytes>,
    state: AppState,
    member: Member,
) -> Result<HttpResponse> {
    let data = if req.body().is_empty() {
        PaymentData::default()
    } else {
        match utils::parse_json::<PaymentData>(&req) {
            Ok(data) => data,
            Err(e) => {
                warn!("Payment body rejected: {}", e);
                return utils::deliver_error_json(
                    "INVALID_BODY",
                    "Request body is not valid JSON",
                    StatusCode::BAD_REQUEST,
                );
            }
        }
    };

    info!("Processing {:?} payment for {}", data.plan, member.owner());
    simulate_latency(&state).await;

    // Re-read: the visitor may have logged out while we waited.
    let mut record = load_record(state.sessions.as_ref(), Some(&member.key));
    if !record.activate(data.plan, unix_now()) {
        warn!("Payment abandoned, session for {} is gone", member.owner());
        return utils::deliver_serialized_json(
            &PaymentError::NotLoggedIn.to_response(),
            StatusCode::UNAUTHORIZED,
        );
    }

    save_record(state.sessions.as_ref(), &member.key, &record)
        .context("Failed to store subscription")?;

    info!("Subscription active for {}", member.owner());

    let body = PaymentResponse::Success {
        plan: data.plan,
        price_sol: LIFETIME_PRICE_SOL,
        message: "Payment successful, lifetime access unlocked".to_string(),
        redirect: AFTER_LOGIN.to_string(),
    };
    let res = utils::deliver_serialized_json(&body, StatusCode::OK)?;
    Ok(utils::add_no_cache_headers(res))
}
