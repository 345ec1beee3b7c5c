use anyhow::{Context, Result};
use bytes::Bytes;
use hyper::{Request, StatusCode, header};
use tracing::{debug, info};

use shared::types::{AuthError, AuthResponse, Identity, SessionRecord, SessionView};

use crate::AppState;
use crate::handlers::http::session::Visitor;
use crate::handlers::http::utils::{self, HttpResponse};
use crate::portfolio::mint_user_id;
use crate::state::unix_now;
use crate::store::{load_record, save_record};

/// Where a fresh session lands.
pub const AFTER_LOGIN: &str = "/dashboard";

/// Sleep for the configured fake network latency.
pub async fn simulate_latency(state: &AppState) {
    let latency = state.config.read().await.session.latency();
    if !latency.is_zero() {
        debug!("Simulating {:?} latency", latency);
        tokio::time::sleep(latency).await;
    }
}

pub fn reject(error: AuthError) -> Result<HttpResponse> {
    let status = match error {
        AuthError::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        _ => StatusCode::BAD_REQUEST,
    };
    utils::deliver_serialized_json(&error.to_response(), status)
}

/// Clear a session key and drop the portfolio of the identity it held.
pub async fn end_session(state: &AppState, key: &str) {
    let record = load_record(state.sessions.as_ref(), Some(key));
    state.sessions.clear(key);
    if let Some(identity) = record.identity {
        state.portfolios.remove(&identity.id).await;
        info!("Session ended for {}", identity.username);
    }
}

/// Replace whatever session the request carried with a fresh identity-only
/// record under a new key, and hand the key back as a cookie.
pub async fn start_session(
    req: &Request<Bytes>,
    state: &AppState,
    username: &str,
    message: &str,
) -> Result<HttpResponse> {
    let cookie_name = state.config.read().await.session.cookie_name.clone();

    if let Some(old_key) = utils::get_cookie(req.headers(), &cookie_name) {
        end_session(state, &old_key).await;
    }

    let identity = Identity {
        id: mint_user_id(),
        username: username.to_string(),
        ip_address: utils::get_client_ip(req).unwrap_or_else(|| "unknown".to_string()),
        last_login: unix_now(),
    };
    let user_id = identity.id.clone();
    let key = uuid::Uuid::new_v4().to_string();

    save_record(state.sessions.as_ref(), &key, &SessionRecord::signed_in(identity))
        .context("Failed to store new session")?;

    info!("Session started for {} ({})", username, user_id);

    let cookie = utils::create_session_cookie(&cookie_name, &key, utils::is_https(req))
        .context("Failed to create session cookie")?;

    let body = AuthResponse::Success {
        user_id,
        username: username.to_string(),
        message: message.to_string(),
        redirect: AFTER_LOGIN.to_string(),
    };

    let mut res = utils::deliver_serialized_json(&body, StatusCode::OK)?;
    res.headers_mut().insert(header::SET_COOKIE, cookie);
    Ok(utils::add_no_cache_headers(res))
}

/// `{logged_in, paid, username}` for the nav bar.
pub async fn handle_session_view(req: Request<Bytes>, state: AppState) -> Result<HttpResponse> {
    let visitor = Visitor::from_request(&req, &state).await;
    let view = SessionView::from(&visitor.record);
    let res = utils::deliver_success_json(Some(view))?;
    Ok(utils::add_no_cache_headers(res))
}
