use anyhow::{Context, Result};
use bytes::Bytes;
use hyper::{Request, StatusCode, header};
use serde_json::json;

use super::session::end_session;
use crate::AppState;
use crate::handlers::http::utils::{self, HttpResponse};

/// Drop the stored record and expire the cookie. Safe to call when not
/// logged in.
pub async fn handle_logout(req: Request<Bytes>, state: AppState) -> Result<HttpResponse> {
    let cookie_name = state.config.read().await.session.cookie_name.clone();

    if let Some(key) = utils::get_cookie(req.headers(), &cookie_name) {
        end_session(&state, &key).await;
    }

    let cookie = utils::delete_cookie(&cookie_name, utils::is_https(&req))
        .context("Failed to build logout cookie")?;

    let body = json!({
        "status": "success",
        "message": "Logged out successfully",
        "redirect": "/",
    });

    let mut res = utils::deliver_serialized_json(&body, StatusCode::OK)?;
    res.headers_mut().insert(header::SET_COOKIE, cookie);
    Ok(utils::add_no_cache_headers(res))
}
