use std::future::Future;
use std::path::Path;
use std::pin::Pin;

use anyhow::{Context, Result, anyhow};
use bytes::Bytes;
use http_body_util::{BodyExt, Limited};
use hyper::{Method, Request, StatusCode};
use tracing::{debug, error, info, warn};

use shared::Decision;
use shared::gate::normalize_path;
use shared::types::ErrorResponse;

use crate::AppState;
use crate::handlers::http::pages::{PAGES, Page, deliver_page_shell};
use crate::handlers::http::session::{Member, Visitor};
use crate::handlers::http::utils::*;
use crate::handlers::http::{auth, bots, dashboard, launches, wallets};

/// Largest request body the router will buffer.
pub const MAX_BODY_BYTES: usize = 64 * 1024;

// ---------------------------------------------------------------------------
// Handler type aliases
// ---------------------------------------------------------------------------
//
// Three tiers, each asking the session gate at most once per request:
//
//   RouteHandler   no gate. Receives (req, state).
//                  Use for: login, signup, logout, health, session view.
//
//   MemberHandler  Identified: only a missing identity is refused.
//                  Gated: the full decision, so unpaid visitors are refused too.
//                  Receives (req, state, member).
//
// Pages are Gated by the path itself: public pages pass, the rest redirect.

type HandlerFuture = Pin<Box<dyn Future<Output = Result<HttpResponse>> + Send>>;

type RouteHandler = Box<dyn Fn(Request<Bytes>, AppState) -> HandlerFuture + Send + Sync>;

type MemberHandler = Box<dyn Fn(Request<Bytes>, AppState, Member) -> HandlerFuture + Send + Sync>;

enum RouteKind {
    Open(RouteHandler),
    Page(Page),
    Identified(MemberHandler),
    Gated(MemberHandler),
}

struct Route {
    method: Method,
    path: String,
    kind: RouteKind,
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

pub struct Router {
    routes: Vec<Route>,
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("routes_count", &self.routes.len())
            .finish()
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl Router {
    pub fn new() -> Self {
        Self { routes: Vec::new() }
    }

    fn open<F, Fut>(mut self, method: Method, path: &str, handler: F) -> Self
    where
        F: Fn(Request<Bytes>, AppState) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<HttpResponse>> + Send + 'static,
    {
        self.routes.push(Route {
            method,
            path: path.to_string(),
            kind: RouteKind::Open(Box::new(move |req, state| Box::pin(handler(req, state)))),
        });
        self
    }

    fn member<F, Fut>(mut self, method: Method, path: &str, gated: bool, handler: F) -> Self
    where
        F: Fn(Request<Bytes>, AppState, Member) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<HttpResponse>> + Send + 'static,
    {
        let boxed: MemberHandler =
            Box::new(move |req, state, member| Box::pin(handler(req, state, member)));
        self.routes.push(Route {
            method,
            path: path.to_string(),
            kind: if gated {
                RouteKind::Gated(boxed)
            } else {
                RouteKind::Identified(boxed)
            },
        });
        self
    }

    // ── Open (no gate) ──────────────────────────────────────────────────────

    pub fn get<F, Fut>(self, path: &str, handler: F) -> Self
    where
        F: Fn(Request<Bytes>, AppState) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<HttpResponse>> + Send + 'static,
    {
        self.open(Method::GET, path, handler)
    }

    pub fn post<F, Fut>(self, path: &str, handler: F) -> Self
    where
        F: Fn(Request<Bytes>, AppState) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<HttpResponse>> + Send + 'static,
    {
        self.open(Method::POST, path, handler)
    }

    // ── Pages ───────────────────────────────────────────────────────────────

    /// GET page whose access is whatever the gate says about its path.
    pub fn page(mut self, page: Page) -> Self {
        self.routes.push(Route {
            method: Method::GET,
            path: page.path.to_string(),
            kind: RouteKind::Page(page),
        });
        self
    }

    // ── Identified (identity required, subscription not) ────────────────────

    pub fn post_identified<F, Fut>(self, path: &str, handler: F) -> Self
    where
        F: Fn(Request<Bytes>, AppState, Member) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<HttpResponse>> + Send + 'static,
    {
        self.member(Method::POST, path, false, handler)
    }

    // ── Gated (identity and active subscription) ────────────────────────────

    pub fn get_gated<F, Fut>(self, path: &str, handler: F) -> Self
    where
        F: Fn(Request<Bytes>, AppState, Member) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<HttpResponse>> + Send + 'static,
    {
        self.member(Method::GET, path, true, handler)
    }

    pub fn post_gated<F, Fut>(self, path: &str, handler: F) -> Self
    where
        F: Fn(Request<Bytes>, AppState, Member) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<HttpResponse>> + Send + 'static,
    {
        self.member(Method::POST, path, true, handler)
    }

    pub fn delete_gated<F, Fut>(self, path: &str, handler: F) -> Self
    where
        F: Fn(Request<Bytes>, AppState, Member) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<HttpResponse>> + Send + 'static,
    {
        self.member(Method::DELETE, path, true, handler)
    }

    // ── Entry points ────────────────────────────────────────────────────────

    /// Buffer the body (bounded by `MAX_BODY_BYTES`) and dispatch.
    pub async fn handle<B>(&self, req: Request<B>, state: AppState) -> HttpResponse
    where
        B: hyper::body::Body<Data = Bytes>,
        B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        let (parts, body) = req.into_parts();
        let bytes = match Limited::new(body, MAX_BODY_BYTES).collect().await {
            Ok(collected) => collected.to_bytes(),
            Err(e) => {
                warn!("Rejected body for {} {}: {}", parts.method, parts.uri.path(), e);
                return deliver_error_json(
                    "BODY_REJECTED",
                    "Request body too large or unreadable",
                    StatusCode::PAYLOAD_TOO_LARGE,
                )
                .unwrap_or_else(|_| internal_error());
            }
        };

        self.dispatch(Request::from_parts(parts, bytes), state).await
    }

    /// Route a buffered request. Handler errors become a 500 envelope.
    pub async fn dispatch(&self, req: Request<Bytes>, state: AppState) -> HttpResponse {
        let method = req.method().clone();
        let path = req.uri().path().to_string();

        match self.route(req, state).await {
            Ok(res) => {
                debug!("{} {} -> {}", method, path, res.status().as_u16());
                res
            }
            Err(e) => {
                error!("{} {} failed: {:#}", method, path, e);
                internal_error()
            }
        }
    }

    async fn route(&self, req: Request<Bytes>, state: AppState) -> Result<HttpResponse> {
        let method = req.method().clone();
        let path = req.uri().path().to_string();

        let matched = self
            .routes
            .iter()
            .find(|r| r.method == method && Self::path_matches(&r.path, &path));

        if let Some(route) = matched {
            return match &route.kind {
                RouteKind::Open(h) => h(req, state).await,

                RouteKind::Page(page) => {
                    let visitor = Visitor::from_request(&req, &state).await;
                    match state.gate.decide(&path, &visitor.record) {
                        Decision::Allow => deliver_page_shell(*page, &state).await,
                        decision => navigate(decision, &path),
                    }
                }

                RouteKind::Identified(h) => {
                    let visitor = Visitor::from_request(&req, &state).await;
                    let decision = state.gate.decide(&path, &visitor.record);
                    match visitor.into_member() {
                        Some(member) if decision != Decision::GotoHome => {
                            h(req, state, member).await
                        }
                        _ => refuse(Decision::GotoHome, &path),
                    }
                }

                RouteKind::Gated(h) => {
                    let visitor = Visitor::from_request(&req, &state).await;
                    match (state.gate.decide(&path, &visitor.record), visitor.into_member()) {
                        (Decision::Allow, Some(member)) => h(req, state, member).await,
                        (Decision::Allow, None) => refuse(Decision::GotoHome, &path),
                        (decision, _) => refuse(decision, &path),
                    }
                }
            };
        }

        // No registered route matched; try static files for GET.
        if method == Method::GET {
            if let Some(res) = Self::try_serve_static(&path, &state).await? {
                return Ok(res);
            }
        }

        // Unknown paths are still protected.
        let visitor = Visitor::from_request(&req, &state).await;
        let decision = state.gate.decide(&path, &visitor.record);
        if !decision.is_allowed() {
            return if method == Method::GET && !is_api_path(&path) {
                navigate(decision, &path)
            } else {
                refuse(decision, &path)
            };
        }

        deliver_error_json("NOT_FOUND", "Endpoint not found", StatusCode::NOT_FOUND)
            .context("Failed to deliver 404 response")
    }

    // ── Path matching ───────────────────────────────────────────────────────

    /// Exact match after normalization, or segment-wise with `:param`
    /// wildcards (`/api/bots/:id` matches `/api/bots/42`).
    pub fn path_matches(route_path: &str, request_path: &str) -> bool {
        let clean = normalize_path(request_path);

        if route_path == clean {
            return true;
        }

        let route_segs: Vec<&str> = route_path.split('/').collect();
        let path_segs: Vec<&str> = clean.split('/').collect();

        if route_segs.len() != path_segs.len() {
            return false;
        }

        route_segs
            .iter()
            .zip(path_segs.iter())
            .all(|(r, p)| (r.starts_with(':') && !p.is_empty()) || r == p)
    }

    // ── Static files ────────────────────────────────────────────────────────

    async fn try_serve_static(path: &str, state: &AppState) -> Result<Option<HttpResponse>> {
        let cacheable = path.starts_with("/static/");
        if !cacheable && path != "/favicon.ico" {
            return Ok(None);
        }
        if path.split('/').any(|seg| seg == "..") {
            warn!("Refusing traversal attempt: {}", path);
            return Ok(None);
        }

        let web_dir = state.config.read().await.paths.web_dir.clone();
        let file = Path::new(&web_dir).join(path.trim_start_matches('/'));

        deliver_file(&file, CacheStrategy::Long)
            .await
            .context("Failed to deliver static file")
    }
}

// ---------------------------------------------------------------------------
// Gate outcomes
// ---------------------------------------------------------------------------

/// The single navigation a page request gets when the gate says no.
fn navigate(decision: Decision, path: &str) -> Result<HttpResponse> {
    let target = decision
        .redirect_target()
        .ok_or_else(|| anyhow!("navigate called with {}", decision))?;
    info!("Gate: {} -> {} ({})", path, target, decision);
    deliver_redirect(target, None)
}

/// API callers get a status code instead of a redirect.
fn refuse(decision: Decision, path: &str) -> Result<HttpResponse> {
    let body = ErrorResponse::for_decision(decision)
        .ok_or_else(|| anyhow!("refuse called with {}", decision))?;
    let status = match decision {
        Decision::GotoPayment => StatusCode::PAYMENT_REQUIRED,
        _ => StatusCode::UNAUTHORIZED,
    };
    info!("Gate refused {} ({})", path, decision);
    deliver_serialized_json(&body, status)
}

// ---------------------------------------------------------------------------
// Route table
// ---------------------------------------------------------------------------
//
//   .get / .post        Open     handler gets (req, state)
//   .page               Page     gate decides on the page path
//   .post_identified    Ident.   handler gets (req, state, member)
//   .*_gated            Gated    handler gets (req, state, member)

pub fn build_router() -> Router {
    let router = PAGES.iter().fold(Router::new(), |r, page| r.page(*page));

    router
        // ── Open ─────────────────────────────────────────────────────────────
        .get("/health", |_req, _state| async move {
            deliver_serialized_json(
                &serde_json::json!({ "status": "success", "health": "ok" }),
                StatusCode::OK,
            )
        })
        .get("/api/config", |_req, state| async move {
            let latency_ms = state.config.read().await.session.latency_ms;
            let public_paths: Vec<&str> = state.gate.public_paths().collect();
            deliver_success_json(Some(serde_json::json!({
                "public_paths": public_paths,
                "latency_ms": latency_ms,
            })))
        })
        .get("/api/session", |req, state| async move {
            auth::handle_session_view(req, state)
                .await
                .context("Session view failed")
        })
        .post("/api/login", |req, state| async move {
            auth::handle_login(req, state).await.context("Login failed")
        })
        .post("/api/signup", |req, state| async move {
            auth::handle_signup(req, state).await.context("Signup failed")
        })
        .post("/api/logout", |req, state| async move {
            auth::handle_logout(req, state).await.context("Logout failed")
        })
        // ── Identified ───────────────────────────────────────────────────────
        .post_identified("/api/payments", |req, state, member| async move {
            auth::handle_payment(req, state, member)
                .await
                .context("Payment failed")
        })
        // ── Gated ────────────────────────────────────────────────────────────
        .get_gated("/api/dashboard", |req, state, member| async move {
            dashboard::handle_dashboard_stats(req, state, member)
                .await
                .context("Dashboard stats failed")
        })
        .get_gated("/api/profit", |req, state, member| async move {
            dashboard::handle_profit_series(req, state, member)
                .await
                .context("Profit series failed")
        })
        .get_gated("/api/bots", |req, state, member| async move {
            bots::handle_list_bots(req, state, member)
                .await
                .context("Bot list failed")
        })
        .post_gated("/api/bots", |req, state, member| async move {
            bots::handle_create_bot(req, state, member)
                .await
                .context("Bot create failed")
        })
        .post_gated("/api/bots/:id/:action", |req, state, member| async move {
            bots::handle_bot_action(req, state, member)
                .await
                .context("Bot action failed")
        })
        .delete_gated("/api/bots/:id", |req, state, member| async move {
            bots::handle_delete_bot(req, state, member)
                .await
                .context("Bot delete failed")
        })
        .get_gated("/api/wallets", |req, state, member| async move {
            wallets::handle_list_wallets(req, state, member)
                .await
                .context("Wallet list failed")
        })
        .post_gated("/api/wallets", |req, state, member| async move {
            wallets::handle_create_wallet(req, state, member)
                .await
                .context("Wallet create failed")
        })
        .delete_gated("/api/wallets/:address", |req, state, member| async move {
            wallets::handle_delete_wallet(req, state, member)
                .await
                .context("Wallet delete failed")
        })
        .get_gated("/api/launches", |req, state, member| async move {
            launches::handle_list_launches(req, state, member)
                .await
                .context("Launch list failed")
        })
        .post_gated("/api/launches", |req, state, member| async move {
            launches::handle_launch_token(req, state, member)
                .await
                .context("Token launch failed")
        })
}
