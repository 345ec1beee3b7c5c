//! End-to-end behaviour of the router: every request goes through
//! `Router::dispatch` against an in-memory session store.
use bytes::Bytes;
use http_body_util::BodyExt;
use hyper::{Method, Request, StatusCode, header};
use serde_json::{Value, json};

use server::store::SessionStore;
use server::{AppState, Router, build_router};
use shared::types::AppConfig;

struct Harness {
    router: Router,
    state: AppState,
    _web_dir: tempfile::TempDir,
}

struct Reply {
    status: StatusCode,
    location: Option<String>,
    cookie: Option<String>,
    body: Bytes,
}

impl Reply {
    fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap()
    }
}

impl Harness {
    fn new() -> Self {
        Self::with_config(|_| {})
    }

    fn with_config(tweak: impl FnOnce(&mut AppConfig)) -> Self {
        let web_dir = tempfile::tempdir().unwrap();
        let mut config = AppConfig::default();
        config.paths.web_dir = web_dir.path().to_string_lossy().into_owned();
        config.session.latency_ms = 0;
        tweak(&mut config);

        Self {
            router: build_router(),
            state: AppState::new(config),
            _web_dir: web_dir,
        }
    }

    async fn send(&self, method: Method, uri: &str, sid: Option<&str>, body: Option<Value>) -> Reply {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(sid) = sid {
            builder = builder.header(header::COOKIE, format!("sid={}", sid));
        }
        let body = body.map(|b| Bytes::from(b.to_string())).unwrap_or_default();
        let req = builder.body(body).unwrap();

        let res = self.router.dispatch(req, self.state.clone()).await;
        let status = res.status();
        let location = res
            .headers()
            .get(header::LOCATION)
            .map(|v| v.to_str().unwrap().to_string());
        let cookie = res.headers().get(header::SET_COOKIE).map(|v| {
            let raw = v.to_str().unwrap();
            let pair = raw.split(';').next().unwrap();
            pair.split_once('=').unwrap().1.to_string()
        });
        let body = res.into_body().collect().await.unwrap().to_bytes();

        Reply {
            status,
            location,
            cookie,
            body,
        }
    }

    async fn get(&self, uri: &str, sid: Option<&str>) -> Reply {
        self.send(Method::GET, uri, sid, None).await
    }

    async fn login(&self) -> String {
        let reply = self
            .send(
                Method::POST,
                "/api/login",
                None,
                Some(json!({"username": "alice", "password": "pw"})),
            )
            .await;
        assert_eq!(reply.status, StatusCode::OK);
        reply.cookie.expect("login sets a session cookie")
    }

    async fn login_and_pay(&self) -> String {
        let sid = self.login().await;
        let reply = self.send(Method::POST, "/api/payments", Some(&sid), None).await;
        assert_eq!(reply.status, StatusCode::OK);
        sid
    }
}

// ---------------------------------------------------------------------------
// Page navigation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn anonymous_dashboard_redirects_home_once() {
    let h = Harness::new();
    let reply = h.get("/dashboard", None).await;
    assert_eq!(reply.status, StatusCode::SEE_OTHER);
    assert_eq!(reply.location.as_deref(), Some("/"));

    let landing = h.get("/", None).await;
    assert_eq!(landing.status, StatusCode::OK);
}

#[tokio::test]
async fn public_pages_are_served_to_anyone() {
    let h = Harness::new();
    for path in ["/", "/signup", "/payments", "/signup?ref=x"] {
        assert_eq!(h.get(path, None).await.status, StatusCode::OK, "{}", path);
    }
}

#[tokio::test]
async fn logged_in_but_unpaid_goes_to_payment() {
    let h = Harness::new();
    let sid = h.login().await;

    let reply = h.get("/wallets", Some(&sid)).await;
    assert_eq!(reply.status, StatusCode::SEE_OTHER);
    assert_eq!(reply.location.as_deref(), Some("/payments"));

    assert_eq!(h.get("/payments", Some(&sid)).await.status, StatusCode::OK);
}

#[tokio::test]
async fn payment_unlocks_every_gated_page() {
    let h = Harness::new();
    let sid = h.login_and_pay().await;

    for path in [
        "/dashboard",
        "/volume-bot",
        "/trade-bot",
        "/snipe-bot",
        "/copy-trade-bot",
        "/coin-launch",
        "/wallets",
        "/settings",
        "/create-bot",
    ] {
        let reply = h.get(path, Some(&sid)).await;
        assert_eq!(reply.status, StatusCode::OK, "{}", path);
        assert!(reply.location.is_none());
    }
}

#[tokio::test]
async fn logout_locks_the_dashboard_again() {
    let h = Harness::new();
    let sid = h.login_and_pay().await;

    let reply = h.send(Method::POST, "/api/logout", Some(&sid), None).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.cookie.as_deref(), Some(""));

    let reply = h.get("/dashboard", Some(&sid)).await;
    assert_eq!(reply.location.as_deref(), Some("/"));
}

#[tokio::test]
async fn logout_drops_the_portfolio() {
    let h = Harness::new();
    for _ in 0..5 {
        let sid = h.login_and_pay().await;
        assert_eq!(h.get("/api/bots", Some(&sid)).await.status, StatusCode::OK);
        assert_eq!(h.state.portfolios.len().await, 1);

        h.send(Method::POST, "/api/logout", Some(&sid), None).await;
        assert_eq!(h.state.portfolios.len().await, 0);
    }
}

#[tokio::test]
async fn relogin_drops_the_previous_portfolio() {
    let h = Harness::new();
    let old = h.login_and_pay().await;
    h.get("/api/bots", Some(&old)).await;

    let new = h
        .send(
            Method::POST,
            "/api/login",
            Some(&old),
            Some(json!({"username": "alice", "password": "pw"})),
        )
        .await
        .cookie
        .unwrap();
    assert_eq!(h.state.portfolios.len().await, 0);

    h.send(Method::POST, "/api/payments", Some(&new), None).await;
    h.get("/api/bots", Some(&new)).await;
    assert_eq!(h.state.portfolios.len().await, 1);
}

#[tokio::test]
async fn corrupted_session_blob_counts_as_anonymous() {
    let h = Harness::new();
    h.state.sessions.write("broken", "{\"identity\":".to_string());

    let reply = h.get("/dashboard", Some("broken")).await;
    assert_eq!(reply.location.as_deref(), Some("/"));
}

#[tokio::test]
async fn bare_identity_blob_counts_as_logged_in() {
    let h = Harness::new();
    h.state
        .sessions
        .write("legacy", r#"{"identity":"u1"}"#.to_string());

    let reply = h.get("/dashboard", Some("legacy")).await;
    assert_eq!(reply.location.as_deref(), Some("/payments"));
}

#[tokio::test]
async fn unknown_paths_are_protected() {
    let h = Harness::new();
    let reply = h.get("/no-such-page", None).await;
    assert_eq!(reply.location.as_deref(), Some("/"));

    let sid = h.login_and_pay().await;
    let reply = h.get("/no-such-page", Some(&sid)).await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);
    assert_eq!(reply.json()["code"], "NOT_FOUND");
}

#[tokio::test]
async fn configured_extra_paths_are_public() {
    let h = Harness::with_config(|c| c.session.extra_public_paths = vec!["/about".into()]);
    let reply = h.get("/about", None).await;
    assert!(reply.location.is_none());
    assert_eq!(reply.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn static_files_are_served_from_web_dir() {
    let h = Harness::new();
    let dir = h.state.config.read().await.paths.web_dir.clone();
    std::fs::create_dir_all(format!("{}/static", dir)).unwrap();
    std::fs::write(format!("{}/static/app.css", dir), "body{}").unwrap();

    let reply = h.get("/static/app.css", None).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(&reply.body[..], b"body{}");

    let reply = h.get("/static/../secret", None).await;
    assert_ne!(reply.status, StatusCode::OK);
}

// ---------------------------------------------------------------------------
// API refusals
// ---------------------------------------------------------------------------

#[tokio::test]
async fn api_refusals_use_status_codes_not_redirects() {
    let h = Harness::new();

    let reply = h.get("/api/bots", None).await;
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
    assert_eq!(reply.json()["code"], "UNAUTHORIZED");
    assert!(reply.location.is_none());

    let sid = h.login().await;
    let reply = h.get("/api/bots", Some(&sid)).await;
    assert_eq!(reply.status, StatusCode::PAYMENT_REQUIRED);
    assert_eq!(reply.json()["code"], "PAYMENT_REQUIRED");
}

#[tokio::test]
async fn payment_requires_identity() {
    let h = Harness::new();
    let reply = h.send(Method::POST, "/api/payments", None, None).await;
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
}

// ---------------------------------------------------------------------------
// Auth flows
// ---------------------------------------------------------------------------

#[tokio::test]
async fn login_response_and_session_view() {
    let h = Harness::new();
    let reply = h
        .send(
            Method::POST,
            "/api/login",
            None,
            Some(json!({"email": "bob@example.com", "password": "x"})),
        )
        .await;
    let json = reply.json();
    assert_eq!(json["status"], "success");
    assert_eq!(json["redirect"], "/dashboard");
    assert!(json["user_id"].as_str().unwrap().starts_with("user-"));

    let sid = reply.cookie.unwrap();
    let view = h.get("/api/session", Some(&sid)).await.json();
    assert_eq!(view["data"]["logged_in"], true);
    assert_eq!(view["data"]["paid"], false);
    assert_eq!(view["data"]["username"], "bob@example.com");
}

#[tokio::test]
async fn login_rejects_blank_credentials() {
    let h = Harness::new();
    let reply = h
        .send(
            Method::POST,
            "/api/login",
            None,
            Some(json!({"username": "", "password": "x"})),
        )
        .await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.json()["code"], "MISSING_CREDENTIALS");
    assert!(reply.cookie.is_none());
}

#[tokio::test]
async fn signup_requires_matching_passwords() {
    let h = Harness::new();
    let reply = h
        .send(
            Method::POST,
            "/api/signup",
            None,
            Some(json!({"username": "a", "password": "1", "confirm_password": "2"})),
        )
        .await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.json()["code"], "PASSWORD_MISMATCH");

    let reply = h
        .send(
            Method::POST,
            "/api/signup",
            None,
            Some(json!({"username": "a", "password": "1", "confirm_password": "1"})),
        )
        .await;
    assert_eq!(reply.status, StatusCode::OK);
    assert!(reply.cookie.is_some());
}

#[tokio::test]
async fn relogin_starts_unpaid_and_drops_old_key() {
    let h = Harness::new();
    let old = h.login_and_pay().await;

    let reply = h
        .send(
            Method::POST,
            "/api/login",
            Some(&old),
            Some(json!({"username": "alice", "password": "pw"})),
        )
        .await;
    let new = reply.cookie.unwrap();
    assert_ne!(old, new);
    assert!(h.state.sessions.read(&old).is_none());

    let reply = h.get("/dashboard", Some(&new)).await;
    assert_eq!(reply.location.as_deref(), Some("/payments"));
}

#[tokio::test]
async fn payment_response_reports_price() {
    let h = Harness::new();
    let sid = h.login().await;
    let reply = h
        .send(Method::POST, "/api/payments", Some(&sid), Some(json!({"plan": "lifetime"})))
        .await;
    let json = reply.json();
    assert_eq!(json["price_sol"], 10);
    assert_eq!(json["redirect"], "/dashboard");
}

// ---------------------------------------------------------------------------
// Gated APIs
// ---------------------------------------------------------------------------

#[tokio::test]
async fn new_portfolio_is_seeded() {
    let h = Harness::new();
    let sid = h.login_and_pay().await;

    let bots = h.get("/api/bots", Some(&sid)).await.json();
    assert_eq!(bots["data"].as_array().unwrap().len(), 4);

    let stats = h.get("/api/dashboard", Some(&sid)).await.json();
    assert_eq!(stats["data"]["total_bots"], 4);
    assert_eq!(stats["data"]["active_bots"], 2);

    let wallets = h.get("/api/wallets", Some(&sid)).await.json();
    assert_eq!(wallets["data"][0]["label"], "Main Wallet");
}

#[tokio::test]
async fn bot_lifecycle_over_http() {
    let h = Harness::new();
    let sid = h.login_and_pay().await;

    let created = h
        .send(
            Method::POST,
            "/api/bots",
            Some(&sid),
            Some(json!({"name": "Sniper 2", "type": "snipe", "trading_pair": "WIF/USDC"})),
        )
        .await;
    assert_eq!(created.status, StatusCode::OK);
    let bot = &created.json()["bot"];
    assert_eq!(bot["config"]["type"], "snipe");
    assert_eq!(bot["config"]["target_token"], "WIF");
    let id = bot["id"].as_str().unwrap().to_string();

    let paused = h
        .send(Method::POST, &format!("/api/bots/{}/pause", id), Some(&sid), None)
        .await;
    assert_eq!(paused.json()["bot"]["status"], "paused");

    let bad = h
        .send(Method::POST, &format!("/api/bots/{}/explode", id), Some(&sid), None)
        .await;
    assert_eq!(bad.status, StatusCode::BAD_REQUEST);
    assert_eq!(bad.json()["code"], "UNKNOWN_ACTION");

    let deleted = h
        .send(Method::DELETE, &format!("/api/bots/{}", id), Some(&sid), None)
        .await;
    assert_eq!(deleted.status, StatusCode::OK);

    let gone = h
        .send(Method::DELETE, &format!("/api/bots/{}", id), Some(&sid), None)
        .await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn invalid_bot_form_is_rejected() {
    let h = Harness::new();
    let sid = h.login_and_pay().await;
    let reply = h
        .send(
            Method::POST,
            "/api/bots",
            Some(&sid),
            Some(json!({"name": "x", "type": "volume", "trading_pair": "SOL/USDC", "stop_loss": 90})),
        )
        .await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.json()["code"], "INVALID_LIMITS");
}

#[tokio::test]
async fn developer_wallet_is_unique_unless_replaced() {
    let h = Harness::new();
    let sid = h.login_and_pay().await;
    let dev = json!({"kind": "developer"});

    let first = h.send(Method::POST, "/api/wallets", Some(&sid), Some(dev.clone())).await;
    assert_eq!(first.status, StatusCode::OK);

    let second = h.send(Method::POST, "/api/wallets", Some(&sid), Some(dev)).await;
    assert_eq!(second.status, StatusCode::CONFLICT);
    assert_eq!(second.json()["code"], "DEV_WALLET_EXISTS");

    let replaced = h
        .send(
            Method::POST,
            "/api/wallets",
            Some(&sid),
            Some(json!({"kind": "developer", "replace": true})),
        )
        .await;
    assert_eq!(replaced.status, StatusCode::OK);

    let wallets = h.get("/api/wallets", Some(&sid)).await.json();
    let devs = wallets["data"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|w| w["kind"] == "developer")
        .count();
    assert_eq!(devs, 1);
}

#[tokio::test]
async fn portfolios_are_per_identity() {
    let h = Harness::new();
    let a = h.login_and_pay().await;
    let b = h.login_and_pay().await;

    h.send(Method::DELETE, "/api/bots/1", Some(&a), None).await;

    let a_bots = h.get("/api/bots", Some(&a)).await.json();
    let b_bots = h.get("/api/bots", Some(&b)).await.json();
    assert_eq!(a_bots["data"].as_array().unwrap().len(), 3);
    assert_eq!(b_bots["data"].as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn profit_series_by_range() {
    let h = Harness::new();
    let sid = h.login_and_pay().await;

    let daily = h.get("/api/profit", Some(&sid)).await.json();
    assert_eq!(daily["data"]["range"], "daily");
    assert_eq!(daily["data"]["points"].as_array().unwrap().len(), 24);

    let weekly = h.get("/api/profit?range=weekly", Some(&sid)).await.json();
    assert_eq!(weekly["data"]["points"].as_array().unwrap().len(), 7);

    let bad = h.get("/api/profit?range=yearly", Some(&sid)).await;
    assert_eq!(bad.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn token_launch_is_recorded() {
    let h = Harness::new();
    let sid = h.login_and_pay().await;

    let reply = h
        .send(
            Method::POST,
            "/api/launches",
            Some(&sid),
            Some(json!({"name": "Moon", "symbol": "moon", "total_supply": 1000000, "initial_price": 0.001})),
        )
        .await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.json()["token"]["symbol"], "MOON");
    assert_eq!(reply.json()["token"]["status"], "pending");

    let history = h.get("/api/launches", Some(&sid)).await.json();
    assert_eq!(history["data"].as_array().unwrap().len(), 1);

    let bad = h
        .send(
            Method::POST,
            "/api/launches",
            Some(&sid),
            Some(json!({"name": "X", "symbol": "X", "total_supply": 0, "initial_price": 1.0})),
        )
        .await;
    assert_eq!(bad.json()["code"], "INVALID_SUPPLY");
}

// ---------------------------------------------------------------------------
// Utility endpoints
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_and_public_config() {
    let h = Harness::new();
    assert_eq!(h.get("/health", None).await.json()["health"], "ok");

    let cfg = h.get("/api/config", None).await.json();
    let paths: Vec<&str> = cfg["data"]["public_paths"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap())
        .collect();
    assert!(paths.contains(&"/"));
    assert!(paths.contains(&"/signup"));
    assert!(paths.contains(&"/payments"));
    assert_eq!(cfg["data"]["latency_ms"], 0);
}

#[tokio::test]
async fn oversized_body_is_rejected_before_dispatch() {
    let h = Harness::new();
    let big = vec![b'a'; server::handlers::http::routes::MAX_BODY_BYTES + 1];
    let req = Request::builder()
        .method(Method::POST)
        .uri("/api/login")
        .body(http_body_util::Full::new(Bytes::from(big)))
        .unwrap();
    let res = h.router.handle(req, h.state.clone()).await;
    assert_eq!(res.status(), StatusCode::PAYLOAD_TOO_LARGE);
}
