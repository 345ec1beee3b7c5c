use std::path::Path;

use anyhow::{Context, Result};
use tracing::debug;

use crate::AppState;
use crate::handlers::http::utils::{CacheStrategy, HttpResponse, deliver_file, deliver_html};

/// A routed HTML page: URL path, file stem under `web_dir`, title.
#[derive(Debug, Clone, Copy)]
pub struct Page {
    pub path: &'static str,
    pub stem: &'static str,
    pub title: &'static str,
}

pub const PAGES: [Page; 12] = [
    Page { path: "/", stem: "index", title: "Welcome" },
    Page { path: "/signup", stem: "signup", title: "Sign up" },
    Page { path: "/payments", stem: "payments", title: "Lifetime access" },
    Page { path: "/dashboard", stem: "dashboard", title: "Dashboard" },
    Page { path: "/volume-bot", stem: "volume-bot", title: "Volume bots" },
    Page { path: "/trade-bot", stem: "trade-bot", title: "Trade bots" },
    Page { path: "/snipe-bot", stem: "snipe-bot", title: "Snipe bots" },
    Page { path: "/copy-trade-bot", stem: "copy-trade-bot", title: "Copy-trade bots" },
    Page { path: "/coin-launch", stem: "coin-launch", title: "Coin launch" },
    Page { path: "/wallets", stem: "wallets", title: "Wallets" },
    Page { path: "/settings", stem: "settings", title: "Settings" },
    Page { path: "/create-bot", stem: "create-bot", title: "Create bot" },
];

/// Serve `<web_dir>/<stem>.html`, or a bare shell when the file is missing.
pub async fn deliver_page_shell(page: Page, state: &AppState) -> Result<HttpResponse> {
    let web_dir = state.config.read().await.paths.web_dir.clone();
    let file = Path::new(&web_dir).join(format!("{}.html", page.stem));

    if let Some(res) = deliver_file(&file, CacheStrategy::None)
        .await
        .with_context(|| format!("Failed to deliver page {}", page.path))?
    {
        return Ok(res);
    }

    debug!("Using built-in shell for {}", page.path);
    deliver_html(builtin_shell(page))
}

fn builtin_shell(page: Page) -> String {
    format!(
        r#"<!doctype html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>botdeck | {title}</title>
<link rel="stylesheet" href="/static/app.css">
</head>
<body data-page="{stem}">
<div id="app"></div>
<script type="module" src="/static/app.js"></script>
</body>
</html>
"#,
        title = page.title,
        stem = page.stem,
    )
}
