use std::convert::Infallible;
use std::fmt;
use std::path::Path;

use anyhow::{Result, anyhow};
use bytes::Bytes;
use http::HeaderValue;
use http_body_util::{BodyExt, Full, combinators::BoxBody};
use hyper::{Response, StatusCode, header};
use tracing::{debug, info};

use crate::handlers::http::utils::headers;

/// The response type every handler produces.
pub type HttpResponse = Response<BoxBody<Bytes, Infallible>>;

#[derive(Debug, Clone, Copy)]
pub enum CacheStrategy {
    Long,  // 1 year
    Short, // 1 hour
    None,
}

impl fmt::Display for CacheStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheStrategy::Long => write!(f, "long (1 year)"),
            CacheStrategy::Short => write!(f, "short (1 hour)"),
            CacheStrategy::None => write!(f, "none"),
        }
    }
}

/// Read a file and deliver it, or `Ok(None)` when it does not exist.
pub async fn deliver_file(
    file_path: &Path,
    cache: CacheStrategy,
) -> Result<Option<HttpResponse>> {
    let content = match tokio::fs::read(file_path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!("No file at {}", file_path.display());
            return Ok(None);
        }
        Err(e) => {
            return Err(anyhow!("Failed to read {}: {}", file_path.display(), e));
        }
    };

    let mime_type = get_mime_type(file_path);
    debug!(
        "Delivering {} ({} bytes, {}, cache: {})",
        file_path.display(),
        content.len(),
        mime_type,
        cache
    );

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, mime_type)
        .body(full(content))
        .map_err(|e| anyhow!("Failed to build response: {}", e))?;

    Ok(Some(apply_cache(response, cache)))
}

/// Deliver an in-memory HTML document.
pub fn deliver_html(html: String) -> Result<HttpResponse> {
    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/html; charset=utf-8")
        .body(full(html))
        .map_err(|e| anyhow!("Failed to build HTML response: {}", e))?;

    Ok(headers::add_no_cache_headers(response))
}

fn apply_cache(response: HttpResponse, cache: CacheStrategy) -> HttpResponse {
    match cache {
        CacheStrategy::Long => headers::add_cache_headers_with_max_age(response, None),
        CacheStrategy::Short => headers::add_cache_headers_with_max_age(response, Some(3600)),
        CacheStrategy::None => headers::add_no_cache_headers(response),
    }
}

/// Helper function to determine MIME type from file extension
fn get_mime_type(path: &Path) -> &'static str {
    match path.extension().and_then(|s| s.to_str()) {
        Some("html") | Some("htm") => "text/html; charset=utf-8",
        Some("css") => "text/css; charset=utf-8",
        Some("js") | Some("mjs") => "application/javascript; charset=utf-8",
        Some("json") => "application/json",
        Some("map") => "application/json",

        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg+xml",
        Some("ico") => "image/x-icon",
        Some("webp") => "image/webp",

        Some("woff") => "font/woff",
        Some("woff2") => "font/woff2",
        Some("ttf") => "font/ttf",

        Some("txt") => "text/plain; charset=utf-8",

        _ => "application/octet-stream",
    }
}

/// 303 to `location`, optionally setting or clearing a cookie on the way.
/// Never cached: where a visitor is sent depends on their session.
pub fn deliver_redirect(location: &str, cookie: Option<HeaderValue>) -> Result<HttpResponse> {
    info!("Delivering redirect to: {}", location);

    let mut builder = Response::builder()
        .status(StatusCode::SEE_OTHER)
        .header(header::LOCATION, location);

    if let Some(c) = cookie {
        builder = builder.header(header::SET_COOKIE, c);
    }

    let response = builder
        .body(empty())
        .map_err(|e| anyhow!("Failed to build redirect response to {}: {}", location, e))?;

    Ok(headers::add_no_cache_headers(response))
}

/// Helper function to create an empty body
pub fn empty() -> BoxBody<Bytes, Infallible> {
    Full::new(Bytes::new()).boxed()
}

/// Helper function to create a full body from various types
pub fn full<T: Into<Bytes>>(chunk: T) -> BoxBody<Bytes, Infallible> {
    Full::new(chunk.into()).boxed()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn mime_types() {
        assert_eq!(get_mime_type(Path::new("a/b.css")), "text/css; charset=utf-8");
        assert_eq!(get_mime_type(Path::new("x.woff2")), "font/woff2");
        assert_eq!(get_mime_type(Path::new("noext")), "application/octet-stream");
    }

    #[test]
    fn redirect_is_303_and_uncached() {
        let res = deliver_redirect("/payments", None).unwrap();
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        assert_eq!(res.headers()[header::LOCATION], "/payments");
        assert!(
            res.headers()["cache-control"]
                .to_str()
                .unwrap()
                .contains("no-store")
        );
    }

    #[tokio::test]
    async fn missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let res = deliver_file(&dir.path().join("nope.js"), CacheStrategy::Long)
            .await
            .unwrap();
        assert!(res.is_none());
    }

    #[tokio::test]
    async fn existing_file_is_served_with_mime() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.js");
        std::fs::File::create(&path)
            .unwrap()
            .write_all(b"console.log(1)")
            .unwrap();

        let res = deliver_file(&path, CacheStrategy::Short)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(
            res.headers()[header::CONTENT_TYPE],
            "application/javascript; charset=utf-8"
        );
        assert_eq!(res.headers()["cache-control"], "public, max-age=3600");
    }
}
