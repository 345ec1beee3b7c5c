use hyper::Request;

/// True when the request reached us over HTTPS.
///
/// Checks `X-Forwarded-Proto: https`, then `X-Forwarded-Ssl: on`, then an
/// absolute-form request URI. Plain HTTP dev servers get `false`.
pub fn is_https<B>(req: &Request<B>) -> bool {
    let header_is = |name: &str, expected: &str| {
        req.headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.eq_ignore_ascii_case(expected))
            .unwrap_or(false)
    };

    if header_is("x-forwarded-proto", "https") || header_is("x-forwarded-ssl", "on") {
        return true;
    }

    req.uri()
        .scheme()
        .map(|s| s.as_str() == "https")
        .unwrap_or(false)
}

/// True for paths the router answers with JSON rather than pages.
pub fn is_api_path(path: &str) -> bool {
    path == "/api" || path.starts_with("/api/")
}
