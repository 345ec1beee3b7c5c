use bytes::Bytes;
use hyper::Request;
use serde::de::DeserializeOwned;

/// Decode the JSON body of an already-collected request.
pub fn parse_json<T: DeserializeOwned>(req: &Request<Bytes>) -> Result<T, serde_json::Error> {
    serde_json::from_slice(req.body())
}

/// First value of `name` in the query string.
pub fn query_param<B>(req: &Request<B>, name: &str) -> Option<String> {
    let query = req.uri().query()?;
    form_urlencoded::parse(query.as_bytes())
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.into_owned())
}

/// The `n`th `/`-separated segment of the path, `0` being the one after the
/// leading slash. `/api/bots/7/start` has `bots` at 1 and `7` at 2.
pub fn path_segment<B>(req: &Request<B>, n: usize) -> Option<String> {
    req.uri()
        .path()
        .trim_start_matches('/')
        .split('/')
        .nth(n)
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
}
