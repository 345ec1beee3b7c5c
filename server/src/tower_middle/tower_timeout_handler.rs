use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use bytes::Bytes;
use hyper::{Request, Response, StatusCode, header};
use tokio::time;
use tower::{Layer, Service};

use crate::handlers::http::utils::{HttpResponse, full};

/// Tower layer for request timeouts
///
/// If the inner service does not respond within the configured
/// duration, a 408 JSON envelope is returned instead.
#[derive(Debug, Clone)]
pub struct TimeoutLayer {
    duration: Duration,
}

impl TimeoutLayer {
    pub fn new(duration: Duration) -> Self {
        Self { duration }
    }
}

impl<S> Layer<S> for TimeoutLayer {
    type Service = TimeoutService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        TimeoutService {
            inner,
            duration: self.duration,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TimeoutService<S> {
    inner: S,
    duration: Duration,
}

impl<S, ReqBody> Service<Request<ReqBody>> for TimeoutService<S>
where
    S: Service<Request<ReqBody>, Response = HttpResponse> + Clone + Send + 'static,
    S::Future: Send + 'static,
    ReqBody: Send + 'static,
{
    type Response = HttpResponse;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<ReqBody>) -> Self::Future {
        let duration = self.duration;
        let path = req.uri().path().to_string();
        let fut = self.inner.call(req);

        Box::pin(async move {
            match time::timeout(duration, fut).await {
                Ok(result) => result,
                Err(_) => {
                    tracing::warn!("{} timed out after {:?}", path, duration);
                    Ok(timeout_response())
                }
            }
        })
    }
}

fn timeout_response() -> HttpResponse {
    let body = Bytes::from_static(
        br#"{"status":"error","code":"REQUEST_TIMEOUT","message":"Request timed out"}"#,
    );
    let mut res = Response::new(full(body));
    *res.status_mut() = StatusCode::REQUEST_TIMEOUT;
    res.headers_mut().insert(
        header::CONTENT_TYPE,
        header::HeaderValue::from_static("application/json"),
    );
    res
}
