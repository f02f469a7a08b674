//! Rate limit middleware layer.

use super::{
    store::{InMemoryStore, RateLimitResult, RateLimitStore},
    types::RateLimitConfig,
};
use crate::error::ApiError;
use axum::{
    body::Body,
    extract::{ConnectInfo, Request},
    http::{HeaderMap, HeaderName, HeaderValue, Response},
    response::IntoResponse,
};
use futures::future::BoxFuture;
use std::{
    net::SocketAddr,
    sync::Arc,
    task::{Context, Poll},
    time::Duration,
};
use tower::{Layer, Service};
use tracing::warn;

static LIMIT: HeaderName = HeaderName::from_static("x-ratelimit-limit");
static REMAINING: HeaderName = HeaderName::from_static("x-ratelimit-remaining");
static RESET: HeaderName = HeaderName::from_static("x-ratelimit-reset");

/// Rate limit layer. Every service produced by one layer shares its store.
///
/// Clients are keyed by the socket peer address. Forwarding headers are only
/// read when [`RateLimitLayer::trust_forwarded`] is set, since any client can
/// write them.
#[derive(Clone)]
pub struct RateLimitLayer {
    store: Arc<dyn RateLimitStore>,
    config: RateLimitConfig,
    trust_forwarded: bool,
}

impl RateLimitLayer {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            store: Arc::new(InMemoryStore::new()),
            config: RateLimitConfig::new(max_requests, window),
            trust_forwarded: false,
        }
    }

    /// Key on `x-forwarded-for` / `x-real-ip`. Only for deployments behind a
    /// proxy that overwrites those headers.
    pub fn trust_forwarded(mut self, trust: bool) -> Self {
        self.trust_forwarded = trust;
        self
    }
}

impl<S> Layer<S> for RateLimitLayer {
    type Service = RateLimitMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RateLimitMiddleware {
            inner,
            store: self.store.clone(),
            config: self.config.clone(),
            trust_forwarded: self.trust_forwarded,
        }
    }
}

#[derive(Clone)]
pub struct RateLimitMiddleware<S> {
    inner: S,
    store: Arc<dyn RateLimitStore>,
    config: RateLimitConfig,
    trust_forwarded: bool,
}

impl<S> Service<Request> for RateLimitMiddleware<S>
where
    S: Service<Request, Response = Response<Body>, Error = std::convert::Infallible>
        + Clone
        + Send
        + 'static,
    S::Future: Send + 'static,
{
    type Response = Response<Body>;
    type Error = std::convert::Infallible;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request) -> Self::Future {
        let store = self.store.clone();
        let config = self.config.clone();
        let trust_forwarded = self.trust_forwarded;
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        Box::pin(async move {
            let key = client_ip(&req, trust_forwarded);
            let result = store.check_and_consume(&key, &config).await;

            if !result.allowed {
                let retry_after = result
                    .retry_after
                    .map(|d| d.as_secs().max(1))
                    .unwrap_or(1);
                warn!(key = %key, path = %req.uri().path(), retry_after, "Rate limit exceeded");

                let mut response = ApiError::RateLimited { retry_after }.into_response();
                add_rate_limit_headers(response.headers_mut(), &result);
                return Ok(response);
            }

            let mut response = inner.call(req).await?;
            // A nested limiter closer to the route reports its own bucket.
            if !response.headers().contains_key(&LIMIT) {
                add_rate_limit_headers(response.headers_mut(), &result);
            }
            Ok(response)
        })
    }
}

fn add_rate_limit_headers(headers: &mut HeaderMap, result: &RateLimitResult) {
    headers.insert(LIMIT.clone(), HeaderValue::from(result.limit));
    headers.insert(REMAINING.clone(), HeaderValue::from(result.remaining));
    headers.insert(RESET.clone(), HeaderValue::from(result.reset_after.as_secs()));
}

fn client_ip(req: &Request, trust_forwarded: bool) -> String {
    let forwarded = trust_forwarded
        .then(|| forwarded_ip(req.headers()))
        .flatten();

    forwarded
        .or_else(|| {
            req.extensions()
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ConnectInfo(addr)| addr.ip().to_string())
        })
        .unwrap_or_else(|| "unknown".to_string())
}

fn forwarded_ip(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.split(',').next())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .or_else(|| {
            headers
                .get("x-real-ip")
                .and_then(|v| v.to_str().ok())
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        })
}
