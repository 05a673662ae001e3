use std::future::Future;
use std::net::SocketAddr;
use std::time::{Duration, Instant};

use axum::extract::{ConnectInfo, MatchedPath, Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::api::errors::ApiError;
use crate::core::{cache, metrics, state::AppState};

const FORWARDED_FOR: &str = "x-forwarded-for";

/// Fixed-window request counter per client address.
pub(crate) async fn rate_limit(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let limits = state.settings().limits();
    let ip = client_ip(&request);

    let count = state
        .cache()
        .incr_in_window(
            &cache::rate_limit_key(&ip),
            Duration::from_secs(limits.rate_limit_window_seconds),
        )
        .await
        .map_err(|e| ApiError::internal(e, "Rate limiter unavailable"))?;

    if count > limits.rate_limit_requests {
        tracing::warn!(client_ip = %ip, count, "Rate limit exceeded");
        return Err(ApiError::TooManyRequests("Too many requests, try again later"));
    }

    Ok(next.run(request).await)
}

/// First hop of `X-Forwarded-For`, else the socket peer.
pub(crate) fn client_ip(request: &Request) -> String {
    let forwarded = request
        .headers()
        .get(FORWARDED_FOR)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|value| !value.is_empty());

    if let Some(ip) = forwarded {
        return ip.to_string();
    }

    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

pub(crate) async fn request_timeout(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let deadline = Duration::from_secs(state.settings().limits().request_timeout_seconds);
    run_with_deadline(deadline, next.run(request)).await
}

/// Runs the handler on its own task. Past the deadline the caller gets a 504
/// and the task is left to finish on its own; a panic becomes a 500.
pub(crate) async fn run_with_deadline<F>(deadline: Duration, handler: F) -> Response
where
    F: Future<Output = Response> + Send + 'static,
{
    let task = tokio::spawn(handler);

    match tokio::time::timeout(deadline, task).await {
        Ok(Ok(response)) => response,
        Ok(Err(join_error)) => {
            if join_error.is_panic() {
                tracing::error!("Request handler panicked");
            } else {
                tracing::error!(error = %join_error, "Request handler was cancelled");
            }
            ApiError::Internal("Internal server error".to_string()).into_response()
        }
        Err(_) => {
            tracing::warn!(deadline_ms = deadline.as_millis() as u64, "Request timed out");
            ApiError::GatewayTimeout("Request timed out").into_response()
        }
    }
}

pub(crate) async fn track_metrics(request: Request, next: Next) -> Response {
    let started = Instant::now();
    let path = request
        .extensions()
        .get::<MatchedPath>()
        .map(|matched| matched.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string());
    let method = request.method().clone();

    let response = next.run(request).await;

    metrics::record_request(method.as_str(), &path, response.status().as_u16(), started.elapsed());
    response
}
