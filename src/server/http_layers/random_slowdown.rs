//! Random slowdown middleware for testing
#![allow(dead_code)] // Feature-gated middleware

use axum::body::Body;
use axum::extract::Request;
use axum::middleware::Next;
use axum::response::IntoResponse;
use rand::Rng;
use std::time::Duration;
use tracing::debug;

const MAX_SLOWDOWN_MS: u64 = 3000;

/// Middleware that delays each request by a uniformly random time of up to
/// three seconds, to exercise the client's pending state.
pub async fn slowdown_request(request: Request<Body>, next: Next) -> impl IntoResponse {
    let delay = Duration::from_millis(rand::rng().random_range(0..=MAX_SLOWDOWN_MS));
    debug!("Slowing down {} by {:?}", request.uri().path(), delay);

    tokio::time::sleep(delay).await;
    next.run(request).await
}
