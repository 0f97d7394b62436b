//! Per-request logging scope.
//!
//! # Responsibilities
//! - Derive a scoped `Logger` for every request
//! - Tag it with a fresh internal transaction id and the caller's
//!   `x-transaction-id`, if any
//! - Record a `ProcessMetrics` sample when the response is ready
//!
//! # Design Decisions
//! - The scope travels in request extensions, handlers pull it out with
//!   the `RequestLogger` extractor
//! - Server errors (5xx) count as failures; client errors do not

use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Body,
    extract::{FromRequestParts, State},
    http::{request::Parts, Request, StatusCode},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::observability::fields::keys;
use crate::observability::Logger;

pub const X_TRANSACTION_ID: &str = "x-transaction-id";

/// Shared state of the scope middleware.
#[derive(Debug, Clone)]
pub struct RequestScope {
    pub logger: Logger,
    pub service_name: Arc<str>,
}

impl RequestScope {
    pub fn new(logger: Logger, service_name: impl Into<Arc<str>>) -> Self {
        Self {
            logger,
            service_name: service_name.into(),
        }
    }
}

/// The request's scoped logger.
#[derive(Debug, Clone)]
pub struct RequestLogger(pub Logger);

impl<S> FromRequestParts<S> for RequestLogger
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<RequestLogger>()
            .cloned()
            .ok_or((StatusCode::INTERNAL_SERVER_ERROR, "request scope missing"))
    }
}

/// Middleware attaching a [`RequestLogger`] to every request.
pub async fn request_scope(
    State(scope): State<RequestScope>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let start_time = Instant::now();

    let mut logger = scope.logger.scoped();
    logger.attach_field(keys::INTERNAL_TRANSACTION_ID, &Uuid::new_v4().to_string());
    if let Some(trx) = request
        .headers()
        .get(X_TRANSACTION_ID)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
    {
        logger.attach_field(keys::TRANSACTION_ID, trx);
    }

    let method = request.method().clone();
    let path = request.uri().path().to_owned();
    request.extensions_mut().insert(RequestLogger(logger.clone()));

    let response = next.run(request).await;
    let status = response.status();

    crate::debugf!(logger, "{} {} -> {}", method, path, status.as_u16());
    logger.process_metrics(
        &scope.service_name,
        !status.is_server_error(),
        start_time.elapsed(),
    );

    response
}
