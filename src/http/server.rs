//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum Router with the liveness and documentation routes
//! - Wire up middleware (tracing, request scope)
//! - Bind server to listener and drain on shutdown
//!
//! # Design Decisions
//! - Routes are collected bare and layered once, when the router is
//!   finished, so merged service routes run inside the request scope too

use axum::{middleware, Router};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::trace::TraceLayer;

use crate::assets;
use crate::config::ServiceConfig;
use crate::health;
use crate::http::request::{request_scope, RequestScope};
use crate::lifecycle::shutdown::shutdown_signal;
use crate::observability::Logger;

/// HTTP server for the service.
pub struct HttpServer {
    routes: Router,
    scope: RequestScope,
}

impl HttpServer {
    pub fn new(config: &ServiceConfig, logger: Logger) -> Self {
        Self::with_service_name(logger, &config.service_name)
    }

    fn with_service_name(logger: Logger, service_name: &str) -> Self {
        Self {
            routes: Router::new()
                .merge(health::router())
                .merge(assets::router()),
            scope: RequestScope::new(logger, service_name),
        }
    }

    /// Build the finished router with the built-in routes only.
    pub fn build_router(logger: Logger, service_name: &str) -> Router {
        Self::with_service_name(logger, service_name).router()
    }

    /// Extra routes served next to the built-in ones.
    pub fn merge(mut self, routes: Router) -> Self {
        self.routes = self.routes.merge(routes);
        self
    }

    /// All routes wrapped in the request scope and trace layers.
    pub fn router(&self) -> Router {
        self.routes
            .clone()
            .layer(middleware::from_fn_with_state(
                self.scope.clone(),
                request_scope,
            ))
            .layer(TraceLayer::new_for_http())
    }

    /// Run the server until Ctrl+C or `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");
        crate::infof!(self.scope.logger, "listening on {}", addr);

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal(shutdown))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
