//! ServerBuilder for fluent API to build HTTP servers

use super::handlers::AppState;
use super::router::{build_health_routes, build_order_routes};
use crate::store::SheetStore;
use anyhow::Result;
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

/// Builder for the HTTP exposure of a [`SheetStore`]
///
/// # Example
///
/// ```ignore
/// let store = Arc::new(SheetStore::from_config(config).await);
/// ServerBuilder::new(store)
///     .serve("127.0.0.1:3000")
///     .await?;
/// ```
pub struct ServerBuilder {
    store: Arc<SheetStore>,
    custom_routes: Vec<Router>,
}

impl ServerBuilder {
    /// Create a builder serving the given store
    pub fn new(store: Arc<SheetStore>) -> Self {
        Self {
            store,
            custom_routes: Vec::new(),
        }
    }

    /// Add custom routes to the server
    ///
    /// Custom routes are merged after the built-in ones and share the same
    /// tracing layer.
    pub fn with_custom_routes(mut self, routes: Router) -> Self {
        self.custom_routes.push(routes);
        self
    }

    /// Build the router with health and order routes
    pub fn build(self) -> Router {
        let state = AppState::new(self.store);

        let mut app = build_health_routes(state.clone()).merge(build_order_routes(state));
        for custom in self.custom_routes {
            app = app.merge(custom);
        }

        app.layer(TraceLayer::new_for_http())
    }

    /// Serve the application with graceful shutdown
    ///
    /// This will:
    /// - Bind to the provided address
    /// - Start serving requests
    /// - Stop on SIGTERM or Ctrl+C once in-flight requests finish
    pub async fn serve(self, addr: &str) -> Result<()> {
        let mode = self.store.mode();
        let app = self.build();
        let listener = TcpListener::bind(addr).await?;

        tracing::info!(addr, ?mode, "Server listening");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }
}

/// Resolve when the process is asked to stop
///
/// A signal handler that cannot be installed never resolves, leaving the
/// other one in charge.
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM signal, initiating graceful shutdown...");
        },
    }
}
