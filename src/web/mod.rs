//! Web endpoint service unit.
//!
//! # Responsibilities
//! - Build the Axum router (health/status handlers, request id, tracing, timeout)
//! - Bind plain TCP or TLS and serve until stopped
//! - Graceful shutdown on `stop()`
//!
//! `start()` returns only after the server has stopped serving, so the
//! keeper's in-flight count covers the whole serving lifetime.

pub mod handlers;

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use axum::{routing::get, Router};
use tokio::net::TcpListener;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::{EndpointConfig, TlsConfig};
use crate::lifecycle::shutdown::Shutdown;
use crate::net::tls;
use crate::service::{ServiceError, ServiceUnit};

use self::handlers::WebState;

/// An HTTP endpoint managed by the keeper.
pub struct WebEndpoint {
    config: EndpointConfig,
    shutdown: Shutdown,
    started: AtomicBool,
    local_addr: OnceLock<SocketAddr>,
}

impl WebEndpoint {
    pub fn new(config: EndpointConfig) -> Self {
        Self {
            config,
            shutdown: Shutdown::new(),
            started: AtomicBool::new(false),
            local_addr: OnceLock::new(),
        }
    }

    /// Address actually bound, once the endpoint is listening.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr.get().copied()
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn router(&self) -> Router {
        let state = WebState {
            name: Arc::from(self.config.name.as_str()),
            started_at: Instant::now(),
        };

        Router::new()
            .route("/health", get(handlers::health))
            .route("/status", get(handlers::status))
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(self.config.request_timeout_secs)))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    fn bind_error(addr: impl ToString, source: std::io::Error) -> ServiceError {
        ServiceError::Bind {
            address: addr.to_string(),
            source,
        }
    }

    async fn serve_plain(&self, addr: SocketAddr, app: Router) -> Result<(), ServiceError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| Self::bind_error(addr, e))?;
        let local = listener.local_addr().map_err(ServiceError::Serve)?;
        let _ = self.local_addr.set(local);

        tracing::info!(address = %local, "Web endpoint listening");

        axum::serve(listener, app)
            .with_graceful_shutdown(self.shutdown.subscribe().wait())
            .await
            .map_err(ServiceError::Serve)
    }

    async fn serve_tls(
        &self,
        addr: SocketAddr,
        app: Router,
        tls_config: &TlsConfig,
    ) -> Result<(), ServiceError> {
        let rustls = tls::load_from_config(tls_config)
            .await
            .map_err(ServiceError::Tls)?;

        let listener = std::net::TcpListener::bind(addr).map_err(|e| Self::bind_error(addr, e))?;
        listener.set_nonblocking(true).map_err(ServiceError::Serve)?;
        let local = listener.local_addr().map_err(ServiceError::Serve)?;
        let _ = self.local_addr.set(local);

        let handle = axum_server::Handle::new();
        let stopped = self.shutdown.subscribe();

        tracing::info!(address = %local, "Web endpoint listening (TLS)");

        let server = axum_server::from_tcp_rustls(listener, rustls)
            .handle(handle.clone())
            .serve(app.into_make_service());
        tokio::pin!(server);

        // The stop watcher lives only as long as the server future.
        tokio::select! {
            res = &mut server => return res.map_err(ServiceError::Serve),
            _ = stopped.wait() => handle.graceful_shutdown(None),
        }

        server
            .await
            .map_err(ServiceError::Serve)
    }
}

#[async_trait]
impl ServiceUnit for WebEndpoint {
    fn name(&self) -> &str {
        &self.config.name
    }

    async fn start(&self) -> Result<(), ServiceError> {
        if self.started.swap(true, Ordering::SeqCst) {
            return Err(ServiceError::AlreadyStarted);
        }
        if self.shutdown.is_triggered() {
            tracing::info!(endpoint = %self.config.name, "Stop requested before start, not serving");
            return Ok(());
        }

        let addr: SocketAddr = self.config.bind_address.parse().map_err(|e| {
            Self::bind_error(
                &self.config.bind_address,
                std::io::Error::new(std::io::ErrorKind::InvalidInput, e),
            )
        })?;

        let app = self.router();
        match &self.config.tls {
            Some(tls_config) => self.serve_tls(addr, app, tls_config).await?,
            None => self.serve_plain(addr, app).await?,
        }

        tracing::info!(endpoint = %self.config.name, "Web endpoint stopped serving");
        Ok(())
    }

    async fn stop(&self) -> Result<(), ServiceError> {
        tracing::info!(endpoint = %self.config.name, "Web endpoint shutting down");
        self.shutdown.trigger();
        Ok(())
    }
}
