//! HTTP Server

use std::{
    future::{self, Future},
    net::{Ipv4Addr, SocketAddr, TcpListener},
    time::Duration,
};

use anyhow::{Context, Result};
use axum::{
    extract::Request,
    routing::{get, post},
    Router,
};
use axum_server::Handle;
use clap::Parser;
use tokio::signal;
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};
use tracing::{debug, info, info_span, warn};

use crate::domain::communication::mailer::Mailer;

use self::{handlers::panic_handler, state::AppState};

pub mod errors;
pub mod handlers;
pub mod state;

/// How long in-flight requests may finish after shutdown starts
pub const DRAIN_PERIOD: Duration = Duration::from_secs(10);

/// Configuration for the HTTP server.
#[derive(Debug, Clone, PartialEq, Eq, Parser)]
pub struct HttpServerConfig {
    /// The port to listen on
    #[arg(long, env = "HTTP_PORT", default_value = "8080")]
    pub http_port: u16,
}

/// The application's HTTP server
#[derive(Debug)]
pub struct HttpServer {
    router: Router,
    listener: TcpListener,
}

impl HttpServer {
    /// Returns a new HTTP server bound to the port specified in `config`.
    pub fn new<M: Mailer>(config: &HttpServerConfig, state: AppState<M>) -> Result<Self> {
        let address = SocketAddr::from((Ipv4Addr::UNSPECIFIED, config.http_port));
        let listener = TcpListener::bind(address)
            .with_context(|| format!("failed to listen on {}", config.http_port))?;
        listener
            .set_nonblocking(true)
            .context("failed to configure listener")?;

        Ok(Self {
            router: router(state),
            listener,
        })
    }

    /// The address the server is bound to
    pub fn local_addr(&self) -> Result<SocketAddr> {
        self.listener
            .local_addr()
            .context("failed to get local address")
    }

    /// Serves requests until `shutdown` completes, then drains in-flight requests for up to
    /// [`DRAIN_PERIOD`].
    pub async fn run(self, shutdown: impl Future<Output = ()> + Send + 'static) -> Result<()> {
        info!(address = %self.local_addr()?, "serving notices");

        let handle = Handle::new();

        tokio::spawn({
            let handle = handle.clone();

            async move {
                shutdown.await;
                debug!(connections = handle.connection_count(), "draining connections");
                handle.graceful_shutdown(Some(DRAIN_PERIOD));
            }
        });

        axum_server::from_tcp(self.listener)
            .handle(handle)
            .serve(self.router.into_make_service())
            .await
            .context("server error")
    }
}

/// Create the application's router
pub fn router<M: Mailer>(state: AppState<M>) -> Router {
    let trace_layer = TraceLayer::new_for_http().make_span_with(|request: &Request<_>| {
        let uri = request.uri().to_string();
        info_span!("http_request", method = ?request.method(), uri)
    });

    Router::new()
        .route("/send", get(handlers::send::handler::<M>))
        .route("/send/wait", post(handlers::send::wait_handler::<M>))
        .layer(trace_layer)
        .layer(CatchPanicLayer::custom(panic_handler))
        .with_state(state)
}

/// Completes on Ctrl+C or SIGTERM.
///
/// A signal whose handler cannot be installed is logged and never fires.
#[mutants::skip]
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            warn!(error = %err, "cannot listen for Ctrl+C");
            future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                warn!(error = %err, "cannot listen for SIGTERM");
                future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received Ctrl+C"),
        _ = terminate => info!("received SIGTERM"),
    }
}
