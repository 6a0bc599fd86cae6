use crate::{create_router, AppState};
use anyhow::{Context, Result};
use fauxinnati_core::Settings;
use std::net::SocketAddr;
use tokio::signal;
use tracing::info;

pub struct Server {
    state: AppState,
    addr: SocketAddr,
}

impl Server {
    /// Resolves the configured bind address.
    pub async fn new(settings: Settings) -> Result<Self> {
        let bind = settings.bind_address();
        let addr = tokio::net::lookup_host(&bind)
            .await
            .with_context(|| format!("resolving bind address {bind}"))?
            .next()
            .with_context(|| format!("no address found for {bind}"))?;

        Ok(Self {
            state: AppState::new(settings),
            addr,
        })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub async fn run(self) -> Result<()> {
        let router = create_router(self.state);

        info!("Starting fauxinnati server on {}", self.addr);

        let listener = {
            let socket = if self.addr.is_ipv6() {
                tokio::net::TcpSocket::new_v6()
            } else {
                tokio::net::TcpSocket::new_v4()
            }
            .context("creating listener socket")?;

            // Reuse addr/port to improve rebind under restarts
            let _ = socket.set_reuseaddr(true);
            #[cfg(unix)]
            let _ = socket.set_reuseport(true);
            let _ = socket.set_keepalive(true);

            socket
                .bind(self.addr)
                .with_context(|| format!("binding {}", self.addr))?;
            socket.listen(1024).context("listening")?
        };

        info!("Server listening on http://{}", self.addr);
        info!("  GET /api/upgrades_info/graph?channel=<name>&version=<semver>[&arch=<arch>]");
        info!("  GET / - Landing page");
        info!("  GET /healthz, /readyz - Probes");

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .context("serving HTTP")?;

        info!("Server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut term) => {
                term.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down gracefully");
        },
        _ = terminate => {
            info!("Received SIGTERM, shutting down gracefully");
        },
    }
}
