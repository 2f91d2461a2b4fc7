//! Serving the HTTP API.

use std::future::Future;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info};

use crate::alert::{Alert, AlertLog};
use crate::config::{Config, ALERTS_FILE_NAME, CONTACTS_FILE_NAME};
use crate::contact::{Contact, ContactBook};
use crate::error::{Error, Result};
use crate::http::{router, AppState};
use crate::storage::{ensure_data_dir, JsonFileStore};

/// Build the services over the JSON documents in the configured data
/// directory, creating it (or the fallback directory) if needed.
///
/// # Errors
///
/// Returns an error if no data directory can be created.
pub fn build_state(config: &Config) -> Result<AppState> {
    let data_dir = ensure_data_dir(&config.data_dir())?;
    info!("Using data directory {}", data_dir.display());

    let contacts = ContactBook::new(
        Arc::new(JsonFileStore::<Contact>::new(data_dir.join(CONTACTS_FILE_NAME))),
        config.storage.max_contacts,
    );
    let alerts = AlertLog::new(
        Arc::new(JsonFileStore::<Alert>::new(data_dir.join(ALERTS_FILE_NAME))),
        config.storage.max_alerts,
    );

    Ok(AppState::new(contacts, alerts))
}

/// Bind the configured address and serve until SIGINT or SIGTERM.
///
/// # Errors
///
/// Returns an error if the configuration is invalid, the data directory
/// cannot be created, or the address cannot be bound.
pub async fn run(config: &Config) -> Result<()> {
    config.validate()?;
    let state = build_state(config)?;

    let addr = config.bind_address();
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| Error::server(format!("failed to bind {addr}: {e}")))?;

    serve(listener, state, shutdown_signal()).await
}

/// Serve the API on an already bound listener until `shutdown` resolves.
///
/// # Errors
///
/// Returns an error if the server fails while accepting connections.
pub async fn serve<F>(listener: TcpListener, state: AppState, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let local_addr = listener.local_addr()?;
    info!("Listening on http://{}", local_addr);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| Error::server(format!("server error: {e}")))?;

    info!("Server stopped");
    Ok(())
}

/// Wait for SIGINT or SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
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
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("Shutdown signal received");
}
