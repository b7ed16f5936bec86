// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use member_auth_server::{
    api::router,
    auth::{AccessPolicy, Argon2PasswordEncoder, TokenProvider},
    config::AppConfig,
    logging::init_tracing,
    state::AppState,
    storage::{MemberRepository, StoreRepository},
};
use tokio::net::TcpListener;
#[cfg(unix)]
use tokio::signal::unix;
use tokio_util::sync::CancellationToken;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() {
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration: {e}");
            std::process::exit(1);
        }
    };

    init_tracing(config.log_format);

    if let Err(e) = run(config).await {
        tracing::error!(error = %e, "Server failed");
        std::process::exit(1);
    }
}

async fn run(config: AppConfig) -> Result<(), BoxError> {
    tracing::info!(?config, "Starting member auth server");

    let members = MemberRepository::open(&config.members_db_path())?;
    let stores = StoreRepository::open(&config.stores_db_path())?;
    let tokens = TokenProvider::new(&config.jwt_secret, config.jwt_lifetime);
    let passwords = Arc::new(Argon2PasswordEncoder::new()?);
    let policy = AccessPolicy::member_defaults()?;

    let state = AppState::new(
        members,
        stores,
        tokens,
        passwords,
        policy,
        config.admin_emails.clone(),
    );
    let app = router(state);

    let addr = config.bind_addr();
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "Listening (docs at /docs)");

    let shutdown = CancellationToken::new();
    tokio::spawn(cancel_on_signal(shutdown.clone()));

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Cancel `shutdown` on Ctrl+C or SIGTERM.
async fn cancel_on_signal(shutdown: CancellationToken) {
    let ctrl_c = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => tracing::info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                tracing::error!(error = %e, "Failed to install Ctrl+C handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match unix::signal(unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
                tracing::info!("Received SIGTERM, shutting down");
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
        () = ctrl_c => {},
        () = terminate => {},
    }

    shutdown.cancel();
}
