// Copyright (c) 2021 Tangram Robotics Inc. - All Rights Reserved
// Unauthorized copying of this file, via any medium is strictly prohibited
// Proprietary and confidential
// ----------------------------

//! HTTP function endpoint.
//!
//! Serves `POST /api/scrape`, guarded by a function key, on top of a single
//! shared calculator client. Lookups in flight are capped by a semaphore so a
//! burst of requests can't hammer the calculator.

pub(crate) mod auth;
pub(crate) mod handlers;
pub(crate) mod routes;

use std::sync::Arc;

use anyhow::{Context, Result};
use log::{error, info, warn};
use tokio::net::TcpListener;
use tokio::sync::Semaphore;

use crate::app_config::CompleteAppConfig;
use crate::core::api::longevity::LongevityApiConfig;
use crate::core::commands;

/// State shared by every request.
pub struct AppState {
    pub api: LongevityApiConfig,
    pub limiter: Semaphore,
    pub function_keys: Vec<String>,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    pub fn new(config: &CompleteAppConfig) -> Result<Self> {
        Ok(Self {
            api: commands::api_config(&config.scraper)?,
            limiter: Semaphore::new(config.scraper.max_concurrent.max(1)),
            function_keys: config.server.function_keys.clone(),
        })
    }
}

/// Run the HTTP server until Ctrl-C.
pub async fn serve(config: CompleteAppConfig) -> Result<()> {
    let state = Arc::new(AppState::new(&config)?);
    if state.function_keys.is_empty() {
        warn!("No function keys configured -- /api endpoints are open to anyone!");
    }
    let app = routes::router(state);

    let listener = TcpListener::bind((config.server.host.as_str(), config.server.port))
        .await
        .with_context(|| {
            format!(
                "Could not listen on {}:{}",
                config.server.host, config.server.port
            )
        })?;
    info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        // Without a signal handler, keep serving rather than exit at once.
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
