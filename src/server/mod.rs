//! HTTP server for the annotation services.
//!
//! Each route takes one sentence (or a whole document for sentence
//! splitting) and answers with `{"probabilities": [...]}`, one entry per
//! token.

mod api_types;
mod handlers;
mod routes;

pub use api_types::{ApiError, ApiJson, ApiResponse, Probabilities};
pub use routes::create_router;

use std::net::SocketAddr;
use std::sync::Arc;

use crate::config::Settings;
use crate::services::Services;

/// Shared state for the web server.
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub services: Services,
}

impl AppState {
    pub fn new(settings: &Settings) -> anyhow::Result<Self> {
        Ok(Self {
            services: Services::from_settings(settings)?,
            settings: Arc::new(settings.clone()),
        })
    }
}

/// Start the web server.
pub async fn serve(settings: &Settings, host: &str, port: u16) -> anyhow::Result<()> {
    let state = AppState::new(settings)?;
    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    tracing::info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
