//! ImageFrame Server - HTTP trigger for the photo frame
//!
//! A single `GET /run?assetId=...` endpoint, guarded by a global cooldown,
//! fetches the asset's original from the photo server and renders it onto
//! the frame canvas with `imageframe-core`.
//!
//! # Module Structure
//!
//! - `config` - Flags and environment variables
//! - `gate` - Cooldown gate and the 429 response
//! - `fetch` - Photo server client
//! - `pipeline` - One run: fetch, render, write, report
//! - `output` - Atomic canvas file writes
//! - `routes` - axum handlers

use std::sync::Arc;

use axum::Router;

pub mod config;
pub mod fetch;
pub mod gate;
pub mod output;
pub mod pipeline;
pub mod routes;

pub use config::{ConfigError, ServerConfig};
pub use gate::{CooldownGate, GateState, TooSoon};
pub use pipeline::{Normalizer, PipelineError, RunReport};
pub use routes::{router, AppState};

/// Build handler state from a configuration.
pub fn app_state(config: &ServerConfig) -> Result<AppState, ConfigError> {
    let fetcher = fetch::AssetFetcher::new(
        config.server_url.clone(),
        config.api_key.clone(),
        config.fetch_timeout(),
    )?;

    let mut normalizer =
        Normalizer::new(fetcher, config.normalize_options(), config.run_timeout());
    if let Some((path, format)) = config.output_target()? {
        normalizer = normalizer.with_output(output::CanvasOutput::new(path, format));
    }

    Ok(AppState {
        gate: Arc::new(CooldownGate::new(config.cooldown())),
        normalizer: Arc::new(normalizer),
        strict_status: config.strict_status,
    })
}

/// Build the full router from a configuration.
pub fn app(config: &ServerConfig) -> Result<Router, ConfigError> {
    Ok(router(app_state(config)?))
}
