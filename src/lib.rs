// Travel Wizard: location resolution and destination suggestions behind an axum server

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{Router, extract::FromRef};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tower_http::{services::ServeDir, trace::TraceLayer};

pub mod config;
pub mod dataset;
pub mod error;
pub mod location;
pub mod models;
pub mod recommend;
pub mod routes;

use crate::config::Settings;
use crate::dataset::ReferenceDataset;
use crate::location::LocationResolver;
use crate::recommend::RecommendationEngine;

/// Random source for category and fallback draws. A fixed seed makes both
/// repeatable; without one the generator is seeded from OS entropy.
pub fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    }
}

#[derive(Clone, FromRef)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub engine: Arc<RecommendationEngine>,
    pub resolver: Arc<LocationResolver>,
}

impl AppState {
    /// Loads and validates the reference dataset, then wires the engine and
    /// resolver around it. Fails on a broken dataset or bad settings.
    pub fn new(settings: Settings) -> Result<Self> {
        settings.validate()?;
        let dataset = Arc::new(
            ReferenceDataset::load(settings.dataset_path.as_deref())
                .context("Failed to load reference dataset")?,
        );

        // Separate streams so location draws don't shift category draws
        let engine = RecommendationEngine::new(
            dataset.clone(),
            settings.budget,
            seeded_rng(settings.rng_seed),
        );
        let resolver = LocationResolver::new(
            dataset,
            settings.geolocation_timeout(),
            seeded_rng(settings.rng_seed.map(|s| s.wrapping_add(1))),
        );

        Ok(Self {
            settings: Arc::new(settings),
            engine: Arc::new(engine),
            resolver: Arc::new(resolver),
        })
    }
}

/// Full application: routes, static files and request tracing.
pub fn build_app(app_state: AppState) -> Router {
    routes::create_router(app_state)
        .nest_service("/static", ServeDir::new("static"))
        .layer(TraceLayer::new_for_http())
}
