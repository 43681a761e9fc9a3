// Route definitions

use axum::{
    Router,
    routing::{get, post},
};

use crate::AppState;

mod api;
mod static_pages;

pub fn create_router(app_state: AppState) -> Router {
    let api_router = Router::new()
        .route("/health", get(api::health))
        .route("/categories", get(api::get_categories))
        .route("/location/detect", post(api::detect_location))
        .route("/location/manual", post(api::manual_location))
        .route("/analyze", post(api::analyze))
        .with_state(app_state.clone());

    Router::new()
        .route("/", get(static_pages::landing_page))
        .nest("/api", api_router)
        .with_state(app_state)
}
