use askama::Template;
use axum::{
    extract::State,
    response::{Html, IntoResponse},
};

use crate::{AppState, error::AppError, models::CategorySummary};

// Landing page: upload form, location widget and the category list
#[derive(Template)]
#[template(path = "index.html")]
struct IndexTemplate {
    categories: Vec<CategorySummary>,
    trip_nights: u32,
    // Browser-side wait for the geolocation prompt
    geolocation_timeout_ms: u64,
}

pub async fn landing_page(State(app_state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let template = IndexTemplate {
        categories: app_state.engine.categories(),
        trip_nights: app_state.engine.budget().trip_nights,
        geolocation_timeout_ms: app_state.settings.geolocation_timeout_ms,
    };
    match template.render() {
        Ok(html) => Ok(Html(html)),
        Err(e) => {
            tracing::error!("Failed to render index template: {}", e);
            Err(AppError::InternalServerError(anyhow::Error::new(e)))
        }
    }
}
