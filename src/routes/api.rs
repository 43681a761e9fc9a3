// Handlers for the JSON API consumed by the browser front-end

use axum::{
    extract::{Json as JsonExtract, State},
    response::{IntoResponse, Json},
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{
    AppState,
    error::{AppError, AppResult},
    location::{self, Detection, LocationSource, ReportedReading, SensorReading},
    models::{AnalysisResult, UserLocation},
};

// --- Request / Response Structs ---

#[derive(Deserialize, Debug)]
pub struct ManualLocationRequest {
    pub input: String,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct AnalyzeRequest {
    // Data URI or URL of the uploaded picture; only echoed back
    pub image: String,
    pub location: UserLocation,
    // Skip the random draw and use this category id
    #[serde(default)]
    pub category: Option<String>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct AnalyzeResponse {
    pub image: String,
    pub result: AnalysisResult,
}

/// Accepts any non-empty reference. Data URIs must carry an image or video
/// media type; nothing else about the content is checked.
pub fn validate_image_reference(image: &str) -> Result<(), String> {
    let image = image.trim();
    if image.is_empty() {
        return Err("An image is required".to_string());
    }
    if let Some(rest) = image.strip_prefix("data:") {
        let media_type = rest.split([';', ',']).next().unwrap_or_default();
        if !(media_type.starts_with("image/") || media_type.starts_with("video/")) {
            return Err(format!(
                "Unsupported upload type '{}', expected an image or video",
                media_type
            ));
        }
    }
    Ok(())
}

// --- API Handlers ---

pub async fn health(State(app_state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "categories": app_state.engine.categories().len(),
    }))
}

pub async fn get_categories(State(app_state): State<AppState>) -> impl IntoResponse {
    Json(app_state.engine.categories())
}

pub async fn detect_location(
    State(app_state): State<AppState>,
    JsonExtract(reading): JsonExtract<SensorReading>,
) -> AppResult<Json<Detection>> {
    tracing::info!("API call: detect_location with {:?}", reading);
    let detection = app_state.resolver.detect(&ReportedReading(reading)).await;
    Ok(Json(detection))
}

pub async fn manual_location(
    JsonExtract(request): JsonExtract<ManualLocationRequest>,
) -> AppResult<Json<Detection>> {
    tracing::info!("API call: manual_location with input {:?}", request.input);
    match location::parse_manual(&request.input) {
        Some(location) => Ok(Json(Detection {
            location,
            source: LocationSource::Manual,
        })),
        None => Err(AppError::Unprocessable(
            "Please enter a location, e.g. \"London, United Kingdom\"".to_string(),
        )),
    }
}

pub async fn analyze(
    State(app_state): State<AppState>,
    JsonExtract(request): JsonExtract<AnalyzeRequest>,
) -> AppResult<Json<AnalyzeResponse>> {
    tracing::info!(
        "API call: analyze from {}, {} (category: {:?})",
        request.location.city,
        request.location.country,
        request.category
    );
    validate_image_reference(&request.image).map_err(AppError::BadRequest)?;

    let result = match request.category.as_deref() {
        Some(category) => app_state
            .engine
            .analyze_category(&request.location, category)?,
        None => app_state.engine.analyze(&request.location),
    };
    tracing::info!(
        "Suggesting {} destinations for '{}'",
        result.suggestions.len(),
        result.destination_type
    );

    Ok(Json(AnalyzeResponse {
        image: request.image,
        result,
    }))
}

#[cfg(test)]
mod tests {
    use super::validate_image_reference;

    #[test]
    fn image_references() {
        assert!(validate_image_reference("https://example.com/beach.jpg").is_ok());
        assert!(validate_image_reference("data:image/png;base64,iVBORw0KGgo=").is_ok());
        assert!(validate_image_reference("data:video/mp4;base64,AAAA").is_ok());
        assert!(validate_image_reference("   ").is_err());
        assert!(validate_image_reference("data:application/pdf;base64,JVBERi0=").is_err());
    }
}
