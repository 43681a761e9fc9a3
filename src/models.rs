// Data structures shared by the resolver, the engine and the HTTP layer

use serde::{Deserialize, Serialize};

// Raw geolocation coordinates in decimal degrees
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

// Where the user is travelling from. Replaced wholesale when the user changes location.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserLocation {
    pub city: String,
    pub country: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,
}

impl UserLocation {
    pub fn new(city: impl Into<String>, country: impl Into<String>) -> Self {
        Self {
            city: city.into(),
            country: country.into(),
            coordinates: None,
        }
    }
}

// A static destination inside a category template
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CandidateDestination {
    pub name: String,
    pub country: String,
    pub image_url: String,
    pub description: String,
    pub match_reason: String,
    // Per night, same currency as the flight-cost table
    pub accommodation_cost: f64,
    pub best_season: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_condition: Option<String>,
}

// A themed bundle of candidates (beach, mountains, ...)
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DestinationTemplate {
    pub id: String,
    pub destination_type: String,
    pub description: String,
    pub destinations: Vec<CandidateDestination>,
    pub seasonal_advice: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct BudgetRange {
    pub min: f64,
    pub max: f64,
}

// A candidate enriched with the per-request cost figures
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Destination {
    #[serde(flatten)] // Keep the candidate's fields at the top level
    pub candidate: CandidateDestination,
    pub flight_cost: f64,
    pub total_budget: BudgetRange,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub destination_type: String,
    pub description: String,
    // Template order; the first entry is the best match
    pub suggestions: Vec<Destination>,
    pub seasonal_advice: String,
    pub user_location: UserLocation,
}

// Category listing entry for the front-end
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CategorySummary {
    pub id: String,
    pub destination_type: String,
}
