//! Reference dataset: category templates, the flight-cost table and the city
//! lists used by the location resolver.
//!
//! The dataset is loaded once (embedded JSON or a file) and validated before the
//! server starts; a broken dataset is a startup failure, never a request error.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::models::{DestinationTemplate, UserLocation};

const EMBEDDED_DATASET: &str = include_str!("../data/reference.json");

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("failed to read dataset file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse dataset: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("dataset has no destination templates")]
    NoTemplates,
    #[error("duplicate template id '{0}'")]
    DuplicateTemplate(String),
    #[error("template '{id}' has {count} destinations, expected 2 to 4")]
    DestinationCount { id: String, count: usize },
    #[error("destination '{name}' has an invalid accommodation cost {cost}")]
    InvalidAccommodationCost { name: String, cost: f64 },
    #[error("default origin '{0}' has no row in the flight-cost table")]
    MissingDefaultOrigin(String),
    #[error("flight cost {origin} -> {destination} must be positive, got {cost}")]
    InvalidFlightCost {
        origin: String,
        destination: String,
        cost: f64,
    },
    #[error("default flight cost must be positive, got {0}")]
    InvalidDefaultFlightCost(f64),
    #[error("reference city list is empty")]
    NoReferenceCities,
    #[error("reference city '{0}' has non-finite coordinates")]
    InvalidCityCoordinates(String),
    #[error("fallback location list is empty")]
    NoFallbackLocations,
}

// A city the geolocation snapper can resolve to
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ReferenceCity {
    pub city: String,
    pub country: String,
    pub lat: f64,
    pub lng: f64,
}

/// Country-to-country base flight costs. A static distance/popularity proxy,
/// not a fare lookup.
#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct FlightCostTable {
    default_origin: String,
    default_flight_cost: f64,
    flight_costs: HashMap<String, HashMap<String, f64>>,
}

impl FlightCostTable {
    /// Cost from `origin` to `destination`. Unknown origins read the default
    /// origin's row; destinations missing from the row cost the default.
    pub fn cost(&self, origin: &str, destination: &str) -> f64 {
        let row = self
            .flight_costs
            .get(origin)
            .or_else(|| self.flight_costs.get(&self.default_origin));
        row.and_then(|costs| costs.get(destination))
            .copied()
            .unwrap_or(self.default_flight_cost)
    }

    pub fn default_origin(&self) -> &str {
        &self.default_origin
    }

    pub fn default_flight_cost(&self) -> f64 {
        self.default_flight_cost
    }

    fn validate(&self) -> Result<(), DatasetError> {
        if !(self.default_flight_cost.is_finite() && self.default_flight_cost > 0.0) {
            return Err(DatasetError::InvalidDefaultFlightCost(self.default_flight_cost));
        }
        if !self.flight_costs.contains_key(&self.default_origin) {
            return Err(DatasetError::MissingDefaultOrigin(self.default_origin.clone()));
        }
        for (origin, row) in &self.flight_costs {
            for (destination, &cost) in row {
                if !(cost.is_finite() && cost > 0.0) {
                    return Err(DatasetError::InvalidFlightCost {
                        origin: origin.clone(),
                        destination: destination.clone(),
                        cost,
                    });
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceDataset {
    #[serde(flatten)]
    pub flight_costs: FlightCostTable,
    pub reference_cities: Vec<ReferenceCity>,
    pub fallback_locations: Vec<UserLocation>,
    pub templates: Vec<DestinationTemplate>,
}

impl ReferenceDataset {
    /// The dataset compiled into the binary.
    pub fn embedded() -> Result<Self, DatasetError> {
        Self::from_json(EMBEDDED_DATASET)
    }

    pub fn from_json(raw: &str) -> Result<Self, DatasetError> {
        let dataset: ReferenceDataset = serde_json::from_str(raw)?;
        dataset.validate()?;
        Ok(dataset)
    }

    pub fn from_file(path: &Path) -> Result<Self, DatasetError> {
        let raw = fs::read_to_string(path).map_err(|source| DatasetError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&raw)
    }

    /// Loads from `path` when given, otherwise the embedded dataset.
    pub fn load(path: Option<&Path>) -> Result<Self, DatasetError> {
        match path {
            Some(p) => {
                tracing::info!("Loading reference dataset from {}", p.display());
                Self::from_file(p)
            }
            None => {
                tracing::info!("Using embedded reference dataset");
                Self::embedded()
            }
        }
    }

    pub fn template(&self, id: &str) -> Option<&DestinationTemplate> {
        self.templates.iter().find(|t| t.id == id)
    }

    fn validate(&self) -> Result<(), DatasetError> {
        self.flight_costs.validate()?;

        if self.templates.is_empty() {
            return Err(DatasetError::NoTemplates);
        }
        let mut seen = HashSet::new();
        for template in &self.templates {
            if !seen.insert(template.id.as_str()) {
                return Err(DatasetError::DuplicateTemplate(template.id.clone()));
            }
            let count = template.destinations.len();
            if !(2..=4).contains(&count) {
                return Err(DatasetError::DestinationCount {
                    id: template.id.clone(),
                    count,
                });
            }
            for dest in &template.destinations {
                if !(dest.accommodation_cost.is_finite() && dest.accommodation_cost >= 0.0) {
                    return Err(DatasetError::InvalidAccommodationCost {
                        name: dest.name.clone(),
                        cost: dest.accommodation_cost,
                    });
                }
            }
        }

        if self.reference_cities.is_empty() {
            return Err(DatasetError::NoReferenceCities);
        }
        if let Some(city) = self
            .reference_cities
            .iter()
            .find(|c| !(c.lat.is_finite() && c.lng.is_finite()))
        {
            return Err(DatasetError::InvalidCityCoordinates(city.city.clone()));
        }
        if self.fallback_locations.is_empty() {
            return Err(DatasetError::NoFallbackLocations);
        }

        tracing::debug!(
            templates = self.templates.len(),
            cities = self.reference_cities.len(),
            "Reference dataset validated"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn embedded_json() -> serde_json::Value {
        serde_json::from_str(EMBEDDED_DATASET).unwrap()
    }

    #[test]
    fn embedded_dataset_loads() {
        let dataset = ReferenceDataset::embedded().unwrap();
        let ids: Vec<&str> = dataset.templates.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(
            ids,
            ["tropical-beach", "mountain-scenery", "city-landmark", "desert"]
        );
        assert_eq!(dataset.reference_cities.len(), 8);
        assert_eq!(dataset.fallback_locations.len(), 5);
        assert_eq!(dataset.flight_costs.default_origin(), "United States");
    }

    #[test]
    fn exact_table_hit() {
        let dataset = ReferenceDataset::embedded().unwrap();
        assert_eq!(dataset.flight_costs.cost("United Kingdom", "Switzerland"), 200.0);
        assert_eq!(dataset.flight_costs.cost("Germany", "Czech Republic"), 100.0);
    }

    #[test]
    fn unknown_origin_reads_default_row() {
        let dataset = ReferenceDataset::embedded().unwrap();
        assert_eq!(dataset.flight_costs.cost("Japan", "Indonesia"), 850.0);
        assert_eq!(dataset.flight_costs.cost("Unknown", "Canada"), 350.0);
    }

    #[test]
    fn unknown_destination_costs_default() {
        let dataset = ReferenceDataset::embedded().unwrap();
        // Antelope Canyon is in no row
        let table = &dataset.flight_costs;
        assert_eq!(table.default_flight_cost(), 700.0);
        assert_eq!(table.cost("United Kingdom", "United States"), table.default_flight_cost());
        assert_eq!(table.cost("Narnia", "Atlantis"), table.default_flight_cost());
    }

    #[test]
    fn rejects_missing_default_origin() {
        let mut json = embedded_json();
        json["defaultOrigin"] = "Japan".into();
        let err = ReferenceDataset::from_json(&json.to_string()).unwrap_err();
        assert!(matches!(err, DatasetError::MissingDefaultOrigin(ref o) if o == "Japan"));
    }

    #[test]
    fn rejects_non_positive_costs() {
        let mut json = embedded_json();
        json["flightCosts"]["Germany"]["France"] = 0.into();
        let err = ReferenceDataset::from_json(&json.to_string()).unwrap_err();
        assert!(matches!(err, DatasetError::InvalidFlightCost { .. }));

        let mut json = embedded_json();
        json["defaultFlightCost"] = (-1).into();
        let err = ReferenceDataset::from_json(&json.to_string()).unwrap_err();
        assert!(matches!(err, DatasetError::InvalidDefaultFlightCost(_)));
    }

    #[test]
    fn rejects_bad_templates() {
        let mut json = embedded_json();
        json["templates"] = serde_json::json!([]);
        assert!(matches!(
            ReferenceDataset::from_json(&json.to_string()).unwrap_err(),
            DatasetError::NoTemplates
        ));

        let mut json = embedded_json();
        json["templates"][1]["id"] = "tropical-beach".into();
        assert!(matches!(
            ReferenceDataset::from_json(&json.to_string()).unwrap_err(),
            DatasetError::DuplicateTemplate(_)
        ));

        let mut json = embedded_json();
        json["templates"][0]["destinations"]
            .as_array_mut()
            .unwrap()
            .truncate(1);
        assert!(matches!(
            ReferenceDataset::from_json(&json.to_string()).unwrap_err(),
            DatasetError::DestinationCount { count: 1, .. }
        ));
    }

    #[test]
    fn rejects_empty_city_lists() {
        let mut json = embedded_json();
        json["referenceCities"] = serde_json::json!([]);
        assert!(matches!(
            ReferenceDataset::from_json(&json.to_string()).unwrap_err(),
            DatasetError::NoReferenceCities
        ));

        let mut json = embedded_json();
        json["fallbackLocations"] = serde_json::json!([]);
        assert!(matches!(
            ReferenceDataset::from_json(&json.to_string()).unwrap_err(),
            DatasetError::NoFallbackLocations
        ));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = ReferenceDataset::from_file(Path::new("/nonexistent/reference.json")).unwrap_err();
        assert!(matches!(err, DatasetError::Io { .. }));
    }
}
