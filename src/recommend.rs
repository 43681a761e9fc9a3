//! Destination recommendation engine.
//!
//! Picks a category template at random and enriches each of its candidates with a
//! flight cost (read from the reference table) and a total budget range for the
//! trip. There is no image analysis behind the pick.

use std::sync::{Arc, Mutex};

use rand::rngs::StdRng;
use rand::Rng;
use serde::Deserialize;
use thiserror::Error;

use crate::dataset::ReferenceDataset;
use crate::models::{
    AnalysisResult, BudgetRange, CandidateDestination, CategorySummary, Destination,
    DestinationTemplate, UserLocation,
};

pub const TRIP_NIGHTS: u32 = 5;
pub const DAILY_FOOD: f64 = 50.0;
pub const BUDGET_MULTIPLIER: f64 = 1.5;

#[derive(Debug, Error, PartialEq)]
pub enum EngineError {
    #[error("unknown destination category '{0}'")]
    UnknownCategory(String),
}

/// Knobs for the total budget arithmetic.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
pub struct BudgetPolicy {
    pub trip_nights: u32,
    // Per day, same currency as the flight-cost table
    pub daily_food: f64,
    // Upper bound scales stay and food, never the flight
    pub multiplier: f64,
}

impl Default for BudgetPolicy {
    fn default() -> Self {
        Self {
            trip_nights: TRIP_NIGHTS,
            daily_food: DAILY_FOOD,
            multiplier: BUDGET_MULTIPLIER,
        }
    }
}

impl BudgetPolicy {
    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(self.trip_nights > 0, "budget.trip_nights must be at least 1");
        anyhow::ensure!(
            self.daily_food.is_finite() && self.daily_food >= 0.0,
            "budget.daily_food must be a non-negative number"
        );
        anyhow::ensure!(
            self.multiplier.is_finite() && self.multiplier >= 1.0,
            "budget.multiplier must be at least 1.0"
        );
        Ok(())
    }

    pub fn total_budget(&self, flight_cost: f64, accommodation_per_night: f64) -> BudgetRange {
        let nights = f64::from(self.trip_nights);
        let stay = accommodation_per_night * nights;
        let food = self.daily_food * nights;
        BudgetRange {
            min: flight_cost + stay + food,
            max: flight_cost + stay * self.multiplier + food * self.multiplier,
        }
    }
}

pub struct RecommendationEngine {
    dataset: Arc<ReferenceDataset>,
    budget: BudgetPolicy,
    rng: Mutex<StdRng>,
}

impl RecommendationEngine {
    pub fn new(dataset: Arc<ReferenceDataset>, budget: BudgetPolicy, rng: StdRng) -> Self {
        Self {
            dataset,
            budget,
            rng: Mutex::new(rng),
        }
    }

    pub fn budget(&self) -> &BudgetPolicy {
        &self.budget
    }

    pub fn categories(&self) -> Vec<CategorySummary> {
        self.dataset
            .templates
            .iter()
            .map(|t| CategorySummary {
                id: t.id.clone(),
                destination_type: t.destination_type.clone(),
            })
            .collect()
    }

    /// Analyze against a randomly drawn category.
    pub fn analyze(&self, location: &UserLocation) -> AnalysisResult {
        let templates = &self.dataset.templates;
        let index = {
            // A poisoned lock still holds a usable generator
            let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
            rng.gen_range(0..templates.len())
        };
        let template = &templates[index];
        tracing::debug!(category = %template.id, "Drew destination category");
        self.build_result(template, location)
    }

    /// Analyze against a named category, bypassing the random draw.
    pub fn analyze_category(
        &self,
        location: &UserLocation,
        category: &str,
    ) -> Result<AnalysisResult, EngineError> {
        let template = self
            .dataset
            .template(category)
            .ok_or_else(|| EngineError::UnknownCategory(category.to_string()))?;
        Ok(self.build_result(template, location))
    }

    pub fn flight_cost(&self, origin: &str, destination: &str) -> f64 {
        self.dataset.flight_costs.cost(origin, destination)
    }

    fn enrich(&self, candidate: &CandidateDestination, origin: &str) -> Destination {
        let flight_cost = self.flight_cost(origin, &candidate.country);
        Destination {
            candidate: candidate.clone(),
            flight_cost,
            total_budget: self
                .budget
                .total_budget(flight_cost, candidate.accommodation_cost),
        }
    }

    fn build_result(&self, template: &DestinationTemplate, location: &UserLocation) -> AnalysisResult {
        let suggestions = template
            .destinations
            .iter()
            .map(|candidate| self.enrich(candidate, &location.country))
            .collect();

        AnalysisResult {
            destination_type: template.destination_type.clone(),
            description: template.description.clone(),
            suggestions,
            seasonal_advice: template.seasonal_advice.clone(),
            user_location: location.clone(),
        }
    }
}
