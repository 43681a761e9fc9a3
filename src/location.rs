//! Location resolver.
//!
//! Three ways to find where the user travels from: a geolocation reading snapped
//! to the nearest reference city, a random pick from common origins (standing in
//! for an IP lookup), or a manually typed "City, Country".
//!
//! The snapping is a deliberate approximation of reverse geocoding: Manhattan
//! distance on raw degrees over a handful of cities. It is not corrected near the
//! poles or across the antimeridian.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::dataset::ReferenceDataset;
use crate::models::{Coordinates, UserLocation};

pub const UNKNOWN_COUNTRY: &str = "Unknown";

/// One outcome of a single geolocation request.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
#[serde(tag = "outcome", rename_all = "lowercase")]
pub enum SensorReading {
    Coordinates { lat: f64, lng: f64 },
    Denied,
    Unsupported,
}

/// A device capability that produces one geolocation reading per call.
pub trait GeolocationSensor {
    fn read(&self) -> impl Future<Output = SensorReading> + Send;
}

/// A reading that was already taken elsewhere (e.g. by the browser) and
/// reported to us.
#[derive(Debug, Clone, Copy)]
pub struct ReportedReading(pub SensorReading);

impl GeolocationSensor for ReportedReading {
    async fn read(&self) -> SensorReading {
        self.0
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LocationSource {
    Geolocation,
    Fallback,
    Manual,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct Detection {
    pub location: UserLocation,
    pub source: LocationSource,
}

pub struct LocationResolver {
    dataset: Arc<ReferenceDataset>,
    sensor_timeout: Duration,
    rng: Mutex<StdRng>,
}

impl LocationResolver {
    pub fn new(dataset: Arc<ReferenceDataset>, sensor_timeout: Duration, rng: StdRng) -> Self {
        Self {
            dataset,
            sensor_timeout,
            rng: Mutex::new(rng),
        }
    }

    /// Reads the sensor once, waiting at most the configured timeout. Any
    /// failure goes straight to the fallback pick; there are no retries.
    pub async fn detect<S: GeolocationSensor>(&self, sensor: &S) -> Detection {
        let reading = match tokio::time::timeout(self.sensor_timeout, sensor.read()).await {
            Ok(reading) => reading,
            Err(_) => {
                tracing::warn!(
                    "Geolocation sensor did not answer within {:?}, using fallback",
                    self.sensor_timeout
                );
                return self.fallback_detection();
            }
        };

        match reading {
            SensorReading::Coordinates { lat, lng } => {
                match self.nearest_city(Coordinates { lat, lng }) {
                    Some(location) => {
                        tracing::info!(
                            "Snapped ({}, {}) to {}, {}",
                            lat,
                            lng,
                            location.city,
                            location.country
                        );
                        Detection {
                            location,
                            source: LocationSource::Geolocation,
                        }
                    }
                    None => {
                        tracing::warn!("Unusable coordinates ({}, {}), using fallback", lat, lng);
                        self.fallback_detection()
                    }
                }
            }
            SensorReading::Denied => {
                tracing::info!("Geolocation denied, using fallback");
                self.fallback_detection()
            }
            SensorReading::Unsupported => {
                tracing::info!("Geolocation unsupported, using fallback");
                self.fallback_detection()
            }
        }
    }

    /// Nearest reference city by `|Δlat| + |Δlng|`. The first city at the
    /// minimal distance wins. `None` for non-finite input.
    pub fn nearest_city(&self, coords: Coordinates) -> Option<UserLocation> {
        if !(coords.lat.is_finite() && coords.lng.is_finite()) {
            return None;
        }

        let mut best = None;
        let mut min_distance = f64::INFINITY;
        for city in &self.dataset.reference_cities {
            let distance = (coords.lat - city.lat).abs() + (coords.lng - city.lng).abs();
            if distance < min_distance {
                min_distance = distance;
                best = Some(city);
            }
        }

        best.map(|city| UserLocation {
            city: city.city.clone(),
            country: city.country.clone(),
            coordinates: Some(coords),
        })
    }

    /// Uniform pick from the common origins. Carries no coordinates.
    pub fn fallback(&self) -> UserLocation {
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        self.dataset
            .fallback_locations
            .choose(&mut *rng)
            .cloned()
            // validated non-empty at load
            .unwrap_or_else(|| UserLocation::new("New York", "United States"))
    }

    fn fallback_detection(&self) -> Detection {
        Detection {
            location: self.fallback(),
            source: LocationSource::Fallback,
        }
    }
}

/// Parses "City, Country". Splits on the first comma only, so everything after
/// it is the country: "Portland, Oregon, US" gives country "Oregon, US", not
/// "Oregon". A missing or empty country becomes "Unknown". Blank input produces
/// no location.
pub fn parse_manual(input: &str) -> Option<UserLocation> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }

    let (city, country) = match trimmed.split_once(',') {
        Some((city, country)) => (city.trim(), country.trim()),
        None => (trimmed, ""),
    };
    let city = if city.is_empty() { trimmed } else { city };
    let country = if country.is_empty() { UNKNOWN_COUNTRY } else { country };

    Some(UserLocation::new(city, country))
}
