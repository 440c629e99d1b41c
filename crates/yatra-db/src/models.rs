use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sqlx::types::Json;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Which path produced a trip plan's itinerary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ItineraryOrigin {
    /// Parsed from the model's reply (possibly with backfilled fields).
    Model,
    /// Synthesized locally because the reply could not be interpreted.
    Fallback,
}

impl fmt::Display for ItineraryOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Model => "model",
            Self::Fallback => "fallback",
        };
        f.write_str(s)
    }
}

impl FromStr for ItineraryOrigin {
    type Err = ItineraryOriginParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "model" => Ok(Self::Model),
            "fallback" => Ok(Self::Fallback),
            other => Err(ItineraryOriginParseError(other.to_owned())),
        }
    }
}

/// Error returned when parsing an invalid [`ItineraryOrigin`] string.
#[derive(Debug, Clone)]
pub struct ItineraryOriginParseError(pub String);

impl fmt::Display for ItineraryOriginParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid itinerary origin: {:?}", self.0)
    }
}

impl std::error::Error for ItineraryOriginParseError {}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

/// A catalog entry. `id` is unique and never changes once inserted.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Temple {
    pub id: String,
    pub name: String,
    /// Free text, e.g. "Madurai, Tamil Nadu".
    pub location: String,
    /// Region tag used by trip-plan candidate selection.
    pub state: String,
    pub city: String,
    pub deity: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub history: String,
    #[serde(default)]
    pub timings: String,
    #[serde(default)]
    pub prasadam: String,
    #[serde(default)]
    pub festivals: Vec<String>,
    #[serde(default)]
    pub contact: String,
    #[serde(default)]
    pub booking_link: String,
    pub coordinates: Json<Coordinates>,
    #[serde(default)]
    pub nearby_attractions: Vec<String>,
}

// ---------------------------------------------------------------------------
// Trip plans
// ---------------------------------------------------------------------------

/// One day of an itinerary, stored inside `trip_plans.daily_itinerary`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayPlan {
    pub day: i32,
    pub location: String,
    pub temples: Vec<String>,
    pub activities: Vec<String>,
    pub travel_time: String,
    pub accommodation: String,
}

/// A persisted trip plan. Written once, never updated.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TripPlan {
    pub id: Uuid,
    pub title: String,
    pub duration: i32,
    pub daily_itinerary: Json<Vec<DayPlan>>,
    pub total_temples: i32,
    pub estimated_cost: String,
    pub best_travel_mode: String,
    pub origin: ItineraryOrigin,
    pub starting_location: String,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
