//! Caller-supplied trip plan request.

use serde::{Deserialize, Serialize};

use super::error::PlannerError;

/// Longest trip the planner accepts.
pub const MAX_TRIP_DAYS: u32 = 30;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripPlanRequest {
    pub starting_location: String,
    pub days: i32,
    /// Region tags to draw candidates from; empty means every region.
    #[serde(default)]
    pub preferred_states: Vec<String>,
    /// Accepted for forward compatibility; not used when planning.
    #[serde(default)]
    pub temples_of_interest: Vec<String>,
}

impl TripPlanRequest {
    /// The day count as an unsigned value, or [`PlannerError::InvalidDays`]
    /// when it lies outside `1..=MAX_TRIP_DAYS`.
    pub fn validated_days(&self) -> Result<u32, PlannerError> {
        match u32::try_from(self.days) {
            Ok(days) if (1..=MAX_TRIP_DAYS).contains(&days) => Ok(days),
            _ => Err(PlannerError::InvalidDays {
                days: self.days,
                max: MAX_TRIP_DAYS,
            }),
        }
    }
}
