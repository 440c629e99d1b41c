use thiserror::Error;

/// Errors surfaced by the trip planning workflow.
///
/// An unusable model reply is not an error: the planner recovers from it
/// with a synthesized itinerary.
#[derive(Debug, Error)]
pub enum PlannerError {
    #[error("trip length must be between 1 and {max} days, got {days}")]
    InvalidDays { days: i32, max: u32 },

    #[error("model call failed")]
    Upstream(#[source] anyhow::Error),

    #[error("trip plan storage failed")]
    Persistence(#[source] anyhow::Error),
}

impl PlannerError {
    /// Whether the caller, not the server, is at fault.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidDays { .. })
    }
}
