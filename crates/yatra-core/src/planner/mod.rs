//! Trip planning: candidate selection, prompt construction, reply
//! interpretation, and storage.

pub mod candidates;
pub mod error;
pub mod interpret;
pub mod prompt;
pub mod request;
pub mod service;

pub use error::PlannerError;
pub use interpret::{GeneratedItinerary, Interpretation, interpret_reply};
pub use request::{MAX_TRIP_DAYS, TripPlanRequest};
pub use service::TripPlanner;
