//! Trip planning workflow.
//!
//! Validates the request, gathers catalog candidates, asks the model for an
//! itinerary, interprets the reply, and stores the result. A reply that
//! cannot be read is replaced by a synthesized itinerary; a model call that
//! fails outright is an error unless upstream fallback is enabled.

use std::sync::Arc;

use sqlx::PgPool;
use tracing::{error, info, warn};
use uuid::Uuid;

use yatra_db::models::{ItineraryOrigin, TripPlan};
use yatra_db::queries::trip_plans::{self, NewTripPlan};

use super::candidates::select_candidates;
use super::error::PlannerError;
use super::interpret::{GeneratedItinerary, Interpretation, parse_reply, synthesize_itinerary};
use super::prompt::{SESSION_PREFIX, SYSTEM_MESSAGE, build_itinerary_prompt};
use super::request::TripPlanRequest;
use crate::model::{ChatModel, ChatRequest};

/// Plans and stores trips. Cheap to clone.
#[derive(Clone)]
pub struct TripPlanner {
    pool: PgPool,
    model: Arc<dyn ChatModel>,
    fallback_on_upstream_error: bool,
}

impl TripPlanner {
    pub fn new(pool: PgPool, model: Arc<dyn ChatModel>) -> Self {
        Self {
            pool,
            model,
            fallback_on_upstream_error: false,
        }
    }

    /// When enabled, a failed model call yields a synthesized itinerary
    /// instead of [`PlannerError::Upstream`].
    pub fn with_upstream_fallback(mut self, enabled: bool) -> Self {
        self.fallback_on_upstream_error = enabled;
        self
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Plan a trip and store it.
    ///
    /// Nothing is stored when this returns an error.
    pub async fn plan_trip(&self, request: &TripPlanRequest) -> Result<TripPlan, PlannerError> {
        // 1. Validate.
        let days = request.validated_days()?;

        // 2. Gather candidates.
        let candidates = select_candidates(&self.pool, &request.preferred_states).await?;
        info!(
            starting_location = %request.starting_location,
            days,
            candidates = candidates.len(),
            "planning trip"
        );

        // 3. Ask the model.
        let prompt = build_itinerary_prompt(&candidates, &request.starting_location, days);
        let chat = ChatRequest::new_session(SESSION_PREFIX, SYSTEM_MESSAGE, prompt);

        let interpretation = match self.model.complete(&chat).await {
            Ok(reply) => match parse_reply(&reply, days, candidates.len()) {
                Ok(itinerary) => Interpretation::Parsed(itinerary),
                Err(reason) => {
                    warn!(
                        session_id = %chat.session_id,
                        reason = %reason,
                        "model reply unusable; using synthesized itinerary"
                    );
                    Interpretation::Synthesized(synthesize_itinerary(days, candidates.len()))
                }
            },
            Err(e) if self.fallback_on_upstream_error => {
                let detail = format!("{e:#}");
                warn!(
                    session_id = %chat.session_id,
                    model = self.model.name(),
                    error = %detail,
                    "model call failed; using synthesized itinerary"
                );
                Interpretation::Synthesized(synthesize_itinerary(days, candidates.len()))
            }
            Err(e) => {
                let detail = format!("{e:#}");
                error!(
                    session_id = %chat.session_id,
                    model = self.model.name(),
                    error = %detail,
                    "model call failed"
                );
                return Err(PlannerError::Upstream(e));
            }
        };

        let origin = interpretation.origin();

        // 4. Store.
        let plan = self
            .store(&interpretation.into_itinerary(), origin, &request.starting_location)
            .await?;
        info!(plan_id = %plan.id, origin = %plan.origin, "trip plan stored");
        Ok(plan)
    }

    async fn store(
        &self,
        itinerary: &GeneratedItinerary,
        origin: ItineraryOrigin,
        starting_location: &str,
    ) -> Result<TripPlan, PlannerError> {
        let new = NewTripPlan {
            id: Uuid::new_v4(),
            title: &itinerary.title,
            duration: itinerary.duration,
            daily_itinerary: &itinerary.daily_itinerary,
            total_temples: itinerary.total_temples,
            estimated_cost: &itinerary.estimated_cost,
            best_travel_mode: &itinerary.best_travel_mode,
            origin,
            starting_location,
        };
        trip_plans::insert_trip_plan(&self.pool, &new)
            .await
            .map_err(PlannerError::Persistence)
    }
}

impl std::fmt::Debug for TripPlanner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TripPlanner")
            .field("model", &self.model.name())
            .field("fallback_on_upstream_error", &self.fallback_on_upstream_error)
            .finish()
    }
}
