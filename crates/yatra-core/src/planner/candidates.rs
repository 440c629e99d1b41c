//! Catalog lookup for itinerary candidates.

use sqlx::PgPool;

use yatra_db::models::Temple;
use yatra_db::queries::temples;

use super::error::PlannerError;

/// Upper bound on temples fetched per request.
pub const MAX_CANDIDATES: i64 = 50;

/// Temples whose state is one of `states`, in catalog order, at most
/// [`MAX_CANDIDATES`]. An empty `states` matches every temple.
pub async fn select_candidates(
    pool: &PgPool,
    states: &[String],
) -> Result<Vec<Temple>, PlannerError> {
    temples::find_temples_in_states(pool, states, MAX_CANDIDATES)
        .await
        .map_err(PlannerError::Persistence)
}
