//! Prompt construction for itinerary generation.
//!
//! The output-shape block below is the only contract between the planner
//! and the model. Its field names must match what
//! [`super::interpret`] reads.

use yatra_db::models::Temple;

/// Candidates beyond this many are left out of the prompt.
pub const PROMPT_CANDIDATE_LIMIT: usize = 10;

/// Session name prefix for itinerary requests.
pub const SESSION_PREFIX: &str = "trip_plan";

/// System instructions sent with every itinerary request.
pub const SYSTEM_MESSAGE: &str = "You are an expert travel planner specializing in Indian temple \
     pilgrimages. Provide detailed, practical itineraries.";

const CLOSING_GUIDANCE: &str = "Focus on creating a practical, spiritual journey with proper \
     time allocation and regional diversity.";

/// Build the user prompt for a `days`-day trip from `starting_location`.
///
/// Only the first [`PROMPT_CANDIDATE_LIMIT`] candidates are listed.
pub fn build_itinerary_prompt(candidates: &[Temple], starting_location: &str, days: u32) -> String {
    let mut prompt = String::with_capacity(2048);

    prompt.push_str(&format!(
        "Create a detailed {days}-day temple pilgrimage itinerary starting from {starting_location}.\n\n"
    ));

    prompt.push_str("Available temples in preferred states:\n");
    if candidates.is_empty() {
        prompt.push_str("- (no catalog temples matched; suggest well-known temples along the route)\n");
    } else {
        for temple in candidates.iter().take(PROMPT_CANDIDATE_LIMIT) {
            prompt.push_str(&format!(
                "- {} in {} (Deity: {})\n",
                temple.name, temple.location, temple.deity
            ));
        }
    }
    prompt.push('\n');

    prompt.push_str("Please provide a JSON response with the following structure:\n");
    prompt.push_str(&output_shape(days));
    prompt.push('\n');

    prompt.push_str(CLOSING_GUIDANCE);
    prompt.push('\n');

    prompt
}

fn output_shape(days: u32) -> String {
    format!(
        r#"{{
    "title": "A creative title for the trip",
    "duration": {days},
    "daily_itinerary": [
        {{
            "day": 1,
            "location": "City name",
            "temples": ["Temple names to visit"],
            "activities": ["Activities and experiences"],
            "travel_time": "Estimated travel time",
            "accommodation": "Suggested accommodation area"
        }}
    ],
    "total_temples": "Number of temples covered",
    "estimated_cost": "Estimated budget in INR",
    "best_travel_mode": "Recommended travel mode"
}}
"#
    )
}

#[cfg(test)]
mod tests {
    use sqlx::types::Json;
    use yatra_db::models::Coordinates;

    use super::*;

    fn temple(n: usize, name: &str, location: &str, deity: &str) -> Temple {
        Temple {
            id: format!("temple_{n:03}"),
            name: name.to_string(),
            location: location.to_string(),
            state: "Tamil Nadu".to_string(),
            city: String::new(),
            deity: deity.to_string(),
            image: String::new(),
            description: String::new(),
            history: String::new(),
            timings: String::new(),
            prasadam: String::new(),
            festivals: vec![],
            contact: String::new(),
            booking_link: String::new(),
            coordinates: Json(Coordinates { lat: 0.0, lng: 0.0 }),
            nearby_attractions: vec![],
        }
    }

    fn tamil_nadu_pair() -> Vec<Temple> {
        vec![
            temple(1, "Meenakshi Amman Temple", "Madurai, Tamil Nadu", "Meenakshi"),
            temple(5, "Brihadishvara Temple", "Thanjavur, Tamil Nadu", "Shiva (Brihadishvara)"),
        ]
    }

    #[test]
    fn prompt_states_days_and_start() {
        let prompt = build_itinerary_prompt(&tamil_nadu_pair(), "Delhi", 3);
        assert!(prompt.contains("3-day temple pilgrimage itinerary starting from Delhi"));
        assert!(prompt.contains("\"duration\": 3,"));
    }

    #[test]
    fn prompt_lists_each_candidate() {
        let prompt = build_itinerary_prompt(&tamil_nadu_pair(), "Delhi", 3);
        assert!(prompt.contains("- Meenakshi Amman Temple in Madurai, Tamil Nadu (Deity: Meenakshi)"));
        assert!(prompt.contains(
            "- Brihadishvara Temple in Thanjavur, Tamil Nadu (Deity: Shiva (Brihadishvara))"
        ));
    }

    #[test]
    fn prompt_names_every_output_field() {
        let prompt = build_itinerary_prompt(&tamil_nadu_pair(), "Delhi", 2);
        for field in [
            "\"title\"",
            "\"duration\"",
            "\"daily_itinerary\"",
            "\"day\"",
            "\"location\"",
            "\"temples\"",
            "\"activities\"",
            "\"travel_time\"",
            "\"accommodation\"",
            "\"total_temples\"",
            "\"estimated_cost\"",
            "\"best_travel_mode\"",
        ] {
            assert!(prompt.contains(field), "prompt is missing {field}");
        }
    }

    #[test]
    fn prompt_caps_candidates_at_ten() {
        let many: Vec<Temple> = (1..=14)
            .map(|n| temple(n, &format!("Temple {n}"), "Somewhere", "Shiva"))
            .collect();
        let prompt = build_itinerary_prompt(&many, "Pune", 4);
        assert!(prompt.contains("- Temple 10 in"));
        assert!(!prompt.contains("- Temple 11 in"));
        assert_eq!(prompt.matches("(Deity: ").count(), PROMPT_CANDIDATE_LIMIT);
    }

    #[test]
    fn prompt_handles_no_candidates() {
        let prompt = build_itinerary_prompt(&[], "Kolkata", 1);
        assert!(prompt.contains("no catalog temples matched"));
        assert!(!prompt.contains("(Deity: "));
    }

    #[test]
    fn prompt_is_stable_for_same_input() {
        let a = build_itinerary_prompt(&tamil_nadu_pair(), "Delhi", 3);
        let b = build_itinerary_prompt(&tamil_nadu_pair(), "Delhi", 3);
        assert_eq!(a, b);
    }
}
