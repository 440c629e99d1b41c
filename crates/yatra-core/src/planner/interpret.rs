//! Interpretation of the model's reply.
//!
//! The model is asked for a JSON object but answers in free text, so the
//! reply is handled defensively:
//!
//! 1. A surrounding Markdown code fence is stripped.
//! 2. The remainder must be a JSON object whose `daily_itinerary`, if
//!    present, is a list of day objects. Anything else is
//!    [`MalformedReply`] and the whole itinerary is synthesized by
//!    [`synthesize_itinerary`].
//! 3. Fields missing from an otherwise usable object are backfilled with
//!    the synthesized values, except the title, whose backfill reads
//!    "Journey" rather than "Pilgrimage".

use serde_json::{Map, Value};
use thiserror::Error;

use yatra_db::models::{DayPlan, ItineraryOrigin};

const FENCE: &str = "```";

const FALLBACK_TRAVEL_TIME: &str = "2-4 hours";
const FALLBACK_ACCOMMODATION: &str = "Local guest house or hotel";
const FALLBACK_TEMPLES: &[&str] = &["Selected temples"];
const FALLBACK_ACTIVITIES: &[&str] = &["Temple darshan", "Local exploration"];
const FALLBACK_TRAVEL_MODE: &str = "Car/Taxi";

/// Lower and upper per-day budget, in rupees.
const DAILY_COST_RANGE: (u32, u32) = (3000, 5000);

/// An itinerary before it has been assigned an id and stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedItinerary {
    pub title: String,
    pub duration: i32,
    pub daily_itinerary: Vec<DayPlan>,
    pub total_temples: i32,
    pub estimated_cost: String,
    pub best_travel_mode: String,
}

/// The interpreted reply, tagged with the path that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Interpretation {
    /// Read from the model's reply, with missing fields backfilled.
    Parsed(GeneratedItinerary),
    /// Produced locally because the reply was unusable.
    Synthesized(GeneratedItinerary),
}

impl Interpretation {
    pub fn origin(&self) -> ItineraryOrigin {
        match self {
            Self::Parsed(_) => ItineraryOrigin::Model,
            Self::Synthesized(_) => ItineraryOrigin::Fallback,
        }
    }

    pub fn itinerary(&self) -> &GeneratedItinerary {
        match self {
            Self::Parsed(it) | Self::Synthesized(it) => it,
        }
    }

    pub fn into_itinerary(self) -> GeneratedItinerary {
        match self {
            Self::Parsed(it) | Self::Synthesized(it) => it,
        }
    }
}

/// Why a reply could not be used.
#[derive(Debug, Error)]
pub enum MalformedReply {
    #[error("reply is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("reply is JSON but not an object")]
    NotAnObject,

    #[error("daily_itinerary is not a list of day objects")]
    InvalidItinerary,
}

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

/// Interpret `reply` for a `days`-day trip drawn from `candidate_count`
/// catalog temples. Never fails.
pub fn interpret_reply(reply: &str, days: u32, candidate_count: usize) -> Interpretation {
    match parse_reply(reply, days, candidate_count) {
        Ok(itinerary) => Interpretation::Parsed(itinerary),
        Err(_) => Interpretation::Synthesized(synthesize_itinerary(days, candidate_count)),
    }
}

/// Strict half of [`interpret_reply`]: parse and backfill, or report why the
/// reply is unusable.
pub fn parse_reply(
    reply: &str,
    days: u32,
    candidate_count: usize,
) -> Result<GeneratedItinerary, MalformedReply> {
    let payload = strip_code_fence(reply);
    let value: Value = serde_json::from_str(payload)?;
    let Value::Object(obj) = value else {
        return Err(MalformedReply::NotAnObject);
    };

    let daily_itinerary = match obj.get("daily_itinerary") {
        None | Some(Value::Null) => fallback_days(days),
        Some(Value::Array(entries)) => entries
            .iter()
            .enumerate()
            .map(|(i, entry)| match entry {
                Value::Object(day) => Ok(day_from_object(day, i)),
                _ => Err(MalformedReply::InvalidItinerary),
            })
            .collect::<Result<Vec<_>, _>>()?,
        Some(_) => return Err(MalformedReply::InvalidItinerary),
    };

    Ok(GeneratedItinerary {
        title: string_field(&obj, "title").unwrap_or_else(|| format!("{days}-Day Temple Journey")),
        duration: count_field(&obj, "duration").unwrap_or(days as i32),
        daily_itinerary,
        total_temples: count_field(&obj, "total_temples")
            .unwrap_or_else(|| fallback_total_temples(days, candidate_count)),
        estimated_cost: string_field(&obj, "estimated_cost")
            .unwrap_or_else(|| fallback_cost(days)),
        best_travel_mode: string_field(&obj, "best_travel_mode")
            .unwrap_or_else(|| FALLBACK_TRAVEL_MODE.to_string()),
    })
}

/// The deterministic itinerary used when the reply is unusable.
pub fn synthesize_itinerary(days: u32, candidate_count: usize) -> GeneratedItinerary {
    GeneratedItinerary {
        title: format!("{days}-Day Temple Pilgrimage"),
        duration: days as i32,
        daily_itinerary: fallback_days(days),
        total_temples: fallback_total_temples(days, candidate_count),
        estimated_cost: fallback_cost(days),
        best_travel_mode: FALLBACK_TRAVEL_MODE.to_string(),
    }
}

/// Remove a surrounding Markdown code fence, with or without a language tag.
///
/// Text without a leading fence is returned trimmed and otherwise intact.
pub fn strip_code_fence(reply: &str) -> &str {
    let trimmed = reply.trim();
    let Some(rest) = trimmed.strip_prefix(FENCE) else {
        return trimmed;
    };
    let tag_len = rest
        .find(|c: char| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '+')))
        .unwrap_or(rest.len());
    let body = &rest[tag_len..];
    body.trim_end()
        .strip_suffix(FENCE)
        .unwrap_or(body)
        .trim()
}

// ---------------------------------------------------------------------------
// Fallback values
// ---------------------------------------------------------------------------

fn fallback_day(index: usize) -> DayPlan {
    let day = index as i32 + 1;
    DayPlan {
        day,
        location: format!("Day {day} destination"),
        temples: to_strings(FALLBACK_TEMPLES),
        activities: to_strings(FALLBACK_ACTIVITIES),
        travel_time: FALLBACK_TRAVEL_TIME.to_string(),
        accommodation: FALLBACK_ACCOMMODATION.to_string(),
    }
}

fn fallback_days(days: u32) -> Vec<DayPlan> {
    (0..days as usize).map(fallback_day).collect()
}

fn fallback_total_temples(days: u32, candidate_count: usize) -> i32 {
    (days as usize * 2).min(candidate_count) as i32
}

fn fallback_cost(days: u32) -> String {
    let (low, high) = DAILY_COST_RANGE;
    format!("₹{}-{}", days * low, days * high)
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

// ---------------------------------------------------------------------------
// Field extraction
// ---------------------------------------------------------------------------

fn day_from_object(obj: &Map<String, Value>, index: usize) -> DayPlan {
    let defaults = fallback_day(index);
    DayPlan {
        day: count_field(obj, "day").unwrap_or(defaults.day),
        location: string_field(obj, "location").unwrap_or(defaults.location),
        temples: string_list_field(obj, "temples").unwrap_or(defaults.temples),
        activities: string_list_field(obj, "activities").unwrap_or(defaults.activities),
        travel_time: string_field(obj, "travel_time").unwrap_or(defaults.travel_time),
        accommodation: string_field(obj, "accommodation").unwrap_or(defaults.accommodation),
    }
}

fn string_field(obj: &Map<String, Value>, key: &str) -> Option<String> {
    obj.get(key).and_then(Value::as_str).map(str::to_string)
}

/// A non-negative count given either as a JSON integer or an integer string.
fn count_field(obj: &Map<String, Value>, key: &str) -> Option<i32> {
    let n = match obj.get(key)? {
        Value::Number(n) => n.as_i64()?,
        Value::String(s) => s.trim().parse::<i64>().ok()?,
        _ => return None,
    };
    i32::try_from(n).ok().filter(|n| *n >= 0)
}

/// A list of strings; a lone string becomes a one-element list.
fn string_list_field(obj: &Map<String, Value>, key: &str) -> Option<Vec<String>> {
    match obj.get(key)? {
        Value::Array(items) => Some(
            items
                .iter()
                .filter_map(|item| match item {
                    Value::String(s) => Some(s.clone()),
                    Value::Null => None,
                    other => Some(other.to_string()),
                })
                .collect(),
        ),
        Value::String(s) => Some(vec![s.clone()]),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
