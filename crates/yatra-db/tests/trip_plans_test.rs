//! Integration tests for trip plan storage.

use uuid::Uuid;

use yatra_db::models::{DayPlan, ItineraryOrigin};
use yatra_db::queries::trip_plans::{self, NewTripPlan};
use yatra_test_utils::{create_test_db, drop_test_db};

fn sample_days() -> Vec<DayPlan> {
    vec![
        DayPlan {
            day: 1,
            location: "Madurai".to_string(),
            temples: vec!["Meenakshi Amman Temple".to_string()],
            activities: vec!["Evening aarti".to_string()],
            travel_time: "1 hour".to_string(),
            accommodation: "Near the east tower".to_string(),
        },
        DayPlan {
            day: 2,
            location: "Thanjavur".to_string(),
            temples: vec!["Brihadishvara Temple".to_string()],
            activities: vec!["Palace visit".to_string()],
            travel_time: "3 hours".to_string(),
            accommodation: "Thanjavur town".to_string(),
        },
    ]
}

#[tokio::test]
async fn insert_and_get_trip_plan() {
    let (pool, db_name) = create_test_db().await;

    let days = sample_days();
    let id = Uuid::new_v4();
    let stored = trip_plans::insert_trip_plan(
        &pool,
        &NewTripPlan {
            id,
            title: "Tamil Nadu Temple Trail",
            duration: 2,
            daily_itinerary: &days,
            total_temples: 2,
            estimated_cost: "₹6000-10000",
            best_travel_mode: "Train",
            origin: ItineraryOrigin::Model,
            starting_location: "Chennai",
        },
    )
    .await
    .expect("insert_trip_plan should succeed");

    assert_eq!(stored.id, id);
    assert_eq!(stored.origin, ItineraryOrigin::Model);

    let fetched = trip_plans::get_trip_plan(&pool, id)
        .await
        .expect("get_trip_plan should succeed")
        .expect("plan should exist");
    assert_eq!(fetched.title, "Tamil Nadu Temple Trail");
    assert_eq!(fetched.duration, 2);
    assert_eq!(fetched.daily_itinerary.0, days);
    assert_eq!(fetched.estimated_cost, "₹6000-10000");
    assert_eq!(fetched.starting_location, "Chennai");
    assert_eq!(fetched.created_at, stored.created_at);

    pool.close().await;
    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn get_unknown_trip_plan_returns_none() {
    let (pool, db_name) = create_test_db().await;

    let missing = trip_plans::get_trip_plan(&pool, Uuid::new_v4())
        .await
        .expect("get_trip_plan should succeed");
    assert!(missing.is_none());

    pool.close().await;
    drop_test_db(&db_name).await;
}

#[tokio::test]
async fn duplicate_trip_plan_id_is_rejected() {
    let (pool, db_name) = create_test_db().await;

    let new = NewTripPlan {
        id: Uuid::new_v4(),
        title: "1-Day Temple Pilgrimage",
        duration: 1,
        daily_itinerary: &[],
        total_temples: 0,
        estimated_cost: "₹3000-5000",
        best_travel_mode: "Car/Taxi",
        origin: ItineraryOrigin::Fallback,
        starting_location: "Delhi",
    };
    trip_plans::insert_trip_plan(&pool, &new).await.unwrap();
    let second = trip_plans::insert_trip_plan(&pool, &new).await;
    assert!(second.is_err(), "plans are immutable once written");

    assert_eq!(trip_plans::count_trip_plans(&pool).await.unwrap(), 1);

    pool.close().await;
    drop_test_db(&db_name).await;
}
