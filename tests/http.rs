use std::sync::Arc;

use serde::Deserialize;
use serde_json::json;
use warp::http::StatusCode;
use warp::hyper::body::Bytes;
use warp::reply::Reply;
use warp::Filter;

use devevent::db::MemoryDb;
use devevent::environment::Environment;
use devevent::routes;
use devevent::urls::Urls;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct EventResponse {
    message: String,
    event: EventBody,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct EventsResponse {
    message: String,
    events: Vec<EventBody>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SimilarResponse {
    events: Vec<EventBody>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CountResponse {
    count: i64,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct BookingResponse {
    message: String,
    booking: BookingBody,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ErrorResponse {
    operation: String,
    slug: Option<String>,
    id: Option<String>,
    message: String,
}

#[derive(Debug, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
struct EventBody {
    id: String,
    slug: String,
    title: String,
    description: String,
    overview: String,
    image: String,
    venue: String,
    location: String,
    date: String,
    time: String,
    mode: String,
    audience: String,
    agenda: Vec<String>,
    organizer: String,
    tags: Vec<String>,
    created_at: i64,
    updated_at: i64,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct BookingBody {
    id: String,
    event_id: String,
    email: String,
    created_at: i64,
    updated_at: i64,
}

const BASE_URL: &str = "https://devevent.example.com/";
const API_PATH: &str = "api";

fn make_routes() -> impl Filter<Extract = (impl Reply,), Error = warp::Rejection> + Clone {
    let environment = Environment::new(
        Arc::new(log::discard_logger()),
        Arc::new(MemoryDb::new()),
        Arc::new(Urls::new(BASE_URL, API_PATH)),
    );

    routes::make_api_routes(environment)
}

fn event_submission(title: &str, tags: serde_json::Value) -> serde_json::Value {
    json!({
        "title": title,
        "slug": "ignored-slug",
        "description": "An evening of talks.",
        "overview": "Talks and networking.",
        "image": "https://cdn.example.com/event.png",
        "venue": " Main Hall ",
        "location": "Berlin",
        "date": "November 22, 2025",
        "time": "9:05",
        "mode": "offline",
        "audience": "Developers",
        "agenda": "Intro, Keynote, , Networking",
        "organizer": "Rust Berlin",
        "tags": tags,
    })
}

fn parse<'a, T: Deserialize<'a>>(body: &'a Bytes) -> T {
    serde_json::from_slice(body).unwrap_or_else(|e| {
        panic!(
            "parse response {:?}: {}",
            String::from_utf8_lossy(body),
            e
        )
    })
}

async fn create(
    filter: &(impl Filter<Extract = (impl Reply,), Error = warp::Rejection> + Clone + 'static),
    body: &serde_json::Value,
) -> warp::http::Response<Bytes> {
    warp::test::request()
        .method("POST")
        .path("/api/events")
        .json(body)
        .reply(filter)
        .await
}

#[tokio::test]
async fn events_can_be_created_and_fetched() {
    let filter = make_routes();

    let response = create(&filter, &event_submission("  Rust Meetup: Berlin!  ", json!(["rust", " meetup "]))).await;

    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(
        response.headers()["location"],
        "https://devevent.example.com/api/events/rust-meetup-berlin"
    );
    assert!(response.headers().contains_key("server-timing"));

    let created: EventResponse = parse(response.body());
    assert_eq!(created.message, "Event created successfully.");
    assert_eq!(created.event.slug, "rust-meetup-berlin");
    assert_eq!(created.event.title, "Rust Meetup: Berlin!");
    assert_eq!(created.event.venue, "Main Hall");
    assert_eq!(created.event.date, "2025-11-22");
    assert_eq!(created.event.time, "09:05");
    assert_eq!(created.event.agenda, vec!["Intro", "Keynote", "Networking"]);
    assert_eq!(created.event.tags, vec!["rust", "meetup"]);

    let response = warp::test::request()
        .path("/api/events/rust-meetup-berlin")
        .reply(&filter)
        .await;

    assert_eq!(response.status(), StatusCode::OK);

    let fetched: EventResponse = parse(response.body());
    assert_eq!(fetched.message, "Event fetched successfully.");
    assert_eq!(fetched.event, created.event);
}

#[tokio::test]
async fn events_are_listed_newest_first() {
    let filter = make_routes();

    for title in &["First", "Second"] {
        let response = create(&filter, &event_submission(title, json!(["rust"]))).await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = warp::test::request().path("/api/events").reply(&filter).await;

    assert_eq!(response.status(), StatusCode::OK);

    let listed: EventsResponse = parse(response.body());
    assert_eq!(listed.message, "Events fetched successfully.");
    assert_eq!(
        listed.events.iter().map(|e| e.slug.as_str()).collect::<Vec<_>>(),
        vec!["second", "first"]
    );
}

#[tokio::test]
async fn bad_events_are_rejected() {
    let filter = make_routes();

    let mut missing_venue = event_submission("Rust Meetup", json!(["rust"]));
    missing_venue["venue"] = json!("   ");

    let response = create(&filter, &missing_venue).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let error: ErrorResponse = parse(response.body());
    assert_eq!(error.operation, "create_event");
    assert_eq!(
        error.message,
        "Field \"venue\" is required and must be a non-empty string."
    );

    let response = create(&filter, &event_submission("Rust Meetup", json!(["valid", "   "]))).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let error: ErrorResponse = parse(response.body());
    assert!(error.message.contains("Tags"));

    let mut bad_time = event_submission("Rust Meetup", json!(["rust"]));
    bad_time["time"] = json!("24:00");

    let response = create(&filter, &bad_time).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let error: ErrorResponse = parse(response.body());
    assert_eq!(error.message, "Hour must be between 0 and 23.");

    let response = warp::test::request().path("/api/events").reply(&filter).await;
    let listed: EventsResponse = parse(response.body());
    assert!(listed.events.is_empty());

    let response = warp::test::request()
        .method("POST")
        .path("/api/events")
        .body("{not json")
        .reply(&filter)
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn duplicate_slugs_conflict() {
    let filter = make_routes();

    let response = create(&filter, &event_submission("Rust Meetup", json!(["rust"]))).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = create(&filter, &event_submission("rust   meetup!!", json!(["rust"]))).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn unknown_slugs_are_not_found() {
    let filter = make_routes();

    let response = warp::test::request()
        .path("/api/events/nothing-here")
        .reply(&filter)
        .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let error: ErrorResponse = parse(response.body());
    assert_eq!(error.operation, "retrieve_event");
    assert_eq!(error.slug.as_deref(), Some("nothing-here"));
    assert_eq!(error.id, None);
    assert_eq!(error.message, "Event not found for the given slug.");

    let response = warp::test::request()
        .method("DELETE")
        .path("/api/events/nothing-here")
        .reply(&filter)
        .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn events_can_be_updated_and_deleted() {
    let filter = make_routes();

    let response = create(&filter, &event_submission("Rust Meetup", json!(["rust"]))).await;
    let created: EventResponse = parse(response.body());

    let response = warp::test::request()
        .method("PUT")
        .path("/api/events/rust-meetup")
        .json(&event_submission("Rust Meetup Reloaded", json!("rust, wasm")))
        .reply(&filter)
        .await;

    assert_eq!(response.status(), StatusCode::OK);

    let updated: EventResponse = parse(response.body());
    assert_eq!(updated.message, "Event updated successfully.");
    assert_eq!(updated.event.id, created.event.id);
    assert_eq!(updated.event.slug, "rust-meetup-reloaded");
    assert_eq!(updated.event.tags, vec!["rust", "wasm"]);

    let response = warp::test::request()
        .method("DELETE")
        .path("/api/events/rust-meetup-reloaded")
        .reply(&filter)
        .await;

    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = warp::test::request()
        .path("/api/events/rust-meetup-reloaded")
        .reply(&filter)
        .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn similar_events_share_tags() {
    let filter = make_routes();

    for (title, tags) in &[
        ("Rust Conf", json!(["rust", "systems"])),
        ("Wasm Day", json!(["wasm", "rust"])),
        ("Go Time", json!(["go"])),
    ] {
        create(&filter, &event_submission(title, tags.clone())).await;
    }

    let response = warp::test::request()
        .path("/api/events/rust-conf/similar")
        .reply(&filter)
        .await;

    assert_eq!(response.status(), StatusCode::OK);

    let similar: SimilarResponse = parse(response.body());
    assert_eq!(
        similar.events.iter().map(|e| e.slug.as_str()).collect::<Vec<_>>(),
        vec!["wasm-day"]
    );

    let response = warp::test::request()
        .path("/api/events/unknown/similar")
        .reply(&filter)
        .await;

    assert_eq!(response.status(), StatusCode::OK);

    let similar: SimilarResponse = parse(response.body());
    assert!(similar.events.is_empty());
}

#[tokio::test]
async fn bookings_are_checked_and_counted() {
    let filter = make_routes();

    let response = create(&filter, &event_submission("Rust Meetup", json!(["rust"]))).await;
    let created: EventResponse = parse(response.body());

    let response = warp::test::request()
        .method("POST")
        .path("/api/bookings")
        .json(&json!({ "eventId": created.event.id, "email": " valid.user@example.com " }))
        .reply(&filter)
        .await;

    assert_eq!(response.status(), StatusCode::CREATED);

    let booking: BookingResponse = parse(response.body());
    assert_eq!(booking.message, "Booking created successfully.");
    assert_eq!(booking.booking.event_id, created.event.id);
    assert_eq!(booking.booking.email, "valid.user@example.com");

    let response = warp::test::request()
        .method("POST")
        .path("/api/bookings")
        .json(&json!({ "event_id": created.event.id, "email": "invalid-email-format" }))
        .reply(&filter)
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let error: ErrorResponse = parse(response.body());
    assert_eq!(error.operation, "create_booking");
    assert_eq!(error.message, "A valid, non-empty email is required.");

    let response = warp::test::request()
        .method("POST")
        .path("/api/bookings")
        .json(&json!({
            "event_id": "6f9619ff-8b86-d011-b42d-00c04fc964ff",
            "email": "user@example.com",
        }))
        .reply(&filter)
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let error: ErrorResponse = parse(response.body());
    assert_eq!(error.message, "Referenced event does not exist.");

    let response = warp::test::request()
        .path("/api/events/rust-meetup/bookings/count")
        .reply(&filter)
        .await;

    assert_eq!(response.status(), StatusCode::OK);

    let count: CountResponse = parse(response.body());
    assert_eq!(count.count, 1);

    let response = warp::test::request()
        .method("DELETE")
        .path(&format!("/api/bookings/{}", booking.booking.id))
        .reply(&filter)
        .await;

    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = warp::test::request()
        .method("DELETE")
        .path(&format!("/api/bookings/{}", booking.booking.id))
        .reply(&filter)
        .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = warp::test::request()
        .method("DELETE")
        .path("/api/bookings/not-a-uuid")
        .reply(&filter)
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let error: ErrorResponse = parse(response.body());
    assert_eq!(error.operation, "delete_booking");
    assert_eq!(error.id.as_deref(), Some("not-a-uuid"));
}
