mod common;

use common::TestApp;
use entity::booking;
use http::StatusCode;
use sea_orm::{EntityTrait, PaginatorTrait};
use serde_json::{json, Value};

fn booking_body(time: &str) -> Value {
    json!({
        "name": "Jane Roe",
        "email": "jane@mail.com",
        "phone": "555-0100",
        "date": "2025-03-10",
        "time": time,
        "carModel": "Corolla",
    })
}

async fn book(app: &TestApp, body: &Value) -> reqwest::Response {
    app.http
        .post(app.url("/api/test-drive"))
        .json(body)
        .send()
        .await
        .unwrap()
}

#[tokio::test]
async fn rejects_a_slot_that_is_already_booked() {
    let app = TestApp::spawn().await;

    let res = book(&app, &booking_body("14:30")).await;
    assert_eq!(res.status(), StatusCode::CREATED);

    let created: Value = res.json().await.unwrap();
    assert_eq!(created["status"], "pending");

    let res = book(&app, &booking_body("14:30")).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "This time slot is already booked");

    // other times of the same day are free
    let res = book(&app, &booking_body("15:30")).await;
    assert_eq!(res.status(), StatusCode::CREATED);

    let count = booking::Entity::find().count(&app.db).await.unwrap();
    assert_eq!(count, 2);
}

#[tokio::test]
async fn approved_bookings_keep_the_slot_and_rejected_ones_free_it() {
    let app = TestApp::spawn().await;
    let token = app.admin_token().await;

    let created: Value = book(&app, &booking_body("10:00")).await.json().await.unwrap();
    let path = format!("/api/test-drives/{}", created["id"]);

    let res = app
        .http
        .put(app.url(&path))
        .bearer_auth(&token)
        .json(&json!({ "status": "approved" }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);

    let res = book(&app, &booking_body("10:00")).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    app.http
        .put(app.url(&path))
        .bearer_auth(&token)
        .json(&json!({ "status": "rejected" }))
        .send()
        .await
        .unwrap();

    let res = book(&app, &booking_body("10:00")).await;
    assert_eq!(res.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn updating_a_missing_booking_returns_not_found() {
    let app = TestApp::spawn().await;
    let token = app.admin_token().await;

    let res = app
        .http
        .delete(app.url("/api/test-drives/999"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}
