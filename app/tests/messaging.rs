mod common;

use common::TestApp;
use entity::{chat_log, message};
use http::StatusCode;
use sea_orm::EntityTrait;
use serde_json::{json, Value};

#[tokio::test]
async fn contact_form_requires_every_field() {
    let app = TestApp::spawn().await;

    let res = app
        .http
        .post(app.url("/api/submit"))
        .json(&json!({ "fullName": "Jane Roe", "email": "jane@mail.com", "topic": "Financing" }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "All fields are required.");

    let res = app
        .http
        .post(app.url("/api/submit"))
        .json(&json!({
            "fullName": "Jane Roe",
            "email": "jane@mail.com",
            "topic": "Financing",
            "message": "Do you offer leasing?",
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::CREATED);

    let saved = message::Entity::find().all(&app.db).await.unwrap();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].topic, "Financing");
}

#[tokio::test]
async fn chatbot_answers_and_logs_anonymous_turns() {
    let app = TestApp::spawn().await;

    let res = app
        .http
        .post(app.url("/api/chat"))
        .json(&json!({ "message": "Hello" }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);

    let body: Value = res.json().await.unwrap();
    assert_eq!(body["reply"], "Hello! How can I help you find your perfect car today?");

    let logs = chat_log::Entity::find().all(&app.db).await.unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].user, "anonymous");
    assert_eq!(logs[0].message, "Hello");
}

#[tokio::test]
async fn chatbot_lists_cheapest_available_cars() {
    let app = TestApp::spawn().await;
    let token = app.admin_token().await;

    app.create_car(&token, &[("model", "Mustang"), ("price", "45000")])
        .await;
    app.create_car(&token, &[("model", "Corolla"), ("price", "18500")])
        .await;
    app.create_car(&token, &[("model", "Camry"), ("price", "9000"), ("status", "sold")])
        .await;

    let body: Value = app
        .http
        .post(app.url("/api/chat"))
        .bearer_auth(&token)
        .json(&json!({ "message": "what are your prices?" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(
        body["reply"],
        "Here are some of our most affordable cars:\nToyota Corolla (2021) - $18,500\nToyota Mustang (2021) - $45,000"
    );

    let logs = chat_log::Entity::find().all(&app.db).await.unwrap();
    assert_eq!(logs[0].user, "admin@dealership.com");
}

#[tokio::test]
async fn chatbot_requires_a_message() {
    let app = TestApp::spawn().await;

    let res = app
        .http
        .post(app.url("/api/chat"))
        .json(&json!({ "message": "" }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn admin_chat_conversations() {
    let app = TestApp::spawn().await;
    let admin_token = app.admin_token().await;

    let res = app.sign_up("buyer@mail.com").await;
    let buyer: Value = res.json().await.unwrap();
    let buyer_id = buyer["user"]["id"].as_i64().unwrap();

    let res = app
        .http
        .post(app.url("/api/admin-chat/send"))
        .bearer_auth(&admin_token)
        .json(&json!({ "receiverId": buyer_id, "message": "Your car is ready" }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::CREATED);

    let res = app
        .http
        .post(app.url("/api/admin-chat/send"))
        .bearer_auth(&admin_token)
        .json(&json!({ "receiverId": 9999, "message": "Hello?" }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let conversations: Vec<Value> = app
        .http
        .get(app.url("/api/admin-chat/conversations"))
        .bearer_auth(&admin_token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(conversations.len(), 1);
    assert_eq!(conversations[0]["userId"], buyer_id);
    assert_eq!(conversations[0]["lastMessage"]["message"], "Your car is ready");

    let history: Vec<Value> = app
        .http
        .get(app.url(&format!("/api/admin-chat/history/{}", buyer_id)))
        .bearer_auth(&admin_token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(history.len(), 1);
}

#[tokio::test]
async fn footer_is_created_on_first_read() {
    let app = TestApp::spawn().await;

    let res = app.http.get(app.url("/api/footer")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let first: Value = res.json().await.unwrap();

    let second: Value = app
        .http
        .get(app.url("/api/footer"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(first["id"], second["id"]);
}
