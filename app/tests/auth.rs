mod common;

use common::TestApp;
use entity::user;
use http::StatusCode;
use sea_orm::{EntityTrait, PaginatorTrait};
use serde_json::{json, Value};

#[tokio::test]
async fn signup_with_a_registered_email_is_rejected() {
    let app = TestApp::spawn().await;

    let res = app.sign_up("john@mail.com").await;
    assert_eq!(res.status(), StatusCode::CREATED);

    let body: Value = res.json().await.unwrap();
    assert_eq!(body["user"]["displayName"], "John Doe");
    assert_eq!(body["user"]["role"], "user");
    assert!(body["user"].get("password").is_none());

    let res = app.sign_up("john@mail.com").await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "Email already registered");

    let users = user::Entity::find().count(&app.db).await.unwrap();
    assert_eq!(users, 1);
}

#[tokio::test]
async fn signup_requires_every_field() {
    let app = TestApp::spawn().await;

    let res = app
        .http
        .post(app.url("/users/signup"))
        .json(&json!({ "email": "john@mail.com", "password": "supersecret123" }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "Missing required fields");
}

#[tokio::test]
async fn login_with_a_wrong_password_is_unauthorized() {
    let app = TestApp::spawn().await;
    app.sign_up("john@mail.com").await;

    let res = app
        .http
        .post(app.url("/users/login"))
        .json(&json!({ "email": "john@mail.com", "password": "wrong-password" }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "Invalid email or password");
}

#[tokio::test]
async fn bearer_token_authenticates_the_user() {
    let app = TestApp::spawn().await;
    let token = app.user_token("john@mail.com").await;

    let res = app
        .http
        .get(app.url("/users/current-user"))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = app
        .http
        .get(app.url("/users/current-user"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);

    let body: Value = res.json().await.unwrap();
    assert_eq!(body["email"], "john@mail.com");

    let res = app
        .http
        .get(app.url("/api/profile"))
        .bearer_auth("not-a-jwt")
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn admin_routes_require_the_admin_role() {
    let app = TestApp::spawn().await;
    let user_token = app.user_token("john@mail.com").await;
    let admin_token = app.admin_token().await;

    let res = app
        .http
        .get(app.url("/api/admin"))
        .bearer_auth(&user_token)
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = app
        .http
        .get(app.url("/users"))
        .bearer_auth(&admin_token)
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);

    let users: Vec<Value> = res.json().await.unwrap();
    assert_eq!(users.len(), 2);
}

#[tokio::test]
async fn google_sign_in_is_unavailable_without_credentials() {
    let app = TestApp::spawn().await;

    let res = app.http.get(app.url("/auth/google")).send().await.unwrap();

    assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
}
