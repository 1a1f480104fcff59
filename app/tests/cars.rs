mod common;

use chrono::Utc;
use common::{offline_object_store, TestApp};
use dealership::{
    modules::car::{images::orphaned_image_keys, repository::referenced_image_urls},
    services::s3::StoredObject,
};
use entity::car::{self, CarImage, CarImages};
use http::StatusCode;
use sea_orm::{ActiveModelTrait, EntityTrait, Set};
use serde_json::{json, Value};
use std::collections::HashSet;

#[tokio::test]
async fn car_created_without_images_gets_placeholders() {
    let app = TestApp::spawn().await;
    let token = app.admin_token().await;

    let res = app.create_car(&token, &[]).await;
    assert_eq!(res.status(), StatusCode::CREATED);

    let created: Value = res.json().await.unwrap();

    assert_eq!(
        created["images"],
        json!([
            { "url": "url_to_exterior2.jpg", "exists": false },
            { "url": "url_to_interior2.jpg", "exists": false },
        ])
    );
    assert_eq!(created["status"], "available");
}

#[tokio::test]
async fn only_admins_create_cars() {
    let app = TestApp::spawn().await;
    let token = app.user_token("buyer@mail.com").await;

    let res = app.create_car(&token, &[]).await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = app
        .http
        .post(app.url("/api/cars"))
        .multipart(reqwest::multipart::Form::new().text("brand", "Toyota"))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn filters_cars_by_drive_train_ignoring_case() {
    let app = TestApp::spawn().await;
    let token = app.admin_token().await;

    app.create_car(&token, &[("model", "RAV4"), ("driveTrain", "awd")])
        .await;
    app.create_car(&token, &[("model", "Corolla"), ("driveTrain", "FWD")])
        .await;
    app.create_car(&token, &[("model", "Yaris")]).await;

    let cars: Vec<Value> = app
        .http
        .get(app.url("/api/cars?driveTrain=aWd"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(cars.len(), 1);
    assert_eq!(cars[0]["model"], "RAV4");
    assert_eq!(cars[0]["driveTrain"], "AWD");

    let all: Vec<Value> = app
        .http
        .get(app.url("/api/cars"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(all.len(), 3);
}

#[tokio::test]
async fn rejects_unknown_drive_train() {
    let app = TestApp::spawn().await;

    let res = app
        .http
        .get(app.url("/api/cars?driveTrain=hovercraft"))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn deleting_missing_car_returns_not_found() {
    let app = TestApp::spawn().await;
    let token = app.admin_token().await;

    let res = app
        .http
        .delete(app.url("/api/cars/4242"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "Car not found");
}

#[tokio::test]
async fn bulk_delete_rejects_invalid_ids() {
    let app = TestApp::spawn().await;
    let token = app.admin_token().await;

    let created: Value = app.create_car(&token, &[]).await.json().await.unwrap();

    let res = app
        .http
        .delete(app.url("/api/cars/bulk-delete"))
        .bearer_auth(&token)
        .json(&json!({ "carIds": [created["id"], "not-an-id"] }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "Invalid car IDs provided");
    assert_eq!(body["info"], json!(["not-an-id"]));

    // nothing is deleted when a single id is invalid
    let cars = car::Entity::find().all(&app.db).await.unwrap();
    assert_eq!(cars.len(), 1);
}

#[tokio::test]
async fn bulk_deletes_cars() {
    let app = TestApp::spawn().await;
    let token = app.admin_token().await;

    let first: Value = app.create_car(&token, &[]).await.json().await.unwrap();
    let second: Value = app.create_car(&token, &[]).await.json().await.unwrap();
    app.create_car(&token, &[]).await;

    let id_as_string = second["id"].as_i64().unwrap().to_string();

    let res = app
        .http
        .delete(app.url("/api/cars/bulk-delete"))
        .bearer_auth(&token)
        .json(&json!({ "carIds": [first["id"], id_as_string] }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);

    let body: Value = res.json().await.unwrap();
    assert_eq!(body["deletedCount"], 2);
    assert_eq!(body["message"], "Successfully deleted 2 cars");

    let res = app
        .http
        .delete(app.url("/api/cars/bulk-delete"))
        .bearer_auth(&token)
        .json(&json!({ "carIds": [first["id"]] }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn bulk_deleted_car_images_are_swept_unless_shared() {
    let app = TestApp::spawn().await;
    let token = app.admin_token().await;
    let store = offline_object_store();

    let image = |key: &str| CarImage {
        url: store.public_url(key),
        exists: true,
    };

    let mut ids = Vec::new();

    for images in [
        vec![image("own.jpg"), image("shared.jpg")],
        vec![image("shared.jpg")],
    ] {
        let created: Value = app.create_car(&token, &[]).await.json().await.unwrap();
        let id = created["id"].as_i64().unwrap() as i32;

        car::ActiveModel {
            id: Set(id),
            images: Set(CarImages(images)),
            ..Default::default()
        }
        .update(&app.db)
        .await
        .unwrap();

        ids.push(id);
    }

    let res = app
        .http
        .delete(app.url("/api/cars/bulk-delete"))
        .bearer_auth(&token)
        .json(&json!({ "carIds": [ids[0]] }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);

    let referenced: HashSet<String> = referenced_image_urls(&app.db)
        .await
        .unwrap()
        .iter()
        .filter_map(|url| store.key_from_url(url))
        .collect();

    let an_hour_ago = Utc::now() - chrono::Duration::hours(1);

    let stored = ["own.jpg", "shared.jpg"].map(|key| StoredObject {
        key: String::from(key),
        last_modified: an_hour_ago - chrono::Duration::minutes(1),
    });

    assert_eq!(
        orphaned_image_keys(stored.to_vec(), &referenced, an_hour_ago),
        vec![String::from("own.jpg")]
    );
}
