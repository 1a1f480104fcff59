#![allow(dead_code)]

use dealership::{
    server,
    services::{llm::LlmClient, s3::ObjectStore},
};
use entity::{sea_orm_active_enums::UserRole, user};
use migration::{Migrator, MigratorTrait};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectOptions, Database, DatabaseConnection, EntityTrait,
    QueryFilter, Set,
};
use serde_json::{json, Value};
use std::net::SocketAddr;

pub const PASSWORD: &str = "supersecret123";

/// a API instance served on a random port, backed by a in memory SQLite database
pub struct TestApp {
    pub addr: SocketAddr,
    pub db: DatabaseConnection,
    pub http: reqwest::Client,
}

pub fn offline_object_store() -> ObjectStore {
    let conf = aws_sdk_s3::Config::builder()
        .behavior_version(aws_sdk_s3::config::BehaviorVersion::latest())
        .region(aws_sdk_s3::config::Region::new("us-east-1"))
        .build();

    ObjectStore::from_client(
        aws_sdk_s3::Client::from_conf(conf),
        String::from("test-bucket"),
        String::from("http://127.0.0.1:9"),
    )
}

impl TestApp {
    pub async fn spawn() -> TestApp {
        // every pooled connection to `sqlite::memory:` is a new database
        let mut opt = ConnectOptions::new("sqlite::memory:");
        opt.max_connections(1).min_connections(1).sqlx_logging(false);

        let db = Database::connect(opt)
            .await
            .expect("failed to connect to sqlite");

        Migrator::up(&db, None)
            .await
            .expect("failed to run migrations");

        let http = reqwest::Client::new();

        let router = server::controller::new(
            db.clone(),
            offline_object_store(),
            LlmClient::disabled(http.clone()),
            None,
            http.clone(),
        );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind test listener");

        let addr = listener.local_addr().expect("failed to get local addr");

        tokio::spawn(async move {
            axum::serve(
                listener,
                router.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .await
            .expect("test server error");
        });

        TestApp { addr, db, http }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub async fn sign_up(&self, email: &str) -> reqwest::Response {
        self.http
            .post(self.url("/users/signup"))
            .json(&json!({
                "email": email,
                "password": PASSWORD,
                "firstName": "John",
                "lastName": "Doe",
            }))
            .send()
            .await
            .expect("signup request failed")
    }

    /// signs in and returns the bearer token
    pub async fn login(&self, email: &str) -> String {
        let res: Value = self
            .http
            .post(self.url("/users/login"))
            .json(&json!({ "email": email, "password": PASSWORD }))
            .send()
            .await
            .expect("login request failed")
            .json()
            .await
            .expect("login response is not json");

        res["token"]
            .as_str()
            .expect("login response without token")
            .to_string()
    }

    /// creates a user and returns its token
    pub async fn user_token(&self, email: &str) -> String {
        self.sign_up(email).await;
        self.login(email).await
    }

    /// creates a admin user and returns its token
    pub async fn admin_token(&self) -> String {
        let email = "admin@dealership.com";
        self.sign_up(email).await;

        let admin = user::Entity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await
            .expect("failed to query admin")
            .expect("admin was not created");

        let mut admin: user::ActiveModel = admin.into();
        admin.role = Set(UserRole::Admin);
        admin.update(&self.db).await.expect("failed to promote admin");

        self.login(email).await
    }

    /// creates a car as a admin, `fields` override the defaults of the form
    pub async fn create_car(&self, token: &str, fields: &[(&str, &str)]) -> reqwest::Response {
        let mut values = vec![
            ("brand", "Toyota"),
            ("model", "Corolla"),
            ("year", "2021"),
            ("price", "18500"),
            ("mileage", "12000"),
            ("fuel", "Petrol"),
            ("transmission", "Automatic"),
            ("description", "Well kept"),
            ("color", "White"),
            ("condition", "Used"),
        ];

        for (key, value) in fields {
            values.retain(|(k, _)| k != key);
            values.push((*key, *value));
        }

        let form = values
            .into_iter()
            .fold(reqwest::multipart::Form::new(), |form, (k, v)| {
                form.text(k.to_string(), v.to_string())
            });

        self.http
            .post(self.url("/api/cars"))
            .bearer_auth(token)
            .multipart(form)
            .send()
            .await
            .expect("create car request failed")
    }
}
