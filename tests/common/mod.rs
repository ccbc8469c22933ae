#![allow(dead_code)]

use actix_http::Request;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::{test, web, App, Error};
use chrono::Utc;
use serde_json::{json, Value};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

use handygo::{auth, db, models, routes, state::AppState};

/// One connection only, so every query sees the same in-memory database.
pub async fn test_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory pool");
    db::run_migrations(&pool).await.expect("migrations");
    pool
}

pub async fn spawn_app(
    pool: &SqlitePool,
) -> impl Service<Request, Response = ServiceResponse, Error = Error> {
    test::init_service(
        App::new()
            .app_data(web::Data::new(AppState { db: pool.clone() }))
            .configure(routes::common::configure)
            .configure(routes::serviceman::configure)
            .configure(routes::customer::configure)
            .configure(routes::admin::configure),
    )
    .await
}

/// Inserts an admin directly and returns (email, bearer token).
pub async fn seed_admin_session(pool: &SqlitePool) -> (String, String) {
    let id = auth::new_id();
    let email = format!("{id}@admin.test");
    let hash = auth::hash_password("sekrit").expect("hash");
    sqlx::query(
        r#"INSERT INTO admins (id, username, full_name, email, phone_number, password_hash, created_at)
           VALUES (?, 'root', 'Root Admin', ?, '5550000', ?, ?)"#,
    )
    .bind(&id)
    .bind(&email)
    .bind(&hash)
    .bind(Utc::now().to_rfc3339())
    .execute(pool)
    .await
    .expect("insert admin");

    let token = auth::issue_session(pool, &id, models::SESSION_ADMIN)
        .await
        .expect("session");
    (email, token)
}

/// Signs an account up through the API and returns the response data
/// (`token`, `id`, `isServiceman`).
pub async fn signup<S>(
    app: &S,
    name: &str,
    email: &str,
    professional: bool,
    services: &[&str],
) -> Value
where
    S: Service<Request, Response = ServiceResponse, Error = Error>,
{
    let selected: Vec<Value> = services.iter().map(|name| json!({ "name": name })).collect();
    let resp = test::TestRequest::post()
        .uri("/api/signup")
        .set_json(json!({
            "name": name,
            "phone": "5551234",
            "email": email,
            "address": "1 Main St",
            "password": "hunter2",
            "selectedServices": selected,
            "isProfessional": professional,
        }))
        .send_request(app)
        .await;
    assert_eq!(resp.status().as_u16(), 201, "signup should succeed");
    let body: Value = test::read_body_json(resp).await;
    body["data"].clone()
}

/// Creates a booking through the API and returns its wire record.
pub async fn create_booking<S>(app: &S, service: &str, customer: &str, serviceman: &str) -> Value
where
    S: Service<Request, Response = ServiceResponse, Error = Error>,
{
    let resp = test::TestRequest::post()
        .uri("/api/booking")
        .set_json(booking_payload(service, customer, serviceman))
        .send_request(app)
        .await;
    assert_eq!(resp.status().as_u16(), 200, "booking create should succeed");
    let body: Value = test::read_body_json(resp).await;
    body["data"].clone()
}

pub fn booking_payload(service: &str, customer: &str, serviceman: &str) -> Value {
    json!({
        "serviceName": service,
        "associatedServiceman": serviceman,
        "associatedCustomer": customer,
        "address": "1 Main St",
        "phoneNumber": "5551234",
        "note": "ring the bell",
        "fullName": "Jo Customer",
        "offerPrice": "120",
        "serviceDate": "2026-09-15T10:00:00Z",
    })
}
