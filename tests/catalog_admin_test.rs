mod common;

use actix_web::test;
use serde_json::{json, Value};

#[actix_web::test]
async fn admin_scope_requires_a_bearer_token() {
    let pool = common::test_pool().await;
    let app = common::spawn_app(&pool).await;

    let resp = test::TestRequest::get()
        .uri("/api/admin/users")
        .send_request(&app)
        .await;
    assert_eq!(resp.status().as_u16(), 401);

    let resp = test::TestRequest::get()
        .uri("/api/admin/users")
        .insert_header(("Authorization", "Bearer not-a-session"))
        .send_request(&app)
        .await;
    assert_eq!(resp.status().as_u16(), 401);
}

#[actix_web::test]
async fn service_membership_end_to_end() {
    let pool = common::test_pool().await;
    let app = common::spawn_app(&pool).await;
    let (_email, token) = common::seed_admin_session(&pool).await;

    let resp = test::TestRequest::post()
        .uri("/api/admin/services")
        .insert_header(("Authorization", format!("Bearer {token}")))
        .set_json(json!({ "name": "Plumbing", "keyWord": "plumb01" }))
        .send_request(&app)
        .await;
    assert_eq!(resp.status().as_u16(), 200);

    let user = common::signup(&app, "Flo", "flo@example.com", true, &["Plumbing"]).await;
    let user_id = user["id"].as_str().unwrap();

    // Lookup is case-normalized; the new account is in the member set.
    let resp = test::TestRequest::get()
        .uri("/api/services/Plumbing")
        .send_request(&app)
        .await;
    assert_eq!(resp.status().as_u16(), 200);
    let body: Value = test::read_body_json(resp).await;
    let members = body["data"].as_array().unwrap();
    assert_eq!(members.len(), 1);
    assert_eq!(members[0]["id"], user_id);
    assert!(members[0].get("passwordHash").is_none());

    let resp = test::TestRequest::get()
        .uri("/api/services")
        .send_request(&app)
        .await;
    let body: Value = test::read_body_json(resp).await;
    let services = body["data"].as_array().unwrap();
    assert_eq!(services.len(), 1);
    assert_eq!(services[0]["serviceName"], "plumbing");
    assert_eq!(services[0]["associatedServicemen"][0], user_id);
}

#[actix_web::test]
async fn unknown_service_lookup_is_not_found() {
    let pool = common::test_pool().await;
    let app = common::spawn_app(&pool).await;

    let resp = test::TestRequest::get()
        .uri("/api/services/welding")
        .send_request(&app)
        .await;
    assert_eq!(resp.status().as_u16(), 404);
}

#[actix_web::test]
async fn duplicate_service_name_conflicts() {
    let pool = common::test_pool().await;
    let app = common::spawn_app(&pool).await;
    let (_email, token) = common::seed_admin_session(&pool).await;

    for (expected, name) in [(200, "Cleaning"), (409, "cleaning")] {
        let resp = test::TestRequest::post()
            .uri("/api/admin/services")
            .insert_header(("Authorization", format!("Bearer {token}")))
            .set_json(json!({ "name": name, "keyWord": "cln01" }))
            .send_request(&app)
            .await;
        assert_eq!(resp.status().as_u16(), expected);
    }
}

#[actix_web::test]
async fn admin_can_create_and_list_admins() {
    let pool = common::test_pool().await;
    let app = common::spawn_app(&pool).await;
    let (_email, token) = common::seed_admin_session(&pool).await;

    let resp = test::TestRequest::post()
        .uri("/api/admin/admins")
        .insert_header(("Authorization", format!("Bearer {token}")))
        .set_json(json!({
            "username": "ops",
            "fullName": "Ops Admin",
            "email": "ops@example.com",
            "phone": "5552222",
            "password": "opspass",
        }))
        .send_request(&app)
        .await;
    assert_eq!(resp.status().as_u16(), 200);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["username"], "ops");
    assert!(body["data"].get("passwordHash").is_none());

    let resp = test::TestRequest::get()
        .uri("/api/admin/admins")
        .insert_header(("Authorization", format!("Bearer {token}")))
        .send_request(&app)
        .await;
    assert_eq!(resp.status().as_u16(), 200);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
}

#[actix_web::test]
async fn block_flags_the_account() {
    let pool = common::test_pool().await;
    let app = common::spawn_app(&pool).await;
    let (_email, token) = common::seed_admin_session(&pool).await;

    let user = common::signup(&app, "Gil", "gil@example.com", false, &[]).await;
    let user_id = user["id"].as_str().unwrap();

    let resp = test::TestRequest::post()
        .uri("/api/admin/block")
        .insert_header(("Authorization", format!("Bearer {token}")))
        .set_json(json!({ "userId": user_id }))
        .send_request(&app)
        .await;
    assert_eq!(resp.status().as_u16(), 200);

    let resp = test::TestRequest::get()
        .uri("/api/admin/users")
        .insert_header(("Authorization", format!("Bearer {token}")))
        .send_request(&app)
        .await;
    let body: Value = test::read_body_json(resp).await;
    let users = body["data"].as_array().unwrap();
    assert_eq!(users[0]["isBlocked"], true);

    let resp = test::TestRequest::post()
        .uri("/api/admin/block")
        .insert_header(("Authorization", format!("Bearer {token}")))
        .set_json(json!({ "userId": "missing" }))
        .send_request(&app)
        .await;
    assert_eq!(resp.status().as_u16(), 404);
}

#[actix_web::test]
async fn profile_lookup_by_id_and_name() {
    let pool = common::test_pool().await;
    let app = common::spawn_app(&pool).await;

    let user = common::signup(&app, "Hana", "hana@example.com", false, &[]).await;
    let user_id = user["id"].as_str().unwrap();

    let resp = test::TestRequest::get()
        .uri(&format!("/api/profile?query={user_id}"))
        .send_request(&app)
        .await;
    assert_eq!(resp.status().as_u16(), 200);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["name"], "Hana");

    let resp = test::TestRequest::get()
        .uri("/api/profile?query=Hana")
        .send_request(&app)
        .await;
    assert_eq!(resp.status().as_u16(), 200);

    let resp = test::TestRequest::get()
        .uri("/api/profile?query=Nobody")
        .send_request(&app)
        .await;
    assert_eq!(resp.status().as_u16(), 404);
}

#[actix_web::test]
async fn contact_form_accepts_a_message() {
    let pool = common::test_pool().await;
    let app = common::spawn_app(&pool).await;

    let resp = test::TestRequest::post()
        .uri("/api/contact")
        .set_json(json!({
            "userEmail": "iris@example.com",
            "userName": "Iris",
            "message": "How do I rebook?",
        }))
        .send_request(&app)
        .await;
    assert_eq!(resp.status().as_u16(), 200);

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM contacts")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 1);
}
