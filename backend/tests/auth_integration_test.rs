//! Integration tests for authentication endpoints

mod common;

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use classroom_backend::auth::RevocationStore;
use common::{json_body, unique_student_id, PASSWORD};
use serde_json::json;

fn signup_body(student_id: &str, email: &str, password: &str) -> serde_json::Value {
    json!({
        "name": "Kim Minji",
        "student_id": student_id,
        "department": "Mathematics",
        "email": email,
        "password": password,
        "role": "STUDENT",
    })
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_signup_success() {
    let app = common::TestApp::new().await;
    let student_id = unique_student_id();
    let email = format!("{}@example.edu", student_id.to_lowercase());

    let (status, body) = app
        .post("/api/v1/auth/signup", signup_body(&student_id, &email, PASSWORD))
        .await;

    assert_eq!(status, StatusCode::CREATED);
    let body = json_body(&body);
    assert_eq!(body["student_id"], student_id.as_str());
    assert_eq!(body["role"], "STUDENT");
    assert!(body.get("password_hash").is_none());
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_signup_duplicate_student_id() {
    let app = common::TestApp::new().await;
    let student_id = unique_student_id();

    let first = signup_body(&student_id, &format!("a.{}@example.edu", student_id), PASSWORD);
    let second = signup_body(&student_id, &format!("b.{}@example.edu", student_id), PASSWORD);

    let (status, _) = app.post("/api/v1/auth/signup", first).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = app.post("/api/v1/auth/signup", second).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_signup_duplicate_email() {
    let app = common::TestApp::new().await;
    let email = format!("{}@example.edu", unique_student_id().to_lowercase());

    let (status, _) = app
        .post("/api/v1/auth/signup", signup_body(&unique_student_id(), &email, PASSWORD))
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = app
        .post("/api/v1/auth/signup", signup_body(&unique_student_id(), &email, PASSWORD))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_signup_validation() {
    let app = common::TestApp::new().await;
    let id = unique_student_id();

    let cases = [
        signup_body(&id, "not-an-email", PASSWORD),
        signup_body(&id, "valid@example.edu", "123"),
        signup_body("ab", "valid@example.edu", PASSWORD),
    ];

    for body in cases {
        let (status, _) = app.post("/api/v1/auth/signup", body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_login_success() {
    let app = common::TestApp::new().await;
    let student_id = app.signup("PROFESSOR").await;

    let (status, body) = app
        .post(
            "/api/v1/auth/login",
            json!({ "student_id": student_id, "password": PASSWORD }),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    let body = json_body(&body);
    assert!(!body["access_token"].as_str().unwrap().is_empty());
    assert_eq!(body["token_type"], "Bearer");
    assert_eq!(body["expires_in"], 1800);
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_login_failures_are_indistinguishable() {
    let app = common::TestApp::new().await;
    let student_id = app.signup("STUDENT").await;

    let (wrong_status, wrong_body) = app
        .post(
            "/api/v1/auth/login",
            json!({ "student_id": student_id, "password": "WrongPassword!" }),
        )
        .await;
    let (unknown_status, unknown_body) = app
        .post(
            "/api/v1/auth/login",
            json!({ "student_id": unique_student_id(), "password": PASSWORD }),
        )
        .await;

    assert_eq!(wrong_status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_body, unknown_body);
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_logout_revokes_token_until_its_expiry() {
    let app = common::TestApp::new().await;
    let token = app.user_token("STUDENT").await;

    let (status, _) = app.get_with_auth("/api/v1/auth/user", &token).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app.request("POST", "/api/v1/auth/logout", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);

    let entry = app.revocations.find(&token).await.unwrap().expect("entry");
    let remaining = entry.expires_at - Utc::now();
    assert!(remaining > Duration::minutes(25) && remaining <= Duration::minutes(30));

    let (status, body) = app.get_with_auth("/api/v1/auth/user", &token).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json_body(&body)["error"]["code"], "REVOKED_TOKEN");

    // Idempotent
    let (status, _) = app.request("POST", "/api/v1/auth/logout", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_purge_removes_only_expired_entries() {
    let app = common::TestApp::new().await;
    let now = Utc::now();
    let expired = format!("expired-{}", unique_student_id());
    let live = format!("live-{}", unique_student_id());

    app.revocations.revoke(&expired, now - Duration::minutes(1)).await.unwrap();
    app.revocations.revoke(&live, now + Duration::minutes(1)).await.unwrap();

    app.revocations.purge_expired(now).await.unwrap();

    assert!(!app.revocations.is_revoked(&expired).await.unwrap());
    assert!(app.revocations.is_revoked(&live).await.unwrap());
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_profile_endpoints() {
    let app = common::TestApp::new().await;
    let student_id = app.signup("STUDENT").await;
    let token = app.login(&student_id).await;

    for path in ["/api/v1/auth/user", "/api/v1/user/me"] {
        let (status, body) = app.get_with_auth(path, &token).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json_body(&body)["student_id"], student_id.as_str());
    }
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_change_password() {
    let app = common::TestApp::new().await;
    let student_id = app.signup("STUDENT").await;
    let token = app.login(&student_id).await;

    let (status, _) = app
        .put_with_auth(
            "/api/v1/user/password",
            &token,
            json!({ "current_password": "not-the-password", "new_password": "AnotherPass456!" }),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .put_with_auth(
            "/api/v1/user/password",
            &token,
            json!({ "current_password": PASSWORD, "new_password": "AnotherPass456!" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .post(
            "/api/v1/auth/login",
            json!({ "student_id": student_id, "password": "AnotherPass456!" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_deleted_user_token_is_rejected() {
    let app = common::TestApp::new().await;
    let student_id = app.signup("STUDENT").await;
    let token = app.login(&student_id).await;

    sqlx::query("DELETE FROM users WHERE student_id = $1")
        .bind(&student_id)
        .execute(&app.pool)
        .await
        .unwrap();

    let (status, body) = app.get_with_auth("/api/v1/auth/user", &token).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json_body(&body)["error"]["code"], "UNKNOWN_SUBJECT");
}
