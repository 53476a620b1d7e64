// tests/api_tests.rs

use std::sync::Arc;

use career_track::{config::Config, routes, state::AppState, store::MemoryStore};
use serde_json::{Value, json};

/// Helper function to spawn the app on a random port for testing.
/// Returns the base URL (e.g., "http://127.0.0.1:12345").
async fn spawn_app() -> String {
    // 1. In-memory documents, so no database is needed
    let config = Config {
        database_url: None,
        jwt_secret: "test_secret_for_integration_tests".to_string(),
        jwt_expiration: 600, // 10 minutes for tests
        rust_log: "error".to_string(),
        app_id: "test-app".to_string(),
        port: 0,
    };

    // 2. Create the router with the app state
    let state = AppState::new(Arc::new(MemoryStore::new()), config);
    let app = routes::create_router(state);

    // 3. Bind to port 0 to get a random available port
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");

    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    // 4. Spawn the server in the background
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    address
}

fn science_answers() -> Value {
    json!({
        "1": "Analytical",
        "2": "Analytical",
        "3": "Logical",
        "4": "Analytical",
        "5": "Analytical",
    })
}

/// Registers an account and returns the response body.
async fn register(client: &reqwest::Client, address: &str, body: Value) -> Value {
    let response = client
        .post(&format!("{}/api/auth/register", address))
        .json(&body)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status().as_u16(), 201);
    response.json().await.unwrap()
}

fn bearer(body: &Value) -> String {
    format!("Bearer {}", body["token"].as_str().unwrap())
}

#[tokio::test]
async fn health_check_404() {
    // Arrange
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    // Act
    let response = client
        .get(&format!("{}/random_path_that_does_not_exist", address))
        .send()
        .await
        .expect("Failed to execute request");

    // Assert
    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn question_bank_is_public() {
    let address = spawn_app().await;

    let body: Value = reqwest::get(&format!("{}/api/quiz/questions", address))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["total"], 10);
    assert_eq!(body["questions"][0]["options"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn anonymous_submit_returns_unsaved_result_and_signup_view() {
    // Arrange
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    // Act
    let response = client
        .post(&format!("{}/api/quiz/submit", address))
        .json(&json!({ "answers": science_answers() }))
        .send()
        .await
        .unwrap();

    // Assert
    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["saved"], false);
    assert_eq!(body["result"]["recommendedStream"], "Science (PCM/B)");
    assert_eq!(body["view"]["view"], "auth");
    assert_eq!(body["view"]["mode"], "signup");
    assert_eq!(body["view"]["pendingResult"], true);
}

#[tokio::test]
async fn submit_with_bad_token_is_unauthorized() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .post(&format!("{}/api/quiz/submit", address))
        .header("Authorization", "Bearer not-a-real-token")
        .json(&json!({ "answers": science_answers() }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 401);
}

#[tokio::test]
async fn empty_submit_is_rejected() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .post(&format!("{}/api/quiz/submit", address))
        .json(&json!({ "answers": {} }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn signup_with_pending_answers_lands_on_dashboard() {
    // Arrange
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    // Act
    let body = register(
        &client,
        &address,
        json!({
            "email": "Asha@Example.com",
            "password": "secret1",
            "name": "Asha",
            "role": "student",
            "pending_answers": science_answers(),
        }),
    )
    .await;

    // Assert
    assert_eq!(body["view"]["view"], "dashboard");
    assert_eq!(body["view"]["stream"], "Science (PCM/B)");
    assert_eq!(body["profile"]["testTaken"], true);
    assert_eq!(body["profile"]["email"], "asha@example.com");
    assert_eq!(body["pending_saved"]["profile"]["status"], "written");

    let results: Value = client
        .get(&format!("{}/api/student/results", address))
        .header("Authorization", bearer(&body))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(results["progress"], 0);
    assert!(results["roadmap"][0]["quiz"][0].get("correct").is_none());
}

#[tokio::test]
async fn duplicate_email_conflicts() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let payload = json!({ "email": "dup@example.com", "password": "secret1", "role": "student" });
    register(&client, &address, payload.clone()).await;

    let response = client
        .post(&format!("{}/api/auth/register", address))
        .json(&payload)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 409);
}

#[tokio::test]
async fn login_routes_new_student_to_test_intro() {
    // Arrange
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    register(
        &client,
        &address,
        json!({ "email": "ravi@example.com", "password": "secret1", "role": "student" }),
    )
    .await;

    // Act
    let wrong = client
        .post(&format!("{}/api/auth/login", address))
        .json(&json!({ "email": "ravi@example.com", "password": "nope" }))
        .send()
        .await
        .unwrap();
    let ok = client
        .post(&format!("{}/api/auth/login", address))
        .json(&json!({ "email": "RAVI@example.com ", "password": "secret1" }))
        .send()
        .await
        .unwrap();

    // Assert
    assert_eq!(wrong.status().as_u16(), 401);
    assert_eq!(ok.status().as_u16(), 200);
    let body: Value = ok.json().await.unwrap();
    assert_eq!(body["view"]["view"], "test-intro");
    assert_eq!(body["profile"]["name"], "ravi");
    assert!(body["profile"]["lastLogin"].is_string());

    let session: Value = client
        .get(&format!("{}/api/session", address))
        .header("Authorization", bearer(&body))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(session["view"]["view"], "test-intro");
}

#[tokio::test]
async fn parent_signup_links_and_reads_share() {
    // Arrange
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    register(
        &client,
        &address,
        json!({
            "email": "kid@example.com",
            "password": "secret1",
            "name": "Kid",
            "role": "student",
            "pending_answers": science_answers(),
        }),
    )
    .await;

    // Act
    let parent = register(
        &client,
        &address,
        json!({
            "email": "mum@example.com",
            "password": "secret1",
            "role": "parent",
            "student_email": "KID@example.com",
        }),
    )
    .await;

    // Assert
    assert_eq!(parent["view"]["view"], "parent-dashboard");
    assert_eq!(parent["view"]["linked"], true);

    let student: Value = client
        .get(&format!("{}/api/parent/student", address))
        .header("Authorization", bearer(&parent))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(student["demo"], false);
    assert_eq!(student["student"]["name"], "Kid");
    assert_eq!(student["student"]["course"], "Recommended: Science");
    assert!(!student["courses"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn linking_unknown_student_is_404() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let parent = register(
        &client,
        &address,
        json!({ "email": "dad@example.com", "password": "secret1", "role": "parent" }),
    )
    .await;
    assert_eq!(parent["view"]["linked"], false);

    let response = client
        .post(&format!("{}/api/parent/link", address))
        .header("Authorization", bearer(&parent))
        .json(&json!({ "email": "ghost@example.com" }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 404);
    let body: Value = response.json().await.unwrap();
    assert_eq!(
        body["error"],
        "Student email not found. Please ensure the student has created an account."
    );
}

#[tokio::test]
async fn role_guards() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let student = register(
        &client,
        &address,
        json!({ "email": "s@example.com", "password": "secret1", "role": "student" }),
    )
    .await;

    let anonymous = client
        .get(&format!("{}/api/parent/demo", address))
        .send()
        .await
        .unwrap();
    let wrong_role = client
        .get(&format!("{}/api/parent/demo", address))
        .header("Authorization", bearer(&student))
        .send()
        .await
        .unwrap();

    assert_eq!(anonymous.status().as_u16(), 401);
    assert_eq!(wrong_role.status().as_u16(), 403);
}

#[tokio::test]
async fn completing_a_step_updates_progress() {
    // Arrange
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let student = register(
        &client,
        &address,
        json!({
            "email": "p@example.com",
            "password": "secret1",
            "role": "student",
            "pending_answers": science_answers(),
        }),
    )
    .await;

    // Act
    let failed: Value = client
        .post(&format!("{}/api/student/roadmap/1/complete", address))
        .header("Authorization", bearer(&student))
        .json(&json!({ "answers": { "0": "Checking Salary" } }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let passed: Value = client
        .post(&format!("{}/api/student/roadmap/1/complete", address))
        .header("Authorization", bearer(&student))
        .json(&json!({ "answers": { "0": "Self Assessment", "1": "Resume" } }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    // Assert
    assert_eq!(failed["passed"], false);
    assert_eq!(failed["progress"], 0);
    assert_eq!(passed["passed"], true);
    assert_eq!(passed["progress"], 25);

    let missing = client
        .post(&format!("{}/api/student/roadmap/42/complete", address))
        .header("Authorization", bearer(&student))
        .json(&json!({ "answers": {} }))
        .send()
        .await
        .unwrap();
    assert_eq!(missing.status().as_u16(), 404);
}

#[tokio::test]
async fn catalog_lookup_by_slug() {
    let address = spawn_app().await;

    let ok = reqwest::get(&format!("{}/api/catalog/streams/commerce", address))
        .await
        .unwrap();
    let unknown = reqwest::get(&format!("{}/api/catalog/streams/astrology", address))
        .await
        .unwrap();

    assert_eq!(ok.status().as_u16(), 200);
    assert_eq!(unknown.status().as_u16(), 404);
}
