// tests/api_tests.rs

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use quiz_backend::{
    config::Config,
    engine::ManualClock,
    routes,
    state::AppState,
    store::MemoryQuizStore,
};
use serde_json::{Value, json};

const STUDENT_PASSWORD: &str = "corsist-pass";
const TEACHER_CODE: &str = "teacher-code";
const CLASS: &str = "TEST01";

struct TestApp {
    address: String,
    clock: Arc<ManualClock>,
    client: reqwest::Client,
}

/// Helper function to spawn the app on a random port for testing.
/// Uses the in-memory store and a manual clock, so no database is needed.
async fn spawn_app() -> TestApp {
    let config = Config {
        database_url: None,
        jwt_secret: "test_secret_for_integration_tests".to_string(),
        jwt_expiration: 600,
        rust_log: "error".to_string(),
        student_access_password: STUDENT_PASSWORD.to_string(),
        teacher_code: TEACHER_CODE.to_string(),
        default_class_code: CLASS.to_string(),
        quiz_question_count: 5,
        quiz_duration_seconds: 600,
        bind_addr: "127.0.0.1:0".parse().unwrap(),
    };

    let clock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap(),
    ));
    let state = AppState::with_clock(Arc::new(MemoryQuizStore::new()), clock.clone(), config);
    let app = routes::create_router(state);

    // Bind to port 0 to get a random available port
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestApp {
        address: format!("http://127.0.0.1:{}", port),
        clock,
        client: reqwest::Client::new(),
    }
}

impl TestApp {
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    async fn student_token(&self) -> String {
        let name = format!("s_{}", &uuid::Uuid::new_v4().to_string()[..8]);
        let body: Value = self
            .client
            .post(self.url("/api/auth/login"))
            .json(&json!({ "display_name": name, "password": STUDENT_PASSWORD }))
            .send()
            .await
            .expect("Login failed")
            .json()
            .await
            .expect("Failed to parse login json");
        body["token"].as_str().expect("Token not found").to_string()
    }

    async fn teacher_token(&self) -> String {
        let body: Value = self
            .client
            .post(self.url("/api/auth/teacher"))
            .json(&json!({ "code": TEACHER_CODE }))
            .send()
            .await
            .expect("Teacher login failed")
            .json()
            .await
            .expect("Failed to parse teacher json");
        body["token"].as_str().expect("Token not found").to_string()
    }

    /// Uploads `n` questions whose correct option is always A.
    async fn seed_bank(&self, n: usize) {
        let mut csv = String::from("question_text,option_a,option_b,option_c,option_d,correct_option\n");
        for i in 0..n {
            csv.push_str(&format!("Question {i},right,wrong,wrong,,A\n"));
        }
        let token = self.teacher_token().await;
        let response = self
            .client
            .post(self.url("/api/admin/questions/import"))
            .bearer_auth(token)
            .body(csv)
            .send()
            .await
            .expect("Import failed");
        assert_eq!(response.status().as_u16(), 201);
    }

    async fn start(&self, token: &str, body: Value) -> reqwest::Response {
        self.client
            .post(self.url("/api/quiz/sessions"))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .expect("Start failed")
    }

    async fn answer(&self, token: &str, session_id: i64, row_id: i64, letter: Value) -> u16 {
        self.client
            .put(self.url(&format!("/api/quiz/sessions/{session_id}/answers/{row_id}")))
            .bearer_auth(token)
            .json(&json!({ "chosen_option": letter }))
            .send()
            .await
            .expect("Answer failed")
            .status()
            .as_u16()
    }
}

#[tokio::test]
async fn unknown_path_is_404() {
    let app = spawn_app().await;

    let response = app
        .client
        .get(app.url("/random_path_that_does_not_exist"))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn login_rejects_wrong_password() {
    let app = spawn_app().await;

    let response = app
        .client
        .post(app.url("/api/auth/login"))
        .json(&json!({ "display_name": "Ana", "password": "nope" }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 401);
}

#[tokio::test]
async fn login_is_idempotent_per_name() {
    let app = spawn_app().await;
    let mut ids = Vec::new();
    for _ in 0..2 {
        let body: Value = app
            .client
            .post(app.url("/api/auth/login"))
            .json(&json!({ "display_name": "Ana", "password": STUDENT_PASSWORD }))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body["student"]["class_code"], CLASS);
        ids.push(body["student"]["id"].clone());
    }

    assert_eq!(ids[0], ids[1]);
}

#[tokio::test]
async fn quiz_routes_require_a_token() {
    let app = spawn_app().await;

    let response = app
        .client
        .get(app.url("/api/quiz/bank"))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 401);
}

#[tokio::test]
async fn students_cannot_upload_questions() {
    let app = spawn_app().await;
    let token = app.student_token().await;

    let response = app
        .client
        .post(app.url("/api/admin/questions/import"))
        .bearer_auth(token)
        .body("question_text,option_a,option_b,option_c,option_d,correct_option\nQ,a,b,c,,A\n")
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 403);
}

#[tokio::test]
async fn import_rejects_whole_file_on_bad_row() {
    let app = spawn_app().await;
    let token = app.teacher_token().await;

    let response = app
        .client
        .post(app.url("/api/admin/questions/import"))
        .bearer_auth(&token)
        .body("question_text,option_a,option_b,option_c,option_d,correct_option\nQ1,a,b,c,,A\nQ2,a,b,c,,D\n")
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status().as_u16(), 400);

    let student = app.student_token().await;
    let bank: Value = app
        .client
        .get(app.url("/api/quiz/bank"))
        .bearer_auth(student)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(bank["question_count"], 0);
}

#[tokio::test]
async fn start_fails_when_bank_is_too_small() {
    let app = spawn_app().await;
    app.seed_bank(3).await;
    let token = app.student_token().await;

    let response = app.start(&token, json!({ "question_count": 4 })).await;

    assert_eq!(response.status().as_u16(), 409);
}

#[tokio::test]
async fn full_session_flow() {
    let app = spawn_app().await;
    app.seed_bank(8).await;
    let token = app.student_token().await;

    // 1. Start
    let response = app.start(&token, json!({})).await;
    assert_eq!(response.status().as_u16(), 201);
    let paper: Value = response.json().await.unwrap();
    let session_id = paper["session_id"].as_i64().unwrap();
    let questions = paper["questions"].as_array().unwrap().clone();
    assert_eq!(questions.len(), 5);
    assert_eq!(paper["status"], "active");
    assert_eq!(paper["remaining_seconds"], 600);
    // Empty option D is never offered
    assert_eq!(questions[0]["options"].as_array().unwrap().len(), 3);

    let rows: Vec<i64> = questions.iter().map(|q| q["row_id"].as_i64().unwrap()).collect();

    // 2. Answer: two right, one wrong, one invalid letter
    assert_eq!(app.answer(&token, session_id, rows[0], json!("A")).await, 204);
    assert_eq!(app.answer(&token, session_id, rows[1], json!("a")).await, 204);
    assert_eq!(app.answer(&token, session_id, rows[2], json!("B")).await, 204);
    assert_eq!(app.answer(&token, session_id, rows[3], json!("D")).await, 400);
    assert_eq!(app.answer(&token, session_id, rows[3], json!("X")).await, 400);

    app.clock.advance(chrono::Duration::seconds(125));

    // 3. Result before finishing is refused
    let early = app
        .client
        .get(app.url(&format!("/api/quiz/sessions/{session_id}/result")))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(early.status().as_u16(), 409);

    // 4. Finish, then further answers are refused
    let finished = app
        .client
        .post(app.url(&format!("/api/quiz/sessions/{session_id}/finish")))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(finished.status().as_u16(), 200);
    assert_eq!(app.answer(&token, session_id, rows[4], json!("A")).await, 409);

    // 5. Result
    let report: Value = app
        .client
        .get(app.url(&format!("/api/quiz/sessions/{session_id}/result")))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(report["score"], 2);
    assert_eq!(report["total"], 5);
    assert_eq!(report["elapsed_seconds"], 125);
    assert_eq!(report["per_question"][2]["status"], "incorrect");
    assert_eq!(report["per_question"][3]["status"], "unanswered");
    assert_eq!(report["per_question"][2]["correct_text"], "right");
}

#[tokio::test]
async fn expired_session_refuses_answers_and_grades() {
    let app = spawn_app().await;
    app.seed_bank(5).await;
    let token = app.student_token().await;

    let paper: Value = app
        .start(&token, json!({ "question_count": 2, "duration_seconds": 60 }))
        .await
        .json()
        .await
        .unwrap();
    let session_id = paper["session_id"].as_i64().unwrap();
    let row = paper["questions"][0]["row_id"].as_i64().unwrap();

    assert_eq!(app.answer(&token, session_id, row, json!("A")).await, 204);

    app.clock.advance(chrono::Duration::seconds(60));

    assert_eq!(app.answer(&token, session_id, row, json!("B")).await, 409);

    let report: Value = app
        .client
        .get(app.url(&format!("/api/quiz/sessions/{session_id}/result")))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(report["score"], 1);
    assert_eq!(report["elapsed_seconds"], 60);
}

#[tokio::test]
async fn sessions_are_private_to_their_student() {
    let app = spawn_app().await;
    app.seed_bank(5).await;
    let owner = app.student_token().await;
    let other = app.student_token().await;

    let paper: Value = app.start(&owner, json!({ "question_count": 2 })).await.json().await.unwrap();
    let session_id = paper["session_id"].as_i64().unwrap();

    let response = app
        .client
        .get(app.url(&format!("/api/quiz/sessions/{session_id}")))
        .bearer_auth(&other)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn teacher_can_create_and_delete_a_question() {
    let app = spawn_app().await;
    let token = app.teacher_token().await;

    let created = app
        .client
        .post(app.url("/api/admin/questions"))
        .bearer_auth(&token)
        .json(&json!({
            "class_code": CLASS,
            "question_text": "<b>Capital</b> of France?<script>alert(1)</script>",
            "option_a": "Lyon",
            "option_b": "Paris",
            "option_c": "Nice",
            "correct_option": "B"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(created.status().as_u16(), 201);

    let missing = app
        .client
        .delete(app.url("/api/admin/questions/999999"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(missing.status().as_u16(), 404);
}
