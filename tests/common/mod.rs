//! Shared fixtures for the integration tests.
#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use question_workflow::auth::hash_password;
use question_workflow::models::{Course, QuestionPaper, Role, User};
use question_workflow::services::{NewCourse, NewPaper};
use question_workflow::workflow::QuestionInput;
use question_workflow::{AppState, Config};
use uuid::Uuid;

pub const PASSWORD: &str = "secret123";

pub fn state() -> AppState {
    AppState::new(Config::default())
}

pub async fn seed_user(state: &AppState, name: &str, email: &str, role: Role) -> User {
    state
        .store
        .write()
        .await
        .insert_user(User::new(
            name.to_string(),
            email.to_string(),
            hash_password(PASSWORD),
            role,
        ))
        .expect("seed user")
}

pub async fn seed_course(state: &AppState, admin: &User) -> Course {
    state
        .catalog
        .create_course(
            admin,
            NewCourse {
                title: "NEET Physics".to_string(),
                standard: "12".to_string(),
                syllabus: "NCERT".to_string(),
                exam_type: "NEET".to_string(),
                start_date: None,
                end_date: None,
            },
        )
        .await
        .expect("seed course")
}

pub async fn seed_paper(
    state: &AppState,
    course: &Course,
    number_of_questions: u32,
) -> QuestionPaper {
    state
        .catalog
        .create_paper(NewPaper {
            name: "AIPMT 2019 Retest".to_string(),
            course: course.id,
            subject: "Physics".to_string(),
            standard: "12".to_string(),
            syllabus: "NCERT".to_string(),
            exam_type: "NEET".to_string(),
            year: "2019".to_string(),
            number_of_questions,
            question_paper_file: None,
            solution_paper_file: None,
        })
        .await
        .expect("seed paper")
}

/// A question input that passes the submission gate.
pub fn valid_input(paper: &QuestionPaper, course: &Course) -> QuestionInput {
    serde_json::from_value(serde_json::json!({
        "question_paper": paper.id,
        "course": course.id,
        "subject": "Physics",
        "unit": "Optics",
        "unit_no": 4,
        "topic": "Refraction",
        "question_number": 1,
        "complexity": "Medium",
        "keywords": ["lens"],
        "question": { "text": "A ray passes from glass to air. What happens?" },
        "options": [
            { "text": "Bends towards the normal" },
            { "text": "Bends away from the normal", "is_correct": true },
            { "text": "Does not bend" },
            { "text": "Is fully absorbed" }
        ],
        "explanation": { "text": "Light speeds up in the rarer medium." }
    }))
    .expect("valid question input")
}

// ========== HTTP helpers ==========

pub fn json_request(
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    match body {
        Some(value) => builder
            .header("content-type", "application/json")
            .body(Body::from(value.to_string()))
            .expect("request"),
        None => builder.body(Body::empty()).expect("request"),
    }
}

pub async fn read_json(response: Response<Body>) -> Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("response body")
        .to_bytes();
    if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    }
}

/// Log a seeded user in through the API and return the bearer token.
pub async fn login(router: &Router, email: &str, role: Role) -> String {
    let response = router
        .clone()
        .oneshot(json_request(
            Method::POST,
            &format!("/auth/login/{role}"),
            None,
            Some(serde_json::json!({ "email": email, "password": PASSWORD })),
        ))
        .await
        .expect("login request");
    let body = read_json(response).await;
    body["token"].as_str().expect("token").to_string()
}

pub fn uuid_of(value: &Value) -> Uuid {
    value.as_str().expect("uuid string").parse().expect("uuid")
}
