// src/handlers/auth.rs

use axum::{Json, extract::State, response::IntoResponse};
use serde_json::json;
use validator::Validate;

use crate::{
    config::Config,
    engine::QuizEngine,
    error::AppError,
    models::student::{LoginRequest, TeacherLoginRequest},
    utils::jwt::{ROLE_STUDENT, ROLE_TEACHER, sign_jwt},
};

/// Logs a corsist in.
///
/// Checks the shared access password, then looks the student up by
/// (class_code, display_name), creating the record on first login.
/// Returns a JWT bound to the student and class.
pub async fn login(
    State(engine): State<QuizEngine>,
    State(config): State<Config>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    if payload.password.trim() != config.student_access_password {
        return Err(AppError::AuthError("Invalid password".to_string()));
    }

    let display_name = payload.display_name.trim();
    if display_name.is_empty() {
        return Err(AppError::BadRequest("Name must not be blank".to_string()));
    }
    let class_code = payload
        .class_code
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .unwrap_or(&config.default_class_code);

    let student = engine
        .store()
        .upsert_student(class_code, display_name)
        .await
        .map_err(|e| {
            tracing::error!("Failed to upsert student: {:?}", e);
            AppError::from(e)
        })?;

    let token = sign_jwt(
        student.id,
        ROLE_STUDENT,
        &student.class_code,
        &config.jwt_secret,
        config.jwt_expiration,
    )?;

    Ok(Json(json!({
        "token": token,
        "type": "Bearer",
        "student": student,
    })))
}

/// Issues a teacher token for the question bank upload endpoints.
pub async fn teacher_login(
    State(config): State<Config>,
    Json(payload): Json<TeacherLoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    if payload.code.trim() != config.teacher_code {
        return Err(AppError::AuthError("Invalid teacher code".to_string()));
    }

    let token = sign_jwt(
        0,
        ROLE_TEACHER,
        &config.default_class_code,
        &config.jwt_secret,
        config.jwt_expiration,
    )?;

    Ok(Json(json!({
        "token": token,
        "type": "Bearer",
    })))
}
