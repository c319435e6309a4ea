// src/handlers/admin.rs

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use validator::Validate;

use crate::{
    engine::QuizEngine,
    error::AppError,
    import::parse_question_csv,
    models::{question::CreateQuestionRequest, report::ImportSummary},
    utils::{html::clean_html, jwt::Claims},
};

/// Creates a single question in a class bank.
/// Teacher only.
pub async fn create_question(
    State(engine): State<QuizEngine>,
    Json(payload): Json<CreateQuestionRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let class_code = payload.class_code.trim().to_string();
    let mut question = payload.into_new_question().map_err(AppError::BadRequest)?;
    question.prompt = clean_html(&question.prompt);
    question.explanation = clean_html(&question.explanation);

    engine
        .store()
        .insert_questions(&class_code, std::slice::from_ref(&question))
        .await
        .map_err(|e| {
            tracing::error!("Failed to create question: {:?}", e);
            AppError::from(e)
        })?;

    Ok((
        StatusCode::CREATED,
        Json(ImportSummary { class_code, imported: 1 }),
    ))
}

#[derive(Debug, Deserialize)]
pub struct ImportQuery {
    pub class_code: Option<String>,
}

/// Imports questions from a CSV upload (request body is the CSV text).
/// Teacher only. A file with any invalid row is rejected as a whole.
pub async fn import_questions(
    State(engine): State<QuizEngine>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<ImportQuery>,
    body: String,
) -> Result<impl IntoResponse, AppError> {
    let class_code = query
        .class_code
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .unwrap_or(claims.class_code);

    let questions = parse_question_csv(&body).inspect_err(|e| {
        tracing::warn!(class_code = %class_code, error = %e, "Rejected question upload");
    })?;

    let imported = engine
        .store()
        .insert_questions(&class_code, &questions)
        .await
        .map_err(|e| {
            tracing::error!("Failed to import questions: {:?}", e);
            AppError::from(e)
        })?;

    tracing::info!(class_code = %class_code, imported, "Question bank upload stored");

    Ok((
        StatusCode::CREATED,
        Json(ImportSummary { class_code, imported }),
    ))
}

/// Deletes a bank question by ID. Existing exam snapshots keep their copy.
/// Teacher only.
pub async fn delete_question(
    State(engine): State<QuizEngine>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let deleted = engine.store().delete_question(id).await.map_err(|e| {
        tracing::error!("Failed to delete question: {:?}", e);
        AppError::from(e)
    })?;

    if !deleted {
        return Err(AppError::NotFound("Question not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}
