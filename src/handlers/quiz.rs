// src/handlers/quiz.rs

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Duration;
use validator::Validate;

use crate::{
    config::Config,
    engine::QuizEngine,
    error::AppError,
    models::{
        question::OptionLetter,
        report::{BankSummary, SetAnswerRequest},
        session::{SessionContext, StartSessionRequest},
    },
    utils::jwt::Claims,
};

fn context(claims: &Claims, session_id: i64) -> Result<SessionContext, AppError> {
    Ok(SessionContext {
        session_id,
        student_id: claims.student_id()?,
    })
}

/// Number of questions available in the student's class bank.
pub async fn bank_summary(
    State(engine): State<QuizEngine>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let question_count = engine.bank_size(&claims.class_code).await?;

    Ok(Json(BankSummary {
        class_code: claims.class_code,
        question_count,
    }))
}

/// Starts a timed session and returns its exam paper.
///
/// * Draws `question_count` questions (default from configuration).
/// * The deadline is `now + duration_seconds` and is enforced server-side.
pub async fn start_session(
    State(engine): State<QuizEngine>,
    State(config): State<Config>,
    Extension(claims): Extension<Claims>,
    payload: Option<Json<StartSessionRequest>>,
) -> Result<impl IntoResponse, AppError> {
    let req = payload.map(|Json(req)| req).unwrap_or_default();
    if let Err(validation_errors) = req.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let student_id = claims.student_id()?;
    let student = engine
        .store()
        .find_student(student_id)
        .await?
        .ok_or_else(|| AppError::AuthError("Unknown student".to_string()))?;

    let n = req
        .question_count
        .map(|n| n as usize)
        .unwrap_or(config.quiz_question_count);
    let duration =
        Duration::seconds(req.duration_seconds.unwrap_or(config.quiz_duration_seconds));

    let (_, ctx) = engine.start(&student, n, duration).await?;
    let paper = engine.paper(&ctx).await?;

    Ok((StatusCode::CREATED, Json(paper)))
}

/// Returns the current exam paper (answers so far, advisory countdown).
pub async fn get_paper(
    State(engine): State<QuizEngine>,
    Extension(claims): Extension<Claims>,
    Path(session_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let ctx = context(&claims, session_id)?;
    Ok(Json(engine.paper(&ctx).await?))
}

/// Records or clears the answer to one question of the session.
pub async fn set_answer(
    State(engine): State<QuizEngine>,
    Extension(claims): Extension<Claims>,
    Path((session_id, row_id)): Path<(i64, i64)>,
    Json(req): Json<SetAnswerRequest>,
) -> Result<impl IntoResponse, AppError> {
    let ctx = context(&claims, session_id)?;

    let letter = match req.chosen_option.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(raw) => Some(
            raw.parse::<OptionLetter>()
                .map_err(|e| AppError::BadRequest(e.to_string()))?,
        ),
    };

    engine.set_answer(&ctx, row_id, letter).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Ends the session. Calling it again is harmless.
pub async fn finish_session(
    State(engine): State<QuizEngine>,
    Extension(claims): Extension<Claims>,
    Path(session_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let ctx = context(&claims, session_id)?;
    Ok(Json(engine.finish(&ctx).await?))
}

/// Returns the final correction. An expired session is finalized first.
pub async fn get_result(
    State(engine): State<QuizEngine>,
    Extension(claims): Extension<Claims>,
    Path(session_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let ctx = context(&claims, session_id)?;
    Ok(Json(engine.grade(&ctx).await?))
}
