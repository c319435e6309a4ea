// src/config.rs

use std::{env, net::SocketAddr, str::FromStr};

use dotenvy::dotenv;

use crate::error::AppError;

#[derive(Debug, Clone)]
pub struct Config {
    /// Postgres connection string; the in-memory store is used when unset.
    pub database_url: Option<String>,
    pub jwt_secret: String,
    /// Token lifetime in seconds.
    pub jwt_expiration: u64,
    pub rust_log: String,
    /// Shared password corsists log in with.
    pub student_access_password: String,
    /// Code that grants teacher (upload) tokens.
    pub teacher_code: String,
    pub default_class_code: String,
    pub quiz_question_count: usize,
    pub quiz_duration_seconds: i64,
    pub bind_addr: SocketAddr,
}

fn required(name: &str) -> Result<String, AppError> {
    env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| AppError::InternalServerError(format!("{name} must be set")))
}

fn parsed_or<T: FromStr>(name: &str, default: T) -> Result<T, AppError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| AppError::InternalServerError(format!("{name} has an invalid value: {raw}"))),
        Err(_) => Ok(default),
    }
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        dotenv().ok();

        let database_url = env::var("DATABASE_URL").ok().filter(|v| !v.trim().is_empty());

        let jwt_secret = required("JWT_SECRET")?;
        let student_access_password = required("STUDENT_ACCESS_PASSWORD")?;
        let teacher_code = required("TEACHER_CODE")?;

        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
        let default_class_code =
            env::var("DEFAULT_CLASS_CODE").unwrap_or_else(|_| "CDS2026".to_string());

        let jwt_expiration = parsed_or("JWT_EXPIRATION", 4 * 60 * 60)?;
        let quiz_question_count = parsed_or("QUIZ_QUESTION_COUNT", 30)?;
        let quiz_duration_seconds = parsed_or("QUIZ_DURATION_SECONDS", 30 * 60)?;
        let bind_addr = parsed_or("BIND_ADDR", SocketAddr::from(([0, 0, 0, 0], 3000)))?;

        if quiz_question_count == 0 || quiz_duration_seconds <= 0 {
            return Err(AppError::InternalServerError(
                "QUIZ_QUESTION_COUNT and QUIZ_DURATION_SECONDS must be positive".to_string(),
            ));
        }

        Ok(Self {
            database_url,
            jwt_secret,
            jwt_expiration,
            rust_log,
            student_access_password,
            teacher_code,
            default_class_code,
            quiz_question_count,
            quiz_duration_seconds,
            bind_addr,
        })
    }
}
