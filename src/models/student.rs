// src/models/student.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Represents the 'students' table in the database.
/// Identity is (class_code, display_name); rows are never updated after creation.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Student {
    pub id: i64,
    pub class_code: String,
    #[sqlx(rename = "nickname")]
    pub display_name: String,
}

/// DTO for corsist login.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(
        min = 1,
        max = 100,
        message = "Name length must be between 1 and 100 characters."
    ))]
    pub display_name: String,
    #[validate(length(min = 1, max = 128))]
    pub password: String,
    #[validate(length(min = 1, max = 50))]
    pub class_code: Option<String>,
}

/// DTO for teacher login (upload permissions).
#[derive(Debug, Deserialize, Validate)]
pub struct TeacherLoginRequest {
    #[validate(length(min = 1, max = 128))]
    pub code: String,
}
