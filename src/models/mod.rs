// src/models/mod.rs

pub mod question;
pub mod report;
pub mod session;
pub mod snapshot;
pub mod student;
