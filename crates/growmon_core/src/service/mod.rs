//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Run the evolution check on every entry-count change and surface the
//!   outcome to callers.
//! - Keep UI layers decoupled from storage details.

pub mod backup_service;
pub mod diary_service;
pub mod profile_service;
