//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts for diary and profile
//!   storage.
//! - Isolate SQLite query details from service/business orchestration.
//!
//! # Invariants
//! - Repository writes must enforce model `validate()` before persistence.
//! - Repository reads must reject malformed persisted rows (`InvalidData`)
//!   instead of masking them.
//! - Repository APIs return semantic errors (`NotFound`) in addition to DB
//!   transport errors.

pub mod backup_repo;
pub mod entry_repo;
pub mod profile_repo;
