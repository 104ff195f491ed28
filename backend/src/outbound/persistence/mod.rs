//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Concrete implementations of the user, case, and report repository ports,
//! backed by `diesel-async` with `bb8` connection pooling.
//!
//! - Diesel row structs (`models.rs`) and table definitions (`schema.rs`)
//!   stay private to this module.
//! - Database errors are mapped to the port error enums; details only reach
//!   debug logs.
//!
//! # Example
//!
//! ```ignore
//! use diagnoseai::outbound::persistence::{DbPool, DieselCaseRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/diagnoseai")).await?;
//! let cases = DieselCaseRepository::new(pool);
//! ```

mod diagnostics;
mod diesel_case_repository;
mod diesel_error_mapping;
mod diesel_report_repository;
mod diesel_user_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diagnostics::{DatabaseDiagnostics, DiagnosticsError, RecentCase, TableCounts};
pub use diesel_case_repository::DieselCaseRepository;
pub use diesel_report_repository::DieselReportRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use migrations::{MigrationError, run_pending_migrations};
pub use pool::{DEFAULT_MAX_CONNECTIONS, DbPool, PoolConfig, PoolError};
