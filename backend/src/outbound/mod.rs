//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: PostgreSQL-backed repositories using Diesel ORM
//! - **memory**: process-local repositories for development and tests
//! - **openai**: report drafting over the chat completions API
//! - **storage**: uploaded image files on local disk
//! - **pdf**: printable report rendering
//!
//! Adapters are thin translators that convert between domain types and
//! infrastructure-specific representations. They contain no business logic.

pub mod memory;
pub mod openai;
pub mod pdf;
pub mod persistence;
pub mod storage;
