//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain.

use chrono::{DateTime, Utc};
use diesel::prelude::*;

use super::schema::{cases, reports, users};

/// Row struct for reading from the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Insertable struct for creating user records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
}

/// Row struct for reading from the cases table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = cases)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CaseRow {
    pub id: i32,
    pub user_id: i32,
    pub image_filename: String,
    pub image_path: String,
    pub clinical_notes: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insertable struct for creating case records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = cases)]
pub(crate) struct NewCaseRow<'a> {
    pub user_id: i32,
    pub image_filename: &'a str,
    pub image_path: &'a str,
    pub clinical_notes: &'a str,
    pub status: &'a str,
}

/// Row struct for reading from the reports table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = reports)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ReportRow {
    pub id: i32,
    pub case_id: i32,
    pub draft_json: Option<serde_json::Value>,
    pub draft_text: Option<String>,
    pub final_text: Option<String>,
    pub is_finalized: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insertable struct for storing an AI draft.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = reports)]
pub(crate) struct NewReportRow<'a> {
    pub case_id: i32,
    pub draft_json: &'a serde_json::Value,
    pub draft_text: &'a str,
}
