//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the migrations under `backend/migrations`
//! exactly. Regenerate with `diesel print-schema` after changing a migration.

diesel::table! {
    /// Registered staff accounts.
    users (id) {
        /// Serial primary key.
        id -> Int4,
        /// Unique login name (max 80 characters).
        username -> Varchar,
        /// Unique, lower-cased email address (max 120 characters).
        email -> Varchar,
        /// Argon2 PHC string.
        password_hash -> Varchar,
        /// Record creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Uploaded studies awaiting or holding a report.
    cases (id) {
        id -> Int4,
        /// Owning user; cascades on delete.
        user_id -> Int4,
        /// Stored file name below the user's upload directory.
        image_filename -> Varchar,
        /// Path relative to the upload root.
        image_path -> Varchar,
        clinical_notes -> Text,
        /// Workflow state, see `CaseStatus`.
        status -> Varchar,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// One report per case: AI draft plus reviewer edits.
    reports (id) {
        id -> Int4,
        /// Unique; cascades on delete.
        case_id -> Int4,
        /// Raw provider response.
        draft_json -> Nullable<Jsonb>,
        draft_text -> Nullable<Text>,
        final_text -> Nullable<Text>,
        is_finalized -> Bool,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::joinable!(cases -> users (user_id));
diesel::joinable!(reports -> cases (case_id));

diesel::allow_tables_to_appear_in_same_query!(users, cases, reports);
