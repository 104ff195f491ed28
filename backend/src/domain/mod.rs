//! Domain primitives, aggregates, and services.
//!
//! Purpose: define strongly typed entities used by the API and persistence
//! layers, and the services that implement the driving ports. Keep types
//! immutable and document invariants and serialisation contracts (serde) in
//! each type's Rustdoc.
//!
//! Public surface:
//! - Error, ErrorCode: API error payload and stable identifier.
//! - User, Case, Report: stored aggregates.
//! - AccountService, CaseService, ReportService: driving port implementations.

pub mod account_service;
pub mod auth;
pub mod case;
pub mod case_service;
pub mod error;
pub mod password;
mod port_error_mapping;
pub mod ports;
pub mod report;
pub mod report_document;
pub mod report_format;
pub mod report_prompt;
pub mod report_service;
pub mod trace_id;
pub mod upload;
pub mod user;

pub use self::account_service::AccountService;
pub use self::auth::{
    LoginCredentials, LoginValidationError, Registration, RegistrationValidationError,
};
pub use self::case::{
    CLINICAL_NOTES_MAX, CLINICAL_NOTES_MIN, Case, CaseId, CaseOverview, CaseStatus,
    CaseValidationError, ClinicalNotes, InvalidCaseId, NewCase, UnknownCaseStatus, status_label,
};
pub use self::case_service::CaseService;
pub use self::error::{Error, ErrorCode};
pub use self::password::{PASSWORD_MIN, Password, PasswordError, PasswordHash};
pub use self::report::{
    REPORT_TEXT_MAX, REPORT_TEXT_MIN, Report, ReportDraft, ReportEditAction, ReportText,
    ReportValidationError,
};
pub use self::report_document::{
    DocumentSection, EXPORT_DISCLAIMER, ReportDocument, export_filename,
};
pub use self::report_format::markdown_to_html;
pub use self::report_prompt::{
    DRAFTING_SYSTEM_PROMPT, MISSING_NOTES_PLACEHOLDER, drafting_user_prompt,
};
pub use self::report_service::ReportService;
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::upload::{
    CaseSubmission, ImageFormat, ImageUpload, StoredImagePath, secure_filename,
};
pub use self::user::{
    EMAIL_MAX, EmailAddress, NewUser, USERNAME_MAX, USERNAME_MIN, User, UserCredentials, UserId,
    UserValidationError, Username,
};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use diagnoseai::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
