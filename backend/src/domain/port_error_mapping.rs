//! Translation of driven-port failures into API errors.
//!
//! Connection failures surface as `service_unavailable`; anything else an
//! adapter reports is an internal error whose message is redacted at the HTTP
//! boundary.

use crate::domain::Error;
use crate::domain::ports::{
    CasePersistenceError, ImageStoreError, ReportPersistenceError, ReportRenderError,
};

pub(crate) fn map_case_error(error: CasePersistenceError) -> Error {
    match error {
        CasePersistenceError::Connection { message } => {
            Error::service_unavailable(format!("case repository unavailable: {message}"))
        }
        CasePersistenceError::Query { message } => {
            Error::internal(format!("case repository error: {message}"))
        }
        CasePersistenceError::NotFound { .. } => Error::not_found("Case not found"),
    }
}

pub(crate) fn map_report_error(error: ReportPersistenceError) -> Error {
    match error {
        ReportPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("report repository unavailable: {message}"))
        }
        ReportPersistenceError::Query { message } => {
            Error::internal(format!("report repository error: {message}"))
        }
        ReportPersistenceError::NotFound { .. } => {
            Error::not_found("No report found for this case")
        }
        ReportPersistenceError::AlreadyFinalized { .. } => already_finalized(),
    }
}

pub(crate) fn map_image_error(error: ImageStoreError) -> Error {
    match error {
        ImageStoreError::NotFound { .. } => Error::not_found("Image file not found"),
        ImageStoreError::InvalidPath { path } => {
            Error::internal(format!("stored image path rejected: {path}"))
        }
        ImageStoreError::Io { message } => Error::internal(format!("image store error: {message}")),
    }
}

pub(crate) fn map_render_error(error: ReportRenderError) -> Error {
    Error::internal(error.to_string())
}

pub(crate) fn already_finalized() -> Error {
    Error::conflict("This report has already been finalized and cannot be edited.")
}
