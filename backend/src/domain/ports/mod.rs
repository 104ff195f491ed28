//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod case_command;
mod case_query;
mod case_repository;
mod image_store;
mod login_service;
mod report_command;
mod report_drafter;
mod report_query;
mod report_renderer;
mod report_repository;
mod user_profile_query;
mod user_repository;

#[cfg(test)]
pub use case_command::MockCaseCommand;
pub use case_command::{CaseCommand, CaseCreated, CreateCaseRequest, DraftOutcome};
#[cfg(test)]
pub use case_query::MockCaseQuery;
pub use case_query::{CaseDetail, CaseImage, CaseQuery, Dashboard};
#[cfg(test)]
pub use case_repository::MockCaseRepository;
pub use case_repository::{CasePersistenceError, CaseRepository};
#[cfg(test)]
pub use image_store::MockImageStore;
pub use image_store::{ImageStore, ImageStoreError};
pub use login_service::{LoginService, RegistrationService};
#[cfg(test)]
pub use login_service::{MockLoginService, MockRegistrationService};
#[cfg(test)]
pub use report_command::MockReportCommand;
pub use report_command::{ReportCommand, ReportSaved, SaveReportRequest};
#[cfg(test)]
pub use report_drafter::MockReportDrafter;
pub use report_drafter::{
    DraftRequest, ReportDrafter, ReportDrafterError, UnconfiguredReportDrafter,
};
#[cfg(test)]
pub use report_query::MockReportQuery;
pub use report_query::{EditableReport, ExportFormat, ReportExport, ReportQuery};
#[cfg(test)]
pub use report_renderer::MockReportPdfRenderer;
pub use report_renderer::{ReportPdfRenderer, ReportRenderError};
#[cfg(test)]
pub use report_repository::MockReportRepository;
pub use report_repository::{ReportPersistenceError, ReportRepository};
#[cfg(test)]
pub use user_profile_query::MockUserProfileQuery;
pub use user_profile_query::UserProfileQuery;
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserPersistenceError, UserRepository};
