//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    CaseCommand, CaseQuery, LoginService, RegistrationService, ReportCommand, ReportQuery,
    UserProfileQuery,
};

/// Default upper bound for upload request bodies (16 MiB).
pub const DEFAULT_MAX_CONTENT_LENGTH: usize = 16 * 1024 * 1024;

/// Parameter object bundling all port implementations for HTTP handlers.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub login: Arc<dyn LoginService>,
    pub registration: Arc<dyn RegistrationService>,
    pub profile: Arc<dyn UserProfileQuery>,
    pub cases: Arc<dyn CaseCommand>,
    pub cases_query: Arc<dyn CaseQuery>,
    pub reports: Arc<dyn ReportCommand>,
    pub reports_query: Arc<dyn ReportQuery>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub login: Arc<dyn LoginService>,
    pub registration: Arc<dyn RegistrationService>,
    pub profile: Arc<dyn UserProfileQuery>,
    pub cases: Arc<dyn CaseCommand>,
    pub cases_query: Arc<dyn CaseQuery>,
    pub reports: Arc<dyn ReportCommand>,
    pub reports_query: Arc<dyn ReportQuery>,
    /// Largest accepted multipart body in bytes.
    pub max_content_length: usize,
}

impl From<HttpStatePorts> for HttpState {
    fn from(ports: HttpStatePorts) -> Self {
        Self::new(ports)
    }
}

impl HttpState {
    /// Construct state with the default upload limit.
    pub fn new(ports: HttpStatePorts) -> Self {
        Self::with_max_content_length(ports, DEFAULT_MAX_CONTENT_LENGTH)
    }

    /// Construct state with an explicit upload limit.
    ///
    /// # Examples
    /// ```no_run
    /// use std::sync::Arc;
    ///
    /// use mockable::DefaultClock;
    /// use diagnoseai::domain::ports::UnconfiguredReportDrafter;
    /// use diagnoseai::domain::{AccountService, CaseService, ReportService};
    /// use diagnoseai::inbound::http::state::{HttpState, HttpStatePorts};
    /// use diagnoseai::outbound::memory::InMemoryStore;
    /// use diagnoseai::outbound::pdf::PrintPdfRenderer;
    /// use diagnoseai::outbound::storage::FsImageStore;
    ///
    /// let clock = Arc::new(DefaultClock);
    /// let store = Arc::new(InMemoryStore::new(clock.clone()));
    /// let images = Arc::new(FsImageStore::open("static/uploads").expect("upload dir"));
    /// let accounts = Arc::new(AccountService::new(store.clone()));
    /// let cases = Arc::new(CaseService::new(
    ///     store.clone(),
    ///     store.clone(),
    ///     images.clone(),
    ///     Arc::new(UnconfiguredReportDrafter),
    ///     clock.clone(),
    /// ));
    /// let reports = Arc::new(ReportService::new(
    ///     store.clone(),
    ///     store.clone(),
    ///     Arc::new(PrintPdfRenderer),
    ///     "General Hospital",
    ///     clock,
    /// ));
    /// let state = HttpState::with_max_content_length(
    ///     HttpStatePorts {
    ///         login: accounts.clone(),
    ///         registration: accounts.clone(),
    ///         profile: accounts,
    ///         cases: cases.clone(),
    ///         cases_query: cases,
    ///         reports: reports.clone(),
    ///         reports_query: reports,
    ///     },
    ///     1024 * 1024,
    /// );
    /// assert_eq!(state.max_content_length, 1024 * 1024);
    /// ```
    pub fn with_max_content_length(ports: HttpStatePorts, max_content_length: usize) -> Self {
        let HttpStatePorts {
            login,
            registration,
            profile,
            cases,
            cases_query,
            reports,
            reports_query,
        } = ports;
        Self {
            login,
            registration,
            profile,
            cases,
            cases_query,
            reports,
            reports_query,
            max_content_length,
        }
    }
}
