//! Builders wiring repositories, storage, and drafting into HTTP state.

use std::sync::Arc;

use actix_web::web;
use mockable::{Clock, DefaultClock};
use tracing::{info, warn};

use diagnoseai::domain::ports::{
    CaseRepository, ReportDrafter, ReportRepository, UnconfiguredReportDrafter,
    UserRepository,
};
use diagnoseai::domain::{AccountService, CaseService, ReportService};
use diagnoseai::inbound::http::state::{HttpState, HttpStatePorts};
use diagnoseai::outbound::memory::InMemoryStore;
use diagnoseai::outbound::openai::OpenAiReportDrafter;
use diagnoseai::outbound::pdf::PrintPdfRenderer;
use diagnoseai::outbound::persistence::{
    DieselCaseRepository, DieselReportRepository, DieselUserRepository,
};
use diagnoseai::outbound::storage::FsImageStore;

use super::ServerConfig;

/// Adapters shared by every service, independent of the storage backend.
struct SharedAdapters {
    drafter: Arc<dyn ReportDrafter>,
    clock: Arc<dyn Clock>,
    hospital_name: String,
}

/// Assemble the driving ports from a set of repositories.
fn build_ports<U, C, R>(
    users: Arc<U>,
    cases: Arc<C>,
    reports: Arc<R>,
    images: Arc<FsImageStore>,
    shared: SharedAdapters,
) -> HttpStatePorts
where
    U: UserRepository + 'static,
    C: CaseRepository + 'static,
    R: ReportRepository + 'static,
{
    let accounts = Arc::new(AccountService::new(users));
    let case_service = Arc::new(CaseService::new(
        cases.clone(),
        reports.clone(),
        images,
        shared.drafter,
        shared.clock.clone(),
    ));
    let report_service = Arc::new(ReportService::new(
        cases,
        reports,
        Arc::new(PrintPdfRenderer),
        shared.hospital_name,
        shared.clock,
    ));

    HttpStatePorts {
        login: accounts.clone(),
        registration: accounts.clone(),
        profile: accounts,
        cases: case_service.clone(),
        cases_query: case_service,
        reports: report_service.clone(),
        reports_query: report_service,
    }
}

/// Pick the OpenAI drafter when a key is configured.
fn build_drafter(config: &ServerConfig) -> std::io::Result<Arc<dyn ReportDrafter>> {
    match &config.openai {
        Some(settings) => {
            let drafter = OpenAiReportDrafter::new(settings.clone())
                .map_err(|e| std::io::Error::other(format!("OpenAI drafter: {e}")))?;
            info!(model = %settings.model, "AI report drafting enabled");
            Ok(Arc::new(drafter))
        }
        None => {
            warn!("OPENAI_API_KEY not set; new cases will be created without a draft");
            Ok(Arc::new(UnconfiguredReportDrafter))
        }
    }
}

/// Build HTTP state, using PostgreSQL when a pool is attached and the
/// in-memory store otherwise.
///
/// # Errors
///
/// Returns an I/O error when the upload folder cannot be opened or the
/// drafter cannot be constructed.
pub(super) fn build_http_state(config: &ServerConfig) -> std::io::Result<web::Data<HttpState>> {
    let images = Arc::new(FsImageStore::open(&config.upload_folder)?);
    info!(path = %images.root_path().display(), "upload folder ready");
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let shared = SharedAdapters {
        drafter: build_drafter(config)?,
        clock: clock.clone(),
        hospital_name: config.hospital_name.clone(),
    };

    let ports = match &config.db_pool {
        Some(pool) => build_ports(
            Arc::new(DieselUserRepository::new(pool.clone())),
            Arc::new(DieselCaseRepository::new(pool.clone())),
            Arc::new(DieselReportRepository::new(pool.clone())),
            images,
            shared,
        ),
        None => {
            let store = Arc::new(InMemoryStore::new(clock));
            build_ports(store.clone(), store.clone(), store, images, shared)
        }
    };

    Ok(web::Data::new(HttpState::with_max_content_length(
        ports,
        config.max_content_length,
    )))
}
