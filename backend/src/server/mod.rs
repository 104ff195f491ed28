//! Server construction and middleware wiring.

mod config;
mod state_builders;

pub use config::{ConfigError, ServerConfig};

use state_builders::build_http_state;

use actix_session::{
    SessionMiddleware,
    config::{CookieContentSecurity, PersistentSession},
    storage::CookieSessionStore,
};
use std::time::Duration;

use actix_web::body::{BoxBody, EitherBody};
use actix_web::cookie::{Key, SameSite};
use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpResponse, HttpServer, get, web};
use utoipa::OpenApi;

use diagnoseai::middleware::{RequestTimeout, Trace};
use diagnoseai::doc::ApiDoc;
use diagnoseai::inbound::http::health::{HealthState, live, ready, status};
use diagnoseai::inbound::http::routes::api_scope;
use diagnoseai::inbound::http::state::HttpState;

const SESSION_TTL_HOURS: i64 = 2;

#[derive(Clone)]
struct AppDependencies {
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
    key: Key,
    cookie_secure: bool,
    same_site: SameSite,
    request_timeout: Duration,
}

/// Serve the generated OpenAPI document.
#[get("/api-docs/openapi.json")]
async fn openapi_json() -> HttpResponse {
    HttpResponse::Ok().json(ApiDoc::openapi())
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<EitherBody<BoxBody>>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
        key,
        cookie_secure,
        same_site,
        request_timeout,
    } = deps;

    let session = SessionMiddleware::builder(CookieSessionStore::default(), key)
        .cookie_name("session".into())
        .cookie_path("/".into())
        .cookie_secure(cookie_secure)
        .cookie_http_only(true)
        .cookie_content_security(CookieContentSecurity::Private)
        .cookie_same_site(same_site)
        .session_lifecycle(PersistentSession::default().session_ttl(
            actix_web::cookie::time::Duration::hours(SESSION_TTL_HOURS),
        ))
        .build();

    App::new()
        .app_data(health_state)
        .app_data(http_state)
        .wrap(RequestTimeout::new(request_timeout))
        .wrap(Trace)
        .service(api_scope().wrap(session))
        .service(openapi_json)
        .service(status)
        .service(ready)
        .service(live)
}

/// Construct an Actix HTTP server from the provided health state and
/// configuration.
///
/// # Parameters
/// - `health_state`: shared readiness state, marked ready once the listener
///   is bound.
/// - `config`: validated [`ServerConfig`], with the database pool attached
///   when PostgreSQL is in use.
///
/// # Errors
/// Propagates [`std::io::Error`] when the upload folder cannot be opened,
/// the drafter cannot be built, or binding the socket fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let server_health_state = health_state.clone();
    let http_state = build_http_state(&config)?;
    let key = config.key.clone();
    let cookie_secure = config.cookie_secure;
    let same_site = config.same_site;
    let request_timeout = config.request_timeout;

    let server = HttpServer::new(move || {
        build_app(AppDependencies {
            health_state: server_health_state.clone(),
            http_state: http_state.clone(),
            key: key.clone(),
            cookie_secure,
            same_site,
            request_timeout,
        })
    })
    .workers(config.workers)
    .bind(config.bind_addr)?
    .run();

    health_state.mark_ready();
    Ok(server)
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test;
    use diagnoseai::inbound::http::state::HttpStatePorts;
    use rstest::rstest;
    use std::sync::Arc;

    use diagnoseai::domain::AccountService;
    use diagnoseai::domain::ports::UnconfiguredReportDrafter;
    use diagnoseai::domain::{CaseService, ReportService};
    use diagnoseai::outbound::memory::InMemoryStore;
    use diagnoseai::outbound::pdf::PrintPdfRenderer;
    use diagnoseai::outbound::storage::FsImageStore;
    use mockable::DefaultClock;

    fn deps(upload_dir: &std::path::Path) -> AppDependencies {
        let clock = Arc::new(DefaultClock);
        let store = Arc::new(InMemoryStore::new(clock.clone()));
        let images = Arc::new(FsImageStore::open(upload_dir).expect("upload dir"));
        let accounts = Arc::new(AccountService::new(store.clone()));
        let cases = Arc::new(CaseService::new(
            store.clone(),
            store.clone(),
            images,
            Arc::new(UnconfiguredReportDrafter),
            clock.clone(),
        ));
        let reports = Arc::new(ReportService::new(
            store.clone(),
            store,
            Arc::new(PrintPdfRenderer),
            "General Hospital",
            clock,
        ));
        let ports = HttpStatePorts {
            login: accounts.clone(),
            registration: accounts.clone(),
            profile: accounts,
            cases: cases.clone(),
            cases_query: cases,
            reports: reports.clone(),
            reports_query: reports,
        };
        AppDependencies {
            health_state: web::Data::new(HealthState::default()),
            http_state: web::Data::new(HttpState::new(ports)),
            key: Key::generate(),
            cookie_secure: false,
            same_site: SameSite::Lax,
            request_timeout: Duration::from_secs(120),
        }
    }

    #[rstest]
    #[case("/health/live", 200)]
    #[case("/health/ready", 503)]
    #[case("/api-docs/openapi.json", 200)]
    #[case("/api/v1/dashboard", 401)]
    #[actix_web::test]
    async fn routes_are_mounted(#[case] path: &str, #[case] expected: u16) {
        let dir = tempfile::tempdir().expect("tempdir");
        let app = test::init_service(build_app(deps(dir.path()))).await;
        let res = test::call_service(&app, test::TestRequest::get().uri(path).to_request()).await;
        assert_eq!(res.status().as_u16(), expected, "{path}");
        assert!(res.headers().contains_key("trace-id"));
    }

    #[actix_web::test]
    async fn login_sets_a_private_session_cookie() {
        let dir = tempfile::tempdir().expect("tempdir");
        let app = test::init_service(build_app(deps(dir.path()))).await;
        let register = test::TestRequest::post()
            .uri("/api/v1/auth/register")
            .set_json(serde_json::json!({
                "username": "dr_smith",
                "email": "dr.smith@hospital.com",
                "password": "secret123",
                "confirmPassword": "secret123"
            }))
            .to_request();
        assert_eq!(test::call_service(&app, register).await.status(), 201);

        let login = test::TestRequest::post()
            .uri("/api/v1/auth/login")
            .set_json(serde_json::json!({ "username": "dr_smith", "password": "secret123" }))
            .to_request();
        let res = test::call_service(&app, login).await;
        assert_eq!(res.status(), 200);
        let cookie = res
            .response()
            .cookies()
            .find(|c| c.name() == "session")
            .expect("session cookie");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.path(), Some("/"));
    }
}
