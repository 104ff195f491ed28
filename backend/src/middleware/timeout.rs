//! Upper bound on request processing time.
//!
//! Requests still running when the limit elapses are dropped and answered
//! with `503 service_unavailable`. Slow AI drafting is the usual culprit.

use std::task::{Context, Poll};
use std::time::Duration;

use actix_web::Error;
use actix_web::body::EitherBody;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use tracing::warn;

use crate::domain::Error as DomainError;

const TIMEOUT_MESSAGE: &str = "The request took too long to process. Please try again.";

/// Middleware cancelling handlers that run longer than the configured limit.
///
/// # Examples
/// ```
/// use std::time::Duration;
///
/// use actix_web::App;
/// use diagnoseai::middleware::RequestTimeout;
///
/// let app = App::new().wrap(RequestTimeout::new(Duration::from_secs(120)));
/// ```
#[derive(Clone, Copy, Debug)]
pub struct RequestTimeout {
    limit: Duration,
}

impl RequestTimeout {
    /// Bound every request to `limit`.
    pub fn new(limit: Duration) -> Self {
        Self { limit }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RequestTimeout
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RequestTimeoutMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequestTimeoutMiddleware {
            service,
            limit: self.limit,
        }))
    }
}

/// Service wrapper produced by [`RequestTimeout`].
pub struct RequestTimeoutMiddleware<S> {
    service: S,
    limit: Duration,
}

impl<S, B> Service<ServiceRequest> for RequestTimeoutMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let http_req = req.request().clone();
        let limit = self.limit;
        let fut = self.service.call(req);
        Box::pin(async move {
            match tokio::time::timeout(limit, fut).await {
                Ok(res) => res.map(ServiceResponse::map_into_left_body),
                Err(_) => {
                    warn!(
                        method = %http_req.method(),
                        path = http_req.path(),
                        limit_secs = limit.as_secs_f64(),
                        "request exceeded processing limit"
                    );
                    let error = DomainError::service_unavailable(TIMEOUT_MESSAGE);
                    Ok(ServiceResponse::from_err(error, http_req).map_into_right_body())
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::{App, HttpResponse, test, web};
    use serde_json::Value;

    use super::*;
    use crate::domain::TRACE_ID_HEADER;
    use crate::middleware::Trace;

    async fn stalled() -> HttpResponse {
        tokio::time::sleep(Duration::from_secs(5)).await;
        HttpResponse::Ok().finish()
    }

    async fn quick() -> HttpResponse {
        HttpResponse::Ok().body("done")
    }

    #[actix_web::test]
    async fn stalled_handlers_become_service_unavailable() {
        let app = test::init_service(
            App::new()
                .wrap(RequestTimeout::new(Duration::from_millis(20)))
                .wrap(Trace)
                .route("/stalled", web::get().to(stalled)),
        )
        .await;

        let res =
            test::call_service(&app, test::TestRequest::get().uri("/stalled").to_request()).await;

        assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
        let header = res
            .headers()
            .get(TRACE_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .expect("trace id header")
            .to_owned();
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["code"], "service_unavailable");
        assert_eq!(body["message"], TIMEOUT_MESSAGE);
        assert_eq!(body["traceId"], header.as_str());
    }

    #[actix_web::test]
    async fn fast_handlers_pass_through() {
        let app = test::init_service(
            App::new()
                .wrap(RequestTimeout::new(Duration::from_secs(1)))
                .route("/quick", web::get().to(quick)),
        )
        .await;

        let res =
            test::call_service(&app, test::TestRequest::get().uri("/quick").to_request()).await;

        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(test::read_body(res).await, "done");
    }
}
