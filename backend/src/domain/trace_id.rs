//! Correlation id attached to every request.
//!
//! The [`Trace`](crate::middleware::Trace) middleware puts a fresh id in
//! task-local scope before calling the handler. Domain errors pick it up when
//! they are built, and the middleware echoes it in the `trace-id` response
//! header, so a physician quoting the id from an error lets operators find the
//! matching log lines. Task locals do not follow `tokio::spawn`; wrap spawned
//! work in [`TraceId::scope`] when it should keep the id.

use std::fmt;
use std::future::Future;
use std::str::FromStr;

use tokio::task_local;
use uuid::Uuid;

/// Response header carrying the trace identifier.
pub const TRACE_ID_HEADER: &str = "trace-id";

task_local! {
    static CURRENT: TraceId;
}

/// Per-request correlation id.
///
/// # Examples
/// ```
/// use diagnoseai::TraceId;
///
/// async fn handler() {
///     if let Some(id) = TraceId::current() {
///         tracing::info!(trace_id = %id, "loading dashboard");
///     }
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TraceId(Uuid);

impl TraceId {
    pub(crate) fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// The id of the request being served, if any.
    #[must_use]
    pub fn current() -> Option<Self> {
        CURRENT.try_with(|id| *id).ok()
    }

    /// Run `fut` with `trace_id` as the current id.
    ///
    /// # Examples
    /// ```
    /// use diagnoseai::TraceId;
    ///
    /// # tokio::runtime::Runtime::new().unwrap().block_on(async {
    /// let id: TraceId = "7f3c1f0e-2b1a-4a3e-9d55-0c1d2e3f4a5b".parse().expect("uuid");
    /// assert_eq!(TraceId::scope(id, async { TraceId::current() }).await, Some(id));
    /// # });
    /// ```
    pub async fn scope<Fut: Future>(trace_id: TraceId, fut: Fut) -> Fut::Output {
        CURRENT.scope(trace_id, fut).await
    }

    /// Synchronous counterpart of [`TraceId::scope`]; the middleware uses it
    /// while constructing the inner service future.
    pub fn sync_scope<R>(self, work: impl FnOnce() -> R) -> R {
        CURRENT.sync_scope(self, work)
    }
}

impl fmt::Display for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0.hyphenated(), f)
    }
}

impl FromStr for TraceId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}
