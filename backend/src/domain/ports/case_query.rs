//! Driving port for case listings and lookups.

use async_trait::async_trait;

use crate::domain::{Case, CaseId, CaseOverview, Error, Report, UserId};

/// A user's case list with summary counters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dashboard {
    /// Cases, newest first.
    pub cases: Vec<CaseOverview>,
    pub total: usize,
    /// Cases whose report is finalised.
    pub completed: usize,
    pub pending: usize,
}

impl Dashboard {
    /// Derive counters from a case list.
    ///
    /// # Examples
    /// ```
    /// use diagnoseai::domain::ports::Dashboard;
    ///
    /// let dashboard = Dashboard::from_cases(Vec::new());
    /// assert_eq!((dashboard.total, dashboard.completed, dashboard.pending), (0, 0, 0));
    /// ```
    pub fn from_cases(cases: Vec<CaseOverview>) -> Self {
        let total = cases.len();
        let completed = cases.iter().filter(|c| c.report_finalized).count();
        Self {
            cases,
            total,
            completed,
            pending: total - completed,
        }
    }
}

/// A case with its report, if one exists.
#[derive(Debug, Clone, PartialEq)]
pub struct CaseDetail {
    pub case: Case,
    pub report: Option<Report>,
}

/// Stored image bytes for a case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseImage {
    pub filename: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

/// Domain use-case port for reading cases.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CaseQuery: Send + Sync {
    /// List the user's cases.
    async fn dashboard(&self, owner: UserId) -> Result<Dashboard, Error>;

    /// Load one of the user's cases; other users' cases are not found.
    async fn case_detail(&self, owner: UserId, id: CaseId) -> Result<CaseDetail, Error>;

    /// Load the uploaded image for one of the user's cases.
    async fn case_image(&self, owner: UserId, id: CaseId) -> Result<CaseImage, Error>;
}
