//! Case domain service.
//!
//! Orchestrates uploads: the image is stored, the case row created, and an AI
//! draft requested. Drafting failures never fail the upload; they park the
//! case in `ai_failed` for manual review.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{error, info, warn};

use crate::domain::port_error_mapping::{map_case_error, map_image_error, map_report_error};
use crate::domain::ports::{
    CaseCommand, CaseCreated, CaseDetail, CaseImage, CaseQuery, CaseRepository, CreateCaseRequest,
    Dashboard, DraftOutcome, DraftRequest, ImageStore, ReportDrafter, ReportRepository,
};
use crate::domain::{
    Case, CaseId, CaseStatus, Error, ImageFormat, NewCase, Report, StoredImagePath, UserId,
};

/// Content type served when a stored image has an unexpected extension.
const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// Case service implementing [`CaseCommand`] and [`CaseQuery`].
pub struct CaseService<C, R, S, D: ?Sized> {
    cases: Arc<C>,
    reports: Arc<R>,
    images: Arc<S>,
    drafter: Arc<D>,
    clock: Arc<dyn Clock>,
}

impl<C, R, S, D: ?Sized> CaseService<C, R, S, D> {
    /// Create a new service with the given adapters.
    pub fn new(
        cases: Arc<C>,
        reports: Arc<R>,
        images: Arc<S>,
        drafter: Arc<D>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            cases,
            reports,
            images,
            drafter,
            clock,
        }
    }
}

impl<C, R, S, D> CaseService<C, R, S, D>
where
    C: CaseRepository,
    R: ReportRepository,
    S: ImageStore,
    D: ReportDrafter + ?Sized,
{
    async fn owned_case(&self, owner: UserId, id: CaseId) -> Result<Case, Error> {
        self.cases
            .find_owned(owner, id)
            .await
            .map_err(map_case_error)?
            .ok_or_else(|| Error::not_found("Case not found"))
    }

    async fn request_draft(&self, case: &Case, image: &[u8]) -> (Option<Report>, DraftOutcome) {
        let request = DraftRequest {
            case_id: case.id.get(),
            image: image.to_vec(),
            clinical_notes: case.clinical_notes.clone(),
        };
        let draft = match self.drafter.draft(&request).await {
            Ok(draft) => draft,
            Err(err) => {
                warn!(case_id = %case.id, error = %err, "AI drafting failed");
                return (None, DraftOutcome::DrafterFailed);
            }
        };
        match self.reports.attach_draft(case.id, &draft).await {
            Ok(report) => (Some(report), DraftOutcome::Drafted),
            Err(err) => {
                error!(case_id = %case.id, error = %err, "storing AI draft failed");
                (None, DraftOutcome::Unexpected)
            }
        }
    }

    /// Park the case for manual review. The upload already succeeded, so a
    /// failed status write is logged rather than surfaced.
    async fn mark_ai_failed(&self, id: CaseId) {
        if let Err(err) = self.cases.update_status(id, CaseStatus::AiFailed).await {
            error!(case_id = %id, error = %err, "recording ai_failed status failed");
        }
    }

    async fn discard_image(&self, stored: &StoredImagePath) {
        if let Err(err) = self.images.remove(stored).await {
            error!(path = stored.relative_path(), error = %err, "removing orphaned upload failed");
        }
    }
}

#[async_trait]
impl<C, R, S, D> CaseCommand for CaseService<C, R, S, D>
where
    C: CaseRepository,
    R: ReportRepository,
    S: ImageStore,
    D: ReportDrafter + ?Sized,
{
    async fn create_case(&self, request: CreateCaseRequest) -> Result<CaseCreated, Error> {
        let CreateCaseRequest { owner, submission } = request;
        let stored =
            StoredImagePath::for_upload(owner, submission.image.filename(), self.clock.utc());
        self.images
            .save(&stored, submission.image.bytes())
            .await
            .map_err(map_image_error)?;

        let inserted = self
            .cases
            .create(&NewCase {
                user_id: owner,
                image_filename: stored.filename().to_owned(),
                image_path: stored.relative_path().to_owned(),
                clinical_notes: submission.clinical_notes,
            })
            .await;
        let mut case = match inserted {
            Ok(case) => case,
            Err(err) => {
                self.discard_image(&stored).await;
                return Err(map_case_error(err));
            }
        };
        info!(case_id = %case.id, user_id = %owner, "case created");

        let (report, outcome) = self.request_draft(&case, submission.image.bytes()).await;
        case.status = match outcome {
            DraftOutcome::Drafted => CaseStatus::DraftReady,
            DraftOutcome::DrafterFailed | DraftOutcome::Unexpected => {
                self.mark_ai_failed(case.id).await;
                CaseStatus::AiFailed
            }
        };
        if let Some(stored_report) = &report {
            case.updated_at = stored_report.updated_at;
        }
        info!(case_id = %case.id, status = %case.status, "case drafting finished");
        Ok(CaseCreated {
            case,
            report,
            outcome,
        })
    }
}

#[async_trait]
impl<C, R, S, D> CaseQuery for CaseService<C, R, S, D>
where
    C: CaseRepository,
    R: ReportRepository,
    S: ImageStore,
    D: ReportDrafter + ?Sized,
{
    async fn dashboard(&self, owner: UserId) -> Result<Dashboard, Error> {
        let cases = self
            .cases
            .list_for_user(owner)
            .await
            .map_err(map_case_error)?;
        Ok(Dashboard::from_cases(cases))
    }

    async fn case_detail(&self, owner: UserId, id: CaseId) -> Result<CaseDetail, Error> {
        let case = self.owned_case(owner, id).await?;
        let report = self
            .reports
            .find_by_case(case.id)
            .await
            .map_err(map_report_error)?;
        Ok(CaseDetail { case, report })
    }

    async fn case_image(&self, owner: UserId, id: CaseId) -> Result<CaseImage, Error> {
        let case = self.owned_case(owner, id).await?;
        let stored = StoredImagePath::from_stored(case.image_filename, case.image_path);
        let bytes = self.images.load(&stored).await.map_err(map_image_error)?;
        let content_type = ImageFormat::from_filename(stored.filename())
            .map_or(FALLBACK_CONTENT_TYPE, ImageFormat::content_type);
        Ok(CaseImage {
            filename: stored.filename().to_owned(),
            content_type,
            bytes,
        })
    }
}

#[cfg(test)]
#[path = "case_service_tests.rs"]
mod tests;
