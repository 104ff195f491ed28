//! Report domain service: reviewer edits and exports.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::info;

use crate::domain::port_error_mapping::{
    already_finalized, map_case_error, map_render_error, map_report_error,
};
use crate::domain::ports::{
    CaseRepository, EditableReport, ExportFormat, ReportCommand, ReportExport, ReportPdfRenderer,
    ReportQuery, ReportRepository, ReportSaved, SaveReportRequest,
};
use crate::domain::{
    Case, CaseId, CaseStatus, Error, Report, ReportDocument, ReportEditAction, UserId,
    export_filename,
};

/// Report service implementing [`ReportCommand`] and [`ReportQuery`].
pub struct ReportService<C, R, P: ?Sized> {
    cases: Arc<C>,
    reports: Arc<R>,
    renderer: Arc<P>,
    hospital_name: String,
    clock: Arc<dyn Clock>,
}

impl<C, R, P: ?Sized> ReportService<C, R, P> {
    /// Create a new service. `hospital_name` heads every export.
    pub fn new(
        cases: Arc<C>,
        reports: Arc<R>,
        renderer: Arc<P>,
        hospital_name: impl Into<String>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            cases,
            reports,
            renderer,
            hospital_name: hospital_name.into(),
            clock,
        }
    }
}

impl<C, R, P> ReportService<C, R, P>
where
    C: CaseRepository,
    R: ReportRepository,
    P: ReportPdfRenderer + ?Sized,
{
    async fn case_with_report(&self, owner: UserId, id: CaseId) -> Result<(Case, Report), Error> {
        let case = self
            .cases
            .find_owned(owner, id)
            .await
            .map_err(map_case_error)?
            .ok_or_else(|| Error::not_found("Case not found"))?;
        let report = self
            .reports
            .find_by_case(case.id)
            .await
            .map_err(map_report_error)?
            .ok_or_else(|| Error::not_found("No report found for this case"))?;
        Ok((case, report))
    }
}

#[async_trait]
impl<C, R, P> ReportQuery for ReportService<C, R, P>
where
    C: CaseRepository,
    R: ReportRepository,
    P: ReportPdfRenderer + ?Sized,
{
    async fn editable_report(
        &self,
        owner: UserId,
        case_id: CaseId,
    ) -> Result<EditableReport, Error> {
        let (case, report) = self.case_with_report(owner, case_id).await?;
        if report.is_finalized {
            return Err(already_finalized());
        }
        let text = report.current_text().unwrap_or_default().to_owned();
        Ok(EditableReport { case, report, text })
    }

    async fn export(
        &self,
        owner: UserId,
        case_id: CaseId,
        format: ExportFormat,
    ) -> Result<ReportExport, Error> {
        let (case, report) = self.case_with_report(owner, case_id).await?;
        let document = ReportDocument::build(&self.hospital_name, &case, &report, self.clock.utc());
        let bytes = match format {
            ExportFormat::Text => document.to_text().into_bytes(),
            ExportFormat::Pdf => self
                .renderer
                .render(&document)
                .await
                .map_err(map_render_error)?,
        };
        info!(case_id = %case.id, format = format.extension(), "report exported");
        Ok(ReportExport {
            filename: export_filename(&case, format.extension()),
            format,
            bytes,
        })
    }
}

#[async_trait]
impl<C, R, P> ReportCommand for ReportService<C, R, P>
where
    C: CaseRepository,
    R: ReportRepository,
    P: ReportPdfRenderer + ?Sized,
{
    async fn save_edit(&self, request: SaveReportRequest) -> Result<ReportSaved, Error> {
        let SaveReportRequest {
            owner,
            case_id,
            text,
            action,
        } = request;
        let case = self
            .cases
            .find_owned(owner, case_id)
            .await
            .map_err(map_case_error)?
            .ok_or_else(|| Error::not_found("Case not found"))?;
        let report = self
            .reports
            .save_edit(case.id, &text, action)
            .await
            .map_err(map_report_error)?;
        let case_status = match action {
            ReportEditAction::SaveDraft => CaseStatus::DraftEdited,
            ReportEditAction::Finalize => CaseStatus::Completed,
        };
        info!(case_id = %case.id, status = %case_status, "report edit saved");
        Ok(ReportSaved {
            report,
            case_status,
            notice: action.notice(),
        })
    }
}

#[cfg(test)]
#[path = "report_service_tests.rs"]
mod tests;
