//! Tests for the report service.

use std::sync::Arc;

use chrono::{DateTime, Local, TimeZone, Utc};
use rstest::{fixture, rstest};

use super::*;
use crate::domain::ports::{
    MockCaseRepository, MockReportPdfRenderer, MockReportRepository, ReportPersistenceError,
    ReportRenderError,
};
use crate::domain::{ErrorCode, ReportText};

struct FixtureClock;

impl Clock for FixtureClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 7, 1, 12, 0, 0)
            .single()
            .expect("valid fixture timestamp")
    }
}

#[fixture]
fn owner() -> UserId {
    UserId::new(4).expect("valid id")
}

fn case_id() -> CaseId {
    CaseId::new(21).expect("valid id")
}

fn stored_case(owner: UserId) -> Case {
    let at = FixtureClock.utc();
    Case {
        id: case_id(),
        user_id: owner,
        image_filename: "20240701_120000_000000_kidney.jpg".to_owned(),
        image_path: "4/20240701_120000_000000_kidney.jpg".to_owned(),
        clinical_notes: "Flank pain, query hydronephrosis.".to_owned(),
        status: CaseStatus::DraftReady,
        created_at: at,
        updated_at: at,
    }
}

fn stored_report(finalized: bool) -> Report {
    let at = FixtureClock.utc();
    Report {
        id: 8,
        case_id: case_id(),
        draft_json: None,
        draft_text: Some("AI draft body".to_owned()),
        final_text: finalized.then(|| "Final reviewed body".to_owned()),
        is_finalized: finalized,
        created_at: at,
        updated_at: at,
    }
}

fn review_text() -> ReportText {
    ReportText::new("Mild left hydronephrosis. No calculus identified. Recommend follow-up.")
        .expect("valid report text")
}

fn service(
    cases: MockCaseRepository,
    reports: MockReportRepository,
    renderer: MockReportPdfRenderer,
) -> ReportService<MockCaseRepository, MockReportRepository, MockReportPdfRenderer> {
    ReportService::new(
        Arc::new(cases),
        Arc::new(reports),
        Arc::new(renderer),
        "Riverside Clinic",
        Arc::new(FixtureClock),
    )
}

fn owned_cases(owner: UserId) -> MockCaseRepository {
    let mut cases = MockCaseRepository::new();
    cases
        .expect_find_owned()
        .times(1)
        .return_once(move |_, _| Ok(Some(stored_case(owner))));
    cases
}

fn reports_returning(report: Option<Report>) -> MockReportRepository {
    let mut reports = MockReportRepository::new();
    reports
        .expect_find_by_case()
        .times(1)
        .return_once(move |_| Ok(report));
    reports
}

#[rstest]
#[tokio::test]
async fn editable_report_returns_current_text(owner: UserId) {
    let svc = service(
        owned_cases(owner),
        reports_returning(Some(stored_report(false))),
        MockReportPdfRenderer::new(),
    );

    let editable = svc.editable_report(owner, case_id()).await.expect("editable");
    assert_eq!(editable.text, "AI draft body");
}

#[rstest]
#[tokio::test]
async fn finalised_reports_are_not_editable(owner: UserId) {
    let svc = service(
        owned_cases(owner),
        reports_returning(Some(stored_report(true))),
        MockReportPdfRenderer::new(),
    );

    let err = svc.editable_report(owner, case_id()).await.expect_err("locked");
    assert_eq!(err.code(), ErrorCode::Conflict);
    assert_eq!(
        err.message(),
        "This report has already been finalized and cannot be edited."
    );
}

#[rstest]
#[tokio::test]
async fn missing_reports_are_not_found(owner: UserId) {
    let svc = service(
        owned_cases(owner),
        reports_returning(None),
        MockReportPdfRenderer::new(),
    );

    let err = svc
        .export(owner, case_id(), ExportFormat::Text)
        .await
        .expect_err("no report");
    assert_eq!(err.code(), ErrorCode::NotFound);
    assert_eq!(err.message(), "No report found for this case");
}

#[rstest]
#[case(ReportEditAction::SaveDraft, CaseStatus::DraftEdited, "Draft report has been saved successfully.")]
#[case(ReportEditAction::Finalize, CaseStatus::Completed, "Report has been finalized successfully.")]
#[tokio::test]
async fn save_edit_reports_the_new_status(
    owner: UserId,
    #[case] action: ReportEditAction,
    #[case] status: CaseStatus,
    #[case] notice: &str,
) {
    let mut reports = MockReportRepository::new();
    reports
        .expect_save_edit()
        .withf(move |id, text, requested| {
            *id == case_id() && text.as_ref().starts_with("Mild left") && *requested == action
        })
        .times(1)
        .return_once(move |_, _, _| Ok(stored_report(action == ReportEditAction::Finalize)));
    let svc = service(owned_cases(owner), reports, MockReportPdfRenderer::new());

    let saved = svc
        .save_edit(SaveReportRequest {
            owner,
            case_id: case_id(),
            text: review_text(),
            action,
        })
        .await
        .expect("saved");
    assert_eq!(saved.case_status, status);
    assert_eq!(saved.notice, notice);
}

#[rstest]
#[tokio::test]
async fn save_edit_rejects_finalised_reports(owner: UserId) {
    let mut reports = MockReportRepository::new();
    reports
        .expect_save_edit()
        .times(1)
        .return_once(|id, _, _| Err(ReportPersistenceError::already_finalized(id.get())));
    let svc = service(owned_cases(owner), reports, MockReportPdfRenderer::new());

    let err = svc
        .save_edit(SaveReportRequest {
            owner,
            case_id: case_id(),
            text: review_text(),
            action: ReportEditAction::SaveDraft,
        })
        .await
        .expect_err("locked");
    assert_eq!(err.code(), ErrorCode::Conflict);
}

#[rstest]
#[tokio::test]
async fn save_edit_requires_ownership(owner: UserId) {
    let mut cases = MockCaseRepository::new();
    cases.expect_find_owned().times(1).return_once(|_, _| Ok(None));
    let mut reports = MockReportRepository::new();
    reports.expect_save_edit().times(0);
    let svc = service(cases, reports, MockReportPdfRenderer::new());

    let err = svc
        .save_edit(SaveReportRequest {
            owner,
            case_id: case_id(),
            text: review_text(),
            action: ReportEditAction::Finalize,
        })
        .await
        .expect_err("not owner");
    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn text_export_uses_hospital_header(owner: UserId) {
    let svc = service(
        owned_cases(owner),
        reports_returning(Some(stored_report(true))),
        MockReportPdfRenderer::new(),
    );

    let export = svc
        .export(owner, case_id(), ExportFormat::Text)
        .await
        .expect("export");
    let text = String::from_utf8(export.bytes).expect("utf-8 export");
    assert_eq!(export.filename, "case_21_report.txt");
    assert!(text.starts_with("Riverside Clinic\n"));
    assert!(text.contains("Final reviewed body"));
    assert!(text.contains("Generated: 2024-07-01 12:00 UTC"));
}

#[rstest]
#[tokio::test]
async fn pdf_export_delegates_to_the_renderer(owner: UserId) {
    let mut renderer = MockReportPdfRenderer::new();
    renderer
        .expect_render()
        .withf(|document| document.hospital_name == "Riverside Clinic")
        .times(1)
        .return_once(|_| Ok(b"%PDF-1.3".to_vec()));
    let svc = service(
        owned_cases(owner),
        reports_returning(Some(stored_report(false))),
        renderer,
    );

    let export = svc
        .export(owner, case_id(), ExportFormat::Pdf)
        .await
        .expect("export");
    assert_eq!(export.filename, "case_21_report.pdf");
    assert!(export.bytes.starts_with(b"%PDF"));
}

#[rstest]
#[tokio::test]
async fn renderer_failures_are_internal(owner: UserId) {
    let mut renderer = MockReportPdfRenderer::new();
    renderer
        .expect_render()
        .times(1)
        .return_once(|_| Err(ReportRenderError::render("font missing")));
    let svc = service(
        owned_cases(owner),
        reports_returning(Some(stored_report(false))),
        renderer,
    );

    let err = svc
        .export(owner, case_id(), ExportFormat::Pdf)
        .await
        .expect_err("render fails");
    assert_eq!(err.code(), ErrorCode::InternalError);
}
