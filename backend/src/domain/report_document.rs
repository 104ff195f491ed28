//! Printable report document shared by the text and PDF exports.

use chrono::{DateTime, Utc};

use super::{Case, Report};

/// Width of the rule lines in the text export.
const RULE_WIDTH: usize = 60;

/// Footer printed under every exported report.
pub const EXPORT_DISCLAIMER: &str = "This report was drafted with AI assistance and must be \
reviewed by a qualified radiologist before clinical use.";

/// One titled block of a report document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentSection {
    pub heading: &'static str,
    pub body: String,
}

/// Content of an exported report, independent of output format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportDocument {
    pub hospital_name: String,
    pub title: String,
    pub metadata: Vec<(&'static str, String)>,
    pub sections: Vec<DocumentSection>,
    pub footer: &'static str,
}

impl ReportDocument {
    /// Assemble the export for a case and its report.
    pub fn build(
        hospital_name: &str,
        case: &Case,
        report: &Report,
        generated_at: DateTime<Utc>,
    ) -> Self {
        let metadata = vec![
            ("Case ID", case.id.to_string()),
            ("Case Status", case.status.label().to_owned()),
            ("Report Status", report.state_label().to_owned()),
            ("Image", case.image_filename.clone()),
            ("Created", format_timestamp(case.created_at)),
            ("Generated", format_timestamp(generated_at)),
        ];
        let sections = vec![
            DocumentSection {
                heading: "CLINICAL NOTES",
                body: case.clinical_notes.clone(),
            },
            DocumentSection {
                heading: "REPORT",
                body: report.current_text().unwrap_or_default().to_owned(),
            },
        ];
        Self {
            hospital_name: hospital_name.to_owned(),
            title: "RADIOLOGY REPORT".to_owned(),
            metadata,
            sections,
            footer: EXPORT_DISCLAIMER,
        }
    }

    /// Render the plain-text export.
    ///
    /// # Examples
    /// ```
    /// use chrono::{TimeZone, Utc};
    /// use diagnoseai::domain::{Case, CaseId, CaseStatus, Report, ReportDocument, UserId};
    ///
    /// let at = Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap();
    /// let case = Case {
    ///     id: CaseId::new(4).unwrap(),
    ///     user_id: UserId::new(1).unwrap(),
    ///     image_filename: "scan.png".into(),
    ///     image_path: "1/scan.png".into(),
    ///     clinical_notes: "Abdominal pain".into(),
    ///     status: CaseStatus::Completed,
    ///     created_at: at,
    ///     updated_at: at,
    /// };
    /// let report = Report {
    ///     id: 1,
    ///     case_id: case.id,
    ///     draft_json: None,
    ///     draft_text: Some("Draft".into()),
    ///     final_text: Some("Final findings".into()),
    ///     is_finalized: true,
    ///     created_at: at,
    ///     updated_at: at,
    /// };
    /// let text = ReportDocument::build("General Hospital", &case, &report, at).to_text();
    /// assert!(text.starts_with("General Hospital\nRADIOLOGY REPORT\n"));
    /// assert!(text.contains("Report Status: Final\n"));
    /// assert!(text.contains("Final findings"));
    /// ```
    pub fn to_text(&self) -> String {
        let heavy = "=".repeat(RULE_WIDTH);
        let light = "-".repeat(RULE_WIDTH);
        let mut out = String::new();
        out.push_str(&self.hospital_name);
        out.push('\n');
        out.push_str(&self.title);
        out.push('\n');
        out.push_str(&heavy);
        out.push_str("\n\n");
        for (label, value) in &self.metadata {
            out.push_str(&format!("{label}: {value}\n"));
        }
        for section in &self.sections {
            out.push('\n');
            out.push_str(section.heading);
            out.push('\n');
            out.push_str(&light);
            out.push('\n');
            out.push_str(section.body.trim_end());
            out.push('\n');
        }
        out.push('\n');
        out.push_str(&heavy);
        out.push('\n');
        out.push_str(self.footer);
        out.push('\n');
        out
    }
}

fn format_timestamp(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M UTC").to_string()
}

/// Attachment name for an exported report.
pub fn export_filename(case: &Case, extension: &str) -> String {
    format!("case_{}_report.{extension}", case.id)
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::{CaseId, CaseStatus, UserId};
    use chrono::TimeZone;
    use rstest::{fixture, rstest};

    #[fixture]
    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0)
            .single()
            .expect("valid fixture timestamp")
    }

    #[fixture]
    fn sample_case(at: DateTime<Utc>) -> Case {
        Case {
            id: CaseId::new(12).expect("valid id"),
            user_id: UserId::new(3).expect("valid id"),
            image_filename: "20240501_093000_000000_scan.png".to_owned(),
            image_path: "3/20240501_093000_000000_scan.png".to_owned(),
            clinical_notes: "Right upper quadrant pain for two days.".to_owned(),
            status: CaseStatus::DraftReady,
            created_at: at,
            updated_at: at,
        }
    }

    fn report(case: &Case, finalized: bool, final_text: Option<&str>) -> Report {
        Report {
            id: 7,
            case_id: case.id,
            draft_json: None,
            draft_text: Some("1. FINDINGS:\nGallbladder wall thickening.\n".to_owned()),
            final_text: final_text.map(str::to_owned),
            is_finalized: finalized,
            created_at: case.created_at,
            updated_at: case.created_at,
        }
    }

    #[rstest]
    fn draft_export_is_labelled_for_review(sample_case: Case, at: DateTime<Utc>) {
        let case = sample_case;
        let report = report(&case, false, None);
        let text = ReportDocument::build("St. Mary", &case, &report, at).to_text();

        assert!(text.starts_with("St. Mary\nRADIOLOGY REPORT\n"));
        assert!(text.contains("Case ID: 12\n"));
        assert!(text.contains("Case Status: Draft Ready\n"));
        assert!(text.contains("Report Status: Draft - Requires Review\n"));
        assert!(text.contains("Created: 2024-05-01 09:30 UTC\n"));
        assert!(text.contains("CLINICAL NOTES\n"));
        assert!(text.contains("Right upper quadrant pain for two days.\n"));
        assert!(text.contains("REPORT\n"));
        assert!(text.contains("Gallbladder wall thickening.\n"));
        assert!(text.ends_with(&format!("{EXPORT_DISCLAIMER}\n")));
    }

    #[rstest]
    fn final_export_prefers_edited_text(sample_case: Case, at: DateTime<Utc>) {
        let case = sample_case;
        let report = report(&case, true, Some("Edited impression."));
        let document = ReportDocument::build("St. Mary", &case, &report, at);

        assert_eq!(document.sections[1].body, "Edited impression.");
        assert!(document.to_text().contains("Report Status: Final\n"));
    }

    #[rstest]
    #[case("txt", "case_12_report.txt")]
    #[case("pdf", "case_12_report.pdf")]
    fn export_filenames(sample_case: Case, #[case] extension: &str, #[case] expected: &str) {
        assert_eq!(export_filename(&sample_case, extension), expected);
    }
}
