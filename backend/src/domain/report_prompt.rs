//! Prompt text sent to the report drafting model.

/// Notes placeholder used when a case has no clinical notes.
pub const MISSING_NOTES_PLACEHOLDER: &str = "No clinical notes provided.";

/// System instruction framing the model as a radiology assistant.
pub const DRAFTING_SYSTEM_PROMPT: &str = "You are an expert radiologist assistant. Analyze the \
provided ultrasound image and clinical notes to generate a preliminary radiology report. Be \
thorough but concise, and always include appropriate medical disclaimers.";

/// Build the user instruction for a case.
///
/// # Examples
/// ```
/// use diagnoseai::domain::drafting_user_prompt;
///
/// let prompt = drafting_user_prompt("   ");
/// assert!(prompt.contains("CLINICAL NOTES:\nNo clinical notes provided."));
/// assert!(prompt.contains("4. RECOMMENDATIONS"));
/// ```
pub fn drafting_user_prompt(clinical_notes: &str) -> String {
    let notes = match clinical_notes.trim() {
        "" => MISSING_NOTES_PLACEHOLDER,
        trimmed => trimmed,
    };
    format!(
        "Please analyze this ultrasound image and provide a preliminary radiology report based \
on the following clinical information:

CLINICAL NOTES:
{notes}

Please provide a structured report including:

1. TECHNICAL QUALITY: Comment on image quality and technical adequacy
2. FINDINGS: Describe what you observe in the ultrasound image
3. IMPRESSION: Provide your preliminary diagnostic impression
4. RECOMMENDATIONS: Suggest any follow-up studies or clinical correlation needed

IMPORTANT DISCLAIMERS:
- This is a preliminary AI-generated report that requires review by a qualified radiologist
- Clinical correlation is recommended
- This report should not be used as the sole basis for clinical decision-making

Please format the report in a clear, professional manner suitable for medical documentation."
    )
}
