//! Multipart parsing for case uploads.
//!
//! The form carries an `image` file part and a `clinical_notes` text part.
//! Bytes are counted across every part so oversized bodies are rejected
//! with `413` before they are fully buffered.

use actix_multipart::{Field, Multipart, MultipartError};
use actix_web::HttpRequest;
use actix_web::http::header;
use futures_util::TryStreamExt;
use serde_json::json;
use tracing::debug;

use crate::domain::Error;

const IMAGE_FIELD: &str = "image";
const NOTES_FIELD: &str = "clinical_notes";

/// Raw parts of an upload form, prior to domain validation.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct CaseUploadForm {
    /// Client-side filename of the image part, if one was chosen.
    pub filename: Option<String>,
    pub image: Vec<u8>,
    pub clinical_notes: Option<String>,
}

fn too_large(limit: usize) -> Error {
    Error::payload_too_large(format!("Upload exceeds the {limit} byte limit."))
        .with_details(json!({ "maxContentLength": limit }))
}

fn malformed(err: &MultipartError) -> Error {
    debug!(error = %err, "rejecting malformed multipart body");
    Error::invalid_request("Malformed multipart form data.")
}

/// Reject requests whose declared `Content-Length` already exceeds `limit`.
pub fn check_declared_length(req: &HttpRequest, limit: usize) -> Result<(), Error> {
    let declared = req
        .headers()
        .get(header::CONTENT_LENGTH)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<usize>().ok());
    match declared {
        Some(length) if length > limit => Err(too_large(limit)),
        _ => Ok(()),
    }
}

struct ByteBudget {
    limit: usize,
    used: usize,
}

impl ByteBudget {
    fn spend(&mut self, amount: usize) -> Result<(), Error> {
        self.used = self.used.saturating_add(amount);
        if self.used > self.limit {
            Err(too_large(self.limit))
        } else {
            Ok(())
        }
    }
}

async fn read_field(field: &mut Field, budget: &mut ByteBudget) -> Result<Vec<u8>, Error> {
    let mut buffer = Vec::new();
    while let Some(chunk) = field.try_next().await.map_err(|err| malformed(&err))? {
        budget.spend(chunk.len())?;
        buffer.extend_from_slice(&chunk);
    }
    Ok(buffer)
}

/// Drain the multipart stream into a [`CaseUploadForm`].
///
/// Unknown parts are read (and counted against the limit) but discarded.
pub async fn read_case_upload(
    mut payload: Multipart,
    limit: usize,
) -> Result<CaseUploadForm, Error> {
    let mut form = CaseUploadForm::default();
    let mut budget = ByteBudget { limit, used: 0 };

    while let Some(mut field) = payload.try_next().await.map_err(|err| malformed(&err))? {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some(IMAGE_FIELD) => {
                form.filename = field
                    .content_disposition()
                    .and_then(|disposition| disposition.get_filename())
                    .filter(|filename| !filename.trim().is_empty())
                    .map(str::to_owned);
                form.image = read_field(&mut field, &mut budget).await?;
            }
            Some(NOTES_FIELD) => {
                let bytes = read_field(&mut field, &mut budget).await?;
                let notes = String::from_utf8(bytes).map_err(|_| {
                    Error::invalid_request("Clinical notes must be valid UTF-8 text.")
                        .with_details(json!({ "field": "clinicalNotes" }))
                })?;
                form.clinical_notes = Some(notes);
            }
            other => {
                debug!(field = ?other, "ignoring unexpected multipart field");
                read_field(&mut field, &mut budget).await?;
            }
        }
    }

    Ok(form)
}
