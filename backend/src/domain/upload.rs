//! Image upload validation and on-disk naming.
//!
//! Uploaded files are stored below the upload root as
//! `{user_id}/{YYYYmmdd_HHMMSS_micros}_{sanitised name}`.

use chrono::{DateTime, Utc};

use super::{CaseValidationError, ClinicalNotes, UserId};

/// Accepted image formats, keyed by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Jpeg,
    Png,
    Gif,
    Bmp,
    Tiff,
}

impl ImageFormat {
    /// Resolve a format from a file name's extension (case-insensitive).
    ///
    /// # Examples
    /// ```
    /// use diagnoseai::domain::ImageFormat;
    ///
    /// assert_eq!(ImageFormat::from_filename("scan.JPG"), Some(ImageFormat::Jpeg));
    /// assert_eq!(ImageFormat::from_filename("notes.pdf"), None);
    /// ```
    pub fn from_filename(filename: &str) -> Option<Self> {
        let (_, extension) = filename.rsplit_once('.')?;
        match extension.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "png" => Some(Self::Png),
            "gif" => Some(Self::Gif),
            "bmp" => Some(Self::Bmp),
            "tiff" => Some(Self::Tiff),
            _ => None,
        }
    }

    /// MIME type served when the image is downloaded.
    pub fn content_type(self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::Gif => "image/gif",
            Self::Bmp => "image/bmp",
            Self::Tiff => "image/tiff",
        }
    }
}

/// Validated uploaded image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    filename: String,
    format: ImageFormat,
    bytes: Vec<u8>,
}

impl ImageUpload {
    /// Validate an uploaded file.
    pub fn new(filename: Option<&str>, bytes: Vec<u8>) -> Result<Self, CaseValidationError> {
        let filename = filename
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .ok_or(CaseValidationError::MissingImage)?;
        if bytes.is_empty() {
            return Err(CaseValidationError::MissingImage);
        }
        let format =
            ImageFormat::from_filename(filename).ok_or(CaseValidationError::UnsupportedImageType)?;
        Ok(Self {
            filename: filename.to_owned(),
            format,
            bytes,
        })
    }

    /// Client-supplied file name.
    pub fn filename(&self) -> &str {
        self.filename.as_str()
    }

    /// Detected image format.
    pub fn format(&self) -> ImageFormat {
        self.format
    }

    /// Raw file contents.
    pub fn bytes(&self) -> &[u8] {
        self.bytes.as_slice()
    }
}

/// Validated case submission: image first, then notes, matching form order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseSubmission {
    pub image: ImageUpload,
    pub clinical_notes: ClinicalNotes,
}

impl CaseSubmission {
    /// Validate raw form parts.
    pub fn try_from_parts(
        filename: Option<&str>,
        bytes: Vec<u8>,
        clinical_notes: Option<&str>,
    ) -> Result<Self, CaseValidationError> {
        let image = ImageUpload::new(filename, bytes)?;
        let clinical_notes = ClinicalNotes::new(clinical_notes.unwrap_or_default())?;
        Ok(Self {
            image,
            clinical_notes,
        })
    }
}

/// Location of a stored image relative to the upload root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredImagePath {
    filename: String,
    relative_path: String,
}

impl StoredImagePath {
    /// Derive the stored name for an upload received at `received_at`.
    ///
    /// # Examples
    /// ```
    /// use chrono::{TimeZone, Utc};
    /// use diagnoseai::domain::{StoredImagePath, UserId};
    ///
    /// let at = Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();
    /// let user = UserId::new(7).unwrap();
    /// let stored = StoredImagePath::for_upload(user, "../Liver Scan.PNG", at);
    /// assert_eq!(stored.filename(), "20240309_140507_000000_Liver_Scan.PNG");
    /// assert_eq!(stored.relative_path(), "7/20240309_140507_000000_Liver_Scan.PNG");
    /// ```
    pub fn for_upload(user_id: UserId, original: &str, received_at: DateTime<Utc>) -> Self {
        let mut sanitised = secure_filename(original);
        if sanitised.is_empty() {
            sanitised = "upload".to_owned();
        }
        let filename = format!("{}_{sanitised}", received_at.format("%Y%m%d_%H%M%S_%6f"));
        let relative_path = format!("{user_id}/{filename}");
        Self {
            filename,
            relative_path,
        }
    }

    /// Wrap a path loaded from storage.
    pub fn from_stored(filename: impl Into<String>, relative_path: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            relative_path: relative_path.into(),
        }
    }

    /// Stored file name.
    pub fn filename(&self) -> &str {
        self.filename.as_str()
    }

    /// Path relative to the upload root, always `/`-separated.
    pub fn relative_path(&self) -> &str {
        self.relative_path.as_str()
    }
}

/// Reduce a client file name to a safe ASCII name.
///
/// Path separators become spaces, whitespace runs become `_`, characters
/// outside `[A-Za-z0-9_.-]` are dropped, and leading or trailing `.`/`_` are
/// stripped so the result can never traverse directories.
pub fn secure_filename(raw: &str) -> String {
    let ascii: String = raw
        .chars()
        .filter(char::is_ascii)
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();
    let joined = ascii.split_whitespace().collect::<Vec<_>>().join("_");
    let kept: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        .collect();
    kept.trim_matches(|c| c == '.' || c == '_').to_owned()
}
