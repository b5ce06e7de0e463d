//! Upload validation and text extraction for financial documents.
//!
//! Inbound adapters stream the raw bytes; this module decides whether the
//! upload is acceptable and turns it into the text stored on a record.
//! Binary formats are not parsed: the bytes are decoded as lossy UTF-8.

use std::fmt;

/// Default upload cap: 5 MiB.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// Reasons an upload is rejected before anything is stored.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UploadValidationError {
    /// The request carried no file part.
    #[error("no file uploaded")]
    MissingFile,
    /// The file part had no usable file name.
    #[error("uploaded file must have a name")]
    MissingFileName,
    /// The file was zero bytes long.
    #[error("uploaded file is empty")]
    EmptyFile,
    /// The file exceeded the configured cap.
    #[error("uploaded file exceeds the {limit} byte limit")]
    TooLarge {
        /// Configured cap in bytes.
        limit: usize,
    },
    /// The extension is not a supported document type.
    #[error("unsupported file type {extension:?}; expected one of csv, xlsx, xls, pdf, txt, json")]
    UnsupportedType {
        /// Offending extension (lower-cased, possibly empty).
        extension: String,
    },
}

/// Upload limits enforced at the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadPolicy {
    max_bytes: usize,
}

impl UploadPolicy {
    /// Policy with an explicit byte cap. A cap of zero is raised to one byte.
    #[must_use]
    pub fn new(max_bytes: usize) -> Self {
        Self {
            max_bytes: max_bytes.max(1),
        }
    }

    /// Maximum accepted file size in bytes.
    #[must_use]
    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    /// Fail once `received` bytes exceed the cap.
    pub fn check_size(&self, received: usize) -> Result<(), UploadValidationError> {
        if received > self.max_bytes {
            Err(UploadValidationError::TooLarge {
                limit: self.max_bytes,
            })
        } else {
            Ok(())
        }
    }
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_UPLOAD_BYTES)
    }
}

/// Supported document types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    /// Comma-separated values.
    Csv,
    /// Office Open XML spreadsheet.
    Xlsx,
    /// Legacy Excel spreadsheet.
    Xls,
    /// Portable Document Format.
    Pdf,
    /// Plain text.
    Text,
    /// JSON export.
    Json,
}

impl DocumentKind {
    /// Resolve a kind from a file name's extension.
    pub fn from_file_name(file_name: &str) -> Result<Self, UploadValidationError> {
        let extension = file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();
        match extension.as_str() {
            "csv" => Ok(Self::Csv),
            "xlsx" => Ok(Self::Xlsx),
            "xls" => Ok(Self::Xls),
            "pdf" => Ok(Self::Pdf),
            "txt" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(UploadValidationError::UnsupportedType { extension }),
        }
    }

    /// Canonical MIME type.
    #[must_use]
    pub const fn mime(self) -> &'static str {
        match self {
            Self::Csv => "text/csv",
            Self::Xlsx => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            Self::Xls => "application/vnd.ms-excel",
            Self::Pdf => "application/pdf",
            Self::Text => "text/plain",
            Self::Json => "application/json",
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mime())
    }
}

/// A validated upload ready to be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedDocument {
    file_name: String,
    file_type: String,
    content: String,
}

impl UploadedDocument {
    /// Validate an upload and extract its text.
    ///
    /// `declared_type` is the MIME type sent with the file part; generic or
    /// missing values fall back to the type implied by the extension.
    ///
    /// # Examples
    /// ```
    /// use finlens::domain::{UploadPolicy, UploadedDocument};
    ///
    /// let doc = UploadedDocument::from_bytes(
    ///     "q1.csv",
    ///     None,
    ///     b"month,revenue\nJan,1000",
    ///     &UploadPolicy::default(),
    /// )
    /// .expect("valid upload");
    /// assert_eq!(doc.file_type(), "text/csv");
    /// assert!(doc.content().contains("revenue"));
    /// ```
    pub fn from_bytes(
        raw_file_name: &str,
        declared_type: Option<&str>,
        bytes: &[u8],
        policy: &UploadPolicy,
    ) -> Result<Self, UploadValidationError> {
        let file_name = base_name(raw_file_name);
        if file_name.is_empty() {
            return Err(UploadValidationError::MissingFileName);
        }
        let kind = DocumentKind::from_file_name(file_name)?;
        policy.check_size(bytes.len())?;
        if bytes.is_empty() {
            return Err(UploadValidationError::EmptyFile);
        }

        let file_type = declared_type
            .map(str::trim)
            .filter(|mime| !mime.is_empty() && *mime != "application/octet-stream")
            .unwrap_or(kind.mime());

        Ok(Self {
            file_name: file_name.to_owned(),
            file_type: file_type.to_owned(),
            content: extract_text(bytes),
        })
    }

    /// Sanitised original file name.
    #[must_use]
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// MIME type recorded for the upload.
    #[must_use]
    pub fn file_type(&self) -> &str {
        &self.file_type
    }

    /// Extracted text.
    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Split into `(file_name, file_type, content)`.
    #[must_use]
    pub fn into_parts(self) -> (String, String, String) {
        (self.file_name, self.file_type, self.content)
    }
}

/// Decode bytes as UTF-8, replacing invalid sequences and dropping NUL
/// characters, which text columns cannot store.
#[must_use]
pub fn extract_text(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).replace('\0', "")
}

// Browsers may send full client paths (`C:\fakepath\q1.csv`).
fn base_name(raw: &str) -> &str {
    raw.rsplit(['/', '\\']).next().unwrap_or(raw).trim()
}
