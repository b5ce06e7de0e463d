//! Financial document records and their processing lifecycle.
//!
//! A record is created `pending` by an upload, then moves through
//! `processing` to exactly one terminal state. The permitted edges are:
//!
//! ```text
//! pending ──▶ processing ──▶ completed
//!                       └──▶ error
//! ```

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};

use crate::domain::{Analysis, OwnerId};

/// Store-assigned record identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordId(i64);

impl RecordId {
    /// Wrap a raw identifier.
    #[must_use]
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    /// Raw identifier value.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Error returned when a raw identifier is not a positive integer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("record id must be a positive integer, got {raw:?}")]
pub struct RecordIdParseError {
    raw: String,
}

impl FromStr for RecordId {
    type Err = RecordIdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().parse::<i64>() {
            Ok(value) if value > 0 => Ok(Self(value)),
            _ => Err(RecordIdParseError { raw: s.to_owned() }),
        }
    }
}

/// Processing state of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordStatus {
    /// Uploaded, not yet analysed.
    Pending,
    /// Analysis is in flight.
    Processing,
    /// Analysis succeeded and a result is stored.
    Completed,
    /// Analysis failed; no result is stored.
    Error,
}

impl RecordStatus {
    /// Every status, in lifecycle order.
    pub const ALL: [Self; 4] = [Self::Pending, Self::Processing, Self::Completed, Self::Error];

    /// Stable wire and storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Error => "error",
        }
    }

    /// Statuses from which a record may move into `self`.
    #[must_use]
    pub const fn predecessors(self) -> &'static [Self] {
        match self {
            Self::Pending => &[],
            Self::Processing => &[Self::Pending],
            Self::Completed | Self::Error => &[Self::Processing],
        }
    }

    /// Whether a record in `self` may move to `next`.
    ///
    /// # Examples
    /// ```
    /// use finlens::domain::RecordStatus;
    ///
    /// assert!(RecordStatus::Pending.can_transition_to(RecordStatus::Processing));
    /// assert!(!RecordStatus::Completed.can_transition_to(RecordStatus::Processing));
    /// ```
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        next.predecessors().contains(&self)
    }

    /// Whether the status is final.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Error)
    }
}

impl fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a stored status string is unknown.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown record status {0:?}")]
pub struct RecordStatusParseError(String);

impl FromStr for RecordStatus {
    type Err = RecordStatusParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| RecordStatusParseError(s.to_owned()))
    }
}

/// A stored financial document.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// Store-assigned identifier.
    pub id: RecordId,
    /// Caller that uploaded the document.
    pub owner: OwnerId,
    /// Original file name.
    pub file_name: String,
    /// MIME type of the upload.
    pub file_type: String,
    /// Upload timestamp; never changes.
    pub upload_date: DateTime<Utc>,
    /// Current lifecycle status.
    pub status: RecordStatus,
    /// Extracted text content.
    pub content: Option<String>,
    /// Optional external storage pointer.
    pub file_url: Option<String>,
}

impl Record {
    /// Whether `owner` may see this record.
    #[must_use]
    pub fn is_owned_by(&self, owner: &OwnerId) -> bool {
        &self.owner == owner
    }
}

/// Values required to create a record. The store assigns the id and sets the
/// status to [`RecordStatus::Pending`].
#[derive(Debug, Clone, PartialEq)]
pub struct NewRecord {
    /// Caller that uploaded the document.
    pub owner: OwnerId,
    /// Original file name.
    pub file_name: String,
    /// MIME type of the upload.
    pub file_type: String,
    /// Upload timestamp.
    pub upload_date: DateTime<Utc>,
    /// Extracted text content.
    pub content: Option<String>,
    /// Optional external storage pointer.
    pub file_url: Option<String>,
}

impl NewRecord {
    /// Materialise the record once the store has assigned an id.
    #[must_use]
    pub fn into_record(self, id: RecordId) -> Record {
        Record {
            id,
            owner: self.owner,
            file_name: self.file_name,
            file_type: self.file_type,
            upload_date: self.upload_date,
            status: RecordStatus::Pending,
            content: self.content,
            file_url: self.file_url,
        }
    }
}

/// A record paired with its most recent analysis, as shown in listings.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordWithAnalysis {
    /// The record.
    pub record: Record,
    /// Latest analysis, if one exists.
    pub analysis: Option<Analysis>,
}
