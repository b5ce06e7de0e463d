//! Domain primitives, services and ports.
//!
//! Purpose: Define strongly typed entities for financial document records and
//! their analyses, plus the services that drive the upload and analysis
//! lifecycle. Nothing here knows about HTTP or SQL; adapters live under
//! `inbound` and `outbound`.
//!
//! Public surface:
//! - Error (alias to `error::Error`): API error response payload.
//! - ErrorCode (alias to `error::ErrorCode`): stable error identifier.
//! - Record, RecordStatus: stored documents and their lifecycle.
//! - Analysis, AnalysisReport: decoded analyzer output.
//! - RecordService, AnalysisCoordinator: driving-port implementations.

pub mod analysis;
pub mod analysis_coordinator;
pub mod error;
pub mod identity;
pub mod ports;
pub mod record;
mod record_access;
pub mod record_service;
pub mod trace_id;
pub mod upload;

pub use self::analysis::{
    Analysis, AnalysisId, AnalysisPrompt, AnalysisReport, FinancialMetrics, HealthScore,
    HealthScoreOutOfRange, MAX_PROMPT_CONTENT_CHARS, NewAnalysis, ReportDecodeError,
    parse_analysis_report,
};
pub use self::analysis_coordinator::{
    AnalysisAlreadyRunning, AnalysisClaim, AnalysisCoordinator, AnalysisCoordinatorConfig,
    AnalysisCoordinatorPorts, AnalysisRegistry, CancelReason, DEFAULT_ANALYSIS_TIMEOUT,
    fail_interrupted_analyses,
};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::identity::{IdentityValidationError, LoginCredentials, OwnerId};
pub use self::record::{
    NewRecord, Record, RecordId, RecordIdParseError, RecordStatus, RecordStatusParseError,
    RecordWithAnalysis,
};
pub use self::record_service::RecordService;
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::upload::{
    DEFAULT_MAX_UPLOAD_BYTES, DocumentKind, UploadPolicy, UploadValidationError,
    UploadedDocument, extract_text,
};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use finlens::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
