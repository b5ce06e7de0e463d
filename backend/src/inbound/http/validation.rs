//! Shared validation helpers for inbound HTTP adapters.

use serde_json::json;

use crate::domain::{Error, IdentityValidationError, RecordId, UploadValidationError};

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    MissingField,
    EmptyField,
    InvalidRecordId,
    FileTooLarge,
    EmptyFile,
    UnsupportedFileType,
    MalformedMultipart,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::MissingField => "missing_field",
            ErrorCode::EmptyField => "empty_field",
            ErrorCode::InvalidRecordId => "invalid_record_id",
            ErrorCode::FileTooLarge => "file_too_large",
            ErrorCode::EmptyFile => "empty_file",
            ErrorCode::UnsupportedFileType => "unsupported_file_type",
            ErrorCode::MalformedMultipart => "malformed_multipart",
        }
    }
}

/// Newtype wrapper for HTTP field names to provide type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(&self) -> &str {
        self.0
    }
}

const FILE_FIELD: FieldName = FieldName::new("file");
const ID_FIELD: FieldName = FieldName::new("id");

/// Builder for validation errors with field context.
struct ValidationError {
    field: String,
    message: String,
}

impl ValidationError {
    fn new(field: FieldName, message: impl Into<String>) -> Self {
        Self {
            field: field.as_str().to_owned(),
            message: message.into(),
        }
    }

    fn with_code(self, code: ErrorCode) -> Error {
        Error::invalid_request(self.message).with_details(json!({
            "field": self.field,
            "code": code.as_str(),
        }))
    }

    fn with_value(self, code: ErrorCode, value: impl Into<String>) -> Error {
        Error::invalid_request(self.message).with_details(json!({
            "field": self.field,
            "value": value.into(),
            "code": code.as_str(),
        }))
    }
}

/// Parse a record id path segment, rejecting anything but a positive integer.
pub(crate) fn parse_record_id(raw: &str) -> Result<RecordId, Error> {
    raw.parse::<RecordId>().map_err(|_| {
        ValidationError::new(ID_FIELD, "record id must be a positive integer")
            .with_value(ErrorCode::InvalidRecordId, raw)
    })
}

pub(crate) fn map_upload_error(err: UploadValidationError) -> Error {
    let message = err.to_string();
    match err {
        UploadValidationError::MissingFile => {
            ValidationError::new(FILE_FIELD, message).with_code(ErrorCode::MissingField)
        }
        UploadValidationError::MissingFileName => {
            ValidationError::new(FieldName::new("fileName"), message)
                .with_code(ErrorCode::MissingField)
        }
        UploadValidationError::EmptyFile => {
            ValidationError::new(FILE_FIELD, message).with_code(ErrorCode::EmptyFile)
        }
        UploadValidationError::TooLarge { limit } => Error::invalid_request(message)
            .with_details(json!({
                "field": FILE_FIELD.as_str(),
                "limit": limit,
                "code": ErrorCode::FileTooLarge.as_str(),
            })),
        UploadValidationError::UnsupportedType { extension } => {
            ValidationError::new(FILE_FIELD, message)
                .with_value(ErrorCode::UnsupportedFileType, extension)
        }
    }
}

pub(crate) fn malformed_multipart_error(reason: impl std::fmt::Display) -> Error {
    ValidationError::new(FILE_FIELD, format!("malformed multipart body: {reason}"))
        .with_code(ErrorCode::MalformedMultipart)
}

pub(crate) fn map_login_validation_error(err: IdentityValidationError) -> Error {
    let message = err.to_string();
    match err {
        IdentityValidationError::EmptyUsername => {
            ValidationError::new(FieldName::new("username"), message)
                .with_code(ErrorCode::EmptyField)
        }
        IdentityValidationError::EmptyPassword => {
            ValidationError::new(FieldName::new("password"), message)
                .with_code(ErrorCode::EmptyField)
        }
        IdentityValidationError::EmptyOwnerId | IdentityValidationError::OwnerIdTooLong { .. } => {
            Error::invalid_request(message)
        }
    }
}
