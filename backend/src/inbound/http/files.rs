//! Financial record handlers.
//!
//! ```text
//! POST   /api/files        multipart `file`
//! GET    /api/files
//! GET    /api/files/{id}
//! DELETE /api/files/{id}
//! ```

use actix_multipart::{Field, Multipart};
use actix_web::{HttpResponse, delete, get, post, web};
use futures_util::TryStreamExt;
use tracing::debug;

use crate::domain::ports::UploadRecordRequest;
use crate::domain::{Error, UploadPolicy, UploadValidationError, UploadedDocument};
use crate::inbound::http::ApiResult;
use crate::inbound::http::files_dto::{RecordResponse, RecordWithAnalysisResponse, UploadForm};
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    malformed_multipart_error, map_upload_error, parse_record_id,
};

const FILE_FIELD: &str = "file";

/// Upload a financial document as a new `pending` record.
#[utoipa::path(
    post,
    path = "/api/files",
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Record created", body = RecordResponse),
        (status = 400, description = "Missing, empty, oversized or unsupported file", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema),
        (status = 503, description = "Store unavailable", body = ErrorSchema)
    ),
    tags = ["files"],
    operation_id = "uploadFile"
)]
#[post("/files")]
pub async fn upload_file(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: Multipart,
) -> ApiResult<HttpResponse> {
    let owner = session.require_owner()?;
    let document = read_document(payload, &state.upload_policy).await?;
    let record = state
        .records
        .upload(UploadRecordRequest {
            owner,
            document,
            file_url: None,
        })
        .await?;
    Ok(HttpResponse::Created().json(RecordResponse::from(record)))
}

/// List the caller's records, newest first, with their latest analyses.
#[utoipa::path(
    get,
    path = "/api/files",
    responses(
        (status = 200, description = "Records", body = [RecordWithAnalysisResponse]),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema),
        (status = 503, description = "Store unavailable", body = ErrorSchema)
    ),
    tags = ["files"],
    operation_id = "listFiles"
)]
#[get("/files")]
pub async fn list_files(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<RecordWithAnalysisResponse>>> {
    let owner = session.require_owner()?;
    let records = state.records_query.list(&owner).await?;
    Ok(web::Json(
        records
            .into_iter()
            .map(RecordWithAnalysisResponse::from)
            .collect(),
    ))
}

/// Fetch one record.
#[utoipa::path(
    get,
    path = "/api/files/{id}",
    params(("id" = i64, Path, description = "Record id")),
    responses(
        (status = 200, description = "Record", body = RecordResponse),
        (status = 400, description = "Invalid record id", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Record not found", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["files"],
    operation_id = "getFile"
)]
#[get("/files/{id}")]
pub async fn get_file(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<RecordResponse>> {
    let owner = session.require_owner()?;
    let id = parse_record_id(&path.into_inner())?;
    let record = state.records_query.get(&owner, id).await?;
    Ok(web::Json(record.into()))
}

/// Delete a record and its analyses, cancelling any running analysis.
#[utoipa::path(
    delete,
    path = "/api/files/{id}",
    params(("id" = i64, Path, description = "Record id")),
    responses(
        (status = 204, description = "Record deleted"),
        (status = 400, description = "Invalid record id", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Record not found", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["files"],
    operation_id = "deleteFile"
)]
#[delete("/files/{id}")]
pub async fn delete_file(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let owner = session.require_owner()?;
    let id = parse_record_id(&path.into_inner())?;
    state.records.delete(&owner, id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Read the `file` part, enforcing the size cap while streaming.
async fn read_document(
    mut payload: Multipart,
    policy: &UploadPolicy,
) -> Result<UploadedDocument, Error> {
    let mut document = None;
    while let Some(field) = payload.try_next().await.map_err(malformed_multipart_error)? {
        if document.is_none() && field.name() == Some(FILE_FIELD) {
            document = Some(read_file_field(field, policy).await?);
        } else {
            debug!(field = ?field.name(), "skipping multipart field");
            drain_field(field, policy).await?;
        }
    }
    document.ok_or_else(|| map_upload_error(UploadValidationError::MissingFile))
}

async fn read_file_field(
    mut field: Field,
    policy: &UploadPolicy,
) -> Result<UploadedDocument, Error> {
    let file_name = field
        .content_disposition()
        .and_then(|disposition| disposition.get_filename())
        .map(str::to_owned)
        .unwrap_or_default();
    let declared_type = field.content_type().map(|mime| mime.essence_str().to_owned());

    let mut bytes = Vec::new();
    while let Some(chunk) = field.try_next().await.map_err(malformed_multipart_error)? {
        policy
            .check_size(bytes.len() + chunk.len())
            .map_err(map_upload_error)?;
        bytes.extend_from_slice(&chunk);
    }

    UploadedDocument::from_bytes(&file_name, declared_type.as_deref(), &bytes, policy)
        .map_err(map_upload_error)
}

async fn drain_field(mut field: Field, policy: &UploadPolicy) -> Result<(), Error> {
    let mut received = 0usize;
    while let Some(chunk) = field.try_next().await.map_err(malformed_multipart_error)? {
        received += chunk.len();
        policy.check_size(received).map_err(map_upload_error)?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "files_tests.rs"]
mod tests;
