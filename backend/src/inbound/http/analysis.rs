//! Analysis handlers.
//!
//! ```text
//! POST /api/files/{id}/analyze
//! GET  /api/files/{id}/analysis
//! ```

use actix_web::{HttpResponse, get, post, web};

use crate::inbound::http::ApiResult;
use crate::inbound::http::files_dto::{AnalysisAcceptedResponse, AnalysisResponse};
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::parse_record_id;

/// Start analysing a pending record.
///
/// Returns as soon as the record is `processing`; poll the record or its
/// analysis to observe the outcome.
#[utoipa::path(
    post,
    path = "/api/files/{id}/analyze",
    params(("id" = i64, Path, description = "Record id")),
    responses(
        (status = 202, description = "Analysis started", body = AnalysisAcceptedResponse),
        (status = 400, description = "Invalid record id", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Record not found", body = ErrorSchema),
        (status = 409, description = "Analysis running or record not pending", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["analysis"],
    operation_id = "analyzeFile"
)]
#[post("/files/{id}/analyze")]
pub async fn analyze_file(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let owner = session.require_owner()?;
    let id = parse_record_id(&path.into_inner())?;
    let accepted = state.analysis.trigger(&owner, id).await?;
    Ok(HttpResponse::Accepted().json(AnalysisAcceptedResponse::from(accepted)))
}

/// Fetch the latest analysis of a record.
#[utoipa::path(
    get,
    path = "/api/files/{id}/analysis",
    params(("id" = i64, Path, description = "Record id")),
    responses(
        (status = 200, description = "Latest analysis", body = AnalysisResponse),
        (status = 400, description = "Invalid record id", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Record or analysis not found", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["analysis"],
    operation_id = "getAnalysis"
)]
#[get("/files/{id}/analysis")]
pub async fn get_analysis(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<AnalysisResponse>> {
    let owner = session.require_owner()?;
    let id = parse_record_id(&path.into_inner())?;
    let analysis = state.records_query.latest_analysis(&owner, id).await?;
    Ok(web::Json(analysis.into()))
}
