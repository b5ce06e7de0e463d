//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain.

use chrono::{DateTime, Utc};
use diesel::prelude::*;

use super::schema::{analyses, records};

/// Row struct for reading from the records table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = records)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct RecordRow {
    pub id: i64,
    pub owner_id: String,
    pub file_name: String,
    pub file_type: String,
    pub upload_date: DateTime<Utc>,
    pub status: String,
    pub content: Option<String>,
    pub file_url: Option<String>,
}

/// Insertable struct for new records; `status` falls back to the column
/// default.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = records)]
pub(crate) struct NewRecordRow<'a> {
    pub owner_id: &'a str,
    pub file_name: &'a str,
    pub file_type: &'a str,
    pub upload_date: DateTime<Utc>,
    pub content: Option<&'a str>,
    pub file_url: Option<&'a str>,
}

/// Row struct for reading from the analyses table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = analyses)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct AnalysisRow {
    pub id: i64,
    pub record_id: i64,
    pub created_at: DateTime<Utc>,
    pub metrics: serde_json::Value,
    pub health_score: i16,
    pub risks: Vec<String>,
    pub opportunities: Vec<String>,
    pub recommendations: Vec<String>,
    pub ai_narrative: String,
}

/// Insertable struct for new analyses.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = analyses)]
pub(crate) struct NewAnalysisRow<'a> {
    pub record_id: i64,
    pub created_at: DateTime<Utc>,
    pub metrics: serde_json::Value,
    pub health_score: i16,
    pub risks: &'a [String],
    pub opportunities: &'a [String],
    pub recommendations: &'a [String],
    pub ai_narrative: &'a str,
}
