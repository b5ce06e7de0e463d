//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `migrations/` exactly. Regenerate with
//! `diesel print-schema` after changing a migration.

diesel::table! {
    /// Uploaded financial documents.
    ///
    /// `status` is constrained to `pending`, `processing`, `completed` and
    /// `error` by a check constraint.
    records (id) {
        /// Primary key.
        id -> Int8,
        /// Uploader's owner id.
        owner_id -> Text,
        /// Original file name.
        file_name -> Text,
        /// MIME type of the upload.
        file_type -> Text,
        /// Upload timestamp.
        upload_date -> Timestamptz,
        /// Lifecycle status.
        status -> Text,
        /// Extracted text content.
        content -> Nullable<Text>,
        /// Optional external storage pointer.
        file_url -> Nullable<Text>,
    }
}

diesel::table! {
    /// Analyzer results; several may exist per record.
    analyses (id) {
        /// Primary key.
        id -> Int8,
        /// Owning record; rows cascade on record deletion.
        record_id -> Int8,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Extracted figures as a camelCase JSON object.
        metrics -> Jsonb,
        /// Score between 0 and 100.
        health_score -> Int2,
        /// Identified risks.
        risks -> Array<Text>,
        /// Identified opportunities.
        opportunities -> Array<Text>,
        /// Suggested actions.
        recommendations -> Array<Text>,
        /// Markdown narrative.
        ai_narrative -> Text,
    }
}

diesel::joinable!(analyses -> records (record_id));
diesel::allow_tables_to_appear_in_same_query!(records, analyses);
