//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! This module provides concrete implementations of the record and analysis
//! repository ports backed by PostgreSQL via Diesel with async support through
//! `diesel-async` and `bb8` connection pooling.
//!
//! # Architecture
//!
//! - **Thin adapters**: repositories only translate between Diesel rows and
//!   domain types. Lifecycle rules come from
//!   [`RecordStatus::predecessors`](crate::domain::RecordStatus::predecessors).
//! - **Internal models**: row structs (`models.rs`) and table definitions
//!   (`schema.rs`) never leave this module.
//! - **Strongly typed errors**: database failures are mapped to the port error
//!   enums; corrupt rows surface as query errors.
//!
//! # Example
//!
//! ```ignore
//! use finlens::outbound::persistence::{DbPool, DieselRecordRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/finlens")).await?;
//! let records = DieselRecordRepository::new(pool);
//! ```

mod diesel_analysis_repository;
mod diesel_basic_error_mapping;
mod diesel_record_repository;
mod models;
mod pool;
mod schema;

pub use diesel_analysis_repository::DieselAnalysisRepository;
pub use diesel_record_repository::DieselRecordRepository;
pub use pool::{DbPool, PoolConfig, PoolError};
