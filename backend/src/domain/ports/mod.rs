//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (`*Repository`, [`FinancialAnalyzer`]) describe what the
//! domain needs from infrastructure. Driving ports ([`RecordCommand`],
//! [`RecordQuery`], [`AnalysisTrigger`], [`LoginService`]) are what inbound
//! adapters call.

mod macros;
pub(crate) use macros::define_port_error;

mod analysis_repository;
mod analysis_trigger;
mod financial_analyzer;
mod login_service;
mod record_command;
mod record_query;
mod record_repository;

#[cfg(test)]
pub use analysis_repository::MockAnalysisRepository;
pub use analysis_repository::{AnalysisRepository, AnalysisRepositoryError};
#[cfg(test)]
pub use analysis_trigger::MockAnalysisTrigger;
pub use analysis_trigger::{AnalysisAccepted, AnalysisTrigger};
#[cfg(test)]
pub use financial_analyzer::MockFinancialAnalyzer;
pub use financial_analyzer::{
    DisabledFinancialAnalyzer, FinancialAnalyzer, FinancialAnalyzerError,
};
pub use login_service::{FIXTURE_ACCOUNTS, FIXTURE_PASSWORD, FixtureLoginService, LoginService};
#[cfg(test)]
pub use record_command::MockRecordCommand;
pub use record_command::{RecordCommand, UploadRecordRequest};
#[cfg(test)]
pub use record_query::MockRecordQuery;
pub use record_query::RecordQuery;
#[cfg(test)]
pub use record_repository::MockRecordRepository;
pub use record_repository::{RecordRepository, RecordRepositoryError};
