//! Finlens backend library: financial document records and their AI analyses.
//!
//! Layout follows ports and adapters:
//! - [`domain`]: entities, services and port traits.
//! - [`inbound`]: HTTP handlers translating requests into domain calls.
//! - [`outbound`]: persistence, in-memory and AI provider adapters.
//! - [`settings`]: runtime configuration.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod settings;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use middleware::Trace;
