//! HTTP inbound adapter exposing REST endpoints.

use actix_web::web;

pub mod analysis;
pub mod error;
pub mod files;
pub mod files_dto;
pub mod health;
pub mod schemas;
pub mod session;
pub mod state;
#[cfg(any(test, feature = "test-support"))]
pub mod test_utils;
pub mod users;
pub mod validation;

pub use error::ApiResult;

/// Register every `/api` handler. Mount under a scope carrying the session
/// middleware.
///
/// # Examples
/// ```
/// use actix_web::{App, web};
/// use finlens::inbound::http::configure_api;
///
/// let _app = App::new().service(web::scope("/api").configure(configure_api));
/// ```
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.service(users::login)
        .service(users::current_user)
        .service(files::upload_file)
        .service(files::list_files)
        .service(files::get_file)
        .service(files::delete_file)
        .service(analysis::analyze_file)
        .service(analysis::get_analysis);
}
