//! Read access to committed records under `/api/records`.
//!
//! `/{kind}/export` is registered before `/{kind}/{id}` so it is not taken for a record id.

mod export;
mod get;
mod list;

use actix_web::web::{get, scope};
use actix_web::Scope;

const API_PATH: &str = "/api/records";

pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("/{kind}", get().to(list::process))
        .route("/{kind}/export", get().to(export::process))
        .route("/{kind}/{id}", get().to(get::process))
}
