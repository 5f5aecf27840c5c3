//! # Mapping Template Service Module
//!
//! Routes under `/api/templates` for the reusable column-assignment rule sets
//! an upload can name in its `template_name`.
//!
//! ## Registered Routes:
//!
//! *   **`POST /save`**: creates or replaces a `MappingTemplate` (same kind and name).
//! *   **`GET /{kind}`**: every template of one record kind, by name.
//! *   **`GET /{kind}/{name}`**: one template.
//! *   **`DELETE /{kind}/{name}`**: removes a template.
//! *   **`GET /{kind}/{name}/sample`**: a CSV file whose header row lists the
//!     template fields in display order, for operators preparing an export.

mod delete;
mod get;
mod list;
mod sample;
mod save;

use actix_web::web::{delete, get, post, scope};
use actix_web::Scope;

const API_PATH: &str = "/api/templates";

pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("/save", post().to(save::process))
        .route("/{kind}", get().to(list::process))
        .route("/{kind}/{name}", get().to(get::process))
        .route("/{kind}/{name}", delete().to(delete::process))
        .route("/{kind}/{name}/sample", get().to(sample::process))
}
