//! CSV import sessions over HTTP.
//!
//! The provided routes are:
//! - `POST /api/data_sources/csv/upload`: multipart/form-data upload. A `json`
//!   part carrying an `UploadRequest` must come before the `file` part. The
//!   file is parsed right away and the answer is the `MappingProposal` the
//!   operator reviews.
//!
//! - `GET /api/data_sources/csv/session/{session_id}`: current state of a
//!   session, its mapping and, once committed, its report.
//!
//! - `POST /api/data_sources/csv/mapping`: confirms (or revises) the column
//!   mapping of a session. Committing is a merge job, see `services::merge`.

use actix_web::web::{get, post, scope};
use actix_web::Scope;

mod mapping;
mod session;
mod upload;

const API_PATH: &str = "/api/data_sources/csv";

pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("/upload", post().to(upload::process))
        .route("/session/{session_id}", get().to(session::process))
        .route("/mapping", post().to(mapping::process))
}
