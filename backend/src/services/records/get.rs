use crate::error::ImportError;
use crate::services::{error_response, parse_kind};
use crate::sessions::ImportState;
use actix_web::{web, HttpResponse, Responder};

/// `GET /api/records/{kind}/{id}`
///
/// # Arguments
/// * `path` - The `(kind, id)` path segments.
///
/// # Returns
/// The stored record as JSON, or `404 Not Found`.
pub async fn process(
    path: web::Path<(String, String)>,
    state: web::Data<ImportState>,
) -> impl Responder {
    let (kind, id) = path.into_inner();
    let kind = match parse_kind(&kind) {
        Ok(kind) => kind,
        Err(resp) => return resp,
    };
    match state.records.get(kind, &id) {
        Ok(Some(record)) => HttpResponse::Ok().json(record),
        Ok(None) => HttpResponse::NotFound().body("Record not found"),
        Err(e) => error_response(&ImportError::Storage(e)),
    }
}
