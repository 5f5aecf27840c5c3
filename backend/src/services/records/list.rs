use crate::error::ImportError;
use crate::services::{error_response, parse_kind};
use crate::sessions::ImportState;
use actix_web::{web, HttpResponse, Responder};

/// Lists the committed records of one kind, in insertion order.
///
/// # Arguments
/// * `kind` - The record kind path segment.
/// * `state` - Shared import state holding the record repository.
///
/// # Returns
/// `200 OK` with a JSON array of `TargetRecord`.
pub async fn process(kind: web::Path<String>, state: web::Data<ImportState>) -> impl Responder {
    let kind = match parse_kind(&kind) {
        Ok(kind) => kind,
        Err(resp) => return resp,
    };
    match state.records.list(kind) {
        Ok(records) => HttpResponse::Ok().json(records),
        Err(e) => error_response(&ImportError::Storage(e)),
    }
}
