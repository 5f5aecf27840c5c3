use crate::error::ImportError;
use crate::services::{error_response, parse_kind};
use crate::sessions::ImportState;
use actix_web::{web, HttpResponse, Responder};

/// `GET /api/templates/{kind}`: every saved template for one record kind.
///
/// # Arguments
/// * `kind` - The record kind path segment (`client` or `product`).
/// * `state` - Shared import state holding the template store.
///
/// # Returns
/// `200 OK` with the templates as JSON, `400` for an unknown kind.
pub async fn process(kind: web::Path<String>, state: web::Data<ImportState>) -> impl Responder {
    let kind = match parse_kind(&kind) {
        Ok(kind) => kind,
        Err(resp) => return resp,
    };
    match state.templates.list_templates(kind) {
        Ok(templates) => HttpResponse::Ok().json(templates),
        Err(e) => error_response(&ImportError::Storage(e)),
    }
}
