use crate::error::ImportError;
use crate::services::{error_response, parse_kind};
use crate::sessions::ImportState;
use actix_web::{web, HttpResponse, Responder};
use log::info;

/// Deletes a template by kind and name.
///
/// # Arguments
/// * `path` - The `(kind, name)` path segments.
/// * `state` - Shared import state holding the template store.
///
/// # Returns
/// `200 OK` once removed; `404 Not Found` when no template had that name.
pub async fn process(
    path: web::Path<(String, String)>,
    state: web::Data<ImportState>,
) -> impl Responder {
    let (kind, name) = path.into_inner();
    let kind = match parse_kind(&kind) {
        Ok(kind) => kind,
        Err(resp) => return resp,
    };
    match state.templates.delete_template(kind, &name) {
        Ok(true) => {
            info!("Template '{}' deleted for {} records", name, kind);
            HttpResponse::Ok().finish()
        }
        Ok(false) => error_response(&ImportError::TemplateNotFound { kind, name }),
        Err(e) => error_response(&ImportError::Storage(e)),
    }
}
