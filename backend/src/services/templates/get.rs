use crate::error::ImportError;
use crate::services::{error_response, parse_kind};
use crate::sessions::ImportState;
use actix_web::{web, HttpResponse, Responder};

/// `GET /api/templates/{kind}/{name}`.
pub async fn process(
    path: web::Path<(String, String)>,
    state: web::Data<ImportState>,
) -> impl Responder {
    let (kind, name) = path.into_inner();
    let kind = match parse_kind(&kind) {
        Ok(kind) => kind,
        Err(resp) => return resp,
    };
    match state.templates.get_template(kind, &name) {
        Ok(Some(template)) => HttpResponse::Ok().json(template),
        Ok(None) => error_response(&ImportError::TemplateNotFound { kind, name }),
        Err(e) => error_response(&ImportError::Storage(e)),
    }
}
