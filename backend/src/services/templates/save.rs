use crate::error::ImportError;
use crate::services::error_response;
use crate::sessions::ImportState;
use actix_web::{web, HttpResponse, Responder};
use common::model::template::MappingTemplate;
use log::info;
use std::collections::HashSet;

/// Saves a mapping template, replacing any template with the same kind and name.
///
/// The template is validated first (see `validate_template`), so a refused
/// template never reaches storage.
///
/// # Arguments
/// * `state` - Shared import state holding the template store.
/// * `payload` - The template to store.
///
/// # Returns
/// `200 OK` echoing the stored template, or `400 Bad Request` with the reason it was refused.
pub async fn process(
    state: web::Data<ImportState>,
    payload: web::Json<MappingTemplate>,
) -> impl Responder {
    if let Err(reason) = validate_template(&payload) {
        return HttpResponse::BadRequest().body(format!("Error: {}", reason));
    }
    match state.templates.save_template(&payload) {
        Ok(()) => {
            info!("Template '{}' saved for {} records", payload.name, payload.kind);
            HttpResponse::Ok().json(payload.into_inner())
        }
        Err(e) => error_response(&ImportError::Storage(e)),
    }
}

/// A template needs a name and at least one field; field names must be
/// non-empty and unique once trimmed and lowercased, since matching ignores case.
fn validate_template(template: &MappingTemplate) -> Result<(), String> {
    if template.name.trim().is_empty() {
        return Err("The template name must not be empty".to_string());
    }
    if template.fields.is_empty() {
        return Err("The template must declare at least one field".to_string());
    }
    let mut seen = HashSet::new();
    for field in &template.fields {
        let key = field.field.trim().to_lowercase();
        if key.is_empty() {
            return Err("Template field names must not be empty".to_string());
        }
        if !seen.insert(key) {
            return Err(format!("Template field '{}' is declared twice", field.field.trim()));
        }
    }
    Ok(())
}
