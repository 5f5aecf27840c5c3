//! Sample CSV for a mapping template.
//!
//! The file holds only a header row, one column per template field in
//! display order. Filled in and uploaded with the same template, every
//! column is matched by the template.

use crate::error::ImportError;
use crate::services::{error_response, parse_kind};
use crate::sessions::ImportState;
use actix_web::http::header;
use actix_web::{web, HttpResponse, Responder};
use common::model::template::MappingTemplate;

pub async fn process(
    path: web::Path<(String, String)>,
    state: web::Data<ImportState>,
) -> impl Responder {
    let (kind, name) = path.into_inner();
    let kind = match parse_kind(&kind) {
        Ok(kind) => kind,
        Err(resp) => return resp,
    };
    let template = match state.templates.get_template(kind, &name) {
        Ok(Some(template)) => template,
        Ok(None) => return error_response(&ImportError::TemplateNotFound { kind, name }),
        Err(e) => return error_response(&ImportError::Storage(e)),
    };

    match sample_csv(&template) {
        Ok(bytes) => HttpResponse::Ok()
            .content_type("text/csv; charset=utf-8")
            .insert_header((
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}-{}.csv\"", kind, template.name),
            ))
            .body(bytes),
        Err(e) => HttpResponse::InternalServerError().body(format!("Error: {}", e)),
    }
}

fn sample_csv(template: &MappingTemplate) -> Result<Vec<u8>, csv::Error> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(template.ordered_fields().iter().map(|f| f.field.trim()))?;
    writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))
}
