//! Operator confirmation of a proposed mapping.
//!
//! The body lists one `ColumnTarget` per header, in header order. A refused
//! mapping leaves the session untouched, so the operator can fix it and send
//! it again; a confirmed one may also be revised until the session is committed.

use crate::error::ImportError;
use crate::services::error_response;
use crate::sessions::{try_lock, ImportState};
use actix_web::{web, HttpResponse, Responder};
use common::model::mapping::ColumnMapping;
use common::requests::ConfirmMappingRequest;
use log::info;

pub(crate) async fn process(
    state: web::Data<ImportState>,
    payload: web::Json<ConfirmMappingRequest>,
) -> impl Responder {
    match confirm_mapping(&state, payload.into_inner()).await {
        Ok(mapping) => HttpResponse::Ok().json(mapping),
        Err(e) => error_response(&e),
    }
}

async fn confirm_mapping(
    state: &ImportState,
    req: ConfirmMappingRequest,
) -> Result<ColumnMapping, ImportError> {
    let session = state.session(&req.session_id).await?;
    let mut session = try_lock(&req.session_id, &session)?;
    let mapping = session
        .confirm(req.targets, state.config.strict_mapping)?
        .clone();
    info!(
        "Session {}: mapping confirmed ({} columns)",
        req.session_id,
        mapping.columns.len()
    );
    Ok(mapping)
}
