use crate::services::error_response;
use crate::sessions::{try_lock, ImportState};
use actix_web::{web, HttpResponse, Responder};

/// `GET /api/data_sources/csv/session/{session_id}`: the session's `SessionSummary`.
///
/// Answers 409 while a merge job holds the session instead of waiting for it.
pub(crate) async fn process(
    session_id: web::Path<String>,
    state: web::Data<ImportState>,
) -> impl Responder {
    let summary = match state.session(&session_id).await {
        Ok(session) => try_lock(&session_id, &session).map(|s| s.summary()),
        Err(e) => Err(e),
    };
    match summary {
        Ok(summary) => HttpResponse::Ok().json(summary),
        Err(e) => error_response(&e),
    }
}
