pub mod data_sources;
pub mod merge;
pub mod records;
pub mod templates;

use crate::error::ImportError;
use actix_web::HttpResponse;
use common::model::record::RecordKind;
use log::error;

/// Maps an import error onto the HTTP status the operator should see.
pub(crate) fn error_response(e: &ImportError) -> HttpResponse {
    if !e.is_structural() {
        error!("{}", e);
        return HttpResponse::InternalServerError().body(format!("Error: {}", e));
    }
    match e {
        ImportError::SessionNotFound(_) | ImportError::TemplateNotFound { .. } => {
            HttpResponse::NotFound().body(format!("Error: {}", e))
        }
        ImportError::InvalidTransition { .. } | ImportError::SessionBusy(_) => {
            HttpResponse::Conflict().body(format!("Error: {}", e))
        }
        _ => HttpResponse::BadRequest().body(format!("Error: {}", e)),
    }
}

/// Parses the `{kind}` path segment, answering 400 when it names no record kind.
pub(crate) fn parse_kind(raw: &str) -> Result<RecordKind, HttpResponse> {
    raw.parse::<RecordKind>()
        .map_err(|e| HttpResponse::BadRequest().body(format!("Error: {}", e)))
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::config::Config;
    use crate::sessions::ImportState;
    use crate::storage::MemoryStore;
    use std::sync::Arc;

    pub const BOUNDARY: &str = "----importer-test-boundary";

    pub fn state_with(store: Arc<MemoryStore>, config: Config) -> ImportState {
        ImportState::new(config, store.clone(), store)
    }

    pub fn state() -> ImportState {
        state_with(Arc::new(MemoryStore::new()), Config::default())
    }

    pub fn content_type() -> String {
        format!("multipart/form-data; boundary={}", BOUNDARY)
    }

    /// Builds a multipart body with an optional `json` part followed by a `file` part.
    pub fn multipart_body(json: Option<&str>, file_name: &str, file: &[u8]) -> Vec<u8> {
        let mut body = Vec::new();
        if let Some(json) = json {
            body.extend_from_slice(
                format!(
                    "--{}\r\nContent-Disposition: form-data; name=\"json\"\r\n\
                     Content-Type: application/json\r\n\r\n{}\r\n",
                    BOUNDARY, json
                )
                .as_bytes(),
            );
        }
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\n\
                 Content-Type: text/csv\r\n\r\n",
                BOUNDARY, file_name
            )
            .as_bytes(),
        );
        body.extend_from_slice(file);
        body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());
        body
    }
}
