use crate::error::ImportError;
use crate::import::ImportSession;
use crate::services::error_response;
use crate::sessions::ImportState;
use actix_multipart::{Field, Multipart};
use actix_web::{web, HttpResponse, Responder};
use common::model::datasource::MappingProposal;
use common::model::template::MappingTemplate;
use common::requests::UploadRequest;
use futures_util::StreamExt;
use log::info;
use serde_json::from_slice;

const ALLOWED_EXTENSIONS: [&str; 2] = [".csv", ".txt"];

/// HTTP handler wrapper that converts the upload result into an `HttpResponse`.
///
/// - On success: `200 OK` with the `MappingProposal` as JSON.
/// - On failure: the status chosen by `error_response`, message in the body.
pub async fn process(state: web::Data<ImportState>, payload: Multipart) -> impl Responder {
    match upload_csv(&state, payload).await {
        Ok(proposal) => HttpResponse::Ok().json(proposal),
        Err(e) => error_response(&e),
    }
}

/// Reads the `json` and `file` parts, then opens a session and runs it up to a proposed mapping.
///
/// Only a session that reached a proposal is stored; a file that fails to
/// parse leaves nothing behind and the error is the whole answer.
async fn upload_csv(
    state: &ImportState,
    mut payload: Multipart,
) -> Result<MappingProposal, ImportError> {
    let limit = state.config.upload_limit_bytes;
    let mut request: Option<UploadRequest> = None;
    let mut template: Option<MappingTemplate> = None;
    let mut file: Option<(String, Vec<u8>)> = None;

    while let Some(item) = payload.next().await {
        let mut field = item.map_err(|e| ImportError::Upload(e.to_string()))?;
        let part_name = field
            .content_disposition()
            .and_then(|cd| cd.get_name().map(|n| n.to_string()));

        match part_name.as_deref() {
            Some("json") => {
                let bytes = read_part(&mut field, limit).await?;
                let req: UploadRequest = from_slice(&bytes)
                    .map_err(|e| ImportError::Upload(format!("Bad upload request: {}", e)))?;
                if let Some(name) = &req.template_name {
                    let found = state.templates.get_template(req.kind, name)?;
                    template = Some(found.ok_or_else(|| ImportError::TemplateNotFound {
                        kind: req.kind,
                        name: name.clone(),
                    })?);
                }
                request = Some(req);
            }

            Some("file") => {
                if request.is_none() {
                    return Err(ImportError::Upload(
                        "The json part must be sent before the file".to_string(),
                    ));
                }
                let filename = field
                    .content_disposition()
                    .and_then(|cd| cd.get_filename().map(|f| f.to_string()))
                    .unwrap_or_default();
                let lowered = filename.to_lowercase();
                if !ALLOWED_EXTENSIONS.iter().any(|ext| lowered.ends_with(ext)) {
                    return Err(ImportError::Upload(
                        "The file must end with .csv or .txt".to_string(),
                    ));
                }
                let bytes = read_part(&mut field, limit).await?;
                file = Some((filename, bytes));
            }

            _ => {}
        }
    }

    let request =
        request.ok_or_else(|| ImportError::Upload("Missing json part".to_string()))?;
    let (file_name, bytes) =
        file.ok_or_else(|| ImportError::Upload("Missing file".to_string()))?;

    let mut session = ImportSession::new(request.kind, request.owner);
    info!(
        "Session {}: received '{}' ({} bytes) for {} records",
        session.id(),
        file_name,
        bytes.len(),
        request.kind
    );
    let proposal = prepare(&mut session, &file_name, &bytes, template, state.config.preview_rows)?;
    state.insert(session).await;
    Ok(proposal)
}

fn prepare(
    session: &mut ImportSession,
    file_name: &str,
    bytes: &[u8],
    template: Option<MappingTemplate>,
    preview_rows: usize,
) -> Result<MappingProposal, ImportError> {
    session.load(file_name, bytes)?;
    session.parse()?;
    session.propose(template)?;
    session
        .proposal(preview_rows)
        .ok_or(ImportError::InvalidTransition {
            action: "preview the mapping",
            state: session.state().name(),
        })
}

async fn read_part(field: &mut Field, limit: usize) -> Result<Vec<u8>, ImportError> {
    let mut bytes = Vec::new();
    while let Some(chunk) = field.next().await {
        let chunk = chunk.map_err(|e| ImportError::Upload(e.to_string()))?;
        if bytes.len() + chunk.len() > limit {
            return Err(ImportError::Upload(format!(
                "The upload exceeds the limit of {} bytes",
                limit
            )));
        }
        bytes.extend_from_slice(&chunk);
    }
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use crate::config::Config;
    use crate::services::data_sources::csv::configure_routes;
    use crate::services::test_support::{content_type, multipart_body, state, state_with};
    use crate::storage::{MemoryStore, TemplateStore};
    use actix_web::http::{header, StatusCode};
    use actix_web::{test, web, App};
    use common::model::csv::Delimiter;
    use common::model::datasource::{MappingProposal, SessionState};
    use common::model::mapping::{ColumnTarget, MappingSource};
    use common::model::record::{RecordKind, TargetField};
    use common::model::template::{MappingTemplate, TemplateField};
    use std::sync::Arc;

    const CLIENT_JSON: &str = r#"{"kind":"client","owner":"owner-1"}"#;

    fn upload(json: Option<&str>, file_name: &str, file: &[u8]) -> test::TestRequest {
        test::TestRequest::post()
            .uri("/api/data_sources/csv/upload")
            .insert_header((header::CONTENT_TYPE, content_type()))
            .set_payload(multipart_body(json, file_name, file))
    }

    #[actix_web::test]
    async fn upload_returns_a_heuristic_proposal() {
        let state = state();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state.clone()))
                .service(configure_routes()),
        )
        .await;

        let req = upload(
            Some(CLIENT_JSON),
            "clientes.csv",
            b"Nome;E-mail;Telefone\nAna;ana@x.com;\nBeto;;119999",
        )
        .to_request();
        let proposal: MappingProposal = test::call_and_read_body_json(&app, req).await;

        assert_eq!(proposal.delimiter, Delimiter::Semicolon);
        assert_eq!(proposal.rows_read, 2);
        assert_eq!(proposal.mapping.source, MappingSource::Heuristic);
        assert_eq!(
            proposal.mapping.target_of("E-mail"),
            Some(&ColumnTarget::Field(TargetField::Email))
        );
        let session = state.session(&proposal.session_id).await.unwrap();
        let guard = session.lock().unwrap();
        assert_eq!(guard.state(), &SessionState::MappingProposed);
    }

    #[actix_web::test]
    async fn upload_uses_the_named_template() {
        let store = Arc::new(MemoryStore::new());
        store
            .save_template(&MappingTemplate {
                name: "crm".to_string(),
                kind: RecordKind::Client,
                fields: vec![TemplateField {
                    field: "nome".to_string(),
                    required: true,
                    display_order: 0,
                }],
            })
            .unwrap();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state_with(store, Config::default())))
                .service(configure_routes()),
        )
        .await;

        let req = upload(
            Some(r#"{"kind":"client","owner":"owner-1","template_name":"crm"}"#),
            "clientes.csv",
            b"Nome Completo,Email\nAna,a@x.com",
        )
        .to_request();
        let proposal: MappingProposal = test::call_and_read_body_json(&app, req).await;
        assert_eq!(
            proposal.mapping.source,
            MappingSource::Template {
                name: "crm".to_string()
            }
        );
    }

    #[actix_web::test]
    async fn upload_rejections() {
        let state = state_with(
            Arc::new(MemoryStore::new()),
            Config {
                upload_limit_bytes: 64,
                ..Config::default()
            },
        );
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state.clone()))
                .service(configure_routes()),
        )
        .await;

        // File before json.
        let resp = test::call_service(&app, upload(None, "a.csv", b"name\nAna").to_request()).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let resp = test::call_service(
            &app,
            upload(Some(CLIENT_JSON), "a.xlsx", b"name\nAna").to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let resp = test::call_service(
            &app,
            upload(Some(CLIENT_JSON), "big.csv", &[b'x'; 100]).to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let resp = test::call_service(
            &app,
            upload(
                Some(r#"{"kind":"client","owner":"o","template_name":"nope"}"#),
                "a.csv",
                b"name\nAna",
            )
            .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let resp = test::call_service(
            &app,
            upload(Some(CLIENT_JSON), "header.csv", b"name,email\n").to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body = test::read_body(resp).await;
        assert!(String::from_utf8_lossy(&body).contains("no data rows"));

        // None of the refused uploads left a session behind.
        assert_eq!(state.count().await, 0);
    }
}
