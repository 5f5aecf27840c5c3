//! CSV export of a record collection.
//!
//! Columns: `id`, `owner`, `created_at`, `group`, then every canonical field
//! of the kind, then the union of auxiliary keys in sorted order. Cells a
//! record has no value for are left empty.
//!
//! Header names stay unique: an auxiliary key that repeats a fixed or
//! canonical column is written as `aux_<key>`, with a numeric suffix if
//! that name is taken as well.

use crate::error::ImportError;
use crate::services::{error_response, parse_kind};
use crate::sessions::ImportState;
use actix_web::http::header;
use actix_web::{web, HttpResponse, Responder};
use common::model::record::{RecordKind, TargetField, TargetRecord};
use std::collections::{BTreeSet, HashSet};

const FIXED_COLUMNS: [&str; 4] = ["id", "owner", "created_at", "group"];

pub async fn process(kind: web::Path<String>, state: web::Data<ImportState>) -> impl Responder {
    let kind = match parse_kind(&kind) {
        Ok(kind) => kind,
        Err(resp) => return resp,
    };
    let records = match state.records.list(kind) {
        Ok(records) => records,
        Err(e) => return error_response(&ImportError::Storage(e)),
    };

    match export_csv(kind, &records) {
        Ok(bytes) => HttpResponse::Ok()
            .content_type("text/csv; charset=utf-8")
            .insert_header((
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}.csv\"", kind.store_key()),
            ))
            .body(bytes),
        Err(e) => HttpResponse::InternalServerError().body(format!("Error: {}", e)),
    }
}

pub(crate) fn export_csv(kind: RecordKind, records: &[TargetRecord]) -> Result<Vec<u8>, csv::Error> {
    let fields = TargetField::for_kind(kind);
    let auxiliary_keys: BTreeSet<&str> = records
        .iter()
        .flat_map(|r| r.auxiliary.keys().map(String::as_str))
        .collect();

    let reserved: Vec<&str> = FIXED_COLUMNS
        .iter()
        .copied()
        .chain(fields.iter().map(|f| f.as_str()))
        .collect();
    let auxiliary_headers = auxiliary_headers(&reserved, &auxiliary_keys);

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(
        reserved
            .iter()
            .copied()
            .chain(auxiliary_headers.iter().map(String::as_str)),
    )?;

    for record in records {
        let mut row = vec![
            record.id.clone(),
            record.owner.clone(),
            record.created_at.to_rfc3339(),
            record.group.clone().unwrap_or_default(),
        ];
        row.extend(fields.iter().map(|f| record.body.value(*f).unwrap_or_default()));
        row.extend(
            auxiliary_keys
                .iter()
                .map(|k| record.auxiliary.get(*k).cloned().unwrap_or_default()),
        );
        writer.write_record(&row)?;
    }

    writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))
}

/// Header for each auxiliary key, in key order, never repeating a reserved
/// column or another auxiliary header.
fn auxiliary_headers(reserved: &[&str], keys: &BTreeSet<&str>) -> Vec<String> {
    let mut taken: HashSet<String> = reserved
        .iter()
        .chain(keys.iter().filter(|k| !reserved.contains(k)))
        .map(|name| name.to_string())
        .collect();

    keys.iter()
        .map(|key| {
            if !reserved.contains(key) {
                return key.to_string();
            }
            let base = format!("aux_{}", key);
            let mut header = base.clone();
            let mut n = 2;
            while taken.contains(&header) {
                header = format!("{}_{}", base, n);
                n += 1;
            }
            taken.insert(header.clone());
            header
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::records::configure_routes;
    use crate::services::test_support::state_with;
    use crate::storage::{MemoryStore, RecordRepository};
    use actix_web::http::StatusCode;
    use actix_web::{test, web, App};
    use chrono::{TimeZone, Utc};
    use common::model::record::{ProductRecord, RecordBody};
    use std::collections::BTreeMap;
    use std::sync::Arc;

    fn product(id: &str, name: &str, auxiliary: &[(&str, &str)]) -> TargetRecord {
        TargetRecord {
            id: id.to_string(),
            owner: "owner-1".to_string(),
            created_at: Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap(),
            group: None,
            provenance: None,
            body: RecordBody::Product(ProductRecord {
                name: Some(name.to_string()),
                price: Some(12.5),
                ..Default::default()
            }),
            auxiliary: auxiliary
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<BTreeMap<_, _>>(),
        }
    }

    #[::core::prelude::v1::test]
    fn export_has_fixed_canonical_and_auxiliary_columns() {
        let records = vec![
            product("p1", "Lamp", &[("voltagem", "220")]),
            product("p2", "Desk, oak", &[("cor", "brown")]),
        ];
        let bytes = export_csv(RecordKind::Product, &records).unwrap();
        let mut reader = csv::Reader::from_reader(bytes.as_slice());

        let headers = reader.headers().unwrap().clone();
        assert_eq!(&headers[0], "id");
        assert_eq!(&headers[4], "name");
        assert_eq!(headers.len(), 4 + TargetField::for_kind(RecordKind::Product).len() + 2);
        assert_eq!(&headers[headers.len() - 2], "cor");
        assert_eq!(&headers[headers.len() - 1], "voltagem");

        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(&rows[1][4], "Desk, oak");
        assert_eq!(&rows[0][headers.len() - 1], "220");
        assert_eq!(&rows[0][headers.len() - 2], "");
    }

    #[::core::prelude::v1::test]
    fn auxiliary_keys_never_repeat_a_column_name() {
        let records = vec![
            product("p1", "Lamp", &[("id", "L-01"), ("name", "Luminária")]),
            product("p2", "Desk", &[("aux_id", "x"), ("cor", "oak")]),
        ];
        let bytes = export_csv(RecordKind::Product, &records).unwrap();
        let mut reader = csv::Reader::from_reader(bytes.as_slice());
        let headers: Vec<String> = reader.headers().unwrap().iter().map(String::from).collect();

        let unique: HashSet<&String> = headers.iter().collect();
        assert_eq!(unique.len(), headers.len());
        let at = |name: &str| headers.iter().position(|h| h == name).unwrap();

        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(&rows[0][at("id")], "p1");
        assert_eq!(&rows[0][at("name")], "Lamp");
        assert_eq!(&rows[0][at("aux_name")], "Luminária");
        // `aux_id` belongs to the second record, so the first record's `id` key moves on.
        assert_eq!(&rows[0][at("aux_id_2")], "L-01");
        assert_eq!(&rows[1][at("aux_id")], "x");
        assert_eq!(&rows[1][at("cor")], "oak");
    }

    #[actix_web::test]
    async fn records_routes() {
        let store = Arc::new(MemoryStore::new());
        store
            .put(RecordKind::Product, &[product("p1", "Lamp", &[])])
            .unwrap();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state_with(store, Default::default())))
                .service(configure_routes()),
        )
        .await;

        let req = test::TestRequest::get().uri("/api/records/products").to_request();
        let listed: Vec<TargetRecord> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(listed.len(), 1);

        let req = test::TestRequest::get().uri("/api/records/product/p1").to_request();
        let record: TargetRecord = test::call_and_read_body_json(&app, req).await;
        assert_eq!(record.id, "p1");

        let req = test::TestRequest::get().uri("/api/records/product/p9").to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

        let req = test::TestRequest::get().uri("/api/records/product/export").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body = test::read_body(resp).await;
        assert!(String::from_utf8_lossy(&body).contains("p1,owner-1,2026-03-01T12:00:00+00:00"));
    }
}
