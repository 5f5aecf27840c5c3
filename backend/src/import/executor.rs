use crate::error::ImportError;
use crate::import::builder::RowOutcome;
use crate::storage::RecordRepository;
use chrono::{DateTime, Utc};
use common::model::mapping::MappingSource;
use common::model::merge::{ImportReport, SkippedRow};
use common::model::record::{Provenance, RecordKind, TargetRecord};
use log::{info, warn};
use uuid::Uuid;

/// Session-wide facts stamped onto every imported record.
#[derive(Debug, Clone)]
pub struct ExecutionContext {
    pub session_id: String,
    pub kind: RecordKind,
    pub owner: String,
    pub group: Option<String>,
    pub file_name: String,
    pub file_md5: String,
    pub mapping_source: MappingSource,
}

/// Stamps identity onto built records and merges them into the destination collection.
///
/// Failed rows are counted and listed, never fatal. The collection is written
/// once, after every row has been processed, so a storage failure leaves it as
/// it was.
pub fn execute(
    outcomes: Vec<RowOutcome>,
    ctx: &ExecutionContext,
    repository: &dyn RecordRepository,
    now: DateTime<Utc>,
) -> Result<ImportReport, ImportError> {
    let rows_read = outcomes.len();
    let mut accepted = Vec::new();
    let mut skipped_rows = Vec::new();

    for outcome in outcomes {
        match outcome.result {
            Ok(built) => accepted.push(TargetRecord {
                id: Uuid::new_v4().to_string(),
                owner: ctx.owner.clone(),
                created_at: now,
                group: ctx.group.clone(),
                provenance: Some(Provenance {
                    session_id: ctx.session_id.clone(),
                    file_name: ctx.file_name.clone(),
                    file_md5: ctx.file_md5.clone(),
                    line: outcome.line,
                    mapping_source: ctx.mapping_source.clone(),
                }),
                body: built.body,
                auxiliary: built.auxiliary,
            }),
            Err(failure) => {
                warn!(
                    "Session {}: skipping line {}: {}",
                    ctx.session_id, outcome.line, failure
                );
                skipped_rows.push(SkippedRow {
                    row_index: outcome.index,
                    line: outcome.line,
                    reason: failure.to_string(),
                });
            }
        }
    }

    let imported_ids: Vec<String> = accepted.iter().map(|r| r.id.clone()).collect();
    if !accepted.is_empty() {
        let mut collection = repository.list(ctx.kind)?;
        collection.extend(accepted);
        repository.put(ctx.kind, &collection)?;
    }

    let report = ImportReport {
        session_id: ctx.session_id.clone(),
        kind: ctx.kind,
        rows_read,
        imported: imported_ids.len(),
        skipped: skipped_rows.len(),
        skipped_rows,
        mapping_source: ctx.mapping_source.clone(),
        imported_ids,
    };
    info!("Session {}: {}", ctx.session_id, report.summary());
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RowBuildFailure;
    use crate::import::builder::BuiltRecord;
    use crate::storage::MemoryStore;
    use common::model::record::{ClientRecord, RecordBody};
    use std::collections::BTreeMap;

    fn ctx() -> ExecutionContext {
        ExecutionContext {
            session_id: "s1".to_string(),
            kind: RecordKind::Client,
            owner: "owner-1".to_string(),
            group: Some("group-7".to_string()),
            file_name: "clientes.csv".to_string(),
            file_md5: "abc".to_string(),
            mapping_source: MappingSource::Heuristic,
        }
    }

    fn built(name: &str) -> Result<BuiltRecord, RowBuildFailure> {
        Ok(BuiltRecord {
            body: RecordBody::Client(ClientRecord {
                name: Some(name.to_string()),
                ..Default::default()
            }),
            auxiliary: BTreeMap::new(),
        })
    }

    fn outcome(index: usize, result: Result<BuiltRecord, RowBuildFailure>) -> RowOutcome {
        RowOutcome {
            index,
            line: index + 2,
            result,
        }
    }

    #[test]
    fn stamps_records_and_counts_skips() {
        let store = MemoryStore::new();
        let now = Utc::now();
        let outcomes = vec![
            outcome(0, built("Ana")),
            outcome(1, Err(RowBuildFailure::MissingIdentifier)),
            outcome(2, built("Beto")),
        ];

        let report = execute(outcomes, &ctx(), &store, now).unwrap();
        assert_eq!((report.rows_read, report.imported, report.skipped), (3, 2, 1));
        assert_eq!(report.skipped_rows[0].row_index, 1);
        assert_eq!(report.skipped_rows[0].line, 3);

        let records = store.list(RecordKind::Client).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(report.imported_ids, vec![records[0].id.clone(), records[1].id.clone()]);
        assert_ne!(records[0].id, records[1].id);
        for record in &records {
            assert_eq!(record.owner, "owner-1");
            assert_eq!(record.group.as_deref(), Some("group-7"));
            assert_eq!(record.created_at, now);
        }
        assert_eq!(records[1].provenance.as_ref().map(|p| p.line), Some(4));
    }

    #[test]
    fn appends_after_existing_records_in_row_order() {
        let store = MemoryStore::new();
        execute(vec![outcome(0, built("Antiga"))], &ctx(), &store, Utc::now()).unwrap();
        execute(
            vec![outcome(0, built("Nova 1")), outcome(1, built("Nova 2"))],
            &ctx(),
            &store,
            Utc::now(),
        )
        .unwrap();

        let names: Vec<Option<String>> = store
            .list(RecordKind::Client)
            .unwrap()
            .iter()
            .map(|r| match &r.body {
                RecordBody::Client(c) => c.name.clone(),
                RecordBody::Product(p) => p.name.clone(),
            })
            .collect();
        assert_eq!(
            names,
            vec![
                Some("Antiga".to_string()),
                Some("Nova 1".to_string()),
                Some("Nova 2".to_string())
            ]
        );
    }

    #[test]
    fn nothing_written_when_every_row_is_skipped() {
        let store = MemoryStore::new();
        let report = execute(
            vec![outcome(0, Err(RowBuildFailure::MissingIdentifier))],
            &ctx(),
            &store,
            Utc::now(),
        )
        .unwrap();
        assert_eq!(report.imported, 0);
        assert_eq!(report.skipped, 1);
        assert!(store.list(RecordKind::Client).unwrap().is_empty());
    }
}
