//! SQLite-backed storage.
//!
//! Record collections are kept the way the dashboard has always kept them: a
//! JSON array per record kind under a well-known key (`clients`, `products`)
//! in a small key-value table. Mapping templates get their own table keyed by
//! `(kind, name)`.
//!
//! A connection is opened per call; the store itself only holds the path, so
//! it can be shared freely between actix workers and blocking jobs.

use crate::error::StorageError;
use crate::storage::{RecordRepository, TemplateStore};
use common::model::record::{RecordKind, TargetRecord};
use common::model::template::{MappingTemplate, TemplateField};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS kv_store (
    key   TEXT PRIMARY KEY,
    value TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS mapping_templates (
    kind        TEXT NOT NULL,
    name        TEXT NOT NULL,
    fields_json TEXT NOT NULL,
    PRIMARY KEY (kind, name)
);
";

#[derive(Debug, Clone)]
pub struct SqliteStore {
    path: PathBuf,
}

impl SqliteStore {
    /// Opens (creating if needed) the database at `path` and ensures the schema.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let store = Self {
            path: path.as_ref().to_path_buf(),
        };
        store.connect()?.execute_batch(SCHEMA)?;
        Ok(store)
    }

    fn connect(&self) -> Result<Connection, StorageError> {
        Ok(Connection::open(&self.path)?)
    }
}

impl RecordRepository for SqliteStore {
    fn get(&self, kind: RecordKind, id: &str) -> Result<Option<TargetRecord>, StorageError> {
        Ok(self.list(kind)?.into_iter().find(|r| r.id == id))
    }

    fn put(&self, kind: RecordKind, records: &[TargetRecord]) -> Result<(), StorageError> {
        let json = serde_json::to_string(records)?;
        self.connect()?.execute(
            "INSERT OR REPLACE INTO kv_store (key, value) VALUES (?1, ?2)",
            params![kind.store_key(), json],
        )?;
        Ok(())
    }

    fn list(&self, kind: RecordKind) -> Result<Vec<TargetRecord>, StorageError> {
        let conn = self.connect()?;
        let value: Option<String> = conn
            .query_row(
                "SELECT value FROM kv_store WHERE key = ?1",
                params![kind.store_key()],
                |row| row.get(0),
            )
            .optional()?;

        match value {
            Some(json) => Ok(serde_json::from_str(&json)?),
            None => Ok(Vec::new()),
        }
    }
}

impl TemplateStore for SqliteStore {
    fn get_template(
        &self,
        kind: RecordKind,
        name: &str,
    ) -> Result<Option<MappingTemplate>, StorageError> {
        let conn = self.connect()?;
        let fields_json: Option<String> = conn
            .query_row(
                "SELECT fields_json FROM mapping_templates WHERE kind = ?1 AND name = ?2",
                params![kind.as_str(), name],
                |row| row.get(0),
            )
            .optional()?;

        match fields_json {
            Some(json) => {
                let fields: Vec<TemplateField> = serde_json::from_str(&json)?;
                Ok(Some(MappingTemplate {
                    name: name.to_string(),
                    kind,
                    fields,
                }))
            }
            None => Ok(None),
        }
    }

    fn list_templates(&self, kind: RecordKind) -> Result<Vec<MappingTemplate>, StorageError> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(
            "SELECT name, fields_json FROM mapping_templates WHERE kind = ?1 ORDER BY name",
        )?;
        let rows = stmt.query_map(params![kind.as_str()], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut templates = Vec::new();
        for row in rows {
            let (name, json) = row?;
            templates.push(MappingTemplate {
                name,
                kind,
                fields: serde_json::from_str(&json)?,
            });
        }
        Ok(templates)
    }

    fn save_template(&self, template: &MappingTemplate) -> Result<(), StorageError> {
        let json = serde_json::to_string(&template.fields)?;
        self.connect()?.execute(
            "INSERT OR REPLACE INTO mapping_templates (kind, name, fields_json) VALUES (?1, ?2, ?3)",
            params![template.kind.as_str(), &template.name, json],
        )?;
        Ok(())
    }

    fn delete_template(&self, kind: RecordKind, name: &str) -> Result<bool, StorageError> {
        let removed = self.connect()?.execute(
            "DELETE FROM mapping_templates WHERE kind = ?1 AND name = ?2",
            params![kind.as_str(), name],
        )?;
        Ok(removed > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use common::model::record::{ClientRecord, RecordBody};
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    fn store() -> (TempDir, SqliteStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteStore::open(dir.path().join("test.sqlite")).unwrap();
        (dir, store)
    }

    fn client(id: &str, name: &str) -> TargetRecord {
        TargetRecord {
            id: id.to_string(),
            owner: "owner-1".to_string(),
            created_at: Utc::now(),
            group: Some("vip".to_string()),
            provenance: None,
            body: RecordBody::Client(ClientRecord {
                name: Some(name.to_string()),
                ..Default::default()
            }),
            auxiliary: BTreeMap::from([("Origem".to_string(), "feira".to_string())]),
        }
    }

    #[test]
    fn collections_are_kept_per_kind() {
        let (_dir, store) = store();
        assert!(store.list(RecordKind::Client).unwrap().is_empty());

        let records = vec![client("a", "Ana"), client("b", "Beto")];
        store.put(RecordKind::Client, &records).unwrap();

        assert_eq!(store.list(RecordKind::Client).unwrap(), records);
        assert!(store.list(RecordKind::Product).unwrap().is_empty());
        assert_eq!(store.get(RecordKind::Client, "b").unwrap(), Some(records[1].clone()));
        assert_eq!(store.get(RecordKind::Client, "z").unwrap(), None);
    }

    #[test]
    fn templates_crud() {
        let (_dir, store) = store();
        let template = MappingTemplate {
            name: "crm".to_string(),
            kind: RecordKind::Client,
            fields: vec![TemplateField {
                field: "nome".to_string(),
                required: true,
                display_order: 1,
            }],
        };

        store.save_template(&template).unwrap();
        assert_eq!(
            store.get_template(RecordKind::Client, "crm").unwrap(),
            Some(template.clone())
        );
        assert_eq!(store.get_template(RecordKind::Product, "crm").unwrap(), None);
        assert_eq!(store.list_templates(RecordKind::Client).unwrap().len(), 1);

        assert!(store.delete_template(RecordKind::Client, "crm").unwrap());
        assert!(!store.delete_template(RecordKind::Client, "crm").unwrap());
        assert!(store.list_templates(RecordKind::Client).unwrap().is_empty());
    }
}
