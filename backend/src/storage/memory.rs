use crate::error::StorageError;
use crate::storage::{RecordRepository, TemplateStore};
use common::model::record::{RecordKind, TargetRecord};
use common::model::template::MappingTemplate;
use std::collections::HashMap;
use std::sync::RwLock;

/// Process-local store, used by tests.
#[derive(Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<RecordKind, Vec<TargetRecord>>>,
    templates: RwLock<HashMap<(RecordKind, String), MappingTemplate>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RecordRepository for MemoryStore {
    fn get(&self, kind: RecordKind, id: &str) -> Result<Option<TargetRecord>, StorageError> {
        let records = self.records.read().map_err(|_| StorageError::Poisoned)?;
        Ok(records
            .get(&kind)
            .and_then(|list| list.iter().find(|r| r.id == id))
            .cloned())
    }

    fn put(&self, kind: RecordKind, records: &[TargetRecord]) -> Result<(), StorageError> {
        self.records
            .write()
            .map_err(|_| StorageError::Poisoned)?
            .insert(kind, records.to_vec());
        Ok(())
    }

    fn list(&self, kind: RecordKind) -> Result<Vec<TargetRecord>, StorageError> {
        let records = self.records.read().map_err(|_| StorageError::Poisoned)?;
        Ok(records.get(&kind).cloned().unwrap_or_default())
    }
}

impl TemplateStore for MemoryStore {
    fn get_template(
        &self,
        kind: RecordKind,
        name: &str,
    ) -> Result<Option<MappingTemplate>, StorageError> {
        let templates = self.templates.read().map_err(|_| StorageError::Poisoned)?;
        Ok(templates.get(&(kind, name.to_string())).cloned())
    }

    fn list_templates(&self, kind: RecordKind) -> Result<Vec<MappingTemplate>, StorageError> {
        let templates = self.templates.read().map_err(|_| StorageError::Poisoned)?;
        let mut list: Vec<MappingTemplate> = templates
            .values()
            .filter(|t| t.kind == kind)
            .cloned()
            .collect();
        list.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(list)
    }

    fn save_template(&self, template: &MappingTemplate) -> Result<(), StorageError> {
        self.templates
            .write()
            .map_err(|_| StorageError::Poisoned)?
            .insert((template.kind, template.name.clone()), template.clone());
        Ok(())
    }

    fn delete_template(&self, kind: RecordKind, name: &str) -> Result<bool, StorageError> {
        Ok(self
            .templates
            .write()
            .map_err(|_| StorageError::Poisoned)?
            .remove(&(kind, name.to_string()))
            .is_some())
    }
}
