use crate::error::ImportError;
use crate::import::builder::build_records;
use crate::import::executor::{execute, ExecutionContext};
use crate::import::headers::{parse_table, ParsedTable, RawTable};
use crate::import::mapper::{find_conflicts, propose_mapping, resolve_template_field};
use crate::storage::RecordRepository;
use chrono::Utc;
use common::model::datasource::{MappingProposal, SessionState, SessionSummary};
use common::model::mapping::{AssignmentOrigin, ColumnMapping, ColumnTarget};
use common::model::merge::ImportReport;
use common::model::record::RecordKind;
use common::model::template::MappingTemplate;
use log::info;
use uuid::Uuid;

/// The uploaded file as received.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub name: String,
    pub md5: String,
    pub text: String,
}

#[derive(Debug, Clone)]
pub struct CommitOptions {
    pub group: Option<String>,
    pub parallel_threshold: usize,
}

/// One import, from upload to commit.
#[derive(Debug)]
pub struct ImportSession {
    id: String,
    kind: RecordKind,
    owner: String,
    state: SessionState,
    file: Option<SourceFile>,
    table: Option<ParsedTable>,
    template: Option<MappingTemplate>,
    mapping: Option<ColumnMapping>,
    report: Option<ImportReport>,
}

impl ImportSession {
    pub fn new(kind: RecordKind, owner: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            kind,
            owner: owner.into(),
            state: SessionState::Idle,
            file: None,
            table: None,
            template: None,
            mapping: None,
            report: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> RecordKind {
        self.kind
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn mapping(&self) -> Option<&ColumnMapping> {
        self.mapping.as_ref()
    }

    fn require(&self, action: &'static str, allowed: &[SessionState]) -> Result<(), ImportError> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(ImportError::InvalidTransition {
                action,
                state: self.state.name(),
            })
        }
    }

    /// Idle → FileLoaded.
    pub fn load(&mut self, name: &str, bytes: &[u8]) -> Result<(), ImportError> {
        self.require("load a file", &[SessionState::Idle])?;
        let text = std::str::from_utf8(bytes).map_err(|_| ImportError::InvalidEncoding)?;
        self.file = Some(SourceFile {
            name: name.to_string(),
            md5: format!("{:x}", md5::compute(bytes)),
            text: text.to_string(),
        });
        self.state = SessionState::FileLoaded;
        Ok(())
    }

    /// FileLoaded → Parsed, or Failed when the file has no usable structure.
    pub fn parse(&mut self) -> Result<&ParsedTable, ImportError> {
        self.require("parse", &[SessionState::FileLoaded])?;
        let raw = RawTable::from_text(self.file.as_ref().map_or("", |f| f.text.as_str()));

        match parse_table(&raw) {
            Ok(table) => {
                info!(
                    "Session {}: {} columns, {} data rows",
                    self.id,
                    table.headers.len(),
                    table.rows.len()
                );
                self.state = SessionState::Parsed;
                // The raw text is no longer needed once rows are aligned.
                if let Some(file) = self.file.as_mut() {
                    file.text.clear();
                }
                Ok(self.table.insert(table))
            }
            Err(e) => {
                self.state = SessionState::Failed(e.to_string());
                Err(e)
            }
        }
    }

    /// Parsed → MappingProposed.
    pub fn propose(
        &mut self,
        template: Option<MappingTemplate>,
    ) -> Result<&ColumnMapping, ImportError> {
        self.require("propose a mapping", &[SessionState::Parsed])?;
        let headers = self.table.as_ref().map(|t| t.headers.as_slice()).unwrap_or(&[]);
        let mapping = propose_mapping(self.kind, headers, template.as_ref());
        self.template = template;
        self.state = SessionState::MappingProposed;
        Ok(self.mapping.insert(mapping))
    }

    /// MappingProposed (or an already confirmed mapping being revised) → MappingConfirmed.
    ///
    /// `targets` holds one entry per header, in header order. Nothing changes
    /// when the mapping is refused.
    pub fn confirm(
        &mut self,
        targets: Vec<ColumnTarget>,
        strict: bool,
    ) -> Result<&ColumnMapping, ImportError> {
        self.require(
            "confirm a mapping",
            &[SessionState::MappingProposed, SessionState::MappingConfirmed],
        )?;
        let proposed = self
            .mapping
            .as_ref()
            .ok_or(ImportError::InvalidTransition {
                action: "confirm a mapping",
                state: self.state.name(),
            })?;

        if targets.len() != proposed.columns.len() {
            return Err(ImportError::MappingShapeMismatch {
                expected: proposed.columns.len(),
                got: targets.len(),
            });
        }

        let mut confirmed = proposed.clone();
        for (column, target) in confirmed.columns.iter_mut().zip(targets) {
            if let ColumnTarget::Field(field) = target {
                if !field.belongs_to(self.kind) {
                    return Err(ImportError::FieldNotInSchema {
                        field,
                        kind: self.kind,
                    });
                }
            }
            if column.target != target {
                column.target = target;
                column.origin = AssignmentOrigin::Operator;
            }
        }

        if confirmed.is_all_ignored() {
            return Err(ImportError::NoFieldsMapped);
        }
        if let Some(template) = &self.template {
            check_required_fields(template, &confirmed)?;
        }
        if strict {
            if let Some(conflict) = find_conflicts(&confirmed).into_iter().next() {
                return Err(ImportError::DuplicateTarget {
                    field: conflict.field,
                    headers: conflict.headers,
                });
            }
        }

        self.state = SessionState::MappingConfirmed;
        Ok(self.mapping.insert(confirmed))
    }

    /// MappingConfirmed → Committed. The only step that writes anything.
    pub fn commit(
        &mut self,
        repository: &dyn RecordRepository,
        options: &CommitOptions,
    ) -> Result<&ImportReport, ImportError> {
        self.require("commit", &[SessionState::MappingConfirmed])?;
        let (Some(table), Some(mapping), Some(file)) = (&self.table, &self.mapping, &self.file)
        else {
            return Err(ImportError::InvalidTransition {
                action: "commit",
                state: self.state.name(),
            });
        };

        let outcomes = build_records(&table.rows, mapping, options.parallel_threshold);
        let ctx = ExecutionContext {
            session_id: self.id.clone(),
            kind: self.kind,
            owner: self.owner.clone(),
            group: options.group.clone(),
            file_name: file.name.clone(),
            file_md5: file.md5.clone(),
            mapping_source: mapping.source.clone(),
        };
        let report = execute(outcomes, &ctx, repository, Utc::now())?;

        self.state = SessionState::Committed;
        self.table = None;
        Ok(self.report.insert(report))
    }

    /// What the operator reviews after upload; `None` before a mapping exists.
    pub fn proposal(&self, preview_rows: usize) -> Option<MappingProposal> {
        let table = self.table.as_ref()?;
        let mapping = self.mapping.as_ref()?;
        Some(MappingProposal {
            session_id: self.id.clone(),
            kind: self.kind,
            delimiter: table.delimiter,
            headers: table.headers.clone(),
            mapping: mapping.clone(),
            conflicts: find_conflicts(mapping),
            rows_read: table.rows.len(),
            preview: table
                .rows
                .iter()
                .take(preview_rows)
                .map(|r| r.values.clone())
                .collect(),
        })
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            session_id: self.id.clone(),
            kind: self.kind,
            owner: self.owner.clone(),
            state: self.state.clone(),
            file_name: self.file.as_ref().map(|f| f.name.clone()),
            mapping: self.mapping.clone(),
            report: self.report.clone(),
        }
    }
}

fn check_required_fields(
    template: &MappingTemplate,
    mapping: &ColumnMapping,
) -> Result<(), ImportError> {
    for required in template.required_fields() {
        let wanted = required.field.trim().to_lowercase();
        let canonical = resolve_template_field(mapping.kind, &wanted);
        let mapped = mapping.columns.iter().any(|c| match &c.target {
            ColumnTarget::Template(name) => name.trim().to_lowercase() == wanted,
            ColumnTarget::Field(field) => canonical == Some(*field),
            _ => false,
        });
        if !mapped {
            return Err(ImportError::RequiredFieldUnmapped(required.field.clone()));
        }
    }
    Ok(())
}
