use crate::import::keywords::classify;
use common::model::csv::Header;
use common::model::mapping::{
    conflicts_in, AssignmentOrigin, ColumnAssignment, ColumnMapping, ColumnTarget, FieldConflict,
    MappingSource,
};
use common::model::record::{RecordKind, TargetField};
use common::model::template::MappingTemplate;

/// Proposes a target for every header.
///
/// With a template, each header is first compared with the template fields
/// (lowercased, containment either way, first match in display order). Any
/// header the template does not claim goes through the keyword rules, and
/// headers no rule recognises are kept as auxiliary data.
pub fn propose_mapping(
    kind: RecordKind,
    headers: &[Header],
    template: Option<&MappingTemplate>,
) -> ColumnMapping {
    let template_fields: Vec<String> = template
        .map(|t| {
            t.ordered_fields()
                .into_iter()
                .map(|f| f.field.trim().to_string())
                .filter(|f| !f.is_empty())
                .collect()
        })
        .unwrap_or_default();

    let columns = headers
        .iter()
        .map(|header| {
            let (target, origin) = match match_template_field(&header.name, &template_fields) {
                Some(field) => (ColumnTarget::Template(field.to_string()), AssignmentOrigin::Template),
                None => match classify(kind, &header.name) {
                    Some(field) => (ColumnTarget::Field(field), AssignmentOrigin::Heuristic),
                    None => (ColumnTarget::Auxiliary, AssignmentOrigin::Fallback),
                },
            };
            log::debug!("Column '{}' -> {:?} ({:?})", header.name, target, origin);
            ColumnAssignment {
                header: header.name.clone(),
                column: header.column,
                target,
                origin,
            }
        })
        .collect();

    ColumnMapping {
        kind,
        source: match template {
            Some(t) => MappingSource::Template {
                name: t.name.clone(),
            },
            None => MappingSource::Heuristic,
        },
        columns,
    }
}

fn match_template_field<'a>(header: &str, fields: &'a [String]) -> Option<&'a str> {
    let header = header.trim().to_lowercase();
    fields
        .iter()
        .find(|field| {
            let field = field.to_lowercase();
            header.contains(&field) || field.contains(&header)
        })
        .map(String::as_str)
}

/// Where a column's value ends up once the mapping is applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved {
    Field(TargetField),
    /// Auxiliary map key.
    Auxiliary(String),
    Ignore,
}

/// Resolves a template field name: exact canonical name first, then the keyword rules.
pub fn resolve_template_field(kind: RecordKind, name: &str) -> Option<TargetField> {
    TargetField::from_name(kind, name).or_else(|| classify(kind, name))
}

pub fn resolve(kind: RecordKind, assignment: &ColumnAssignment) -> Resolved {
    match &assignment.target {
        ColumnTarget::Field(field) => Resolved::Field(*field),
        ColumnTarget::Template(name) => match resolve_template_field(kind, name) {
            Some(field) => Resolved::Field(field),
            None => Resolved::Auxiliary(name.clone()),
        },
        ColumnTarget::Auxiliary => Resolved::Auxiliary(assignment.header.clone()),
        ColumnTarget::Ignore => Resolved::Ignore,
    }
}

/// Canonical fields claimed by more than one column once template fields are resolved.
pub fn find_conflicts(mapping: &ColumnMapping) -> Vec<FieldConflict> {
    conflicts_in(mapping.columns.iter().filter_map(|c| match resolve(mapping.kind, c) {
        Resolved::Field(field) => Some((field, c.header.as_str())),
        _ => None,
    }))
}
