use serde::{Deserialize, Serialize};

use crate::model::record::RecordKind;

/// A field declared by a mapping template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateField {
    /// Operator-chosen field name, e.g. `nome` or `price`.
    pub field: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub display_order: u32,
}

/// A reusable, operator-authored column assignment rule set for one record kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingTemplate {
    pub name: String,
    pub kind: RecordKind,
    pub fields: Vec<TemplateField>,
}

impl MappingTemplate {
    /// Fields sorted by `display_order`; ties keep their declared order.
    pub fn ordered_fields(&self) -> Vec<&TemplateField> {
        let mut fields: Vec<&TemplateField> = self.fields.iter().collect();
        fields.sort_by_key(|f| f.display_order);
        fields
    }

    pub fn required_fields(&self) -> impl Iterator<Item = &TemplateField> {
        self.fields.iter().filter(|f| f.required)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering_is_stable_for_equal_positions() {
        let template = MappingTemplate {
            name: "crm".to_string(),
            kind: RecordKind::Client,
            fields: vec![
                TemplateField { field: "email".into(), required: false, display_order: 2 },
                TemplateField { field: "nome".into(), required: true, display_order: 1 },
                TemplateField { field: "cidade".into(), required: false, display_order: 2 },
            ],
        };
        let names: Vec<&str> = template.ordered_fields().iter().map(|f| f.field.as_str()).collect();
        assert_eq!(names, vec!["nome", "email", "cidade"]);
        assert_eq!(template.required_fields().count(), 1);
    }
}
