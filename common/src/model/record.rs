use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::model::mapping::MappingSource;

/// The kind of record an import produces.
///
/// Each kind has its own canonical field set (see [`TargetField::for_kind`])
/// and its own destination collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Client,
    Product,
}

impl RecordKind {
    /// Key under which the collection of this kind is stored.
    pub fn store_key(&self) -> &'static str {
        match self {
            RecordKind::Client => "clients",
            RecordKind::Product => "products",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::Client => "client",
            RecordKind::Product => "product",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "client" | "clients" => Ok(RecordKind::Client),
            "product" | "products" => Ok(RecordKind::Product),
            other => Err(format!("Unknown record kind '{}'", other)),
        }
    }
}

/// A canonical attribute of the destination schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetField {
    Name,
    Email,
    Phone,
    Identifier,
    Company,
    Address,
    City,
    State,
    PostalCode,
    Notes,
    Code,
    Barcode,
    Category,
    Price,
    Cost,
    Stock,
    Brand,
    Supplier,
    Weight,
    Dimensions,
    Unit,
    Description,
    Status,
}

const CLIENT_FIELDS: &[TargetField] = &[
    TargetField::Name,
    TargetField::Email,
    TargetField::Phone,
    TargetField::Identifier,
    TargetField::Company,
    TargetField::Address,
    TargetField::City,
    TargetField::State,
    TargetField::PostalCode,
    TargetField::Notes,
];

const PRODUCT_FIELDS: &[TargetField] = &[
    TargetField::Name,
    TargetField::Code,
    TargetField::Barcode,
    TargetField::Category,
    TargetField::Price,
    TargetField::Cost,
    TargetField::Stock,
    TargetField::Brand,
    TargetField::Supplier,
    TargetField::Weight,
    TargetField::Dimensions,
    TargetField::Unit,
    TargetField::Description,
    TargetField::Status,
];

impl TargetField {
    /// Canonical fields of a record kind, in schema order.
    pub fn for_kind(kind: RecordKind) -> &'static [TargetField] {
        match kind {
            RecordKind::Client => CLIENT_FIELDS,
            RecordKind::Product => PRODUCT_FIELDS,
        }
    }

    pub fn belongs_to(&self, kind: RecordKind) -> bool {
        Self::for_kind(kind).contains(self)
    }

    /// Whether a non-empty value in this field makes a record worth keeping.
    pub fn is_identifying(&self, kind: RecordKind) -> bool {
        match kind {
            RecordKind::Client => matches!(
                self,
                TargetField::Name | TargetField::Email | TargetField::Phone | TargetField::Identifier
            ),
            RecordKind::Product => matches!(
                self,
                TargetField::Name | TargetField::Code | TargetField::Barcode
            ),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TargetField::Name => "name",
            TargetField::Email => "email",
            TargetField::Phone => "phone",
            TargetField::Identifier => "identifier",
            TargetField::Company => "company",
            TargetField::Address => "address",
            TargetField::City => "city",
            TargetField::State => "state",
            TargetField::PostalCode => "postal_code",
            TargetField::Notes => "notes",
            TargetField::Code => "code",
            TargetField::Barcode => "barcode",
            TargetField::Category => "category",
            TargetField::Price => "price",
            TargetField::Cost => "cost",
            TargetField::Stock => "stock",
            TargetField::Brand => "brand",
            TargetField::Supplier => "supplier",
            TargetField::Weight => "weight",
            TargetField::Dimensions => "dimensions",
            TargetField::Unit => "unit",
            TargetField::Description => "description",
            TargetField::Status => "status",
        }
    }

    /// Looks up a canonical field of `kind` by its exact name, ignoring case.
    pub fn from_name(kind: RecordKind, name: &str) -> Option<TargetField> {
        let wanted = name.trim().to_lowercase();
        Self::for_kind(kind)
            .iter()
            .copied()
            .find(|f| f.as_str() == wanted)
    }
}

impl fmt::Display for TargetField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClientRecord {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub identifier: Option<String>,
    pub company: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub name: Option<String>,
    pub code: Option<String>,
    pub barcode: Option<String>,
    pub category: Option<String>,
    pub price: Option<f64>,
    pub cost: Option<f64>,
    pub stock: Option<i64>,
    pub brand: Option<String>,
    pub supplier: Option<String>,
    pub weight: Option<f64>,
    pub dimensions: Option<String>,
    pub unit: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
}

/// First-class attributes of a record, tagged by kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "fields", rename_all = "snake_case")]
pub enum RecordBody {
    Client(ClientRecord),
    Product(ProductRecord),
}

impl RecordBody {
    pub fn empty(kind: RecordKind) -> Self {
        match kind {
            RecordKind::Client => RecordBody::Client(ClientRecord::default()),
            RecordKind::Product => RecordBody::Product(ProductRecord::default()),
        }
    }

    pub fn kind(&self) -> RecordKind {
        match self {
            RecordBody::Client(_) => RecordKind::Client,
            RecordBody::Product(_) => RecordKind::Product,
        }
    }

    /// Display form of a first-class field, `None` when unset or not part of this kind.
    pub fn value(&self, field: TargetField) -> Option<String> {
        match self {
            RecordBody::Client(c) => match field {
                TargetField::Name => c.name.clone(),
                TargetField::Email => c.email.clone(),
                TargetField::Phone => c.phone.clone(),
                TargetField::Identifier => c.identifier.clone(),
                TargetField::Company => c.company.clone(),
                TargetField::Address => c.address.clone(),
                TargetField::City => c.city.clone(),
                TargetField::State => c.state.clone(),
                TargetField::PostalCode => c.postal_code.clone(),
                TargetField::Notes => c.notes.clone(),
                _ => None,
            },
            RecordBody::Product(p) => match field {
                TargetField::Name => p.name.clone(),
                TargetField::Code => p.code.clone(),
                TargetField::Barcode => p.barcode.clone(),
                TargetField::Category => p.category.clone(),
                TargetField::Price => p.price.map(|v| v.to_string()),
                TargetField::Cost => p.cost.map(|v| v.to_string()),
                TargetField::Stock => p.stock.map(|v| v.to_string()),
                TargetField::Brand => p.brand.clone(),
                TargetField::Supplier => p.supplier.clone(),
                TargetField::Weight => p.weight.map(|v| v.to_string()),
                TargetField::Dimensions => p.dimensions.clone(),
                TargetField::Unit => p.unit.clone(),
                TargetField::Description => p.description.clone(),
                TargetField::Status => p.status.clone(),
                _ => None,
            },
        }
    }

    /// True when at least one identifying field holds a non-empty value.
    pub fn is_identified(&self) -> bool {
        let kind = self.kind();
        TargetField::for_kind(kind)
            .iter()
            .filter(|f| f.is_identifying(kind))
            .any(|f| self.value(*f).is_some_and(|v| !v.trim().is_empty()))
    }
}

/// Where a committed record came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Provenance {
    pub session_id: String,
    pub file_name: String,
    pub file_md5: String,
    /// 1-based line in the source file.
    pub line: usize,
    pub mapping_source: MappingSource,
}

/// A record owned by a destination collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetRecord {
    pub id: String,
    pub owner: String,
    pub created_at: DateTime<Utc>,
    pub group: Option<String>,
    pub provenance: Option<Provenance>,
    pub body: RecordBody,
    /// Unmapped source columns keyed by their original header.
    #[serde(default)]
    pub auxiliary: BTreeMap<String, String>,
}

impl TargetRecord {
    pub fn kind(&self) -> RecordKind {
        self.body.kind()
    }
}
