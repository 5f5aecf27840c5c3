use crate::error::RowBuildFailure;
use crate::import::headers::SourceRow;
use crate::import::mapper::{resolve, Resolved};
use common::model::mapping::ColumnMapping;
use common::model::record::{ClientRecord, ProductRecord, RecordBody, RecordKind, TargetField};
use once_cell::sync::Lazy;
use rayon::prelude::*;
use regex::Regex;
use std::collections::BTreeMap;

// Optional currency text, sign, digits with separators, optional unit text.
// Anything else between the digits makes the value unreadable.
static NUMBER_SHAPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\d+\-]*?([+-]?)([\d.,]*\d[\d.,]*)[^\d]*$").expect("number shape pattern")
});

/// A record body built from one row, not yet stamped with identity.
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltRecord {
    pub body: RecordBody,
    pub auxiliary: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RowOutcome {
    pub index: usize,
    pub line: usize,
    pub result: Result<BuiltRecord, RowBuildFailure>,
}

/// Applies a confirmed mapping to every row, in file order.
///
/// Rows are independent, so from `parallel_threshold` rows on they are built
/// on the rayon pool; `collect` keeps the input order either way.
pub fn build_records(
    rows: &[SourceRow],
    mapping: &ColumnMapping,
    parallel_threshold: usize,
) -> Vec<RowOutcome> {
    let plan: Vec<Resolved> = mapping
        .columns
        .iter()
        .map(|c| resolve(mapping.kind, c))
        .collect();

    let build = |row: &SourceRow| RowOutcome {
        index: row.index,
        line: row.line,
        result: build_row(row, &plan, mapping.kind),
    };

    if rows.len() >= parallel_threshold {
        rows.par_iter().map(build).collect()
    } else {
        rows.iter().map(build).collect()
    }
}

fn build_row(
    row: &SourceRow,
    plan: &[Resolved],
    kind: RecordKind,
) -> Result<BuiltRecord, RowBuildFailure> {
    let mut body = RecordBody::empty(kind);
    let mut auxiliary = BTreeMap::new();

    for (target, value) in plan.iter().zip(row.values.iter()) {
        let value = value.trim();
        if value.is_empty() {
            continue;
        }
        match target {
            Resolved::Field(field) => assign(&mut body, *field, value)?,
            Resolved::Auxiliary(key) => insert_unique(&mut auxiliary, key, value),
            Resolved::Ignore => {}
        }
    }
    for (column, value) in &row.extras {
        insert_unique(&mut auxiliary, &format!("column_{}", column + 1), value);
    }

    if !body.is_identified() {
        return Err(RowBuildFailure::MissingIdentifier);
    }
    Ok(BuiltRecord { body, auxiliary })
}

/// Inserts under `key`, or `key (2)`, `key (3)`... when a duplicate header already used it.
fn insert_unique(map: &mut BTreeMap<String, String>, key: &str, value: &str) {
    let mut candidate = key.to_string();
    let mut n = 2;
    while map.contains_key(&candidate) {
        candidate = format!("{} ({})", key, n);
        n += 1;
    }
    map.insert(candidate, value.to_string());
}

fn assign(body: &mut RecordBody, field: TargetField, value: &str) -> Result<(), RowBuildFailure> {
    let text = Some(value.to_string());
    match body {
        RecordBody::Client(c) => assign_client(c, field, text),
        RecordBody::Product(p) => assign_product(p, field, value)?,
    }
    Ok(())
}

fn assign_client(c: &mut ClientRecord, field: TargetField, text: Option<String>) {
    match field {
        TargetField::Name => c.name = text,
        TargetField::Email => c.email = text,
        TargetField::Phone => c.phone = text,
        TargetField::Identifier => c.identifier = text,
        TargetField::Company => c.company = text,
        TargetField::Address => c.address = text,
        TargetField::City => c.city = text,
        TargetField::State => c.state = text,
        TargetField::PostalCode => c.postal_code = text,
        TargetField::Notes => c.notes = text,
        // Rejected when the mapping is confirmed.
        _ => {}
    }
}

fn assign_product(
    p: &mut ProductRecord,
    field: TargetField,
    value: &str,
) -> Result<(), RowBuildFailure> {
    let text = Some(value.to_string());
    match field {
        TargetField::Name => p.name = text,
        TargetField::Code => p.code = text,
        TargetField::Barcode => p.barcode = text,
        TargetField::Category => p.category = text,
        TargetField::Price => p.price = Some(parse_decimal(field, value)?),
        TargetField::Cost => p.cost = Some(parse_decimal(field, value)?),
        TargetField::Stock => p.stock = Some(parse_integer(field, value)?),
        TargetField::Brand => p.brand = text,
        TargetField::Supplier => p.supplier = text,
        TargetField::Weight => p.weight = Some(parse_decimal(field, value)?),
        TargetField::Dimensions => p.dimensions = text,
        TargetField::Unit => p.unit = text,
        TargetField::Description => p.description = text,
        TargetField::Status => p.status = text,
        _ => {}
    }
    Ok(())
}

fn coercion(field: TargetField, value: &str, reason: &str) -> RowBuildFailure {
    RowBuildFailure::Coercion {
        field,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// Parses numbers as they appear in spreadsheets: `R$ 1.234,56`, `1,234.56`, `12,5 kg`.
///
/// Currency and unit text is only accepted around the number. With both
/// separators present the last one is the decimal mark. A lone comma is a
/// decimal mark; a lone dot followed by exactly three digits (`1.000`) is a
/// thousands separator. Repeated separators must group digits by three.
fn parse_decimal(field: TargetField, value: &str) -> Result<f64, RowBuildFailure> {
    let not_a_number = || coercion(field, value, "not a number");
    let caps = NUMBER_SHAPE.captures(value.trim()).ok_or_else(not_a_number)?;
    let digits = normalize_separators(&caps[2]).ok_or_else(not_a_number)?;

    format!("{}{}", &caps[1], digits)
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(not_a_number)
}

/// Rewrites `digits` with `.` as the only decimal mark and no thousands separators.
fn normalize_separators(digits: &str) -> Option<String> {
    let last_comma = digits.rfind(',');
    let last_dot = digits.rfind('.');

    // (integer part, fractional part, thousands separator)
    let (integer, fraction, thousands) = match (last_comma, last_dot) {
        (None, None) => return Some(digits.to_string()),
        (Some(c), Some(d)) if c > d => (&digits[..c], &digits[c + 1..], '.'),
        (Some(_), Some(d)) => (&digits[..d], &digits[d + 1..], ','),
        (Some(c), None) if digits.matches(',').count() == 1 => {
            (&digits[..c], &digits[c + 1..], '.')
        }
        (Some(_), None) => (digits, "", ','),
        (None, Some(d)) if digits.matches('.').count() == 1 && !is_thousands_group(digits, d) => {
            (&digits[..d], &digits[d + 1..], ',')
        }
        (None, Some(_)) => (digits, "", '.'),
    };

    if !fraction.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let integer = if integer.contains(thousands) {
        let mut groups = integer.split(thousands);
        let lead = groups.next().unwrap_or_default();
        let lead_ok = (1..=3).contains(&lead.len()) && !lead.starts_with('0');
        if !lead_ok || !groups.all(|g| g.len() == 3) {
            return None;
        }
        integer.replace(thousands, "")
    } else {
        integer.to_string()
    };
    if !integer.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    match (integer.is_empty(), fraction.is_empty()) {
        (true, true) => None,
        (_, true) => Some(integer),
        (true, _) => Some(format!("0.{}", fraction)),
        _ => Some(format!("{}.{}", integer, fraction)),
    }
}

/// `1.000` or `12.500`: one dot, three digits after it, a short non-zero lead.
fn is_thousands_group(digits: &str, dot: usize) -> bool {
    let lead = &digits[..dot];
    digits.len() - dot - 1 == 3 && (1..=3).contains(&lead.len()) && !lead.starts_with('0')
}

fn parse_integer(field: TargetField, value: &str) -> Result<i64, RowBuildFailure> {
    let number = parse_decimal(field, value)?;
    if number.fract() != 0.0 {
        return Err(coercion(field, value, "not a whole number"));
    }
    if number.abs() > i64::MAX as f64 {
        return Err(coercion(field, value, "out of range"));
    }
    Ok(number as i64)
}
