// crates/routewarden-core/src/runtime/validator.rs
// ============================================================================
// Module: Tree Validator
// Description: Schema-driven validation and normalization of policy trees.
// Purpose: Walk a field descriptor tree over raw input, coercing values,
//          filling defaults, and collecting every structural finding.
// Dependencies: serde_json
// ============================================================================

//! ## Overview
//! The validator walks the schema depth-first. Each descriptor locates its
//! input node by name, coerces the raw value to the descriptor's kind, and
//! records a diagnostic when that fails. Nothing aborts on the first
//! problem: the caller receives the normalized tree together with the
//! complete finding list and decides whether any finding is fatal.
//!
//! Normalization guarantees that every schema key is present in the output:
//! defaults are filled in, optional fields without defaults become `null`.
//! An explicit `null` input is treated exactly like an absent field.
//! Validating an already-normalized tree is idempotent.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::net::IpAddr;
use std::net::Ipv4Addr;
use std::net::Ipv6Addr;

use serde_json::Map;
use serde_json::Value;
use serde_json::json;

use crate::core::diagnostics::Diagnostic;
use crate::core::schema::AddressFamily;
use crate::core::schema::FieldDescriptor;
use crate::core::schema::FieldKind;
use crate::core::schema::SchemaMap;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// Validates `tree` against `schema`, returning the normalized tree and
/// every structural finding.
#[must_use]
pub fn validate_tree(schema: &FieldDescriptor, tree: &Value) -> (Value, Vec<Diagnostic>) {
    let mut diagnostics = Vec::new();
    let normalized = validate_node(schema, tree, "", &mut diagnostics);
    (normalized, diagnostics)
}

// ============================================================================
// SECTION: Node Walk
// ============================================================================

/// Validates one input node against its descriptor.
fn validate_node(
    descriptor: &FieldDescriptor,
    input: &Value,
    path: &str,
    out: &mut Vec<Diagnostic>,
) -> Value {
    if let FieldKind::Nested(fields) = descriptor.kind() {
        return validate_nested(fields, input, path, out);
    }

    if input.is_null() {
        if let Some(default) = descriptor.default() {
            return default.clone();
        }
        if descriptor.is_mandatory() {
            out.push(Diagnostic::MissingMandatoryField {
                path: path.to_string(),
            });
        }
        return Value::Null;
    }

    match descriptor.kind() {
        // Handled above; absent sections still expand their children.
        FieldKind::Nested(_) => Value::Null,
        FieldKind::ListOf(element) => validate_list(element, input, path, out),
        FieldKind::MapOf(element) => validate_map(element, input, path, out),
        FieldKind::PrefixListEntry => validate_prefix_entry(input, path, out),
        scalar => match validate_scalar(scalar, input, path) {
            Ok(value) => value,
            Err(diagnostic) => {
                out.push(diagnostic);
                Value::Null
            }
        },
    }
}

/// Validates a fixed-key section, expanding every schema child.
fn validate_nested(
    fields: &SchemaMap,
    input: &Value,
    path: &str,
    out: &mut Vec<Diagnostic>,
) -> Value {
    let empty = Map::new();
    let entries = match input {
        Value::Null => &empty,
        Value::Object(entries) => entries,
        other => {
            out.push(type_mismatch(path, other, "mapping"));
            &empty
        }
    };

    for key in entries.keys() {
        if !fields.contains_key(key.as_str()) {
            out.push(Diagnostic::UnknownField {
                path: join_path(path, key),
            });
        }
    }

    let mut normalized = Map::new();
    for (name, child) in fields {
        let child_path = join_path(path, name);
        let child_input = entries.get(*name).unwrap_or(&Value::Null);
        normalized.insert(
            (*name).to_string(),
            validate_node(child, child_input, &child_path, out),
        );
    }
    Value::Object(normalized)
}

/// Validates a homogeneous list, indexing member paths from one.
fn validate_list(
    element: &FieldDescriptor,
    input: &Value,
    path: &str,
    out: &mut Vec<Diagnostic>,
) -> Value {
    let Value::Array(items) = input else {
        out.push(type_mismatch(path, input, "list"));
        return Value::Null;
    };

    let mut normalized = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        let item_path = format!("{path}.{}", index.saturating_add(1));
        if item.is_null() {
            out.push(type_mismatch(&item_path, item, &element.kind().describe()));
            normalized.push(Value::Null);
        } else {
            normalized.push(validate_node(element, item, &item_path, out));
        }
    }
    Value::Array(normalized)
}

/// Validates a caller-keyed mapping, sharing one element descriptor.
fn validate_map(
    element: &FieldDescriptor,
    input: &Value,
    path: &str,
    out: &mut Vec<Diagnostic>,
) -> Value {
    let Value::Object(entries) = input else {
        out.push(type_mismatch(path, input, "mapping"));
        return Value::Null;
    };

    let mut normalized = Map::new();
    for (key, entry) in entries {
        let entry_path = join_path(path, key);
        if entry.is_null() {
            out.push(type_mismatch(&entry_path, entry, &element.kind().describe()));
            normalized.insert(key.clone(), Value::Null);
        } else {
            normalized.insert(key.clone(), validate_node(element, entry, &entry_path, out));
        }
    }
    Value::Object(normalized)
}

// ============================================================================
// SECTION: Scalar Kinds
// ============================================================================

/// Validates and coerces a scalar value.
fn validate_scalar(
    kind: &FieldKind,
    input: &Value,
    path: &str,
) -> Result<Value, Diagnostic> {
    match kind {
        FieldKind::Bool => coerce_bool(input)
            .map(Value::Bool)
            .ok_or_else(|| type_mismatch(path, input, &kind.describe())),
        FieldKind::UInt {
            min,
            max,
        } => {
            let value = coerce_uint(input)
                .filter(|value| value >= min && value <= max)
                .ok_or_else(|| type_mismatch(path, input, &kind.describe()))?;
            Ok(json!(value))
        }
        FieldKind::Asn => {
            let value = coerce_uint(input)
                .filter(|value| (1..=u64::from(u32::MAX)).contains(value))
                .ok_or_else(|| type_mismatch(path, input, &kind.describe()))?;
            Ok(json!(value))
        }
        FieldKind::IpAddr {
            family,
        } => coerce_ip(input, *family)
            .map(Value::String)
            .ok_or_else(|| type_mismatch(path, input, &kind.describe())),
        FieldKind::Choice {
            allowed,
        } => {
            let rendered = render_value(input);
            if input.is_string() && allowed.contains(&rendered.as_str()) {
                Ok(Value::String(rendered))
            } else {
                Err(Diagnostic::InvalidOption {
                    path: path.to_string(),
                    value: rendered,
                    allowed,
                })
            }
        }
        FieldKind::PrefixLenRange {
            max_len,
        } => validate_pref_len(input, *max_len)
            .ok_or_else(|| type_mismatch(path, input, &kind.describe())),
        FieldKind::RttThresholds => validate_rtt_thresholds(input)
            .ok_or_else(|| type_mismatch(path, input, &kind.describe())),
        FieldKind::Text => match input {
            Value::String(text) => Ok(Value::String(text.clone())),
            Value::Number(_) | Value::Bool(_) => Ok(Value::String(render_value(input))),
            _ => Err(type_mismatch(path, input, &kind.describe())),
        },
        FieldKind::PrefixListEntry
        | FieldKind::Nested(_)
        | FieldKind::ListOf(_)
        | FieldKind::MapOf(_) => Err(type_mismatch(path, input, &kind.describe())),
    }
}

/// Coerces a boolean from a JSON bool or the exact strings `true`/`false`.
fn coerce_bool(input: &Value) -> Option<bool> {
    match input {
        Value::Bool(value) => Some(*value),
        Value::String(text) => match text.as_str() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// Coerces a non-negative integer from a JSON number or a decimal string.
fn coerce_uint(input: &Value) -> Option<u64> {
    match input {
        Value::Number(number) => number.as_u64(),
        Value::String(text) => text.trim().parse::<u64>().ok(),
        _ => None,
    }
}

/// Parses an IP address of the required family into its canonical text.
fn coerce_ip(input: &Value, family: Option<AddressFamily>) -> Option<String> {
    let text = input.as_str()?.trim();
    match family {
        Some(AddressFamily::Ipv4) => text.parse::<Ipv4Addr>().ok().map(|addr| addr.to_string()),
        Some(AddressFamily::Ipv6) => text.parse::<Ipv6Addr>().ok().map(|addr| addr.to_string()),
        None => text.parse::<IpAddr>().ok().map(|addr| addr.to_string()),
    }
}

/// Validates a `{min, max}` prefix length pair against the family maximum.
fn validate_pref_len(input: &Value, max_len: u8) -> Option<Value> {
    let entries = input.as_object()?;
    if entries.keys().any(|key| key != "min" && key != "max") {
        return None;
    }
    let min = coerce_uint(entries.get("min")?)?;
    let max = coerce_uint(entries.get("max")?)?;
    if min <= max && max <= u64::from(max_len) {
        Some(json!({ "min": min, "max": max }))
    } else {
        None
    }
}

/// Validates a strictly ascending threshold list.
///
/// Accepts a JSON array of non-negative integers or a comma-separated
/// string, the form a YAML scalar like `5, 10, 50` arrives in.
fn validate_rtt_thresholds(input: &Value) -> Option<Value> {
    let thresholds: Vec<u64> = match input {
        Value::Array(items) => items
            .iter()
            .map(coerce_uint)
            .collect::<Option<Vec<u64>>>()?,
        Value::String(text) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                Vec::new()
            } else {
                trimmed
                    .split(',')
                    .map(|token| token.trim().parse::<u64>().ok())
                    .collect::<Option<Vec<u64>>>()?
            }
        }
        _ => return None,
    };
    let ascending = thresholds
        .windows(2)
        .all(|pair| pair.first().zip(pair.get(1)).is_some_and(|(a, b)| a < b));
    if ascending {
        Some(json!(thresholds))
    } else {
        None
    }
}

// ============================================================================
// SECTION: Prefix List Entries
// ============================================================================

/// Keys a prefix list entry may carry.
const PREFIX_ENTRY_KEYS: [&str; 4] = ["prefix", "length", "comment", "exact"];

/// Validates one `{prefix, length, comment?, exact?}` exclusion entry.
fn validate_prefix_entry(input: &Value, path: &str, out: &mut Vec<Diagnostic>) -> Value {
    let Value::Object(entries) = input else {
        out.push(type_mismatch(path, input, "prefix list entry"));
        return Value::Null;
    };

    for key in entries.keys() {
        if !PREFIX_ENTRY_KEYS.contains(&key.as_str()) {
            out.push(Diagnostic::UnknownField {
                path: join_path(path, key),
            });
        }
    }

    let prefix_path = join_path(path, "prefix");
    let prefix_input = entries.get("prefix").unwrap_or(&Value::Null);
    let prefix = if prefix_input.is_null() {
        out.push(Diagnostic::MissingMandatoryField {
            path: prefix_path,
        });
        None
    } else {
        let parsed = coerce_ip(prefix_input, None);
        if parsed.is_none() {
            out.push(type_mismatch(&prefix_path, prefix_input, "IP address"));
        }
        parsed
    };

    // The family of the prefix bounds the length; unknown family skips the
    // upper bound rather than guessing one.
    let length_limit = prefix
        .as_deref()
        .and_then(|text| text.parse::<IpAddr>().ok())
        .map(|addr| if addr.is_ipv4() { 32_u64 } else { 128_u64 });

    let length_path = join_path(path, "length");
    let length_input = entries.get("length").unwrap_or(&Value::Null);
    let length = if length_input.is_null() {
        out.push(Diagnostic::MissingMandatoryField {
            path: length_path,
        });
        None
    } else {
        let parsed = coerce_uint(length_input)
            .filter(|value| length_limit.is_none_or(|limit| *value <= limit));
        if parsed.is_none() {
            let limit = length_limit.unwrap_or(128);
            out.push(type_mismatch(
                &length_path,
                length_input,
                &format!("prefix length in 0..={limit}"),
            ));
        }
        parsed
    };

    let comment = match entries.get("comment") {
        None | Some(Value::Null) => Value::Null,
        Some(Value::String(text)) => Value::String(text.clone()),
        Some(other @ (Value::Number(_) | Value::Bool(_))) => Value::String(render_value(other)),
        Some(other) => {
            out.push(type_mismatch(&join_path(path, "comment"), other, "text"));
            Value::Null
        }
    };

    let exact = match entries.get("exact") {
        None | Some(Value::Null) => Value::Bool(false),
        Some(other) => coerce_bool(other).map_or_else(
            || {
                out.push(type_mismatch(&join_path(path, "exact"), other, "boolean"));
                Value::Bool(false)
            },
            Value::Bool,
        ),
    };

    json!({
        "prefix": prefix.map_or(Value::Null, Value::String),
        "length": length.map_or(Value::Null, |value| json!(value)),
        "comment": comment,
        "exact": exact,
    })
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Joins a dotted path with a child segment.
fn join_path(path: &str, segment: &str) -> String {
    if path.is_empty() {
        segment.to_string()
    } else {
        format!("{path}.{segment}")
    }
}

/// Renders an offending value for a diagnostic.
fn render_value(input: &Value) -> String {
    match input {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Builds a type mismatch finding.
fn type_mismatch(path: &str, input: &Value, expected: &str) -> Diagnostic {
    Diagnostic::TypeMismatch {
        path: path.to_string(),
        value: render_value(input),
        expected: expected.to_string(),
    }
}
