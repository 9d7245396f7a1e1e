//! Product data validation.
//!
//! The catalog file is hand-edited, so every entry is checked before the
//! storefront serves anything. The first violation aborts the whole load;
//! a partial catalog is never returned.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use serde_json::{Map, Value};

use crate::catalog::{Availability, Banner, Product};
use crate::error::CatalogError;

/// Validate a raw JSON array of products.
pub fn normalize_products(raw: &Value) -> Result<Vec<Product>, CatalogError> {
    let entries = raw
        .as_array()
        .ok_or_else(|| CatalogError::NotAnArray(json_type(raw)))?;

    let mut products = Vec::with_capacity(entries.len());
    let mut seen = HashSet::new();

    for (index, entry) in entries.iter().enumerate() {
        let product = normalize_product(index, entry)?;
        if !seen.insert(product.name.clone()) {
            return Err(CatalogError::DuplicateName {
                index,
                name: product.name,
            });
        }
        products.push(product);
    }

    Ok(products)
}

/// Parse and validate product JSON text.
pub fn parse_catalog(json: &str) -> Result<Vec<Product>, CatalogError> {
    let raw: Value = serde_json::from_str(json).map_err(|e| CatalogError::Parse(e.to_string()))?;
    normalize_products(&raw)
}

/// Read, parse and validate a product data file.
pub fn load_catalog(path: impl AsRef<Path>) -> Result<Vec<Product>, CatalogError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .map_err(|e| CatalogError::Io(format!("{}: {}", path.display(), e)))?;
    let products = parse_catalog(&content)?;
    tracing::info!(path = %path.display(), count = products.len(), "loaded product catalog");
    Ok(products)
}

fn normalize_product(index: usize, entry: &Value) -> Result<Product, CatalogError> {
    let obj = entry
        .as_object()
        .ok_or(CatalogError::NotAnObject { index })?;

    let name = required_string(index, obj, "name")?;
    let category = required_string(index, obj, "category")?;
    let size_options = size_options(index, obj)?;
    let prices = prices(index, obj)?;

    let thca_percentage = match present(obj, "thca_percentage") {
        None => None,
        Some(value) => Some(non_negative(index, "thca_percentage", value)?),
    };

    let banner = match present(obj, "banner") {
        None => None,
        Some(Value::String(s)) if s.trim().is_empty() => None,
        Some(Value::String(s)) => Some(Banner::from(s.trim())),
        Some(other) => {
            return Err(CatalogError::field(
                index,
                "banner",
                format!("expected a string, got {}", json_type(other)),
            ))
        }
    };

    let availability = match present(obj, "availability") {
        None => None,
        Some(value) => Some(availability(index, value)?),
    };

    Ok(Product {
        name,
        category,
        size_options,
        prices,
        thca_percentage,
        banner,
        availability,
    })
}

/// Field value, treating an explicit `null` as absent.
fn present<'a>(obj: &'a Map<String, Value>, field: &str) -> Option<&'a Value> {
    obj.get(field).filter(|v| !v.is_null())
}

fn required_string(
    index: usize,
    obj: &Map<String, Value>,
    field: &str,
) -> Result<String, CatalogError> {
    match obj.get(field) {
        Some(Value::String(s)) if !s.trim().is_empty() => Ok(s.trim().to_string()),
        Some(Value::String(_)) => Err(CatalogError::field(index, field, "must not be empty")),
        Some(other) => Err(CatalogError::field(
            index,
            field,
            format!("expected a string, got {}", json_type(other)),
        )),
        None => Err(CatalogError::field(index, field, "is required")),
    }
}

fn size_options(index: usize, obj: &Map<String, Value>) -> Result<Vec<String>, CatalogError> {
    let values = match obj.get("size_options") {
        Some(Value::Array(values)) => values,
        Some(other) => {
            return Err(CatalogError::field(
                index,
                "size_options",
                format!("expected an array, got {}", json_type(other)),
            ))
        }
        None => return Err(CatalogError::field(index, "size_options", "is required")),
    };

    if values.is_empty() {
        return Err(CatalogError::field(index, "size_options", "must not be empty"));
    }

    values
        .iter()
        .enumerate()
        .map(|(i, v)| match v {
            Value::String(s) => Ok(s.clone()),
            other => Err(CatalogError::field(
                index,
                format!("size_options[{}]", i),
                format!("expected a string, got {}", json_type(other)),
            )),
        })
        .collect()
}

fn prices(index: usize, obj: &Map<String, Value>) -> Result<BTreeMap<String, f64>, CatalogError> {
    let map = match obj.get("prices") {
        Some(Value::Object(map)) => map,
        Some(other) => {
            return Err(CatalogError::field(
                index,
                "prices",
                format!("expected an object, got {}", json_type(other)),
            ))
        }
        None => return Err(CatalogError::field(index, "prices", "is required")),
    };

    if map.is_empty() {
        return Err(CatalogError::field(index, "prices", "must not be empty"));
    }

    map.iter()
        .map(|(label, value)| {
            let field = format!("prices.{}", label);
            non_negative(index, &field, value).map(|price| (label.clone(), price))
        })
        .collect()
}

fn availability(index: usize, value: &Value) -> Result<Availability, CatalogError> {
    match value {
        Value::Bool(b) => Ok(Availability::All(*b)),
        Value::Object(map) => map
            .iter()
            .map(|(label, v)| match v {
                Value::Bool(b) => Ok((label.clone(), *b)),
                other => Err(CatalogError::field(
                    index,
                    format!("availability.{}", label),
                    format!("expected a boolean, got {}", json_type(other)),
                )),
            })
            .collect::<Result<BTreeMap<_, _>, _>>()
            .map(Availability::BySize),
        other => Err(CatalogError::field(
            index,
            "availability",
            format!("expected an object of booleans, got {}", json_type(other)),
        )),
    }
}

fn non_negative(index: usize, field: &str, value: &Value) -> Result<f64, CatalogError> {
    let number = value.as_f64().ok_or_else(|| {
        CatalogError::field(index, field, format!("expected a number, got {}", json_type(value)))
    })?;
    if !number.is_finite() {
        return Err(CatalogError::field(index, field, "must be finite"));
    }
    if number < 0.0 {
        return Err(CatalogError::field(index, field, "must not be negative"));
    }
    Ok(number)
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
