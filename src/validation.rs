//! Structural checks run on every assembled document.
//!
//! Errors carry a dotted location such as `paths./cigars/.get.summary` so the failing
//! route, handler override or binding class field can be found.

use crate::error::{Error, Result};
use crate::openapi_builder::{OperationDescriptor, SwaggerDocument};
use crate::schema_generator::{PropertyObject, SchemaObject, SchemaRef};
use log::debug;
use serde_json::{Number, Value};

/// Types allowed in `type` keys
pub const TYPES: [&str; 7] = ["array", "boolean", "integer", "number", "null", "object", "string"];

/// Formats allowed in `format` keys
pub const FORMATS: [&str; 14] = [
    "int32",
    "int64",
    "float",
    "double",
    "byte",
    "binary",
    "date",
    "date-time",
    "password",
    "email",
    "hostname",
    "ipv4",
    "ipv6",
    "uri",
];

pub const SCHEMES: [&str; 4] = ["http", "https", "ws", "wss"];

pub const MAX_SUMMARY_LENGTH: usize = 120;

/// Validate a whole document, including `$ref` closure.
pub fn validate_document(doc: &SwaggerDocument) -> Result<()> {
    debug!("Validating document");

    if doc.info.title.trim().is_empty() {
        return Err(Error::validation("info.title", "must not be empty"));
    }
    if doc.info.version.trim().is_empty() {
        return Err(Error::validation("info.version", "must not be empty"));
    }
    if let Some(license) = &doc.info.license {
        if license.name.trim().is_empty() {
            return Err(Error::validation("info.license.name", "must not be empty"));
        }
    }
    if let Some(schemes) = &doc.schemes {
        validate_schemes("schemes", schemes)?;
    }

    for (key, schema) in &doc.definitions {
        validate_schema(&format!("definitions.{}", key), schema)?;
    }

    for (path, item) in &doc.paths {
        for (method, operation) in item {
            let location = format!("paths.{}.{}", path, method.as_lowercase());
            validate_operation(&location, operation)?;
            for reference in operation_refs(operation) {
                check_reference(&location, reference, doc)?;
            }
        }
    }

    Ok(())
}

fn validate_schemes(location: &str, schemes: &[String]) -> Result<()> {
    match schemes.iter().find(|s| !SCHEMES.contains(&s.as_str())) {
        Some(bad) => Err(Error::validation(
            location,
            format!("unsupported scheme '{}'", bad),
        )),
        None => Ok(()),
    }
}

fn validate_operation(location: &str, operation: &OperationDescriptor) -> Result<()> {
    if operation.summary.chars().count() > MAX_SUMMARY_LENGTH {
        return Err(Error::validation(
            format!("{}.summary", location),
            format!("longer than {} characters", MAX_SUMMARY_LENGTH),
        ));
    }
    if let Some(schemes) = &operation.schemes {
        validate_schemes(&format!("{}.schemes", location), schemes)?;
    }
    for parameter in &operation.parameters {
        if !TYPES.contains(&parameter.param_type.as_str()) {
            return Err(Error::validation(
                format!("{}.parameters.{}", location, parameter.name),
                format!("unsupported type '{}'", parameter.param_type),
            ));
        }
    }
    for code in operation.responses.keys() {
        if code.parse::<u16>().is_err() && code != "default" {
            return Err(Error::validation(
                format!("{}.responses", location),
                format!("'{}' is not a status code", code),
            ));
        }
    }
    Ok(())
}

fn operation_refs(operation: &OperationDescriptor) -> impl Iterator<Item = &SchemaRef> {
    let params = operation.parameters.iter().filter_map(|p| p.schema.as_ref());
    let responses = operation.responses.values().filter_map(|r| r.schema.as_ref());
    params.chain(responses)
}

fn check_reference(location: &str, reference: &SchemaRef, doc: &SwaggerDocument) -> Result<()> {
    match reference.definition_key() {
        Some(key) if doc.definitions.contains_key(key) => Ok(()),
        _ => Err(Error::validation(
            location,
            format!("unresolved reference '{}'", reference.reference),
        )),
    }
}

fn validate_schema(location: &str, schema: &SchemaObject) -> Result<()> {
    if schema.title.trim().is_empty() {
        return Err(Error::validation(format!("{}.title", location), "must not be empty"));
    }
    if !TYPES.contains(&schema.schema_type.as_str()) {
        return Err(Error::validation(
            format!("{}.type", location),
            format!("unsupported type '{}'", schema.schema_type),
        ));
    }
    for (name, property) in &schema.properties {
        validate_property(&format!("{}.properties.{}", location, name), property)?;
    }
    Ok(())
}

fn validate_property(location: &str, property: &PropertyObject) -> Result<()> {
    if !TYPES.contains(&property.property_type.as_str()) {
        return Err(Error::validation(
            format!("{}.type", location),
            format!("unsupported type '{}'", property.property_type),
        ));
    }
    if let Some(format) = &property.format {
        if !FORMATS.contains(&format.as_str()) {
            return Err(Error::validation(
                format!("{}.format", location),
                format!("unsupported format '{}'", format),
            ));
        }
    }
    if let Some(values) = &property.enum_values {
        if values.iter().any(|v| matches!(v, Value::Array(_) | Value::Object(_))) {
            return Err(Error::validation(
                format!("{}.enum", location),
                "enum values must be scalars",
            ));
        }
    }
    if let (Some(min), Some(max)) = (property.min_length, property.max_length) {
        if min > max {
            return Err(Error::validation(
                location,
                format!("minLength {} exceeds maxLength {}", min, max),
            ));
        }
    }
    if let (Some(min), Some(max)) = (&property.minimum, &property.maximum) {
        if as_f64(min) > as_f64(max) {
            return Err(Error::validation(
                location,
                format!("minimum {} exceeds maximum {}", min, max),
            ));
        }
    }
    Ok(())
}

fn as_f64(number: &Number) -> f64 {
    number.as_f64().unwrap_or(f64::NAN)
}
