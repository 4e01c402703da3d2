//! Field → Swagger Property Object conversion.

use crate::binding::{FieldDescriptor, FieldKind};
use crate::schema_generator::PropertyObject;
use serde_json::Value;

/// Swagger primitive type of a field kind
pub fn json_type(kind: &FieldKind) -> &'static str {
    match kind {
        FieldKind::Boolean | FieldKind::NullBoolean => "boolean",
        FieldKind::Decimal | FieldKind::Float => "number",
        FieldKind::Integer => "integer",
        FieldKind::Dict | FieldKind::Json => "object",
        FieldKind::List => "array",
        FieldKind::Char
        | FieldKind::Choice
        | FieldKind::MultipleChoice
        | FieldKind::Slug
        | FieldKind::Regex
        | FieldKind::Email
        | FieldKind::Url
        | FieldKind::Uuid
        | FieldKind::IpAddress
        | FieldKind::Date
        | FieldKind::DateTime
        | FieldKind::Time
        | FieldKind::Duration
        | FieldKind::SerializerMethod
        | FieldKind::Model
        | FieldKind::PrimaryKeyRelated
        | FieldKind::HyperlinkedRelated
        | FieldKind::File
        | FieldKind::Image
        | FieldKind::Field => "string",
        FieldKind::Other(_) => "string",
    }
}

/// Swagger format hint of a field kind
pub fn json_format(kind: &FieldKind) -> Option<&'static str> {
    match kind {
        FieldKind::Email => Some("email"),
        FieldKind::Date => Some("date"),
        FieldKind::DateTime => Some("date-time"),
        FieldKind::Url => Some("uri"),
        _ => None,
    }
}

/// Converts one declared field into a property object.
pub struct PropertyIntrospector<'a> {
    name: &'a str,
    field: &'a FieldDescriptor,
}

impl<'a> PropertyIntrospector<'a> {
    pub fn new(name: &'a str, field: &'a FieldDescriptor) -> Self {
        Self { name, field }
    }

    /// A field is required when it is declared required, rejects null, or rejects blank text.
    pub fn required(&self) -> bool {
        self.field.required || !self.field.allow_null || self.field.allow_blank == Some(false)
    }

    /// Choice values with `[value, label]` pairs reduced to their value
    pub fn enum_values(&self) -> Option<Vec<Value>> {
        let choices = self.field.choices.as_ref()?;
        let values: Vec<Value> = choices
            .iter()
            .filter_map(|choice| match choice {
                Value::Array(pair) => pair.first().cloned(),
                scalar => Some(scalar.clone()),
            })
            .collect();
        if values.is_empty() {
            None
        } else {
            Some(values)
        }
    }

    pub fn describe(&self) -> PropertyObject {
        PropertyObject {
            name: self.name.to_string(),
            description: self.field.help_text.clone(),
            property_type: json_type(&self.field.kind).to_string(),
            format: json_format(&self.field.kind).map(str::to_string),
            default: self.field.default.clone(),
            min_length: self.field.min_length,
            max_length: self.field.max_length,
            minimum: self.field.min_value.clone(),
            maximum: self.field.max_value.clone(),
            required: self.required(),
            enum_values: self.enum_values(),
        }
    }
}

pub fn describe_property(name: &str, field: &FieldDescriptor) -> PropertyObject {
    PropertyIntrospector::new(name, field).describe()
}
