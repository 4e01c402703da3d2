//! Binding classes: declarative descriptions of the fields a handler reads and writes.
//!
//! A [`BindingClass`] plays the role a serializer plays in a REST framework. It carries a
//! name, a documentation string and an ordered set of [`FieldDescriptor`]s. The schema
//! introspector turns these into Swagger schema objects, optionally projected onto the
//! fields visible on output (read) or accepted on input (write).
//!
//! # Example
//!
//! ```
//! use swagger_from_routes::binding::{BindingClass, FieldDescriptor, FieldKind};
//!
//! let cigar = BindingClass::new("CigarSerializer")
//!     .with_description("A hand rolled cigar.")
//!     .with_field("id", FieldDescriptor::new(FieldKind::Integer).read_only())
//!     .with_field("name", FieldDescriptor::new(FieldKind::Char).max_length(25));
//!
//! assert_eq!(cigar.readable_fields().count(), 2);
//! assert_eq!(cigar.writable_fields().count(), 1);
//! ```

use indexmap::IndexMap;
use serde_json::{Number, Value};

/// A serializer-like definition of input/output fields.
#[derive(Debug, Clone, PartialEq)]
pub struct BindingClass {
    /// Declared class name, used as the schema title
    pub name: String,
    /// Documentation text, used as the schema description
    pub description: String,
    /// Declared fields in declaration order
    pub fields: IndexMap<String, FieldDescriptor>,
}

impl BindingClass {
    /// Create an empty binding class
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            fields: IndexMap::new(),
        }
    }

    /// Set the documentation text
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Append a field
    pub fn with_field(mut self, name: impl Into<String>, field: FieldDescriptor) -> Self {
        self.fields.insert(name.into(), field);
        self
    }

    /// Fields that appear in output representations
    pub fn readable_fields(&self) -> impl Iterator<Item = (&String, &FieldDescriptor)> {
        self.fields.iter().filter(|(_, field)| !field.write_only)
    }

    /// Fields that are accepted on input
    pub fn writable_fields(&self) -> impl Iterator<Item = (&String, &FieldDescriptor)> {
        self.fields.iter().filter(|(_, field)| !field.read_only)
    }
}

/// The kind of a declared field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Boolean,
    NullBoolean,
    Char,
    Choice,
    MultipleChoice,
    Slug,
    Regex,
    Email,
    Url,
    Uuid,
    IpAddress,
    Date,
    DateTime,
    Time,
    Duration,
    Decimal,
    Float,
    Integer,
    Dict,
    Json,
    List,
    File,
    Image,
    SerializerMethod,
    Model,
    PrimaryKeyRelated,
    HyperlinkedRelated,
    /// The untyped base field
    Field,
    /// A kind this crate does not know about
    Other(String),
}

impl FieldKind {
    /// Resolve a kind from its manifest name.
    ///
    /// Both snake case names (`date_time`) and framework class names (`DateTimeField`)
    /// are accepted. Unknown names are kept as [`FieldKind::Other`].
    pub fn from_name(name: &str) -> Self {
        let normalized: String = name
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .flat_map(char::to_lowercase)
            .collect();
        let normalized = match normalized.strip_suffix("field") {
            Some(stripped) if !stripped.is_empty() => stripped.to_string(),
            _ => normalized,
        };

        match normalized.as_str() {
            "boolean" | "bool" => FieldKind::Boolean,
            "nullboolean" => FieldKind::NullBoolean,
            "char" | "string" | "text" => FieldKind::Char,
            "choice" => FieldKind::Choice,
            "multiplechoice" => FieldKind::MultipleChoice,
            "slug" => FieldKind::Slug,
            "regex" => FieldKind::Regex,
            "email" => FieldKind::Email,
            "url" => FieldKind::Url,
            "uuid" => FieldKind::Uuid,
            "ipaddress" => FieldKind::IpAddress,
            "date" => FieldKind::Date,
            "datetime" => FieldKind::DateTime,
            "time" => FieldKind::Time,
            "duration" => FieldKind::Duration,
            "decimal" => FieldKind::Decimal,
            "float" => FieldKind::Float,
            "integer" | "int" => FieldKind::Integer,
            "dict" => FieldKind::Dict,
            "json" => FieldKind::Json,
            "list" => FieldKind::List,
            "file" => FieldKind::File,
            "image" => FieldKind::Image,
            "serializermethod" | "method" => FieldKind::SerializerMethod,
            "model" => FieldKind::Model,
            "primarykeyrelated" => FieldKind::PrimaryKeyRelated,
            "hyperlinkedrelated" => FieldKind::HyperlinkedRelated,
            "field" => FieldKind::Field,
            _ => FieldKind::Other(name.to_string()),
        }
    }

    /// Whether the kind accepts an `allow_blank` flag
    pub fn is_text(&self) -> bool {
        matches!(
            self,
            FieldKind::Char
                | FieldKind::Choice
                | FieldKind::MultipleChoice
                | FieldKind::Slug
                | FieldKind::Regex
                | FieldKind::Email
                | FieldKind::Url
                | FieldKind::IpAddress
        )
    }
}

/// A single declared field of a [`BindingClass`].
///
/// Defaults follow the usual serializer conventions: a new field is required, does not
/// accept null and, for text kinds, does not accept blank values.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    pub kind: FieldKind,
    pub help_text: Option<String>,
    pub default: Option<Value>,
    pub required: bool,
    pub allow_null: bool,
    /// Only present for text kinds
    pub allow_blank: Option<bool>,
    pub read_only: bool,
    pub write_only: bool,
    pub min_length: Option<u64>,
    pub max_length: Option<u64>,
    pub min_value: Option<Number>,
    pub max_value: Option<Number>,
    /// Either bare values or `[value, label]` pairs
    pub choices: Option<Vec<Value>>,
}

impl FieldDescriptor {
    pub fn new(kind: FieldKind) -> Self {
        let allow_blank = if kind.is_text() { Some(false) } else { None };
        Self {
            kind,
            help_text: None,
            default: None,
            required: true,
            allow_null: false,
            allow_blank,
            read_only: false,
            write_only: false,
            min_length: None,
            max_length: None,
            min_value: None,
            max_value: None,
            choices: None,
        }
    }

    pub fn help_text(mut self, text: impl Into<String>) -> Self {
        self.help_text = Some(text.into());
        self
    }

    /// Set a default value; fields with a default are no longer required on input
    pub fn default_value(mut self, value: Value) -> Self {
        self.default = Some(value);
        self.required = false;
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn allow_null(mut self, allow_null: bool) -> Self {
        self.allow_null = allow_null;
        self
    }

    /// Ignored for non-text kinds
    pub fn allow_blank(mut self, allow_blank: bool) -> Self {
        if self.kind.is_text() {
            self.allow_blank = Some(allow_blank);
        }
        self
    }

    /// Mark the field output-only; read-only fields are never required
    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self.required = false;
        self
    }

    pub fn write_only(mut self) -> Self {
        self.write_only = true;
        self
    }

    pub fn min_length(mut self, length: u64) -> Self {
        self.min_length = Some(length);
        self
    }

    pub fn max_length(mut self, length: u64) -> Self {
        self.max_length = Some(length);
        self
    }

    pub fn min_value(mut self, value: impl Into<Number>) -> Self {
        self.min_value = Some(value.into());
        self
    }

    pub fn max_value(mut self, value: impl Into<Number>) -> Self {
        self.max_value = Some(value.into());
        self
    }

    pub fn choices(mut self, choices: Vec<Value>) -> Self {
        self.choices = Some(choices);
        self
    }
}
