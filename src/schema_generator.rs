use crate::binding::BindingClass;
use crate::error::{Error, Result};
use crate::introspector::schema::{describe_schema, SchemaMode};
use indexmap::IndexMap;
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

/// Prefix of every definition reference
pub const DEFINITIONS_PREFIX: &str = "#/definitions/";

/// Schema generator - collects the definitions referenced by operations
#[derive(Debug, Default)]
pub struct SchemaGenerator {
    /// Generated schemas keyed by definition name, in first-reference order
    definitions: IndexMap<String, SchemaObject>,
}

/// Swagger Schema Object describing one binding class
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaObject {
    /// Binding class name
    pub title: String,
    /// Binding class documentation
    pub description: String,
    /// Always "object"
    #[serde(rename = "type")]
    pub schema_type: String,
    /// Properties keyed by field name
    pub properties: IndexMap<String, PropertyObject>,
}

/// Property definition for object schemas
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyObject {
    /// Field name, used as the key in the parent's properties
    #[serde(skip)]
    pub name: String,
    /// Field help text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Swagger primitive type
    #[serde(rename = "type")]
    pub property_type: String,
    /// Format hint for string types
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    /// Default value, carried verbatim
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(rename = "minLength", default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u64>,
    #[serde(rename = "maxLength", default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum: Option<Number>,
    /// Whether a value must be supplied
    pub required: bool,
    /// Allowed values
    #[serde(rename = "enum", default, skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<Value>>,
}

/// Reference to a schema in the definitions section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaRef {
    #[serde(rename = "$ref")]
    pub reference: String,
}

impl SchemaRef {
    pub fn definition(key: &str) -> Self {
        Self {
            reference: format!("{}{}", DEFINITIONS_PREFIX, key),
        }
    }

    /// The definition key this reference points at, if it is a local definition
    pub fn definition_key(&self) -> Option<&str> {
        self.reference.strip_prefix(DEFINITIONS_PREFIX)
    }
}

impl SchemaGenerator {
    pub fn new() -> Self {
        debug!("Initializing SchemaGenerator");
        Self::default()
    }

    /// Describe `class` in `mode`, record it under its definition key and return a reference.
    ///
    /// Referencing the same class twice is a no-op. A different schema landing on an
    /// existing key is a [`Error::DefinitionCollision`].
    pub fn reference(&mut self, class: &BindingClass, mode: SchemaMode) -> Result<SchemaRef> {
        let schema = describe_schema(class, mode)?;
        let key = format!("{}{}", schema.title, mode.suffix());

        match self.definitions.get(&key) {
            Some(existing) if existing != &schema => {
                return Err(Error::DefinitionCollision { key, route: None });
            }
            Some(_) => {}
            None => {
                debug!("Adding definition: {}", key);
                self.definitions.insert(key.clone(), schema);
            }
        }

        Ok(SchemaRef::definition(&key))
    }

    pub fn definitions(&self) -> &IndexMap<String, SchemaObject> {
        &self.definitions
    }

    pub fn into_definitions(self) -> IndexMap<String, SchemaObject> {
        self.definitions
    }
}
