//! Binding class → Swagger Schema Object conversion.

use super::property::describe_property;
use crate::binding::{BindingClass, FieldDescriptor};
use crate::error::{Error, Result};
use crate::schema_generator::{PropertyObject, SchemaObject};
use indexmap::IndexMap;

/// Which projection of a binding class to describe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SchemaMode {
    /// Every declared field
    #[default]
    Unspecified,
    /// Fields visible in responses
    Read,
    /// Fields accepted in request bodies
    Write,
}

impl SchemaMode {
    /// Suffix appended to the class name to form the definition key
    pub fn suffix(&self) -> &'static str {
        match self {
            SchemaMode::Unspecified => "",
            SchemaMode::Read => "Read",
            SchemaMode::Write => "Write",
        }
    }
}

pub struct SchemaIntrospector<'a> {
    class: &'a BindingClass,
    mode: SchemaMode,
}

impl<'a> SchemaIntrospector<'a> {
    pub fn new(class: &'a BindingClass, mode: SchemaMode) -> Self {
        Self { class, mode }
    }

    pub fn title(&self) -> &str {
        &self.class.name
    }

    pub fn description(&self) -> String {
        self.class.description.trim().to_string()
    }

    pub fn fields(&self) -> Vec<(&'a String, &'a FieldDescriptor)> {
        match self.mode {
            SchemaMode::Unspecified => self.class.fields.iter().collect(),
            SchemaMode::Read => self.class.readable_fields().collect(),
            SchemaMode::Write => self.class.writable_fields().collect(),
        }
    }

    pub fn properties(&self) -> IndexMap<String, PropertyObject> {
        self.fields()
            .into_iter()
            .map(|(name, field)| (name.clone(), describe_property(name, field)))
            .collect()
    }

    pub fn describe(&self) -> Result<SchemaObject> {
        if self.title().trim().is_empty() {
            return Err(Error::validation(
                "definitions",
                "binding class has an empty name",
            ));
        }

        Ok(SchemaObject {
            title: self.title().to_string(),
            description: self.description(),
            schema_type: "object".to_string(),
            properties: self.properties(),
        })
    }
}

pub fn describe_schema(class: &BindingClass, mode: SchemaMode) -> Result<SchemaObject> {
    SchemaIntrospector::new(class, mode).describe()
}
