//! Introspection of routes, binding classes and fields into Swagger objects.
//!
//! - [`path`]: one route → operation descriptors keyed by method
//! - [`schema`]: one binding class → schema object, per [`schema::SchemaMode`]
//! - [`property`]: one field → property object

pub mod path;
pub mod property;
pub mod schema;

pub use path::PathIntrospector;
pub use property::{describe_property, PropertyIntrospector};
pub use schema::{describe_schema, SchemaIntrospector, SchemaMode};
