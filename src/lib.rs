//! Swagger From Routes - Swagger 2.0 documents from a declared route table.
//!
//! A route tree of regex patterns, nested includes and router registrations is flattened
//! into concrete paths. Each path's handler is then introspected for its methods, summary,
//! description and binding class, and the result is assembled into a validated Swagger 2.0
//! document with `#/definitions` entries for request and response bodies.
//!
//! # Architecture
//!
//! 1. [`scanner`] - Collects manifest files below a directory
//! 2. [`parser`] - Reads YAML/JSON route manifests
//! 3. [`manifest`] - Merges manifests and resolves them into a route tree
//! 4. [`routes`], [`router`], [`handler`], [`binding`] - The route tree and what it points at
//! 5. [`flattener`] - Turns the route tree into concrete paths
//! 6. [`introspector`] - Describes operations, schemas and properties
//! 7. [`schema_generator`] - Owns the `definitions` registry
//! 8. [`openapi_builder`] - Assembles the document; [`validation`] checks it
//! 9. [`serializer`], [`ui`] - YAML/JSON output and a static Swagger UI bundle
//!
//! # Example Usage
//!
//! ```
//! use std::sync::Arc;
//! use swagger_from_routes::{
//!     binding::{BindingClass, FieldDescriptor, FieldKind},
//!     generate_document,
//!     handler::{ResourceController, SerializerRef},
//!     router::DefaultRouter,
//!     serializer::serialize_yaml,
//!     settings::Settings,
//! };
//!
//! let cigar = BindingClass::new("CigarSerializer")
//!     .with_field("id", FieldDescriptor::new(FieldKind::Integer).read_only())
//!     .with_field("name", FieldDescriptor::new(FieldKind::Char).max_length(25));
//! let viewset = ResourceController::new("CigarViewSet")
//!     .with_serializer(SerializerRef::Resolved(Arc::new(cigar)));
//!
//! let mut router = DefaultRouter::new();
//! router.register("cigars", Arc::new(viewset));
//!
//! let document = generate_document(&router.urls(), &Settings::default()).unwrap();
//! assert!(document.paths.contains_key("/cigars/{pk}/"));
//! assert!(document.definitions.contains_key("CigarSerializerRead"));
//!
//! println!("{}", serialize_yaml(&document).unwrap());
//! ```
//!
//! # Command-Line Interface
//!
//! For command-line usage, see the [`cli`] module.

pub mod binding;
pub mod cli;
pub mod error;
pub mod flattener;
pub mod handler;
pub mod introspector;
pub mod manifest;
pub mod openapi_builder;
pub mod parser;
pub mod router;
pub mod routes;
pub mod scanner;
pub mod schema_generator;
pub mod serializer;
pub mod settings;
pub mod ui;
pub mod validation;

pub use error::{Error, Result};
pub use openapi_builder::{generate_document, SwaggerDocument};
