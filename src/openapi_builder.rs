use crate::error::Result;
use crate::flattener::{base_path, RouteEntry, UrlFlattener};
use crate::handler::{ApiHandler, HttpMethod};
use crate::introspector::PathIntrospector;
use crate::routes::UrlPattern;
use crate::schema_generator::{SchemaGenerator, SchemaObject, SchemaRef};
use crate::settings::{Info, Settings};
use crate::validation::validate_document;
use indexmap::IndexMap;
use log::{debug, info};
use serde::{Deserialize, Serialize};

/// Swagger 2.0 document builder
pub struct SwaggerBuilder {
    /// Document-level settings
    settings: Settings,
    /// Shared leading path prefix, stripped before tag derivation
    base_path: String,
    /// Paths collection (URL path -> operations by method)
    paths: IndexMap<String, PathItem>,
}

/// All operations of a single path, keyed by lowercase method
pub type PathItem = IndexMap<HttpMethod, OperationDescriptor>;

/// Swagger Operation object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationDescriptor {
    /// The method this operation answers; it is the key in the path item
    #[serde(skip)]
    pub method: HttpMethod,
    /// Grouping tags
    #[serde(default)]
    pub tags: Vec<String>,
    /// Operation summary
    #[serde(default)]
    pub summary: String,
    /// Operation description
    #[serde(default)]
    pub description: String,
    /// Operation ID
    #[serde(rename = "operationId", default, skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consumes: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub produces: Option<Vec<String>>,
    /// Path and body parameters
    #[serde(default)]
    pub parameters: Vec<ParameterDescriptor>,
    /// Responses keyed by status code
    #[serde(default)]
    pub responses: IndexMap<String, ResponseDescriptor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schemes: Option<Vec<String>>,
    #[serde(default)]
    pub deprecated: bool,
}

impl OperationDescriptor {
    pub fn new(method: HttpMethod, summary: impl Into<String>) -> Self {
        Self {
            method,
            tags: Vec::new(),
            summary: summary.into(),
            description: String::new(),
            operation_id: None,
            consumes: None,
            produces: None,
            parameters: Vec::new(),
            responses: IndexMap::new(),
            schemes: None,
            deprecated: false,
        }
    }
}

/// Where a parameter is carried in the request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ParameterLocation {
    Query,
    Header,
    Path,
    FormData,
    Body,
}

/// Swagger Parameter object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterDescriptor {
    /// Parameter location
    #[serde(rename = "in")]
    pub location: ParameterLocation,
    /// Parameter name
    pub name: String,
    /// Parameter description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Whether the parameter is required
    #[serde(default)]
    pub required: bool,
    /// Swagger primitive type
    #[serde(rename = "type")]
    pub param_type: String,
    /// Body schema reference
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<SchemaRef>,
}

/// Swagger Response object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseDescriptor {
    /// Response description
    #[serde(default)]
    pub description: String,
    /// Response body schema reference
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<SchemaRef>,
}

/// Complete Swagger 2.0 document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwaggerDocument {
    /// Swagger version, always "2.0"
    pub swagger: String,
    /// API info
    pub info: Info,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(rename = "basePath", default, skip_serializing_if = "Option::is_none")]
    pub base_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schemes: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consumes: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub produces: Option<Vec<String>>,
    /// API paths
    pub paths: IndexMap<String, PathItem>,
    /// Schema definitions
    pub definitions: IndexMap<String, SchemaObject>,
}

impl SwaggerBuilder {
    /// Create a new builder for the given settings
    pub fn new(settings: Settings) -> Self {
        debug!("Initializing SwaggerBuilder");
        Self {
            settings,
            base_path: String::new(),
            paths: IndexMap::new(),
        }
    }

    /// Set the shared path prefix used when deriving tags
    pub fn with_base_path(mut self, base_path: impl Into<String>) -> Self {
        self.base_path = base_path.into();
        self
    }

    /// Add a flattened route to the document
    pub fn add_route(&mut self, entry: &RouteEntry, schema_gen: &mut SchemaGenerator) -> Result<()> {
        debug!("Adding route: {}", entry.path);

        let operations = PathIntrospector::new(entry, &self.base_path)
            .describe(schema_gen)
            .map_err(|e| e.in_route(&entry.path, entry.callback.handler_name()))?;
        let path_item = self.paths.entry(entry.path.clone()).or_default();
        for (method, operation) in operations {
            path_item.insert(method, operation);
        }
        Ok(())
    }

    /// Build and validate the final document
    pub fn build(self, schema_gen: SchemaGenerator) -> Result<SwaggerDocument> {
        debug!("Building final Swagger document");

        let settings = self.settings;
        let document = SwaggerDocument {
            swagger: "2.0".to_string(),
            info: settings.info,
            host: settings.host,
            base_path: settings.base_path,
            schemes: settings.schemes,
            consumes: settings.consumes,
            produces: settings.produces,
            paths: self.paths,
            definitions: schema_gen.into_definitions(),
        };

        validate_document(&document)?;
        Ok(document)
    }
}

/// Generate a complete Swagger document from a route tree.
///
/// Generation either returns a fully validated document or fails as a whole.
pub fn generate_document(patterns: &[UrlPattern], settings: &Settings) -> Result<SwaggerDocument> {
    let entries = UrlFlattener::new(settings.flatten_options()).flatten(patterns);
    let paths: Vec<&str> = entries.iter().map(|e| e.path.as_str()).collect();
    let base = base_path(&paths);
    debug!("Tag base path: '{}'", base);

    let mut schema_gen = SchemaGenerator::new();
    let mut builder = SwaggerBuilder::new(settings.clone()).with_base_path(base);
    for entry in &entries {
        builder.add_route(entry, &mut schema_gen)?;
    }

    let document = builder.build(schema_gen)?;
    info!(
        "Generated document with {} paths and {} definitions",
        document.paths.len(),
        document.definitions.len()
    );
    Ok(document)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::{BindingClass, FieldDescriptor, FieldKind};
    use crate::error::Error;
    use crate::handler::{
        CustomAction, HandlerRef, OperationOverride, ResourceController, SerializerRef, SingleAction,
    };
    use crate::router::DefaultRouter;
    use crate::routes::View;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::sync::Arc;

    fn cigar_serializer() -> SerializerRef {
        SerializerRef::Resolved(Arc::new(
            BindingClass::new("CigarSerializer")
                .with_description("Cigar details")
                .with_field("id", FieldDescriptor::new(FieldKind::Integer).read_only())
                .with_field("name", FieldDescriptor::new(FieldKind::Char).max_length(25))
                .with_field("price", FieldDescriptor::new(FieldKind::Decimal).min_value(0)),
        ))
    }

    fn cigar_patterns() -> Vec<UrlPattern> {
        let controller = ResourceController::new("CigarViewSet")
            .with_serializer(cigar_serializer())
            .with_extra_action(CustomAction::new("set_price").with_methods([HttpMethod::Post]));
        let mut router = DefaultRouter::new();
        router.register("cigars", Arc::new(controller));
        router.urls()
    }

    fn methods(doc: &SwaggerDocument, path: &str) -> Vec<HttpMethod> {
        doc.paths[path].keys().copied().collect()
    }

    #[test]
    fn test_new_builder_defaults() {
        let builder = SwaggerBuilder::new(Settings::default());
        assert!(builder.paths.is_empty());
        assert_eq!(builder.base_path, "");
    }

    #[test]
    fn test_empty_document() {
        let doc = generate_document(&[], &Settings::default()).unwrap();
        assert_eq!(doc.swagger, "2.0");
        assert_eq!(doc.info.title, "Generated API");
        assert!(doc.paths.is_empty());
        assert!(doc.definitions.is_empty());
    }

    #[test]
    fn test_cigar_router_document() {
        let doc = generate_document(&cigar_patterns(), &Settings::default()).unwrap();

        let paths: Vec<&str> = doc.paths.keys().map(String::as_str).collect();
        assert_eq!(paths, vec!["/cigars/", "/cigars/{pk}/", "/cigars/{pk}/set_price/"]);

        assert_eq!(methods(&doc, "/cigars/"), vec![HttpMethod::Get, HttpMethod::Post]);
        assert_eq!(
            methods(&doc, "/cigars/{pk}/"),
            vec![HttpMethod::Get, HttpMethod::Put, HttpMethod::Patch, HttpMethod::Delete]
        );
        assert_eq!(methods(&doc, "/cigars/{pk}/set_price/"), vec![HttpMethod::Post]);

        for item in doc.paths.values() {
            for operation in item.values() {
                assert_eq!(operation.tags, vec!["cigars"]);
            }
        }

        let keys: Vec<&str> = doc.definitions.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["CigarSerializerRead", "CigarSerializerWrite"]);
    }

    #[test]
    fn test_document_json_shape() {
        let doc = generate_document(&cigar_patterns(), &Settings::default()).unwrap();
        let value = serde_json::to_value(&doc).unwrap();

        assert_eq!(
            value["paths"]["/cigars/"]["post"]["responses"],
            json!({
                "201": {"description": "Created"},
                "400": {"description": "Bad Request"}
            })
        );
        assert_eq!(
            value["paths"]["/cigars/"]["get"]["responses"]["200"]["schema"],
            json!({"$ref": "#/definitions/CigarSerializerRead"})
        );
        assert_eq!(
            value["paths"]["/cigars/"]["post"]["parameters"],
            json!([{
                "in": "body",
                "name": "body",
                "required": true,
                "type": "object",
                "schema": {"$ref": "#/definitions/CigarSerializerWrite"}
            }])
        );
        assert_eq!(
            value["definitions"]["CigarSerializerWrite"]["properties"]
                .as_object()
                .map(|p| p.keys().cloned().collect::<Vec<_>>()),
            Some(vec!["name".to_string(), "price".to_string()])
        );
    }

    #[test]
    fn test_settings_carried_into_document() {
        let settings = Settings {
            host: Some("api.example.com".to_string()),
            base_path: Some("/v1".to_string()),
            schemes: Some(vec!["https".to_string()]),
            ..Default::default()
        };
        let doc = generate_document(&[], &settings).unwrap();

        assert_eq!(doc.host.as_deref(), Some("api.example.com"));
        assert_eq!(doc.base_path.as_deref(), Some("/v1"));
        assert_eq!(doc.schemes, Some(vec!["https".to_string()]));
    }

    #[test]
    fn test_generation_is_idempotent() {
        let patterns = cigar_patterns();
        let first = serde_json::to_string(&generate_document(&patterns, &Settings::default()).unwrap()).unwrap();
        let second = serde_json::to_string(&generate_document(&patterns, &Settings::default()).unwrap()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_invalid_override_fails_whole_generation() {
        let view = SingleAction::new("MyCustomView").with_override(
            HttpMethod::Get,
            OperationOverride {
                schemes: Some(vec!["ftp".to_string()]),
                ..Default::default()
            },
        );
        let patterns = vec![UrlPattern::route(
            "^custom/$",
            View::Api(HandlerRef::SingleAction(Arc::new(view))),
        )];

        let err = generate_document(&patterns, &Settings::default()).unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));
    }

    #[test]
    fn test_dangling_override_ref_fails() {
        let view = SingleAction::new("MyCustomView").with_override(
            HttpMethod::Get,
            OperationOverride {
                responses: Some(
                    [(
                        "200".to_string(),
                        ResponseDescriptor {
                            description: "OK".to_string(),
                            schema: Some(SchemaRef::definition("NowhereRead")),
                        },
                    )]
                    .into_iter()
                    .collect(),
                ),
                ..Default::default()
            },
        );
        let patterns = vec![UrlPattern::route(
            "^custom/$",
            View::Api(HandlerRef::SingleAction(Arc::new(view))),
        )];

        let err = generate_document(&patterns, &Settings::default()).unwrap_err();
        assert!(err.to_string().contains("NowhereRead"));
    }

    #[test]
    fn test_multiple_resources_get_own_tags() {
        let mut router = DefaultRouter::new();
        router.register("cigars", Arc::new(ResourceController::new("CigarViewSet")));
        router.register("jambalaya", Arc::new(ResourceController::new("JambalayaViewSet")));
        let patterns = vec![UrlPattern::include("^api/", router.urls())];

        let doc = generate_document(&patterns, &Settings::default()).unwrap();

        assert_eq!(doc.paths["/api/cigars/"][&HttpMethod::Get].tags, vec!["cigars"]);
        assert_eq!(doc.paths["/api/jambalaya/{pk}/"][&HttpMethod::Delete].tags, vec!["jambalaya"]);
    }

    fn thing_route(regex: &str, view: &str, class: BindingClass) -> UrlPattern {
        let view = SingleAction::new(view)
            .with_methods([HttpMethod::Get])
            .with_serializer(SerializerRef::Resolved(Arc::new(class)));
        UrlPattern::route(regex, View::Api(HandlerRef::SingleAction(Arc::new(view))))
    }

    #[test]
    fn test_empty_binding_class_name_names_route_and_handler() {
        let patterns = vec![thing_route("^things/$", "ThingView", BindingClass::new(""))];

        let err = generate_document(&patterns, &Settings::default()).unwrap_err();
        match &err {
            Error::Validation { location, .. } => assert_eq!(location, "paths./things/.definitions"),
            other => panic!("expected a validation error, got {:?}", other),
        }
        assert!(err.to_string().contains("ThingView"));
    }

    #[test]
    fn test_definition_collision_names_route_and_handler() {
        let patterns = vec![
            thing_route(
                "^things/$",
                "ThingView",
                BindingClass::new("Thing").with_field("id", FieldDescriptor::new(FieldKind::Integer)),
            ),
            thing_route(
                "^other-things/$",
                "OtherThingView",
                BindingClass::new("Thing").with_field("name", FieldDescriptor::new(FieldKind::Char)),
            ),
        ];

        let err = generate_document(&patterns, &Settings::default()).unwrap_err();
        assert!(matches!(err, Error::DefinitionCollision { ref key, .. } if key == "ThingRead"));
        let message = err.to_string();
        assert!(message.contains("paths./other-things/"));
        assert!(message.contains("OtherThingView"));
    }
}
