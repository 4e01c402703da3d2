//! Request handlers as seen by the introspector.
//!
//! Two handler shapes exist. A [`SingleAction`] handler declares a fixed set of HTTP methods.
//! A [`ResourceController`] implements named actions (`list`, `retrieve`, ...) and is bound
//! to a method→action table per route by the router, producing a [`BoundController`].
//! Both implement the [`ApiHandler`] capability through [`HandlerRef`].

use crate::binding::BindingClass;
use crate::error::{Error, Result};
use crate::openapi_builder::{OperationDescriptor, ParameterDescriptor, ResponseDescriptor};
use heck::ToTitleCase;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// HTTP methods a handler can accept.
///
/// The variant order is the canonical order in which operations are emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum HttpMethod {
    #[default]
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
    Trace,
}

impl HttpMethod {
    pub const ALL: [HttpMethod; 8] = [
        HttpMethod::Get,
        HttpMethod::Post,
        HttpMethod::Put,
        HttpMethod::Patch,
        HttpMethod::Delete,
        HttpMethod::Head,
        HttpMethod::Options,
        HttpMethod::Trace,
    ];

    /// Uppercase wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Head => "HEAD",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Trace => "TRACE",
        }
    }

    /// Lowercase name, as used for Swagger path item keys
    pub fn as_lowercase(&self) -> &'static str {
        match self {
            HttpMethod::Get => "get",
            HttpMethod::Post => "post",
            HttpMethod::Put => "put",
            HttpMethod::Patch => "patch",
            HttpMethod::Delete => "delete",
            HttpMethod::Head => "head",
            HttpMethod::Options => "options",
            HttpMethod::Trace => "trace",
        }
    }

    /// Methods that carry a request body
    pub fn is_write(&self) -> bool {
        matches!(self, HttpMethod::Post | HttpMethod::Put | HttpMethod::Patch)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        HttpMethod::ALL
            .iter()
            .copied()
            .find(|method| method.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::InvalidArgument(format!("unknown HTTP method '{}'", s)))
    }
}

impl TryFrom<String> for HttpMethod {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<HttpMethod> for String {
    fn from(method: HttpMethod) -> Self {
        method.as_lowercase().to_string()
    }
}

/// Per-method documentation overrides
pub type Overrides = IndexMap<HttpMethod, OperationOverride>;

/// Replacement values for an introspected operation.
///
/// Every field that is present replaces the introspected value as a whole.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct OperationOverride {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consumes: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub produces: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Vec<ParameterDescriptor>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub responses: Option<IndexMap<String, ResponseDescriptor>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schemes: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<bool>,
}

impl OperationOverride {
    pub fn apply(&self, operation: &mut OperationDescriptor) {
        if let Some(tags) = &self.tags {
            operation.tags = tags.clone();
        }
        if let Some(summary) = &self.summary {
            operation.summary = summary.clone();
        }
        if let Some(description) = &self.description {
            operation.description = description.clone();
        }
        if let Some(operation_id) = &self.operation_id {
            operation.operation_id = Some(operation_id.clone());
        }
        if let Some(consumes) = &self.consumes {
            operation.consumes = Some(consumes.clone());
        }
        if let Some(produces) = &self.produces {
            operation.produces = Some(produces.clone());
        }
        if let Some(parameters) = &self.parameters {
            operation.parameters = parameters.clone();
        }
        if let Some(responses) = &self.responses {
            operation.responses = responses.clone();
        }
        if let Some(schemes) = &self.schemes {
            operation.schemes = Some(schemes.clone());
        }
        if let Some(deprecated) = self.deprecated {
            operation.deprecated = deprecated;
        }
    }
}

/// A serializer reference that is resolved lazily.
///
/// Manifests may name a serializer that does not exist; the failure surfaces only when
/// a document is generated for a handler that uses it.
#[derive(Debug, Clone, PartialEq)]
pub enum SerializerRef {
    Resolved(Arc<BindingClass>),
    Missing(String),
}

impl SerializerRef {
    fn resolve(&self, handler: &str) -> Result<Arc<BindingClass>> {
        match self {
            SerializerRef::Resolved(class) => Ok(Arc::clone(class)),
            SerializerRef::Missing(name) => Err(Error::SerializerClass {
                handler: handler.to_string(),
                serializer: name.clone(),
            }),
        }
    }
}

/// The handler capability the endpoint introspector relies on.
pub trait ApiHandler {
    /// Declared type name, used in error messages
    fn handler_name(&self) -> &str;

    /// Human readable name, used as the operation summary
    fn view_name(&self) -> String;

    /// Documentation text, used as the operation description
    fn view_description(&self) -> String;

    /// Methods this handler accepts on its route, in canonical order
    fn allowed_methods(&self) -> Vec<HttpMethod>;

    /// The binding class describing request and response bodies, if any
    fn serializer_class(&self) -> Result<Option<Arc<BindingClass>>>;

    fn overrides(&self) -> &Overrides;

    /// Whether this is the router's synthetic index view
    fn is_api_root(&self) -> bool {
        false
    }
}

/// Turn a handler type name into display words, e.g. `CigarViewSet` into `Cigar`.
pub fn view_display_name(type_name: &str, suffix: Option<&str>) -> String {
    let name = type_name.strip_suffix("View").unwrap_or(type_name);
    let name = name.strip_suffix("ViewSet").unwrap_or(name);
    let mut display = name.to_title_case();
    if let Some(suffix) = suffix.filter(|s| !s.is_empty()) {
        if !display.is_empty() {
            display.push(' ');
        }
        display.push_str(suffix);
    }
    display
}

/// A handler with a fixed set of declared methods.
#[derive(Debug, Clone, Default)]
pub struct SingleAction {
    pub name: String,
    pub description: String,
    pub methods: Vec<HttpMethod>,
    pub serializer: Option<SerializerRef>,
    pub overrides: Overrides,
    pub api_root: bool,
}

impl SingleAction {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_methods(mut self, methods: impl IntoIterator<Item = HttpMethod>) -> Self {
        self.methods = methods.into_iter().collect();
        self
    }

    pub fn with_serializer(mut self, serializer: SerializerRef) -> Self {
        self.serializer = Some(serializer);
        self
    }

    pub fn with_override(mut self, method: HttpMethod, operation: OperationOverride) -> Self {
        self.overrides.insert(method, operation);
        self
    }

    pub fn as_api_root(mut self) -> Self {
        self.api_root = true;
        self
    }
}

impl ApiHandler for SingleAction {
    fn handler_name(&self) -> &str {
        &self.name
    }

    fn view_name(&self) -> String {
        view_display_name(&self.name, None)
    }

    fn view_description(&self) -> String {
        self.description.trim().to_string()
    }

    fn allowed_methods(&self) -> Vec<HttpMethod> {
        let mut methods = self.methods.clone();
        let has_primary = methods
            .iter()
            .any(|m| !matches!(m, HttpMethod::Options | HttpMethod::Head | HttpMethod::Trace));
        if !has_primary {
            methods.push(HttpMethod::Get);
        }
        methods.push(HttpMethod::Options);
        methods.sort();
        methods.dedup();
        methods
    }

    fn serializer_class(&self) -> Result<Option<Arc<BindingClass>>> {
        self.serializer
            .as_ref()
            .map(|serializer| serializer.resolve(&self.name))
            .transpose()
    }

    fn overrides(&self) -> &Overrides {
        &self.overrides
    }

    fn is_api_root(&self) -> bool {
        self.api_root
    }
}

/// An extra action attached to a resource controller.
#[derive(Debug, Clone, PartialEq)]
pub struct CustomAction {
    pub name: String,
    pub methods: Vec<HttpMethod>,
    /// Item-level (`true`) or collection-level (`false`)
    pub detail: bool,
    pub url_path: Option<String>,
    pub description: Option<String>,
}

impl CustomAction {
    /// An item-level action answering GET
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            methods: vec![HttpMethod::Get],
            detail: true,
            url_path: None,
            description: None,
        }
    }

    pub fn with_methods(mut self, methods: impl IntoIterator<Item = HttpMethod>) -> Self {
        self.methods = methods.into_iter().collect();
        self
    }

    pub fn collection_level(mut self) -> Self {
        self.detail = false;
        self
    }

    pub fn with_url_path(mut self, url_path: impl Into<String>) -> Self {
        self.url_path = Some(url_path.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Path segment appended to the controller's route
    pub fn path_suffix(&self) -> &str {
        self.url_path.as_deref().unwrap_or(&self.name)
    }
}

/// Standard actions implemented by a default resource controller.
pub const DEFAULT_ACTIONS: [&str; 6] = [
    "list",
    "create",
    "retrieve",
    "update",
    "partial_update",
    "destroy",
];

/// A controller implementing named actions over one resource.
#[derive(Debug, Clone)]
pub struct ResourceController {
    pub name: String,
    pub description: String,
    pub serializer: Option<SerializerRef>,
    /// Standard actions this controller implements
    pub actions: Vec<String>,
    pub extra_actions: Vec<CustomAction>,
    pub overrides: Overrides,
    pub lookup_field: String,
}

impl ResourceController {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            serializer: None,
            actions: DEFAULT_ACTIONS.iter().map(|a| a.to_string()).collect(),
            extra_actions: Vec::new(),
            overrides: Overrides::new(),
            lookup_field: "pk".to_string(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_serializer(mut self, serializer: SerializerRef) -> Self {
        self.serializer = Some(serializer);
        self
    }

    /// Restrict the standard actions, e.g. a read-only controller
    pub fn with_actions<I, S>(mut self, actions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.actions = actions.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_extra_action(mut self, action: CustomAction) -> Self {
        self.extra_actions.push(action);
        self
    }

    pub fn with_override(mut self, method: HttpMethod, operation: OperationOverride) -> Self {
        self.overrides.insert(method, operation);
        self
    }

    pub fn with_lookup_field(mut self, lookup_field: impl Into<String>) -> Self {
        self.lookup_field = lookup_field.into();
        self
    }

    /// Whether the controller has a handler for the named action
    pub fn implements(&self, action: &str) -> bool {
        self.actions.iter().any(|a| a == action)
            || self.extra_actions.iter().any(|a| a.name == action)
    }

    pub fn extra_action(&self, name: &str) -> Option<&CustomAction> {
        self.extra_actions.iter().find(|a| a.name == name)
    }
}

/// A resource controller bound to the method→action table of one route.
#[derive(Debug, Clone)]
pub struct BoundController {
    pub controller: Arc<ResourceController>,
    pub actions: IndexMap<HttpMethod, String>,
    /// Route role appended to the view name, e.g. `List` or `Instance`
    pub suffix: Option<String>,
}

impl BoundController {
    pub fn new(
        controller: Arc<ResourceController>,
        actions: IndexMap<HttpMethod, String>,
        suffix: Option<String>,
    ) -> Self {
        Self {
            controller,
            actions,
            suffix,
        }
    }
}

impl ApiHandler for BoundController {
    fn handler_name(&self) -> &str {
        &self.controller.name
    }

    fn view_name(&self) -> String {
        view_display_name(&self.controller.name, self.suffix.as_deref())
    }

    fn view_description(&self) -> String {
        let custom = self
            .actions
            .values()
            .filter_map(|action| self.controller.extra_action(action))
            .find_map(|action| action.description.as_deref());
        custom
            .unwrap_or(&self.controller.description)
            .trim()
            .to_string()
    }

    fn allowed_methods(&self) -> Vec<HttpMethod> {
        let mut methods: Vec<HttpMethod> = self
            .actions
            .iter()
            .filter(|(_, action)| self.controller.implements(action))
            .map(|(method, _)| *method)
            .collect();
        methods.sort();
        methods.dedup();
        methods
    }

    fn serializer_class(&self) -> Result<Option<Arc<BindingClass>>> {
        self.controller
            .serializer
            .as_ref()
            .map(|serializer| serializer.resolve(&self.controller.name))
            .transpose()
    }

    fn overrides(&self) -> &Overrides {
        &self.controller.overrides
    }
}

/// A handler reference stored on a route.
#[derive(Debug, Clone)]
pub enum HandlerRef {
    SingleAction(Arc<SingleAction>),
    ResourceController(BoundController),
}

impl HandlerRef {
    fn handler(&self) -> &dyn ApiHandler {
        match self {
            HandlerRef::SingleAction(view) => view.as_ref(),
            HandlerRef::ResourceController(bound) => bound,
        }
    }
}

impl ApiHandler for HandlerRef {
    fn handler_name(&self) -> &str {
        self.handler().handler_name()
    }

    fn view_name(&self) -> String {
        self.handler().view_name()
    }

    fn view_description(&self) -> String {
        self.handler().view_description()
    }

    fn allowed_methods(&self) -> Vec<HttpMethod> {
        self.handler().allowed_methods()
    }

    fn serializer_class(&self) -> Result<Option<Arc<BindingClass>>> {
        self.handler().serializer_class()
    }

    fn overrides(&self) -> &Overrides {
        self.handler().overrides()
    }

    fn is_api_root(&self) -> bool {
        self.handler().is_api_root()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::{FieldDescriptor, FieldKind};

    fn bound(controller: ResourceController, table: &[(HttpMethod, &str)]) -> BoundController {
        let actions = table
            .iter()
            .map(|(method, action)| (*method, action.to_string()))
            .collect();
        BoundController::new(Arc::new(controller), actions, Some("List".to_string()))
    }

    #[test]
    fn test_method_parsing_is_case_insensitive() {
        assert_eq!("get".parse::<HttpMethod>().unwrap(), HttpMethod::Get);
        assert_eq!("PATCH".parse::<HttpMethod>().unwrap(), HttpMethod::Patch);
        assert!("CONNECT".parse::<HttpMethod>().is_err());
    }

    #[test]
    fn test_method_serializes_lowercase() {
        let json = serde_json::to_string(&HttpMethod::Delete).unwrap();
        assert_eq!(json, "\"delete\"");
        let method: HttpMethod = serde_json::from_str("\"PUT\"").unwrap();
        assert_eq!(method, HttpMethod::Put);
    }

    #[test]
    fn test_view_display_name() {
        assert_eq!(view_display_name("CigarViewSet", Some("List")), "Cigar List");
        assert_eq!(view_display_name("ManufacturerDetailsView", None), "Manufacturer Details");
        assert_eq!(view_display_name("MyCustomView", None), "My Custom");
        assert_eq!(view_display_name("CigarViewSet", Some("Set Price")), "Cigar Set Price");
    }

    #[test]
    fn test_single_action_always_allows_options() {
        let view = SingleAction::new("MyCustomView").with_methods([HttpMethod::Post, HttpMethod::Get]);
        assert_eq!(
            view.allowed_methods(),
            vec![HttpMethod::Get, HttpMethod::Post, HttpMethod::Options]
        );
    }

    #[test]
    fn test_single_action_assumes_get() {
        let view = SingleAction::new("PingView");
        assert_eq!(view.allowed_methods(), vec![HttpMethod::Get, HttpMethod::Options]);
    }

    #[test]
    fn test_bound_controller_skips_unimplemented_actions() {
        let controller = ResourceController::new("CountryViewSet").with_actions(["list"]);
        let handler = bound(
            controller,
            &[(HttpMethod::Get, "list"), (HttpMethod::Post, "create")],
        );
        assert_eq!(handler.allowed_methods(), vec![HttpMethod::Get]);
    }

    #[test]
    fn test_bound_controller_custom_action_description() {
        let controller = ResourceController::new("CigarViewSet")
            .with_description("Cigar resource")
            .with_extra_action(CustomAction::new("set_price").with_description("Set a new price"));
        let handler = bound(controller, &[(HttpMethod::Post, "set_price")]);

        assert_eq!(handler.view_description(), "Set a new price");
        assert_eq!(handler.allowed_methods(), vec![HttpMethod::Post]);
    }

    #[test]
    fn test_missing_serializer_names_handler() {
        let controller = ResourceController::new("CigarViewSet")
            .with_serializer(SerializerRef::Missing("CigarSerializer".to_string()));
        let handler = bound(controller, &[(HttpMethod::Get, "list")]);

        let err = handler.serializer_class().unwrap_err();
        assert!(matches!(
            err,
            Error::SerializerClass { ref handler, .. } if handler == "CigarViewSet"
        ));
    }

    #[test]
    fn test_resolved_serializer() {
        let class = Arc::new(
            BindingClass::new("PingSerializer")
                .with_field("ok", FieldDescriptor::new(FieldKind::Boolean)),
        );
        let view = SingleAction::new("PingView")
            .with_serializer(SerializerRef::Resolved(Arc::clone(&class)));
        let resolved = view.serializer_class().unwrap().unwrap();
        assert_eq!(resolved.name, "PingSerializer");
    }

    #[test]
    fn test_override_replaces_present_keys_only() {
        let mut operation = OperationDescriptor::new(HttpMethod::Get, "Cigar List");
        operation.description = "introspected".to_string();

        let patch = OperationOverride {
            summary: Some("List all cigars".to_string()),
            deprecated: Some(true),
            ..Default::default()
        };
        patch.apply(&mut operation);

        assert_eq!(operation.summary, "List all cigars");
        assert_eq!(operation.description, "introspected");
        assert!(operation.deprecated);
    }
}
