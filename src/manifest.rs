//! Route manifests: the declarative description of an application.
//!
//! The raw serde model mirrors the manifest files. [`Application::from_manifests`] merges
//! any number of parsed manifests and resolves names into the typed route tree
//! ([`UrlPattern`]), handlers and binding classes.
//!
//! Resolution is strict about structure and lenient about references that only matter at
//! generation time:
//!
//! - duplicate serializer, view, router or urlconf names are errors
//! - include cycles and references to unknown urlconfs or routers are errors
//! - an unknown view name becomes [`View::Unresolved`], which the flattener skips
//! - an unknown serializer name becomes [`SerializerRef::Missing`], which fails generation
//!   only for the handler that declares it

use crate::binding::{BindingClass, FieldDescriptor, FieldKind};
use crate::error::{Error, Result};
use crate::handler::{
    BoundController, CustomAction, HandlerRef, HttpMethod, Overrides, ResourceController,
    SerializerRef, SingleAction,
};
use crate::openapi_builder::{generate_document, SwaggerDocument};
use crate::parser::ParsedManifest;
use crate::router::DefaultRouter;
use crate::routes::{IncludePattern, RoutePattern, UrlPattern, View};
use crate::settings::Settings;
use indexmap::IndexMap;
use log::{debug, info, warn};
use serde::Deserialize;
use serde_json::{Number, Value};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// One manifest file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    #[serde(default)]
    pub settings: Option<Settings>,
    #[serde(default)]
    pub serializers: IndexMap<String, SerializerDef>,
    #[serde(default)]
    pub views: IndexMap<String, ViewDef>,
    #[serde(default)]
    pub routers: IndexMap<String, RouterDef>,
    #[serde(default)]
    pub urlconfs: IndexMap<String, Vec<PatternDef>>,
    #[serde(default)]
    pub urlpatterns: Vec<PatternDef>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SerializerDef {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub fields: IndexMap<String, FieldDef>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldDef {
    pub kind: String,
    #[serde(default)]
    pub help_text: Option<String>,
    #[serde(default)]
    pub default: Option<Value>,
    #[serde(default)]
    pub required: Option<bool>,
    #[serde(default)]
    pub allow_null: Option<bool>,
    #[serde(default)]
    pub allow_blank: Option<bool>,
    #[serde(default)]
    pub read_only: bool,
    #[serde(default)]
    pub write_only: bool,
    #[serde(default)]
    pub min_length: Option<u64>,
    #[serde(default)]
    pub max_length: Option<u64>,
    #[serde(default)]
    pub min_value: Option<Number>,
    #[serde(default)]
    pub max_value: Option<Number>,
    #[serde(default)]
    pub choices: Option<Vec<Value>>,
}

impl FieldDef {
    fn to_descriptor(&self) -> FieldDescriptor {
        let mut field = FieldDescriptor::new(FieldKind::from_name(&self.kind));
        if let Some(help_text) = &self.help_text {
            field = field.help_text(help_text.clone());
        }
        if let Some(default) = &self.default {
            field = field.default_value(default.clone());
        }
        if self.read_only {
            field = field.read_only();
        }
        if self.write_only {
            field = field.write_only();
        }
        if let Some(required) = self.required {
            field = field.required(required);
        }
        if let Some(allow_null) = self.allow_null {
            field = field.allow_null(allow_null);
        }
        if let Some(allow_blank) = self.allow_blank {
            field = field.allow_blank(allow_blank);
        }
        field.min_length = self.min_length;
        field.max_length = self.max_length;
        field.min_value = self.min_value.clone();
        field.max_value = self.max_value.clone();
        field.choices = self.choices.clone();
        field
    }
}

/// A handler declaration, tagged by `kind`
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ViewDef {
    ApiView {
        #[serde(default)]
        description: String,
        #[serde(default)]
        methods: Vec<HttpMethod>,
        #[serde(default)]
        serializer: Option<String>,
        #[serde(default)]
        overrides: Overrides,
    },
    Viewset {
        #[serde(default)]
        description: String,
        #[serde(default)]
        serializer: Option<String>,
        /// Standard actions; all six when absent
        #[serde(default)]
        actions: Option<Vec<String>>,
        #[serde(default)]
        extra_actions: Vec<CustomActionDef>,
        #[serde(default)]
        overrides: Overrides,
        #[serde(default)]
        lookup_field: Option<String>,
    },
    Template,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CustomActionDef {
    pub name: String,
    #[serde(default = "default_action_methods")]
    pub methods: Vec<HttpMethod>,
    #[serde(default = "default_detail")]
    pub detail: bool,
    #[serde(default)]
    pub url_path: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

fn default_action_methods() -> Vec<HttpMethod> {
    vec![HttpMethod::Get]
}

fn default_detail() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RouterDef {
    #[serde(default = "default_format_suffixes")]
    pub format_suffixes: bool,
    #[serde(default)]
    pub register: Vec<Registration>,
}

fn default_format_suffixes() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Registration {
    pub prefix: String,
    pub viewset: String,
}

/// One URL pattern entry.
///
/// The shape decides the kind: an `include` key makes an include, a `router` key mounts a
/// router, and a `view` key makes a terminal route. Keys of one shape are rejected in
/// another, so an entry cannot be both an include and a route.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PatternDef {
    Include(IncludeDef),
    Router(RouterMountDef),
    Route(RouteDef),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IncludeDef {
    pub regex: String,
    pub include: IncludeTarget,
    #[serde(default)]
    pub namespace: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RouterMountDef {
    pub regex: String,
    pub router: String,
    #[serde(default)]
    pub namespace: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RouteDef {
    pub regex: String,
    pub view: String,
    #[serde(default)]
    pub name: Option<String>,
    /// Method→action table when `view` names a viewset
    #[serde(default)]
    pub actions: IndexMap<HttpMethod, String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum IncludeTarget {
    Inline(Vec<PatternDef>),
    Urlconf(String),
}

/// A resolved view declaration
#[derive(Debug, Clone)]
enum Declared {
    Single(Arc<SingleAction>),
    Controller(Arc<ResourceController>),
    Template,
}

/// Value tagged with the manifest file that declared it
#[derive(Debug, Clone)]
struct Sourced<T> {
    file: PathBuf,
    value: T,
}

/// A fully resolved application: settings plus the root route tree.
#[derive(Debug, Clone, Default)]
pub struct Application {
    pub settings: Settings,
    pub urlpatterns: Vec<UrlPattern>,
}

impl Application {
    /// Merge and resolve parsed manifests, in the given order.
    pub fn from_manifests(manifests: &[ParsedManifest]) -> Result<Self> {
        let mut settings: Option<Sourced<Settings>> = None;
        let mut serializers: IndexMap<String, Sourced<SerializerDef>> = IndexMap::new();
        let mut views: IndexMap<String, Sourced<ViewDef>> = IndexMap::new();
        let mut routers: IndexMap<String, Sourced<RouterDef>> = IndexMap::new();
        let mut urlconfs: IndexMap<String, Sourced<Vec<PatternDef>>> = IndexMap::new();
        let mut roots: Vec<Sourced<Vec<PatternDef>>> = Vec::new();

        for parsed in manifests {
            let file = &parsed.path;
            let manifest = &parsed.manifest;
            debug!("Merging manifest {}", file.display());

            if let Some(declared) = &manifest.settings {
                if let Some(existing) = &settings {
                    return Err(Error::DuplicateDefinition {
                        kind: "settings block",
                        name: format!("{} and {}", existing.file.display(), file.display()),
                    });
                }
                settings = Some(Sourced {
                    file: file.clone(),
                    value: declared.clone(),
                });
            }

            merge_named(&mut serializers, "serializer", file, &manifest.serializers)?;
            merge_named(&mut views, "view", file, &manifest.views)?;
            merge_named(&mut routers, "router", file, &manifest.routers)?;
            merge_named(&mut urlconfs, "urlconf", file, &manifest.urlconfs)?;

            roots.push(Sourced {
                file: file.clone(),
                value: manifest.urlpatterns.clone(),
            });
        }

        let classes: IndexMap<String, Arc<BindingClass>> = serializers
            .iter()
            .map(|(name, def)| (name.clone(), Arc::new(build_class(name, &def.value))))
            .collect();

        let declared: IndexMap<String, Declared> = views
            .iter()
            .map(|(name, def)| (name.clone(), build_view(name, &def.value, &classes)))
            .collect();

        let mut mounted = IndexMap::new();
        for (name, def) in &routers {
            mounted.insert(name.clone(), build_router(name, def, &declared)?);
        }

        let resolver = Resolver {
            views: &declared,
            routers: &mounted,
            urlconfs: &urlconfs,
        };
        let mut urlpatterns = Vec::new();
        for root in &roots {
            urlpatterns.extend(resolver.resolve(&root.file, &root.value, &mut Vec::new())?);
        }

        info!(
            "Resolved {} serializers, {} views and {} root patterns",
            classes.len(),
            declared.len(),
            urlpatterns.len()
        );

        Ok(Self {
            settings: settings.map(|s| s.value).unwrap_or_default(),
            urlpatterns,
        })
    }

    /// Generate the Swagger document for this application
    pub fn generate(&self) -> Result<SwaggerDocument> {
        generate_document(&self.urlpatterns, &self.settings)
    }
}

fn merge_named<T: Clone>(
    target: &mut IndexMap<String, Sourced<T>>,
    kind: &'static str,
    file: &Path,
    items: &IndexMap<String, T>,
) -> Result<()> {
    for (name, value) in items {
        if target.contains_key(name) {
            return Err(Error::DuplicateDefinition {
                kind,
                name: name.clone(),
            });
        }
        target.insert(
            name.clone(),
            Sourced {
                file: file.to_path_buf(),
                value: value.clone(),
            },
        );
    }
    Ok(())
}

fn build_class(name: &str, def: &SerializerDef) -> BindingClass {
    def.fields.iter().fold(
        BindingClass::new(name).with_description(def.description.clone()),
        |class, (field_name, field)| class.with_field(field_name.clone(), field.to_descriptor()),
    )
}

fn serializer_ref(
    name: Option<&String>,
    classes: &IndexMap<String, Arc<BindingClass>>,
) -> Option<SerializerRef> {
    name.map(|name| match classes.get(name) {
        Some(class) => SerializerRef::Resolved(Arc::clone(class)),
        None => {
            warn!("Serializer '{}' is not declared", name);
            SerializerRef::Missing(name.clone())
        }
    })
}

fn build_view(name: &str, def: &ViewDef, classes: &IndexMap<String, Arc<BindingClass>>) -> Declared {
    match def {
        ViewDef::ApiView {
            description,
            methods,
            serializer,
            overrides,
        } => {
            let mut view = SingleAction::new(name)
                .with_description(description.clone())
                .with_methods(methods.iter().copied());
            view.serializer = serializer_ref(serializer.as_ref(), classes);
            view.overrides = overrides.clone();
            Declared::Single(Arc::new(view))
        }
        ViewDef::Viewset {
            description,
            serializer,
            actions,
            extra_actions,
            overrides,
            lookup_field,
        } => {
            let mut controller = ResourceController::new(name).with_description(description.clone());
            controller.serializer = serializer_ref(serializer.as_ref(), classes);
            if let Some(actions) = actions {
                controller = controller.with_actions(actions.iter().cloned());
            }
            for action in extra_actions {
                controller = controller.with_extra_action(CustomAction {
                    name: action.name.clone(),
                    methods: action.methods.clone(),
                    detail: action.detail,
                    url_path: action.url_path.clone(),
                    description: action.description.clone(),
                });
            }
            if let Some(lookup_field) = lookup_field {
                controller = controller.with_lookup_field(lookup_field.clone());
            }
            controller.overrides = overrides.clone();
            Declared::Controller(Arc::new(controller))
        }
        ViewDef::Template => Declared::Template,
    }
}

fn build_router(
    name: &str,
    def: &Sourced<RouterDef>,
    views: &IndexMap<String, Declared>,
) -> Result<Vec<UrlPattern>> {
    let mut router = DefaultRouter::new().with_format_suffixes(def.value.format_suffixes);
    for registration in &def.value.register {
        match views.get(&registration.viewset) {
            Some(Declared::Controller(controller)) => {
                router.register(registration.prefix.clone(), Arc::clone(controller));
            }
            _ => {
                return Err(Error::ManifestError {
                    file: def.file.clone(),
                    message: format!(
                        "router '{}' registers '{}', which is not a declared viewset",
                        name, registration.viewset
                    ),
                });
            }
        }
    }
    Ok(router.urls())
}

struct Resolver<'a> {
    views: &'a IndexMap<String, Declared>,
    routers: &'a IndexMap<String, Vec<UrlPattern>>,
    urlconfs: &'a IndexMap<String, Sourced<Vec<PatternDef>>>,
}

impl Resolver<'_> {
    /// Resolve pattern definitions; `stack` holds the urlconfs currently being expanded.
    fn resolve(&self, file: &Path, defs: &[PatternDef], stack: &mut Vec<String>) -> Result<Vec<UrlPattern>> {
        let mut patterns = Vec::with_capacity(defs.len());

        for def in defs {
            let pattern = match def {
                PatternDef::Route(RouteDef {
                    regex,
                    view,
                    name,
                    actions,
                }) => UrlPattern::Route(RoutePattern {
                    regex: regex.clone(),
                    name: name.clone(),
                    view: self.view(view, actions),
                }),
                PatternDef::Include(IncludeDef {
                    regex,
                    include,
                    namespace,
                }) => {
                    let nested = match include {
                        IncludeTarget::Inline(inline) => self.resolve(file, inline, stack)?,
                        IncludeTarget::Urlconf(urlconf) => self.urlconf(file, urlconf, stack)?,
                    };
                    UrlPattern::Include(IncludePattern {
                        regex: regex.clone(),
                        namespace: namespace.clone(),
                        patterns: nested,
                    })
                }
                PatternDef::Router(RouterMountDef {
                    regex,
                    router,
                    namespace,
                }) => {
                    let Some(urls) = self.routers.get(router) else {
                        return Err(Error::ManifestError {
                            file: file.to_path_buf(),
                            message: format!("unknown router '{}'", router),
                        });
                    };
                    UrlPattern::Include(IncludePattern {
                        regex: regex.clone(),
                        namespace: namespace.clone(),
                        patterns: urls.clone(),
                    })
                }
            };
            patterns.push(pattern);
        }

        Ok(patterns)
    }

    fn urlconf(&self, file: &Path, name: &str, stack: &mut Vec<String>) -> Result<Vec<UrlPattern>> {
        let Some(urlconf) = self.urlconfs.get(name) else {
            return Err(Error::ManifestError {
                file: file.to_path_buf(),
                message: format!("unknown urlconf '{}'", name),
            });
        };
        if stack.iter().any(|open| open == name) {
            return Err(Error::ManifestError {
                file: urlconf.file.clone(),
                message: format!("circular include: {} -> {}", stack.join(" -> "), name),
            });
        }

        stack.push(name.to_string());
        let resolved = self.resolve(&urlconf.file, &urlconf.value, stack);
        stack.pop();
        resolved
    }

    fn view(&self, name: &str, actions: &IndexMap<HttpMethod, String>) -> View {
        match self.views.get(name) {
            Some(Declared::Single(view)) => View::Api(HandlerRef::SingleAction(Arc::clone(view))),
            Some(Declared::Controller(controller)) if !actions.is_empty() => {
                View::Api(HandlerRef::ResourceController(BoundController::new(
                    Arc::clone(controller),
                    actions.clone(),
                    None,
                )))
            }
            Some(Declared::Controller(_)) => {
                warn!("Viewset '{}' is routed without an action table", name);
                View::Unresolved {
                    name: name.to_string(),
                }
            }
            Some(Declared::Template) => View::Template {
                name: name.to_string(),
            },
            None => {
                debug!("View '{}' is not declared", name);
                View::Unresolved {
                    name: name.to_string(),
                }
            }
        }
    }
}
