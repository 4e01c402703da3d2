//! Automatic route generation for resource controllers.
//!
//! [`DefaultRouter`] expands each registered controller into the conventional
//! collection/item route pair plus one route per custom action, and prepends a
//! synthetic API root index view.

use crate::handler::{BoundController, HandlerRef, HttpMethod, ResourceController, SingleAction};
use crate::routes::{RoutePattern, UrlPattern, View};
use heck::ToTitleCase;
use indexmap::IndexMap;
use log::debug;
use std::sync::Arc;

/// Regex fragment matched by lookup path parameters
const LOOKUP_VALUE: &str = "[^/.]+";

/// Regex tail that matches a format suffix such as `.json`
const FORMAT_SUFFIX: &str = r"\.(?P<format>[a-z0-9]+)/?$";

#[derive(Debug, Clone)]
pub struct DefaultRouter {
    registry: Vec<(String, Arc<ResourceController>)>,
    format_suffixes: bool,
}

impl Default for DefaultRouter {
    fn default() -> Self {
        Self::new()
    }
}

impl DefaultRouter {
    pub fn new() -> Self {
        Self {
            registry: Vec::new(),
            format_suffixes: true,
        }
    }

    /// Emit a `.{format}` twin for every route (on by default)
    pub fn with_format_suffixes(mut self, enabled: bool) -> Self {
        self.format_suffixes = enabled;
        self
    }

    pub fn register(&mut self, prefix: impl Into<String>, controller: Arc<ResourceController>) {
        let prefix = prefix.into();
        debug!("Registering {} under '{}'", controller.name, prefix);
        self.registry.push((prefix, controller));
    }

    /// Generate the URL patterns for every registration.
    pub fn urls(&self) -> Vec<UrlPattern> {
        let root = SingleAction::new("APIRoot")
            .with_description("The default basic root view for the router")
            .with_methods([HttpMethod::Get])
            .as_api_root();
        let mut routes = vec![route(
            "^$".to_string(),
            HandlerRef::SingleAction(Arc::new(root)),
            "api-root",
        )];

        for (prefix, controller) in &self.registry {
            routes.extend(self.controller_routes(prefix, controller));
        }

        let patterns: Vec<UrlPattern> = if self.format_suffixes {
            routes
                .into_iter()
                .flat_map(|pattern| {
                    let twin = format_twin(&pattern);
                    [pattern, twin]
                })
                .collect()
        } else {
            routes
        };

        debug!("Router produced {} patterns", patterns.len());
        patterns
    }

    fn controller_routes(&self, prefix: &str, controller: &Arc<ResourceController>) -> Vec<UrlPattern> {
        let base = controller.name.trim_end_matches("ViewSet").to_lowercase();
        let lookup = format!("(?P<{}>{})", controller.lookup_field, LOOKUP_VALUE);
        let mut routes = Vec::new();

        let list = bind(
            controller,
            &[(HttpMethod::Get, "list"), (HttpMethod::Post, "create")],
            "List",
        );
        routes.push(route(
            format!("^{}/$", prefix),
            list,
            &format!("{}-list", base),
        ));

        for action in controller.extra_actions.iter().filter(|a| !a.detail) {
            routes.push(route(
                format!("^{}/{}/$", prefix, action.path_suffix()),
                bind_custom(controller, &action.name, &action.methods),
                &format!("{}-{}", base, action.path_suffix()),
            ));
        }

        let detail = bind(
            controller,
            &[
                (HttpMethod::Get, "retrieve"),
                (HttpMethod::Put, "update"),
                (HttpMethod::Patch, "partial_update"),
                (HttpMethod::Delete, "destroy"),
            ],
            "Instance",
        );
        routes.push(route(
            format!("^{}/{}/$", prefix, lookup),
            detail,
            &format!("{}-detail", base),
        ));

        for action in controller.extra_actions.iter().filter(|a| a.detail) {
            routes.push(route(
                format!("^{}/{}/{}/$", prefix, lookup, action.path_suffix()),
                bind_custom(controller, &action.name, &action.methods),
                &format!("{}-{}", base, action.path_suffix()),
            ));
        }

        routes
    }
}

fn route(regex: String, handler: HandlerRef, name: &str) -> UrlPattern {
    UrlPattern::Route(RoutePattern {
        regex,
        name: Some(name.to_string()),
        view: View::Api(handler),
    })
}

fn bind(controller: &Arc<ResourceController>, table: &[(HttpMethod, &str)], suffix: &str) -> HandlerRef {
    let actions: IndexMap<HttpMethod, String> = table
        .iter()
        .map(|(method, action)| (*method, action.to_string()))
        .collect();
    HandlerRef::ResourceController(BoundController::new(
        Arc::clone(controller),
        actions,
        Some(suffix.to_string()),
    ))
}

fn bind_custom(controller: &Arc<ResourceController>, action: &str, methods: &[HttpMethod]) -> HandlerRef {
    let actions = methods
        .iter()
        .map(|method| (*method, action.to_string()))
        .collect();
    HandlerRef::ResourceController(BoundController::new(
        Arc::clone(controller),
        actions,
        Some(action.to_title_case()),
    ))
}

fn format_twin(pattern: &UrlPattern) -> UrlPattern {
    match pattern {
        UrlPattern::Route(route) => {
            let stem = route.regex.trim_end_matches('$').trim_end_matches('/');
            UrlPattern::Route(RoutePattern {
                regex: format!("{}{}", stem, FORMAT_SUFFIX),
                name: route.name.clone(),
                view: route.view.clone(),
            })
        }
        UrlPattern::Include(_) => pattern.clone(),
    }
}
