//! The declared route tree.

use crate::handler::HandlerRef;

/// One node of a URL configuration.
#[derive(Debug, Clone)]
pub enum UrlPattern {
    Route(RoutePattern),
    Include(IncludePattern),
}

impl UrlPattern {
    /// A terminal route
    pub fn route(regex: impl Into<String>, view: View) -> Self {
        UrlPattern::Route(RoutePattern {
            regex: regex.into(),
            name: None,
            view,
        })
    }

    /// A nested pattern list mounted under `regex`
    pub fn include(regex: impl Into<String>, patterns: Vec<UrlPattern>) -> Self {
        UrlPattern::Include(IncludePattern {
            regex: regex.into(),
            namespace: None,
            patterns,
        })
    }

    /// A namespaced nested pattern list
    pub fn namespaced(
        regex: impl Into<String>,
        namespace: impl Into<String>,
        patterns: Vec<UrlPattern>,
    ) -> Self {
        UrlPattern::Include(IncludePattern {
            regex: regex.into(),
            namespace: Some(namespace.into()),
            patterns,
        })
    }
}

/// A terminal route: a regex bound to a view.
#[derive(Debug, Clone)]
pub struct RoutePattern {
    pub regex: String,
    pub name: Option<String>,
    pub view: View,
}

#[derive(Debug, Clone)]
pub struct IncludePattern {
    pub regex: String,
    pub namespace: Option<String>,
    pub patterns: Vec<UrlPattern>,
}

/// What a terminal route dispatches to.
#[derive(Debug, Clone)]
pub enum View {
    /// A handler exposing the API capability
    Api(HandlerRef),
    /// A plain page renderer with no API surface
    Template { name: String },
    /// A reference that could not be resolved when the tree was built
    Unresolved { name: String },
}

impl View {
    /// The API handler behind this view, if it has one
    pub fn resolve(&self) -> Option<&HandlerRef> {
        match self {
            View::Api(handler) => Some(handler),
            View::Template { .. } | View::Unresolved { .. } => None,
        }
    }

    pub fn name(&self) -> String {
        use crate::handler::ApiHandler;

        match self {
            View::Api(handler) => handler.view_name(),
            View::Template { name } | View::Unresolved { name } => name.clone(),
        }
    }
}

impl From<HandlerRef> for View {
    fn from(handler: HandlerRef) -> Self {
        View::Api(handler)
    }
}
