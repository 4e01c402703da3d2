//! Route → operation descriptors.
//!
//! One [`OperationDescriptor`] is produced per allowed method of the route's handler.
//! Responses follow a fixed per-method status table; success codes (200–203) point at
//! the read projection of the handler's binding class and write methods receive a
//! `body` parameter pointing at the write projection.

use super::schema::SchemaMode;
use crate::error::Result;
use crate::flattener::{top_level_tag, RouteEntry};
use crate::handler::{ApiHandler, HttpMethod};
use crate::openapi_builder::{
    OperationDescriptor, ParameterDescriptor, ParameterLocation, ResponseDescriptor,
};
use crate::schema_generator::SchemaGenerator;
use indexmap::{IndexMap, IndexSet};
use log::debug;

/// Documented status codes of a method
pub fn status_codes(method: HttpMethod) -> &'static [u16] {
    match method {
        HttpMethod::Options | HttpMethod::Get => &[200, 404],
        HttpMethod::Post => &[201, 400],
        HttpMethod::Put | HttpMethod::Patch => &[200, 404, 400],
        HttpMethod::Delete => &[204, 404],
        HttpMethod::Head | HttpMethod::Trace => &[200],
    }
}

/// Standard HTTP reason phrase, used as the response description
pub fn reason_phrase(code: u16) -> &'static str {
    match code {
        200 => "OK",
        201 => "Created",
        202 => "Accepted",
        203 => "Non-Authoritative Information",
        204 => "No Content",
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        405 => "Method Not Allowed",
        500 => "Internal Server Error",
        _ => "",
    }
}

fn has_success_schema(code: u16) -> bool {
    (200..=203).contains(&code)
}

/// `{name}` tokens of a path template, in order and without repeats
pub fn path_parameters(path: &str) -> Vec<ParameterDescriptor> {
    let mut names = IndexSet::new();
    let mut rest = path;
    while let Some(start) = rest.find('{') {
        let after = &rest[start + 1..];
        let Some(end) = after.find('}') else {
            break;
        };
        let name = &after[..end];
        if !name.is_empty() {
            names.insert(name.to_string());
        }
        rest = &after[end + 1..];
    }

    names
        .into_iter()
        .map(|name| ParameterDescriptor {
            location: ParameterLocation::Path,
            name,
            description: None,
            required: true,
            param_type: "string".to_string(),
            schema: None,
        })
        .collect()
}

/// Describes the operations of one flattened route.
pub struct PathIntrospector<'a> {
    entry: &'a RouteEntry,
    base_path: &'a str,
}

impl<'a> PathIntrospector<'a> {
    /// `base_path` is the shared leading segment prefix used for tag derivation
    pub fn new(entry: &'a RouteEntry, base_path: &'a str) -> Self {
        Self { entry, base_path }
    }

    pub fn tags(&self) -> Vec<String> {
        top_level_tag(&self.entry.path, self.base_path)
            .into_iter()
            .collect()
    }

    pub fn describe(
        &self,
        schemas: &mut SchemaGenerator,
    ) -> Result<IndexMap<HttpMethod, OperationDescriptor>> {
        let handler = &self.entry.callback;
        let class = handler.serializer_class()?;
        let summary = handler.view_name();
        let description = handler.view_description();
        let tags = self.tags();
        let path_params = path_parameters(&self.entry.path);

        let mut operations = IndexMap::new();
        for method in handler.allowed_methods() {
            debug!("Describing {} {}", method, self.entry.path);

            let mut operation = OperationDescriptor::new(method, &summary);
            operation.description = description.clone();
            operation.tags = tags.clone();
            operation.parameters = path_params.clone();

            for &code in status_codes(method) {
                let schema = match &class {
                    Some(class) if has_success_schema(code) => {
                        Some(schemas.reference(class, SchemaMode::Read)?)
                    }
                    _ => None,
                };
                operation.responses.insert(
                    code.to_string(),
                    ResponseDescriptor {
                        description: reason_phrase(code).to_string(),
                        schema,
                    },
                );
            }

            if let Some(class) = class.as_ref().filter(|_| method.is_write()) {
                operation.parameters.push(ParameterDescriptor {
                    location: ParameterLocation::Body,
                    name: "body".to_string(),
                    description: None,
                    required: true,
                    param_type: "object".to_string(),
                    schema: Some(schemas.reference(class, SchemaMode::Write)?),
                });
            }

            if let Some(patch) = handler.overrides().get(&method) {
                debug!("Applying {} override for {}", method, self.entry.path);
                patch.apply(&mut operation);
            }

            operations.insert(method, operation);
        }

        Ok(operations)
    }
}
