use std::path::PathBuf;

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for document generation
#[derive(Debug)]
pub enum Error {
    ManifestError { file: PathBuf, message: String },
    InvalidArgument(String),
    /// Two manifest entries of the same kind share a name
    DuplicateDefinition { kind: &'static str, name: String },
    /// A handler declares a serializer that cannot be resolved
    SerializerClass { handler: String, serializer: String },
    /// An assembled descriptor violates the Swagger document structure
    Validation { location: String, message: String },
    /// Two different schema objects were generated under one definition key
    DefinitionCollision {
        key: String,
        /// Route and handler whose schema hit the existing key
        route: Option<String>,
    },
}

impl Error {
    pub(crate) fn validation(location: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Validation {
            location: location.into(),
            message: message.into(),
        }
    }

    /// Attach the route being described and its handler to a schema error.
    pub(crate) fn in_route(self, path: &str, handler: &str) -> Self {
        match self {
            Error::Validation { location, message } => Error::Validation {
                location: format!("paths.{}.{}", path, location),
                message: format!("{} (handler '{}')", message, handler),
            },
            Error::DefinitionCollision { key, .. } => Error::DefinitionCollision {
                key,
                route: Some(format!("paths.{} (handler '{}')", path, handler)),
            },
            other => other,
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Error::ManifestError { file, message } => {
                write!(f, "manifest error in {}: {}", file.display(), message)
            }
            Error::InvalidArgument(msg) => write!(f, "invalid argument: {}", msg),
            Error::DuplicateDefinition { kind, name } => {
                write!(f, "{} '{}' is defined more than once", kind, name)
            }
            Error::SerializerClass { handler, serializer } => write!(
                f,
                "handler '{}' declares serializer '{}' which cannot be resolved",
                handler, serializer
            ),
            Error::Validation { location, message } => {
                write!(f, "validation error at {}: {}", location, message)
            }
            Error::DefinitionCollision { key, route } => {
                write!(f, "definition '{}' is produced by two different serializers", key)?;
                if let Some(route) = route {
                    write!(f, " at {}", route)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_names_failing_handler() {
        let err = Error::SerializerClass {
            handler: "CigarViewSet".to_string(),
            serializer: "CigarSerializer".to_string(),
        };

        let message = err.to_string();
        assert!(message.contains("CigarViewSet"));
        assert!(message.contains("CigarSerializer"));
    }

    #[test]
    fn test_validation_location() {
        let err = Error::validation("definitions.FooRead.title", "must not be empty");
        assert_eq!(
            err.to_string(),
            "validation error at definitions.FooRead.title: must not be empty"
        );
    }

    #[test]
    fn test_in_route_names_path_and_handler() {
        let err = Error::validation("definitions", "binding class has an empty name")
            .in_route("/things/", "ThingView");
        assert_eq!(
            err.to_string(),
            "validation error at paths./things/.definitions: binding class has an empty name (handler 'ThingView')"
        );

        let err = Error::DefinitionCollision {
            key: "ThingRead".to_string(),
            route: None,
        }
        .in_route("/things/", "ThingView");
        assert_eq!(
            err.to_string(),
            "definition 'ThingRead' is produced by two different serializers at paths./things/ (handler 'ThingView')"
        );
    }

    #[test]
    fn test_in_route_keeps_other_errors() {
        let err = Error::SerializerClass {
            handler: "ThingView".to_string(),
            serializer: "Missing".to_string(),
        }
        .in_route("/things/", "ThingView");
        assert!(matches!(err, Error::SerializerClass { .. }));
    }
}
