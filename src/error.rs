use crate::parse::{Method, path::BadPath};

#[derive(Debug, thiserror::Error)]
pub enum SerdeError {
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    JsonWithPath(#[from] serde_path_to_error::Error<serde_json::Error>),
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
    #[error(transparent)]
    YamlWithPath(#[from] serde_path_to_error::Error<serde_yaml::Error>),
}

/// A structurally invalid OpenAPI document.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("`{0}` isn't a valid OpenAPI version")]
    BadVersion(String, #[source] semver::Error),
    #[error("OpenAPI {0} isn't supported; expected 3.x")]
    UnsupportedVersion(semver::Version),
    #[error("`{} {resource}` doesn't declare any responses", .method.as_upper_str())]
    NoResponses { resource: String, method: Method },
}

/// Errors that abort generation for a whole document.
#[derive(Debug, miette::Diagnostic, thiserror::Error)]
pub enum GenerateError {
    #[error("`{} {resource}` has no tags; can't choose a client for it", .method.as_upper_str())]
    Untagged { resource: String, method: Method },
    #[error(
        "parameter `{name}` of `{} {resource}` has unsupported location `{location}`",
        .method.as_upper_str()
    )]
    UnsupportedParameterLocation {
        resource: String,
        method: Method,
        name: String,
        location: String,
    },
    #[error("`{resource}` isn't a valid path template")]
    BadPath {
        resource: String,
        #[source]
        #[diagnostic_source]
        source: BadPath,
    },
}
