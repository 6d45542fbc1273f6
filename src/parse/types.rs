use std::{fmt::Display, str::FromStr};

use indexmap::IndexMap;
use serde::{
    Deserialize, Deserializer,
    de::{IgnoredAny, MapAccess},
};

use crate::error::{SerdeError, ValidationError};

use super::Schema;

/// An OpenAPI document.
///
/// The document is expected to be bundled: external references are
/// inlined, but `#/components/schemas/...` references may remain, and
/// are emitted as type names.
#[derive(Debug, Deserialize)]
pub struct Document {
    pub openapi: String,
    pub info: Info,
    pub paths: IndexMap<String, PathItem>,
    #[serde(default)]
    pub components: Option<Components>,
}

impl Document {
    /// Parse an OpenAPI document from a YAML or JSON string.
    pub fn from_yaml(yaml: &str) -> Result<Self, SerdeError> {
        let deserializer = serde_yaml::Deserializer::from_str(yaml);
        let result = serde_path_to_error::deserialize(deserializer)?;
        Ok(result)
    }

    /// Parse an OpenAPI document from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, SerdeError> {
        let deserializer = &mut serde_json::Deserializer::from_str(json);
        let result = serde_path_to_error::deserialize(deserializer)?;
        Ok(result)
    }

    /// Checks the structural rules that deserialization alone can't:
    /// the document must be OpenAPI 3, and every operation must
    /// declare at least one response.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let version = semver::Version::parse(self.openapi.trim())
            .map_err(|err| ValidationError::BadVersion(self.openapi.clone(), err))?;
        if version.major != 3 {
            return Err(ValidationError::UnsupportedVersion(version));
        }
        for (resource, item) in &self.paths {
            if let Some((method, _)) = item.operations().find(|(_, op)| op.responses.is_empty()) {
                return Err(ValidationError::NoResponses {
                    resource: resource.clone(),
                    method,
                });
            }
        }
        Ok(())
    }

    /// Returns an iterator over every operation in the document, in
    /// path declaration order, then method declaration order.
    pub fn operations(&self) -> impl Iterator<Item = (&str, Method, &Operation)> {
        self.paths.iter().flat_map(|(resource, item)| {
            item.operations()
                .map(move |(method, op)| (resource.as_str(), method, op))
        })
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct Info {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub version: String,
}

/// Operation definitions for a single path, in declaration order.
///
/// Keys that aren't HTTP methods, like `parameters` and `summary`,
/// are skipped.
#[derive(Debug, Default)]
pub struct PathItem(IndexMap<Method, Operation>);

impl PathItem {
    /// Returns an iterator over the operations for each HTTP method.
    pub fn operations(&self) -> impl Iterator<Item = (Method, &Operation)> {
        self.0.iter().map(|(&method, op)| (method, op))
    }
}

impl<'de> Deserialize<'de> for PathItem {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct Visitor;
        impl<'de> serde::de::Visitor<'de> for Visitor {
            type Value = PathItem;

            fn expecting(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str("a path item")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut operations = IndexMap::new();
                while let Some(key) = map.next_key::<String>()? {
                    match key.parse::<Method>() {
                        Ok(method) => {
                            operations.insert(method, map.next_value()?);
                        }
                        Err(_) => {
                            map.next_value::<IgnoredAny>()?;
                        }
                    }
                }
                Ok(PathItem(operations))
            }
        }
        deserializer.deserialize_map(Visitor)
    }
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Method {
    Get,
    Put,
    Post,
    Delete,
    Options,
    Head,
    Patch,
    Trace,
}

impl Method {
    /// Returns the lowercase method name, as it appears in a path item.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "get",
            Self::Put => "put",
            Self::Post => "post",
            Self::Delete => "delete",
            Self::Options => "options",
            Self::Head => "head",
            Self::Patch => "patch",
            Self::Trace => "trace",
        }
    }

    pub fn as_upper_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Put => "PUT",
            Self::Post => "POST",
            Self::Delete => "DELETE",
            Self::Options => "OPTIONS",
            Self::Head => "HEAD",
            Self::Patch => "PATCH",
            Self::Trace => "TRACE",
        }
    }

    /// Returns `true` if the k6 function for this method takes a
    /// request body argument.
    pub fn expects_body(self) -> bool {
        matches!(self, Self::Delete | Self::Patch | Self::Post | Self::Put)
    }
}

impl Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = BadMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "get" => Self::Get,
            "put" => Self::Put,
            "post" => Self::Post,
            "delete" => Self::Delete,
            "options" => Self::Options,
            "head" => Self::Head,
            "patch" => Self::Patch,
            "trace" => Self::Trace,
            _ => return Err(BadMethod),
        })
    }
}

/// An HTTP operation.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub operation_id: Option<String>,
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    #[serde(default)]
    pub request_body: Option<RequestBody>,
    #[serde(default, deserialize_with = "deserialize_responses")]
    pub responses: IndexMap<String, Response>,
}

impl Operation {
    /// Returns the representative response, used for documentation,
    /// return types, and status checks.
    ///
    /// Responses are assumed to be declared in ascending status order,
    /// with `default` last. The first response wins, unless it's
    /// `default` and there's another response after it.
    pub fn representative_response(&self) -> Option<(&str, &Response)> {
        let mut responses = self.responses.iter();
        let (status, response) = responses.next()?;
        match (status.as_str(), responses.next()) {
            ("default", Some((next, response))) => Some((next.as_str(), response)),
            _ => Some((status.as_str(), response)),
        }
    }
}

/// A path, query, header, or cookie parameter.
#[derive(Debug, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "in")]
    pub location: ParameterLocation,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub schema: Schema,
}

#[derive(Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(from = "String")]
pub enum ParameterLocation {
    Path,
    Query,
    Header,
    Cookie,
    /// A location that isn't part of OpenAPI 3.
    Unsupported(String),
}

impl From<String> for ParameterLocation {
    fn from(value: String) -> Self {
        match value.as_str() {
            "path" => Self::Path,
            "query" => Self::Query,
            "header" => Self::Header,
            "cookie" => Self::Cookie,
            _ => Self::Unsupported(value),
        }
    }
}

/// Request body definition.
#[derive(Debug, Default, Deserialize)]
pub struct RequestBody {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub content: IndexMap<String, MediaType>,
}

/// Response definition.
#[derive(Debug, Default, Deserialize)]
pub struct Response {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub content: Option<IndexMap<String, MediaType>>,
}

/// Media type content.
#[derive(Debug, Default, Deserialize)]
pub struct MediaType {
    #[serde(default)]
    pub schema: Schema,
}

/// Components section containing reusable schemas.
#[derive(Debug, Default, Deserialize)]
pub struct Components {
    #[serde(default)]
    pub schemas: IndexMap<String, Schema>,
}

/// Accepts both quoted (`'200':`) and bare (`200:`) status codes.
fn deserialize_responses<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<IndexMap<String, Response>, D::Error> {
    #[derive(Deserialize, Eq, Hash, PartialEq)]
    #[serde(untagged)]
    enum StatusKey {
        Code(u64),
        Text(String),
    }
    let responses = IndexMap::<StatusKey, Response>::deserialize(deserializer)?;
    Ok(responses
        .into_iter()
        .map(|(key, response)| {
            let key = match key {
                StatusKey::Code(code) => code.to_string(),
                StatusKey::Text(text) => text,
            };
            (key, response)
        })
        .collect())
}

#[derive(Debug, thiserror::Error)]
#[error("unknown HTTP method")]
pub struct BadMethod;

#[cfg(test)]
mod tests {
    use super::*;

    use crate::tests::assert_matches;

    #[test]
    fn test_path_item_preserves_method_order() {
        let doc = Document::from_yaml(indoc::indoc! {"
            openapi: 3.0.3
            info:
              title: Watering Hole
              version: 1.0.0
            paths:
              /beer:
                summary: Beers
                options:
                  responses:
                    default:
                      description: ''
                head:
                  responses:
                    default:
                      description: ''
                get:
                  responses:
                    default:
                      description: ''
                parameters: []
        "})
        .unwrap();

        let methods = doc.operations().map(|(_, method, _)| method).collect::<Vec<_>>();
        assert_eq!(methods, [Method::Options, Method::Head, Method::Get]);
    }

    #[test]
    fn test_missing_info_is_invalid() {
        let result = Document::from_yaml(indoc::indoc! {"
            openapi: 3.0.0
            paths: {}
        "});
        assert_matches!(result, Err(SerdeError::YamlWithPath(_)));
    }

    #[test]
    fn test_missing_paths_is_invalid() {
        let result = Document::from_json(r#"{"openapi": "3.0.0", "info": {"title": "t", "version": "1"}}"#);
        assert_matches!(result, Err(SerdeError::JsonWithPath(_)));
    }

    #[test]
    fn test_unsupported_parameter_location() {
        let doc = Document::from_yaml(indoc::indoc! {"
            openapi: 3.0.0
            info:
              title: Test API
              version: 1.0.0
            paths:
              /beer:
                get:
                  parameters:
                    - name: id
                      in: body
                  responses:
                    default:
                      description: ''
        "})
        .unwrap();

        let (_, _, op) = doc.operations().next().unwrap();
        assert_eq!(
            op.parameters[0].location,
            ParameterLocation::Unsupported("body".to_owned())
        );
    }

    #[test]
    fn test_representative_response_prefers_concrete_status() {
        let doc = Document::from_yaml(indoc::indoc! {"
            openapi: 3.0.0
            info:
              title: Test API
              version: 1.0.0
            paths:
              /only-default:
                get:
                  responses:
                    default:
                      description: Fallback
              /default-first:
                get:
                  responses:
                    default:
                      description: Fallback
                    '201':
                      description: Created
              /ascending:
                get:
                  responses:
                    '200':
                      description: OK
                    '404':
                      description: Not found
                    default:
                      description: Fallback
        "})
        .unwrap();

        let statuses = doc
            .operations()
            .map(|(_, _, op)| op.representative_response().map(|(status, _)| status))
            .collect::<Vec<_>>();
        assert_eq!(statuses, [Some("default"), Some("201"), Some("200")]);
    }

    #[test]
    fn test_validate_version() {
        let doc = Document::from_yaml(indoc::indoc! {"
            openapi: 2.0.0
            info:
              title: Test API
              version: 1.0.0
            paths: {}
        "})
        .unwrap();
        assert_matches!(doc.validate(), Err(ValidationError::UnsupportedVersion(_)));

        let doc = Document::from_yaml(indoc::indoc! {"
            openapi: three
            info:
              title: Test API
              version: 1.0.0
            paths: {}
        "})
        .unwrap();
        assert_matches!(doc.validate(), Err(ValidationError::BadVersion(..)));
    }

    #[test]
    fn test_validate_requires_responses() {
        let doc = Document::from_yaml(indoc::indoc! {"
            openapi: 3.0.3
            info:
              title: Test API
              version: 1.0.0
            paths:
              /beer:
                get:
                  tags: [beer]
        "})
        .unwrap();
        assert_matches!(
            doc.validate(),
            Err(ValidationError::NoResponses {
                method: Method::Get,
                ..
            })
        );
    }
}
