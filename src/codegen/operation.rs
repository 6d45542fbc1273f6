use std::borrow::Cow;

use itertools::Itertools;
use unicase::UniCase;

use crate::{
    error::GenerateError,
    parse::{
        Method, Operation, Parameter, ParameterLocation, RequestBody, Response, Schema,
        path::{self, PathFragment, PathSegment},
    },
};

use super::{
    naming::{camel_case, split_by_newline, value_text},
    types::type_name,
};

/// The trailing request options argument, with its type.
const TYPED_PARAMS_ARG: &str = "params?: RefinedParams<RT> | null";
const PARAMS_ARG: &str = "params = undefined";

/// An operation that's been checked and prepared for emitting
/// as a client method.
#[derive(Debug)]
pub struct CodegenOperation<'a> {
    resource: &'a str,
    method: Method,
    op: &'a Operation,
    segments: Vec<PathSegment<'a>>,
    params: Vec<CodegenParameter<'a>>,
    body: Option<CodegenBody<'a>>,
}

impl<'a> CodegenOperation<'a> {
    pub fn new(resource: &'a str, method: Method, op: &'a Operation) -> Result<Self, GenerateError> {
        let segments = path::parse(resource).map_err(|source| GenerateError::BadPath {
            resource: resource.to_owned(),
            source,
        })?;
        let params = op
            .parameters
            .iter()
            .filter_map(|param| {
                let location = match &param.location {
                    ParameterLocation::Path => ArgumentLocation::Path,
                    ParameterLocation::Query => ArgumentLocation::Query,
                    ParameterLocation::Header | ParameterLocation::Cookie => return None,
                    ParameterLocation::Unsupported(location) => {
                        return Some(Err(GenerateError::UnsupportedParameterLocation {
                            resource: resource.to_owned(),
                            method,
                            name: param.name.clone(),
                            location: location.clone(),
                        }));
                    }
                };
                Some(Ok(CodegenParameter {
                    param,
                    location,
                    binding: camel_case(&param.name),
                }))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            resource,
            method,
            op,
            segments,
            params,
            body: op.request_body.as_ref().map(CodegenBody::new),
        })
    }

    #[inline]
    pub fn resource(&self) -> &'a str {
        self.resource
    }

    #[inline]
    pub fn method(&self) -> Method {
        self.method
    }

    /// Returns the method name before collisions are resolved.
    ///
    /// The `operationId` wins if there is one. Otherwise, the name comes
    /// from the last path segment that doesn't start with a parameter;
    /// if that segment is empty, or is exactly the client's tag, the
    /// HTTP method is used instead.
    pub fn base_name(&self, tag: &str) -> String {
        if let Some(id) = &self.op.operation_id {
            return camel_case(id);
        }
        let segment = self
            .segments
            .iter()
            .rev()
            .find(|segment| !segment.is_templated())
            .map(|segment| segment.to_string())
            .unwrap_or_default();
        if segment.is_empty() || segment == tag {
            return self.method.as_str().to_owned();
        }
        camel_case(&segment)
    }

    /// Returns the typed and untyped argument lists.
    ///
    /// Required parameters come first, followed by the request body,
    /// the optional parameters, and finally the request options.
    pub fn arguments(&self) -> Arguments {
        let mut required = Arguments::default();
        let mut optional = Arguments::default();
        for p in &self.params {
            let ty = type_name(&p.param.schema);
            if p.param.required {
                required.typed.push(format!("{}: {ty}", p.binding));
                required.untyped.push(p.binding.clone());
            } else {
                optional.typed.push(format!("{}?: {ty}", p.binding));
                optional.untyped.push(match p.param.schema.default_value() {
                    Some(default) => format!("{} = {}", p.binding, default_literal(default)),
                    None => p.binding.clone(),
                });
            }
        }
        optional.typed.push(TYPED_PARAMS_ARG.to_owned());
        optional.untyped.push(PARAMS_ARG.to_owned());

        if let Some(body) = &self.body {
            required
                .typed
                .push(format!("{}: {}", body.arg_name(), body.arg_type()));
            required.untyped.push(body.arg_name().into_owned());
        }

        required.typed.extend(optional.typed);
        required.untyped.extend(optional.untyped);
        required
    }

    /// Returns the representative response status and definition.
    #[inline]
    pub fn response(&self) -> Option<(&'a str, &'a Response)> {
        self.op.representative_response()
    }

    /// Returns the TypeScript type of the decoded response body, if the
    /// representative response has any content.
    pub fn response_type(&self) -> Option<Cow<'a, str>> {
        let (_, response) = self.response()?;
        let (_, media) = response.content.as_ref()?.first()?;
        Some(type_name(&media.schema))
    }

    /// Returns the status to check, or `None` if the representative
    /// response is the `default` response.
    pub fn checked_status(&self) -> Option<&'a str> {
        self.response()
            .map(|(status, _)| status)
            .filter(|&status| status != "default")
    }

    /// Returns the documentation comment for the method signature.
    pub fn doc_comment(&self) -> String {
        let mut lines = vec![format!(
            "   * {} {}",
            self.method.as_upper_str(),
            self.resource
        )];
        if let Some(summary) = non_empty(&self.op.summary) {
            lines.push(format!("@summary {}", continued(summary)));
        }
        if let Some(description) = non_empty(&self.op.description) {
            lines.push(format!("@description {}", continued(description)));
        }

        for p in &self.params {
            let default = p.param.schema.default_value().map(default_literal);
            match (default, non_empty(&p.param.description)) {
                (Some(default), None) => {
                    lines.push(format!("@param [{}={default}]", p.binding));
                }
                (Some(default), Some(description)) => lines.push(format!(
                    "@param [{}={default}] {}",
                    p.binding,
                    continued(description)
                )),
                (None, Some(description)) => {
                    lines.push(format!("@param {} {}", p.binding, continued(description)));
                }
                (None, None) => (),
            }
        }

        if let Some(body) = &self.body
            && let Some(description) = non_empty(&body.description)
        {
            lines.push(format!(
                "@param {} {}",
                body.arg_name(),
                continued(description)
            ));
        }

        lines.push("@param [params=undefined] Request parameters.".to_owned());

        if let Some((_, response)) = self.response()
            && let Some(description) = non_empty(&response.description)
        {
            lines.push(format!("@returns {}", continued(description)));
        }

        format!("\n  /**\n{}\n   */", lines.join("\n   * "))
    }

    /// Returns the query string template, without the surrounding
    /// backticks, or `None` if there are no query parameters.
    pub fn query_string(&self) -> Option<String> {
        let pairs = self
            .params
            .iter()
            .filter(|p| p.location == ArgumentLocation::Query)
            .map(|p| {
                let name = &p.param.name;
                match p.param.schema {
                    Schema::Array(_) => format!("{name}=${{{}.join(\"&{name}=\")}}", p.binding),
                    _ => format!("{name}=${{{}}}", p.binding),
                }
            })
            .collect_vec();
        (!pairs.is_empty()).then(|| pairs.join("&"))
    }

    /// Returns the request URL template literal, with path parameters
    /// bound to their arguments.
    ///
    /// A path parameter placeholder binds to the declared path
    /// parameter with the same name, ignoring case; placeholders
    /// without a matching parameter are interpolated as they are.
    pub fn url(&self) -> String {
        let mut url = String::from("`${this.baseUrl}");
        for segment in &self.segments {
            url.push('/');
            for fragment in segment.fragments() {
                match fragment {
                    PathFragment::Literal(text) => url.push_str(text),
                    PathFragment::Param(token) => {
                        url.push_str("${");
                        url.push_str(self.path_binding(token));
                        url.push('}');
                    }
                }
            }
        }
        if self.query_string().is_some() {
            url.push_str("?${qs}");
        }
        url.push('`');
        url
    }

    fn path_binding<'b>(&'b self, token: &'b str) -> &'b str {
        let token_ci = UniCase::new(token);
        self.params
            .iter()
            .find(|p| {
                p.location == ArgumentLocation::Path && UniCase::new(p.param.name.as_str()) == token_ci
            })
            .map(|p| p.binding.as_str())
            .unwrap_or(token)
    }

    /// Returns the statement that builds the request body, if the
    /// k6 request function takes one.
    pub fn body_statement(&self) -> Option<String> {
        let statement = self.body.as_ref().and_then(|body| match body.content {
            BodyContent::Json(_) => Some(format!(
                "\n    const body = JSON.stringify({});",
                body.arg_name()
            )),
            BodyContent::Multipart(_) => Some("\n    const body = payload;".to_owned()),
            BodyContent::OctetStream => Some(
                "\n    const body = {\n      file: http.file(binFile, undefined, \"application/octet-stream\")\n    };"
                    .to_owned(),
            ),
            BodyContent::Other => None,
        });
        statement.or_else(|| {
            self.method
                .expects_body()
                .then(|| "\n    const body = undefined;".to_owned())
        })
    }

    /// Returns the `Content-Type` header for the request body, if
    /// the body has a recognized media type.
    pub fn content_type(&self) -> Option<&'static str> {
        self.body.as_ref().and_then(|body| body.content.media_type())
    }

    /// Returns the k6 request function for this method.
    pub fn http_function(&self) -> &'static str {
        match self.method {
            Method::Get => "http.get",
            Method::Put => "http.put",
            Method::Post => "http.post",
            Method::Delete => "http.del",
            Method::Options => "http.options",
            Method::Head => "http.head",
            Method::Patch => "http.patch",
            Method::Trace => "http.trace",
        }
    }
}

/// The typed and untyped argument lists for a method.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Arguments {
    /// Arguments for the method signature, like `id: number`.
    pub typed: Vec<String>,
    /// Arguments for the method implementation, like `apiVersion = 1`.
    pub untyped: Vec<String>,
}

#[derive(Debug)]
struct CodegenParameter<'a> {
    param: &'a Parameter,
    location: ArgumentLocation,
    binding: String,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum ArgumentLocation {
    Path,
    Query,
}

#[derive(Debug)]
struct CodegenBody<'a> {
    description: Option<String>,
    content: BodyContent<'a>,
}

impl<'a> CodegenBody<'a> {
    fn new(body: &'a RequestBody) -> Self {
        let content = if let Some(media) = body.content.get("application/json") {
            BodyContent::Json(&media.schema)
        } else if let Some(media) = body.content.get("multipart/form-data") {
            BodyContent::Multipart(&media.schema)
        } else if body.content.contains_key("application/octet-stream") {
            BodyContent::OctetStream
        } else {
            BodyContent::Other
        };
        Self {
            description: body.description.clone(),
            content,
        }
    }

    fn arg_name(&self) -> Cow<'a, str> {
        match self.content {
            BodyContent::Json(Schema::Ref(r)) => camel_case(r.name()).into(),
            BodyContent::OctetStream => "binFile".into(),
            _ => "payload".into(),
        }
    }

    fn arg_type(&self) -> Cow<'a, str> {
        match self.content {
            BodyContent::Json(schema) | BodyContent::Multipart(schema) => type_name(schema),
            BodyContent::OctetStream => "ArrayBuffer".into(),
            BodyContent::Other => "any".into(),
        }
    }
}

/// The first recognized request body media type, in order
/// of preference.
#[derive(Debug)]
enum BodyContent<'a> {
    Json(&'a Schema),
    Multipart(&'a Schema),
    OctetStream,
    Other,
}

impl BodyContent<'_> {
    fn media_type(&self) -> Option<&'static str> {
        match self {
            Self::Json(_) => Some("application/json"),
            Self::Multipart(_) => Some("multipart/form-data"),
            Self::OctetStream => Some("application/octet-stream"),
            Self::Other => None,
        }
    }
}

/// Renders a schema default as a JavaScript literal. Strings are
/// double-quoted, with embedded quotes doubled.
pub fn default_literal(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => format!("\"{}\"", s.replace('"', "\"\"")),
        value => value_text(value),
    }
}

fn non_empty(text: &Option<String>) -> Option<&str> {
    text.as_deref().filter(|text| !text.is_empty())
}

/// Joins multi-line text so that each line continues the comment.
fn continued(text: &str) -> String {
    split_by_newline(text).join("\n   * ")
}
