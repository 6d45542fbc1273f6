use indexmap::IndexSet;
use itertools::Itertools;

use crate::{
    error::GenerateError,
    parse::{Method, Operation},
};

use super::{
    naming::capitalize_first,
    operation::{Arguments, CodegenOperation},
    unique::UniqueCallSpace,
};

/// Generates one k6 client class from the operations that share a tag.
///
/// The transpiler owns the state for a single client: the call
/// signatures it's emitted so far, for resolving name collisions, and the
/// `k6/http` type names that its methods reference.
#[derive(Debug)]
pub struct OperationTranspiler<'a> {
    tag: &'a str,
    operations: Vec<(&'a str, Method, &'a Operation)>,
    calls: UniqueCallSpace,
    type_names: IndexSet<&'static str>,
}

impl<'a> OperationTranspiler<'a> {
    pub fn new(tag: &'a str) -> Self {
        Self {
            tag,
            operations: Vec::new(),
            calls: UniqueCallSpace::new(),
            type_names: IndexSet::new(),
        }
    }

    /// Adds an operation to this client. Operations become methods
    /// in the order they're added.
    pub fn push(&mut self, resource: &'a str, method: Method, op: &'a Operation) {
        self.operations.push((resource, method, op));
    }

    /// Returns the client class name, like `BeerClient`.
    pub fn class_name(&self) -> String {
        format!("{}Client", capitalize_first(self.tag))
    }

    pub fn convert(mut self) -> Result<GeneratedClient, GenerateError> {
        let class_name = self.class_name();
        tracing::debug!(
            client = %class_name,
            operations = self.operations.len(),
            "generating client"
        );
        self.type_names.insert("RefinedParams");
        self.type_names.insert("ResponseType");

        let operations = std::mem::take(&mut self.operations);
        let methods = operations
            .into_iter()
            .map(|(resource, method, op)| {
                let op = CodegenOperation::new(resource, method, op)?;
                Ok(self.method(&class_name, &op))
            })
            .collect::<Result<Vec<_>, GenerateError>>()?;

        Ok(GeneratedClient {
            class_name,
            type_names: self.type_names,
            methods,
        })
    }

    fn method(&mut self, class_name: &str, op: &CodegenOperation<'_>) -> GeneratedMethod {
        let Arguments { typed, untyped } = op.arguments();
        let args = untyped.join(", ");
        let base_name = op.base_name(self.tag);
        let name = self.calls.uniquify(&base_name, &args).into_owned();
        let call = format!("{name}({args})");
        tracing::debug!(
            client = %class_name,
            method = %op.method(),
            resource = op.resource(),
            %call,
            "generating method"
        );

        let response_type = op.response_type();
        if response_type.is_some() {
            self.type_names.insert("ResponseType");
            self.type_names.insert("RefinedResponse");
        }
        let ret_type = match &response_type {
            Some(ty) => format!(": {{ res: RefinedResponse<ResponseType | undefined>, json(): {ty} }}"),
            None => String::new(),
        };
        let type_source = format!(
            "{}\n  {name}<RT extends ResponseType | undefined>({}){ret_type};",
            op.doc_comment(),
            typed.join(", "),
        );

        let mut source = format!("\n  {call} {{");
        if let Some(qs) = op.query_string() {
            source.push_str(&format!("\n    const qs = `{qs}`;"));
        }
        let body = op.body_statement();
        if let Some(body) = &body {
            source.push_str(body);
        }
        source.push_str("\n    params = Object.assign({}, this.params, params);");
        if let Some(content_type) = op.content_type() {
            source.push_str(&format!(
                "\n    params.headers = Object.assign({{}}, params.headers, {{ \"Content-Type\": \"{content_type}\" }});"
            ));
        }
        source.push_str(&format!(
            "\n    const res = {}({}, {}params);",
            op.http_function(),
            op.url(),
            if body.is_some() { "body, " } else { "" },
        ));
        let status = op.checked_status();
        if let Some(status) = status {
            source.push_str(&format!(
                "\n    check(res, {{\n      \"{class_name}.{} {status}\": r => r.status === {status}\n    }});",
                call.replace('"', "'"),
            ));
        }
        if response_type.is_some() {
            source.push_str("\n    return { res, json: () => res.json() };");
        }
        source.push_str("\n  }");

        GeneratedMethod {
            name,
            call,
            type_source,
            source,
            checked_status: status.map(str::to_owned),
            returns_body: response_type.is_some(),
        }
    }
}

/// A generated client class.
#[derive(Clone, Debug)]
pub struct GeneratedClient {
    pub class_name: String,
    /// The `k6/http` types that the client's declarations reference,
    /// in the order they were first needed.
    pub type_names: IndexSet<&'static str>,
    pub methods: Vec<GeneratedMethod>,
}

impl GeneratedClient {
    /// Returns the TypeScript declaration of the client class.
    pub fn type_source(&self) -> String {
        format!(
            "export class {} {{
  /**
   * @param baseUrl The base url of the path.
   * @param [params=undefined] The default request parameters.
   */
  constructor(baseUrl: string, params?: RefinedParams<ResponseType | undefined> | null);
{}
}}",
            self.class_name,
            self.methods.iter().map(|m| &m.type_source).join("\n"),
        )
    }

    /// Returns the JavaScript implementation of the client class.
    pub fn source(&self) -> String {
        format!(
            "export class {} {{
  constructor(baseUrl, defaultParams = undefined) {{
    this.baseUrl = baseUrl;
    this.params = defaultParams || {{}};
  }}
{}
}}",
            self.class_name,
            self.methods.iter().map(|m| &m.source).join("\n"),
        )
    }
}

/// A generated client method.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GeneratedMethod {
    /// The method name, with any collision suffix.
    pub name: String,
    /// The call text: the name and the untyped argument list.
    pub call: String,
    /// The documented TypeScript method signature.
    pub type_source: String,
    /// The JavaScript method implementation.
    pub source: String,
    pub checked_status: Option<String>,
    pub returns_body: bool,
}
