use indexmap::{IndexMap, IndexSet};
use itertools::Itertools;

use crate::{error::GenerateError, parse::Document};

use super::{GENERATOR_HEADER, TsCode, client::OperationTranspiler, schema};

/// The generated type definitions and client module for a document.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GeneratedDocument {
    pub types_source: String,
    pub clients_source: String,
}

impl GeneratedDocument {
    /// Returns the `.d.ts` and `.js` files for this document, named
    /// after `basename`.
    pub fn into_files(self, basename: &str) -> [TsCode; 2] {
        [
            TsCode {
                path: format!("{basename}.d.ts"),
                content: self.types_source,
            },
            TsCode {
                path: format!("{basename}.js"),
                content: self.clients_source,
            },
        ]
    }
}

/// Transpiles a document into k6 clients and their type definitions.
///
/// Operations are grouped into one client per tag, by their first tag.
/// Clients are emitted in the order their tags first appear, and each
/// client's methods follow the order of the operations in the document.
pub fn transpile(doc: &Document) -> Result<GeneratedDocument, GenerateError> {
    let mut groups = IndexMap::<&str, OperationTranspiler<'_>>::new();
    for (resource, method, op) in doc.operations() {
        let Some(tag) = op.tags.first() else {
            return Err(GenerateError::Untagged {
                resource: resource.to_owned(),
                method,
            });
        };
        groups
            .entry(tag.as_str())
            .or_insert_with(|| OperationTranspiler::new(tag))
            .push(resource, method, op);
    }
    tracing::debug!(clients = groups.len(), "grouped operations by tag");

    let mut type_names = IndexSet::new();
    let mut type_sources = Vec::new();
    let mut sources = Vec::new();
    for transpiler in groups.into_values() {
        let client = transpiler.convert()?;
        type_names.extend(client.type_names.iter().copied());
        type_sources.push(client.type_source());
        sources.push(client.source());
    }

    if let Some(components) = &doc.components {
        tracing::debug!(schemas = components.schemas.len(), "generating schema types");
        type_sources.push(schema::to_source(&components.schemas));
    }
    if !type_names.is_empty() {
        type_sources.insert(
            0,
            format!("import {{ {} }} from \"k6/http\";", type_names.iter().join(", ")),
        );
    }

    Ok(GeneratedDocument {
        types_source: format!("{GENERATOR_HEADER}\n\n{}", type_sources.join("\n\n")),
        clients_source: format!(
            "{GENERATOR_HEADER}\n\nimport http from \"k6/http\";\nimport {{ check }} from \"k6\";\n\n{}",
            sources.join("\n\n")
        ),
    })
}
