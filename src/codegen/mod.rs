use std::path::Path;

use miette::{Context, IntoDiagnostic};

pub mod client;
pub mod document;
pub mod operation;
pub mod schema;

mod naming;
mod types;
mod unique;

pub use document::{GeneratedDocument, transpile};
pub use naming::{camel_case, capitalize_first, reference_name, split_by_newline};
pub use types::type_name;
pub use unique::UniqueCallSpace;

/// The header comment at the top of every generated file.
pub const GENERATOR_HEADER: &str = "// Generator: oas-to-k6-clients";

pub fn write_to_disk(output: &Path, code: impl IntoCode) -> miette::Result<()> {
    let code = code.into_code();
    let path = output.join(code.path());
    let string = code.into_string()?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .into_diagnostic()
            .with_context(|| format!("Failed to create directory `{}`", parent.display()))?;
    }
    std::fs::write(&path, string)
        .into_diagnostic()
        .with_context(|| format!("Failed to write `{}`", path.display()))?;
    Ok(())
}

pub trait Code {
    fn path(&self) -> &str;
    fn into_string(self) -> miette::Result<String>;
}

/// Generated TypeScript or JavaScript source, and the file name
/// to write it to.
#[derive(Clone, Debug)]
pub struct TsCode {
    pub path: String,
    pub content: String,
}

impl Code for TsCode {
    fn path(&self) -> &str {
        &self.path
    }

    fn into_string(self) -> miette::Result<String> {
        Ok(self.content)
    }
}

pub trait IntoCode {
    type Code: Code;

    fn into_code(self) -> Self::Code;
}

impl<T: Code> IntoCode for T {
    type Code = T;

    fn into_code(self) -> Self::Code {
        self
    }
}
