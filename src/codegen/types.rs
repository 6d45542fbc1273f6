use std::borrow::Cow;

use crate::parse::{Schema, Ty};

/// Returns the TypeScript type name for a schema.
///
/// References become the bare referenced name; they're never followed,
/// so cyclic schemas are fine.
pub fn type_name(schema: &Schema) -> Cow<'_, str> {
    match schema {
        Schema::Ref(r) => r.name().into(),
        Schema::Array(array) => match &array.items {
            Some(items) => format!("{}[]", type_name(items)).into(),
            None => "any[]".into(),
        },
        Schema::Enum(schema) => primitive_type_name(schema.ty.as_ref()).into(),
        Schema::Primitive(schema) => primitive_type_name(schema.ty.as_ref()).into(),
        Schema::Object(_) | Schema::Composition(_) => "any".into(),
    }
}

/// Unknown type names are passed through as they're written.
fn primitive_type_name(ty: Option<&Ty>) -> &str {
    match ty {
        None | Some(Ty::Object) => "any",
        Some(Ty::Integer | Ty::Number) => "number",
        Some(Ty::String) => "string",
        Some(Ty::Boolean) => "boolean",
        Some(Ty::Null) => "null",
        Some(Ty::Array) => "any[]",
        Some(Ty::Other(name)) => name,
    }
}
