use indexmap::IndexMap;
use serde::{Deserialize, Deserializer};

/// An OpenAPI schema, discriminated into the shapes that the type
/// mapper and schema transpiler understand.
///
/// A `$ref` always wins over any sibling keywords; after that, `enum`
/// wins over `allOf`, which wins over `type`.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(from = "SchemaObject")]
pub enum Schema {
    Ref(SchemaRef),
    Enum(EnumSchema),
    Composition(CompositionSchema),
    Array(ArraySchema),
    Object(ObjectSchema),
    Primitive(PrimitiveSchema),
}

impl Schema {
    /// Returns the `default` value declared on this schema, if any.
    pub fn default_value(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Ref(_) => None,
            Self::Enum(schema) => schema.default.as_ref(),
            Self::Composition(schema) => schema.default.as_ref(),
            Self::Array(schema) => schema.default.as_ref(),
            Self::Object(schema) => schema.default.as_ref(),
            Self::Primitive(schema) => schema.default.as_ref(),
        }
    }

    pub fn as_reference(&self) -> Option<&SchemaRef> {
        match self {
            Self::Ref(r) => Some(r),
            _ => None,
        }
    }
}

/// A schema without a type accepts any value.
impl Default for Schema {
    fn default() -> Self {
        Self::Primitive(PrimitiveSchema::default())
    }
}

/// A `$ref` to another schema.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SchemaRef {
    pub path: String,
}

impl SchemaRef {
    /// Returns the referenced name: the last component of the path.
    pub fn name(&self) -> &str {
        crate::codegen::reference_name(&self.path)
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct EnumSchema {
    pub ty: Option<Ty>,
    pub variants: Vec<serde_json::Value>,
    pub default: Option<serde_json::Value>,
}

/// An `allOf` composition.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CompositionSchema {
    pub all_of: Vec<Schema>,
    pub default: Option<serde_json::Value>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ArraySchema {
    pub items: Option<Box<Schema>>,
    pub default: Option<serde_json::Value>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ObjectSchema {
    pub properties: IndexMap<String, Schema>,
    pub required: Vec<String>,
    pub additional_properties: Option<AdditionalProperties>,
    pub default: Option<serde_json::Value>,
}

impl ObjectSchema {
    pub fn is_required(&self, name: &str) -> bool {
        self.required.iter().any(|required| required == name)
    }
}

/// The value schema of a map-like object.
///
/// Only the value's `type` and `$ref` are kept. Unlike a [`Schema`],
/// both are read, even when the `$ref` is present.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct AdditionalProperties {
    pub ty: Option<Ty>,
    pub reference: Option<SchemaRef>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PrimitiveSchema {
    pub ty: Option<Ty>,
    pub default: Option<serde_json::Value>,
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(from = "String")]
pub enum Ty {
    String,
    Integer,
    Number,
    Boolean,
    Array,
    Object,
    Null,
    /// A type name that isn't part of JSON Schema, like Swagger's `file`.
    Other(String),
}

impl From<String> for Ty {
    fn from(value: String) -> Self {
        match value.as_str() {
            "string" => Self::String,
            "integer" => Self::Integer,
            "number" => Self::Number,
            "boolean" => Self::Boolean,
            "array" => Self::Array,
            "object" => Self::Object,
            "null" => Self::Null,
            _ => Self::Other(value),
        }
    }
}

/// The raw schema object, before it's discriminated into a [`Schema`].
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SchemaObject {
    #[serde(rename = "$ref", default)]
    reference: Option<String>,
    #[serde(rename = "type", default, deserialize_with = "deserialize_type")]
    ty: Option<Ty>,
    #[serde(default)]
    default: Option<serde_json::Value>,

    // Object properties.
    #[serde(default)]
    properties: Option<IndexMap<String, Schema>>,
    #[serde(default)]
    required: Vec<String>,
    #[serde(default)]
    additional_properties: Option<AdditionalPropertiesOr>,

    // Array items.
    #[serde(default)]
    items: Option<Box<Schema>>,

    // Enum variants.
    #[serde(rename = "enum", default)]
    variants: Option<Vec<serde_json::Value>>,

    // Composition.
    #[serde(default)]
    all_of: Option<Vec<Schema>>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum AdditionalPropertiesOr {
    Bool(bool),
    Schema(Box<SchemaObject>),
}

impl From<SchemaObject> for Schema {
    fn from(object: SchemaObject) -> Self {
        if let Some(path) = object.reference {
            return Self::Ref(SchemaRef { path });
        }
        if let Some(variants) = object.variants {
            return Self::Enum(EnumSchema {
                ty: object.ty,
                variants,
                default: object.default,
            });
        }
        if let Some(all_of) = object.all_of {
            return Self::Composition(CompositionSchema {
                all_of,
                default: object.default,
            });
        }
        let additional_properties = match object.additional_properties {
            Some(AdditionalPropertiesOr::Schema(value)) => Some(AdditionalProperties {
                ty: value.ty,
                reference: value.reference.map(|path| SchemaRef { path }),
            }),
            Some(AdditionalPropertiesOr::Bool(_)) | None => None,
        };
        match object.ty {
            Some(Ty::Array) => Self::Array(ArraySchema {
                items: object.items,
                default: object.default,
            }),
            Some(Ty::Object) => Self::Object(ObjectSchema {
                properties: object.properties.unwrap_or_default(),
                required: object.required,
                additional_properties,
                default: object.default,
            }),
            None if object.properties.is_some() || additional_properties.is_some() => {
                Self::Object(ObjectSchema {
                    properties: object.properties.unwrap_or_default(),
                    required: object.required,
                    additional_properties,
                    default: object.default,
                })
            }
            ty => Self::Primitive(PrimitiveSchema {
                ty,
                default: object.default,
            }),
        }
    }
}

/// Reads a single `type`, or the first non-`null` entry of an
/// OpenAPI 3.1-style `type` array.
fn deserialize_type<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Ty>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum TypesOr {
        Types(Vec<Ty>),
        Type(Ty),
    }
    Ok(match Option::<TypesOr>::deserialize(deserializer)? {
        Some(TypesOr::Types(types)) => {
            let first = types.first().cloned();
            types.into_iter().find(|ty| *ty != Ty::Null).or(first)
        }
        Some(TypesOr::Type(ty)) => Some(ty),
        None => None,
    })
}
