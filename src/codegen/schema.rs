use std::fmt::Display;

use indexmap::IndexMap;
use itertools::Itertools;

use crate::parse::{ObjectSchema, Schema, Ty};

use super::{naming::value_text, types::type_name};

/// A TypeScript declaration for a shared schema.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TypeDeclaration {
    Enum {
        name: String,
        members: Vec<String>,
    },
    Interface {
        name: String,
        extends: Vec<String>,
        members: Vec<InterfaceMember>,
    },
}

impl TypeDeclaration {
    pub fn name(&self) -> &str {
        let (Self::Enum { name, .. } | Self::Interface { name, .. }) = self;
        name
    }
}

impl Display for TypeDeclaration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Enum { name, members } => {
                writeln!(f, "export enum {name} {{")?;
                writeln!(f, "{}", members.iter().format_with(",\n", |member, f| {
                    f(&format_args!("  {member}"))
                }))?;
                f.write_str("}")
            }
            Self::Interface {
                name,
                extends,
                members,
            } => {
                write!(f, "export interface {name}")?;
                if !extends.is_empty() {
                    write!(f, " extends {}", extends.iter().join(", "))?;
                }
                f.write_str(" {")?;
                for member in members {
                    write!(f, "\n  {member}")?;
                }
                f.write_str("\n}")
            }
        }
    }
}

/// A member of an interface declaration.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum InterfaceMember {
    Property {
        name: String,
        ty: String,
        optional: bool,
    },
    /// A `[key: string]: string` index signature, for string maps.
    StringIndex,
}

impl Display for InterfaceMember {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Property { name, ty, optional } => {
                let optional = if *optional { "?" } else { "" };
                write!(f, "{name}{optional}: {ty};")
            }
            Self::StringIndex => f.write_str("[key: string]: string;"),
        }
    }
}

/// Converts shared schemas into type declarations, in declaration order.
pub fn to_declarations(schemas: &IndexMap<String, Schema>) -> Vec<TypeDeclaration> {
    schemas
        .iter()
        .map(|(name, schema)| to_declaration(name, schema))
        .collect()
}

/// Renders shared schemas as TypeScript source, with a blank line
/// between declarations.
pub fn to_source(schemas: &IndexMap<String, Schema>) -> String {
    to_declarations(schemas).iter().join("\n\n")
}

pub fn to_declaration(name: &str, schema: &Schema) -> TypeDeclaration {
    if let Schema::Enum(schema) = schema {
        return TypeDeclaration::Enum {
            name: name.to_owned(),
            members: schema
                .variants
                .iter()
                .map(value_text)
                .collect(),
        };
    }

    let mut extends = Vec::new();
    let mut members = Vec::new();
    match schema {
        Schema::Composition(composition) => {
            extends.extend(
                composition
                    .all_of
                    .iter()
                    .filter_map(|s| s.as_reference())
                    .map(|r| r.name().to_owned()),
            );
            for part in composition.all_of.iter().filter(|s| s.as_reference().is_none()) {
                if let Schema::Object(object) = part {
                    let (parent, props) = properties(object);
                    extends.extend(parent);
                    members.extend(props);
                }
            }
        }
        Schema::Object(object) => {
            let (parent, props) = properties(object);
            extends.extend(parent);
            members.extend(props);
        }
        _ => (),
    }

    TypeDeclaration::Interface {
        name: name.to_owned(),
        extends,
        members,
    }
}

/// Returns an object's members, and the parent type that a
/// referenced `additionalProperties` schema contributes.
///
/// A string-valued map is checked first, and wins over a referenced map.
fn properties(object: &ObjectSchema) -> (Option<String>, Vec<InterfaceMember>) {
    let mut members = object
        .properties
        .iter()
        .map(|(name, schema)| InterfaceMember::Property {
            name: name.clone(),
            ty: type_name(schema).into_owned(),
            optional: !object.is_required(name),
        })
        .collect_vec();
    let parent = match &object.additional_properties {
        Some(map) if map.ty == Some(Ty::String) => {
            members.push(InterfaceMember::StringIndex);
            None
        }
        Some(map) => map.reference.as_ref().map(|r| r.name().to_owned()),
        None => None,
    };
    (parent, members)
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;

    use crate::parse::Document;

    fn schemas(yaml: &str) -> IndexMap<String, Schema> {
        let doc = Document::from_yaml(&indoc::formatdoc! {"
            openapi: 3.0.0
            info:
              title: foo
              version: v1
            paths:
              /bar:
                get:
                  responses:
                    '200':
                      description: Success
            components:
              schemas:
            {schemas}
        ", schemas = indent(yaml)})
        .unwrap();
        doc.components.unwrap().schemas
    }

    fn indent(text: &str) -> String {
        text.lines().map(|line| format!("    {line}")).join("\n")
    }

    #[test]
    fn test_enum() {
        let source = to_source(&schemas(indoc::indoc! {"
            HuntingSkill:
              type: string
              enum:
                - clueless
                - lazy
                - adventurous
                - aggressive
        "}));
        assert_eq!(
            source,
            indoc::indoc! {"
                export enum HuntingSkill {
                  clueless,
                  lazy,
                  adventurous,
                  aggressive
                }"}
        );
    }

    #[test]
    fn test_required_property() {
        let source = to_source(&schemas(indoc::indoc! {"
            Model:
              type: object
              required:
                - name
              properties:
                name:
                  type: string
        "}));
        assert_eq!(
            source,
            indoc::indoc! {"
                export interface Model {
                  name: string;
                }"}
        );
    }

    #[test]
    fn test_simple_model() {
        let source = to_source(&schemas(indoc::indoc! {"
            Model:
              type: object
              properties:
                name:
                  type: string
                address:
                  $ref: '#/components/schemas/Address'
                age:
                  type: integer
            Address:
              type: object
              properties:
                name:
                  type: string
        "}));
        assert_eq!(
            source,
            indoc::indoc! {"
                export interface Model {
                  name?: string;
                  address?: Address;
                  age?: number;
                }

                export interface Address {
                  name?: string;
                }"}
        );
    }

    #[test]
    fn test_string_map() {
        let source = to_source(&schemas(indoc::indoc! {"
            Model:
              type: object
              additionalProperties:
                type: string
        "}));
        assert_eq!(
            source,
            indoc::indoc! {"
                export interface Model {
                  [key: string]: string;
                }"}
        );
    }

    #[test]
    fn test_string_map_wins_over_reference() {
        let source = to_source(&schemas(indoc::indoc! {"
            Map:
              type: object
              additionalProperties:
                type: string
                $ref: '#/components/schemas/ComplexModel'
            Labels:
              type: object
              additionalProperties:
                type: string
                enum: [red, green]
        "}));
        assert_eq!(
            source,
            indoc::indoc! {"
                export interface Map {
                  [key: string]: string;
                }

                export interface Labels {
                  [key: string]: string;
                }"}
        );
    }

    #[test]
    fn test_model_map_extends_value_type() {
        let source = to_source(&schemas(indoc::indoc! {"
            Foo:
              type: object
              additionalProperties:
                $ref: '#/components/schemas/ComplexModel'
            ComplexModel:
              type: object
              properties:
                name:
                  type: string
        "}));
        assert_eq!(
            source,
            indoc::indoc! {"
                export interface Foo extends ComplexModel {
                }

                export interface ComplexModel {
                  name?: string;
                }"}
        );
    }

    #[test]
    fn test_composition() {
        let source = to_source(&schemas(indoc::indoc! {"
            ErrorModel:
              type: object
              properties:
                message:
                  type: string
                code:
                  type: integer
            ExtendedErrorModel:
              allOf:
                - $ref: '#/components/schemas/ErrorModel'
                - type: object
                  properties:
                    rootCause:
                      type: string
        "}));
        assert_eq!(
            source,
            indoc::indoc! {"
                export interface ErrorModel {
                  message?: string;
                  code?: number;
                }

                export interface ExtendedErrorModel extends ErrorModel {
                  rootCause?: string;
                }"}
        );
    }

    #[test]
    fn test_multiple_reference_composition() {
        let decls = to_declarations(&schemas(indoc::indoc! {"
            ExtendedErrorModel:
              allOf:
                - $ref: '#/components/schemas/WarningModel'
                - $ref: '#/components/schemas/ErrorModel'
        "}));
        assert_eq!(
            decls,
            [TypeDeclaration::Interface {
                name: "ExtendedErrorModel".to_owned(),
                extends: vec!["WarningModel".to_owned(), "ErrorModel".to_owned()],
                members: vec![],
            }]
        );
        assert_eq!(
            decls[0].to_string(),
            "export interface ExtendedErrorModel extends WarningModel, ErrorModel {\n}"
        );
    }

    #[test]
    fn test_polymorphism_with_inline_enum() {
        let source = to_source(&schemas(indoc::indoc! {"
            Pet:
              type: object
              discriminator:
                propertyName: petType
              properties:
                name:
                  type: string
                petType:
                  type: string
            Cat:
              description: A representation of a cat.
              allOf:
                - $ref: '#/components/schemas/Pet'
                - type: object
                  properties:
                    huntingSkill:
                      type: string
                      default: lazy
                      enum:
                        - clueless
                        - lazy
        "}));
        assert_eq!(
            source,
            indoc::indoc! {"
                export interface Pet {
                  name?: string;
                  petType?: string;
                }

                export interface Cat extends Pet {
                  huntingSkill?: string;
                }"}
        );
    }

    #[test]
    fn test_properties_with_string_map() {
        let decl = to_declaration(
            "Tags",
            &serde_yaml::from_str(indoc::indoc! {"
                type: object
                properties:
                  count:
                    type: integer
                additionalProperties:
                  type: string
            "})
            .unwrap(),
        );
        assert_eq!(decl.name(), "Tags");
        assert_eq!(
            decl.to_string(),
            "export interface Tags {\n  count?: number;\n  [key: string]: string;\n}"
        );
    }

    #[test]
    fn test_numeric_enum_members() {
        let decl = to_declaration(
            "Level",
            &serde_yaml::from_str("{type: integer, enum: [1, 2]}").unwrap(),
        );
        assert_eq!(decl.to_string(), "export enum Level {\n  1,\n  2\n}");
    }
}
