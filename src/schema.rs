use crate::{SerdeSchema, Validator};
use std::collections::BTreeMap;
use thiserror::Error;

/// A validated schema node.
///
/// The node's `form` is fixed by its `type`: object nodes carry
/// `properties`, array nodes carry `items`, and every other registered type
/// is a scalar that may carry a `format`.
#[derive(Clone, Debug, PartialEq)]
pub struct Schema {
    pub required: bool,
    pub form: Form,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Form {
    Object {
        properties: BTreeMap<String, Schema>,
    },
    Array {
        items: Box<Schema>,
    },
    Scalar {
        type_: String,
        format: Option<String>,
    },
}

pub(crate) const OBJECT: &str = "object";
pub(crate) const ARRAY: &str = "array";

/// A schema that cannot be used for validation.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("schema node has no type")]
    MissingType,

    #[error("unknown type: {0}")]
    UnknownType(String),

    #[error("unknown format: {0}")]
    UnknownFormat(String),

    #[error("array schema has no items")]
    MissingItems,

    #[error("keyword {keyword} is not allowed on type {type_}")]
    UnexpectedKeyword { type_: String, keyword: &'static str },
}

impl Schema {
    /// Converts a [`SerdeSchema`] against the built-in type and format
    /// registries.
    ///
    /// ```
    /// use shapeguard::{Form, Schema, SchemaError, SerdeSchema};
    /// use serde_json::json;
    ///
    /// let schema = Schema::from_serde_schema(
    ///     serde_json::from_value(json!({ "type": "array", "items": { "type": "integer" } })).unwrap(),
    /// )
    /// .unwrap();
    /// assert!(matches!(schema.form, Form::Array { .. }));
    ///
    /// assert_eq!(
    ///     SchemaError::UnknownType("bad_type".to_owned()),
    ///     Schema::from_serde_schema(SerdeSchema {
    ///         type_: Some("bad_type".to_owned()),
    ///         ..Default::default()
    ///     })
    ///     .unwrap_err()
    /// );
    /// ```
    pub fn from_serde_schema(serde_schema: SerdeSchema) -> Result<Self, SchemaError> {
        Validator::new().compile(serde_schema)
    }

    /// The registry name of this node's type.
    pub fn type_name(&self) -> &str {
        match &self.form {
            Form::Object { .. } => OBJECT,
            Form::Array { .. } => ARRAY,
            Form::Scalar { type_, .. } => type_,
        }
    }

    pub fn format(&self) -> Option<&str> {
        match &self.form {
            Form::Scalar { format, .. } => format.as_deref(),
            _ => None,
        }
    }
}

impl Validator {
    /// Checks a [`SerdeSchema`] against this validator's registries and
    /// converts it into a [`Schema`].
    pub fn compile(&self, serde_schema: SerdeSchema) -> Result<Schema, SchemaError> {
        let SerdeSchema {
            type_,
            required,
            format,
            properties,
            items,
        } = serde_schema;

        let type_ = type_.ok_or(SchemaError::MissingType)?;
        if !self.types.contains(&type_) {
            return Err(SchemaError::UnknownType(type_));
        }

        let form = match type_.as_str() {
            OBJECT => {
                reject(&type_, "items", items.is_some())?;
                reject(&type_, "format", format.is_some())?;

                let properties = properties
                    .unwrap_or_default()
                    .into_iter()
                    .map(|(name, sub_schema)| Ok((name, self.compile(sub_schema)?)))
                    .collect::<Result<_, SchemaError>>()?;

                Form::Object { properties }
            }
            ARRAY => {
                reject(&type_, "properties", properties.is_some())?;
                reject(&type_, "format", format.is_some())?;

                let items = items.ok_or(SchemaError::MissingItems)?;
                Form::Array {
                    items: Box::new(self.compile(*items)?),
                }
            }
            _ => {
                reject(&type_, "properties", properties.is_some())?;
                reject(&type_, "items", items.is_some())?;

                if let Some(ref format) = format {
                    if !self.formats.contains(format) {
                        return Err(SchemaError::UnknownFormat(format.clone()));
                    }
                }

                Form::Scalar { type_, format }
            }
        };

        Ok(Schema {
            required: required.unwrap_or(false),
            form,
        })
    }
}

fn reject(type_: &str, keyword: &'static str, present: bool) -> Result<(), SchemaError> {
    if present {
        Err(SchemaError::UnexpectedKeyword {
            type_: type_.to_owned(),
            keyword,
        })
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TypeRegistry;
    use serde_json::json;

    fn compile(value: serde_json::Value) -> Result<Schema, SchemaError> {
        Schema::from_serde_schema(serde_json::from_value(value).unwrap())
    }

    #[test]
    fn nested_schema() {
        let schema = compile(json!({
            "type": "object",
            "required": true,
            "properties": {
                "name": { "type": "string", "format": "alpha" },
                "tags": { "type": "array", "items": { "type": "integer" } },
            },
        }))
        .unwrap();

        let mut properties = BTreeMap::new();
        properties.insert(
            "name".to_owned(),
            Schema {
                required: false,
                form: Form::Scalar {
                    type_: "string".to_owned(),
                    format: Some("alpha".to_owned()),
                },
            },
        );
        properties.insert(
            "tags".to_owned(),
            Schema {
                required: false,
                form: Form::Array {
                    items: Box::new(Schema {
                        required: false,
                        form: Form::Scalar {
                            type_: "integer".to_owned(),
                            format: None,
                        },
                    }),
                },
            },
        );

        assert_eq!(
            Schema {
                required: true,
                form: Form::Object { properties },
            },
            schema
        );
        assert_eq!("object", schema.type_name());
    }

    #[test]
    fn object_without_properties() {
        assert_eq!(
            Form::Object {
                properties: BTreeMap::new()
            },
            compile(json!({ "type": "object" })).unwrap().form
        );
    }

    #[test]
    fn configuration_errors() {
        assert_eq!(SchemaError::MissingType, compile(json!({})).unwrap_err());
        assert_eq!(
            SchemaError::UnknownType("bad_type".to_owned()),
            compile(json!({ "type": "bad_type" })).unwrap_err()
        );
        assert_eq!(
            SchemaError::UnknownType("float".to_owned()),
            compile(json!({
                "type": "object",
                "properties": { "deep": { "type": "float" } },
            }))
            .unwrap_err()
        );
        assert_eq!(
            SchemaError::UnknownFormat("zipcode".to_owned()),
            compile(json!({ "type": "string", "format": "zipcode" })).unwrap_err()
        );
        assert_eq!(
            SchemaError::MissingItems,
            compile(json!({ "type": "array" })).unwrap_err()
        );
        assert_eq!(
            SchemaError::UnexpectedKeyword {
                type_: "string".to_owned(),
                keyword: "properties",
            },
            compile(json!({ "type": "string", "properties": {} })).unwrap_err()
        );
        assert_eq!(
            SchemaError::UnexpectedKeyword {
                type_: "object".to_owned(),
                keyword: "format",
            },
            compile(json!({ "type": "object", "format": "email" })).unwrap_err()
        );
    }

    #[test]
    fn format_on_non_string_scalar() {
        let schema = compile(json!({ "type": "integer", "format": "utc-millisec" })).unwrap();
        assert_eq!(Some("utc-millisec"), schema.format());
    }

    #[test]
    fn custom_registry() {
        let validator = Validator::new()
            .with_types(TypeRegistry::default().register("number", |v| v.is_number()));
        let schema = validator
            .compile(serde_json::from_value(json!({ "type": "number" })).unwrap())
            .unwrap();
        assert_eq!("number", schema.type_name());
    }
}
