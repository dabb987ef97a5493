use crate::{Form, FormatRegistry, Schema, TypeRegistry};
use serde::ser::{Serialize, SerializeStruct, Serializer};
use serde_json::{Map, Value};
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::iter;
use thiserror::Error;
use tracing::{debug, trace};

/// Name under which the top-level schema and data are validated. It keys
/// errors on the top-level value itself and never prefixes nested paths.
pub const ROOT: &str = "root";

#[derive(Clone, Debug, Default)]
pub struct ValidateOptions {
    max_depth: usize,
}

impl ValidateOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Limits how many objects and arrays may be nested inside one another.
    /// Zero, the default, means no limit.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

/// A failure that aborts validation as a whole. Problems with the data are
/// reported through [`Validation::errors`] instead.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ValidateError {
    #[error("max depth exceeded")]
    MaxDepthExceeded,

    #[error("unknown type: {0}")]
    UnknownType(String),

    #[error("unknown format: {0}")]
    UnknownFormat(String),
}

/// The outcome of validating one value.
///
/// `errors` maps dotted paths (`foo.bar`, `tags.2`, or `root` for the
/// top-level value) to the first reason the field failed. `data` holds only
/// the schema-declared fields that passed, and is `None` when the top-level
/// value itself failed or was absent.
///
/// Serializes as `{ "isValid", "errors", "data" }`, omitting `data` when it is
/// `None`.
#[derive(Clone, Debug, PartialEq)]
pub struct Validation {
    pub errors: BTreeMap<String, String>,
    pub data: Option<Value>,
}

impl Validation {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

impl Serialize for Validation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = if self.data.is_some() { 3 } else { 2 };
        let mut state = serializer.serialize_struct("Validation", len)?;
        state.serialize_field("isValid", &self.is_valid())?;
        state.serialize_field("errors", &self.errors)?;
        match &self.data {
            Some(data) => state.serialize_field("data", data)?,
            None => state.skip_field("data")?,
        }
        state.end()
    }
}

/// Validates data against schemas using a set of type and format
/// registries.
///
/// ```
/// use shapeguard::{Schema, Validator};
/// use serde_json::json;
///
/// let schema = Schema::from_serde_schema(serde_json::from_value(json!({
///     "type": "object",
///     "properties": {
///         "email": { "type": "string", "format": "email", "required": true },
///         "age": { "type": "integer" },
///     },
/// })).unwrap()).unwrap();
///
/// let data = json!({ "email": "ted@mosby.com", "age": 31.5, "extra": true });
/// let validation = Validator::new().validate(&schema, Some(&data)).unwrap();
///
/// assert!(!validation.is_valid());
/// assert_eq!("type must be integer", validation.errors["age"]);
/// assert_eq!(Some(json!({ "email": "ted@mosby.com" })), validation.data);
/// ```
#[derive(Clone, Debug, Default)]
pub struct Validator {
    pub(crate) types: TypeRegistry,
    pub(crate) formats: FormatRegistry,
    options: ValidateOptions,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_types(mut self, types: TypeRegistry) -> Self {
        self.types = types;
        self
    }

    pub fn with_formats(mut self, formats: FormatRegistry) -> Self {
        self.formats = formats;
        self
    }

    pub fn with_options(mut self, options: ValidateOptions) -> Self {
        self.options = options;
        self
    }

    /// Validates `instance`, which is `None` when the value is absent
    /// altogether. The instance is never modified; the sanitized copy is
    /// built separately.
    pub fn validate(
        &self,
        schema: &Schema,
        instance: Option<&Value>,
    ) -> Result<Validation, ValidateError> {
        let mut vm = Vm {
            types: &self.types,
            formats: &self.formats,
            max_depth: self.options.max_depth,
            path: vec![],
            errors: BTreeMap::new(),
        };

        let data = vm.validate_field(schema, ROOT, instance)?;
        debug!(errors = vm.errors.len(), "validated {} schema", schema.type_name());

        Ok(Validation {
            errors: vm.errors,
            data,
        })
    }
}

/// Validates `instance` against `schema` with the built-in registries and no
/// depth limit.
pub fn validate(schema: &Schema, instance: Option<&Value>) -> Result<Validation, ValidateError> {
    Validator::new().validate(schema, instance)
}

struct Vm<'a> {
    types: &'a TypeRegistry,
    formats: &'a FormatRegistry,
    max_depth: usize,
    path: Vec<String>,
    errors: BTreeMap<String, String>,
}

impl<'a> Vm<'a> {
    /// Validates the field `name` and returns its sanitized value, or `None`
    /// when the field is absent or invalid.
    fn validate_field(
        &mut self,
        schema: &Schema,
        name: &str,
        instance: Option<&Value>,
    ) -> Result<Option<Value>, ValidateError> {
        let instance = match self.check_node(schema, name, instance)? {
            Some(instance) => instance,
            None => return Ok(None),
        };

        match &schema.form {
            Form::Object { properties } => {
                self.push_path_token(name)?;

                let obj = instance.as_object();
                let mut out = Map::new();
                for (prop_name, sub_schema) in properties {
                    let sub_instance = obj.and_then(|obj| obj.get(prop_name));
                    if let Some(value) = self.validate_field(sub_schema, prop_name, sub_instance)? {
                        out.insert(prop_name.clone(), value);
                    }
                }

                self.pop_path_token();
                Ok(Some(Value::Object(out)))
            }
            Form::Array { items } => {
                self.push_path_token(name)?;

                let mut out = Vec::new();
                for (index, element) in instance.as_array().into_iter().flatten().enumerate() {
                    if let Some(value) = self.validate_element(items, index, element)? {
                        out.push(value);
                    }
                }

                self.pop_path_token();
                Ok(Some(Value::Array(out)))
            }
            Form::Scalar { .. } => Ok(Some(instance.clone())),
        }
    }

    fn validate_element(
        &mut self,
        items: &Schema,
        index: usize,
        element: &Value,
    ) -> Result<Option<Value>, ValidateError> {
        self.validate_field(items, &index.to_string(), Some(element))
    }

    /// Runs the required, type and format checks for one field, stopping at
    /// the first that fails. Returns the value to descend into, if any.
    fn check_node<'v>(
        &mut self,
        schema: &Schema,
        name: &str,
        instance: Option<&'v Value>,
    ) -> Result<Option<&'v Value>, ValidateError> {
        let instance = match instance {
            Some(instance) => instance,
            None => {
                if schema.required {
                    self.push_error(name, "is required".to_owned());
                }
                return Ok(None);
            }
        };

        let types = self.types;
        let type_name = schema.type_name();
        let is_type = types
            .get(type_name)
            .ok_or_else(|| ValidateError::UnknownType(type_name.to_owned()))?;
        if !is_type(instance) {
            self.push_error(name, format!("type must be {}", type_name));
            return Ok(None);
        }

        if let Some(format) = schema.format() {
            let formats = self.formats;
            let matches_format = formats
                .get(format)
                .ok_or_else(|| ValidateError::UnknownFormat(format.to_owned()))?;
            if !matches_format(&*coerce_to_string(instance)) {
                self.push_error(name, format!("format must be {}", format));
                return Ok(None);
            }
        }

        Ok(Some(instance))
    }

    fn push_error(&mut self, name: &str, reason: String) {
        // The first token is the synthetic root, which never appears in paths.
        let path = self
            .path
            .iter()
            .skip(1)
            .map(String::as_str)
            .chain(iter::once(name))
            .collect::<Vec<_>>()
            .join(".");

        debug!(path = path.as_str(), reason = reason.as_str(), "field rejected");
        self.errors.insert(path, reason);
    }

    fn push_path_token(&mut self, token: &str) -> Result<(), ValidateError> {
        self.path.push(token.to_owned());
        trace!(depth = self.path.len(), "entering {}", token);

        if self.max_depth != 0 && self.path.len() > self.max_depth {
            return Err(ValidateError::MaxDepthExceeded);
        }

        Ok(())
    }

    fn pop_path_token(&mut self) {
        self.path.pop();
    }
}

/// Renders a value as text for format checks. Whole-number floats print
/// without a fractional part, so they read the same as the integers the
/// `integer` type accepts.
fn coerce_to_string(value: &Value) -> Cow<'_, str> {
    match value {
        Value::String(s) => Cow::Borrowed(s),
        Value::Number(n) => match n.as_f64() {
            Some(f)
                if n.is_f64()
                    && f.fract() == 0.0
                    && f >= i64::MIN as f64
                    && f < i64::MAX as f64 =>
            {
                Cow::Owned((f as i64).to_string())
            }
            _ => Cow::Owned(n.to_string()),
        },
        other => Cow::Owned(other.to_string()),
    }
}
