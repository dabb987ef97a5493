use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// A predicate deciding whether a value is of a given type.
pub type TypePredicate = Arc<dyn Fn(&Value) -> bool + Send + Sync>;

/// Mapping from schema `type` names to value predicates.
///
/// `TypeRegistry::default()` holds the built-in types (`integer`, `string`,
/// `array`, `object`, `boolean`). `TypeRegistry::new()` is empty.
///
/// ```
/// use shapeguard::TypeRegistry;
/// use serde_json::json;
///
/// let types = TypeRegistry::default().register("number", |v| v.is_number());
/// assert!(types.get("number").unwrap()(&json!(1.5)));
/// assert!(!types.get("integer").unwrap()(&json!(1.5)));
/// ```
#[derive(Clone)]
pub struct TypeRegistry {
    predicates: BTreeMap<String, TypePredicate>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self {
            predicates: BTreeMap::new(),
        }
    }

    /// Adds `predicate` under `name`, replacing any previous entry.
    pub fn register<F>(mut self, name: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        self.predicates.insert(name.into(), Arc::new(predicate));
        self
    }

    pub fn get(&self, name: &str) -> Option<&TypePredicate> {
        self.predicates.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.predicates.contains_key(name)
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
            .register("integer", is_integer)
            .register("string", Value::is_string)
            .register("array", Value::is_array)
            .register("object", Value::is_object)
            .register("boolean", Value::is_boolean)
    }
}

impl fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.predicates.keys()).finish()
    }
}

/// Numbers with no fractional part, whatever their JSON representation.
pub fn is_integer(value: &Value) -> bool {
    match value {
        Value::Number(n) if n.is_i64() || n.is_u64() => true,
        Value::Number(n) => n.as_f64().map_or(false, |f| f.fract() == 0.0),
        _ => false,
    }
}
