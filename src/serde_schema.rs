use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A JSON representation of schema nodes, compatible with `serde_json`.
///
/// To convert this into a [`Schema`][`crate::Schema`], see
/// [`Schema::from_serde_schema`][`crate::Schema::from_serde_schema`] or
/// [`Validator::compile`][`crate::Validator::compile`].
///
/// Keywords other than the ones below are ignored.
///
/// ```
/// use shapeguard::SerdeSchema;
/// use serde_json::json;
///
/// assert_eq!(
///     SerdeSchema { type_: Some("string".to_owned()), required: Some(true), ..Default::default() },
///     serde_json::from_value::<SerdeSchema>(json!({ "type": "string", "required": true })).unwrap()
/// )
/// ```
#[derive(Clone, Serialize, Deserialize, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SerdeSchema {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<BTreeMap<String, SerdeSchema>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<SerdeSchema>>,
}
