#![no_main]
use libfuzzer_sys::fuzz_target;

use serde_json::Value;
use shapeguard::{Schema, ValidateOptions, Validator};

fuzz_target!(|schema_and_instance: (Vec<u8>, Vec<u8>)| {
    let schema = match serde_json::from_slice(&schema_and_instance.0)
        .ok()
        .and_then(|serde_schema| Schema::from_serde_schema(serde_schema).ok())
    {
        Some(schema) => schema,
        None => return,
    };

    let instance: Value = match serde_json::from_slice(&schema_and_instance.1) {
        Ok(instance) => instance,
        Err(_) => return,
    };

    let validator = Validator::new().with_options(ValidateOptions::new().with_max_depth(64));
    let first = match validator.validate(&schema, Some(&instance)) {
        Ok(validation) => validation,
        Err(_) => return,
    };

    // Everything dropped once stays dropped, so sanitizing is a fixpoint.
    if let Some(data) = &first.data {
        let second = validator.validate(&schema, Some(data)).unwrap();
        assert_eq!(first.data, second.data);
    }
});
