#![no_main]

use libfuzzer_sys::fuzz_target;
use serde_json::json;

fuzz_target!(|data: &[u8]| {
    let s = String::from_utf8_lossy(data);

    let Ok(schema) = formlogic::parse_schema(&s) else {
        return;
    };

    // Checking and validating any parsed schema must not panic.
    let _ = formlogic::check_schema(&schema);
    let Ok(snapshot) = formlogic::form_data(json!({ "field": "value", "n": 3 })) else {
        return;
    };
    let _ = formlogic::validate_all(&schema, &snapshot, &formlogic::ValidationOptions::default());
});
