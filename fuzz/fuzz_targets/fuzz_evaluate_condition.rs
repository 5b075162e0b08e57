#![no_main]

use arbitrary::{Arbitrary, Unstructured};
use formlogic::enums::Operator;
use formlogic::primitives::evaluate_condition;
use formlogic::types::{Condition, FormData};
use libfuzzer_sys::fuzz_target;
use serde_json::Value;

const OPERATORS: &[&str] = &[
    "equals",
    "not_equals",
    "greater_than",
    "less_than",
    "contains",
    "not_contains",
    "in",
    "not_in",
    "exists",
    "not_exists",
    "bogus",
];

/// Generate a simple arbitrary JSON value from fuzzer bytes.
fn arbitrary_value(u: &mut Unstructured<'_>) -> arbitrary::Result<Value> {
    match u.int_in_range(0..=4)? {
        0 => Ok(Value::Null),
        1 => Ok(Value::Bool(bool::arbitrary(u)?)),
        2 => {
            let n = f64::arbitrary(u)?;
            Ok(serde_json::Number::from_f64(n)
                .map(Value::Number)
                .unwrap_or(Value::Null))
        }
        3 => Ok(Value::String(String::arbitrary(u)?)),
        _ => {
            let len = u.int_in_range(0..=3)?;
            let mut items = Vec::with_capacity(len);
            for _ in 0..len {
                items.push(Value::String(String::arbitrary(u)?));
            }
            Ok(Value::Array(items))
        }
    }
}

fn arbitrary_condition(u: &mut Unstructured<'_>) -> arbitrary::Result<Condition> {
    let name = *u.choose(OPERATORS)?;
    let mut cond = Condition::new("field", Operator::from(name.to_string()));
    if bool::arbitrary(u)? {
        cond.value = Some(arbitrary_value(u)?);
    }
    if bool::arbitrary(u)? {
        let len = u.int_in_range(0..=5)?;
        let mut values = Vec::with_capacity(len);
        for _ in 0..len {
            values.push(arbitrary_value(u)?);
        }
        cond.values = Some(values);
    }
    Ok(cond)
}

fuzz_target!(|data: &[u8]| {
    let mut u = Unstructured::new(data);

    let Ok(cond) = arbitrary_condition(&mut u) else {
        return;
    };

    let mut snapshot = FormData::new();
    match bool::arbitrary(&mut u) {
        Ok(true) => match arbitrary_value(&mut u) {
            Ok(v) => {
                snapshot.insert("field".to_string(), v);
            }
            Err(_) => return,
        },
        Ok(false) => {}
        Err(_) => return,
    }

    let _ = evaluate_condition(&cond, &snapshot);
});
