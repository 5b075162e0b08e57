#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let s = String::from_utf8_lossy(data);

    let config = match formlogic::parse_rules(&s) {
        Ok(c) => c,
        Err(_) => return,
    };

    let yaml = match formlogic::serialize_rules(&config) {
        Ok(y) => y,
        Err(_) => return,
    };

    match formlogic::parse_rules(&yaml) {
        Ok(reparsed) => assert_eq!(reparsed, config, "serialized YAML:\n{}", yaml),
        Err(e) => panic!(
            "Roundtrip failure: {}\nInput (lossy): {:?}\nSerialized YAML:\n{}",
            e,
            s.get(..200).unwrap_or(&s),
            yaml.get(..500).unwrap_or(&yaml),
        ),
    }
});
