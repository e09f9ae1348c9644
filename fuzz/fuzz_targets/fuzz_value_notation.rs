#![no_main]

use libfuzzer_sys::fuzz_target;

use snmpc::agent::{AgentSpec, DEFAULT_PORT};
use snmpc::parse_value;

fuzz_target!(|data: &[u8]| {
    let Ok(s) = std::str::from_utf8(data) else {
        return;
    };

    // First character is the type tag, the rest the literal
    let mut chars = s.chars();
    if let Some(tag) = chars.next() {
        let _ = parse_value("1.3.6.1.4.1.1", &tag.to_string(), chars.as_str());
    }

    let _ = AgentSpec::parse(s, DEFAULT_PORT);
});
