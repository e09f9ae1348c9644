#![no_main]

use libfuzzer_sys::fuzz_target;

use snmpc::mib::{self, LookupMode};
use snmpc::oid::Oid;

fuzz_target!(|data: &[u8]| {
    if let Ok(oid) = Oid::from_ber(data) {
        let _ = mib::render(&oid, LookupMode::Full);
    }

    if let Ok(s) = std::str::from_utf8(data) {
        let _ = Oid::parse(s);
        if let Ok(oid) = mib::resolve(s) {
            let _ = mib::render(&oid, LookupMode::Short);
        }
    }
});
