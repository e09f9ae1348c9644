#![no_main]

use bytes::Bytes;
use libfuzzer_sys::fuzz_target;

use snmpc::ber::Decoder;
use snmpc::message::CommunityMessage;
use snmpc::pdu::Pdu;
use snmpc::value::Value;
use snmpc::varbind::VarBind;

fuzz_target!(|data: &[u8]| {
    let bytes = Bytes::copy_from_slice(data);

    // Whole reply datagrams, as the response interpreter sees them
    if let Ok(message) = CommunityMessage::decode(bytes.clone()) {
        // Anything that decodes must encode again
        let _ = message.encode();
    }

    let mut decoder = Decoder::new(bytes.clone());
    let _ = Pdu::decode(&mut decoder);

    let mut decoder = Decoder::new(bytes.clone());
    let _ = VarBind::decode(&mut decoder);

    let mut decoder = Decoder::new(bytes);
    if let Ok(value) = Value::decode(&mut decoder) {
        let _ = value.to_string();
    }
});
