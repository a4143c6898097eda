#![no_main]

use libfuzzer_sys::fuzz_target;
use linehook::channels::{LineClient, WebhookParser};

fuzz_target!(|data: &[u8]| {
    let Ok(client) = LineClient::new("fuzz-secret", "fuzz-token") else {
        return;
    };
    // Sign the input so the parser gets past verification and reaches serde.
    let signature = client.sign(data);
    let _ = client.parse(Some(&signature), data);
    let _ = client.parse(None, data);
});
