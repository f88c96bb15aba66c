//! Fuzz target: textual registration
//!
//! Splits arbitrary input into a channel kind, an operator and an index
//! and registers it.  Parsing must never panic, and an accepted
//! registration must always address a line inside its channel.
//!
//! cargo fuzz run fuzz_registration_text

#![no_main]

use armgpio::gpio::CallbackRegistry;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = core::str::from_utf8(data) else {
        return;
    };
    let mut parts = text.splitn(3, ' ');
    let kind = parts.next().unwrap_or("");
    let op = parts.next().unwrap_or("");
    let index = parts.next().and_then(|s| s.parse::<usize>().ok()).unwrap_or(0);

    let registry = CallbackRegistry::new();
    if registry.register_parsed(kind, index, op, 0.0, || {}).is_ok() {
        let entries = registry.iterate();
        let entry = entries.iter().next().expect("accepted registration is stored");
        assert!(entry.index < entry.kind.width());
        assert_eq!(entry.kind.to_string().parse(), Ok(entry.kind));
        assert_eq!(entry.op.symbol().parse(), Ok(entry.op));
    }
});
