#![no_main]

use libfuzzer_sys::fuzz_target;

use fdec::ToDecimal;

fuzz_target!(|value: f32| {
    let text = value.to_decimal();

    if value.is_nan() {
        assert_eq!(text, "NaN");
        return;
    }

    // to_decimal output must always parse, and the bits must match exactly
    // (signed zeros and infinities included)
    let parsed: f32 = text
        .parse()
        .unwrap_or_else(|_| panic!("Failed to parse to_decimal output: {}", text));
    assert_eq!(
        value.to_bits(),
        parsed.to_bits(),
        "roundtrip mismatch: {:08x} -> {} -> {:08x}",
        value.to_bits(),
        text,
        parsed.to_bits()
    );
});
