//! Fuzz target: `ControllerState::derive`
//!
//! Builds a controller state from raw bytes (masks, analog values and
//! per-line function codes) and checks the derived line values.
//!
//! cargo fuzz run fuzz_controller_state

#![no_main]

use armgpio::gpio::ControllerState;
use armgpio::gpio::controller::is_special_mode;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() < 8 {
        return;
    }
    let (head, codes) = data.split_at(8);
    let input_mask = u32::from_le_bytes([head[0], head[1], head[2], head[3]]);
    let output_mask = u32::from_le_bytes([head[4], head[5], head[6], head[7]]);

    let mut state = ControllerState::general_purpose(input_mask, output_mask);
    for (slot, code) in state.input_functions.iter_mut().zip(codes) {
        *slot = *code;
    }
    // Shorter function tables than 16 lines are legal.
    if let Some(&len) = codes.get(16) {
        state.input_functions.truncate(usize::from(len) % 17);
    }

    let derived = state.derive();
    let inputs = &derived[0].1;
    assert_eq!(inputs.len(), state.input_functions.len());
    for (line, value) in inputs.iter().enumerate() {
        assert!(*value == 0.0 || *value == 1.0);
        if is_special_mode(state.input_functions[line]) {
            assert_eq!(*value, 1.0);
        }
    }
    assert!(derived[2].1.iter().all(|v| *v == 0.0 || *v == 1.0));
});
