//! Control-box I/O state and the per-line values derived from it.
//!
//! The controller answers a single status request with packed fields: a
//! digital input bitmask, a digital output bitmask, the analog inputs and
//! outputs, and a function code per line.  A line configured for a
//! special function (anything other than general-purpose I/O) always
//! reports `1` regardless of its bit.  The derived arrays are recomputed
//! from the raw state on every read.

use super::channel::{
    CONTROLLER_ANALOG_LINES, CONTROLLER_DIGITAL_LINES, LineValues, SignalKind, line_values,
};

/// Function code of a general-purpose line.
pub const FUNCTION_GENERAL: u8 = 0;
/// Function code reported for a line with no function assigned.
pub const FUNCTION_UNASSIGNED: u8 = 255;

/// Per-line function codes, one per controller digital line.
pub type FunctionCodes = heapless::Vec<u8, CONTROLLER_DIGITAL_LINES>;

/// True when a line with this input function code ignores its bitmask bit.
pub const fn is_special_mode(code: u8) -> bool {
    !matches!(code, FUNCTION_GENERAL | FUNCTION_UNASSIGNED)
}

/// Raw controller I/O status as returned by one state request.
#[derive(Debug, Clone, PartialEq)]
pub struct ControllerState {
    pub digital_input_mask: u32,
    pub digital_output_mask: u32,
    pub analog_inputs: [f32; CONTROLLER_ANALOG_LINES],
    pub analog_outputs: [f32; CONTROLLER_ANALOG_LINES],
    pub input_functions: FunctionCodes,
    pub output_functions: FunctionCodes,
}

impl ControllerState {
    /// State with every line in general-purpose mode.
    pub fn general_purpose(digital_input_mask: u32, digital_output_mask: u32) -> Self {
        let all_general: FunctionCodes =
            core::iter::repeat_n(FUNCTION_GENERAL, CONTROLLER_DIGITAL_LINES).collect();
        Self {
            digital_input_mask,
            digital_output_mask,
            analog_inputs: [0.0; CONTROLLER_ANALOG_LINES],
            analog_outputs: [0.0; CONTROLLER_ANALOG_LINES],
            input_functions: all_general.clone(),
            output_functions: all_general,
        }
    }

    /// Digital input lines, one per input function code.
    pub fn digital_inputs(&self) -> LineValues {
        self.input_functions
            .iter()
            .enumerate()
            .map(|(line, &code)| {
                if is_special_mode(code) {
                    1.0
                } else {
                    mask_bit(self.digital_input_mask, line)
                }
            })
            .collect()
    }

    /// Digital output mirror, one per output function code.
    pub fn digital_outputs(&self) -> LineValues {
        (0..self.output_functions.len())
            .map(|line| mask_bit(self.digital_output_mask, line))
            .collect()
    }

    /// Every derived signal, in storage order.
    pub fn derive(&self) -> [(SignalKind, LineValues); 4] {
        [
            (SignalKind::Digital, self.digital_inputs()),
            (SignalKind::Analog, line_values(&self.analog_inputs)),
            (SignalKind::DigitalOutput, self.digital_outputs()),
            (SignalKind::AnalogOutput, line_values(&self.analog_outputs)),
        ]
    }
}

fn mask_bit(mask: u32, line: usize) -> f32 {
    if line < 32 && (mask >> line) & 1 == 1 {
        1.0
    } else {
        0.0
    }
}
