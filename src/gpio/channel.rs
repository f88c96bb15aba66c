//! Channel addressing: device groups, signal kinds, and the channel kinds
//! a callback can be registered against.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::RegistrationError;

/// Digital input lines on the tool (end-effector) connector.
pub const LOCAL_DIGITAL_LINES: usize = 2;
/// Analog input lines on the tool connector.
pub const LOCAL_ANALOG_LINES: usize = 2;
/// Digital input lines in the control box.
pub const CONTROLLER_DIGITAL_LINES: usize = 16;
/// Analog input lines in the control box.
pub const CONTROLLER_ANALOG_LINES: usize = 2;

/// Widest line group; bounds every [`LineValues`].
pub const MAX_LINES: usize = CONTROLLER_DIGITAL_LINES;

/// Values of one signal kind, indexed by line.
pub type LineValues = heapless::Vec<f32, MAX_LINES>;

/// Copy up to [`MAX_LINES`] values into a [`LineValues`].
pub fn line_values(values: &[f32]) -> LineValues {
    values.iter().copied().take(MAX_LINES).collect()
}

/// Physical I/O group on the arm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IoGroup {
    /// Tool-flange I/O.
    Local,
    /// Control-box I/O.
    Controller,
}

impl IoGroup {
    pub(crate) const fn slot(self) -> usize {
        match self {
            Self::Local => 0,
            Self::Controller => 1,
        }
    }
}

/// What a stored array of line values represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignalKind {
    Digital,
    Analog,
    /// Mirror of the digital outputs.
    DigitalOutput,
    /// Mirror of the analog outputs.
    AnalogOutput,
}

impl SignalKind {
    pub(crate) const COUNT: usize = 4;

    pub(crate) const fn slot(self) -> usize {
        match self {
            Self::Digital => 0,
            Self::Analog => 1,
            Self::DigitalOutput => 2,
            Self::AnalogOutput => 3,
        }
    }
}

/// Channel kinds a callback can be registered against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChannelKind {
    LocalDigital,
    LocalAnalog,
    ControllerDigital,
    ControllerAnalog,
}

impl ChannelKind {
    pub const ALL: [Self; 4] = [
        Self::LocalDigital,
        Self::LocalAnalog,
        Self::ControllerDigital,
        Self::ControllerAnalog,
    ];

    pub const fn group(self) -> IoGroup {
        match self {
            Self::LocalDigital | Self::LocalAnalog => IoGroup::Local,
            Self::ControllerDigital | Self::ControllerAnalog => IoGroup::Controller,
        }
    }

    pub const fn signal(self) -> SignalKind {
        match self {
            Self::LocalDigital | Self::ControllerDigital => SignalKind::Digital,
            Self::LocalAnalog | Self::ControllerAnalog => SignalKind::Analog,
        }
    }

    /// Number of lines addressable through this kind.
    pub const fn width(self) -> usize {
        match self {
            Self::LocalDigital => LOCAL_DIGITAL_LINES,
            Self::LocalAnalog => LOCAL_ANALOG_LINES,
            Self::ControllerDigital => CONTROLLER_DIGITAL_LINES,
            Self::ControllerAnalog => CONTROLLER_ANALOG_LINES,
        }
    }

    /// The read that produces values for this kind.
    pub const fn unit(self) -> PollUnit {
        match self {
            Self::LocalDigital => PollUnit::LocalDigital,
            Self::LocalAnalog => PollUnit::LocalAnalog,
            Self::ControllerDigital | Self::ControllerAnalog => PollUnit::Controller,
        }
    }
}

impl fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::LocalDigital => "tgpio-digital",
            Self::LocalAnalog => "tgpio-analog",
            Self::ControllerDigital => "cgpio-digital",
            Self::ControllerAnalog => "cgpio-analog",
        };
        f.write_str(name)
    }
}

impl FromStr for ChannelKind {
    type Err = RegistrationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "tgpio-digital" | "local-digital" => Ok(Self::LocalDigital),
            "tgpio-analog" | "local-analog" => Ok(Self::LocalAnalog),
            "cgpio-digital" | "controller-digital" => Ok(Self::ControllerDigital),
            "cgpio-analog" | "controller-analog" => Ok(Self::ControllerAnalog),
            _ => Err(RegistrationError::InvalidChannelKind),
        }
    }
}

/// One synchronous read issued by the poller per tick.
///
/// The controller group is read as a single packed state, so both of its
/// channel kinds share one unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PollUnit {
    LocalDigital,
    LocalAnalog,
    Controller,
}

impl PollUnit {
    /// Fixed processing order within a tick.
    pub const ORDER: [Self; 3] = [Self::LocalDigital, Self::LocalAnalog, Self::Controller];

    pub const fn group(self) -> IoGroup {
        match self {
            Self::LocalDigital | Self::LocalAnalog => IoGroup::Local,
            Self::Controller => IoGroup::Controller,
        }
    }
}

impl fmt::Display for PollUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::LocalDigital => "tgpio-digital",
            Self::LocalAnalog => "tgpio-analog",
            Self::Controller => "cgpio-state",
        };
        f.write_str(name)
    }
}
