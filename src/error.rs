//! Unified error types for the GPIO event core.
//!
//! A single `Error` enum that every subsystem converts into, so the
//! binary's top-level handling stays uniform.  The sub-enums are `Copy`
//! so they can be passed through events and logged without allocation.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Every fallible operation in the crate funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A callback registration was rejected.
    Registration(RegistrationError),
    /// An I/O read against the arm controller failed.
    Io(IoError),
    /// A motion or output command was rejected by the arm.
    Arm(ArmError),
    /// Configuration is invalid or could not be loaded.
    Config(ConfigError),
    /// A worker thread could not be started.
    Spawn(&'static str),
    /// A worker thread panicked before returning.
    TaskPanicked(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Registration(e) => write!(f, "registration: {e}"),
            Self::Io(e) => write!(f, "io: {e}"),
            Self::Arm(e) => write!(f, "arm: {e}"),
            Self::Config(e) => write!(f, "config: {e}"),
            Self::Spawn(name) => write!(f, "failed to spawn thread '{name}'"),
            Self::TaskPanicked(name) => write!(f, "thread '{name}' panicked"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Registration errors
// ---------------------------------------------------------------------------

/// Rejections raised at registration time, before anything reaches the
/// polling loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationError {
    /// Operator text is not one of `==`, `!=`, `<`, `<=`, `>`, `>=`.
    InvalidOperator,
    /// Channel kind text is not a known channel group/kind.
    InvalidChannelKind,
    /// Line index is outside the width of the channel kind.
    IndexOutOfRange { index: usize, width: usize },
    /// Threshold is NaN or infinite.
    NonFiniteThreshold,
}

impl fmt::Display for RegistrationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidOperator => write!(f, "invalid comparison operator"),
            Self::InvalidChannelKind => write!(f, "invalid channel kind"),
            Self::IndexOutOfRange { index, width } => {
                write!(f, "line index {index} out of range (width {width})")
            }
            Self::NonFiniteThreshold => write!(f, "threshold must be finite"),
        }
    }
}

impl std::error::Error for RegistrationError {}

impl From<RegistrationError> for Error {
    fn from(e: RegistrationError) -> Self {
        Self::Registration(e)
    }
}

// ---------------------------------------------------------------------------
// I/O read errors
// ---------------------------------------------------------------------------

/// Failure of a single synchronous read.  Always transient from the
/// poller's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IoError {
    /// The controller answered with a nonzero status code.
    Status(i32),
    /// The controller did not answer.
    Timeout,
}

impl fmt::Display for IoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Status(code) => write!(f, "read failed with status {code}"),
            Self::Timeout => write!(f, "read timed out"),
        }
    }
}

impl std::error::Error for IoError {}

impl From<IoError> for Error {
    fn from(e: IoError) -> Self {
        Self::Io(e)
    }
}

// ---------------------------------------------------------------------------
// Arm command errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArmError {
    /// The controller rejected the command with this code.
    Code(i32),
    /// The connection to the controller is gone.
    NotConnected,
}

impl fmt::Display for ArmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Code(code) => write!(f, "command failed, code={code}"),
            Self::NotConnected => write!(f, "not connected"),
        }
    }
}

impl std::error::Error for ArmError {}

impl From<ArmError> for Error {
    fn from(e: ArmError) -> Self {
        Self::Arm(e)
    }
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// Stored config failed deserialization.
    Corrupted,
    /// A config field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
    /// Generic I/O error from the storage backend.
    IoError,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {msg}"),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
