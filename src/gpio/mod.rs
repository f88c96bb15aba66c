//! GPIO edge-event core.
//!
//! A single background poller samples the arm's I/O groups on a fixed
//! cadence, compares each reading against the previous one through the
//! registered conditions, and fires actions only on a transition into the
//! condition.
//!
//! ```text
//!  IoPort ──read──▶ ┌──────────────┐ ──compare──▶ CallbackRegistry
//!                   │  GpioPoller  │                   │
//!  SnapshotStore ◀──│  (one task)  │ ◀──── fired ──────┘
//!                   └──────┬───────┘
//!                          ▼
//!                     Dispatcher ──▶ inline call / spawned thread
//! ```

pub mod channel;
pub mod comparator;
pub mod controller;
pub mod dispatch;
pub mod poller;
pub mod registry;
pub mod snapshot;

pub use channel::{ChannelKind, IoGroup, LineValues, PollUnit, SignalKind};
pub use comparator::CompareOp;
pub use controller::ControllerState;
pub use dispatch::{Dispatcher, ExecutionMode};
pub use poller::{GpioPoller, PollerHandle, PollerState, StopReason, TickReport};
pub use registry::{CallbackRegistry, Registration, RegistrationId};
pub use snapshot::SnapshotStore;
