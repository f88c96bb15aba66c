//! The GPIO poll loop.
//!
//! ## Lifecycle
//!
//! The poller is constructed in RUNNING and moves to STOPPED exactly once,
//! when the arm disconnects, reports a nonzero error code, or the shared
//! quit flag is raised.  Stop conditions are checked before every tick, so
//! after a fault no further reads are issued.  A stopped poller is never
//! restarted; build a new one.
//!
//! ## Tick
//!
//! Units are processed in the fixed order local digital, local analog,
//! controller.  A unit is read only if a registration needs it or its
//! listen flag is set.  For each successful read:
//!
//! 1. every registration served by the unit is checked, in registration
//!    order, for `op(current) && !op(previous)` on its line;
//! 2. matching registrations are handed to the [`Dispatcher`];
//! 3. the reading becomes the stored snapshot.
//!
//! A failed read is logged and skipped; the snapshot keeps the previous
//! reading.  The first successful read of an entry only seeds it.

use core::fmt;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use log::{error, info, warn};

use super::channel::{IoGroup, LineValues, PollUnit, SignalKind};
use super::dispatch::Dispatcher;
use super::registry::{CallbackRegistry, Entries, Registration};
use super::snapshot::SnapshotStore;
use crate::app::events::AppEvent;
use crate::app::ports::{EventSink, IoPort};
use crate::app::shared::SharedState;
use crate::config::{ListenFlags, SystemConfig};
use crate::error::{Error, IoError, Result};
use crate::task::{POLLER_STACK_KB, spawn_task};

/// Why the loop left RUNNING.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    Disconnected,
    /// The arm reported this nonzero error code.
    ActuatorFault(i32),
    QuitRequested,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disconnected => write!(f, "arm disconnected"),
            Self::ActuatorFault(code) => write!(f, "arm error code {code}"),
            Self::QuitRequested => write!(f, "quit requested"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollerState {
    Running,
    Stopped(StopReason),
}

/// What one tick did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Reads issued.
    pub reads: u8,
    /// Reads that failed and were skipped.
    pub failed_reads: u8,
    /// Actions handed to the dispatcher.
    pub fired: usize,
}

/// Values produced by one unit read, freshly derived.
enum UnitReading {
    Local((SignalKind, LineValues)),
    Controller([(SignalKind, LineValues); 4]),
}

impl UnitReading {
    fn signals(&self) -> &[(SignalKind, LineValues)] {
        match self {
            Self::Local(pair) => core::slice::from_ref(pair),
            Self::Controller(all) => all,
        }
    }

    fn values(&self, signal: SignalKind) -> Option<&[f32]> {
        self.signals()
            .iter()
            .find(|(s, _)| *s == signal)
            .map(|(_, v)| v.as_slice())
    }
}

pub struct GpioPoller<P, S> {
    port: Arc<P>,
    registry: Arc<CallbackRegistry>,
    shared: Arc<SharedState>,
    sink: S,
    snapshot: SnapshotStore,
    listen: ListenFlags,
    dispatcher: Dispatcher,
    interval: Duration,
    state: PollerState,
    tick_count: u64,
}

impl<P: IoPort, S: EventSink> GpioPoller<P, S> {
    pub fn new(
        port: Arc<P>,
        registry: Arc<CallbackRegistry>,
        shared: Arc<SharedState>,
        sink: S,
        config: &SystemConfig,
    ) -> Self {
        Self {
            port,
            registry,
            shared,
            sink,
            snapshot: SnapshotStore::new(),
            listen: config.listen,
            dispatcher: Dispatcher::new(config.execution_mode),
            interval: Duration::from_millis(u64::from(config.poll_interval_ms)),
            state: PollerState::Running,
            tick_count: 0,
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn state(&self) -> PollerState {
        self.state
    }

    pub fn snapshot(&self) -> &SnapshotStore {
        &self.snapshot
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// The first stop condition that currently holds, if any.
    pub fn stop_condition(&self) -> Option<StopReason> {
        if !self.port.is_connected() {
            return Some(StopReason::Disconnected);
        }
        let code = self.port.error_code();
        if code != 0 {
            return Some(StopReason::ActuatorFault(code));
        }
        if self.shared.quit_requested() {
            return Some(StopReason::QuitRequested);
        }
        None
    }

    // ── Loop ──────────────────────────────────────────────────

    /// Poll until a stop condition holds.  Returns immediately if the
    /// poller already stopped.
    pub fn run(&mut self) -> StopReason {
        if let PollerState::Stopped(reason) = self.state {
            return reason;
        }

        let interval_ms = self.interval.as_millis() as u64;
        info!(
            "GPIO: poller running (interval={}ms, mode={:?}, registrations={})",
            interval_ms,
            self.dispatcher.mode(),
            self.registry.len()
        );
        self.sink.emit(&AppEvent::PollerStarted { interval_ms });

        let reason = loop {
            if let Some(reason) = self.stop_condition() {
                break reason;
            }
            let started = Instant::now();
            self.tick();
            if let Some(rest) = self.interval.checked_sub(started.elapsed()) {
                thread::sleep(rest);
            }
        };

        self.state = PollerState::Stopped(reason);
        info!("GPIO: poller stopped after {} ticks ({})", self.tick_count, reason);
        self.sink.emit(&AppEvent::PollerStopped(reason));
        reason
    }

    /// One poll pass over every monitored unit.  A stopped poller issues
    /// no reads and reports an empty tick.
    pub fn tick(&mut self) -> TickReport {
        if matches!(self.state, PollerState::Stopped(_)) {
            return TickReport::default();
        }
        self.tick_count += 1;
        let entries = self.registry.iterate();
        let mut report = TickReport::default();

        for unit in PollUnit::ORDER {
            if !self.listen.is_listening(unit) && entries.for_unit(unit).next().is_none() {
                continue;
            }

            report.reads += 1;
            let reading = match self.read_unit(unit) {
                Ok(reading) => reading,
                Err(error) => {
                    report.failed_reads += 1;
                    warn!("GPIO: {} read failed: {}", unit, error);
                    self.sink.emit(&AppEvent::ReadFailed { unit, error });
                    continue;
                }
            };

            for (registration, previous, current) in
                self.detect_edges(&entries, unit, &reading)
            {
                self.sink.emit(&AppEvent::EdgeFired {
                    id: registration.id,
                    kind: registration.kind,
                    index: registration.index,
                    previous,
                    current,
                });
                if let Err(e) = self.dispatcher.dispatch(registration) {
                    error!("GPIO: {} dispatch failed: {}", registration.id, e);
                    continue;
                }
                report.fired += 1;
            }

            let group = unit.group();
            for (signal, values) in reading.signals() {
                self.snapshot.update(group, *signal, values);
            }
        }

        report
    }

    // ── Internal ──────────────────────────────────────────────

    fn read_unit(&self, unit: PollUnit) -> core::result::Result<UnitReading, IoError> {
        Ok(match unit {
            PollUnit::LocalDigital => {
                UnitReading::Local((SignalKind::Digital, self.port.read_local_digital()?))
            }
            PollUnit::LocalAnalog => {
                UnitReading::Local((SignalKind::Analog, self.port.read_local_analog()?))
            }
            PollUnit::Controller => {
                UnitReading::Controller(self.port.read_controller_state()?.derive())
            }
        })
    }

    /// Registrations of `unit` whose condition became true, in
    /// registration order, with the values that produced the edge.
    fn detect_edges<'e>(
        &self,
        entries: &'e Entries,
        unit: PollUnit,
        reading: &UnitReading,
    ) -> Vec<(&'e Arc<Registration>, f32, f32)> {
        let group: IoGroup = unit.group();
        entries
            .for_unit(unit)
            .filter_map(|r| {
                let signal = r.kind.signal();
                let previous = *self.snapshot.get(group, signal)?.get(r.index)?;
                let current = *reading.values(signal)?.get(r.index)?;
                r.is_edge(previous, current).then_some((r, previous, current))
            })
            .collect()
    }
}

impl<P, S> GpioPoller<P, S>
where
    P: IoPort + 'static,
    S: EventSink + Send + 'static,
{
    /// Move the poller onto its own named thread.
    pub fn spawn(mut self) -> Result<PollerHandle> {
        let shared = Arc::clone(&self.shared);
        let handle = spawn_task("gpio-poller", POLLER_STACK_KB, move || self.run())?;
        Ok(PollerHandle { handle, shared })
    }
}

/// Owner-side handle of a spawned poller.
pub struct PollerHandle {
    handle: JoinHandle<StopReason>,
    shared: Arc<SharedState>,
}

impl PollerHandle {
    pub fn is_alive(&self) -> bool {
        !self.handle.is_finished()
    }

    /// Raise the shared quit flag; the loop exits before its next tick.
    pub fn request_stop(&self) {
        self.shared.request_quit();
    }

    pub fn join(self) -> Result<StopReason> {
        self.handle
            .join()
            .map_err(|_| Error::TaskPanicked("gpio-poller"))
    }
}
