//! Integration tests for the poll loop: registry → poller → dispatcher.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use armgpio::app::events::AppEvent;
use armgpio::app::shared::SharedState;
use armgpio::config::SystemConfig;
use armgpio::error::IoError;
use armgpio::gpio::controller::FUNCTION_UNASSIGNED;
use armgpio::gpio::{
    CallbackRegistry, ChannelKind, CompareOp, ControllerState, ExecutionMode, GpioPoller, IoGroup,
    PollUnit, PollerState, RegistrationId, SignalKind, StopReason, TickReport,
};

use super::mock_hw::{MockArm, RecordingSink};

const ALL_HIGH: u32 = 0xFFFF;
const DI7_LOW: u32 = ALL_HIGH & !(1 << 7);

fn config(mode: ExecutionMode) -> SystemConfig {
    SystemConfig {
        poll_interval_ms: 1,
        execution_mode: mode,
        ..SystemConfig::default()
    }
}

fn make_poller(
    arm: &Arc<MockArm>,
    registry: &Arc<CallbackRegistry>,
    mode: ExecutionMode,
) -> (GpioPoller<MockArm, RecordingSink>, RecordingSink, Arc<SharedState>) {
    let sink = RecordingSink::new();
    let shared = Arc::new(SharedState::new());
    let poller = GpioPoller::new(
        Arc::clone(arm),
        Arc::clone(registry),
        Arc::clone(&shared),
        sink.clone(),
        &config(mode),
    );
    (poller, sink, shared)
}

fn counter(hits: &Arc<AtomicUsize>) -> impl Fn() + Send + Sync + 'static {
    let hits = Arc::clone(hits);
    move || {
        hits.fetch_add(1, Ordering::SeqCst);
    }
}

// ── Button on control-box input 7 ─────────────────────────────

#[test]
fn each_press_fires_once_until_disconnect() {
    let arm = Arc::new(MockArm::new());
    let registry = Arc::new(CallbackRegistry::new());
    let hits = Arc::new(AtomicUsize::new(0));
    registry
        .register(ChannelKind::ControllerDigital, 7, CompareOp::Eq, 0.0, counter(&hits))
        .unwrap();

    for mask in [ALL_HIGH, DI7_LOW, DI7_LOW, ALL_HIGH, DI7_LOW, ALL_HIGH] {
        arm.push_controller_inputs(mask);
    }
    arm.disconnect_when_drained();

    let (mut poller, sink, _) = make_poller(&arm, &registry, ExecutionMode::Inline);
    let reason = poller.run();

    assert_eq!(reason, StopReason::Disconnected);
    assert_eq!(poller.state(), PollerState::Stopped(StopReason::Disconnected));
    assert_eq!(hits.load(Ordering::SeqCst), 2, "one firing per HIGH→LOW transition");
    assert_eq!(arm.reads(), 6);
    assert!(poller.snapshot().controller_digitals_match("11111111"));

    let events = sink.events();
    assert_eq!(events.first(), Some(&AppEvent::PollerStarted { interval_ms: 1 }));
    assert_eq!(events.last(), Some(&AppEvent::PollerStopped(StopReason::Disconnected)));
    assert_eq!(sink.fired(), 2);
}

#[test]
fn button_held_low_from_start_never_fires() {
    let arm = Arc::new(MockArm::new());
    let registry = Arc::new(CallbackRegistry::new());
    let hits = Arc::new(AtomicUsize::new(0));
    registry
        .register(ChannelKind::ControllerDigital, 7, CompareOp::Eq, 0.0, counter(&hits))
        .unwrap();

    for _ in 0..4 {
        arm.push_controller_inputs(DI7_LOW);
    }
    arm.disconnect_when_drained();

    let (mut poller, _, _) = make_poller(&arm, &registry, ExecutionMode::Inline);
    poller.run();
    assert_eq!(hits.load(Ordering::SeqCst), 0);
}

// ── Stop conditions ───────────────────────────────────────────

#[test]
fn actuator_fault_stops_before_any_read() {
    let arm = Arc::new(MockArm::new());
    arm.set_error_code(5);
    let registry = Arc::new(CallbackRegistry::new());
    registry
        .register(ChannelKind::ControllerDigital, 7, CompareOp::Eq, 0.0, || {})
        .unwrap();

    let (mut poller, sink, _) = make_poller(&arm, &registry, ExecutionMode::Inline);
    assert_eq!(poller.run(), StopReason::ActuatorFault(5));
    assert_eq!(arm.reads(), 0);
    assert_eq!(poller.tick_count(), 0);
    assert_eq!(sink.events().last(), Some(&AppEvent::PollerStopped(StopReason::ActuatorFault(5))));
}

#[test]
fn error_raised_during_a_tick_stops_before_the_next_read() {
    let arm = Arc::new(MockArm::new());
    let registry = Arc::new(CallbackRegistry::new());
    let faulting = Arc::clone(&arm);
    registry
        .register(ChannelKind::ControllerDigital, 7, CompareOp::Eq, 0.0, move || {
            faulting.set_error_code(5);
        })
        .unwrap();

    // Readings keep coming after the press; none of them may be read.
    for mask in [ALL_HIGH, DI7_LOW, ALL_HIGH, DI7_LOW, ALL_HIGH] {
        arm.push_controller_inputs(mask);
    }

    let (mut poller, sink, _) = make_poller(&arm, &registry, ExecutionMode::Inline);
    assert_eq!(poller.run(), StopReason::ActuatorFault(5));
    assert_eq!(arm.reads(), 2);
    assert_eq!(poller.tick_count(), 2);
    assert_eq!(sink.fired(), 1);

    // Ticking a stopped poller directly issues no reads either.
    assert_eq!(poller.tick(), TickReport::default());
    assert_eq!(arm.reads(), 2);
    assert_eq!(poller.tick_count(), 2);
    assert_eq!(
        sink.events().last(),
        Some(&AppEvent::PollerStopped(StopReason::ActuatorFault(5)))
    );
}

#[test]
fn stopped_poller_does_not_restart() {
    let arm = Arc::new(MockArm::new());
    arm.set_connected(false);
    let registry = Arc::new(CallbackRegistry::new());
    let (mut poller, sink, _) = make_poller(&arm, &registry, ExecutionMode::Inline);

    assert_eq!(poller.run(), StopReason::Disconnected);
    arm.set_connected(true);
    assert_eq!(poller.run(), StopReason::Disconnected);
    assert_eq!(poller.tick_count(), 0);
    // Started/stopped pair is emitted once.
    assert_eq!(sink.events().len(), 2);
}

// ── Ordering ──────────────────────────────────────────────────

#[test]
fn firings_follow_unit_order_then_registration_order() {
    let arm = Arc::new(MockArm::new());
    let registry = Arc::new(CallbackRegistry::new());
    let order = Arc::new(Mutex::new(Vec::new()));

    let push = |tag: &'static str| {
        let order = Arc::clone(&order);
        move || order.lock().unwrap().push(tag)
    };
    registry
        .register(ChannelKind::ControllerDigital, 7, CompareOp::Eq, 0.0, push("controller"))
        .unwrap();
    registry
        .register(ChannelKind::LocalDigital, 0, CompareOp::Lt, 0.5, push("local-a"))
        .unwrap();
    registry
        .register(ChannelKind::LocalDigital, 0, CompareOp::Eq, 0.0, push("local-b"))
        .unwrap();

    arm.push_local_digital(&[1.0, 1.0]);
    arm.push_local_digital(&[0.0, 1.0]);
    arm.push_controller_inputs(ALL_HIGH);
    arm.push_controller_inputs(DI7_LOW);

    let (mut poller, sink, _) = make_poller(&arm, &registry, ExecutionMode::Inline);
    poller.tick();
    let report = poller.tick();

    assert_eq!(report.fired, 3);
    assert_eq!(*order.lock().unwrap(), vec!["local-a", "local-b", "controller"]);
    let ids: Vec<RegistrationId> = sink
        .events()
        .iter()
        .filter_map(|e| match e {
            AppEvent::EdgeFired { id, .. } => Some(*id),
            _ => None,
        })
        .collect();
    assert_eq!(ids, vec![RegistrationId(1), RegistrationId(2), RegistrationId(0)]);
}

#[test]
fn duplicate_registrations_fire_independently() {
    let arm = Arc::new(MockArm::new());
    let registry = Arc::new(CallbackRegistry::new());
    let hits = Arc::new(AtomicUsize::new(0));
    for _ in 0..2 {
        registry
            .register(ChannelKind::LocalDigital, 0, CompareOp::Eq, 0.0, counter(&hits))
            .unwrap();
    }

    arm.push_local_digital(&[1.0, 1.0]);
    arm.push_local_digital(&[0.0, 1.0]);

    let (mut poller, _, _) = make_poller(&arm, &registry, ExecutionMode::Inline);
    poller.tick();
    assert_eq!(poller.tick().fired, 2);
    assert_eq!(hits.load(Ordering::SeqCst), 2);
}

// ── Failed reads ──────────────────────────────────────────────

#[test]
fn failed_read_keeps_previous_snapshot() {
    let arm = Arc::new(MockArm::new());
    let registry = Arc::new(CallbackRegistry::new());
    let hits = Arc::new(AtomicUsize::new(0));
    registry
        .register(ChannelKind::LocalDigital, 1, CompareOp::Eq, 0.0, counter(&hits))
        .unwrap();

    arm.push_local_digital(&[0.0, 1.0]);
    arm.push_local_failure(IoError::Timeout);
    arm.push_local_digital(&[0.0, 0.0]);

    let (mut poller, sink, _) = make_poller(&arm, &registry, ExecutionMode::Inline);
    poller.tick();
    let failed = poller.tick();
    assert_eq!(failed.failed_reads, 1);
    assert_eq!(
        poller.snapshot().get(IoGroup::Local, SignalKind::Digital),
        Some(&[0.0, 1.0][..])
    );

    poller.tick();
    assert_eq!(hits.load(Ordering::SeqCst), 1, "edge measured against the pre-failure reading");
    assert!(sink.events().contains(&AppEvent::ReadFailed {
        unit: PollUnit::LocalDigital,
        error: IoError::Timeout,
    }));
}

// ── Controller derivation ─────────────────────────────────────

#[test]
fn analog_threshold_crossing_fires() {
    let arm = Arc::new(MockArm::new());
    let registry = Arc::new(CallbackRegistry::new());
    let hits = Arc::new(AtomicUsize::new(0));
    registry
        .register_parsed("cgpio-analog", 0, ">", 5.0, counter(&hits))
        .unwrap();

    for level in [1.0, 4.9, 6.0, 7.5, 2.0, 5.5] {
        let mut state = ControllerState::general_purpose(ALL_HIGH, 0);
        state.analog_inputs = [level, 0.0];
        arm.push_controller(state);
    }

    let (mut poller, _, _) = make_poller(&arm, &registry, ExecutionMode::Inline);
    for _ in 0..6 {
        poller.tick();
    }
    assert_eq!(hits.load(Ordering::SeqCst), 2);
}

#[test]
fn special_function_line_reads_high() {
    let arm = Arc::new(MockArm::new());
    let registry = Arc::new(CallbackRegistry::new());
    let hits = Arc::new(AtomicUsize::new(0));
    registry
        .register(ChannelKind::ControllerDigital, 7, CompareOp::Eq, 0.0, counter(&hits))
        .unwrap();

    // Line 7 is assigned a function (code 3); its LOW bit is masked to 1.
    let mut special = ControllerState::general_purpose(DI7_LOW, 0);
    special.input_functions[7] = 3;
    // Code 255 is unassigned, which behaves like general-purpose.
    let mut unassigned = ControllerState::general_purpose(DI7_LOW, 0);
    unassigned.input_functions[7] = FUNCTION_UNASSIGNED;

    arm.push_controller_inputs(ALL_HIGH);
    arm.push_controller(special);
    arm.push_controller(unassigned);

    let (mut poller, _, _) = make_poller(&arm, &registry, ExecutionMode::Inline);
    poller.tick();
    poller.tick();
    assert_eq!(hits.load(Ordering::SeqCst), 0);
    poller.tick();
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

// ── Spawned poller ────────────────────────────────────────────

#[test]
fn spawned_poller_runs_actions_off_thread_and_stops_on_quit() {
    let arm = Arc::new(MockArm::new());
    let registry = Arc::new(CallbackRegistry::new());
    let (tx, rx) = mpsc::channel();
    let tx = Mutex::new(tx);
    registry
        .register(ChannelKind::ControllerDigital, 7, CompareOp::Eq, 0.0, move || {
            let name = std::thread::current().name().map(str::to_owned);
            tx.lock().unwrap().send(name).unwrap();
        })
        .unwrap();

    arm.push_controller_inputs(ALL_HIGH);
    arm.push_controller_inputs(DI7_LOW);

    let (poller, sink, shared) = make_poller(&arm, &registry, ExecutionMode::Spawned);
    let handle = poller.spawn().unwrap();

    let thread_name = rx.recv_timeout(Duration::from_secs(5)).unwrap();
    assert_eq!(thread_name.as_deref(), Some("gpio-action"));

    handle.request_stop();
    assert!(shared.quit_requested());
    assert_eq!(handle.join().unwrap(), StopReason::QuitRequested);
    assert_eq!(sink.fired(), 1);
    assert!(rx.try_recv().is_err(), "held LOW must not fire again");
}
