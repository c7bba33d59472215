//! Full lifecycle scenarios: headset connect → call → call end → switch back.
//!
//! Driven through `MemoryAudioSystem` with a manual clock, so cooldowns and
//! delays elapse exactly when the test says.

use std::sync::Arc;
use std::time::Duration;

use airfidelity_core::{
    ArbitrationPolicy, AudioTransportType, CallActivityState, DeviceSnapshot,
    InputArbitrationController, ManualClock, MemoryAudioSystem, MemoryPreferences,
    NullNotificationSink, PreferenceValues, QualityState,
};

const BUILT_IN: &str = "BuiltInMicrophoneDevice";
const AIRPODS: &str = "AirPods-BT-UID";

fn built_in_mic() -> DeviceSnapshot {
    DeviceSnapshot::new(BUILT_IN, "MacBook Pro Microphone", AudioTransportType::BuiltIn)
        .with_channels(0, 1)
}

fn built_in_speaker() -> DeviceSnapshot {
    DeviceSnapshot::new(
        "BuiltInSpeakerDevice",
        "MacBook Pro Speakers",
        AudioTransportType::BuiltIn,
    )
    .with_channels(2, 0)
}

fn airpods_a2dp() -> DeviceSnapshot {
    DeviceSnapshot::new(AIRPODS, "AirPods Pro", AudioTransportType::Bluetooth)
        .with_sample_rate(48000.0)
        .with_channels(2, 1)
}

fn airpods_hfp() -> DeviceSnapshot {
    DeviceSnapshot::new(AIRPODS, "AirPods Pro", AudioTransportType::Bluetooth)
        .with_sample_rate(16000.0)
        .with_channels(1, 1)
}

struct Rig {
    system: Arc<MemoryAudioSystem>,
    clock: Arc<ManualClock>,
    controller: InputArbitrationController<Arc<MemoryAudioSystem>>,
}

/// No connection delay, no polling, 100 ms cooldown, no debounce.
fn rig(prefs: PreferenceValues) -> Rig {
    let system = Arc::new(MemoryAudioSystem::with_devices(
        vec![built_in_mic()],
        Some(BUILT_IN),
        Some(built_in_speaker()),
    ));
    let clock = Arc::new(ManualClock::new());
    let policy = ArbitrationPolicy {
        cooldown_secs: 0.1,
        ..ArbitrationPolicy::immediate()
    };
    let controller = InputArbitrationController::with_clock(
        Arc::clone(&system),
        Arc::new(MemoryPreferences::new(prefs)),
        Arc::new(NullNotificationSink),
        policy,
        clock.clone(),
    )
    .unwrap();
    Rig {
        system,
        clock,
        controller,
    }
}

impl Rig {
    fn advance_ms(&mut self, ms: u64) {
        self.clock.advance(Duration::from_millis(ms));
        self.controller.fire_due_timers();
    }

    fn built_in_requests(&self) -> usize {
        self.system.switch_requests().iter().filter(|id| *id == BUILT_IN).count()
    }
}

#[test]
fn bluetooth_connect_switches_input_to_built_in() {
    let mut rig = rig(PreferenceValues::default());
    let event = rig.system.connect_bluetooth_headphones(airpods_a2dp(), true, true);
    rig.controller.handle_event(event);

    assert_eq!(rig.system.switch_requests(), vec![BUILT_IN]);

    rig.controller.refresh();
    assert!(rig.controller.is_bluetooth_output_connected());
    assert_eq!(rig.controller.quality(), QualityState::HighQuality);
    assert_eq!(rig.controller.codec_info().unwrap().summary, "AAC · 48.0 kHz · Stereo");
    assert_eq!(rig.controller.output_device_name(), "AirPods Pro");
    assert_eq!(rig.controller.input_device_name(), "MacBook Pro Microphone");
}

#[test]
fn call_mode_and_restore() {
    let mut rig = rig(PreferenceValues::default());
    let event = rig.system.connect_bluetooth_headphones(airpods_a2dp(), true, true);
    rig.controller.handle_event(event);
    assert_eq!(rig.controller.quality(), QualityState::HighQuality);

    let event = rig.system.simulate_call_started(AIRPODS);
    rig.controller.handle_event(event);
    assert!(rig.controller.is_call_active());
    assert_eq!(rig.controller.quality(), QualityState::CallMode);
    // Classifier still sees A2DP; call mode comes from the call monitor.
    assert!(rig.controller.codec_info().unwrap().is_high_quality);

    rig.system.clear_switch_requests();
    let event = rig.system.simulate_call_ended(AIRPODS);
    rig.controller.handle_event(event);
    assert!(rig.controller.is_call_active());

    rig.advance_ms(300);
    assert!(!rig.controller.is_call_active());
    assert_eq!(rig.system.switch_requests(), vec![BUILT_IN]);
    assert_eq!(rig.controller.quality(), QualityState::HighQuality);
}

#[test]
fn hfp_device_reports_call_mode() {
    let mut rig = rig(PreferenceValues::default());
    let event = rig.system.connect_bluetooth_headphones(airpods_hfp(), true, true);
    rig.controller.handle_event(event);

    assert_eq!(rig.controller.quality(), QualityState::CallMode);
    let codec = rig.controller.codec_info().unwrap();
    assert_eq!(codec.summary, "SCO · 16.0 kHz · Mono");
    assert!(!codec.is_high_quality);
}

#[test]
fn auto_switch_disabled_issues_no_commands() {
    let mut rig = rig(PreferenceValues {
        auto_switching_enabled: false,
        ..PreferenceValues::default()
    });
    let event = rig.system.connect_bluetooth_headphones(airpods_a2dp(), true, true);
    rig.controller.handle_event(event);

    let event = rig.system.switch_input_externally(AIRPODS);
    rig.controller.handle_event(event);

    assert!(rig.system.switch_requests().is_empty());
    assert_eq!(rig.controller.quality(), QualityState::HighQuality);
}

#[test]
fn unexpected_bluetooth_mic_is_switched_back() {
    let mut rig = rig(PreferenceValues::default());
    let event = rig.system.connect_bluetooth_headphones(airpods_a2dp(), true, true);
    rig.controller.handle_event(event);
    rig.system.clear_switch_requests();

    let event = rig.system.switch_input_externally(AIRPODS);
    rig.controller.handle_event(event);

    assert_eq!(rig.system.switch_requests(), vec![BUILT_IN]);
    assert_eq!(rig.controller.input_device_name(), "MacBook Pro Microphone");
}

#[test]
fn bluetooth_mic_is_not_fought_during_call() {
    let mut rig = rig(PreferenceValues::default());
    let event = rig.system.connect_bluetooth_headphones(airpods_a2dp(), true, true);
    rig.controller.handle_event(event);
    let event = rig.system.simulate_call_started(AIRPODS);
    rig.controller.handle_event(event);
    rig.system.clear_switch_requests();

    let event = rig.system.switch_input_externally(AIRPODS);
    rig.controller.handle_event(event);

    assert_eq!(rig.built_in_requests(), 0);
    assert_eq!(rig.controller.input_device_name(), "AirPods Pro");
}

#[test]
fn brief_pause_does_not_end_call() {
    let mut rig = rig(PreferenceValues::default());
    let event = rig.system.connect_bluetooth_headphones(airpods_a2dp(), true, true);
    rig.controller.handle_event(event);
    let event = rig.system.simulate_call_started(AIRPODS);
    rig.controller.handle_event(event);
    rig.system.clear_switch_requests();

    let event = rig.system.simulate_call_ended(AIRPODS);
    rig.controller.handle_event(event);
    rig.advance_ms(30);

    let event = rig.system.simulate_call_started(AIRPODS);
    rig.controller.handle_event(event);
    rig.advance_ms(200);

    assert_eq!(rig.built_in_requests(), 0);
    assert!(rig.controller.is_call_active());
    assert_eq!(rig.controller.call_state(), CallActivityState::Active);
    assert_eq!(rig.controller.quality(), QualityState::CallMode);
}

#[test]
fn profile_switch_during_call_then_back() {
    let mut rig = rig(PreferenceValues::default());
    let event = rig.system.connect_bluetooth_headphones(airpods_a2dp(), true, true);
    rig.controller.handle_event(event);

    let event = rig.system.simulate_call_started(AIRPODS);
    rig.controller.handle_event(event);
    let event = rig.system.update_device(airpods_hfp().with_running(true));
    rig.controller.handle_event(event);
    assert_eq!(rig.controller.codec_info().unwrap().summary, "SCO · 16.0 kHz · Mono");
    assert_eq!(rig.controller.quality(), QualityState::CallMode);

    rig.system.update_device(airpods_a2dp());
    let event = rig.system.simulate_call_ended(AIRPODS);
    rig.controller.handle_event(event);
    rig.advance_ms(150);

    assert_eq!(rig.controller.quality(), QualityState::HighQuality);
    assert_eq!(rig.controller.codec_info().unwrap().summary, "AAC · 48.0 kHz · Stereo");
}

#[test]
fn disconnect_cleans_up_state() {
    let mut rig = rig(PreferenceValues::default());
    let event = rig.system.connect_bluetooth_headphones(airpods_a2dp(), true, true);
    rig.controller.handle_event(event);
    let event = rig.system.simulate_call_started(AIRPODS);
    rig.controller.handle_event(event);

    let event = rig.system.disconnect_bluetooth_headphones(AIRPODS);
    rig.controller.handle_event(event);

    assert_eq!(rig.controller.quality(), QualityState::Disconnected);
    assert!(!rig.controller.is_bluetooth_output_connected());
    assert!(!rig.controller.is_call_active());
    assert!(rig.controller.codec_info().is_none());
    assert_eq!(rig.controller.output_device_name(), "None");

    // No stale cooldown fires later
    rig.system.clear_switch_requests();
    rig.advance_ms(1000);
    assert!(rig.system.switch_requests().is_empty());
}
