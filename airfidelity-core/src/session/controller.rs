use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};

use crate::models::call_state::{CallActivityState, CallTransition};
use crate::models::device::{AudioTransportType, DeviceSnapshot, InputDeviceChoice};
use crate::models::error::ArbiterError;
use crate::models::policy::ArbitrationPolicy;
use crate::models::quality::{CodecInfo, QualityState};
use crate::models::status::{EngineStatus, NO_DEVICE_NAME};
use crate::processing::call_monitor::CallActivityMonitor;
use crate::processing::classifier::classify;
use crate::processing::notifier::TransitionNotifier;
use crate::processing::timer::TimerSlot;
use crate::traits::audio_system::{AudioSystemProvider, ProviderEvent};
use crate::traits::clock::{Clock, SystemClock};
use crate::traits::notification_sink::NotificationSink;
use crate::traits::observer::ArbiterObserver;
use crate::traits::preferences::Preferences;

/// Latest snapshots read from the audio system.
#[derive(Debug, Default, Clone)]
struct DeviceCache {
    inputs: Vec<DeviceSnapshot>,
    default_input: Option<DeviceSnapshot>,
    default_output: Option<DeviceSnapshot>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimerKind {
    ConnectionDelay,
    Cooldown,
    Poll,
}

/// Keeps a Bluetooth headset's microphone from taking over system input.
///
/// Consumes [`ProviderEvent`]s, tracks the default output's quality, detects
/// calls on the monitored headset and switches the default input back to the
/// preferred (or built-in) microphone whenever the headset mic grabs it
/// outside a call.
///
/// Single-threaded: every method runs to completion on the caller's thread.
/// Timers are deadlines held by the controller; the owner calls
/// [`fire_due_timers`](Self::fire_due_timers) once
/// [`next_deadline`](Self::next_deadline) has passed (see `ArbiterRunner`).
///
/// ```text
/// [ProviderEvent] → handle_event → refresh ─→ classify → quality/codec
///                        │                      └→ TransitionNotifier
///                        ├→ CallActivityMonitor → call started/ended
///                        └→ fix_now → AudioSystemProvider::set_default_input
/// ```
pub struct InputArbitrationController<P: AudioSystemProvider> {
    audio_system: P,
    preferences: Arc<dyn Preferences>,
    notifier: TransitionNotifier,
    clock: Arc<dyn Clock>,
    policy: ArbitrationPolicy,
    observer: Option<Arc<dyn ArbiterObserver>>,

    call_monitor: CallActivityMonitor,
    devices: DeviceCache,
    quality: QualityState,
    codec: Option<CodecInfo>,
    monitored_device_id: Option<String>,

    // Debounce clock, reset on every engine-initiated switch
    last_switch: Option<Instant>,
    last_switch_at: Option<DateTime<Utc>>,

    connection_timer: TimerSlot,
    poll_timer: TimerSlot,
}

impl<P: AudioSystemProvider> InputArbitrationController<P> {
    /// Build a controller on the system clock and read the initial state.
    pub fn new(
        audio_system: P,
        preferences: Arc<dyn Preferences>,
        notification_sink: Arc<dyn NotificationSink>,
        policy: ArbitrationPolicy,
    ) -> Result<Self, ArbiterError> {
        Self::with_clock(
            audio_system,
            preferences,
            notification_sink,
            policy,
            Arc::new(SystemClock),
        )
    }

    pub fn with_clock(
        audio_system: P,
        preferences: Arc<dyn Preferences>,
        notification_sink: Arc<dyn NotificationSink>,
        policy: ArbitrationPolicy,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, ArbiterError> {
        policy.validate()?;

        let mut controller = Self {
            notifier: TransitionNotifier::new(Arc::clone(&preferences), notification_sink),
            audio_system,
            preferences,
            clock,
            policy,
            observer: None,
            call_monitor: CallActivityMonitor::new(policy.cooldown()),
            devices: DeviceCache::default(),
            quality: QualityState::Disconnected,
            codec: None,
            monitored_device_id: None,
            last_switch: None,
            last_switch_at: None,
            connection_timer: TimerSlot::new(),
            poll_timer: TimerSlot::new(),
        };
        controller.refresh();
        Ok(controller)
    }

    pub fn set_observer(&mut self, observer: Arc<dyn ArbiterObserver>) {
        self.observer = Some(observer);
    }

    pub fn audio_system(&self) -> &P {
        &self.audio_system
    }

    pub fn policy(&self) -> &ArbitrationPolicy {
        &self.policy
    }

    // --- Observable state ---

    pub fn quality(&self) -> QualityState {
        self.quality
    }

    pub fn codec_info(&self) -> Option<&CodecInfo> {
        self.codec.as_ref()
    }

    pub fn output_device_name(&self) -> &str {
        self.devices.default_output.as_ref().map_or(NO_DEVICE_NAME, |d| d.name.as_str())
    }

    pub fn input_device_name(&self) -> &str {
        self.devices.default_input.as_ref().map_or(NO_DEVICE_NAME, |d| d.name.as_str())
    }

    pub fn is_bluetooth_output_connected(&self) -> bool {
        self.devices.default_output.as_ref().is_some_and(|d| d.is_bluetooth())
    }

    pub fn is_call_active(&self) -> bool {
        self.call_monitor.is_call_active()
    }

    pub fn call_state(&self) -> CallActivityState {
        self.call_monitor.state()
    }

    pub fn monitored_device_id(&self) -> Option<&str> {
        self.monitored_device_id.as_deref()
    }

    pub fn status(&self) -> EngineStatus {
        EngineStatus {
            output_device_name: self.output_device_name().to_string(),
            input_device_name: self.input_device_name().to_string(),
            quality: self.quality,
            is_bluetooth_output_connected: self.is_bluetooth_output_connected(),
            codec: self.codec.clone(),
            is_call_active: self.is_call_active(),
            monitored_device_id: self.monitored_device_id.clone(),
            last_switch_at: self.last_switch_at,
        }
    }

    // --- Commands ---

    /// Single entry point for audio system events.
    pub fn handle_event(&mut self, event: ProviderEvent) {
        match event {
            ProviderEvent::DevicesAdded(devices) => self.on_devices_added(&devices),
            ProviderEvent::DefaultInputChanged => self.on_default_input_changed(),
            ProviderEvent::DefaultOutputChanged => self.on_default_output_changed(),
            ProviderEvent::DeviceRunningStateChanged => self.on_device_running_state_changed(),
        }
    }

    /// Switch input to the preferred or built-in mic right away.
    ///
    /// No-op when neither is present.
    pub fn fix_now(&mut self) {
        match self.find_preferred_input_device() {
            Some(target) => self.switch_input(&target.id),
            None => log::warn!("No preferred or built-in input device, nothing to switch to"),
        }
    }

    /// Inputs for the manual selector.
    pub fn available_input_devices(&self) -> Vec<InputDeviceChoice> {
        self.audio_system.all_input_devices().iter().map(InputDeviceChoice::from).collect()
    }

    /// Remember `device_id` as the preferred input and switch to it.
    ///
    /// An empty ID clears the preference and falls back to the built-in mic.
    pub fn select_preferred_input(&mut self, device_id: &str) {
        self.preferences.set_preferred_input_device_uid(device_id);
        if device_id.is_empty() {
            self.fix_now();
        } else {
            self.switch_input(device_id);
        }
    }

    /// Re-read the defaults and recompute quality and codec info.
    ///
    /// Idempotent: unchanged audio system state changes nothing and
    /// notifies nobody.
    pub fn refresh(&mut self) {
        self.devices = DeviceCache {
            inputs: self.audio_system.all_input_devices(),
            default_input: self.audio_system.default_input_device(),
            default_output: self.audio_system.default_output_device(),
        };

        let classification = self.devices.default_output.as_ref().map(classify);
        self.codec = classification.as_ref().and_then(|c| c.codec.clone());

        let new_quality = if !self.is_bluetooth_output_connected() {
            self.stop_monitoring();
            QualityState::Disconnected
        } else if self.call_monitor.is_call_active() {
            QualityState::CallMode
        } else {
            classification.map_or(QualityState::Disconnected, |c| c.state)
        };

        self.set_quality(new_quality);
    }

    // --- Event handlers ---

    pub fn on_devices_added(&mut self, devices: &[DeviceSnapshot]) {
        let bluetooth_outputs: Vec<&str> = devices
            .iter()
            .filter(|d| d.is_bluetooth_output())
            .map(|d| d.name.as_str())
            .collect();

        if !bluetooth_outputs.is_empty() {
            log::info!("Bluetooth output connected: {}", bluetooth_outputs.join(", "));

            let delay = self.policy.connection_delay();
            if !self.preferences.auto_switching_enabled() {
                log::debug!("Auto-switching disabled, leaving input alone");
            } else if delay.is_zero() {
                self.on_bluetooth_output_connected();
            } else {
                log::debug!("Auto-switch scheduled in {:?}", delay);
                self.connection_timer.arm(self.clock.now() + delay);
            }
        }

        self.refresh();
    }

    pub fn on_default_input_changed(&mut self) {
        if self.should_reclaim_input() {
            if self.should_debounce() {
                log::debug!("Input changed within debounce window of our own switch, ignoring");
            } else {
                log::info!("Bluetooth mic took over input outside a call, switching back");
                self.fix_now();
            }
        }
        self.refresh();
    }

    /// Output changes are reflected, never corrected.
    pub fn on_default_output_changed(&mut self) {
        self.refresh();
    }

    pub fn on_device_running_state_changed(&mut self) {
        let Some(device_id) = self.monitored_device_id.clone() else {
            return;
        };

        // Headsets show up as both input and output; prefer the input copy.
        let running = self
            .audio_system
            .all_input_devices()
            .into_iter()
            .find(|d| d.id == device_id)
            .or_else(|| self.audio_system.default_output_device().filter(|d| d.id == device_id))
            .map(|d| d.is_running);

        if let Some(is_running) = running {
            let transition = self.call_monitor.report(is_running, self.clock.now());
            self.apply_call_transition(transition);
        }
    }

    // --- Timers ---

    /// Earliest pending deadline across all timers.
    pub fn next_deadline(&self) -> Option<Instant> {
        [
            self.connection_timer.deadline(),
            self.call_monitor.next_deadline(),
            self.poll_timer.deadline(),
        ]
        .into_iter()
        .flatten()
        .min()
    }

    /// How long until the next deadline; zero if one is already due.
    pub fn time_until_next_deadline(&self) -> Option<Duration> {
        self.next_deadline().map(|deadline| deadline.saturating_duration_since(self.clock.now()))
    }

    /// Run every timer whose deadline has passed, earliest first.
    pub fn fire_due_timers(&mut self) {
        let now = self.clock.now();
        while let Some(kind) = self.next_due_timer(now) {
            match kind {
                TimerKind::ConnectionDelay => {
                    if self.connection_timer.take_due(now) {
                        log::debug!("Connection delay elapsed");
                        self.on_bluetooth_output_connected();
                    }
                }
                TimerKind::Cooldown => {
                    let transition = self.call_monitor.poll(now);
                    self.apply_call_transition(transition);
                }
                TimerKind::Poll => {
                    if self.poll_timer.take_due(now) {
                        if let Some(interval) = self.policy.poll_interval() {
                            self.poll_timer.arm(now + interval);
                        }
                        self.on_device_running_state_changed();
                    }
                }
            }
        }
    }

    fn next_due_timer(&self, now: Instant) -> Option<TimerKind> {
        [
            (TimerKind::ConnectionDelay, self.connection_timer.deadline()),
            (TimerKind::Cooldown, self.call_monitor.next_deadline()),
            (TimerKind::Poll, self.poll_timer.deadline()),
        ]
        .into_iter()
        .filter_map(|(kind, deadline)| deadline.filter(|d| *d <= now).map(|d| (d, kind)))
        .min_by_key(|(deadline, _)| *deadline)
        .map(|(_, kind)| kind)
    }

    // --- Internal helpers ---

    fn on_bluetooth_output_connected(&mut self) {
        if !self.preferences.auto_switching_enabled() {
            return;
        }
        self.fix_now();
        self.refresh();

        let output = self.audio_system.default_output_device();
        if let Some(output) = output.filter(|d| d.is_bluetooth()) {
            self.start_monitoring(&output.id);
        }
    }

    fn apply_call_transition(&mut self, transition: Option<CallTransition>) {
        match transition {
            Some(CallTransition::Started) => self.on_call_started(),
            Some(CallTransition::Ended) => self.on_call_ended(),
            None => {}
        }
    }

    fn on_call_started(&mut self) {
        if let Some(ref observer) = self.observer {
            observer.on_call_activity_changed(true);
        }
        self.set_quality(QualityState::CallMode);
    }

    fn on_call_ended(&mut self) {
        if let Some(ref observer) = self.observer {
            observer.on_call_activity_changed(false);
        }
        if self.preferences.auto_switching_enabled() {
            self.fix_now();
        }
        self.refresh();
    }

    /// All conditions for fighting a Bluetooth mic, except the debounce.
    fn should_reclaim_input(&self) -> bool {
        self.preferences.auto_switching_enabled()
            && self.audio_system.default_output_device().is_some_and(|d| d.is_bluetooth())
            && !self.call_monitor.is_call_active()
            && self.audio_system.default_input_device().is_some_and(|d| d.is_bluetooth())
    }

    fn should_debounce(&self) -> bool {
        let now = self.clock.now();
        self.last_switch
            .is_some_and(|at| now.saturating_duration_since(at) < self.policy.debounce_interval())
    }

    fn find_preferred_input_device(&self) -> Option<DeviceSnapshot> {
        let inputs = self.audio_system.all_input_devices();

        let preferred_id = self.preferences.preferred_input_device_uid();
        if !preferred_id.is_empty() {
            if let Some(device) = inputs.iter().find(|d| d.id == preferred_id) {
                return Some(device.clone());
            }
            log::debug!("Preferred input {} not present, falling back to built-in", preferred_id);
        }

        inputs.into_iter().find(|d| d.transport_type == AudioTransportType::BuiltIn)
    }

    fn switch_input(&mut self, device_id: &str) {
        log::info!("Switching default input to {}", device_id);
        self.audio_system.set_default_input(device_id);
        self.last_switch = Some(self.clock.now());
        self.last_switch_at = Some(self.clock.wall_now());
        if let Some(ref observer) = self.observer {
            observer.on_input_switched(device_id);
        }
        self.refresh();
    }

    fn start_monitoring(&mut self, device_id: &str) {
        log::info!("Monitoring {} for call activity", device_id);
        self.monitored_device_id = Some(device_id.to_string());
        self.poll_timer.cancel();
        if let Some(interval) = self.policy.poll_interval() {
            self.poll_timer.arm(self.clock.now() + interval);
        }
    }

    fn stop_monitoring(&mut self) {
        if let Some(device_id) = self.monitored_device_id.take() {
            log::info!("Stopped monitoring {}", device_id);
        }
        self.poll_timer.cancel();
        self.call_monitor.reset();
    }

    fn set_quality(&mut self, new: QualityState) {
        let old = self.quality;
        if old == new {
            return;
        }
        self.quality = new;
        log::info!("Quality changed: {} -> {}", old, new);

        if let Some(ref observer) = self.observer {
            observer.on_quality_changed(old, new);
        }
        let device_name = self.output_device_name().to_string();
        self.notifier.quality_did_change(old, new, &device_name);
    }
}
