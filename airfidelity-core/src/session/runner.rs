use std::sync::Arc;
use std::thread;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use parking_lot::Mutex;

use crate::models::device::InputDeviceChoice;
use crate::models::error::ArbiterError;
use crate::models::status::EngineStatus;
use crate::session::controller::InputArbitrationController;
use crate::traits::audio_system::{AudioSystemProvider, ProviderEvent};

/// Message to the engine thread.
#[derive(Debug)]
pub enum EngineCommand {
    Event(ProviderEvent),
    FixNow,
    SelectPreferredInput(String),
    Refresh,
    ListInputs(Sender<Vec<InputDeviceChoice>>),
    Shutdown,
}

/// Runs a controller on its own thread.
///
/// Events and commands are queued and handled one at a time, so the
/// controller never sees concurrent calls. Between messages the thread sleeps
/// until the controller's next timer deadline.
pub struct ArbiterRunner;

impl ArbiterRunner {
    pub fn spawn<P>(
        controller: InputArbitrationController<P>,
    ) -> Result<ArbiterHandle, ArbiterError>
    where
        P: AudioSystemProvider + 'static,
    {
        let (commands, inbox) = crossbeam_channel::unbounded();
        let status = Arc::new(Mutex::new(controller.status()));
        let published = Arc::clone(&status);

        let handle = thread::Builder::new()
            .name("airfidelity-engine".into())
            .spawn(move || Self::run(controller, inbox, published))
            .map_err(|e| ArbiterError::Io(format!("failed to spawn engine thread: {}", e)))?;

        Ok(ArbiterHandle {
            commands,
            status,
            handle: Some(handle),
        })
    }

    fn run<P: AudioSystemProvider>(
        mut controller: InputArbitrationController<P>,
        inbox: Receiver<EngineCommand>,
        status: Arc<Mutex<EngineStatus>>,
    ) {
        log::info!("Arbitration engine started");

        loop {
            let received = match controller.time_until_next_deadline() {
                Some(wait) => inbox.recv_timeout(wait),
                None => inbox.recv().map_err(|_| RecvTimeoutError::Disconnected),
            };

            match received {
                Ok(EngineCommand::Shutdown) | Err(RecvTimeoutError::Disconnected) => break,
                Ok(command) => Self::apply(&mut controller, command),
                Err(RecvTimeoutError::Timeout) => {}
            }

            controller.fire_due_timers();
            *status.lock() = controller.status();
        }

        log::info!("Arbitration engine stopped");
    }

    fn apply<P: AudioSystemProvider>(
        controller: &mut InputArbitrationController<P>,
        command: EngineCommand,
    ) {
        match command {
            EngineCommand::Event(event) => controller.handle_event(event),
            EngineCommand::FixNow => controller.fix_now(),
            EngineCommand::SelectPreferredInput(device_id) => {
                controller.select_preferred_input(&device_id)
            }
            EngineCommand::Refresh => controller.refresh(),
            EngineCommand::ListInputs(reply) => {
                // Requester may have given up; nothing to do then.
                let _ = reply.send(controller.available_input_devices());
            }
            EngineCommand::Shutdown => {}
        }
    }
}

/// Host-side handle to a running engine.
pub struct ArbiterHandle {
    commands: Sender<EngineCommand>,
    status: Arc<Mutex<EngineStatus>>,
    handle: Option<thread::JoinHandle<()>>,
}

impl ArbiterHandle {
    /// Latest published engine state.
    pub fn status(&self) -> EngineStatus {
        self.status.lock().clone()
    }

    /// Forward an audio system event.
    pub fn send_event(&self, event: ProviderEvent) -> Result<(), ArbiterError> {
        self.send(EngineCommand::Event(event))
    }

    pub fn fix_now(&self) -> Result<(), ArbiterError> {
        self.send(EngineCommand::FixNow)
    }

    pub fn select_preferred_input(&self, device_id: &str) -> Result<(), ArbiterError> {
        self.send(EngineCommand::SelectPreferredInput(device_id.to_string()))
    }

    pub fn refresh(&self) -> Result<(), ArbiterError> {
        self.send(EngineCommand::Refresh)
    }

    /// Ask the engine thread for the current input list and wait for it.
    pub fn available_input_devices(&self) -> Result<Vec<InputDeviceChoice>, ArbiterError> {
        let (reply, response) = crossbeam_channel::bounded(1);
        self.send(EngineCommand::ListInputs(reply))?;
        response.recv().map_err(|_| ArbiterError::EngineStopped)
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Stop the engine thread and wait for it to exit.
    pub fn shutdown(&mut self) {
        let _ = self.commands.send(EngineCommand::Shutdown);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::error!("Arbitration engine thread panicked");
            }
        }
    }

    fn send(&self, command: EngineCommand) -> Result<(), ArbiterError> {
        if self.handle.is_none() {
            return Err(ArbiterError::EngineStopped);
        }
        self.commands.send(command).map_err(|_| ArbiterError::EngineStopped)
    }
}

impl Drop for ArbiterHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::device::{AudioTransportType, DeviceSnapshot};
    use crate::models::policy::ArbitrationPolicy;
    use crate::models::quality::QualityState;
    use crate::providers::memory::{MemoryAudioSystem, MemoryPreferences};
    use crate::traits::notification_sink::NullNotificationSink;
    use std::time::Duration;

    fn airpods() -> DeviceSnapshot {
        DeviceSnapshot::new("AirPods-BT-UID", "AirPods Pro", AudioTransportType::Bluetooth)
            .with_sample_rate(48000.0)
            .with_channels(2, 1)
    }

    fn spawn_engine(policy: ArbitrationPolicy) -> (Arc<MemoryAudioSystem>, ArbiterHandle) {
        let built_in = DeviceSnapshot::new(
            "BuiltInMicrophoneDevice",
            "MacBook Pro Microphone",
            AudioTransportType::BuiltIn,
        )
        .with_channels(0, 1);
        let system = Arc::new(MemoryAudioSystem::with_devices(
            vec![built_in],
            Some("BuiltInMicrophoneDevice"),
            None,
        ));
        let controller = InputArbitrationController::new(
            Arc::clone(&system),
            Arc::new(MemoryPreferences::default()),
            Arc::new(NullNotificationSink),
            policy,
        )
        .unwrap();
        (system, ArbiterRunner::spawn(controller).unwrap())
    }

    #[test]
    fn runner_lifecycle() {
        let (_system, mut handle) = spawn_engine(ArbitrationPolicy::immediate());
        assert!(handle.is_running());
        assert_eq!(handle.status().quality, QualityState::Disconnected);

        handle.shutdown();
        assert!(!handle.is_running());
        assert_eq!(handle.fix_now(), Err(ArbiterError::EngineStopped));
    }

    #[test]
    fn runner_drives_call_cooldown_in_real_time() {
        let policy = ArbitrationPolicy {
            cooldown_secs: 0.05,
            ..ArbitrationPolicy::immediate()
        };
        let (system, mut handle) = spawn_engine(policy);

        handle
            .send_event(system.connect_bluetooth_headphones(airpods(), true, true))
            .unwrap();
        handle.send_event(system.simulate_call_started("AirPods-BT-UID")).unwrap();
        let inputs = handle.available_input_devices().unwrap();
        assert_eq!(inputs.len(), 2);

        let status = handle.status();
        assert_eq!(status.quality, QualityState::CallMode);
        assert!(status.is_call_active);
        assert_eq!(status.monitored_device_id.as_deref(), Some("AirPods-BT-UID"));

        system.clear_switch_requests();
        handle.send_event(system.simulate_call_ended("AirPods-BT-UID")).unwrap();
        thread::sleep(Duration::from_millis(250));

        let status = handle.status();
        assert!(!status.is_call_active);
        assert_eq!(status.quality, QualityState::HighQuality);
        assert_eq!(system.switch_requests(), vec!["BuiltInMicrophoneDevice"]);

        handle.shutdown();
    }
}
