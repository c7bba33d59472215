use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde::Serialize;

use airfidelity_core::{
    ArbiterError, EngineStatus, InputArbitrationController, ManualClock, MemoryAudioSystem,
    MemoryPreferences, NotificationSink, QualityNotice,
};

use crate::scenario::{Expectation, Scenario, Step};

/// Keeps every notice for the transcript.
#[derive(Default)]
struct CollectingSink {
    notices: Mutex<Vec<QualityNotice>>,
}

impl NotificationSink for CollectingSink {
    fn deliver(&self, notice: &QualityNotice) {
        self.notices.lock().push(notice.clone());
    }
}

/// Engine state after one step.
#[derive(Debug, Clone, Serialize)]
pub struct TranscriptEntry {
    pub index: usize,
    pub action: String,
    pub elapsed_ms: u64,
    pub status: EngineStatus,
    /// Input switches issued during this step.
    pub switch_requests: Vec<String>,
    /// Notifications delivered during this step.
    pub notices: Vec<QualityNotice>,
}

impl TranscriptEntry {
    pub fn summary_line(&self) -> String {
        let codec = self.status.codec.as_ref().map_or("-", |c| c.summary.as_str());
        let mut line = format!(
            "[{:>7} ms] #{:<3} {:<18} quality={} codec={} output={} input={} call={}",
            self.elapsed_ms,
            self.index,
            self.action,
            self.status.quality,
            codec,
            self.status.output_device_name,
            self.status.input_device_name,
            self.status.is_call_active,
        );
        for id in &self.switch_requests {
            line.push_str(&format!("\n    switch input -> {}", id));
        }
        for notice in &self.notices {
            line.push_str(&format!("\n    notify: {} / {}", notice.title, notice.body));
        }
        line
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Transcript {
    pub name: Option<String>,
    pub entries: Vec<TranscriptEntry>,
}

impl Transcript {
    pub fn final_status(&self) -> Option<&EngineStatus> {
        self.entries.last().map(|e| &e.status)
    }

    pub fn all_switch_requests(&self) -> Vec<&str> {
        self.entries
            .iter()
            .flat_map(|e| e.switch_requests.iter().map(String::as_str))
            .collect()
    }
}

/// Run `scenario` against a fresh engine on a manual clock.
///
/// Stops at the first failed `expect` step.
pub fn replay(scenario: &Scenario) -> Result<Transcript, ArbiterError> {
    let initial = &scenario.initial;
    let system = Arc::new(MemoryAudioSystem::with_devices(
        initial.inputs.clone(),
        initial.default_input.as_deref(),
        initial.default_output.clone(),
    ));
    let prefs = Arc::new(MemoryPreferences::new(scenario.preferences.clone()));
    let sink = Arc::new(CollectingSink::default());
    let clock = Arc::new(ManualClock::new());

    let mut controller = InputArbitrationController::with_clock(
        Arc::clone(&system),
        prefs.clone(),
        sink.clone(),
        scenario.policy,
        clock.clone(),
    )?;

    log::info!(
        "Replaying {} ({} steps)",
        scenario.name.as_deref().unwrap_or("scenario"),
        scenario.steps.len()
    );

    let mut entries = Vec::with_capacity(scenario.steps.len());
    let mut switches_seen = 0;

    for (index, step) in scenario.steps.iter().enumerate() {
        log::debug!("Step {}: {:?}", index, step);
        match step {
            Step::ConnectBluetooth {
                device,
                as_output,
                add_as_input,
            } => {
                let event =
                    system.connect_bluetooth_headphones(device.clone(), *as_output, *add_as_input);
                controller.handle_event(event);
            }
            Step::Disconnect { device_id } => {
                controller.handle_event(system.disconnect_bluetooth_headphones(device_id));
            }
            Step::SwitchInput { device_id } => {
                controller.handle_event(system.switch_input_externally(device_id));
            }
            Step::SetOutput { device } => {
                controller.handle_event(system.set_default_output(device.clone()));
            }
            Step::UpdateDevice { device } => {
                controller.handle_event(system.update_device(device.clone()));
            }
            Step::CallStarted { device_id } => {
                controller.handle_event(system.simulate_call_started(device_id));
            }
            Step::CallEnded { device_id } => {
                controller.handle_event(system.simulate_call_ended(device_id));
            }
            Step::SetRunning {
                device_id,
                running,
                notify,
            } => {
                let event = system.set_running(device_id, *running);
                if *notify {
                    controller.handle_event(event);
                }
            }
            Step::SetAutoSwitching { enabled } => prefs.set_auto_switching_enabled(*enabled),
            Step::Advance { ms } => advance(&clock, &mut controller, Duration::from_millis(*ms)),
            Step::FixNow => controller.fix_now(),
            Step::SelectInput { device_id } => controller.select_preferred_input(device_id),
            Step::Refresh => controller.refresh(),
            Step::Expect(expectation) => {
                check(index, expectation, &controller.status(), &system.switch_requests())?
            }
        }

        let requests = system.switch_requests();
        let new_requests = requests[switches_seen..].to_vec();
        switches_seen = requests.len();

        entries.push(TranscriptEntry {
            index,
            action: step.label().to_string(),
            elapsed_ms: clock.elapsed().as_millis() as u64,
            status: controller.status(),
            switch_requests: new_requests,
            notices: std::mem::take(&mut *sink.notices.lock()),
        });
    }

    Ok(Transcript {
        name: scenario.name.clone(),
        entries,
    })
}

/// Move time forward, stopping at every deadline on the way.
fn advance(
    clock: &ManualClock,
    controller: &mut InputArbitrationController<Arc<MemoryAudioSystem>>,
    by: Duration,
) {
    let mut remaining = by;
    while let Some(wait) = controller.time_until_next_deadline() {
        if wait > remaining {
            break;
        }
        clock.advance(wait);
        remaining -= wait;
        controller.fire_due_timers();
    }
    clock.advance(remaining);
    controller.fire_due_timers();
}

fn check(
    index: usize,
    expected: &Expectation,
    status: &EngineStatus,
    switches: &[String],
) -> Result<(), ArbiterError> {
    let fail = |what: String| -> Result<(), ArbiterError> {
        Err(ArbiterError::Scenario(format!("step {}: {}", index, what)))
    };

    if let Some(quality) = expected.quality {
        if status.quality != quality {
            return fail(format!("expected quality {} but was {}", quality, status.quality));
        }
    }
    if let Some(ref summary) = expected.summary {
        let actual = status.codec.as_ref().map(|c| c.summary.as_str());
        if actual != Some(summary.as_str()) {
            return fail(format!("expected codec {} but was {}", summary, actual.unwrap_or("none")));
        }
    }
    if let Some(active) = expected.call_active {
        if status.is_call_active != active {
            return fail(format!(
                "expected call_active={} but was {}",
                active, status.is_call_active
            ));
        }
    }
    if let Some(ref input) = expected.input {
        if &status.input_device_name != input {
            return fail(format!("expected input {} but was {}", input, status.input_device_name));
        }
    }
    if let Some(count) = expected.switch_count {
        if switches.len() != count {
            return fail(format!("expected {} input switches but saw {}", count, switches.len()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use airfidelity_core::{NotificationContent, QualityState};

    const BASE: &str = r#"
        "policy": {
            "connection_delay_secs": 0,
            "debounce_interval_secs": 1,
            "cooldown_secs": 5,
            "poll_interval_secs": 0
        },
        "initial": {
            "inputs": [{
                "id": "mic", "name": "Built-in Mic",
                "transport_type": "built_in", "input_channels": 1
            }],
            "default_input": "mic"
        }"#;

    fn scenario(steps: &str) -> Scenario {
        Scenario::from_json(&format!(r#"{{ {}, "steps": [{}] }}"#, BASE, steps)).unwrap()
    }

    const CONNECT: &str = r#"{ "action": "connect_bluetooth", "device": {
        "id": "bt", "name": "Headphones", "transport_type": "bluetooth",
        "nominal_sample_rate": 48000, "output_channels": 2, "input_channels": 1 } }"#;

    #[test]
    fn records_one_entry_per_step() {
        let steps = format!(r#"{}, {{ "action": "advance", "ms": 1500 }}"#, CONNECT);
        let transcript = replay(&scenario(&steps)).unwrap();
        assert_eq!(transcript.entries.len(), 2);
        assert_eq!(transcript.entries[0].action, "connect_bluetooth");
        assert_eq!(transcript.entries[0].switch_requests, vec!["mic".to_string()]);
        assert_eq!(transcript.entries[1].elapsed_ms, 1500);
        assert!(transcript.entries[1].switch_requests.is_empty());

        let last = transcript.final_status().unwrap();
        assert_eq!(last.quality, QualityState::HighQuality);
        assert_eq!(last.output_device_name, "Headphones");
    }

    #[test]
    fn advance_fires_cooldown_inside_the_window() {
        let steps = format!(
            r#"{},
            {{ "action": "call_started", "device_id": "bt" }},
            {{ "action": "call_ended", "device_id": "bt" }},
            {{ "action": "advance", "ms": 4999 }},
            {{ "action": "expect", "call_active": true }},
            {{ "action": "advance", "ms": 1 }},
            {{ "action": "expect", "call_active": false, "quality": "high_quality" }}"#,
            CONNECT
        );
        let transcript = replay(&scenario(&steps)).unwrap();
        assert_eq!(transcript.entries.len(), 7);
        assert_eq!(transcript.all_switch_requests(), vec!["mic", "mic"]);
    }

    #[test]
    fn failed_expectation_stops_replay() {
        let steps = format!(r#"{}, {{ "action": "expect", "quality": "call_mode" }}"#, CONNECT);
        let err = replay(&scenario(&steps)).unwrap_err();
        match err {
            ArbiterError::Scenario(msg) => {
                assert!(msg.starts_with("step 1:"), "{}", msg);
                assert!(msg.contains("expected quality Call Mode"), "{}", msg);
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn summary_line_lists_switches_and_notices() {
        let entry = TranscriptEntry {
            index: 3,
            action: "fix_now".into(),
            elapsed_ms: 1200,
            status: EngineStatus::default(),
            switch_requests: vec!["mic".into()],
            notices: vec![QualityNotice::new(NotificationContent {
                title: "Audio quality restored".into(),
                body: "Headphones back to stereo".into(),
            })],
        };
        let line = entry.summary_line();
        assert!(line.contains("#3"));
        assert!(line.contains("fix_now"));
        assert!(line.contains("switch input -> mic"));
        assert!(line.contains("notify: Audio quality restored / Headphones back to stereo"));
    }
}
