//! # airfidelity-core
//!
//! Platform-agnostic Bluetooth audio route arbitration.
//!
//! Keeps a Bluetooth headset's microphone from silently taking over the
//! system input while its stereo output is in use, and classifies the active
//! profile (A2DP stereo vs. HFP call mode) from sample rate and channel count.
//! Platform backends implement the `AudioSystemProvider` trait and forward
//! their device notifications as `ProviderEvent`s.
//!
//! ## Architecture
//!
//! ```text
//! airfidelity-core (this crate)
//! ├── traits/       ← AudioSystemProvider, Preferences, NotificationSink, ArbiterObserver, Clock
//! ├── models/       ← DeviceSnapshot, QualityState, CodecInfo, ArbitrationPolicy, ArbiterError
//! ├── processing/   ← classifier, CallActivityMonitor, TransitionNotifier, TimerSlot
//! ├── session/      ← InputArbitrationController, ArbiterRunner (engine thread)
//! └── providers/    ← MemoryAudioSystem, MemoryPreferences
//! ```
//!
//! ## Usage
//! ```ignore
//! use std::sync::Arc;
//! use airfidelity_core::{ArbiterRunner, ArbitrationPolicy, InputArbitrationController};
//!
//! let policy = ArbitrationPolicy::default();
//! let controller = InputArbitrationController::new(backend, prefs, notifications, policy)?;
//! let engine = ArbiterRunner::spawn(controller)?;
//! engine.send_event(ProviderEvent::DefaultInputChanged)?;
//! println!("{}", engine.status().quality);
//! ```

pub mod models;
pub mod processing;
pub mod providers;
pub mod session;
pub mod traits;

// Re-export key types at crate root for convenience.
pub use models::call_state::{CallActivityState, CallTransition};
pub use models::device::{AudioTransportType, DeviceSnapshot, InputDeviceChoice};
pub use models::error::ArbiterError;
pub use models::notification::{NotificationContent, QualityNotice};
pub use models::policy::ArbitrationPolicy;
pub use models::quality::{CodecInfo, QualityState};
pub use models::status::EngineStatus;
pub use processing::call_monitor::CallActivityMonitor;
pub use processing::classifier::{classify, Classification};
pub use processing::notifier::{decide, NotifyPrefs, TransitionNotifier};
pub use providers::memory::{MemoryAudioSystem, MemoryPreferences};
pub use session::controller::InputArbitrationController;
pub use session::runner::{ArbiterHandle, ArbiterRunner, EngineCommand};
pub use traits::audio_system::{AudioSystemProvider, ProviderEvent};
pub use traits::clock::{Clock, ManualClock, SystemClock};
pub use traits::notification_sink::{NotificationSink, NullNotificationSink};
pub use traits::observer::ArbiterObserver;
pub use traits::preferences::{PreferenceValues, Preferences};
