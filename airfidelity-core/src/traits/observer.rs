use crate::models::quality::QualityState;

/// Push notifications about engine state changes.
///
/// All methods are called from the engine thread, not the UI thread.
/// Implementations should marshal to the UI thread if needed.
pub trait ArbiterObserver: Send + Sync {
    /// Called whenever the derived quality state changes.
    fn on_quality_changed(&self, _old: QualityState, _new: QualityState) {}

    /// Called after the engine asks the system to switch input.
    fn on_input_switched(&self, _device_id: &str) {}

    /// Called when a call starts or is declared ended.
    fn on_call_activity_changed(&self, _active: bool) {}
}
