pub mod call_monitor;
pub mod classifier;
pub mod notifier;
pub mod timer;
