pub mod audio_system;
pub mod clock;
pub mod notification_sink;
pub mod observer;
pub mod preferences;
