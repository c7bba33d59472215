pub mod call_state;
pub mod device;
pub mod error;
pub mod notification;
pub mod policy;
pub mod quality;
pub mod status;
