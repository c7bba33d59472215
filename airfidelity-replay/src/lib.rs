//! # airfidelity-replay
//!
//! Replays scripted device sessions through the arbitration engine.
//!
//! A scenario describes the starting devices, preferences, timing policy and
//! a list of steps (headphones connect, the OS grabs the headset mic, a call
//! starts, time passes...). The engine runs on a manual clock, so a scenario
//! spanning minutes replays instantly and identically every time.
//!
//! ## Usage
//! ```ignore
//! use airfidelity_replay::{replay, Scenario};
//!
//! let scenario = Scenario::load(Path::new("scenarios/call_lifecycle.json"))?;
//! for entry in replay(&scenario)?.entries {
//!     println!("{}", entry.summary_line());
//! }
//! ```

pub mod replay;
pub mod scenario;

pub use replay::{replay, Transcript, TranscriptEntry};
pub use scenario::{Expectation, InitialTopology, Scenario, Step};
