pub mod controller;
pub mod runner;
