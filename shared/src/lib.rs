//! Session gate, wire types and configuration shared by the botdeck server
//! and its tests.

pub mod config;
pub mod gate;
pub mod types;

pub use gate::{Decision, SessionGate};
