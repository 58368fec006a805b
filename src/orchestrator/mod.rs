//! Application-level orchestration utilities.
//!
//! This module owns workflow run lifecycle (start, reset, quit) and emits
//! events for presentation layers, so the UI stays presentation-only.

mod controller;

pub(crate) use controller::{run_controller, UiCommand};
