//! Canonical `tracing` event names and field keys shared by every layer.

pub mod events;
pub mod fields;
