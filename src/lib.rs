//! SIP, lumpsum, GST and EMI calculators with slider mapping, input
//! clamping, a notes pad and persisted preferences, exposed through a CLI
//! and a small JSON HTTP API.

pub mod api;
pub mod core;
pub mod store;
