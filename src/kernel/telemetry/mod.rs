//! Session telemetry.
//!
//! # SAFETY INVARIANT
//! Telemetry is a READ-ONLY side-effect layer. Controller decisions never read
//! it; the only consumer inside the crate is the final workout summary.
//!
//! # PRIVACY INVARIANT
//! No raw audio and no biometric values. Only exercise IDs, phases and edge
//! kinds.

pub mod event;
pub mod metrics;
pub mod recorder;
