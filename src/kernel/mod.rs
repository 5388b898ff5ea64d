//! Pure session kernel. Nothing in here awaits, spawns or owns a device;
//! `controller::SessionController` returns side effects for the driver in
//! `crate::session` to execute.

pub mod audio;
pub mod cancel;
pub mod clock;
pub mod controller;
pub mod event;
pub mod exercise;
pub mod lifecycle;
pub mod scheduler;
pub mod sets;
pub mod state;
pub mod telemetry;
pub mod time;
