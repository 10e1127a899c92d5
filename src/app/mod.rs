//! Application core — pure domain logic, zero I/O.
//!
//! The [`service::Engine`] ties the mode machine, the sample scheduler and
//! the sleep policy together.  All interaction with the platform happens
//! through **port traits** defined in [`ports`], keeping this layer fully
//! testable without real peripherals.

pub mod events;
pub mod ports;
pub mod service;
