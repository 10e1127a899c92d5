//! Solarlight engine library.
//!
//! Dusk detection and adaptive afterglow control for a solar-powered
//! standalone light.  Everything here is pure logic behind port traits,
//! so the same code runs on the target, in the host simulator, and in
//! the integration tests.

#![deny(unused_must_use)]

pub mod afterglow;
pub mod app;
pub mod config;
pub mod control;
pub mod error;
pub mod events;
pub mod fsm;
pub mod light;
pub mod power;
pub mod scheduler;

pub mod adapters;
