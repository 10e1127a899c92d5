//! Output control loops.

pub mod dimmer;
