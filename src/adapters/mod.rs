//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements         | Connects to                          |
//! |------------|--------------------|--------------------------------------|
//! | `hardware` | LightOutputPort    | `embedded-hal` output pin + PWM      |
//! | `log_sink` | EventSink          | `log` facade (serial / stderr)       |
//! | `sim`      | LightSensorPort    | Synthetic daylight curve             |
//! |            | LightOutputPort    | Integrated on-time counters          |
//! |            | WakeTimerPort      | Virtual clock                        |
//! |            | PowerPort          | Sleep counters                       |

pub mod hardware;
pub mod log_sink;
pub mod sim;
