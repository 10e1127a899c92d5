//! Light sensing pipeline: raw sample → classification → debounced transition.
//!
//! ```text
//!  LightSample ──▶ classify() ──▶ Classification ──▶ StreakDebouncer ──▶ Verdict
//!   (0..=255)       (hysteresis)   Day/Night/Ambiguous   (streak counts)
//! ```

pub mod classifier;
pub mod debounce;

pub use classifier::{Classification, Thresholds, classify};
pub use debounce::{StreakDebouncer, StreakLimits, Verdict, Watch};
