//! Linear dimmer ramp for the slow turn-off.
//!
//! Once the night budget is spent the light is not switched off hard:
//! every wake event lowers the PWM duty by a fixed step until it would
//! reach or cross zero, at which point the ramp reports completion.

/// Result of a single ramp step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RampStep {
    /// Duty lowered to the contained value; more steps follow.
    Dimmed(u8),
    /// Duty reached zero.  The output must be disabled.
    Finished,
}

/// Fixed-step linear ramp toward zero.
#[derive(Debug, Clone, Copy)]
pub struct DimmerRamp {
    step: u8,
}

impl DimmerRamp {
    /// `step` must be non-zero (enforced by configuration sanitising).
    pub fn new(step: u8) -> Self {
        Self { step: step.max(1) }
    }

    /// Advance from `duty` by one step.
    pub fn step(&self, duty: u8) -> RampStep {
        if duty <= self.step {
            RampStep::Finished
        } else {
            RampStep::Dimmed(duty - self.step)
        }
    }

    /// Number of steps to go from `duty` to completion.
    pub fn steps_from(&self, duty: u8) -> u16 {
        (duty as u16).div_ceil(self.step as u16).max(1)
    }

    pub fn step_size(&self) -> u8 {
        self.step
    }
}
