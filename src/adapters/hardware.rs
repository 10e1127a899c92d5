//! Hardware adapter — bridges `embedded-hal` peripherals to the output port.
//!
//! Owns the boost-converter enable pin and the PWM channel driving the
//! LED, exposing them through [`LightOutputPort`].  Any HAL that provides
//! `embedded_hal::digital::OutputPin` and `embedded_hal::pwm::SetDutyCycle`
//! plugs in unchanged.
//!
//! Peripheral errors are logged and swallowed: the control loop has no
//! fault channel, and the next transition rewrites both outputs anyway.

use embedded_hal::digital::{Error as _, OutputPin};
use embedded_hal::pwm::{Error as _, SetDutyCycle};
use log::warn;

use crate::app::ports::LightOutputPort;

/// Full-scale value of the engine's duty (8-bit PWM).
const DUTY_SCALE: u16 = u8::MAX as u16;

/// Concrete adapter combining the enable pin and the PWM channel.
pub struct HalLightOutput<P, D> {
    enable: P,
    pwm: D,
}

impl<P: OutputPin, D: SetDutyCycle> HalLightOutput<P, D> {
    pub fn new(enable: P, pwm: D) -> Self {
        Self { enable, pwm }
    }

    /// Give the peripherals back.
    pub fn release(self) -> (P, D) {
        (self.enable, self.pwm)
    }
}

impl<P: OutputPin, D: SetDutyCycle> LightOutputPort for HalLightOutput<P, D> {
    fn set_output_enabled(&mut self, enabled: bool) {
        let result = if enabled {
            self.enable.set_high()
        } else {
            self.enable.set_low()
        };
        if let Err(e) = result {
            warn!("boost enable write failed: {:?}", e.kind());
        }
    }

    fn set_duty(&mut self, duty: u8) {
        // Map 0..=255 onto the channel's own resolution.
        if let Err(e) = self.pwm.set_duty_cycle_fraction(u16::from(duty), DUTY_SCALE) {
            warn!("PWM duty write failed: {:?}", e.kind());
        }
    }
}
