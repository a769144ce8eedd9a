//! Gearbox torque/speed transforms.
//!
//! # Ratio convention
//!
//! `ratio > 1` is a reduction: output speed = motor speed / ratio, output
//! torque = motor torque × ratio. The torque transforms carry a damping term
//! proportional to the motor-side velocity cached by the last
//! [`Gearbox::update`] call.

/// Reduction gearbox between a motor shaft and an output shaft.
#[derive(Debug, Clone)]
pub struct Gearbox {
    ratio: f64,
    damping: f64,
    velocity: f64,
}

impl Gearbox {
    /// New gearbox with the given reduction ratio and viscous damping.
    pub fn new(ratio: f64, damping: f64) -> Self {
        Self {
            ratio,
            damping,
            velocity: 0.0,
        }
    }

    /// Output-side torque for a motor-side torque.
    pub fn output_torque(&self, input_torque: f64) -> f64 {
        input_torque * self.ratio - self.damping * self.velocity
    }

    /// Output-side speed for a motor-side speed.
    pub fn output_speed(&self, input_speed: f64) -> f64 {
        input_speed / self.ratio
    }

    /// Motor-side torque required to realize an output-side torque.
    pub fn input_torque(&self, output_torque: f64) -> f64 {
        (output_torque + self.damping * self.velocity) / self.ratio
    }

    /// Motor-side speed for an output-side speed.
    pub fn input_speed(&self, output_speed: f64) -> f64 {
        output_speed * self.ratio
    }

    /// The reduction ratio.
    pub fn reduction_ratio(&self) -> f64 {
        self.ratio
    }

    /// Cache the motor-side velocity used by the damping terms.
    pub fn update(&mut self, input_velocity: f64) {
        self.velocity = input_velocity;
    }
}
