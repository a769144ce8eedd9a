//! Parameter definitions for the simulator GUI.

/// Parameter specification with bounds and step size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamSpec {
    /// Human-readable label.
    pub label: &'static str,
    /// Minimum value.
    pub min: f64,
    /// Maximum value.
    pub max: f64,
    /// Step size for sliders.
    pub step: f64,
}

impl ParamSpec {
    /// Create a new parameter specification.
    pub const fn new(label: &'static str, min: f64, max: f64, step: f64) -> Self {
        Self {
            label,
            min,
            max,
            step,
        }
    }
}

/// Robot physical parameters.
pub mod robot {
    use super::ParamSpec;

    pub const RADIUS: ParamSpec = ParamSpec::new("Radius (m)", 0.2, 2.0, 0.05);
    pub const SPHERE_MASS: ParamSpec = ParamSpec::new("Shell Mass (kg)", 1.0, 40.0, 0.5);
    pub const PENDULUM_MASS: ParamSpec = ParamSpec::new("Pendulum Mass (kg)", 5.0, 120.0, 1.0);
    pub const PENDULUM_LENGTH: ParamSpec = ParamSpec::new("Pendulum Length (m)", 0.1, 1.5, 0.05);
    pub const TIME_STEP: ParamSpec = ParamSpec::new("Time Step (s)", 5e-5, 1e-3, 5e-5);
}

/// Drive and control parameters.
pub mod drive {
    use super::ParamSpec;

    pub const DRIVE_VOLTAGE: ParamSpec = ParamSpec::new("Drive Voltage (V)", -12.0, 12.0, 0.5);
    pub const TILT_SETPOINT: ParamSpec = ParamSpec::new("Tilt Setpoint (rad)", 0.9, 1.6, 0.01);
    pub const DURATION: ParamSpec = ParamSpec::new("Duration (s)", 1.0, 60.0, 1.0);
}

/// IMU noise parameters.
pub mod imu {
    use super::ParamSpec;

    pub const NOISE_SCALE: ParamSpec = ParamSpec::new("Noise Scale", 0.0, 10.0, 0.1);
    pub const HEADING_STD: ParamSpec = ParamSpec::new("Heading σ (rad)", 0.0, 0.1, 0.001);
    pub const TILT_STD: ParamSpec = ParamSpec::new("Tilt σ (rad)", 0.0, 0.1, 0.001);
    pub const RATE_STD: ParamSpec = ParamSpec::new("Rate σ (rad/s)", 0.0, 0.05, 0.001);
}
