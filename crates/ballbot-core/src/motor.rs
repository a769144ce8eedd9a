//! Brushed DC motor model.
//!
//! The motor couples an electrical circuit to a mechanical rotor:
//! - Mechanical: `I·ω̇ = Kt·i − b·ω − τ_ext`
//! - Electrical: `L·i̇ = V − Kv·ω − R·i`
//!
//! Both equations advance with forward Euler in [`Motor::update`]. The
//! acceleration side is also exposed algebraically through
//! [`Motor::coupling_acceleration`] so a solver can probe the curve for a
//! hypothetical external torque before the step is committed.

/// Electrical and mechanical constants of a brushed DC motor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotorParams {
    /// Torque constant Kt (Nm/A).
    pub torque_constant: f64,
    /// Back-EMF constant Kv (V·s/rad).
    pub back_emf_constant: f64,
    /// Viscous rotor damping (Nm·s/rad).
    pub damping: f64,
    /// Rotor inertia (kg·m²).
    pub inertia: f64,
    /// Armature resistance (Ω).
    pub resistance: f64,
    /// Armature inductance (H).
    pub inductance: f64,
}

/// DC motor with mutable {angular velocity, current} state.
///
/// [`Motor::update`] is the only mutator; the coupling probes are pure.
/// For stability, `dt` should stay well below the electrical time constant
/// `L/R`.
#[derive(Debug, Clone)]
pub struct Motor {
    params: MotorParams,
    angular_velocity: f64,
    current: f64,
}

impl Motor {
    /// Create a motor at rest with no armature current.
    pub fn new(params: MotorParams) -> Self {
        Self {
            params,
            angular_velocity: 0.0,
            current: 0.0,
        }
    }

    /// Jump the state to the unloaded equilibrium for `velocity`:
    /// the current that exactly balances viscous damping.
    pub fn bring_to_steady_state(&mut self, velocity: f64) {
        self.angular_velocity = velocity;
        self.current = (self.params.damping * velocity) / self.params.torque_constant;
    }

    /// Advance the coupled electrical/mechanical ODE pair by `dt`,
    /// with `torque` opposing the rotor externally.
    pub fn update(&mut self, voltage: f64, torque: f64, dt: f64) {
        let dw = self.coupling_acceleration(torque);
        let di = (voltage
            - self.params.back_emf_constant * self.angular_velocity
            - self.params.resistance * self.current)
            / self.params.inductance;

        self.angular_velocity += dw * dt;
        self.current += di * dt;
    }

    /// Instantaneous rotor acceleration under an assumed external `torque`.
    /// Does not mutate state.
    pub fn coupling_acceleration(&self, torque: f64) -> f64 {
        (self.params.torque_constant * self.current
            - self.params.damping * self.angular_velocity
            - torque)
            / self.params.inertia
    }

    /// Partial derivative of [`Motor::coupling_acceleration`] with respect
    /// to torque. Constant for this model.
    pub fn coupling_inertia(&self, _torque: f64) -> f64 {
        -1.0 / self.params.inertia
    }

    /// Rotor angular velocity (rad/s).
    pub fn velocity(&self) -> f64 {
        self.angular_velocity
    }

    /// Armature current (A).
    pub fn current(&self) -> f64 {
        self.current
    }
}

/// Named motor presets based on real hobby-robotics hardware.
pub mod presets {
    use super::{Motor, MotorParams};

    /// 2.5-inch CIM-class motor.
    pub fn cim() -> Motor {
        Motor::new(MotorParams {
            torque_constant: 1.84e-2,
            back_emf_constant: 2.11e-2,
            damping: 8.91e-2,
            inertia: 7.65e-5,
            resistance: 9.16e-2,
            inductance: 5.90e-5,
        })
    }

    /// Small 775-class DC motor (775pro datasheet: 0.71 Nm stall at 134 A,
    /// 18730 rpm free speed on 12 V).
    pub fn vex_775() -> Motor {
        Motor::new(MotorParams {
            torque_constant: 5.30e-3,
            back_emf_constant: 6.12e-3,
            damping: 1.20e-6,
            inertia: 8.00e-6,
            resistance: 8.96e-2,
            inductance: 5.00e-5,
        })
    }
}
