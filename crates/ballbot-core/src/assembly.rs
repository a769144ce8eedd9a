//! Motor + gearbox assembly.

use crate::coupling::TorqueInterface;
use crate::gearbox::Gearbox;
use crate::motor::Motor;

/// A motor behind a reduction gearbox, viewed from the output shaft.
///
/// The assembly is one side of a torque-coupling problem: its
/// [`TorqueInterface`] impl maps an output-side torque demand through the
/// gearbox to the motor and scales the motor's coupling behavior back to
/// the output shaft.
#[derive(Debug, Clone)]
pub struct MotorAssembly {
    motor: Motor,
    gearbox: Gearbox,
}

impl MotorAssembly {
    pub fn new(motor: Motor, gearbox: Gearbox) -> Self {
        Self { motor, gearbox }
    }

    /// Advance the motor under `voltage` against an output-side torque
    /// demand, then refresh the gearbox's cached motor velocity.
    pub fn update(&mut self, voltage: f64, output_torque: f64, dt: f64) {
        let motor_torque = self.gearbox.input_torque(output_torque);

        self.motor.update(voltage, motor_torque, dt);
        self.gearbox.update(self.motor.velocity());
    }

    /// Output-shaft angular velocity.
    pub fn velocity(&self) -> f64 {
        self.gearbox.output_speed(self.motor.velocity())
    }
}

impl TorqueInterface for MotorAssembly {
    fn acceleration(&self, output_torque: f64) -> f64 {
        let motor_torque = self.gearbox.input_torque(output_torque);
        let motor_acceleration = self.motor.coupling_acceleration(motor_torque);

        self.gearbox.output_speed(motor_acceleration)
    }

    fn inertia(&self, output_torque: f64) -> f64 {
        let motor_torque = self.gearbox.input_torque(output_torque);
        let motor_inertia =
            self.motor.coupling_inertia(motor_torque) / self.gearbox.reduction_ratio();

        self.gearbox.output_speed(motor_inertia)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::motor::{Motor, MotorParams};
    use approx::assert_relative_eq;

    fn test_motor() -> Motor {
        Motor::new(MotorParams {
            torque_constant: 0.02,
            back_emf_constant: 0.02,
            damping: 0.001,
            inertia: 1e-4,
            resistance: 0.1,
            inductance: 1e-4,
        })
    }

    #[test]
    fn velocity_is_reduction_scaled() {
        let mut motor = test_motor();
        motor.bring_to_steady_state(100.0);
        let assembly = MotorAssembly::new(motor, Gearbox::new(5.0, 0.0));

        assert_relative_eq!(assembly.velocity(), 20.0, epsilon = 1e-12);
    }

    #[test]
    fn inertia_scales_with_ratio_squared() {
        let assembly_direct = MotorAssembly::new(test_motor(), Gearbox::new(1.0, 0.0));
        let assembly_reduced = MotorAssembly::new(test_motor(), Gearbox::new(5.0, 0.0));

        assert_relative_eq!(
            assembly_reduced.inertia(0.0),
            assembly_direct.inertia(0.0) / 25.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn acceleration_matches_motor_through_gearbox() {
        let mut motor = test_motor();
        motor.bring_to_steady_state(50.0);

        let reference = motor.clone();
        let mut assembly = MotorAssembly::new(motor, Gearbox::new(5.0, 0.0));
        // Prime the gearbox velocity cache as an update would.
        assembly.update(0.0, 0.0, 0.0);

        let output_torque = 0.25;
        let expected = reference.coupling_acceleration(output_torque / 5.0) / 5.0;

        assert_relative_eq!(assembly.acceleration(output_torque), expected, epsilon = 1e-12);
    }

    #[test]
    fn update_spins_up_under_voltage() {
        let mut assembly = MotorAssembly::new(test_motor(), Gearbox::new(5.0, 0.0));

        for _ in 0..1000 {
            assembly.update(12.0, 0.0, 1e-5);
        }

        assert!(assembly.velocity() > 0.0);
    }
}
