//! Load-side dynamics for the torque couplings.
//!
//! Each load is a strategy struct holding only the scalar coefficients it
//! needs, captured from the simulation state at the start of a fixed step.
//! That keeps every model independently testable and keeps the coupling
//! solver free of references into mutable simulation state.

use ballbot_core::coupling::TorqueInterface;

const G: f64 = 9.81;

/// Rolling dynamics of the driven sphere.
///
/// `accel(τ) = (τ − coriolis_torque) / inertia`, where the inertia is that
/// of the loaded sphere about its rolling axis,
/// `(m_s + m_p)·r²·(2/3 + sin²tilt)`, and the coriolis torque couples the
/// spin rate to the tilt rate.
#[derive(Debug, Clone, Copy)]
pub struct DriveLoad {
    coriolis_torque: f64,
    inertia: f64,
}

impl DriveLoad {
    pub fn new(
        radius: f64,
        total_mass: f64,
        tilt: f64,
        angular_velocity: f64,
        tilt_velocity: f64,
    ) -> Self {
        Self {
            coriolis_torque: radius * tilt.cos() * angular_velocity * tilt_velocity,
            inertia: total_mass * radius * radius * (2.0 / 3.0 + tilt.sin() * tilt.sin()),
        }
    }
}

impl TorqueInterface for DriveLoad {
    fn acceleration(&self, torque: f64) -> f64 {
        (torque - self.coriolis_torque) / self.inertia
    }

    fn inertia(&self, _torque: f64) -> f64 {
        1.0 / self.inertia
    }
}

/// Tilt dynamics of the sphere shell about its fore-aft axis.
///
/// `accel(τ) = 3τ / (2·(m_s + m_p)·r²)`.
#[derive(Debug, Clone, Copy)]
pub struct TiltLoad {
    inertia: f64,
}

impl TiltLoad {
    pub fn new(radius: f64, total_mass: f64) -> Self {
        Self {
            inertia: 2.0 * total_mass * radius * radius / 3.0,
        }
    }
}

impl TorqueInterface for TiltLoad {
    fn acceleration(&self, torque: f64) -> f64 {
        torque / self.inertia
    }

    fn inertia(&self, _torque: f64) -> f64 {
        1.0 / self.inertia
    }
}

/// Reaction of the platform to the drive torque, restored by the pendulum
/// bob's weight.
///
/// `accel(τ) = (τ − L·cos(pendulum_angle)·sin(platform_angle)·m_p·g) / (m_p·L²)`
#[derive(Debug, Clone, Copy)]
pub struct PlatformLoad {
    gravity_torque: f64,
    inertia: f64,
}

impl PlatformLoad {
    pub fn new(
        pendulum_mass: f64,
        pendulum_length: f64,
        platform_angle: f64,
        pendulum_angle: f64,
    ) -> Self {
        Self {
            gravity_torque: pendulum_length
                * pendulum_angle.cos()
                * platform_angle.sin()
                * pendulum_mass
                * G,
            inertia: pendulum_mass * pendulum_length * pendulum_length,
        }
    }
}

impl TorqueInterface for PlatformLoad {
    fn acceleration(&self, torque: f64) -> f64 {
        (torque - self.gravity_torque) / self.inertia
    }

    fn inertia(&self, _torque: f64) -> f64 {
        1.0 / self.inertia
    }
}

/// Reaction of the pendulum to the tilt torque; the mirror of
/// [`PlatformLoad`] with the two angles swapped.
#[derive(Debug, Clone, Copy)]
pub struct PendulumLoad {
    gravity_torque: f64,
    inertia: f64,
}

impl PendulumLoad {
    pub fn new(
        pendulum_mass: f64,
        pendulum_length: f64,
        platform_angle: f64,
        pendulum_angle: f64,
    ) -> Self {
        Self {
            gravity_torque: pendulum_length
                * platform_angle.cos()
                * pendulum_angle.sin()
                * pendulum_mass
                * G,
            inertia: pendulum_mass * pendulum_length * pendulum_length,
        }
    }
}

impl TorqueInterface for PendulumLoad {
    fn acceleration(&self, torque: f64) -> f64 {
        (torque - self.gravity_torque) / self.inertia
    }

    fn inertia(&self, _torque: f64) -> f64 {
        1.0 / self.inertia
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    #[test]
    fn drive_load_matches_hand_computation() {
        let load = DriveLoad::new(1.0, 59.0, 0.4 * PI, 2.0, 0.1);

        let tilt: f64 = 0.4 * PI;
        let inertia = 59.0 * (2.0 / 3.0 + tilt.sin() * tilt.sin());
        let coriolis = tilt.cos() * 2.0 * 0.1;

        assert_relative_eq!(
            load.acceleration(0.5),
            (0.5 - coriolis) / inertia,
            epsilon = 1e-12
        );
        assert_relative_eq!(load.inertia(0.5), 1.0 / inertia, epsilon = 1e-12);
    }

    #[test]
    fn tilting_raises_the_rolling_inertia() {
        let upright = DriveLoad::new(1.0, 59.0, 0.0, 0.0, 0.0);
        let tipped = DriveLoad::new(1.0, 59.0, 0.5 * PI, 0.0, 0.0);

        // The interface exposes 1/I, so a larger rolling inertia reads as
        // a smaller torque sensitivity.
        assert!(tipped.inertia(0.0) < upright.inertia(0.0));
    }

    #[test]
    fn tilt_load_is_pure_inertia() {
        let load = TiltLoad::new(1.0, 59.0);

        assert_relative_eq!(
            load.acceleration(1.0),
            3.0 / (2.0 * 59.0),
            epsilon = 1e-12
        );
        assert_relative_eq!(load.acceleration(0.0), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn platform_gravity_restores_toward_zero() {
        let displaced = PlatformLoad::new(50.0, 0.7, 0.2, 0.0);

        // Positive platform angle, no torque: acceleration pulls back.
        assert!(displaced.acceleration(0.0) < 0.0);

        let centered = PlatformLoad::new(50.0, 0.7, 0.0, 0.0);
        assert_relative_eq!(centered.acceleration(0.0), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn pendulum_mirrors_platform_with_swapped_angles() {
        let platform = PlatformLoad::new(50.0, 0.7, 0.2, 0.3);
        let pendulum = PendulumLoad::new(50.0, 0.7, 0.3, 0.2);

        assert_relative_eq!(
            platform.acceleration(0.1),
            pendulum.acceleration(0.1),
            epsilon = 1e-12
        );
    }

    #[test]
    fn inertia_is_the_acceleration_slope() {
        let loads: [&dyn TorqueInterface; 4] = [
            &DriveLoad::new(1.0, 59.0, 0.4 * PI, 2.0, 0.1),
            &TiltLoad::new(1.0, 59.0),
            &PlatformLoad::new(50.0, 0.7, 0.2, 0.3),
            &PendulumLoad::new(50.0, 0.7, 0.2, 0.3),
        ];

        for load in loads {
            let slope = load.acceleration(1.0) - load.acceleration(0.0);
            assert_relative_eq!(slope, load.inertia(0.5), epsilon = 1e-12);
        }
    }
}
