//! Time-stepped simulation of the ballbot.
//!
//! The sphere rolls on the ground plane, driven by an internal drive train;
//! a platform and a reaction pendulum hang inside it. Two motor/gearbox
//! assemblies are coupled to the body dynamics through rigid shafts, so each
//! fixed step negotiates the transmitted torques with the Newton solver
//! before committing the integration.

use crate::loads::{DriveLoad, PendulumLoad, PlatformLoad, TiltLoad};
use ballbot_core::control::TiltController;
use ballbot_core::coupling::{CouplingError, Superposition, TorqueCoupling, TorqueInterface};
use ballbot_core::gearbox::Gearbox;
use ballbot_core::math::rotation_about;
use ballbot_core::motor::presets;
use ballbot_core::MotorAssembly;
use nalgebra::{UnitQuaternion, Vector3};
use std::f64::consts::PI;
use thiserror::Error;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------
/// Newton iterations per coupling solve at the simulation call sites.
const SOLVER_ITERATIONS: usize = 6;
/// Reduction ratio of both drive and tilt gearboxes.
const GEAR_RATIO: f64 = 5.0;
/// Tilt at rest; the sphere starts leaning near its setpoint.
const INITIAL_TILT: f64 = 0.43 * PI;

// ---------------------------------------------------------------------------
// Parameters
// ---------------------------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BotParams {
    /// Sphere radius (m).
    pub radius: f64,
    /// Shell mass (kg).
    pub sphere_mass: f64,
    /// Pendulum bob mass (kg).
    pub pendulum_mass: f64,
    /// Pendulum arm length (m).
    pub pendulum_length: f64,
    /// Fixed integration step (s).
    pub time_step: f64,
    /// Constant cruise command on the drive motor (V).
    pub drive_voltage: f64,
    /// Tilt regulator setpoint (rad).
    pub tilt_setpoint: f64,
}

impl Default for BotParams {
    fn default() -> Self {
        Self {
            radius: 1.0,
            sphere_mass: 9.0,
            pendulum_mass: 50.0,
            pendulum_length: 0.7,
            time_step: 2e-4,
            drive_voltage: 2.0,
            tilt_setpoint: 0.4 * PI,
        }
    }
}

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------
/// All mutable physical state, advanced once per fixed step.
///
/// Orientation quaternions are derived from these scalars on demand, never
/// stored, so repeated composition cannot drift.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BotState {
    pub position: Vector3<f64>,
    /// Spin angle about the rolling axis (rad).
    pub roll: f64,
    /// Spin rate about the rolling axis (rad/s).
    pub angular_velocity: f64,
    /// Travel direction in the ground plane (rad).
    pub heading: f64,
    /// Lean of the rolling axis from vertical (rad).
    pub tilt: f64,
    pub tilt_velocity: f64,
    pub platform_angle: f64,
    pub platform_velocity: f64,
    pub pendulum_angle: f64,
    pub pendulum_velocity: f64,
}

impl BotState {
    /// At rest at `position`, leaning at the initial tilt.
    pub fn at_rest(position: Vector3<f64>) -> Self {
        Self {
            position,
            roll: 0.0,
            angular_velocity: 0.0,
            heading: 0.0,
            tilt: INITIAL_TILT,
            tilt_velocity: 0.0,
            platform_angle: 0.0,
            platform_velocity: 0.0,
            pendulum_angle: 0.0,
            pendulum_velocity: 0.0,
        }
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------
/// A degenerate coupling aborts the step; it signals a modeling bug, so it
/// is never retried internally.
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum SimError {
    #[error("drive-train coupling failed")]
    DriveCoupling(#[source] CouplingError),
    #[error("tilt-train coupling failed")]
    TiltCoupling(#[source] CouplingError),
}

// ---------------------------------------------------------------------------
// Simulation
// ---------------------------------------------------------------------------
pub struct Simulation {
    params: BotParams,
    state: BotState,

    drive_assembly: MotorAssembly,
    drive_coupling: TorqueCoupling,
    tilt_assembly: MotorAssembly,
    tilt_coupling: TorqueCoupling,

    tilt_controller: TiltController,
}

impl Simulation {
    pub fn new(params: BotParams, position: Vector3<f64>) -> Self {
        Self::from_state(params, BotState::at_rest(position))
    }

    /// Start from an explicit state; used by tests and replay tooling.
    pub fn from_state(params: BotParams, state: BotState) -> Self {
        Self {
            params,
            state,
            drive_assembly: MotorAssembly::new(presets::vex_775(), Gearbox::new(GEAR_RATIO, 0.0)),
            drive_coupling: TorqueCoupling::with_iterations(SOLVER_ITERATIONS),
            tilt_assembly: MotorAssembly::new(presets::vex_775(), Gearbox::new(GEAR_RATIO, 0.0)),
            tilt_coupling: TorqueCoupling::with_iterations(SOLVER_ITERATIONS),
            tilt_controller: TiltController::new(params.tilt_setpoint),
        }
    }

    pub fn params(&self) -> &BotParams {
        &self.params
    }

    pub fn state(&self) -> &BotState {
        &self.state
    }

    pub fn position(&self) -> Vector3<f64> {
        self.state.position
    }

    /// Sphere orientation: heading about vertical, then tilt about the
    /// lateral axis, then roll about the rolling axis. The composition
    /// order is load-bearing for both rendering and the IMU heading.
    pub fn rotation(&self) -> UnitQuaternion<f64> {
        let roll = rotation_about(Vector3::new(0.0, 0.0, -1.0), self.state.roll);
        let tilt = rotation_about(Vector3::new(1.0, 0.0, 0.0), self.state.tilt);
        let heading = rotation_about(Vector3::new(0.0, 0.0, 1.0), self.state.heading);

        heading * tilt * roll
    }

    /// Platform orientation: heading composed with the drive-reaction angle.
    pub fn platform_rotation(&self) -> UnitQuaternion<f64> {
        let swing = rotation_about(Vector3::new(0.0, 1.0, 0.0), self.state.platform_angle);
        let heading = rotation_about(Vector3::new(0.0, 0.0, 1.0), self.state.heading);

        heading * swing
    }

    /// Pendulum orientation: heading composed with the tilt-reaction angle.
    pub fn pendulum_rotation(&self) -> UnitQuaternion<f64> {
        let swing = rotation_about(Vector3::new(1.0, 0.0, 0.0), self.state.pendulum_angle);
        let heading = rotation_about(Vector3::new(0.0, 0.0, 1.0), self.state.heading);

        heading * swing
    }

    /// Heading reduced mod 2π.
    pub fn heading(&self) -> f64 {
        self.state.heading % (2.0 * PI)
    }

    /// Advance by `elapsed_time` seconds of wall-clock time, subdivided
    /// into fixed steps plus a final remainder smaller than one step.
    pub fn update(&mut self, elapsed_time: f64) -> Result<(), SimError> {
        let mut elapsed = elapsed_time;

        while elapsed > self.params.time_step {
            elapsed -= self.params.time_step;
            self.fixed_update(self.params.time_step)?;
        }

        self.fixed_update(elapsed)
    }

    fn fixed_update(&mut self, dt: f64) -> Result<(), SimError> {
        let p = self.params;

        // Rolling motion projects sphere rotation into ground-plane travel.
        {
            let s = &mut self.state;
            let ground_speed = s.angular_velocity * s.tilt.sin() * p.radius;
            let direction = Vector3::new(s.heading.cos(), s.heading.sin(), 0.0);

            s.position += dt * ground_speed * direction;
            s.heading += dt * s.angular_velocity * s.tilt.cos();
        }

        let s = self.state;
        let total_mass = p.sphere_mass + p.pendulum_mass;

        // Negotiate the torque transmitted through each train. The load
        // models capture this step's coefficients by value.
        let drive_load = DriveLoad::new(
            p.radius,
            total_mass,
            s.tilt,
            s.angular_velocity,
            s.tilt_velocity,
        );
        let platform_load = PlatformLoad::new(
            p.pendulum_mass,
            p.pendulum_length,
            s.platform_angle,
            s.pendulum_angle,
        );
        let tilt_load = TiltLoad::new(p.radius, total_mass);
        let pendulum_load = PendulumLoad::new(
            p.pendulum_mass,
            p.pendulum_length,
            s.platform_angle,
            s.pendulum_angle,
        );

        let drive_torque = self
            .drive_coupling
            .solve(
                &self.drive_assembly,
                &Superposition::new(drive_load, platform_load),
            )
            .map_err(SimError::DriveCoupling)?
            .torque;

        let tilt_torque = self
            .tilt_coupling
            .solve(
                &self.tilt_assembly,
                &Superposition::new(tilt_load, pendulum_load),
            )
            .map_err(SimError::TiltCoupling)?
            .torque;

        // Commit the motor step under this frame's control voltages.
        let tilt_voltage = self.tilt_controller.voltage(s.tilt, s.tilt_velocity);
        self.drive_assembly.update(p.drive_voltage, drive_torque, dt);
        self.tilt_assembly.update(tilt_voltage, tilt_torque, dt);

        // Integrate with the torque-derived accelerations.
        let s = &mut self.state;

        s.angular_velocity += dt * drive_load.acceleration(drive_torque);
        s.roll += dt * s.angular_velocity;

        s.tilt += dt * s.tilt_velocity;
        s.tilt_velocity += dt * tilt_load.acceleration(tilt_torque);

        s.platform_angle += dt * s.platform_velocity;
        s.platform_velocity += dt * platform_load.acceleration(drive_torque);

        s.pendulum_angle += dt * s.pendulum_velocity;
        s.pendulum_velocity += dt * pendulum_load.acceleration(tilt_torque);

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Trace recording
// ---------------------------------------------------------------------------
/// Per-frame outputs of a recorded run, in struct-of-arrays form for the
/// CLI and GUI hosts.
#[derive(Debug, Clone, Default)]
pub struct SimTrace {
    pub time: Vec<f64>,
    pub position: Vec<Vector3<f64>>,
    pub heading: Vec<f64>,
    pub roll: Vec<f64>,
    pub tilt: Vec<f64>,
    pub tilt_velocity: Vec<f64>,
    pub platform_angle: Vec<f64>,
    pub pendulum_angle: Vec<f64>,
    pub angular_velocity: Vec<f64>,
    pub rotation: Vec<UnitQuaternion<f64>>,
    pub platform_rotation: Vec<UnitQuaternion<f64>>,
    pub pendulum_rotation: Vec<UnitQuaternion<f64>>,
}

impl SimTrace {
    fn with_capacity(frames: usize) -> Self {
        Self {
            time: Vec::with_capacity(frames),
            position: Vec::with_capacity(frames),
            heading: Vec::with_capacity(frames),
            roll: Vec::with_capacity(frames),
            tilt: Vec::with_capacity(frames),
            tilt_velocity: Vec::with_capacity(frames),
            platform_angle: Vec::with_capacity(frames),
            pendulum_angle: Vec::with_capacity(frames),
            angular_velocity: Vec::with_capacity(frames),
            rotation: Vec::with_capacity(frames),
            platform_rotation: Vec::with_capacity(frames),
            pendulum_rotation: Vec::with_capacity(frames),
        }
    }

    fn record(&mut self, time: f64, sim: &Simulation) {
        let state = sim.state();

        self.time.push(time);
        self.position.push(sim.position());
        self.heading.push(sim.heading());
        self.roll.push(state.roll);
        self.tilt.push(state.tilt);
        self.tilt_velocity.push(state.tilt_velocity);
        self.platform_angle.push(state.platform_angle);
        self.pendulum_angle.push(state.pendulum_angle);
        self.angular_velocity.push(state.angular_velocity);
        self.rotation.push(sim.rotation());
        self.platform_rotation.push(sim.platform_rotation());
        self.pendulum_rotation.push(sim.pendulum_rotation());
    }

    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }
}

/// Run a simulation from rest for `duration` seconds, sampling at
/// `frame_rate` Hz as a render loop would.
pub fn simulate(
    params: BotParams,
    position: Vector3<f64>,
    duration: f64,
    frame_rate: f64,
) -> Result<SimTrace, SimError> {
    let mut sim = Simulation::new(params, position);
    let frame_dt = 1.0 / frame_rate;
    let frames = (duration * frame_rate).ceil() as usize;

    let mut trace = SimTrace::with_capacity(frames + 1);
    trace.record(0.0, &sim);

    for frame in 1..=frames {
        sim.update(frame_dt)?;
        trace.record(frame as f64 * frame_dt, &sim);
    }

    Ok(trace)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn assert_states_close(a: &BotState, b: &BotState, epsilon: f64) {
        assert_relative_eq!(a.position, b.position, epsilon = epsilon);
        assert_relative_eq!(a.roll, b.roll, epsilon = epsilon);
        assert_relative_eq!(a.angular_velocity, b.angular_velocity, epsilon = epsilon);
        assert_relative_eq!(a.heading, b.heading, epsilon = epsilon);
        assert_relative_eq!(a.tilt, b.tilt, epsilon = epsilon);
        assert_relative_eq!(a.tilt_velocity, b.tilt_velocity, epsilon = epsilon);
        assert_relative_eq!(a.platform_angle, b.platform_angle, epsilon = epsilon);
        assert_relative_eq!(a.platform_velocity, b.platform_velocity, epsilon = epsilon);
        assert_relative_eq!(a.pendulum_angle, b.pendulum_angle, epsilon = epsilon);
        assert_relative_eq!(a.pendulum_velocity, b.pendulum_velocity, epsilon = epsilon);
    }

    #[test]
    fn identical_runs_are_deterministic() {
        let params = BotParams::default();
        let mut a = Simulation::new(params, Vector3::new(0.0, 0.0, 1.0));
        let mut b = Simulation::new(params, Vector3::new(0.0, 0.0, 1.0));

        for dt in [0.016, 0.017, 0.015, 0.016, 0.033, 0.008] {
            a.update(dt).unwrap();
            b.update(dt).unwrap();

            assert_eq!(a.state(), b.state());
            assert_eq!(a.rotation(), b.rotation());
            assert_eq!(a.heading(), b.heading());
        }
    }

    #[test]
    fn update_subdivides_into_fixed_steps() {
        let params = BotParams::default();
        let mut whole = Simulation::new(params, Vector3::zeros());
        let mut pieces = Simulation::new(params, Vector3::zeros());

        whole.update(2.5 * params.time_step).unwrap();

        pieces.fixed_update(params.time_step).unwrap();
        pieces.fixed_update(params.time_step).unwrap();
        pieces.fixed_update(0.5 * params.time_step).unwrap();

        assert_states_close(whole.state(), pieces.state(), 1e-9);
    }

    #[test]
    fn tilted_sphere_rolls_straight_along_x() {
        let params = BotParams::default();
        let mut state = BotState::at_rest(Vector3::zeros());
        state.tilt = 0.5 * PI;
        state.angular_velocity = 1.0;

        let mut sim = Simulation::from_state(params, state);
        let mut previous_x = sim.position().x;

        for _ in 0..50 {
            sim.update(params.time_step).unwrap();

            let position = sim.position();
            assert!(position.x > previous_x);
            assert!(position.y.abs() < 1e-6);
            previous_x = position.x;
        }
    }

    #[test]
    fn upright_sphere_spins_in_place() {
        // tilt = 0: the rolling axis is vertical, so spinning translates
        // nothing and feeds everything into heading.
        let params = BotParams::default();
        let mut state = BotState::at_rest(Vector3::zeros());
        state.tilt = 0.0;
        state.angular_velocity = 1.0;

        let mut sim = Simulation::from_state(params, state);
        sim.update(0.01).unwrap();

        assert_relative_eq!(sim.position().x, 0.0, epsilon = 1e-6);
        assert_relative_eq!(sim.position().y, 0.0, epsilon = 1e-6);
        assert!(sim.heading() > 0.0);
    }

    #[test]
    fn heading_is_reduced_mod_two_pi() {
        let params = BotParams::default();
        let mut state = BotState::at_rest(Vector3::zeros());
        state.heading = 5.0 * PI;

        let sim = Simulation::from_state(params, state);
        assert_relative_eq!(sim.heading(), PI, epsilon = 1e-12);
    }

    #[test]
    fn rotation_composes_heading_tilt_roll() {
        let params = BotParams::default();
        let mut state = BotState::at_rest(Vector3::zeros());
        state.roll = 0.0;
        state.tilt = 0.0;
        state.heading = 0.5 * PI;

        let sim = Simulation::from_state(params, state);
        let rotated = sim.rotation() * Vector3::new(1.0, 0.0, 0.0);

        // Pure heading: +X maps to +Y.
        assert_relative_eq!(rotated, Vector3::new(0.0, 1.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn derived_rotations_stay_unit_norm() {
        let params = BotParams::default();
        let mut sim = Simulation::new(params, Vector3::new(0.0, 0.0, 1.0));

        for _ in 0..100 {
            sim.update(0.016).unwrap();
        }

        assert_relative_eq!(sim.rotation().norm(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(sim.platform_rotation().norm(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(sim.pendulum_rotation().norm(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn simulate_records_one_trace_row_per_frame() {
        let trace = simulate(BotParams::default(), Vector3::zeros(), 0.5, 60.0).unwrap();

        assert_eq!(trace.len(), 31);
        assert_eq!(trace.position.len(), trace.time.len());
        assert_eq!(trace.rotation.len(), trace.time.len());
        assert_relative_eq!(trace.time[0], 0.0);
    }
}
