//! IMU measurement model.
//!
//! Generates the measurement channels the robot's controller would see:
//! heading recovered from the sphere orientation, plus tilt, tilt rate, and
//! spin rate, each with seeded Gaussian noise so runs are reproducible.

use crate::sim::SimTrace;
use nalgebra::{UnitQuaternion, Vector3};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use std::f64::consts::PI;

pub struct ImuConfig {
    /// Multiplier applied to every channel's sigma.
    pub noise_scale: f64,
    pub heading_noise_std: f64,          // rad
    pub tilt_noise_std: f64,             // rad
    pub tilt_velocity_noise_std: f64,    // rad/s
    pub angular_velocity_noise_std: f64, // rad/s
    pub seed: u64,
}

impl Default for ImuConfig {
    fn default() -> Self {
        Self {
            noise_scale: 1.0,
            heading_noise_std: 0.01,
            tilt_noise_std: 0.005,
            tilt_velocity_noise_std: 0.002,
            angular_velocity_noise_std: 0.002,
            seed: 42,
        }
    }
}

pub struct ImuData {
    pub time: Vec<f64>,
    pub heading: Vec<f64>,
    pub tilt: Vec<f64>,
    pub tilt_velocity: Vec<f64>,
    pub angular_velocity: Vec<f64>,
}

/// Heading as the IMU reports it: rotate the +X reference axis by the
/// sphere orientation, take the ground-plane angle, wrap into [0, 2π).
pub fn measured_heading(rotation: &UnitQuaternion<f64>) -> f64 {
    let rotated = rotation * Vector3::new(1.0, 0.0, 0.0);
    let mut theta = rotated.y.atan2(rotated.x);

    if theta < 0.0 {
        theta += 2.0 * PI;
    }

    theta
}

pub fn generate_imu_data(trace: &SimTrace, cfg: &ImuConfig) -> ImuData {
    let mut rng = StdRng::seed_from_u64(cfg.seed);

    let d_heading = Normal::new(0.0, cfg.noise_scale * cfg.heading_noise_std).unwrap();
    let d_tilt = Normal::new(0.0, cfg.noise_scale * cfg.tilt_noise_std).unwrap();
    let d_tilt_velocity =
        Normal::new(0.0, cfg.noise_scale * cfg.tilt_velocity_noise_std).unwrap();
    let d_angular_velocity =
        Normal::new(0.0, cfg.noise_scale * cfg.angular_velocity_noise_std).unwrap();

    let n = trace.len();
    let mut data = ImuData {
        time: trace.time.clone(),
        heading: Vec::with_capacity(n),
        tilt: Vec::with_capacity(n),
        tilt_velocity: Vec::with_capacity(n),
        angular_velocity: Vec::with_capacity(n),
    };

    for i in 0..n {
        let heading = measured_heading(&trace.rotation[i]);

        data.heading.push(heading + d_heading.sample(&mut rng));
        data.tilt.push(trace.tilt[i] + d_tilt.sample(&mut rng));
        data.tilt_velocity
            .push(trace.tilt_velocity[i] + d_tilt_velocity.sample(&mut rng));
        data.angular_velocity
            .push(trace.angular_velocity[i] + d_angular_velocity.sample(&mut rng));
    }

    data
}
