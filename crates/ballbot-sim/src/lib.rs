//! Ballbot Simulation Library
//!
//! Time-stepped rigid-body simulation of the sphere, platform, and pendulum,
//! plus IMU measurement modeling on top of recorded runs.

pub mod loads;
pub mod params;
pub mod sensor;
pub mod sim;

// Re-export main types
pub use loads::{DriveLoad, PendulumLoad, PlatformLoad, TiltLoad};
pub use params::*;
pub use sensor::{generate_imu_data, measured_heading, ImuConfig, ImuData};
pub use sim::{simulate, BotParams, BotState, SimError, SimTrace, Simulation};
