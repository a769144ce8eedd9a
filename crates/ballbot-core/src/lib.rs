//! # Ballbot Core
//!
//! Drive-train component models for a self-balancing spherical robot.
//! This crate contains the pieces that are independent of any particular
//! simulation host:
//! - Brushed DC motor model with coupled electrical/mechanical state
//! - Gearbox torque/speed transforms
//! - Motor + gearbox assemblies exposing an output-side torque interface
//! - The torque-coupling solver (Newton's method with warm start)
//! - Tilt feedback control law
//! - Geometric helpers on top of nalgebra

pub mod assembly;
pub mod control;
pub mod coupling;
pub mod gearbox;
pub mod math;
pub mod motor;

// Re-export core types
pub use assembly::MotorAssembly;
pub use control::TiltController;
pub use coupling::{
    CouplingError, CouplingSolution, Superposition, TorqueCoupling, TorqueInterface,
};
pub use gearbox::Gearbox;
pub use motor::{presets, Motor, MotorParams};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
