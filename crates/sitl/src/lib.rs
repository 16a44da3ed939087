//! Software-in-the-loop harness for the LOGO flight-plan interpreter.
//!
//! Pairs the `no_std` engine with a point-mass vehicle model so whole
//! missions can fly in simulated time on the host. The vehicle implements
//! [`logoflight_core::TelemetrySource`], closing the loop the same way
//! firmware does: each tick the engine emits a goal, the vehicle flies
//! toward it, and the engine reads the vehicle back through telemetry.

pub mod error;
pub mod runner;
pub mod vehicle;

pub use error::SimulatorError;
pub use runner::{MissionRunner, TICK_HZ};
pub use vehicle::SimVehicle;
