//! logoflight_core - Pure no_std LOGO flight-plan interpreter
//!
//! This crate contains the platform-agnostic mission-language engine that
//! drives an autonomous vehicle's navigation goal. A flight plan is a static
//! table of turtle-graphics instructions (moves, turns, flag toggles,
//! conditionals, loops, subroutine calls); the interpreter walks the table at
//! runtime and continuously emits a [`goal::NavigationGoal`] for an external
//! navigation controller to track.
//!
//! # Design Principles
//!
//! - **Zero cfg**: No `#[cfg(feature = ...)]` directives allowed
//! - **Pure no_std**: No std library dependencies
//! - **Trait abstractions**: Telemetry injected via [`telemetry::TelemetrySource`]
//! - **No steady-state allocation**: programs and call stacks are fixed-capacity
//!
//! # Modules
//!
//! - [`program`]: Instruction set and load-time program resolution
//! - [`telemetry`]: System-value bridge to the external telemetry collaborator
//! - [`turtle`]: Plane/camera turtle state, pen, and behavior flags
//! - [`engine`]: Execution engine, call stack, and interrupt scheduler
//! - [`goal`]: Navigation goal projection consumed by the flight controller
//! - [`config`]: Interpreter tunables

#![no_std]

pub mod config;
pub mod engine;
pub mod goal;
pub mod program;
pub mod telemetry;
pub mod turtle;

pub use config::LogoConfig;
pub use engine::{EngineState, FlightMode, LogoInterpreter, RuntimeError};
pub use goal::NavigationGoal;
pub use program::{Instruction, LoadError, ResolvedProgram, SubroutineId};
pub use telemetry::{SystemValue, TelemetrySource, ValueUnavailable};
pub use turtle::{FlightFlags, Turtle, TurtleKind, TurtleState};
