//! Navigation Goal
//!
//! The interpreter's sole output: where the flight controller should steer
//! next. Projected from the plane turtle after every tick; the camera turtle
//! never appears here.

use crate::turtle::{FlightFlags, TurtleKind, TurtleState};

/// Goal handed to the navigation controller each tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavigationGoal {
    /// Meters East of the origin
    pub x: i32,
    /// Meters North of the origin
    pub y: i32,
    /// Meters above the origin
    pub altitude: i32,
    /// Target speed, m/s
    pub speed: i16,
    /// Behavior flags in force
    pub flags: FlightFlags,
}

impl From<&TurtleState> for NavigationGoal {
    fn from(state: &TurtleState) -> Self {
        let plane = state.turtle(TurtleKind::Plane);
        Self {
            x: plane.x,
            y: plane.y,
            altitude: plane.altitude,
            speed: state.speed,
            flags: state.flags,
        }
    }
}
