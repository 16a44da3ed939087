//! Turtle State
//!
//! The interpreter steers by moving a "turtle" around a local tangent plane
//! anchored at the origin (home). There are two turtles: the plane turtle,
//! whose position is the navigation goal the vehicle flies toward, and the
//! camera turtle, which aims a payload. Movement instructions apply to
//! whichever turtle is active; only plane-turtle moves are worth waiting for.
//!
//! Coordinates are integer meters East (x) and North (y) of the origin.
//! Headings are degrees clockwise from North, normalized to [0, 360).

mod flags;

pub use flags::FlightFlags;

use libm::{cosf, sinf};

use crate::config::LogoConfig;
use crate::telemetry::TelemetrySource;

const DEG_TO_RAD: f32 = core::f32::consts::PI / 180.0;

/// Which turtle movement instructions apply to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurtleKind {
    /// Navigation goal turtle
    Plane,
    /// Payload aim-point turtle
    Camera,
}

impl TurtleKind {
    pub(crate) const fn index(self) -> usize {
        match self {
            TurtleKind::Plane => 0,
            TurtleKind::Camera => 1,
        }
    }
}

/// Position and orientation of a single turtle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Turtle {
    /// Meters East of the origin
    pub x: i32,
    /// Meters North of the origin
    pub y: i32,
    /// Goal altitude, meters above the origin
    pub altitude: i32,
    /// Degrees clockwise from North, in [0, 360)
    pub heading: i16,
}

impl Turtle {
    pub const fn new() -> Self {
        Self {
            x: 0,
            y: 0,
            altitude: 0,
            heading: 0,
        }
    }

    /// Rotate clockwise by `degrees` (negative turns left).
    pub fn turn(&mut self, degrees: i16) {
        self.heading = normalize_heading(self.heading as i32 + degrees as i32);
    }

    /// Set an absolute heading.
    pub fn set_heading(&mut self, degrees: i16) {
        self.heading = normalize_heading(degrees as i32);
    }

    /// Move along the current heading. Fractional meters truncate toward
    /// zero, matching the integer plane the goals live on.
    pub fn forward(&mut self, meters: i16) {
        let rad = self.heading as f32 * DEG_TO_RAD;
        self.x += (meters as f32 * sinf(rad)) as i32;
        self.y += (meters as f32 * cosf(rad)) as i32;
    }
}

impl Default for Turtle {
    fn default() -> Self {
        Self::new()
    }
}

/// Normalize any angle in degrees to [0, 360).
pub fn normalize_heading(degrees: i32) -> i16 {
    (((degrees % 360) + 360) % 360) as i16
}

/// Both turtles plus the drawing state shared between them.
#[derive(Debug, Clone)]
pub struct TurtleState {
    turtles: [Turtle; 2],
    /// Turtle movement instructions currently apply to
    pub active: TurtleKind,
    /// With the pen down, every plane-turtle move waits for arrival
    pub pen_down: bool,
    /// Target speed forwarded with the goal, m/s
    pub speed: i16,
    /// Behavior flags forwarded with the goal
    pub flags: FlightFlags,
}

impl TurtleState {
    pub const fn new(config: &LogoConfig) -> Self {
        Self {
            turtles: [
                Turtle {
                    x: 0,
                    y: 0,
                    altitude: config.initial_altitude,
                    heading: 0,
                },
                Turtle::new(),
            ],
            active: TurtleKind::Plane,
            pen_down: true,
            speed: config.default_speed,
            flags: FlightFlags::empty(),
        }
    }

    /// Reset for a fresh program start: both turtles at the vehicle's
    /// current position and heading, plane turtle at the configured initial
    /// altitude, pen down, plane turtle active, flags cleared.
    pub fn reset(&mut self, config: &LogoConfig, telemetry: &dyn TelemetrySource) {
        let (x, y) = telemetry.position();
        let heading = normalize_heading(telemetry.heading() as i32);
        self.turtles[TurtleKind::Plane.index()] = Turtle {
            x,
            y,
            altitude: config.initial_altitude,
            heading,
        };
        self.turtles[TurtleKind::Camera.index()] = Turtle {
            x,
            y,
            altitude: telemetry.altitude(),
            heading,
        };
        self.active = TurtleKind::Plane;
        self.pen_down = true;
        self.speed = config.default_speed;
        self.flags = FlightFlags::empty();
    }

    pub fn active_turtle(&self) -> &Turtle {
        &self.turtles[self.active.index()]
    }

    pub fn active_turtle_mut(&mut self) -> &mut Turtle {
        &mut self.turtles[self.active.index()]
    }

    pub fn turtle(&self, kind: TurtleKind) -> &Turtle {
        &self.turtles[kind.index()]
    }

    /// True if a movement instruction executed right now should suspend the
    /// program until the vehicle arrives. Camera-turtle moves never do.
    pub fn waits_for_arrival(&self) -> bool {
        self.pen_down && self.active == TurtleKind::Plane
    }
}
