//! Point-mass vehicle model.
//!
//! Flies straight at the current goal at the commanded speed, with a
//! limited climb rate. Detailed airframe dynamics are out of scope; the
//! model exists to close the guidance loop around the interpreter, so
//! positions and arrival behavior are what matter.

use logoflight_core::{
    FlightFlags, NavigationGoal, SystemValue, TelemetrySource, ValueUnavailable,
};

/// Maximum climb/descent rate, m/s.
const CLIMB_RATE: f32 = 5.0;

/// Altitude band counted as "at goal altitude", meters.
const ALT_TOLERANCE: f32 = 5.0;

/// Simulated vehicle state in the same local frame the turtles use.
#[derive(Debug, Clone)]
pub struct SimVehicle {
    x: f32,
    y: f32,
    altitude: f32,
    /// Ground track, degrees clockwise from North
    heading: f32,
    goal: NavigationGoal,
    arrival_radius: f32,
}

impl SimVehicle {
    /// Vehicle at the origin with the given arrival radius, meters.
    pub fn new(arrival_radius: i32) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            altitude: 0.0,
            heading: 0.0,
            goal: NavigationGoal {
                x: 0,
                y: 0,
                altitude: 0,
                speed: 0,
                flags: FlightFlags::empty(),
            },
            arrival_radius: arrival_radius as f32,
        }
    }

    pub fn set_goal(&mut self, goal: NavigationGoal) {
        self.goal = goal;
    }

    pub fn goal(&self) -> NavigationGoal {
        self.goal
    }

    /// Advance the model by `dt` seconds.
    pub fn step(&mut self, dt: f32) {
        let dx = self.goal.x as f32 - self.x;
        let dy = self.goal.y as f32 - self.y;
        let distance = (dx * dx + dy * dy).sqrt();
        let travel = self.goal.speed.max(0) as f32 * dt;

        if distance > 1e-3 {
            self.heading = dx.atan2(dy).to_degrees().rem_euclid(360.0);
            if travel >= distance {
                self.x = self.goal.x as f32;
                self.y = self.goal.y as f32;
            } else {
                self.x += dx / distance * travel;
                self.y += dy / distance * travel;
            }
        }

        let dz = self.goal.altitude as f32 - self.altitude;
        let climb = CLIMB_RATE * dt;
        self.altitude += dz.clamp(-climb, climb);
    }

    fn distance_to(&self, x: f32, y: f32) -> f32 {
        let dx = x - self.x;
        let dy = y - self.y;
        (dx * dx + dy * dy).sqrt()
    }

    fn bearing_to(&self, x: f32, y: f32) -> f32 {
        (x - self.x).atan2(y - self.y).to_degrees().rem_euclid(360.0)
    }

    /// Bearing relative to the current track, degrees in [-180, 180).
    fn relative(&self, bearing: f32) -> f32 {
        let mut rel = (bearing - self.heading).rem_euclid(360.0);
        if rel >= 180.0 {
            rel -= 360.0;
        }
        rel
    }
}

impl TelemetrySource for SimVehicle {
    fn system_value(&self, value: SystemValue) -> Result<i16, ValueUnavailable> {
        let reading = match value {
            SystemValue::DistToHome => self.distance_to(0.0, 0.0),
            SystemValue::DistToGoal => {
                self.distance_to(self.goal.x as f32, self.goal.y as f32)
            }
            SystemValue::Altitude => self.altitude,
            SystemValue::CurrentAngle => self.heading,
            SystemValue::AngleToHome => self.bearing_to(0.0, 0.0),
            SystemValue::AngleToGoal => {
                self.bearing_to(self.goal.x as f32, self.goal.y as f32)
            }
            SystemValue::RelAngleToHome => self.relative(self.bearing_to(0.0, 0.0)),
            SystemValue::RelAngleToGoal => {
                self.relative(self.bearing_to(self.goal.x as f32, self.goal.y as f32))
            }
            SystemValue::GroundSpeed | SystemValue::AirSpeed => {
                if self.has_arrived() {
                    0.0
                } else {
                    self.goal.speed.max(0) as f32
                }
            }
            // Still air
            SystemValue::AirSpeedZ
            | SystemValue::WindSpeed
            | SystemValue::WindSpeedX
            | SystemValue::WindSpeedY
            | SystemValue::WindSpeedZ
            | SystemValue::WindFromAngle => 0.0,
            SystemValue::Param | SystemValue::InputChannel(_) => {
                return Err(ValueUnavailable(value))
            }
        };
        Ok(reading as i16)
    }

    fn position(&self) -> (i32, i32) {
        (self.x as i32, self.y as i32)
    }

    fn altitude(&self) -> i32 {
        self.altitude as i32
    }

    fn heading(&self) -> i16 {
        self.heading as i16
    }

    fn has_arrived(&self) -> bool {
        let horizontal =
            self.distance_to(self.goal.x as f32, self.goal.y as f32) <= self.arrival_radius;
        let vertical = if self.goal.flags.contains(FlightFlags::ALTITUDE_GOAL) {
            (self.goal.altitude as f32 - self.altitude).abs() <= ALT_TOLERANCE
        } else {
            true
        };
        horizontal && vertical
    }
}
