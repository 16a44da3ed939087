//! System-Value Bridge
//!
//! Conditionals and LOAD_TO_PARAM read live vehicle state through the
//! [`TelemetrySource`] trait. The interpreter never owns sensors; the
//! platform (firmware or SITL harness) implements this trait and hands it in
//! on every tick.
//!
//! All system values are signed 16-bit, matching the plan language's operand
//! width. A source that cannot produce a value returns [`ValueUnavailable`];
//! the engine degrades per call site (conditionals read false, value loads
//! are skipped) rather than faulting.

use core::fmt;

use heapless::Vec;

/// Live vehicle quantities a flight plan can read.
///
/// Distances in meters, angles in degrees, speeds in m/s (vertical and wind
/// components may be negative).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemValue {
    /// Ground distance from the origin
    DistToHome,
    /// Ground distance to the current goal
    DistToGoal,
    /// Altitude above the origin
    Altitude,
    /// Vehicle ground-track heading, clockwise from North
    CurrentAngle,
    /// Absolute bearing to the origin
    AngleToHome,
    /// Absolute bearing to the current goal
    AngleToGoal,
    /// Bearing to the origin relative to the vehicle heading, [-180, 180)
    RelAngleToHome,
    /// Bearing to the goal relative to the vehicle heading, [-180, 180)
    RelAngleToGoal,
    GroundSpeed,
    AirSpeed,
    /// Vertical air speed, positive up
    AirSpeedZ,
    WindSpeed,
    WindSpeedX,
    WindSpeedY,
    WindSpeedZ,
    /// Direction the wind blows from, clockwise from North
    WindFromAngle,
    /// The executing context's own parameter register
    Param,
    /// Raw RC input channel reading
    InputChannel(u8),
}

impl fmt::Display for SystemValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SystemValue::DistToHome => write!(f, "DIST_TO_HOME"),
            SystemValue::DistToGoal => write!(f, "DIST_TO_GOAL"),
            SystemValue::Altitude => write!(f, "ALT"),
            SystemValue::CurrentAngle => write!(f, "CURRENT_ANGLE"),
            SystemValue::AngleToHome => write!(f, "ANGLE_TO_HOME"),
            SystemValue::AngleToGoal => write!(f, "ANGLE_TO_GOAL"),
            SystemValue::RelAngleToHome => write!(f, "REL_ANGLE_TO_HOME"),
            SystemValue::RelAngleToGoal => write!(f, "REL_ANGLE_TO_GOAL"),
            SystemValue::GroundSpeed => write!(f, "GROUND_SPEED"),
            SystemValue::AirSpeed => write!(f, "AIR_SPEED"),
            SystemValue::AirSpeedZ => write!(f, "AIR_SPEED_Z"),
            SystemValue::WindSpeed => write!(f, "WIND_SPEED"),
            SystemValue::WindSpeedX => write!(f, "WIND_SPEED_X"),
            SystemValue::WindSpeedY => write!(f, "WIND_SPEED_Y"),
            SystemValue::WindSpeedZ => write!(f, "WIND_SPEED_Z"),
            SystemValue::WindFromAngle => write!(f, "WIND_FROM_ANGLE"),
            SystemValue::Param => write!(f, "PARAM"),
            SystemValue::InputChannel(ch) => write!(f, "INPUT_CHANNEL_{}", ch),
        }
    }
}

/// The source cannot produce the requested system value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValueUnavailable(pub SystemValue);

impl fmt::Display for ValueUnavailable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "system value {} unavailable", self.0)
    }
}

/// Platform-provided vehicle state.
///
/// `Param` is resolved by the engine from the executing context and is never
/// requested through `system_value`.
pub trait TelemetrySource {
    /// Read one system value.
    fn system_value(&self, value: SystemValue) -> Result<i16, ValueUnavailable>;

    /// Vehicle position, meters East/North of the origin.
    fn position(&self) -> (i32, i32);

    /// Altitude above the origin, meters.
    fn altitude(&self) -> i32;

    /// Ground-track heading, degrees clockwise from North.
    fn heading(&self) -> i16;

    /// True once the vehicle is within the arrival radius of the current
    /// goal (and at goal altitude, when altitude is being tracked).
    fn has_arrived(&self) -> bool;
}

// ============================================================================
// Mock implementation for testing
// ============================================================================

/// Scriptable telemetry for unit tests. Values not explicitly set are
/// unavailable.
#[derive(Debug, Clone)]
pub struct MockTelemetry {
    values: Vec<(SystemValue, i16), 16>,
    position: (i32, i32),
    altitude: i32,
    heading: i16,
    arrived: bool,
}

impl MockTelemetry {
    pub const fn new() -> Self {
        Self {
            values: Vec::new(),
            position: (0, 0),
            altitude: 0,
            heading: 0,
            arrived: false,
        }
    }

    /// Set or overwrite one system value.
    pub fn set_value(&mut self, value: SystemValue, reading: i16) {
        for entry in self.values.iter_mut() {
            if entry.0 == value {
                entry.1 = reading;
                return;
            }
        }
        // Capacity overflow in a test means the test itself is wrong
        let _ = self.values.push((value, reading));
    }

    pub fn set_position(&mut self, x: i32, y: i32) {
        self.position = (x, y);
    }

    pub fn set_altitude(&mut self, altitude: i32) {
        self.altitude = altitude;
    }

    pub fn set_heading(&mut self, heading: i16) {
        self.heading = heading;
    }

    pub fn set_arrived(&mut self, arrived: bool) {
        self.arrived = arrived;
    }
}

impl Default for MockTelemetry {
    fn default() -> Self {
        Self::new()
    }
}

impl TelemetrySource for MockTelemetry {
    fn system_value(&self, value: SystemValue) -> Result<i16, ValueUnavailable> {
        self.values
            .iter()
            .find(|entry| entry.0 == value)
            .map(|entry| entry.1)
            .ok_or(ValueUnavailable(value))
    }

    fn position(&self) -> (i32, i32) {
        self.position
    }

    fn altitude(&self) -> i32 {
        self.altitude
    }

    fn heading(&self) -> i16 {
        self.heading
    }

    fn has_arrived(&self) -> bool {
        self.arrived
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_unset_value_is_unavailable() {
        let telemetry = MockTelemetry::new();
        assert_eq!(
            telemetry.system_value(SystemValue::WindSpeed),
            Err(ValueUnavailable(SystemValue::WindSpeed))
        );
    }

    #[test]
    fn test_mock_set_and_overwrite() {
        let mut telemetry = MockTelemetry::new();
        telemetry.set_value(SystemValue::DistToHome, 150);
        assert_eq!(telemetry.system_value(SystemValue::DistToHome), Ok(150));
        telemetry.set_value(SystemValue::DistToHome, 220);
        assert_eq!(telemetry.system_value(SystemValue::DistToHome), Ok(220));
    }

    #[test]
    fn test_input_channels_are_distinct() {
        let mut telemetry = MockTelemetry::new();
        telemetry.set_value(SystemValue::InputChannel(7), 1500);
        assert_eq!(
            telemetry.system_value(SystemValue::InputChannel(7)),
            Ok(1500)
        );
        assert!(telemetry
            .system_value(SystemValue::InputChannel(8))
            .is_err());
    }

    #[test]
    fn test_unavailable_display() {
        let err = ValueUnavailable(SystemValue::InputChannel(3));
        let mut buf = heapless::String::<64>::new();
        core::fmt::write(&mut buf, format_args!("{}", err)).unwrap();
        assert_eq!(buf.as_str(), "system value INPUT_CHANNEL_3 unavailable");
    }
}
