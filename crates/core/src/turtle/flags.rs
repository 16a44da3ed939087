//! Behavior flags

use bitflags::bitflags;

bitflags! {
    /// Vehicle behavior flags toggled by FLAG_ON / FLAG_OFF / FLAG_TOGGLE.
    ///
    /// The interpreter only stores these and forwards them with every
    /// navigation goal; the flight controller gives them meaning.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct FlightFlags: u8 {
        /// Takeoff throttle/pitch logic active
        const TAKEOFF       = 1 << 0;
        /// Fly inverted
        const INVERTED      = 1 << 1;
        /// Hover in place (VTOL-capable airframes)
        const HOVER         = 1 << 2;
        /// Assert the camera/payload trigger line
        const TRIGGER       = 1 << 3;
        /// Track the goal altitude, not just position
        const ALTITUDE_GOAL = 1 << 4;
        /// Track the straight line between waypoints instead of homing
        /// on the goal point
        const CROSS_TRACK   = 1 << 5;
        /// Landing glide slope active
        const LAND          = 1 << 6;
    }
}
