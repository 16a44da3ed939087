//! Interpreter configuration

/// Tunables for the flight-plan interpreter.
///
/// Defaults match the original fixed-wing deployment; a SITL harness or
/// firmware image overrides fields as needed.
#[derive(Debug, Clone, Copy)]
pub struct LogoConfig {
    /// Arrival radius around a goal position in meters
    pub waypoint_radius: i32,
    /// Altitude assigned to the plane turtle when a program starts, meters
    pub initial_altitude: i32,
    /// Target speed assigned when a program starts, m/s
    pub default_speed: i16,
    /// Maximum main-context instructions retired per tick before yielding
    pub step_budget: usize,
    /// Maximum interrupt-handler instructions per tick before the handler
    /// is treated as runaway
    pub interrupt_budget: usize,
}

impl Default for LogoConfig {
    fn default() -> Self {
        Self {
            waypoint_radius: 25,
            initial_altitude: 100,
            default_speed: 10,
            step_budget: 128,
            interrupt_budget: 64,
        }
    }
}
