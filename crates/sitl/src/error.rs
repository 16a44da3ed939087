use logoflight_core::{LoadError, RuntimeError};

/// Errors that can occur while running a simulated mission.
#[derive(Debug, thiserror::Error)]
pub enum SimulatorError {
    #[error("flight plan rejected: {0}")]
    PlanRejected(LoadError),

    #[error("engine halted: {0}")]
    EngineHalted(RuntimeError),

    #[error("condition not met within {0} ticks")]
    TickLimitExceeded(u32),
}
