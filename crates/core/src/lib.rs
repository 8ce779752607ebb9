pub mod metrics;
pub mod peripherals;
pub mod session;

pub use light52_config::StopReason;
pub use session::{Hello, Program, RunReport, Session};

#[derive(Debug, thiserror::Error)]
pub enum SimulationError {
    #[error("Register access violation at offset {0:#x}")]
    MemoryViolation(u64),
    #[error(transparent)]
    Config(#[from] light52_config::ConfigError),
}

pub type SimResult<T> = Result<T, SimulationError>;

/// Trait for observing simulation events in a modular way.
pub trait SimulationObserver: std::fmt::Debug + Send + Sync {
    fn on_simulation_start(&self) {}
    fn on_simulation_stop(&self, _reason: StopReason) {}
    fn on_tx_byte(&self, _byte: u8) {}
}

/// Trait representing a memory-mapped peripheral
pub trait Peripheral: std::fmt::Debug + Send {
    fn read(&self, offset: u64) -> SimResult<u8>;
    fn write(&mut self, offset: u64, value: u8) -> SimResult<()>;
    /// Advance one clock cycle.
    fn tick(&mut self) {}
}
