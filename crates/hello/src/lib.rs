//! Hello World demo for the light52 core.
//!
//! Sends a greeting to the console UART, then writes EOT so a simulator knows
//! the run is over. The UART is expected in its reset state (19200-8-N-1).

#![cfg_attr(not(test), no_std)]

pub mod console;
pub mod port;
pub mod program;
pub mod target;

pub use console::{Console, NewlinePolicy};
pub use port::UartPort;
pub use program::greet;
pub use target::{BuildTarget, Hardware, Simulation, Target};

/// End-of-transmission. Writing it to the UART ends a simulation run.
pub const EOT: u8 = 0x04;
