// LabWired - Firmware Simulation Platform
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use crate::{Peripheral, SimResult, SimulationError};
use light52_hello::EOT;
use std::io::{self, Write};

/// Data register (SBUF). Writes transmit.
pub const DATA: u64 = 0x00;
/// Status register.
pub const STATUS: u64 = 0x04;
/// Size of the register window.
pub const WINDOW: u64 = 0x08;

bitflags::bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct UartStatus: u8 {
        const TX_READY = 0b01;
    }
}

/// Transmit-only UART model.
///
/// Every byte written to the data register is captured. With a non-zero
/// `cycles_per_frame` the transmitter stays busy for that many ticks after a
/// write; writing while busy is an overrun. Writing EOT halts the device.
#[derive(Debug, Default)]
pub struct Uart {
    cycles_per_frame: u64,
    busy_for: u64,
    tx: Vec<u8>,
    overruns: u64,
    cycles: u64,
    halted: bool,
    echo: bool,
}

impl Uart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Model transmitter busy time. Zero means always ready.
    pub fn with_tx_timing(mut self, cycles_per_frame: u64) -> Self {
        self.cycles_per_frame = cycles_per_frame;
        self
    }

    /// Mirror transmitted bytes to stdout.
    pub fn with_echo(mut self, echo: bool) -> Self {
        self.echo = echo;
        self
    }

    pub fn status(&self) -> UartStatus {
        if self.busy_for == 0 {
            UartStatus::TX_READY
        } else {
            UartStatus::empty()
        }
    }

    /// Raw transmitted bytes, EOT included.
    pub fn tx(&self) -> &[u8] {
        &self.tx
    }

    pub fn overruns(&self) -> u64 {
        self.overruns
    }

    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    pub fn halted(&self) -> bool {
        self.halted
    }

    pub fn into_tx(self) -> Vec<u8> {
        self.tx
    }

    fn transmit(&mut self, value: u8) {
        if self.busy_for > 0 {
            self.overruns += 1;
            tracing::warn!(
                "UART overrun: {:#04x} written with {} cycles of the previous frame left",
                value,
                self.busy_for
            );
        }
        if self.halted {
            tracing::debug!("UART write after EOT: {:#04x}", value);
        }
        self.tx.push(value);
        self.busy_for = self.cycles_per_frame;

        if value == EOT {
            if !self.halted {
                tracing::info!("EOT received after {} bytes, stopping", self.tx.len() - 1);
            }
            self.halted = true;
            return;
        }

        if self.echo {
            let mut out = io::stdout().lock();
            let _ = out.write_all(&[value]);
            let _ = out.flush();
        }
    }
}

impl Peripheral for Uart {
    fn read(&self, offset: u64) -> SimResult<u8> {
        match offset {
            STATUS => Ok(self.status().bits()),
            // No receiver.
            o if o < WINDOW => Ok(0),
            o => Err(SimulationError::MemoryViolation(o)),
        }
    }

    fn write(&mut self, offset: u64, value: u8) -> SimResult<()> {
        match offset {
            DATA => {
                self.transmit(value);
                Ok(())
            }
            o if o < WINDOW => Ok(()),
            o => Err(SimulationError::MemoryViolation(o)),
        }
    }

    fn tick(&mut self) {
        self.cycles += 1;
        self.busy_for = self.busy_for.saturating_sub(1);
    }
}
