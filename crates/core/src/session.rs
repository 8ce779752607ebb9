// LabWired - Firmware Simulation Platform
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

//! Runs console programs against the simulated UART.

use crate::peripherals::uart::{self, Uart, UartStatus};
use crate::{Peripheral, SimResult, SimulationObserver, StopReason};
use light52_config::{BoardConfig, BuildTarget};
use light52_hello::{greet, Console, Hardware, Simulation, Target, UartPort, EOT};
use serde::Serialize;
use std::sync::Arc;

/// Something that drives a [`Console`]. Generic over the build target so the
/// same program runs as either flavour.
pub trait Program {
    fn run<P: UartPort, T: Target>(&mut self, console: &mut Console<P, T>);
}

/// The light52 hello demo.
#[derive(Debug, Clone)]
pub struct Hello {
    pub build_tag: String,
}

impl Hello {
    pub fn new(build_tag: impl Into<String>) -> Self {
        Self {
            build_tag: build_tag.into(),
        }
    }
}

impl Program for Hello {
    fn run<P: UartPort, T: Target>(&mut self, console: &mut Console<P, T>) {
        greet(console, &self.build_tag);
    }
}

/// [`UartPort`] backed by the simulated [`Uart`]. Each TXRDY poll costs one
/// clock cycle.
pub struct SimPort<'a> {
    uart: &'a mut Uart,
    observers: &'a [Arc<dyn SimulationObserver>],
    polls: u64,
    max_polls: u64,
    exhausted: bool,
}

impl<'a> SimPort<'a> {
    pub fn new(
        uart: &'a mut Uart,
        observers: &'a [Arc<dyn SimulationObserver>],
        max_polls: u64,
    ) -> Self {
        Self {
            uart,
            observers,
            polls: 0,
            max_polls,
            exhausted: false,
        }
    }

    pub fn polls(&self) -> u64 {
        self.polls
    }

    pub fn exhausted(&self) -> bool {
        self.exhausted
    }
}

impl UartPort for SimPort<'_> {
    fn write_data(&mut self, byte: u8) {
        if let Err(e) = self.uart.write(uart::DATA, byte) {
            tracing::error!("UART data write failed: {}", e);
            return;
        }
        for observer in self.observers {
            observer.on_tx_byte(byte);
        }
    }

    fn tx_ready(&mut self) -> bool {
        if self.polls >= self.max_polls {
            // Report ready so a spinning program still makes progress.
            if !self.exhausted {
                tracing::warn!("TXRDY poll budget of {} exhausted", self.max_polls);
                self.exhausted = true;
            }
            return true;
        }
        self.polls += 1;
        self.uart.tick();
        match self.uart.read(uart::STATUS) {
            Ok(bits) => UartStatus::from_bits_truncate(bits).contains(UartStatus::TX_READY),
            Err(e) => {
                tracing::error!("UART status read failed: {}", e);
                true
            }
        }
    }
}

/// Outcome of one [`Session::run`].
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub target: BuildTarget,
    pub stop_reason: StopReason,
    /// Raw bytes written to the data register, EOT included.
    pub tx: Vec<u8>,
    pub overruns: u64,
    pub polls: u64,
    pub cycles: u64,
}

impl RunReport {
    /// Transmitted bytes with EOT stripped.
    pub fn transcript_bytes(&self) -> Vec<u8> {
        self.tx.iter().copied().filter(|&b| b != EOT).collect()
    }

    /// Console text with EOT stripped.
    pub fn transcript(&self) -> String {
        String::from_utf8_lossy(&self.transcript_bytes()).into_owned()
    }

    pub fn ended_with_eot(&self) -> bool {
        self.tx.last() == Some(&EOT)
    }
}

pub const DEFAULT_MAX_POLLS: u64 = 10_000_000;

pub struct Session {
    pub board: BoardConfig,
    pub target: BuildTarget,
    pub max_polls: u64,
    pub echo: bool,
    pub observers: Vec<Arc<dyn SimulationObserver>>,
}

impl Session {
    pub fn new(board: BoardConfig, target: BuildTarget) -> SimResult<Self> {
        board.validate()?;
        Ok(Self {
            board,
            target,
            max_polls: DEFAULT_MAX_POLLS,
            echo: false,
            observers: Vec::new(),
        })
    }

    pub fn with_max_polls(mut self, max_polls: u64) -> Self {
        self.max_polls = max_polls;
        self
    }

    pub fn with_echo(mut self, echo: bool) -> Self {
        self.echo = echo;
        self
    }

    pub fn add_observer(&mut self, observer: Arc<dyn SimulationObserver>) {
        self.observers.push(observer);
    }

    /// Cycles the UART stays busy per character, zero when untimed.
    pub fn cycles_per_frame(&self) -> u64 {
        if self.board.uart.tx_timing_for(self.target) {
            self.board.uart.framing.cycles_per_frame(self.board.clock_hz)
        } else {
            0
        }
    }

    pub fn run<G: Program>(&self, program: &mut G) -> RunReport {
        let cycles_per_frame = self.cycles_per_frame();
        tracing::debug!(
            "Running on '{}' ({} target, {}, {} cycles/frame)",
            self.board.name,
            self.target,
            self.board.uart.framing,
            cycles_per_frame
        );

        let mut uart = Uart::new()
            .with_tx_timing(cycles_per_frame)
            .with_echo(self.echo);

        for observer in &self.observers {
            observer.on_simulation_start();
        }

        let mut port = SimPort::new(&mut uart, &self.observers, self.max_polls);
        let newline = self.board.uart.newline;
        match self.target {
            BuildTarget::Simulation => {
                let mut console = Console::<_, Simulation>::new(&mut port).with_newline(newline);
                program.run(&mut console);
            }
            BuildTarget::Hardware => {
                let mut console = Console::<_, Hardware>::new(&mut port).with_newline(newline);
                program.run(&mut console);
            }
        }
        let polls = port.polls();
        let exhausted = port.exhausted();

        let stop_reason = if exhausted {
            StopReason::PollBudgetExhausted
        } else if uart.halted() {
            StopReason::EndOfTransmission
        } else {
            StopReason::ProgramReturned
        };

        for observer in &self.observers {
            observer.on_simulation_stop(stop_reason);
        }

        RunReport {
            target: self.target,
            stop_reason,
            overruns: uart.overruns(),
            cycles: uart.cycles(),
            polls,
            tx: uart.into_tx(),
        }
    }

    pub fn run_hello(&self, build_tag: &str) -> RunReport {
        self.run(&mut Hello::new(build_tag))
    }
}
