// LabWired - Firmware Simulation Platform
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

pub use light52_hello::{BuildTarget, NewlinePolicy};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid UART framing '{0}': expected <baud>-<bits>-<N|E|O>-<stop>, e.g. 19200-8-N-1")]
    InvalidFraming(String),
    #[error("Baud rate must be greater than zero")]
    ZeroBaud,
    #[error("Unsupported data bit count {0} (expected 5..=9)")]
    DataBits(u8),
    #[error("Unsupported stop bit count {0} (expected 1 or 2)")]
    StopBits(u8),
    #[error("Clock of {clock_hz} Hz is too slow for {baud} baud")]
    ClockTooSlow { clock_hz: u64, baud: u32 },
    #[error("Clock of {0} Hz is above the supported maximum of {max} Hz", max = MAX_CLOCK_HZ)]
    ClockTooFast(u64),
}

/// Highest board clock accepted. Keeps per-frame cycle counts well inside `u64`.
pub const MAX_CLOCK_HZ: u64 = 10_000_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parity {
    None,
    Even,
    Odd,
}

impl Parity {
    fn letter(self) -> char {
        match self {
            Parity::None => 'N',
            Parity::Even => 'E',
            Parity::Odd => 'O',
        }
    }
}

/// Character framing on the wire, written as `19200-8-N-1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UartFraming {
    pub baud: u32,
    pub data_bits: u8,
    pub parity: Parity,
    pub stop_bits: u8,
}

impl Default for UartFraming {
    /// UART reset state on the light52.
    fn default() -> Self {
        Self {
            baud: 19200,
            data_bits: 8,
            parity: Parity::None,
            stop_bits: 1,
        }
    }
}

impl UartFraming {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.baud == 0 {
            return Err(ConfigError::ZeroBaud);
        }
        if !(5..=9).contains(&self.data_bits) {
            return Err(ConfigError::DataBits(self.data_bits));
        }
        if !(1..=2).contains(&self.stop_bits) {
            return Err(ConfigError::StopBits(self.stop_bits));
        }
        Ok(())
    }

    /// Start bit + data + parity + stop.
    pub fn bits_per_frame(&self) -> u32 {
        let parity = if self.parity == Parity::None { 0 } else { 1 };
        1 + self.data_bits as u32 + parity + self.stop_bits as u32
    }

    /// Clock cycles the transmitter stays busy for one character, saturating
    /// at `u64::MAX`.
    pub fn cycles_per_frame(&self, clock_hz: u64) -> u64 {
        let bits = clock_hz as u128 * self.bits_per_frame() as u128;
        let cycles = bits.div_ceil(self.baud.max(1) as u128);
        u64::try_from(cycles).unwrap_or(u64::MAX)
    }
}

impl FromStr for UartFraming {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ConfigError::InvalidFraming(s.to_string());
        let parts: Vec<&str> = s.trim().split('-').collect();
        let [baud, data_bits, parity, stop_bits] = parts.as_slice() else {
            return Err(invalid());
        };

        let parity = match *parity {
            "N" | "n" => Parity::None,
            "E" | "e" => Parity::Even,
            "O" | "o" => Parity::Odd,
            _ => return Err(invalid()),
        };
        let framing = Self {
            baud: baud.parse().map_err(|_| invalid())?,
            data_bits: data_bits.parse().map_err(|_| invalid())?,
            parity,
            stop_bits: stop_bits.parse().map_err(|_| invalid())?,
        };
        framing.validate()?;
        Ok(framing)
    }
}

impl fmt::Display for UartFraming {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}-{}-{}",
            self.baud,
            self.data_bits,
            self.parity.letter(),
            self.stop_bits
        )
    }
}

impl TryFrom<String> for UartFraming {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<UartFraming> for String {
    fn from(value: UartFraming) -> Self {
        value.to_string()
    }
}

fn default_uart_base() -> u64 {
    0x4000_C000
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct UartConfig {
    #[serde(default = "default_uart_base")]
    pub base_address: u64,
    #[serde(default)]
    pub framing: UartFraming,
    #[serde(default)]
    pub newline: NewlinePolicy,
    /// Model transmitter busy time. Unset follows the build target: the
    /// simulator build never looks at TXRDY, so only hardware gets timing.
    #[serde(default)]
    pub model_tx_timing: Option<bool>,
}

impl Default for UartConfig {
    fn default() -> Self {
        Self {
            base_address: default_uart_base(),
            framing: UartFraming::default(),
            newline: NewlinePolicy::default(),
            model_tx_timing: None,
        }
    }
}

impl UartConfig {
    pub fn tx_timing_for(&self, target: BuildTarget) -> bool {
        self.model_tx_timing
            .unwrap_or(target == BuildTarget::Hardware)
    }
}

fn default_board_name() -> String {
    "light52".to_string()
}

fn default_clock_hz() -> u64 {
    50_000_000
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct BoardConfig {
    #[serde(default = "default_board_name")]
    pub name: String,
    #[serde(default = "default_clock_hz")]
    pub clock_hz: u64,
    #[serde(default)]
    pub uart: UartConfig,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            name: default_board_name(),
            clock_hz: default_clock_hz(),
            uart: UartConfig::default(),
        }
    }
}

impl BoardConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let f = std::fs::File::open(&path)
            .with_context(|| format!("Failed to open board config at {:?}", path.as_ref()))?;
        let board: Self =
            serde_yaml::from_reader(f).context("Failed to parse Board Config")?;
        board.validate()?;
        Ok(board)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.uart.framing.validate()?;
        if self.clock_hz > MAX_CLOCK_HZ {
            return Err(ConfigError::ClockTooFast(self.clock_hz));
        }
        if self.clock_hz < self.uart.framing.baud as u64 {
            return Err(ConfigError::ClockTooSlow {
                clock_hz: self.clock_hz,
                baud: self.uart.framing.baud,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(deny_unknown_fields)]
pub struct TestInputs {
    #[serde(default)]
    pub target: BuildTarget,
    /// Board config, relative to the script.
    #[serde(default)]
    pub board: Option<String>,
    #[serde(default)]
    pub build_tag: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct TestLimits {
    pub max_polls: u64,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    EndOfTransmission,
    ProgramReturned,
    PollBudgetExhausted,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StopReason::EndOfTransmission => "end_of_transmission",
            StopReason::ProgramReturned => "program_returned",
            StopReason::PollBudgetExhausted => "poll_budget_exhausted",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct UartContainsAssertion {
    pub uart_contains: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct StopReasonAssertion {
    pub expected_stop_reason: StopReason,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct MaxOverrunsAssertion {
    pub max_overruns: u64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(untagged)]
pub enum TestAssertion {
    UartContains(UartContainsAssertion),
    ExpectedStopReason(StopReasonAssertion),
    MaxOverruns(MaxOverrunsAssertion),
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct TestScript {
    pub schema_version: String,
    #[serde(default)]
    pub inputs: TestInputs,
    pub limits: TestLimits,
    #[serde(default)]
    pub assertions: Vec<TestAssertion>,
}

impl TestScript {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let f = std::fs::File::open(&path)
            .with_context(|| format!("Failed to open test script at {:?}", path.as_ref()))?;
        let script: Self =
            serde_yaml::from_reader(f).context("Failed to parse Test Script YAML")?;
        script.validate()?;
        Ok(script)
    }

    pub fn validate(&self) -> Result<()> {
        if self.schema_version != "1.0" {
            anyhow::bail!(
                "Unsupported schema_version '{}'. Supported versions: '1.0'",
                self.schema_version
            );
        }

        if self.limits.max_polls == 0 {
            anyhow::bail!("Limit 'max_polls' must be greater than zero");
        }

        if let Some(board) = &self.inputs.board {
            if board.trim().is_empty() {
                anyhow::bail!("Input 'board' path cannot be empty");
            }
        }

        Ok(())
    }
}
