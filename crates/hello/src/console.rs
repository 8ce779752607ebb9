use core::fmt;
use core::marker::PhantomData;

use crate::port::UartPort;
use crate::target::{Simulation, Target};
use crate::EOT;

/// What a `\n` turns into on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum NewlinePolicy {
    /// `\r\n`
    #[default]
    CrLf,
    /// `\n\r`, the order the light52 C library console emitted.
    LfCr,
    /// No expansion.
    Raw,
}

/// Character output over a [`UartPort`].
///
/// On a [`Target`] with `POLL_TX_READY` every byte, including the byte added
/// by newline expansion, waits for TXRDY first.
pub struct Console<P, T = Simulation> {
    port: P,
    newline: NewlinePolicy,
    _target: PhantomData<T>,
}

impl<P: UartPort, T: Target> Console<P, T> {
    pub fn new(port: P) -> Self {
        Self {
            port,
            newline: NewlinePolicy::default(),
            _target: PhantomData,
        }
    }

    pub fn with_newline(mut self, newline: NewlinePolicy) -> Self {
        self.newline = newline;
        self
    }

    pub fn put_byte(&mut self, byte: u8) {
        if byte != b'\n' {
            self.emit(byte);
            return;
        }
        match self.newline {
            NewlinePolicy::CrLf => {
                self.emit(b'\r');
                self.emit(b'\n');
            }
            NewlinePolicy::LfCr => {
                self.emit(b'\n');
                self.emit(b'\r');
            }
            NewlinePolicy::Raw => self.emit(b'\n'),
        }
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.put_byte(b);
        }
    }

    /// Send EOT. Never expanded.
    pub fn end_transmission(&mut self) {
        self.emit(EOT);
    }

    pub fn into_inner(self) -> P {
        self.port
    }

    fn emit(&mut self, byte: u8) {
        if T::POLL_TX_READY {
            while !self.port.tx_ready() {}
        }
        self.port.write_data(byte);
    }
}

impl<P: UartPort, T: Target> fmt::Write for Console<P, T> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.write_bytes(s.as_bytes());
        Ok(())
    }
}
