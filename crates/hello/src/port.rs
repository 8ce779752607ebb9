/// Register-level view of a transmit-only UART.
pub trait UartPort {
    /// Store one byte in the data register (SBUF).
    fn write_data(&mut self, byte: u8);

    /// Sample the transmitter-ready flag (TXRDY).
    fn tx_ready(&mut self) -> bool;
}

impl<P: UartPort + ?Sized> UartPort for &mut P {
    fn write_data(&mut self, byte: u8) {
        (**self).write_data(byte)
    }

    fn tx_ready(&mut self) -> bool {
        (**self).tx_ready()
    }
}
