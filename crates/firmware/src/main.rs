#![no_main]
#![no_std]

use cortex_m_rt::entry;
use light52_hello::{greet, Console, UartPort};
use panic_halt as _;

// Matches the simulator's default `uart.base_address`.
const UART_BASE: usize = 0x4000_C000;
const UART_DATA: *mut u8 = UART_BASE as *mut u8;
const UART_STATUS: *const u8 = (UART_BASE + 0x04) as *const u8;
const TXRDY: u8 = 0b01;

#[cfg(feature = "hw")]
type BuildTarget = light52_hello::Hardware;
#[cfg(not(feature = "hw"))]
type BuildTarget = light52_hello::Simulation;

const BUILD_TAG: &str = match option_env!("LIGHT52_BUILD_DATE") {
    Some(date) => date,
    None => env!("CARGO_PKG_VERSION"),
};

/// The console UART, left in its reset state (19200-8-N-1).
struct Mmio;

impl UartPort for Mmio {
    fn write_data(&mut self, byte: u8) {
        unsafe { core::ptr::write_volatile(UART_DATA, byte) }
    }

    fn tx_ready(&mut self) -> bool {
        unsafe { core::ptr::read_volatile(UART_STATUS) & TXRDY != 0 }
    }
}

#[entry]
fn main() -> ! {
    let mut console = Console::<_, BuildTarget>::new(Mmio);
    greet(&mut console, BUILD_TAG);

    loop {
        // Simulator stops on EOT; on hardware we just park here.
    }
}
