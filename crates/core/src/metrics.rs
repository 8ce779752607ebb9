use crate::{SimulationObserver, StopReason};
use std::sync::atomic::{AtomicU64, Ordering};

/// Counts console traffic.
#[derive(Debug)]
pub struct TxMetrics {
    byte_count: AtomicU64,
    line_count: AtomicU64,
}

impl Default for TxMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl TxMetrics {
    pub fn new() -> Self {
        Self {
            byte_count: AtomicU64::new(0),
            line_count: AtomicU64::new(0),
        }
    }

    pub fn reset(&self) {
        self.byte_count.store(0, Ordering::SeqCst);
        self.line_count.store(0, Ordering::SeqCst);
    }

    pub fn get_bytes(&self) -> u64 {
        self.byte_count.load(Ordering::SeqCst)
    }

    pub fn get_lines(&self) -> u64 {
        self.line_count.load(Ordering::SeqCst)
    }
}

impl SimulationObserver for TxMetrics {
    fn on_simulation_start(&self) {
        self.reset();
    }

    fn on_simulation_stop(&self, reason: StopReason) {
        tracing::debug!(
            "Stopped ({}): {} bytes, {} lines",
            reason,
            self.get_bytes(),
            self.get_lines()
        );
    }

    fn on_tx_byte(&self, byte: u8) {
        self.byte_count.fetch_add(1, Ordering::SeqCst);
        if byte == b'\n' {
            self.line_count.fetch_add(1, Ordering::SeqCst);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_bytes_and_lines() {
        let metrics = TxMetrics::new();
        metrics.on_simulation_start();
        for &b in b"a\r\nb\r\n" {
            metrics.on_tx_byte(b);
        }
        assert_eq!(metrics.get_bytes(), 6);
        assert_eq!(metrics.get_lines(), 2);

        metrics.on_simulation_start();
        assert_eq!(metrics.get_bytes(), 0);
    }
}
