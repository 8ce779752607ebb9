use core::fmt;

/// Compile-time build flavour of the console.
pub trait Target {
    /// Busy-wait on TXRDY before every byte.
    const POLL_TX_READY: bool;
    const NAME: &'static str;
}

/// Instruction-set simulator build. The ISS doesn't model the ready flags.
#[derive(Debug, Clone, Copy, Default)]
pub struct Simulation;

/// Real hardware build.
#[derive(Debug, Clone, Copy, Default)]
pub struct Hardware;

impl Target for Simulation {
    const POLL_TX_READY: bool = false;
    const NAME: &'static str = "sim";
}

impl Target for Hardware {
    const POLL_TX_READY: bool = true;
    const NAME: &'static str = "hw";
}

/// Runtime mirror of the [`Target`] markers, for host tooling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum BuildTarget {
    #[default]
    #[cfg_attr(feature = "serde", serde(alias = "sim"))]
    Simulation,
    #[cfg_attr(feature = "serde", serde(alias = "hw"))]
    Hardware,
}

impl BuildTarget {
    pub fn name(self) -> &'static str {
        match self {
            BuildTarget::Simulation => Simulation::NAME,
            BuildTarget::Hardware => Hardware::NAME,
        }
    }

    pub fn polls_tx_ready(self) -> bool {
        match self {
            BuildTarget::Simulation => Simulation::POLL_TX_READY,
            BuildTarget::Hardware => Hardware::POLL_TX_READY,
        }
    }
}

impl fmt::Display for BuildTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl core::str::FromStr for BuildTarget {
    type Err = UnknownTarget;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sim" | "simulation" => Ok(BuildTarget::Simulation),
            "hw" | "hardware" => Ok(BuildTarget::Hardware),
            _ => Err(UnknownTarget),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnknownTarget;

impl fmt::Display for UnknownTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("unknown build target (expected 'sim' or 'hw')")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_target_names() {
        assert_eq!("sim".parse(), Ok(BuildTarget::Simulation));
        assert_eq!("hardware".parse(), Ok(BuildTarget::Hardware));
        assert_eq!("fpga".parse::<BuildTarget>(), Err(UnknownTarget));
    }

    #[test]
    fn test_only_hardware_polls() {
        assert!(!BuildTarget::Simulation.polls_tx_ready());
        assert!(BuildTarget::Hardware.polls_tx_ready());
        assert_eq!(BuildTarget::default(), BuildTarget::Simulation);
    }
}
