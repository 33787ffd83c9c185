//! Main-PLL divisor sets and the derived frequencies.
//!
//! The F4 main PLL takes the selected oscillator through an input divider
//! (M), a multiplier (N) and two output dividers: P for the system clock
//! and Q for the 48 MHz domain (USB OTG FS, SDIO). [`PllDivisors`] validates
//! the register ranges at construction so every stored instance is known to
//! encode, and exposes the resulting frequencies for audits and tests.

use thiserror_no_std::Error;

/// P output divider. Only even values up to 8 exist in the PLLCFGR encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PllPDiv {
    /// VCO / 2.
    Div2,
    /// VCO / 4.
    Div4,
    /// VCO / 6.
    Div6,
    /// VCO / 8.
    Div8,
}

impl PllPDiv {
    /// Numeric divisor.
    #[must_use]
    pub const fn divisor(self) -> u32 {
        match self {
            Self::Div2 => 2,
            Self::Div4 => 4,
            Self::Div6 => 6,
            Self::Div8 => 8,
        }
    }
}

/// A divisor fell outside its PLLCFGR field range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PllDivisorError {
    /// M must be 2..=63.
    #[error("PLL input divider M out of range")]
    InputDividerOutOfRange {
        /// Rejected value.
        m: u8,
    },
    /// N must be 50..=432.
    #[error("PLL multiplier N out of range")]
    MultiplierOutOfRange {
        /// Rejected value.
        n: u16,
    },
    /// Q must be 2..=15.
    #[error("PLL 48 MHz-domain divider Q out of range")]
    UsbDividerOutOfRange {
        /// Rejected value.
        q: u8,
    },
}

/// Validated main-PLL divisor set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PllDivisors {
    m: u8,
    n: u16,
    p: PllPDiv,
    q: u8,
}

impl PllDivisors {
    /// Validates a divisor set against the PLLCFGR field ranges.
    ///
    /// # Errors
    ///
    /// Returns [`PllDivisorError`] naming the first out-of-range divisor.
    pub const fn new(m: u8, n: u16, p: PllPDiv, q: u8) -> Result<Self, PllDivisorError> {
        if m < 2 || m > 63 {
            return Err(PllDivisorError::InputDividerOutOfRange { m });
        }
        if n < 50 || n > 432 {
            return Err(PllDivisorError::MultiplierOutOfRange { n });
        }
        if q < 2 || q > 15 {
            return Err(PllDivisorError::UsbDividerOutOfRange { q });
        }
        Ok(Self { m, n, p, q })
    }

    /// Input divider M.
    #[must_use]
    pub const fn m(self) -> u8 {
        self.m
    }

    /// VCO multiplier N.
    #[must_use]
    pub const fn n(self) -> u16 {
        self.n
    }

    /// System-clock divider P.
    #[must_use]
    pub const fn p(self) -> PllPDiv {
        self.p
    }

    /// 48 MHz-domain divider Q.
    #[must_use]
    pub const fn q(self) -> u8 {
        self.q
    }

    /// VCO output frequency for the given oscillator.
    #[must_use]
    #[allow(clippy::arithmetic_side_effects)] // m >= 2 by construction; u64 headroom
    pub const fn vco_hz(self, source_hz: u32) -> u64 {
        source_hz as u64 * self.n as u64 / self.m as u64
    }

    /// System-clock frequency for the given oscillator.
    #[must_use]
    #[allow(clippy::arithmetic_side_effects)] // P divisor is nonzero by type
    #[allow(clippy::cast_possible_truncation)] // sysclk always fits u32 on this part
    pub const fn sysclk_hz(self, source_hz: u32) -> u32 {
        (self.vco_hz(source_hz) / self.p.divisor() as u64) as u32
    }

    /// 48 MHz-domain frequency for the given oscillator.
    #[must_use]
    #[allow(clippy::arithmetic_side_effects)] // q >= 2 by construction
    #[allow(clippy::cast_possible_truncation)] // result always fits u32 on this part
    pub const fn usb_hz(self, source_hz: u32) -> u32 {
        (self.vco_hz(source_hz) / self.q as u64) as u32
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    // ── Validation ──────────────────────────────────────────────────────

    #[test]
    fn register_field_ranges_are_enforced() {
        assert_eq!(
            PllDivisors::new(1, 96, PllPDiv::Div2, 4),
            Err(PllDivisorError::InputDividerOutOfRange { m: 1 })
        );
        assert_eq!(
            PllDivisors::new(64, 96, PllPDiv::Div2, 4),
            Err(PllDivisorError::InputDividerOutOfRange { m: 64 })
        );
        assert_eq!(
            PllDivisors::new(12, 49, PllPDiv::Div2, 4),
            Err(PllDivisorError::MultiplierOutOfRange { n: 49 })
        );
        assert_eq!(
            PllDivisors::new(12, 433, PllPDiv::Div2, 4),
            Err(PllDivisorError::MultiplierOutOfRange { n: 433 })
        );
        assert_eq!(
            PllDivisors::new(12, 96, PllPDiv::Div2, 1),
            Err(PllDivisorError::UsbDividerOutOfRange { q: 1 })
        );
        assert_eq!(
            PllDivisors::new(12, 96, PllPDiv::Div2, 16),
            Err(PllDivisorError::UsbDividerOutOfRange { q: 16 })
        );
    }

    #[test]
    fn boundary_values_are_accepted() {
        assert!(PllDivisors::new(2, 50, PllPDiv::Div8, 2).is_ok());
        assert!(PllDivisors::new(63, 432, PllPDiv::Div2, 15).is_ok());
    }

    // ── Frequency math ──────────────────────────────────────────────────

    #[test]
    fn a_25mhz_crystal_through_m12_n96_p2_gives_100mhz() {
        let divisors = PllDivisors::new(12, 96, PllPDiv::Div2, 4).unwrap();
        assert_eq!(divisors.vco_hz(25_000_000), 200_000_000);
        assert_eq!(divisors.sysclk_hz(25_000_000), 100_000_000);
    }

    #[test]
    fn the_usb_variant_trades_sysclk_for_a_clean_48mhz() {
        let divisors = PllDivisors::new(25, 192, PllPDiv::Div2, 4).unwrap();
        assert_eq!(divisors.sysclk_hz(25_000_000), 96_000_000);
        assert_eq!(divisors.usb_hz(25_000_000), 48_000_000);
    }

    #[test]
    fn the_internal_oscillator_reaches_100mhz_through_n200() {
        let divisors = PllDivisors::new(8, 200, PllPDiv::Div4, 8).unwrap();
        assert_eq!(divisors.vco_hz(16_000_000), 400_000_000);
        assert_eq!(divisors.sysclk_hz(16_000_000), 100_000_000);
        assert_eq!(divisors.usb_hz(16_000_000), 50_000_000);
    }
}
