//! Pads referenced by the routing tables.

/// A physical pad on the RT1020 package.
///
/// Only pads that appear in at least one routing table are listed; GPIO_EMC
/// pads (dedicated to the SEMC external-memory bus on this product) are not
/// routed through these tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Pad {
    /// GPIO_AD_B0_06.
    GpioAdB0_06,
    /// GPIO_AD_B0_07.
    GpioAdB0_07,
    /// GPIO_AD_B0_10.
    GpioAdB0_10,
    /// GPIO_AD_B0_11.
    GpioAdB0_11,
    /// GPIO_AD_B0_12.
    GpioAdB0_12,
    /// GPIO_AD_B0_13.
    GpioAdB0_13,
    /// GPIO_AD_B0_14.
    GpioAdB0_14,
    /// GPIO_AD_B0_15.
    GpioAdB0_15,
    /// GPIO_AD_B1_06.
    GpioAdB1_06,
    /// GPIO_AD_B1_07.
    GpioAdB1_07,
    /// GPIO_AD_B1_08.
    GpioAdB1_08,
    /// GPIO_AD_B1_09.
    GpioAdB1_09,
    /// GPIO_AD_B1_10.
    GpioAdB1_10,
    /// GPIO_AD_B1_11.
    GpioAdB1_11,
    /// GPIO_AD_B1_12.
    GpioAdB1_12,
    /// GPIO_AD_B1_13.
    GpioAdB1_13,
    /// GPIO_AD_B1_14.
    GpioAdB1_14,
    /// GPIO_AD_B1_15.
    GpioAdB1_15,
    /// GPIO_SD_B1_02.
    GpioSdB1_02,
    /// GPIO_SD_B1_03.
    GpioSdB1_03,
}

impl Pad {
    /// Reference-manual pad name, for log output on hosts without defmt.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::GpioAdB0_06 => "GPIO_AD_B0_06",
            Self::GpioAdB0_07 => "GPIO_AD_B0_07",
            Self::GpioAdB0_10 => "GPIO_AD_B0_10",
            Self::GpioAdB0_11 => "GPIO_AD_B0_11",
            Self::GpioAdB0_12 => "GPIO_AD_B0_12",
            Self::GpioAdB0_13 => "GPIO_AD_B0_13",
            Self::GpioAdB0_14 => "GPIO_AD_B0_14",
            Self::GpioAdB0_15 => "GPIO_AD_B0_15",
            Self::GpioAdB1_06 => "GPIO_AD_B1_06",
            Self::GpioAdB1_07 => "GPIO_AD_B1_07",
            Self::GpioAdB1_08 => "GPIO_AD_B1_08",
            Self::GpioAdB1_09 => "GPIO_AD_B1_09",
            Self::GpioAdB1_10 => "GPIO_AD_B1_10",
            Self::GpioAdB1_11 => "GPIO_AD_B1_11",
            Self::GpioAdB1_12 => "GPIO_AD_B1_12",
            Self::GpioAdB1_13 => "GPIO_AD_B1_13",
            Self::GpioAdB1_14 => "GPIO_AD_B1_14",
            Self::GpioAdB1_15 => "GPIO_AD_B1_15",
            Self::GpioSdB1_02 => "GPIO_SD_B1_02",
            Self::GpioSdB1_03 => "GPIO_SD_B1_03",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_follow_the_reference_manual() {
        assert_eq!(Pad::GpioAdB0_06.name(), "GPIO_AD_B0_06");
        assert_eq!(Pad::GpioSdB1_03.name(), "GPIO_SD_B1_03");
    }
}
