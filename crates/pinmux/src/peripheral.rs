//! Peripheral signals the routing tables can target.

/// FlexPWM output channel within a submodule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PwmChannel {
    /// PWMA output.
    A,
    /// PWMB output.
    B,
}

/// One FlexPWM output, identified by module, submodule and channel.
///
/// The RT1020 has FlexPWM1 and FlexPWM2, four submodules each. PWMX outputs
/// exist in silicon but are not routed by any table here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PwmOutput {
    /// FlexPWM module, 1 or 2.
    pub module: u8,
    /// Submodule within the module, 0..=3.
    pub submodule: u8,
    /// Output channel of the submodule.
    pub channel: PwmChannel,
}

impl PwmOutput {
    /// Shorthand used by the routing tables.
    #[must_use]
    pub const fn new(module: u8, submodule: u8, channel: PwmChannel) -> Self {
        Self {
            module,
            submodule,
            channel,
        }
    }
}

/// Peripheral signal a routing table entry assigns to a pad.
///
/// Instances are numbered as in the reference manual (1-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Peripheral {
    /// ADC1, the given input channel.
    Adc1(u8),
    /// LPI2C instance.
    Lpi2c(u8),
    /// LPUART instance.
    Lpuart(u8),
    /// LPSPI instance.
    Lpspi(u8),
    /// FlexPWM output.
    FlexPwm(PwmOutput),
    /// 32.768 kHz oscillator output feeding the RTC. Internal, no pad.
    Osc32k,
}
