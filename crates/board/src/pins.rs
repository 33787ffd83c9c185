//! Alternate-function pin sets for the STM32 boards.
//!
//! Memory-controller pins are fixed by the board layout, so each board
//! module carries its set as an audited static. The entries are plain data
//! consumed by whatever GPIO layer the target uses; nothing here touches
//! registers.

/// GPIO port letter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GpioPort {
    /// Port A.
    A,
    /// Port B.
    B,
    /// Port C.
    C,
    /// Port D.
    D,
    /// Port E.
    E,
    /// Port F.
    F,
    /// Port G.
    G,
    /// Port H.
    H,
    /// Port I.
    I,
}

/// One pin in alternate-function mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PinAf {
    /// Port the pin lives on.
    pub port: GpioPort,
    /// Pin number within the port, 0..=15.
    pub pin: u8,
    /// Alternate-function number to select.
    pub alternate_function: u8,
}

impl PinAf {
    /// Describes one alternate-function pin.
    #[must_use]
    pub const fn new(port: GpioPort, pin: u8, alternate_function: u8) -> Self {
        Self {
            port,
            pin,
            alternate_function,
        }
    }
}
