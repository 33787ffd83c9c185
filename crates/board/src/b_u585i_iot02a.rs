//! B-U585I-IOT02A: 8 MB octal PSRAM on OCTOSPI1.
//!
//! The board wires an AP Memory APS6408 to OCTOSPI port 1, memory-mapped
//! at `0x9000_0000`. Bring-up orders three steps: the data cache first
//! (wrap-burst reads must be on before any OSPI traffic so a cache line
//! fill never issues a burst the device cannot serve), then controller
//! and device configuration, then delay-block calibration and the switch
//! to memory-mapped mode.

use extmem::ospi_ram::{self, OspiController, OspiRamConfig, OspiRamError, OspiRamState};

use crate::error::BoardInitError;
use crate::pins::{GpioPort, PinAf};

/// Start of the memory-mapped window.
pub const OSPI_RAM_BASE: u32 = 0x9000_0000;

/// Data-cache control the target provides.
///
/// Only the one knob bring-up needs: cache-line fills as wrap bursts.
pub trait DataCache {
    /// Failure type for cache control.
    type Error;

    /// Switches cache-line fills to wrap-burst reads.
    fn enable_wrap_reads(&mut self) -> Result<(), Self::Error>;
}

/// OCTOSPI1 pin set, by schematic. DQS and the two high data lines route
/// through alternate function 3; everything else runs alternate
/// function 10.
pub static OSPI_PINS: &[PinAf] = &[
    PinAf::new(GpioPort::B, 10, 10), // CLK
    PinAf::new(GpioPort::B, 11, 10), // NCS
    PinAf::new(GpioPort::E, 3, 3),   // DQS
    PinAf::new(GpioPort::F, 8, 10),  // IO0
    PinAf::new(GpioPort::F, 9, 10),  // IO1
    PinAf::new(GpioPort::F, 7, 10),  // IO2
    PinAf::new(GpioPort::F, 6, 10),  // IO3
    PinAf::new(GpioPort::H, 2, 3),   // IO4
    PinAf::new(GpioPort::I, 0, 3),   // IO5
    PinAf::new(GpioPort::C, 3, 10),  // IO6
    PinAf::new(GpioPort::D, 7, 10),  // IO7
];

/// The board's octal-SPI descriptor: the APS6408 preset mapped at
/// [`OSPI_RAM_BASE`].
#[must_use]
pub fn ospi_config() -> OspiRamConfig {
    OspiRamConfig::aps6408(OSPI_RAM_BASE)
}

fn map_ospi<E>(error: OspiRamError<E>) -> BoardInitError {
    match error {
        OspiRamError::Controller(_) => BoardInitError::OspiController,
        OspiRamError::DelayBlockMismatch => BoardInitError::OspiCalibration,
    }
}

/// Runs the full bring-up: cache, controller, device registers, delay
/// calibration, memory-mapped switch.
///
/// # Errors
///
/// Descriptor rejections keep their typed payload; cache, controller and
/// calibration failures report the stage that failed. On error the RAM is
/// not memory-mapped.
pub fn bring_up<D: DataCache, C: OspiController>(
    dcache: &mut D,
    controller: &mut C,
    config: &OspiRamConfig,
) -> Result<OspiRamState, BoardInitError> {
    dcache
        .enable_wrap_reads()
        .map_err(|_| BoardInitError::DataCache)?;
    let config = config.validated()?;
    let mut state = ospi_ram::initialize(controller, &config).map_err(map_ospi)?;
    ospi_ram::enable_memory_mapped(controller, &mut state).map_err(map_ospi)?;
    Ok(state)
}
