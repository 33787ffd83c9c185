//! Fatal bring-up failures.
//!
//! Board init either completes or the board is unusable, so every failure
//! funnels into one enum the boot path can report once and halt on.
//! Descriptor rejections keep their typed payloads; controller failures
//! collapse to the stage that failed, which is what the fatal log needs.

use clocks::CascadeExhausted;
use extmem::mpu::MpuError;
use extmem::ospi_ram::OspiConfigError;
use extmem::psram::PsramConfigError;
use extmem::sdram::SdramConfigError;
use pinmux::PinmuxError;
use thiserror_no_std::Error;

/// Why board init could not complete.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoardInitError {
    /// Every candidate clock source failed.
    #[error("all clock sources failed")]
    ClockCascade(#[from] CascadeExhausted),
    /// The SDRAM descriptor failed validation.
    #[error("SDRAM descriptor rejected")]
    SdramConfig(#[from] SdramConfigError),
    /// The PSRAM descriptor failed validation.
    #[error("PSRAM descriptor rejected")]
    PsramConfig(#[from] PsramConfigError),
    /// The octal-SPI descriptor failed validation.
    #[error("octal-SPI descriptor rejected")]
    OspiConfig(#[from] OspiConfigError),
    /// An MPU region could not be encoded.
    #[error("MPU region rejected")]
    Mpu(#[from] MpuError),
    /// A pin has no routing entry for the requested signal.
    #[error("pin routing entry missing")]
    PinPlan(#[from] PinmuxError),
    /// The SDRAM controller rejected configuration or a command.
    #[error("SDRAM controller failed during bring-up")]
    SdramController,
    /// The NOR/SRAM controller rejected configuration.
    #[error("PSRAM controller failed during bring-up")]
    PsramController,
    /// The data cache could not be enabled.
    #[error("data-cache enable failed")]
    DataCache,
    /// The octal-SPI controller rejected an operation.
    #[error("octal-SPI controller failed during bring-up")]
    OspiController,
    /// The DQS delay block did not hold its calibrated value.
    #[error("octal-SPI delay-block calibration failed")]
    OspiCalibration,
    /// Flash controller setup did not complete.
    #[error("flash controller setup failed")]
    FlashSetup,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descriptor_errors_convert_with_their_payload() {
        let err: BoardInitError = MpuError::RegionNumberOutOfRange { number: 9 }.into();
        assert_eq!(
            err,
            BoardInitError::Mpu(MpuError::RegionNumberOutOfRange { number: 9 })
        );
    }
}
