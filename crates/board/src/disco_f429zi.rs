//! 32F429IDISCOVERY: 8 MB SDRAM on FMC bank 2.
//!
//! The board wires an ISSI IS42S16400J (64 Mbit, 16-bit) to SDRAM bank 2,
//! mapped at `0xD000_0000`. Bring-up programs the bank, walks the JEDEC
//! startup sequence, and then the target applies one MPU region marking
//! the array write-back cacheable but never executable.
//!
//! The SDRAM clock is HCLK/2; the timing preset assumes the usual 180 MHz
//! core configuration, giving 90 MHz at the device.

use extmem::mpu::{AccessPermission, MpuError, MpuRegion, RegionAttributes};
use extmem::sdram::{self, mode_register, refresh_timer_count, SdramBank, SdramConfig,
    SdramController, SdramGeometry, SdramTiming};

use crate::error::BoardInitError;
use crate::pins::{GpioPort, PinAf};

/// Start of the bank 2 mapping.
pub const SDRAM_BASE: u32 = 0xD000_0000;
/// Usable array size: 64 Mbit.
pub const SDRAM_SIZE: u32 = 0x0080_0000;
/// SDRAM clock after the HCLK/2 divider.
pub const SDCLK_HZ: u32 = 90_000_000;

/// All FMC pins run alternate function 12.
const FMC_AF: u8 = 12;

const fn fmc(port: GpioPort, pin: u8) -> PinAf {
    PinAf::new(port, pin, FMC_AF)
}

/// FMC pin set for the bank 2 SDRAM, by schematic.
pub static FMC_PINS: &[PinAf] = &[
    fmc(GpioPort::B, 5),  // SDCKE1
    fmc(GpioPort::B, 6),  // SDNE1
    fmc(GpioPort::C, 0),  // SDNWE
    fmc(GpioPort::D, 0),  // D2
    fmc(GpioPort::D, 1),  // D3
    fmc(GpioPort::D, 8),  // D13
    fmc(GpioPort::D, 9),  // D14
    fmc(GpioPort::D, 10), // D15
    fmc(GpioPort::D, 14), // D0
    fmc(GpioPort::D, 15), // D1
    fmc(GpioPort::E, 0),  // NBL0
    fmc(GpioPort::E, 1),  // NBL1
    fmc(GpioPort::E, 7),  // D4
    fmc(GpioPort::E, 8),  // D5
    fmc(GpioPort::E, 9),  // D6
    fmc(GpioPort::E, 10), // D7
    fmc(GpioPort::E, 11), // D8
    fmc(GpioPort::E, 12), // D9
    fmc(GpioPort::E, 13), // D10
    fmc(GpioPort::E, 14), // D11
    fmc(GpioPort::E, 15), // D12
    fmc(GpioPort::F, 0),  // A0
    fmc(GpioPort::F, 1),  // A1
    fmc(GpioPort::F, 2),  // A2
    fmc(GpioPort::F, 3),  // A3
    fmc(GpioPort::F, 4),  // A4
    fmc(GpioPort::F, 5),  // A5
    fmc(GpioPort::F, 11), // SDNRAS
    fmc(GpioPort::F, 12), // A6
    fmc(GpioPort::F, 13), // A7
    fmc(GpioPort::F, 14), // A8
    fmc(GpioPort::F, 15), // A9
    fmc(GpioPort::G, 0),  // A10
    fmc(GpioPort::G, 1),  // A11
    fmc(GpioPort::G, 4),  // BA0
    fmc(GpioPort::G, 5),  // BA1
    fmc(GpioPort::G, 8),  // SDCLK
    fmc(GpioPort::G, 15), // SDNCAS
];

/// The board's SDRAM descriptor: IS42S16400J presets on bank 2 with the
/// JEDEC mode word and the 64 ms refresh budget spread over 4096 rows.
#[must_use]
pub fn sdram_config() -> SdramConfig {
    SdramConfig {
        bank: SdramBank::Bank2,
        geometry: SdramGeometry::is42s16400j(),
        timing: SdramTiming::is42s16400j_at_90mhz(),
        mode: mode_register::BURST_LENGTH_1
            | mode_register::BURST_TYPE_SEQUENTIAL
            | mode_register::CAS_LATENCY_3
            | mode_register::OPERATING_MODE_STANDARD
            | mode_register::WRITEBURST_MODE_SINGLE,
        refresh_count: refresh_timer_count(SDCLK_HZ, 64, 4096),
        base_address: SDRAM_BASE,
        size_bytes: SDRAM_SIZE,
    }
}

/// MPU region covering the array: write-back cacheable so the CPU gets
/// burst accesses, execute-never because nothing runs from SDRAM here.
///
/// # Errors
///
/// Never fails for the shipped constants; the validation is the audit.
pub fn mpu_regions() -> Result<[MpuRegion; 1], MpuError> {
    Ok([MpuRegion::new(
        2,
        SDRAM_BASE,
        u64::from(SDRAM_SIZE),
        RegionAttributes {
            access: AccessPermission::FullAccess,
            execute_never: true,
            bufferable: true,
            cacheable: true,
            shareable: false,
            type_extension: 0,
            subregion_disable: 0,
        },
    )?])
}

/// Validates the descriptor and drives the controller through
/// configuration and the startup sequence.
///
/// # Errors
///
/// Descriptor rejections keep their typed payload; any controller
/// failure reports as [`BoardInitError::SdramController`].
pub fn bring_up<C: SdramController>(
    controller: &mut C,
    config: &SdramConfig,
) -> Result<(), BoardInitError> {
    let config = config.validated()?;
    sdram::initialize(controller, &config).map_err(|_| BoardInitError::SdramController)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]
mod tests {
    use extmem::sdram::{SdramCommand, SdramConfigError};

    use super::*;

    // ── Descriptor audit ──

    #[test]
    fn mode_word_matches_the_reference_value() {
        assert_eq!(sdram_config().mode, 0x0230);
    }

    #[test]
    fn refresh_count_matches_the_reference_value() {
        // 64 ms / 4096 rows × 90 MHz − 20 = 1386.
        assert_eq!(sdram_config().refresh_count, 1386);
    }

    #[test]
    fn descriptor_validates_as_shipped() {
        assert!(sdram_config().validated().is_ok());
    }

    #[test]
    fn mpu_region_encodes_the_reference_words() {
        let [region] = mpu_regions().unwrap();
        assert_eq!(region.register_pair(), (0xD000_0012, 0x1303_002D));
    }

    // ── Pin set ──

    #[test]
    fn fmc_pins_are_unique_and_all_af12() {
        assert_eq!(FMC_PINS.len(), 38);
        for pin in FMC_PINS {
            assert_eq!(pin.alternate_function, 12);
        }
        for (index, pin) in FMC_PINS.iter().enumerate() {
            for other in FMC_PINS.iter().skip(index + 1) {
                assert!(
                    (pin.port, pin.pin) != (other.port, other.pin),
                    "duplicate FMC pin"
                );
            }
        }
    }

    // ── Bring-up ──

    /// Controller that records whether it was reached.
    #[derive(Default)]
    struct MockController {
        calls: usize,
    }

    impl SdramController for MockController {
        type Error = ();

        fn configure(&mut self, _config: &SdramConfig) -> Result<(), Self::Error> {
            self.calls += 1;
            Ok(())
        }

        fn send_command(&mut self, _command: SdramCommand) -> Result<(), Self::Error> {
            self.calls += 1;
            Ok(())
        }

        fn set_refresh_count(&mut self, _count: u16) -> Result<(), Self::Error> {
            self.calls += 1;
            Ok(())
        }

        fn delay_us(&mut self, _microseconds: u32) {}
    }

    #[test]
    fn a_bad_descriptor_never_reaches_the_controller() {
        let mut controller = MockController::default();
        let mut config = sdram_config();
        // CAS 2 in the mode word while the controller still samples at CAS 3.
        config.mode = (config.mode & !mode_register::CAS_LATENCY_MASK)
            | mode_register::CAS_LATENCY_2;

        let err = bring_up(&mut controller, &config).unwrap_err();
        assert_eq!(
            err,
            BoardInitError::SdramConfig(SdramConfigError::CasLatencyMismatch)
        );
        assert_eq!(controller.calls, 0);
    }
}
