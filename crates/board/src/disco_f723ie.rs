//! 32F723EDISCOVERY: 512 KB PSRAM on FMC NOR/SRAM bank 1.
//!
//! The board wires an ISSI IS66WV51216 (256K x 16) to bank 1 at
//! `0x6000_0000` as plain asynchronous SRAM. One control-register write
//! brings the bank up; the interesting part is the MPU map, which first
//! denies the whole address space and then re-opens the PSRAM window as
//! write-back memory and the FMC register block as device memory.

use extmem::mpu::{AccessPermission, MpuError, MpuRegion, RegionAttributes};
use extmem::psram::{self, NorSramControl, NorSramTiming, PsramConfig, SramController};

use crate::error::BoardInitError;
use crate::pins::{GpioPort, PinAf};

/// Start of the bank 1 mapping.
pub const PSRAM_BASE: u32 = 0x6000_0000;
/// Usable array size: 256K words of 16 bits.
pub const PSRAM_SIZE: u32 = 0x0008_0000;

/// All FMC pins run alternate function 12.
const FMC_AF: u8 = 12;

const fn fmc(port: GpioPort, pin: u8) -> PinAf {
    PinAf::new(port, pin, FMC_AF)
}

/// FMC pin set for the bank 1 PSRAM, by schematic.
pub static FMC_PINS: &[PinAf] = &[
    fmc(GpioPort::D, 0),  // D2
    fmc(GpioPort::D, 1),  // D3
    fmc(GpioPort::D, 4),  // NOE
    fmc(GpioPort::D, 5),  // NWE
    fmc(GpioPort::D, 7),  // NE1
    fmc(GpioPort::D, 8),  // D13
    fmc(GpioPort::D, 9),  // D14
    fmc(GpioPort::D, 10), // D15
    fmc(GpioPort::D, 11), // A16
    fmc(GpioPort::D, 12), // A17
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
    fmc(GpioPort::F, 12), // A6
    fmc(GpioPort::F, 13), // A7
    fmc(GpioPort::F, 14), // A8
    fmc(GpioPort::F, 15), // A9
    fmc(GpioPort::G, 0),  // A10
    fmc(GpioPort::G, 1),  // A11
    fmc(GpioPort::G, 2),  // A12
    fmc(GpioPort::G, 3),  // A13
    fmc(GpioPort::G, 4),  // A14
    fmc(GpioPort::G, 5),  // A15
];

/// The board's PSRAM descriptor: IS66WV51216 control flags and the 216 MHz
/// HCLK timing. The same timing serves reads and writes, so extended mode
/// stays off and `write_timing` stays empty.
#[must_use]
pub fn psram_config() -> PsramConfig {
    PsramConfig {
        control: NorSramControl::is66wv51216(),
        read_timing: NorSramTiming::is66wv51216_at_216mhz(),
        write_timing: None,
        base_address: PSRAM_BASE,
        size_bytes: PSRAM_SIZE,
    }
}

/// The board's MPU map, in programming order.
///
/// Region 0 denies the whole address space so stray pointers fault instead
/// of hitting a bus. Regions 1 and 2 punch holes back out: the PSRAM
/// window as write-back memory (the 512 KB part sits inside a 1 MB
/// power-of-two region), and the FMC register block as bufferable
/// non-cacheable device memory. Overlap with the background region is the
/// point; higher numbers win.
///
/// # Errors
///
/// Never fails for the shipped constants; the validation is the audit.
pub fn mpu_regions() -> Result<[MpuRegion; 3], MpuError> {
    Ok([
        MpuRegion::new(
            0,
            0x0000_0000,
            0x1_0000_0000,
            RegionAttributes {
                access: AccessPermission::NoAccess,
                execute_never: true,
                bufferable: false,
                cacheable: false,
                shareable: true,
                type_extension: 0,
                // Keep the eighths holding code and SRAM on the reset map.
                subregion_disable: 0x87,
            },
        )?,
        MpuRegion::new(
            1,
            PSRAM_BASE,
            0x0010_0000,
            RegionAttributes {
                access: AccessPermission::FullAccess,
                execute_never: false,
                bufferable: true,
                cacheable: true,
                shareable: true,
                type_extension: 0,
                subregion_disable: 0,
            },
        )?,
        MpuRegion::new(
            2,
            0xA000_0000,
            0x2000,
            RegionAttributes {
                access: AccessPermission::FullAccess,
                execute_never: true,
                bufferable: true,
                cacheable: false,
                shareable: true,
                type_extension: 0,
                subregion_disable: 0,
            },
        )?,
    ])
}

/// Validates the descriptor and programs the bank.
///
/// # Errors
///
/// Descriptor rejections keep their typed payload; any controller
/// failure reports as [`BoardInitError::PsramController`].
pub fn bring_up<C: SramController>(
    controller: &mut C,
    config: &PsramConfig,
) -> Result<(), BoardInitError> {
    let config = config.validated()?;
    psram::initialize(controller, &config).map_err(|_| BoardInitError::PsramController)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]
mod tests {
    use extmem::psram::PsramConfigError;

    use super::*;

    // ── Descriptor audit ──

    #[test]
    fn descriptor_validates_as_shipped() {
        assert!(psram_config().validated().is_ok());
    }

    #[test]
    fn timing_serves_both_directions() {
        let config = psram_config();
        assert!(!config.control.extended_mode);
        assert!(config.write_timing.is_none());
    }

    #[test]
    fn mpu_regions_encode_the_reference_words() {
        let [background, psram, fmc_block] = mpu_regions().unwrap();
        assert_eq!(background.register_pair(), (0x0000_0010, 0x1004_873F));
        assert_eq!(psram.register_pair(), (0x6000_0011, 0x0307_0027));
        assert_eq!(fmc_block.register_pair(), (0xA000_0012, 0x1305_0019));
    }

    #[test]
    fn psram_window_rounds_up_to_a_power_of_two() {
        let [_, psram, _] = mpu_regions().unwrap();
        assert!(u64::from(PSRAM_SIZE) <= psram.size_bytes());
        assert_eq!(psram.base(), PSRAM_BASE);
    }

    // ── Pin set ──

    #[test]
    fn fmc_pins_are_unique_and_all_af12() {
        assert_eq!(FMC_PINS.len(), 39);
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

    /// Controller that records the descriptors it saw.
    #[derive(Default)]
    struct MockController {
        configured: Vec<PsramConfig>,
    }

    impl SramController for MockController {
        type Error = ();

        fn configure(&mut self, config: &PsramConfig) -> Result<(), Self::Error> {
            self.configured.push(*config);
            Ok(())
        }
    }

    #[test]
    fn bring_up_programs_the_bank_once() {
        let mut controller = MockController::default();
        bring_up(&mut controller, &psram_config()).unwrap();
        assert_eq!(controller.configured, vec![psram_config()]);
    }

    #[test]
    fn a_mismatched_write_timing_never_reaches_the_controller() {
        let mut controller = MockController::default();
        let mut config = psram_config();
        // Extended mode promises a separate write timing nobody supplied.
        config.control.extended_mode = true;

        let err = bring_up(&mut controller, &config).unwrap_err();
        assert_eq!(
            err,
            BoardInitError::PsramConfig(PsramConfigError::WriteTimingMismatch)
        );
        assert!(controller.configured.is_empty());
    }
}
