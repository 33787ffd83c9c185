//! MIMXRT1020-EVK: boot flash on FlexSPI and the debug console pads.
//!
//! The board boots from an ISSI IS25WP064A quad NOR flash behind FlexSPI,
//! mapped at `0x6000_0000`. Setup re-runs the LUT programming the ROM
//! already did once, because the firmware's own command set (status polls,
//! erase, program) is wider than what the boot ROM installs.
//!
//! The debug console is LPUART1 on the two dedicated `GPIO_AD_B0` pads;
//! neither direction needs a daisy register.

use norflash::{FlashGeometry, FlexspiNor, FlexspiOps, StatusLayout};
use pinmux::{plan, tables, Pad, WritePlan};

use crate::error::BoardInitError;

/// Console TX pad: LPUART1 TX.
pub const CONSOLE_TX: Pad = Pad::GpioAdB0_06;
/// Console RX pad: LPUART1 RX.
pub const CONSOLE_RX: Pad = Pad::GpioAdB0_07;

/// Geometry of the boot flash.
#[must_use]
pub const fn flash_geometry() -> FlashGeometry {
    FlashGeometry::IS25WP064A
}

/// Status-register layout of the boot flash.
#[must_use]
pub const fn flash_status_layout() -> StatusLayout {
    StatusLayout::IS25WP064A
}

/// Builds the flash driver over the target's FlexSPI operations.
#[must_use]
pub const fn new_flash<O: FlexspiOps>(ops: O) -> FlexspiNor<O> {
    FlexspiNor::new(ops, flash_geometry(), flash_status_layout())
}

/// Programs the controller, the LUT and the device's quad-enable bit.
///
/// # Errors
///
/// Any setup failure reports as [`BoardInitError::FlashSetup`]; the part
/// stays untouched past the failing step.
pub fn bring_up<O: FlexspiOps>(flash: &mut FlexspiNor<O>) -> Result<(), BoardInitError> {
    flash.setup().map_err(|_| BoardInitError::FlashSetup)
}

/// Routing plans for the console pads, TX then RX.
///
/// # Errors
///
/// Propagates the table lookup failure; with the shipped tables this
/// cannot happen, and the validation is the audit.
pub fn console_uart_plan() -> Result<(WritePlan, WritePlan), BoardInitError> {
    let tx = plan(tables::UART_TX, CONSOLE_TX)?;
    let rx = plan(tables::UART_RX, CONSOLE_RX)?;
    Ok((tx, rx))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use norflash::{FlashError, LutSequence};

    use super::*;

    // ── Console routing ──

    #[test]
    fn console_pads_route_without_daisy_registers() {
        let (tx, rx) = console_uart_plan().unwrap();
        assert_eq!(tx.mux_ctl.pad, CONSOLE_TX);
        assert_eq!(tx.mux_ctl.value, 2);
        assert!(tx.daisy.is_none());
        assert_eq!(rx.mux_ctl.pad, CONSOLE_RX);
        assert_eq!(rx.mux_ctl.value, 2);
        assert!(rx.daisy.is_none());
    }

    // ── Flash attachment ──

    #[test]
    fn flash_geometry_matches_the_part() {
        let geometry = flash_geometry();
        assert_eq!(geometry.base_address, 0x6000_0000);
        assert_eq!(geometry.total_size, 8 * 1024 * 1024);
        assert_eq!(geometry.sector_size, 4096);
        assert_eq!(geometry.page_size, 256);
        let status = flash_status_layout();
        assert_eq!(status.busy_offset, 0);
        assert!(status.busy_active_high);
        assert_eq!(status.quad_enable_offset, 6);
    }

    /// FlexSPI mock that answers "quad already enabled" and can fail the
    /// controller-configuration step.
    struct MockFlexspi {
        fail_configure: bool,
    }

    impl FlexspiOps for MockFlexspi {
        type Error = &'static str;

        fn configure_controller(&mut self) -> Result<(), Self::Error> {
            if self.fail_configure {
                return Err("configure");
            }
            Ok(())
        }

        fn update_lut(&mut self) -> Result<(), Self::Error> {
            Ok(())
        }

        fn software_reset(&mut self) {}

        fn bus_idle(&mut self) -> bool {
            true
        }

        fn command(&mut self, _sequence: LutSequence, _offset: u32) -> Result<(), Self::Error> {
            Ok(())
        }

        fn read_transfer(
            &mut self,
            _sequence: LutSequence,
            _offset: u32,
            buffer: &mut [u8],
        ) -> Result<(), Self::Error> {
            // Status register with the quad-enable bit already set.
            buffer.fill(0x40);
            Ok(())
        }

        fn write_transfer(
            &mut self,
            _sequence: LutSequence,
            _offset: u32,
            _buffer: &[u8],
        ) -> Result<(), Self::Error> {
            Ok(())
        }

        fn read_mapped(&mut self, _offset: u32, _buffer: &mut [u8]) {}

        fn dcache_enabled(&self) -> bool {
            false
        }

        fn set_dcache_enabled(&mut self, _enabled: bool) {}

        fn invalidate_icache_range(&mut self, _address: u32, _len: u32) {}

        fn invalidate_dcache_range(&mut self, _address: u32, _len: u32) {}
    }

    #[test]
    fn bring_up_reports_setup_failures_as_one_stage() {
        let mut flash = new_flash(MockFlexspi {
            fail_configure: true,
        });
        assert_eq!(
            bring_up(&mut flash).unwrap_err(),
            BoardInitError::FlashSetup
        );

        let mut flash = new_flash(MockFlexspi {
            fail_configure: false,
        });
        bring_up(&mut flash).unwrap();
    }

    #[test]
    fn the_driver_surfaces_typed_errors_below_board_level() {
        let mut flash = new_flash(MockFlexspi {
            fail_configure: false,
        });
        flash.setup().unwrap();
        // Board code collapses stages; the driver itself stays precise.
        assert!(matches!(
            flash.erase_sector(0x6000_0001),
            Err(FlashError::NotAligned { address: 0x6000_0001 })
        ));
    }
}
