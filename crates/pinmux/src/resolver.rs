//! Table lookup and IOMUXC write planning.
//!
//! [`lookup`] finds the routing row for a pad; [`plan`] turns it into the
//! ordered register writes the IOMUXC needs. Writes are returned as data so
//! callers decide how to issue them (directly on target, logged in tests).

use heapless::Vec;
use thiserror_no_std::Error;

use crate::function::PinFunction;
use crate::pad::Pad;
use crate::peripheral::Peripheral;
use crate::tables::PinAssignment;

/// SION bit position within a `SW_MUX_CTL_PAD_*` register.
///
/// The register keeps MUX_MODE in bits 2:0 and SION in bit 4, unlike the
/// packed table form which packs SION into bit 3.
pub const SW_MUX_CTL_SION: u32 = 1 << 4;

/// Write to a pad's `SW_MUX_CTL_PAD_*` register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MuxCtlWrite {
    /// Pad whose mux register is written.
    pub pad: Pad,
    /// Register value: MUX_MODE in bits 2:0, SION in bit 4.
    pub value: u32,
}

/// Write to a `*_SELECT_INPUT` register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DaisyWrite {
    /// Byte offset of the register from the IOMUXC base.
    pub offset: u16,
    /// Selector value.
    pub value: u32,
}

/// One register write of a routing plan, in issue order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PadWrite {
    /// Mux-control write. Always present, always first.
    MuxCtl(MuxCtlWrite),
    /// Select-input write. Present only for daisied signals.
    DaisySelect(DaisyWrite),
}

/// Register writes that route one pad to one signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WritePlan {
    /// Mux-control write.
    pub mux_ctl: MuxCtlWrite,
    /// Select-input write, when the signal has a daisy register.
    pub daisy: Option<DaisyWrite>,
}

impl WritePlan {
    /// Builds the plan for routing `pad` with `function`.
    #[must_use]
    pub const fn for_function(pad: Pad, function: PinFunction) -> Self {
        let mut value = (function.mux_mode as u32) & 0x7;
        if function.force_input {
            value |= SW_MUX_CTL_SION;
        }
        let daisy = match function.daisy {
            Some(daisy) => Some(DaisyWrite {
                offset: daisy.offset,
                value: daisy.value as u32,
            }),
            None => None,
        };
        Self {
            mux_ctl: MuxCtlWrite { pad, value },
            daisy,
        }
    }

    /// The plan's writes in issue order: mux first, then the daisy select.
    #[must_use]
    pub fn register_writes(&self) -> Vec<PadWrite, 2> {
        let mut writes = Vec::new();
        // Capacity 2 is exact: one mux write plus at most one daisy write.
        let _ = writes.push(PadWrite::MuxCtl(self.mux_ctl));
        if let Some(daisy) = self.daisy {
            let _ = writes.push(PadWrite::DaisySelect(daisy));
        }
        writes
    }
}

/// Routing failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PinmuxError {
    /// The pad does not appear in the table before its sentinel.
    #[error("pad is not routable to the requested signal")]
    FunctionNotFound {
        /// Pad that was looked up.
        pad: Pad,
    },
}

/// Finds the routing row for `pad`, scanning until the sentinel.
#[must_use]
pub fn lookup(table: &[PinAssignment], pad: Pad) -> Option<&PinAssignment> {
    table
        .iter()
        .take_while(|entry| entry.pad.is_some())
        .find(|entry| entry.pad == Some(pad))
}

/// The peripheral `pad` connects to in `table`, if any.
#[must_use]
pub fn peripheral(table: &[PinAssignment], pad: Pad) -> Option<Peripheral> {
    lookup(table, pad).and_then(|entry| entry.peripheral)
}

/// Builds the write plan routing `pad` per `table`.
///
/// # Errors
///
/// [`PinmuxError::FunctionNotFound`] when the table does not route the pad.
pub fn plan(table: &[PinAssignment], pad: Pad) -> Result<WritePlan, PinmuxError> {
    let entry = lookup(table, pad).ok_or(PinmuxError::FunctionNotFound { pad })?;
    Ok(WritePlan::for_function(pad, entry.function))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]
mod tests {
    use super::*;
    use crate::tables;

    // ── Lookup ──────────────────────────────────────────────────────────

    #[test]
    fn lookup_finds_routed_pads() {
        let entry = lookup(tables::UART_TX, Pad::GpioAdB0_06).unwrap();
        assert_eq!(entry.peripheral, Some(Peripheral::Lpuart(1)));
    }

    #[test]
    fn lookup_misses_pads_the_table_does_not_route() {
        // GPIO_AD_B0_06 carries UART1 TX, not RX.
        assert!(lookup(tables::UART_RX, Pad::GpioAdB0_06).is_none());
        assert_eq!(peripheral(tables::UART_RX, Pad::GpioAdB0_06), None);
    }

    #[test]
    fn lookup_never_matches_past_the_sentinel() {
        // A handmade table with a row "behind" the sentinel. Real tables
        // never have one, but the scan must stop regardless.
        let table = [
            tables::NO_CONNECTION,
            tables::PinAssignment {
                pad: Some(Pad::GpioAdB0_06),
                peripheral: Some(Peripheral::Lpuart(1)),
                function: PinFunction::alt(2),
            },
        ];
        assert!(lookup(&table, Pad::GpioAdB0_06).is_none());
    }

    #[test]
    fn plan_reports_unroutable_pads() {
        let err = plan(tables::I2C_SDA, Pad::GpioAdB0_06).unwrap_err();
        assert_eq!(
            err,
            PinmuxError::FunctionNotFound {
                pad: Pad::GpioAdB0_06,
            }
        );
    }

    // ── Write plans ─────────────────────────────────────────────────────

    #[test]
    fn daisyless_routing_plans_a_single_mux_write() {
        let plan = plan(tables::UART_TX, Pad::GpioAdB0_06).unwrap();
        assert_eq!(plan.daisy, None);

        let writes = plan.register_writes();
        assert_eq!(writes.len(), 1);
        assert_eq!(
            writes.first().copied().unwrap(),
            PadWrite::MuxCtl(MuxCtlWrite {
                pad: Pad::GpioAdB0_06,
                value: 2,
            })
        );
    }

    #[test]
    fn daisied_routing_plans_mux_then_select() {
        let plan = plan(tables::I2C_SDA, Pad::GpioAdB1_15).unwrap();
        let writes = plan.register_writes();
        assert_eq!(writes.len(), 2);
        assert_eq!(
            writes.first().copied().unwrap(),
            PadWrite::MuxCtl(MuxCtlWrite {
                pad: Pad::GpioAdB1_15,
                // ALT0 with SION: SION moves to bit 4 in SW_MUX_CTL.
                value: SW_MUX_CTL_SION,
            })
        );
        assert_eq!(
            writes.get(1).copied().unwrap(),
            PadWrite::DaisySelect(DaisyWrite {
                offset: 0x380,
                value: 1,
            })
        );
    }

    #[test]
    fn sion_lands_in_bit_four_of_the_mux_register() {
        let function = PinFunction::alt(3).with_force_input();
        let plan = WritePlan::for_function(Pad::GpioSdB1_03, function);
        assert_eq!(plan.mux_ctl.value, 0b1_0011);
    }

    #[test]
    fn daisy_value_bits_are_dont_care_when_no_daisy_register_exists() {
        // Two packed words that differ only in the value field while the
        // offset field is zero must produce identical plans.
        let without_value = PinFunction::from_raw(0x0000_0002);
        let with_stray_value = PinFunction::from_raw(0x000F_0002);

        let a = WritePlan::for_function(Pad::GpioAdB0_06, without_value);
        let b = WritePlan::for_function(Pad::GpioAdB0_06, with_stray_value);
        assert_eq!(a, b);
        assert_eq!(a.register_writes(), b.register_writes());
    }

    #[test]
    fn plans_for_every_routed_pad_start_with_the_mux_write() {
        for (name, table) in tables::all_tables() {
            for entry in table.iter() {
                let Some(pad) = entry.pad else { continue };
                let plan = plan(table, pad).unwrap();
                let writes = plan.register_writes();
                assert!(
                    matches!(writes.first(), Some(PadWrite::MuxCtl(_))),
                    "{name} plan for {} does not start with SW_MUX_CTL",
                    pad.name()
                );
                assert_eq!(writes.len(), 1 + usize::from(plan.daisy.is_some()));
            }
        }
    }
}
