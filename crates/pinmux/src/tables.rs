//! Per-signal routing tables for the RT1020.
//!
//! One table per peripheral signal class (I2C SDA, UART TX, ...). Each table
//! lists every pad that can carry that signal, with the mux mode, SION flag
//! and daisy select needed to route it, and ends with a [`NO_CONNECTION`]
//! sentinel. Lookups scan in order and stop at the sentinel, so entry order
//! is part of the contract: when a pad appears twice, the first entry wins.
//!
//! The data was audited against the RT1020 reference manual IOMUXC chapter.
//! Daisy offsets are byte offsets from the IOMUXC base; SION flags are
//! carried exactly as inherited from the audited tables.

use crate::function::PinFunction;
use crate::pad::Pad;
use crate::peripheral::{Peripheral, PwmChannel, PwmOutput};

/// One row of a routing table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PinAssignment {
    /// Pad this row routes, `None` for the sentinel.
    pub pad: Option<Pad>,
    /// Peripheral signal the pad connects to.
    pub peripheral: Option<Peripheral>,
    /// Mux, SION and daisy settings for the connection.
    pub function: PinFunction,
}

/// Sentinel terminating every routing table.
pub const NO_CONNECTION: PinAssignment = PinAssignment {
    pad: None,
    peripheral: None,
    function: PinFunction::alt(0),
};

const fn routed(pad: Pad, peripheral: Peripheral, function: PinFunction) -> PinAssignment {
    PinAssignment {
        pad: Some(pad),
        peripheral: Some(peripheral),
        function,
    }
}

const fn pwm(module: u8, submodule: u8, channel: PwmChannel) -> Peripheral {
    Peripheral::FlexPwm(PwmOutput::new(module, submodule, channel))
}

/// RTC clock source. The 32.768 kHz oscillator feeds the RTC internally,
/// so the single row carries no pad and doubles as the sentinel.
pub static RTC: &[PinAssignment] = &[PinAssignment {
    pad: None,
    peripheral: Some(Peripheral::Osc32k),
    function: PinFunction::alt(0),
}];

/// ADC1 inputs. All on ALT5 (pad in GPIO mode, analog channel enabled).
///
/// Channels 15 and 14 are listed in that order on purpose: the order was
/// inherited from the audited tables and first-match lookup must not change.
pub static ADC: &[PinAssignment] = &[
    routed(Pad::GpioAdB1_10, Peripheral::Adc1(10), PinFunction::alt(5)),
    routed(Pad::GpioAdB1_11, Peripheral::Adc1(11), PinFunction::alt(5)),
    routed(Pad::GpioAdB1_12, Peripheral::Adc1(12), PinFunction::alt(5)),
    routed(Pad::GpioAdB1_13, Peripheral::Adc1(13), PinFunction::alt(5)),
    routed(Pad::GpioAdB1_15, Peripheral::Adc1(15), PinFunction::alt(5)),
    routed(Pad::GpioAdB1_14, Peripheral::Adc1(14), PinFunction::alt(5)),
    NO_CONNECTION,
];

/// DAC outputs. The RT1020 has no DAC; the table exists so generic signal
/// lookups can run against every class without special-casing.
pub static DAC: &[PinAssignment] = &[NO_CONNECTION];

/// LPI2C SDA pads. All carry SION so the I2C block can observe the pad
/// while driving it (required for arbitration and clock stretching).
pub static I2C_SDA: &[PinAssignment] = &[
    routed(
        Pad::GpioAdB1_15,
        Peripheral::Lpi2c(1),
        PinFunction::alt(0).with_force_input().with_daisy(0x380, 1),
    ),
    routed(
        Pad::GpioAdB1_09,
        Peripheral::Lpi2c(2),
        PinFunction::alt(0).with_force_input().with_daisy(0x388, 0),
    ),
    routed(
        Pad::GpioSdB1_03,
        Peripheral::Lpi2c(4),
        PinFunction::alt(3).with_force_input().with_daisy(0x398, 1),
    ),
    NO_CONNECTION,
];

/// LPI2C SCL pads. SION for the same reason as [`I2C_SDA`].
pub static I2C_SCL: &[PinAssignment] = &[
    routed(
        Pad::GpioAdB1_14,
        Peripheral::Lpi2c(1),
        PinFunction::alt(0).with_force_input().with_daisy(0x37C, 1),
    ),
    routed(
        Pad::GpioAdB1_08,
        Peripheral::Lpi2c(2),
        PinFunction::alt(0).with_force_input().with_daisy(0x384, 0),
    ),
    routed(
        Pad::GpioSdB1_02,
        Peripheral::Lpi2c(4),
        PinFunction::alt(3).with_force_input().with_daisy(0x394, 1),
    ),
    NO_CONNECTION,
];

/// LPUART TX pads. LPUART1 TX has a dedicated pad and needs no daisy.
pub static UART_TX: &[PinAssignment] = &[
    routed(Pad::GpioAdB0_06, Peripheral::Lpuart(1), PinFunction::alt(2)),
    routed(
        Pad::GpioAdB1_08,
        Peripheral::Lpuart(2),
        PinFunction::alt(2).with_daisy(0x3D4, 0),
    ),
    routed(
        Pad::GpioAdB0_14,
        Peripheral::Lpuart(3),
        PinFunction::alt(2).with_daisy(0x3DC, 1),
    ),
    routed(
        Pad::GpioAdB1_10,
        Peripheral::Lpuart(4),
        PinFunction::alt(2).with_daisy(0x3E8, 1),
    ),
    routed(
        Pad::GpioAdB0_10,
        Peripheral::Lpuart(5),
        PinFunction::alt(2).with_daisy(0x3F0, 0),
    ),
    NO_CONNECTION,
];

/// LPUART RX pads.
pub static UART_RX: &[PinAssignment] = &[
    routed(Pad::GpioAdB0_07, Peripheral::Lpuart(1), PinFunction::alt(2)),
    routed(
        Pad::GpioAdB1_09,
        Peripheral::Lpuart(2),
        PinFunction::alt(2).with_daisy(0x3D0, 0),
    ),
    routed(
        Pad::GpioAdB0_15,
        Peripheral::Lpuart(3),
        PinFunction::alt(2).with_daisy(0x3D8, 1),
    ),
    routed(
        Pad::GpioAdB1_11,
        Peripheral::Lpuart(4),
        PinFunction::alt(2).with_daisy(0x3E4, 1),
    ),
    routed(
        Pad::GpioAdB0_11,
        Peripheral::Lpuart(5),
        PinFunction::alt(2).with_daisy(0x3EC, 0),
    ),
    NO_CONNECTION,
];

/// LPSPI SCK pads.
pub static SPI_SCLK: &[PinAssignment] = &[
    routed(
        Pad::GpioAdB0_10,
        Peripheral::Lpspi(1),
        PinFunction::alt(1).with_daisy(0x3A0, 1),
    ),
    routed(Pad::GpioAdB1_12, Peripheral::Lpspi(3), PinFunction::alt(2)),
    NO_CONNECTION,
];

/// LPSPI MOSI (SDO) pads.
pub static SPI_MOSI: &[PinAssignment] = &[
    routed(
        Pad::GpioAdB0_12,
        Peripheral::Lpspi(1),
        PinFunction::alt(1).with_daisy(0x3A8, 1),
    ),
    routed(Pad::GpioAdB1_14, Peripheral::Lpspi(3), PinFunction::alt(2)),
    NO_CONNECTION,
];

/// LPSPI MISO (SDI) pads.
pub static SPI_MISO: &[PinAssignment] = &[
    routed(
        Pad::GpioAdB0_13,
        Peripheral::Lpspi(1),
        PinFunction::alt(1).with_daisy(0x3A4, 1),
    ),
    routed(Pad::GpioAdB1_15, Peripheral::Lpspi(3), PinFunction::alt(2)),
    NO_CONNECTION,
];

/// LPSPI chip-select pads (PCS0).
pub static SPI_SSEL: &[PinAssignment] = &[
    routed(
        Pad::GpioAdB0_11,
        Peripheral::Lpspi(1),
        PinFunction::alt(1).with_daisy(0x39C, 1),
    ),
    routed(Pad::GpioAdB1_13, Peripheral::Lpspi(3), PinFunction::alt(2)),
    NO_CONNECTION,
];

/// FlexPWM output pads.
///
/// Every row has a daisy register and every daisy value is zero: each
/// FlexPWM input select has exactly one tabulated source pad, but the write
/// is still required to latch the selection.
pub static PWM: &[PinAssignment] = &[
    routed(
        Pad::GpioAdB0_06,
        pwm(2, 3, PwmChannel::A),
        PinFunction::alt(4).with_daisy(0x354, 0),
    ),
    routed(
        Pad::GpioAdB0_07,
        pwm(2, 3, PwmChannel::B),
        PinFunction::alt(4).with_daisy(0x364, 0),
    ),
    routed(
        Pad::GpioAdB0_10,
        pwm(2, 2, PwmChannel::A),
        PinFunction::alt(4).with_daisy(0x350, 0),
    ),
    routed(
        Pad::GpioAdB0_11,
        pwm(2, 2, PwmChannel::B),
        PinFunction::alt(4).with_daisy(0x360, 0),
    ),
    routed(
        Pad::GpioAdB0_12,
        pwm(2, 1, PwmChannel::A),
        PinFunction::alt(4).with_daisy(0x34C, 0),
    ),
    routed(
        Pad::GpioAdB0_13,
        pwm(2, 1, PwmChannel::B),
        PinFunction::alt(4).with_daisy(0x35C, 0),
    ),
    routed(
        Pad::GpioAdB0_14,
        pwm(2, 0, PwmChannel::A),
        PinFunction::alt(4).with_daisy(0x348, 0),
    ),
    routed(
        Pad::GpioAdB0_15,
        pwm(2, 0, PwmChannel::B),
        PinFunction::alt(4).with_daisy(0x358, 0),
    ),
    routed(
        Pad::GpioAdB1_06,
        pwm(1, 0, PwmChannel::A),
        PinFunction::alt(1).with_daisy(0x328, 0),
    ),
    routed(
        Pad::GpioAdB1_07,
        pwm(1, 0, PwmChannel::B),
        PinFunction::alt(1).with_daisy(0x338, 0),
    ),
    routed(
        Pad::GpioAdB1_08,
        pwm(1, 1, PwmChannel::A),
        PinFunction::alt(1).with_daisy(0x32C, 0),
    ),
    routed(
        Pad::GpioAdB1_09,
        pwm(1, 1, PwmChannel::B),
        PinFunction::alt(1).with_daisy(0x33C, 0),
    ),
    routed(
        Pad::GpioAdB1_10,
        pwm(1, 2, PwmChannel::A),
        PinFunction::alt(1).with_daisy(0x330, 0),
    ),
    routed(
        Pad::GpioAdB1_11,
        pwm(1, 2, PwmChannel::B),
        PinFunction::alt(1).with_daisy(0x340, 0),
    ),
    routed(
        Pad::GpioAdB1_12,
        pwm(1, 3, PwmChannel::A),
        PinFunction::alt(6).with_daisy(0x334, 0),
    ),
    routed(
        Pad::GpioAdB1_13,
        pwm(1, 3, PwmChannel::B),
        PinFunction::alt(6).with_daisy(0x344, 0),
    ),
    NO_CONNECTION,
];

/// Every routing table with its signal name, for audits and generic scans.
#[must_use]
pub fn all_tables() -> [(&'static str, &'static [PinAssignment]); 12] {
    [
        ("RTC", RTC),
        ("ADC", ADC),
        ("DAC", DAC),
        ("I2C_SDA", I2C_SDA),
        ("I2C_SCL", I2C_SCL),
        ("UART_TX", UART_TX),
        ("UART_RX", UART_RX),
        ("SPI_SCLK", SPI_SCLK),
        ("SPI_MOSI", SPI_MOSI),
        ("SPI_MISO", SPI_MISO),
        ("SPI_SSEL", SPI_SSEL),
        ("PWM", PWM),
    ]
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic, clippy::arithmetic_side_effects)]
mod tests {
    use super::*;
    use crate::function::Daisy;

    // ── Structural invariants ───────────────────────────────────────────

    #[test]
    fn every_table_ends_with_a_sentinel() {
        for (name, table) in all_tables() {
            let last = table.last().unwrap();
            assert!(last.pad.is_none(), "{name} does not end with a sentinel");
        }
    }

    #[test]
    fn only_the_last_row_terminates_the_scan() {
        for (name, table) in all_tables() {
            for (index, entry) in table.iter().enumerate() {
                if entry.pad.is_none() {
                    assert_eq!(
                        index,
                        table.len() - 1,
                        "{name} has an early terminator at row {index}"
                    );
                }
            }
        }
    }

    #[test]
    fn no_pad_is_routed_twice_within_one_table() {
        for (name, table) in all_tables() {
            for (index, entry) in table.iter().enumerate() {
                let Some(pad) = entry.pad else { continue };
                let duplicates = table
                    .iter()
                    .skip(index + 1)
                    .filter(|other| other.pad == Some(pad))
                    .count();
                assert_eq!(duplicates, 0, "{name} routes {} twice", pad.name());
            }
        }
    }

    #[test]
    fn packed_form_round_trips_for_every_routed_entry() {
        for (name, table) in all_tables() {
            for entry in table.iter().filter(|entry| entry.pad.is_some()) {
                let raw = entry.function.into_raw();
                assert_eq!(
                    PinFunction::from_raw(raw),
                    entry.function,
                    "{name} entry for {:?} does not round trip",
                    entry.pad
                );
            }
        }
    }

    // ── Signal-class properties ─────────────────────────────────────────

    #[test]
    fn adc_preserves_the_audited_channel_order() {
        let channels: Vec<u8> = ADC
            .iter()
            .filter_map(|entry| match entry.peripheral {
                Some(Peripheral::Adc1(channel)) => Some(channel),
                _ => None,
            })
            .collect();
        // 15 before 14: first-match lookups depend on this.
        assert_eq!(channels, [10, 11, 12, 13, 15, 14]);
    }

    #[test]
    fn adc_entries_use_alt5_without_sion_or_daisy() {
        for entry in ADC.iter().filter(|entry| entry.pad.is_some()) {
            assert_eq!(entry.function.mux_mode, 5);
            assert!(!entry.function.force_input);
            assert_eq!(entry.function.daisy, None);
        }
    }

    #[test]
    fn dac_routes_nothing() {
        assert_eq!(DAC.len(), 1);
        assert_eq!(DAC.first().copied().unwrap(), NO_CONNECTION);
    }

    #[test]
    fn rtc_names_the_internal_oscillator_without_a_pad() {
        assert_eq!(RTC.len(), 1);
        let entry = RTC.first().unwrap();
        assert_eq!(entry.pad, None);
        assert_eq!(entry.peripheral, Some(Peripheral::Osc32k));
    }

    #[test]
    fn every_i2c_entry_carries_sion() {
        for entry in I2C_SDA
            .iter()
            .chain(I2C_SCL.iter())
            .filter(|entry| entry.pad.is_some())
        {
            assert!(entry.function.force_input, "I2C pad without SION");
            assert!(entry.function.daisy.is_some(), "I2C pad without daisy");
        }
    }

    #[test]
    fn i2c4_lives_on_the_sd_pads_at_alt3() {
        let sda = I2C_SDA
            .iter()
            .find(|entry| entry.peripheral == Some(Peripheral::Lpi2c(4)))
            .unwrap();
        assert_eq!(sda.pad, Some(Pad::GpioSdB1_03));
        assert_eq!(sda.function.mux_mode, 3);
        assert_eq!(
            sda.function.daisy,
            Some(Daisy {
                offset: 0x398,
                value: 1,
            })
        );

        let scl = I2C_SCL
            .iter()
            .find(|entry| entry.peripheral == Some(Peripheral::Lpi2c(4)))
            .unwrap();
        assert_eq!(scl.pad, Some(Pad::GpioSdB1_02));
        assert_eq!(
            scl.function.daisy,
            Some(Daisy {
                offset: 0x394,
                value: 1,
            })
        );
    }

    #[test]
    fn uart1_needs_no_daisy_but_every_other_uart_does() {
        for entry in UART_TX
            .iter()
            .chain(UART_RX.iter())
            .filter(|entry| entry.pad.is_some())
        {
            assert_eq!(entry.function.mux_mode, 2);
            match entry.peripheral {
                Some(Peripheral::Lpuart(1)) => assert_eq!(entry.function.daisy, None),
                Some(Peripheral::Lpuart(_)) => assert!(entry.function.daisy.is_some()),
                other => panic!("unexpected peripheral {other:?} in a UART table"),
            }
        }
    }

    #[test]
    fn uart_tx_and_rx_tables_pair_the_same_instances() {
        let instances = |table: &[PinAssignment]| -> Vec<u8> {
            table
                .iter()
                .filter_map(|entry| match entry.peripheral {
                    Some(Peripheral::Lpuart(instance)) => Some(instance),
                    _ => None,
                })
                .collect()
        };
        assert_eq!(instances(UART_TX), [1, 2, 3, 4, 5]);
        assert_eq!(instances(UART_RX), [1, 2, 3, 4, 5]);
    }

    #[test]
    fn lpspi1_uses_daisied_alt1_and_lpspi3_plain_alt2() {
        for table in [SPI_SCLK, SPI_MOSI, SPI_MISO, SPI_SSEL] {
            for entry in table.iter().filter(|entry| entry.pad.is_some()) {
                match entry.peripheral {
                    Some(Peripheral::Lpspi(1)) => {
                        assert_eq!(entry.function.mux_mode, 1);
                        assert_eq!(entry.function.daisy.map(|daisy| daisy.value), Some(1));
                    }
                    Some(Peripheral::Lpspi(3)) => {
                        assert_eq!(entry.function.mux_mode, 2);
                        assert_eq!(entry.function.daisy, None);
                    }
                    other => panic!("unexpected peripheral {other:?} in an SPI table"),
                }
            }
        }
    }

    #[test]
    fn pwm_covers_both_modules_with_distinct_outputs() {
        let outputs: Vec<PwmOutput> = PWM
            .iter()
            .filter_map(|entry| match entry.peripheral {
                Some(Peripheral::FlexPwm(output)) => Some(output),
                _ => None,
            })
            .collect();
        assert_eq!(outputs.len(), 16);
        for (index, output) in outputs.iter().enumerate() {
            assert!(output.module == 1 || output.module == 2);
            assert!(output.submodule <= 3);
            assert!(
                !outputs.iter().skip(index + 1).any(|other| other == output),
                "duplicate FlexPWM output {output:?}"
            );
        }
    }

    #[test]
    fn pwm_daisy_selects_are_present_with_value_zero() {
        for entry in PWM.iter().filter(|entry| entry.pad.is_some()) {
            let daisy = entry.function.daisy.unwrap();
            assert_eq!(daisy.value, 0);
            assert!((0x328..=0x364).contains(&daisy.offset));
        }
    }

    // ── Audited spot checks ─────────────────────────────────────────────

    #[test]
    fn packed_words_match_the_audited_values() {
        // LPI2C1 SDA on GPIO_AD_B1_15: value 1, offset 0x380, SION, ALT0.
        let sda1 = I2C_SDA.first().unwrap();
        assert_eq!(sda1.function.into_raw(), 0x0001_3808);

        // LPUART3 TX on GPIO_AD_B0_14: value 1, offset 0x3DC, ALT2.
        let tx3 = UART_TX.get(2).unwrap();
        assert_eq!(tx3.function.into_raw(), 0x0001_3DC2);

        // FlexPWM2 submodule 3 channel A on GPIO_AD_B0_06: offset 0x354, ALT4.
        let pwm_entry = PWM.first().unwrap();
        assert_eq!(pwm_entry.function.into_raw(), 0x0000_3544);

        // LPSPI3 SCK on GPIO_AD_B1_12: plain ALT2.
        let sck3 = SPI_SCLK.get(1).unwrap();
        assert_eq!(sck3.function.into_raw(), 0x0000_0002);
    }
}
