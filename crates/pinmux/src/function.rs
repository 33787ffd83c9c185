//! Pad-function encoding for the IOMUXC.
//!
//! Routing a pad to a peripheral takes one mandatory register write
//! (`SW_MUX_CTL_PAD_*`, selecting the alternate function) and, for some
//! signals, a second write to a `*_SELECT_INPUT` daisy register telling the
//! peripheral which of several candidate pads actually drives its input.
//!
//! [`PinFunction`] is the decoded form used throughout this crate. The packed
//! `u32` form ([`PinFunction::from_raw`] / [`PinFunction::into_raw`]) matches
//! the routing tables shipped with earlier firmware generations and is kept
//! for interchange and for table audits.

// Packed routing word layout:
//
//   bits 19:16  daisy register value
//   bits 15:4   daisy register byte offset from the IOMUXC base (0 = none)
//   bit  3      SION (software input on)
//   bits 2:0    mux mode (alternate function number)
//
// The daisy offset addresses the *_SELECT_INPUT registers, e.g. the LPI2C3
// SDA select input sits at IOMUXC base + 0x4E0 on the RT1021. An offset of
// zero means the signal has no daisy register; the value bits are then
// ignored by consumers and must encode as zero.

/// Mask for the mux-mode field (bits 2:0) of the packed routing word.
pub const RAW_MUX_MODE_MASK: u32 = 0x7;
/// SION flag (bit 3) of the packed routing word.
pub const RAW_SION: u32 = 1 << 3;
/// Shift of the daisy-offset field (bits 15:4) of the packed routing word.
pub const RAW_DAISY_OFFSET_SHIFT: u32 = 4;
/// Mask for the daisy-offset field, applied after shifting.
pub const RAW_DAISY_OFFSET_MASK: u32 = 0xFFF;
/// Shift of the daisy-value field (bits 19:16) of the packed routing word.
pub const RAW_DAISY_VALUE_SHIFT: u32 = 16;
/// Mask for the daisy-value field, applied after shifting.
pub const RAW_DAISY_VALUE_MASK: u32 = 0xF;

/// Daisy-chain (select-input) register write required by a routing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Daisy {
    /// Byte offset of the `*_SELECT_INPUT` register from the IOMUXC base.
    /// Never zero; zero marks "no daisy" in the packed form.
    pub offset: u16,
    /// Selector value identifying this pad among the candidates.
    pub value: u8,
}

/// Decoded routing of one pad to one peripheral signal.
///
/// Construct with [`PinFunction::alt`] and the `with_*` builders:
///
/// ```
/// use pinmux::PinFunction;
///
/// // LPI2C2 SDA on GPIO_AD_B1_09: ALT0, input loopback, daisy select 0.
/// let f = PinFunction::alt(0).with_force_input().with_daisy(0x388, 0);
/// assert_eq!(f.into_raw(), 0x0000_3888);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PinFunction {
    /// Alternate-function number written to the MUX_MODE field (0..=7).
    pub mux_mode: u8,
    /// Set SION so the pad level is fed back to the input path even while
    /// the output driver owns the pad. The tables carry this flag exactly
    /// as inherited; no general rule for when it is needed is documented.
    pub force_input: bool,
    /// Select-input write, for signals with more than one candidate pad.
    pub daisy: Option<Daisy>,
}

impl PinFunction {
    /// Routing with the given alternate function and nothing else.
    #[must_use]
    pub const fn alt(mux_mode: u8) -> Self {
        Self {
            mux_mode: mux_mode & 0x7,
            force_input: false,
            daisy: None,
        }
    }

    /// Enables SION on this routing.
    #[must_use]
    pub const fn with_force_input(mut self) -> Self {
        self.force_input = true;
        self
    }

    /// Attaches a daisy write. An `offset` of zero means "no daisy register"
    /// and leaves the routing unchanged.
    #[must_use]
    pub const fn with_daisy(mut self, offset: u16, value: u8) -> Self {
        if offset != 0 {
            self.daisy = Some(Daisy { offset, value });
        }
        self
    }

    /// Decodes a packed routing word.
    ///
    /// Bits above 19 are ignored. A zero daisy offset decodes to
    /// `daisy: None`; the value bits are don't-care in that case.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)] // fields are masked to width first
    #[allow(clippy::arithmetic_side_effects)] // shifts by in-range constants
    pub const fn from_raw(raw: u32) -> Self {
        let offset = ((raw >> RAW_DAISY_OFFSET_SHIFT) & RAW_DAISY_OFFSET_MASK) as u16;
        let daisy = if offset == 0 {
            None
        } else {
            Some(Daisy {
                offset,
                value: ((raw >> RAW_DAISY_VALUE_SHIFT) & RAW_DAISY_VALUE_MASK) as u8,
            })
        };
        Self {
            mux_mode: (raw & RAW_MUX_MODE_MASK) as u8,
            force_input: raw & RAW_SION != 0,
            daisy,
        }
    }

    /// Encodes this routing as a packed word.
    ///
    /// The output is canonical: when `daisy` is `None` both daisy fields
    /// are zero, so `from_raw(f.into_raw()) == f` for every `f`.
    #[must_use]
    #[allow(clippy::arithmetic_side_effects)] // shifts by in-range constants
    pub const fn into_raw(self) -> u32 {
        let mut raw = (self.mux_mode as u32) & RAW_MUX_MODE_MASK;
        if self.force_input {
            raw |= RAW_SION;
        }
        if let Some(daisy) = self.daisy {
            raw |= ((daisy.offset as u32) & RAW_DAISY_OFFSET_MASK) << RAW_DAISY_OFFSET_SHIFT;
            raw |= ((daisy.value as u32) & RAW_DAISY_VALUE_MASK) << RAW_DAISY_VALUE_SHIFT;
        }
        raw
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    // ── Decoding ────────────────────────────────────────────────────────

    #[test]
    fn plain_alt_function_decodes_without_daisy() {
        let f = PinFunction::from_raw(2);
        assert_eq!(f.mux_mode, 2);
        assert!(!f.force_input);
        assert_eq!(f.daisy, None);
    }

    #[test]
    fn sion_bit_decodes_to_force_input() {
        let f = PinFunction::from_raw(0b1000 | 3);
        assert_eq!(f.mux_mode, 3);
        assert!(f.force_input);
    }

    #[test]
    fn daisy_fields_decode_together() {
        // LPI2C1 SDA on GPIO_AD_B1_15: value 1, offset 0x380, SION, ALT0.
        let raw = (1 << 16) | (0x380 << 4) | (1 << 3);
        let f = PinFunction::from_raw(raw);
        assert_eq!(f.mux_mode, 0);
        assert!(f.force_input);
        assert_eq!(
            f.daisy,
            Some(Daisy {
                offset: 0x380,
                value: 1,
            })
        );
    }

    #[test]
    fn zero_offset_means_no_daisy_even_with_value_bits_set() {
        // Value bits without an offset carry no routing information.
        let f = PinFunction::from_raw(0xF_0002);
        assert_eq!(f.daisy, None);
        assert_eq!(f.mux_mode, 2);
    }

    #[test]
    fn bits_above_the_value_field_are_ignored() {
        let f = PinFunction::from_raw(0xFFF0_0005);
        assert_eq!(f.mux_mode, 5);
        assert_eq!(f.daisy, None);
    }

    // ── Encoding ────────────────────────────────────────────────────────

    #[test]
    fn builder_encodes_the_documented_layout() {
        let f = PinFunction::alt(0).with_force_input().with_daisy(0x388, 0);
        assert_eq!(f.into_raw(), (0x388 << 4) | (1 << 3));

        let f = PinFunction::alt(4).with_daisy(0x354, 0);
        assert_eq!(f.into_raw(), (0x354 << 4) | 4);
    }

    #[test]
    fn with_daisy_at_offset_zero_is_a_no_op() {
        let f = PinFunction::alt(2).with_daisy(0, 9);
        assert_eq!(f.daisy, None);
        assert_eq!(f.into_raw(), 2);
    }

    #[test]
    fn encoding_is_canonical_for_daisyless_routings() {
        let f = PinFunction::alt(5);
        assert_eq!(f.into_raw() & 0xF_FFF0, 0);
    }

    // ── Round trips ─────────────────────────────────────────────────────

    proptest! {
        #[test]
        fn decode_then_encode_preserves_canonical_words(
            mux in 0u32..8,
            sion in proptest::bool::ANY,
            offset in 0u32..0x1000,
            value in 0u32..0x10,
        ) {
            // Canonical: value bits are zero whenever the offset is zero.
            let value = if offset == 0 { 0 } else { value };
            let raw = (value << 16) | (offset << 4) | (u32::from(sion) << 3) | mux;
            prop_assert_eq!(PinFunction::from_raw(raw).into_raw(), raw);
        }

        #[test]
        fn encode_then_decode_is_identity(
            mux in 0u8..8,
            sion in proptest::bool::ANY,
            offset in 1u16..0x1000,
            value in 0u8..0x10,
        ) {
            let mut f = PinFunction::alt(mux).with_daisy(offset, value);
            f.force_input = sion;
            prop_assert_eq!(PinFunction::from_raw(f.into_raw()), f);
        }
    }
}
