//! Cortex-M MPU region descriptors (PMSAv7).
//!
//! External memories come out of reset unmapped or with default attributes
//! that are wrong for them (the 4 GB background map marks everything above
//! the peripheral space Device memory, and speculative prefetch into a
//! half-configured FMC bank hard-faults). Each board therefore ships MPU
//! regions alongside its memory descriptors, and applies them before the
//! first access to the new memory.
//!
//! This module validates regions and computes the exact RBAR/RASR words.
//! Writing them to the MPU is the target side's job; keeping the math here
//! lets host tests audit every shipped region against the reference manual
//! encoding.

// PMSAv7 RASR layout (ARMv7-M ARM, B3.5.9):
//
//   bit  28     XN     instruction fetch disable
//   bits 26:24  AP     access permission
//   bits 21:19  TEX    type extension
//   bit  18     S      shareable
//   bit  17     C      cacheable
//   bit  16     B      bufferable
//   bits 15:8   SRD    subregion disable, one bit per eighth
//   bits 5:1    SIZE   log2(bytes) - 1
//   bit  0      ENABLE

use thiserror_no_std::Error;

/// RBAR VALID bit: the write also selects the region number in bits 3:0.
const RBAR_VALID: u32 = 1 << 4;

/// Smallest PMSAv7 region, 32 bytes.
pub const MIN_REGION_BYTES: u64 = 32;
/// Largest PMSAv7 region, the full 4 GiB address space.
pub const MAX_REGION_BYTES: u64 = 1 << 32;
/// Regions implemented on the Cortex-M4/M7 parts this firmware targets.
pub const REGION_COUNT: u8 = 8;

/// Rejected region descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MpuError {
    /// Region numbers are 0..=7 on these parts.
    #[error("region number out of range")]
    RegionNumberOutOfRange {
        /// Rejected number.
        number: u8,
    },
    /// PMSAv7 sizes are powers of two.
    #[error("region size is not a power of two")]
    SizeNotPowerOfTwo {
        /// Rejected size.
        size_bytes: u64,
    },
    /// Sizes span 32 bytes to 4 GiB.
    #[error("region size out of range")]
    SizeOutOfRange {
        /// Rejected size.
        size_bytes: u64,
    },
    /// The base must be a multiple of the size.
    #[error("region base not aligned to its size")]
    MisalignedBase {
        /// Rejected base address.
        base: u32,
    },
    /// TEX is a 3-bit field.
    #[error("type extension out of range")]
    TypeExtensionOutOfRange {
        /// Rejected TEX value.
        tex: u8,
    },
}

/// AP field values used by the boards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AccessPermission {
    /// No access from any privilege level. Used for background deny maps.
    NoAccess,
    /// Read/write from both privilege levels.
    FullAccess,
}

impl AccessPermission {
    const fn field(self) -> u32 {
        match self {
            Self::NoAccess => 0b000,
            Self::FullAccess => 0b011,
        }
    }
}

/// Memory type and access attributes of one region.
///
/// Field names follow the reference-manual bit names rather than the
/// normal/device/strongly-ordered taxonomy, because board init sequences
/// are audited against vendor tables written in these terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RegionAttributes {
    /// AP field.
    pub access: AccessPermission,
    /// XN: refuse instruction fetches.
    pub execute_never: bool,
    /// B bit.
    pub bufferable: bool,
    /// C bit.
    pub cacheable: bool,
    /// S bit.
    pub shareable: bool,
    /// TEX field, 0..=7.
    pub type_extension: u8,
    /// SRD field: set bit n to disable the n-th eighth of the region.
    pub subregion_disable: u8,
}

/// A validated MPU region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MpuRegion {
    number: u8,
    base: u32,
    size_bytes: u64,
    attributes: RegionAttributes,
}

impl MpuRegion {
    /// Validates a region descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`MpuError`] when the number, size, alignment or TEX field
    /// cannot be encoded.
    #[allow(clippy::arithmetic_side_effects)] // modulo by a size checked nonzero first
    pub const fn new(
        number: u8,
        base: u32,
        size_bytes: u64,
        attributes: RegionAttributes,
    ) -> Result<Self, MpuError> {
        if number >= REGION_COUNT {
            return Err(MpuError::RegionNumberOutOfRange { number });
        }
        if !size_bytes.is_power_of_two() {
            return Err(MpuError::SizeNotPowerOfTwo { size_bytes });
        }
        if size_bytes < MIN_REGION_BYTES || size_bytes > MAX_REGION_BYTES {
            return Err(MpuError::SizeOutOfRange { size_bytes });
        }
        if (base as u64) % size_bytes != 0 {
            return Err(MpuError::MisalignedBase { base });
        }
        if attributes.type_extension > 0b111 {
            return Err(MpuError::TypeExtensionOutOfRange {
                tex: attributes.type_extension,
            });
        }
        Ok(Self {
            number,
            base,
            size_bytes,
            attributes,
        })
    }

    /// Region number.
    #[must_use]
    pub const fn number(&self) -> u8 {
        self.number
    }

    /// Base address.
    #[must_use]
    pub const fn base(&self) -> u32 {
        self.base
    }

    /// Region size in bytes.
    #[must_use]
    pub const fn size_bytes(&self) -> u64 {
        self.size_bytes
    }

    /// Attributes.
    #[must_use]
    pub const fn attributes(&self) -> RegionAttributes {
        self.attributes
    }

    /// RBAR word: base, VALID, and the region number.
    #[must_use]
    pub const fn rbar(&self) -> u32 {
        self.base | RBAR_VALID | self.number as u32
    }

    /// RASR word: attributes, SRD, encoded size, and ENABLE.
    #[must_use]
    #[allow(clippy::arithmetic_side_effects)] // size validated >= 32, so tz >= 5
    pub const fn rasr(&self) -> u32 {
        let size_field = self.size_bytes.trailing_zeros() - 1;
        let attrs = &self.attributes;
        (size_field << 1)
            | 1
            | (attrs.subregion_disable as u32) << 8
            | (attrs.bufferable as u32) << 16
            | (attrs.cacheable as u32) << 17
            | (attrs.shareable as u32) << 18
            | (attrs.type_extension as u32) << 19
            | attrs.access.field() << 24
            | (attrs.execute_never as u32) << 28
    }

    /// Both register words, in write order.
    #[must_use]
    pub const fn register_pair(&self) -> (u32, u32) {
        (self.rbar(), self.rasr())
    }

    /// Whether two regions cover any common address. Overlap is legal in
    /// PMSAv7 (higher numbers win) but the boards here never rely on it,
    /// so tests reject it.
    #[must_use]
    #[allow(clippy::arithmetic_side_effects)] // base + size <= 2^32 by validation
    pub const fn overlaps(&self, other: &Self) -> bool {
        let self_end = self.base as u64 + self.size_bytes;
        let other_end = other.base as u64 + other.size_bytes;
        (self.base as u64) < other_end && (other.base as u64) < self_end
    }
}

/// Register pairs for a board's region set, in application order.
#[must_use]
pub fn register_pairs<const N: usize>(regions: &[MpuRegion; N]) -> [(u32, u32); N] {
    let mut pairs = [(0, 0); N];
    for (pair, region) in pairs.iter_mut().zip(regions.iter()) {
        *pair = region.register_pair();
    }
    pairs
}
