//! Flash part geometry and status-register layout.
//!
//! The device driver is written against these descriptions rather than
//! against one hard-coded part, so a board that swaps the NOR chip only
//! has to supply a new table here.

/// Value read back from erased flash cells.
pub const ERASE_VALUE: u8 = 0xFF;

/// Address layout of a serial NOR part behind a memory-mapped controller.
///
/// Addresses handed to the driver are absolute AHB addresses inside the
/// mapped window; the driver subtracts [`FlashGeometry::base_address`]
/// before talking to the controller, which wants device offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FlashGeometry {
    /// First AHB address of the memory-mapped window.
    pub base_address: u32,
    /// Total device capacity in bytes.
    pub total_size: u32,
    /// Smallest erasable unit in bytes.
    pub sector_size: u32,
    /// Largest single program transfer in bytes.
    pub page_size: u32,
}

impl FlashGeometry {
    /// ISSI IS25WP064A, 64 Mbit quad NOR: 8 MiB in 4 KiB sectors with
    /// 256-byte program pages, mapped at the FlexSPI AMBA base.
    pub const IS25WP064A: Self = Self {
        base_address: 0x6000_0000,
        total_size: 8 * 1024 * 1024,
        sector_size: 4096,
        page_size: 256,
    };

    /// Whether `address` falls inside the mapped window.
    #[must_use]
    pub const fn contains(&self, address: u32) -> bool {
        let offset = address.wrapping_sub(self.base_address);
        address >= self.base_address && offset < self.total_size
    }

    /// Device offset for an absolute address, or `None` outside the window.
    #[must_use]
    pub const fn offset_of(&self, address: u32) -> Option<u32> {
        if self.contains(address) {
            Some(address.wrapping_sub(self.base_address))
        } else {
            None
        }
    }

    /// Sector size at an absolute address, or `None` outside the window.
    ///
    /// The parts supported here have uniform sectors, so any in-range
    /// address reports the same size.
    #[must_use]
    pub const fn sector_size_at(&self, address: u32) -> Option<u32> {
        if self.contains(address) {
            Some(self.sector_size)
        } else {
            None
        }
    }
}

/// Bit positions inside the part's status register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StatusLayout {
    /// Bit index of the write-in-progress flag.
    pub busy_offset: u8,
    /// Whether a set busy bit means the device is busy.
    ///
    /// Some vendors expose the inverse (a ready flag) at the same
    /// position, so the polarity rides along with the offset.
    pub busy_active_high: bool,
    /// Bit index of the quad-enable flag.
    pub quad_enable_offset: u8,
}

impl StatusLayout {
    /// IS25WP064A status register: WIP at bit 0 (set while busy), QE at
    /// bit 6.
    pub const IS25WP064A: Self = Self {
        busy_offset: 0,
        busy_active_high: true,
        quad_enable_offset: 6,
    };
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn window_bounds_are_half_open() {
        let geometry = FlashGeometry::IS25WP064A;
        assert!(geometry.contains(0x6000_0000));
        assert!(geometry.contains(0x607F_FFFF));
        assert!(!geometry.contains(0x6080_0000));
        assert!(!geometry.contains(0x5FFF_FFFF));
    }

    #[test]
    fn offsets_are_window_relative() {
        let geometry = FlashGeometry::IS25WP064A;
        assert_eq!(geometry.offset_of(0x6000_0000), Some(0));
        assert_eq!(geometry.offset_of(0x6000_1000), Some(0x1000));
        assert_eq!(geometry.offset_of(0x2000_0000), None);
    }

    #[test]
    fn sector_size_is_uniform_inside_the_window() {
        let geometry = FlashGeometry::IS25WP064A;
        assert_eq!(geometry.sector_size_at(0x6000_0000), Some(4096));
        assert_eq!(geometry.sector_size_at(0x607F_F000), Some(4096));
        assert_eq!(geometry.sector_size_at(0x6080_0000), None);
    }
}
