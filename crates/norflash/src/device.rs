//! Driver for a serial NOR part behind a memory-mapped quad-SPI controller.
//!
//! Erase and program sequences switch the part out of array-read mode, so
//! any AHB fetch from the mapped window while one is in flight returns
//! garbage. Every sequence therefore runs inside a critical section, and
//! the caches are only invalidated once the part is back in read mode.
//! Callers executing code from this flash must keep their vector table and
//! the driver itself elsewhere.

use thiserror_no_std::Error;

use crate::geometry::{FlashGeometry, StatusLayout, ERASE_VALUE};

/// Command sequences the controller lookup table must provide.
///
/// The controller implementation owns the actual LUT encoding; the driver
/// only names which sequence a transfer uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LutSequence {
    /// Quad fast read, also used by the memory-mapped AHB path.
    ReadFast,
    /// Read the status register.
    ReadStatus,
    /// Set the write-enable latch.
    WriteEnable,
    /// Write the status register.
    WriteStatus,
    /// Erase one sector.
    EraseSector,
    /// Program one page.
    PageProgram,
}

/// Errors from flash operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FlashError<E> {
    /// The controller reported a transfer failure.
    #[error("flash controller error")]
    Controller(E),
    /// The address is outside the mapped flash window.
    #[error("address {address:#010x} is outside the flash window")]
    OutOfRange {
        /// Offending absolute address.
        address: u32,
    },
    /// The address is not aligned for the requested operation.
    #[error("address {address:#010x} is not aligned for this operation")]
    NotAligned {
        /// Offending absolute address.
        address: u32,
    },
    /// A program length that is not a whole number of pages.
    #[error("length {len} is not a whole number of program pages")]
    BadLength {
        /// Offending transfer length in bytes.
        len: usize,
    },
}

/// Controller seam the driver issues its sequences through.
///
/// Hardware implementations wrap the quad-SPI peripheral plus the core's
/// cache maintenance operations; tests substitute a recording mock.
pub trait FlexspiOps {
    /// Controller-level error for command and transfer failures.
    type Error: core::fmt::Debug;

    /// Apply controller settings (RX sample clock, AHB buffering) for this part.
    fn configure_controller(&mut self) -> Result<(), Self::Error>;

    /// Load the command lookup table that [`LutSequence`] values refer to.
    fn update_lut(&mut self) -> Result<(), Self::Error>;

    /// Reset the controller state machine and flush its AHB buffers.
    fn software_reset(&mut self);

    /// Whether the controller bus is idle.
    fn bus_idle(&mut self) -> bool;

    /// Issue a sequence with no data phase at `device_offset`.
    fn command(&mut self, sequence: LutSequence, device_offset: u32) -> Result<(), Self::Error>;

    /// Issue a read sequence at `device_offset` into `buf`.
    fn read_transfer(
        &mut self,
        sequence: LutSequence,
        device_offset: u32,
        buf: &mut [u8],
    ) -> Result<(), Self::Error>;

    /// Issue a write sequence at `device_offset` from `data`.
    fn write_transfer(
        &mut self,
        sequence: LutSequence,
        device_offset: u32,
        data: &[u8],
    ) -> Result<(), Self::Error>;

    /// Copy `buf.len()` bytes from the mapped window at `device_offset`.
    fn read_mapped(&mut self, device_offset: u32, buf: &mut [u8]);

    /// Whether the data cache is currently enabled.
    fn dcache_enabled(&self) -> bool;

    /// Turn the data cache on or off.
    fn set_dcache_enabled(&mut self, enabled: bool);

    /// Drop instruction-cache lines covering `len` bytes at `address`.
    fn invalidate_icache_range(&mut self, address: u32, len: u32);

    /// Drop data-cache lines covering `len` bytes at `address`.
    fn invalidate_dcache_range(&mut self, address: u32, len: u32);
}

/// Serial NOR driver over a [`FlexspiOps`] controller.
pub struct FlexspiNor<O: FlexspiOps> {
    ops: O,
    geometry: FlashGeometry,
    status: StatusLayout,
}

impl<O: FlexspiOps> FlexspiNor<O> {
    /// Wraps `ops` with the given part description.
    ///
    /// The driver is inert until [`setup`](Self::setup) has run once.
    #[must_use]
    pub const fn new(ops: O, geometry: FlashGeometry, status: StatusLayout) -> Self {
        Self {
            ops,
            geometry,
            status,
        }
    }

    /// One-time bring-up: controller configuration, LUT load, reset, and
    /// quad-enable.
    ///
    /// Runs with interrupts masked and the data cache off so nothing
    /// fetches from the window while the LUT is mid-update. The quad-enable
    /// bit is only written when the part does not already report it set,
    /// which keeps repeated bring-ups from burning status-register cycles.
    pub fn setup(&mut self) -> Result<(), FlashError<O::Error>> {
        critical_section::with(|_| {
            let dcache_was_enabled = self.ops.dcache_enabled();
            if dcache_was_enabled {
                self.ops.set_dcache_enabled(false);
            }
            let result = self.setup_locked();
            if dcache_was_enabled {
                self.ops.set_dcache_enabled(true);
            }
            result
        })
    }

    fn setup_locked(&mut self) -> Result<(), FlashError<O::Error>> {
        self.ops
            .configure_controller()
            .map_err(FlashError::Controller)?;
        self.ops.update_lut().map_err(FlashError::Controller)?;
        self.ops.software_reset();
        while !self.ops.bus_idle() {}
        self.ensure_quad_enabled()?;
        self.ops
            .invalidate_icache_range(self.geometry.base_address, self.geometry.total_size);
        Ok(())
    }

    /// Erases the sector containing `address`.
    ///
    /// `address` is absolute and must sit on a sector boundary.
    #[allow(clippy::arithmetic_side_effects)] // sector size is nonzero in every geometry table
    pub fn erase_sector(&mut self, address: u32) -> Result<(), FlashError<O::Error>> {
        let offset = self
            .geometry
            .offset_of(address)
            .ok_or(FlashError::OutOfRange { address })?;
        if offset % self.geometry.sector_size != 0 {
            return Err(FlashError::NotAligned { address });
        }
        critical_section::with(|_| {
            self.write_enable(offset)?;
            self.ops
                .command(LutSequence::EraseSector, offset)
                .map_err(FlashError::Controller)?;
            self.wait_while_busy()?;
            self.ops.software_reset();
            Ok(())
        })?;
        self.ops
            .invalidate_dcache_range(address, self.geometry.sector_size);
        Ok(())
    }

    /// Programs whole pages starting at `address`.
    ///
    /// `address` is absolute and must sit on a page boundary; `data` must
    /// be a non-empty whole number of pages. Each page gets its own
    /// write-enable and busy-wait, with a single controller reset once the
    /// last page has landed.
    #[allow(clippy::arithmetic_side_effects, clippy::cast_possible_truncation)] // page size is nonzero and fits usize; lengths were bounds-checked against the window
    pub fn program(&mut self, address: u32, data: &[u8]) -> Result<(), FlashError<O::Error>> {
        let offset = self.range_in_window(address, data.len())?;
        if offset % self.geometry.page_size != 0 {
            return Err(FlashError::NotAligned { address });
        }
        let page = self.geometry.page_size as usize;
        if data.is_empty() || data.len() % page != 0 {
            return Err(FlashError::BadLength { len: data.len() });
        }
        critical_section::with(|_| {
            let mut page_offset = offset;
            for chunk in data.chunks_exact(page) {
                self.write_enable(page_offset)?;
                self.ops
                    .write_transfer(LutSequence::PageProgram, page_offset, chunk)
                    .map_err(FlashError::Controller)?;
                self.wait_while_busy()?;
                page_offset = page_offset.saturating_add(self.geometry.page_size);
            }
            self.ops.software_reset();
            Ok(())
        })?;
        self.ops.invalidate_icache_range(address, data.len() as u32);
        self.ops.invalidate_dcache_range(address, data.len() as u32);
        Ok(())
    }

    /// Reads `buf.len()` bytes from the mapped window at `address`.
    pub fn read(&mut self, address: u32, buf: &mut [u8]) -> Result<(), FlashError<O::Error>> {
        let offset = self.range_in_window(address, buf.len())?;
        self.ops.read_mapped(offset, buf);
        Ok(())
    }

    /// Sector size at an absolute address, or `None` outside the window.
    #[must_use]
    pub const fn sector_size_at(&self, address: u32) -> Option<u32> {
        self.geometry.sector_size_at(address)
    }

    /// Program page size in bytes.
    #[must_use]
    pub const fn page_size(&self) -> u32 {
        self.geometry.page_size
    }

    /// First AHB address of the mapped window.
    #[must_use]
    pub const fn start_address(&self) -> u32 {
        self.geometry.base_address
    }

    /// Total device capacity in bytes.
    #[must_use]
    pub const fn total_size(&self) -> u32 {
        self.geometry.total_size
    }

    /// Value read back from erased cells.
    #[must_use]
    pub const fn erase_value(&self) -> u8 {
        ERASE_VALUE
    }

    /// Borrows the controller seam.
    #[must_use]
    pub fn ops(&self) -> &O {
        &self.ops
    }

    fn range_in_window(&self, address: u32, len: usize) -> Result<u32, FlashError<O::Error>> {
        let offset = self
            .geometry
            .offset_of(address)
            .ok_or(FlashError::OutOfRange { address })?;
        let end = u64::from(offset).saturating_add(len as u64);
        if end > u64::from(self.geometry.total_size) {
            return Err(FlashError::OutOfRange { address });
        }
        Ok(offset)
    }

    fn write_enable(&mut self, device_offset: u32) -> Result<(), FlashError<O::Error>> {
        self.ops
            .command(LutSequence::WriteEnable, device_offset)
            .map_err(FlashError::Controller)
    }

    fn read_status(&mut self) -> Result<u8, FlashError<O::Error>> {
        let mut status = [0_u8; 1];
        self.ops
            .read_transfer(LutSequence::ReadStatus, 0, &mut status)
            .map_err(FlashError::Controller)?;
        let [byte] = status;
        Ok(byte)
    }

    #[allow(clippy::arithmetic_side_effects)] // status bit offsets are below 8 in every layout table
    fn is_busy(&mut self) -> Result<bool, FlashError<O::Error>> {
        let status = self.read_status()?;
        let flag = (status >> self.status.busy_offset) & 1 == 1;
        Ok(flag == self.status.busy_active_high)
    }

    fn wait_while_busy(&mut self) -> Result<(), FlashError<O::Error>> {
        while self.is_busy()? {}
        Ok(())
    }

    #[allow(clippy::arithmetic_side_effects)] // status bit offsets are below 8 in every layout table
    fn ensure_quad_enabled(&mut self) -> Result<(), FlashError<O::Error>> {
        let status = self.read_status()?;
        if (status >> self.status.quad_enable_offset) & 1 == 1 {
            return Ok(());
        }
        self.write_enable(0)?;
        let value = 1_u8 << self.status.quad_enable_offset;
        self.ops
            .write_transfer(LutSequence::WriteStatus, 0, &[value])
            .map_err(FlashError::Controller)?;
        self.wait_while_busy()
    }
}

// ─── embedded-storage traits ─────────────────────────────────────────────────
//
// Offsets in this surface are window-relative, per the trait contract. The
// associated size constants describe the IS25WP064A layout, the only part
// currently shipped; a second part with different sizes would need its own
// newtype here.

use embedded_storage::nor_flash::{
    ErrorType, NorFlash, NorFlashError, NorFlashErrorKind, ReadNorFlash,
};

impl<E: core::fmt::Debug> NorFlashError for FlashError<E> {
    fn kind(&self) -> NorFlashErrorKind {
        match self {
            Self::OutOfRange { .. } => NorFlashErrorKind::OutOfBounds,
            Self::NotAligned { .. } | Self::BadLength { .. } => NorFlashErrorKind::NotAligned,
            Self::Controller(_) => NorFlashErrorKind::Other,
        }
    }
}

impl<O: FlexspiOps> ErrorType for FlexspiNor<O> {
    type Error = FlashError<O::Error>;
}

impl<O: FlexspiOps> ReadNorFlash for FlexspiNor<O> {
    const READ_SIZE: usize = 1;

    fn read(&mut self, offset: u32, bytes: &mut [u8]) -> Result<(), Self::Error> {
        FlexspiNor::read(self, self.geometry.base_address.wrapping_add(offset), bytes)
    }

    #[allow(clippy::cast_possible_truncation)] // capacity fits usize on supported targets
    fn capacity(&self) -> usize {
        self.geometry.total_size as usize
    }
}

impl<O: FlexspiOps> NorFlash for FlexspiNor<O> {
    const WRITE_SIZE: usize = 256;
    const ERASE_SIZE: usize = 4096;

    #[allow(clippy::arithmetic_side_effects)] // sector size is nonzero in every geometry table
    fn erase(&mut self, from: u32, to: u32) -> Result<(), Self::Error> {
        let sector = self.geometry.sector_size;
        if from % sector != 0 {
            return Err(FlashError::NotAligned {
                address: self.geometry.base_address.wrapping_add(from),
            });
        }
        if to % sector != 0 {
            return Err(FlashError::NotAligned {
                address: self.geometry.base_address.wrapping_add(to),
            });
        }
        if from > to || to > self.geometry.total_size {
            return Err(FlashError::OutOfRange {
                address: self.geometry.base_address.wrapping_add(to),
            });
        }
        let mut offset = from;
        while offset < to {
            self.erase_sector(self.geometry.base_address.wrapping_add(offset))?;
            offset = offset.saturating_add(sector);
        }
        Ok(())
    }

    fn write(&mut self, offset: u32, bytes: &[u8]) -> Result<(), Self::Error> {
        self.program(self.geometry.base_address.wrapping_add(offset), bytes)
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::arithmetic_side_effects,
    clippy::indexing_slicing,
    clippy::cast_possible_truncation
)]
mod tests {
    use std::collections::VecDeque;

    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Op {
        Configure,
        UpdateLut,
        SoftwareReset,
        Command(LutSequence, u32),
        ReadTransfer(LutSequence, u32),
        WriteTransfer(LutSequence, u32, Vec<u8>),
        ReadMapped(u32, usize),
        DcacheOff,
        DcacheOn,
        InvalidateIcache(u32, u32),
        InvalidateDcache(u32, u32),
    }

    /// Records every controller call in order; status reads pop from a
    /// script and fall back to "idle, quad disabled".
    #[derive(Debug, Default)]
    struct MockFlexspi {
        ops: Vec<Op>,
        status_script: VecDeque<u8>,
        dcache_enabled: bool,
        fail_configure: bool,
    }

    impl MockFlexspi {
        fn with_dcache() -> Self {
            Self {
                dcache_enabled: true,
                ..Self::default()
            }
        }

        fn status_reads(&self) -> usize {
            self.ops
                .iter()
                .filter(|op| matches!(op, Op::ReadTransfer(LutSequence::ReadStatus, _)))
                .count()
        }
    }

    impl FlexspiOps for MockFlexspi {
        type Error = &'static str;

        fn configure_controller(&mut self) -> Result<(), Self::Error> {
            self.ops.push(Op::Configure);
            if self.fail_configure {
                return Err("configure refused");
            }
            Ok(())
        }

        fn update_lut(&mut self) -> Result<(), Self::Error> {
            self.ops.push(Op::UpdateLut);
            Ok(())
        }

        fn software_reset(&mut self) {
            self.ops.push(Op::SoftwareReset);
        }

        fn bus_idle(&mut self) -> bool {
            true
        }

        fn command(&mut self, sequence: LutSequence, device_offset: u32) -> Result<(), Self::Error> {
            self.ops.push(Op::Command(sequence, device_offset));
            Ok(())
        }

        fn read_transfer(
            &mut self,
            sequence: LutSequence,
            device_offset: u32,
            buf: &mut [u8],
        ) -> Result<(), Self::Error> {
            self.ops.push(Op::ReadTransfer(sequence, device_offset));
            if sequence == LutSequence::ReadStatus {
                let status = self.status_script.pop_front().unwrap_or(0);
                if let Some(slot) = buf.first_mut() {
                    *slot = status;
                }
            }
            Ok(())
        }

        fn write_transfer(
            &mut self,
            sequence: LutSequence,
            device_offset: u32,
            data: &[u8],
        ) -> Result<(), Self::Error> {
            self.ops
                .push(Op::WriteTransfer(sequence, device_offset, data.to_vec()));
            Ok(())
        }

        fn read_mapped(&mut self, device_offset: u32, buf: &mut [u8]) {
            self.ops.push(Op::ReadMapped(device_offset, buf.len()));
            buf.fill(0xA5);
        }

        fn dcache_enabled(&self) -> bool {
            self.dcache_enabled
        }

        fn set_dcache_enabled(&mut self, enabled: bool) {
            self.dcache_enabled = enabled;
            self.ops
                .push(if enabled { Op::DcacheOn } else { Op::DcacheOff });
        }

        fn invalidate_icache_range(&mut self, address: u32, len: u32) {
            self.ops.push(Op::InvalidateIcache(address, len));
        }

        fn invalidate_dcache_range(&mut self, address: u32, len: u32) {
            self.ops.push(Op::InvalidateDcache(address, len));
        }
    }

    fn device(mock: MockFlexspi) -> FlexspiNor<MockFlexspi> {
        FlexspiNor::new(mock, FlashGeometry::IS25WP064A, StatusLayout::IS25WP064A)
    }

    // ── Setup ──

    #[test]
    fn setup_runs_the_documented_sequence() {
        let mut dev = device(MockFlexspi::with_dcache());
        dev.setup().unwrap();

        assert_eq!(
            dev.ops().ops,
            vec![
                Op::DcacheOff,
                Op::Configure,
                Op::UpdateLut,
                Op::SoftwareReset,
                // Quad-enable: status comes back 0x00, so the bit gets set
                // and the write is polled to completion.
                Op::ReadTransfer(LutSequence::ReadStatus, 0),
                Op::Command(LutSequence::WriteEnable, 0),
                Op::WriteTransfer(LutSequence::WriteStatus, 0, vec![0x40]),
                Op::ReadTransfer(LutSequence::ReadStatus, 0),
                Op::InvalidateIcache(0x6000_0000, 8 * 1024 * 1024),
                Op::DcacheOn,
            ]
        );
    }

    #[test]
    fn setup_skips_quad_enable_when_already_set() {
        let mut mock = MockFlexspi::default();
        mock.status_script.push_back(0x40);
        let mut dev = device(mock);
        dev.setup().unwrap();

        assert!(!dev
            .ops()
            .ops
            .iter()
            .any(|op| matches!(op, Op::WriteTransfer(LutSequence::WriteStatus, _, _))));
    }

    #[test]
    fn setup_leaves_a_disabled_dcache_alone() {
        let mut dev = device(MockFlexspi::default());
        dev.setup().unwrap();

        assert!(!dev
            .ops()
            .ops
            .iter()
            .any(|op| matches!(op, Op::DcacheOff | Op::DcacheOn)));
    }

    #[test]
    fn setup_restores_the_dcache_after_a_failure() {
        let mut mock = MockFlexspi::with_dcache();
        mock.fail_configure = true;
        let mut dev = device(mock);

        assert_eq!(dev.setup(), Err(FlashError::Controller("configure refused")));
        assert_eq!(
            dev.ops().ops,
            vec![Op::DcacheOff, Op::Configure, Op::DcacheOn]
        );
    }

    // ── Erase ──

    #[test]
    fn erase_sector_orders_enable_command_wait_reset() {
        let mut dev = device(MockFlexspi::default());
        dev.erase_sector(0x6000_1000).unwrap();

        assert_eq!(
            dev.ops().ops,
            vec![
                Op::Command(LutSequence::WriteEnable, 0x1000),
                Op::Command(LutSequence::EraseSector, 0x1000),
                Op::ReadTransfer(LutSequence::ReadStatus, 0),
                Op::SoftwareReset,
                Op::InvalidateDcache(0x6000_1000, 4096),
            ]
        );
    }

    #[test]
    fn erase_polls_until_the_part_reports_ready() {
        let mut mock = MockFlexspi::default();
        mock.status_script.extend([0x01, 0x01, 0x00]);
        let mut dev = device(mock);
        dev.erase_sector(0x6000_0000).unwrap();

        assert_eq!(dev.ops().status_reads(), 3);
    }

    #[test]
    fn erase_rejects_unaligned_and_out_of_window_addresses() {
        let mut dev = device(MockFlexspi::default());

        assert_eq!(
            dev.erase_sector(0x6000_0004),
            Err(FlashError::NotAligned {
                address: 0x6000_0004
            })
        );
        assert_eq!(
            dev.erase_sector(0x2000_0000),
            Err(FlashError::OutOfRange {
                address: 0x2000_0000
            })
        );
        assert!(dev.ops().ops.is_empty());
    }

    // ── Program ──

    #[test]
    fn program_splits_the_transfer_into_pages() {
        let data: Vec<u8> = (0..512).map(|i| i as u8).collect();
        let mut dev = device(MockFlexspi::default());
        dev.program(0x6000_2000, &data).unwrap();

        assert_eq!(
            dev.ops().ops,
            vec![
                Op::Command(LutSequence::WriteEnable, 0x2000),
                Op::WriteTransfer(LutSequence::PageProgram, 0x2000, data[..256].to_vec()),
                Op::ReadTransfer(LutSequence::ReadStatus, 0),
                Op::Command(LutSequence::WriteEnable, 0x2100),
                Op::WriteTransfer(LutSequence::PageProgram, 0x2100, data[256..].to_vec()),
                Op::ReadTransfer(LutSequence::ReadStatus, 0),
                Op::SoftwareReset,
                Op::InvalidateIcache(0x6000_2000, 512),
                Op::InvalidateDcache(0x6000_2000, 512),
            ]
        );
    }

    #[test]
    fn program_rejects_bad_addresses_and_lengths() {
        let page = [0_u8; 256];
        let mut dev = device(MockFlexspi::default());

        assert_eq!(
            dev.program(0x6000_0080, &page),
            Err(FlashError::NotAligned {
                address: 0x6000_0080
            })
        );
        assert_eq!(
            dev.program(0x6000_0000, &page[..100]),
            Err(FlashError::BadLength { len: 100 })
        );
        assert_eq!(
            dev.program(0x6000_0000, &[]),
            Err(FlashError::BadLength { len: 0 })
        );
        assert_eq!(
            dev.program(0x607F_FF00, &[0_u8; 512]),
            Err(FlashError::OutOfRange {
                address: 0x607F_FF00
            })
        );
        assert!(dev.ops().ops.is_empty());
    }

    // ── Read and getters ──

    #[test]
    fn read_goes_through_the_mapped_window() {
        let mut buf = [0_u8; 16];
        let mut dev = device(MockFlexspi::default());
        dev.read(0x6000_0100, &mut buf).unwrap();

        assert_eq!(dev.ops().ops, vec![Op::ReadMapped(0x100, 16)]);
        assert_eq!(buf, [0xA5; 16]);
    }

    #[test]
    fn read_rejects_a_range_leaving_the_window() {
        let mut buf = [0_u8; 32];
        let mut dev = device(MockFlexspi::default());

        assert_eq!(
            dev.read(0x607F_FFF0, &mut buf),
            Err(FlashError::OutOfRange {
                address: 0x607F_FFF0
            })
        );
        assert!(dev.ops().ops.is_empty());
    }

    #[test]
    fn getters_describe_the_part() {
        let dev = device(MockFlexspi::default());

        assert_eq!(dev.start_address(), 0x6000_0000);
        assert_eq!(dev.total_size(), 8 * 1024 * 1024);
        assert_eq!(dev.page_size(), 256);
        assert_eq!(dev.erase_value(), 0xFF);
        assert_eq!(dev.sector_size_at(0x6000_8000), Some(4096));
        assert_eq!(dev.sector_size_at(0x7000_0000), None);
    }

    // ── embedded-storage surface ──

    #[test]
    fn storage_erase_walks_whole_sectors() {
        let mut dev = device(MockFlexspi::default());
        NorFlash::erase(&mut dev, 0x1000, 0x4000).unwrap();

        let erases: Vec<u32> = dev
            .ops()
            .ops
            .iter()
            .filter_map(|op| match op {
                Op::Command(LutSequence::EraseSector, offset) => Some(*offset),
                _ => None,
            })
            .collect();
        assert_eq!(erases, vec![0x1000, 0x2000, 0x3000]);
    }

    #[test]
    fn storage_erase_rejects_unaligned_bounds() {
        let mut dev = device(MockFlexspi::default());

        assert!(matches!(
            NorFlash::erase(&mut dev, 0x800, 0x1000),
            Err(FlashError::NotAligned { .. })
        ));
        assert!(matches!(
            NorFlash::erase(&mut dev, 0x1000, 0x1800),
            Err(FlashError::NotAligned { .. })
        ));
        assert!(matches!(
            NorFlash::erase(&mut dev, 0x1000, 0x0090_0000),
            Err(FlashError::OutOfRange { .. })
        ));
    }

    #[test]
    fn storage_write_and_read_are_window_relative() {
        let page = [0x5A_u8; 256];
        let mut buf = [0_u8; 8];
        let mut dev = device(MockFlexspi::default());

        NorFlash::write(&mut dev, 0x100, &page).unwrap();
        ReadNorFlash::read(&mut dev, 0x40, &mut buf).unwrap();

        assert!(dev
            .ops()
            .ops
            .contains(&Op::WriteTransfer(LutSequence::PageProgram, 0x100, page.to_vec())));
        assert!(dev.ops().ops.contains(&Op::ReadMapped(0x40, 8)));
        assert_eq!(ReadNorFlash::capacity(&dev), 8 * 1024 * 1024);
    }

    #[test]
    fn storage_error_kinds_match_the_failure() {
        let out_of_range: FlashError<&str> = FlashError::OutOfRange { address: 0 };
        let not_aligned: FlashError<&str> = FlashError::NotAligned { address: 1 };
        let bad_length: FlashError<&str> = FlashError::BadLength { len: 3 };
        let controller: FlashError<&str> = FlashError::Controller("bus fault");

        assert_eq!(out_of_range.kind(), NorFlashErrorKind::OutOfBounds);
        assert_eq!(not_aligned.kind(), NorFlashErrorKind::NotAligned);
        assert_eq!(bad_length.kind(), NorFlashErrorKind::NotAligned);
        assert_eq!(controller.kind(), NorFlashErrorKind::Other);
    }
}
