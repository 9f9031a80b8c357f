use bitflags::bitflags;

/// Size of a page, the granularity of every mapping
pub const PAGE_SIZE: usize = 0x1000;

pub const PAGE_SHIFT: u32 = 12;

/// Maximum end address of user mappings
#[cfg(target_pointer_width = "32")]
pub const USER_MAP_MAX: usize = usize::MAX;

/// Maximum end address of user mappings
#[cfg(target_pointer_width = "64")]
pub const USER_MAP_MAX: usize = 0x8000_0000_0000;

bitflags! {
    /// Mapping protection and backing flags
    #[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Clone, Copy)]
    pub struct Protection: u64 {
        /// No access
        const NONE = 0;

        /// Page can be executed
        const EXECUTE = 1 << 0;

        /// Page can be written
        const WRITE = 1 << 1;

        /// Page can be read
        const READ = 1 << 2;

        const RWX = Self::READ.bits() | Self::WRITE.bits() | Self::EXECUTE.bits();

        /// Fresh zeroed memory, not backed by the handle
        const ANON = 1 << 3;

        /// Physical memory
        const PHYS = 1 << 4;

        /// Physically contiguous anonymous memory, usable for device DMA
        const DMA = Self::PHYS.bits() | Self::ANON.bits();

        /// Disable caching on the mapping
        const NO_CACHE = 1 << 5;
    }
}

/// Page number of the page containing `addr`
pub const fn page_number(addr: usize) -> u64 {
    (addr >> PAGE_SHIFT) as u64
}

/// First address of the page `number`
pub const fn page_address(number: u64) -> usize {
    (number as usize) << PAGE_SHIFT
}

/// Round `size` up to a whole number of pages
pub const fn page_align_up(size: usize) -> usize {
    (size + PAGE_SIZE - 1) & !(PAGE_SIZE - 1)
}
