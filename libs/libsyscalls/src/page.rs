//! Ownership of pages exchanged with drivers
//!
//! A [`BufferPage`] is the only way to touch a buffer page. Handing it to a driver consumes
//! it and yields a [`LoanedPage`], which has no access to the memory at all. The page comes
//! back only through [`LoanedPage::reclaim`] with the driver's [`PageReturn`] notification,
//! so the previous owner cannot reach the page while the driver holds it.

use core::{
    fmt,
    ops::{Deref, DerefMut},
    slice,
};

use log::trace;
use syscalls::{page_address, page_number};

use super::{Error, Handle, PAGE_SIZE, Protection, SyscallResult, memory};

/// Exclusive access to one mapped page
#[derive(Debug)]
pub struct BufferPage {
    addr: usize,
}

impl BufferPage {
    /// Map a fresh page at `addr` (0 lets the kernel choose) and fault it in
    pub fn allocate(addr: usize) -> SyscallResult<Self> {
        let prot = Protection::READ | Protection::WRITE;
        let addr = memory::map_anon(prot, addr, PAGE_SIZE)?;
        memory::prefault(addr, prot)?;

        Ok(Self { addr })
    }

    /// # Safety
    ///
    /// `addr` must be a page-aligned, mapped, readable and writable page that nothing else references.
    pub unsafe fn from_address(addr: usize) -> Self {
        debug_assert_eq!(addr % PAGE_SIZE, 0);
        Self { addr }
    }

    pub fn address(&self) -> usize {
        self.addr
    }

    /// Page number, as carried in protocol messages
    pub fn number(&self) -> u64 {
        page_number(self.addr)
    }

    /// Hand the page to `holder`. Only the returned token remains.
    pub(crate) fn lend(self, holder: Handle) -> LoanedPage {
        trace!("page {:#x} lent to {:?}", self.number(), holder);
        LoanedPage {
            addr: self.addr,
            holder,
        }
    }
}

impl Deref for BufferPage {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        unsafe { slice::from_raw_parts(self.addr as *const u8, PAGE_SIZE) }
    }
}

impl DerefMut for BufferPage {
    fn deref_mut(&mut self) -> &mut [u8] {
        unsafe { slice::from_raw_parts_mut(self.addr as *mut u8, PAGE_SIZE) }
    }
}

/// A page currently owned by another party
///
/// Gives no access to the memory. The lent [`BufferPage`] is gone, so it cannot be touched
/// until reclaimed:
///
/// ```compile_fail
/// use libsyscalls::{Handle, ethernet, page::BufferPage};
///
/// fn transmit(eth: Handle, mut page: BufferPage) {
///     let _loan = ethernet::send_frame(eth, page, 64);
///     page[0] = 0xff;
/// }
/// ```
#[derive(Debug)]
#[must_use = "a lent page is lost unless reclaimed"]
pub struct LoanedPage {
    addr: usize,
    holder: Handle,
}

impl LoanedPage {
    pub fn number(&self) -> u64 {
        page_number(self.addr)
    }

    /// Handle the page was lent to
    pub fn holder(&self) -> Handle {
        self.holder
    }

    /// Take the page back, if `notice` is the holder giving back this very page
    pub fn reclaim(self, notice: &PageReturn) -> Result<BufferPage, LoanedPage> {
        if notice.from != self.holder || notice.page != self.number() {
            return Err(self);
        }

        trace!("page {:#x} returned by {:?}", notice.page, notice.from);
        Ok(BufferPage { addr: self.addr })
    }
}

/// Notification that a holder released a page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageReturn {
    /// Sender of the notification
    pub from: Handle,

    /// Page number
    pub page: u64,

    /// Bytes of meaningful data in the page
    pub length: usize,
}

impl PageReturn {
    /// Address of the returned page
    pub fn address(&self) -> usize {
        page_address(self.page)
    }
}

/// A transfer was refused by the kernel. The page never left.
#[derive(Debug)]
pub struct TransferError {
    pub error: Error,
    pub page: BufferPage,
}

impl fmt::Display for TransferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "page {:#x} not transferred: {}", self.page.number(), self.error)
    }
}

impl core::error::Error for TransferError {}

impl From<TransferError> for Error {
    fn from(value: TransferError) -> Self {
        value.error
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{self, Kernel};

    const DRIVER: Handle = Handle::from_raw(3);

    #[test]
    fn allocate_maps_and_faults_in() {
        mock::install(Kernel::new());

        let mut page = BufferPage::allocate(0).unwrap();
        assert_eq!(page.len(), PAGE_SIZE);
        assert_eq!(page_address(page.number()), page.address());

        page[..4].copy_from_slice(b"abcd");
        assert_eq!(&page[..4], b"abcd");
        assert_eq!(
            mock::with(|kernel| kernel.prefaults().to_vec()),
            [page.address()]
        );
    }

    #[test]
    fn reclaim_needs_matching_return() {
        mock::install(Kernel::new());

        let page = BufferPage::allocate(0).unwrap();
        let number = page.number();
        let loan = page.lend(DRIVER);
        assert_eq!(loan.holder(), DRIVER);

        let wrong_page = PageReturn {
            from: DRIVER,
            page: number + 1,
            length: 0,
        };
        let loan = loan.reclaim(&wrong_page).unwrap_err();

        let wrong_holder = PageReturn {
            from: Handle::from_raw(4),
            page: number,
            length: 0,
        };
        let loan = loan.reclaim(&wrong_holder).unwrap_err();

        let notice = PageReturn {
            from: DRIVER,
            page: number,
            length: 60,
        };
        let page = loan.reclaim(&notice).unwrap();
        assert_eq!(page.number(), number);
        assert_eq!(notice.address(), page.address());
    }

    #[test]
    fn transfer_error_converts() {
        mock::install(Kernel::new());

        let page = BufferPage::allocate(0).unwrap();
        let err = TransferError {
            error: Error::WouldBlock,
            page,
        };
        assert_eq!(Error::from(err), Error::WouldBlock);
    }
}
