use log::debug;

use super::{
    Builtin, Error, Handle, Message, PAGE_SIZE, Protection, SyscallResult, syscalls::*,
    sysret_to_address, sysret_to_unit,
};

/// Map `size` bytes of the object named by `handle` at `addr`, without any adjustment.
///
/// With `handle` == [`Handle::NONE`], [`Protection::ANON`] gives fresh memory and
/// [`Protection::DMA`] gives physical memory usable by devices.
///
/// Returns the address of the mapping. The kernel rejects mappings ending past [`USER_MAP_MAX`](super::USER_MAP_MAX).
pub fn map_raw(
    handle: Handle,
    prot: Protection,
    addr: usize,
    offset: u64,
    size: usize,
) -> SyscallResult<usize> {
    let ret = unsafe {
        syscall5(
            Message::send(Builtin::Map.code()).as_raw(),
            handle.as_syscall_value(),
            prot.bits(),
            addr as u64,
            offset,
            size as u64,
        )
    };

    sysret_to_address(ret)
}

/// Map the object named by `handle` (or anonymous memory) at `addr`.
///
/// Mappings are at least one page long.
pub fn map(
    handle: Handle,
    prot: Protection,
    addr: usize,
    offset: u64,
    size: usize,
) -> SyscallResult<usize> {
    let size = size.max(PAGE_SIZE);
    map_raw(handle, prot, addr, offset, size)
}

/// Map fresh zeroed memory. Nothing is mapped when `size` is 0.
pub fn map_anon(prot: Protection, addr: usize, size: usize) -> SyscallResult<usize> {
    if size == 0 {
        return Ok(addr);
    }

    map(Handle::NONE, prot | Protection::ANON, addr, 0, size)
}

/// Map memory suitable for device DMA.
///
/// Returns the physical address.
pub fn map_dma(prot: Protection, addr: usize, size: usize) -> SyscallResult<usize> {
    if size == 0 {
        return Err(Error::InvalidArgument);
    }

    let phys = map_raw(Handle::NONE, prot | Protection::DMA, addr, 0, size)?;
    debug!("dma: {:#x} bytes at {:#x} -> phys {:#x}", size, addr, phys);
    Ok(phys)
}

/// Fault in the mapping at `addr` now instead of on first access
pub fn prefault(addr: usize, prot: Protection) -> SyscallResult<()> {
    let ret = unsafe {
        syscall3(
            Message::send(Builtin::PageFault.code()).as_raw(),
            0,
            addr as u64,
            prot.bits(),
        )
    };

    sysret_to_unit(ret)
}

/// Share the mapping at `addr` with `recipient`, with the given protection
pub fn grant(recipient: Handle, addr: usize, prot: Protection) -> SyscallResult<()> {
    let ret = unsafe {
        syscall3(
            Message::send(Builtin::Grant.code()).as_raw(),
            recipient.as_syscall_value(),
            addr as u64,
            prot.bits(),
        )
    };

    sysret_to_unit(ret)
}
