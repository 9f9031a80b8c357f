#![cfg_attr(not(any(test, feature = "mock")), no_std)]

pub mod console;
pub mod ethernet;
pub mod framebuffer;
pub mod handle;
pub mod ioport;
pub mod ipc;
pub mod irq;
pub mod logging;
pub mod memory;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod page;
mod syscalls;
pub mod timer;

pub use handle::Handle;

pub use ::syscalls::{
    Builtin, Error, Message, MessageKind, PAGE_SIZE, PortIoFlags, Protection, SyscallResult,
    USER_MAP_MAX, sysret_to_result,
};

/// For operations returning a value (address, port data) instead of a message
fn sysret_to_value(sysret: isize) -> SyscallResult<usize> {
    match Error::from_raw(sysret) {
        None => Ok(sysret as usize),
        Some(err) => Err(err),
    }
}

/// For operations returning a mapped address
fn sysret_to_address(sysret: isize) -> SyscallResult<usize> {
    address_or_error(sysret, USER_MAP_MAX > isize::MAX as usize)
}

/// With `signed_addresses`, user addresses may have the sign bit set (32-bit pointers). Mappings
/// are page aligned and error words are not, which tells them apart.
fn address_or_error(sysret: isize, signed_addresses: bool) -> SyscallResult<usize> {
    if signed_addresses && sysret < 0 && sysret.rem_euclid(PAGE_SIZE as isize) == 0 {
        return Ok(sysret as usize);
    }

    sysret_to_value(sysret)
}

/// For operations returning a disposition only
fn sysret_to_unit(sysret: isize) -> SyscallResult<()> {
    sysret_to_value(sysret).map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn addresses_with_sign_bit() {
        let high = -(1isize << 31);
        assert_eq!(address_or_error(high, true), Ok(high as usize));
        assert_eq!(address_or_error(high, false), Err(Error::Unknown(high)));
        assert_eq!(address_or_error(-4, true), Err(Error::InvalidArgument));
        assert_eq!(address_or_error(0x5000, true), Ok(0x5000));
    }

    #[cfg(target_pointer_width = "64")]
    #[test]
    fn user_addresses_never_negative_on_64bit() {
        assert_eq!(sysret_to_address(-4096), Err(Error::Unknown(-4096)));
    }
}
