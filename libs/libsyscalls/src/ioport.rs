//! Direct port I/O through the kernel backdoor

use super::{
    Builtin, Message, PortIoFlags, SyscallResult, syscalls::*, sysret_to_unit, sysret_to_value,
};

/// Raw access. `flags` selects direction and width, `data` is ignored on input.
///
/// Returns the value read (0 for output).
pub fn portio(port: u16, flags: PortIoFlags, data: u64) -> SyscallResult<u64> {
    let ret = unsafe {
        syscall3(
            Message::send(Builtin::PortIo.code()).as_raw(),
            port as u64,
            flags.bits(),
            data,
        )
    };

    sysret_to_value(ret).map(|value| value as u64)
}

pub fn inb(port: u16) -> SyscallResult<u8> {
    portio(port, PortIoFlags::BYTE, 0).map(|value| value as u8)
}

pub fn inw(port: u16) -> SyscallResult<u16> {
    portio(port, PortIoFlags::WORD, 0).map(|value| value as u16)
}

pub fn inl(port: u16) -> SyscallResult<u32> {
    portio(port, PortIoFlags::DWORD, 0).map(|value| value as u32)
}

pub fn outb(port: u16, value: u8) -> SyscallResult<()> {
    write(port, PortIoFlags::BYTE, value as u64)
}

pub fn outw(port: u16, value: u16) -> SyscallResult<()> {
    write(port, PortIoFlags::WORD, value as u64)
}

pub fn outl(port: u16, value: u32) -> SyscallResult<()> {
    write(port, PortIoFlags::DWORD, value as u64)
}

fn write(port: u16, width: PortIoFlags, value: u64) -> SyscallResult<()> {
    let ret = unsafe {
        syscall3(
            Message::send(Builtin::PortIo.code()).as_raw(),
            port as u64,
            (width | PortIoFlags::WRITE).bits(),
            value,
        )
    };

    sysret_to_unit(ret)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        Error,
        mock::{self, Kernel},
    };

    #[test]
    fn output_then_input() {
        mock::install(Kernel::new());

        outb(0x3f8, b'A').unwrap();
        outw(0x1f0, 0xbeef).unwrap();
        outl(0xcf8, 0x8000_0000).unwrap();

        assert_eq!(inb(0x3f8), Ok(b'A'));
        assert_eq!(inw(0x1f0), Ok(0xbeef));
        assert_eq!(inl(0xcf8), Ok(0x8000_0000));
        // Narrower reads see the low bits
        assert_eq!(inb(0x1f0), Ok(0xef));
    }

    #[test]
    fn slot_layout() {
        mock::install(Kernel::new());

        outb(0x60, 0xf4).unwrap();

        let entry = mock::with(|kernel| *kernel.last_entry().unwrap());
        assert_eq!(entry.message(), Message::send(Builtin::PortIo.code()));
        assert_eq!(entry.rdi, 0x60);
        assert_eq!(entry.rsi, (PortIoFlags::BYTE | PortIoFlags::WRITE).bits());
        assert_eq!(entry.rdx, 0xf4);
        assert_eq!(mock::with(|kernel| kernel.port(0x60)), Some(0xf4));
    }

    #[test]
    fn width_is_required() {
        mock::install(Kernel::new());

        assert_eq!(
            portio(0x60, PortIoFlags::WRITE, 1),
            Err(Error::InvalidArgument)
        );
    }
}
