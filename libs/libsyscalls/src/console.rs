use syscalls::console::ConsoleMessage;

use super::{Handle, Message, SyscallResult, ipc};

pub fn write_byte(console: Handle, byte: u8) -> SyscallResult<()> {
    ipc::send1(Message::send(ConsoleMessage::Write as u8), console, byte as u64)
}

pub fn write(console: Handle, bytes: &[u8]) -> SyscallResult<()> {
    for &byte in bytes {
        write_byte(console, byte)?;
    }

    Ok(())
}

/// Block until the console has an input byte
pub fn read_byte(console: Handle) -> SyscallResult<u8> {
    let mut arg = 0;
    ipc::call1(Message::call(ConsoleMessage::Read as u8), console, &mut arg)?;

    Ok(arg as u8)
}
