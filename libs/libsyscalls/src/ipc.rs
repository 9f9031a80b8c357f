//! Synchronous IPC operations
//!
//! - `sendN`: forces kind Send, arguments by value, any reply data is discarded.
//! - `recvN`: blocks until a message is available. `src` is the source filter on entry
//!   ([`Handle::NONE`] accepts anyone) and the sender on return. Arguments are outputs only.
//! - `callN`: forces kind Call, blocks until `dest` replies. Arguments hold the request on entry
//!   and the reply on return.
//! - `ipcN`: generic form, the kind is taken as given.
//!
//! There is no timeout: a call to a peer that never replies blocks forever.

use super::{
    Error, Handle, Message, MessageKind, SyscallResult,
    syscalls::{self, syscall1, syscall2, syscall3, syscall4},
    sysret_to_result, sysret_to_unit,
};

pub fn send0(msg: Message, dest: Handle) -> SyscallResult<()> {
    let msg = msg.with_kind(MessageKind::Send);
    let ret = unsafe { syscall1(msg.as_raw(), dest.as_syscall_value()) };

    sysret_to_unit(ret)
}

pub fn send1(msg: Message, dest: Handle, arg1: u64) -> SyscallResult<()> {
    let msg = msg.with_kind(MessageKind::Send);
    let ret = unsafe { syscall2(msg.as_raw(), dest.as_syscall_value(), arg1) };

    sysret_to_unit(ret)
}

pub fn send2(msg: Message, dest: Handle, arg1: u64, arg2: u64) -> SyscallResult<()> {
    let msg = msg.with_kind(MessageKind::Send);
    let ret = unsafe { syscall3(msg.as_raw(), dest.as_syscall_value(), arg1, arg2) };

    sysret_to_unit(ret)
}

pub fn send3(msg: Message, dest: Handle, arg1: u64, arg2: u64, arg3: u64) -> SyscallResult<()> {
    let msg = msg.with_kind(MessageKind::Send);
    let ret = unsafe { syscall4(msg.as_raw(), dest.as_syscall_value(), arg1, arg2, arg3) };

    sysret_to_unit(ret)
}

pub fn recv0(src: &mut Handle) -> SyscallResult<Message> {
    let mut raw_src = src.as_syscall_value();
    let ret = unsafe { syscalls::recv0(&mut raw_src) };

    let msg = sysret_to_result(ret)?;
    *src = Handle::from_raw(raw_src as usize);
    Ok(msg)
}

pub fn recv1(src: &mut Handle, arg1: &mut u64) -> SyscallResult<Message> {
    let mut raw_src = src.as_syscall_value();
    let ret = unsafe { syscalls::recv1(&mut raw_src, arg1) };

    let msg = sysret_to_result(ret)?;
    *src = Handle::from_raw(raw_src as usize);
    Ok(msg)
}

pub fn recv2(src: &mut Handle, arg1: &mut u64, arg2: &mut u64) -> SyscallResult<Message> {
    let mut raw_src = src.as_syscall_value();
    let ret = unsafe { syscalls::recv2(&mut raw_src, arg1, arg2) };

    let msg = sysret_to_result(ret)?;
    *src = Handle::from_raw(raw_src as usize);
    Ok(msg)
}

pub fn recv3(
    src: &mut Handle,
    arg1: &mut u64,
    arg2: &mut u64,
    arg3: &mut u64,
) -> SyscallResult<Message> {
    let mut raw_src = src.as_syscall_value();
    let ret = unsafe { syscalls::recv3(&mut raw_src, arg1, arg2, arg3) };

    let msg = sysret_to_result(ret)?;
    *src = Handle::from_raw(raw_src as usize);
    Ok(msg)
}

pub fn call0(msg: Message, dest: Handle) -> SyscallResult<Message> {
    let msg = msg.with_kind(MessageKind::Call);
    let ret = unsafe { syscall1(msg.as_raw(), dest.as_syscall_value()) };

    sysret_to_result(ret)
}

pub fn call1(msg: Message, dest: Handle, arg1: &mut u64) -> SyscallResult<Message> {
    let mut dest = dest;
    ipc1(msg.with_kind(MessageKind::Call), &mut dest, arg1)
}

pub fn call2(msg: Message, dest: Handle, arg1: &mut u64, arg2: &mut u64) -> SyscallResult<Message> {
    let mut dest = dest;
    ipc2(msg.with_kind(MessageKind::Call), &mut dest, arg1, arg2)
}

pub fn call3(
    msg: Message,
    dest: Handle,
    arg1: &mut u64,
    arg2: &mut u64,
    arg3: &mut u64,
) -> SyscallResult<Message> {
    let mut dest = dest;
    ipc3(msg.with_kind(MessageKind::Call), &mut dest, arg1, arg2, arg3)
}

/// The reserved kind has no meaning yet, it never reaches the kernel
fn check_kind(msg: Message) -> SyscallResult<()> {
    match msg.kind() {
        MessageKind::Reserved => Err(Error::InvalidArgument),
        MessageKind::Send | MessageKind::Call => Ok(()),
    }
}

pub fn ipc1(msg: Message, dest_src: &mut Handle, arg1: &mut u64) -> SyscallResult<Message> {
    check_kind(msg)?;

    let mut raw = dest_src.as_syscall_value();
    let ret = unsafe { syscalls::ipc1(msg.as_raw(), &mut raw, arg1) };

    let reply = sysret_to_result(ret)?;
    *dest_src = Handle::from_raw(raw as usize);
    Ok(reply)
}

pub fn ipc2(
    msg: Message,
    dest_src: &mut Handle,
    arg1: &mut u64,
    arg2: &mut u64,
) -> SyscallResult<Message> {
    check_kind(msg)?;

    let mut raw = dest_src.as_syscall_value();
    let ret = unsafe { syscalls::ipc2(msg.as_raw(), &mut raw, arg1, arg2) };

    let reply = sysret_to_result(ret)?;
    *dest_src = Handle::from_raw(raw as usize);
    Ok(reply)
}

pub fn ipc3(
    msg: Message,
    dest_src: &mut Handle,
    arg1: &mut u64,
    arg2: &mut u64,
    arg3: &mut u64,
) -> SyscallResult<Message> {
    check_kind(msg)?;

    let mut raw = dest_src.as_syscall_value();
    let ret = unsafe { syscalls::ipc3(msg.as_raw(), &mut raw, arg1, arg2, arg3) };

    let reply = sysret_to_result(ret)?;
    *dest_src = Handle::from_raw(raw as usize);
    Ok(reply)
}
