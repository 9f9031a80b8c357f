use log::trace;

use super::{Builtin, Message, SyscallResult, syscalls::*, sysret_to_unit};

/// Handle: process-local name of a kernel object
///
/// The value is opaque and passed through unchanged. Handles are not closed on drop, their
/// lifecycle goes through [`modify`] explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(transparent)]
pub struct Handle(usize);

impl Handle {
    /// No object. As a receive filter, it means "from anyone". As a [`modify`] target, it means "delete".
    pub const NONE: Self = Handle(0);

    pub const fn from_raw(value: usize) -> Self {
        Handle(value)
    }

    pub const fn as_raw(self) -> usize {
        self.0
    }

    /// Indicate is the handle names something
    pub const fn valid(self) -> bool {
        self.0 != 0
    }

    /// Reserved for syscalls implementations
    pub(crate) const fn as_syscall_value(self) -> u64 {
        self.0 as u64
    }
}

/// What a [`modify`] call does, exactly one per call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandleOp {
    /// `rename_to == handle`, `copy_to == 0`
    NoOp,

    /// `rename_to == 0`, `copy_to == 0`
    Delete,

    /// `rename_to` is neither 0 nor `handle`, `copy_to == 0`
    Rename,

    /// `copy_to != 0`
    Copy,
}

impl HandleOp {
    pub const fn classify(handle: Handle, rename_to: Handle, copy_to: Handle) -> Self {
        if copy_to.valid() {
            Self::Copy
        } else if !rename_to.valid() {
            Self::Delete
        } else if rename_to.0 == handle.0 {
            Self::NoOp
        } else {
            Self::Rename
        }
    }
}

/// Rename, copy or delete a handle. All of them are one kernel message.
pub fn modify(handle: Handle, rename_to: Handle, copy_to: Handle) -> SyscallResult<()> {
    trace!(
        "handle {:?}: {:?}",
        handle,
        HandleOp::classify(handle, rename_to, copy_to)
    );

    let ret = unsafe {
        syscall3(
            Message::send(Builtin::HandleModify.code()).as_raw(),
            handle.as_syscall_value(),
            rename_to.as_syscall_value(),
            copy_to.as_syscall_value(),
        )
    };

    sysret_to_unit(ret)
}

pub fn delete(handle: Handle) -> SyscallResult<()> {
    modify(handle, Handle::NONE, Handle::NONE)
}

pub fn rename(handle: Handle, rename_to: Handle) -> SyscallResult<()> {
    modify(handle, rename_to, Handle::NONE)
}

/// Make `copy_to` name the same object as `handle`
pub fn copy(handle: Handle, copy_to: Handle) -> SyscallResult<()> {
    modify(handle, handle, copy_to)
}

/// Asynchronous notification. `mask` is agreed between sender and receiver.
pub fn pulse(handle: Handle, mask: u64) -> SyscallResult<()> {
    let ret = unsafe {
        syscall2(
            Message::send(Builtin::Pulse.code()).as_raw(),
            handle.as_syscall_value(),
            mask,
        )
    };

    sysret_to_unit(ret)
}
