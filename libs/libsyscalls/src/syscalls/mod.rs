//! Kernel entry, one function per arity.
//!
//! Register layout (fixed by the kernel):
//!
//! | slot                         | register |
//! |------------------------------|----------|
//! | message word / return word   | rax      |
//! | destination / source handle  | rdi      |
//! | arg1                         | rsi      |
//! | arg2                         | rdx      |
//! | arg3                         | r8       |
//! | arg4 (raw 5 slot form only)  | r9       |
//!
//! r10, r11 and rcx are clobbered by every entry.
//!
//! - `syscallN`: N inputs, every argument register is clobbered and nothing but rax is returned.
//! - `ipcN`: generic IPC. Handle and N argument cells are in/out: they hold the request on entry
//!   and the reply (and its sender) on exit.
//! - `recvN`: receive. rax is 0 on entry, argument cells are outputs only, the handle cell is the
//!   source filter on entry and the sender on exit.

#[cfg(not(any(test, feature = "mock")))]
mod x86_64;

#[cfg(not(any(test, feature = "mock")))]
pub use x86_64::*;

#[cfg(any(test, feature = "mock"))]
mod simulated;

#[cfg(any(test, feature = "mock"))]
pub use simulated::*;

#[cfg(all(not(any(test, feature = "mock")), not(target_arch = "x86_64")))]
compile_error!("kernel entry is only implemented for x86_64, enable the `mock` feature elsewhere");
