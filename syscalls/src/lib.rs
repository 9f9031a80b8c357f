#![no_std]

pub mod console;
mod error;
pub mod ethernet;
pub mod framebuffer;
mod ioport;
pub mod irq;
mod memory;
mod message;
pub mod timer;

pub use error::*;
pub use ioport::*;
pub use memory::*;
pub use message::*;

/// Message codes handled by the kernel itself
///
/// Codes below [`Builtin::USER`] are reserved, every driver protocol numbers its messages from there.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Builtin {
    /// No message. As a request code, it means "receive".
    None = 0,
    Map,
    PageFault,
    Unmap,
    HandleModify,

    /// Kernel debug output, one byte per entry
    Write = 6,

    /// Direct I/O port access (backdoor)
    ///
    /// - arg1 (dest slot) = port
    /// - arg2 = [`PortIoFlags`]
    /// - arg3 = data for output
    PortIo = 7,
    Grant = 8,
    Pulse = 9,
}

impl Builtin {
    /// Receive uses the "no message" code
    pub const RECV: Self = Self::None;

    /// First code available to user protocols
    pub const USER: u8 = 16;

    /// Decode a builtin from a message code
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::None),
            1 => Some(Self::Map),
            2 => Some(Self::PageFault),
            3 => Some(Self::Unmap),
            4 => Some(Self::HandleModify),
            6 => Some(Self::Write),
            7 => Some(Self::PortIo),
            8 => Some(Self::Grant),
            9 => Some(Self::Pulse),
            _ => None,
        }
    }

    pub const fn code(self) -> u8 {
        self as u8
    }
}
