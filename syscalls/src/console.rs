//! Console protocol

use crate::Builtin;

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConsoleMessage {
    /// Send. arg1: byte to print
    Write = Builtin::USER,

    /// Call. Reply arg1: next input byte
    Read,
}

impl ConsoleMessage {
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            16 => Some(Self::Write),
            17 => Some(Self::Read),
            _ => None,
        }
    }
}
