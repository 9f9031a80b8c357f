//! Timer protocol

use crate::Builtin;

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerMessage {
    /// Register a timer to trigger in approximately N nanoseconds.
    ///
    /// arg1: timeout.
    Register = Builtin::USER,

    /// A registered timer has triggered. It will not trigger again unless a new timeout is registered.
    Fired,

    /// Two-argument call.
    ///
    /// Reply arg1: milliseconds, arg2: ticks
    GetTime,
}

impl TimerMessage {
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            16 => Some(Self::Register),
            17 => Some(Self::Fired),
            18 => Some(Self::GetTime),
            _ => None,
        }
    }
}

/// Reply of [`TimerMessage::GetTime`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Time {
    pub millis: u64,
    pub ticks: u64,
}
