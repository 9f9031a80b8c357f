use core::fmt::{Debug, Formatter, Result};

/// Interaction kind carried in bits 8-9 of a message word
#[repr(u8)]
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum MessageKind {
    /// Fire and forget, no reply expected
    Send = 0,

    /// Block until the peer we sent to replies
    Call = 1,

    /// Not defined by the kernel (2 is set aside for a future reply-then-wait, 3 is unused).
    ///
    /// Only ever produced by decoding. The IPC operations never emit it.
    Reserved = 2,
}

impl MessageKind {
    const fn from_bits(bits: isize) -> Self {
        match bits {
            0 => Self::Send,
            1 => Self::Call,
            _ => Self::Reserved,
        }
    }
}

/// Message word: code in bits 0-7, kind in bits 8-9
///
/// The raw value is a signed machine word. The kernel returns negative words for
/// local errors, those never hold a message code (see `Error`).
#[repr(transparent)]
#[derive(PartialEq, Eq, Hash, Clone, Copy)]
pub struct Message(isize);

impl Message {
    pub const CODE_MASK: isize = 0x0ff;
    pub const KIND_MASK: isize = 0x300;
    pub const KIND_SHIFT: u32 = 8;

    /// Build a message word from a code and a kind
    pub const fn new(code: u8, kind: MessageKind) -> Self {
        Self(code as isize | ((kind as isize) << Self::KIND_SHIFT))
    }

    /// Message word with kind [`MessageKind::Send`]
    pub const fn send(code: u8) -> Self {
        Self::new(code, MessageKind::Send)
    }

    /// Message word with kind [`MessageKind::Call`]
    pub const fn call(code: u8) -> Self {
        Self::new(code, MessageKind::Call)
    }

    /// Replace the kind, leaving every other bit untouched
    pub const fn with_kind(self, kind: MessageKind) -> Self {
        Self((self.0 & !Self::KIND_MASK) | ((kind as isize) << Self::KIND_SHIFT))
    }

    pub const fn code(self) -> u8 {
        (self.0 & Self::CODE_MASK) as u8
    }

    pub const fn kind(self) -> MessageKind {
        MessageKind::from_bits((self.0 & Self::KIND_MASK) >> Self::KIND_SHIFT)
    }

    /// Wrap a raw word as received from the kernel
    pub const fn from_raw(value: isize) -> Self {
        Self(value)
    }

    pub const fn as_raw(self) -> isize {
        self.0
    }
}

impl Debug for Message {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        f.debug_struct("Message")
            .field("code", &self.code())
            .field("kind", &self.kind())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_and_kind_project_back() {
        for code in 0..=255u8 {
            for kind in [MessageKind::Send, MessageKind::Call] {
                let msg = Message::new(code, kind);
                assert_eq!(msg.code(), code);
                assert_eq!(msg.kind(), kind);
            }
        }
    }

    #[test]
    fn word_layout() {
        assert_eq!(Message::send(16).as_raw(), 0x010);
        assert_eq!(Message::call(16).as_raw(), 0x110);
        assert_eq!(Message::call(0xff).as_raw(), 0x1ff);
    }

    #[test]
    fn with_kind_only_touches_kind_bits() {
        let call = Message::call(42);
        let send = call.with_kind(MessageKind::Send);

        assert_eq!(send.code(), 42);
        assert_eq!(send.kind(), MessageKind::Send);
        assert_eq!(send.with_kind(MessageKind::Call), call);

        // Bits above the kind field survive
        let wide = Message::from_raw(0x1000 | 0x300 | 7);
        let narrowed = wide.with_kind(MessageKind::Call);
        assert_eq!(narrowed.as_raw(), 0x1000 | 0x100 | 7);
        assert_eq!(narrowed.code(), 7);
    }

    #[test]
    fn decoding_masks_kind_bits() {
        // A raw word with kind bits set must not leak into the code
        let msg = Message::from_raw(0x1_23);
        assert_eq!(msg.code(), 0x23);
        assert_eq!(msg.kind(), MessageKind::Call);
    }

    #[test]
    fn reserved_kinds_decode_as_reserved() {
        assert_eq!(Message::from_raw(0x2_10).kind(), MessageKind::Reserved);
        assert_eq!(Message::from_raw(0x3_10).kind(), MessageKind::Reserved);
        assert_eq!(Message::from_raw(0x3_10).code(), 0x10);
    }
}
