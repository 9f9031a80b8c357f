//! Ethernet protocol
//!
//! A protocol registers on a fresh handle, then lends pages to the driver: every
//! [`EthernetMessage::Receive`] lends one page for reception, every
//! [`EthernetMessage::Send`] lends one page holding an outbound frame. The
//! number of buffers in flight is up to the protocol. A lent page belongs to
//! the driver until the driver sends a notification carrying the same code
//! and the page number back.

use core::fmt;

use crate::Builtin;

/// Special protocol number matching every frame type
pub const ETHERTYPE_ANY: u16 = 0;

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EthernetMessage {
    /// Register an ethernet protocol.
    ///
    /// arg1: protocol number ([`ETHERTYPE_ANY`] matches all protocols)
    ///
    /// Reply arg1: MAC address of the card
    RegisterProtocol = Builtin::USER,

    /// protocol -> ethernet: hand a buffer over for reception. Only valid as a send, the
    /// reply comes later as a notification with the same code.
    ///
    /// The buffer receives the whole frame including headers, with or without a VLAN header.
    ///
    /// arg1: page number of the buffer to receive into
    ///
    /// Notification arg1: page number, arg2: frame length
    Receive,

    /// protocol -> ethernet: send a frame. The page is owned by the driver until it has
    /// been put on the wire and the notification is sent.
    ///
    /// arg1: page number of the buffer holding the frame
    /// arg2: frame length
    ///
    /// Notification arg1: page number of the delivered frame, no longer owned by the driver
    Send,
}

impl EthernetMessage {
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            16 => Some(Self::RegisterProtocol),
            17 => Some(Self::Receive),
            18 => Some(Self::Send),
            _ => None,
        }
    }
}

/// Hardware address, packed in the low 48 bits of an argument slot (first octet in the lowest byte)
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MacAddress(pub [u8; 6]);

impl MacAddress {
    pub const fn from_arg(arg: u64) -> Self {
        let b = arg.to_le_bytes();
        Self([b[0], b[1], b[2], b[3], b[4], b[5]])
    }

    pub const fn to_arg(self) -> u64 {
        let m = self.0;
        u64::from_le_bytes([m[0], m[1], m[2], m[3], m[4], m[5], 0, 0])
    }
}

impl fmt::Debug for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let m = self.0;
        write!(
            f,
            "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
            m[0], m[1], m[2], m[3], m[4], m[5]
        )
    }
}
