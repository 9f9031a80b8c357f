//! Interrupt registration protocol

use crate::Builtin;

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IrqMessage {
    /// Takes one argument, the IRQ number (GSI in the case of I/O APICs).
    Register = Builtin::USER,

    /// Acknowledge receipt of the interrupt.
    ///
    /// arg1: IRQ number to acknowledge. The interrupt does not fire again until acknowledged.
    Ack,
}

impl IrqMessage {
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            16 => Some(Self::Register),
            17 => Some(Self::Ack),
            _ => None,
        }
    }
}

/// IRQs that fit in a pulse mask
pub const IRQ_COUNT: u64 = 64;

/// Interrupts are delivered as pulses from the IRQ handle, with this bit set in the mask.
///
/// Empty for IRQs past [`IRQ_COUNT`].
pub const fn pulse_mask(irq: u64) -> u64 {
    if irq < IRQ_COUNT { 1 << irq } else { 0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn masks_do_not_alias() {
        assert_eq!(pulse_mask(0), 1);
        assert_eq!(pulse_mask(63), 1 << 63);
        assert_eq!(pulse_mask(64), 0);
        assert_eq!(pulse_mask(u64::MAX), 0);
    }
}
