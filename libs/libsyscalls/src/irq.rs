use log::debug;
use syscalls::irq::{IRQ_COUNT, IrqMessage, pulse_mask};

use super::{Builtin, Error, Handle, Message, SyscallResult, ipc};

fn check_irq(irq: u64) -> SyscallResult<()> {
    if irq < IRQ_COUNT {
        Ok(())
    } else {
        Err(Error::InvalidArgument)
    }
}

/// Ask for `irq` to be delivered as pulses on `irq_handle`
///
/// Only IRQs below [`IRQ_COUNT`] can be told apart in a pulse mask.
pub fn register(irq_handle: Handle, irq: u64) -> SyscallResult<()> {
    check_irq(irq)?;

    let mut arg = irq;
    ipc::call1(Message::call(IrqMessage::Register as u8), irq_handle, &mut arg)?;

    debug!("irq {} registered on {:?}", irq, irq_handle);
    Ok(())
}

/// Done with `irq`. It cannot fire again before this.
pub fn acknowledge(irq_handle: Handle, irq: u64) -> SyscallResult<()> {
    check_irq(irq)?;
    ipc::send1(Message::send(IrqMessage::Ack as u8), irq_handle, irq)
}

/// Whether a received message is the interrupt `irq` firing
pub fn is_irq(msg: Message, mask: u64, irq: u64) -> bool {
    msg.code() == Builtin::Pulse.code() && mask & pulse_mask(irq) != 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{self, Kernel, MockIrqController};

    const IRQ: Handle = Handle::from_raw(0x50);

    fn boot() -> MockIrqController {
        let controller = MockIrqController::new();
        let mut kernel = Kernel::new();
        kernel.attach(IRQ, controller.clone());
        mock::install(kernel);
        controller
    }

    fn wait_pulse() -> (Handle, Message, u64) {
        let mut src = Handle::NONE;
        let mut mask = 0;
        let msg = ipc::recv1(&mut src, &mut mask).unwrap();
        (src, msg, mask)
    }

    #[test]
    fn interrupt_arrives_as_pulse() {
        let controller = boot();

        register(IRQ, 11).unwrap();
        assert_eq!(controller.registered(), [11]);

        controller.raise(11);
        let (src, msg, mask) = wait_pulse();

        assert_eq!(src, IRQ);
        assert!(is_irq(msg, mask, 11));
        assert!(!is_irq(msg, mask, 12));
    }

    #[test]
    fn no_refire_before_acknowledge() {
        let controller = boot();
        register(IRQ, 1).unwrap();

        controller.raise(1);
        let (_, msg, mask) = wait_pulse();
        assert!(is_irq(msg, mask, 1));

        controller.raise(1);
        assert_eq!(mock::with(|kernel| kernel.pending()), 0);

        acknowledge(IRQ, 1).unwrap();
        assert_eq!(controller.acks(), [1]);

        let (_, msg, mask) = wait_pulse();
        assert!(is_irq(msg, mask, 1));
    }

    #[test]
    fn unregistered_interrupts_are_dropped() {
        let controller = boot();

        controller.raise(4);
        assert_eq!(mock::with(|kernel| kernel.pending()), 0);
    }

    #[test]
    fn regular_messages_are_not_interrupts() {
        assert!(!is_irq(Message::send(IrqMessage::Ack as u8), u64::MAX, 3));
    }

    #[test]
    fn irqs_past_mask_width_are_refused() {
        let controller = boot();

        assert_eq!(register(IRQ, 64), Err(Error::InvalidArgument));
        assert_eq!(acknowledge(IRQ, 64), Err(Error::InvalidArgument));
        assert!(controller.registered().is_empty());
        assert!(mock::with(|kernel| kernel.entries().is_empty()));

        // A pulse for IRQ 0 is not IRQ 64
        let pulse = Message::send(Builtin::Pulse.code());
        assert!(!is_irq(pulse, pulse_mask(0), 64));
    }
}
