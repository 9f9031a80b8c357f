use log::debug;
use syscalls::ethernet::{EthernetMessage, MacAddress};

use super::{
    Error, Handle, Message, PAGE_SIZE, SyscallResult, ipc,
    page::{BufferPage, LoanedPage, PageReturn, TransferError},
};

/// Register `protocol` on a fresh handle to the driver
///
/// Returns the MAC address of the card.
pub fn register_protocol(ethernet: Handle, protocol: u16) -> SyscallResult<MacAddress> {
    let mut arg = protocol as u64;
    ipc::call1(
        Message::call(EthernetMessage::RegisterProtocol as u8),
        ethernet,
        &mut arg,
    )?;

    let mac = MacAddress::from_arg(arg);
    debug!("protocol {:#06x} registered, mac {:?}", protocol, mac);
    Ok(mac)
}

/// Hand `page` to the driver to receive a frame into
///
/// The page comes back with [`Notification::Received`].
pub fn lend_for_receive(ethernet: Handle, page: BufferPage) -> Result<LoanedPage, TransferError> {
    let ret = ipc::send1(
        Message::send(EthernetMessage::Receive as u8),
        ethernet,
        page.number(),
    );

    match ret {
        Ok(()) => Ok(page.lend(ethernet)),
        Err(error) => Err(TransferError { error, page }),
    }
}

/// Hand `page`, holding a frame of `length` bytes, to the driver for transmission
///
/// The page comes back with [`Notification::Sent`] once the frame is on the wire.
pub fn send_frame(
    ethernet: Handle,
    page: BufferPage,
    length: usize,
) -> Result<LoanedPage, TransferError> {
    if length > PAGE_SIZE {
        return Err(TransferError {
            error: Error::InvalidArgument,
            page,
        });
    }

    let ret = ipc::send2(
        Message::send(EthernetMessage::Send as u8),
        ethernet,
        page.number(),
        length as u64,
    );

    match ret {
        Ok(()) => Ok(page.lend(ethernet)),
        Err(error) => Err(TransferError { error, page }),
    }
}

/// Driver notifications giving a page back
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notification {
    /// A frame of `length` bytes was received into the page
    Received(PageReturn),

    /// The frame in the page was transmitted
    Sent(PageReturn),
}

impl Notification {
    pub fn page_return(&self) -> &PageReturn {
        match self {
            Notification::Received(ret) | Notification::Sent(ret) => ret,
        }
    }
}

/// Decode a message received from the driver
///
/// Returns `None` for anything that is not a page return.
pub fn notification(from: Handle, msg: Message, page: u64, length: u64) -> Option<Notification> {
    let ret = PageReturn {
        from,
        page,
        length: length as usize,
    };

    match EthernetMessage::from_code(msg.code())? {
        EthernetMessage::Receive => Some(Notification::Received(ret)),
        EthernetMessage::Send => Some(Notification::Sent(ret)),
        EthernetMessage::RegisterProtocol => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        ipc,
        mock::{self, Kernel, MockEthernet, TX_DELAY_NS},
    };
    use syscalls::ethernet::ETHERTYPE_ANY;

    const ETH: Handle = Handle::from_raw(0x30);
    const MAC: MacAddress = MacAddress([0x52, 0x54, 0x00, 0x12, 0x34, 0x56]);

    fn boot() -> MockEthernet {
        let card = MockEthernet::new(MAC);
        let mut kernel = Kernel::new();
        kernel.attach(ETH, card.clone());
        mock::install(kernel);
        card
    }

    fn next_notification() -> Notification {
        let mut src = ETH;
        let (mut page, mut length) = (0, 0);
        let msg = ipc::recv2(&mut src, &mut page, &mut length).unwrap();
        notification(src, msg, page, length).unwrap()
    }

    #[test]
    fn register_returns_mac() {
        let card = boot();

        assert_eq!(register_protocol(ETH, 0x0800), Ok(MAC));
        assert_eq!(register_protocol(ETH, ETHERTYPE_ANY), Ok(MAC));
        assert_eq!(card.protocols(), [0x0800, ETHERTYPE_ANY]);
    }

    #[test]
    fn receive_into_lent_page() {
        let card = boot();

        let page = BufferPage::allocate(0).unwrap();
        let loan = lend_for_receive(ETH, page).unwrap();
        assert_eq!(card.rx_pages(), [loan.number()]);

        card.deliver_frame(b"hello frame");

        let Notification::Received(ret) = next_notification() else {
            panic!("expected a received frame");
        };
        assert_eq!(ret.from, ETH);
        assert_eq!(ret.length, 11);

        let page = loan.reclaim(&ret).unwrap();
        assert_eq!(&page[..ret.length], b"hello frame");
    }

    #[test]
    fn frames_fill_pages_in_lending_order() {
        let card = boot();

        let first = lend_for_receive(ETH, BufferPage::allocate(0).unwrap()).unwrap();
        let second = lend_for_receive(ETH, BufferPage::allocate(0).unwrap()).unwrap();
        card.deliver_frame(b"one");
        card.deliver_frame(b"two!");

        let one = *next_notification().page_return();
        let two = *next_notification().page_return();

        // Tokens only reclaim their own page
        let second = second.reclaim(&one).unwrap_err();
        let first = first.reclaim(&one).unwrap();
        let second = second.reclaim(&two).unwrap();
        assert_eq!(&first[..one.length], b"one");
        assert_eq!(&second[..two.length], b"two!");
    }

    #[test]
    fn send_returns_page_after_transmit() {
        let card = boot();

        let mut page = BufferPage::allocate(0).unwrap();
        page[..5].copy_from_slice(b"frame");
        let loan = send_frame(ETH, page, 5).unwrap();
        assert_eq!(card.transmitted(), [b"frame".to_vec()]);

        let Notification::Sent(ret) = next_notification() else {
            panic!("expected a transmit completion");
        };
        assert_eq!(ret.length, 5);
        assert!(mock::with(|kernel| kernel.now()) >= TX_DELAY_NS);
        loan.reclaim(&ret).unwrap();
    }

    #[test]
    fn oversized_frame_keeps_page() {
        let card = boot();

        let page = BufferPage::allocate(0).unwrap();
        let number = page.number();
        let err = send_frame(ETH, page, PAGE_SIZE + 1).unwrap_err();

        assert_eq!(err.error, Error::InvalidArgument);
        assert_eq!(err.page.number(), number);
        assert!(card.transmitted().is_empty());
    }

    #[test]
    fn refused_lend_gives_page_back() {
        boot();

        let page = BufferPage::allocate(0).unwrap();
        let number = page.number();
        let err = lend_for_receive(Handle::from_raw(0x31), page).unwrap_err();

        assert_eq!(err.error, Error::InvalidHandle);
        assert_eq!(err.page.number(), number);
    }

    #[test]
    fn unrelated_messages_are_not_notifications() {
        let msg = Message::send(EthernetMessage::RegisterProtocol as u8);
        assert_eq!(notification(ETH, msg, 1, 2), None);
        assert_eq!(notification(ETH, Message::send(40), 1, 2), None);
    }
}
