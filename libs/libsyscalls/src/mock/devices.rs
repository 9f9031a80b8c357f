//! Simulated drivers
//!
//! Devices are cheap to clone: clones share state, so a test keeps one clone to drive and
//! inspect the device while the kernel owns the other.

use std::{
    cell::RefCell,
    collections::{BTreeMap, BTreeSet, VecDeque},
    rc::Rc,
    vec::Vec,
};

use syscalls::{
    Builtin, Message,
    console::ConsoleMessage,
    ethernet::{EthernetMessage, MacAddress},
    framebuffer::{FramebufferMessage, PaletteEntry, VideoMode},
    irq::{IrqMessage, pulse_mask},
    timer::TimerMessage,
};

use super::{Context, Peer, Reply};

/// Peer made of a closure
pub struct FnPeer<F>(pub F);

impl<F> FnPeer<F>
where
    F: FnMut(Message, [u64; 3], &mut Context<'_>) -> Option<Reply>,
{
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

impl<F> Peer for FnPeer<F>
where
    F: FnMut(Message, [u64; 3], &mut Context<'_>) -> Option<Reply>,
{
    fn receive(
        &mut self,
        message: Message,
        args: [u64; 3],
        ctx: &mut Context<'_>,
    ) -> Option<Reply> {
        (self.0)(message, args, ctx)
    }
}

/// Records everything it gets, answers calls with the same code and every argument plus one
#[derive(Clone, Default)]
pub struct Echo {
    received: Rc<RefCell<Vec<(Message, [u64; 3])>>>,
}

impl Echo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn received(&self) -> Vec<(Message, [u64; 3])> {
        self.received.borrow().clone()
    }
}

impl Peer for Echo {
    fn receive(
        &mut self,
        message: Message,
        args: [u64; 3],
        _ctx: &mut Context<'_>,
    ) -> Option<Reply> {
        self.received.borrow_mut().push((message, args));
        Some(Reply::new(
            Message::send(message.code()),
            args.map(|arg| arg.wrapping_add(1)),
        ))
    }
}

#[derive(Default)]
struct ConsoleState {
    output: Vec<u8>,
    input: VecDeque<u8>,
}

#[derive(Clone, Default)]
pub struct MockConsole {
    state: Rc<RefCell<ConsoleState>>,
}

impl MockConsole {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bytes typed on the keyboard
    pub fn push_input(&self, bytes: &[u8]) {
        self.state.borrow_mut().input.extend(bytes);
    }

    pub fn output(&self) -> Vec<u8> {
        self.state.borrow().output.clone()
    }
}

impl Peer for MockConsole {
    fn receive(
        &mut self,
        message: Message,
        args: [u64; 3],
        _ctx: &mut Context<'_>,
    ) -> Option<Reply> {
        let mut state = self.state.borrow_mut();
        match ConsoleMessage::from_code(message.code())? {
            ConsoleMessage::Write => {
                state.output.push(args[0] as u8);
                None
            }
            // No input: the reader stays blocked
            ConsoleMessage::Read => state
                .input
                .pop_front()
                .map(|byte| Reply::new(Message::send(message.code()), [byte as u64, 0, 0])),
        }
    }
}

#[derive(Default)]
struct IrqState {
    registered: BTreeSet<u64>,
    in_service: BTreeSet<u64>,
    raised: VecDeque<u64>,
    acks: Vec<u64>,
}

/// Interrupt controller. An interrupt raised while in service waits for its acknowledge.
#[derive(Clone, Default)]
pub struct MockIrqController {
    state: Rc<RefCell<IrqState>>,
}

impl MockIrqController {
    pub fn new() -> Self {
        Self::default()
    }

    /// The device asserts `irq`
    pub fn raise(&self, irq: u64) {
        self.state.borrow_mut().raised.push_back(irq);
    }

    pub fn registered(&self) -> Vec<u64> {
        self.state.borrow().registered.iter().copied().collect()
    }

    pub fn acks(&self) -> Vec<u64> {
        self.state.borrow().acks.clone()
    }
}

impl Peer for MockIrqController {
    fn receive(
        &mut self,
        message: Message,
        args: [u64; 3],
        _ctx: &mut Context<'_>,
    ) -> Option<Reply> {
        let mut state = self.state.borrow_mut();
        match IrqMessage::from_code(message.code())? {
            IrqMessage::Register => {
                state.registered.insert(args[0]);
                Some(Reply::new(Message::send(message.code()), [0; 3]))
            }
            IrqMessage::Ack => {
                state.in_service.remove(&args[0]);
                state.acks.push(args[0]);
                None
            }
        }
    }

    fn poll(&mut self, ctx: &mut Context<'_>) {
        let mut state = self.state.borrow_mut();
        let state = &mut *state;
        let mut waiting = VecDeque::new();

        while let Some(irq) = state.raised.pop_front() {
            if !state.registered.contains(&irq) {
                continue;
            }

            if state.in_service.insert(irq) {
                ctx.notify(Message::send(Builtin::Pulse.code()), [pulse_mask(irq), 0, 0]);
            } else {
                waiting.push_back(irq);
            }
        }

        state.raised = waiting;
    }
}

/// Length of a timer tick
pub const TICK_NS: u64 = 10_000_000;

/// One-shot timer on the virtual clock
#[derive(Clone, Default)]
pub struct MockTimer {
    registrations: Rc<RefCell<Vec<u64>>>,
}

impl MockTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Timeouts registered so far, in nanoseconds
    pub fn registrations(&self) -> Vec<u64> {
        self.registrations.borrow().clone()
    }
}

impl Peer for MockTimer {
    fn receive(
        &mut self,
        message: Message,
        args: [u64; 3],
        ctx: &mut Context<'_>,
    ) -> Option<Reply> {
        match TimerMessage::from_code(message.code())? {
            TimerMessage::Register => {
                self.registrations.borrow_mut().push(args[0]);
                ctx.notify_after(args[0], Message::send(TimerMessage::Fired as u8), [0; 3]);
                None
            }
            TimerMessage::GetTime => {
                let now = ctx.now();
                Some(Reply::new(
                    Message::send(message.code()),
                    [now / 1_000_000, now / TICK_NS, 0],
                ))
            }
            TimerMessage::Fired => None,
        }
    }
}

#[derive(Default)]
struct EthernetState {
    mac: MacAddress,
    protocols: Vec<u16>,
    rx_pages: VecDeque<u64>,
    incoming: VecDeque<Vec<u8>>,
    transmitted: Vec<Vec<u8>>,
}

/// Network card. Frames arrive in pages lent for receive, in lending order.
#[derive(Clone, Default)]
pub struct MockEthernet {
    state: Rc<RefCell<EthernetState>>,
}

/// Time for a frame to leave the card
pub const TX_DELAY_NS: u64 = 10_000;

impl MockEthernet {
    pub fn new(mac: MacAddress) -> Self {
        let device = Self::default();
        device.state.borrow_mut().mac = mac;
        device
    }

    /// A frame comes from the wire
    pub fn deliver_frame(&self, frame: &[u8]) {
        self.state.borrow_mut().incoming.push_back(frame.to_vec());
    }

    pub fn protocols(&self) -> Vec<u16> {
        self.state.borrow().protocols.clone()
    }

    /// Pages currently lent for receive
    pub fn rx_pages(&self) -> Vec<u64> {
        self.state.borrow().rx_pages.iter().copied().collect()
    }

    pub fn transmitted(&self) -> Vec<Vec<u8>> {
        self.state.borrow().transmitted.clone()
    }
}

impl Peer for MockEthernet {
    fn receive(
        &mut self,
        message: Message,
        args: [u64; 3],
        ctx: &mut Context<'_>,
    ) -> Option<Reply> {
        let mut state = self.state.borrow_mut();
        match EthernetMessage::from_code(message.code())? {
            EthernetMessage::RegisterProtocol => {
                state.protocols.push(args[0] as u16);
                Some(Reply::new(
                    Message::send(message.code()),
                    [state.mac.to_arg(), 0, 0],
                ))
            }
            EthernetMessage::Receive => {
                state.rx_pages.push_back(args[0]);
                None
            }
            EthernetMessage::Send => {
                let (page, length) = (args[0], args[1] as usize);
                let frame = ctx.page(page).map(|bytes| bytes[..length].to_vec())?;
                state.transmitted.push(frame);
                ctx.notify_after(
                    TX_DELAY_NS,
                    Message::send(message.code()),
                    [page, length as u64, 0],
                );
                None
            }
        }
    }

    fn poll(&mut self, ctx: &mut Context<'_>) {
        let mut state = self.state.borrow_mut();
        let state = &mut *state;

        while !state.rx_pages.is_empty() && !state.incoming.is_empty() {
            let (Some(page), Some(frame)) = (state.rx_pages.pop_front(), state.incoming.pop_front())
            else {
                break;
            };

            if let Some(bytes) = ctx.page_mut(page) {
                bytes[..frame.len()].copy_from_slice(&frame);
                ctx.notify(
                    Message::send(EthernetMessage::Receive as u8),
                    [page, frame.len() as u64, 0],
                );
            }
        }
    }
}

#[derive(Default)]
struct FramebufferState {
    mode: Option<VideoMode>,
    palette: BTreeMap<u8, PaletteEntry>,
    presented: Vec<u64>,
}

#[derive(Clone, Default)]
pub struct MockFramebuffer {
    state: Rc<RefCell<FramebufferState>>,
}

impl MockFramebuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> Option<VideoMode> {
        self.state.borrow().mode
    }

    pub fn palette(&self, index: u8) -> Option<PaletteEntry> {
        self.state.borrow().palette.get(&index).copied()
    }

    /// Offsets of presented frames
    pub fn presented(&self) -> Vec<u64> {
        self.state.borrow().presented.clone()
    }
}

impl Peer for MockFramebuffer {
    fn receive(
        &mut self,
        message: Message,
        args: [u64; 3],
        _ctx: &mut Context<'_>,
    ) -> Option<Reply> {
        let mut state = self.state.borrow_mut();
        match FramebufferMessage::from_code(message.code())? {
            FramebufferMessage::SetVideoMode => {
                state.mode = Some(VideoMode::from_args(args[0], args[1]));
                Some(Reply::new(Message::send(message.code()), [0; 3]))
            }
            FramebufferMessage::SetPalette => {
                let entry = PaletteEntry::from_arg(args[0]);
                state.palette.insert(entry.index, entry);
                Some(Reply::new(Message::send(message.code()), [0; 3]))
            }
            FramebufferMessage::Present => {
                state.presented.push(args[0]);
                None
            }
        }
    }
}
